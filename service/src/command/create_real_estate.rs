//! [`Command`] for creating a new [`RealEstate`].

use common::operations::{Commit, Insert, Transact, Transacted};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    access::{self, Caller, Operation},
    domain::{real_estate, RealEstate},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for creating a new [`RealEstate`].
#[derive(Clone, Debug)]
pub struct CreateRealEstate {
    /// [`Caller`] creating the [`RealEstate`].
    pub caller: Caller,

    /// Properties of the new [`RealEstate`].
    pub details: Details,
}

/// Properties of a [`RealEstate`] provided on its creation or update.
#[derive(Clone, Debug)]
pub struct Details {
    /// [`real_estate::Name`] of the [`RealEstate`].
    pub name: real_estate::Name,

    /// [`real_estate::Kind`] of the [`RealEstate`].
    pub kind: real_estate::Kind,

    /// [`real_estate::Area`] of the [`RealEstate`].
    pub area: real_estate::Area,

    /// [`real_estate::HeatingType`] of the [`RealEstate`].
    pub heating_type: real_estate::HeatingType,

    /// [`real_estate::Equipment`] of the [`RealEstate`], if any.
    pub equipment: Option<real_estate::Equipment>,

    /// Deletion mark of the [`RealEstate`].
    pub deleted: bool,

    /// [`real_estate::Location`] of the [`RealEstate`].
    pub location: real_estate::Location,
}

impl Details {
    /// Builds a [`RealEstate`] with the provided ID out of these [`Details`].
    #[must_use]
    pub fn into_real_estate(self, id: real_estate::Id) -> RealEstate {
        let Self {
            name,
            kind,
            area,
            heating_type,
            equipment,
            deleted,
            location,
        } = self;
        RealEstate {
            id,
            name,
            kind,
            area,
            heating_type,
            equipment,
            deleted,
            location,
        }
    }
}

impl<Db> Command<CreateRealEstate> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<Insert<RealEstate>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = RealEstate;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CreateRealEstate,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateRealEstate { caller, details } = cmd;

        caller
            .authorize(Operation::CreateRealEstate)
            .map_err(tracerr::from_and_wrap!(=> E))?;

        let real_estate = details.into_real_estate(real_estate::Id::new());

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        tx.execute(Insert(real_estate.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(real_estate)
    }
}

/// Error of [`CreateRealEstate`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Caller`] is not allowed to create [`RealEstate`]s.
    #[display("Access denied: {_0}")]
    Access(access::Denial),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),
}

#[cfg(test)]
mod spec {
    use crate::{
        access::Denial,
        domain::{user, RealEstate},
        fixture, Command as _,
    };

    use super::{CreateRealEstate, ExecutionError};

    #[tokio::test]
    async fn stores_provided_details() {
        let svc = fixture::service();
        let advertiser = fixture::user(user::Role::Advertiser);
        let template = fixture::real_estate();

        let created = svc
            .execute(CreateRealEstate {
                caller: fixture::caller(&advertiser),
                details: fixture::details(&template),
            })
            .await
            .unwrap();

        assert_eq!(
            RealEstate {
                id: template.id,
                ..created.clone()
            },
            template,
        );
        let stored = svc.database().snapshot().await;
        assert_eq!(stored.real_estates.get(&created.id), Some(&created));
    }

    #[tokio::test]
    async fn admin_cannot_create() {
        let svc = fixture::service();
        let admin = fixture::user(user::Role::Admin);

        let err = svc
            .execute(CreateRealEstate {
                caller: fixture::caller(&admin),
                details: fixture::details(&fixture::real_estate()),
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::Access(Denial::Forbidden),
        ));
    }
}
