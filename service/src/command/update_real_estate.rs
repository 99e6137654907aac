//! [`Command`] for updating a [`RealEstate`].

use common::operations::{
    By, Commit, Lock, Select, Transact, Transacted, Update,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    access::{self, Caller, Operation},
    domain::{real_estate, RealEstate},
    infra::{database, Database},
    Service,
};

use super::{create_real_estate::Details, Command};

/// [`Command`] for fully updating a [`RealEstate`].
#[derive(Clone, Debug)]
pub struct UpdateRealEstate {
    /// [`Caller`] updating the [`RealEstate`].
    pub caller: Caller,

    /// ID of the [`RealEstate`] to update.
    pub id: real_estate::Id,

    /// New properties of the [`RealEstate`].
    pub details: Details,
}

impl<Db> Command<UpdateRealEstate> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Lock<By<RealEstate, real_estate::Id>>,
            Ok = (),
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<RealEstate>, real_estate::Id>>,
            Ok = Option<RealEstate>,
            Err = Traced<database::Error>,
        > + Database<Update<RealEstate>, Ok = (), Err = Traced<database::Error>>
        + Database<Commit, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = RealEstate;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: UpdateRealEstate,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let UpdateRealEstate {
            caller,
            id,
            details,
        } = cmd;

        caller
            .authorize(Operation::UpdateRealEstate)
            .map_err(tracerr::from_and_wrap!(=> E))?;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Lock(By::new(id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let existing = tx
            .execute(Select(By::<Option<RealEstate>, _>::new(id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::RealEstateNotExists(id))
            .map_err(tracerr::wrap!())?;

        let real_estate = details.into_real_estate(existing.id);
        if real_estate == existing {
            return Ok(existing);
        }

        tx.execute(Update(real_estate.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(real_estate)
    }
}

/// Error of [`UpdateRealEstate`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Caller`] is not allowed to update [`RealEstate`]s.
    #[display("Access denied: {_0}")]
    Access(access::Denial),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`RealEstate`] doesn't exist.
    #[display("`RealEstate(id: {_0})` does not exist")]
    #[from(ignore)]
    RealEstateNotExists(#[error(not(source))] real_estate::Id),
}

#[cfg(test)]
mod spec {
    use crate::{
        domain::{real_estate, user},
        fixture, Command as _,
    };

    use super::{ExecutionError, UpdateRealEstate};

    #[tokio::test]
    async fn replaces_details() {
        let svc = fixture::service();
        let advertiser = fixture::user(user::Role::Advertiser);
        let estate = fixture::real_estate();
        fixture::store(&svc, estate.clone()).await;

        let mut details = fixture::details(&estate);
        details.name = real_estate::Name::new("Renovated flat").unwrap();
        details.deleted = true;

        let out = svc
            .execute(UpdateRealEstate {
                caller: fixture::caller(&advertiser),
                id: estate.id,
                details,
            })
            .await
            .unwrap();

        assert_eq!(out.id, estate.id);
        assert!(out.deleted);
        assert_eq!(
            svc.database().snapshot().await.real_estates.get(&estate.id),
            Some(&out),
        );
    }

    #[tokio::test]
    async fn fails_on_unknown_real_estate() {
        let svc = fixture::service();
        let advertiser = fixture::user(user::Role::Advertiser);
        let estate = fixture::real_estate();

        let err = svc
            .execute(UpdateRealEstate {
                caller: fixture::caller(&advertiser),
                id: estate.id,
                details: fixture::details(&estate),
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::RealEstateNotExists(_),
        ));
    }
}
