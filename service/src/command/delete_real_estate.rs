//! [`Command`] for deleting a [`RealEstate`].

use common::operations::{By, Commit, Delete, Lock, Select, Transact, Transacted};
use derive_more::{Display, Error, From};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::Announcement;
use crate::{
    access::{self, Caller, Operation},
    domain::{real_estate, RealEstate},
    infra::{database, Database},
    read, Service,
};

use super::Command;

/// [`Command`] for deleting a [`RealEstate`] not advertised by any
/// [`Announcement`].
#[derive(Clone, Copy, Debug)]
pub struct DeleteRealEstate {
    /// [`Caller`] deleting the [`RealEstate`].
    pub caller: Caller,

    /// ID of the [`RealEstate`] to delete.
    pub id: real_estate::Id,
}

impl<Db> Command<DeleteRealEstate> for Service<Db>
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
        > + Database<
            Select<By<read::real_estate::IsUsed, real_estate::Id>>,
            Ok = read::real_estate::IsUsed,
            Err = Traced<database::Error>,
        > + Database<
            Delete<By<RealEstate, real_estate::Id>>,
            Ok = (),
            Err = Traced<database::Error>,
        > + Database<Commit, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = RealEstate;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: DeleteRealEstate,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let DeleteRealEstate { caller, id } = cmd;

        caller
            .authorize(Operation::DeleteRealEstate)
            .map_err(tracerr::from_and_wrap!(=> E))?;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Lock(By::<RealEstate, _>::new(id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let real_estate = tx
            .execute(Select(By::<Option<RealEstate>, _>::new(id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::RealEstateNotExists(id))
            .map_err(tracerr::wrap!())?;

        let is_used = tx
            .execute(Select(By::<read::real_estate::IsUsed, _>::new(id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if *is_used {
            return Err(tracerr::new!(E::RealEstateInUse(id)));
        }

        tx.execute(Delete(By::<RealEstate, _>::new(id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(real_estate)
    }
}

/// Error of [`DeleteRealEstate`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Caller`] is not allowed to delete [`RealEstate`]s.
    #[display("Access denied: {_0}")]
    Access(access::Denial),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`RealEstate`] is advertised by an [`Announcement`].
    #[display("`RealEstate(id: {_0})` is in use")]
    #[from(ignore)]
    RealEstateInUse(#[error(not(source))] real_estate::Id),

    /// [`RealEstate`] doesn't exist.
    #[display("`RealEstate(id: {_0})` does not exist")]
    #[from(ignore)]
    RealEstateNotExists(#[error(not(source))] real_estate::Id),
}

#[cfg(test)]
mod spec {
    use crate::{domain::user, fixture, Command as _};

    use super::{DeleteRealEstate, ExecutionError};

    #[tokio::test]
    async fn refuses_advertised_real_estate() {
        let svc = fixture::service();
        let advertiser = fixture::user(user::Role::Advertiser);
        let estate = fixture::real_estate();
        fixture::store(&svc, estate.clone()).await;
        fixture::store(&svc, fixture::announcement(advertiser.id, estate.id))
            .await;

        let err = svc
            .execute(DeleteRealEstate {
                caller: fixture::caller(&advertiser),
                id: estate.id,
            })
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::RealEstateInUse(_)));
        let stored = svc.database().snapshot().await;
        assert!(stored.real_estates.contains_key(&estate.id));
    }

    #[tokio::test]
    async fn admin_deletes_unused_real_estate() {
        let svc = fixture::service();
        let admin = fixture::user(user::Role::Admin);
        let estate = fixture::real_estate();
        fixture::store(&svc, estate.clone()).await;

        let removed = svc
            .execute(DeleteRealEstate {
                caller: fixture::caller(&admin),
                id: estate.id,
            })
            .await
            .unwrap();

        assert_eq!(removed, estate);
        assert!(svc.database().snapshot().await.real_estates.is_empty());
    }
}
