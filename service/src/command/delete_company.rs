//! [`Command`] for deleting a [`Company`].

use common::operations::{By, Commit, Delete, Lock, Select, Transact, Transacted};
use derive_more::{Display, Error, From};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::User;
use crate::{
    access::{self, Caller, Operation},
    domain::{company, Company},
    infra::{database, Database},
    read, Service,
};

use super::Command;

/// [`Command`] for deleting a [`Company`] no [`User`] is related to.
#[derive(Clone, Copy, Debug)]
pub struct DeleteCompany {
    /// [`Caller`] deleting the [`Company`].
    pub caller: Caller,

    /// ID of the [`Company`] to delete.
    pub id: company::Id,
}

impl<Db> Command<DeleteCompany> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Lock<By<Company, company::Id>>,
            Ok = (),
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Company>, company::Id>>,
            Ok = Option<Company>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<read::company::HasMembers, company::Id>>,
            Ok = read::company::HasMembers,
            Err = Traced<database::Error>,
        > + Database<
            Delete<By<Company, company::Id>>,
            Ok = (),
            Err = Traced<database::Error>,
        > + Database<Commit, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = Company;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: DeleteCompany) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let DeleteCompany { caller, id } = cmd;

        caller
            .authorize(Operation::DeleteCompany)
            .map_err(tracerr::from_and_wrap!(=> E))?;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Lock(By::<Company, _>::new(id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let company = tx
            .execute(Select(By::<Option<Company>, _>::new(id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::CompanyNotExists(id))
            .map_err(tracerr::wrap!())?;

        let has_members = tx
            .execute(Select(By::<read::company::HasMembers, _>::new(id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if *has_members {
            return Err(tracerr::new!(E::CompanyHasMembers(id)));
        }

        tx.execute(Delete(By::<Company, _>::new(id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(company)
    }
}

/// Error of [`DeleteCompany`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Caller`] is not allowed to delete [`Company`]s.
    #[display("Access denied: {_0}")]
    Access(access::Denial),

    /// [`Company`] has [`User`]s related to it.
    #[display("`Company(id: {_0})` has members")]
    #[from(ignore)]
    CompanyHasMembers(#[error(not(source))] company::Id),

    /// [`Company`] doesn't exist.
    #[display("`Company(id: {_0})` does not exist")]
    #[from(ignore)]
    CompanyNotExists(#[error(not(source))] company::Id),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),
}

#[cfg(test)]
mod spec {
    use crate::{domain::user, fixture, Command as _};

    use super::{DeleteCompany, ExecutionError};

    #[tokio::test]
    async fn refuses_company_with_members() {
        let svc = fixture::service();
        let admin = fixture::user(user::Role::Admin);
        let c = fixture::company();
        fixture::store(&svc, c.clone()).await;
        fixture::store(&svc, fixture::member(c.id, user::Membership::Pending))
            .await;

        let err = svc
            .execute(DeleteCompany {
                caller: fixture::caller(&admin),
                id: c.id,
            })
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::CompanyHasMembers(_)));
    }

    #[tokio::test]
    async fn deletes_empty_company() {
        let svc = fixture::service();
        let admin = fixture::user(user::Role::Admin);
        let c = fixture::company();
        fixture::store(&svc, c.clone()).await;

        let removed = svc
            .execute(DeleteCompany {
                caller: fixture::caller(&admin),
                id: c.id,
            })
            .await
            .unwrap();

        assert_eq!(removed, c);
        assert!(svc.database().snapshot().await.companies.is_empty());
    }
}
