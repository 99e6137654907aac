//! [`Command`] for creating a new [`Company`].

use common::operations::{Commit, Insert, Transact, Transacted};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    access::{self, Caller, Operation},
    domain::{company, user, Company},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for creating a new [`Company`].
#[derive(Clone, Debug)]
pub struct CreateCompany {
    /// [`Caller`] creating the [`Company`].
    pub caller: Caller,

    /// [`company::Name`] of the new [`Company`].
    pub name: company::Name,

    /// [`company::Address`] of the new [`Company`].
    pub address: company::Address,

    /// Contact [`user::Phone`] of the new [`Company`].
    pub phone_number: user::Phone,
}

impl<Db> Command<CreateCompany> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<Insert<Company>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Company;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: CreateCompany) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateCompany {
            caller,
            name,
            address,
            phone_number,
        } = cmd;

        caller
            .authorize(Operation::CreateCompany)
            .map_err(tracerr::from_and_wrap!(=> E))?;

        let company = Company {
            id: company::Id::new(),
            name,
            address,
            phone_number,
        };

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        tx.execute(Insert(company.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(company)
    }
}

/// Error of [`CreateCompany`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Caller`] is not allowed to create [`Company`]s.
    #[display("Access denied: {_0}")]
    Access(access::Denial),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),
}
