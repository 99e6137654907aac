//! [`Command`] for updating a [`Company`].

use common::operations::{
    By, Commit, Lock, Select, Transact, Transacted, Update,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    access::{self, Caller, Operation},
    domain::{company, user, Company, User},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for updating a [`Company`].
///
/// Apart from administrators, only accepted members of the [`Company`] may
/// update it.
#[derive(Clone, Debug)]
pub struct UpdateCompany {
    /// [`Caller`] updating the [`Company`].
    pub caller: Caller,

    /// ID of the [`Company`] to update.
    pub id: company::Id,

    /// New [`company::Name`] of the [`Company`].
    pub name: company::Name,

    /// New [`company::Address`] of the [`Company`].
    pub address: company::Address,

    /// New contact [`user::Phone`] of the [`Company`].
    pub phone_number: user::Phone,
}

impl<Db> Command<UpdateCompany> for Service<Db>
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
            Select<By<Option<User>, user::Id>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + Database<Update<Company>, Ok = (), Err = Traced<database::Error>>
        + Database<Commit, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = Company;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: UpdateCompany) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let UpdateCompany {
            caller,
            id,
            name,
            address,
            phone_number,
        } = cmd;

        let (caller_id, role) = caller
            .authorize_user(Operation::UpdateCompany)
            .map_err(tracerr::from_and_wrap!(=> E))?;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Lock(By::new(id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let mut company = tx
            .execute(Select(By::<Option<Company>, _>::new(id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::CompanyNotExists(id))
            .map_err(tracerr::wrap!())?;

        if role != user::Role::Admin {
            let member_of = tx
                .execute(Select(By::<Option<User>, _>::new(caller_id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
                .and_then(|u| u.accepted_company());
            if member_of != Some(id) {
                return Err(tracerr::new!(E::NotMemberOfCompany(id)));
            }
        }

        company.name = name;
        company.address = address;
        company.phone_number = phone_number;
        tx.execute(Update(company.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(company)
    }
}

/// Error of [`UpdateCompany`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Caller`] is not allowed to update [`Company`]s.
    #[display("Access denied: {_0}")]
    Access(access::Denial),

    /// [`Company`] doesn't exist.
    #[display("`Company(id: {_0})` does not exist")]
    #[from(ignore)]
    CompanyNotExists(#[error(not(source))] company::Id),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Caller`] is not an accepted member of the [`Company`].
    #[display("`User` is not a member of `Company(id: {_0})`")]
    #[from(ignore)]
    NotMemberOfCompany(#[error(not(source))] company::Id),
}
