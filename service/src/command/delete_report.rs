//! [`Command`] for deleting a [`Report`].

use common::operations::{By, Commit, Delete, Lock, Select, Transact, Transacted};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    access::{self, Caller, Operation},
    domain::{report, Report},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for deleting a [`Report`].
#[derive(Clone, Copy, Debug)]
pub struct DeleteReport {
    /// [`Caller`] deleting the [`Report`].
    pub caller: Caller,

    /// ID of the [`Report`] to delete.
    pub id: report::Id,
}

impl<Db> Command<DeleteReport> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Lock<By<Report, report::Id>>,
            Ok = (),
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Report>, report::Id>>,
            Ok = Option<Report>,
            Err = Traced<database::Error>,
        > + Database<
            Delete<By<Report, report::Id>>,
            Ok = (),
            Err = Traced<database::Error>,
        > + Database<Commit, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = Report;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: DeleteReport) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let DeleteReport { caller, id } = cmd;

        caller
            .authorize(Operation::DeleteReport)
            .map_err(tracerr::from_and_wrap!(=> E))?;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Lock(By::<Report, _>::new(id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let report = tx
            .execute(Select(By::<Option<Report>, _>::new(id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::ReportNotExists(id))
            .map_err(tracerr::wrap!())?;

        tx.execute(Delete(By::<Report, _>::new(id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(report)
    }
}

/// Error of [`DeleteReport`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Caller`] is not allowed to delete [`Report`]s.
    #[display("Access denied: {_0}")]
    Access(access::Denial),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Report`] doesn't exist.
    #[display("`Report(id: {_0})` does not exist")]
    #[from(ignore)]
    ReportNotExists(#[error(not(source))] report::Id),
}
