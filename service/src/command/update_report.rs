//! [`Command`] for updating a [`Report`].

use common::operations::{
    By, Commit, Lock, Select, Transact, Transacted, Update,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    access::{self, Caller, Operation},
    domain::{report, user, Report},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for processing a [`Report`] by an administrator.
#[derive(Clone, Debug)]
pub struct UpdateReport {
    /// [`Caller`] updating the [`Report`].
    pub caller: Caller,

    /// ID of the [`Report`] to update.
    pub id: report::Id,

    /// New contact [`user::Email`] of the [`Report`].
    pub email: user::Email,

    /// New [`report::Content`] of the [`Report`].
    pub content: report::Content,

    /// New [`report::Status`] of the [`Report`].
    pub status: report::Status,
}

impl<Db> Command<UpdateReport> for Service<Db>
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
        > + Database<Update<Report>, Ok = (), Err = Traced<database::Error>>
        + Database<Commit, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = Report;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: UpdateReport) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let UpdateReport {
            caller,
            id,
            email,
            content,
            status,
        } = cmd;

        caller
            .authorize(Operation::UpdateReport)
            .map_err(tracerr::from_and_wrap!(=> E))?;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Lock(By::new(id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let mut report = tx
            .execute(Select(By::<Option<Report>, _>::new(id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::ReportNotExists(id))
            .map_err(tracerr::wrap!())?;

        report.email = email;
        report.content = content;
        report.status = status;
        tx.execute(Update(report.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tracing::info!(report.id = %id, report.status = %status, "report updated");

        Ok(report)
    }
}

/// Error of [`UpdateReport`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Caller`] is not allowed to update [`Report`]s.
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
