//! [`Command`] for reporting an [`Announcement`].

use common::operations::{By, Commit, Insert, Select, Transact, Transacted};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    access::{self, Caller, Operation},
    domain::{announcement, report, user, Announcement, Report},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for filing a new [`Report`] about a not yet verified
/// [`Announcement`].
#[derive(Clone, Debug)]
pub struct CreateReport {
    /// [`Caller`] filing the [`Report`].
    pub caller: Caller,

    /// ID of the reported [`Announcement`].
    pub announcement_id: announcement::Id,

    /// Contact [`user::Email`] of the reporter.
    pub email: user::Email,

    /// [`report::Content`] of the new [`Report`].
    pub content: report::Content,
}

impl<Db> Command<CreateReport> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Select<By<Option<Announcement>, announcement::Id>>,
            Ok = Option<Announcement>,
            Err = Traced<database::Error>,
        > + Database<Insert<Report>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Report;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: CreateReport) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateReport {
            caller,
            announcement_id,
            email,
            content,
        } = cmd;

        let (reporter_id, _) = caller
            .authorize_user(Operation::CreateReport)
            .map_err(tracerr::from_and_wrap!(=> E))?;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let announcement = tx
            .execute(Select(By::<Option<Announcement>, _>::new(announcement_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::AnnouncementNotExists(announcement_id))
            .map_err(tracerr::wrap!())?;
        if announcement.is_verified() {
            return Err(tracerr::new!(E::AnnouncementVerified(
                announcement_id
            )));
        }

        let report = Report {
            id: report::Id::new(),
            email,
            content,
            status: report::Status::Pending,
            announcement_id,
            reporter_id,
        };
        tx.execute(Insert(report.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        tracing::info!(
            report.id = %report.id,
            announcement.id = %announcement_id,
            "announcement reported",
        );

        Ok(report)
    }
}

/// Error of [`CreateReport`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Caller`] is not allowed to file [`Report`]s.
    #[display("Access denied: {_0}")]
    Access(access::Denial),

    /// Reported [`Announcement`] doesn't exist.
    #[display("There is no announcement with id you specified")]
    #[from(ignore)]
    AnnouncementNotExists(#[error(not(source))] announcement::Id),

    /// Reported [`Announcement`] is already verified.
    #[display("You can't report verified announcement")]
    #[from(ignore)]
    AnnouncementVerified(#[error(not(source))] announcement::Id),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),
}

#[cfg(test)]
mod spec {
    use crate::{
        access::Caller,
        domain::{announcement, report, user},
        fixture, Command as _,
    };

    use super::{CreateReport, ExecutionError};

    fn cmd(caller: Caller, announcement_id: announcement::Id) -> CreateReport {
        CreateReport {
            caller,
            announcement_id,
            email: user::Email::new("reporter@example.com").unwrap(),
            content: report::Content::new("Photos are fake").unwrap(),
        }
    }

    #[tokio::test]
    async fn files_pending_report() {
        let svc = fixture::service();
        let reporter = fixture::user(user::Role::Advertiser);
        let ad = fixture::announcement(user::Id::new(), fixture::real_estate().id);
        fixture::store(&svc, ad.clone()).await;

        let r = svc
            .execute(cmd(fixture::caller(&reporter), ad.id))
            .await
            .unwrap();

        assert_eq!(r.status, report::Status::Pending);
        assert_eq!(r.reporter_id, reporter.id);
        assert_eq!(svc.database().snapshot().await.reports.get(&r.id), Some(&r));
    }

    #[tokio::test]
    async fn refuses_verified_announcement() {
        let svc = fixture::service();
        let reporter = fixture::user(user::Role::Advertiser);
        let ad = announcement::Announcement {
            verification: announcement::Verification::Verified,
            ..fixture::announcement(user::Id::new(), fixture::real_estate().id)
        };
        fixture::store(&svc, ad.clone()).await;

        let err = svc
            .execute(cmd(fixture::caller(&reporter), ad.id))
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::AnnouncementVerified(_),
        ));
        assert_eq!(
            err.as_ref().to_string(),
            "You can't report verified announcement",
        );
    }

    #[tokio::test]
    async fn refuses_unknown_announcement() {
        let svc = fixture::service();
        let reporter = fixture::user(user::Role::Verifier);

        let err = svc
            .execute(cmd(fixture::caller(&reporter), announcement::Id::new()))
            .await
            .unwrap_err();

        assert_eq!(
            err.as_ref().to_string(),
            "There is no announcement with id you specified",
        );
    }
}
