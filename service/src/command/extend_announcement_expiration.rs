//! [`Command`] for extending an [`Announcement`] expiration.

use common::{
    operations::{By, Commit, Lock, Select, Transact, Transacted, Update},
    Date,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    access::{self, Caller, Operation},
    domain::{announcement, Announcement},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for moving an [`Announcement`] expiration [`Date`].
///
/// The modification date of the [`Announcement`] is left untouched.
#[derive(Clone, Copy, Debug)]
pub struct ExtendAnnouncementExpiration {
    /// [`Caller`] extending the [`Announcement`].
    pub caller: Caller,

    /// ID of the [`Announcement`] to extend.
    pub announcement_id: announcement::Id,

    /// New expiration [`Date`] of the [`Announcement`].
    pub expiration_date: Date,
}

impl<Db> Command<ExtendAnnouncementExpiration> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Lock<By<Announcement, announcement::Id>>,
            Ok = (),
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Announcement>, announcement::Id>>,
            Ok = Option<Announcement>,
            Err = Traced<database::Error>,
        > + Database<
            Update<Announcement>,
            Ok = (),
            Err = Traced<database::Error>,
        > + Database<Commit, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = Announcement;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: ExtendAnnouncementExpiration,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let ExtendAnnouncementExpiration {
            caller,
            announcement_id,
            expiration_date,
        } = cmd;

        caller
            .authorize(Operation::ExtendAnnouncementExpiration)
            .map_err(tracerr::from_and_wrap!(=> E))?;

        if expiration_date <= Date::today() {
            return Err(tracerr::new!(E::NotInFuture(expiration_date)));
        }

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Lock(By::new(announcement_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let mut announcement = tx
            .execute(Select(By::<Option<Announcement>, _>::new(
                announcement_id,
            )))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::AnnouncementNotExists(announcement_id))
            .map_err(tracerr::wrap!())?;
        if announcement.expiration_date == expiration_date {
            return Ok(announcement);
        }

        announcement.expiration_date = expiration_date;
        tx.execute(Update(announcement.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(announcement)
    }
}

/// Error of [`ExtendAnnouncementExpiration`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Caller`] is not allowed to extend [`Announcement`]s.
    #[display("Access denied: {_0}")]
    Access(access::Denial),

    /// [`Announcement`] doesn't exist.
    #[display("`Announcement(id: {_0})` does not exist")]
    #[from(ignore)]
    AnnouncementNotExists(#[error(not(source))] announcement::Id),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// New expiration [`Date`] is not after today.
    #[display("Expiration date `{_0}` is not after today")]
    #[from(ignore)]
    NotInFuture(#[error(not(source))] Date),
}

#[cfg(test)]
mod spec {
    use common::Date;

    use crate::{
        access::{Caller, Denial},
        domain::{announcement, user},
        fixture, Command as _,
    };

    use super::{ExecutionError, ExtendAnnouncementExpiration};

    #[tokio::test]
    async fn moves_expiration_date_only() {
        let svc = fixture::service();
        let author = fixture::user(user::Role::Advertiser);
        let a = fixture::announcement(author.id, fixture::real_estate().id);
        fixture::store(&svc, a.clone()).await;
        let date = Date::parse_dmy("4/12/3017").unwrap();

        let out = svc
            .execute(ExtendAnnouncementExpiration {
                caller: fixture::caller(&author),
                announcement_id: a.id,
                expiration_date: date,
            })
            .await
            .unwrap();

        assert_eq!(out.expiration_date, Date::from_calendar(3017, 12, 4).unwrap());
        assert_eq!(out.modified_at, None);
        assert_eq!(
            announcement::Announcement {
                expiration_date: a.expiration_date,
                ..out
            },
            a,
        );
    }

    #[tokio::test]
    async fn rejects_today_and_past_dates() {
        let svc = fixture::service();
        let author = fixture::user(user::Role::Advertiser);
        let a = fixture::announcement(author.id, fixture::real_estate().id);
        fixture::store(&svc, a.clone()).await;

        for date in [Date::today(), Date::parse_dmy("4/12/2017").unwrap()] {
            let err = svc
                .execute(ExtendAnnouncementExpiration {
                    caller: fixture::caller(&author),
                    announcement_id: a.id,
                    expiration_date: date,
                })
                .await
                .unwrap_err();

            assert!(matches!(err.as_ref(), ExecutionError::NotInFuture(_)));
        }
    }

    #[tokio::test]
    async fn date_is_checked_before_existence() {
        let svc = fixture::service();
        let author = fixture::user(user::Role::Advertiser);

        let err = svc
            .execute(ExtendAnnouncementExpiration {
                caller: fixture::caller(&author),
                announcement_id: announcement::Id::new(),
                expiration_date: Date::parse_dmy("4/12/2017").unwrap(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err.as_ref(), ExecutionError::NotInFuture(_)));

        let err = svc
            .execute(ExtendAnnouncementExpiration {
                caller: fixture::caller(&author),
                announcement_id: announcement::Id::new(),
                expiration_date: Date::from_calendar(3017, 1, 1).unwrap(),
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err.as_ref(),
            ExecutionError::AnnouncementNotExists(_),
        ));
    }

    #[tokio::test]
    async fn only_advertiser_extends() {
        let svc = fixture::service();
        let verifier = fixture::user(user::Role::Verifier);

        let err = svc
            .execute(ExtendAnnouncementExpiration {
                caller: Caller::Guest,
                announcement_id: announcement::Id::new(),
                expiration_date: Date::from_calendar(3017, 1, 1).unwrap(),
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err.as_ref(),
            ExecutionError::Access(Denial::Unauthenticated),
        ));

        let err = svc
            .execute(ExtendAnnouncementExpiration {
                caller: fixture::caller(&verifier),
                announcement_id: announcement::Id::new(),
                expiration_date: Date::from_calendar(3017, 1, 1).unwrap(),
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err.as_ref(),
            ExecutionError::Access(Denial::Forbidden),
        ));
    }
}
