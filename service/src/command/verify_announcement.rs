//! [`Command`] for verifying an [`Announcement`].

use common::operations::{
    By, Commit, Lock, Select, Transact, Transacted, Update,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    access::{self, Caller, Operation},
    domain::{announcement, user, Announcement, User},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for verifying an [`Announcement`].
///
/// Verifying an already verified [`Announcement`] changes nothing.
#[derive(Clone, Copy, Debug)]
pub struct VerifyAnnouncement {
    /// [`Caller`] verifying the [`Announcement`].
    pub caller: Caller,

    /// ID of the [`Announcement`] to verify.
    pub announcement_id: announcement::Id,
}

impl<Db> Command<VerifyAnnouncement> for Service<Db>
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
            Select<By<Option<User>, user::Id>>,
            Ok = Option<User>,
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
        cmd: VerifyAnnouncement,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let VerifyAnnouncement {
            caller,
            announcement_id,
        } = cmd;

        let (verifier_id, _) = caller
            .authorize_user(Operation::VerifyAnnouncement)
            .map_err(tracerr::from_and_wrap!(=> E))?;

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

        let verifier = tx
            .execute(Select(By::<Option<User>, _>::new(verifier_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        let is_verifier = verifier.is_some_and(|u| {
            u.role == user::Role::Verifier && u.id != announcement.author_id
        });
        if !is_verifier {
            return Err(tracerr::new!(E::NotVerifier(verifier_id)));
        }

        if announcement.is_verified() {
            return Ok(announcement);
        }

        announcement.verification = announcement::Verification::Verified;
        tx.execute(Update(announcement.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tracing::info!(
            announcement.id = %announcement.id,
            verifier.id = %verifier_id,
            "announcement verified",
        );

        Ok(announcement)
    }
}

/// Error of [`VerifyAnnouncement`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Caller`] is not allowed to verify [`Announcement`]s.
    #[display("Access denied: {_0}")]
    Access(access::Denial),

    /// [`Announcement`] doesn't exist.
    #[display("`Announcement(id: {_0})` does not exist")]
    #[from(ignore)]
    AnnouncementNotExists(#[error(not(source))] announcement::Id),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`User`] is not a verifier, or is the author of the [`Announcement`].
    #[display("`User(id: {_0})` cannot verify the `Announcement`")]
    #[from(ignore)]
    NotVerifier(#[error(not(source))] user::Id),
}
