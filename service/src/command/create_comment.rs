//! [`Command`] for commenting an [`Announcement`].

use common::{
    operations::{By, Commit, Insert, Select, Transact, Transacted},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    access::{self, Caller, Operation},
    domain::{announcement, comment, Announcement, Comment},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for leaving a new [`Comment`] on an [`Announcement`].
#[derive(Clone, Debug)]
pub struct CreateComment {
    /// [`Caller`] authoring the [`Comment`].
    pub caller: Caller,

    /// ID of the [`Announcement`] to comment.
    pub announcement_id: announcement::Id,

    /// [`comment::Content`] of the new [`Comment`].
    pub content: comment::Content,

    /// [`DateTime`] the [`Comment`] is posted at.
    ///
    /// Defaults to [`DateTime::now()`].
    pub date: Option<comment::CreationDateTime>,
}

impl<Db> Command<CreateComment> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Select<By<Option<Announcement>, announcement::Id>>,
            Ok = Option<Announcement>,
            Err = Traced<database::Error>,
        > + Database<Insert<Comment>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Comment;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: CreateComment) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateComment {
            caller,
            announcement_id,
            content,
            date,
        } = cmd;

        let (author_id, _) = caller
            .authorize_user(Operation::CreateComment)
            .map_err(tracerr::from_and_wrap!(=> E))?;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        _ = tx
            .execute(Select(By::<Option<Announcement>, _>::new(announcement_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::AnnouncementNotExists(announcement_id))
            .map_err(tracerr::wrap!())?;

        let comment = Comment {
            id: comment::Id::new(),
            content,
            date: date.unwrap_or_else(|| DateTime::now().coerce()),
            announcement_id,
            author_id,
        };
        tx.execute(Insert(comment.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(comment)
    }
}

/// Error of [`CreateComment`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Caller`] is not allowed to comment.
    #[display("Access denied: {_0}")]
    Access(access::Denial),

    /// [`Announcement`] doesn't exist.
    #[display("`Announcement(id: {_0})` does not exist")]
    #[from(ignore)]
    AnnouncementNotExists(#[error(not(source))] announcement::Id),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),
}
