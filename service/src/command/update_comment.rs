//! [`Command`] for editing a [`Comment`].

use common::operations::{
    By, Commit, Lock, Select, Transact, Transacted, Update,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::User;
use crate::{
    access::{self, Caller, Operation},
    domain::{comment, user, Comment},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for editing the [`comment::Content`] of a [`Comment`].
///
/// Only the author of the [`Comment`] or an administrator may edit it.
#[derive(Clone, Debug)]
pub struct UpdateComment {
    /// [`Caller`] editing the [`Comment`].
    pub caller: Caller,

    /// ID of the [`Comment`] to edit.
    pub id: comment::Id,

    /// New [`comment::Content`] of the [`Comment`].
    pub content: comment::Content,
}

impl<Db> Command<UpdateComment> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Lock<By<Comment, comment::Id>>,
            Ok = (),
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Comment>, comment::Id>>,
            Ok = Option<Comment>,
            Err = Traced<database::Error>,
        > + Database<Update<Comment>, Ok = (), Err = Traced<database::Error>>
        + Database<Commit, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = Comment;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: UpdateComment) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let UpdateComment {
            caller,
            id,
            content,
        } = cmd;

        let (editor_id, role) = caller
            .authorize_user(Operation::UpdateComment)
            .map_err(tracerr::from_and_wrap!(=> E))?;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Lock(By::new(id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let mut comment = tx
            .execute(Select(By::<Option<Comment>, _>::new(id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::CommentNotExists(id))
            .map_err(tracerr::wrap!())?;

        if comment.author_id != editor_id && role != user::Role::Admin {
            return Err(tracerr::new!(E::NotAuthor(id)));
        }

        comment.content = content;
        tx.execute(Update(comment.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(comment)
    }
}

/// Error of [`UpdateComment`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Caller`] is not allowed to edit [`Comment`]s.
    #[display("Access denied: {_0}")]
    Access(access::Denial),

    /// [`Comment`] doesn't exist.
    #[display("`Comment(id: {_0})` does not exist")]
    #[from(ignore)]
    CommentNotExists(#[error(not(source))] comment::Id),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Caller`] is neither the author of the [`Comment`] nor an
    /// administrator.
    #[display("`User` is not the author of `Comment(id: {_0})`")]
    #[from(ignore)]
    NotAuthor(#[error(not(source))] comment::Id),
}
