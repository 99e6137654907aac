//! [`Command`] for deleting a [`Comment`].

use common::operations::{By, Commit, Delete, Lock, Select, Transact, Transacted};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    access::{self, Caller, Operation},
    domain::{comment, user, Comment},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for deleting a [`Comment`].
///
/// Only the author of the [`Comment`] or an administrator may delete it.
#[derive(Clone, Copy, Debug)]
pub struct DeleteComment {
    /// [`Caller`] deleting the [`Comment`].
    pub caller: Caller,

    /// ID of the [`Comment`] to delete.
    pub id: comment::Id,
}

impl<Db> Command<DeleteComment> for Service<Db>
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
        > + Database<
            Delete<By<Comment, comment::Id>>,
            Ok = (),
            Err = Traced<database::Error>,
        > + Database<Commit, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = Comment;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: DeleteComment) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let DeleteComment { caller, id } = cmd;

        let (user_id, role) = caller
            .authorize_user(Operation::DeleteComment)
            .map_err(tracerr::from_and_wrap!(=> E))?;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Lock(By::<Comment, _>::new(id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let comment = tx
            .execute(Select(By::<Option<Comment>, _>::new(id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::CommentNotExists(id))
            .map_err(tracerr::wrap!())?;

        if comment.author_id != user_id && role != user::Role::Admin {
            return Err(tracerr::new!(E::NotAuthor(id)));
        }

        tx.execute(Delete(By::<Comment, _>::new(id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(comment)
    }
}

/// Error of [`DeleteComment`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Caller`] is not allowed to delete [`Comment`]s.
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

#[cfg(test)]
mod spec {
    use common::DateTime;

    use crate::{
        domain::{announcement, comment, user, Comment},
        fixture, Command as _,
    };

    use super::{DeleteComment, ExecutionError};

    #[tokio::test]
    async fn only_author_deletes() {
        let svc = fixture::service();
        let author = fixture::user(user::Role::Advertiser);
        let stranger = fixture::user(user::Role::Advertiser);
        let c = Comment {
            id: comment::Id::new(),
            content: comment::Content::new("Nice view").unwrap(),
            date: DateTime::now().coerce(),
            announcement_id: announcement::Id::new(),
            author_id: author.id,
        };
        fixture::store(&svc, c.clone()).await;

        let err = svc
            .execute(DeleteComment {
                caller: fixture::caller(&stranger),
                id: c.id,
            })
            .await
            .unwrap_err();
        assert!(matches!(err.as_ref(), ExecutionError::NotAuthor(_)));

        let removed = svc
            .execute(DeleteComment {
                caller: fixture::caller(&author),
                id: c.id,
            })
            .await
            .unwrap();
        assert_eq!(removed, c);
        assert!(svc.database().snapshot().await.comments.is_empty());
    }

    #[tokio::test]
    async fn fails_on_unknown_comment() {
        let svc = fixture::service();
        let admin = fixture::user(user::Role::Admin);

        let err = svc
            .execute(DeleteComment {
                caller: fixture::caller(&admin),
                id: comment::Id::new(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::CommentNotExists(_)));
    }
}
