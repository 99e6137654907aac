//! [`Comment`]-related definitions.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query,
    },
    routing::get,
    Json, Router,
};
use common::DateTime;
use serde::{Deserialize, Serialize};
use service::{
    access::Operation,
    command::{self, Command as _},
    domain::{self, announcement, comment, user},
    query,
    read,
};

use crate::{
    api::{self, field, Created, Pagination},
    define_error, AsError, Context, Error,
};

/// Builds the [`Router`] of [`Comment`] endpoints.
pub(crate) fn router() -> Router {
    Router::new()
        .route("/", get(list).post(create).put(update))
        .route("/announcement/:announcement_id", get(by_announcement))
        .route("/:id", get(by_id).delete(delete))
}

/// A comment left on an announcement.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    /// Unique identifier of this [`Comment`].
    pub id: comment::Id,

    /// Text of this [`Comment`].
    pub content: String,

    /// [`DateTime`] when this [`Comment`] was posted.
    #[serde(with = "common::datetime::serde::rfc3339")]
    pub date: DateTime,

    /// ID of the commented announcement.
    pub announcement: announcement::Id,

    /// ID of the author.
    pub author: user::Id,
}

impl From<domain::Comment> for Comment {
    fn from(c: domain::Comment) -> Self {
        Self {
            id: c.id,
            content: c.content.into_inner(),
            date: c.date.coerce(),
            announcement: c.announcement_id,
            author: c.author_id,
        }
    }
}

/// [`Comment`] details in a request.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Input {
    /// ID of the updated [`Comment`].
    pub id: Option<comment::Id>,

    /// Text of the [`Comment`].
    pub content: String,

    /// [`DateTime`] of posting, now if omitted.
    #[serde(default, with = "common::datetime::serde::rfc3339::option")]
    pub date: Option<DateTime>,

    /// ID of the commented announcement.
    pub announcement: Option<announcement::Id>,
}

#[tracing::instrument(skip_all)]
async fn create(
    ctx: Context,
    input: Result<Json<Input>, JsonRejection>,
) -> Result<Created<Comment>, Error> {
    ctx.authorize(Operation::CreateComment)?;
    let Json(input) = input.map_err(AsError::into_error)?;
    let announcement_id = field("announcement", input.announcement)?;
    let content = field("content", comment::Content::new(input.content))?;

    let comment = ctx
        .service()
        .execute(command::CreateComment {
            caller: ctx.caller(),
            announcement_id,
            content,
            date: input.date.map(DateTime::coerce),
        })
        .await
        .map_err(AsError::into_error)?;

    Ok(Created {
        location: format!("/api/comments/{}", comment.id),
        body: comment.into(),
    })
}

#[tracing::instrument(skip_all)]
async fn update(
    ctx: Context,
    input: Result<Json<Input>, JsonRejection>,
) -> Result<Json<Comment>, Error> {
    ctx.authorize(Operation::UpdateComment)?;
    let Json(input) = input.map_err(AsError::into_error)?;
    let id = field("id", input.id)?;
    let content = field("content", comment::Content::new(input.content))?;

    ctx.service()
        .execute(command::UpdateComment {
            caller: ctx.caller(),
            id,
            content,
        })
        .await
        .map_err(AsError::into_error)
        .map(|c| Json(c.into()))
}

#[tracing::instrument(skip_all)]
async fn delete(
    ctx: Context,
    id: Result<Path<comment::Id>, PathRejection>,
) -> Result<Json<Comment>, Error> {
    ctx.authorize(Operation::DeleteComment)?;
    let Path(id) = id.map_err(AsError::into_error)?;

    ctx.service()
        .execute(command::DeleteComment {
            caller: ctx.caller(),
            id,
        })
        .await
        .map_err(AsError::into_error)
        .map(|c| Json(c.into()))
}

#[tracing::instrument(skip_all)]
async fn by_id(
    ctx: Context,
    id: Result<Path<comment::Id>, PathRejection>,
) -> Result<Json<Comment>, Error> {
    ctx.authorize(Operation::ViewComment)?;
    let Path(id) = id.map_err(AsError::into_error)?;

    ctx.service()
        .execute(query::comment::ById::by(id))
        .await
        .map_err(AsError::into_error)?
        .ok_or_else(|| CommentError::NotExists.into())
        .map(|c| Json(c.into()))
}

#[tracing::instrument(skip_all)]
async fn list(
    ctx: Context,
    pagination: Result<Query<Pagination>, QueryRejection>,
) -> Result<Json<api::Page<Comment>>, Error> {
    ctx.authorize(Operation::ListComments)?;
    let Query(pagination) = pagination.map_err(AsError::into_error)?;

    select(&ctx, pagination, None).await
}

#[tracing::instrument(skip_all)]
async fn by_announcement(
    ctx: Context,
    announcement_id: Result<Path<announcement::Id>, PathRejection>,
    pagination: Result<Query<Pagination>, QueryRejection>,
) -> Result<Json<api::Page<Comment>>, Error> {
    ctx.authorize(Operation::ListAnnouncementComments)?;
    let Path(announcement_id) =
        announcement_id.map_err(AsError::into_error)?;
    let Query(pagination) = pagination.map_err(AsError::into_error)?;

    select(&ctx, pagination, Some(announcement_id)).await
}

/// Selects a page of [`Comment`]s, optionally of a single announcement.
async fn select(
    ctx: &Context,
    pagination: Pagination,
    announcement_id: Option<announcement::Id>,
) -> Result<Json<api::Page<Comment>>, Error> {
    ctx.service()
        .execute(query::comment::List::by(read::comment::list::Selector {
            arguments: pagination.arguments()?,
            filter: read::comment::list::Filter { announcement_id },
        }))
        .await
        .map_err(AsError::into_error)
        .map(|p| Json(api::Page::from(p.map(Comment::from))))
}

define_error! {
    enum CommentError {
        #[code = "NON_EXISTING_ENTITY"]
        #[number = 1]
        #[status = NOT_FOUND]
        #[message = "There is no comment with specified id"]
        NotExists,

        #[code = "NON_EXISTING_ENTITY"]
        #[number = 1]
        #[status = NOT_FOUND]
        #[message = "There is no announcement with specified id"]
        AnnouncementNotExists,

        #[code = "NOT_AUTHOR"]
        #[status = FORBIDDEN]
        #[message = "Only the author may change the comment"]
        NotAuthor,
    }
}

impl AsError for command::create_comment::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Access(e) => e.try_as_error(),
            Self::AnnouncementNotExists(_) => {
                Some(CommentError::AnnouncementNotExists.into())
            }
            Self::Db(e) => e.try_as_error(),
        }
    }
}

impl AsError for command::update_comment::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Access(e) => e.try_as_error(),
            Self::CommentNotExists(_) => Some(CommentError::NotExists.into()),
            Self::Db(e) => e.try_as_error(),
            Self::NotAuthor(_) => Some(CommentError::NotAuthor.into()),
        }
    }
}

impl AsError for command::delete_comment::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Access(e) => e.try_as_error(),
            Self::CommentNotExists(_) => Some(CommentError::NotExists.into()),
            Self::Db(e) => e.try_as_error(),
            Self::NotAuthor(_) => Some(CommentError::NotAuthor.into()),
        }
    }
}

#[cfg(test)]
mod spec {
    use axum::Router;
    use serde_json::{json, Value};
    use service::domain::user;

    use crate::{api::spec, ERROR_CODE_HEADER};

    async fn announce(app: &Router, token: &str) -> String {
        let (status, _, body) = spec::send(
            app.clone(),
            http::Method::POST,
            "/api/announcements",
            Some(token),
            Some(json!({
                "price": 1000,
                "expirationDate": "2999-01-01",
                "phoneNumber": "0641234567",
                "type": "rent",
                "realEstate": {
                    "name": "Studio",
                    "type": "flat",
                    "area": 25,
                    "heatingType": "gas",
                    "deleted": false,
                },
            })),
        )
        .await;
        assert_eq!(status, http::StatusCode::CREATED, "body: {body}");
        body["id"].as_str().unwrap().to_owned()
    }

    async fn comment(app: &Router, token: &str, announcement: &str) -> Value {
        let (status, _, body) = spec::send(
            app.clone(),
            http::Method::POST,
            "/api/comments",
            Some(token),
            Some(json!({"content": "Nice one", "announcement": announcement})),
        )
        .await;
        assert_eq!(status, http::StatusCode::CREATED, "body: {body}");
        body
    }

    #[tokio::test]
    async fn lists_comments_of_announcement() {
        let (app, svc) = spec::app();
        let (author, token) =
            spec::login(&svc, user::Role::Advertiser, None).await;
        let announcement = announce(&app, &token).await;
        let created = comment(&app, &token, &announcement).await;
        assert_eq!(created["author"], author.id.to_string());

        let (status, _, body) = spec::send(
            app,
            http::Method::GET,
            &format!("/api/comments/announcement/{announcement}"),
            None,
            None,
        )
        .await;

        assert_eq!(status, http::StatusCode::OK);
        assert_eq!(body["totalElements"], 1);
        assert_eq!(body["content"][0], created);
    }

    #[tokio::test]
    async fn only_author_or_admin_updates_comment() {
        let (app, svc) = spec::app();
        let (_, author) = spec::login(&svc, user::Role::Advertiser, None).await;
        let (_, stranger) = spec::login(&svc, user::Role::Verifier, None).await;
        let (_, admin) = spec::login(&svc, user::Role::Admin, None).await;
        let announcement = announce(&app, &author).await;
        let created = comment(&app, &author, &announcement).await;
        let update = json!({"id": created["id"], "content": "Changed"});

        let (status, _, _) = spec::send(
            app.clone(),
            http::Method::PUT,
            "/api/comments",
            Some(&stranger),
            Some(update.clone()),
        )
        .await;
        assert_eq!(status, http::StatusCode::FORBIDDEN);

        let (status, _, body) = spec::send(
            app,
            http::Method::PUT,
            "/api/comments",
            Some(&admin),
            Some(update),
        )
        .await;
        assert_eq!(status, http::StatusCode::OK);
        assert_eq!(body["content"], "Changed");
    }

    #[tokio::test]
    async fn deleting_unknown_comment_is_not_found() {
        let (app, svc) = spec::app();
        let (_, token) = spec::login(&svc, user::Role::Admin, None).await;

        let (status, headers, _) = spec::send(
            app,
            http::Method::DELETE,
            &format!("/api/comments/{}", uuid::Uuid::new_v4()),
            Some(&token),
            None,
        )
        .await;

        assert_eq!(status, http::StatusCode::NOT_FOUND);
        assert_eq!(headers[ERROR_CODE_HEADER], "1");
    }
}
