//! [`Report`]-related definitions.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query,
    },
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use service::{
    access::{self, Operation},
    command::{self, Command as _},
    domain::{self, announcement, report, user},
    query,
    read,
};

use crate::{
    api::{self, field, Created, Pagination},
    define_error, AsError, Context, Error,
};

/// Builds the [`Router`] of [`Report`] endpoints.
pub(crate) fn router() -> Router {
    Router::new()
        .route("/", get(list).post(create).put(update))
        .route("/status/:status", get(by_status))
        .route("/author/:email", get(by_email))
        .route("/:id", get(by_id).delete(delete))
}

/// A complaint about an announcement.
#[derive(Clone, Debug, Serialize)]
pub struct Report {
    /// Unique identifier of this [`Report`].
    pub id: report::Id,

    /// Contact email of the reporter.
    pub email: String,

    /// Text of this [`Report`].
    pub content: String,

    /// Processing status of this [`Report`].
    pub status: String,

    /// ID of the reported announcement.
    pub announcement: announcement::Id,

    /// ID of the user filed this [`Report`].
    pub reporter: user::Id,
}

impl From<domain::Report> for Report {
    fn from(r: domain::Report) -> Self {
        Self {
            id: r.id,
            email: r.email.to_string(),
            content: r.content.into_inner(),
            status: r.status.to_string(),
            announcement: r.announcement_id,
            reporter: r.reporter_id,
        }
    }
}

/// [`Report`] details in a request.
#[derive(Clone, Debug, Deserialize)]
pub struct Input {
    /// ID of the updated [`Report`].
    pub id: Option<report::Id>,

    /// Contact email.
    pub email: String,

    /// Text of the [`Report`].
    pub content: String,

    /// Processing status, required on update only.
    pub status: Option<String>,

    /// ID of the reported announcement, required on creation only.
    pub announcement: Option<announcement::Id>,
}

#[tracing::instrument(skip_all)]
async fn create(
    ctx: Context,
    input: Result<Json<Input>, JsonRejection>,
) -> Result<Created<Report>, Error> {
    ctx.authorize(Operation::CreateReport)?;
    let Json(input) = input.map_err(AsError::into_error)?;
    let announcement_id = field("announcement", input.announcement)?;
    let email = field("email", user::Email::new(input.email))?;
    let content = field("content", report::Content::new(input.content))?;

    let report = ctx
        .service()
        .execute(command::CreateReport {
            caller: ctx.caller(),
            announcement_id,
            email,
            content,
        })
        .await
        .map_err(AsError::into_error)?;

    Ok(Created {
        location: format!("/api/reports/{}", report.id),
        body: report.into(),
    })
}

#[tracing::instrument(skip_all)]
async fn update(
    ctx: Context,
    input: Result<Json<Input>, JsonRejection>,
) -> Result<Json<Report>, Error> {
    ctx.authorize(Operation::UpdateReport)?;
    let Json(input) = input.map_err(AsError::into_error)?;
    let id = field("id", input.id)?;
    let email = field("email", user::Email::new(input.email))?;
    let content = field("content", report::Content::new(input.content))?;
    let status = field(
        "status",
        input.status.and_then(|s| s.parse::<report::Status>().ok()),
    )?;

    ctx.service()
        .execute(command::UpdateReport {
            caller: ctx.caller(),
            id,
            email,
            content,
            status,
        })
        .await
        .map_err(AsError::into_error)
        .map(|r| Json(r.into()))
}

#[tracing::instrument(skip_all)]
async fn delete(
    ctx: Context,
    id: Result<Path<report::Id>, PathRejection>,
) -> Result<Json<Report>, Error> {
    ctx.authorize(Operation::DeleteReport)?;
    let Path(id) = id.map_err(AsError::into_error)?;

    ctx.service()
        .execute(command::DeleteReport {
            caller: ctx.caller(),
            id,
        })
        .await
        .map_err(AsError::into_error)
        .map(|r| Json(r.into()))
}

#[tracing::instrument(skip_all)]
async fn by_id(
    ctx: Context,
    id: Result<Path<report::Id>, PathRejection>,
) -> Result<Json<Report>, Error> {
    ctx.authorize(Operation::ViewReport)?;
    let Path(id) = id.map_err(AsError::into_error)?;

    ctx.service()
        .execute(query::report::ById::by(id))
        .await
        .map_err(AsError::into_error)?
        .ok_or_else(|| ReportError::NotExists.into())
        .map(|r| Json(r.into()))
}

#[tracing::instrument(skip_all)]
async fn list(
    ctx: Context,
    pagination: Result<Query<Pagination>, QueryRejection>,
) -> Result<Json<api::Page<Report>>, Error> {
    ctx.authorize(Operation::ListReports)?;
    let Query(pagination) = pagination.map_err(AsError::into_error)?;

    select(&ctx, pagination, read::report::list::Filter::default()).await
}

#[tracing::instrument(skip_all)]
async fn by_status(
    ctx: Context,
    status: Result<Path<String>, PathRejection>,
    pagination: Result<Query<Pagination>, QueryRejection>,
) -> Result<Json<api::Page<Report>>, Error> {
    ctx.authorize(Operation::ListReportsByStatus)?;
    let Path(status) = status.map_err(AsError::into_error)?;
    let status = field("status", status.parse::<report::Status>().ok())?;
    let Query(pagination) = pagination.map_err(AsError::into_error)?;

    select(
        &ctx,
        pagination,
        read::report::list::Filter {
            status: Some(status),
            email: None,
        },
    )
    .await
}

#[tracing::instrument(skip_all)]
async fn by_email(
    ctx: Context,
    email: Result<Path<String>, PathRejection>,
    pagination: Result<Query<Pagination>, QueryRejection>,
) -> Result<Json<api::Page<Report>>, Error> {
    ctx.authorize(Operation::ListReportsByEmail)?;
    let Path(email) = email.map_err(AsError::into_error)?;
    let email = field("email", user::Email::new(email))?;
    let Query(pagination) = pagination.map_err(AsError::into_error)?;

    if !ctx.caller().is_admin() {
        let own = match ctx.caller().id() {
            Some(id) => ctx
                .service()
                .execute(query::user::ById::by(id))
                .await
                .map_err(AsError::into_error)?
                .map(|u| u.email),
            None => None,
        };
        if own.as_ref() != Some(&email) {
            return Err(access::Denial::Forbidden.into_error());
        }
    }

    select(
        &ctx,
        pagination,
        read::report::list::Filter {
            status: None,
            email: Some(email),
        },
    )
    .await
}

/// Selects a page of [`Report`]s matching the provided `filter`.
async fn select(
    ctx: &Context,
    pagination: Pagination,
    filter: read::report::list::Filter,
) -> Result<Json<api::Page<Report>>, Error> {
    ctx.service()
        .execute(query::report::List::by(read::report::list::Selector {
            arguments: pagination.arguments()?,
            filter,
        }))
        .await
        .map_err(AsError::into_error)
        .map(|p| Json(api::Page::from(p.map(Report::from))))
}

define_error! {
    enum ReportError {
        #[code = "NON_EXISTING_ENTITY"]
        #[number = 1]
        #[status = NOT_FOUND]
        #[message = "There is no report with specified id"]
        NotExists,

        #[code = "NON_EXISTING_ENTITY"]
        #[status = BAD_REQUEST]
        #[message = "There is no announcement with id you specified"]
        AnnouncementNotExists,

        #[code = "ANNOUNCEMENT_VERIFIED"]
        #[status = BAD_REQUEST]
        #[message = "You can't report verified announcement"]
        AnnouncementVerified,
    }
}

impl AsError for command::create_report::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Access(e) => e.try_as_error(),
            Self::AnnouncementNotExists(_) => {
                Some(ReportError::AnnouncementNotExists.into())
            }
            Self::AnnouncementVerified(_) => {
                Some(ReportError::AnnouncementVerified.into())
            }
            Self::Db(e) => e.try_as_error(),
        }
    }
}

impl AsError for command::update_report::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Access(e) => e.try_as_error(),
            Self::Db(e) => e.try_as_error(),
            Self::ReportNotExists(_) => Some(ReportError::NotExists.into()),
        }
    }
}

impl AsError for command::delete_report::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Access(e) => e.try_as_error(),
            Self::Db(e) => e.try_as_error(),
            Self::ReportNotExists(_) => Some(ReportError::NotExists.into()),
        }
    }
}

#[cfg(test)]
mod spec {
    use axum::Router;
    use serde_json::{json, Value};
    use service::domain::user;

    use crate::api::spec;

    async fn announce(app: &Router, token: &str) -> String {
        let (status, _, body) = spec::send(
            app.clone(),
            http::Method::POST,
            "/api/announcements",
            Some(token),
            Some(json!({
                "price": 5000,
                "expirationDate": "2999-01-01",
                "phoneNumber": "0641234567",
                "type": "sale",
                "realEstate": {
                    "name": "House",
                    "type": "house",
                    "area": 120,
                    "heatingType": "wood",
                    "deleted": false,
                },
            })),
        )
        .await;
        assert_eq!(status, http::StatusCode::CREATED, "body: {body}");
        body["id"].as_str().unwrap().to_owned()
    }

    fn report(announcement: &str, email: &str) -> Value {
        json!({
            "email": email,
            "content": "Looks like a scam",
            "announcement": announcement,
        })
    }

    #[tokio::test]
    async fn files_report_on_unverified_announcement() {
        let (app, svc) = spec::app();
        let (_, advertiser) =
            spec::login(&svc, user::Role::Advertiser, None).await;
        let (reporter, token) =
            spec::login(&svc, user::Role::Verifier, None).await;
        let announcement = announce(&app, &advertiser).await;

        let (status, headers, body) = spec::send(
            app,
            http::Method::POST,
            "/api/reports",
            Some(&token),
            Some(report(&announcement, "watcher@example.com")),
        )
        .await;

        assert_eq!(status, http::StatusCode::CREATED);
        assert_eq!(
            headers[http::header::LOCATION],
            format!("/api/reports/{}", body["id"].as_str().unwrap()),
        );
        assert_eq!(body["status"], "pending");
        assert_eq!(body["reporter"], reporter.id.to_string());
    }

    #[tokio::test]
    async fn rejects_report_on_verified_announcement() {
        let (app, svc) = spec::app();
        let (_, advertiser) =
            spec::login(&svc, user::Role::Advertiser, None).await;
        let (_, verifier) = spec::login(&svc, user::Role::Verifier, None).await;
        let announcement = announce(&app, &advertiser).await;
        let (status, _, _) = spec::send(
            app.clone(),
            http::Method::PUT,
            &format!("/api/announcements/{announcement}/verify"),
            Some(&verifier),
            None,
        )
        .await;
        assert_eq!(status, http::StatusCode::OK);

        let (status, _, body) = spec::send(
            app.clone(),
            http::Method::POST,
            "/api/reports",
            Some(&verifier),
            Some(report(&announcement, "watcher@example.com")),
        )
        .await;
        assert_eq!(status, http::StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "You can't report verified announcement");

        let (status, _, body) = spec::send(
            app,
            http::Method::POST,
            "/api/reports",
            Some(&verifier),
            Some(report(
                &uuid::Uuid::new_v4().to_string(),
                "watcher@example.com",
            )),
        )
        .await;
        assert_eq!(status, http::StatusCode::BAD_REQUEST);
        assert_eq!(
            body["message"],
            "There is no announcement with id you specified",
        );
    }

    #[tokio::test]
    async fn lists_reports_by_own_email_only() {
        let (app, svc) = spec::app();
        let (advertiser, token) =
            spec::login(&svc, user::Role::Advertiser, None).await;
        let (_, admin) = spec::login(&svc, user::Role::Admin, None).await;
        let announcement = announce(&app, &token).await;
        let own = advertiser.email.to_string();
        let (status, _, _) = spec::send(
            app.clone(),
            http::Method::POST,
            "/api/reports",
            Some(&token),
            Some(report(&announcement, &own)),
        )
        .await;
        assert_eq!(status, http::StatusCode::CREATED);

        let (status, _, body) = spec::send(
            app.clone(),
            http::Method::GET,
            &format!("/api/reports/author/{own}"),
            Some(&token),
            None,
        )
        .await;
        assert_eq!(status, http::StatusCode::OK);
        assert_eq!(body["totalElements"], 1);

        let (status, _, _) = spec::send(
            app.clone(),
            http::Method::GET,
            "/api/reports/author/someone@example.com",
            Some(&token),
            None,
        )
        .await;
        assert_eq!(status, http::StatusCode::FORBIDDEN);

        let (status, _, body) = spec::send(
            app,
            http::Method::GET,
            "/api/reports/author/someone@example.com",
            Some(&admin),
            None,
        )
        .await;
        assert_eq!(status, http::StatusCode::OK);
        assert_eq!(body["totalElements"], 0);
    }

    #[tokio::test]
    async fn admin_resolves_report() {
        let (app, svc) = spec::app();
        let (_, advertiser) =
            spec::login(&svc, user::Role::Advertiser, None).await;
        let (_, admin) = spec::login(&svc, user::Role::Admin, None).await;
        let announcement = announce(&app, &advertiser).await;
        let (_, _, created) = spec::send(
            app.clone(),
            http::Method::POST,
            "/api/reports",
            Some(&advertiser),
            Some(report(&announcement, "watcher@example.com")),
        )
        .await;
        let mut update = report(&announcement, "watcher@example.com");
        update["id"] = created["id"].clone();
        update["status"] = json!("accepted");

        let (status, _, _) = spec::send(
            app.clone(),
            http::Method::PUT,
            "/api/reports",
            Some(&advertiser),
            Some(update.clone()),
        )
        .await;
        assert_eq!(status, http::StatusCode::FORBIDDEN);

        let (status, _, body) = spec::send(
            app.clone(),
            http::Method::PUT,
            "/api/reports",
            Some(&admin),
            Some(update),
        )
        .await;
        assert_eq!(status, http::StatusCode::OK);
        assert_eq!(body["status"], "accepted");

        let (status, _, body) = spec::send(
            app,
            http::Method::GET,
            "/api/reports/status/accepted",
            Some(&admin),
            None,
        )
        .await;
        assert_eq!(status, http::StatusCode::OK);
        assert_eq!(body["content"][0]["id"], created["id"]);
    }
}
