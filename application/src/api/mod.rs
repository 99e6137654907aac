//! REST API definitions.

pub mod announcement;
pub mod comment;
pub mod company;
pub mod real_estate;
pub mod report;
pub mod user;

use axum::{
    response::{IntoResponse, Response},
    Json, Router,
};
use common::pagination;
use serde::{Deserialize, Serialize};

use crate::Error;

/// Builds the [`Router`] of the whole REST API.
#[must_use]
pub fn router() -> Router {
    Router::new().nest(
        "/api",
        Router::new()
            .nest("/announcements", announcement::router())
            .nest("/comments", comment::router())
            .nest("/companies", company::router())
            .nest("/real-estates", real_estate::router())
            .nest("/reports", report::router())
            .nest("/sessions", user::session::router())
            .nest("/users", user::router()),
    )
}

/// Query parameters selecting a [`pagination::Page`].
#[derive(Clone, Copy, Debug, Default, Deserialize)]
pub struct Pagination {
    /// Zero-based number of the requested page.
    pub page: Option<usize>,

    /// Number of items on the requested page.
    pub size: Option<usize>,
}

impl Pagination {
    /// Converts this [`Pagination`] into [`pagination::Arguments`].
    ///
    /// # Errors
    ///
    /// If the requested page size is out of the allowed range.
    pub fn arguments(self) -> Result<pagination::Arguments, Error> {
        pagination::Arguments::new(self.page, self.size).ok_or_else(|| {
            Error::invalid_field(
                "size",
                &format!(
                    "Page size must be between 1 and {}",
                    pagination::MAX_SIZE,
                ),
            )
        })
    }
}

/// Single page of a paginated list in a response.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    /// Items on this [`Page`].
    pub content: Vec<T>,

    /// Zero-based number of this [`Page`].
    pub page: usize,

    /// Requested size of this [`Page`].
    pub size: usize,

    /// Total number of items in the whole list.
    pub total_elements: usize,

    /// Total number of pages in the whole list.
    pub total_pages: usize,
}

impl<T> From<pagination::Page<T>> for Page<T> {
    fn from(page: pagination::Page<T>) -> Self {
        let total_pages = page.total_pages();
        let pagination::Page {
            items,
            arguments,
            total,
        } = page;
        Self {
            content: items,
            page: arguments.number,
            size: arguments.size,
            total_elements: total,
            total_pages,
        }
    }
}

/// Response with a newly created resource.
#[derive(Clone, Debug)]
pub struct Created<T> {
    /// Path the created resource is available at.
    pub location: String,

    /// Representation of the created resource.
    pub body: T,
}

impl<T: Serialize> IntoResponse for Created<T> {
    fn into_response(self) -> Response {
        (
            http::StatusCode::CREATED,
            [(http::header::LOCATION, self.location)],
            Json(self.body),
        )
            .into_response()
    }
}

/// Unwraps the provided parsed request `field`, failing with a validation
/// [`Error`] if it's invalid.
///
/// # Errors
///
/// If the `value` is [`None`].
pub fn field<T>(name: &'static str, value: Option<T>) -> Result<T, Error> {
    value.ok_or_else(|| {
        Error::invalid_field(name, &format!("`{name}` has invalid value"))
    })
}

#[cfg(test)]
pub(crate) mod spec {
    //! Helpers for testing the REST API.

    use std::path::PathBuf;

    use axum::{
        body::{to_bytes, Body},
        Extension, Router,
    };
    use serde_json::Value;
    use service::{
        command::{self, Command as _},
        domain::{user, User},
        infra::{Database as _, Memory},
    };
    use tower::ServiceExt as _;

    use crate::{upload::Uploads, Service};

    /// Builds a [`Router`] over an empty [`Memory`] database.
    pub(crate) fn app() -> (Router, Service) {
        app_storing_into(std::env::temp_dir())
    }

    /// Builds a [`Router`] over an empty [`Memory`] database, storing
    /// uploaded files into the provided `dir`.
    pub(crate) fn app_storing_into(
        dir: impl Into<PathBuf>,
    ) -> (Router, Service) {
        let service = Service::new(service::Config::default(), Memory::new());
        let router = super::router()
            .layer(Extension(Uploads::new(dir)))
            .layer(Extension(service.clone()));
        (router, service)
    }

    /// Stores a new [`User`] with the provided [`user::Role`] and returns
    /// it along with its session token.
    pub(crate) async fn login(
        service: &Service,
        role: user::Role,
        company: Option<(service::domain::company::Id, user::Membership)>,
    ) -> (User, String) {
        let id = user::Id::new();
        let (company_id, membership) = company
            .map_or((None, user::Membership::NotRequested), |(c, m)| {
                (Some(c), m)
            });
        let user = User {
            id,
            username: user::Username::new(format!("user-{id}")).unwrap(),
            email: user::Email::new(format!("{id}@example.com")).unwrap(),
            password_hash: user::PasswordHash::new(&"password".into()),
            role,
            company_id,
            membership,
            created_at: common::DateTime::now().coerce(),
        };
        service
            .database()
            .execute(common::operations::Insert(user.clone()))
            .await
            .unwrap();
        let output = service
            .execute(command::CreateUserSession::ByUserId(id))
            .await
            .unwrap();
        (user, output.token.to_string())
    }

    /// Sends the provided request to the `app` returning the response
    /// status, headers and JSON body.
    pub(crate) async fn send(
        app: Router,
        method: http::Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (http::StatusCode, http::HeaderMap, Value) {
        let mut req = http::Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            req = req
                .header(http::header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let req = match body {
            Some(json) => req
                .header(http::header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => req.body(Body::empty()),
        }
        .unwrap();

        let resp = app.oneshot(req).await.unwrap();
        let status = resp.status();
        let headers = resp.headers().clone();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, headers, json)
    }
}
