//! [`User`]-related definitions.

use std::collections::HashMap;

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
    domain::{self, company, user},
    query,
    read,
};

use crate::{
    api::{self, company::CompanyRef, field, Created, Pagination},
    define_error, AsError, Context, Error, Service,
};

/// Builds the [`Router`] of [`User`] endpoints.
pub(crate) fn router() -> Router {
    Router::new()
        .route("/", get(list).post(register))
        .route("/:id", get(by_id))
}

/// A user of the platform.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique identifier of this [`User`].
    pub id: user::Id,

    /// Unique username of this [`User`].
    pub username: String,

    /// Email address of this [`User`].
    pub email: String,

    /// Role of this [`User`].
    pub role: String,

    /// Company this [`User`] is associated with, if any.
    pub company: Option<CompanyRef>,

    /// Status of this [`User`]'s membership in the `company`.
    pub company_verified: String,

    /// [`DateTime`] when this [`User`] was registered.
    #[serde(with = "common::datetime::serde::rfc3339")]
    pub created_at: DateTime,
}

impl User {
    /// Creates a new [`User`] out of the provided [`domain::User`], looking
    /// up its [`CompanyRef`] in the provided `companies`.
    fn new(
        user: domain::User,
        companies: &HashMap<company::Id, CompanyRef>,
    ) -> Self {
        Self {
            id: user.id,
            username: user.username.to_string(),
            email: user.email.to_string(),
            role: user.role.to_string(),
            company: user.company_id.and_then(|id| companies.get(&id).cloned()),
            company_verified: user.membership.to_string(),
            created_at: user.created_at.coerce(),
        }
    }
}

/// Converts the provided [`domain::User`] into a [`User`].
///
/// # Errors
///
/// If the [`CompanyRef`] of the [`User`] cannot be loaded.
pub(crate) async fn one(
    service: &Service,
    user: domain::User,
) -> Result<User, Error> {
    let companies = api::company::refs(service, user.company_id).await?;
    Ok(User::new(user, &companies))
}

/// Converts the provided page of [`domain::User`]s into an [`api::Page`].
///
/// # Errors
///
/// If the [`CompanyRef`]s of the [`User`]s cannot be loaded.
pub(crate) async fn page(
    service: &Service,
    page: read::user::list::Page,
) -> Result<api::Page<User>, Error> {
    let companies = api::company::refs(
        service,
        page.items.iter().filter_map(|u| u.company_id),
    )
    .await?;
    Ok(api::Page::from(page.map(|u| User::new(u, &companies))))
}

/// Registration details of a new [`User`].
#[derive(Clone, Debug, Deserialize)]
pub struct Registration {
    /// Unique username.
    pub username: String,

    /// Email address.
    pub email: String,

    /// Password.
    pub password: String,

    /// Role, `advertiser` if omitted.
    pub role: Option<String>,
}

#[tracing::instrument(skip_all)]
async fn register(
    ctx: Context,
    input: Result<Json<Registration>, JsonRejection>,
) -> Result<Created<User>, Error> {
    let Json(Registration {
        username,
        email,
        password,
        role,
    }) = input.map_err(AsError::into_error)?;
    let role = match role {
        Some(r) => field("role", r.parse::<user::Role>().ok())?,
        None => user::Role::Advertiser,
    };
    ctx.authorize(Operation::RegisterUser { role })?;

    let username = field("username", user::Username::new(username))?;
    let email = field("email", user::Email::new(email))?;
    let password = field("password", user::Password::new(password))?;

    let user = ctx
        .service()
        .execute(command::CreateUser {
            caller: ctx.caller(),
            username,
            email,
            password: secrecy::SecretBox::init_with(move || password),
            role,
        })
        .await
        .map_err(AsError::into_error)?;

    Ok(Created {
        location: format!("/api/users/{}", user.id),
        body: one(ctx.service(), user).await?,
    })
}

#[tracing::instrument(skip_all)]
async fn list(
    ctx: Context,
    pagination: Result<Query<Pagination>, QueryRejection>,
) -> Result<Json<api::Page<User>>, Error> {
    ctx.authorize(Operation::ListUsers)?;
    let Query(pagination) = pagination.map_err(AsError::into_error)?;

    let users = ctx
        .service()
        .execute(query::user::List::by(read::user::list::Selector {
            arguments: pagination.arguments()?,
            filter: read::user::list::Filter::default(),
        }))
        .await
        .map_err(AsError::into_error)?;

    page(ctx.service(), users).await.map(Json)
}

#[tracing::instrument(skip_all)]
async fn by_id(
    ctx: Context,
    id: Result<Path<user::Id>, PathRejection>,
) -> Result<Json<User>, Error> {
    ctx.authorize(Operation::ViewUser)?;
    let Path(id) = id.map_err(AsError::into_error)?;

    let user = ctx
        .service()
        .execute(query::user::ById::by(id))
        .await
        .map_err(AsError::into_error)?
        .ok_or_else(|| Error::from(UserError::NotExists))?;

    one(ctx.service(), user).await.map(Json)
}

define_error! {
    enum UserError {
        #[code = "NON_EXISTING_ENTITY"]
        #[number = 1]
        #[status = NOT_FOUND]
        #[message = "There is no user with specified id"]
        NotExists,

        #[code = "USERNAME_OCCUPIED"]
        #[status = CONFLICT]
        #[message = "Username is already taken"]
        UsernameOccupied,
    }
}

impl AsError for command::create_user::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Access(e) => e.try_as_error(),
            Self::Db(e) => e.try_as_error(),
            Self::UsernameOccupied(_) => {
                Some(UserError::UsernameOccupied.into())
            }
        }
    }
}

pub mod session {
    //! [`Session`]-related definitions.
    //!
    //! [`Session`]: service::domain::user::Session

    use axum::{extract::rejection::JsonRejection, routing::post, Json, Router};
    use common::DateTime;
    use serde::{Deserialize, Serialize};
    use service::{
        command::{self, Command as _},
        domain::user,
    };

    use crate::{api::field, define_error, AsError, Context, Error};

    use super::User;

    /// Builds the [`Router`] of session endpoints.
    pub(crate) fn router() -> Router {
        Router::new().route("/", post(login))
    }

    /// Credentials of a [`User`].
    #[derive(Clone, Debug, Deserialize)]
    pub struct Credentials {
        /// Username of the [`User`].
        pub username: String,

        /// Password of the [`User`].
        pub password: String,
    }

    /// Newly created session.
    #[derive(Clone, Debug, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Created {
        /// Bearer token of the session.
        pub token: String,

        /// [`DateTime`] when the session expires.
        #[serde(with = "common::datetime::serde::rfc3339")]
        pub expires_at: DateTime,

        /// [`User`] the session belongs to.
        pub user: User,
    }

    #[tracing::instrument(skip_all)]
    async fn login(
        ctx: Context,
        input: Result<Json<Credentials>, JsonRejection>,
    ) -> Result<Json<Created>, Error> {
        let Json(Credentials { username, password }) =
            input.map_err(AsError::into_error)?;
        let username = field("username", user::Username::new(username))?;
        let password = field("password", user::Password::new(password))?;

        let output = ctx
            .service()
            .execute(command::CreateUserSession::ByCredentials {
                username,
                password: secrecy::SecretBox::init_with(move || password),
            })
            .await
            .map_err(AsError::into_error)?;

        Ok(Json(Created {
            token: output.token.to_string(),
            expires_at: output.expires_at.coerce(),
            user: super::one(ctx.service(), output.user).await?,
        }))
    }

    define_error! {
        enum SessionError {
            #[code = "WRONG_CREDENTIALS"]
            #[status = UNAUTHORIZED]
            #[message = "Wrong username or password"]
            WrongCredentials,
        }
    }

    impl AsError for command::create_user_session::ExecutionError {
        fn try_as_error(&self) -> Option<Error> {
            match self {
                Self::Db(e) => e.try_as_error(),
                Self::JsonWebTokenEncodeError(_) => None,
                Self::UserNotExists(_) | Self::WrongCredentials => {
                    Some(SessionError::WrongCredentials.into())
                }
            }
        }
    }
}

#[cfg(test)]
mod spec {
    use serde_json::json;
    use service::domain::user;

    use crate::api::spec;

    #[tokio::test]
    async fn registers_advertiser_and_logs_in() {
        let (app, _) = spec::app();

        let (status, headers, body) = spec::send(
            app.clone(),
            http::Method::POST,
            "/api/users",
            None,
            Some(json!({
                "username": "advertiser",
                "email": "advertiser@example.com",
                "password": "secret",
            })),
        )
        .await;
        assert_eq!(status, http::StatusCode::CREATED);
        assert_eq!(body["role"], "advertiser");
        assert_eq!(body["companyVerified"], "not-requested");
        assert_eq!(
            headers[http::header::LOCATION],
            format!("/api/users/{}", body["id"].as_str().unwrap()),
        );

        let (status, _, body) = spec::send(
            app,
            http::Method::POST,
            "/api/sessions",
            None,
            Some(json!({"username": "advertiser", "password": "secret"})),
        )
        .await;
        assert_eq!(status, http::StatusCode::OK);
        assert!(body["token"].as_str().is_some());
        assert_eq!(body["user"]["username"], "advertiser");
    }

    #[tokio::test]
    async fn guest_cannot_register_admin() {
        let (app, _) = spec::app();

        let (status, _, _) = spec::send(
            app,
            http::Method::POST,
            "/api/users",
            None,
            Some(json!({
                "username": "admin",
                "email": "admin@example.com",
                "password": "secret",
                "role": "admin",
            })),
        )
        .await;

        assert_eq!(status, http::StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn rejects_wrong_password() {
        let (app, svc) = spec::app();
        let (user, _) = spec::login(&svc, user::Role::Advertiser, None).await;

        let (status, _, body) = spec::send(
            app,
            http::Method::POST,
            "/api/sessions",
            None,
            Some(json!({
                "username": user.username.to_string(),
                "password": "wrong",
            })),
        )
        .await;

        assert_eq!(status, http::StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], "WRONG_CREDENTIALS");
    }

    #[tokio::test]
    async fn rejects_invalid_token() {
        let (app, _) = spec::app();

        let (status, _, body) = spec::send(
            app,
            http::Method::GET,
            "/api/users",
            Some("garbage"),
            None,
        )
        .await;

        assert_eq!(status, http::StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], "INVALID_TOKEN");
    }
}
