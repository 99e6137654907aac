//! [`Context`]-related definitions.

use axum::{async_trait, extract::FromRequestParts, RequestPartsExt as _};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use service::{
    access::{Caller, Operation},
    command::{self, Command as _},
    domain::user::session,
};

use crate::{define_error, AsError, Error, Service};

/// Context of a single HTTP request.
#[derive(Clone, Debug)]
pub struct Context {
    /// [`Service`] instance.
    service: Service,

    /// [`Caller`] performing the request.
    caller: Caller,
}

impl Context {
    /// Creates a new [`Context`] out of the provided parts.
    #[must_use]
    pub fn new(service: Service, caller: Caller) -> Self {
        Self { service, caller }
    }

    /// Returns [`Service`] instance of this [`Context`].
    #[must_use]
    pub fn service(&self) -> &Service {
        &self.service
    }

    /// Returns [`Caller`] performing the request.
    #[must_use]
    pub fn caller(&self) -> Caller {
        self.caller
    }

    /// Checks whether the [`Caller`] is allowed to perform the provided
    /// [`Operation`].
    ///
    /// # Errors
    ///
    /// If the [`Operation`] is not allowed for the [`Caller`].
    pub fn authorize(&self, op: Operation) -> Result<(), Error> {
        self.caller.authorize(op).map_err(AsError::into_error)
    }

    /// Resolves the [`Caller`] from the `Authorization` header, if any.
    ///
    /// # Errors
    ///
    /// Errors if the provided authentication token is invalid.
    async fn authenticate(
        service: &Service,
        parts: &mut http::request::Parts,
    ) -> Result<Caller, Error> {
        match parts.extract::<TypedHeader<Authorization<Bearer>>>().await {
            Ok(TypedHeader(Authorization(bearer))) => {
                #[expect(unsafe_code, reason = "specified in correct header")]
                let token = unsafe {
                    session::Token::new_unchecked(bearer.token().to_owned())
                };
                service
                    .execute(command::AuthorizeUserSession { token })
                    .await
                    .map(|s| Caller::User {
                        id: s.user_id,
                        role: s.role,
                    })
                    .map_err(AsError::into_error)
            }
            Err(e) if e.is_missing() => Ok(Caller::Guest),
            Err(e) => Err(e.into_error()),
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Context
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(
        parts: &mut http::request::Parts,
        _: &S,
    ) -> Result<Self, Self::Rejection> {
        let service = parts
            .extensions
            .get::<Service>()
            .cloned()
            .ok_or_else(|| Error::internal(&"missing `Service` extension"))?;

        let caller = Self::authenticate(&service, parts).await?;
        if let Some(id) = caller.id() {
            _ = tracing::Span::current()
                .record("user.id", tracing::field::display(id));
        }

        Ok(Self { service, caller })
    }
}

impl AsError for command::authorize_user_session::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::JsonWebTokenDecodeError(_) | Self::UserNotExists(_) => {
                Some(AuthError::InvalidToken.into())
            }
        }
    }
}

define_error! {
    enum AuthError {
        #[code = "INVALID_TOKEN"]
        #[status = UNAUTHORIZED]
        #[message = "Authorization token is invalid or expired"]
        InvalidToken,
    }
}
