//! [`Error`]-related definitions.

use std::{borrow::Cow, fmt, io};

use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::typed_header::TypedHeaderRejection;
use derive_more::Error as StdError;
use itertools::Itertools as _;
use serde::Serialize;
use service::{access, infra::database};
use tracerr::{Trace, Traced};

/// Name of the HTTP header carrying the numeric [`Error`] code.
pub const ERROR_CODE_HEADER: &str = "x-error-code";

/// Defines a new error type.
///
/// Every variant is described by its textual `#[code]`, HTTP `#[status]` and
/// `#[message]`. An optional `#[number]` is exposed to clients via the
/// [`ERROR_CODE_HEADER`].
#[expect(clippy::module_name_repetitions, reason = "more readable")]
#[macro_export]
macro_rules! define_error {
    (@number) => { None };
    (@number $number:literal) => { Some($number) };
    (
        enum $name:ident {
            $(
                #[code = $code:literal]
                $( #[number = $number:literal] )?
                #[status = $status_code:ident]
                #[message = $message:literal]
                $variant:ident
            ),* $(,)?
        }
    ) => {
        /// Error type.
        #[derive(
            Clone,
            Copy,
            Debug,
            ::derive_more::Display,
            ::derive_more::Error
        )]
        #[repr(u16)]
        pub enum $name {
            $(
                #[display($message)]
                #[doc = $message]
                $variant,
            )*
        }

        impl From<$name> for $crate::Error {
            fn from(err: $name) -> Self {
                match err {
                    $(
                        $name::$variant => Self {
                            code: $code,
                            number: $crate::define_error!(@number $($number)?),
                            status_code: ::http::StatusCode::$status_code,
                            message: $message.to_string(),
                            field: None,
                            backtrace: None,
                        },
                    )*
                }
            }
        }
    };
}

/// REST API [`Error`].
#[derive(Clone, Debug, StdError)]
pub struct Error {
    /// [`Error`] code.
    pub code: Code,

    /// Numeric [`Error`] code sent in the [`ERROR_CODE_HEADER`], if any.
    pub number: Option<u8>,

    /// [`http::StatusCode`] of this [`Error`].
    pub status_code: http::StatusCode,

    /// Backtrace of this [`Error`].
    #[error(not(backtrace))]
    pub backtrace: Option<Trace>,

    /// [`Error`] message.
    pub message: String,

    /// Name of the request field this [`Error`] relates to, if any.
    pub field: Option<Cow<'static, str>>,
}

impl Error {
    /// Create a new [`Error`] representing an internal server error.
    #[must_use]
    pub fn internal(msg: &impl ToString) -> Self {
        Self {
            code: "INTERNAL_SERVER_ERROR",
            number: None,
            status_code: http::StatusCode::INTERNAL_SERVER_ERROR,
            message: msg.to_string(),
            field: None,
            backtrace: None,
        }
    }

    /// Creates a new [`Error`] of a malformed request.
    #[must_use]
    pub fn bad_request(msg: &impl ToString) -> Self {
        Self {
            code: "BAD_REQUEST",
            number: None,
            status_code: http::StatusCode::BAD_REQUEST,
            message: msg.to_string(),
            field: None,
            backtrace: None,
        }
    }

    /// Creates a new [`Error`] of the provided request `field` failing
    /// validation.
    #[must_use]
    pub fn invalid_field(field: &'static str, msg: &impl ToString) -> Self {
        Self {
            code: "INVALID_FIELD",
            field: Some(field.into()),
            ..Self::bad_request(msg)
        }
    }

    /// Creates a new [`Error`] of the required request `field` being absent.
    #[must_use]
    pub fn missing_field(field: String) -> Self {
        Self {
            code: "MISSING_FIELD",
            message: format!("`{field}` is required"),
            field: Some(field.into()),
            ..Self::bad_request(&"")
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self {
            code,
            number: _,
            status_code: _,
            backtrace,
            message,
            field: _,
        } = self;

        write!(
            f,
            "[{code}]: {message}{}",
            backtrace
                .iter()
                .format_with("\n", |trace, f| f(&format_args!("{trace}"))),
        )
    }
}

/// Body of an [`Error`] response.
#[derive(Debug, Serialize)]
struct Body<'e> {
    /// [`Error::code`].
    code: &'e str,

    /// [`Error::message`].
    message: &'e str,

    /// [`Error::field`].
    #[serde(skip_serializing_if = "Option::is_none")]
    field: Option<&'e str>,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        if self.status_code.is_server_error() {
            tracing::error!("{self}");
        }

        let body = Json(Body {
            code: self.code,
            message: &self.message,
            field: self.field.as_deref(),
        });
        match self.number {
            Some(n) => {
                (self.status_code, [(ERROR_CODE_HEADER, n.to_string())], body)
                    .into_response()
            }
            None => (self.status_code, body).into_response(),
        }
    }
}

/// [`Error`] code.
pub type Code = &'static str;

/// Helper trait for converting types into [`Error`]s.
pub trait AsError {
    /// Tries to convert the type into an [`Error`].
    ///
    /// [`None`] is returned if the type cannot be converted into an [`Error`].
    fn try_as_error(&self) -> Option<Error>;

    /// Converts the type into an [`Error`].
    fn as_error(&self) -> Error
    where
        Self: fmt::Display,
    {
        self.try_as_error()
            .unwrap_or_else(|| Error::internal(&self))
    }

    /// Converts the type into an [`Error`] by consuming it.
    fn into_error(self) -> Error
    where
        Self: fmt::Display + Sized,
    {
        self.as_error()
    }
}

impl<E: AsError> AsError for Traced<E> {
    fn try_as_error(&self) -> Option<Error> {
        let mut error = self.as_ref().try_as_error()?;
        error.backtrace = Some(self.trace().clone());
        Some(error)
    }
}

impl AsError for TypedHeaderRejection {
    fn try_as_error(&self) -> Option<Error> {
        Some(Error::bad_request(self))
    }
}

impl AsError for JsonRejection {
    fn try_as_error(&self) -> Option<Error> {
        if let Self::JsonDataError(e) = self {
            // `serde` reports absent keys as "missing field `name`".
            let missing = e
                .body_text()
                .split_once("missing field `")
                .and_then(|(_, rest)| rest.split_once('`'))
                .map(|(name, _)| name.to_owned());
            if let Some(name) = missing {
                return Some(Error::missing_field(name));
            }
        }

        let status_code = match self.status() {
            http::StatusCode::UNPROCESSABLE_ENTITY => {
                http::StatusCode::BAD_REQUEST
            }
            s => s,
        };
        Some(Error {
            status_code,
            ..Error::bad_request(&self.body_text())
        })
    }
}

impl AsError for PathRejection {
    fn try_as_error(&self) -> Option<Error> {
        Some(Error::bad_request(&self.body_text()))
    }
}

impl AsError for QueryRejection {
    fn try_as_error(&self) -> Option<Error> {
        Some(Error::bad_request(&self.body_text()))
    }
}

impl AsError for MultipartError {
    fn try_as_error(&self) -> Option<Error> {
        Some(Error {
            status_code: self.status(),
            ..Error::bad_request(&self.body_text())
        })
    }
}

impl AsError for MultipartRejection {
    fn try_as_error(&self) -> Option<Error> {
        Some(Error::bad_request(&self.body_text()))
    }
}

impl AsError for database::Error {
    fn try_as_error(&self) -> Option<Error> {
        None
    }
}

impl AsError for io::Error {
    fn try_as_error(&self) -> Option<Error> {
        None
    }
}

impl AsError for access::Denial {
    fn try_as_error(&self) -> Option<Error> {
        Some(
            match self {
                Self::Unauthenticated => AccessError::AuthorizationRequired,
                Self::Forbidden => AccessError::Forbidden,
            }
            .into(),
        )
    }
}

define_error! {
    enum AccessError {
        #[code = "AUTHORIZATION_REQUIRED"]
        #[status = UNAUTHORIZED]
        #[message = "Authorization required"]
        AuthorizationRequired,

        #[code = "FORBIDDEN"]
        #[status = FORBIDDEN]
        #[message = "Access denied"]
        Forbidden,
    }
}
