//! [`Report`] definitions.

use common::{define_kind, define_text};
use derive_more::{Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[cfg(doc)]
use crate::domain::{Announcement, User};
use crate::domain::{announcement, user};

/// Complaint about an unverified [`Announcement`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Report {
    /// ID of this [`Report`].
    pub id: Id,

    /// Contact [`user::Email`] of the reporter.
    pub email: user::Email,

    /// [`Content`] of this [`Report`].
    pub content: Content,

    /// [`Status`] of this [`Report`].
    pub status: Status,

    /// ID of the reported [`Announcement`].
    pub announcement_id: announcement::Id,

    /// ID of the [`User`] filed this [`Report`].
    pub reporter_id: user::Id,
}

/// ID of a [`Report`].
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
)]
#[cfg_attr(feature = "postgres", derive(ToSql, FromSql), postgres(transparent))]
pub struct Id(Uuid);

impl Id {
    /// Creates a new random [`Id`].
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

define_text! {
    #[doc = "Content of a [`Report`]."]
    struct Content(max = 4096);
}

define_kind! {
    #[doc = "Processing status of a [`Report`]."]
    enum Status {
        #[doc = "[`Report`] awaits processing."]
        Pending = 1,

        #[doc = "[`Report`] is accepted by an administrator."]
        Accepted = 2,

        #[doc = "[`Report`] is rejected by an administrator."]
        Rejected = 3,
    }
}
