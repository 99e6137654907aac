//! [`Comment`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{define_text, unit, DateTimeOf};
use derive_more::{Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[cfg(doc)]
use crate::domain::{Announcement, User};
use crate::domain::{announcement, user};

/// Comment left on an [`Announcement`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Comment {
    /// ID of this [`Comment`].
    pub id: Id,

    /// [`Content`] of this [`Comment`].
    pub content: Content,

    /// [`DateTime`] when this [`Comment`] was posted.
    pub date: CreationDateTime,

    /// ID of the commented [`Announcement`].
    pub announcement_id: announcement::Id,

    /// ID of the [`User`] authored this [`Comment`].
    pub author_id: user::Id,
}

/// ID of a [`Comment`].
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
    #[doc = "Content of a [`Comment`]."]
    struct Content(max = 4096);
}

/// [`DateTime`] when a [`Comment`] was posted.
pub type CreationDateTime = DateTimeOf<(Comment, unit::Creation)>;
