//! [`Company`] definitions.

use common::define_text;
use derive_more::{Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[cfg(doc)]
use crate::domain::User;
use crate::domain::user;

/// Real-estate agency [`User`]s may be members of.
///
/// Members are not stored here: each [`User`] references its [`Company`]
/// along with its [`user::Membership`] status.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Company {
    /// ID of this [`Company`].
    pub id: Id,

    /// [`Name`] of this [`Company`].
    pub name: Name,

    /// [`Address`] of this [`Company`].
    pub address: Address,

    /// Contact [`user::Phone`] of this [`Company`].
    pub phone_number: user::Phone,
}

/// ID of a [`Company`].
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
    #[doc = "Name of a [`Company`]."]
    struct Name(max = 255);
}

define_text! {
    #[doc = "Address of a [`Company`]."]
    struct Address(max = 512);
}
