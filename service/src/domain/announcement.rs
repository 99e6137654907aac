//! [`Announcement`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{define_kind, define_text, unit, Date, DateTimeOf};
use derive_more::{Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[cfg(doc)]
use crate::domain::{RealEstate, User};
use crate::domain::{real_estate, user};

/// Announcement advertising a [`RealEstate`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Announcement {
    /// ID of this [`Announcement`].
    pub id: Id,

    /// [`Price`] of the advertised [`RealEstate`].
    pub price: Price,

    /// [`DateTime`] when this [`Announcement`] was announced.
    pub announced_at: AnnouncementDateTime,

    /// [`DateTime`] when this [`Announcement`] was modified last time, if
    /// ever.
    pub modified_at: Option<ModificationDateTime>,

    /// [`Date`] when this [`Announcement`] expires.
    pub expiration_date: Date,

    /// Contact [`user::Phone`] of this [`Announcement`].
    pub phone_number: user::Phone,

    /// [`Kind`] of this [`Announcement`] (sale, rent, etc).
    pub kind: Kind,

    /// [`Verification`] status of this [`Announcement`].
    pub verification: Verification,

    /// Indicator whether this [`Announcement`] is marked as deleted.
    pub deleted: bool,

    /// ID of the advertised [`RealEstate`].
    pub real_estate_id: real_estate::Id,

    /// ID of the [`User`] authored this [`Announcement`].
    pub author_id: user::Id,
}

impl Announcement {
    /// Checks whether this [`Announcement`] is verified already.
    #[must_use]
    pub fn is_verified(&self) -> bool {
        self.verification == Verification::Verified
    }
}

/// ID of an [`Announcement`].
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

/// Price of an [`Announcement`].
#[derive(Clone, Copy, Debug, Display, Eq, Hash, Into, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Price(Decimal);

impl Price {
    /// Creates a new [`Price`] if the given `amount` is not negative.
    #[must_use]
    pub fn new(amount: Decimal) -> Option<Self> {
        (amount >= Decimal::ZERO).then_some(Self(amount))
    }
}

define_text! {
    #[doc = "Kind of an [`Announcement`]."]
    struct Kind(max = 64);
}

define_kind! {
    #[doc = "Verification status of an [`Announcement`]."]
    enum Verification {
        #[doc = "[`Announcement`] is not verified yet."]
        NotVerified = 1,

        #[doc = "[`Announcement`] is verified by a verifier."]
        Verified = 2,
    }
}

/// [`DateTime`] when an [`Announcement`] was announced.
pub type AnnouncementDateTime = DateTimeOf<(Announcement, unit::Creation)>;

/// [`DateTime`] when an [`Announcement`] was modified.
pub type ModificationDateTime = DateTimeOf<(Announcement, unit::Modification)>;
