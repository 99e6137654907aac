//! [`RealEstate`] definitions.

use common::define_text;
use derive_more::{Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Real estate being advertised.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RealEstate {
    /// ID of this [`RealEstate`].
    pub id: Id,

    /// [`Name`] of this [`RealEstate`].
    pub name: Name,

    /// [`Kind`] of this [`RealEstate`] (house, flat, etc).
    pub kind: Kind,

    /// [`Area`] of this [`RealEstate`].
    pub area: Area,

    /// [`HeatingType`] of this [`RealEstate`].
    pub heating_type: HeatingType,

    /// [`Equipment`] description of this [`RealEstate`], if any.
    pub equipment: Option<Equipment>,

    /// Indicator whether this [`RealEstate`] is marked as deleted.
    pub deleted: bool,

    /// [`Location`] of this [`RealEstate`].
    pub location: Location,
}

/// ID of a [`RealEstate`].
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
    #[doc = "Name of a [`RealEstate`]."]
    struct Name(max = 255);
}

define_text! {
    #[doc = "Kind of a [`RealEstate`]."]
    struct Kind(max = 64);
}

define_text! {
    #[doc = "Heating type of a [`RealEstate`]."]
    struct HeatingType(max = 64);
}

define_text! {
    #[doc = "Equipment description of a [`RealEstate`]."]
    struct Equipment(max = 2048);
}

/// Area of a [`RealEstate`] in square meters.
#[derive(Clone, Copy, Debug, Display, Eq, Hash, Into, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Area(Decimal);

impl Area {
    /// Creates a new [`Area`] if the given `value` is positive.
    #[must_use]
    pub fn new(value: Decimal) -> Option<Self> {
        (value > Decimal::ZERO).then_some(Self(value.normalize()))
    }
}

/// Location of a [`RealEstate`].
///
/// Empty components mean they are unknown.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct Location {
    /// Country the [`RealEstate`] is located in.
    pub country: String,

    /// City the [`RealEstate`] is located in.
    pub city: String,

    /// Region of the city the [`RealEstate`] is located in.
    pub region: String,

    /// Street the [`RealEstate`] is located on.
    pub street: String,

    /// Street number of the [`RealEstate`].
    pub number: String,
}

#[cfg(test)]
mod spec {
    use rust_decimal::Decimal;

    use super::{Area, Name};

    #[test]
    fn area_must_be_positive() {
        assert!(Area::new(Decimal::new(455, 1)).is_some());
        assert!(Area::new(Decimal::ZERO).is_none());
        assert!(Area::new(Decimal::new(-1, 0)).is_none());
    }

    #[test]
    fn area_is_normalized() {
        assert_eq!(
            Area::new(Decimal::new(5000, 2)),
            Area::new(Decimal::new(50, 0)),
        );
    }

    #[test]
    fn name_must_be_trimmed() {
        assert!(Name::new("Cozy flat").is_some());
        assert!(Name::new(" Cozy flat").is_none());
        assert!(Name::new("").is_none());
    }
}
