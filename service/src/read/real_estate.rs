//! [`RealEstate`]-related read definitions.

use derive_more::Deref;

#[cfg(doc)]
use crate::domain::{Announcement, RealEstate};
use crate::domain::real_estate;

/// Indicator whether a [`RealEstate`] is advertised by any [`Announcement`].
#[derive(Clone, Copy, Debug, Deref, Eq, Hash, PartialEq)]
pub struct IsUsed(pub bool);

impl PartialEq<bool> for IsUsed {
    fn eq(&self, other: &bool) -> bool {
        self.0 == *other
    }
}

/// Selector of [`RealEstate`]s located at the same place and having the same
/// [`real_estate::Area`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Similar {
    /// [`real_estate::Area`] to match exactly.
    pub area: real_estate::Area,

    /// [`real_estate::Location`] to match exactly.
    pub location: real_estate::Location,
}

impl Similar {
    /// Checks whether the provided [`RealEstate`] matches this [`Similar`].
    #[must_use]
    pub fn matches(&self, real_estate: &real_estate::RealEstate) -> bool {
        self.area == real_estate.area && self.location == real_estate.location
    }
}

pub mod list {
    //! [`RealEstate`] list definitions.

    use common::define_pagination;

    use crate::domain::RealEstate;

    define_pagination!(Node, Filter);

    /// Node of a [`Page`].
    pub type Node = RealEstate;

    /// Filter for [`Selector`].
    #[derive(Clone, Copy, Debug, Default)]
    pub struct Filter {
        /// Deletion mark of the [`RealEstate`]s.
        pub deleted: Option<bool>,
    }
}
