//! [`Announcement`] read model definition.

#[cfg(doc)]
use crate::domain::Announcement;
use crate::domain::company;
#[cfg(doc)]
use crate::domain::Company;

/// Selector of the cheapest [`Announcement`]s of a [`Company`].
///
/// Ties in price are resolved by the announcement date and ID, so the
/// earlier announced [`Announcement`]s go first.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Top {
    /// ID of the [`Company`] the [`Announcement`]s are authored within.
    pub company_id: company::Id,

    /// Maximum number of [`Announcement`]s to select.
    pub limit: usize,
}

impl Top {
    /// Default number of [`Announcement`]s in a [`Top`].
    pub const DEFAULT_LIMIT: usize = 3;

    /// Creates a new [`Top`] of [`Top::DEFAULT_LIMIT`] for the provided
    /// [`Company`].
    #[must_use]
    pub const fn of(company_id: company::Id) -> Self {
        Self {
            company_id,
            limit: Self::DEFAULT_LIMIT,
        }
    }
}

pub mod list {
    //! [`Announcement`]s list definitions.

    use common::define_pagination;

    use crate::domain::{announcement, company, user, Announcement};
    #[cfg(doc)]
    use crate::domain::{Company, User};

    define_pagination!(Node, Filter);

    /// Node of a [`Page`].
    pub type Node = Announcement;

    /// Filter for [`Selector`].
    ///
    /// All the provided criteria must match.
    #[derive(Clone, Debug, Default)]
    pub struct Filter {
        /// Deletion mark of the [`Announcement`]s.
        pub deleted: Option<bool>,

        /// [`announcement::Verification`] status of the [`Announcement`]s.
        pub verification: Option<announcement::Verification>,

        /// [`user::Email`] of the [`User`] authored the [`Announcement`]s.
        pub author_email: Option<user::Email>,

        /// ID of the [`Company`] the author of the [`Announcement`]s is an
        /// accepted member of.
        pub company_id: Option<company::Id>,
    }
}
