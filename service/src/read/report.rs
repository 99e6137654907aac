//! [`Report`] read model definition.
//!
//! [`Report`]: crate::domain::Report

pub mod list {
    //! [`Report`]s list definitions.

    use common::define_pagination;

    use crate::domain::{report, user, Report};

    define_pagination!(Node, Filter);

    /// Node of a [`Page`].
    pub type Node = Report;

    /// Filter for [`Selector`].
    #[derive(Clone, Debug, Default)]
    pub struct Filter {
        /// [`report::Status`] of the [`Report`]s.
        pub status: Option<report::Status>,

        /// Contact [`user::Email`] the [`Report`]s were filed with.
        pub email: Option<user::Email>,
    }
}
