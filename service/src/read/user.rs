//! [`User`] read model definition.
//!
//! [`User`]: crate::domain::User

pub mod list {
    //! [`User`]s list definitions.

    use common::define_pagination;

    use crate::domain::{company, user, User};
    #[cfg(doc)]
    use crate::domain::Company;

    define_pagination!(Node, Filter);

    /// Node of a [`Page`].
    pub type Node = User;

    /// Filter for [`Selector`].
    #[derive(Clone, Copy, Debug, Default)]
    pub struct Filter {
        /// ID of the [`Company`] the [`User`]s are related to.
        pub company_id: Option<company::Id>,

        /// [`user::Membership`] status of the [`User`]s in their
        /// [`Company`].
        pub membership: Option<user::Membership>,
    }
}
