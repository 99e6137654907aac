//! [`Comment`] read model definition.
//!
//! [`Comment`]: crate::domain::Comment

pub mod list {
    //! [`Comment`]s list definitions.

    use common::define_pagination;

    use crate::domain::{announcement, Comment};
    #[cfg(doc)]
    use crate::domain::Announcement;

    define_pagination!(Node, Filter);

    /// Node of a [`Page`].
    pub type Node = Comment;

    /// Filter for [`Selector`].
    #[derive(Clone, Copy, Debug, Default)]
    pub struct Filter {
        /// ID of the commented [`Announcement`].
        pub announcement_id: Option<announcement::Id>,
    }
}
