//! [`Query`] collection related to [`Announcement`]s.

use common::operations::By;

use crate::{
    domain::{announcement, Announcement},
    read,
};
#[cfg(doc)]
use crate::{domain::Company, Query};

use super::DatabaseQuery;

/// Queries an [`Announcement`] by its [`announcement::Id`].
pub type ById = DatabaseQuery<By<Option<Announcement>, announcement::Id>>;

/// Queries a list of [`Announcement`]s.
pub type List = DatabaseQuery<
    By<read::announcement::list::Page, read::announcement::list::Selector>,
>;

/// Queries the cheapest [`Announcement`]s of a [`Company`].
pub type Top = DatabaseQuery<By<Vec<Announcement>, read::announcement::Top>>;
