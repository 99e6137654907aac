//! [`Query`] collection related to [`Report`]s.

use common::operations::By;

#[cfg(doc)]
use crate::Query;
use crate::{
    domain::{report, Report},
    read,
};

use super::DatabaseQuery;

/// Queries a [`Report`] by its [`report::Id`].
pub type ById = DatabaseQuery<By<Option<Report>, report::Id>>;

/// Queries a list of [`Report`]s.
pub type List =
    DatabaseQuery<By<read::report::list::Page, read::report::list::Selector>>;
