//! [`Query`] collection related to [`Comment`]s.

use common::operations::By;

#[cfg(doc)]
use crate::Query;
use crate::{
    domain::{comment, Comment},
    read,
};

use super::DatabaseQuery;

/// Queries a [`Comment`] by its [`comment::Id`].
pub type ById = DatabaseQuery<By<Option<Comment>, comment::Id>>;

/// Queries a list of [`Comment`]s.
pub type List =
    DatabaseQuery<By<read::comment::list::Page, read::comment::list::Selector>>;
