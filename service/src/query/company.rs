//! [`Query`] collection related to [`Company`]s.

use std::collections::HashMap;

use common::operations::By;

#[cfg(doc)]
use crate::Query;
use crate::{
    domain::{company, Company},
    read,
};

use super::DatabaseQuery;

/// Queries a [`Company`] by its [`company::Id`].
pub type ById = DatabaseQuery<By<Option<Company>, company::Id>>;

/// Queries multiple [`Company`]s by their [`company::Id`]s.
pub type ByIds =
    DatabaseQuery<By<HashMap<company::Id, Company>, Vec<company::Id>>>;

/// Queries a list of [`Company`]s.
pub type List =
    DatabaseQuery<By<read::company::list::Page, read::company::list::Selector>>;
