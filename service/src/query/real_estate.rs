//! [`Query`] collection related to [`RealEstate`]s.

use std::collections::HashMap;

use common::operations::By;

#[cfg(doc)]
use crate::Query;
use crate::{
    domain::{real_estate, RealEstate},
    read,
};

use super::DatabaseQuery;

/// Queries a [`RealEstate`] by its [`real_estate::Id`].
pub type ById = DatabaseQuery<By<Option<RealEstate>, real_estate::Id>>;

/// Queries multiple [`RealEstate`]s by their [`real_estate::Id`]s.
pub type ByIds = DatabaseQuery<
    By<HashMap<real_estate::Id, RealEstate>, Vec<real_estate::Id>>,
>;

/// Queries a list of [`RealEstate`]s.
pub type List = DatabaseQuery<
    By<read::real_estate::list::Page, read::real_estate::list::Selector>,
>;

/// Queries [`RealEstate`]s similar to the provided one.
pub type Similar =
    DatabaseQuery<By<Vec<RealEstate>, read::real_estate::Similar>>;
