//! [`Query`] collection related to a single [`Car`].
//!
//! [`Car`]: crate::domain::Car

use common::operations::By;

use crate::domain::{car, Car};

use super::DatabaseQuery;

/// Queries a [`Car`] by its ID.
pub type ById = DatabaseQuery<By<Option<Car>, car::Id>>;
