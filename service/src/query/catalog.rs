//! [`Query`] collection related to catalog reference data.

use common::operations::By;

use crate::domain::{car, City};

use super::DatabaseQuery;

/// Queries all [`City`]s, ordered by name.
pub type Cities = DatabaseQuery<By<Vec<City>, ()>>;

/// Queries all [`car::Company`]s, ordered by name.
pub type Companies = DatabaseQuery<By<Vec<car::Company>, ()>>;

/// Queries all [`car::Category`]s, ordered by name.
pub type Categories = DatabaseQuery<By<Vec<car::Category>, ()>>;

/// Queries [`car::Model`]s, optionally of a single [`car::Company`],
/// ordered by name.
pub type Models =
    DatabaseQuery<By<Vec<car::Model>, Option<car::company::Id>>>;
