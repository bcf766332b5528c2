//! [`Query`] collection related to a single [`Booking`].
//!
//! [`Booking`]: crate::domain::Booking

use common::operations::By;

use crate::domain::{booking, Booking};

use super::DatabaseQuery;

/// Queries a [`Booking`] by its ID.
pub type ById = DatabaseQuery<By<Option<Booking>, booking::Id>>;
