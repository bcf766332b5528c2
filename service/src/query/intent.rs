//! [`Query`] collection related to a [`RentalIntent`].
//!
//! [`RentalIntent`]: crate::domain::RentalIntent

use common::operations::By;

use crate::domain::{user, RentalIntent};

use super::DatabaseQuery;

/// Queries the live [`RentalIntent`] of a user, if any.
pub type OfUser = DatabaseQuery<By<Option<RentalIntent>, user::Id>>;
