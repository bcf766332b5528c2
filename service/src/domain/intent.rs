//! [`RentalIntent`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{unit, DateTimeOf};

use crate::domain::{booking::Period, city, user};
#[cfg(doc)]
use crate::domain::{Booking, City, User};

/// In-progress search of a [`User`] for a [`Car`] to rent.
///
/// Disposable state: at most one lives per [`User`] and resubmitting dates
/// overwrites it (last write wins). Confirming a [`Booking`] records the city
/// from here as the delivery one but does not remove the record.
///
/// [`Car`]: crate::domain::Car
#[derive(Clone, Debug)]
pub struct RentalIntent {
    /// ID of the [`User`] this [`RentalIntent`] belongs to.
    pub user_id: user::Id,

    /// Requested rental [`Period`].
    pub period: Period,

    /// ID of the [`City`] to pick a [`Car`] up in.
    ///
    /// [`Car`]: crate::domain::Car
    pub city_id: city::Id,

    /// [`DateTime`] when this [`RentalIntent`] was (re)submitted.
    pub created_at: CreationDateTime,
}

/// [`DateTime`] when a [`RentalIntent`] was (re)submitted.
pub type CreationDateTime = DateTimeOf<(RentalIntent, unit::Creation)>;
