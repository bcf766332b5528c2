//! [`Booking`]-related read definitions.

use common::{define_kind, Date};
use derive_more::Deref;

use crate::domain::{booking::Period, car, city, user};
#[cfg(doc)]
use crate::domain::{Booking, Car, City, User};

/// Indicator whether a conflicting active [`Booking`] exists.
#[derive(Clone, Copy, Debug, Deref, Eq, Hash, PartialEq)]
pub struct HasConflict(pub bool);

impl PartialEq<bool> for HasConflict {
    fn eq(&self, other: &bool) -> bool {
        self.0 == *other
    }
}

/// Probe for an active [`Booking`] of a [`Car`] intersecting a [`Period`].
#[derive(Clone, Copy, Debug)]
pub struct CarConflict {
    /// ID of the [`Car`] to probe.
    pub car_id: car::Id,

    /// Requested [`Period`].
    pub period: Period,
}

/// Probe for an active [`Booking`] of a [`User`] intersecting a [`Period`].
///
/// One active rental slot per [`User`] at a time: holding any active
/// [`Booking`] overlapping the requested dates conflicts, whatever the car.
#[derive(Clone, Copy, Debug)]
pub struct UserConflict {
    /// ID of the [`User`] to probe.
    pub user_id: user::Id,

    /// Requested [`Period`].
    pub period: Period,
}

/// Indicator whether a [`Car`] has an active [`Booking`] starting today or
/// later.
///
/// Such a [`Car`] cannot be removed from the fleet; purely historical
/// [`Booking`]s do not block removal.
#[derive(Clone, Copy, Debug, Deref, Eq, Hash, PartialEq)]
pub struct HasUpcoming(pub bool);

impl PartialEq<bool> for HasUpcoming {
    fn eq(&self, other: &bool) -> bool {
        self.0 == *other
    }
}

/// Selector of the day schedule an admin sees for their [`City`].
#[derive(Clone, Copy, Debug)]
pub struct Schedule {
    /// ID of the [`City`] the admin manages.
    pub city_id: city::Id,

    /// [`Kind`] of the schedule.
    pub kind: ScheduleKind,

    /// [`Date`] the schedule is built for (normally today).
    pub on: Date,
}

define_kind! {
    #[doc = "Kind of an admin day [`Schedule`]."]
    enum ScheduleKind {
        #[doc = "Active [`Booking`]s whose [`Car`] is to be picked up on the \
                 given day."]
        Pickups = 1,

        #[doc = "Active [`Booking`]s whose pickup day has passed without the \
                 [`Car`] being taken."]
        PickupsOverdue = 2,

        #[doc = "Active [`Booking`]s whose [`Car`] is to be returned on the \
                 given day."]
        Returns = 3,

        #[doc = "Active [`Booking`]s whose return day has passed with the \
                 [`Car`] still out."]
        ReturnsOverdue = 4,
    }
}
