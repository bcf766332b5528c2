//! [`User`] read model definition.
//!
//! [`User`]: crate::domain::User

use derive_more::Deref;

#[cfg(doc)]
use crate::domain::{Booking, User};

/// Indicator whether a [`User`] has any unpaid fine across their
/// [`Booking`]s.
///
/// This is the derived "fine pending" gate: liability lives on each
/// [`Booking`], and a [`User`] is blocked from new reservations while any of
/// them stays unsettled.
#[derive(Clone, Copy, Debug, Deref, Eq, Hash, PartialEq)]
pub struct HasUnsettledFine(pub bool);

impl PartialEq<bool> for HasUnsettledFine {
    fn eq(&self, other: &bool) -> bool {
        self.0 == *other
    }
}
