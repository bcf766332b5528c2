//! [`PaymentConfirmation`] definitions.

use common::Money;

#[cfg(doc)]
use crate::domain::Booking;

/// Opaque signal of the payment collaborator.
///
/// The engine never captures money itself; it only refuses to confirm a
/// [`Booking`] or settle a fine unless the collaborator reports the payment
/// as captured.
#[derive(Clone, Copy, Debug)]
pub struct PaymentConfirmation {
    /// Whether the payment was captured.
    pub is_captured: bool,

    /// Captured amount.
    pub amount: Money,
}
