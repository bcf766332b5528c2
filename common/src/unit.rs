//! Marker types.

/// Marker type describing an entity creation.
#[derive(Clone, Copy, Debug)]
pub struct Creation;

/// Marker type describing a pickup of a rented entity.
#[derive(Clone, Copy, Debug)]
pub struct Pickup;

/// Marker type describing a return of a rented entity.
#[derive(Clone, Copy, Debug)]
pub struct Return;

/// Marker type describing an expiration.
#[derive(Clone, Copy, Debug)]
pub struct Expiration;
