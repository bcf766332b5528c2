//! Catalog-related read definitions.

use derive_more::Deref;

#[cfg(doc)]
use crate::domain::{catalog::EntryRef, Car, City, User};

/// Indicator whether a catalog entity is still referenced in a way blocking
/// its removal.
///
/// A [`City`] is blocked by resident [`User`]s (cars merely lose their city
/// reference); companies, categories and models are blocked by any
/// referencing [`Car`]. Selected by [`EntryRef`].
#[derive(Clone, Copy, Debug, Deref, Eq, Hash, PartialEq)]
pub struct InUse(pub bool);

impl PartialEq<bool> for InUse {
    fn eq(&self, other: &bool) -> bool {
        self.0 == *other
    }
}
