//! Catalog reference-data definitions.

use common::define_kind;
use derive_more::{AsRef, Display, From, FromStr};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};

use crate::domain::{car, city};
#[cfg(doc)]
use crate::domain::{Car, City};

/// Canonicalized name of a catalog entity ([`City`], [`car::Company`],
/// [`car::Category`] or [`car::Model`]).
///
/// Spaces are stripped and letters are upper-cased before storage and lookup,
/// so `" new  delhi "` and `"NEWDELHI"` are the same [`Name`]. The canonical
/// form is the uniqueness key.
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Name(String);

impl Name {
    /// Creates a new [`Name`] without canonicalizing or checking it.
    ///
    /// # Safety
    ///
    /// The provided `name` must already be in the canonical form.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Creates a new [`Name`], canonicalizing the given `raw` input.
    ///
    /// [`None`] is returned if the canonical form is empty or too long.
    #[must_use]
    pub fn new(raw: impl AsRef<str>) -> Option<Self> {
        let canonical = raw
            .as_ref()
            .chars()
            .filter(|c| !c.is_whitespace())
            .flat_map(char::to_uppercase)
            .collect::<String>();
        (!canonical.is_empty() && canonical.len() <= 128)
            .then_some(Self(canonical))
    }
}

impl FromStr for Name {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Name`")
    }
}

define_kind! {
    #[doc = "Kind of a catalog entity."]
    enum Kind {
        #[doc = "A [`City`] cars are located in."]
        City = 1,

        #[doc = "A [`car::Company`] (manufacturer)."]
        CarCompany = 2,

        #[doc = "A [`car::Category`]."]
        CarCategory = 3,

        #[doc = "A [`car::Model`]."]
        CarModel = 4,
    }
}

/// Catalog entity of some [`Kind`].
#[derive(Clone, Debug, From)]
pub enum Entry {
    #[doc(hidden)]
    City(city::City),
    #[doc(hidden)]
    CarCompany(car::Company),
    #[doc(hidden)]
    CarCategory(car::Category),
    #[doc(hidden)]
    CarModel(car::Model),
}

impl Entry {
    /// Returns the typed [`EntryRef`] of this [`Entry`].
    #[must_use]
    pub fn entry_ref(&self) -> EntryRef {
        match self {
            Self::City(c) => EntryRef::City(c.id),
            Self::CarCompany(c) => EntryRef::CarCompany(c.id),
            Self::CarCategory(c) => EntryRef::CarCategory(c.id),
            Self::CarModel(m) => EntryRef::CarModel(m.id),
        }
    }

    /// Returns the canonicalized [`Name`] of this [`Entry`].
    #[must_use]
    pub fn name(&self) -> &Name {
        match self {
            Self::City(c) => &c.name,
            Self::CarCompany(c) => &c.name,
            Self::CarCategory(c) => &c.name,
            Self::CarModel(m) => &m.name,
        }
    }

    /// Replaces the [`Name`] of this [`Entry`] with the given one.
    pub fn rename(&mut self, name: Name) {
        match self {
            Self::City(c) => c.name = name,
            Self::CarCompany(c) => c.name = name,
            Self::CarCategory(c) => c.name = name,
            Self::CarModel(m) => m.name = name,
        }
    }
}

/// Lookup of a catalog [`Entry`] by its [`Kind`] and canonicalized [`Name`].
#[derive(Clone, Debug)]
pub struct Lookup {
    /// [`Kind`] of the looked up [`Entry`].
    pub kind: Kind,

    /// Canonicalized [`Name`] to look up.
    pub name: Name,
}

/// Typed reference to a catalog entity of some [`Kind`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum EntryRef {
    /// Reference to a [`City`].
    City(city::Id),

    /// Reference to a [`car::Company`].
    CarCompany(car::company::Id),

    /// Reference to a [`car::Category`].
    CarCategory(car::category::Id),

    /// Reference to a [`car::Model`].
    CarModel(car::model::Id),
}

impl EntryRef {
    /// Returns [`Kind`] of the referred catalog entity.
    #[must_use]
    pub fn kind(&self) -> Kind {
        match self {
            Self::City(_) => Kind::City,
            Self::CarCompany(_) => Kind::CarCompany,
            Self::CarCategory(_) => Kind::CarCategory,
            Self::CarModel(_) => Kind::CarModel,
        }
    }
}

#[cfg(test)]
mod spec {
    use super::Name;

    #[test]
    fn canonicalizes() {
        assert_eq!(Name::new("  New  Delhi ").unwrap().to_string(), "NEWDELHI");
        assert_eq!(Name::new("delhi").unwrap().to_string(), "DELHI");
        assert_eq!(Name::new("DELHI").unwrap(), Name::new(" d e l h i").unwrap());
    }

    #[test]
    fn rejects_blank() {
        assert!(Name::new("").is_none());
        assert!(Name::new("   ").is_none());
    }
}
