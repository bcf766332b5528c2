//! Catalog reference-data definitions.

use derive_more::{AsRef, Display, From, Into};
use juniper::{
    GraphQLEnum, GraphQLInputObject, GraphQLObject, GraphQLScalar, GraphQLUnion,
};
use service::domain::{self, car, city};
use uuid::Uuid;

use crate::{api::scalar, Context};

/// Canonicalized name of a catalog entity.
///
/// Whitespace is stripped and letters are upper-cased on input, so
/// `" new  delhi "` and `"NEWDELHI"` denote the same name.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "CatalogName",
    with = scalar::Via::<domain::catalog::Name>,
)]
pub struct Name(domain::catalog::Name);

/// Unique identifier of a `City`.
#[derive(
    Clone, Copy, Debug, Display, Eq, From, GraphQLScalar, Into, PartialEq,
)]
#[from(city::Id)]
#[into(city::Id)]
#[graphql(name = "CityId", transparent)]
pub struct CityId(Uuid);

/// Unique identifier of a `CarCompany`.
#[derive(
    Clone, Copy, Debug, Display, Eq, From, GraphQLScalar, Into, PartialEq,
)]
#[from(car::company::Id)]
#[into(car::company::Id)]
#[graphql(name = "CarCompanyId", transparent)]
pub struct CarCompanyId(Uuid);

/// Unique identifier of a `CarCategory`.
#[derive(
    Clone, Copy, Debug, Display, Eq, From, GraphQLScalar, Into, PartialEq,
)]
#[from(car::category::Id)]
#[into(car::category::Id)]
#[graphql(name = "CarCategoryId", transparent)]
pub struct CarCategoryId(Uuid);

/// Unique identifier of a `CarModel`.
#[derive(
    Clone, Copy, Debug, Display, Eq, From, GraphQLScalar, Into, PartialEq,
)]
#[from(car::model::Id)]
#[into(car::model::Id)]
#[graphql(name = "CarModelId", transparent)]
pub struct CarModelId(Uuid);

/// `City` cars are located in.
#[derive(Clone, Debug, GraphQLObject)]
#[graphql(context = Context)]
pub struct City {
    /// Unique identifier of this `City`.
    pub id: CityId,

    /// Canonicalized name of this `City`.
    pub name: Name,
}

impl From<domain::City> for City {
    fn from(city: domain::City) -> Self {
        Self {
            id: city.id.into(),
            name: city.name.into(),
        }
    }
}

/// Company manufacturing `Car`s.
#[derive(Clone, Debug, GraphQLObject)]
#[graphql(context = Context)]
pub struct CarCompany {
    /// Unique identifier of this `CarCompany`.
    pub id: CarCompanyId,

    /// Canonicalized name of this `CarCompany`.
    pub name: Name,
}

impl From<car::Company> for CarCompany {
    fn from(company: car::Company) -> Self {
        Self {
            id: company.id.into(),
            name: company.name.into(),
        }
    }
}

/// Category of `Car`s.
#[derive(Clone, Debug, GraphQLObject)]
#[graphql(context = Context)]
pub struct CarCategory {
    /// Unique identifier of this `CarCategory`.
    pub id: CarCategoryId,

    /// Canonicalized name of this `CarCategory`.
    pub name: Name,
}

impl From<car::Category> for CarCategory {
    fn from(category: car::Category) -> Self {
        Self {
            id: category.id.into(),
            name: category.name.into(),
        }
    }
}

/// Model of `Car`s.
#[derive(Clone, Debug, GraphQLObject)]
#[graphql(context = Context)]
pub struct CarModel {
    /// Unique identifier of this `CarModel`.
    pub id: CarModelId,

    /// Canonicalized name of this `CarModel`.
    pub name: Name,

    /// ID of the `CarCompany` manufacturing this `CarModel`, if known.
    pub company_id: Option<CarCompanyId>,
}

impl From<car::Model> for CarModel {
    fn from(model: car::Model) -> Self {
        Self {
            id: model.id.into(),
            name: model.name.into(),
            company_id: model.company_id.map(Into::into),
        }
    }
}

/// Catalog entity of some [`Kind`].
#[derive(Clone, Debug, From, GraphQLUnion)]
#[graphql(context = Context, name = "CatalogEntry")]
pub enum Entry {
    #[doc(hidden)]
    City(City),
    #[doc(hidden)]
    CarCompany(CarCompany),
    #[doc(hidden)]
    CarCategory(CarCategory),
    #[doc(hidden)]
    CarModel(CarModel),
}

impl From<domain::catalog::Entry> for Entry {
    fn from(entry: domain::catalog::Entry) -> Self {
        use domain::catalog::Entry as E;

        match entry {
            E::City(c) => Self::City(c.into()),
            E::CarCompany(c) => Self::CarCompany(c.into()),
            E::CarCategory(c) => Self::CarCategory(c.into()),
            E::CarModel(m) => Self::CarModel(m.into()),
        }
    }
}

/// Kind of a catalog entity.
#[derive(Clone, Copy, Debug, Eq, GraphQLEnum, PartialEq)]
#[graphql(name = "CatalogKind")]
pub enum Kind {
    /// A `City`.
    City,

    /// A `CarCompany`.
    CarCompany,

    /// A `CarCategory`.
    CarCategory,

    /// A `CarModel`.
    CarModel,
}

/// Reference to a catalog entity of some [`Kind`].
#[derive(Clone, Copy, Debug, GraphQLInputObject)]
#[graphql(name = "CatalogEntryRef")]
pub struct EntryRefInput {
    /// [`Kind`] of the referred catalog entity.
    pub kind: Kind,

    /// ID of the referred catalog entity.
    pub id: Uuid,
}

impl From<EntryRefInput> for domain::catalog::EntryRef {
    fn from(input: EntryRefInput) -> Self {
        let EntryRefInput { kind, id } = input;
        match kind {
            Kind::City => Self::City(id.into()),
            Kind::CarCompany => Self::CarCompany(id.into()),
            Kind::CarCategory => Self::CarCategory(id.into()),
            Kind::CarModel => Self::CarModel(id.into()),
        }
    }
}
