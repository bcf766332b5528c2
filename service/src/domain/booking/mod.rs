//! [`Booking`] definitions.

pub mod period;

#[cfg(doc)]
use common::DateTime;
use common::{define_kind, unit, DateTimeOf, Money};
use derive_more::{AsRef, Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{car, city, user};
#[cfg(doc)]
use crate::domain::{Car, City, User};

pub use self::period::Period;

/// Confirmed reservation of a [`Car`] for a [`Period`].
#[derive(Clone, Debug)]
pub struct Booking {
    /// ID of this [`Booking`].
    pub id: Id,

    /// ID of the rented [`Car`].
    ///
    /// Nulled when the [`Car`] is removed from the fleet (possible only once
    /// this [`Booking`] is fully in the past).
    pub car_id: Option<car::Id>,

    /// ID of the renting [`User`].
    pub user_id: user::Id,

    /// [`Status`] of this [`Booking`].
    ///
    /// Only [`Status::Confirmed`] [`Booking`]s participate in availability
    /// conflict checks.
    pub status: Status,

    /// Rented [`Period`] of this [`Booking`].
    pub period: Period,

    /// ID of the [`City`] the [`Car`] is picked up in.
    ///
    /// Nulled when the referred [`City`] is removed.
    pub pickup_city_id: Option<city::Id>,

    /// ID of the [`City`] the [`Car`] is returned in.
    ///
    /// Nulled when the referred [`City`] is removed.
    pub delivery_city_id: Option<city::Id>,

    /// [`DateTime`] when this [`Booking`] was confirmed.
    pub created_at: CreationDateTime,

    /// [`DateTime`] when the [`Car`] was picked up, if it was.
    pub taken_at: Option<PickupDateTime>,

    /// [`DateTime`] when the [`Car`] was returned and reviewed, if it was.
    pub returned_at: Option<ReturnDateTime>,

    /// Return [`Review`] of this [`Booking`], recorded on return.
    pub review: Option<Review>,
}

impl Booking {
    /// Indicates whether this [`Booking`] is active (confirmed and not
    /// cancelled).
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == Status::Confirmed
    }

    /// Returns the unpaid [`Fine`] of this [`Booking`], if any.
    #[must_use]
    pub fn unsettled_fine(&self) -> Option<&Fine> {
        self.review
            .as_ref()
            .and_then(|r| r.fine.as_ref())
            .filter(|f| !f.paid)
    }
}

/// ID of a [`Booking`].
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    PartialEq,
    Serialize,
)]
#[cfg_attr(feature = "postgres", derive(ToSql, FromSql), postgres(transparent))]
pub struct Id(Uuid);

impl Id {
    /// Creates a new random [`Id`].
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

define_kind! {
    #[doc = "Status of a [`Booking`]."]
    enum Status {
        #[doc = "The [`Booking`] is confirmed and holds its [`Period`]."]
        Confirmed = 1,

        #[doc = "The [`Booking`] was cancelled before its [`Period`] started."]
        Cancelled = 2,
    }
}

/// Return review of a [`Booking`], recorded by an admin when the [`Car`]
/// comes back.
#[derive(Clone, Debug)]
pub struct Review {
    /// Whether the [`Car`] was returned on the agreed date.
    pub on_said_date: bool,

    /// Whether the [`Car`] was returned at the agreed time.
    pub on_said_time: bool,

    /// Whether the [`Car`] was returned in a proper condition.
    pub proper_condition: bool,

    /// Free-text notes of the reviewing admin.
    pub description: Description,

    /// [`Fine`] assessed against the renter, if any.
    pub fine: Option<Fine>,
}

/// Fine liability assessed against the renter of a single [`Booking`].
///
/// An unpaid [`Fine`] on any of a [`User`]'s [`Booking`]s gates that
/// [`User`] out of new reservations until settled.
#[derive(Clone, Copy, Debug)]
pub struct Fine {
    /// Assessed amount.
    pub amount: Money,

    /// Whether this [`Fine`] has been settled.
    pub paid: bool,
}

/// Free-text description of a return [`Review`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Description(String);

impl Description {
    /// Creates a new [`Description`] without checking it.
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `text` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// Creates a new [`Description`] if the given `text` is valid.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Option<Self> {
        let text = text.into();
        Self::check(&text).then_some(Self(text))
    }

    /// Checks whether the given `text` is a valid [`Description`].
    fn check(text: impl AsRef<str>) -> bool {
        let text = text.as_ref();
        text.trim() == text && !text.is_empty() && text.len() <= 2048
    }
}

impl FromStr for Description {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Description`")
    }
}

/// [`DateTime`] when a [`Booking`] was confirmed.
pub type CreationDateTime = DateTimeOf<(Booking, unit::Creation)>;

/// [`DateTime`] when the [`Car`] of a [`Booking`] was picked up.
pub type PickupDateTime = DateTimeOf<(Booking, unit::Pickup)>;

/// [`DateTime`] when the [`Car`] of a [`Booking`] was returned.
pub type ReturnDateTime = DateTimeOf<(Booking, unit::Return)>;
