//! [`Car`]-related read definitions.
//!
//! [`Car`]: crate::domain::Car

pub mod list {
    //! Available [`Car`]s list definitions.
    //!
    //! [`Car`]: crate::domain::Car

    use common::define_pagination;
    use derive_more::{From, Into};

    use crate::domain::{booking::Period, car, city};
    #[cfg(doc)]
    use crate::domain::{Car, City};

    define_pagination!(Cursor, Node, Filter);

    /// Node in a [`Connection`].
    pub type Node = car::Id;

    /// Cursor pointing to a specific [`Car`] in a list.
    pub type Cursor = car::Id;

    /// Filter for [`Selector`].
    ///
    /// Selects in-service [`Car`]s located in the [`City`] with no active
    /// booking intersecting the [`Period`], in stable [`car::Id`] order.
    #[derive(Clone, Copy, Debug)]
    pub struct Filter {
        /// ID of the [`City`] to search in.
        pub city_id: city::Id,

        /// Requested rental [`Period`].
        pub period: Period,
    }

    /// Total count of available [`Car`]s matching a [`Filter`].
    #[derive(Clone, Copy, Debug, Eq, From, Hash, Into, PartialEq)]
    pub struct TotalCount(i32);
}
