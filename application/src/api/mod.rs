//! GraphQL API definitions.

pub mod booking;
pub mod car;
pub mod catalog;
pub mod intent;
pub mod maintenance;
mod mutation;
mod query;
pub mod scalar;
mod subscription;
pub mod user;

use crate::define_error;

pub use self::{
    booking::Booking, car::Car, mutation::Mutation, query::Query,
    subscription::Subscription, user::User,
};

/// GraphQL schema.
pub type Schema = juniper::RootNode<'static, Query, Mutation, Subscription>;

define_error! {
    enum PrivilegeError {
        #[code = "NOT_ADMIN"]
        #[status = FORBIDDEN]
        #[message = "Authenticated `User` must be an admin"]
        Admin,

        #[code = "NOT_SUPER_ADMIN"]
        #[status = FORBIDDEN]
        #[message = "Authenticated `User` must be a super admin"]
        SuperAdmin,
    }
}

define_error! {
    enum PaginationError {
        #[code = "AMBIGUOUS_PAGINATION_ARGUMENTS"]
        #[status = BAD_REQUEST]
        #[message = "Ambiguous pagination arguments"]
        Ambiguous,
    }
}
