//! Read entities definitions.

pub mod booking;
pub mod car;
pub mod catalog;
pub mod user;
