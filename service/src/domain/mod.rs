//! Domain definitions.

pub mod booking;
pub mod car;
pub mod catalog;
pub mod city;
pub mod intent;
pub mod maintenance;
pub mod payment;
pub mod user;

pub use self::{
    booking::Booking, car::Car, city::City, intent::RentalIntent,
    maintenance::MaintenanceRecord, payment::PaymentConfirmation, user::User,
};
