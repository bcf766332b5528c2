//! [`Command`] definition.

pub mod authorize_user_session;
pub mod cancel_booking;
pub mod confirm_booking;
pub mod create_car;
pub mod create_catalog_entry;
pub mod create_user;
pub mod create_user_session;
pub mod delete_car;
pub mod delete_catalog_entry;
pub mod enter_maintenance;
pub mod exit_maintenance;
pub mod mark_car_taken;
pub mod rename_catalog_entry;
pub mod review_car_return;
pub mod settle_fine;
pub mod submit_rental_intent;
pub mod update_car;

/// [`Command`] of the [`Service`].
///
/// [`Service`]: crate::Service
pub use common::Handler as Command;

pub use self::{
    authorize_user_session::AuthorizeUserSession,
    cancel_booking::CancelBooking, confirm_booking::ConfirmBooking,
    create_car::CreateCar, create_catalog_entry::CreateCatalogEntry,
    create_user::CreateUser, create_user_session::CreateUserSession,
    delete_car::DeleteCar, delete_catalog_entry::DeleteCatalogEntry,
    enter_maintenance::EnterMaintenance, exit_maintenance::ExitMaintenance,
    mark_car_taken::MarkCarTaken, rename_catalog_entry::RenameCatalogEntry,
    review_car_return::ReviewCarReturn, settle_fine::SettleFine,
    submit_rental_intent::SubmitRentalIntent, update_car::UpdateCar,
};
