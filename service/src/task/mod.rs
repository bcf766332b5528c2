//! Background [`Task`]s definitions.

mod background;
pub mod clean_stale_intents;

pub use common::Handler as Task;

pub use self::{
    background::Background, clean_stale_intents::CleanStaleIntents,
};
