//! Domain records shared across the crate

pub mod event;

pub use event::{Event, EventLog};
