//! Registration module.
//!
//! Turns a user's level selection into a stored record and, for first-time
//! registrations, an immediate story delivered out-of-band from the
//! scheduler.

mod handler;

pub use handler::{RegistrationError, RegistrationHandler, RegistrationOutcome};
