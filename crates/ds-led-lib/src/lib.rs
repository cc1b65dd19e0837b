//! ds-led — battery-driven lightbar and player LEDs for DualSense controllers.
//!
//! The core is pure: a [`resolver::ConfigurationModel`] built once from the
//! config file, and [`resolver::Resolver::resolve`] mapping battery
//! percentage + charge status to a complete [`setting::Setting`]. Device I/O
//! and the polling state machine sit around it in [`device`] and [`monitor`].

pub mod builder;
pub mod config;
pub mod device;
pub mod error;
pub mod led;
pub mod monitor;
pub mod resolver;
pub mod setting;
pub mod status;
pub mod table;

pub use error::DsLedError;
