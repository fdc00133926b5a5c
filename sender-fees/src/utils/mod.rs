//! # Utilities Module
//!
//! Internal utility modules for the sender-fees crate.

pub(crate) mod logger;

pub use logger::{setup_logger, setup_logger_in, setup_logger_with_file};
