//! CLI library components for the hosts manager.

pub mod logging;
