//! Library side of the `gwbind` command: configuration, logging setup and
//! binding/state file handling.

pub mod config;
pub mod files;
pub mod observability;
