//! Storage infrastructure: configuration file loading.
//!
//! The daemon only ever reads its configuration.  The `config` sub-module
//! resolves the file location, parses the TOML, fills in defaults for
//! anything omitted and validates the result before any hook is installed.

pub mod config;
