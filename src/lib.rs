//! Client for the CDS log viewer protocol: route listing over NDJSON,
//! incremental log tailing and job-name resolution.

pub mod app_state;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod errors;
pub mod logging;
