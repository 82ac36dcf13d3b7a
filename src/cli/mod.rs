//! CLI module
//!
//! Command-line front end for the client.
//!
//! # Commands
//!
//! - `get` - Fetch a single resource
//! - `items` - Stream every element of a paginated endpoint
//! - `pages` - Stream every page of a paginated endpoint
//! - `request` - Send a non-GET request
//! - `upload` - Upload a file
//! - `sis-import` - Start a SIS import

mod commands;
mod runner;

pub use commands::{Cli, Commands};
pub use runner::Runner;
