//! Descriptive analytics over the 2022 Citi Bike extracts.
//!
//! The library is the load, filter and aggregate pipeline plus plain-text
//! page renderings; the binary only wires CLI selections into it.

pub mod config;
pub mod error;
pub mod filter;
pub mod insights;
pub mod loader;
pub mod output;
pub mod pages;
pub mod pipeline;
pub mod reports;
pub mod season;
pub mod types;
pub mod util;
