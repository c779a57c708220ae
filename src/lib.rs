#[macro_use]
pub mod macros;

pub mod auth;
pub mod config;
pub mod credentials;
pub mod error;
pub mod extractor;
pub mod parser;
pub mod period;
pub mod progress;
pub mod reconcile;
pub mod schema;
pub mod scrape;
pub mod session;
pub mod transport;

pub use crate::{
    error::ScrapeError,
    scrape::{fetch_all, fetch_all_at},
};
