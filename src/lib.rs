#[macro_use]
pub mod macros;

pub mod collector;
pub mod config;
pub mod encoding;
pub mod fetcher;
pub mod parser;
pub mod record;
pub mod scan;
