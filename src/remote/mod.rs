//! Remote side of the people directory: the HTTP fetcher and the payload
//! parser.

mod client;
mod payload;

pub use client::HttpFetcher;
pub use payload::parse_persons;
