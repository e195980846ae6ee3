//! Remote hosts-list plumbing: HTTP fetching and marker-delimited merging.
//!
//! This crate is deliberately free of store or gateway knowledge. It fetches
//! text and transforms text; deciding when to fetch and where the result
//! lands is the service layer's job.

pub mod client;
pub mod merge;

pub use client::{FetchClient, MAX_DIRECT_RESPONSE_BYTES, MAX_RESPONSE_BYTES};
pub use merge::{Segment, begin_marker, clean, end_marker, merge, parse, render};
