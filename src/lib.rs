//! Streaming ingestion of geolocated events for a situational-awareness
//! dashboard.
//!
//! The analysis service answers a relevance query with a streaming HTTP
//! response: UTF-8 JSON documents, each terminated by a NUL byte, with no
//! alignment between transport chunks and frame boundaries. [`client`] turns
//! such a response into an ordered stream of validated [`event::Event`]s,
//! [`drain`] drives any such stream to completion one record at a time, and
//! [`generate`] produces the same stream shape without a network.

pub mod client;
pub mod config;
pub mod drain;
mod error;
pub mod event;
pub mod generate;

pub use error::IngestError;

/// Basic error type, dynamically dispatched and safe to send across threads.
pub type Error = Box<dyn std::error::Error + Send + Sync + 'static>;

pub type Result<T> = std::result::Result<T, Error>;
