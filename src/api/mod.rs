//! Storage service client and types.

pub mod client;
pub mod outcome;

#[cfg(test)]
pub(crate) mod memory;
#[cfg(test)]
pub(crate) mod test_server;

pub use client::{Download, StorageClient, StorageService, DEFAULT_API_URL};
pub use outcome::Outcome;
