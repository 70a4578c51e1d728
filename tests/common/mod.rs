//! Common test utilities for image-fetcher integration tests

#[allow(dead_code)]
pub mod fixtures;
#[allow(dead_code)]
pub mod server;

#[allow(unused_imports)]
pub use fixtures::*;
#[allow(unused_imports)]
pub use server::*;
