//! Repository implementations.
//!
//! - `local`: in-memory implementation for the mock server and tests
pub mod local;

pub use local::LocalRepository;
