//! Shared harness for the guest portal integration tests.

pub mod fixtures;
pub mod mocks;
pub mod setup;
