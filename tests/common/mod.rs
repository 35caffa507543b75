//! Common test utilities and infrastructure
//!
//! Cucumber world for the form runtime scenarios.

pub mod world;

#[allow(unused_imports)]
pub use world::FormWorld;
