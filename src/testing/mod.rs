//! Testing utilities: headless host harness.

pub mod pilot;

pub use pilot::Pilot;
