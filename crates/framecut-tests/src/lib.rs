//! Integration test crate for Framecut.
//!
//! This crate exists solely to hold cross-crate integration tests.
//! It depends on multiple framecut crates to verify they work together.

#[cfg(test)]
mod support;

#[cfg(test)]
mod compositing;
