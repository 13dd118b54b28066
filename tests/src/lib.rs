//! Integration tests for flashr.
//!
//! [`support`] provides an in-memory device and catalog that implement the session and
//! catalog ports, so full upgrade cycles run without a network.

pub mod support;

#[cfg(test)]
mod upgrade;
