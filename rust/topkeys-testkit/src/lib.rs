//! Test utilities for the topkeys project.
//!
//! This crate provides deterministic generators of `key count` files, used by
//! the test suites and by the `topkeys generate` command.

pub mod data_gen;
