//! Shared test utilities for the nupd workspace.
//!
//! This crate provides temporary directory trees for updater tests. It is a
//! dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`tree`]: [`TreeFixture`] for building and asserting on file trees

pub mod tree;

pub use tree::TreeFixture;
