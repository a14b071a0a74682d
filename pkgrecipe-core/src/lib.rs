//! Embeddable core library for pkgrecipe.
//!
//! Provides a clap-free entry point for the recipe lifecycle: validate inputs, mirror the module
//! into the workspace, write the source manifest, drive the native orchestrator, and package
//! the results.
//!
//! # Port traits
//!
//! I/O that leaves the process or writes run artifacts goes through [`ports`]:
//! - [`Orchestrator`](ports::Orchestrator) for the external configure/build lifecycle
//! - [`WritePort`](ports::WritePort) for writing run reports
//!
//! The [`adapters`] module provides the default implementations.
//!
//! # Entry points
//!
//! - [`run_build`](pipeline::run_build) sync, manifest, configure, build
//! - [`run_package`](pipeline::run_package) classify and copy build outputs
//! - [`run_clean`](pipeline::run_clean) drop orchestrator output and the manifest
//! - [`package_info`](pipeline::package_info) what downstream consumers link against

pub mod adapters;
pub mod pipeline;
pub mod ports;
pub mod settings;

// Re-exported so embedders don't need pkgrecipe-domain directly.
pub use pkgrecipe_domain::{ConfigError, Recipe, RecipeInputs};
