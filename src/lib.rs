//! Source code provider integration for CI pipelines.
//!
//! Links user accounts on GitHub, Bitbucket Cloud and Bitbucket Server to a
//! project, keeps the project's view of admin repositories in sync, and tears
//! everything down again when a provider is disabled.

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod model;
pub mod oauth1;
pub mod providers;
pub mod remote;
pub mod store;

pub use engine::{AccountPolicy, BaseProviderEngine, EngineStores};
pub use errors::{ErrorKind, Result, ScmError};
pub use providers::factory::ProviderRegistry;
