//! # sockroute-std
//!
//! Standard implementations for the Sockroute socket controller framework.
//!
//! This crate provides:
//! - **Declarations**: [`MetadataRegistry`](metadata::MetadataRegistry) and
//!   its fluent API
//! - **Descriptor building**: [`MetadataBuilder`](metadata::MetadataBuilder)
//! - **Dispatch**: [`Executor`](executor::Executor), which registers
//!   controllers and middlewares on a messaging root
//! - **Configuration**: [`ExecutorOptions`](config::ExecutorOptions)
//! - **Mappers**: [`IdentityMapper`](mapper::IdentityMapper),
//!   [`PruneMapper`](mapper::PruneMapper)
//! - **Test doubles**: [`testing`]

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

// Re-export core traits
pub use sockroute_core;

// Modules
pub mod config;
pub mod executor;
pub mod mapper;
pub mod metadata;
pub mod testing;
