//! Declarations and descriptor building.
//!
//! - [`MetadataRegistry`]: the explicit record collection
//! - [`ControllerDecl`], [`MethodDecl`], [`MiddlewareDecl`]: fluent declaration
//! - [`MetadataBuilder`]: records to descriptors

mod builder;
mod declare;
mod registry;

pub use builder::MetadataBuilder;
pub use declare::{ControllerDecl, MethodDecl, MiddlewareDecl, ParamSpec};
pub use registry::{
    ActionRecord, ControllerRecord, MetadataRegistry, MethodBinding, MiddlewareRecord,
    ParamRecord, ResultKind, ResultRecord,
};
