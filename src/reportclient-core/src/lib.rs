//! reportclient Core Library
//!
//! This crate provides the transport-free building blocks of the reporting
//! API binding, including:
//! - The action vocabulary and request parameter map
//! - Resource URI construction
//! - Client configuration
//! - Typed result objects (import summary, plan details, sharing details)

pub mod action;
pub mod config;
pub mod lenient;
pub mod models;
pub mod params;
pub mod share;
pub mod uri;

// Re-export commonly used types
pub use action::{Action, ExportFormat, ImportErrorPolicy, ImportType, LookupErrorPolicy};
pub use config::{ClientConfig, ProxyConfig, ProxyKind, API_VERSION};
pub use models::{ImportOperation, ImportResult, PlanInfo};
pub use params::{keys, ActionRequest, Params};
pub use share::{GroupDetails, PermissionInfo, ShareInfo};
