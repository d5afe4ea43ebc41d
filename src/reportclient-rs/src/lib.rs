//! reportclient Client Library
//!
//! HTTP client for the reporting API: one awaited POST per operation, with
//! the response mapped into typed values or a [`ClientError`].

mod actions;
mod client;
pub mod decode;

pub use client::ReportClient;
pub use reportclient_core::{
    keys, Action, ClientConfig, ExportFormat, GroupDetails, ImportErrorPolicy, ImportOperation,
    ImportResult, ImportType, LookupErrorPolicy, Params, PermissionInfo, PlanInfo, ProxyConfig,
    ProxyKind, ShareInfo,
};

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The HTTP exchange itself failed (DNS, connect, TLS, timeout, local file)
    #[error("IO error for {action} (HTTP status {status:?}): {message}")]
    Transport {
        message: String,
        action: Action,
        status: Option<u16>,
    },

    /// The body could not be read as the expected JSON, even after unescaping
    #[error("Returned JSON format for {action} is not proper. Could possibly be version mismatch")]
    Parse { action: Action },

    /// The service answered with an error envelope
    #[error("Server error {code} for {action} (HTTP status {status}): {message}")]
    Server {
        code: i64,
        message: String,
        action: Action,
        status: u16,
    },

    #[error("Invalid client configuration: {0}")]
    Configuration(String),
}

impl ClientError {
    /// Action that was attempted, if the error came from an operation
    pub fn action(&self) -> Option<Action> {
        match self {
            ClientError::Transport { action, .. }
            | ClientError::Parse { action }
            | ClientError::Server { action, .. } => Some(*action),
            ClientError::Configuration(_) => None,
        }
    }

    /// Service error code, for branching on server-side failures
    pub fn code(&self) -> Option<i64> {
        match self {
            ClientError::Server { code, .. } => Some(*code),
            _ => None,
        }
    }

    pub fn http_status(&self) -> Option<u16> {
        match self {
            ClientError::Transport { status, .. } => *status,
            ClientError::Server { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
