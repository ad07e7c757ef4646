use serde_json::{json, Value};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Stable JSON-RPC error codes returned to callers.
pub mod codes {
    pub const PARSE_ERROR: i32 = -32700;
    pub const INVALID_REQUEST: i32 = -32600;
    pub const METHOD_NOT_FOUND: i32 = -32601;
    pub const INVALID_PARAMS: i32 = -32602;
    pub const INTERNAL_ERROR: i32 = -32603;
    pub const NOT_FOUND: i32 = -32004;
    pub const DEPENDENCY_UNAVAILABLE: i32 = -32005;
}

#[derive(Debug, Error)]
pub enum McpError {
    // Protocol Errors
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Method not found: {0}")]
    UnknownMethod(String),

    #[error("Method not found: unknown tool '{0}'")]
    UnknownTool(String),

    #[error("Invalid params: {0}")]
    InvalidParams(String),

    #[error("Message too large: {0} bytes (max: {1})")]
    MessageTooLarge(usize, usize),

    // Lookup Errors
    #[error("Not found: {0}")]
    NotFound(String),

    // Delegate Errors
    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Generation(#[from] GenerationError),

    // Internal Errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl McpError {
    /// Convert to JSON-RPC error code
    pub fn error_code(&self) -> i32 {
        match self {
            Self::Parse(_) => codes::PARSE_ERROR,
            Self::InvalidRequest(_) | Self::MessageTooLarge(_, _) => codes::INVALID_REQUEST,
            Self::UnknownMethod(_) | Self::UnknownTool(_) => codes::METHOD_NOT_FOUND,
            Self::InvalidParams(_) => codes::INVALID_PARAMS,
            Self::NotFound(_) => codes::NOT_FOUND,
            Self::Scan(ScanError::InterfaceNotFound { .. }) => codes::NOT_FOUND,
            Self::Scan(ScanError::InvalidPattern { .. }) => codes::INVALID_PARAMS,
            Self::Config(ConfigError::NotFound(_)) => codes::NOT_FOUND,
            Self::Config(ConfigError::Invalid(_)) => codes::INVALID_PARAMS,
            Self::Generation(GenerationError::DependencyUnavailable { .. }) => {
                codes::DEPENDENCY_UNAVAILABLE
            }
            _ => codes::INTERNAL_ERROR,
        }
    }

    /// Structured detail attached to the JSON-RPC error, if any
    pub fn error_data(&self) -> Option<Value> {
        match self {
            Self::Generation(GenerationError::ToolFailed { status, output }) => Some(json!({
                "exit_status": status,
                "output": output,
            })),
            Self::Generation(GenerationError::DependencyUnavailable { command, install_hint }) => {
                Some(json!({ "command": command, "install": install_hint }))
            }
            Self::Generation(GenerationError::PathResolution { path, source })
            | Self::Generation(GenerationError::CreateOutputDir { path, source }) => Some(json!({
                "path": path,
                "cause": source.to_string(),
            })),
            Self::Config(ConfigError::Io { path, source }) => Some(json!({
                "path": path,
                "cause": source.to_string(),
            })),
            Self::Scan(ScanError::Io { path, source }) => Some(json!({
                "path": path,
                "cause": source.to_string(),
            })),
            Self::Scan(_) | Self::Generation(_) | Self::Config(_) | Self::Internal(_) => {
                Some(Value::String(self.to_string()))
            }
            _ => None,
        }
    }

    /// Create JSON-RPC error response
    pub fn to_json_rpc_error(&self, id: Option<Value>) -> Value {
        let mut error = json!({
            "code": self.error_code(),
            "message": self.to_string(),
        });
        if let Some(data) = self.error_data() {
            error["data"] = data;
        }
        json!({
            "jsonrpc": "2.0",
            "error": error,
            "id": id,
        })
    }
}

// Result type alias for convenience
pub type McpResult<T> = Result<T, McpError>;

/// Errors raised while discovering interfaces in Go sources
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to walk {}: {source}", path.display())]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("failed to parse file {}", path.display())]
    Parse { path: PathBuf },

    #[error("failed to load Go grammar: {0}")]
    Language(String),

    #[error("interface {name} not found in file {}", path.display())]
    InterfaceNotFound { name: String, path: PathBuf },

    #[error("invalid file pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },
}

/// Configuration fields that failed validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("filename is required")]
    MissingFilename,

    #[error("outpkg is required")]
    MissingOutPkg,

    #[error("package path cannot be empty")]
    EmptyPackagePath,

    #[error("package {package} has no interfaces configured")]
    EmptyPackage { package: String },

    #[error("interface name cannot be empty in package {package}")]
    EmptyInterfaceName { package: String },

    #[error("directory is required for interface {interface} in package {package}")]
    MissingDirectory { package: String, interface: String },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Invalid(#[from] ValidationError),

    #[error("configuration file {} does not exist", .0.display())]
    NotFound(PathBuf),

    #[error("invalid configuration in {}: {source}", path.display())]
    InvalidFile {
        path: PathBuf,
        #[source]
        source: ValidationError,
    },

    #[error("failed to access configuration file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed configuration in {}: {source}", path.display())]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("{command} command not found in PATH. Please install mockery: {install_hint}")]
    DependencyUnavailable {
        command: String,
        install_hint: &'static str,
    },

    #[error("failed to resolve package path {}: {source}", path.display())]
    PathResolution {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to create output directory {}: {source}", path.display())]
    CreateOutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to start {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to generate mock: mockery exited with {status}")]
    ToolFailed { status: String, output: String },

    #[error("Failed to generate mock: mockery did not finish within {0:?}")]
    TimedOut(Duration),
}
