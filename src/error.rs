use thiserror::Error;

/// Errors produced by the inspector
#[derive(Debug, Error)]
pub enum InspectorError {
    #[error("Failed to launch browser: {0}")]
    LaunchFailed(String),

    #[error("Failed to connect to browser: {0}")]
    ConnectionFailed(String),

    #[error("Tab operation failed: {0}")]
    TabOperationFailed(String),

    #[error("Navigation failed: {0}")]
    NavigationFailed(String),

    #[error("Failed to parse DOM: {0}")]
    DomParseFailed(String),

    #[error("JavaScript evaluation failed: {0}")]
    EvaluationFailed(String),

    #[error("Element not found: {0}")]
    ElementNotFound(String),

    #[error("Tool '{tool}' failed: {reason}")]
    ToolExecutionFailed { tool: String, reason: String },

    #[error("Invalid parameters: {0}")]
    InvalidParams(String),

    /// The definition source could not provide any definitions, or nothing was loaded yet
    #[error("No page object definitions loaded: {0}")]
    NoDefinitionsLoaded(String),

    #[error("Failed to parse definition '{uri}': {reason}")]
    DefinitionParseFailed { uri: String, reason: String },

    #[error("Unknown page object: {0}")]
    UnknownPageObject(String),

    #[error("Page object '{uri}' has no member '{member}'")]
    UnknownMember { uri: String, member: String },

    #[error("No document captured; capture a page or load a snapshot first")]
    NoDocumentLoaded,

    #[error("Unknown member node: {0}")]
    UnknownNode(usize),

    #[error("Invalid selector '{selector}': {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, InspectorError>;
