use thiserror::Error;

/// Result type alias using ExError
pub type Result<T> = std::result::Result<T, ExError>;

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable code that hosts can match on, e.g. to pick the
/// degraded-mode notice to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Validation
    InvalidInput,
    InvalidConfig,

    // Engine lifecycle
    /// The embedded engine runtime could not be loaded
    EngineUnavailable,
    /// Persisted bytes are not a usable engine image
    CorruptSnapshot,
    /// A schema migration failed to apply
    Migration,

    // Statement path
    StatementExecution,

    // Snapshot store
    PersistenceRead,
    PersistenceWrite,

    // Integration/IO
    Io,

    // Internal
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ExErrorKind::InvalidConfig => "ERR_INVALID_CONFIG",
            ExErrorKind::EngineUnavailable => "ERR_ENGINE_UNAVAILABLE",
            ExErrorKind::CorruptSnapshot => "ERR_CORRUPT_SNAPSHOT",
            ExErrorKind::Migration => "ERR_MIGRATION",
            ExErrorKind::StatementExecution => "ERR_STATEMENT_EXECUTION",
            ExErrorKind::PersistenceRead => "ERR_PERSISTENCE_READ",
            ExErrorKind::PersistenceWrite => "ERR_PERSISTENCE_WRITE",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }

    /// True for faults on the mutation path that callers must see
    pub fn is_write_path(&self) -> bool {
        matches!(
            self,
            ExErrorKind::StatementExecution | ExErrorKind::PersistenceWrite
        )
    }
}

/// Canonical structured error type
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    key: Option<String>,
    message: String,
    source: Option<Box<ExError>>,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            key: None,
            message: String::new(),
            source: None,
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add the snapshot key the operation was working on
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Add source error
    pub fn with_source(mut self, source: ExError) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the source error, if any
    pub fn source_error(&self) -> Option<&ExError> {
        self.source.as_deref()
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(key) = &self.key {
            write!(f, " (key: {})", key)?;
        }
        if let Some(source) = &self.source {
            write!(f, " <- {}", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|s| s as &(dyn std::error::Error + 'static))
    }
}

/// Domain-level errors raised while handling chat values and configuration
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChatlogError {
    /// Role text is not one of user/model/system
    #[error("Unknown role: {value}")]
    UnknownRole { value: String },

    /// Configuration failed validation
    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    /// Configuration text could not be parsed
    #[error("Failed to parse configuration: {message}")]
    ConfigParse { message: String },
}

impl From<ChatlogError> for ExError {
    fn from(err: ChatlogError) -> Self {
        match err {
            ChatlogError::UnknownRole { value } => ExError::new(ExErrorKind::InvalidInput)
                .with_op("parse_role")
                .with_message(format!("Unknown role: {}", value)),

            ChatlogError::InvalidConfig { reason } => {
                ExError::new(ExErrorKind::InvalidConfig).with_message(reason)
            }

            ChatlogError::ConfigParse { message } => ExError::new(ExErrorKind::InvalidConfig)
                .with_op("parse_config")
                .with_message(message),
        }
    }
}
