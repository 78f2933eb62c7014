use thiserror::Error;

/// Errors raised while loading configuration or draft files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read {path}: {source}")]
    FileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    FileParse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
}

/// A single violated form field.
///
/// `field` uses the form's dotted path notation, e.g. `variation_list.1.value`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Every field violation found in one validation pass.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{} field(s) failed validation", .0.len())]
pub struct ValidationErrors(pub Vec<FieldError>);

impl ValidationErrors {
    #[must_use]
    pub fn fields(&self) -> &[FieldError] {
        &self.0
    }

    /// Returns the message attached to `field`, if that field failed.
    #[must_use]
    pub fn message_for(&self, field: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }

    #[must_use]
    pub fn contains(&self, field: &str) -> bool {
        self.0.iter().any(|e| e.field == field)
    }
}

/// Category tree violations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("{0}")]
    Invalid(ValidationErrors),

    #[error("category {id} appears as its own descendant at {path}")]
    Cycle { id: i64, path: String },
}

/// Boxed error used at collaborator boundaries.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The submission transport failed. Always retryable by re-submitting.
#[derive(Debug, Error)]
#[error("submission transport failed: {0}")]
pub struct TransportError(#[source] pub BoxError);

impl TransportError {
    pub fn new(err: impl Into<BoxError>) -> Self {
        Self(err.into())
    }
}

/// A reference list could not be fetched.
#[derive(Debug, Error)]
#[error("failed to load {resource}: {source}")]
pub struct ReferenceDataError {
    pub resource: &'static str,
    #[source]
    pub source: BoxError,
}

impl ReferenceDataError {
    pub fn new(resource: &'static str, err: impl Into<BoxError>) -> Self {
        Self {
            resource,
            source: err.into(),
        }
    }
}

/// Why a submission did not reach the server or was not accepted.
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("submission rejected: {0}")]
    Invalid(#[from] ValidationErrors),

    #[error("submission rejected: {0}")]
    InvalidTree(#[from] TreeError),

    #[error("a submission is already in flight")]
    InFlight,

    #[error(transparent)]
    Transport(#[from] TransportError),
}
