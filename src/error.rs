use thiserror::Error;

/// Errors raised by the schema layer while reading or validating a definition.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("Syntax error: {message}")]
    Syntax {
        message: String,
        line: usize,
        column: usize,
    },

    #[error("Definition does not match the expected structure: {0}")]
    Structure(String),

    #[error("Invalid definition: {0}")]
    Validation(String),
}

impl SchemaError {
    /// Returns `true` if the definition could not be read as JSON at all.
    pub fn is_syntax(&self) -> bool {
        matches!(self, SchemaError::Syntax { .. })
    }

    /// Converts a `serde_json` error, naming the offending character for syntax errors.
    pub(crate) fn from_json(err: serde_json::Error, bytes: &[u8]) -> Self {
        use serde_json::error::Category;

        match err.classify() {
            Category::Syntax | Category::Eof => {
                let (line, column) = (err.line(), err.column());
                let message = match offending_char(bytes, line, column) {
                    Some(ch) => format!("invalid character '{}' ({})", ch, err),
                    None => err.to_string(),
                };
                SchemaError::Syntax {
                    message,
                    line,
                    column,
                }
            }
            Category::Data | Category::Io => SchemaError::Structure(err.to_string()),
        }
    }
}

/// serde_json reports 1-based byte columns pointing at the character it choked on.
fn offending_char(bytes: &[u8], line: usize, column: usize) -> Option<char> {
    let line_bytes = bytes.split(|b| *b == b'\n').nth(line.checked_sub(1)?)?;
    let byte = *line_bytes.get(column.checked_sub(1)?)?;
    byte.is_ascii_graphic().then_some(byte as char)
}

/// Errors that can occur while detecting the dialect of a definition.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DetectionError {
    #[error("Unknown app definition dialect, expecting one of: {expected}")]
    UnknownDialect { expected: String },
}

/// Errors that can occur while migrating a V1 definition into the canonical graph.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransformError {
    #[error("Reference '{reference}' used by '{node}' does not resolve to a known component")]
    UnresolvedReference { node: String, reference: String },

    #[error("Canonical name '{name}' is produced by more than one component")]
    NameCollision { name: String },

    #[error("Component '{node}' cannot be rewritten: {message}")]
    MalformedPayload { node: String, message: String },

    #[error("No free port left to allocate for '{node}'")]
    PortRangeExhausted { node: String },
}

/// Errors that can occur while expanding a graph into instance descriptors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExpansionError {
    #[error("Node '{node}' references '{link}', which is not a materialized node")]
    UnresolvedReference { node: String, link: String },

    #[error("Node '{node}' declares an invalid volume size: '{value}'")]
    InvalidVolumeSize { node: String, value: String },
}

/// Errors returned by an [`InstanceRepository`](crate::expand::InstanceRepository).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("Instance '{0}' has already been scheduled")]
    DuplicateInstance(String),
}

/// Any error raised while running the full pipeline from raw bytes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Detection(#[from] DetectionError),

    #[error(transparent)]
    Transform(#[from] TransformError),

    #[error(transparent)]
    Expansion(#[from] ExpansionError),
}
