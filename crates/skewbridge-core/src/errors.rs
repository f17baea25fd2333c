use thiserror::Error;

/// Result type alias using TransformError
pub type Result<T> = std::result::Result<T, TransformError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code that can be used for programmatic
/// error handling, log assertions and responses to the management client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Structural/Validation
    InvalidInput,
    InvalidAddress,
    InvalidVersion,
    InvalidDescription,
    MissingField,
    NotFound,
    UnknownModelFields,

    // Compatibility
    RejectedAttributes,
    RejectedResource,
    UnresolvedExpression,
    OperationFailed,

    // Integration/IO
    Io,
    Serialization,

    // Internal
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ExErrorKind::InvalidAddress => "ERR_INVALID_ADDRESS",
            ExErrorKind::InvalidVersion => "ERR_INVALID_VERSION",
            ExErrorKind::InvalidDescription => "ERR_INVALID_DESCRIPTION",
            ExErrorKind::MissingField => "ERR_MISSING_FIELD",
            ExErrorKind::NotFound => "ERR_NOT_FOUND",
            ExErrorKind::UnknownModelFields => "ERR_UNKNOWN_MODEL_FIELDS",
            ExErrorKind::RejectedAttributes => "ERR_REJECTED_ATTRIBUTES",
            ExErrorKind::RejectedResource => "ERR_REJECTED_RESOURCE",
            ExErrorKind::UnresolvedExpression => "ERR_UNRESOLVED_EXPRESSION",
            ExErrorKind::OperationFailed => "ERR_OPERATION_FAILED",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }

    /// Whether errors of this kind report a target-compatibility gap rather
    /// than malformed input
    pub fn is_compatibility(&self) -> bool {
        matches!(
            self,
            ExErrorKind::RejectedAttributes
                | ExErrorKind::RejectedResource
                | ExErrorKind::UnresolvedExpression
        )
    }
}

/// Canonical structured error type
///
/// This error type provides a structured representation of errors with
/// classification fields for programmatic handling and rich context for debugging.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    address: Option<String>,
    host: Option<String>,
    message: String,
    source: Option<Box<ExError>>,
    attributes: Option<Vec<String>>,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            address: None,
            host: None,
            message: String::new(),
            source: None,
            attributes: None,
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add resource address context
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    /// Add target host context
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Add source error
    pub fn with_source(mut self, source: ExError) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Add the attribute names the error is about
    pub fn with_attributes(mut self, attributes: Vec<String>) -> Self {
        self.attributes = Some(attributes);
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// Get the operation context, if any
    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    /// Get the address context, if any
    pub fn address(&self) -> Option<&str> {
        self.address.as_deref()
    }

    /// Get the target host context, if any
    pub fn host(&self) -> Option<&str> {
        self.host.as_deref()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the source error, if any
    pub fn source_error(&self) -> Option<&ExError> {
        self.source.as_deref()
    }

    /// Get the attribute names, if any
    pub fn attributes(&self) -> Option<&[String]> {
        self.attributes.as_deref()
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
        if let Some(address) = &self.address {
            write!(f, " (address: {})", address)?;
        }
        if let Some(host) = &self.host {
            write!(f, " (host: {})", host)?;
        }
        if let Some(source) = &self.source {
            write!(f, " caused by {}", source)?;
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

// ========== End Error Facility ==========

/// Error taxonomy for transformation
///
/// Compatibility rejections and data errors travel through this type.
/// Violations of the output-tree invariants are not represented here: they
/// are programming errors and panic.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransformError {
    // ===== Compatibility =====
    /// Attribute values the target cannot represent
    #[error("Transforming resource {address} for host controller '{host}' to {model} -- there were problems with some of the attributes and this resource will need to be ignored on that host. Details of the problems: {}", details.join(", "))]
    RejectedAttributes {
        address: String,
        host: String,
        /// `core model version 'x'` or `subsystem 'y' model version 'x'`
        model: String,
        details: Vec<String>,
    },

    /// A resource type the target cannot host at all
    #[error("Resource {address} is rejected on the target host, and will need to be ignored on the host")]
    RejectedResource { address: String },

    /// An expression with no value in the captured snapshot
    #[error("Node contains an unresolved expression {expression} -- a resolved model is required")]
    UnresolvedExpression { expression: String },

    // ===== Data =====
    /// Model keys that the registration at the address does not declare
    #[error("model fields not known at {address}: {}", fields.join(", "))]
    ModelFieldsNotKnown { address: String, fields: Vec<String> },

    /// A resource present in the tree without a schema registration
    #[error("no resource registration found for {address}")]
    UnregisteredResource { address: String },

    /// Required operation field missing
    #[error("operation is missing required field '{field}'")]
    MissingOperationField { field: String },

    /// Operation address value could not be parsed
    #[error("invalid address: {reason}")]
    InvalidAddress { reason: String },

    /// Model version string could not be parsed
    #[error("invalid model version: {version}")]
    InvalidVersion { version: String },

    /// Persisted registration description is malformed
    #[error("invalid description at {address}: {reason}")]
    InvalidDescription { address: String, reason: String },

    // ===== Generic =====
    /// Failure raised by a custom transformer
    #[error("Operation failed: {message}")]
    OperationFailed { message: String },
}

/// Conversion from TransformError to ExError
impl From<TransformError> for ExError {
    fn from(err: TransformError) -> Self {
        match err {
            TransformError::RejectedAttributes {
                address,
                host,
                model,
                details,
            } => ExError::new(ExErrorKind::RejectedAttributes)
                .with_address(address)
                .with_host(host)
                .with_message(format!("attributes rejected by {}", model))
                .with_attributes(details),
            TransformError::RejectedResource { address } => {
                ExError::new(ExErrorKind::RejectedResource)
                    .with_address(address)
                    .with_message("Resource is rejected on the target host")
            }
            TransformError::UnresolvedExpression { expression } => {
                ExError::new(ExErrorKind::UnresolvedExpression)
                    .with_op("resolve_expressions")
                    .with_message(format!("Unresolved expression {}", expression))
            }
            TransformError::ModelFieldsNotKnown { address, fields } => {
                ExError::new(ExErrorKind::UnknownModelFields)
                    .with_address(address)
                    .with_message("model fields not known")
                    .with_attributes(fields)
            }
            TransformError::UnregisteredResource { address } => {
                ExError::new(ExErrorKind::NotFound)
                    .with_address(address)
                    .with_message("no resource registration")
            }
            TransformError::MissingOperationField { field } => {
                ExError::new(ExErrorKind::MissingField)
                    .with_message(format!("operation is missing '{}'", field))
            }
            TransformError::InvalidAddress { reason } => {
                ExError::new(ExErrorKind::InvalidAddress).with_message(reason)
            }
            TransformError::InvalidVersion { version } => ExError::new(ExErrorKind::InvalidVersion)
                .with_message(format!("invalid model version {}", version)),
            TransformError::InvalidDescription { address, reason } => {
                ExError::new(ExErrorKind::InvalidDescription)
                    .with_address(address)
                    .with_message(reason)
            }
            TransformError::OperationFailed { message } => {
                ExError::new(ExErrorKind::OperationFailed).with_message(message)
            }
        }
    }
}
