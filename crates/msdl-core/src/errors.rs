use thiserror::Error;

/// Result type alias using MsdlError
pub type Result<T> = std::result::Result<T, MsdlError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code that callers and tests can match on
/// without depending on message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Structural/Validation
    InvalidInput,
    NotFound,
    AlreadyExists,
    IllegalRelation,
    IllegalReorder,
    CycleDetected,
    MissingField,

    // Document shape
    /// Input is not XML or not an MSDL scenario
    TypeMismatch,

    // Coordinates
    NotImplemented,

    // Integrity
    /// Index and document disagree about an edge
    InvariantViolation,

    // Integration/IO
    Serialization,

    // Internal
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ExErrorKind::NotFound => "ERR_NOT_FOUND",
            ExErrorKind::AlreadyExists => "ERR_ALREADY_EXISTS",
            ExErrorKind::IllegalRelation => "ERR_ILLEGAL_RELATION",
            ExErrorKind::IllegalReorder => "ERR_ILLEGAL_REORDER",
            ExErrorKind::CycleDetected => "ERR_CYCLE_DETECTED",
            ExErrorKind::MissingField => "ERR_MISSING_FIELD",
            ExErrorKind::TypeMismatch => "ERR_TYPE_MISMATCH",
            ExErrorKind::NotImplemented => "ERR_NOT_IMPLEMENTED",
            ExErrorKind::InvariantViolation => "ERR_INVARIANT_VIOLATION",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }
}

/// Canonical structured error type
///
/// Carries classification fields for programmatic handling and context for
/// debugging.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    entity_id: Option<String>,
    message: String,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            entity_id: None,
            message: String::new(),
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add entity ID context
    pub fn with_entity_id(mut self, id: impl Into<String>) -> Self {
        self.entity_id = Some(id.into());
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
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

    pub fn entity_id(&self) -> Option<&str> {
        self.entity_id.as_deref()
    }

    pub fn message(&self) -> &str {
        &self.message
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
        if let Some(entity_id) = &self.entity_id {
            write!(f, " (entity_id: {})", entity_id)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {}

// ========== End Error Facility ==========

/// Error taxonomy for scenario operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MsdlError {
    // ===== Relation Errors =====
    /// Relation source handle does not resolve
    #[error("Source not found: {handle}")]
    SourceNotFound { handle: String },

    /// Relation target handle does not resolve
    #[error("Target not found: {handle}")]
    TargetNotFound { handle: String },

    /// Source and target are the same entity
    #[error("Cannot relate {handle} to itself")]
    SelfRelation { handle: String },

    #[error("cannot make EquipmentItem a child of another EquipmentItem ({source_handle} -> {target})")]
    EquipmentUnderEquipment { source_handle: String, target: String },

    #[error("cannot make a Unit a child of EquipmentItem ({source_handle} -> {target})")]
    UnitUnderEquipment { source_handle: String, target: String },

    /// Only Units and EquipmentItems can be relation sources
    #[error("ForceSide {handle} cannot be a relation source")]
    InvalidRelationSource { handle: String },

    /// Reorder target has no superior to share
    #[error("Target {handle} has no superior to reorder against")]
    TargetHasNoSuperior { handle: String },

    #[error("Cannot reorder {source_handle} among siblings of {target}: different child lists")]
    IncompatibleSiblings { source_handle: String, target: String },

    #[error("Cycle detected: relation would make {handle} its own ancestor")]
    CycleDetected { handle: String },

    // ===== Lookup Errors =====
    #[error("Unit not found: {handle}")]
    UnitNotFound { handle: String },

    #[error("EquipmentItem not found: {handle}")]
    EquipmentNotFound { handle: String },

    #[error("ForceSide not found: {handle}")]
    ForceSideNotFound { handle: String },

    #[error("Federate not found: {handle}")]
    FederateNotFound { handle: String },

    /// Owner handle names neither a Unit nor a ForceSide
    #[error("Owner not found: {handle}")]
    OwnerNotFound { handle: String },

    #[error("Object handle already in use: {handle}")]
    DuplicateHandle { handle: String },

    /// Entity handed to an add operation was not built for this document
    #[error("Entity {handle} cannot be added: {reason}")]
    ForeignEntity { handle: String, reason: String },

    /// A force must pledge allegiance to a side, not to another force
    #[error("ForceSide {handle} is not a side")]
    NotASide { handle: String },

    /// Nothing to attach a new entity to
    #[error("Scenario has no primary side")]
    NoPrimarySide,

    // ===== Document Errors =====
    #[error("ScenarioID is missing or has no name")]
    MissingScenarioId,

    #[error("Invalid XML: {message}")]
    InvalidXml { message: String },

    /// Well-formed XML with the wrong root element
    #[error("Not an MSDL scenario: root element is <{root}>")]
    NotAScenario { root: String },

    // ===== Coordinate Errors =====
    #[error("Writing {encoding} locations is not implemented")]
    CoordinateEncodingNotImplemented { encoding: String },

    // ===== Integrity Errors =====
    #[error("Inconsistent edge at {handle}: {reason}")]
    InconsistentEdge { handle: String, reason: String },

    // ===== Internal Errors =====
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

/// Conversion from MsdlError to ExError
impl From<MsdlError> for ExError {
    fn from(err: MsdlError) -> Self {
        let message = err.to_string();
        match err {
            // Lookup -> NotFound
            MsdlError::SourceNotFound { handle }
            | MsdlError::TargetNotFound { handle }
            | MsdlError::UnitNotFound { handle }
            | MsdlError::EquipmentNotFound { handle }
            | MsdlError::ForceSideNotFound { handle }
            | MsdlError::FederateNotFound { handle }
            | MsdlError::OwnerNotFound { handle } => ExError::new(ExErrorKind::NotFound)
                .with_entity_id(handle)
                .with_message(message),

            MsdlError::NoPrimarySide => ExError::new(ExErrorKind::NotFound).with_message(message),

            MsdlError::DuplicateHandle { handle } => ExError::new(ExErrorKind::AlreadyExists)
                .with_entity_id(handle)
                .with_message(message),

            MsdlError::ForeignEntity { handle, .. } => ExError::new(ExErrorKind::InvalidInput)
                .with_entity_id(handle)
                .with_message(message),

            // Relation matrix -> IllegalRelation
            MsdlError::SelfRelation { handle }
            | MsdlError::InvalidRelationSource { handle }
            | MsdlError::NotASide { handle } => ExError::new(ExErrorKind::IllegalRelation)
                .with_entity_id(handle)
                .with_message(message),

            MsdlError::EquipmentUnderEquipment { source_handle, .. }
            | MsdlError::UnitUnderEquipment { source_handle, .. } => {
                ExError::new(ExErrorKind::IllegalRelation)
                    .with_entity_id(source_handle)
                    .with_message(message)
            }

            // Sibling context -> IllegalReorder
            MsdlError::TargetHasNoSuperior { handle } => ExError::new(ExErrorKind::IllegalReorder)
                .with_entity_id(handle)
                .with_message(message),

            MsdlError::IncompatibleSiblings { source_handle, .. } => {
                ExError::new(ExErrorKind::IllegalReorder)
                    .with_entity_id(source_handle)
                    .with_message(message)
            }

            MsdlError::CycleDetected { handle } => ExError::new(ExErrorKind::CycleDetected)
                .with_entity_id(handle)
                .with_message(message),

            MsdlError::MissingScenarioId => {
                ExError::new(ExErrorKind::MissingField).with_message(message)
            }

            // Not a scenario document -> TypeMismatch
            MsdlError::InvalidXml { .. } | MsdlError::NotAScenario { .. } => {
                ExError::new(ExErrorKind::TypeMismatch)
                    .with_op("load")
                    .with_message(message)
            }

            MsdlError::CoordinateEncodingNotImplemented { .. } => {
                ExError::new(ExErrorKind::NotImplemented).with_message(message)
            }

            MsdlError::InconsistentEdge { handle, .. } => {
                ExError::new(ExErrorKind::InvariantViolation)
                    .with_entity_id(handle)
                    .with_message(message)
            }

            MsdlError::Serialization { .. } => {
                ExError::new(ExErrorKind::Serialization).with_message(message)
            }

            MsdlError::Internal { .. } => ExError::new(ExErrorKind::Internal).with_message(message),
        }
    }
}

/// Conversion from serde_json::Error to MsdlError
impl From<serde_json::Error> for MsdlError {
    fn from(err: serde_json::Error) -> Self {
        MsdlError::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<crate::xml::XmlError> for MsdlError {
    fn from(err: crate::xml::XmlError) -> Self {
        MsdlError::InvalidXml {
            message: err.to_string(),
        }
    }
}
