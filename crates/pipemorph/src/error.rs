use crate::path::PathError;

/// Construction-time validation codes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorCode {
    UnsupportedVersion,
    InvalidPath,
    MissingAggregationField,
    InvalidFilterValue,
    InvalidClampBounds,
    InvalidPercentageTotal,
    InvalidDelimiterLength,
    InvalidTemplatePlaceholder,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::UnsupportedVersion => "UnsupportedVersion",
            ErrorCode::InvalidPath => "InvalidPath",
            ErrorCode::MissingAggregationField => "MissingAggregationField",
            ErrorCode::InvalidFilterValue => "InvalidFilterValue",
            ErrorCode::InvalidClampBounds => "InvalidClampBounds",
            ErrorCode::InvalidPercentageTotal => "InvalidPercentageTotal",
            ErrorCode::InvalidDelimiterLength => "InvalidDelimiterLength",
            ErrorCode::InvalidTemplatePlaceholder => "InvalidTemplatePlaceholder",
        }
    }
}

/// One defect found while validating a pipeline definition.
///
/// `path` points into the definition document, e.g. `pipeline[2].field`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefinitionError {
    pub code: ErrorCode,
    pub message: String,
    pub path: Option<String>,
}

impl DefinitionError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            path: None,
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }
}

pub type ValidationResult = Result<(), Vec<DefinitionError>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineErrorKind {
    /// Malformed operation parameters discovered while executing a stage.
    InvalidOperation,
    /// A path string that does not compile.
    InvalidPath,
    /// The run was cancelled via its token; distinct from any data-driven
    /// outcome, including an empty result.
    Cancelled,
}

/// Fatal pipeline failure.
///
/// Per-element data issues (kind mismatches, unresolved paths, non-numeric
/// aggregation inputs) are never errors; they are absorbed by the
/// per-operation pass-through and exclusion rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineError {
    pub kind: PipelineErrorKind,
    pub message: String,
    pub stage: Option<usize>,
    pub path: Option<String>,
}

impl PipelineError {
    pub fn new(kind: PipelineErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            stage: None,
            path: None,
        }
    }

    pub fn cancelled() -> Self {
        Self::new(PipelineErrorKind::Cancelled, "pipeline run cancelled")
    }

    pub fn with_stage(mut self, stage: usize) -> Self {
        self.stage = Some(stage);
        self
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn is_cancelled(&self) -> bool {
        self.kind == PipelineErrorKind::Cancelled
    }
}

impl std::fmt::Display for PipelineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(stage) = self.stage {
            write!(f, "stage {}: ", stage)?;
        }
        write!(f, "{}", self.message)?;
        if let Some(path) = &self.path {
            write!(f, " (path: {})", path)?;
        }
        Ok(())
    }
}

impl std::error::Error for PipelineError {}

impl From<PathError> for PipelineError {
    fn from(err: PathError) -> Self {
        PipelineError::new(PipelineErrorKind::InvalidPath, err.message).with_path(err.path)
    }
}

#[cfg(test)]
mod error_tests {
    use super::*;

    #[test]
    fn display_includes_stage_and_path() {
        let err = PipelineError::new(PipelineErrorKind::InvalidPath, "bad path")
            .with_stage(2)
            .with_path("$.x.");
        assert_eq!(err.to_string(), "stage 2: bad path (path: $.x.)");
    }

    #[test]
    fn cancelled_is_distinguishable() {
        let err = PipelineError::cancelled();
        assert!(err.is_cancelled());
        assert!(!PipelineError::new(PipelineErrorKind::InvalidOperation, "x").is_cancelled());
    }
}
