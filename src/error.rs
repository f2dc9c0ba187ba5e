use thiserror::Error;

/// Central error type for ingest pipelines
#[derive(Error, Debug)]
pub enum IngestError {
    // ============================================================================
    // Stage Errors
    // ============================================================================
    /// Failure raised by a stage. Displays exactly its message.
    #[error("{0}")]
    Processor(String),

    /// A fallback stage failed while handling an earlier failure.
    ///
    /// Displays the new failure unchanged; the superseded failure is exposed
    /// through `source()`.
    #[error("{error}")]
    FallbackFailed {
        error: Box<IngestError>,
        #[source]
        cause: Box<IngestError>,
    },

    // ============================================================================
    // Document Errors
    // ============================================================================
    #[error("Required document field not found: {0}")]
    FieldNotFound(String),

    #[error("Document field '{field}' is not a {expected}")]
    FieldType {
        field: String,
        expected: &'static str,
    },

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Builder pattern validation error
    #[error("Builder error: {0}")]
    BuilderError(String),
}

impl IngestError {
    /// Attach `cause` as the failure this error superseded.
    ///
    /// If `self` already carries causes, `cause` goes to the end of the chain.
    pub fn with_cause(self, cause: IngestError) -> Self {
        match self {
            IngestError::FallbackFailed {
                error,
                cause: existing,
            } => IngestError::FallbackFailed {
                error,
                cause: Box::new(existing.with_cause(cause)),
            },
            other => IngestError::FallbackFailed {
                error: Box::new(other),
                cause: Box::new(cause),
            },
        }
    }

    /// The most recent failure, with any fallback wrapping removed
    pub fn failure(&self) -> &IngestError {
        match self {
            IngestError::FallbackFailed { error, .. } => error.failure(),
            other => other,
        }
    }

    /// Superseded failures, most recent first
    pub fn causes(&self) -> Causes<'_> {
        Causes {
            next: match self {
                IngestError::FallbackFailed { cause, .. } => Some(cause.as_ref()),
                _ => None,
            },
        }
    }
}

/// Iterator over the failures an error superseded
pub struct Causes<'a> {
    next: Option<&'a IngestError>,
}

impl<'a> Iterator for Causes<'a> {
    type Item = &'a IngestError;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        match current {
            IngestError::FallbackFailed { error, cause } => {
                self.next = Some(cause.as_ref());
                Some(error.failure())
            }
            other => {
                self.next = None;
                Some(other)
            }
        }
    }
}

// Automatic conversion from String
impl From<String> for IngestError {
    fn from(err: String) -> Self {
        IngestError::Processor(err)
    }
}

// Automatic conversion from &str
impl From<&str> for IngestError {
    fn from(err: &str) -> Self {
        IngestError::Processor(err.to_string())
    }
}

// Helper type alias for Results
pub type IngestResult<T> = Result<T, IngestError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_processor_error_displays_message_only() {
        let err = IngestError::Processor("error".to_string());
        assert_eq!(err.to_string(), "error");
    }

    #[test]
    fn test_string_conversion() {
        let err: IngestError = "boom".into();
        assert!(matches!(err, IngestError::Processor(ref m) if m == "boom"));
    }

    #[test]
    fn test_with_cause_keeps_new_message() {
        let err = IngestError::from("second").with_cause("first".into());
        assert_eq!(err.to_string(), "second");
        assert_eq!(err.source().map(|s| s.to_string()), Some("first".to_string()));
        assert!(matches!(err.failure(), IngestError::Processor(m) if m == "second"));
    }

    #[test]
    fn test_cause_chain_is_flat() {
        let err = IngestError::from("third")
            .with_cause("second".into())
            .with_cause("first".into());

        assert_eq!(err.to_string(), "third");
        let causes: Vec<String> = err.causes().map(|c| c.to_string()).collect();
        assert_eq!(causes, vec!["second", "first"]);
    }

    #[test]
    fn test_no_causes_for_plain_error() {
        let err = IngestError::FieldNotFound("field".to_string());
        assert_eq!(err.causes().count(), 0);
        assert!(err.source().is_none());
    }

    #[test]
    fn test_field_type_display() {
        let err = IngestError::FieldType {
            field: "count".to_string(),
            expected: "number",
        };
        assert_eq!(err.to_string(), "Document field 'count' is not a number");
    }
}
