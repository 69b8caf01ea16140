//! Error types for lookup resolution.

use crate::error::StructuredError;

/// Error returned by [`QueryResolver`](crate::resolver::QueryResolver)
#[derive(Debug, Clone, PartialEq)]
pub enum ResolveError {
    /// The request or the resolver is misconfigured (missing name, table, action or broker)
    Configuration(String),
    /// No call target could be built from the request
    Resolution(String),
    /// Domain error raised for the caller (not found, legacy flag, callback error)
    Domain(StructuredError),
}

impl ResolveError {
    /// The structured error, if this is a domain error
    pub fn structured(&self) -> Option<&StructuredError> {
        match self {
            ResolveError::Domain(err) => Some(err),
            _ => None,
        }
    }

    /// Convert into the single structured shape the transport layer understands
    pub fn into_structured(self) -> StructuredError {
        match self {
            ResolveError::Domain(err) => err,
            ResolveError::Configuration(message) => StructuredError {
                name: "ConfigurationError".to_string(),
                message,
                code: 500,
                uid: "CONFIGURATION".to_string(),
                extra: None,
            },
            ResolveError::Resolution(message) => StructuredError {
                name: "ResolutionError".to_string(),
                message,
                code: 500,
                uid: "RESOLUTION".to_string(),
                extra: None,
            },
        }
    }
}

impl std::fmt::Display for ResolveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResolveError::Configuration(msg) => write!(f, "Configuration error: {}", msg),
            ResolveError::Resolution(msg) => write!(f, "Resolution error: {}", msg),
            ResolveError::Domain(err) => write!(f, "Domain error: {}", err),
        }
    }
}

impl std::error::Error for ResolveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ResolveError::Domain(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StructuredError> for ResolveError {
    fn from(err: StructuredError) -> Self {
        ResolveError::Domain(err)
    }
}
