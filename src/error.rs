//! Error types for the component container.

use std::fmt;

/// Container errors
///
/// Represents the error conditions that can occur during component
/// registration, resolution, or container lifecycle operations.
///
/// # Examples
///
/// ```rust
/// use corewire::{Container, CoreError};
///
/// let container = Container::new();
/// match container.get_component("missing") {
///     Err(CoreError::NotFound(name)) => assert_eq!(name, "missing"),
///     _ => unreachable!(),
/// }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum CoreError {
    /// No descriptor registered under the requested name
    NotFound(String),
    /// No descriptor registered for the requested type
    NotFoundByType(&'static str),
    /// By-type lookup matched more than one descriptor
    Ambiguous {
        /// Requested type name
        type_name: &'static str,
        /// Number of matching descriptors
        count: usize,
        /// Names of the matching descriptors, in registration order
        candidates: Vec<String>,
    },
    /// Resolved instance is not of the explicitly requested type
    TypeMismatch {
        /// What was being accessed (component name, member, or argument)
        name: String,
        /// The requested type name
        expected: &'static str,
    },
    /// Instantiation or injection failed; wraps the underlying cause
    CreationFailed {
        /// Name of the component that failed to build
        name: String,
        /// The underlying failure
        source: Box<CoreError>,
    },
    /// Circular dependency detected (includes the full chain)
    Circular(Vec<String>),
    /// Duplicate name or malformed descriptor data
    InvalidRegistration(String),
    /// Maximum resolution depth exceeded
    DepthExceeded(usize),
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoreError::NotFound(name) => write!(f, "no such component: {}", name),
            CoreError::NotFoundByType(type_name) => {
                write!(f, "no such component of type {}", type_name)
            }
            CoreError::Ambiguous { type_name, count, candidates } => write!(
                f,
                "ambiguous component of type {}: {} candidates ({})",
                type_name,
                count,
                candidates.join(", ")
            ),
            CoreError::TypeMismatch { name, expected } => {
                write!(f, "type mismatch for '{}': expected {}", name, expected)
            }
            CoreError::CreationFailed { name, source } => {
                write!(f, "creation of component '{}' failed: {}", name, source)
            }
            CoreError::Circular(chain) => {
                write!(f, "circular dependency: {}", chain.join(" -> "))
            }
            CoreError::InvalidRegistration(msg) => write!(f, "invalid registration: {}", msg),
            CoreError::DepthExceeded(depth) => write!(f, "max resolution depth {} exceeded", depth),
        }
    }
}

impl std::error::Error for CoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CoreError::CreationFailed { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

/// Result type for container operations
pub type CoreResult<T> = Result<T, CoreError>;
