//! Error types for metadata capture and factory resolution.

use std::fmt;
use std::sync::Arc;

use crate::info::ElementKind;
use crate::token::Token;

/// Boxed error produced by a user compute function.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Decoration and resolution errors
///
/// Represents the failure conditions that can occur while a decorator is
/// applied, while providers are bound into a container, or while factory
/// configurations are resolved at bootstrap time.
///
/// # Examples
///
/// ```rust
/// use ferrous_decor::{Container, DecorError, Token};
///
/// let scope = Container::new();
/// match scope.resolve(&Token::from("missing")) {
///     Err(DecorError::UnresolvedToken(token)) => {
///         assert_eq!(token.to_string(), "\"missing\"");
///     }
///     _ => unreachable!(),
/// }
/// ```
#[derive(Debug, Clone)]
pub enum DecorError {
    /// No scope in the parent chain has a binding for the token
    UnresolvedToken(Token),
    /// A decorator was applied to an element kind it has no storage key for
    MissingMetadataKey(ElementKind),
    /// An application was routed to a decorator that does not support its kind
    UnsupportedElementKind(ElementKind),
    /// The application record is inconsistent with its element kind
    InvalidApplication(&'static str),
    /// A resolved value did not have the requested type
    TypeMismatch(&'static str),
    /// A compute function asked for a dependency position it did not declare
    MissingDependency(usize),
    /// The target was never marked injectable, so it cannot be constructed
    NotInjectable(&'static str),
    /// A compute function failed
    Factory(Arc<dyn std::error::Error + Send + Sync>),
}

impl DecorError {
    /// Wraps a compute failure.
    pub fn factory(err: impl Into<BoxError>) -> Self {
        DecorError::Factory(Arc::from(err.into()))
    }
}

impl fmt::Display for DecorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecorError::UnresolvedToken(token) => write!(f, "No binding for token: {}", token),
            DecorError::MissingMetadataKey(kind) => {
                write!(f, "No metadata key declared for {} decorators", kind)
            }
            DecorError::UnsupportedElementKind(kind) => {
                write!(f, "Decorator does not support {} targets", kind)
            }
            DecorError::InvalidApplication(msg) => write!(f, "Invalid application: {}", msg),
            DecorError::TypeMismatch(name) => write!(f, "Type mismatch for: {}", name),
            DecorError::MissingDependency(index) => {
                write!(f, "No dependency declared at position {}", index)
            }
            DecorError::NotInjectable(name) => write!(f, "Target is not injectable: {}", name),
            DecorError::Factory(err) => write!(f, "Factory failed: {}", err),
        }
    }
}

impl std::error::Error for DecorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DecorError::Factory(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

/// Result type for decoration and resolution operations
///
/// # Examples
///
/// ```rust
/// use ferrous_decor::{DecorError, DecorResult};
///
/// fn failing() -> DecorResult<()> {
///     Err(DecorError::TypeMismatch("alloc::string::String"))
/// }
///
/// assert!(failing().is_err());
/// ```
pub type DecorResult<T> = Result<T, DecorError>;
