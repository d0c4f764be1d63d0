//! Error types for the registry layer.
//!
//! Three failure families share one enum: unknown-scope lookups, conflicting
//! registrations, and structural mismatches. Ordering conflicts and
//! instantiation failures from `crucible-core` pass through transparently so
//! hosts can match on them and, for example, disable the offending
//! contribution instead of crashing.

use thiserror::Error;

pub use crucible_core::{InstantiationError, OrderingConflict};

/// Failure a listener callback may surface to the registry.
pub type ListenerError = Box<dyn std::error::Error + Send + Sync>;

/// Errors raised by areas, extension points, and the area registry.
///
/// Every failing call aborts without partially mutating registry state; see
/// the individual operations for the exception around disposal listeners.
#[derive(Debug, Clone, Error)]
pub enum RegistryError {
    /// Looked up an area class that was never registered.
    #[error("area class '{0}' is not registered")]
    UnknownAreaClass(String),

    /// Looked up an area instance handle with no live area.
    #[error("no live area for the given instance handle")]
    UnknownArea,

    /// Looked up an extension point name absent from the area and all of its
    /// ancestors.
    #[error("extension point '{0}' is not registered")]
    UnknownExtensionPoint(String),

    /// Registered a second extension point under a name already taken in the
    /// same area.
    #[error("extension point '{0}' is already registered in this area")]
    DuplicateExtensionPoint(String),

    /// Instantiated an area for an instance handle that already has one.
    #[error("an area is already live for the given instance handle")]
    DuplicateAreaInstance,

    /// Re-registered an area class with a different parent class.
    #[error("area class '{class}' is registered with parent {existing:?}; refusing re-registration with parent {requested:?}")]
    AreaClassConflict {
        /// The conflicted class name.
        class: String,
        /// Parent recorded by the first registration (kept intact).
        existing: Option<String>,
        /// Parent requested by the rejected re-registration.
        requested: Option<String>,
    },

    /// The resolved parent area's class does not equal the declared parent.
    #[error("area class '{class}' declares parent {declared:?} but the resolved parent area has class {actual:?}")]
    ParentMismatch {
        /// Class being instantiated.
        class: String,
        /// Parent class the registration declared.
        declared: Option<String>,
        /// Class of the area the parent handle resolved to.
        actual: Option<String>,
    },

    /// `get_extension` found a resolved count other than one.
    #[error("extension point '{point}' holds {count} extensions, expected exactly one")]
    NotExactlyOne {
        /// The queried point.
        point: String,
        /// Resolved extension count.
        count: usize,
    },

    /// Contradictory or cyclic ordering constraints; the previous cached
    /// order, if any, stays valid.
    #[error(transparent)]
    Ordering(#[from] OrderingConflict),

    /// A contributor-supplied factory failed to produce an instance.
    #[error(transparent)]
    Instantiation(#[from] InstantiationError),

    /// An area listener failed during a lifecycle broadcast. Bookkeeping
    /// cleanup still completed before this was surfaced.
    #[error("area listener failed during {event} for class '{class}': {message}")]
    ListenerFailed {
        /// The lifecycle event being broadcast.
        event: &'static str,
        /// Class of the affected area.
        class: String,
        /// Listener-reported failure.
        message: String,
    },
}

/// Result type for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;
