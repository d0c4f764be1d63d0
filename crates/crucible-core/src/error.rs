//! Error types for the ordering resolver and the extension factory seam.
//!
//! Conflict variants carry the diagnostic labels of every implicated entry so
//! a host can render a useful message (or disable the offending contribution)
//! instead of crashing on an opaque string.

use thiserror::Error;

use crate::plugin::PluginId;

// =============================================================================
// Ordering conflicts
// =============================================================================

/// Unsatisfiable or contradictory ordering constraints.
///
/// A conflict aborts only the sort that detected it; callers keep whatever
/// previously resolved order they hold.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderingConflict {
    /// Two entries both demanded the FIRST slot.
    #[error("two FIRST entries: '{existing}' and '{duplicate}'")]
    DuplicateFirst {
        /// Label of the entry that claimed FIRST first.
        existing: String,
        /// Label of the second claimant.
        duplicate: String,
    },

    /// Two entries both demanded the LAST slot.
    #[error("two LAST entries: '{existing}' and '{duplicate}'")]
    DuplicateLast {
        /// Label of the entry that claimed LAST first.
        existing: String,
        /// Label of the second claimant.
        duplicate: String,
    },

    /// An entry ended up placed before the pinned FIRST entry.
    #[error("'{entry}' cannot be ordered before the FIRST entry '{anchor}'")]
    BeforeFirst {
        /// Label of the displacing entry.
        entry: String,
        /// Label of the pinned FIRST entry.
        anchor: String,
    },

    /// An entry ended up placed after the pinned LAST entry.
    #[error("'{entry}' cannot be ordered after the LAST entry '{anchor}'")]
    AfterLast {
        /// Label of the displacing entry.
        entry: String,
        /// Label of the pinned LAST entry.
        anchor: String,
    },

    /// The relocation budget was exhausted — almost certainly a BEFORE/AFTER
    /// cycle. Lists every entry that took part in the sort.
    #[error("unsatisfiable ordering constraints (probable BEFORE/AFTER cycle) among: {}", entries.join(", "))]
    CycleSuspected {
        /// Labels of every entry in the sequence being sorted.
        entries: Vec<String>,
        /// Relocations performed before the circuit breaker tripped.
        moves: usize,
    },
}

// =============================================================================
// Instantiation errors
// =============================================================================

/// A collaborator-supplied implementation class could not be produced.
///
/// Carries the owning plugin's identity when known; rendered as an explicit
/// `<not available>` marker otherwise.
#[derive(Debug, Clone, Error)]
#[error("failed to instantiate '{class_name}': {reason} (plugin: {})",
        plugin.as_ref().map(PluginId::as_str).unwrap_or("<not available>"))]
pub struct InstantiationError {
    /// Declared implementation type that failed to resolve or construct.
    pub class_name: String,
    /// Identity of the contributing plugin, when available.
    pub plugin: Option<PluginId>,
    /// Factory-reported reason.
    pub reason: String,
}
