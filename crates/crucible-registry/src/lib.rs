//! # Crucible Registry
//!
//! The stateful half of the Crucible extension registry: extension points,
//! hierarchical areas, and the area registry that owns them.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────┐  classes, instances  ┌────────────┐  named points  ┌────────────────┐
//! │ AreaRegistry  │─────────────────────▶│    Area    │───────────────▶│ ExtensionPoint │
//! │ (explicit     │                      │ (scope,    │   lookups      │ (ordered,      │
//! │  value, no    │      root area       │  parent    │   delegate     │  copy-on-write │
//! │  global)      │─────────────────────▶│  chain)    │   upwards      │  snapshots)    │
//! └───────────────┘                      └────────────┘                └────────────────┘
//! ```
//!
//! - **[`ExtensionPoint`]**: a named, ordered collection of contributed
//!   objects; reads return immutable snapshots, mutations mark it dirty and
//!   the ordering resolver from `crucible-core` runs on the next read.
//! - **[`Area`]**: a scope owning points by name, delegating missing lookups
//!   to its parent, with interaction control for hot-reload suspension.
//! - **[`AreaRegistry`]**: the explicit top-level value — area classes, live
//!   areas indexed by caller-minted [`AreaInstance`] handles, the singleton
//!   root area, and lifecycle broadcast to [`AreaListener`]s (which are
//!   themselves stored as extensions of a reserved root point).

pub mod area;
pub mod error;
pub mod point;
pub mod registry;

pub use area::{Area, ExtensionPointAvailabilityListener, InteractionState};
pub use error::{ListenerError, RegistryError, RegistryResult};
pub use point::{ExtensionPoint, ExtensionPointListener, ExtensionSnapshot};
pub use registry::{
    AREA_LISTENER_POINT, AreaInstance, AreaListener, AreaRegistry, RegistryStats,
};
