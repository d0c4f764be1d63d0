//! # Crucible
//!
//! A strongly typed, explicitly scoped extension-point registry for Rust.
//!
//! ## Overview
//!
//! Crucible lets a host application expose **extension points** — named,
//! typed, ordered collections — that plugins contribute objects to without
//! the host and the plugins knowing about each other. Points live inside
//! **areas**, hierarchical scopes resolved through a parent chain, and the
//! whole structure hangs off an explicit [`AreaRegistry`] value owned by the
//! host: there is no process-global registry.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   instantiate/dispose   ┌────────────┐   contribute    ┌────────────────┐
//! │ AreaRegistry │────────────────────────▶│    Area    │◀────────────────│    Plugins     │
//! │              │   area_created /        │  project / │  ordered, lazy  │ (PluginId +    │
//! │  root area   │   area_disposing        │  module /  │  extensions     │  factory)      │
//! └──────────────┘                         │  ...       │                 └────────────────┘
//!                                          └────────────┘
//! ```
//!
//! - **Ordering**: contributions carry `first`/`last`/`before:x`/`after:x`
//!   directives; a fixed-point resolver turns them into a total order and
//!   reports contradictions as typed conflicts instead of panicking.
//! - **Snapshots**: reads return immutable `Arc` slices, so iteration is
//!   never invalidated by concurrent registration.
//! - **Lifecycle**: area creation and disposal are broadcast to listeners,
//!   with disposal notified before any bookkeeping is torn down.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use crucible::prelude::*;
//! use std::sync::Arc;
//!
//! let registry = AreaRegistry::new();
//! registry.register_area_class("com.example.project", None)?;
//!
//! let handle = AreaInstance::new();
//! let project = registry.instantiate_area("com.example.project", &handle, None)?;
//!
//! let point = project.register_extension_point("project.tools", "dyn Tool")?;
//! point.register_extension_ordered(Arc::new(MyTool), LoadingOrder::First);
//!
//! for tool in point.get_extensions()?.iter() {
//!     // snapshot is immutable; later registrations do not affect it
//! }
//! ```

pub use crucible_core as core;
pub use crucible_registry as registry;

/// Prelude module for convenient imports.
///
/// ```rust,ignore
/// use crucible::prelude::*;
/// ```
pub mod prelude {
    // Registry - main entry point
    pub use crucible_registry::{AreaInstance, AreaListener, AreaRegistry};

    // Scopes and points
    pub use crucible_registry::{
        Area, ExtensionPoint, ExtensionPointAvailabilityListener, ExtensionPointListener,
        ExtensionSnapshot, InteractionState,
    };

    // Ordering directives and contributor identity
    pub use crucible_core::{
        ExtensionFactory, ExtensionObject, LoadingOrder, PluginDescriptor, PluginId,
    };

    // Errors
    pub use crucible_core::{InstantiationError, OrderingConflict};
    pub use crucible_registry::{RegistryError, RegistryResult};
}
