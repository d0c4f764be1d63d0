//! # Crucible Core
//!
//! Leaf crate of the Crucible extension registry: the pieces that have no
//! registry state of their own.
//!
//! - **Ordering**: the [`LoadingOrder`] directive grammar and the
//!   [`sort_by_loading_order`] resolver that turns partially constrained
//!   entry sequences into a total order, detecting contradictions and cycles.
//! - **Contributor identity**: interned [`PluginId`]s and the
//!   [`PluginDescriptor`] construction boundary — the registry never builds
//!   extension objects itself, it asks the contributor's
//!   [`ExtensionFactory`].
//! - **Errors**: [`OrderingConflict`] (carrying every implicated entry) and
//!   [`InstantiationError`] (attributed to the owning plugin when known).
//!
//! The stateful half of the system — extension points, areas, and the area
//! registry — lives in `crucible-registry`.

pub mod error;
pub mod order;
pub mod plugin;
pub mod sort;

pub use error::{InstantiationError, OrderingConflict};
pub use order::LoadingOrder;
pub use plugin::{ExtensionFactory, ExtensionObject, PluginDescriptor, PluginId, same_extension};
pub use sort::{Orderable, sort_by_loading_order};
