//! Extension points: named, typed, ordered collections of contributed objects.
//!
//! An [`ExtensionPoint`] owns its entries behind one point-local lock and
//! publishes reads as immutable copy-on-write snapshots: mutations mark the
//! point dirty, and the next read re-runs the ordering resolver and swaps in a
//! fresh `Arc<[ExtensionObject]>`. A caller iterating a previously returned
//! snapshot is never affected by later registrations, and reads on one point
//! never block writes to another.
//!
//! Entries are either **eager** (a live object supplied at registration) or
//! **lazy** (a declared type name plus the contributor's
//! [`PluginDescriptor`], materialised through its factory on first resolve).
//! Factories run with no point lock held, so they may call back into the
//! point. A lazy entry that fails to materialise is logged with the
//! contributor's identity and skipped, so one broken contribution cannot
//! poison reads.

use std::sync::Arc;
use std::sync::OnceLock;

use tracing::{debug, warn};

use crucible_core::plugin::same_extension;
use crucible_core::{
    ExtensionObject, LoadingOrder, Orderable, PluginDescriptor, PluginId, sort_by_loading_order,
};
use parking_lot::RwLock;

use crate::area::Interactions;
use crate::error::{RegistryError, RegistryResult};

/// Immutable, ordered view of a point's extensions.
pub type ExtensionSnapshot = Arc<[ExtensionObject]>;

// ─── Listeners ────────────────────────────────────────────────────────────────

/// Observer of one extension point's content changes.
///
/// All methods default to no-ops; implement only what you need. Notifications
/// fire after the structural change is committed, outside the point lock, and
/// only while the owning area's interactions are live.
pub trait ExtensionPointListener: Send + Sync {
    /// An extension was registered.
    fn extension_added(&self, value: &ExtensionObject, point: &ExtensionPoint) {
        let _ = (value, point);
    }

    /// An extension was unregistered.
    fn extension_removed(&self, value: &ExtensionObject, point: &ExtensionPoint) {
        let _ = (value, point);
    }

    /// The owning area is being replaced wholesale (hot reload), as opposed
    /// to being disposed. Delivered regardless of the interaction state.
    fn area_replaced(&self, point: &ExtensionPoint) {
        let _ = point;
    }
}

// ─── Entries ──────────────────────────────────────────────────────────────────

enum EntrySource {
    Eager(ExtensionObject),
    Lazy {
        class_name: String,
        descriptor: PluginDescriptor,
        cell: OnceLock<ExtensionObject>,
    },
}

struct ExtensionEntry {
    source: EntrySource,
    order: LoadingOrder,
    /// The id other entries may target via BEFORE/AFTER. Independent of
    /// whether anything references it.
    order_id: Option<Arc<str>>,
    plugin: Option<PluginId>,
}

impl ExtensionEntry {
    /// Returns the live object, materialising a lazy entry on first use.
    ///
    /// A failed materialisation is logged and yields `None`; the entry stays
    /// registered and is retried on the next resolve.
    fn materialize(&self, point: &str) -> Option<ExtensionObject> {
        match &self.source {
            EntrySource::Eager(value) => Some(value.clone()),
            EntrySource::Lazy {
                class_name,
                descriptor,
                cell,
            } => {
                if let Some(value) = cell.get() {
                    return Some(value.clone());
                }
                match descriptor.instantiate(class_name) {
                    Ok(value) => {
                        let _ = cell.set(value.clone());
                        Some(value)
                    }
                    Err(err) => {
                        warn!(point = %point, error = %err, "Skipping extension that failed to instantiate");
                        None
                    }
                }
            }
        }
    }

    /// Identity test against an already-live object.
    ///
    /// Lazy entries match only once materialised.
    fn matches(&self, value: &ExtensionObject) -> bool {
        match &self.source {
            EntrySource::Eager(stored) => same_extension(stored, value),
            EntrySource::Lazy { cell, .. } => {
                cell.get().is_some_and(|stored| same_extension(stored, value))
            }
        }
    }

    fn label(&self, index: usize) -> String {
        if let Some(id) = &self.order_id {
            return id.to_string();
        }
        match &self.source {
            EntrySource::Lazy { class_name, .. } => class_name.clone(),
            EntrySource::Eager(_) => match &self.plugin {
                Some(plugin) => format!("<anonymous #{index} from {plugin}>"),
                None => format!("<anonymous #{index}>"),
            },
        }
    }
}

/// Sortable view of one materialised entry.
struct ResolvedEntry {
    value: ExtensionObject,
    order: LoadingOrder,
    order_id: Option<Arc<str>>,
    label: String,
}

impl Orderable for ResolvedEntry {
    fn order_id(&self) -> Option<&str> {
        self.order_id.as_deref()
    }

    fn loading_order(&self) -> &LoadingOrder {
        &self.order
    }

    fn describe(&self) -> String {
        self.label.clone()
    }
}

// ─── ExtensionPoint ───────────────────────────────────────────────────────────

struct PointState {
    entries: Vec<Arc<ExtensionEntry>>,
    /// Last resolved order; kept valid across mutations (and across failed
    /// sorts) until a re-sort replaces it.
    cache: Option<ExtensionSnapshot>,
    dirty: bool,
    listeners: Vec<Arc<dyn ExtensionPointListener>>,
}

/// A named, ordered collection of extensions scoped to one area.
pub struct ExtensionPoint {
    name: String,
    declared_type: String,
    /// Shared with the owning area; gates listener delivery.
    interactions: Arc<Interactions>,
    state: RwLock<PointState>,
}

impl ExtensionPoint {
    pub(crate) fn new(
        name: impl Into<String>,
        declared_type: impl Into<String>,
        interactions: Arc<Interactions>,
    ) -> Self {
        Self {
            name: name.into(),
            declared_type: declared_type.into(),
            interactions,
            state: RwLock::new(PointState {
                entries: Vec::new(),
                cache: None,
                dirty: true,
                listeners: Vec::new(),
            }),
        }
    }

    /// The point's name, unique within its area.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The declared implementation type ("bean class") of this point.
    pub fn declared_type(&self) -> &str {
        &self.declared_type
    }

    // ─── Registration ────────────────────────────────────────────────────────

    /// Registers an extension with no ordering constraint.
    pub fn register_extension(&self, value: ExtensionObject) {
        self.register_extension_tagged(value, None, LoadingOrder::Any, None);
    }

    /// Registers an extension with an ordering directive.
    pub fn register_extension_ordered(&self, value: ExtensionObject, order: LoadingOrder) {
        self.register_extension_tagged(value, None, order, None);
    }

    /// Registers an extension with an ordering directive, an id other entries
    /// may reference, and the contributing plugin's identity.
    pub fn register_extension_tagged(
        &self,
        value: ExtensionObject,
        id: Option<&str>,
        order: LoadingOrder,
        plugin: Option<PluginId>,
    ) {
        let listeners = {
            let mut state = self.state.write();
            state.entries.push(Arc::new(ExtensionEntry {
                source: EntrySource::Eager(value.clone()),
                order,
                order_id: id.map(Arc::from),
                plugin,
            }));
            state.dirty = true;
            state.listeners.clone()
        };
        debug!(point = %self.name, "Extension registered");
        if self.interactions.delivering() {
            for listener in &listeners {
                listener.extension_added(&value, self);
            }
        }
    }

    /// Registers a lazily constructed extension: the declared type is
    /// materialised through the contributor's factory on first resolve.
    ///
    /// Lazy entries fire no addition notification — there is no value yet.
    pub fn register_extension_factory(
        &self,
        class_name: &str,
        id: Option<&str>,
        order: LoadingOrder,
        descriptor: PluginDescriptor,
    ) {
        let mut state = self.state.write();
        let plugin = Some(descriptor.id().clone());
        state.entries.push(Arc::new(ExtensionEntry {
            source: EntrySource::Lazy {
                class_name: class_name.to_string(),
                descriptor,
                cell: OnceLock::new(),
            },
            order,
            order_id: id.map(Arc::from),
            plugin,
        }));
        state.dirty = true;
        drop(state);
        debug!(point = %self.name, class = %class_name, "Lazy extension registered");
    }

    /// Removes the first entry holding the same stored object.
    ///
    /// Returns `false` (a no-op, not an error) when no entry matches; use
    /// [`has_extension`](Self::has_extension) first when absence matters.
    pub fn unregister_extension(&self, value: &ExtensionObject) -> bool {
        let listeners = {
            let mut state = self.state.write();
            let Some(pos) = state.entries.iter().position(|e| e.matches(value)) else {
                return false;
            };
            state.entries.remove(pos);
            state.dirty = true;
            state.listeners.clone()
        };
        debug!(point = %self.name, "Extension unregistered");
        if self.interactions.delivering() {
            for listener in &listeners {
                listener.extension_removed(value, self);
            }
        }
        true
    }

    // ─── Reads ────────────────────────────────────────────────────────────────

    /// Returns the resolved, ordered snapshot of this point's extensions.
    ///
    /// Re-runs the ordering resolver only when the set changed since the last
    /// read. The returned snapshot is immutable with respect to later
    /// mutation. Lazy entries are materialised with no point lock held, so a
    /// factory may call back into this point.
    ///
    /// # Errors
    ///
    /// [`RegistryError::Ordering`] when the constraint set is contradictory
    /// or cyclic; the previous cached order, if any, remains valid and the
    /// sort is retried on the next read.
    pub fn get_extensions(&self) -> RegistryResult<ExtensionSnapshot> {
        loop {
            let entries: Vec<Arc<ExtensionEntry>> = {
                let state = self.state.read();
                if !state.dirty
                    && let Some(cache) = &state.cache
                {
                    return Ok(cache.clone());
                }
                state.entries.clone()
            };

            let mut resolved: Vec<ResolvedEntry> = Vec::with_capacity(entries.len());
            for (index, entry) in entries.iter().enumerate() {
                if let Some(value) = entry.materialize(&self.name) {
                    resolved.push(ResolvedEntry {
                        value,
                        order: entry.order.clone(),
                        order_id: entry.order_id.clone(),
                        label: entry.label(index),
                    });
                }
            }
            sort_by_loading_order(&mut resolved)?;

            let snapshot: ExtensionSnapshot = resolved
                .into_iter()
                .map(|entry| entry.value)
                .collect::<Vec<_>>()
                .into();

            let mut state = self.state.write();
            // Publish only if the entry set is still the one we resolved;
            // a concurrent mutation sends us round again.
            if state.entries.len() == entries.len()
                && state
                    .entries
                    .iter()
                    .zip(&entries)
                    .all(|(a, b)| Arc::ptr_eq(a, b))
            {
                state.cache = Some(snapshot.clone());
                state.dirty = false;
                return Ok(snapshot);
            }
        }
    }

    /// Convenience accessor for the common single-extension point.
    ///
    /// # Errors
    ///
    /// [`RegistryError::NotExactlyOne`] when the resolved count differs from
    /// one, plus anything [`get_extensions`](Self::get_extensions) can raise.
    pub fn get_extension(&self) -> RegistryResult<ExtensionObject> {
        let snapshot = self.get_extensions()?;
        match snapshot.as_ref() {
            [single] => Ok(single.clone()),
            _ => Err(RegistryError::NotExactlyOne {
                point: self.name.clone(),
                count: snapshot.len(),
            }),
        }
    }

    /// Membership test by stored-object identity, independent of ordering.
    pub fn has_extension(&self, value: &ExtensionObject) -> bool {
        self.state.read().entries.iter().any(|e| e.matches(value))
    }

    /// Number of registered entries, including unmaterialised lazy ones.
    pub fn extension_count(&self) -> usize {
        self.state.read().entries.len()
    }

    // ─── Listeners & reset ───────────────────────────────────────────────────

    /// Adds a content listener.
    pub fn add_extension_point_listener(&self, listener: Arc<dyn ExtensionPointListener>) {
        self.state.write().listeners.push(listener);
    }

    /// Removes a previously added content listener. No-op when absent.
    pub fn remove_extension_point_listener(&self, listener: &Arc<dyn ExtensionPointListener>) {
        self.state
            .write()
            .listeners
            .retain(|l| !Arc::ptr_eq(l, listener));
    }

    /// Clears all entries without firing per-entry removal notifications.
    ///
    /// Intended for descriptor-reload scenarios where the whole set is about
    /// to be rebuilt. Listeners stay registered.
    pub fn reset(&self) {
        let mut state = self.state.write();
        state.entries.clear();
        state.cache = None;
        state.dirty = true;
        drop(state);
        debug!(point = %self.name, "Extension point reset");
    }

    /// Fans the area-replaced notification out to every listener.
    pub(crate) fn notify_area_replaced(&self) {
        let listeners = self.state.read().listeners.clone();
        for listener in &listeners {
            listener.area_replaced(self);
        }
    }
}

impl std::fmt::Debug for ExtensionPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtensionPoint")
            .field("name", &self.name)
            .field("declared_type", &self.declared_type)
            .field("extensions", &self.extension_count())
            .finish()
    }
}
