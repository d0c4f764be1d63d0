//! Areas: hierarchical scopes owning named extension points.
//!
//! An [`Area`] maps extension-point names to points, references exactly one
//! parent area for delegated lookups (the root has none), carries the area
//! class it was instantiated from, and exposes the interaction control
//! surface used during hot reload: `suspend` pauses listener delivery without
//! destroying structure, `resume` restores it, and `kill` shuts delivery down
//! permanently when the area is being torn down.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

use parking_lot::RwLock;
use tracing::debug;

use crate::error::{RegistryError, RegistryResult};
use crate::point::ExtensionPoint;

// ─── Interaction control ──────────────────────────────────────────────────────

/// Listener-delivery state of one area.
///
/// ```text
/// suspend()  ──► Suspended     resume() ──► Normal
/// kill()     ──► Killed        (terminal)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionState {
    /// Listener notifications are delivered.
    Normal,
    /// Notifications are dropped until [`Area::resume_interactions`].
    Suspended,
    /// Notifications are dropped permanently; the area is being disposed.
    Killed,
}

const NORMAL: u8 = 0;
const SUSPENDED: u8 = 1;
const KILLED: u8 = 2;

/// Shared delivery gate, handed to every point the area owns.
pub(crate) struct Interactions(AtomicU8);

impl Interactions {
    pub(crate) fn new() -> Self {
        Self(AtomicU8::new(NORMAL))
    }

    pub(crate) fn get(&self) -> InteractionState {
        match self.0.load(Ordering::Acquire) {
            SUSPENDED => InteractionState::Suspended,
            KILLED => InteractionState::Killed,
            _ => InteractionState::Normal,
        }
    }

    pub(crate) fn suspend(&self) {
        // Killed is terminal.
        let _ = self
            .0
            .compare_exchange(NORMAL, SUSPENDED, Ordering::AcqRel, Ordering::Acquire);
    }

    pub(crate) fn resume(&self) {
        let _ = self
            .0
            .compare_exchange(SUSPENDED, NORMAL, Ordering::AcqRel, Ordering::Acquire);
    }

    pub(crate) fn kill(&self) {
        self.0.store(KILLED, Ordering::Release);
    }

    pub(crate) fn delivering(&self) -> bool {
        self.0.load(Ordering::Acquire) == NORMAL
    }
}

// ─── Availability listeners ───────────────────────────────────────────────────

/// Observer of extension-point creation and removal within one area.
///
/// Notified when a point itself appears or disappears, not when its contents
/// change — content changes go to
/// [`ExtensionPointListener`](crate::point::ExtensionPointListener)s.
pub trait ExtensionPointAvailabilityListener: Send + Sync {
    /// A point was registered in the area.
    fn extension_point_registered(&self, point: &Arc<ExtensionPoint>) {
        let _ = point;
    }

    /// A point was removed from the area.
    fn extension_point_removed(&self, point: &Arc<ExtensionPoint>) {
        let _ = point;
    }
}

// ─── Area ─────────────────────────────────────────────────────────────────────

struct AreaState {
    points: HashMap<String, Arc<ExtensionPoint>>,
    availability_listeners: Vec<Arc<dyn ExtensionPointAvailabilityListener>>,
}

/// A scope owning extension points, with delegated lookups through its parent.
pub struct Area {
    /// Area class this area was instantiated from; `None` for the root.
    class: Option<String>,
    parent: Option<Arc<Area>>,
    interactions: Arc<Interactions>,
    state: RwLock<AreaState>,
}

impl Area {
    pub(crate) fn new(class: Option<String>, parent: Option<Arc<Area>>) -> Self {
        Self {
            class,
            parent,
            interactions: Arc::new(Interactions::new()),
            state: RwLock::new(AreaState {
                points: HashMap::new(),
                availability_listeners: Vec::new(),
            }),
        }
    }

    /// The area class this area was instantiated from; `None` for the root.
    pub fn area_class(&self) -> Option<&str> {
        self.class.as_deref()
    }

    /// The parent scope; `None` for the root.
    pub fn parent(&self) -> Option<&Arc<Area>> {
        self.parent.as_ref()
    }

    // ─── Extension points ────────────────────────────────────────────────────

    /// Registers a new extension point under a name unique within this area.
    ///
    /// # Errors
    ///
    /// [`RegistryError::DuplicateExtensionPoint`] when the name is taken.
    pub fn register_extension_point(
        &self,
        name: &str,
        declared_type: &str,
    ) -> RegistryResult<Arc<ExtensionPoint>> {
        let (point, listeners) = {
            let mut state = self.state.write();
            if state.points.contains_key(name) {
                return Err(RegistryError::DuplicateExtensionPoint(name.to_string()));
            }
            let point = Arc::new(ExtensionPoint::new(
                name,
                declared_type,
                self.interactions.clone(),
            ));
            state.points.insert(name.to_string(), point.clone());
            (point, state.availability_listeners.clone())
        };
        debug!(point = %name, declared_type = %declared_type, "Extension point registered");
        if self.interactions.delivering() {
            for listener in &listeners {
                listener.extension_point_registered(&point);
            }
        }
        Ok(point)
    }

    /// Removes an extension point from this area.
    ///
    /// # Errors
    ///
    /// [`RegistryError::UnknownExtensionPoint`] when the name is not locally
    /// registered (parent points cannot be removed through a child).
    pub fn unregister_extension_point(&self, name: &str) -> RegistryResult<()> {
        let (point, listeners) = {
            let mut state = self.state.write();
            let Some(point) = state.points.remove(name) else {
                return Err(RegistryError::UnknownExtensionPoint(name.to_string()));
            };
            (point, state.availability_listeners.clone())
        };
        debug!(point = %name, "Extension point unregistered");
        if self.interactions.delivering() {
            for listener in &listeners {
                listener.extension_point_removed(&point);
            }
        }
        Ok(())
    }

    /// Looks up a point by name, delegating to the parent chain when the name
    /// is not registered locally.
    ///
    /// # Errors
    ///
    /// [`RegistryError::UnknownExtensionPoint`] when no ancestor has it.
    pub fn get_extension_point(&self, name: &str) -> RegistryResult<Arc<ExtensionPoint>> {
        if let Some(point) = self.state.read().points.get(name) {
            return Ok(point.clone());
        }
        match &self.parent {
            Some(parent) => parent.get_extension_point(name),
            None => Err(RegistryError::UnknownExtensionPoint(name.to_string())),
        }
    }

    /// Membership test with the same parent delegation as
    /// [`get_extension_point`](Self::get_extension_point).
    pub fn has_extension_point(&self, name: &str) -> bool {
        if self.state.read().points.contains_key(name) {
            return true;
        }
        self.parent
            .as_ref()
            .is_some_and(|parent| parent.has_extension_point(name))
    }

    /// Snapshot of the points registered locally (parents excluded).
    pub fn get_extension_points(&self) -> Vec<Arc<ExtensionPoint>> {
        self.state.read().points.values().cloned().collect()
    }

    /// Number of locally registered points.
    pub fn extension_point_count(&self) -> usize {
        self.state.read().points.len()
    }

    // ─── Availability listeners ──────────────────────────────────────────────

    /// Adds a point-availability listener.
    pub fn add_availability_listener(
        &self,
        listener: Arc<dyn ExtensionPointAvailabilityListener>,
    ) {
        self.state.write().availability_listeners.push(listener);
    }

    /// Removes a previously added availability listener. No-op when absent.
    pub fn remove_availability_listener(
        &self,
        listener: &Arc<dyn ExtensionPointAvailabilityListener>,
    ) {
        self.state
            .write()
            .availability_listeners
            .retain(|l| !Arc::ptr_eq(l, listener));
    }

    // ─── Interaction control ─────────────────────────────────────────────────

    /// Current listener-delivery state.
    pub fn interaction_state(&self) -> InteractionState {
        self.interactions.get()
    }

    /// Pauses listener delivery for this area and all of its points.
    pub fn suspend_interactions(&self) {
        self.interactions.suspend();
    }

    /// Restores listener delivery after a suspension. No-op once killed.
    pub fn resume_interactions(&self) {
        self.interactions.resume();
    }

    /// Shuts listener delivery down permanently. Used by disposal.
    pub fn kill_interactions(&self) {
        self.interactions.kill();
    }

    /// Tells every point's listeners that this area is being replaced
    /// wholesale, as opposed to disposed. Delivered regardless of the
    /// interaction state, since replacement is what suspension exists for.
    pub fn notify_area_replaced(&self) {
        let points: Vec<Arc<ExtensionPoint>> =
            self.state.read().points.values().cloned().collect();
        for point in &points {
            point.notify_area_replaced();
        }
    }
}

impl std::fmt::Debug for Area {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Area")
            .field("class", &self.class)
            .field("points", &self.extension_point_count())
            .field("interactions", &self.interactions.get())
            .finish()
    }
}
