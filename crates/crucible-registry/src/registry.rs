//! The area registry: process-wide bookkeeping for area classes and live
//! areas.
//!
//! An [`AreaRegistry`] is an explicit value owned by the host application and
//! passed by reference to every collaborator — there is no ambient global.
//! It maps area-class names to their declared parent class, and
//! [`AreaInstance`] handles to live [`Area`]s, with a reverse per-class index
//! for bulk queries.
//!
//! # Bootstrap
//!
//! Construction builds the singleton **root area** (no class, no parent) and
//! registers the reserved [`AREA_LISTENER_POINT`] on it. Area listeners are
//! stored as extensions of that point — the lifecycle-broadcast mechanism is
//! bootstrapped through the same extension-point abstraction it services, so
//! the root area and the reserved point exist before any other area machinery
//! can run.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info, warn};

use crucible_core::ExtensionObject;

use crate::area::Area;
use crate::error::{ListenerError, RegistryError, RegistryResult};
use crate::point::ExtensionPoint;

/// Name of the reserved extension point on the root area that stores area
/// listeners.
pub const AREA_LISTENER_POINT: &str = "crucible.area.listener";

// ─── AreaInstance ─────────────────────────────────────────────────────────────

/// Opaque, caller-minted identity for one live area.
///
/// The collaborator creates a handle, instantiates an area under it, and uses
/// the same handle for later lookups and disposal. Equality is handle
/// identity; two separately minted handles are never equal. The singleton
/// root scope has no handle — it is addressed by passing `None` to
/// [`AreaRegistry::get_area`].
#[derive(Clone)]
pub struct AreaInstance(Arc<()>);

impl AreaInstance {
    /// Mints a fresh, unique identity.
    pub fn new() -> Self {
        Self(Arc::new(()))
    }
}

impl Default for AreaInstance {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for AreaInstance {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for AreaInstance {}

impl Hash for AreaInstance {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (Arc::as_ptr(&self.0) as usize).hash(state);
    }
}

impl fmt::Debug for AreaInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AreaInstance({:p})", Arc::as_ptr(&self.0))
    }
}

// ─── Area listeners ───────────────────────────────────────────────────────────

/// Observer of area lifecycle events.
///
/// Registered through [`AreaRegistry::add_area_listener`] and stored as an
/// extension of the reserved root point, so broadcast order is registration
/// order. A failing `area_disposing` never prevents the disposal's cleanup;
/// the failure is surfaced to the disposer's caller afterwards.
pub trait AreaListener: Send + Sync {
    /// An area was instantiated.
    fn area_created(&self, class: &str, instance: &AreaInstance) -> Result<(), ListenerError> {
        let _ = (class, instance);
        Ok(())
    }

    /// An area is about to be disposed; its bookkeeping is still intact.
    fn area_disposing(&self, class: &str, instance: &AreaInstance) -> Result<(), ListenerError> {
        let _ = (class, instance);
        Ok(())
    }
}

/// Wrapper stored in the reserved point; extensions are `dyn Any`, so the
/// registry downcasts back to this concrete type.
struct AreaListenerEntry(Arc<dyn AreaListener>);

// ─── AreaRegistry ─────────────────────────────────────────────────────────────

struct RegistryState {
    /// Area class → declared parent class (`None` = rooted at the root area).
    classes: HashMap<String, Option<String>>,
    /// Primary index: identity handle → live area.
    instances: HashMap<AreaInstance, Arc<Area>>,
    /// Identity handle → area class, for class resolution during disposal.
    instance_class: HashMap<AreaInstance, String>,
    /// Reverse index: area class → live identity handles.
    by_class: HashMap<String, Vec<AreaInstance>>,
    /// Handles claimed by an in-flight disposal. Lookups still resolve them;
    /// a second disposal does not.
    disposing: HashSet<AreaInstance>,
}

/// Registry of area classes and live areas.
pub struct AreaRegistry {
    state: RwLock<RegistryState>,
    root: Arc<Area>,
    /// The reserved root point holding area listeners.
    listener_point: Arc<ExtensionPoint>,
}

impl AreaRegistry {
    /// Creates a registry with a freshly bootstrapped root area.
    pub fn new() -> Self {
        let root = Arc::new(Area::new(None, None));
        let listener_point = match root
            .register_extension_point(AREA_LISTENER_POINT, "crucible_registry::AreaListener")
        {
            Ok(point) => point,
            // The root area is empty at this moment; the name cannot collide.
            Err(_) => unreachable!("fresh root area rejected the reserved point"),
        };
        Self {
            state: RwLock::new(RegistryState {
                classes: HashMap::new(),
                instances: HashMap::new(),
                instance_class: HashMap::new(),
                by_class: HashMap::new(),
                disposing: HashSet::new(),
            }),
            root,
            listener_point,
        }
    }

    // ─── Area classes ────────────────────────────────────────────────────────

    /// Registers an area class and its required parent class (`None` =
    /// parented directly on the root).
    ///
    /// Identical re-registration is a no-op.
    ///
    /// # Errors
    ///
    /// [`RegistryError::AreaClassConflict`] when the class is already
    /// registered with a different parent; the first registration stays
    /// intact.
    pub fn register_area_class(&self, class: &str, parent: Option<&str>) -> RegistryResult<()> {
        let mut state = self.state.write();
        match state.classes.get(class) {
            Some(existing) if existing.as_deref() == parent => {
                debug!(class = %class, "Area class re-registered identically");
                Ok(())
            }
            Some(existing) => Err(RegistryError::AreaClassConflict {
                class: class.to_string(),
                existing: existing.clone(),
                requested: parent.map(String::from),
            }),
            None => {
                state
                    .classes
                    .insert(class.to_string(), parent.map(String::from));
                debug!(class = %class, parent = ?parent, "Area class registered");
                Ok(())
            }
        }
    }

    /// Removes an area-class registration. Already-live areas of that class
    /// are unaffected.
    ///
    /// # Errors
    ///
    /// [`RegistryError::UnknownAreaClass`] when never registered.
    pub fn unregister_area_class(&self, class: &str) -> RegistryResult<()> {
        let mut state = self.state.write();
        if state.classes.remove(class).is_none() {
            return Err(RegistryError::UnknownAreaClass(class.to_string()));
        }
        debug!(class = %class, "Area class unregistered");
        Ok(())
    }

    // ─── Area lifecycle ──────────────────────────────────────────────────────

    /// Instantiates an area of `class` under `parent` (`None` = the root),
    /// indexed by the caller-minted `instance` handle.
    ///
    /// Broadcasts one `area_created` to every area listener in registration
    /// order; a failing listener is logged, not propagated.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::UnknownAreaClass`] when `class` was never registered.
    /// - [`RegistryError::DuplicateAreaInstance`] when `instance` already has
    ///   a live area.
    /// - [`RegistryError::UnknownArea`] when `parent` has no live area.
    /// - [`RegistryError::ParentMismatch`] when the resolved parent's class
    ///   does not equal the declared parent of `class`.
    pub fn instantiate_area(
        &self,
        class: &str,
        instance: &AreaInstance,
        parent: Option<&AreaInstance>,
    ) -> RegistryResult<Arc<Area>> {
        let area = {
            let mut state = self.state.write();
            let Some(declared_parent) = state.classes.get(class).cloned() else {
                return Err(RegistryError::UnknownAreaClass(class.to_string()));
            };
            if state.instances.contains_key(instance) {
                return Err(RegistryError::DuplicateAreaInstance);
            }
            let parent_area = match parent {
                None => self.root.clone(),
                Some(handle) => state
                    .instances
                    .get(handle)
                    .cloned()
                    .ok_or(RegistryError::UnknownArea)?,
            };
            if parent_area.area_class() != declared_parent.as_deref() {
                return Err(RegistryError::ParentMismatch {
                    class: class.to_string(),
                    declared: declared_parent,
                    actual: parent_area.area_class().map(String::from),
                });
            }
            let area = Arc::new(Area::new(Some(class.to_string()), Some(parent_area)));
            state.instances.insert(instance.clone(), area.clone());
            state
                .instance_class
                .insert(instance.clone(), class.to_string());
            state
                .by_class
                .entry(class.to_string())
                .or_default()
                .push(instance.clone());
            area
        };
        info!(class = %class, "Area instantiated");

        for listener in self.area_listeners() {
            if let Err(err) = listener.area_created(class, instance) {
                warn!(class = %class, error = %err, "Area listener failed during area_created");
            }
        }
        Ok(area)
    }

    /// Disposes the area live under `instance`.
    ///
    /// Broadcasts one `area_disposing` per area listener *before* any index
    /// is mutated. Index cleanup then completes regardless of listener
    /// failures; the first failure, if any, is surfaced afterwards.
    ///
    /// The handle is claimed atomically up front: a second disposal of the
    /// same handle, including one racing the broadcast, fails with
    /// [`RegistryError::UnknownArea`] while lookups still resolve it.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::UnknownArea`] when `instance` has no live area or
    ///   its disposal is already in flight.
    /// - [`RegistryError::ListenerFailed`] when a listener failed (cleanup
    ///   has still completed).
    pub fn dispose_area(&self, instance: &AreaInstance) -> RegistryResult<()> {
        // Claim the disposal; the indices stay intact for the broadcast.
        let (area, class) = {
            let mut state = self.state.write();
            if state.disposing.contains(instance) {
                return Err(RegistryError::UnknownArea);
            }
            let area = state
                .instances
                .get(instance)
                .cloned()
                .ok_or(RegistryError::UnknownArea)?;
            let class = state
                .instance_class
                .get(instance)
                .cloned()
                .ok_or(RegistryError::UnknownArea)?;
            state.disposing.insert(instance.clone());
            (area, class)
        };

        let mut failure: Option<RegistryError> = None;
        for listener in self.area_listeners() {
            if let Err(err) = listener.area_disposing(&class, instance) {
                warn!(class = %class, error = %err, "Area listener failed during area_disposing");
                if failure.is_none() {
                    failure = Some(RegistryError::ListenerFailed {
                        event: "area_disposing",
                        class: class.clone(),
                        message: err.to_string(),
                    });
                }
            }
        }

        // Cleanup completes regardless of listener failures.
        area.kill_interactions();
        {
            let mut state = self.state.write();
            state.instances.remove(instance);
            state.instance_class.remove(instance);
            if let Some(handles) = state.by_class.get_mut(&class) {
                handles.retain(|handle| handle != instance);
                if handles.is_empty() {
                    state.by_class.remove(&class);
                }
            }
            state.disposing.remove(instance);
        }
        info!(class = %class, "Area disposed");

        match failure {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    // ─── Lookups ─────────────────────────────────────────────────────────────

    /// Returns the area live under `instance`, or the root for `None`.
    ///
    /// # Errors
    ///
    /// [`RegistryError::UnknownArea`] when the handle has no live area.
    pub fn get_area(&self, instance: Option<&AreaInstance>) -> RegistryResult<Arc<Area>> {
        match instance {
            None => Ok(self.root.clone()),
            Some(handle) => self
                .state
                .read()
                .instances
                .get(handle)
                .cloned()
                .ok_or(RegistryError::UnknownArea),
        }
    }

    /// The always-present root area.
    pub fn root_area(&self) -> Arc<Area> {
        self.root.clone()
    }

    /// Snapshot of every instantiated area (the root is not included).
    pub fn all_areas(&self) -> Vec<Arc<Area>> {
        self.state.read().instances.values().cloned().collect()
    }

    /// Snapshot of the instantiated areas of one class. Empty, not an error,
    /// when none match.
    pub fn areas_of_class(&self, class: &str) -> Vec<Arc<Area>> {
        let state = self.state.read();
        state
            .by_class
            .get(class)
            .into_iter()
            .flatten()
            .filter_map(|handle| state.instances.get(handle).cloned())
            .collect()
    }

    // ─── Area listeners ──────────────────────────────────────────────────────

    /// Registers an area listener as an extension of the reserved root point.
    pub fn add_area_listener(&self, listener: Arc<dyn AreaListener>) {
        self.listener_point
            .register_extension(Arc::new(AreaListenerEntry(listener)) as ExtensionObject);
    }

    /// Removes a previously added area listener. Returns `false` when absent.
    pub fn remove_area_listener(&self, listener: &Arc<dyn AreaListener>) -> bool {
        let snapshot = match self.listener_point.get_extensions() {
            Ok(snapshot) => snapshot,
            Err(err) => {
                warn!(error = %err, "Area listener point failed to resolve");
                return false;
            }
        };
        for obj in snapshot.iter() {
            if let Some(entry) = obj.downcast_ref::<AreaListenerEntry>()
                && Arc::ptr_eq(&entry.0, listener)
            {
                return self.listener_point.unregister_extension(obj);
            }
        }
        false
    }

    fn area_listeners(&self) -> Vec<Arc<dyn AreaListener>> {
        match self.listener_point.get_extensions() {
            Ok(snapshot) => snapshot
                .iter()
                .filter_map(|obj| obj.downcast_ref::<AreaListenerEntry>())
                .map(|entry| entry.0.clone())
                .collect(),
            Err(err) => {
                warn!(error = %err, "Area listener point failed to resolve");
                Vec::new()
            }
        }
    }

    // ─── Stats ───────────────────────────────────────────────────────────────

    /// Returns counters describing the registry's current population.
    pub fn stats(&self) -> RegistryStats {
        let state = self.state.read();
        let extension_points = self.root.extension_point_count()
            + state
                .instances
                .values()
                .map(|area| area.extension_point_count())
                .sum::<usize>();
        RegistryStats {
            area_classes: state.classes.len(),
            live_areas: state.instances.len(),
            extension_points,
        }
    }
}

impl Default for AreaRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for AreaRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stats = self.stats();
        f.debug_struct("AreaRegistry")
            .field("area_classes", &stats.area_classes)
            .field("live_areas", &stats.live_areas)
            .field("extension_points", &stats.extension_points)
            .finish()
    }
}

/// Counters describing an [`AreaRegistry`]'s current population.
#[derive(Debug, Clone, Default)]
pub struct RegistryStats {
    /// Registered area classes.
    pub area_classes: usize,
    /// Instantiated (non-root) areas.
    pub live_areas: usize,
    /// Extension points across the root and every live area.
    pub extension_points: usize,
}

impl fmt::Display for RegistryStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Areas: {} live ({} classes registered), {} extension points",
            self.live_areas, self.area_classes, self.extension_points
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    const PROJECT: &str = "com.example.project";
    const MODULE: &str = "com.example.module";

    fn registry_with_hierarchy() -> AreaRegistry {
        let registry = AreaRegistry::new();
        registry.register_area_class(PROJECT, None).unwrap();
        registry.register_area_class(MODULE, Some(PROJECT)).unwrap();
        registry
    }

    #[test]
    fn identical_class_re_registration_is_a_no_op() {
        let registry = registry_with_hierarchy();
        registry.register_area_class(PROJECT, None).unwrap();
        registry.register_area_class(MODULE, Some(PROJECT)).unwrap();
    }

    #[test]
    fn conflicting_class_re_registration_fails_without_altering_the_first() {
        let registry = registry_with_hierarchy();
        let err = registry
            .register_area_class(MODULE, Some("com.example.other"))
            .unwrap_err();
        assert!(matches!(err, RegistryError::AreaClassConflict { .. }));

        // The original registration still works.
        let project = AreaInstance::new();
        registry.instantiate_area(PROJECT, &project, None).unwrap();
        let module = AreaInstance::new();
        registry
            .instantiate_area(MODULE, &module, Some(&project))
            .unwrap();
    }

    #[test]
    fn instantiation_requires_a_registered_class() {
        let registry = AreaRegistry::new();
        let err = registry
            .instantiate_area("com.example.ghost", &AreaInstance::new(), None)
            .unwrap_err();
        assert!(matches!(err, RegistryError::UnknownAreaClass(_)));
    }

    #[test]
    fn instantiation_rejects_a_live_instance_handle() {
        let registry = registry_with_hierarchy();
        let handle = AreaInstance::new();
        registry.instantiate_area(PROJECT, &handle, None).unwrap();
        let err = registry
            .instantiate_area(PROJECT, &handle, None)
            .unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateAreaInstance));
    }

    #[test]
    fn instantiation_requires_a_live_and_matching_parent() {
        let registry = registry_with_hierarchy();

        // Parent handle with no live area.
        let err = registry
            .instantiate_area(MODULE, &AreaInstance::new(), Some(&AreaInstance::new()))
            .unwrap_err();
        assert!(matches!(err, RegistryError::UnknownArea));

        // Module declared under project, instantiated under root.
        let err = registry
            .instantiate_area(MODULE, &AreaInstance::new(), None)
            .unwrap_err();
        assert!(matches!(err, RegistryError::ParentMismatch { .. }));

        // Project declared root-rooted, instantiated under a project.
        let project = AreaInstance::new();
        registry.instantiate_area(PROJECT, &project, None).unwrap();
        let err = registry
            .instantiate_area(PROJECT, &AreaInstance::new(), Some(&project))
            .unwrap_err();
        assert!(matches!(err, RegistryError::ParentMismatch { .. }));
    }

    #[test]
    fn instantiated_areas_delegate_to_their_parent_chain() {
        let registry = registry_with_hierarchy();
        let project = AreaInstance::new();
        let project_area = registry.instantiate_area(PROJECT, &project, None).unwrap();
        project_area
            .register_extension_point("project.tools", "dyn Tool")
            .unwrap();

        let module = AreaInstance::new();
        let module_area = registry
            .instantiate_area(MODULE, &module, Some(&project))
            .unwrap();
        assert!(module_area.has_extension_point("project.tools"));
        // The reserved root point is visible from every area.
        assert!(module_area.has_extension_point(AREA_LISTENER_POINT));
    }

    #[test]
    fn lookups_and_class_queries_track_live_areas() {
        let registry = registry_with_hierarchy();
        assert!(registry.get_area(None).is_ok());
        assert!(registry.all_areas().is_empty());
        assert!(registry.areas_of_class(PROJECT).is_empty());

        let handle = AreaInstance::new();
        let area = registry.instantiate_area(PROJECT, &handle, None).unwrap();
        assert!(Arc::ptr_eq(
            &registry.get_area(Some(&handle)).unwrap(),
            &area
        ));
        assert_eq!(registry.all_areas().len(), 1);
        assert_eq!(registry.areas_of_class(PROJECT).len(), 1);
        assert!(registry.areas_of_class(MODULE).is_empty());
    }

    #[test]
    fn unregistering_a_class_leaves_live_areas_alone() {
        let registry = registry_with_hierarchy();
        let handle = AreaInstance::new();
        registry.instantiate_area(PROJECT, &handle, None).unwrap();

        registry.unregister_area_class(MODULE).unwrap();
        registry.unregister_area_class(PROJECT).unwrap();
        assert!(matches!(
            registry.unregister_area_class(PROJECT),
            Err(RegistryError::UnknownAreaClass(_))
        ));

        assert!(registry.get_area(Some(&handle)).is_ok());
    }

    // ─── Lifecycle broadcast ─────────────────────────────────────────────────

    struct RecordingListener {
        tag: &'static str,
        log: Arc<Mutex<Vec<String>>>,
    }

    impl AreaListener for RecordingListener {
        fn area_created(&self, class: &str, _: &AreaInstance) -> Result<(), ListenerError> {
            self.log.lock().push(format!("{}:created:{class}", self.tag));
            Ok(())
        }

        fn area_disposing(&self, class: &str, _: &AreaInstance) -> Result<(), ListenerError> {
            self.log.lock().push(format!("{}:disposing:{class}", self.tag));
            Ok(())
        }
    }

    #[test]
    fn lifecycle_broadcasts_run_in_listener_registration_order() {
        let registry = registry_with_hierarchy();
        let log = Arc::new(Mutex::new(Vec::new()));
        registry.add_area_listener(Arc::new(RecordingListener {
            tag: "a",
            log: log.clone(),
        }));
        registry.add_area_listener(Arc::new(RecordingListener {
            tag: "b",
            log: log.clone(),
        }));

        let handle = AreaInstance::new();
        registry.instantiate_area(PROJECT, &handle, None).unwrap();
        registry.dispose_area(&handle).unwrap();

        assert_eq!(
            *log.lock(),
            [
                format!("a:created:{PROJECT}"),
                format!("b:created:{PROJECT}"),
                format!("a:disposing:{PROJECT}"),
                format!("b:disposing:{PROJECT}"),
            ]
        );
    }

    #[test]
    fn disposal_fires_once_per_listener_before_indices_shrink() {
        let registry = registry_with_hierarchy();
        let handle = AreaInstance::new();
        registry.instantiate_area(PROJECT, &handle, None).unwrap();

        // Observed from inside the broadcast: the area is still indexed.
        struct AssertStillIndexed {
            registry: Arc<AreaRegistry>,
            fired: Arc<Mutex<usize>>,
        }
        impl AreaListener for AssertStillIndexed {
            fn area_disposing(
                &self,
                _class: &str,
                instance: &AreaInstance,
            ) -> Result<(), ListenerError> {
                assert!(self.registry.get_area(Some(instance)).is_ok());
                assert_eq!(self.registry.all_areas().len(), 1);
                *self.fired.lock() += 1;
                Ok(())
            }
        }

        let registry = Arc::new(registry);
        let fired = Arc::new(Mutex::new(0));
        registry.add_area_listener(Arc::new(AssertStillIndexed {
            registry: registry.clone(),
            fired: fired.clone(),
        }));

        registry.dispose_area(&handle).unwrap();
        assert_eq!(*fired.lock(), 1);
        assert!(matches!(
            registry.get_area(Some(&handle)),
            Err(RegistryError::UnknownArea)
        ));
        assert!(registry.all_areas().is_empty());
        assert!(registry.areas_of_class(PROJECT).is_empty());
    }

    #[test]
    fn a_failing_listener_never_blocks_disposal_cleanup() {
        struct Failing;
        impl AreaListener for Failing {
            fn area_disposing(&self, _: &str, _: &AreaInstance) -> Result<(), ListenerError> {
                Err("listener exploded".into())
            }
        }

        let registry = registry_with_hierarchy();
        registry.add_area_listener(Arc::new(Failing));
        let handle = AreaInstance::new();
        registry.instantiate_area(PROJECT, &handle, None).unwrap();

        let err = registry.dispose_area(&handle).unwrap_err();
        assert!(matches!(
            err,
            RegistryError::ListenerFailed {
                event: "area_disposing",
                ..
            }
        ));
        // Cleanup completed regardless.
        assert!(registry.get_area(Some(&handle)).is_err());
        assert!(registry.all_areas().is_empty());
    }

    #[test]
    fn concurrent_disposals_of_one_handle_succeed_exactly_once() {
        use std::sync::Barrier;
        use std::sync::atomic::{AtomicUsize, Ordering};

        struct Gate {
            entered: Arc<Barrier>,
            release: Arc<Barrier>,
            fired: Arc<AtomicUsize>,
        }
        impl AreaListener for Gate {
            fn area_disposing(&self, _: &str, _: &AreaInstance) -> Result<(), ListenerError> {
                self.fired.fetch_add(1, Ordering::SeqCst);
                self.entered.wait();
                self.release.wait();
                Ok(())
            }
        }

        let registry = Arc::new(registry_with_hierarchy());
        let entered = Arc::new(Barrier::new(2));
        let release = Arc::new(Barrier::new(2));
        let fired = Arc::new(AtomicUsize::new(0));
        registry.add_area_listener(Arc::new(Gate {
            entered: entered.clone(),
            release: release.clone(),
            fired: fired.clone(),
        }));

        let handle = AreaInstance::new();
        registry.instantiate_area(PROJECT, &handle, None).unwrap();

        let worker = {
            let registry = registry.clone();
            let handle = handle.clone();
            std::thread::spawn(move || registry.dispose_area(&handle))
        };
        // The first disposal is mid-broadcast; the handle still resolves,
        // but a second disposal must not claim it again.
        entered.wait();
        assert!(registry.get_area(Some(&handle)).is_ok());
        assert!(matches!(
            registry.dispose_area(&handle),
            Err(RegistryError::UnknownArea)
        ));
        release.wait();
        worker.join().unwrap().unwrap();

        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert!(registry.get_area(Some(&handle)).is_err());
        assert!(registry.all_areas().is_empty());
    }

    #[test]
    fn disposing_an_unknown_instance_fails() {
        let registry = AreaRegistry::new();
        assert!(matches!(
            registry.dispose_area(&AreaInstance::new()),
            Err(RegistryError::UnknownArea)
        ));
    }

    #[test]
    fn removed_listeners_hear_nothing_further() {
        let registry = registry_with_hierarchy();
        let log = Arc::new(Mutex::new(Vec::new()));
        let listener: Arc<dyn AreaListener> = Arc::new(RecordingListener {
            tag: "a",
            log: log.clone(),
        });
        registry.add_area_listener(listener.clone());

        let first = AreaInstance::new();
        registry.instantiate_area(PROJECT, &first, None).unwrap();
        assert_eq!(log.lock().len(), 1);

        assert!(registry.remove_area_listener(&listener));
        assert!(!registry.remove_area_listener(&listener));

        let second = AreaInstance::new();
        registry.instantiate_area(PROJECT, &second, None).unwrap();
        assert_eq!(log.lock().len(), 1);
    }

    #[test]
    fn stats_count_classes_areas_and_points() {
        let registry = registry_with_hierarchy();
        let handle = AreaInstance::new();
        let area = registry.instantiate_area(PROJECT, &handle, None).unwrap();
        area.register_extension_point("p.one", "u32").unwrap();

        let stats = registry.stats();
        assert_eq!(stats.area_classes, 2);
        assert_eq!(stats.live_areas, 1);
        // The reserved root point plus the one above.
        assert_eq!(stats.extension_points, 2);
        assert_eq!(
            stats.to_string(),
            "Areas: 1 live (2 classes registered), 2 extension points"
        );
    }
}
