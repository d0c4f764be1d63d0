//! Contributor identity and the extension factory seam.
//!
//! A [`PluginId`] is the interned identity of one contributor; a
//! [`PluginDescriptor`] pairs that identity with the contributor's isolated
//! construction boundary — an [`ExtensionFactory`] that turns a declared
//! implementation type name into a live object. The registry itself never
//! constructs anything: every instantiation goes through the descriptor, so
//! failures can always be attributed to the right contributor.

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use parking_lot::Mutex;
use serde::de::{Deserialize, Deserializer};
use serde::ser::{Serialize, Serializer};

use crate::error::InstantiationError;

/// A contributed extension object, type-erased.
///
/// Extension points store values behind `dyn Any`; consumers downcast to the
/// declared type. Identity (pointer) equality of the stored object is the
/// membership notion used by `has_extension` / `unregister_extension`.
pub type ExtensionObject = Arc<dyn Any + Send + Sync>;

/// Returns `true` when two extension objects are the same stored object.
pub fn same_extension(a: &ExtensionObject, b: &ExtensionObject) -> bool {
    Arc::ptr_eq(a, b)
}

// ─── PluginId ─────────────────────────────────────────────────────────────────

static INTERNED: Mutex<BTreeMap<Box<str>, PluginId>> = Mutex::new(BTreeMap::new());

/// Interned contributor identity.
///
/// Equal id strings always yield the same handle, so equality is a pointer
/// comparison and cloning is an `Arc` bump.
#[derive(Clone, Eq)]
pub struct PluginId(Arc<str>);

impl PluginId {
    /// Returns the interned handle for `id`, creating it on first use.
    pub fn get(id: &str) -> PluginId {
        let mut table = INTERNED.lock();
        if let Some(existing) = table.get(id) {
            return existing.clone();
        }
        let handle = PluginId(Arc::from(id));
        table.insert(Box::from(id), handle.clone());
        handle
    }

    /// The id string this handle was interned from.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl PartialEq for PluginId {
    fn eq(&self, other: &Self) -> bool {
        // Interning guarantees pointer equality is string equality.
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Hash for PluginId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

impl fmt::Debug for PluginId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PluginId({})", self.0)
    }
}

impl fmt::Display for PluginId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for PluginId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for PluginId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(PluginId::get(&raw))
    }
}

// ─── ExtensionFactory ─────────────────────────────────────────────────────────

/// The contributor-supplied construction boundary.
///
/// Given a declared implementation type name, produces the live extension
/// object, or a human-readable reason why it could not. The registry attaches
/// the owning plugin's identity to failures; factories only report the reason.
pub trait ExtensionFactory: Send + Sync {
    /// Produces an instance of `class_name`.
    fn create(&self, class_name: &str) -> Result<ExtensionObject, String>;
}

impl<F> ExtensionFactory for F
where
    F: Fn(&str) -> Result<ExtensionObject, String> + Send + Sync,
{
    fn create(&self, class_name: &str) -> Result<ExtensionObject, String> {
        self(class_name)
    }
}

// ─── PluginDescriptor ─────────────────────────────────────────────────────────

/// Identity plus isolated construction boundary for one contributor.
///
/// Attached to extension entries for diagnostics, and consulted whenever a
/// lazily registered extension needs to be materialised from its declared
/// type name.
#[derive(Clone)]
pub struct PluginDescriptor {
    id: PluginId,
    factory: Option<Arc<dyn ExtensionFactory>>,
}

impl PluginDescriptor {
    /// Creates a descriptor with a construction boundary.
    pub fn new(id: PluginId, factory: Arc<dyn ExtensionFactory>) -> Self {
        Self {
            id,
            factory: Some(factory),
        }
    }

    /// Creates a descriptor carrying identity only.
    ///
    /// Instantiation through such a descriptor always fails; it is still
    /// useful for tagging eagerly registered extensions for diagnostics.
    pub fn identity_only(id: PluginId) -> Self {
        Self { id, factory: None }
    }

    /// The contributor's identity.
    pub fn id(&self) -> &PluginId {
        &self.id
    }

    /// Instantiates `class_name` within this contributor's boundary.
    pub fn instantiate(&self, class_name: &str) -> Result<ExtensionObject, InstantiationError> {
        let Some(factory) = &self.factory else {
            return Err(InstantiationError {
                class_name: class_name.to_string(),
                plugin: Some(self.id.clone()),
                reason: "descriptor has no extension factory".to_string(),
            });
        };
        factory.create(class_name).map_err(|reason| InstantiationError {
            class_name: class_name.to_string(),
            plugin: Some(self.id.clone()),
            reason,
        })
    }
}

impl fmt::Debug for PluginDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginDescriptor")
            .field("id", &self.id)
            .field("has_factory", &self.factory.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_strings_intern_to_the_same_handle() {
        let a = PluginId::get("com.example.one");
        let b = PluginId::get("com.example.one");
        let c = PluginId::get("com.example.two");
        assert_eq!(a, b);
        assert!(Arc::ptr_eq(&a.0, &b.0));
        assert_ne!(a, c);
    }

    #[test]
    fn descriptor_attaches_identity_to_factory_failures() {
        let desc = PluginDescriptor::new(
            PluginId::get("com.example.broken"),
            Arc::new(|class: &str| -> Result<ExtensionObject, String> {
                Err(format!("no such class '{class}'"))
            }),
        );
        let err = desc.instantiate("com.example.Missing").unwrap_err();
        assert_eq!(err.plugin, Some(PluginId::get("com.example.broken")));
        assert!(err.reason.contains("com.example.Missing"));
    }

    #[test]
    fn identity_only_descriptor_cannot_instantiate() {
        let desc = PluginDescriptor::identity_only(PluginId::get("com.example.tag"));
        let err = desc.instantiate("com.example.Impl").unwrap_err();
        assert!(err.to_string().contains("no extension factory"));
    }

    #[test]
    fn factory_success_produces_a_downcastable_object() {
        let desc = PluginDescriptor::new(
            PluginId::get("com.example.ok"),
            Arc::new(|_: &str| -> Result<ExtensionObject, String> {
                Ok(Arc::new(42u32) as ExtensionObject)
            }),
        );
        let obj = desc.instantiate("com.example.Impl").unwrap();
        assert_eq!(obj.downcast_ref::<u32>(), Some(&42));
    }
}
