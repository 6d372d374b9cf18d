//! Resource identity and the registry contract.
//!
//! Shaders, materials and meshes are resources: each carries a UUID handed
//! out by a [`ResourceRegistry`] and a display name. The registry decides how
//! UUIDs map to loaded instances; this crate only creates and destroys
//! handles. [`LocalRegistry`] is an in-process registry for tools and tests.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use uuid::Uuid;

use crate::error::GraphicsError;

/// Hands out resource handles.
pub trait ResourceRegistry: Send + Sync + std::fmt::Debug {
    /// Register a new resource and return its UUID.
    fn create_handle(&self, name: &str) -> Uuid;

    /// Forget a resource. Unknown UUIDs are ignored.
    fn destroy_handle(&self, uuid: Uuid);
}

/// Registry that keeps handles in process memory.
#[derive(Debug, Default)]
pub struct LocalRegistry {
    handles: Mutex<HashMap<Uuid, String>>,
}

impl LocalRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live handles.
    pub fn handle_count(&self) -> usize {
        self.handles.lock().len()
    }

    /// Name a handle was created with.
    pub fn name_of(&self, uuid: Uuid) -> Option<String> {
        self.handles.lock().get(&uuid).cloned()
    }

    pub fn contains(&self, uuid: Uuid) -> bool {
        self.handles.lock().contains_key(&uuid)
    }
}

impl ResourceRegistry for LocalRegistry {
    fn create_handle(&self, name: &str) -> Uuid {
        let uuid = Uuid::new_v4();
        self.handles.lock().insert(uuid, name.to_string());
        log::trace!("LocalRegistry: created handle {} for '{}'", uuid, name);
        uuid
    }

    fn destroy_handle(&self, uuid: Uuid) {
        if self.handles.lock().remove(&uuid).is_some() {
            log::trace!("LocalRegistry: destroyed handle {}", uuid);
        }
    }
}

/// UUID and name of a resource.
///
/// The handle is destroyed in the registry when the identity is dropped.
pub struct ResourceIdentity {
    uuid: Uuid,
    name: String,
    registry: Arc<dyn ResourceRegistry>,
}

impl ResourceIdentity {
    /// Register `name` with `registry`.
    pub fn new(registry: &Arc<dyn ResourceRegistry>, name: impl Into<String>) -> Self {
        let name = name.into();
        let uuid = registry.create_handle(&name);
        Self {
            uuid,
            name,
            registry: Arc::clone(registry),
        }
    }

    pub fn uuid(&self) -> Uuid {
        self.uuid
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Drop for ResourceIdentity {
    fn drop(&mut self) {
        self.registry.destroy_handle(self.uuid);
    }
}

impl std::fmt::Debug for ResourceIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceIdentity")
            .field("uuid", &self.uuid)
            .field("name", &self.name)
            .finish()
    }
}

/// Common capabilities of registry-tracked objects.
pub trait Resource {
    fn identity(&self) -> &ResourceIdentity;

    /// Second construction phase: create GPU-side state.
    fn initialize(&mut self) -> Result<(), GraphicsError>;

    fn uuid(&self) -> Uuid {
        self.identity().uuid()
    }

    fn name(&self) -> &str {
        self.identity().name()
    }
}

static_assertions::assert_impl_all!(ResourceIdentity: Send, Sync);
static_assertions::assert_impl_all!(LocalRegistry: Send, Sync);
