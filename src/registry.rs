//! Named scheduling methods.
//!
//! A [`MethodRegistry`] maps method identifiers to shared
//! [`SchedulingMethod`] objects. Schedulers never consult it; it exists for
//! hosts that pick a method by name at runtime.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use parking_lot::RwLock;
use tracing::debug;

use crate::scheduler::SchedulingMethod;

/// Method identifier → scheduling method.
#[derive(Default)]
pub struct MethodRegistry {
    methods: RwLock<HashMap<String, Arc<dyn SchedulingMethod>>>,
}

impl MethodRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide registry, created on first use.
    pub fn global() -> &'static MethodRegistry {
        static GLOBAL: OnceLock<MethodRegistry> = OnceLock::new();
        GLOBAL.get_or_init(MethodRegistry::new)
    }

    /// Registers `method` under `id`, returning the entry it replaced.
    pub fn register(
        &self,
        id: impl Into<String>,
        method: Arc<dyn SchedulingMethod>,
    ) -> Option<Arc<dyn SchedulingMethod>> {
        let id = id.into();
        debug!(method = %id, "registering scheduling method");
        self.methods.write().insert(id, method)
    }

    /// Removes and returns the method registered under `id`.
    pub fn deregister(&self, id: &str) -> Option<Arc<dyn SchedulingMethod>> {
        self.methods.write().remove(id)
    }

    /// Gets a method by id.
    pub fn get(&self, id: &str) -> Option<Arc<dyn SchedulingMethod>> {
        self.methods.read().get(id).cloned()
    }

    /// Lists registered ids, sorted.
    pub fn methods(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.methods.read().keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.methods.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.read().is_empty()
    }
}

impl std::fmt::Debug for MethodRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MethodRegistry")
            .field("methods", &self.methods())
            .finish()
    }
}
