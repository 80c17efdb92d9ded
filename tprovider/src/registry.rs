//! Vendor registry resolving a configured backend by name.
//!
//! ```rust
//! use tprovider::VendorRegistry;
//!
//! let registry = VendorRegistry::new();
//! assert!(registry.is_empty());
//! assert!(registry.get("openai").is_none());
//! ```

use std::sync::Arc;

use tcommon::Registry;

use crate::VendorBackend;

#[derive(Default)]
pub struct VendorRegistry {
    backends: Registry<String, Arc<dyn VendorBackend>>,
}

impl VendorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<B>(&mut self, backend: B)
    where
        B: VendorBackend + 'static,
    {
        self.register_shared(Arc::new(backend));
    }

    pub fn register_shared(&mut self, backend: Arc<dyn VendorBackend>) {
        self.backends.insert(normalize(backend.name()), backend);
    }

    /// Case-insensitive lookup.
    pub fn get(&self, name: &str) -> Option<Arc<dyn VendorBackend>> {
        self.backends.get(normalize(name).as_str()).cloned()
    }

    pub fn remove(&mut self, name: &str) -> Option<Arc<dyn VendorBackend>> {
        self.backends.remove(normalize(name).as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.backends.contains_key(normalize(name).as_str())
    }

    pub fn names(&self) -> Vec<String> {
        let mut names = self.backends.keys().cloned().collect::<Vec<_>>();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.backends.len()
    }

    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }
}

fn normalize(name: &str) -> String {
    name.trim().to_ascii_lowercase()
}
