use std::collections::HashMap;

/// Opaque id of a material instance owned by an external cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MaterialHandle(pub u64);

/// A material referenced by name, resolved lazily into a handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Material {
    pub name: String,
    pub instance: Option<MaterialHandle>,
}

impl Material {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            instance: None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.instance.is_some()
    }
}

/// Name → instance lookup provided by whoever owns the materials.
///
/// Passed to [`MaterialBindingSystem`](crate::systems::MaterialBindingSystem)
/// by value, so tests can hand in a plain map.
pub trait MaterialLibrary: Send + Sync {
    fn resolve(&self, name: &str) -> Option<MaterialHandle>;
}

impl MaterialLibrary for HashMap<String, MaterialHandle> {
    fn resolve(&self, name: &str) -> Option<MaterialHandle> {
        self.get(name).copied()
    }
}
