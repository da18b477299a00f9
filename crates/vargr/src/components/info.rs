use serde::{Deserialize, Serialize};

/// Display name and enabled flag.
///
/// Disabled entities are skipped by [`Scene::renderables`](crate::scene::Scene::renderables).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Info {
    pub name: String,
    #[serde(default = "enabled")]
    pub enabled: bool,
}

fn enabled() -> bool {
    true
}

impl Info {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            enabled: true,
        }
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }
}

impl Default for Info {
    fn default() -> Self {
        Self::new("")
    }
}
