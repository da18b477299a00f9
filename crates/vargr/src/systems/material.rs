use std::collections::HashSet;

use crate::components::{Material, MaterialLibrary};
use crate::ecs::{Entity, EntitySystem, SystemContext};
use crate::error::Result;

/// Resolves [`Material`] names into instance handles through an owned
/// [`MaterialLibrary`].
///
/// Names the library doesn't know stay unresolved and are retried every
/// tick; each is logged once.
pub struct MaterialBindingSystem {
    library: Box<dyn MaterialLibrary>,
    missing: HashSet<String>,
}

impl MaterialBindingSystem {
    pub fn new(library: impl MaterialLibrary + 'static) -> Self {
        Self {
            library: Box::new(library),
            missing: HashSet::new(),
        }
    }

    fn bind(&mut self, entity: Entity, material: &mut Material) {
        if material.instance.is_some() {
            return;
        }
        match self.library.resolve(&material.name) {
            Some(handle) => {
                log::trace!("bound material '{}' for entity {}", material.name, entity);
                material.instance = Some(handle);
                self.missing.remove(&material.name);
            }
            None => {
                if self.missing.insert(material.name.clone()) {
                    log::warn!("material '{}' not found in library", material.name);
                }
            }
        }
    }
}

impl EntitySystem for MaterialBindingSystem {
    type Query = (&'static mut Material,);

    fn on_update(
        &mut self,
        _ctx: &mut SystemContext<'_>,
        entity: Entity,
        (material,): (&mut Material,),
    ) -> Result<()> {
        self.bind(entity, material);
        Ok(())
    }
}
