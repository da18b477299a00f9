//! # Query — Typed Component Sets for Systems
//!
//! A system declares the components it needs as a tuple type:
//!
//! ```text
//! type Query = (&'static Transform, &'static mut Camera);
//!
//! 1. Signature: register Transform and Camera, set their bits
//! 2. Extract:   move both stores out of the world
//! 3. Fetch:     per matching entity, borrow (&Transform, &mut Camera)
//! 4. Restore:   put both stores back
//! ```
//!
//! ## Extract / Restore
//!
//! Rust's `Iterator` can't hand out items that borrow from the iterator
//! itself. Instead, the stores named by the query are taken out of the
//! world's store map for the duration of one system step. The stores are then
//! owned values the borrow checker can split field by field, and the rest of
//! the world stays available to the callback through
//! [`SystemContext`](super::system::SystemContext).
//!
//! A query naming the same type twice would extract one store and hand an
//! empty one to the second slot, so [`ComponentSet::signature`] rejects it.

use std::any::TypeId;

use super::component::{Component, ComponentRegistry};
use super::entity::Entity;
use super::signature::Signature;
use super::storage::ComponentStore;
use super::world::World;
use crate::error::{EcsError, Result};

/// Something a system can fetch per entity: `&T`, `&mut T`, or a tuple of
/// those (up to 8 elements).
pub trait ComponentSet: 'static {
    /// What the callback receives for one entity.
    type Item<'a>;

    /// Stores moved out of the world while the set is in use.
    type Stores;

    /// `(TypeId, type name)` of every member, in declaration order.
    fn members() -> Vec<(TypeId, &'static str)>;

    /// Move the member stores out of `world`.
    fn extract(world: &mut World) -> Self::Stores;

    /// Put the member stores back into `world`.
    fn restore(stores: Self::Stores, world: &mut World);

    /// Borrow the members for `entity`. `None` if any is missing.
    fn fetch(stores: &mut Self::Stores, entity: Entity) -> Option<Self::Item<'_>>;

    /// Register every member and build the signature.
    ///
    /// Fails with [`EcsError::SignatureMismatch`] if the set is empty or
    /// names a type twice.
    fn signature(registry: &mut ComponentRegistry, system: &str) -> Result<Signature> {
        let members = Self::members();
        if members.is_empty() {
            return Err(EcsError::SignatureMismatch {
                system: system.to_string(),
                reason: "signature names no component types".to_string(),
            });
        }
        let mut signature = Signature::new();
        for (type_id, name) in members {
            let id = registry.register_raw(type_id, name);
            if !signature.insert(id) {
                return Err(EcsError::SignatureMismatch {
                    system: system.to_string(),
                    reason: format!("`{name}` appears more than once"),
                });
            }
        }
        Ok(signature)
    }
}

impl<T: Component> ComponentSet for &'static T {
    type Item<'a> = &'a T;
    type Stores = Box<ComponentStore<T>>;

    fn members() -> Vec<(TypeId, &'static str)> {
        vec![(TypeId::of::<T>(), std::any::type_name::<T>())]
    }

    fn extract(world: &mut World) -> Self::Stores {
        world.take_store::<T>()
    }

    fn restore(stores: Self::Stores, world: &mut World) {
        world.restore_store(stores);
    }

    fn fetch(stores: &mut Self::Stores, entity: Entity) -> Option<Self::Item<'_>> {
        stores.get(entity)
    }
}

impl<T: Component> ComponentSet for &'static mut T {
    type Item<'a> = &'a mut T;
    type Stores = Box<ComponentStore<T>>;

    fn members() -> Vec<(TypeId, &'static str)> {
        vec![(TypeId::of::<T>(), std::any::type_name::<T>())]
    }

    fn extract(world: &mut World) -> Self::Stores {
        world.take_store::<T>()
    }

    fn restore(stores: Self::Stores, world: &mut World) {
        world.restore_store(stores);
    }

    fn fetch(stores: &mut Self::Stores, entity: Entity) -> Option<Self::Item<'_>> {
        stores.get_mut(entity)
    }
}

macro_rules! impl_component_set_tuple {
    ($($P:ident),+) => {
        impl<$($P: ComponentSet),+> ComponentSet for ($($P,)+) {
            type Item<'a> = ($($P::Item<'a>,)+);
            type Stores = ($($P::Stores,)+);

            fn members() -> Vec<(TypeId, &'static str)> {
                let mut members = Vec::new();
                $(members.extend($P::members());)+
                members
            }

            #[allow(non_snake_case)]
            fn extract(world: &mut World) -> Self::Stores {
                ($($P::extract(world),)+)
            }

            #[allow(non_snake_case)]
            fn restore(stores: Self::Stores, world: &mut World) {
                let ($($P,)+) = stores;
                $($P::restore($P, world);)+
            }

            #[allow(non_snake_case)]
            fn fetch(stores: &mut Self::Stores, entity: Entity) -> Option<Self::Item<'_>> {
                let ($($P,)+) = stores;
                Some(($($P::fetch($P, entity)?,)+))
            }
        }
    };
}

impl_component_set_tuple!(A);
impl_component_set_tuple!(A, B);
impl_component_set_tuple!(A, B, C);
impl_component_set_tuple!(A, B, C, D);
impl_component_set_tuple!(A, B, C, D, E);
impl_component_set_tuple!(A, B, C, D, E, F);
impl_component_set_tuple!(A, B, C, D, E, F, G);
impl_component_set_tuple!(A, B, C, D, E, F, G, H);

#[cfg(test)]
mod tests {
    use super::*;

    struct Pos(f32);
    struct Vel(f32);

    #[test]
    fn signature_registers_in_declaration_order() {
        let mut reg = ComponentRegistry::new();
        let sig = <(&Pos, &mut Vel)>::signature(&mut reg, "mover").unwrap();
        let pos = reg.id_of::<Pos>().unwrap();
        let vel = reg.id_of::<Vel>().unwrap();
        assert_eq!(pos.index(), 0);
        assert_eq!(vel.index(), 1);
        assert!(sig.contains(pos) && sig.contains(vel));
    }

    #[test]
    fn duplicate_type_is_rejected() {
        let mut reg = ComponentRegistry::new();
        let err = <(&Pos, &mut Pos)>::signature(&mut reg, "broken").unwrap_err();
        assert!(matches!(err, EcsError::SignatureMismatch { ref system, .. } if system == "broken"));
    }

    #[test]
    fn fetch_splits_borrows() {
        let mut world = World::new();
        let e = world.spawn((Pos(1.0), Vel(2.0))).unwrap();
        let lone = world.spawn((Pos(5.0),)).unwrap();

        let mut stores = <(&Pos, &mut Vel)>::extract(&mut world);
        {
            let (pos, vel) = <(&Pos, &mut Vel)>::fetch(&mut stores, e).unwrap();
            vel.0 += pos.0;
        }
        assert!(<(&Pos, &mut Vel)>::fetch(&mut stores, lone).is_none());
        <(&Pos, &mut Vel)>::restore(stores, &mut world);

        assert_eq!(world.get::<Vel>(e).map(|v| v.0), Some(3.0));
        assert_eq!(world.get::<Pos>(lone).map(|p| p.0), Some(5.0));
    }
}
