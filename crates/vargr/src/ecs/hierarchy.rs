//! # Entity Hierarchies — Parent Links and World Matrices
//!
//! A [`Link`] component names an entity's parent. From the links of a world,
//! [`SceneGraph::build`] derives children lists and depths, and
//! [`TransformResolver`] turns local [`Transform`]s into world matrices.
//!
//! ## Usage
//!
//! ```ignore
//! let parent = world.spawn((Transform::from_xyz(100.0, 0.0, 0.0),))?;
//! let child = world.spawn((Transform::from_xyz(10.0, 0.0, 0.0), Link::to(parent)))?;
//!
//! TransformResolver::resolve(&mut world)?;
//! // child's world matrix now places it at (110, 0, 0).
//! ```
//!
//! ## Resolution Order
//!
//! ```text
//! depth 0:  root ─────────────┐        world = local
//! depth 1:    ├─ mid          │        world = world(root) · local
//! depth 2:    │   └─ leaf     │        world = world(mid) · local
//! ```
//!
//! Entities are visited by `(depth, entity)`, so a parent's world matrix is
//! final before any child reads it, whatever order the links were made in.
//!
//! ## Freshness
//!
//! A transform is recomputed when any of these hold:
//!
//! - its own dirty flag is set
//! - its parent was recomputed in this pass
//! - the parent world matrix differs from the one it was last composed with
//!   (re-linked, unlinked, or parent released and replaced)
//!
//! Links are validated while the graph is built, before any matrix is
//! written: a link to a non-live entity is `DanglingParent`, a chain that
//! revisits itself is `CyclicHierarchy`. A failed pass writes nothing.

use std::collections::{BTreeMap, HashMap, HashSet};

use super::entity::Entity;
use super::system::System;
use super::world::World;
use crate::components::Transform;
use crate::error::{EcsError, Result};
use crate::math::Mat4;

/// Non-owning reference to a parent entity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Link {
    pub parent: Option<Entity>,
}

impl Link {
    /// A link under `parent`.
    pub fn to(parent: Entity) -> Self {
        Self {
            parent: Some(parent),
        }
    }

    /// A link with no parent.
    pub fn root() -> Self {
        Self { parent: None }
    }
}

/// Parent/child relationships of every live entity at one moment.
///
/// A snapshot: later changes to [`Link`] components are not reflected.
#[derive(Debug, Clone, Default)]
pub struct SceneGraph {
    parents: BTreeMap<Entity, Entity>,
    children: BTreeMap<Entity, Vec<Entity>>,
    depths: BTreeMap<Entity, usize>,
    order: Vec<Entity>,
}

impl SceneGraph {
    /// Collect and validate the links of `world`.
    pub fn build(world: &World) -> Result<Self> {
        let mut parents = BTreeMap::new();
        for (child, link) in world.each::<Link>() {
            let Some(parent) = link.parent else { continue };
            if !world.is_live(child) {
                continue;
            }
            if !world.is_live(parent) {
                return Err(EcsError::DanglingParent { child, parent });
            }
            parents.insert(child, parent);
        }

        let mut depths: BTreeMap<Entity, usize> = BTreeMap::new();
        for entity in world.entities() {
            Self::depth_walk(entity, &parents, &mut depths)?;
        }

        let mut children: BTreeMap<Entity, Vec<Entity>> = BTreeMap::new();
        for (&child, &parent) in &parents {
            children.entry(parent).or_default().push(child);
        }

        let mut order: Vec<Entity> = depths.keys().copied().collect();
        order.sort_by_key(|e| (depths[e], *e));

        Ok(Self {
            parents,
            children,
            depths,
            order,
        })
    }

    /// Fill in the depth of `entity` and every unresolved ancestor.
    fn depth_walk(
        entity: Entity,
        parents: &BTreeMap<Entity, Entity>,
        depths: &mut BTreeMap<Entity, usize>,
    ) -> Result<()> {
        if depths.contains_key(&entity) {
            return Ok(());
        }

        // Walk up until a root or an already-resolved ancestor.
        let mut path = vec![entity];
        let mut on_path = HashSet::from([entity]);
        let mut base = 0;
        let mut current = entity;
        while let Some(&parent) = parents.get(&current) {
            if let Some(&d) = depths.get(&parent) {
                base = d + 1;
                break;
            }
            if !on_path.insert(parent) {
                return Err(EcsError::CyclicHierarchy { entity: parent });
            }
            path.push(parent);
            current = parent;
        }

        // `path` runs child → ancestor; the last element sits at `base`.
        for (offset, node) in path.iter().rev().enumerate() {
            depths.insert(*node, base + offset);
        }
        Ok(())
    }

    pub fn parent_of(&self, entity: Entity) -> Option<Entity> {
        self.parents.get(&entity).copied()
    }

    /// Direct children in ascending order.
    pub fn children_of(&self, entity: Entity) -> &[Entity] {
        self.children.get(&entity).map_or(&[], Vec::as_slice)
    }

    /// Entities without a parent, ascending.
    pub fn roots(&self) -> impl Iterator<Item = Entity> + '_ {
        self.order
            .iter()
            .copied()
            .take_while(|e| self.depths[e] == 0)
    }

    pub fn depth_of(&self, entity: Entity) -> Option<usize> {
        self.depths.get(&entity).copied()
    }

    /// Every entity below `entity`, parents before their children.
    pub fn descendants(&self, entity: Entity) -> Vec<Entity> {
        let mut out = Vec::new();
        let mut stack: Vec<Entity> = self.children_of(entity).iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.children_of(next).iter().rev().copied());
        }
        out
    }

    /// All entities sorted by `(depth, entity)`.
    pub fn depth_order(&self) -> &[Entity] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// Computes local and world matrices for every [`Transform`] in a world.
///
/// Stateless: freshness lives in each transform, so the same resolver can be
/// run against any world. As a [`System`] it should be registered before
/// anything that reads world matrices.
#[derive(Debug, Clone, Copy, Default)]
pub struct TransformResolver;

impl TransformResolver {
    /// Run one resolution pass. Returns the number of transforms recomputed.
    pub fn resolve(world: &mut World) -> Result<usize> {
        let graph = SceneGraph::build(world)?;

        let mut worlds: HashMap<Entity, Mat4> = HashMap::with_capacity(graph.len());
        let mut recomputed: HashSet<Entity> = HashSet::new();
        let mut count = 0;

        for &entity in graph.depth_order() {
            let parent = graph.parent_of(entity);
            let parent_world = parent
                .and_then(|p| worlds.get(&p).copied())
                .unwrap_or(Mat4::IDENTITY);
            let parent_changed = parent.is_some_and(|p| recomputed.contains(&p));

            match world.get_mut::<Transform>(entity) {
                Some(transform) => {
                    if transform.is_dirty()
                        || parent_changed
                        || transform.parent_world() != parent_world
                    {
                        if transform.is_dirty() {
                            transform.recompute_local();
                        }
                        transform.compose(parent_world);
                        recomputed.insert(entity);
                        count += 1;
                    }
                    worlds.insert(entity, transform.world_matrix());
                }
                // Nodes without a Transform pass their parent's matrix through.
                None => {
                    worlds.insert(entity, parent_world);
                    if parent_changed {
                        recomputed.insert(entity);
                    }
                }
            }
        }

        log::debug!(
            "resolved transforms: {} node(s), {} recomputed",
            graph.len(),
            count
        );
        Ok(count)
    }
}

impl System for TransformResolver {
    fn run(&mut self, world: &mut World, _dt: f32) -> Result<()> {
        Self::resolve(world).map(drop)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{Quat, Vec3};

    fn translation_of(world: &World, e: Entity) -> Vec3 {
        world.get::<Transform>(e).unwrap().world_translation()
    }

    #[test]
    fn roots_get_local_matrix() {
        let mut world = World::new();
        let root = world.spawn((Transform::from_xyz(10.0, 20.0, 0.0),)).unwrap();
        TransformResolver::resolve(&mut world).unwrap();

        let t = world.get::<Transform>(root).unwrap();
        assert_eq!(t.world_matrix(), t.local_matrix());
        assert!(!t.is_dirty());
    }

    #[test]
    fn deep_chain_composes_in_order() {
        let mut world = World::new();
        let a = world.spawn((Transform::from_xyz(1.0, 0.0, 0.0),)).unwrap();
        let b = world.spawn((Transform::from_xyz(2.0, 0.0, 0.0), Link::to(a))).unwrap();
        let c = world.spawn((Transform::from_xyz(3.0, 0.0, 0.0), Link::to(b))).unwrap();
        TransformResolver::resolve(&mut world).unwrap();
        assert!(translation_of(&world, c).abs_diff_eq(Vec3::new(6.0, 0.0, 0.0), 1e-5));
    }

    #[test]
    fn child_enrolled_before_parent_still_resolves() {
        let mut world = World::new();
        let child = world.enroll();
        let parent = world.spawn((Transform::from_xyz(0.0, 4.0, 0.0),)).unwrap();
        world.add(child, Transform::from_xyz(1.0, 0.0, 0.0)).unwrap();
        world.add(child, Link::to(parent)).unwrap();

        TransformResolver::resolve(&mut world).unwrap();
        assert!(translation_of(&world, child).abs_diff_eq(Vec3::new(1.0, 4.0, 0.0), 1e-5));
    }

    #[test]
    fn parent_moves_child_follows() {
        let mut world = World::new();
        let parent = world.spawn((Transform::default(),)).unwrap();
        let child = world
            .spawn((Transform::from_xyz(5.0, 0.0, 0.0), Link::to(parent)))
            .unwrap();
        TransformResolver::resolve(&mut world).unwrap();

        world
            .get_mut::<Transform>(parent)
            .unwrap()
            .set_translation(Vec3::new(50.0, 0.0, 0.0));
        // Only the parent is dirty; the child must still be recomputed.
        assert!(!world.get::<Transform>(child).unwrap().is_dirty());
        assert_eq!(TransformResolver::resolve(&mut world).unwrap(), 2);
        assert!(translation_of(&world, child).abs_diff_eq(Vec3::new(55.0, 0.0, 0.0), 1e-5));
    }

    #[test]
    fn second_pass_is_a_no_op() {
        let mut world = World::new();
        let a = world.spawn((Transform::from_xyz(1.0, 2.0, 3.0),)).unwrap();
        let b = world
            .spawn((Transform::default().with_rotation(Vec3::new(0.0, 30.0, 0.0)), Link::to(a)))
            .unwrap();
        TransformResolver::resolve(&mut world).unwrap();
        let before = world.get::<Transform>(b).unwrap().world_matrix();

        assert_eq!(TransformResolver::resolve(&mut world).unwrap(), 0);
        assert_eq!(world.get::<Transform>(b).unwrap().world_matrix(), before);
    }

    #[test]
    fn relinking_recomputes_child() {
        let mut world = World::new();
        let left = world.spawn((Transform::from_xyz(-10.0, 0.0, 0.0),)).unwrap();
        let right = world.spawn((Transform::from_xyz(10.0, 0.0, 0.0),)).unwrap();
        let child = world.spawn((Transform::default(), Link::to(left))).unwrap();
        TransformResolver::resolve(&mut world).unwrap();

        world.insert(child, Link::to(right)).unwrap();
        TransformResolver::resolve(&mut world).unwrap();
        assert!(translation_of(&world, child).abs_diff_eq(Vec3::new(10.0, 0.0, 0.0), 1e-5));

        world.remove::<Link>(child).unwrap();
        TransformResolver::resolve(&mut world).unwrap();
        assert!(translation_of(&world, child).abs_diff_eq(Vec3::ZERO, 1e-5));
    }

    #[test]
    fn parent_without_transform_is_identity() {
        let mut world = World::new();
        let group = world.enroll();
        let root = world.spawn((Transform::from_xyz(0.0, 0.0, 7.0),)).unwrap();
        world.add(group, Link::to(root)).unwrap();
        let leaf = world.spawn((Transform::from_xyz(1.0, 0.0, 0.0), Link::to(group))).unwrap();

        TransformResolver::resolve(&mut world).unwrap();
        assert!(translation_of(&world, leaf).abs_diff_eq(Vec3::new(1.0, 0.0, 7.0), 1e-5));
    }

    #[test]
    fn rotation_applies_parent_first() {
        let mut world = World::new();
        let parent = world
            .spawn((Transform::default().with_rotation(Vec3::new(0.0, 90.0, 0.0)),))
            .unwrap();
        let child = world
            .spawn((Transform::from_xyz(1.0, 0.0, 0.0), Link::to(parent)))
            .unwrap();
        TransformResolver::resolve(&mut world).unwrap();

        let expected = Mat4::from_quat(Quat::from_rotation_y(90f32.to_radians()))
            * Mat4::from_translation(Vec3::X);
        let got = world.get::<Transform>(child).unwrap().world_matrix();
        assert!(got.abs_diff_eq(expected, 1e-5));
        assert!(translation_of(&world, child).abs_diff_eq(Vec3::new(0.0, 0.0, -1.0), 1e-5));
    }

    #[test]
    fn dangling_parent_fails_without_writes() {
        let mut world = World::new();
        let parent = world.spawn((Transform::default(),)).unwrap();
        let child = world.spawn((Transform::from_xyz(1.0, 0.0, 0.0), Link::to(parent))).unwrap();
        world.release(parent).unwrap();

        let err = TransformResolver::resolve(&mut world).unwrap_err();
        assert_eq!(err, EcsError::DanglingParent { child, parent });
        assert!(world.get::<Transform>(child).unwrap().is_dirty());
    }

    #[test]
    fn two_cycle_is_detected() {
        let mut world = World::new();
        let x = world.spawn((Transform::default(),)).unwrap();
        let y = world.spawn((Transform::default(),)).unwrap();
        world.add(x, Link::to(y)).unwrap();
        world.add(y, Link::to(x)).unwrap();

        let err = TransformResolver::resolve(&mut world).unwrap_err();
        assert!(matches!(err, EcsError::CyclicHierarchy { .. }));
    }

    #[test]
    fn self_parent_is_a_cycle() {
        let mut world = World::new();
        let x = world.spawn((Transform::default(),)).unwrap();
        world.add(x, Link::to(x)).unwrap();
        assert_eq!(
            SceneGraph::build(&world).unwrap_err(),
            EcsError::CyclicHierarchy { entity: x }
        );
    }

    #[test]
    fn cycle_below_a_valid_chain() {
        let mut world = World::new();
        let _lone = world.enroll();
        let b = world.enroll();
        let c = world.enroll();
        let d = world.enroll();
        world.add(b, Link::to(c)).unwrap();
        world.add(c, Link::to(d)).unwrap();
        world.add(d, Link::to(b)).unwrap();
        assert!(matches!(
            SceneGraph::build(&world),
            Err(EcsError::CyclicHierarchy { .. })
        ));
    }

    #[test]
    fn graph_queries() {
        let mut world = World::new();
        let root = world.enroll();
        let a = world.enroll();
        let b = world.enroll();
        let a1 = world.enroll();
        world.add(b, Link::to(root)).unwrap();
        world.add(a, Link::to(root)).unwrap();
        world.add(a1, Link::to(a)).unwrap();

        let graph = SceneGraph::build(&world).unwrap();
        assert_eq!(graph.parent_of(a1), Some(a));
        assert_eq!(graph.children_of(root), &[a, b]);
        assert_eq!(graph.roots().collect::<Vec<_>>(), vec![root]);
        assert_eq!(graph.depth_of(a1), Some(2));
        assert_eq!(graph.descendants(root), vec![a, a1, b]);
        assert_eq!(graph.depth_order(), &[root, a, b, a1]);
    }
}
