//! Error types for every fallible ECS operation.
//!
//! Structural errors are reported synchronously by the operation that
//! detected them, and the operation leaves the world untouched.
//!
//! ```ignore
//! use vargr::error::{EcsError, Result};
//!
//! fn attach(scene: &mut Scene, e: Entity) -> Result<()> {
//!     scene.add(e, Transform::default())?;
//!     Ok(())
//! }
//! ```

use thiserror::Error;

use crate::ecs::Entity;

/// Convenience alias used across the crate.
pub type Result<T> = std::result::Result<T, EcsError>;

/// Everything that can go wrong inside the runtime.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EcsError {
    // ========================================================================
    // Entity & Component Errors
    // ========================================================================
    /// The handle was released or never allocated by this world.
    #[error("unknown entity {0}")]
    UnknownEntity(Entity),

    /// The entity already holds a component of this type.
    #[error("entity {entity} already has a `{component}` component")]
    DuplicateComponent {
        entity: Entity,
        component: &'static str,
    },

    /// A component that was required to be present is absent.
    #[error("entity {entity} has no `{component}` component")]
    MissingComponent {
        entity: Entity,
        component: &'static str,
    },

    // ========================================================================
    // Hierarchy Errors
    // ========================================================================
    /// Following parent links from `entity` revisits a node.
    #[error("parent chain of entity {entity} forms a cycle")]
    CyclicHierarchy { entity: Entity },

    /// `child` links to a parent that is not live.
    #[error("entity {child} links to parent {parent}, which is not live")]
    DanglingParent { child: Entity, parent: Entity },

    // ========================================================================
    // Scheduling Errors
    // ========================================================================
    /// A system's declared component tuple cannot be used as a signature.
    #[error("system `{system}` has an invalid signature: {reason}")]
    SignatureMismatch { system: String, reason: String },

    /// A failure raised by user code inside a system callback.
    #[error("system failure: {0}")]
    SystemFailure(String),

    // ========================================================================
    // Scene Management Errors
    // ========================================================================
    /// No scene is registered under this name.
    #[error("no scene named '{0}'")]
    UnknownScene(String),

    /// A scene with this name is already registered.
    #[error("a scene named '{0}' is already registered")]
    DuplicateScene(String),
}

impl EcsError {
    /// Build a [`EcsError::SystemFailure`] from anything printable.
    pub fn failure(message: impl Into<String>) -> Self {
        Self::SystemFailure(message.into())
    }

    /// `true` for errors that describe a broken parent/child structure.
    pub fn is_hierarchy_error(&self) -> bool {
        matches!(
            self,
            Self::CyclicHierarchy { .. } | Self::DanglingParent { .. }
        )
    }
}
