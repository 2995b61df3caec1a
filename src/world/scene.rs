//! Minimal scene entity the physics core talks to.
//!
//! The render layer owns the real meshes and draws them; here a scene object
//! only carries what physics consumes: an identity, a translate×scale
//! transform and, when built from a mesh, an AABB collider.

use crate::utils::math::AffineTransform;
use crate::world::collider::{get_collision, ColliderObject, Contact};
use crate::world::physics::PhysResult;
use glam::Vec3;
use std::sync::{Arc, PoisonError, RwLock};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneTransform {
    pub translation: Vec3,
    pub scale: Vec3,
}

impl Default for SceneTransform {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

impl SceneTransform {
    pub fn affine(&self) -> AffineTransform {
        AffineTransform::from_translation_scale(self.translation, self.scale)
    }
}

#[derive(Debug)]
pub struct SceneObject {
    id: Uuid,
    name: String,
    transform: RwLock<SceneTransform>,
    collider: Option<RwLock<ColliderObject>>,
}

impl SceneObject {
    /// Scene object without geometry; collision queries on it fail
    pub fn new(name: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            id: Uuid::new_v4(),
            name: name.into(),
            transform: RwLock::new(SceneTransform::default()),
            collider: None,
        })
    }

    /// Scene object with a collider fitted to a flat `[x, y, z, x, y, z, ..]` vertex cloud
    pub fn with_mesh(name: impl Into<String>, vertices: &[f32]) -> PhysResult<Arc<Self>> {
        let collider = ColliderObject::from_vertices(vertices)?;
        Ok(Arc::new(Self {
            id: Uuid::new_v4(),
            name: name.into(),
            transform: RwLock::new(SceneTransform::default()),
            collider: Some(RwLock::new(collider)),
        }))
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn transform(&self) -> SceneTransform {
        *self.transform.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_translation(&self, translation: Vec3) {
        self.transform
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .translation = translation;
    }

    pub fn set_scale(&self, scale: Vec3) {
        self.transform
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .scale = scale;
    }

    pub fn has_collider(&self) -> bool {
        self.collider.is_some()
    }

    /// Refit the collider to the current transform. Call after moving the
    /// object and before any collision query involving it.
    pub fn update_collider(&self) {
        let transform = self.transform().affine();
        if let Some(collider) = &self.collider {
            collider
                .write()
                .unwrap_or_else(PoisonError::into_inner)
                .update(&transform);
        }
    }

    /// Copy of the collider as last updated
    pub fn collider(&self) -> Option<ColliderObject> {
        self.collider
            .as_ref()
            .map(|c| c.read().unwrap_or_else(PoisonError::into_inner).clone())
    }

    /// Test this object, shifted by `moving` for the imminent phase, against `other`
    pub fn get_collision(&self, other: &SceneObject, moving: Vec3) -> PhysResult<Contact> {
        let this = self.collider();
        let that = other.collider();
        get_collision(this.as_ref(), that.as_ref(), moving)
    }
}
