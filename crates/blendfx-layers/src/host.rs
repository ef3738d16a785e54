//! The host engine seen through a capability trait.
//!
//! The binder never owns scene nodes, materials, or textures. It holds the
//! copyable ids defined here and routes every read and write through
//! [`MaterialHost`].

use thiserror::Error;

use crate::param::{ParamType, ParamValue};

// ---------------------------------------------------------------------------
// Handles
// ---------------------------------------------------------------------------

/// Identifies a node in the host scene graph.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

/// Identifies a material instance owned by the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MaterialHandle(pub u32);

/// Identifies a texture owned by the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureHandle(pub u32);

/// Texture addressing outside the unit UV square.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum WrapMode {
    /// Clamp to the edge texel.
    #[default]
    EdgeClamp,
    /// Tile the texture.
    Repeat,
    /// Tile, mirroring every other repetition.
    MirroredRepeat,
}

// ---------------------------------------------------------------------------
// HostError
// ---------------------------------------------------------------------------

/// Errors reported by a [`MaterialHost`].
#[derive(Debug, Error, PartialEq)]
pub enum HostError {
    /// The node id is not part of the scene.
    #[error("unknown node {0:?}")]
    UnknownNode(NodeId),

    /// Geometry leaves cannot have children.
    #[error("node {0:?} is a geometry leaf")]
    LeafNode(NodeId),

    /// The material handle is not known to the host.
    #[error("unknown material {0:?}")]
    UnknownMaterial(MaterialHandle),

    /// The texture handle is not known to the host.
    #[error("unknown texture {0:?}")]
    UnknownTexture(TextureHandle),

    /// The material definition does not declare the parameter.
    #[error("material {material:?} does not declare parameter '{name}'")]
    UndeclaredParam {
        /// Material that rejected the write.
        material: MaterialHandle,
        /// Parameter name.
        name: String,
    },

    /// The value type differs from the declared parameter type.
    #[error("parameter '{name}' is declared {expected:?}, got {actual:?}")]
    TypeMismatch {
        /// Parameter name.
        name: String,
        /// Type declared by the material definition.
        expected: ParamType,
        /// Type of the rejected value.
        actual: ParamType,
    },
}

// ---------------------------------------------------------------------------
// MaterialHost
// ---------------------------------------------------------------------------

/// Material and scene access required by blend layers.
///
/// All calls happen on the host's update thread.
pub trait MaterialHost {
    /// Materials of every geometry under `root`, breadth-first.
    ///
    /// A material shared by several geometries appears once per geometry.
    fn geometry_materials(&self, root: NodeId) -> Result<Vec<MaterialHandle>, HostError>;

    /// Returns `true` if the material's definition declares `name`.
    fn declares_param(&self, material: MaterialHandle, name: &str) -> bool;

    /// Names of the parameters currently set on the material.
    fn param_names(&self, material: MaterialHandle) -> Result<Vec<String>, HostError>;

    /// Write a parameter on the material.
    fn set_param(
        &mut self,
        material: MaterialHandle,
        name: &str,
        value: &ParamValue,
    ) -> Result<(), HostError>;

    /// Remove a parameter from the material. Clearing an unset parameter is a no-op.
    fn clear_param(&mut self, material: MaterialHandle, name: &str) -> Result<(), HostError>;

    /// Change how a texture is addressed outside the unit UV square.
    fn set_wrap_mode(&mut self, texture: TextureHandle, mode: WrapMode) -> Result<(), HostError>;
}
