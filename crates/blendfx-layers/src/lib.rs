//! Blend layers: named, indexed shader parameter sets pushed onto the
//! materials of scene geometry through a host capability trait.

mod binder;
mod host;
mod param;
mod scene;

pub use binder::{
    BlendLayerBinder, DEBUG_VALUES_MODE, LayerError, LayerMaps, LayerSlot, layer_prefix,
};
pub use host::{HostError, MaterialHandle, MaterialHost, NodeId, TextureHandle, WrapMode};
pub use param::{ParamType, ParamValue};
pub use scene::{MaterialDefinition, SceneGraph};
