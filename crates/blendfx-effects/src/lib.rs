//! Timed effects that animate a blend layer and restore it when they finish.

mod effect;
mod hsv_cycle;
mod player;
mod target;
mod timer;

pub use blendfx_config::HueWrap;
pub use effect::{BlendLayerEffect, EffectError, EffectState};
pub use hsv_cycle::HsvCycleEffect;
pub use player::LayerEffects;
pub use target::{BoundLayer, LayerTarget};
pub use timer::EffectTimer;
