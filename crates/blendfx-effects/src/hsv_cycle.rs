//! HSV cycling: overrides a layer's hue/saturation/brightness while active and
//! scrolls the hue over time.

use blendfx_config::{EffectConfig, HueWrap};
use glam::Vec4;

use crate::effect::{BlendLayerEffect, EffectError, EffectState};
use crate::target::LayerTarget;
use crate::timer::EffectTimer;

/// Name and duration used by [`HsvCycleEffect::default`].
const DEFAULT_NAME: &str = "HSV_Effect";
const DEFAULT_DURATION: f32 = 8.0;

/// Cycles the hue of one blend layer, restoring the original HSV on finish.
#[derive(Clone, Debug)]
pub struct HsvCycleEffect {
    name: String,
    timer: EffectTimer,
    state: EffectState,
    affected_layer: Option<String>,
    /// HSV before the effect attached. Taken once, used only on finish.
    original_hsv: Option<Vec4>,

    hue_change: f32,
    saturation_change: f32,
    brightness_change: f32,

    hue_cycle_speed: f32,
    saturation_cycle_speed: f32,
    brightness_cycle_speed: f32,

    hue_wrap: HueWrap,
}

impl Default for HsvCycleEffect {
    fn default() -> Self {
        Self::new(DEFAULT_NAME).with_duration(Some(DEFAULT_DURATION))
    }
}

impl HsvCycleEffect {
    /// An effect with no duration; it runs until stopped.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            timer: EffectTimer::unlimited(),
            state: EffectState::Unattached,
            affected_layer: None,
            original_hsv: None,
            hue_change: 0.0,
            saturation_change: 0.35,
            brightness_change: 0.0,
            hue_cycle_speed: 0.5,
            saturation_cycle_speed: 0.0,
            brightness_cycle_speed: 0.0,
            hue_wrap: HueWrap::default(),
        }
    }

    /// An effect configured from the `effects` config section.
    pub fn from_config(name: impl Into<String>, config: &EffectConfig) -> Self {
        let mut effect = Self::new(name).with_duration(Some(config.hsv_duration_secs));
        effect.hue_cycle_speed = config.hue_cycle_speed;
        effect.saturation_change = config.saturation_change;
        effect.hue_wrap = config.hue_wrap;
        effect
    }

    /// Replace the duration. `None` never expires.
    pub fn with_duration(mut self, duration: Option<f32>) -> Self {
        self.timer.set_duration(duration);
        self
    }

    /// Replace the hue boundary policy.
    pub fn with_hue_wrap(mut self, hue_wrap: HueWrap) -> Self {
        self.hue_wrap = hue_wrap;
        self
    }

    /// Hue written to the layer on attach.
    pub fn hue_change(&self) -> f32 {
        self.hue_change
    }

    /// Set the hue written on attach.
    pub fn set_hue_change(&mut self, hue: f32) {
        self.hue_change = hue;
    }

    /// Saturation written to the layer on attach.
    pub fn saturation_change(&self) -> f32 {
        self.saturation_change
    }

    /// Set the saturation written on attach.
    pub fn set_saturation_change(&mut self, saturation: f32) {
        self.saturation_change = saturation;
    }

    /// Brightness written to the layer on attach.
    pub fn brightness_change(&self) -> f32 {
        self.brightness_change
    }

    /// Set the brightness written on attach.
    pub fn set_brightness_change(&mut self, brightness: f32) {
        self.brightness_change = brightness;
    }

    /// Hue advance per second.
    pub fn hue_cycle_speed(&self) -> f32 {
        self.hue_cycle_speed
    }

    /// Set the hue advance per second. Zero freezes the hue.
    pub fn set_hue_cycle_speed(&mut self, speed: f32) {
        self.hue_cycle_speed = speed;
    }

    /// Saturation change per second.
    pub fn saturation_cycle_speed(&self) -> f32 {
        self.saturation_cycle_speed
    }

    /// Set the saturation change per second.
    pub fn set_saturation_cycle_speed(&mut self, speed: f32) {
        self.saturation_cycle_speed = speed;
    }

    /// Brightness change per second.
    pub fn brightness_cycle_speed(&self) -> f32 {
        self.brightness_cycle_speed
    }

    /// Set the brightness change per second.
    pub fn set_brightness_cycle_speed(&mut self, speed: f32) {
        self.brightness_cycle_speed = speed;
    }

    /// Hue boundary policy.
    pub fn hue_wrap(&self) -> HueWrap {
        self.hue_wrap
    }
}

/// Bring an advanced hue back into range.
fn wrap_hue(hue: f32, policy: HueWrap) -> f32 {
    match policy {
        HueWrap::Wrap => hue.rem_euclid(1.0),
        HueWrap::Reflect => {
            if hue > 1.0 {
                1.0 - hue
            } else if hue < 0.0 {
                hue + 1.0
            } else {
                hue
            }
        }
    }
}

impl BlendLayerEffect for HsvCycleEffect {
    fn name(&self) -> &str {
        &self.name
    }

    fn timer(&self) -> &EffectTimer {
        &self.timer
    }

    fn state(&self) -> EffectState {
        self.state
    }

    fn affected_layer(&self) -> Option<&str> {
        self.affected_layer.as_deref()
    }

    fn set_affected_layer(&mut self, target: &mut dyn LayerTarget) -> Result<(), EffectError> {
        if let Some(layer) = &self.affected_layer {
            return Err(EffectError::AlreadyAttached {
                effect: self.name.clone(),
                layer: layer.clone(),
            });
        }

        let original = target.hsv_scalar();
        target.set_hsv_scalar(Vec4::new(
            self.hue_change,
            self.saturation_change,
            self.brightness_change,
            original.w,
        ))?;

        self.original_hsv = Some(original);
        self.affected_layer = Some(target.layer_name().to_string());
        self.state = EffectState::Active;
        Ok(())
    }

    fn update(&mut self, target: &mut dyn LayerTarget, dt: f32) -> Result<(), EffectError> {
        self.timer.tick(dt);
        if self.state != EffectState::Active {
            return Ok(());
        }

        let mut hsv = target.hsv_scalar();
        let before = hsv;
        if self.hue_cycle_speed != 0.0 {
            hsv.x = wrap_hue(hsv.x + self.hue_cycle_speed * dt, self.hue_wrap);
        }
        if self.saturation_cycle_speed != 0.0 {
            hsv.y = (hsv.y + self.saturation_cycle_speed * dt).clamp(0.0, 1.0);
        }
        if self.brightness_cycle_speed != 0.0 {
            hsv.z = (hsv.z + self.brightness_cycle_speed * dt).clamp(0.0, 1.0);
        }

        if hsv != before {
            target.set_hsv_scalar(hsv)?;
        }
        Ok(())
    }

    fn on_finish(&mut self, target: &mut dyn LayerTarget) -> Result<(), EffectError> {
        if self.state != EffectState::Active {
            return Ok(());
        }
        if let Some(original) = self.original_hsv {
            target.set_hsv_scalar(original)?;
        }
        self.state = EffectState::Finished;
        Ok(())
    }

    fn snapshot(&self) -> Option<Vec4> {
        self.original_hsv
    }

    fn rebase_snapshot(&mut self, snapshot: Vec4) {
        self.original_hsv = Some(snapshot);
    }

    fn retire(&mut self) {
        if self.state == EffectState::Active {
            self.state = EffectState::Finished;
        }
    }
}
