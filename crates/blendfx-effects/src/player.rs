//! Per-layer list of running effects.

use crate::effect::{BlendLayerEffect, EffectError};
use crate::target::LayerTarget;

/// The effects currently running on one blend layer.
///
/// Only the newest effect writes its snapshot back when it finishes. An older
/// effect that ends first hands its snapshot to the next newer one, so the
/// layer always unwinds to the state it had before the first effect started.
#[derive(Default)]
pub struct LayerEffects {
    active: Vec<Box<dyn BlendLayerEffect>>,
}

impl LayerEffects {
    /// An empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach `effect` to `target` and start running it.
    ///
    /// # Errors
    ///
    /// Fails if the effect was already attached elsewhere or the layer rejects
    /// the initial write; the effect is dropped in that case.
    pub fn play(
        &mut self,
        mut effect: Box<dyn BlendLayerEffect>,
        target: &mut dyn LayerTarget,
    ) -> Result<(), EffectError> {
        effect.set_affected_layer(target)?;
        log::info!(
            "Started effect '{}' on layer '{}'",
            effect.name(),
            target.layer_name()
        );
        self.active.push(effect);
        Ok(())
    }

    /// Update every effect by `dt`, then finish and remove the expired ones.
    ///
    /// Returns the names of the effects that finished this tick. A failing
    /// effect does not stop the others from updating or finishing; the first
    /// error is returned after the whole list was processed, and an effect
    /// whose finish failed stays in the list to be retried.
    pub fn update(
        &mut self,
        target: &mut dyn LayerTarget,
        dt: f32,
    ) -> Result<Vec<String>, EffectError> {
        let mut first_error = None;
        for effect in &mut self.active {
            if let Err(e) = effect.update(target, dt) {
                log::warn!("Effect '{}' failed to update: {e}", effect.name());
                first_error.get_or_insert(e);
            }
        }

        let mut finished = Vec::new();
        for index in (0..self.active.len()).rev() {
            if !self.active[index].is_expired() {
                continue;
            }
            if let Err(e) = self.finish_at(index, target) {
                log::warn!("Effect '{}' failed to finish: {e}", self.active[index].name());
                first_error.get_or_insert(e);
                continue;
            }
            let effect = self.active.remove(index);
            log::info!(
                "Effect '{}' finished after {:.2}s",
                effect.name(),
                effect.timer().elapsed()
            );
            finished.push(effect.name().to_string());
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(finished),
        }
    }

    /// Finish and remove the most recently started effect called `name`.
    ///
    /// Returns `false` if no such effect is running.
    pub fn stop(&mut self, name: &str, target: &mut dyn LayerTarget) -> Result<bool, EffectError> {
        let Some(index) = self.active.iter().rposition(|e| e.name() == name) else {
            return Ok(false);
        };
        self.finish_at(index, target)?;
        self.active.remove(index);
        log::info!("Stopped effect '{name}'");
        Ok(true)
    }

    /// Finish and remove every running effect, newest first.
    pub fn finish_all(&mut self, target: &mut dyn LayerTarget) -> Result<(), EffectError> {
        while let Some(effect) = self.active.last_mut() {
            effect.on_finish(target)?;
            self.active.pop();
        }
        Ok(())
    }

    /// Finish the effect at `index` without removing it. The newest effect
    /// restores the layer; any other passes its snapshot one step up.
    fn finish_at(&mut self, index: usize, target: &mut dyn LayerTarget) -> Result<(), EffectError> {
        if index + 1 == self.active.len() {
            return self.active[index].on_finish(target);
        }
        if let Some(snapshot) = self.active[index].snapshot() {
            self.active[index + 1].rebase_snapshot(snapshot);
        }
        self.active[index].retire();
        Ok(())
    }

    /// Names of running effects in start order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.active.iter().map(|e| e.name())
    }

    /// Number of running effects.
    pub fn len(&self) -> usize {
        self.active.len()
    }

    /// Returns `true` if nothing is running.
    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hsv_cycle::HsvCycleEffect;
    use crate::target::BoundLayer;
    use blendfx_config::LayerConfig;
    use blendfx_layers::{BlendLayerBinder, LayerError, MaterialDefinition, ParamValue, SceneGraph};
    use glam::Vec4;

    struct FakeLayer {
        hsv: Vec4,
    }

    impl LayerTarget for FakeLayer {
        fn layer_name(&self) -> &str {
            "fake"
        }

        fn hsv_scalar(&self) -> Vec4 {
            self.hsv
        }

        fn set_hsv_scalar(&mut self, hsv: Vec4) -> Result<(), LayerError> {
            self.hsv = hsv;
            Ok(())
        }
    }

    /// Reads succeed, writes are rejected.
    struct BrokenLayer {
        hsv: Vec4,
    }

    impl LayerTarget for BrokenLayer {
        fn layer_name(&self) -> &str {
            "broken"
        }

        fn hsv_scalar(&self) -> Vec4 {
            self.hsv
        }

        fn set_hsv_scalar(&mut self, _hsv: Vec4) -> Result<(), LayerError> {
            Err(LayerError::Unbound("broken".to_string()))
        }
    }

    fn timed(name: &str, hue: f32, duration: f32) -> Box<dyn BlendLayerEffect> {
        let mut effect = HsvCycleEffect::new(name).with_duration(Some(duration));
        effect.set_hue_change(hue);
        effect.set_hue_cycle_speed(0.0);
        Box::new(effect)
    }

    #[test]
    fn test_expired_effect_restores_and_is_removed() {
        let original = Vec4::new(0.2, 0.5, 0.5, 0.0);
        let mut layer = FakeLayer { hsv: original };
        let mut effects = LayerEffects::new();

        effects.play(timed("pulse", 0.7, 1.0), &mut layer).unwrap();
        assert_eq!(layer.hsv.x, 0.7);

        assert!(effects.update(&mut layer, 0.5).unwrap().is_empty());
        assert_eq!(effects.len(), 1);

        let finished = effects.update(&mut layer, 0.5).unwrap();
        assert_eq!(finished, vec!["pulse".to_string()]);
        assert!(effects.is_empty());
        assert_eq!(layer.hsv, original);
    }

    #[test]
    fn test_simultaneous_expiry_unwinds_in_reverse() {
        let original = Vec4::new(0.2, 0.5, 0.5, 0.0);
        let mut layer = FakeLayer { hsv: original };
        let mut effects = LayerEffects::new();

        effects.play(timed("first", 0.3, 1.0), &mut layer).unwrap();
        effects.play(timed("second", 0.6, 1.0), &mut layer).unwrap();

        let finished = effects.update(&mut layer, 1.0).unwrap();
        assert_eq!(finished, vec!["second".to_string(), "first".to_string()]);
        assert_eq!(layer.hsv, original);
    }

    #[test]
    fn test_staggered_expiry_restores_original() {
        let original = Vec4::new(0.2, 0.5, 0.5, 0.0);
        let mut layer = FakeLayer { hsv: original };
        let mut effects = LayerEffects::new();

        effects.play(timed("first", 0.3, 1.0), &mut layer).unwrap();
        effects.play(timed("second", 0.6, 2.0), &mut layer).unwrap();

        let finished = effects.update(&mut layer, 1.0).unwrap();
        assert_eq!(finished, vec!["first".to_string()]);
        // The newer effect keeps control of the layer.
        assert_eq!(layer.hsv.x, 0.6);

        let finished = effects.update(&mut layer, 1.0).unwrap();
        assert_eq!(finished, vec!["second".to_string()]);
        assert_eq!(layer.hsv, original);
    }

    #[test]
    fn test_stopping_older_effect_hands_over_snapshot() {
        let original = Vec4::new(0.2, 0.5, 0.5, 0.0);
        let mut layer = FakeLayer { hsv: original };
        let mut effects = LayerEffects::new();

        effects.play(timed("first", 0.3, 5.0), &mut layer).unwrap();
        effects.play(timed("second", 0.6, 5.0), &mut layer).unwrap();

        assert!(effects.stop("first", &mut layer).unwrap());
        assert_eq!(layer.hsv.x, 0.6);
        assert!(effects.stop("second", &mut layer).unwrap());
        assert_eq!(layer.hsv, original);
    }

    #[test]
    fn test_failed_finish_is_kept_for_retry() {
        let original = Vec4::new(0.2, 0.5, 0.5, 0.0);
        let mut layer = FakeLayer { hsv: original };
        let mut effects = LayerEffects::new();
        effects.play(timed("pulse", 0.7, 1.0), &mut layer).unwrap();

        let mut broken = BrokenLayer { hsv: layer.hsv };
        let result = effects.update(&mut broken, 1.0);
        assert!(matches!(result, Err(EffectError::Layer(_))));
        assert_eq!(effects.len(), 1);

        let finished = effects.update(&mut layer, 0.0).unwrap();
        assert_eq!(finished, vec!["pulse".to_string()]);
        assert_eq!(layer.hsv, original);
    }

    #[test]
    fn test_stop_by_name() {
        let original = Vec4::new(0.1, 0.1, 0.1, 0.0);
        let mut layer = FakeLayer { hsv: original };
        let mut effects = LayerEffects::new();

        effects
            .play(Box::new(HsvCycleEffect::new("endless")), &mut layer)
            .unwrap();
        effects.update(&mut layer, 100.0).unwrap();
        assert_eq!(effects.names().collect::<Vec<_>>(), vec!["endless"]);

        assert!(!effects.stop("missing", &mut layer).unwrap());
        assert!(effects.stop("endless", &mut layer).unwrap());
        assert!(effects.is_empty());
        assert_eq!(layer.hsv, original);
    }

    #[test]
    fn test_replaying_attached_effect_fails() {
        let mut layer = FakeLayer { hsv: Vec4::ZERO };
        let mut effect = HsvCycleEffect::new("once");
        effect.set_affected_layer(&mut layer).unwrap();

        let mut effects = LayerEffects::new();
        let result = effects.play(Box::new(effect), &mut layer);
        assert!(matches!(result, Err(EffectError::AlreadyAttached { .. })));
        assert!(effects.is_empty());
    }

    #[test]
    fn test_finish_all_restores_layer() {
        let original = Vec4::new(0.4, 0.4, 0.4, 0.0);
        let mut layer = FakeLayer { hsv: original };
        let mut effects = LayerEffects::new();
        effects.play(timed("a", 0.1, 5.0), &mut layer).unwrap();
        effects.play(timed("b", 0.9, 5.0), &mut layer).unwrap();

        effects.finish_all(&mut layer).unwrap();
        assert!(effects.is_empty());
        assert_eq!(layer.hsv, original);
    }

    #[test]
    fn test_cycle_reaches_scene_materials() {
        let mut scene = SceneGraph::new();
        let mat = scene.create_material(&MaterialDefinition::new("PBR").with_blend_layers(&[0]));
        scene.add_geometry(scene.root(), "rock", mat).unwrap();
        let root = scene.root();
        let mut binder =
            BlendLayerBinder::new(&mut scene, "moss", Some(0), root, &LayerConfig::default())
                .unwrap();

        let mut effects = LayerEffects::new();
        let mut effect = HsvCycleEffect::new("cycle").with_duration(Some(1.0));
        effect.set_hue_change(0.1);

        {
            let mut target = BoundLayer::new(&mut binder, &mut scene);
            effects.play(Box::new(effect), &mut target).unwrap();
            effects.update(&mut target, 0.4).unwrap();
        }
        match scene.param(mat, "BlendLayer_0_HsvScalar") {
            Some(ParamValue::Vector4(hsv)) => assert!((hsv.x - 0.3).abs() < 1e-5),
            other => panic!("unexpected hsv parameter {other:?}"),
        }

        {
            let mut target = BoundLayer::new(&mut binder, &mut scene);
            let finished = effects.update(&mut target, 0.6).unwrap();
            assert_eq!(finished, vec!["cycle".to_string()]);
        }
        assert_eq!(
            scene.param(mat, "BlendLayer_0_HsvScalar"),
            Some(ParamValue::Vector4(Vec4::ZERO))
        );
    }
}
