//! The [`BlendLayerEffect`] trait and its lifecycle.

use blendfx_layers::LayerError;
use glam::Vec4;
use thiserror::Error;

use crate::target::LayerTarget;
use crate::timer::EffectTimer;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors returned by effect operations.
#[derive(Debug, Error, PartialEq)]
pub enum EffectError {
    /// The effect already has a layer; attaching again would overwrite its
    /// restoration snapshot with mutated state.
    #[error("effect '{effect}' is already attached to layer '{layer}'")]
    AlreadyAttached {
        /// Effect name.
        effect: String,
        /// Layer the effect is attached to.
        layer: String,
    },

    /// Writing to the layer failed.
    #[error("layer error: {0}")]
    Layer(#[from] LayerError),
}

// ---------------------------------------------------------------------------
// EffectState
// ---------------------------------------------------------------------------

/// Lifecycle of an effect: `Unattached -> Active -> Finished`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EffectState {
    /// Constructed, no layer assigned.
    #[default]
    Unattached,
    /// Attached and animating its layer.
    Active,
    /// Layer restored; further updates do nothing.
    Finished,
}

// ---------------------------------------------------------------------------
// BlendLayerEffect
// ---------------------------------------------------------------------------

/// A timed modification of one blend layer.
///
/// The layer is passed to every call instead of being stored, so the effect
/// never outlives or aliases the binder it animates.
pub trait BlendLayerEffect {
    /// Effect name, used to stop it by name.
    fn name(&self) -> &str;

    /// Duration and elapsed time.
    fn timer(&self) -> &EffectTimer;

    /// Current lifecycle state.
    fn state(&self) -> EffectState;

    /// Name of the layer this effect was attached to.
    fn affected_layer(&self) -> Option<&str>;

    /// Attach to `target`. Must be called exactly once, before the first update.
    ///
    /// # Errors
    ///
    /// Returns [`EffectError::AlreadyAttached`] if the effect left `Unattached`.
    fn set_affected_layer(&mut self, target: &mut dyn LayerTarget) -> Result<(), EffectError>;

    /// Advance by `dt` seconds. Called once per tick.
    fn update(&mut self, target: &mut dyn LayerTarget, dt: f32) -> Result<(), EffectError>;

    /// Restore the layer. Calling it again after a successful finish does
    /// nothing; after a failed write the effect stays active and can retry.
    fn on_finish(&mut self, target: &mut dyn LayerTarget) -> Result<(), EffectError>;

    /// Layer state captured on attach, restored by [`on_finish`](Self::on_finish).
    fn snapshot(&self) -> Option<Vec4>;

    /// Replace the state restored on finish. Used when an older effect on the
    /// same layer ends first and hands its snapshot over.
    fn rebase_snapshot(&mut self, snapshot: Vec4);

    /// Finish without writing to the layer.
    fn retire(&mut self);

    /// Returns `true` once the timer has run out.
    fn is_expired(&self) -> bool {
        self.timer().is_expired()
    }
}
