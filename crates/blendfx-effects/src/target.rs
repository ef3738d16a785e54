//! What an effect may touch on a blend layer.

use blendfx_layers::{BlendLayerBinder, LayerError, MaterialHost};
use glam::Vec4;

/// The layer state visible to effects.
pub trait LayerTarget {
    /// Name of the layer.
    fn layer_name(&self) -> &str;

    /// Current HSV scalar (x = hue, y = saturation, z = brightness).
    fn hsv_scalar(&self) -> Vec4;

    /// Replace the HSV scalar.
    fn set_hsv_scalar(&mut self, hsv: Vec4) -> Result<(), LayerError>;
}

/// A binder paired with the host its writes go to.
pub struct BoundLayer<'a, H: MaterialHost> {
    /// The layer.
    pub binder: &'a mut BlendLayerBinder,
    /// The host owning the layer's materials.
    pub host: &'a mut H,
}

impl<'a, H: MaterialHost> BoundLayer<'a, H> {
    /// Pair `binder` with `host`.
    pub fn new(binder: &'a mut BlendLayerBinder, host: &'a mut H) -> Self {
        Self { binder, host }
    }
}

impl<H: MaterialHost> LayerTarget for BoundLayer<'_, H> {
    fn layer_name(&self) -> &str {
        self.binder.name()
    }

    fn hsv_scalar(&self) -> Vec4 {
        self.binder.hsv_scalar()
    }

    fn set_hsv_scalar(&mut self, hsv: Vec4) -> Result<(), LayerError> {
        self.binder.set_hsv_scalar(&mut *self.host, hsv)
    }
}
