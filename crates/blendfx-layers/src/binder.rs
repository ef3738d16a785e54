//! Blend layer binding: discovers materials that opt in to a numbered blend
//! layer and fans parameter writes out to all of them.
//!
//! A material opts in to layer `n` by declaring `BlendLayer_n_BlendVec` in its
//! definition. Every other layer parameter shares the same prefix, so moving a
//! binder to another index is a prefix-scan clear followed by a re-push.

use blendfx_config::LayerConfig;
use glam::Vec4;
use thiserror::Error;

use crate::host::{HostError, MaterialHandle, MaterialHost, NodeId, TextureHandle, WrapMode};
use crate::param::{ParamType, ParamValue};

/// Parameter name of the material-wide debug output switch (expects -1..=5).
pub const DEBUG_VALUES_MODE: &str = "DebugValuesMode";

/// Parameter-name prefix for blend layer `index`.
pub fn layer_prefix(index: u32) -> String {
    format!("BlendLayer_{index}")
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors returned by [`BlendLayerBinder`] operations.
#[derive(Debug, Error, PartialEq)]
pub enum LayerError {
    /// The host rejected a read or write.
    #[error("host error: {0}")]
    Host(#[from] HostError),

    /// A layer-prefixed parameter was written while no layer index is bound.
    #[error("blend layer '{0}' is not bound to a layer index")]
    Unbound(String),
}

// ---------------------------------------------------------------------------
// LayerSlot
// ---------------------------------------------------------------------------

/// The parameters every blend layer exposes, named `<prefix><suffix>`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayerSlot {
    /// x = blend weight, y/z/w reserved.
    BlendVec,
    /// x = hue, y = saturation, z = brightness.
    HsvScalar,
    /// Albedo texture.
    BaseColorMap,
    /// Tangent-space normal texture.
    NormalMap,
    /// Packed metallic / roughness / ambient occlusion texture.
    MetallicRoughnessAoMap,
    /// Emissive texture.
    EmissiveMap,
    /// Blend by the base color alpha channel.
    BlendAlpha,
}

impl LayerSlot {
    /// Every slot, in declaration order.
    pub const ALL: [LayerSlot; 7] = [
        LayerSlot::BlendVec,
        LayerSlot::HsvScalar,
        LayerSlot::BaseColorMap,
        LayerSlot::NormalMap,
        LayerSlot::MetallicRoughnessAoMap,
        LayerSlot::EmissiveMap,
        LayerSlot::BlendAlpha,
    ];

    /// Suffix appended to the layer prefix.
    pub fn suffix(self) -> &'static str {
        match self {
            LayerSlot::BlendVec => "_BlendVec",
            LayerSlot::HsvScalar => "_HsvScalar",
            LayerSlot::BaseColorMap => "_BaseColorMap",
            LayerSlot::NormalMap => "_NormalMap",
            LayerSlot::MetallicRoughnessAoMap => "_MetallicRoughnessAoMap",
            LayerSlot::EmissiveMap => "_EmissiveMap",
            LayerSlot::BlendAlpha => "_BlendAlpha",
        }
    }

    /// Type a material definition must declare for this slot.
    pub fn param_type(self) -> ParamType {
        match self {
            LayerSlot::BlendVec | LayerSlot::HsvScalar => ParamType::Vector4,
            LayerSlot::BlendAlpha => ParamType::Bool,
            LayerSlot::BaseColorMap
            | LayerSlot::NormalMap
            | LayerSlot::MetallicRoughnessAoMap
            | LayerSlot::EmissiveMap => ParamType::Texture2D,
        }
    }

    /// Full parameter name under `prefix`.
    pub fn param_name(self, prefix: &str) -> String {
        format!("{prefix}{}", self.suffix())
    }
}

// ---------------------------------------------------------------------------
// LayerMaps
// ---------------------------------------------------------------------------

/// Texture references held by a layer so wrap modes can be re-applied.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LayerMaps {
    /// Base color texture.
    pub base_color: Option<TextureHandle>,
    /// Normal texture.
    pub normal: Option<TextureHandle>,
    /// Metallic / roughness / AO texture.
    pub metallic_roughness_ao: Option<TextureHandle>,
    /// Emissive texture.
    pub emissive: Option<TextureHandle>,
}

impl LayerMaps {
    /// Non-empty slots.
    pub fn iter(&self) -> impl Iterator<Item = TextureHandle> {
        [
            self.base_color,
            self.normal,
            self.metallic_roughness_ao,
            self.emissive,
        ]
        .into_iter()
        .flatten()
    }

    fn slot_mut(&mut self, slot: LayerSlot) -> Option<&mut Option<TextureHandle>> {
        match slot {
            LayerSlot::BaseColorMap => Some(&mut self.base_color),
            LayerSlot::NormalMap => Some(&mut self.normal),
            LayerSlot::MetallicRoughnessAoMap => Some(&mut self.metallic_roughness_ao),
            LayerSlot::EmissiveMap => Some(&mut self.emissive),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// BlendLayerBinder
// ---------------------------------------------------------------------------

/// A named blend layer bound to the materials under one scene node.
///
/// The binder holds material and texture handles only; the host is passed to
/// every call that touches the scene. Dropping a binder leaves its parameters
/// on the materials; call [`BlendLayerBinder::clear_layer`] to remove them.
#[derive(Debug, Clone)]
pub struct BlendLayerBinder {
    name: String,
    layer_index: Option<u32>,
    prefix: Option<String>,
    blend_value: f32,
    blend_vec: Vec4,
    hsv_scalar: Vec4,
    /// Registration order, no duplicates.
    materials: Vec<MaterialHandle>,
    maps: LayerMaps,
    triplanar: bool,
    revalidate_on_index_change: bool,
}

impl BlendLayerBinder {
    /// Bind layer `layer_index` and register every opted-in material under `root`.
    ///
    /// `None` leaves the binder unbound; nothing is registered until an index is set.
    ///
    /// # Errors
    ///
    /// Returns [`LayerError::Host`] if `root` is unknown or a write is rejected.
    pub fn new<H: MaterialHost>(
        host: &mut H,
        name: impl Into<String>,
        layer_index: Option<u32>,
        root: NodeId,
        config: &LayerConfig,
    ) -> Result<Self, LayerError> {
        let mut binder = Self {
            name: name.into(),
            layer_index: None,
            prefix: None,
            blend_value: 0.0,
            blend_vec: Vec4::ZERO,
            hsv_scalar: Vec4::ZERO,
            materials: Vec::new(),
            maps: LayerMaps::default(),
            triplanar: config.triplanar,
            revalidate_on_index_change: config.revalidate_on_index_change,
        };
        binder.set_layer_index(host, layer_index)?;
        let registered = binder.add_materials_from(host, root)?;
        log::debug!(
            "Blend layer '{}' bound to {:?} with {registered} material(s)",
            binder.name,
            binder.prefix
        );
        Ok(binder)
    }

    /// Run discovery on `root` and register every opted-in material.
    ///
    /// Returns how many materials were newly registered.
    pub fn add_materials_from<H: MaterialHost>(
        &mut self,
        host: &mut H,
        root: NodeId,
    ) -> Result<usize, LayerError> {
        let mut registered = 0;
        for material in host.geometry_materials(root)? {
            if self.register_material(host, material)? {
                registered += 1;
            }
        }
        Ok(registered)
    }

    /// Register one material if its definition declares this layer's blend vector.
    ///
    /// Unsupported and already-registered materials are skipped. Returns
    /// `true` if the material was added, in which case the blend vector (and
    /// the HSV scalar, when declared) has been written to it.
    pub fn register_material<H: MaterialHost>(
        &mut self,
        host: &mut H,
        material: MaterialHandle,
    ) -> Result<bool, LayerError> {
        let Some(prefix) = self.prefix.as_deref() else {
            return Ok(false);
        };
        let vec_name = LayerSlot::BlendVec.param_name(prefix);
        let hsv_name = LayerSlot::HsvScalar.param_name(prefix);

        if !host.declares_param(material, &vec_name) {
            log::debug!("Skipping {material:?}: definition lacks '{vec_name}'");
            return Ok(false);
        }
        if self.materials.contains(&material) {
            return Ok(false);
        }

        self.materials.push(material);
        host.set_param(material, &vec_name, &ParamValue::Vector4(self.blend_vec))?;
        if host.declares_param(material, &hsv_name) {
            host.set_param(material, &hsv_name, &ParamValue::Vector4(self.hsv_scalar))?;
        }
        log::debug!("Registered {material:?} on blend layer '{}'", self.name);
        Ok(true)
    }

    /// Remove every parameter under the current prefix from every registered material.
    pub fn clear_layer<H: MaterialHost>(&self, host: &mut H) -> Result<(), LayerError> {
        let Some(prefix) = self.prefix.as_deref() else {
            return Ok(());
        };
        // `BlendLayer_1` must not match `BlendLayer_10_*`.
        let scan = format!("{prefix}_");
        for &material in &self.materials {
            for name in host.param_names(material)? {
                if name.starts_with(&scan) {
                    host.clear_param(material, &name)?;
                }
            }
        }
        Ok(())
    }

    /// Move the layer to another index.
    ///
    /// Clears all parameters under the old prefix, recomputes the prefix and
    /// re-pushes the blend vector. When revalidation is on, materials whose
    /// definition lacks the new blend vector are unregistered first.
    pub fn set_layer_index<H: MaterialHost>(
        &mut self,
        host: &mut H,
        layer_index: Option<u32>,
    ) -> Result<(), LayerError> {
        if self.prefix.is_some() {
            self.clear_layer(host)?;
        }

        self.layer_index = layer_index;
        self.prefix = layer_index.map(layer_prefix);
        if !self.materials.is_empty() {
            log::info!(
                "Blend layer '{}' moved to {}",
                self.name,
                self.prefix.as_deref().unwrap_or("<unbound>")
            );
        }

        let Some(prefix) = self.prefix.clone() else {
            if self.revalidate_on_index_change {
                self.materials.clear();
            }
            return Ok(());
        };
        let vec_name = LayerSlot::BlendVec.param_name(&prefix);

        if self.revalidate_on_index_change {
            let before = self.materials.len();
            self.materials
                .retain(|&material| host.declares_param(material, &vec_name));
            let dropped = before - self.materials.len();
            if dropped > 0 {
                log::debug!(
                    "Unregistered {dropped} material(s) lacking '{vec_name}' from '{}'",
                    self.name
                );
            }
        }

        self.push_vector(host, &vec_name, self.blend_vec, false)?;
        self.push_vector(
            host,
            &LayerSlot::HsvScalar.param_name(&prefix),
            self.hsv_scalar,
            true,
        )
    }

    /// Write `value` under `name` to every registered material.
    ///
    /// `None` and `Bool(false)` clear the parameter. Materials whose definition
    /// does not declare `name` are skipped. With triplanar enabled a texture is
    /// switched to [`WrapMode::Repeat`] before it is assigned.
    pub fn set_param<H: MaterialHost>(
        &self,
        host: &mut H,
        name: &str,
        value: Option<ParamValue>,
    ) -> Result<(), LayerError> {
        if self.materials.is_empty() {
            return Ok(());
        }

        match value {
            None | Some(ParamValue::Bool(false)) => {
                for &material in &self.materials {
                    host.clear_param(material, name)?;
                }
            }
            Some(value) => {
                if let ParamValue::Texture2D(texture) = value
                    && self.triplanar
                {
                    host.set_wrap_mode(texture, WrapMode::Repeat)?;
                }
                for &material in &self.materials {
                    if !host.declares_param(material, name) {
                        log::debug!(
                            "Skipping '{name}' on {material:?}: not declared by its definition"
                        );
                        continue;
                    }
                    host.set_param(material, name, &value)?;
                }
            }
        }
        Ok(())
    }

    /// Enable or disable triplanar sampling.
    ///
    /// Enabling forces [`WrapMode::Repeat`] on every stored texture. Disabling
    /// leaves wrap modes as they are.
    pub fn set_triplanar<H: MaterialHost>(
        &mut self,
        host: &mut H,
        triplanar: bool,
    ) -> Result<(), LayerError> {
        self.triplanar = triplanar;
        if triplanar {
            for texture in self.maps.iter() {
                host.set_wrap_mode(texture, WrapMode::Repeat)?;
            }
        }
        Ok(())
    }

    /// Set or clear the base color texture.
    pub fn set_base_color_map<H: MaterialHost>(
        &mut self,
        host: &mut H,
        texture: Option<TextureHandle>,
    ) -> Result<(), LayerError> {
        self.set_map(host, LayerSlot::BaseColorMap, texture)
    }

    /// Set or clear the normal texture.
    pub fn set_normal_map<H: MaterialHost>(
        &mut self,
        host: &mut H,
        texture: Option<TextureHandle>,
    ) -> Result<(), LayerError> {
        self.set_map(host, LayerSlot::NormalMap, texture)
    }

    /// Set or clear the metallic / roughness / AO texture.
    pub fn set_metallic_roughness_ao_map<H: MaterialHost>(
        &mut self,
        host: &mut H,
        texture: Option<TextureHandle>,
    ) -> Result<(), LayerError> {
        self.set_map(host, LayerSlot::MetallicRoughnessAoMap, texture)
    }

    /// Set or clear the emissive texture.
    pub fn set_emissive_map<H: MaterialHost>(
        &mut self,
        host: &mut H,
        texture: Option<TextureHandle>,
    ) -> Result<(), LayerError> {
        self.set_map(host, LayerSlot::EmissiveMap, texture)
    }

    fn set_map<H: MaterialHost>(
        &mut self,
        host: &mut H,
        slot: LayerSlot,
        texture: Option<TextureHandle>,
    ) -> Result<(), LayerError> {
        if let Some(stored) = self.maps.slot_mut(slot) {
            *stored = texture;
        }
        let name = self.prefixed(slot)?;
        self.set_param(host, &name, texture.map(ParamValue::Texture2D))
    }

    /// Blend using the base color alpha channel. `false` clears the flag.
    pub fn set_blend_alpha<H: MaterialHost>(
        &self,
        host: &mut H,
        alpha: bool,
    ) -> Result<(), LayerError> {
        let name = self.prefixed(LayerSlot::BlendAlpha)?;
        self.set_param(host, &name, Some(ParamValue::Bool(alpha)))
    }

    /// Select the material debug output. The value must be between -1 and 5;
    /// it is not checked here.
    pub fn set_debug_values_mode<H: MaterialHost>(
        &self,
        host: &mut H,
        mode: i32,
    ) -> Result<(), LayerError> {
        self.set_param(host, DEBUG_VALUES_MODE, Some(ParamValue::Int(mode)))
    }

    /// Set the blend weight and re-push the blend vector to every material.
    pub fn set_blend_value<H: MaterialHost>(
        &mut self,
        host: &mut H,
        blend_value: f32,
    ) -> Result<(), LayerError> {
        self.blend_value = blend_value;
        self.blend_vec.x = blend_value;
        if let Some(prefix) = self.prefix.as_deref() {
            let name = LayerSlot::BlendVec.param_name(prefix);
            self.push_vector(host, &name, self.blend_vec, false)?;
        }
        Ok(())
    }

    /// Replace the HSV scalar and push it to every material that declares it.
    pub fn set_hsv_scalar<H: MaterialHost>(
        &mut self,
        host: &mut H,
        hsv: Vec4,
    ) -> Result<(), LayerError> {
        self.hsv_scalar = hsv;
        if let Some(prefix) = self.prefix.as_deref() {
            let name = LayerSlot::HsvScalar.param_name(prefix);
            self.push_vector(host, &name, hsv, true)?;
        }
        Ok(())
    }

    /// Write a vector to every registered material. With `if_declared`,
    /// materials whose definition lacks `name` are skipped.
    fn push_vector<H: MaterialHost>(
        &self,
        host: &mut H,
        name: &str,
        value: Vec4,
        if_declared: bool,
    ) -> Result<(), LayerError> {
        for &material in &self.materials {
            if if_declared && !host.declares_param(material, name) {
                continue;
            }
            host.set_param(material, name, &ParamValue::Vector4(value))?;
        }
        Ok(())
    }

    fn prefixed(&self, slot: LayerSlot) -> Result<String, LayerError> {
        self.prefix
            .as_deref()
            .map(|prefix| slot.param_name(prefix))
            .ok_or_else(|| LayerError::Unbound(self.name.clone()))
    }

    // --- Accessors ---

    /// Layer name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename the layer.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Bound layer index, `None` when unbound.
    pub fn layer_index(&self) -> Option<u32> {
        self.layer_index
    }

    /// Current parameter-name prefix, e.g. `BlendLayer_2`.
    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    /// Current blend weight.
    pub fn blend_value(&self) -> f32 {
        self.blend_value
    }

    /// Current blend vector.
    pub fn blend_vec(&self) -> Vec4 {
        self.blend_vec
    }

    /// Current HSV scalar.
    pub fn hsv_scalar(&self) -> Vec4 {
        self.hsv_scalar
    }

    /// Whether triplanar sampling is enabled.
    pub fn is_triplanar(&self) -> bool {
        self.triplanar
    }

    /// Registered materials in registration order.
    pub fn materials(&self) -> &[MaterialHandle] {
        &self.materials
    }

    /// Returns `true` if `material` is registered.
    pub fn is_registered(&self, material: MaterialHandle) -> bool {
        self.materials.contains(&material)
    }

    /// Stored texture references.
    pub fn maps(&self) -> &LayerMaps {
        &self.maps
    }
}
