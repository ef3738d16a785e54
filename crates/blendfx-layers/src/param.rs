//! Material parameter values: [`ParamType`] and [`ParamValue`].

use glam::Vec4;

use crate::host::TextureHandle;

/// Declared type of a material parameter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ParamType {
    /// Shader define style boolean.
    Bool,
    /// Signed integer.
    Int,
    /// Scalar float.
    Float,
    /// Four-component float vector.
    Vector4,
    /// 2D texture sampler.
    Texture2D,
}

/// A value written to a material parameter.
///
/// Values are copied into the material on every write; vectors are never
/// shared between the binder and the host.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ParamValue {
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Int(i32),
    /// Float value.
    Float(f32),
    /// Vector value.
    Vector4(Vec4),
    /// Texture reference.
    Texture2D(TextureHandle),
}

impl ParamValue {
    /// The [`ParamType`] this value satisfies.
    pub fn param_type(&self) -> ParamType {
        match self {
            ParamValue::Bool(_) => ParamType::Bool,
            ParamValue::Int(_) => ParamType::Int,
            ParamValue::Float(_) => ParamType::Float,
            ParamValue::Vector4(_) => ParamType::Vector4,
            ParamValue::Texture2D(_) => ParamType::Texture2D,
        }
    }
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        ParamValue::Bool(v)
    }
}

impl From<i32> for ParamValue {
    fn from(v: i32) -> Self {
        ParamValue::Int(v)
    }
}

impl From<f32> for ParamValue {
    fn from(v: f32) -> Self {
        ParamValue::Float(v)
    }
}

impl From<Vec4> for ParamValue {
    fn from(v: Vec4) -> Self {
        ParamValue::Vector4(v)
    }
}

impl From<TextureHandle> for ParamValue {
    fn from(v: TextureHandle) -> Self {
        ParamValue::Texture2D(v)
    }
}
