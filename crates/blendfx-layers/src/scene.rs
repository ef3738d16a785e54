//! In-memory scene graph implementing [`MaterialHost`].
//!
//! Used as the host for tests and the demo binary. Materials enforce their
//! definition the way an engine would: writes to undeclared names or with the
//! wrong value type are rejected.

use std::collections::{BTreeMap, HashMap, VecDeque};

use crate::binder::{DEBUG_VALUES_MODE, LayerSlot, layer_prefix};
use crate::host::{HostError, MaterialHandle, MaterialHost, NodeId, TextureHandle, WrapMode};
use crate::param::{ParamType, ParamValue};

// ---------------------------------------------------------------------------
// MaterialDefinition
// ---------------------------------------------------------------------------

/// Declared schema of a material: which parameter names it accepts and their types.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MaterialDefinition {
    name: String,
    params: HashMap<String, ParamType>,
}

impl MaterialDefinition {
    /// An empty definition.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: HashMap::new(),
        }
    }

    /// Declare a parameter.
    pub fn with_param(mut self, name: impl Into<String>, ty: ParamType) -> Self {
        self.params.insert(name.into(), ty);
        self
    }

    /// Declare the full blend layer parameter set for each index, plus the
    /// shared debug switch.
    pub fn with_blend_layers(mut self, indices: &[u32]) -> Self {
        for &index in indices {
            let prefix = layer_prefix(index);
            for slot in LayerSlot::ALL {
                self.params
                    .insert(slot.param_name(&prefix), slot.param_type());
            }
        }
        self.params
            .insert(DEBUG_VALUES_MODE.to_string(), ParamType::Int);
        self
    }

    /// Definition name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared type of `name`, if declared.
    pub fn declared(&self, name: &str) -> Option<ParamType> {
        self.params.get(name).copied()
    }
}

// ---------------------------------------------------------------------------
// Scene storage
// ---------------------------------------------------------------------------

#[derive(Debug)]
enum NodeKind {
    Group(Vec<NodeId>),
    Geometry(MaterialHandle),
}

#[derive(Debug)]
struct SceneNode {
    name: String,
    kind: NodeKind,
}

#[derive(Debug)]
struct MaterialInstance {
    definition: MaterialDefinition,
    params: BTreeMap<String, ParamValue>,
    /// Successful `set_param` calls, for observing fan-out.
    writes: usize,
}

#[derive(Debug)]
struct Texture {
    name: String,
    wrap: WrapMode,
}

/// A tree of group and geometry nodes with materials and textures.
///
/// Node 0 is the root group. Ids index dense arrays and are never reused.
#[derive(Debug)]
pub struct SceneGraph {
    nodes: Vec<SceneNode>,
    materials: Vec<MaterialInstance>,
    textures: Vec<Texture>,
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneGraph {
    /// A scene containing only the root group.
    pub fn new() -> Self {
        Self {
            nodes: vec![SceneNode {
                name: "root".to_string(),
                kind: NodeKind::Group(Vec::new()),
            }],
            materials: Vec::new(),
            textures: Vec::new(),
        }
    }

    /// The root group.
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Add an empty group under `parent`.
    pub fn add_group(&mut self, parent: NodeId, name: &str) -> Result<NodeId, HostError> {
        self.attach(parent, name, NodeKind::Group(Vec::new()))
    }

    /// Add a geometry leaf rendered with `material` under `parent`.
    pub fn add_geometry(
        &mut self,
        parent: NodeId,
        name: &str,
        material: MaterialHandle,
    ) -> Result<NodeId, HostError> {
        self.instance(material)?;
        self.attach(parent, name, NodeKind::Geometry(material))
    }

    fn attach(&mut self, parent: NodeId, name: &str, kind: NodeKind) -> Result<NodeId, HostError> {
        let id = NodeId(self.nodes.len() as u32);
        match self.nodes.get_mut(parent.0 as usize).map(|n| &mut n.kind) {
            Some(NodeKind::Group(children)) => children.push(id),
            Some(NodeKind::Geometry(_)) => return Err(HostError::LeafNode(parent)),
            None => return Err(HostError::UnknownNode(parent)),
        }
        self.nodes.push(SceneNode {
            name: name.to_string(),
            kind,
        });
        Ok(id)
    }

    /// Name of a node.
    pub fn node_name(&self, node: NodeId) -> Option<&str> {
        self.nodes.get(node.0 as usize).map(|n| n.name.as_str())
    }

    /// Create a material instance of `definition` with no parameters set.
    pub fn create_material(&mut self, definition: &MaterialDefinition) -> MaterialHandle {
        let handle = MaterialHandle(self.materials.len() as u32);
        self.materials.push(MaterialInstance {
            definition: definition.clone(),
            params: BTreeMap::new(),
            writes: 0,
        });
        handle
    }

    /// Definition backing a material.
    pub fn definition(&self, material: MaterialHandle) -> Option<&MaterialDefinition> {
        self.materials
            .get(material.0 as usize)
            .map(|m| &m.definition)
    }

    /// Current value of a material parameter.
    pub fn param(&self, material: MaterialHandle, name: &str) -> Option<ParamValue> {
        self.materials
            .get(material.0 as usize)
            .and_then(|m| m.params.get(name).copied())
    }

    /// Number of successful parameter writes on a material.
    pub fn write_count(&self, material: MaterialHandle) -> usize {
        self.materials
            .get(material.0 as usize)
            .map_or(0, |m| m.writes)
    }

    /// Create a texture with the default wrap mode.
    pub fn create_texture(&mut self, name: &str) -> TextureHandle {
        let handle = TextureHandle(self.textures.len() as u32);
        self.textures.push(Texture {
            name: name.to_string(),
            wrap: WrapMode::default(),
        });
        handle
    }

    /// Name of a texture.
    pub fn texture_name(&self, texture: TextureHandle) -> Option<&str> {
        self.textures
            .get(texture.0 as usize)
            .map(|t| t.name.as_str())
    }

    /// Wrap mode of a texture.
    pub fn wrap_mode(&self, texture: TextureHandle) -> Option<WrapMode> {
        self.textures.get(texture.0 as usize).map(|t| t.wrap)
    }

    fn instance(&self, material: MaterialHandle) -> Result<&MaterialInstance, HostError> {
        self.materials
            .get(material.0 as usize)
            .ok_or(HostError::UnknownMaterial(material))
    }

    fn instance_mut(
        &mut self,
        material: MaterialHandle,
    ) -> Result<&mut MaterialInstance, HostError> {
        self.materials
            .get_mut(material.0 as usize)
            .ok_or(HostError::UnknownMaterial(material))
    }
}

// ---------------------------------------------------------------------------
// MaterialHost
// ---------------------------------------------------------------------------

impl MaterialHost for SceneGraph {
    fn geometry_materials(&self, root: NodeId) -> Result<Vec<MaterialHandle>, HostError> {
        if self.nodes.get(root.0 as usize).is_none() {
            return Err(HostError::UnknownNode(root));
        }

        let mut found = Vec::new();
        let mut queue = VecDeque::from([root]);
        while let Some(id) = queue.pop_front() {
            match &self.nodes[id.0 as usize].kind {
                NodeKind::Group(children) => queue.extend(children.iter().copied()),
                NodeKind::Geometry(material) => found.push(*material),
            }
        }
        Ok(found)
    }

    fn declares_param(&self, material: MaterialHandle, name: &str) -> bool {
        self.definition(material)
            .is_some_and(|def| def.declared(name).is_some())
    }

    fn param_names(&self, material: MaterialHandle) -> Result<Vec<String>, HostError> {
        Ok(self.instance(material)?.params.keys().cloned().collect())
    }

    fn set_param(
        &mut self,
        material: MaterialHandle,
        name: &str,
        value: &ParamValue,
    ) -> Result<(), HostError> {
        if let ParamValue::Texture2D(texture) = value
            && self.textures.get(texture.0 as usize).is_none()
        {
            return Err(HostError::UnknownTexture(*texture));
        }

        let instance = self.instance_mut(material)?;
        let expected = instance
            .definition
            .declared(name)
            .ok_or_else(|| HostError::UndeclaredParam {
                material,
                name: name.to_string(),
            })?;
        if expected != value.param_type() {
            return Err(HostError::TypeMismatch {
                name: name.to_string(),
                expected,
                actual: value.param_type(),
            });
        }

        instance.params.insert(name.to_string(), *value);
        instance.writes += 1;
        Ok(())
    }

    fn clear_param(&mut self, material: MaterialHandle, name: &str) -> Result<(), HostError> {
        self.instance_mut(material)?.params.remove(name);
        Ok(())
    }

    fn set_wrap_mode(&mut self, texture: TextureHandle, mode: WrapMode) -> Result<(), HostError> {
        let tex = self
            .textures
            .get_mut(texture.0 as usize)
            .ok_or(HostError::UnknownTexture(texture))?;
        tex.wrap = mode;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec4;

    fn plain_definition() -> MaterialDefinition {
        MaterialDefinition::new("Unshaded").with_param("Color", ParamType::Vector4)
    }

    #[test]
    fn test_traversal_is_breadth_first() {
        let mut scene = SceneGraph::new();
        let def = plain_definition();
        let deep = scene.create_material(&def);
        let shallow = scene.create_material(&def);

        let group = scene.add_group(scene.root(), "group").unwrap();
        scene.add_geometry(group, "deep", deep).unwrap();
        scene.add_geometry(scene.root(), "shallow", shallow).unwrap();

        let found = scene.geometry_materials(scene.root()).unwrap();
        assert_eq!(found, vec![shallow, deep]);
    }

    #[test]
    fn test_traversal_of_subtree_only() {
        let mut scene = SceneGraph::new();
        let def = plain_definition();
        let inside = scene.create_material(&def);
        let outside = scene.create_material(&def);

        let group = scene.add_group(scene.root(), "group").unwrap();
        scene.add_geometry(group, "inside", inside).unwrap();
        scene.add_geometry(scene.root(), "outside", outside).unwrap();

        assert_eq!(scene.geometry_materials(group).unwrap(), vec![inside]);
    }

    #[test]
    fn test_geometry_cannot_have_children() {
        let mut scene = SceneGraph::new();
        let mat = scene.create_material(&plain_definition());
        let leaf = scene.add_geometry(scene.root(), "leaf", mat).unwrap();

        assert_eq!(
            scene.add_group(leaf, "child"),
            Err(HostError::LeafNode(leaf))
        );
        assert_eq!(
            scene.geometry_materials(NodeId(99)),
            Err(HostError::UnknownNode(NodeId(99)))
        );
    }

    #[test]
    fn test_undeclared_param_rejected() {
        let mut scene = SceneGraph::new();
        let mat = scene.create_material(&plain_definition());

        let result = scene.set_param(mat, "Missing", &ParamValue::Float(1.0));
        assert!(matches!(result, Err(HostError::UndeclaredParam { .. })));
        assert_eq!(scene.write_count(mat), 0);
    }

    #[test]
    fn test_type_mismatch_rejected() {
        let mut scene = SceneGraph::new();
        let mat = scene.create_material(&plain_definition());

        let result = scene.set_param(mat, "Color", &ParamValue::Float(1.0));
        assert_eq!(
            result,
            Err(HostError::TypeMismatch {
                name: "Color".to_string(),
                expected: ParamType::Vector4,
                actual: ParamType::Float,
            })
        );
    }

    #[test]
    fn test_set_and_clear_param() {
        let mut scene = SceneGraph::new();
        let mat = scene.create_material(&plain_definition());

        scene
            .set_param(mat, "Color", &ParamValue::Vector4(Vec4::ONE))
            .unwrap();
        assert_eq!(scene.param_names(mat).unwrap(), vec!["Color".to_string()]);

        scene.clear_param(mat, "Color").unwrap();
        assert!(scene.param(mat, "Color").is_none());
        // Clearing twice is fine.
        scene.clear_param(mat, "Color").unwrap();
    }

    #[test]
    fn test_blend_layer_definition_declares_every_slot() {
        let def = MaterialDefinition::new("PBR").with_blend_layers(&[0, 2]);
        assert_eq!(def.declared("BlendLayer_0_BlendVec"), Some(ParamType::Vector4));
        assert_eq!(def.declared("BlendLayer_2_NormalMap"), Some(ParamType::Texture2D));
        assert_eq!(def.declared("BlendLayer_2_BlendAlpha"), Some(ParamType::Bool));
        assert_eq!(def.declared("BlendLayer_1_BlendVec"), None);
        assert_eq!(def.declared(DEBUG_VALUES_MODE), Some(ParamType::Int));
    }

    #[test]
    fn test_wrap_mode_defaults_to_clamp() {
        let mut scene = SceneGraph::new();
        let tex = scene.create_texture("rock");
        assert_eq!(scene.wrap_mode(tex), Some(WrapMode::EdgeClamp));

        scene.set_wrap_mode(tex, WrapMode::Repeat).unwrap();
        assert_eq!(scene.wrap_mode(tex), Some(WrapMode::Repeat));
        assert_eq!(
            scene.set_wrap_mode(TextureHandle(5), WrapMode::Repeat),
            Err(HostError::UnknownTexture(TextureHandle(5)))
        );
    }
}
