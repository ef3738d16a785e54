//! A small rock garden scene for the demo.

use blendfx_layers::{HostError, MaterialDefinition, MaterialHandle, NodeId, ParamType, SceneGraph};

/// Handles into the demo scene.
pub struct Garden {
    /// Group holding every rock.
    pub rocks: NodeId,
    /// Material supporting layers 0 and 1.
    pub granite: MaterialHandle,
    /// Material supporting layer 0 only, shared by two rocks.
    pub basalt: MaterialHandle,
    /// Material without blend layer support.
    pub signpost: MaterialHandle,
}

/// Build the scene: three rocks under a group and a signpost beside it.
pub fn build(scene: &mut SceneGraph) -> Result<Garden, HostError> {
    let granite =
        scene.create_material(&MaterialDefinition::new("Granite").with_blend_layers(&[0, 1]));
    let basalt = scene.create_material(&MaterialDefinition::new("Basalt").with_blend_layers(&[0]));
    let signpost = scene.create_material(
        &MaterialDefinition::new("Unshaded").with_param("Color", ParamType::Vector4),
    );

    let root = scene.root();
    let rocks = scene.add_group(root, "rocks")?;
    scene.add_geometry(rocks, "boulder", granite)?;
    scene.add_geometry(rocks, "pebble_a", basalt)?;
    scene.add_geometry(rocks, "pebble_b", basalt)?;
    scene.add_geometry(root, "signpost", signpost)?;

    Ok(Garden {
        rocks,
        granite,
        basalt,
        signpost,
    })
}
