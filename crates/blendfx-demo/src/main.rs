//! Blend layer demo: binds a layer to an in-memory rock garden, assigns
//! textures, and plays an HSV cycle until it expires.
//!
//! Run with: `cargo run -p blendfx-demo -- --frames 240`

mod garden;

use blendfx_config::{CliArgs, Config, default_config_dir};
use blendfx_effects::{BoundLayer, EffectError, HsvCycleEffect, LayerEffects};
use blendfx_layers::{BlendLayerBinder, HostError, LayerError, LayerSlot, ParamValue, SceneGraph};
use clap::Parser;
use tracing::{debug, error, info};

/// CLI arguments for the demo binary.
#[derive(Parser, Debug)]
#[command(name = "blendfx-demo", about = "Blend layer HSV cycle demo")]
struct DemoArgs {
    #[command(flatten)]
    common: CliArgs,

    /// Blend layer index to bind.
    #[arg(long, default_value_t = 0)]
    layer: u32,

    /// Move the layer to this index after the effect finishes.
    #[arg(long)]
    move_to: Option<u32>,

    /// Number of simulated frames.
    #[arg(long, default_value_t = 600)]
    frames: u32,

    /// Seconds per simulated frame.
    #[arg(long, default_value_t = 1.0 / 60.0)]
    dt: f32,
}

#[derive(Debug, thiserror::Error)]
enum DemoError {
    #[error(transparent)]
    Host(#[from] HostError),
    #[error(transparent)]
    Layer(#[from] LayerError),
    #[error(transparent)]
    Effect(#[from] EffectError),
}

fn main() {
    let args = DemoArgs::parse();

    let config_dir = args.common.config.clone().or_else(default_config_dir);
    let mut config = match &config_dir {
        Some(dir) => Config::load_or_create(dir).unwrap_or_else(|e| {
            eprintln!("Failed to load config: {e}, using defaults");
            Config::default()
        }),
        None => Config::default(),
    };
    config.apply_cli_overrides(&args.common);

    let log_dir = config_dir.as_ref().map(|dir| dir.join("logs"));
    blendfx_log::init_logging(log_dir.as_deref(), cfg!(debug_assertions), Some(&config));

    if let Err(e) = run(&config, &args) {
        error!("Demo failed: {e}");
        std::process::exit(1);
    }
}

fn run(config: &Config, args: &DemoArgs) -> Result<(), DemoError> {
    let mut scene = SceneGraph::new();
    let garden = garden::build(&mut scene)?;

    let mut layer = BlendLayerBinder::new(
        &mut scene,
        "moss",
        Some(args.layer),
        garden.rocks,
        &config.layers,
    )?;
    info!(
        "Layer '{}' ({}) registered {} material(s)",
        layer.name(),
        layer.prefix().unwrap_or("<unbound>"),
        layer.materials().len()
    );

    let albedo = scene.create_texture("moss_albedo");
    let normal = scene.create_texture("moss_normal");
    layer.set_base_color_map(&mut scene, Some(albedo))?;
    layer.set_normal_map(&mut scene, Some(normal))?;
    layer.set_blend_alpha(&mut scene, true)?;
    layer.set_blend_value(&mut scene, 0.8)?;
    info!(
        "Textures assigned, triplanar={} albedo wrap={:?}",
        layer.is_triplanar(),
        scene.wrap_mode(albedo)
    );

    let mut effects = LayerEffects::new();
    let effect = HsvCycleEffect::from_config("rainbow", &config.effects);
    effects.play(Box::new(effect), &mut BoundLayer::new(&mut layer, &mut scene))?;

    for frame in 0..args.frames {
        let finished = effects.update(&mut BoundLayer::new(&mut layer, &mut scene), args.dt)?;
        let hsv = layer.hsv_scalar();
        debug!(
            "Frame {frame}: hue={:.3} sat={:.3} bright={:.3}",
            hsv.x, hsv.y, hsv.z
        );
        for name in finished {
            info!("Frame {frame}: effect '{name}' finished, layer restored");
        }
        if effects.is_empty() {
            break;
        }
    }
    effects.finish_all(&mut BoundLayer::new(&mut layer, &mut scene))?;

    if let Some(index) = args.move_to {
        layer.set_layer_index(&mut scene, Some(index))?;
        info!(
            "Moved to {}; {} material(s) remain registered",
            layer.prefix().unwrap_or("<unbound>"),
            layer.materials().len()
        );
    }

    let blend_vec = layer
        .prefix()
        .map(|prefix| LayerSlot::BlendVec.param_name(prefix));
    for material in [garden.granite, garden.basalt, garden.signpost] {
        let value = blend_vec
            .as_deref()
            .and_then(|name| scene.param(material, name));
        match value {
            Some(ParamValue::Vector4(v)) => info!("{material:?}: blend vector {v}"),
            _ => info!("{material:?}: not on this layer"),
        }
    }

    Ok(())
}
