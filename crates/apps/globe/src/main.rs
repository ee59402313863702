use std::path::PathBuf;

use clap::{Parser, Subcommand};
use foundation::math::{Direction, GeoCoordinate, GeoProjector, LongitudeConvention, Vec2, Vec3};
use foundation::time::Time;
use runtime::Event;
use scene::{GlobeConfig, GlobeScene, PickResult};
use serde::Serialize;
use serde_json::json;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Globe coordinate projection and picking")]
struct Args {
    /// JSON config file (falls back to $GLOBE_CONFIG, then built-in defaults)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Longitude convention, overriding the config
    #[arg(long)]
    convention: Option<LongitudeConvention>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert a sphere-local direction to latitude/longitude
    ToGeo {
        #[arg(allow_negative_numbers = true)]
        x: f64,
        #[arg(allow_negative_numbers = true)]
        y: f64,
        #[arg(allow_negative_numbers = true)]
        z: f64,
    },

    /// Convert latitude/longitude (degrees) to a unit direction
    ToDir {
        #[arg(allow_negative_numbers = true)]
        lat: f64,
        #[arg(allow_negative_numbers = true)]
        lon: f64,
    },

    /// Pick the globe from the configured camera without changing the scene
    Pick {
        #[command(flatten)]
        pointer: Pointer,
    },

    /// Simulate a click: pick, move the marker, recenter the camera
    Click {
        #[command(flatten)]
        pointer: Pointer,

        /// Seconds between press and release
        #[arg(long, default_value_t = 0.05)]
        hold: f64,
    },

    /// Print the effective configuration
    ShowConfig,
}

#[derive(clap::Args, Debug, Clone, Copy)]
struct Pointer {
    /// NDC x in [-1, 1], or pixels with --width/--height
    #[arg(allow_negative_numbers = true)]
    x: f64,
    /// NDC y in [-1, 1] (+y up), or pixels (+y down) with --width/--height
    #[arg(allow_negative_numbers = true)]
    y: f64,
    /// Viewport width in pixels; makes x/y pixel positions
    #[arg(long, requires = "height")]
    width: Option<f64>,
    /// Viewport height in pixels
    #[arg(long, requires = "width")]
    height: Option<f64>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    match real_main(Args::parse()) {
        Ok(out) => println!("{out}"),
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    }
}

fn real_main(args: Args) -> Result<String, String> {
    let mut config = GlobeConfig::load(args.config.as_deref()).map_err(|e| e.to_string())?;
    if let Some(convention) = args.convention {
        config.longitude_convention = convention;
    }

    match args.command {
        Command::ToGeo { x, y, z } => cmd_to_geo(&config, Vec3::new(x, y, z)),
        Command::ToDir { lat, lon } => cmd_to_dir(&config, GeoCoordinate::new(lat, lon)),
        Command::Pick { pointer } => cmd_pick(config, pointer),
        Command::Click { pointer, hold } => cmd_click(config, pointer, hold),
        Command::ShowConfig => to_json(&config),
    }
}

fn cmd_to_geo(config: &GlobeConfig, v: Vec3) -> Result<String, String> {
    let direction = Direction::new(v).ok_or_else(|| format!("not a direction: {v:?}"))?;
    let projector = GeoProjector::new(config.longitude_convention);
    to_json(&projector.to_geo_coordinate(direction))
}

fn cmd_to_dir(config: &GlobeConfig, coord: GeoCoordinate) -> Result<String, String> {
    let projector = GeoProjector::new(config.longitude_convention);
    to_json(&projector.to_direction(coord).as_vec3())
}

fn cmd_pick(config: GlobeConfig, pointer: Pointer) -> Result<String, String> {
    let scene = scene_for(config, pointer)?;
    let ndc = pointer_ndc(&scene, pointer);
    let hit = scene.pick(ndc);
    info!(x = ndc.x, y = ndc.y, hit = hit.is_some(), "pick");
    to_json(&json!({ "ndc": ndc, "hit": hit }))
}

#[derive(Serialize)]
struct ClickReport {
    hit: Option<PickResult>,
    marker: scene::Marker,
    camera_position: Vec3,
    events: Vec<Event>,
}

fn cmd_click(config: GlobeConfig, pointer: Pointer, hold: f64) -> Result<String, String> {
    let mut scene = scene_for(config, pointer)?;
    scene.drain_events();

    let ndc = pointer_ndc(&scene, pointer);
    scene.pointer_down(Time::ZERO);
    let hit = scene.pointer_up(Time(hold.max(0.0)), ndc);

    to_json(&ClickReport {
        hit,
        marker: *scene.marker(),
        camera_position: scene.camera().position,
        events: scene.drain_events(),
    })
}

fn scene_for(config: GlobeConfig, pointer: Pointer) -> Result<GlobeScene, String> {
    let mut scene = GlobeScene::new(config).map_err(|e| e.to_string())?;
    if let (Some(w), Some(h)) = (pointer.width, pointer.height) {
        scene.resize(w, h, 1.0);
    }
    Ok(scene)
}

fn pointer_ndc(scene: &GlobeScene, pointer: Pointer) -> Vec2 {
    match (pointer.width, pointer.height) {
        (Some(_), Some(_)) => scene.viewport().to_ndc(pointer.x, pointer.y),
        _ => Vec2::new(pointer.x, pointer.y),
    }
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String, String> {
    serde_json::to_string_pretty(value).map_err(|e| format!("serialize output: {e}"))
}
