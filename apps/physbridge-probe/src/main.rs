use clap::{Parser, Subcommand};
use glam::Vec3;
use physbridge_common::{ObjectId, PrimShape, TerseUpdate};
use physbridge_native::PhysicsBackend;
use physbridge_scene::terrain::{HEIGHT_SCALE, quantize_height};
use physbridge_scene::{ENGINE_NAME, PhysicsConfig, RegionInfo, SceneWorld};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "physbridge-probe", about = "Diagnostic probe for the region physics bridge")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print adapter and backend info
    Info,
    /// Bring up a region against the available backend and step it
    Probe {
        /// Number of frames to simulate
        #[arg(short, long, default_value = "30")]
        frames: u32,
        /// Region edge length in world units
        #[arg(short, long, default_value = "256")]
        size: u32,
        /// YAML physics config; defaults to one selecting this adapter
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Emit the summary as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the terrain quantizer over a synthetic heightmap
    Terrain {
        /// Heightmap edge length in samples
        #[arg(short, long, default_value = "64")]
        size: u32,
        /// Peak height of the synthetic surface
        #[arg(short, long, default_value = "120.0")]
        amplitude: f32,
    },
}

#[derive(Serialize)]
struct ProbeSummary {
    adapter: &'static str,
    backend: &'static str,
    active: bool,
    frames_requested: u32,
    frames_completed: u32,
    body_updates: usize,
    avatar_updates: usize,
}

#[cfg(feature = "physx")]
fn backend() -> Arc<dyn PhysicsBackend> {
    Arc::new(physbridge_native::FfiBackend::new())
}

#[cfg(not(feature = "physx"))]
fn backend() -> Arc<dyn PhysicsBackend> {
    Arc::new(physbridge_native::NullBackend::new())
}

const fn backend_name() -> &'static str {
    if cfg!(feature = "physx") { "physx" } else { "null" }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            println!("physbridge-probe v{}", env!("CARGO_PKG_VERSION"));
            println!("adapter: {ENGINE_NAME}");
            println!("backend: {}", backend_name());
            println!("height quantization: {HEIGHT_SCALE} units/step");
        }
        Commands::Probe {
            frames,
            size,
            config,
            json,
        } => {
            let config = match config {
                Some(path) => {
                    let text = std::fs::read_to_string(&path)
                        .map_err(|e| anyhow::anyhow!("reading {}: {e}", path.display()))?;
                    serde_yaml::from_str::<PhysicsConfig>(&text)?
                }
                None => PhysicsConfig::selecting_bridge(),
            };

            let world = SceneWorld::new(backend());
            world.initialise(&config);
            world.add_region(RegionInfo {
                name: "probe".to_owned(),
                size_x: size,
                size_y: size,
                water_height: 20.0,
                heightmap: vec![21.0; (size as usize) * (size as usize)],
            });

            let mut body_updates = 0;
            let mut avatar_updates = 0;
            let mut frames_completed = 0;

            if world.is_active() {
                let center = size as f32 * 0.5;
                let _falling = world.add_prim_shape(
                    "probe-crate",
                    &PrimShape::default(),
                    Vec3::new(center, center, 40.0),
                    Vec3::ONE,
                    glam::Quat::IDENTITY,
                    true,
                    ObjectId(1),
                );
                let _walker = world.add_avatar(
                    ObjectId(2),
                    "probe-walker",
                    Vec3::new(center, center - 4.0, 22.0),
                    Vec3::new(1.0, 0.0, 0.0),
                    Vec3::new(0.6, 0.6, 1.8),
                    false,
                );

                for _ in 0..frames {
                    frames_completed += world.simulate(1.0 / 60.0);
                    for update in world.drain_updates() {
                        match update {
                            TerseUpdate::Body { .. } => body_updates += 1,
                            TerseUpdate::Avatar { .. } => avatar_updates += 1,
                        }
                    }
                }
                world.close();
            }

            let summary = ProbeSummary {
                adapter: ENGINE_NAME,
                backend: backend_name(),
                active: frames_completed > 0,
                frames_requested: frames,
                frames_completed,
                body_updates,
                avatar_updates,
            };

            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else if summary.active {
                println!(
                    "engine up: {}/{} frames, {} body updates, {} avatar updates",
                    summary.frames_completed,
                    summary.frames_requested,
                    summary.body_updates,
                    summary.avatar_updates
                );
            } else {
                println!(
                    "native engine unavailable (backend: {}); adapter degraded to no-ops",
                    summary.backend
                );
            }
        }
        Commands::Terrain { size, amplitude } => {
            let n = (size as usize) * (size as usize);
            let mut clipped = 0usize;
            let mut min_sample = i16::MAX;
            let mut max_sample = i16::MIN;
            for i in 0..n {
                let x = (i % size as usize) as f32;
                let y = (i / size as usize) as f32;
                let height = amplitude * ((x * 0.1).sin() + (y * 0.1).cos());
                let sample = quantize_height(height);
                if sample == i16::MIN || sample == i16::MAX {
                    clipped += 1;
                }
                min_sample = min_sample.min(sample);
                max_sample = max_sample.max(sample);
            }
            println!("samples: {n}");
            println!(
                "range: [{min_sample}, {max_sample}] ({:.1} to {:.1} world units)",
                min_sample as f32 * HEIGHT_SCALE,
                max_sample as f32 * HEIGHT_SCALE
            );
            println!("clipped: {clipped}");
        }
    }

    Ok(())
}
