//! Ray DSL demo entry point.
//!
//! Runs a headless scene where game objects react to events through
//! matcher-guarded listeners:
//! - **bevy_ecs** holds the objects, resources, and per-frame systems
//! - **configparser** reads `config.ini`
//! - **serde_json** reads optional event scripts
//!
//! # Main Loop
//!
//! 1. Load configuration and the event script
//! 2. Insert the matcher registry, image cache, and clock into the world
//! 3. Spawn the demo objects and raise the scripted events
//! 4. For each frame: advance time, raise `"update"`, drain every runner
//! 5. Evict the image cache on exit
//!
//! # Running
//!
//! ```sh
//! RUST_LOG=debug cargo run -- --frames 5 --script events.json
//! ```

use bevy_ecs::prelude::*;
use clap::Parser;
use std::path::PathBuf;

use raydsl::game;
use raydsl::resources::gameconfig::GameConfig;
use raydsl::resources::image::Color;
use raydsl::resources::imagecache::{ImageCache, SolidLoader};
use raydsl::resources::matcherregistry::MatcherRegistry;
use raydsl::resources::worldtime::WorldTime;
use raydsl::systems::listeners::{raise_frame_events, run_listeners};
use raydsl::systems::time::update_world_time;

/// Fixed step used by the headless loop.
const FRAME_DELTA: f32 = 1.0 / 60.0;

/// Ray DSL event demo
#[derive(Parser)]
#[command(version, about = "Drives game objects through matcher-guarded events.")]
struct Cli {
    /// Configuration file (default: ./config.ini).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Number of frames to run; overrides the configuration.
    #[arg(long)]
    frames: Option<u32>,

    /// JSON file of events to raise before the first frame.
    #[arg(long, value_name = "PATH")]
    script: Option<PathBuf>,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let mut config = cli.config.map(GameConfig::with_path).unwrap_or_default();
    if let Err(e) = config.load_from_file() {
        log::warn!("{}; using defaults", e);
    }
    if let Some(frames) = cli.frames {
        config.frames = frames;
    }

    let script = match cli.script {
        Some(path) => match game::load_script(&path) {
            Ok(script) => script,
            Err(e) => {
                eprintln!("Error: {e}");
                std::process::exit(1);
            }
        },
        None => game::default_script(),
    };

    // --------------- ECS world + resources ---------------
    let mut world = World::new();
    world.insert_resource(WorldTime::default());
    world.insert_resource(MatcherRegistry::with_builtins());
    world.insert_non_send_resource(ImageCache::new(SolidLoader::new(
        config.placeholder_width,
        config.placeholder_height,
        Color::WHITE,
    )));
    let frames = config.frames;
    world.insert_resource(config);

    if let Err(e) = game::setup(&mut world) {
        log::error!("Failed to set up scene: {}", e);
        std::process::exit(1);
    }
    game::raise_scripted(&mut world, &script);

    let mut update = Schedule::default();
    update.add_systems(raise_frame_events);
    update.add_systems(run_listeners.after(raise_frame_events));

    // --------------- Main loop ---------------
    for _ in 0..frames {
        update_world_time(&mut world, FRAME_DELTA);
        update.run(&mut world);
    }

    let wt = *world.resource::<WorldTime>();
    log::info!("Ran {} frame(s), {:.3}s simulated", wt.frame_count, wt.elapsed);
    game::teardown(&mut world);
}
