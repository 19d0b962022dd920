//! Demo scene: a paddle and a ball wired to events through matchers.
//!
//! [`setup`] spawns the scene and warms the image cache, [`raise_scripted`]
//! feeds scripted events to the objects, and [`teardown`] empties the cache.
//!
//! # Script Format
//!
//! ```json
//! [
//!   { "target": "paddle", "event": "hit", "args": [15] },
//!   { "target": "ball", "event": "moved", "args": [{ "x": 700.0, "y": 10.0 }] },
//!   { "event": "ping" }
//! ]
//! ```
//!
//! Entries without a `target` go to every object.

use std::path::Path;

use bevy_ecs::prelude::*;
use log::{debug, info, trace};
use serde::Deserialize;

use crate::components::group::Group;
use crate::components::listeners::Listeners;
use crate::events::error::EventError;
use crate::events::helper::{Helper, Matchers};
use crate::events::value::{EventArgs, Rect, Value, Vector2};
use crate::resources::gameconfig::GameConfig;
use crate::resources::image::Color;
use crate::resources::imagecache::ImageCache;
use crate::resources::matcherregistry::MatcherRegistry;

/// Images loaded during setup.
pub const PRELOADED_IMAGES: [&str; 2] = ["paddle.png", "ball.png"];

/// Playfield bounds used by the ball's `outside` guard.
pub const PLAYFIELD: Rect = Rect {
    x: 0.0,
    y: 0.0,
    w: 640.0,
    h: 360.0,
};

/// One scripted event.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ScriptedEvent {
    /// Group name to deliver to; every object when absent.
    #[serde(default)]
    pub target: Option<String>,
    pub event: String,
    #[serde(default)]
    pub args: Vec<Value>,
}

/// Events raised when no script is given.
pub fn default_script() -> Vec<ScriptedEvent> {
    let scripted = |target: &str, event: &str, args: Vec<Value>| ScriptedEvent {
        target: Some(target.to_string()),
        event: event.to_string(),
        args,
    };
    vec![
        scripted("paddle", "hit", vec![Value::from(15)]),
        scripted("paddle", "hit", vec![Value::from(5)]),
        scripted("paddle", "hit", vec![Value::from("not a number")]),
        scripted(
            "ball",
            "moved",
            vec![Value::from(Vector2::new(320.0, 180.0))],
        ),
        scripted(
            "ball",
            "moved",
            vec![Value::from(Vector2::new(700.0, 10.0))],
        ),
    ]
}

/// Read a JSON script of events.
pub fn load_script(path: &Path) -> Result<Vec<ScriptedEvent>, String> {
    let json = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read script {}: {}", path.display(), e))?;
    serde_json::from_str(&json).map_err(|e| format!("Failed to parse script {}: {}", path.display(), e))
}

fn paddle_listeners(registry: &MatcherRegistry, config: &GameConfig) -> Result<Listeners, EventError> {
    let mut listeners = Listeners::with_runner(config.event_runner());

    let hard = registry.matcher("more_than", &[Value::from(10)])?;
    listeners.on_matching("hit", hard, |args, events| {
        info!("Paddle took a hard hit ({:?})", args[0]);
        events.raise_event("shake", args.iter().cloned().collect());
        Ok(())
    });

    let soft = registry.matcher("between", &[Value::from(0), Value::from(10)])?;
    listeners.on_matching("hit", soft, |args, _| {
        info!("Paddle took a soft hit ({:?})", args[0]);
        Ok(())
    });

    listeners.on("shake", |args, _| {
        info!("Paddle shakes by {:?}", args.first());
        Ok(())
    });

    let mut elapsed = 0.0;
    listeners.on("update", move |args, _| {
        elapsed += args.first().and_then(Value::as_f64).unwrap_or(0.0);
        trace!("Paddle alive for {:.3}s", elapsed);
        Ok(())
    });

    Ok(listeners)
}

fn ball_listeners(registry: &MatcherRegistry, config: &GameConfig) -> Result<Listeners, EventError> {
    let mut listeners = Listeners::with_runner(config.event_runner());

    let lost = registry.matcher("outside", &[Value::from(PLAYFIELD)])?;
    listeners.on_matching("moved", lost, |args, events| {
        events.raise_event("lost", args.iter().cloned().collect());
        Ok(())
    });

    let on_screen = listeners.matching(|v| v.as_vector2().is_some_and(|p| PLAYFIELD.contains_point(p)));
    listeners.on_matching("moved", on_screen, |args, _| {
        debug!("Ball at {:?}", args[0]);
        Ok(())
    });

    listeners.on("lost", |args, _| {
        info!("Ball left the playfield at {:?}", args.first());
        Ok(())
    });

    Ok(listeners)
}

/// Spawn the demo objects and preload their images.
pub fn setup(world: &mut World) -> Result<(), String> {
    let registry = world.resource::<MatcherRegistry>().clone();
    let config = world.resource::<GameConfig>().clone();

    let paddle = paddle_listeners(&registry, &config).map_err(|e| e.to_string())?;
    let ball = ball_listeners(&registry, &config).map_err(|e| e.to_string())?;
    world.spawn((Group::new("paddle"), paddle));
    world.spawn((Group::new("ball"), ball));

    let mut images = world.non_send_resource_mut::<ImageCache>();
    for name in PRELOADED_IMAGES {
        let handle = images.lookup(name).map_err(|e| e.to_string())?;
        // checker pattern so the placeholders are distinguishable
        handle
            .borrow_mut()
            .map_with_pos_in_place(|x, y, c| if (x + y) % 2 == 0 { c } else { Color::BLACK });
        debug!("Prepared {} as {:?}", name, handle.borrow());
    }
    info!("Scene ready with {} cached image(s)", images.len());
    Ok(())
}

/// Raise each scripted event on the objects it targets.
pub fn raise_scripted(world: &mut World, script: &[ScriptedEvent]) {
    let mut query = world.query::<(&Group, &mut Listeners)>();
    for entry in script {
        let args: EventArgs = entry.args.iter().cloned().collect();
        let mut delivered = 0;
        for (group, mut listeners) in query.iter_mut(world) {
            if entry.target.as_deref().is_some_and(|t| t != group.name()) {
                continue;
            }
            listeners.raise_event(entry.event.as_str(), args.clone());
            delivered += 1;
        }
        if delivered == 0 {
            debug!("Scripted `{}` matched no object", entry.event);
        }
    }
}

/// Drop every cached image.
pub fn teardown(world: &mut World) {
    let mut images = world.non_send_resource_mut::<ImageCache>();
    let evicted = images.evict_if(|_, _| true);
    info!("Released {} image(s)", evicted);
}

/// Raise a single event on every object, mostly useful from tests.
pub fn broadcast(world: &mut World, event: &str, args: EventArgs) {
    raise_scripted(
        world,
        &[ScriptedEvent {
            target: None,
            event: event.to_string(),
            args: args.into_vec(),
        }],
    );
}
