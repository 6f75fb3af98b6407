//! Headless runner: builds a run from config and lets the autopilot play it.
//!
//! Usage: `cavern-crawler [config.json]`. Environment overrides from
//! [`SimConfig::apply_env`] apply on top of the file. Set `CAVERN_PROFILE=1`
//! to turn on puffin scopes.

use std::env;
use std::fs;

use anyhow::{Context, Result};
use tracing::info;

use cavern_crawler::autopilot::Autopilot;
use cavern_crawler::config::SimConfig;
use cavern_crawler::content::Content;
use cavern_crawler::engine::GameState;
use cavern_crawler::events::GameEvent;
use cavern_crawler::resources::ResourceManifest;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = load_config()?;
    puffin::set_scopes_on(env::var("CAVERN_PROFILE").is_ok_and(|v| v != "0"));

    let resources = ResourceManifest::builtin().context("loading resource manifest")?;
    let content = Content::builtin(&resources).context("loading content")?;

    let run = config.run.clone();
    let mut game = GameState::new(config, content).context("building first level")?;
    let mut pilot = Autopilot::new(game.run_seed);
    let mut kills = 0usize;

    for frame in 0..run.frames {
        puffin::GlobalProfiler::lock().new_frame();

        let intent = pilot.decide(&game.level, run.frame_ms);
        let report = game.update(intent, run.frame_ms);

        kills += game
            .level
            .drain_events()
            .into_iter()
            .filter(|event| matches!(event, GameEvent::EnemyKilled { .. }))
            .count();

        if run.hud_interval > 0 && frame % run.hud_interval == 0 {
            if let Some(hud) = game.level.hud() {
                info!(
                    frame,
                    floor = hud.floor,
                    health = hud.health,
                    armour = hud.armour,
                    gems = hud.gems.total(),
                    keys = hud.keys,
                    weapon = hud.weapon.as_deref().unwrap_or("-"),
                    ammo = ?hud.ammo,
                    "hud"
                );
            }
        }

        if report.player_dead {
            break;
        }
        if report.completed {
            game.advance_floor().context("building next floor")?;
        }
    }

    info!(floor = game.floor, kills, frames = game.level.frame(), "run finished");
    Ok(())
}

fn load_config() -> Result<SimConfig> {
    let mut config = match env::args().nth(1) {
        Some(path) => {
            let json = fs::read_to_string(&path).with_context(|| format!("reading {path}"))?;
            SimConfig::from_json(&json).with_context(|| format!("parsing {path}"))?
        }
        None => SimConfig::default(),
    };
    config
        .apply_env(|key| env::var(key).ok())
        .context("applying environment overrides")?;
    Ok(config)
}
