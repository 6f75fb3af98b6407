use cavern_crawler::autopilot::Autopilot;
use cavern_crawler::components::EntityKind;
use cavern_crawler::config::SimConfig;
use cavern_crawler::content::Content;
use cavern_crawler::engine::GameState;
use cavern_crawler::events::GameEvent;
use cavern_crawler::resources::ResourceManifest;
use cavern_crawler::systems::{DrawLayer, PlayerIntent};

const DT: f32 = 1000.0 / 60.0;

fn new_game(seed: u64) -> GameState {
    let resources = ResourceManifest::builtin().expect("manifest");
    let content = Content::builtin(&resources).expect("content");
    let mut config = SimConfig::default();
    config.cavern.seed = seed;
    GameState::new(config, content).expect("game")
}

#[test]
fn autopilot_run_keeps_invariants() {
    let mut game = new_game(11);
    let mut pilot = Autopilot::new(11);
    let mut failed = 0;

    for _ in 0..600 {
        let intent = pilot.decide(&game.level, DT);
        let report = game.update(intent, DT);
        failed += report.step.failed_callbacks;

        // Every listed entity is live in the ECS world and none is awaiting
        // the sweep once the frame is over
        let world = game.level.world();
        for &entity in game.level.entities() {
            assert!(world.contains(entity));
        }
        assert!(game.level.hud().is_some());

        if report.player_dead {
            break;
        }
        if report.completed {
            game.advance_floor().expect("next floor");
        }
    }
    assert_eq!(failed, 0);
}

#[test]
fn draw_list_is_sorted_and_tiles_come_first() {
    let mut game = new_game(5);
    game.update(PlayerIntent::default(), DT);

    let items = game.level.draw();
    let tiles = game.level.tiles().len();
    assert!(items.len() > tiles);
    assert!(items[..tiles].iter().all(|i| i.layer == DrawLayer::Tiles));
    assert!(items[tiles..].iter().all(|i| i.layer == DrawLayer::Actors));
    for pair in items[tiles..].windows(2) {
        assert!(pair[0].depth <= pair[1].depth);
    }
}

#[test]
fn same_seed_replays_identically() {
    let mut a = new_game(21);
    let mut b = new_game(21);
    let mut pilot_a = Autopilot::new(3);
    let mut pilot_b = Autopilot::new(3);

    for _ in 0..240 {
        let intent_a = pilot_a.decide(&a.level, DT);
        let intent_b = pilot_b.decide(&b.level, DT);
        assert_eq!(intent_a, intent_b);
        a.update(intent_a, DT);
        b.update(intent_b, DT);
    }
    assert_eq!(a.level.player_position(), b.level.player_position());
    assert_eq!(a.level.count_kind(EntityKind::Enemy), b.level.count_kind(EntityKind::Enemy));
}

#[test]
fn firing_emits_weapon_cue() {
    let mut game = new_game(8);
    let intent = PlayerIntent {
        aim: glam::Vec2::X,
        fire: true,
        ..PlayerIntent::default()
    };
    game.update(intent, DT);
    let events = game.level.drain_events();
    assert!(events
        .iter()
        .any(|e| matches!(e, GameEvent::WeaponFired { weapon, .. } if weapon == "pistol")));
    assert!(game.level.projectile_count() >= 1);
}
