use std::io::Cursor;

use glam::Vec2;

use mirra::{Direction, HostEvent, Intent, Slot};
use mirra_client::replay::run_replay;
use mirra_client::scene::Palette;
use mirra_client::{ClientConfig, Session};

fn mount(player_id: u64) -> Session {
    let mut config = ClientConfig::default();
    config.mount.player_id = Some(player_id);
    Session::mount(&config).unwrap()
}

fn entities_updated(json: &str) -> HostEvent {
    HostEvent::from_json(json).unwrap()
}

#[test]
fn first_snapshot_builds_scene() {
    let mut session = mount(7);
    session.handle_host_event(entities_updated(
        r#"{"event": "entities_updated", "player_id": "7", "entities": [
            {"id": 7, "name": "Player 7", "shape": "circle", "radius": 40,
             "category": "player", "x": 100, "y": 200, "visible_players": []},
            {"id": 9, "name": "Lake", "shape": "polygon", "coords": [[0,0],[50,0],[50,50],[0,50]],
             "category": "obstacle", "type": "lake", "x": 300, "y": 300}
        ]}"#,
    ));

    let registry = session.registry();
    assert_eq!(registry.len(), 2);

    let palette = Palette::default();
    let player = registry.get(7).unwrap();
    assert_eq!(player.handle.depth, 10);
    assert_eq!(player.handle.fill, palette.current_player);
    assert_eq!(player.position, Vec2::new(100.0, 200.0));

    let lake = registry.get(9).unwrap();
    assert_eq!(lake.handle.depth, 1);
    assert_eq!(lake.handle.fill, palette.lake);

    let order: Vec<_> = registry.draw_order().iter().map(|p| p.id).collect();
    assert_eq!(order, [9, 7]);
}

#[test]
fn players_outside_view_are_never_drawn() {
    let mut session = mount(1);
    session.handle_host_event(entities_updated(
        r#"{"event": "entities_updated", "player_id": 1, "entities": [
            {"id": 1, "shape": "circle", "radius": 10, "category": "player", "x": 0, "y": 0,
             "visible_players": [2]},
            {"id": 2, "shape": "circle", "radius": 10, "category": "player", "x": 5, "y": 5},
            {"id": 3, "shape": "circle", "radius": 10, "category": "player", "x": 9, "y": 9},
            {"id": 4, "shape": "circle", "radius": 3, "category": "projectile", "x": 1, "y": 1,
             "is_colliding": true}
        ]}"#,
    ));

    let registry = session.registry();
    assert!(registry.contains(2));
    assert!(!registry.contains(3));
    assert_eq!(registry.get(2).unwrap().handle.fill, Palette::default().players);
    assert_eq!(registry.get(4).unwrap().handle.fill, Palette::default().colliding);
}

#[test]
fn proxies_converge_geometrically() {
    let mut session = mount(1);
    let at = |x: f32| {
        entities_updated(&format!(
            r#"{{"event": "entities_updated", "player_id": 1, "entities": [
                {{"id": 5, "shape": "circle", "radius": 2, "category": "item", "x": {}, "y": 0}}
            ]}}"#,
            x
        ))
    };

    session.handle_host_event(at(0.0));
    session.handle_host_event(at(100.0));

    let easing: f32 = 0.4;
    for n in 1..=12 {
        session.frame();
        let expected = 100.0 * (1.0 - easing).powi(n);
        let distance = session.registry().get(5).unwrap().distance_to_target();
        assert!(
            (distance - expected).abs() < 1e-3,
            "after {} frames: {} vs {}",
            n,
            distance,
            expected
        );
    }
}

#[test]
fn key_fallback_and_actions() {
    let mut session = mount(1);
    session.key_down('w', false);
    session.key_down('d', false);
    session.key_up('d');
    session.key_up('w');
    session.key_down('o', false);
    session.key_down('l', false);

    assert_eq!(
        session.drain_intents(),
        vec![
            Intent::Move(Direction::new(0.0, -1.0)),
            Intent::Move(Direction::new(1.0, 0.0)),
            Intent::Move(Direction::new(0.0, -1.0)),
            Intent::Move(Direction::new(0.0, 0.0)),
            Intent::Attack(Slot(2)),
            Intent::UseItem(Slot(1)),
        ]
    );
}

#[test]
fn replay_script_drives_session() {
    let script = r#"
        # spawn, toggle overlay, then move
        {"event": "joined_game", "map": {"radius": 5000}}
        {"event": "entities_updated", "player_id": 1, "entities": [{"id": 1, "name": "Me", "shape": "circle", "radius": 5, "category": "player", "x": 10, "y": 0}]}
        {"event": "debug_mode_toggled"}
        {"key": "a"}
        {"frames": 3}
        {"key": "a", "pressed": false}
        {"event": "entities_updated", "player_id": 1, "entities": []}
    "#;

    let mut session = mount(1);
    let mut out = Vec::new();
    let summary = run_replay(&mut session, Cursor::new(script), 2, &mut out).unwrap();

    assert_eq!(summary.lines, 7);
    assert_eq!(summary.frames, 2 * 4 + 3);
    assert_eq!(summary.intents.len(), 2);
    assert_eq!(summary.stats.proxies_created, 1);
    assert_eq!(summary.stats.proxies_removed, 1);
    assert_eq!(summary.proxies, 0);

    let printed = String::from_utf8(out).unwrap();
    let lines: Vec<_> = printed.lines().collect();
    assert_eq!(
        lines,
        [
            r#"{"event":"move","payload":{"x":-1.0,"y":0.0}}"#,
            r#"{"event":"move","payload":{"x":0.0,"y":0.0}}"#,
        ]
    );
}

#[test]
fn replay_reports_bad_line() {
    let mut session = mount(1);
    let err = run_replay(
        &mut session,
        Cursor::new("{\"frames\": 1}\n{\"event\": \"chat\"}\n"),
        1,
        Vec::new(),
    )
    .unwrap_err();
    assert!(err.to_string().starts_with("line 2:"));
}

#[test]
fn malformed_entity_does_not_block_snapshot() {
    let mut session = mount(1);
    session.handle_host_event(entities_updated(
        r#"{"event": "entities_updated", "player_id": 1, "entities": [
            {"id": 1, "shape": "circle", "radius": 10, "category": "player", "x": 0, "y": 0},
            {"id": 2, "shape": "circle", "radius": 2, "category": "item", "x": 4, "y": 4},
            {"id": 3, "shape": "polygon", "coords": [[0,0],[10,0]], "category": "obstacle", "x": 0, "y": 0}
        ]}"#,
    ));

    let registry = session.registry();
    assert_eq!(registry.len(), 2);
    assert!(registry.contains(1));
    assert!(registry.contains(2));
    assert!(!registry.contains(3));

    let script = concat!(
        r#"{"event": "entities_updated", "player_id": 1, "entities": [{"id": 5, "shape": "star", "category": "item", "x": 0, "y": 0}, {"id": 6, "shape": "circle", "radius": 1, "category": "trap", "x": 0, "y": 0}]}"#,
        "\n",
        r#"{"frames": 2}"#,
        "\n",
    );
    let summary = run_replay(&mut session, Cursor::new(script), 1, Vec::new()).unwrap();
    assert_eq!(summary.lines, 2);
    assert_eq!(summary.proxies, 1);
    assert!(session.registry().contains(6));
}
