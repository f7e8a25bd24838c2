use std::collections::BTreeMap;

use mirra::{
    Action, DecodeError, Direction, GameAction, GameEvent, GameState, InboundKind, LobbyEvent,
    Message, Player, Position, ServerMessage,
};

const ENCODED_STATE: [u8; 21] = [
    0x0a, 0x02, b'g', b'1', // game_id
    0x12, 0x0f, // players entry
    0x08, 0x07, // key
    0x12, 0x0b, // value
    0x08, 0x07, // id
    0x1a, 0x05, 0x0d, 0x00, 0x00, 0x80, 0x3f, // position { x: 1.0 }
    0x28, 0x64, // life
];

fn sample_state() -> GameState {
    let mut players = BTreeMap::new();
    players.insert(
        7,
        Player {
            id: 7,
            speed: 0.0,
            position: Some(Position { x: 1.0, y: 0.0 }),
            size: 0.0,
            life: 100,
        },
    );
    GameState {
        game_id: "g1".to_string(),
        players,
    }
}

#[test]
fn game_state_matches_reference_bytes() {
    assert_eq!(sample_state().encode_to_vec(), ENCODED_STATE);
    assert_eq!(GameState::decode(&ENCODED_STATE).unwrap(), sample_state());
}

#[test]
fn every_variant_roundtrips() {
    let state = sample_state();

    let event = GameEvent {
        game_state: Some(state.clone()),
    };
    assert_eq!(GameEvent::decode(&event.encode_to_vec()).unwrap(), event);

    let lobby = LobbyEvent {
        game: Some(state.clone()),
    };
    assert_eq!(LobbyEvent::decode(&lobby.encode_to_vec()).unwrap(), lobby);

    let direction = Direction::new(0.70710677, -0.70710677);
    assert_eq!(Direction::decode(&direction.encode_to_vec()).unwrap(), direction);

    let action = GameAction::movement(direction);
    assert_eq!(GameAction::decode(&action.encode_to_vec()).unwrap(), action);

    let player = Player {
        id: u64::MAX,
        speed: f32::MAX,
        position: Some(Position {
            x: f32::MIN,
            y: 1e-30,
        }),
        size: 0.5,
        life: u64::MAX,
    };
    assert_eq!(Player::decode(&player.encode_to_vec()).unwrap(), player);
}

#[test]
fn unknown_fields_are_skipped() {
    let mut data = vec![0x48, 0x01]; // field 9, varint
    data.extend_from_slice(&[0x08, 0x07]); // id
    data.extend_from_slice(&[0x52, 0x02, 0xaa, 0xbb]); // field 10, bytes
    data.extend_from_slice(&[0x61, 0, 0, 0, 0, 0, 0, 0, 0]); // field 12, fixed64
    data.extend_from_slice(&[0x28, 0x64]); // life

    let player = Player::decode(&data).unwrap();
    assert_eq!(player.id, 7);
    assert_eq!(player.life, 100);
    assert_eq!(player.position, None);
}

#[test]
fn truncated_frames_are_rejected() {
    for len in [1, 5, 10, 20] {
        let err = GameState::decode(&ENCODED_STATE[..len]).unwrap_err();
        assert_eq!(err, DecodeError::Truncated, "prefix of {} bytes", len);
    }
}

#[test]
fn later_fields_win_for_repeated_scalars() {
    // x = 1.0, then x = 2.0
    let data = [0x0d, 0x00, 0x00, 0x80, 0x3f, 0x0d, 0x00, 0x00, 0x00, 0x40];
    assert_eq!(Direction::decode(&data).unwrap().x, 2.0);
}

#[test]
fn server_message_dispatch() {
    let frame = GameEvent {
        game_state: Some(sample_state()),
    }
    .encode_to_vec();

    let message = ServerMessage::decode(InboundKind::GameEvent, &frame).unwrap();
    assert_eq!(message.game_state().map(|s| s.game_id.as_str()), Some("g1"));

    let raw_state = ServerMessage::decode(InboundKind::GameState, &ENCODED_STATE).unwrap();
    assert!(matches!(raw_state, ServerMessage::GameState(ref s) if s.players.len() == 1));
}

#[test]
fn attack_action_payload() {
    let action = GameAction::attack("basic");
    let encoded = action.encode_to_vec();
    assert_eq!(encoded, [0x12, 0x07, 0x0a, 0x05, b'b', b'a', b's', b'i', b'c']);

    match GameAction::decode(&encoded).unwrap().action {
        Some(Action::Attack(attack)) => assert_eq!(attack.skill, "basic"),
        other => panic!("unexpected action {:?}", other),
    }
}
