use std::cell::RefCell;
use std::f64::consts::{FRAC_PI_4, PI, TAU};
use std::rc::Rc;

use gridcast::audio::{AudioSink, Silent, SoundCue};
use gridcast::grid::GridMap;
use gridcast::input::InputState;
use gridcast::player::{DamageSource, EventKind, Player, PlayerEvent};

#[derive(Debug, Clone, Copy, PartialEq)]
enum Played {
    Play(SoundCue),
    Stop(SoundCue),
}

#[derive(Default)]
struct Recording(Vec<Played>);

impl AudioSink for Recording {
    fn play(&mut self, cue: SoundCue, _looped: bool, _volume: f32) {
        self.0.push(Played::Play(cue));
    }

    fn stop(&mut self, cue: SoundCue) {
        self.0.push(Played::Stop(cue));
    }
}

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn direction_wraps_and_pitch_clamps() {
    let mut player = Player::new(0.0, 0.0, -PI);
    assert!(approx(player.direction, PI));

    player.rotate_h(-PI - 0.5);
    assert!(approx(player.direction, TAU - 0.5));
    player.rotate_h(1.0);
    assert!(approx(player.direction, 0.5));

    player.rotate_v(3.0);
    assert_eq!(player.direction_v, 1.0);
    player.rotate_v(-5.0);
    assert_eq!(player.direction_v, -1.0);
}

#[test]
fn walls_block_movement() {
    let map = GridMap::with_border(5, 5).unwrap();
    let mut player = Player::new(1.5, 1.5, PI);
    player.walk(1.0, 0.0, &map);
    assert_eq!(player.x, 1.5);
    assert!(approx(player.y, 1.5));
    assert_eq!(player.paces, 1.0);
}

#[test]
fn blocked_axis_slides_along_the_wall() {
    let map = GridMap::with_border(5, 5).unwrap();
    let mut player = Player::new(1.2, 2.5, 3.0 * FRAC_PI_4);
    player.walk(0.5, 0.0, &map);
    assert_eq!(player.x, 1.2);
    assert!(player.y > 2.8);
}

#[test]
fn outside_the_map_is_open() {
    let map = GridMap::new(2, 2).unwrap();
    let mut player = Player::new(1.5, 1.5, 0.0);
    player.walk(1.0, 0.0, &map);
    assert_eq!(player.x, 2.5);
}

#[test]
fn update_walks_and_runs_by_speed() {
    let map = GridMap::new(10, 10).unwrap();
    let mut audio = Silent;

    let mut player = Player::new(5.5, 5.5, 0.0);
    let mut input = InputState {
        forward: true,
        ..InputState::default()
    };
    player.update(&mut input, &map, 0.5, &mut audio);
    assert!(player.is_moving);
    assert!(approx(player.x, 5.5 + 2.7 * 0.5));

    let mut runner = Player::new(5.5, 5.5, 0.0);
    input.run = true;
    runner.update(&mut input, &map, 0.5, &mut audio);
    assert!(approx(runner.x, 5.5 + 2.7 * 1.5 * 0.5));

    let mut back = Player::new(5.5, 5.5, 0.0);
    let mut input = InputState {
        backward: true,
        ..InputState::default()
    };
    back.update(&mut input, &map, 1.0, &mut audio);
    assert!(approx(back.x, 5.5 - 2.7));
}

#[test]
fn opposing_keys_cancel() {
    let map = GridMap::new(10, 10).unwrap();
    let mut player = Player::new(5.5, 5.5, 0.0);
    let mut input = InputState {
        left: true,
        right: true,
        ..InputState::default()
    };
    player.update(&mut input, &map, 1.0, &mut Silent);
    assert!(!player.is_moving);
    assert_eq!((player.x, player.y), (5.5, 5.5));
}

#[test]
fn mouse_deltas_are_consumed() {
    let map = GridMap::new(10, 10).unwrap();
    let mut player = Player::new(5.5, 5.5, 0.0);
    let mut input = InputState::default();
    input.apply_mouse(15.0, 0.0, 50.0);

    player.update(&mut input, &map, 1.0, &mut Silent);
    assert!(approx(player.direction, PI));
    assert!(player.is_rotating);
    assert_eq!(input.rotate_x, 0.0);

    player.update(&mut input, &map, 1.0, &mut Silent);
    assert!(!player.is_rotating);
    assert!(approx(player.direction, PI));
}

#[test]
fn locked_or_map_view_freezes_the_player() {
    let map = GridMap::new(10, 10).unwrap();
    let mut input = InputState {
        forward: true,
        rotate_x: 10.0,
        ..InputState::default()
    };

    let mut locked = Player::new(5.5, 5.5, 0.0);
    locked.lock_controls = true;
    locked.update(&mut input, &map, 1.0, &mut Silent);
    assert_eq!((locked.x, locked.direction), (5.5, 0.0));

    let mut viewing = Player::new(5.5, 5.5, 0.0);
    input.map = true;
    viewing.update(&mut input, &map, 1.0, &mut Silent);
    assert_eq!((viewing.x, viewing.direction), (5.5, 0.0));
    assert!(!viewing.is_moving);
}

#[test]
fn footstep_cues_follow_the_gait() {
    let map = GridMap::new(10, 10).unwrap();
    let mut audio = Recording::default();
    let mut player = Player::new(5.5, 5.5, 0.0);
    let mut input = InputState::default();

    input.forward = true;
    player.update(&mut input, &map, 0.1, &mut audio);
    player.update(&mut input, &map, 0.1, &mut audio);
    input.run = true;
    player.update(&mut input, &map, 0.1, &mut audio);
    input = InputState::default();
    player.update(&mut input, &map, 0.1, &mut audio);

    assert_eq!(
        audio.0,
        vec![
            Played::Play(SoundCue::Walk),
            Played::Play(SoundCue::Run),
            Played::Stop(SoundCue::Walk),
            Played::Stop(SoundCue::Run),
        ]
    );
}

#[test]
fn damage_notifies_listeners_and_dies_once() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let mut player = Player::new(0.0, 0.0, 0.0);
    for kind in [EventKind::Damaged, EventKind::Died] {
        let seen = Rc::clone(&seen);
        player.on(kind, move |event| seen.borrow_mut().push(*event));
    }

    player.damage(60.0, DamageSource::World);
    assert!(!player.is_dead());
    player.damage(60.0, DamageSource::Actor(3));
    assert!(player.is_dead());
    player.damage(10.0, DamageSource::World);

    let kinds: Vec<_> = seen.borrow().iter().map(PlayerEvent::kind).collect();
    assert_eq!(
        kinds,
        vec![
            EventKind::Damaged,
            EventKind::Damaged,
            EventKind::Died,
            EventKind::Damaged,
        ]
    );
    assert_eq!(
        seen.borrow()[2],
        PlayerEvent::Died {
            source: DamageSource::Actor(3)
        }
    );
}
