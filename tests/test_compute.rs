use arena_shooter::compute::*;
use arena_shooter::config::GameConfig;
use arena_shooter::entities::*;
use arena_shooter::events::Sound;
use arena_shooter::input::InputSnapshot;
use arena_shooter::spawner::{wave_hit_points, wave_size};

use approx::assert_relative_eq;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rstest::rstest;

/// A running game with one motionless enemy parked in the top-left corner,
/// far from the player and out of the line of fire, so the wave never clears
/// by accident.
fn make_state() -> GameState {
    let mut s = init_state(GameConfig::default());
    s.status = GameStatus::Running;
    s.enemies.push(parked_enemy());
    s
}

fn parked_enemy() -> Enemy {
    Enemy::new(5.0, 5.0, 0.0, 6.0, 1, EnemyKind::Grunt)
}

/// A motionless bullet sitting at `(x, y)`.
fn still_bullet(x: f32, y: f32) -> Bullet {
    Bullet {
        x,
        y,
        vx: 0.0,
        vy: 0.0,
        radius: 4.0,
        life: 1.0,
        heading: 0.0,
    }
}

fn seeded_rng() -> StdRng {
    StdRng::seed_from_u64(42)
}

fn no_input() -> InputSnapshot {
    InputSnapshot::default()
}

fn count(sounds: &[Sound], wanted: Sound) -> usize {
    sounds.iter().filter(|&&s| s == wanted).count()
}

// ── init_state ────────────────────────────────────────────────────────────────

#[test]
fn init_state_is_idle_with_centred_player() {
    let s = init_state(GameConfig::default());
    assert_eq!(s.status, GameStatus::Idle);
    assert_eq!(s.player.x, 480.0); // width / 2
    assert_eq!(s.player.y, 320.0); // height / 2
    assert_eq!(s.player.health, 100.0);
    assert_eq!(s.wave, 1);
    assert_eq!(s.score, 0);
}

#[test]
fn init_state_empty_collections() {
    let s = init_state(GameConfig::default());
    assert!(s.enemies.is_empty());
    assert!(s.bullets.is_empty());
    assert!(s.powerups.is_empty());
    assert!(s.particles.is_empty());
    assert!(s.sounds.is_empty());
}

#[test]
fn frame_does_nothing_while_idle() {
    let mut s = init_state(GameConfig::default());
    let mut rng = seeded_rng();
    let fire = InputSnapshot {
        fire_key: true,
        right: true,
        ..Default::default()
    };
    assert!(frame(&mut s, &fire, 0.016, &mut rng).is_none());
    assert_eq!(s.time, 0.0);
    assert_eq!(s.player.x, 480.0);
    assert!(s.bullets.is_empty());
}

// ── start_game ────────────────────────────────────────────────────────────────

#[test]
fn start_game_spawns_first_wave() {
    let mut s = init_state(GameConfig::default());
    start_game(&mut s, &mut seeded_rng());
    assert_eq!(s.status, GameStatus::Running);
    assert_eq!(s.wave, 1);
    assert_eq!(s.enemies.len(), 7); // 6 + floor(1 × 1.5)
    assert_eq!(s.sounds, vec![Sound::GameStart]);
}

#[test]
fn start_game_resets_previous_game() {
    let mut s = make_state();
    s.status = GameStatus::GameOver;
    s.score = 420;
    s.wave = 6;
    s.time = 99.0;
    s.score_submitted = true;
    s.player.health = 0.0;
    s.player.x = 10.0;
    s.bullets.push(still_bullet(100.0, 100.0));
    s.powerups
        .push(PowerUp::new(50.0, 50.0, PowerUpKind::Heart, 0.0, &s.config.powerups));
    let spark = Rgb { r: 255, g: 209, b: 102 };
    s.particles
        .extend((0..5).map(|i| Particle::new(300.0, 300.0, i as f32, 80.0, 0.6, spark, 2.0)));

    start_game(&mut s, &mut seeded_rng());

    assert_eq!(s.status, GameStatus::Running);
    assert_eq!(s.score, 0);
    assert_eq!(s.wave, 1);
    assert_eq!(s.time, 0.0);
    assert!(!s.score_submitted);
    assert_eq!(s.player.health, s.player.max_health);
    assert_eq!(s.player.x, 480.0);
    assert!(s.bullets.is_empty());
    assert!(s.powerups.is_empty());
    assert!(s.particles.is_empty());
    assert_eq!(s.enemies.len(), 7);
}

#[test]
fn start_game_is_reproducible_with_same_seed() {
    let mut a = init_state(GameConfig::default());
    let mut b = init_state(GameConfig::default());
    start_game(&mut a, &mut StdRng::seed_from_u64(7));
    start_game(&mut b, &mut StdRng::seed_from_u64(7));
    let pos = |s: &GameState| s.enemies.iter().map(|e| (e.x, e.y)).collect::<Vec<_>>();
    assert_eq!(pos(&a), pos(&b));
}

// ── pause ─────────────────────────────────────────────────────────────────────

#[test]
fn toggle_pause_round_trip() {
    let mut s = make_state();
    assert!(toggle_pause(&mut s));
    assert_eq!(s.status, GameStatus::Paused);
    assert!(s.is_paused());
    assert!(s.is_running());
    assert!(toggle_pause(&mut s));
    assert_eq!(s.status, GameStatus::Running);
}

#[rstest]
#[case(GameStatus::Idle)]
#[case(GameStatus::GameOver)]
fn toggle_pause_ignored_outside_a_game(#[case] status: GameStatus) {
    let mut s = make_state();
    s.status = status;
    assert!(!toggle_pause(&mut s));
    assert_eq!(s.status, status);
}

#[test]
fn paused_frames_freeze_the_world() {
    let mut s = make_state();
    s.enemies
        .push(Enemy::new(100.0, 320.0, 80.0, 10.0, 1, EnemyKind::Runner));
    let mut rng = seeded_rng();

    let pause = InputSnapshot {
        pause_pressed: true,
        ..Default::default()
    };
    assert!(frame(&mut s, &pause, 0.016, &mut rng).is_none());
    assert_eq!(s.status, GameStatus::Paused);

    let moving = InputSnapshot {
        right: true,
        fire_key: true,
        ..Default::default()
    };
    for _ in 0..10 {
        assert!(frame(&mut s, &moving, 0.016, &mut rng).is_none());
    }
    assert_eq!(s.time, 0.0);
    assert_eq!(s.player.x, 480.0);
    assert_eq!(s.enemies[1].x, 100.0);
    assert!(s.bullets.is_empty());

    // Second press resumes and the same frame ticks.
    assert!(frame(&mut s, &pause, 0.016, &mut rng).is_some());
    assert_eq!(s.status, GameStatus::Running);
    assert!(s.enemies[1].x > 100.0);
}

// ── clock ─────────────────────────────────────────────────────────────────────

#[rstest]
#[case(0.016, 0.016)]
#[case(0.033, 0.033)]
#[case(0.5, 0.033)]
#[case(-1.0, 0.0)]
#[case(f32::NAN, 0.0)]
#[case(f32::INFINITY, 0.0)]
fn clamp_dt_cases(#[case] raw: f32, #[case] expected: f32) {
    assert_eq!(clamp_dt(raw, 0.033), expected);
}

#[test]
fn frame_clamps_long_stalls() {
    let mut s = make_state();
    let right = InputSnapshot {
        right: true,
        ..Default::default()
    };
    frame(&mut s, &right, 1.0, &mut seeded_rng());
    assert_relative_eq!(s.time, 0.033);
    assert_relative_eq!(s.player.x, 480.0 + 230.0 * 0.033, epsilon = 1e-3);
}

#[test]
fn time_accumulates_per_frame() {
    let mut s = make_state();
    let mut rng = seeded_rng();
    for _ in 0..10 {
        frame(&mut s, &no_input(), 0.02, &mut rng);
    }
    assert_relative_eq!(s.time, 0.2, epsilon = 1e-4);
}

// ── tick: firing ─────────────────────────────────────────────────────────────

fn shots_fired(state: &mut GameState, ticks: usize, dt: f32) -> usize {
    let mut rng = seeded_rng();
    let fire = InputSnapshot {
        fire_key: true,
        ..Default::default()
    };
    for _ in 0..ticks {
        tick(state, &fire, dt, &mut rng);
    }
    count(&state.sounds, Sound::Shoot)
}

#[test]
fn holding_fire_respects_reload() {
    // 1.4 s at a 0.14 s reload: one shot every 7–8 ticks.
    let shots = shots_fired(&mut make_state(), 70, 0.02);
    assert!((9..=11).contains(&shots), "fired {shots} shots");
}

#[test]
fn fire_rate_buff_shortens_reload() {
    let mut plain = make_state();
    let mut buffed = make_state();
    let boost = buffed.config.powerups.firerate.clone();
    buffed.player.buffs.grant_fire_rate(&boost);

    let plain_shots = shots_fired(&mut plain, 70, 0.02);
    let buffed_shots = shots_fired(&mut buffed, 70, 0.02);
    assert!((17..=19).contains(&buffed_shots), "fired {buffed_shots} shots");
    assert!(buffed_shots > plain_shots);
}

#[test]
fn fired_bullet_leaves_from_the_muzzle() {
    let mut s = make_state();
    let fire = InputSnapshot {
        fire_key: true,
        ..Default::default()
    };
    tick(&mut s, &fire, 0.01, &mut seeded_rng());
    assert_eq!(s.bullets.len(), 1);
    let b = &s.bullets[0];
    // Muzzle at +18 along aim 0, then one step of flight.
    assert_relative_eq!(b.x, 480.0 + 18.0 + 520.0 * 0.01, epsilon = 1e-3);
    assert_relative_eq!(b.y, 320.0);
}

#[test]
fn bullets_expire() {
    let mut s = make_state();
    s.bullets.push(still_bullet(300.0, 500.0));
    let mut rng = seeded_rng();
    for _ in 0..60 {
        tick(&mut s, &no_input(), 0.02, &mut rng);
    }
    assert!(s.bullets.is_empty());
}

// ── tick: enemies & waves ────────────────────────────────────────────────────

#[test]
fn enemies_home_on_player() {
    let mut s = make_state();
    s.enemies
        .push(Enemy::new(100.0, 320.0, 60.0, 10.0, 1, EnemyKind::Tank));
    let before = 480.0 - 100.0;
    tick(&mut s, &no_input(), 0.1, &mut seeded_rng());
    let after = s.player.x - s.enemies[1].x;
    assert_relative_eq!(before - after, 6.0, epsilon = 1e-3);
}

#[test]
fn killing_last_enemy_advances_wave() {
    let mut s = init_state(GameConfig::default());
    s.status = GameStatus::Running;
    s.enemies
        .push(Enemy::new(700.0, 320.0, 0.0, 10.0, 1, EnemyKind::Grunt));
    s.bullets.push(still_bullet(700.0, 320.0));

    let res = tick(&mut s, &no_input(), 0.01, &mut seeded_rng());

    assert_eq!(res.kills, 1);
    assert_eq!(s.score, 10);
    assert_eq!(s.wave, 2);
    assert_eq!(s.enemies.len(), wave_size(&s.config.enemy, 2));
    assert!(s
        .enemies
        .iter()
        .all(|e| e.hit_points == wave_hit_points(&s.config.enemy, 2)));
}

#[test]
fn killing_one_of_several_enemies_keeps_the_wave() {
    let mut s = make_state();
    s.enemies
        .push(Enemy::new(700.0, 320.0, 0.0, 10.0, 1, EnemyKind::Grunt));
    s.bullets.push(still_bullet(700.0, 320.0));

    let res = tick(&mut s, &no_input(), 0.01, &mut seeded_rng());

    assert_eq!(res.kills, 1);
    assert_eq!(s.score, 10);
    assert_eq!(s.wave, 1);
    assert_eq!(s.enemies.len(), 1);
    assert_eq!((s.enemies[0].x, s.enemies[0].y), (5.0, 5.0));
}

#[test]
fn dead_enemies_are_pruned_before_they_can_touch_the_player() {
    let mut s = make_state();
    let mut corpse = Enemy::new(480.0, 320.0, 0.0, 10.0, 1, EnemyKind::Grunt);
    corpse.dead = true;
    s.enemies.push(corpse);

    let res = tick(&mut s, &no_input(), 0.01, &mut seeded_rng());

    assert!(!res.player_hurt);
    assert_eq!(s.player.health, 100.0);
    assert_eq!(s.enemies.len(), 1);
}

// ── tick: death ──────────────────────────────────────────────────────────────

#[test]
fn lethal_contact_ends_game_with_zero_health() {
    let mut s = make_state();
    s.player.health = 10.0;
    s.enemies
        .push(Enemy::new(480.0, 320.0, 0.0, 10.0, 1, EnemyKind::Grunt));

    let res = frame(&mut s, &no_input(), 0.01, &mut seeded_rng());

    assert_eq!(res.map(|r| r.player_killed), Some(true));
    assert_eq!(s.status, GameStatus::GameOver);
    assert_eq!(s.player.health, 0.0);
    assert_eq!(count(&s.sounds, Sound::PlayerDie), 1);
    assert_eq!(count(&s.sounds, Sound::Explosion), 1);
    assert_eq!(count(&s.sounds, Sound::GameOver), 1);
}

#[test]
fn game_over_happens_once() {
    let mut s = make_state();
    s.player.health = 1.0;
    s.enemies
        .push(Enemy::new(480.0, 320.0, 0.0, 10.0, 1, EnemyKind::Grunt));
    let mut rng = seeded_rng();
    frame(&mut s, &no_input(), 0.01, &mut rng);
    let queued = s.sounds.len();

    end_game(&mut s);
    assert!(frame(&mut s, &no_input(), 0.01, &mut rng).is_none());
    assert_eq!(s.sounds.len(), queued);
    assert_eq!(s.status, GameStatus::GameOver);
}

#[test]
fn drain_sounds_empties_queue() {
    let mut s = init_state(GameConfig::default());
    start_game(&mut s, &mut seeded_rng());
    assert_eq!(s.drain_sounds(), vec![Sound::GameStart]);
    assert!(s.sounds.is_empty());
}

// ── claim_submission ──────────────────────────────────────────────────────────

fn finished_game(score: u32) -> GameState {
    let mut s = make_state();
    s.score = score;
    s.wave = 3;
    s.status = GameStatus::GameOver;
    s
}

#[test]
fn claim_submission_once_per_game() {
    let mut s = finished_game(120);
    let entry = claim_submission(&mut s, "  Ada ", 1_000).expect("first claim succeeds");
    assert_eq!(entry.name, "Ada");
    assert_eq!(entry.score, 120);
    assert_eq!(entry.wave, 3);
    assert_eq!(entry.timestamp, 1_000);
    assert!(s.score_submitted);
    assert!(claim_submission(&mut s, "Ada", 2_000).is_none());
}

#[test]
fn claim_submission_rejects_blank_name_and_zero_score() {
    assert!(claim_submission(&mut finished_game(120), "   ", 0).is_none());
    assert!(claim_submission(&mut finished_game(0), "Ada", 0).is_none());
}

#[test]
fn claim_submission_requires_game_over() {
    let mut s = make_state();
    s.score = 50;
    assert!(claim_submission(&mut s, "Ada", 0).is_none());
    assert!(!s.score_submitted);
}

#[test]
fn restart_allows_a_new_submission() {
    let mut s = finished_game(120);
    assert!(claim_submission(&mut s, "Ada", 0).is_some());
    start_game(&mut s, &mut seeded_rng());
    s.score = 30;
    s.status = GameStatus::GameOver;
    assert!(claim_submission(&mut s, "Ada", 0).is_some());
}
