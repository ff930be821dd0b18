/// Game state machine and the per-frame simulation driver.
///
/// Every function takes the state by mutable reference and, where needed, an
/// injected RNG.  Side effects are limited to the state itself (including its
/// sound queue) and the RNG, so callers control determinism by seeding.
///
/// ```text
/// Idle ──start──▶ Running ◀──toggle_pause──▶ Paused
///                    │
///              health ≤ 0
///                    ▼
///                GameOver ──start──▶ Running
/// ```

use rand::Rng;

use crate::collision::{resolve, Resolution};
use crate::config::GameConfig;
use crate::entities::{GameState, GameStatus, Player};
use crate::events::Sound;
use crate::input::InputSnapshot;
use crate::leaderboard::ScoreEntry;
use crate::spawner::spawn_wave;

// ── Constructors ──────────────────────────────────────────────────────────────

/// A new, idle game.  Nothing moves until [`start_game`] is called.
pub fn init_state(config: GameConfig) -> GameState {
    let player = centred_player(&config);
    GameState {
        player,
        bullets: Vec::new(),
        enemies: Vec::new(),
        powerups: Vec::new(),
        particles: Vec::new(),
        score: 0,
        wave: 1,
        time: 0.0,
        status: GameStatus::Idle,
        config,
        sounds: Vec::new(),
        score_submitted: false,
    }
}

fn centred_player(config: &GameConfig) -> Player {
    Player::new(
        config,
        config.playfield.width / 2.0,
        config.playfield.height / 2.0,
    )
}

// ── Transitions ───────────────────────────────────────────────────────────────

/// Begin a fresh game: everything is replaced, wave 1 is spawned.
///
/// Accepted from any status, so it doubles as "restart".
pub fn start_game(state: &mut GameState, rng: &mut impl Rng) {
    state.player = centred_player(&state.config);
    state.bullets.clear();
    state.enemies.clear();
    state.powerups.clear();
    state.particles.clear();
    state.score = 0;
    state.wave = 1;
    state.time = 0.0;
    state.score_submitted = false;
    state.enemies = spawn_wave(&state.config.enemy, &state.config.playfield, state.wave, rng);
    state.status = GameStatus::Running;
    state.sounds.push(Sound::GameStart);
    log::info!("game started with {} enemies", state.enemies.len());
}

/// Flip between running and paused.  Does nothing outside a game.
///
/// Returns true if the call changed the status.
pub fn toggle_pause(state: &mut GameState) -> bool {
    state.status = match state.status {
        GameStatus::Running => GameStatus::Paused,
        GameStatus::Paused => GameStatus::Running,
        GameStatus::Idle | GameStatus::GameOver => return false,
    };
    log::debug!("pause toggled: {:?}", state.status);
    true
}

/// Stop the simulation after the player died.  Only the first call has any
/// effect, so the end-of-game cues are queued exactly once.
pub fn end_game(state: &mut GameState) {
    if !state.is_running() {
        return;
    }
    state.status = GameStatus::GameOver;
    state
        .sounds
        .extend([Sound::PlayerDie, Sound::Explosion, Sound::GameOver]);
    log::info!(
        "game over: score {} on wave {} after {:.1}s",
        state.score,
        state.wave,
        state.time
    );
}

// ── Per-frame driver ──────────────────────────────────────────────────────────

/// Drive one host frame.
///
/// Handles the pause edge, clamps `raw_dt` (seconds since the previous frame)
/// to `clock.max_dt` and ticks the simulation unless paused or not running.
/// Returns the tick's collision summary when a tick ran.
pub fn frame(
    state: &mut GameState,
    input: &InputSnapshot,
    raw_dt: f32,
    rng: &mut impl Rng,
) -> Option<Resolution> {
    if input.pause_pressed {
        toggle_pause(state);
    }
    if state.status != GameStatus::Running {
        return None;
    }
    let dt = clamp_dt(raw_dt, state.config.clock.max_dt);
    state.time += dt;
    Some(tick(state, input, dt, rng))
}

/// Step size actually simulated for a frame that took `raw_dt` seconds.
pub fn clamp_dt(raw_dt: f32, max_dt: f32) -> f32 {
    if raw_dt.is_finite() {
        raw_dt.clamp(0.0, max_dt)
    } else {
        0.0
    }
}

/// Advance the simulation by exactly `dt` seconds.
pub fn tick(
    state: &mut GameState,
    input: &InputSnapshot,
    dt: f32,
    rng: &mut impl Rng,
) -> Resolution {
    // ── 1. Prune enemies killed last tick ────────────────────────────────────
    state.enemies.retain(|e| !e.dead);

    // ── 2. Player ────────────────────────────────────────────────────────────
    if let Some(bullet) = state.player.update(dt, input, &state.config) {
        state.bullets.push(bullet);
        state.sounds.push(Sound::Shoot);
    }

    // ── 3. Bullets ───────────────────────────────────────────────────────────
    let field = &state.config.playfield;
    let margin = state.config.bullet.offscreen_margin;
    state.bullets.retain_mut(|b| {
        b.update(dt);
        !b.is_spent(field.width, field.height, margin)
    });

    // ── 4. Enemies home on the player ────────────────────────────────────────
    let (px, py) = (state.player.x, state.player.y);
    for e in &mut state.enemies {
        e.update(dt, px, py);
    }

    // ── 5. Power-ups settle on the floor ─────────────────────────────────────
    let floor_y = field.height - state.config.powerups.floor_offset;
    let bob_rate = state.config.powerups.bob_rate;
    for p in &mut state.powerups {
        p.update(dt, floor_y, bob_rate);
    }

    // ── 6. Particles ─────────────────────────────────────────────────────────
    let drag = state.config.particles.drag;
    state.particles.retain_mut(|p| {
        p.update(dt, drag);
        p.is_alive()
    });

    // ── 7. Collisions ────────────────────────────────────────────────────────
    let resolution = resolve(state, rng);
    if resolution.player_killed {
        end_game(state);
        return resolution;
    }

    // ── 8. Wave clear ────────────────────────────────────────────────────────
    if state.enemies.is_empty() {
        state.wave += 1;
        state.enemies = spawn_wave(&state.config.enemy, &state.config.playfield, state.wave, rng);
        log::debug!("wave {} spawned ({} enemies)", state.wave, state.enemies.len());
    }

    log::trace!(
        "t={:.3} enemies={} bullets={} particles={}",
        state.time,
        state.enemies.len(),
        state.bullets.len(),
        state.particles.len()
    );
    resolution
}

// ── Leaderboard hand-off ──────────────────────────────────────────────────────

/// Claim this game's leaderboard entry.
///
/// Succeeds at most once per game, only after game over, only with a
/// non-blank name and a positive score.
pub fn claim_submission(state: &mut GameState, name: &str, timestamp: u64) -> Option<ScoreEntry> {
    let name = name.trim();
    if state.status != GameStatus::GameOver
        || state.score_submitted
        || name.is_empty()
        || state.score == 0
    {
        return None;
    }
    state.score_submitted = true;
    Some(ScoreEntry::new(name, state.score, state.wave, timestamp))
}
