/// All game entity types and their per-frame integration rules.
///
/// Each entity only knows how to advance itself.  Anything that involves two
/// collections at once (collisions, spawning, wave progression) lives in
/// `collision`, `spawner` and `compute`.

use crate::config::{BuffConfig, BulletConfig, GameConfig, PowerUpConfig};
use crate::events::Sound;
use crate::input::InputSnapshot;
use crate::math::{angle, clamp, dist2, normalize};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameStatus {
    /// Before the first start.
    Idle,
    Running,
    Paused,
    GameOver,
}

/// Visual flavour of an enemy.  Has no effect on behaviour.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EnemyKind {
    Grunt,
    Runner,
    Tank,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PowerUpKind {
    /// Timed movement-speed multiplier.
    Speed,
    /// Timed fire-rate multiplier.
    FireRate,
    /// Instant heal.
    Heart,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

// ── Player buffs ──────────────────────────────────────────────────────────────

/// Timed multipliers granted by power-ups.  A multiplier is exactly `1.0`
/// whenever its timer is zero.
#[derive(Clone, Debug, PartialEq)]
pub struct Buffs {
    pub speed_multiplier: f32,
    pub speed_time: f32,
    pub fire_rate_multiplier: f32,
    pub fire_rate_time: f32,
}

impl Default for Buffs {
    fn default() -> Self {
        Self {
            speed_multiplier: 1.0,
            speed_time: 0.0,
            fire_rate_multiplier: 1.0,
            fire_rate_time: 0.0,
        }
    }
}

impl Buffs {
    /// Count both timers down; an expired timer resets its multiplier.
    pub fn decay(&mut self, dt: f32) {
        decay_buff(&mut self.speed_multiplier, &mut self.speed_time, dt);
        decay_buff(&mut self.fire_rate_multiplier, &mut self.fire_rate_time, dt);
    }

    /// Re-collecting refreshes the duration; multipliers never stack.
    pub fn grant_speed(&mut self, buff: &BuffConfig) {
        self.speed_multiplier = buff.multiplier;
        self.speed_time = buff.duration;
    }

    pub fn grant_fire_rate(&mut self, buff: &BuffConfig) {
        self.fire_rate_multiplier = buff.multiplier;
        self.fire_rate_time = buff.duration;
    }
}

fn decay_buff(multiplier: &mut f32, time: &mut f32, dt: f32) {
    if *time > 0.0 {
        *time -= dt;
        if *time <= 0.0 {
            *time = 0.0;
            *multiplier = 1.0;
        }
    }
}

// ── Player ────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct Player {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    pub health: f32,
    pub max_health: f32,
    /// Base movement speed in units per second.
    pub speed: f32,
    /// Base seconds between shots.
    pub reload: f32,
    /// Seconds until the next shot is allowed.
    pub reload_timer: f32,
    /// Seconds of contact-damage immunity left.
    pub invulnerable_timer: f32,
    pub aim_angle: f32,
    pub buffs: Buffs,
}

impl Player {
    /// A fresh player at full health standing at `(x, y)`.
    pub fn new(config: &GameConfig, x: f32, y: f32) -> Self {
        let p = &config.player;
        Self {
            x,
            y,
            radius: p.radius,
            health: p.max_health,
            max_health: p.max_health,
            speed: p.base_speed,
            reload: p.base_reload,
            reload_timer: 0.0,
            invulnerable_timer: 0.0,
            aim_angle: 0.0,
            buffs: Buffs::default(),
        }
    }

    /// Advance movement, aim, timers and firing by `dt` seconds.
    ///
    /// Returns the bullet fired this frame, if any.
    pub fn update(&mut self, dt: f32, input: &InputSnapshot, config: &GameConfig) -> Option<Bullet> {
        self.buffs.decay(dt);

        let (mut mx, mut my) = (0.0, 0.0);
        let mut speed = self.speed * self.buffs.speed_multiplier;
        let dragging = input.drag && input.pointer.is_some();

        match input.pointer {
            Some((px, py)) if dragging => {
                // Inside the aim ring the finger only turns the player.
                let (dx, dy) = (px - self.x, py - self.y);
                let ring = self.aim_ring(config);
                if dist2(self.x, self.y, px, py) > ring * ring {
                    if let Some((ux, uy)) = normalize(dx, dy) {
                        mx = ux;
                        my = uy;
                    }
                }
                self.aim_angle = dy.atan2(dx);
                speed *= config.player.touch_speed_boost;
            }
            _ => {
                let (kx, ky) = input.key_direction();
                if let Some((ux, uy)) = normalize(kx, ky) {
                    mx = ux;
                    my = uy;
                }
            }
        }

        let field = &config.playfield;
        self.x = clamp(self.x + mx * speed * dt, self.radius, field.width - self.radius);
        self.y = clamp(self.y + my * speed * dt, self.radius, field.height - self.radius);

        if !dragging {
            if let Some((px, py)) = input.pointer {
                self.aim_angle = angle(self.x, self.y, px, py);
            }
        }

        self.reload_timer = (self.reload_timer - dt).max(0.0);
        self.invulnerable_timer = (self.invulnerable_timer - dt).max(0.0);

        if input.fire_held() && self.reload_timer <= 0.0 {
            self.reload_timer = self.effective_reload();
            return Some(Bullet::new(self.x, self.y, self.aim_angle, &config.bullet));
        }
        None
    }

    /// Seconds between shots with the current fire-rate buff applied.
    pub fn effective_reload(&self) -> f32 {
        self.reload / self.buffs.fire_rate_multiplier
    }

    /// Radius around the player inside which drag input only aims.
    pub fn aim_ring(&self, config: &GameConfig) -> f32 {
        let p = &config.player;
        (self.radius * p.aim_ring_factor).max(p.aim_ring_min)
    }

    pub fn is_invulnerable(&self) -> bool {
        self.invulnerable_timer > 0.0
    }

    /// Subtract `amount` health, never below zero.  Returns true when this
    /// leaves the player dead.
    pub fn take_damage(&mut self, amount: f32) -> bool {
        self.health = (self.health - amount).max(0.0);
        self.health <= 0.0
    }

    pub fn heal(&mut self, amount: f32) {
        self.health = (self.health + amount).min(self.max_health);
    }
}

// ── Projectiles ───────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct Bullet {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub radius: f32,
    /// Seconds left before the bullet fizzles.
    pub life: f32,
    /// Travel direction in radians (rendering only).
    pub heading: f32,
}

impl Bullet {
    /// Spawn at the muzzle of a shooter standing at `(x, y)` aiming `heading`.
    pub fn new(x: f32, y: f32, heading: f32, config: &BulletConfig) -> Self {
        let (sin, cos) = heading.sin_cos();
        Self {
            x: x + cos * config.muzzle_offset,
            y: y + sin * config.muzzle_offset,
            vx: cos * config.speed,
            vy: sin * config.speed,
            radius: config.radius,
            life: config.lifetime,
            heading,
        }
    }

    pub fn update(&mut self, dt: f32) {
        self.x += self.vx * dt;
        self.y += self.vy * dt;
        self.life -= dt;
    }

    /// True once the bullet has expired or left the playfield plus `margin`.
    pub fn is_spent(&self, width: f32, height: f32, margin: f32) -> bool {
        self.life <= 0.0
            || self.x < -margin
            || self.x > width + margin
            || self.y < -margin
            || self.y > height + margin
    }
}

// ── Enemies ───────────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct Enemy {
    pub x: f32,
    pub y: f32,
    /// Units per second.
    pub speed: f32,
    pub radius: f32,
    pub hit_points: u32,
    /// Seconds of hit flash left (cosmetic).
    pub hit_flash: f32,
    pub kind: EnemyKind,
    /// Direction of travel in radians (cosmetic).
    pub heading: f32,
    /// Set when hit points reach zero; compacted away after collisions.
    pub dead: bool,
}

impl Enemy {
    pub fn new(x: f32, y: f32, speed: f32, radius: f32, hit_points: u32, kind: EnemyKind) -> Self {
        Self {
            x,
            y,
            speed,
            radius,
            hit_points: hit_points.max(1),
            hit_flash: 0.0,
            kind,
            heading: 0.0,
            dead: false,
        }
    }

    /// Home straight at `(tx, ty)`.
    ///
    /// The step is `speed * dt` capped at the remaining distance, so an enemy
    /// that would pass the target lands on it instead.  Homing therefore
    /// converges and never oscillates around the player.
    pub fn update(&mut self, dt: f32, tx: f32, ty: f32) {
        let (dx, dy) = (tx - self.x, ty - self.y);
        if let Some((ux, uy)) = normalize(dx, dy) {
            let step = (self.speed * dt).min(dx.hypot(dy));
            self.x += ux * step;
            self.y += uy * step;
            self.heading = dy.atan2(dx);
        }
        if self.hit_flash > 0.0 {
            self.hit_flash = (self.hit_flash - dt).max(0.0);
        }
    }

    /// Take one hit point.  Returns true if this hit killed the enemy.
    pub fn hit(&mut self, flash: f32) -> bool {
        if self.dead {
            return false;
        }
        self.hit_points = self.hit_points.saturating_sub(1);
        self.hit_flash = flash;
        if self.hit_points == 0 {
            self.dead = true;
            return true;
        }
        false
    }
}

// ── Power-ups ─────────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct PowerUp {
    pub x: f32,
    pub y: f32,
    pub kind: PowerUpKind,
    pub radius: f32,
    /// Fall speed; zero once resting on the floor.
    pub vy: f32,
    /// Bob oscillation phase (cosmetic).
    pub bob: f32,
}

impl PowerUp {
    pub fn new(x: f32, y: f32, kind: PowerUpKind, bob: f32, config: &PowerUpConfig) -> Self {
        Self {
            x,
            y,
            kind,
            radius: config.radius,
            vy: config.fall_speed,
            bob,
        }
    }

    /// Fall until `floor_y`, then rest there for good.
    pub fn update(&mut self, dt: f32, floor_y: f32, bob_rate: f32) {
        self.bob += dt * bob_rate;
        self.y += self.vy * dt;
        if self.y > floor_y {
            self.y = floor_y;
            self.vy = 0.0;
        }
    }
}

// ── Particles ─────────────────────────────────────────────────────────────────

/// Explosion debris.  Purely visual.
#[derive(Clone, Debug)]
pub struct Particle {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub life: f32,
    pub max_life: f32,
    pub color: Rgb,
    pub size: f32,
}

impl Particle {
    pub fn new(x: f32, y: f32, heading: f32, speed: f32, life: f32, color: Rgb, size: f32) -> Self {
        let (sin, cos) = heading.sin_cos();
        Self {
            x,
            y,
            vx: cos * speed,
            vy: sin * speed,
            life,
            max_life: life,
            color,
            size,
        }
    }

    pub fn update(&mut self, dt: f32, drag: f32) {
        self.x += self.vx * dt;
        self.y += self.vy * dt;
        self.vx *= drag;
        self.vy *= drag;
        self.life -= dt;
    }

    pub fn is_alive(&self) -> bool {
        self.life > 0.0
    }

    /// Remaining life as a fraction in `[0, 1]`, for fading.
    pub fn fade(&self) -> f32 {
        if self.max_life > 0.0 {
            (self.life / self.max_life).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

// ── Master game state ─────────────────────────────────────────────────────────

/// Everything one game session owns.  Independent instances do not share
/// anything, so tests can run as many as they like side by side.
#[derive(Clone, Debug)]
pub struct GameState {
    pub player: Player,
    pub bullets: Vec<Bullet>,
    pub enemies: Vec<Enemy>,
    pub powerups: Vec<PowerUp>,
    pub particles: Vec<Particle>,
    pub score: u32,
    /// Current wave, starting at 1.
    pub wave: u32,
    /// Simulated seconds since the game started (pauses excluded).
    pub time: f32,
    pub status: GameStatus,
    pub config: GameConfig,
    /// Sound cues queued since the host last drained them.
    pub sounds: Vec<Sound>,
    /// Whether this game's score has already been handed to the leaderboard.
    pub score_submitted: bool,
}

impl GameState {
    pub fn is_running(&self) -> bool {
        matches!(self.status, GameStatus::Running | GameStatus::Paused)
    }

    pub fn is_paused(&self) -> bool {
        self.status == GameStatus::Paused
    }

    /// Hand the queued sound cues to the caller, leaving the queue empty.
    pub fn drain_sounds(&mut self) -> Vec<Sound> {
        std::mem::take(&mut self.sounds)
    }

    pub fn live_enemy_count(&self) -> usize {
        self.enemies.iter().filter(|e| !e.dead).count()
    }
}
