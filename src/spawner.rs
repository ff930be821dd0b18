/// Random generation of new entities: enemy waves, power-up drops and
/// explosion debris.
///
/// All randomness comes through the injected `rng`, so a seeded RNG makes
/// every spawn reproducible.

use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;

use crate::config::{DropConfig, EnemyConfig, ParticleConfig, PlayfieldConfig};
use crate::entities::{Enemy, EnemyKind, Particle, PowerUpKind, Rgb};
use crate::math::clamp;

/// Base colour of enemy explosions.
pub const ENEMY_EXPLOSION_COLOR: Rgb = Rgb { r: 255, g: 107, b: 107 };

// ── Wave tables ───────────────────────────────────────────────────────────────

/// Number of enemies in wave `wave`.
pub fn wave_size(config: &EnemyConfig, wave: u32) -> usize {
    let extra = (wave as f32 * config.count_per_wave).floor() as usize;
    config.base_count as usize + extra
}

/// Collision radius of every enemy in wave `wave`.  Shrinks every
/// `waves_per_step` waves down to `min_radius`.
pub fn wave_radius(config: &EnemyConfig, wave: u32) -> f32 {
    let shrink = (wave / config.waves_per_step.max(1)) as f32;
    clamp(config.max_radius - shrink, config.min_radius, config.max_radius)
}

/// Hit points of every enemy in wave `wave`.
pub fn wave_hit_points(config: &EnemyConfig, wave: u32) -> u32 {
    config.base_hit_points + wave / config.waves_per_step.max(1)
}

/// Build the full enemy batch for `wave`.
pub fn spawn_wave(
    config: &EnemyConfig,
    field: &PlayfieldConfig,
    wave: u32,
    rng: &mut impl Rng,
) -> Vec<Enemy> {
    let count = wave_size(config, wave);
    let radius = wave_radius(config, wave);
    let hit_points = wave_hit_points(config, wave);
    let base_speed = config.base_speed + wave as f32 * config.speed_per_wave;

    (0..count)
        .map(|_| {
            let speed = base_speed + rng.gen::<f32>() * config.speed_jitter;
            let (x, y) = edge_position(field, config.spawn_margin, rng);
            let kind = match rng.gen_range(0..3) {
                0 => EnemyKind::Grunt,
                1 => EnemyKind::Runner,
                _ => EnemyKind::Tank,
            };
            Enemy::new(x, y, speed, radius, hit_points, kind)
        })
        .collect()
}

/// A random point `margin` units outside one of the four playfield edges.
fn edge_position(field: &PlayfieldConfig, margin: f32, rng: &mut impl Rng) -> (f32, f32) {
    match rng.gen_range(0..4) {
        0 => (-margin, rng.gen::<f32>() * field.height),
        1 => (field.width + margin, rng.gen::<f32>() * field.height),
        2 => (rng.gen::<f32>() * field.width, -margin),
        _ => (rng.gen::<f32>() * field.width, field.height + margin),
    }
}

// ── Power-up drops ────────────────────────────────────────────────────────────

/// Roll the drop table once for a dying enemy.
///
/// Returns `None` when the chance roll fails or every weight is zero.
pub fn roll_drop(config: &DropConfig, rng: &mut impl Rng) -> Option<PowerUpKind> {
    if rng.gen::<f32>() >= config.chance {
        return None;
    }
    let kinds = [PowerUpKind::Speed, PowerUpKind::FireRate, PowerUpKind::Heart];
    let weights = [config.speed_weight, config.firerate_weight, config.heart_weight];
    let table = WeightedIndex::new(weights).ok()?;
    Some(kinds[table.sample(rng)])
}

// ── Explosions ────────────────────────────────────────────────────────────────

/// Debris burst centred on `(x, y)` with colours jittered around `base`.
pub fn explosion(
    config: &ParticleConfig,
    x: f32,
    y: f32,
    base: Rgb,
    rng: &mut impl Rng,
) -> Vec<Particle> {
    let extra = if config.extra_count > 0 {
        rng.gen_range(0..config.extra_count)
    } else {
        0
    };
    let count = config.min_count + extra;
    (0..count)
        .map(|_| {
            let heading = rng.gen::<f32>() * std::f32::consts::TAU;
            let speed = config.min_speed + rng.gen::<f32>() * config.extra_speed;
            let life = config.min_life + rng.gen::<f32>() * config.extra_life;
            let size = config.min_size + rng.gen::<f32>() * config.extra_size;
            let color = Rgb {
                r: jitter(base.r, config.color_jitter, rng),
                g: jitter(base.g, config.color_jitter, rng),
                b: jitter(base.b, config.color_jitter, rng),
            };
            Particle::new(x, y, heading, speed, life, color, size)
        })
        .collect()
}

fn jitter(channel: u8, amount: u8, rng: &mut impl Rng) -> u8 {
    let half = i16::from(amount) / 2;
    let offset = rng.gen_range(-half..=half);
    (i16::from(channel) + offset).clamp(0, 255) as u8
}
