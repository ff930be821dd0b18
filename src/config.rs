/// Gameplay tuning loaded from a TOML file.
///
/// [`GameConfig`] groups every gameplay constant the simulation reads.  Each
/// table is `#[serde(default)]`, so a config file only needs the keys it wants
/// to override:
///
/// ```toml
/// [player]
/// max_health = 150.0
///
/// [powerups.firerate]
/// multiplier = 2.5
/// ```
///
/// Values are checked by [`GameConfig::validate`] when loaded; the simulation
/// assumes a validated config and never re-checks at runtime.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub playfield: PlayfieldConfig,
    pub player: PlayerConfig,
    pub bullet: BulletConfig,
    pub enemy: EnemyConfig,
    pub drops: DropConfig,
    pub powerups: PowerUpConfig,
    pub particles: ParticleConfig,
    pub scoring: ScoringConfig,
    pub clock: ClockConfig,
    pub leaderboard: LeaderboardConfig,
}

// ── Tables ────────────────────────────────────────────────────────────────────

/// World-space size of the arena.  The terminal host scales it to fit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayfieldConfig {
    pub width: f32,
    pub height: f32,
}

impl Default for PlayfieldConfig {
    fn default() -> Self {
        Self {
            width: 960.0,
            height: 640.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub max_health: f32,
    /// Movement speed in units per second before buffs.
    pub base_speed: f32,
    /// Seconds between shots before buffs.
    pub base_reload: f32,
    pub radius: f32,
    /// Grace period after a contact hit during which no further damage lands.
    pub invulnerability: f32,
    pub contact_damage: f32,
    /// Lower bound for the aim-ring radius in drag mode.
    pub aim_ring_min: f32,
    /// Aim-ring radius as a multiple of the player radius.
    pub aim_ring_factor: f32,
    /// Extra speed factor while steering by touch/drag.
    pub touch_speed_boost: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            max_health: 100.0,
            base_speed: 230.0,
            base_reload: 0.14,
            radius: 12.0,
            invulnerability: 0.8,
            contact_damage: 15.0,
            aim_ring_min: 16.0,
            aim_ring_factor: 1.4,
            touch_speed_boost: 1.15,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BulletConfig {
    pub speed: f32,
    pub radius: f32,
    /// Seconds before a bullet fizzles out.
    pub lifetime: f32,
    /// Distance from the player centre at which bullets appear.
    pub muzzle_offset: f32,
    /// How far past the playfield edge a bullet may travel before removal.
    pub offscreen_margin: f32,
}

impl Default for BulletConfig {
    fn default() -> Self {
        Self {
            speed: 520.0,
            radius: 4.0,
            lifetime: 1.2,
            muzzle_offset: 18.0,
            offscreen_margin: 10.0,
        }
    }
}

/// Wave composition.  For wave `n`:
///
/// * count  = `base_count + floor(n * count_per_wave)`
/// * speed  = `base_speed + n * speed_per_wave + uniform(0, speed_jitter)`
/// * radius = `clamp(max_radius - floor(n / waves_per_step), min_radius, max_radius)`
/// * hp     = `base_hit_points + floor(n / waves_per_step)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyConfig {
    pub base_count: u32,
    pub count_per_wave: f32,
    pub base_speed: f32,
    pub speed_per_wave: f32,
    pub speed_jitter: f32,
    pub max_radius: f32,
    pub min_radius: f32,
    pub waves_per_step: u32,
    pub base_hit_points: u32,
    /// Distance outside the playfield edge at which enemies appear.
    pub spawn_margin: f32,
    /// Seconds an enemy flashes after being hit.
    pub hit_flash: f32,
}

impl Default for EnemyConfig {
    fn default() -> Self {
        Self {
            base_count: 6,
            count_per_wave: 1.5,
            base_speed: 60.0,
            speed_per_wave: 5.0,
            speed_jitter: 25.0,
            max_radius: 12.0,
            min_radius: 6.0,
            waves_per_step: 4,
            base_hit_points: 1,
            spawn_margin: 20.0,
            hit_flash: 0.2,
        }
    }
}

/// Power-up drop roll performed once per enemy death.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DropConfig {
    /// Probability in `[0, 1]` that a dying enemy drops anything.
    pub chance: f32,
    pub speed_weight: f32,
    pub firerate_weight: f32,
    pub heart_weight: f32,
}

impl Default for DropConfig {
    fn default() -> Self {
        Self {
            chance: 0.10,
            speed_weight: 1.0,
            firerate_weight: 1.0,
            heart_weight: 1.0,
        }
    }
}

/// A timed multiplier granted by a power-up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuffConfig {
    pub multiplier: f32,
    /// Seconds the multiplier stays active.
    pub duration: f32,
}

impl Default for BuffConfig {
    fn default() -> Self {
        Self {
            multiplier: 1.5,
            duration: 8.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PowerUpConfig {
    pub speed: BuffConfig,
    pub firerate: BuffConfig,
    /// Health restored by a heart, capped at max health.
    pub heart_heal: f32,
    pub radius: f32,
    pub fall_speed: f32,
    /// Distance above the bottom edge where falling power-ups come to rest.
    pub floor_offset: f32,
    /// Bob oscillation rate in radians per second (cosmetic).
    pub bob_rate: f32,
}

impl Default for PowerUpConfig {
    fn default() -> Self {
        Self {
            speed: BuffConfig {
                multiplier: 1.6,
                duration: 8.0,
            },
            firerate: BuffConfig {
                multiplier: 1.8,
                duration: 8.0,
            },
            heart_heal: 25.0,
            radius: 10.0,
            fall_speed: 28.0,
            floor_offset: 20.0,
            bob_rate: 4.0,
        }
    }
}

/// Explosion burst spawned where an enemy dies.  Ranges are `min + uniform(0, extra)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticleConfig {
    pub min_count: u32,
    pub extra_count: u32,
    pub min_speed: f32,
    pub extra_speed: f32,
    pub min_life: f32,
    pub extra_life: f32,
    pub min_size: f32,
    pub extra_size: f32,
    /// Velocity multiplier applied every tick.
    pub drag: f32,
    /// Maximum per-channel colour deviation from the base colour.
    pub color_jitter: u8,
}

impl Default for ParticleConfig {
    fn default() -> Self {
        Self {
            min_count: 16,
            extra_count: 10,
            min_speed: 100.0,
            extra_speed: 180.0,
            min_life: 0.35,
            extra_life: 0.45,
            min_size: 2.0,
            extra_size: 3.0,
            drag: 0.98,
            color_jitter: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub per_kill: u32,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self { per_kill: 10 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClockConfig {
    /// Largest step the simulation accepts; longer frames are truncated.
    pub max_dt: f32,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self { max_dt: 0.033 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LeaderboardConfig {
    /// Number of entries shown.
    pub limit: usize,
    pub timeout_secs: f32,
    pub max_retries: u32,
    pub retry_delay_secs: f32,
}

impl Default for LeaderboardConfig {
    fn default() -> Self {
        Self {
            limit: 10,
            timeout_secs: 5.0,
            max_retries: 3,
            retry_delay_secs: 1.0,
        }
    }
}

// ── Loading & validation ──────────────────────────────────────────────────────

impl GameConfig {
    /// Load a config file.  A missing file yields the defaults; anything that
    /// exists but cannot be read, parsed or validated is an error.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("no config at {}; using defaults", path.display());
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        let config = Self::from_toml(&contents).map_err(|e| match e {
            ConfigError::Parse { source, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })?;
        log::info!("loaded config from {}", path.display());
        Ok(config)
    }

    /// Parse and validate a TOML document.
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents).map_err(|source| ConfigError::Parse {
            path: Default::default(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would let the simulation produce negative health,
    /// radii or timers, or divide by zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("playfield.width", self.playfield.width)?;
        positive("playfield.height", self.playfield.height)?;

        let p = &self.player;
        positive("player.max_health", p.max_health)?;
        positive("player.base_speed", p.base_speed)?;
        positive("player.base_reload", p.base_reload)?;
        positive("player.radius", p.radius)?;
        non_negative("player.invulnerability", p.invulnerability)?;
        non_negative("player.contact_damage", p.contact_damage)?;
        non_negative("player.aim_ring_min", p.aim_ring_min)?;
        non_negative("player.aim_ring_factor", p.aim_ring_factor)?;
        positive("player.touch_speed_boost", p.touch_speed_boost)?;

        let b = &self.bullet;
        positive("bullet.speed", b.speed)?;
        positive("bullet.radius", b.radius)?;
        positive("bullet.lifetime", b.lifetime)?;
        non_negative("bullet.muzzle_offset", b.muzzle_offset)?;
        non_negative("bullet.offscreen_margin", b.offscreen_margin)?;

        let e = &self.enemy;
        non_negative("enemy.count_per_wave", e.count_per_wave)?;
        positive("enemy.base_speed", e.base_speed)?;
        non_negative("enemy.speed_per_wave", e.speed_per_wave)?;
        non_negative("enemy.speed_jitter", e.speed_jitter)?;
        positive("enemy.min_radius", e.min_radius)?;
        positive("enemy.max_radius", e.max_radius)?;
        if e.min_radius > e.max_radius {
            return Err(ConfigError::Invalid {
                field: "enemy.min_radius",
                reason: "must not exceed enemy.max_radius",
            });
        }
        if e.waves_per_step == 0 {
            return Err(ConfigError::Invalid {
                field: "enemy.waves_per_step",
                reason: "must be at least 1",
            });
        }
        if e.base_hit_points == 0 {
            return Err(ConfigError::Invalid {
                field: "enemy.base_hit_points",
                reason: "must be at least 1",
            });
        }
        if e.base_count == 0 && e.count_per_wave == 0.0 {
            return Err(ConfigError::Invalid {
                field: "enemy.base_count",
                reason: "waves must contain at least one enemy",
            });
        }
        non_negative("enemy.spawn_margin", e.spawn_margin)?;
        non_negative("enemy.hit_flash", e.hit_flash)?;

        let d = &self.drops;
        if !(0.0..=1.0).contains(&d.chance) {
            return Err(ConfigError::Invalid {
                field: "drops.chance",
                reason: "must be within [0, 1]",
            });
        }
        non_negative("drops.speed_weight", d.speed_weight)?;
        non_negative("drops.firerate_weight", d.firerate_weight)?;
        non_negative("drops.heart_weight", d.heart_weight)?;

        let pu = &self.powerups;
        positive("powerups.speed.multiplier", pu.speed.multiplier)?;
        positive("powerups.speed.duration", pu.speed.duration)?;
        positive("powerups.firerate.multiplier", pu.firerate.multiplier)?;
        positive("powerups.firerate.duration", pu.firerate.duration)?;
        non_negative("powerups.heart_heal", pu.heart_heal)?;
        positive("powerups.radius", pu.radius)?;
        non_negative("powerups.fall_speed", pu.fall_speed)?;
        non_negative("powerups.floor_offset", pu.floor_offset)?;

        let pa = &self.particles;
        if !(0.0..=1.0).contains(&pa.drag) {
            return Err(ConfigError::Invalid {
                field: "particles.drag",
                reason: "must be within [0, 1]",
            });
        }
        positive("particles.min_life", pa.min_life)?;
        non_negative("particles.extra_life", pa.extra_life)?;
        non_negative("particles.min_speed", pa.min_speed)?;
        non_negative("particles.extra_speed", pa.extra_speed)?;
        non_negative("particles.min_size", pa.min_size)?;
        non_negative("particles.extra_size", pa.extra_size)?;

        positive("clock.max_dt", self.clock.max_dt)?;

        let lb = &self.leaderboard;
        positive("leaderboard.timeout_secs", lb.timeout_secs)?;
        non_negative("leaderboard.retry_delay_secs", lb.retry_delay_secs)?;
        Ok(())
    }

    /// Render the config as TOML, e.g. to seed a user's tuning file.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

fn positive(field: &'static str, v: f32) -> Result<(), ConfigError> {
    if v.is_finite() && v > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: "must be a positive number",
        })
    }
}

fn non_negative(field: &'static str, v: f32) -> Result<(), ConfigError> {
    if v.is_finite() && v >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: "must not be negative",
        })
    }
}
