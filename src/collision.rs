/// Collision detection and resolution, run once per tick after movement.
///
/// The three passes always run in the same order:
///
/// 1. bullets × enemies (damage, kills, drops, explosions)
/// 2. enemies × player (contact damage, possibly fatal)
/// 3. player × power-ups (buffs and heals)
///
/// A fatal contact in pass 2 skips pass 3 for that tick.  Overlap tests use
/// squared distances throughout.

use rand::Rng;

use crate::entities::{GameState, PowerUp, PowerUpKind};
use crate::events::Sound;
use crate::math::circles_overlap;
use crate::spawner::{explosion, roll_drop, ENEMY_EXPLOSION_COLOR};

/// What happened during one resolution pass.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Resolution {
    /// Enemies whose hit points reached zero this tick.
    pub kills: u32,
    /// Player took contact damage this tick.
    pub player_hurt: bool,
    /// Player health reached zero; the caller must end the game.
    pub player_killed: bool,
    pub pickups: u32,
}

pub fn resolve(state: &mut GameState, rng: &mut impl Rng) -> Resolution {
    let mut resolution = Resolution {
        kills: bullets_vs_enemies(state, rng),
        ..Default::default()
    };

    // Dead enemies never collide again; drop them before the contact pass.
    state.enemies.retain(|e| !e.dead);

    let (hurt, killed) = enemies_vs_player(state);
    resolution.player_hurt = hurt;
    resolution.player_killed = killed;
    if killed {
        return resolution;
    }

    resolution.pickups = player_vs_powerups(state);
    resolution
}

// ── 1. Bullets ↔ enemies ──────────────────────────────────────────────────────

fn bullets_vs_enemies(state: &mut GameState, rng: &mut impl Rng) -> u32 {
    let GameState {
        bullets,
        enemies,
        powerups,
        particles,
        score,
        sounds,
        config,
        ..
    } = state;
    let mut kills = 0;

    bullets.retain(|b| {
        // At most one enemy per bullet: the first live overlap consumes it.
        let Some(enemy) = enemies
            .iter_mut()
            .find(|e| !e.dead && circles_overlap(b.x, b.y, b.radius, e.x, e.y, e.radius))
        else {
            return true;
        };

        sounds.push(Sound::EnemyHit);
        if enemy.hit(config.enemy.hit_flash) {
            kills += 1;
            *score = score.saturating_add(config.scoring.per_kill);
            if let Some(kind) = roll_drop(&config.drops, rng) {
                let bob = rng.gen::<f32>() * std::f32::consts::TAU;
                powerups.push(PowerUp::new(enemy.x, enemy.y, kind, bob, &config.powerups));
            }
            particles.extend(explosion(
                &config.particles,
                enemy.x,
                enemy.y,
                ENEMY_EXPLOSION_COLOR,
                rng,
            ));
            sounds.push(Sound::EnemyExplosion);
        }
        false
    });

    kills
}

// ── 2. Enemies ↔ player ───────────────────────────────────────────────────────

/// Returns `(hurt, killed)`.  Stops at the first fatal contact.
fn enemies_vs_player(state: &mut GameState) -> (bool, bool) {
    let GameState {
        enemies,
        player,
        sounds,
        config,
        ..
    } = state;
    let mut hurt = false;

    for e in enemies.iter() {
        if player.is_invulnerable() {
            break;
        }
        if !circles_overlap(e.x, e.y, e.radius, player.x, player.y, player.radius) {
            continue;
        }
        hurt = true;
        let dead = player.take_damage(config.player.contact_damage);
        player.invulnerable_timer = config.player.invulnerability;
        sounds.push(Sound::Hurt);
        if dead {
            return (true, true);
        }
    }
    (hurt, false)
}

// ── 3. Player ↔ power-ups ─────────────────────────────────────────────────────

fn player_vs_powerups(state: &mut GameState) -> u32 {
    let GameState {
        powerups,
        player,
        sounds,
        config,
        ..
    } = state;
    let mut pickups = 0;

    powerups.retain(|p| {
        if !circles_overlap(p.x, p.y, p.radius, player.x, player.y, player.radius) {
            return true;
        }
        match p.kind {
            PowerUpKind::Speed => player.buffs.grant_speed(&config.powerups.speed),
            PowerUpKind::FireRate => player.buffs.grant_fire_rate(&config.powerups.firerate),
            PowerUpKind::Heart => player.heal(config.powerups.heart_heal),
        }
        sounds.push(Sound::PowerUp);
        pickups += 1;
        false
    });

    pickups
}
