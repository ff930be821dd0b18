/// Sound cues produced by the simulation.
///
/// The simulation only queues these; playback, pooling and rate limiting
/// belong to whoever drains the queue (see `audio::SoundBoard`).

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Sound {
    Shoot,
    EnemyHit,
    EnemyExplosion,
    PowerUp,
    Hurt,
    PlayerDie,
    Explosion,
    GameOver,
    GameStart,
}

impl Sound {
    pub const ALL: [Sound; 9] = [
        Sound::Shoot,
        Sound::EnemyHit,
        Sound::EnemyExplosion,
        Sound::PowerUp,
        Sound::Hurt,
        Sound::PlayerDie,
        Sound::Explosion,
        Sound::GameOver,
        Sound::GameStart,
    ];

    /// Stable asset name of the cue.
    pub fn name(self) -> &'static str {
        match self {
            Sound::Shoot => "shoot",
            Sound::EnemyHit => "enhit",
            Sound::EnemyExplosion => "enemyExplosion",
            Sound::PowerUp => "powerup",
            Sound::Hurt => "hurt",
            Sound::PlayerDie => "playerdie",
            Sound::Explosion => "explosion",
            Sound::GameOver => "gameover",
            Sound::GameStart => "gamestart",
        }
    }

    /// Playback volume in `[0, 1]`.
    pub fn volume(self) -> f32 {
        match self {
            Sound::Shoot | Sound::EnemyHit => 0.6,
            Sound::EnemyExplosion | Sound::Explosion => 0.8,
            Sound::PowerUp => 0.4,
            Sound::Hurt | Sound::PlayerDie => 0.7,
            Sound::GameOver | Sound::GameStart => 0.6,
        }
    }
}
