/// Dispatch of queued sound cues to an output device.
///
/// The simulation queues [`Sound`]s freely; [`SoundBoard`] decides what is
/// actually played.  It rate-limits gunfire, looks up the volume of each cue
/// and quietly skips cues the output cannot play (warning once per cue).

use std::collections::HashSet;
use std::time::{Duration, Instant};

use crate::events::Sound;

/// Minimum spacing between two audible `Shoot` cues.
pub const SHOOT_RATE_LIMIT: Duration = Duration::from_millis(50);

/// Something that can make noise.
pub trait SoundOutput {
    /// Whether a sample for `sound` is available.
    fn has(&self, sound: Sound) -> bool;

    fn play(&mut self, sound: Sound, volume: f32);
}

pub struct SoundBoard<O: SoundOutput> {
    output: O,
    last_shot: Option<Instant>,
    warned_missing: HashSet<Sound>,
}

impl<O: SoundOutput> SoundBoard<O> {
    pub fn new(output: O) -> Self {
        Self {
            output,
            last_shot: None,
            warned_missing: HashSet::new(),
        }
    }

    pub fn output(&self) -> &O {
        &self.output
    }

    pub fn output_mut(&mut self) -> &mut O {
        &mut self.output
    }

    /// Play every cue in `sounds` as of `now`.  Returns how many were played.
    pub fn dispatch(&mut self, sounds: impl IntoIterator<Item = Sound>, now: Instant) -> usize {
        let mut played = 0;
        for sound in sounds {
            if !self.output.has(sound) {
                if self.warned_missing.insert(sound) {
                    log::warn!("missing sound for {}", sound.name());
                }
                continue;
            }
            if sound == Sound::Shoot {
                if let Some(last) = self.last_shot {
                    if now.saturating_duration_since(last) < SHOOT_RATE_LIMIT {
                        continue;
                    }
                }
                self.last_shot = Some(now);
            }
            self.output.play(sound, sound.volume());
            played += 1;
        }
        played
    }
}
