/// Per-frame input sample.
///
/// The host translates whatever device events it receives into one
/// `InputSnapshot` per frame; the simulation never sees raw events.

#[derive(Clone, Debug, Default, PartialEq)]
pub struct InputSnapshot {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    /// Pointer (mouse or touch) position in playfield coordinates, if known.
    pub pointer: Option<(f32, f32)>,
    /// Mouse button or finger held down.
    pub pointer_down: bool,
    /// Touch/drag steering: the pointer drives movement as well as aim.
    pub drag: bool,
    pub fire_key: bool,
    /// Edge trigger: true only on the frame the pause key went down.
    pub pause_pressed: bool,
}

impl InputSnapshot {
    /// Raw keyboard direction, each axis in `{-1, 0, 1}`.  Not normalised.
    pub fn key_direction(&self) -> (f32, f32) {
        let mut dx = 0.0;
        let mut dy = 0.0;
        if self.up {
            dy -= 1.0;
        }
        if self.down {
            dy += 1.0;
        }
        if self.left {
            dx -= 1.0;
        }
        if self.right {
            dx += 1.0;
        }
        (dx, dy)
    }

    pub fn fire_held(&self) -> bool {
        self.pointer_down || self.fire_key
    }
}

// ── Leaderboard name field ────────────────────────────────────────────────────

/// Longest name the entry field accepts, in characters.
pub const NAME_MAX_LEN: usize = 16;

/// Editable name buffer shown on the game-over screen.
///
/// The host owns one while the field has focus and feeds it typed
/// characters; `name` yields what would be submitted.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NameEntry {
    text: String,
}

impl NameEntry {
    /// Prefilled with `initial`, trimmed and cut to `NAME_MAX_LEN`.
    pub fn new(initial: &str) -> Self {
        NameEntry {
            text: initial.trim().chars().take(NAME_MAX_LEN).collect(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Appends `c`.  Control characters and input past `NAME_MAX_LEN` are
    /// refused; returns whether the character was taken.
    pub fn push(&mut self, c: char) -> bool {
        if c.is_control() || self.text.chars().count() >= NAME_MAX_LEN {
            return false;
        }
        self.text.push(c);
        true
    }

    pub fn backspace(&mut self) {
        self.text.pop();
    }

    /// The trimmed name, or `None` if only whitespace was typed.
    pub fn name(&self) -> Option<String> {
        let name = self.text.trim();
        (!name.is_empty()).then(|| name.to_string())
    }
}
