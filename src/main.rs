mod display;

use std::collections::{HashMap, HashSet};
use std::fs::{self, File};
use std::io::{stdout, BufWriter, Write};
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::Parser;
use crossterm::{
    cursor,
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, KeyboardEnhancementFlags, MouseButton, MouseEvent, MouseEventKind,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    style::Print,
    terminal, ExecutableCommand, QueueableCommand,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

use arena_shooter::audio::{SoundBoard, SoundOutput};
use arena_shooter::compute::{claim_submission, frame, init_state, start_game};
use arena_shooter::config::GameConfig;
use arena_shooter::entities::{GameState, GameStatus};
use arena_shooter::events::Sound;
use arena_shooter::input::{InputSnapshot, NameEntry};
use arena_shooter::leaderboard::{unix_millis, FileLeaderboard, LeaderboardClient, ScoreEntry};
use arena_shooter::logging;
use arena_shooter::storage::{data_dir, PersonalBest, ProfileStore};

use display::{Overlay, Viewport};

const FRAME: Duration = Duration::from_millis(33); // ≈30 FPS

const CONFIG_FILE: &str = "config.toml";
const PROFILE_FILE: &str = "profile.json";
const LEADERBOARD_FILE: &str = "leaderboard.json";
const LEADERBOARD_CACHE_FILE: &str = "leaderboard_cache.json";
const LOG_FILE: &str = "arena_shooter.log";

// ── Command line ──────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "arena_shooter", version, about = "Wave-based arena shooter for the terminal")]
struct Cli {
    /// Tuning file (TOML).  Defaults to `~/.arena_shooter/config.toml`.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Name to submit scores under.  Remembered for later runs.
    #[arg(long)]
    name: Option<String>,

    /// Seed the game RNG for a reproducible run.
    #[arg(long)]
    seed: Option<u64>,

    /// Enable debug logging.
    #[arg(short, long)]
    verbose: bool,

    /// Print the effective tuning as TOML and exit.
    #[arg(long)]
    print_config: bool,
}

// ── Held-key tracking ─────────────────────────────────────────────────────────

/// A key is considered "held" if its last press/repeat event arrived within
/// this many frames.  Covers terminals that don't emit key-release events:
/// the OS key-repeat rate is ≥ 15 Hz, so a window of 4 frames (≈133 ms) is
/// always refreshed before expiry.
const HOLD_WINDOW: u64 = 4;

const UP_KEYS: [KeyCode; 3] = [KeyCode::Up, KeyCode::Char('w'), KeyCode::Char('W')];
const DOWN_KEYS: [KeyCode; 3] = [KeyCode::Down, KeyCode::Char('s'), KeyCode::Char('S')];
const LEFT_KEYS: [KeyCode; 3] = [KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('A')];
const RIGHT_KEYS: [KeyCode; 3] = [KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('D')];
const FIRE_KEYS: [KeyCode; 1] = [KeyCode::Char(' ')];

/// Returns true if any of `keys` was seen within the last `HOLD_WINDOW` frames.
fn any_held(key_frame: &HashMap<KeyCode, u64>, keys: &[KeyCode], frame: u64) -> bool {
    keys.iter().any(|key| {
        key_frame
            .get(key)
            .map(|&last| frame.saturating_sub(last) <= HOLD_WINDOW)
            .unwrap_or(false)
    })
}

// ── Sound sink ────────────────────────────────────────────────────────────────

/// A terminal has exactly one sound: the bell.  It is saved for the cues
/// that matter; everything else only reaches the log.
#[derive(Default)]
struct TerminalBell {
    ring: bool,
}

impl TerminalBell {
    fn take(&mut self) -> bool {
        std::mem::take(&mut self.ring)
    }
}

impl SoundOutput for TerminalBell {
    fn has(&self, _sound: Sound) -> bool {
        true
    }

    fn play(&mut self, sound: Sound, volume: f32) {
        match sound {
            Sound::Hurt | Sound::GameOver => self.ring = true,
            _ => log::trace!("sound {} at volume {volume:.1}", sound.name()),
        }
    }
}

// ── Session ───────────────────────────────────────────────────────────────────

/// The game plus everything the host keeps around it between frames.
struct Session {
    state: GameState,
    rng: StdRng,
    profile: ProfileStore,
    client: LeaderboardClient,
    sounds: SoundBoard<TerminalBell>,
    best_note: Option<PersonalBest>,
    leaderboard: Option<Vec<ScoreEntry>>,
    pending: Option<Receiver<Vec<ScoreEntry>>>,
    /// Game-over name field; `Some` while it has keyboard focus.
    name_entry: Option<NameEntry>,
}

impl Session {
    fn start(&mut self) {
        start_game(&mut self.state, &mut self.rng);
        self.best_note = None;
        self.leaderboard = None;
        self.pending = None;
        self.name_entry = None;
    }

    /// Runs once, on the frame the player died.
    fn on_game_over(&mut self) {
        match self.profile.record_final_score(self.state.score) {
            Ok(note) => self.best_note = Some(note),
            Err(e) => log::warn!("could not record personal best: {e}"),
        }
        self.leaderboard = None;
        self.pending = Some(self.client.fetch_top_async(self.state.config.leaderboard.limit));
        // A zero score can't be submitted, so there is nothing to name.
        if self.state.score > 0 {
            self.name_entry = Some(NameEntry::new(self.profile.player_name()));
        }
    }

    fn editing_name(&self) -> bool {
        self.name_entry.is_some()
            && self.state.status == GameStatus::GameOver
            && !self.state.score_submitted
    }

    /// Remembers the typed name and submits under it.  A blank field keeps
    /// focus and submits nothing.
    fn submit_entry(&mut self) {
        let Some(name) = self.name_entry.as_ref().and_then(NameEntry::name) else {
            return;
        };
        if let Err(e) = self.profile.set_player_name(&name) {
            log::warn!("could not save player name: {e}");
        }
        self.submit();
        if self.state.score_submitted {
            self.name_entry = None;
        }
    }

    fn submit(&mut self) {
        let name = self.profile.player_name().to_string();
        if let Some(entry) = claim_submission(&mut self.state, &name, unix_millis()) {
            let limit = self.state.config.leaderboard.limit;
            self.leaderboard = None;
            self.pending = Some(self.client.submit_then_fetch(entry, limit));
        }
    }

    fn poll_leaderboard(&mut self) {
        let result = match &self.pending {
            Some(rx) => rx.try_recv(),
            None => return,
        };
        match result {
            Ok(entries) => {
                self.leaderboard = Some(entries);
                self.pending = None;
            }
            Err(TryRecvError::Empty) => {}
            Err(TryRecvError::Disconnected) => {
                log::warn!("leaderboard worker exited without a result");
                self.leaderboard = Some(Vec::new());
                self.pending = None;
            }
        }
    }

    fn overlay(&self) -> Overlay<'_> {
        Overlay {
            player_name: self.profile.player_name(),
            personal_best: self.profile.personal_best(),
            best_note: self.best_note,
            leaderboard: self.leaderboard.as_deref(),
            submitted: self.state.score_submitted,
            name_entry: self
                .name_entry
                .as_ref()
                .filter(|_| self.editing_name())
                .map(NameEntry::text),
        }
    }
}

// ── Game loop ─────────────────────────────────────────────────────────────────

/// Runs until the player quits.
///
/// Input model: instead of acting on each key event individually, we maintain
/// a `key_frame` map that records the frame number of the last press/repeat
/// event for every key.  Each frame we check which keys are still "fresh"
/// (within `HOLD_WINDOW` frames) and fold them into one `InputSnapshot`.
/// This allows Space + WASD to be held at the same time with no interference.
///
/// Works on two classes of terminal:
/// * **Keyboard-enhancement capable** (Ghostty, kitty, etc.): proper
///   `Press` / `Repeat` / `Release` events → keys are removed on release.
/// * **Classic terminals**: only `Press` events (OS key-repeat shows as
///   repeated `Press`).  Keys expire naturally after `HOLD_WINDOW` frames of
///   silence, which is shorter than the OS repeat interval, so the key stays
///   live while it is actively generating repeats.
///
/// The mouse is tracked as a terminal cell and mapped into the playfield every
/// frame, so a resize never leaves the pointer stale.
fn game_loop<W: Write>(
    out: &mut W,
    session: &mut Session,
    rx: &mpsc::Receiver<Event>,
) -> anyhow::Result<()> {
    // Maps each held key → the frame it was last seen (press or repeat).
    let mut key_frame: HashMap<KeyCode, u64> = HashMap::new();
    // Keys still held from play when the name field opened; their repeats
    // are not typing.
    let mut muted: HashSet<KeyCode> = HashSet::new();
    let mut pointer_cell: Option<(u16, u16)> = None;
    let mut left_down = false;
    let mut right_down = false;
    let mut frame_no: u64 = 0;
    let mut last_frame = Instant::now();

    loop {
        let frame_start = Instant::now();
        frame_no += 1;

        let (cols, rows) = terminal::size()?;
        let view = Viewport::new(cols, rows, &session.state);
        let mut pause_pressed = false;

        // ── Drain all pending input events (non-blocking) ─────────────────────
        while let Ok(ev) = rx.try_recv() {
            match ev {
                Event::Key(KeyEvent { code, kind, modifiers, .. }) => match kind {
                    // Press: record key + handle one-shot actions
                    KeyEventKind::Press => {
                        let previous = key_frame.insert(code, frame_no);
                        let ctrl = modifiers.contains(KeyModifiers::CONTROL);
                        // The name field swallows keys, shortcuts included.
                        if session.editing_name() {
                            if muted.contains(&code) {
                                let held = previous
                                    .is_some_and(|last| frame_no - last <= HOLD_WINDOW);
                                if held {
                                    continue;
                                }
                                muted.remove(&code);
                            }
                            match code {
                                KeyCode::Char('c') if ctrl => return Ok(()),
                                KeyCode::Char(c) if !ctrl => {
                                    if let Some(entry) = session.name_entry.as_mut() {
                                        entry.push(c);
                                    }
                                }
                                KeyCode::Backspace => {
                                    if let Some(entry) = session.name_entry.as_mut() {
                                        entry.backspace();
                                    }
                                }
                                KeyCode::Enter => session.submit_entry(),
                                // Leave the field; R/S/Q work again.
                                KeyCode::Esc => session.name_entry = None,
                                _ => {}
                            }
                            continue;
                        }
                        let status = session.state.status;
                        match code {
                            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                                return Ok(());
                            }
                            KeyCode::Char('c') if ctrl => return Ok(()),
                            KeyCode::Char('p') | KeyCode::Char('P') => pause_pressed = true,
                            KeyCode::Enter
                                if matches!(status, GameStatus::Idle | GameStatus::GameOver) =>
                            {
                                session.start();
                            }
                            KeyCode::Char('r') | KeyCode::Char('R')
                                if status == GameStatus::GameOver =>
                            {
                                session.start();
                            }
                            // Back into the name field.
                            KeyCode::Char('s') | KeyCode::Char('S')
                                if status == GameStatus::GameOver
                                    && session.state.score > 0
                                    && !session.state.score_submitted =>
                            {
                                let name = session.profile.player_name();
                                session.name_entry = Some(NameEntry::new(name));
                            }
                            _ => {}
                        }
                    }
                    // Repeat: refresh timestamp so key stays "held"
                    KeyEventKind::Repeat => {
                        key_frame.insert(code, frame_no);
                    }
                    // Release: remove key immediately (keyboard-enhancement path)
                    KeyEventKind::Release => {
                        key_frame.remove(&code);
                        muted.remove(&code);
                    }
                },
                Event::Mouse(MouseEvent { kind, column, row, .. }) => {
                    pointer_cell = Some((column, row));
                    match kind {
                        MouseEventKind::Down(MouseButton::Left) => left_down = true,
                        MouseEventKind::Up(MouseButton::Left) => left_down = false,
                        MouseEventKind::Down(MouseButton::Right) => right_down = true,
                        MouseEventKind::Up(MouseButton::Right) => right_down = false,
                        _ => {}
                    }
                }
                _ => {}
            }
        }

        // ── Fold held keys and the mouse into this frame's input ──────────────
        let input = InputSnapshot {
            up: any_held(&key_frame, &UP_KEYS, frame_no),
            down: any_held(&key_frame, &DOWN_KEYS, frame_no),
            left: any_held(&key_frame, &LEFT_KEYS, frame_no),
            right: any_held(&key_frame, &RIGHT_KEYS, frame_no),
            pointer: pointer_cell.map(|(col, row)| view.to_world(col, row)),
            pointer_down: left_down || right_down,
            drag: right_down,
            fire_key: any_held(&key_frame, &FIRE_KEYS, frame_no),
            pause_pressed,
        };

        let now = Instant::now();
        let raw_dt = now.duration_since(last_frame).as_secs_f32();
        last_frame = now;

        let was_over = session.state.status == GameStatus::GameOver;
        frame(&mut session.state, &input, raw_dt, &mut session.rng);
        if !was_over && session.state.status == GameStatus::GameOver {
            session.on_game_over();
            muted = key_frame
                .iter()
                .filter(|(_, &last)| frame_no - last <= HOLD_WINDOW)
                .map(|(&key, _)| key)
                .collect();
        }
        session.poll_leaderboard();

        let cues = session.state.drain_sounds();
        session.sounds.dispatch(cues, now);
        if session.sounds.output_mut().take() {
            out.queue(Print('\x07'))?;
        }

        display::render(out, &session.state, &view, &session.overlay())?;

        let elapsed = frame_start.elapsed();
        if elapsed < FRAME {
            thread::sleep(FRAME - elapsed);
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn load_config(cli: &Cli, dir: &std::path::Path) -> anyhow::Result<GameConfig> {
    match &cli.config {
        // An explicit file must be usable.
        Some(path) => GameConfig::load(path)
            .with_context(|| format!("loading config from {}", path.display())),
        None => {
            let path = dir.join(CONFIG_FILE);
            Ok(GameConfig::load(&path).unwrap_or_else(|e| {
                log::error!("{e}; using default tuning");
                GameConfig::default()
            }))
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let dir = data_dir();
    fs::create_dir_all(&dir).with_context(|| format!("creating {}", dir.display()))?;
    // The terminal belongs to the game, so logs go to a file.
    let log_file = File::create(dir.join(LOG_FILE)).ok();
    logging::init(cli.verbose, log_file);

    let config = load_config(&cli, &dir)?;
    if cli.print_config {
        print!("{}", config.to_toml()?);
        return Ok(());
    }

    let mut profile = ProfileStore::open(dir.join(PROFILE_FILE));
    if let Some(name) = &cli.name {
        if let Err(e) = profile.set_player_name(name) {
            log::warn!("could not save player name: {e}");
        }
    }

    let backend = Arc::new(FileLeaderboard::new(dir.join(LEADERBOARD_FILE)));
    let client = LeaderboardClient::new(backend, &config.leaderboard)
        .with_cache(dir.join(LEADERBOARD_CACHE_FILE));

    let rng = match cli.seed {
        Some(seed) => {
            log::info!("using seed {seed}");
            StdRng::seed_from_u64(seed)
        }
        None => StdRng::from_entropy(),
    };

    let mut session = Session {
        state: init_state(config),
        rng,
        profile,
        client,
        sounds: SoundBoard::new(TerminalBell::default()),
        best_note: None,
        leaderboard: None,
        pending: None,
        name_entry: None,
    };

    let raw_out = stdout();
    let mut out = BufWriter::new(raw_out);

    terminal::enable_raw_mode()?;
    out.execute(terminal::EnterAlternateScreen)?;
    out.execute(cursor::Hide)?;
    out.execute(EnableMouseCapture)?;

    // Request key-release (and key-repeat) events from the terminal.
    // Ghostty / kitty-protocol terminals support this; others fall back gracefully.
    let keyboard_enhanced = out
        .execute(PushKeyboardEnhancementFlags(
            KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
        ))
        .is_ok();

    // Dedicate a thread exclusively to blocking event reads, sending them
    // through a channel so the game loop never has to block on I/O.
    let (tx, rx) = mpsc::channel::<Event>();
    thread::spawn(move || loop {
        match event::read() {
            Ok(ev) => {
                if tx.send(ev).is_err() {
                    break; // receiver dropped → program exiting
                }
            }
            Err(_) => break,
        }
    });

    let result = game_loop(&mut out, &mut session, &rx);

    // Always restore the terminal
    if keyboard_enhanced {
        let _ = out.execute(PopKeyboardEnhancementFlags);
    }
    let _ = out.execute(DisableMouseCapture);
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();

    if let Err(e) = &result {
        log::error!("{e:#}");
    }
    result
}
