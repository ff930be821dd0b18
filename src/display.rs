/// Rendering layer. All terminal I/O lives here.
///
/// Each function receives a mutable writer and an immutable view of the
/// game state.  No game logic is performed; this module only translates
/// world-space state into terminal cells.

use std::io::Write;

use crossterm::{
    cursor,
    style::{self, Color, Print},
    terminal,
    QueueableCommand,
};
use arena_shooter::entities::{
    Bullet, Enemy, EnemyKind, GameState, GameStatus, Particle, PowerUp, PowerUpKind,
};
use arena_shooter::input::NAME_MAX_LEN;
use arena_shooter::leaderboard::ScoreEntry;
use arena_shooter::storage::PersonalBest;

// ── Colour palette ────────────────────────────────────────────────────────────

const C_BORDER: Color = Color::DarkYellow;
const C_HUD_SCORE: Color = Color::Yellow;
const C_HUD_HEALTH: Color = Color::Red;
const C_HUD_WAVE: Color = Color::Cyan;
const C_PLAYER: Color = Color::White;
const C_PLAYER_BLINK: Color = Color::Yellow;
const C_AIM: Color = Color::Yellow;
const C_ENEMY: Color = Color::Red;
const C_ENEMY_FLASH: Color = Color::White;
const C_BULLET: Color = Color::Yellow;
const C_SPEED: Color = Color::Blue;
const C_FIRERATE: Color = Color::Green;
const C_HEART: Color = Color::Magenta;
const C_HINT: Color = Color::DarkGrey;

// ── Viewport ──────────────────────────────────────────────────────────────────

/// Maps the world-space playfield onto the framed area of the terminal
/// (columns `1..cols-1`, rows `2..rows-2`).
#[derive(Clone, Copy, Debug)]
pub struct Viewport {
    pub cols: u16,
    pub rows: u16,
    pub world_w: f32,
    pub world_h: f32,
}

impl Viewport {
    pub fn new(cols: u16, rows: u16, state: &GameState) -> Self {
        Self {
            cols,
            rows,
            world_w: state.config.playfield.width,
            world_h: state.config.playfield.height,
        }
    }

    fn inner_w(&self) -> f32 {
        f32::from(self.cols.saturating_sub(2).max(1))
    }

    fn inner_h(&self) -> f32 {
        f32::from(self.rows.saturating_sub(4).max(1))
    }

    /// Terminal cell for a world point, or `None` if it is off the playfield.
    pub fn to_cell(&self, x: f32, y: f32) -> Option<(u16, u16)> {
        if !(0.0..=self.world_w).contains(&x) || !(0.0..=self.world_h).contains(&y) {
            return None;
        }
        let col = (x / self.world_w * (self.inner_w() - 1.0)).round() as u16 + 1;
        let row = (y / self.world_h * (self.inner_h() - 1.0)).round() as u16 + 2;
        Some((col, row))
    }

    /// World point at the centre of a terminal cell (used for the mouse).
    pub fn to_world(&self, col: u16, row: u16) -> (f32, f32) {
        let cx = f32::from(col.saturating_sub(1)) / (self.inner_w() - 1.0).max(1.0);
        let cy = f32::from(row.saturating_sub(2)) / (self.inner_h() - 1.0).max(1.0);
        (
            (cx * self.world_w).clamp(0.0, self.world_w),
            (cy * self.world_h).clamp(0.0, self.world_h),
        )
    }
}

// ── Host-side overlay data ────────────────────────────────────────────────────

/// Everything the screen shows that is not simulation state.
pub struct Overlay<'a> {
    pub player_name: &'a str,
    pub personal_best: u32,
    pub best_note: Option<PersonalBest>,
    /// `None` while a fetch is in flight.
    pub leaderboard: Option<&'a [ScoreEntry]>,
    pub submitted: bool,
    /// Name field contents while it has focus.
    pub name_entry: Option<&'a str>,
}

// ── Public entry point ────────────────────────────────────────────────────────

/// Render one complete frame.
pub fn render<W: Write>(
    out: &mut W,
    state: &GameState,
    view: &Viewport,
    overlay: &Overlay,
) -> std::io::Result<()> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;

    draw_border(out, view)?;
    draw_hud(out, state, view, overlay)?;

    for particle in &state.particles {
        draw_particle(out, particle, view)?;
    }
    for powerup in &state.powerups {
        draw_powerup(out, powerup, view)?;
    }
    for enemy in &state.enemies {
        draw_enemy(out, enemy, view)?;
    }
    for bullet in &state.bullets {
        draw_bullet(out, bullet, view)?;
    }

    if state.status != GameStatus::Idle {
        draw_player(out, state, view)?;
    }
    draw_controls_hint(out, view)?;

    match state.status {
        GameStatus::Idle => draw_title(out, view, overlay)?,
        GameStatus::Paused => draw_centered(out, view, view.rows / 2, "‖ PAUSED ‖", Color::Cyan)?,
        GameStatus::GameOver => draw_game_over(out, state, view, overlay)?,
        GameStatus::Running => {}
    }

    // Park cursor in a harmless spot and flush
    out.queue(style::ResetColor)?;
    out.queue(cursor::MoveTo(0, view.rows.saturating_sub(1)))?;
    out.flush()?;
    Ok(())
}

// ── Border ────────────────────────────────────────────────────────────────────

fn draw_border<W: Write>(out: &mut W, view: &Viewport) -> std::io::Result<()> {
    let w = view.cols as usize;
    let h = view.rows;

    out.queue(style::SetForegroundColor(C_BORDER))?;

    // Row 1: top bar
    out.queue(cursor::MoveTo(0, 1))?;
    out.queue(Print(format!("┌{}┐", "─".repeat(w.saturating_sub(2)))))?;

    // Row h-2: bottom bar
    out.queue(cursor::MoveTo(0, h.saturating_sub(2)))?;
    out.queue(Print(format!("└{}┘", "─".repeat(w.saturating_sub(2)))))?;

    // Side walls
    for row in 2..h.saturating_sub(2) {
        out.queue(cursor::MoveTo(0, row))?;
        out.queue(Print("│"))?;
        out.queue(cursor::MoveTo(view.cols.saturating_sub(1), row))?;
        out.queue(Print("│"))?;
    }

    Ok(())
}

// ── HUD (row 0) ───────────────────────────────────────────────────────────────

fn draw_hud<W: Write>(
    out: &mut W,
    state: &GameState,
    view: &Viewport,
    overlay: &Overlay,
) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(1, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_SCORE))?;
    out.queue(Print(format!(
        "Score:{:>6}  Best:{:>6}",
        state.score,
        overlay.personal_best.max(state.score)
    )))?;

    let wave_str = format!("[ WAVE {} ]", state.wave);
    let wx = (view.cols / 2).saturating_sub(wave_str.len() as u16 / 2);
    out.queue(cursor::MoveTo(wx, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_WAVE))?;
    out.queue(Print(&wave_str))?;

    // Active buffs + health, right side
    let buffs = &state.player.buffs;
    let mut buff_tag = String::new();
    if buffs.speed_time > 0.0 {
        buff_tag.push_str(&format!("[» SPD {:>2}s] ", buffs.speed_time.ceil() as u32));
    }
    if buffs.fire_rate_time > 0.0 {
        buff_tag.push_str(&format!("[◇ FIRE {:>2}s] ", buffs.fire_rate_time.ceil() as u32));
    }
    let health_str = format!("Health:{:>4}", state.player.health.floor() as u32);
    let right_len = (buff_tag.chars().count() + health_str.chars().count()) as u16;
    out.queue(cursor::MoveTo(view.cols.saturating_sub(right_len + 1), 0))?;
    if !buff_tag.is_empty() {
        out.queue(style::SetForegroundColor(C_FIRERATE))?;
        out.queue(Print(&buff_tag))?;
    }
    out.queue(style::SetForegroundColor(C_HUD_HEALTH))?;
    out.queue(Print(&health_str))?;

    Ok(())
}

// ── Entities ──────────────────────────────────────────────────────────────────

fn put<W: Write>(
    out: &mut W,
    view: &Viewport,
    x: f32,
    y: f32,
    glyph: &str,
    color: Color,
) -> std::io::Result<()> {
    if let Some((col, row)) = view.to_cell(x, y) {
        out.queue(cursor::MoveTo(col, row))?;
        out.queue(style::SetForegroundColor(color))?;
        out.queue(Print(glyph))?;
    }
    Ok(())
}

fn draw_player<W: Write>(out: &mut W, state: &GameState, view: &Viewport) -> std::io::Result<()> {
    let p = &state.player;
    let blink = p.is_invulnerable() && (state.time * 20.0).floor() as u32 % 2 == 0;

    // Aim marker a little way along the aim line
    let reach = p.radius * 2.5;
    let (sin, cos) = p.aim_angle.sin_cos();
    put(out, view, p.x + cos * reach, p.y + sin * reach, "·", C_AIM)?;

    let color = if blink { C_PLAYER_BLINK } else { C_PLAYER };
    put(out, view, p.x, p.y, "@", color)
}

fn draw_enemy<W: Write>(out: &mut W, enemy: &Enemy, view: &Viewport) -> std::io::Result<()> {
    let glyph = match enemy.kind {
        EnemyKind::Grunt => "■",
        EnemyKind::Runner => "▲",
        EnemyKind::Tank => "◆",
    };
    let color = if enemy.hit_flash > 0.0 { C_ENEMY_FLASH } else { C_ENEMY };
    put(out, view, enemy.x, enemy.y, glyph, color)
}

fn draw_bullet<W: Write>(out: &mut W, bullet: &Bullet, view: &Viewport) -> std::io::Result<()> {
    put(out, view, bullet.x, bullet.y, "•", C_BULLET)
}

/// Symbols:
///   »  (blue)   : speed boost
///   ◇  (green)  : fire-rate boost
///   ♥  (magenta): heal
fn draw_powerup<W: Write>(out: &mut W, powerup: &PowerUp, view: &Viewport) -> std::io::Result<()> {
    let (glyph, color) = match powerup.kind {
        PowerUpKind::Speed => ("»", C_SPEED),
        PowerUpKind::FireRate => ("◇", C_FIRERATE),
        PowerUpKind::Heart => ("♥", C_HEART),
    };
    put(out, view, powerup.x, powerup.y, glyph, color)
}

fn draw_particle<W: Write>(out: &mut W, particle: &Particle, view: &Viewport) -> std::io::Result<()> {
    let glyph = if particle.fade() > 0.5 { "*" } else { "." };
    let c = particle.color;
    put(
        out,
        view,
        particle.x,
        particle.y,
        glyph,
        Color::Rgb { r: c.r, g: c.g, b: c.b },
    )
}

// ── Controls hint (last row) ──────────────────────────────────────────────────

fn draw_controls_hint<W: Write>(out: &mut W, view: &Viewport) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(1, view.rows.saturating_sub(1)))?;
    out.queue(style::SetForegroundColor(C_HINT))?;
    out.queue(Print(
        "WASD/Arrows: Move   Mouse: Aim   SPACE/Click: Shoot   P: Pause   Q: Quit",
    ))?;
    Ok(())
}

// ── Overlays ──────────────────────────────────────────────────────────────────

fn draw_centered<W: Write>(
    out: &mut W,
    view: &Viewport,
    row: u16,
    text: &str,
    color: Color,
) -> std::io::Result<()> {
    let col = (view.cols / 2).saturating_sub(text.chars().count() as u16 / 2);
    out.queue(cursor::MoveTo(col, row))?;
    out.queue(style::SetForegroundColor(color))?;
    out.queue(Print(text))?;
    Ok(())
}

fn draw_title<W: Write>(out: &mut W, view: &Viewport, overlay: &Overlay) -> std::io::Result<()> {
    let cy = view.rows / 2;
    draw_centered(out, view, cy.saturating_sub(3), "★  ARENA  SHOOTER  ★", Color::Cyan)?;
    if overlay.personal_best > 0 {
        let best = format!("Personal Best: {}", overlay.personal_best);
        draw_centered(out, view, cy.saturating_sub(1), &best, Color::Yellow)?;
    }
    draw_centered(out, view, cy + 1, "Press ENTER to start", Color::White)?;
    draw_centered(
        out,
        view,
        cy + 3,
        "Power-ups:  » speed   ◇ fire rate   ♥ heal",
        C_HINT,
    )
}

fn draw_game_over<W: Write>(
    out: &mut W,
    state: &GameState,
    view: &Viewport,
    overlay: &Overlay,
) -> std::io::Result<()> {
    let limit = state.config.leaderboard.limit;
    let board_rows = limit.min(view.rows.saturating_sub(14) as usize) as u16;
    let mut row = (view.rows / 2).saturating_sub(5 + board_rows / 2);

    for line in [
        "╔════════════════════╗",
        "║    GAME  OVER      ║",
        "╚════════════════════╝",
    ] {
        draw_centered(out, view, row, line, Color::Red)?;
        row += 1;
    }

    let score_line = format!("Final Score: {:>6}  (Wave {})", state.score, state.wave);
    draw_centered(out, view, row, &score_line, Color::Yellow)?;
    row += 1;

    let (best_line, best_color) = match overlay.best_note {
        Some(PersonalBest::New { previous }) => (
            format!("★ New Personal Best! {} (was {}) ★", state.score, previous),
            Color::Yellow,
        ),
        Some(PersonalBest::Standing(best)) => (format!("Personal Best: {best}"), C_HINT),
        _ => (String::new(), C_HINT),
    };
    draw_centered(out, view, row, &best_line, best_color)?;
    row += 2;

    match overlay.leaderboard {
        None => draw_centered(out, view, row, "Loading leaderboard...", C_HINT)?,
        Some([]) => draw_centered(out, view, row, "No scores yet!", C_HINT)?,
        Some(entries) => {
            for (i, entry) in entries.iter().take(board_rows as usize).enumerate() {
                let you = entry.name == overlay.player_name && entry.score == state.score;
                let line = format!(
                    "{:>2}. {:<16} {:>6} (Wave {})",
                    i + 1,
                    entry.name,
                    entry.score,
                    entry.wave
                );
                let color = if you { Color::Green } else { Color::White };
                draw_centered(out, view, row + i as u16, &line, color)?;
            }
        }
    }
    row += board_rows.max(1) + 1;

    if let Some(text) = overlay.name_entry {
        // Fixed width so the prompt doesn't jump around while typing.
        let field = format!("Name: {:<width$}", format!("{text}_"), width = NAME_MAX_LEN + 1);
        draw_centered(out, view, row, &field, Color::Yellow)?;
        let hint = "Enter - Submit   Esc - Cancel";
        return draw_centered(out, view, row + 1, hint, C_HINT);
    }

    let hint = if overlay.submitted {
        "Submitted!   R - Play Again   Q - Quit".to_string()
    } else if state.score == 0 {
        "R - Play Again   Q - Quit".to_string()
    } else {
        "S - Enter Name   R - Play Again   Q - Quit".to_string()
    };
    draw_centered(out, view, row, &hint, Color::White)
}
