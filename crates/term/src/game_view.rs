//! GameView: maps a `core::SessionSnapshot` into a terminal framebuffer.
//!
//! This module is pure (no I/O). It can be unit-tested.

use std::f32::consts::TAU;
use std::fmt::Write as _;

use arrayvec::ArrayString;

use crate::core::SessionSnapshot;
use crate::fb::{CellStyle, FrameBuffer, Rgb};
use crate::types::{GameOverReason, ModifierKind, SessionPhase, FOG_LUMPS};
use crate::widgets::{ComboMeter, MessageFeed, Rect, SelectionBar, ViewContext, Widget};

/// Terminal viewport dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u16,
    pub height: u16,
}

impl Viewport {
    pub fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }
}

/// Screen areas for one viewport size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    pub title: Rect,
    /// Bordered track frame.
    pub track: Rect,
    pub selection: Rect,
    pub combo: Rect,
    pub messages: Rect,
    /// Empty when the viewport is too narrow for a side panel.
    pub panel: Rect,
}

/// Frontend-owned widgets the view draws alongside the snapshot.
pub struct ViewWidgets<'a> {
    pub selection: &'a SelectionBar,
    pub feed: &'a MessageFeed,
}

/// Columns per train on the track: three-cell body plus a coupling gap.
const TRAIN_SLOT_W: u16 = 4;
const PANEL_W: u16 = 26;
const TRACK_FRAME_H: u16 = 5;
const FOG_GRAY: Rgb = Rgb::new(180, 185, 190);

/// A lightweight terminal renderer for the train matcher.
pub struct GameView {
    title: String,
}

impl Default for GameView {
    fn default() -> Self {
        Self::new("Train Color Matcher")
    }
}

impl GameView {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Compute widget areas for `viewport`.
    pub fn layout(&self, viewport: Viewport) -> Layout {
        let with_panel = viewport.width >= 60 + PANEL_W;
        let main_w = if with_panel {
            viewport.width - PANEL_W - 1
        } else {
            viewport.width
        };

        let track = Rect::new(0, 2, main_w, TRACK_FRAME_H);
        let selection = Rect::new(2, track.bottom() + 1, main_w.saturating_sub(2), 2);
        let combo = Rect::new(2, selection.bottom() + 1, main_w.saturating_sub(4).min(40), 2);
        let messages = Rect::new(
            0,
            combo.bottom() + 1,
            main_w,
            viewport.height.saturating_sub(combo.bottom() + 1).min(4),
        );
        let panel = if with_panel {
            Rect::new(main_w + 1, 2, PANEL_W, viewport.height.saturating_sub(2))
        } else {
            Rect::default()
        };

        Layout {
            title: Rect::new(0, 0, viewport.width, 1),
            track,
            selection,
            combo,
            messages,
            panel,
        }
    }

    /// Render the current session into an existing framebuffer.
    ///
    /// This is the allocation-free hot path. Callers can reuse a framebuffer
    /// across frames and only resize when the terminal size changes.
    pub fn render_into(
        &self,
        ctx: &ViewContext<'_>,
        widgets: &ViewWidgets<'_>,
        viewport: Viewport,
        fb: &mut FrameBuffer,
    ) {
        let theme = ctx.theme;
        fb.resize(viewport.width, viewport.height);
        fb.clear(theme.text_style().cell(' '));

        let layout = self.layout(viewport);
        fb.put_str_centered(0, 0, viewport.width, &self.title, theme.label_style());

        match ctx.snap.phase {
            SessionPhase::Menu => {
                self.draw_menu(fb, ctx, viewport);
                return;
            }
            SessionPhase::Playing | SessionPhase::GameOver => {}
        }

        self.draw_track(fb, ctx, layout.track);
        widgets.selection.draw(fb, layout.selection, ctx);
        ComboMeter.draw(fb, layout.combo, ctx);
        widgets.feed.draw(fb, layout.messages, ctx);
        if !layout.panel.is_empty() {
            self.draw_side_panel(fb, ctx, layout.panel);
        }

        if ctx.snap.phase == SessionPhase::GameOver {
            self.draw_game_over(fb, ctx, viewport);
        } else if ctx.snap.level_intro_ms > 0 {
            self.draw_level_banner(fb, ctx, layout.track);
        }
    }

    /// Option index under a click, using this view's layout.
    pub fn option_at(
        &self,
        ctx: &ViewContext<'_>,
        selection: &SelectionBar,
        viewport: Viewport,
        x: u16,
        y: u16,
    ) -> Option<usize> {
        let layout = self.layout(viewport);
        selection.hit_test(layout.selection, x, y, ctx)
    }

    fn draw_border(&self, fb: &mut FrameBuffer, area: Rect, style: CellStyle) {
        let (x, y, w, h) = (area.x, area.y, area.w, area.h);
        if w < 2 || h < 2 {
            return;
        }

        fb.put_char(x, y, '┌', style);
        fb.put_char(x + w - 1, y, '┐', style);
        fb.put_char(x, y + h - 1, '└', style);
        fb.put_char(x + w - 1, y + h - 1, '┘', style);

        for dx in 1..w - 1 {
            fb.put_char(x + dx, y, '─', style);
            fb.put_char(x + dx, y + h - 1, '─', style);
        }
        for dy in 1..h - 1 {
            fb.put_char(x, y + dy, '│', style);
            fb.put_char(x + w - 1, y + dy, '│', style);
        }
    }

    /// Head-of-queue marker row, train row, rail row.
    fn draw_track(&self, fb: &mut FrameBuffer, ctx: &ViewContext<'_>, area: Rect) {
        let theme = ctx.theme;
        let snap = ctx.snap;
        self.draw_border(fb, area, CellStyle::new(theme.rail, theme.background));
        if area.w < 2 + TRAIN_SLOT_W {
            return;
        }

        let inner_x = area.x + 1;
        let inner_w = area.w - 2;
        let marker_y = area.y + 1;
        let train_y = area.y + 2;
        let rail_y = area.y + 3;

        let sleeper = CellStyle::new(theme.rail, theme.track);
        for dx in 0..inner_w {
            let ch = if dx % 2 == 0 { '═' } else { '╪' };
            fb.put_char(inner_x + dx, rail_y, ch, sleeper);
        }

        let visible = (inner_w / TRAIN_SLOT_W) as usize;
        let first = first_visible_train(snap.track.len(), snap.current_index, visible);

        for (slot, (i, train)) in snap
            .track
            .iter()
            .enumerate()
            .skip(first)
            .take(visible)
            .enumerate()
        {
            let x = inner_x + 1 + slot as u16 * TRAIN_SLOT_W;
            let rgb = ctx.train_rgb(train.color);
            if train.matched {
                // Departed: only a faint outline stays behind.
                let gone = CellStyle::new(rgb.mix(theme.background, 0.7), theme.background).dim();
                fb.put_str(x, train_y, "···", gone);
                continue;
            }
            let label_fg = if rgb.luma() > 140 {
                Rgb::new(0, 0, 0)
            } else {
                Rgb::new(255, 255, 255)
            };
            let body = CellStyle::new(label_fg, rgb).bold();
            fb.put_char(x, train_y, '▐', CellStyle::new(rgb, theme.background));
            fb.put_char(x + 1, train_y, train.color.label(), body);
            fb.put_char(x + 2, train_y, '▌', CellStyle::new(rgb, theme.background));

            if i == snap.current_index && snap.phase == SessionPhase::Playing {
                let marker = CellStyle::new(theme.primary, theme.background).bold();
                fb.put_char(x + 1, marker_y, '▼', marker);
            }
        }

        if snap.modifiers.contains(ModifierKind::DenseFog) {
            self.draw_fog(fb, ctx, Rect::new(inner_x, marker_y, inner_w, 3));
        }
    }

    /// Tint drifting fog lumps over `area`; labels stay readable.
    fn draw_fog(&self, fb: &mut FrameBuffer, ctx: &ViewContext<'_>, area: Rect) {
        let snap = ctx.snap;
        let half_w = (area.w as f32 / (FOG_LUMPS as f32 * 2.0)).max(1.0);
        for dx in 0..area.w {
            let density = fog_density(dx, area.w, snap.fog_phase, &snap.fog_offsets, half_w);
            if density <= 0.0 {
                continue;
            }
            for dy in 0..area.h {
                let (x, y) = (area.x + dx, area.y + dy);
                if let Some(mut cell) = fb.get(x, y) {
                    cell.style.bg = cell.style.bg.mix(FOG_GRAY, density * 0.6);
                    if cell.ch == ' ' {
                        cell.ch = '░';
                        cell.style.fg = FOG_GRAY;
                        cell.style.dim = true;
                    }
                    fb.set(x, y, cell);
                }
            }
        }
    }

    fn draw_side_panel(&self, fb: &mut FrameBuffer, ctx: &ViewContext<'_>, area: Rect) {
        let theme = ctx.theme;
        let snap = ctx.snap;
        let label = theme.label_style();
        let value = theme.text_style();
        let x = area.x;
        let mut y = area.y;
        let mut line: ArrayString<32> = ArrayString::new();

        fb.put_str(x, y, "SCORE", label);
        fb.put_u32(x + 12, y, snap.score, value);
        y += 1;
        fb.put_str(x, y, "HIGH SCORE", label);
        fb.put_u32(x + 12, y, snap.high_score.max(snap.score), value);
        y += 2;

        fb.put_str(x, y, "MODE", label);
        fb.put_str(x + 12, y, mode_title(snap), value);
        y += 1;
        fb.put_str(x, y, "LEVEL", label);
        fb.put_u32(x + 12, y, snap.level, value);
        y += 1;
        fb.put_str(x, y, &snap.level_name, theme.muted_style());
        y += 2;

        fb.put_str(x, y, "MISTAKES", label);
        let end = fb.put_u32(x + 12, y, snap.mistakes, value);
        fb.put_char(end, y, '/', value);
        let end = end.saturating_add(1);
        match snap.max_mistakes {
            Some(max) => {
                fb.put_u32(end, y, max, value);
            }
            None => {
                fb.put_char(end, y, '∞', value);
            }
        }
        y += 1;
        fb.put_str(x, y, "REMAINING", label);
        fb.put_u32(
            x + 12,
            y,
            snap.track.len().saturating_sub(snap.current_index) as u32,
            value,
        );
        y += 1;
        fb.put_str(x, y, "ACCURACY", label);
        line.clear();
        let _ = write!(line, "{:.0}%", snap.accuracy);
        fb.put_str(x + 12, y, &line, value);
        y += 1;
        fb.put_str(x, y, "COMBO", label);
        fb.put_u32(x + 12, y, snap.combo, value);
        y += 2;

        fb.put_str(x, y, "DIFFICULTY", label);
        fb.put_str(x + 12, y, difficulty_title(snap.difficulty_delta), value);
        y += 1;
        fb.put_str(x, y, "ZEN", label);
        let zen = if snap.zen {
            CellStyle::new(theme.secondary, theme.background).bold()
        } else {
            theme.muted_style()
        };
        fb.put_str(x + 12, y, if snap.zen { "On" } else { "Off" }, zen);
        y += 2;

        fb.put_str(x, y, "CONDITIONS", label);
        y += 1;
        if snap.modifiers.is_empty() {
            fb.put_str(x + 1, y, "Clear skies", theme.muted_style());
            y += 1;
        }
        for kind in snap.modifiers.iter() {
            fb.put_str(x + 1, y, kind.title(), value);
            y += 1;
        }
        line.clear();
        let _ = write!(line, "Speed {:.2}x", snap.speed_multiplier);
        let speed = if snap.express_active {
            CellStyle::new(theme.accent, theme.background).bold()
        } else {
            theme.muted_style()
        };
        fb.put_str(x + 1, y, &line, speed);
        if snap.express_active {
            fb.put_str(x + 1 + line.len() as u16, y, " EXPRESS", speed);
        }
        y += 2;

        if y + 1 < area.bottom() {
            fb.put_str(x, y, "1-7 pick  ←/→ ⏎ match", theme.muted_style());
            fb.put_str(x, y + 1, "r m z x t  q quit", theme.muted_style());
        }
    }

    fn draw_level_banner(&self, fb: &mut FrameBuffer, ctx: &ViewContext<'_>, track: Rect) {
        let theme = ctx.theme;
        let mut text: ArrayString<64> = ArrayString::new();
        let _ = write!(text, " Level {} - {} ", ctx.snap.level, ctx.snap.level_name);
        let style = CellStyle::new(theme.background, theme.primary).bold();
        fb.put_str_centered(track.x, track.y, track.w, &text, style);
    }

    fn draw_menu(&self, fb: &mut FrameBuffer, ctx: &ViewContext<'_>, viewport: Viewport) {
        let theme = ctx.theme;
        let snap = ctx.snap;
        let w = viewport.width;
        let mut y = viewport.height.saturating_sub(10) / 2;
        let mut line: ArrayString<48> = ArrayString::new();

        fb.put_str_centered(0, y, w, "Match the trains starting from the left!", theme.text_style());
        y += 2;
        let _ = write!(line, "Mode: {}", mode_title(snap));
        fb.put_str_centered(0, y, w, &line, theme.label_style());
        y += 1;
        line.clear();
        let _ = write!(line, "High Score: {}", snap.high_score);
        fb.put_str_centered(0, y, w, &line, theme.text_style());
        y += 1;
        line.clear();
        let _ = write!(
            line,
            "Difficulty: {}  Zen: {}",
            difficulty_title(snap.difficulty_delta),
            if snap.zen { "On" } else { "Off" }
        );
        fb.put_str_centered(0, y, w, &line, theme.muted_style());
        y += 2;
        let start = CellStyle::new(theme.background, theme.primary).bold();
        fb.put_str_centered(0, y, w, " Press Enter to start ", start);
        y += 2;
        fb.put_str_centered(0, y, w, "m mode  x difficulty  z zen  t theme  q quit", theme.muted_style());
    }

    fn draw_game_over(&self, fb: &mut FrameBuffer, ctx: &ViewContext<'_>, viewport: Viewport) {
        let theme = ctx.theme;
        let snap = ctx.snap;
        let box_w = 46.min(viewport.width);
        let box_h = 7.min(viewport.height);
        let x = viewport.width.saturating_sub(box_w) / 2;
        let y = viewport.height.saturating_sub(box_h) / 2;

        let panel = CellStyle::new(theme.text, theme.button);
        fb.fill_rect(x, y, box_w, box_h, ' ', panel);
        self.draw_border(fb, Rect::new(x, y, box_w, box_h), panel);

        let (headline, reason, color) = match snap.game_over_reason {
            Some(GameOverReason::Victory) => (
                "All routes cleared!",
                "Amazing! You completed every route!",
                theme.secondary,
            ),
            _ => (
                "Game Over!",
                "The station closed after too many mix-ups.",
                theme.error,
            ),
        };
        let inner_x = x + 1;
        let inner_w = box_w.saturating_sub(2);
        fb.put_str_centered(inner_x, y + 1, inner_w, headline, CellStyle::new(color, theme.button).bold());
        fb.put_str_centered(inner_x, y + 2, inner_w, reason, panel);

        let mut line: ArrayString<48> = ArrayString::new();
        let _ = write!(line, "Final Score: {}", snap.score);
        fb.put_str_centered(inner_x, y + 4, inner_w, &line, panel.bold());
        fb.put_str_centered(inner_x, y + 5, inner_w, "r play again  m mode  q quit", panel.dim());
    }
}

/// First train index to draw so the head of the queue stays on screen.
fn first_visible_train(len: usize, current: usize, visible: usize) -> usize {
    if visible == 0 || len <= visible {
        return 0;
    }
    current.min(len - visible)
}

/// Fog density in `[0, 1]` at column `dx` of a `width`-column track.
fn fog_density(dx: u16, width: u16, phase: f32, offsets: &[f32; FOG_LUMPS], half_w: f32) -> f32 {
    if width == 0 {
        return 0.0;
    }
    let w = width as f32;
    let mut density: f32 = 0.0;
    for offset in offsets {
        let center = ((offset + phase) % TAU) / TAU * w;
        let dist = (dx as f32 - center).abs().min(w - (dx as f32 - center).abs());
        if dist < half_w {
            density = density.max(1.0 - dist / half_w);
        }
    }
    density
}

fn mode_title(snap: &SessionSnapshot) -> &'static str {
    match snap.mode {
        crate::types::GameMode::Campaign => "Campaign",
        crate::types::GameMode::Endless => "Endless",
    }
}

fn difficulty_title(delta: i32) -> &'static str {
    match delta {
        0 => "Standard",
        d if d > 0 => "Relaxed",
        _ => "Expert",
    }
}
