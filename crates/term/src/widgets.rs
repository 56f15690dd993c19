//! Small framebuffer widgets composed by [`GameView`](crate::game_view::GameView).
//!
//! Every widget draws into a caller-chosen [`Rect`]. Stateful widgets (the
//! message feed, the selection cursor) are owned by the frontend and advanced
//! with [`Widget::update`]; the rest read everything from the snapshot.

use std::fmt::Write as _;

use arrayvec::{ArrayString, ArrayVec};

use train_matcher_config::Palette;

use crate::core::{SessionEvent, SessionSnapshot};
use crate::fb::{CellStyle, FrameBuffer, Rgb};
use crate::theme::Theme;
use crate::types::{TrainColor, PALETTE_SIZE};

/// Screen rectangle in terminal cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: u16,
    pub y: u16,
    pub w: u16,
    pub h: u16,
}

impl Rect {
    pub const fn new(x: u16, y: u16, w: u16, h: u16) -> Self {
        Self { x, y, w, h }
    }

    pub fn contains(&self, x: u16, y: u16) -> bool {
        x >= self.x
            && y >= self.y
            && (x as u32) < self.x as u32 + self.w as u32
            && (y as u32) < self.y as u32 + self.h as u32
    }

    pub fn is_empty(&self) -> bool {
        self.w == 0 || self.h == 0
    }

    pub fn right(&self) -> u16 {
        self.x.saturating_add(self.w)
    }

    pub fn bottom(&self) -> u16 {
        self.y.saturating_add(self.h)
    }
}

/// Everything a widget may read while drawing.
#[derive(Debug, Clone, Copy)]
pub struct ViewContext<'a> {
    pub snap: &'a SessionSnapshot,
    pub theme: &'a Theme,
    pub palette: &'a Palette,
}

impl ViewContext<'_> {
    pub fn train_rgb(&self, color: TrainColor) -> Rgb {
        self.palette.train(color).into()
    }
}

pub trait Widget {
    fn draw(&self, fb: &mut FrameBuffer, area: Rect, ctx: &ViewContext<'_>);

    /// Advance timers by `elapsed_ms`.
    fn update(&mut self, _elapsed_ms: u32) {}

    /// Index of the interactive element at `(x, y)` inside `area`, if any.
    fn hit_test(&self, _area: Rect, _x: u16, _y: u16, _ctx: &ViewContext<'_>) -> Option<usize> {
        None
    }
}

const MESSAGE_CAPACITY: usize = 4;
const MESSAGE_TEXT: usize = 48;
const SUPER_GOLD: Rgb = Rgb::new(255, 215, 0);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedMessage {
    pub text: ArrayString<MESSAGE_TEXT>,
    pub color: Rgb,
    total_ms: u32,
    remaining_ms: u32,
}

impl FeedMessage {
    /// Fraction of the lifetime left, in `[0, 1]`.
    pub fn life(&self) -> f32 {
        if self.total_ms == 0 {
            return 0.0;
        }
        self.remaining_ms as f32 / self.total_ms as f32
    }
}

/// Short-lived feedback lines, newest at the bottom, fading out.
#[derive(Debug, Clone, Default)]
pub struct MessageFeed {
    messages: ArrayVec<FeedMessage, MESSAGE_CAPACITY>,
}

impl MessageFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `text` for `duration_ms`. Long text is cut at the last char
    /// that fits; the oldest message is dropped when the feed is full.
    pub fn push(&mut self, text: &str, color: Rgb, duration_ms: u32) {
        let mut s = ArrayString::new();
        for ch in text.chars() {
            if s.try_push(ch).is_err() {
                break;
            }
        }
        if self.messages.is_full() {
            self.messages.remove(0);
        }
        self.messages.push(FeedMessage {
            text: s,
            color,
            total_ms: duration_ms,
            remaining_ms: duration_ms,
        });
    }

    /// Turn a session event into player feedback, if it deserves any.
    pub fn announce(&mut self, event: &SessionEvent, theme: &Theme) {
        let mut text: ArrayString<MESSAGE_TEXT> = ArrayString::new();
        let (color, duration_ms) = match *event {
            SessionEvent::Matched { .. } => {
                let _ = text.try_push_str("Correct!");
                (theme.secondary, 1000)
            }
            SessionEvent::Missed { .. } => {
                let _ = text.try_push_str("Wrong Color!");
                (theme.error, 1000)
            }
            SessionEvent::MistakeForgiven { .. } => {
                let _ = text.try_push_str("Signal restored! Mistake forgiven.");
                (theme.secondary, 1200)
            }
            SessionEvent::ComboStreak { combo, super_combo } => {
                let _ = write!(text, "COMBO x{}!", combo);
                if super_combo {
                    let _ = text.try_push_str(" SUPER!");
                    (SUPER_GOLD, 1500)
                } else {
                    (theme.accent, 1500)
                }
            }
            SessionEvent::ModifierUnlocked(kind) => {
                let _ = write!(text, "Route conditions: {}", kind.title());
                (theme.accent, 2000)
            }
            SessionEvent::ExpressStarted => {
                let _ = text.try_push_str("Express signals! Departures speed up!");
                (theme.accent, 900)
            }
            SessionEvent::ExpressEnded => {
                let _ = text.try_push_str("Signals stable. Pace returning to normal.");
                (theme.secondary, 800)
            }
            SessionEvent::ZenChanged(on) => {
                let _ = text.try_push_str(if on { "Zen On" } else { "Zen Off" });
                (theme.primary, 1000)
            }
            SessionEvent::MistakeLimitChanged {
                max_mistakes: Some(max),
            } => {
                let _ = write!(text, "Mistake limit: {}", max);
                (theme.primary, 1000)
            }
            SessionEvent::MistakeLimitChanged { max_mistakes: None }
            | SessionEvent::RunStarted { .. }
            | SessionEvent::LevelStarted { .. }
            | SessionEvent::GameOver { .. } => return,
        };
        self.push(&text, color, duration_ms);
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FeedMessage> {
        self.messages.iter()
    }
}

impl Widget for MessageFeed {
    fn draw(&self, fb: &mut FrameBuffer, area: Rect, ctx: &ViewContext<'_>) {
        if area.is_empty() {
            return;
        }
        let bg = ctx.theme.background;
        let visible = self.messages.len().min(area.h as usize);
        let skip = self.messages.len() - visible;
        for (row, msg) in self.messages.iter().skip(skip).enumerate() {
            let fg = msg.color.mix(bg, 1.0 - msg.life());
            let mut style = CellStyle::new(fg, bg).bold();
            if msg.life() < 0.33 {
                style = style.dim();
            }
            fb.put_str_centered(area.x, area.y + row as u16, area.w, &msg.text, style);
        }
    }

    fn update(&mut self, elapsed_ms: u32) {
        for msg in self.messages.iter_mut() {
            msg.remaining_ms = msg.remaining_ms.saturating_sub(elapsed_ms);
        }
        self.messages.retain(|m| m.remaining_ms > 0);
    }
}

/// "Signal Bonus" bar: progress toward the next forgiven mistake.
#[derive(Debug, Clone, Copy, Default)]
pub struct ComboMeter;

impl Widget for ComboMeter {
    fn draw(&self, fb: &mut FrameBuffer, area: Rect, ctx: &ViewContext<'_>) {
        if area.h < 2 || area.w < 8 {
            return;
        }
        let theme = ctx.theme;
        fb.put_str(area.x, area.y, "Signal Bonus", theme.label_style());

        let interval = ctx.snap.forgiveness_interval.max(1);
        let progress = ctx.snap.combo_progress.min(interval);

        // "[####....] 3/4"
        let mut ratio: ArrayString<16> = ArrayString::new();
        let _ = write!(ratio, " {}/{}", progress, interval);
        let bar_w = area.w.saturating_sub(2 + ratio.len() as u16).max(1);
        let filled = (bar_w as u32 * progress / interval) as u16;

        let y = area.y + 1;
        let frame = theme.text_style();
        fb.put_char(area.x, y, '[', frame);
        let fill = CellStyle::new(theme.accent, theme.background);
        let empty = CellStyle::new(theme.button, theme.background);
        for i in 0..bar_w {
            if i < filled {
                fb.put_char(area.x + 1 + i, y, '█', fill);
            } else {
                fb.put_char(area.x + 1 + i, y, '░', empty);
            }
        }
        let end = fb.put_str(area.x + 1 + bar_w, y, "]", frame);
        fb.put_str(end, y, &ratio, frame);
    }
}

/// Width of one option slot: `[1 R]` plus a gap.
pub const OPTION_SLOT_W: u16 = 7;

/// Row of selectable colors with a keyboard cursor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SelectionBar {
    cursor: usize,
}

impl SelectionBar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Move left, wrapping around `len` options.
    pub fn move_left(&mut self, len: usize) {
        if len == 0 {
            return;
        }
        self.cursor = (self.cursor.min(len - 1) + len - 1) % len;
    }

    pub fn move_right(&mut self, len: usize) {
        if len == 0 {
            return;
        }
        self.cursor = (self.cursor.min(len - 1) + 1) % len;
    }

    pub fn set_cursor(&mut self, index: usize, len: usize) {
        self.cursor = if len == 0 { 0 } else { index.min(len - 1) };
    }

    /// Keep the cursor inside a freshly regenerated option list.
    pub fn clamp(&mut self, len: usize) {
        self.set_cursor(self.cursor, len);
    }

    pub fn selected(&self, options: &[TrainColor]) -> Option<TrainColor> {
        options.get(self.cursor).copied()
    }

    fn slot_x(area: Rect, i: usize) -> u16 {
        area.x.saturating_add(i as u16 * OPTION_SLOT_W)
    }

    /// Whether slot `i` is drawn at all inside `area`.
    fn slot_fits(area: Rect, i: usize) -> bool {
        Self::slot_x(area, i).saturating_add(OPTION_SLOT_W - 1) <= area.right()
    }
}

impl Widget for SelectionBar {
    fn draw(&self, fb: &mut FrameBuffer, area: Rect, ctx: &ViewContext<'_>) {
        if area.is_empty() {
            return;
        }
        let theme = ctx.theme;
        let options = &ctx.snap.options;
        let active = ctx.snap.playable();

        for (i, &color) in options.iter().enumerate().take(PALETTE_SIZE) {
            if !Self::slot_fits(area, i) {
                break;
            }
            let x = Self::slot_x(area, i);
            let rgb = ctx.train_rgb(color);
            // Pick a label color that stays readable on the train color.
            let label_fg = if rgb.luma() > 140 {
                Rgb::new(0, 0, 0)
            } else {
                Rgb::new(255, 255, 255)
            };
            let mut body = CellStyle::new(label_fg, rgb).bold();
            if !active {
                body = body.dim();
            }

            fb.put_char(x, area.y, '[', theme.text_style());
            fb.put_char(x + 1, area.y, char::from(b'1' + i as u8), body);
            fb.put_char(x + 2, area.y, ' ', body);
            fb.put_char(x + 3, area.y, color.label(), body);
            fb.put_char(x + 4, area.y, ']', theme.text_style());

            if area.h > 1 && i == self.cursor && active {
                let cursor = CellStyle::new(theme.primary, theme.background).bold();
                fb.put_str(x, area.y + 1, " ^^^ ", cursor);
            }
        }
    }

    fn hit_test(&self, area: Rect, x: u16, y: u16, ctx: &ViewContext<'_>) -> Option<usize> {
        if !area.contains(x, y) || x < area.x {
            return None;
        }
        let dx = x - area.x;
        let i = (dx / OPTION_SLOT_W) as usize;
        // The gap after each slot is not clickable.
        if dx % OPTION_SLOT_W >= OPTION_SLOT_W - 2 {
            return None;
        }
        (i < ctx.snap.options.len() && Self::slot_fits(area, i)).then_some(i)
    }
}
