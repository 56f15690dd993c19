//! Settings file loading and validation
//!
//! The settings file is plain JSON. Nothing in it is required: every field is
//! validated on its own and an invalid value falls back to the default for
//! that field only, so a typo in one color never throws away the rest of the
//! file.
//!
//! ```json
//! {
//!   "window": { "title": "Train Color Matching Game", "width": 1280, "height": 720 },
//!   "colors": { "red": [255, 0, 0], "cyan": [0, 188, 212] },
//!   "game": { "initial_train_speed": 5, "initial_max_trains": 10, "max_trains_cap": 15 },
//!   "rules": { "forgiveness_interval": 4, "endless_penalty_every": 3 },
//!   "levels": [ { "name": "Warmup", "colors": ["red", "blue"], "mistakes_allowed": 3 } ],
//!   "seed": 42
//! }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use train_matcher_core::{LevelCatalog, LevelDefinition, RuleTuning, SessionConfig};
use train_matcher_types::{ModifierKind, TrainColor, MAX_TRACK_TRAINS};

pub const DEFAULT_CONFIG_PATH: &str = "config.json";
pub const DEFAULT_TITLE: &str = "Train Color Matching Game";
/// Smallest accepted `window.width` / `window.height`.
pub const MIN_WINDOW_SIZE: (u32, u32) = (800, 600);

const CONFIG_PATH_ENV: &str = "TRAIN_MATCHER_CONFIG";
const SEED_ENV: &str = "TRAIN_MATCHER_SEED";

const DEFAULT_SPACING: u32 = 80;
const DEFAULT_MISTAKES: u32 = 3;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// An `[r, g, b]` color triplet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColorTriplet(pub u8, pub u8, pub u8);

impl ColorTriplet {
    pub fn r(&self) -> u8 {
        self.0
    }

    pub fn g(&self) -> u8 {
        self.1
    }

    pub fn b(&self) -> u8 {
        self.2
    }
}

/// Named colors used by the frontend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Palette {
    pub red: ColorTriplet,
    pub blue: ColorTriplet,
    pub green: ColorTriplet,
    pub yellow: ColorTriplet,
    pub purple: ColorTriplet,
    pub orange: ColorTriplet,
    pub cyan: ColorTriplet,
    pub white: ColorTriplet,
    pub black: ColorTriplet,
    pub gray: ColorTriplet,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            red: ColorTriplet(255, 0, 0),
            blue: ColorTriplet(0, 0, 255),
            green: ColorTriplet(0, 255, 0),
            yellow: ColorTriplet(255, 255, 0),
            purple: ColorTriplet(155, 89, 182),
            orange: ColorTriplet(255, 140, 0),
            cyan: ColorTriplet(0, 188, 212),
            white: ColorTriplet(255, 255, 255),
            black: ColorTriplet(0, 0, 0),
            gray: ColorTriplet(128, 128, 128),
        }
    }
}

impl Palette {
    /// Display color for a train.
    pub fn train(&self, color: TrainColor) -> ColorTriplet {
        match color {
            TrainColor::Red => self.red,
            TrainColor::Blue => self.blue,
            TrainColor::Green => self.green,
            TrainColor::Yellow => self.yellow,
            TrainColor::Purple => self.purple,
            TrainColor::Orange => self.orange,
            TrainColor::Cyan => self.cyan,
        }
    }

    fn slot_mut(&mut self, name: &str) -> Option<&mut ColorTriplet> {
        Some(match name {
            "red" => &mut self.red,
            "blue" => &mut self.blue,
            "green" => &mut self.green,
            "yellow" => &mut self.yellow,
            "purple" => &mut self.purple,
            "orange" => &mut self.orange,
            "cyan" => &mut self.cyan,
            "white" => &mut self.white,
            "black" => &mut self.black,
            "gray" => &mut self.gray,
            _ => return None,
        })
    }
}

/// The `window` section. The terminal frontend only shows the title; the
/// size is validated so a settings file shared with a windowed build reads
/// the same.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowSettings {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            width: 1280,
            height: 720,
        }
    }
}

/// Fallbacks applied to custom levels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GameSettings {
    pub initial_train_speed: f32,
    pub initial_max_trains: usize,
    /// Hard cap on trains queued by a custom level.
    pub max_trains_cap: usize,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            initial_train_speed: 5.0,
            initial_max_trains: 10,
            max_trains_cap: 15,
        }
    }
}

/// Custom level entry as written in the settings file.
#[derive(Debug, Clone, Deserialize)]
struct RawLevel {
    name: String,
    colors: Vec<String>,
    #[serde(default)]
    train_speed: Option<f32>,
    #[serde(default)]
    max_trains: Option<usize>,
    #[serde(default)]
    spacing: Option<u32>,
    #[serde(default)]
    mistakes_allowed: Option<u32>,
    #[serde(default)]
    modifiers: Vec<String>,
}

/// Validated settings.
#[derive(Debug, Clone, PartialEq)]
pub struct GameConfig {
    pub window: WindowSettings,
    pub palette: Palette,
    pub settings: GameSettings,
    pub tuning: RuleTuning,
    pub levels: LevelCatalog,
    pub seed: Option<u32>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            window: WindowSettings::default(),
            palette: Palette::default(),
            settings: GameSettings::default(),
            tuning: RuleTuning::default(),
            levels: LevelCatalog::builtin(),
            seed: None,
        }
    }
}

impl GameConfig {
    /// Read and validate `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Like [`load`](Self::load), but any failure yields the defaults.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(ConfigError::Io { source, .. }) if source.kind() == std::io::ErrorKind::NotFound => {
                Self::default()
            }
            Err(e) => {
                eprintln!("[Config] {}; using defaults", e);
                Self::default()
            }
        }
    }

    /// Load from `TRAIN_MATCHER_CONFIG` (or `config.json`) and apply
    /// environment overrides.
    pub fn from_env() -> Self {
        use std::env;

        let path = env::var(CONFIG_PATH_ENV)
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());

        let mut config = Self::load_or_default(Path::new(&path));

        if let Some(seed) = env::var(SEED_ENV).ok().and_then(|s| s.trim().parse().ok()) {
            config.seed = Some(seed);
        }

        config
    }

    /// Parse JSON text. Only malformed JSON is an error; bad values are
    /// replaced field by field.
    pub fn from_json_str(text: &str) -> Result<Self, serde_json::Error> {
        let value: Value = serde_json::from_str(text)?;
        Ok(Self::from_value(&value))
    }

    /// Validate an already parsed document. A non-object yields defaults.
    pub fn from_value(value: &Value) -> Self {
        let empty = Map::new();
        let root = value.as_object().unwrap_or(&empty);
        let settings = validate_game_settings(section(root, "game"));

        Self {
            window: validate_window(section(root, "window")),
            palette: validate_colors(section(root, "colors")),
            tuning: validate_rules(section(root, "rules")),
            levels: validate_levels(root.get("levels"), &settings),
            seed: root
                .get("seed")
                .and_then(Value::as_u64)
                .and_then(|s| u32::try_from(s).ok()),
            settings,
        }
    }

    /// Session construction parameters; `fallback_seed` is used when the
    /// file and environment leave the seed unset.
    pub fn session_config(&self, fallback_seed: u32) -> SessionConfig {
        SessionConfig {
            catalog: self.levels.clone(),
            tuning: self.tuning,
            seed: self.seed.unwrap_or(fallback_seed),
        }
    }
}

fn section<'a>(root: &'a Map<String, Value>, key: &str) -> Option<&'a Map<String, Value>> {
    root.get(key).and_then(Value::as_object)
}

fn validate_window(window: Option<&Map<String, Value>>) -> WindowSettings {
    let defaults = WindowSettings::default();
    let Some(window) = window else {
        return defaults;
    };
    // Whole numbers only; a fractional or undersized value is replaced.
    let dimension = |key: &str, min: u32, default: u32| {
        window
            .get(key)
            .and_then(Value::as_u64)
            .and_then(|n| u32::try_from(n).ok())
            .filter(|n| *n >= min)
            .unwrap_or(default)
    };
    WindowSettings {
        title: window
            .get("title")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or(defaults.title),
        width: dimension("width", MIN_WINDOW_SIZE.0, defaults.width),
        height: dimension("height", MIN_WINDOW_SIZE.1, defaults.height),
    }
}

fn validate_colors(colors: Option<&Map<String, Value>>) -> Palette {
    let mut palette = Palette::default();
    let Some(colors) = colors else {
        return palette;
    };
    for (name, value) in colors {
        let Some(slot) = palette.slot_mut(name) else {
            continue;
        };
        match serde_json::from_value::<ColorTriplet>(value.clone()) {
            Ok(c) => *slot = c,
            Err(_) => eprintln!("[Config] colors.{} is not an [r, g, b] triplet; using default", name),
        }
    }
    palette
}

fn positive_f32(v: Option<&Value>) -> Option<f32> {
    v.and_then(Value::as_f64)
        .filter(|n| n.is_finite() && *n > 0.0)
        .map(|n| n as f32)
}

/// Positive whole number. Floats with no fractional part are accepted.
fn positive_u64(v: Option<&Value>) -> Option<u64> {
    let v = v?;
    if let Some(n) = v.as_u64() {
        return (n > 0).then_some(n);
    }
    v.as_f64()
        .filter(|n| n.is_finite() && *n >= 1.0 && n.fract() == 0.0)
        .map(|n| n as u64)
}

fn validate_game_settings(game: Option<&Map<String, Value>>) -> GameSettings {
    let defaults = GameSettings::default();
    let Some(game) = game else {
        return defaults;
    };
    GameSettings {
        initial_train_speed: positive_f32(game.get("initial_train_speed"))
            .unwrap_or(defaults.initial_train_speed),
        initial_max_trains: positive_u64(game.get("initial_max_trains"))
            .map(|n| n as usize)
            .unwrap_or(defaults.initial_max_trains),
        max_trains_cap: positive_u64(game.get("max_trains_cap"))
            .map(|n| n as usize)
            .unwrap_or(defaults.max_trains_cap),
    }
}

fn validate_rules(rules: Option<&Map<String, Value>>) -> RuleTuning {
    let mut tuning = RuleTuning::default();
    let Some(rules) = rules else {
        return tuning;
    };
    if let Some(n) = positive_u64(rules.get("forgiveness_interval")) {
        tuning.forgiveness_interval = n.min(u32::MAX as u64) as u32;
    }
    if let Some(n) = positive_u64(rules.get("endless_penalty_every")) {
        tuning.endless.stages_per_penalty = n.min(u32::MAX as u64) as u32;
    }
    tuning
}

fn validate_levels(levels: Option<&Value>, settings: &GameSettings) -> LevelCatalog {
    let Some(entries) = levels.and_then(Value::as_array) else {
        return LevelCatalog::builtin();
    };

    let defs: Vec<LevelDefinition> = entries
        .iter()
        .enumerate()
        .filter_map(|(i, entry)| {
            let def = serde_json::from_value::<RawLevel>(entry.clone())
                .ok()
                .and_then(|raw| level_from_raw(raw, settings));
            if def.is_none() {
                eprintln!("[Config] levels[{}] is invalid; skipped", i);
            }
            def
        })
        .collect();

    LevelCatalog::new(defs).unwrap_or_else(|| {
        eprintln!("[Config] no playable custom levels; using the built-in campaign");
        LevelCatalog::builtin()
    })
}

fn level_from_raw(raw: RawLevel, settings: &GameSettings) -> Option<LevelDefinition> {
    let colors = raw
        .colors
        .iter()
        .map(|c| TrainColor::from_str(c))
        .collect::<Option<Vec<_>>>()?;
    let modifiers = raw
        .modifiers
        .iter()
        .map(|m| ModifierKind::from_str(m))
        .collect::<Option<Vec<_>>>()?;

    let cap = settings.max_trains_cap.clamp(1, MAX_TRACK_TRAINS);
    let max_trains = raw
        .max_trains
        .filter(|n| *n > 0)
        .unwrap_or(settings.initial_max_trains)
        .min(cap);
    let train_speed = raw
        .train_speed
        .filter(|s| s.is_finite() && *s > 0.0)
        .unwrap_or(settings.initial_train_speed);

    let def = LevelDefinition::new(
        raw.name,
        &colors,
        train_speed,
        max_trains,
        raw.spacing.filter(|s| *s > 0).unwrap_or(DEFAULT_SPACING),
        raw.mistakes_allowed.filter(|m| *m > 0).unwrap_or(DEFAULT_MISTAKES),
        &modifiers,
    );
    def.is_playable().then_some(def)
}
