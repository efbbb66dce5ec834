//! Display pairs handed to the view

use crate::constants::{blink, palette};

/// How a flag binding wants to be rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderHint {
    /// Colored label
    #[default]
    Text,
    /// One of `{name}_on` / `{name}_off` icons, resolved by the view
    IconPair,
}

/// Time-derived emphasis for low values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlinkPhase {
    #[default]
    On,
    Off,
}

impl BlinkPhase {
    /// On during even half-second intervals since the epoch
    pub fn from_millis(epoch_millis: i64) -> Self {
        if epoch_millis.div_euclid(blink::HALF_PERIOD_MS).rem_euclid(2) == 0 {
            BlinkPhase::On
        } else {
            BlinkPhase::Off
        }
    }

    pub fn now() -> Self {
        Self::from_millis(chrono::Utc::now().timestamp_millis())
    }
}

/// Color set and flag wording of one window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub name: &'static str,
    pub on: &'static str,
    pub off: &'static str,
    pub low: &'static str,
    pub normal: &'static str,
    pub background: &'static str,
    /// `Label: ON` instead of a bare `ON`
    pub labelled_flags: bool,
}

impl Theme {
    pub const MONITOR: Theme = Theme {
        name: palette::monitor::NAME,
        on: palette::monitor::ON,
        off: palette::monitor::OFF,
        low: palette::monitor::LOW,
        normal: palette::monitor::ON,
        background: palette::monitor::BACKGROUND,
        labelled_flags: true,
    };

    pub const EDITOR: Theme = Theme {
        name: palette::editor::TEXT,
        on: palette::editor::ON,
        off: palette::editor::OFF,
        low: palette::editor::OFF,
        normal: palette::editor::TEXT,
        background: palette::editor::BACKGROUND,
        labelled_flags: false,
    };
}

/// Color key or icon key selected for a value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayStyle {
    /// Hex color string
    Color(&'static str),
    /// `{name}_{on|off}`
    Icon(String),
}

/// Text plus style, recomputed every frame from the cached value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDisplay {
    pub text: String,
    pub style: DisplayStyle,
}

impl FieldDisplay {
    pub fn colored(text: impl Into<String>, color: &'static str) -> Self {
        Self {
            text: text.into(),
            style: DisplayStyle::Color(color),
        }
    }
}
