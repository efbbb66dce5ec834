//! Application-wide constants
//!
//! This module contains all magic numbers and string literals used throughout
//! the application, providing a single source of truth for constant values.

/// Configuration paths and filenames
pub mod config {
    /// Application directory name under XDG config
    pub const APP_DIR: &str = "status-overlay";

    /// Configuration filename
    pub const FILENAME: &str = "config.ini";
}

/// Section and key names shared with the game-side writer
pub mod sections {
    /// Prefix of the per-character sections (`Character1` .. `Character5`)
    pub const CHARACTER_PREFIX: &str = "Character";

    /// Number of character slots shown by the monitor
    pub const CHARACTER_SLOTS: usize = 5;

    /// Section holding the single autoattack switch
    pub const SETTINGS: &str = "Settings";

    /// Key of the autoattack switch inside [`SETTINGS`]
    pub const AUTOATTACK: &str = "autoattack";

    /// Section holding arbitrary user-defined switches
    pub const DEFAULT: &str = "default";

    /// Section holding asset and redirect paths
    pub const PATHS: &str = "Paths";

    /// Section holding overlay tunables
    pub const OVERLAY: &str = "Overlay";
}

/// Keys of the `[Paths]` section
pub mod paths {
    pub const ICON_PATH: &str = "ICON_PATH";
    pub const BACKGROUND_IMAGE_PATH: &str = "BACKGROUND_IMAGE_PATH";
    pub const CONFIG_FILE_PATH: &str = "CONFIG_FILE_PATH";
    pub const STATUS_ICON_DIR: &str = "STATUS_ICON_DIR";
}

/// Poll loop timing
pub mod poll {
    /// Default refresh period in milliseconds
    pub const INTERVAL_MS: u64 = 100;

    /// Lower bound accepted from `[Overlay] poll_interval_ms`
    pub const MIN_INTERVAL_MS: u64 = 10;
}

/// Low-value blinking
pub mod blink {
    /// Values strictly below this blink
    pub const LOW_THRESHOLD: i64 = 20;

    /// Length of one blink phase in milliseconds
    pub const HALF_PERIOD_MS: i64 = 500;
}

/// Display palettes (hex strings, converted by the view)
pub mod palette {
    /// Monitor overlay colors
    pub mod monitor {
        pub const NAME: &str = "#4A9EFF";
        pub const ON: &str = "#00FF44";
        pub const OFF: &str = "#FF4444";
        pub const LOW: &str = "#FF4444";
        pub const BACKGROUND: &str = "#1E1E1E";
        pub const CLOSE: &str = "#FF4444";
        /// Slots whose section has not been seen yet
        pub const ABSENT: &str = "#6E6E6E";
    }

    /// Toggle editor colors
    pub mod editor {
        pub const ON: &str = "#1BC454";
        pub const OFF: &str = "#CD2D1B";
        pub const TEXT: &str = "#FBFBFB";
        pub const BACKGROUND: &str = "#1A1E22";
    }
}

/// GUI-specific constants (egui windows)
pub mod gui {
    /// Monitor window minimum size
    pub const MONITOR_MIN_WIDTH: f32 = 200.0;
    pub const MONITOR_MIN_HEIGHT: f32 = 200.0;

    /// Initial monitor window size
    pub const MONITOR_WIDTH: f32 = 760.0;
    pub const MONITOR_HEIGHT: f32 = 260.0;

    /// Initial toggle editor window size
    pub const EDITOR_WIDTH: f32 = 250.0;
    pub const EDITOR_HEIGHT: f32 = 100.0;

    /// Width reserved per toggle column in the editor grid
    pub const EDITOR_COLUMN_WIDTH: f32 = 200.0;

    /// Minimum width of the label column in one toggle row
    pub const EDITOR_LABEL_WIDTH: f32 = 100.0;

    /// Height of one toggle row, used for the initial window height
    pub const EDITOR_ROW_HEIGHT: f32 = 36.0;

    /// Edge length of status icons in the monitor
    pub const STATUS_ICON_SIZE: f32 = 20.0;

    /// Monitor font size
    pub const MONITOR_FONT_SIZE: f32 = 13.0;

    /// Editor font size
    pub const EDITOR_FONT_SIZE: f32 = 16.0;
}

/// Default values for the `[Overlay]` section
pub mod defaults {
    /// Monitor background opacity percentage (0-100)
    pub const OPACITY_PERCENT: u8 = 80;
}
