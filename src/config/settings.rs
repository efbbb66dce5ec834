//! Launcher-level settings read from the shared INI file
//!
//! `[Overlay]` carries runtime tunables, `[Paths]` carries asset locations and
//! an optional redirect to another config file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{debug, warn};

use super::ConfigStore;
use crate::common::color::Opacity;
use crate::constants::{blink, config, defaults, paths, poll, sections};

/// Resolve the INI file to use: explicit path, then `./config.ini`, then the
/// per-user config directory
pub fn resolve_config_path(explicit: Option<PathBuf>) -> PathBuf {
    if let Some(path) = explicit {
        return path;
    }

    let local = PathBuf::from(config::FILENAME);
    if local.exists() {
        return local;
    }

    let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push(config::APP_DIR);
    path.push(config::FILENAME);
    path
}

/// Tunables from the `[Overlay]` section
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlaySettings {
    pub poll_interval: Duration,
    pub opacity: Opacity,
    pub low_threshold: i64,
}

impl Default for OverlaySettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(poll::INTERVAL_MS),
            opacity: Opacity::from_percent(defaults::OPACITY_PERCENT),
            low_threshold: blink::LOW_THRESHOLD,
        }
    }
}

impl OverlaySettings {
    pub fn from_store(store: &ConfigStore) -> Self {
        let fallback = Self::default();

        let interval_ms = read_number(store, "poll_interval_ms", poll::INTERVAL_MS)
            .max(poll::MIN_INTERVAL_MS);
        let opacity = read_number(store, "opacity", defaults::OPACITY_PERCENT);
        let low_threshold = read_number(store, "low_threshold", fallback.low_threshold);

        let settings = Self {
            poll_interval: Duration::from_millis(interval_ms),
            opacity: Opacity::from_percent(opacity),
            low_threshold,
        };
        debug!(?settings, "Overlay settings loaded");
        settings
    }
}

fn read_number<T>(store: &ConfigStore, key: &str, default: T) -> T
where
    T: std::str::FromStr + std::fmt::Display + Copy,
{
    let raw = store.get(sections::OVERLAY, key, "");
    if raw.trim().is_empty() {
        return default;
    }
    raw.trim().parse().unwrap_or_else(|_| {
        warn!(key = %key, value = %raw, default = %default, "Invalid overlay setting, using default");
        default
    })
}

/// Locations from the `[Paths]` section, resolved against the config file's
/// directory
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetPaths {
    pub icon: Option<PathBuf>,
    pub background_image: Option<PathBuf>,
    pub config_file: Option<PathBuf>,
    pub status_icon_dir: Option<PathBuf>,
}

impl AssetPaths {
    pub fn from_store(store: &ConfigStore) -> Self {
        let base = store.path().parent().unwrap_or_else(|| Path::new(""));
        let read = |key: &str| resolve_relative(base, &store.get(sections::PATHS, key, ""));

        Self {
            icon: read(paths::ICON_PATH),
            background_image: read(paths::BACKGROUND_IMAGE_PATH),
            config_file: read(paths::CONFIG_FILE_PATH),
            status_icon_dir: read(paths::STATUS_ICON_DIR),
        }
    }

    /// Redirect target if it points somewhere other than `current`
    pub fn redirect_from(&self, current: &Path) -> Option<&Path> {
        self.config_file
            .as_deref()
            .filter(|target| *target != current)
    }
}

fn resolve_relative(base: &Path, raw: &str) -> Option<PathBuf> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    let path = Path::new(raw);
    if path.is_absolute() {
        Some(path.to_path_buf())
    } else {
        Some(base.join(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn store_with(contents: &str) -> (tempfile::TempDir, ConfigStore) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.ini");
        fs::write(&path, contents).unwrap();
        let store = ConfigStore::new(&path);
        (dir, store)
    }

    #[test]
    fn test_explicit_config_path_wins() {
        let explicit = PathBuf::from("/tmp/somewhere/else.ini");
        assert_eq!(resolve_config_path(Some(explicit.clone())), explicit);
    }

    #[test]
    fn test_overlay_defaults_when_section_missing() {
        let (_dir, store) = store_with("[Settings]\nautoattack=0\n");
        assert_eq!(OverlaySettings::from_store(&store), OverlaySettings::default());
    }

    #[test]
    fn test_overlay_values_and_bad_input() {
        let (_dir, store) = store_with(
            "[Overlay]\npoll_interval_ms=250\nopacity=150\nlow_threshold=abc\n",
        );
        let settings = OverlaySettings::from_store(&store);

        assert_eq!(settings.poll_interval, Duration::from_millis(250));
        assert_eq!(settings.opacity, Opacity::from_percent(100));
        assert_eq!(settings.low_threshold, blink::LOW_THRESHOLD);
    }

    #[test]
    fn test_poll_interval_is_clamped() {
        let (_dir, store) = store_with("[Overlay]\npoll_interval_ms=0\n");
        let settings = OverlaySettings::from_store(&store);
        assert_eq!(
            settings.poll_interval,
            Duration::from_millis(poll::MIN_INTERVAL_MS)
        );
    }

    #[test]
    fn test_asset_paths_resolve_relative_to_config() {
        let (dir, store) = store_with(
            "[Paths]\nICON_PATH=assets/sigma.png\nBACKGROUND_IMAGE_PATH=/abs/bg.png\nCONFIG_FILE_PATH=other.ini\n",
        );
        let assets = AssetPaths::from_store(&store);

        assert_eq!(assets.icon, Some(dir.path().join("assets/sigma.png")));
        assert_eq!(assets.background_image, Some(PathBuf::from("/abs/bg.png")));
        assert_eq!(assets.config_file, Some(dir.path().join("other.ini")));
        assert_eq!(assets.status_icon_dir, None);
    }

    #[test]
    fn test_redirect_ignores_self_reference() {
        let (dir, store) = store_with("[Paths]\nCONFIG_FILE_PATH=config.ini\n");
        let assets = AssetPaths::from_store(&store);
        assert_eq!(assets.redirect_from(&dir.path().join("config.ini")), None);

        let (_dir, store) = store_with("[Paths]\nCONFIG_FILE_PATH=toggles.ini\n");
        let assets = AssetPaths::from_store(&store);
        assert!(assets.redirect_from(store.path()).is_some());
    }
}
