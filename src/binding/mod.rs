//! Typed bindings between one INI key and one displayed value
//!
//! A [`FieldBinding`] owns the last value that coerced successfully. Refreshes
//! that fail coercion leave it untouched and report a [`BindingError`]; the
//! poll loop decides what to log. Toggles persist first and only then update
//! the cached value.

mod display;

pub use display::{BlinkPhase, DisplayStyle, FieldDisplay, RenderHint, Theme};

use std::fmt;

use crate::config::{ConfigStore, StoreError};

/// `(section, key)` address of a binding
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldId {
    pub section: String,
    pub key: String,
}

impl FieldId {
    pub fn new(section: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            section: section.into(),
            key: key.into(),
        }
    }

    /// Parse `SECTION.KEY`; the key is everything after the last dot
    pub fn parse(spec: &str) -> Option<Self> {
        let (section, key) = spec.rsplit_once('.')?;
        let (section, key) = (section.trim(), key.trim());
        if section.is_empty() || key.is_empty() {
            return None;
        }
        Some(Self::new(section, key))
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.section, self.key)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Integer,
    Flag,
    Text,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FieldKind::Integer => "an integer",
            FieldKind::Flag => "0 or 1",
            FieldKind::Text => "text",
        })
    }
}

impl FieldKind {
    pub fn coerce(self, raw: &str) -> Option<FieldValue> {
        let trimmed = raw.trim();
        match self {
            FieldKind::Integer => trimmed.parse().ok().map(FieldValue::Integer),
            FieldKind::Flag => parse_flag(trimmed).map(FieldValue::Flag),
            FieldKind::Text => Some(FieldValue::Text(trimmed.to_string())),
        }
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    if let Ok(n) = raw.parse::<i64>() {
        return Some(n != 0);
    }
    match raw.to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" => Some(true),
        "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Integer(i64),
    Flag(bool),
    Text(String),
}

impl FieldValue {
    /// Form written back to the file; flags are always `0`/`1`
    pub fn to_raw(&self) -> String {
        match self {
            FieldValue::Integer(n) => n.to_string(),
            FieldValue::Flag(on) => String::from(if *on { "1" } else { "0" }),
            FieldValue::Text(s) => s.clone(),
        }
    }

    fn kind(&self) -> FieldKind {
        match self {
            FieldValue::Integer(_) => FieldKind::Integer,
            FieldValue::Flag(_) => FieldKind::Flag,
            FieldValue::Text(_) => FieldKind::Text,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BindingError {
    #[error("malformed value {raw:?} for {field}: expected {expected}")]
    Malformed {
        field: FieldId,
        raw: String,
        expected: FieldKind,
    },

    #[error("{field} is not a flag and cannot be toggled")]
    NotAFlag { field: FieldId },

    #[error("no setting bound to {field}")]
    Unbound { field: FieldId },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl BindingError {
    pub fn field(&self) -> Option<&FieldId> {
        match self {
            BindingError::Malformed { field, .. }
            | BindingError::NotAFlag { field }
            | BindingError::Unbound { field } => Some(field),
            BindingError::Store(_) => None,
        }
    }
}

/// One INI key mirrored as a typed, displayable value
#[derive(Debug, Clone)]
pub struct FieldBinding {
    id: FieldId,
    label: String,
    default: FieldValue,
    value: FieldValue,
    hint: RenderHint,
    low_threshold: Option<i64>,
    blink: BlinkPhase,
}

impl FieldBinding {
    fn with_default(section: &str, key: &str, default: FieldValue) -> Self {
        Self {
            id: FieldId::new(section, key),
            label: key.to_string(),
            value: default.clone(),
            default,
            hint: RenderHint::Text,
            low_threshold: None,
            blink: BlinkPhase::default(),
        }
    }

    pub fn integer(section: &str, key: &str, default: i64) -> Self {
        Self::with_default(section, key, FieldValue::Integer(default))
    }

    pub fn flag(section: &str, key: &str, default: bool) -> Self {
        Self::with_default(section, key, FieldValue::Flag(default))
    }

    pub fn text(section: &str, key: &str, default: impl Into<String>) -> Self {
        Self::with_default(section, key, FieldValue::Text(default.into()))
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_hint(mut self, hint: RenderHint) -> Self {
        self.hint = hint;
        self
    }

    /// Values strictly below `threshold` blink
    pub fn with_low_threshold(mut self, threshold: i64) -> Self {
        self.low_threshold = Some(threshold);
        self
    }

    pub fn id(&self) -> &FieldId {
        &self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn kind(&self) -> FieldKind {
        self.default.kind()
    }

    #[cfg(test)]
    pub fn value(&self) -> &FieldValue {
        &self.value
    }

    pub fn as_flag(&self) -> Option<bool> {
        match self.value {
            FieldValue::Flag(on) => Some(on),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self.value {
            FieldValue::Integer(n) => Some(n),
            _ => None,
        }
    }

    /// Re-read from the store's current snapshot using the wall-clock blink
    /// phase. Returns whether the cached value changed.
    pub fn refresh(&mut self, store: &ConfigStore) -> Result<bool, BindingError> {
        self.refresh_at(store, BlinkPhase::now())
    }

    pub fn refresh_at(
        &mut self,
        store: &ConfigStore,
        phase: BlinkPhase,
    ) -> Result<bool, BindingError> {
        self.blink = phase;

        let raw = store.get(&self.id.section, &self.id.key, &self.default.to_raw());
        let kind = self.kind();
        let value = kind.coerce(&raw).ok_or_else(|| BindingError::Malformed {
            field: self.id.clone(),
            raw: raw.clone(),
            expected: kind,
        })?;

        let changed = value != self.value;
        self.value = value;
        Ok(changed)
    }

    /// Flip a flag and persist it. The cached value only changes once the
    /// write succeeded. Returns the new value.
    pub fn toggle(&mut self, store: &mut ConfigStore) -> Result<bool, BindingError> {
        let Some(current) = self.as_flag() else {
            return Err(BindingError::NotAFlag {
                field: self.id.clone(),
            });
        };

        let next = FieldValue::Flag(!current);
        store.set(&self.id.section, &self.id.key, &next.to_raw())?;
        self.value = next;
        Ok(!current)
    }

    pub fn is_low(&self) -> bool {
        match (self.low_threshold, &self.value) {
            (Some(threshold), FieldValue::Integer(n)) => *n < threshold,
            _ => false,
        }
    }

    /// Name used for icon keys: the key without a trailing `_state`
    pub fn icon_name(&self) -> &str {
        self.id
            .key
            .strip_suffix("_state")
            .unwrap_or(&self.id.key)
    }

    pub fn display(&self, theme: &Theme) -> FieldDisplay {
        match &self.value {
            FieldValue::Text(text) => FieldDisplay::colored(text.clone(), theme.name),
            FieldValue::Integer(n) => {
                let color = if !self.is_low() {
                    theme.normal
                } else if self.blink == BlinkPhase::On {
                    theme.low
                } else {
                    theme.background
                };
                FieldDisplay::colored(format!("{}: {:3}", self.label, n), color)
            }
            FieldValue::Flag(on) => {
                let state = if *on { "ON" } else { "OFF" };
                let text = if theme.labelled_flags {
                    format!("{}: {}", self.label, state)
                } else {
                    state.to_string()
                };
                let style = match self.hint {
                    RenderHint::Text => DisplayStyle::Color(if *on { theme.on } else { theme.off }),
                    RenderHint::IconPair => DisplayStyle::Icon(format!(
                        "{}_{}",
                        self.icon_name(),
                        if *on { "on" } else { "off" }
                    )),
                };
                FieldDisplay { text, style }
            }
        }
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
    fn test_field_id_parse() {
        assert_eq!(
            FieldId::parse("Settings.autoattack"),
            Some(FieldId::new("Settings", "autoattack"))
        );
        assert_eq!(FieldId::parse("a.b.c"), Some(FieldId::new("a.b", "c")));
        assert_eq!(FieldId::parse("noseparator"), None);
        assert_eq!(FieldId::parse(".key"), None);
        assert_eq!(FieldId::new("default", "ilunya").to_string(), "default.ilunya");
    }

    #[test]
    fn test_coercion_rules() {
        assert_eq!(FieldKind::Integer.coerce(" 42 "), Some(FieldValue::Integer(42)));
        assert_eq!(FieldKind::Integer.coerce("+7"), Some(FieldValue::Integer(7)));
        assert_eq!(FieldKind::Integer.coerce("4.2"), None);
        assert_eq!(FieldKind::Flag.coerce("0"), Some(FieldValue::Flag(false)));
        assert_eq!(FieldKind::Flag.coerce("1"), Some(FieldValue::Flag(true)));
        assert_eq!(FieldKind::Flag.coerce("2"), Some(FieldValue::Flag(true)));
        assert_eq!(FieldKind::Flag.coerce("Yes"), Some(FieldValue::Flag(true)));
        assert_eq!(FieldKind::Flag.coerce("maybe"), None);
        assert_eq!(
            FieldKind::Text.coerce(" Hero "),
            Some(FieldValue::Text("Hero".to_string()))
        );
    }

    #[test]
    fn test_refresh_reads_present_values() {
        let (_dir, store) = store_with(
            "[Character1]\nname=Hero\nhp_level=100\nauto_aim_state=1\n",
        );

        let mut name = FieldBinding::text("Character1", "name", "Character 1");
        let mut hp = FieldBinding::integer("Character1", "hp_level", 0);
        let mut aim = FieldBinding::flag("Character1", "auto_aim_state", false);

        assert!(name.refresh(&store).unwrap());
        assert!(hp.refresh(&store).unwrap());
        assert!(aim.refresh(&store).unwrap());

        assert_eq!(name.value(), &FieldValue::Text("Hero".to_string()));
        assert_eq!(hp.as_integer(), Some(100));
        assert_eq!(aim.as_flag(), Some(true));

        // Second refresh with unchanged content reports no change
        assert!(!hp.refresh(&store).unwrap());
    }

    #[test]
    fn test_refresh_absent_key_uses_default() {
        let (_dir, store) = store_with("[Character1]\nname=Hero\n");

        let mut energy = FieldBinding::integer("Character1", "energy_level", 0);
        let mut name = FieldBinding::text("Character4", "name", "Character 4");
        energy.refresh(&store).unwrap();
        name.refresh(&store).unwrap();

        assert_eq!(energy.as_integer(), Some(0));
        assert_eq!(name.display(&Theme::MONITOR).text, "Character 4");
    }

    #[test]
    fn test_malformed_value_keeps_previous() {
        let (dir, mut store) = store_with("[Character1]\nhp_level=64\n");
        let mut hp = FieldBinding::integer("Character1", "hp_level", 0);
        hp.refresh(&store).unwrap();

        fs::write(dir.path().join("config.ini"), "[Character1]\nhp_level=notanumber\n").unwrap();
        store.load().unwrap();

        let err = hp.refresh(&store).unwrap_err();
        assert!(
            matches!(&err, BindingError::Malformed { raw, expected: FieldKind::Integer, .. } if raw == "notanumber"),
            "unexpected error {err:?}"
        );
        assert_eq!(hp.as_integer(), Some(64));
    }

    #[test]
    fn test_toggle_twice_round_trips() {
        let (dir, mut store) = store_with("[default]\nilunya=0\n");
        let path = dir.path().join("config.ini");
        let mut flag = FieldBinding::flag("default", "ilunya", false);
        flag.refresh(&store).unwrap();

        assert!(flag.toggle(&mut store).unwrap());
        assert_eq!(flag.as_flag(), Some(true));
        assert_eq!(fs::read_to_string(&path).unwrap(), "[default]\nilunya=1\n");

        assert!(!flag.toggle(&mut store).unwrap());
        assert_eq!(flag.as_flag(), Some(false));
        assert_eq!(fs::read_to_string(&path).unwrap(), "[default]\nilunya=0\n");
    }

    #[test]
    fn test_failed_toggle_keeps_cached_value() {
        let (dir, mut store) = store_with("[Settings]\nautoattack=0\n");
        let mut flag = FieldBinding::flag("Settings", "autoattack", false);
        flag.refresh(&store).unwrap();

        fs::remove_file(dir.path().join("config.ini")).unwrap();
        let err = flag.toggle(&mut store).unwrap_err();

        assert!(matches!(err, BindingError::Store(StoreError::NotFound { .. })));
        assert_eq!(flag.as_flag(), Some(false), "display must not run ahead of the file");
    }

    #[test]
    fn test_toggle_rejects_non_flags() {
        let (_dir, mut store) = store_with("[Character1]\nhp_level=10\n");
        let mut hp = FieldBinding::integer("Character1", "hp_level", 0);
        assert!(matches!(
            hp.toggle(&mut store),
            Err(BindingError::NotAFlag { .. })
        ));
    }

    #[test]
    fn test_low_value_blinks_with_phase() {
        let (_dir, store) = store_with("[Character1]\nhp_level=15\nenergy_level=20\n");
        let theme = Theme::MONITOR;
        let mut hp = FieldBinding::integer("Character1", "hp_level", 0)
            .with_label("HP")
            .with_low_threshold(20);
        let mut energy = FieldBinding::integer("Character1", "energy_level", 0)
            .with_label("Energy")
            .with_low_threshold(20);

        hp.refresh_at(&store, BlinkPhase::On).unwrap();
        assert_eq!(hp.display(&theme), FieldDisplay::colored("HP:  15", theme.low));

        hp.refresh_at(&store, BlinkPhase::Off).unwrap();
        assert_eq!(hp.display(&theme), FieldDisplay::colored("HP:  15", theme.background));

        // The threshold itself does not blink
        energy.refresh_at(&store, BlinkPhase::On).unwrap();
        assert!(!energy.is_low());
        assert_eq!(
            energy.display(&theme),
            FieldDisplay::colored("Energy:  20", theme.normal)
        );
    }

    #[test]
    fn test_flag_display_variants() {
        let (_dir, store) = store_with("[Character1]\nauto_shoot_state=1\n");
        let mut text = FieldBinding::flag("Character1", "auto_shoot_state", false)
            .with_label("Auto Shoot");
        let mut icon = text.clone().with_hint(RenderHint::IconPair);
        text.refresh(&store).unwrap();
        icon.refresh(&store).unwrap();

        assert_eq!(
            text.display(&Theme::MONITOR),
            FieldDisplay::colored("Auto Shoot: ON", Theme::MONITOR.on)
        );
        assert_eq!(
            icon.display(&Theme::MONITOR).style,
            DisplayStyle::Icon("auto_shoot_on".to_string())
        );
        assert_eq!(
            text.display(&Theme::EDITOR),
            FieldDisplay::colored("ON", Theme::EDITOR.on)
        );
    }
}
