//! Toggle editor core
//!
//! Holds the ordered list of boolean settings shown in the panel. The view
//! renders [`ToggleSetting::display`] and reports clicks through
//! [`ToggleEditor::on_toggle`].

use tracing::{debug, info};

use crate::binding::{
    BindingError, BlinkPhase, FieldBinding, FieldDisplay, FieldId, Theme,
};
use crate::config::ConfigStore;
use crate::constants::{gui, sections};
use crate::poll::{PollTarget, RefreshReport};

/// One named boolean shown with a label and a toggle button
#[derive(Debug, Clone)]
pub struct ToggleSetting {
    binding: FieldBinding,
}

impl ToggleSetting {
    fn new(section: &str, key: &str, label: String) -> Self {
        Self {
            binding: FieldBinding::flag(section, key, false).with_label(label),
        }
    }

    pub fn id(&self) -> &FieldId {
        self.binding.id()
    }

    pub fn label(&self) -> &str {
        self.binding.label()
    }

    pub fn is_on(&self) -> bool {
        self.binding.as_flag().unwrap_or(false)
    }

    pub fn display(&self) -> FieldDisplay {
        self.binding.display(&Theme::EDITOR)
    }
}

#[derive(Debug, Default)]
pub struct ToggleEditor {
    settings: Vec<ToggleSetting>,
}

impl ToggleEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn settings(&self) -> &[ToggleSetting] {
        &self.settings
    }

    /// Append a setting and read its current value. Adding a field that is
    /// already present returns the existing setting unchanged.
    pub fn add_setting(
        &mut self,
        store: &ConfigStore,
        section: &str,
        key: &str,
        label: Option<&str>,
    ) -> &ToggleSetting {
        let id = FieldId::new(section, key);
        if let Some(index) = self.position(&id) {
            debug!(field = %id, "Setting already present");
            return &self.settings[index];
        }

        let label = label.map_or_else(|| default_label(key), str::to_string);
        let mut setting = ToggleSetting::new(section, key, label);
        if let Err(e) = setting.binding.refresh(store) {
            // The poll loop reports it again on every tick until fixed
            debug!(error = %e, "Initial read failed, starting from off");
        }

        debug!(field = %id, on = setting.is_on(), "Setting added");
        self.settings.push(setting);
        let last = self.settings.len() - 1;
        &self.settings[last]
    }

    /// `[Settings] autoattack` followed by every key of `[default]`
    pub fn populate_defaults(&mut self, store: &ConfigStore) {
        self.add_setting(store, sections::SETTINGS, sections::AUTOATTACK, None);

        let keys: Vec<String> = store
            .snapshot()
            .entries(sections::DEFAULT)
            .into_iter()
            .map(|(key, _)| key.to_string())
            .collect();
        for key in keys {
            self.add_setting(store, sections::DEFAULT, &key, None);
        }
    }

    /// Flip the setting bound to `id`. The displayed value changes only after
    /// the file has been written.
    pub fn on_toggle(
        &mut self,
        store: &mut ConfigStore,
        id: &FieldId,
    ) -> Result<bool, BindingError> {
        let index = self
            .position(id)
            .ok_or_else(|| BindingError::Unbound { field: id.clone() })?;

        let on = self.settings[index].binding.toggle(store)?;
        info!(field = %id, on, "Setting toggled");
        Ok(on)
    }

    /// Write `0` for the setting bound to `id` if its key exists in the file.
    /// Returns whether a write happened.
    pub fn on_reset(
        &mut self,
        store: &mut ConfigStore,
        id: &FieldId,
    ) -> Result<bool, BindingError> {
        let index = self
            .position(id)
            .ok_or_else(|| BindingError::Unbound { field: id.clone() })?;

        let written = store.reset_to_default(&id.section, &id.key, "0")?;
        self.settings[index].binding.refresh(store)?;
        Ok(written)
    }

    fn position(&self, id: &FieldId) -> Option<usize> {
        self.settings.iter().position(|s| s.id() == id)
    }
}

impl PollTarget for ToggleEditor {
    fn refresh_from(&mut self, store: &ConfigStore, phase: BlinkPhase) -> RefreshReport {
        let mut report = RefreshReport::default();
        for setting in &mut self.settings {
            report.record(setting.binding.refresh_at(store, phase));
        }
        report
    }
}

/// Number of grid columns that fit into `width`
pub fn columns_for_width(width: f32) -> usize {
    ((width / gui::EDITOR_COLUMN_WIDTH).floor() as usize).max(1)
}

/// First letter upper-cased, the rest lower-cased
fn default_label(key: &str) -> String {
    let mut chars = key.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}
