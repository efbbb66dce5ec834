//! Read-only character monitor
//!
//! Five fixed character slots, each mirroring one `[CharacterN]` section.
//! Slots are created once and only their values change.

use crate::binding::{BlinkPhase, DisplayStyle, FieldBinding, FieldDisplay, RenderHint, Theme};
use crate::config::ConfigStore;
use crate::constants::{palette, sections};
use crate::poll::{PollTarget, RefreshReport};

/// Which automation flags a character shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Variant {
    #[default]
    Basic,
    /// Adds insurance and invite flags
    Extended,
}

const AUTOMATION_FLAGS: &[(&str, &str)] = &[
    ("auto_shoot_state", "Auto Shoot"),
    ("auto_aim_state", "Auto Aim"),
    ("auto_pick_up_state", "Auto Pick Up"),
    ("auto_hp_regen_state", "HP Regen"),
    ("auto_energy_regen_state", "Energy Regen"),
];

const EXTENDED_FLAGS: &[(&str, &str)] = &[
    ("insurance_state", "Insurance"),
    ("invite_state", "Invite"),
];

#[derive(Debug, Clone)]
pub struct CharacterEntity {
    section: String,
    /// Set once the section has been seen in a snapshot
    present: bool,
    name: FieldBinding,
    hp: FieldBinding,
    energy: FieldBinding,
    flags: Vec<FieldBinding>,
}

impl CharacterEntity {
    fn new(slot: usize, variant: Variant, hint: RenderHint, low_threshold: i64) -> Self {
        let section = format!("{}{}", sections::CHARACTER_PREFIX, slot);

        let flag_specs = match variant {
            Variant::Basic => AUTOMATION_FLAGS.to_vec(),
            Variant::Extended => [AUTOMATION_FLAGS, EXTENDED_FLAGS].concat(),
        };
        let flags = flag_specs
            .into_iter()
            .map(|(key, label)| {
                FieldBinding::flag(&section, key, false)
                    .with_label(label)
                    .with_hint(hint)
            })
            .collect();

        Self {
            name: FieldBinding::text(&section, "name", format!("Character {slot}")),
            hp: FieldBinding::integer(&section, "hp_level", 0)
                .with_label("HP")
                .with_low_threshold(low_threshold),
            energy: FieldBinding::integer(&section, "energy_level", 0)
                .with_label("Energy")
                .with_low_threshold(low_threshold),
            flags,
            section,
            present: false,
        }
    }

    pub fn section(&self) -> &str {
        &self.section
    }

    pub fn is_present(&self) -> bool {
        self.present
    }

    /// HP then energy
    pub fn stats(&self) -> [&FieldBinding; 2] {
        [&self.hp, &self.energy]
    }

    pub fn flags(&self) -> &[FieldBinding] {
        &self.flags
    }

    pub fn name_display(&self, theme: &Theme) -> FieldDisplay {
        self.name.display(theme)
    }

    /// Row title: the name, dimmed while the slot has no data yet
    pub fn title(&self, theme: &Theme) -> FieldDisplay {
        let mut display = self.name_display(theme);
        if !self.present {
            display.style = DisplayStyle::Color(palette::monitor::ABSENT);
        }
        display
    }

    fn bindings_mut(&mut self) -> impl Iterator<Item = &mut FieldBinding> {
        [&mut self.name, &mut self.hp, &mut self.energy]
            .into_iter()
            .chain(self.flags.iter_mut())
    }

    fn refresh(&mut self, store: &ConfigStore, phase: BlinkPhase, report: &mut RefreshReport) {
        // A missing section keeps the last values instead of showing fallbacks
        if !store.snapshot().has_section(&self.section) {
            return;
        }
        self.present = true;
        for binding in self.bindings_mut() {
            report.record(binding.refresh_at(store, phase));
        }
    }
}

/// Owner of all character slots
#[derive(Debug, Clone)]
pub struct Monitor {
    characters: Vec<CharacterEntity>,
}

impl Monitor {
    pub fn new(variant: Variant, hint: RenderHint, low_threshold: i64) -> Self {
        let characters = (1..=sections::CHARACTER_SLOTS)
            .map(|slot| CharacterEntity::new(slot, variant, hint, low_threshold))
            .collect();
        Self { characters }
    }

    pub fn characters(&self) -> &[CharacterEntity] {
        &self.characters
    }

    #[cfg(test)]
    pub fn character(&self, section: &str) -> Option<&CharacterEntity> {
        self.characters.iter().find(|c| c.section == section)
    }
}

impl PollTarget for Monitor {
    fn refresh_from(&mut self, store: &ConfigStore, phase: BlinkPhase) -> RefreshReport {
        let mut report = RefreshReport::default();
        for character in &mut self.characters {
            character.refresh(store, phase, &mut report);
        }
        report
    }
}
