//! Toggle editor panel

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Result, anyhow};
use eframe::{NativeOptions, egui};
use egui::RichText;
use tracing::{info, warn};

use super::utils::{load_texture, optional_window_icon};
use crate::binding::{DisplayStyle, FieldId};
use crate::common::color::hex_to_color32;
use crate::config::{AssetPaths, ConfigStore, OverlaySettings};
use crate::constants::{gui, palette};
use crate::editor::{ToggleEditor, columns_for_width};
use crate::poll::PollLoop;

enum Intent {
    Toggle(FieldId),
    Reset(FieldId),
}

struct StatusMessage {
    text: String,
    color: egui::Color32,
}

struct EditorApp {
    store: ConfigStore,
    editor: ToggleEditor,
    poll: PollLoop,
    background: Option<egui::TextureHandle>,
    status: Option<StatusMessage>,
}

impl EditorApp {
    fn new(
        cc: &eframe::CreationContext<'_>,
        store: ConfigStore,
        editor: ToggleEditor,
        settings: OverlaySettings,
        background_path: Option<PathBuf>,
    ) -> Self {
        let background = background_path.and_then(|path| {
            match load_texture(&cc.egui_ctx, &path, "editor_background") {
                Ok(texture) => Some(texture),
                Err(e) => {
                    warn!(error = ?e, "Failed to load background image");
                    None
                }
            }
        });

        Self {
            store,
            editor,
            poll: PollLoop::new(settings.poll_interval),
            background,
            status: None,
        }
    }

    fn apply(&mut self, intent: Intent) {
        let (id, result) = match intent {
            Intent::Toggle(id) => {
                let result = self.editor.on_toggle(&mut self.store, &id).map(|_| ());
                (id, result)
            }
            Intent::Reset(id) => {
                let result = self.editor.on_reset(&mut self.store, &id).map(|_| ());
                (id, result)
            }
        };

        match result {
            Ok(()) => self.status = None,
            Err(e) => {
                warn!(field = %id, error = %e, "Setting update failed");
                self.status = Some(StatusMessage {
                    text: format!("Could not save {id}: {e}"),
                    color: hex_to_color32(palette::editor::OFF),
                });
            }
        }
    }

    /// Draw the toggle grid, returning the user's action if any
    fn grid(&self, ui: &mut egui::Ui) -> Option<Intent> {
        let text = hex_to_color32(palette::editor::TEXT);
        let columns = columns_for_width(ui.available_width());
        let mut intent = None;

        egui::Grid::new("toggle_grid")
            .num_columns(columns * 2)
            .spacing([12.0, 8.0])
            .min_col_width(gui::EDITOR_LABEL_WIDTH - 12.0)
            .show(ui, |ui| {
                for (i, setting) in self.editor.settings().iter().enumerate() {
                    ui.label(
                        RichText::new(setting.label())
                            .size(gui::EDITOR_FONT_SIZE)
                            .color(text),
                    );

                    let display = setting.display();
                    let fill = match display.style {
                        DisplayStyle::Color(hex) => hex_to_color32(hex),
                        DisplayStyle::Icon(_) => hex_to_color32(palette::editor::OFF),
                    };
                    let button = egui::Button::new(
                        RichText::new(display.text)
                            .size(gui::EDITOR_FONT_SIZE)
                            .color(text)
                            .strong(),
                    )
                    .fill(fill);
                    let response = ui.add(button).on_hover_text("Click to toggle, right-click to reset");
                    if response.clicked() {
                        intent = Some(Intent::Toggle(setting.id().clone()));
                    }
                    response.context_menu(|ui| {
                        if ui.button("Reset to off").clicked() {
                            intent = Some(Intent::Reset(setting.id().clone()));
                            ui.close();
                        }
                    });

                    if (i + 1) % columns == 0 {
                        ui.end_row();
                    }
                }
            });

        intent
    }
}

impl eframe::App for EditorApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll
            .poll(Instant::now(), &mut self.store, &mut self.editor);

        let frame = egui::Frame::new()
            .fill(hex_to_color32(palette::editor::BACKGROUND))
            .inner_margin(10.0);

        let intent = egui::CentralPanel::default()
            .frame(frame)
            .show(ctx, |ui| {
                if let Some(texture) = &self.background {
                    let uv = egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0));
                    ui.painter()
                        .image(texture.id(), ui.max_rect(), uv, egui::Color32::WHITE);
                }

                if self.editor.settings().is_empty() {
                    ui.label(
                        RichText::new("No settings to toggle")
                            .size(gui::EDITOR_FONT_SIZE)
                            .color(hex_to_color32(palette::editor::TEXT)),
                    );
                }
                let intent = self.grid(ui);

                if let Some(status) = &self.status {
                    ui.add_space(6.0);
                    ui.label(RichText::new(&status.text).color(status.color));
                }
                intent
            })
            .inner;

        // Applied after drawing so the grid never borrows the editor mutably
        if let Some(intent) = intent {
            self.apply(intent);
            ctx.request_repaint();
        }

        if let Some(wait) = self.poll.time_until_next(Instant::now()) {
            ctx.request_repaint_after(wait);
        }
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.poll.cancel();
        info!(ticks = self.poll.ticks(), "Toggle editor exiting");
    }
}

/// Open the editor. Toggles bind to `[Paths] CONFIG_FILE_PATH` when the
/// launcher file sets it, otherwise to the launcher file itself.
pub fn run_editor(launcher: ConfigStore, fields: Vec<FieldId>) -> Result<()> {
    let assets = AssetPaths::from_store(&launcher);
    let settings = OverlaySettings::from_store(&launcher);

    let store = match assets.redirect_from(launcher.path()) {
        Some(target) => {
            info!(from = %launcher.path().display(), to = %target.display(), "Following config redirect");
            ConfigStore::new(target)
        }
        None => launcher,
    };

    let mut editor = ToggleEditor::new();
    if fields.is_empty() {
        editor.populate_defaults(&store);
    } else {
        for field in &fields {
            editor.add_setting(&store, &field.section, &field.key, None);
        }
    }
    info!(
        path = %store.path().display(),
        settings = editor.settings().len(),
        "Starting toggle editor"
    );

    let rows = editor.settings().len().max(1) as f32;
    let height = gui::EDITOR_HEIGHT.max(rows * gui::EDITOR_ROW_HEIGHT + 40.0);

    let mut viewport_builder = egui::ViewportBuilder::default()
        .with_inner_size([gui::EDITOR_WIDTH, height])
        .with_title("Settings");

    if let Some(icon_data) = optional_window_icon(assets.icon.as_deref()) {
        viewport_builder = viewport_builder.with_icon(icon_data);
    }

    let options = NativeOptions {
        viewport: viewport_builder,
        ..Default::default()
    };

    let background = assets.background_image.clone();
    eframe::run_native(
        "Settings",
        options,
        Box::new(move |cc| {
            Ok(Box::new(EditorApp::new(
                cc, store, editor, settings, background,
            )))
        }),
    )
    .map_err(|err| anyhow!("Failed to launch toggle editor: {err}"))
}
