//! Always-on-top character monitor window

use std::time::Instant;

use anyhow::{Result, anyhow};
use eframe::{NativeOptions, egui};
use egui::RichText;
use tracing::info;

use super::utils::{IconCache, optional_window_icon};
use crate::binding::{DisplayStyle, FieldBinding, FieldDisplay, RenderHint, Theme};
use crate::common::color::{HexColor, hex_to_color32};
use crate::config::{AssetPaths, ConfigStore, OverlaySettings};
use crate::constants::{gui, palette};
use crate::monitor::{Monitor, Variant};
use crate::poll::PollLoop;

struct MonitorApp {
    store: ConfigStore,
    monitor: Monitor,
    poll: PollLoop,
    icons: IconCache,
    background: egui::Color32,
}

impl MonitorApp {
    fn new(
        store: ConfigStore,
        monitor: Monitor,
        settings: OverlaySettings,
        assets: &AssetPaths,
    ) -> Self {
        let background = HexColor::parse(palette::monitor::BACKGROUND)
            .map_or(egui::Color32::TRANSPARENT, |c| c.with_opacity(settings.opacity));

        Self {
            store,
            monitor,
            poll: PollLoop::new(settings.poll_interval),
            icons: IconCache::new(assets.status_icon_dir.clone()),
            background,
        }
    }

    fn header(&self, ctx: &egui::Context, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.label(
                RichText::new("Status")
                    .size(gui::MONITOR_FONT_SIZE)
                    .color(hex_to_color32(palette::monitor::NAME))
                    .strong(),
            );
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let close = ui.add(
                    egui::Label::new(
                        RichText::new("×")
                            .size(gui::MONITOR_FONT_SIZE + 3.0)
                            .color(hex_to_color32(palette::monitor::CLOSE)),
                    )
                    .sense(egui::Sense::click()),
                );
                if close.clicked() {
                    ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                }
            });
        });
    }

    fn character_row(&mut self, ctx: &egui::Context, ui: &mut egui::Ui, index: usize) {
        let theme = Theme::MONITOR;
        let character = &self.monitor.characters()[index];

        ui.horizontal_wrapped(|ui| {
            colored_label(ui, &character.title(&theme), true).on_hover_text(character.section());
            if !character.is_present() {
                colored_label(
                    ui,
                    &FieldDisplay::colored("no data", palette::monitor::ABSENT),
                    false,
                );
                return;
            }
            for stat in character.stats() {
                colored_label(ui, &stat.display(&theme), false);
            }
            for flag in character.flags() {
                flag_widget(ui, ctx, &mut self.icons, flag, &theme);
            }
        });
    }
}

fn colored_label(ui: &mut egui::Ui, display: &FieldDisplay, strong: bool) -> egui::Response {
    let color = match &display.style {
        DisplayStyle::Color(hex) => hex_to_color32(hex),
        DisplayStyle::Icon(_) => hex_to_color32(Theme::MONITOR.normal),
    };
    let mut text = RichText::new(&display.text)
        .size(gui::MONITOR_FONT_SIZE)
        .monospace()
        .color(color);
    if strong {
        text = text.strong();
    }
    ui.label(text)
}

fn flag_widget(
    ui: &mut egui::Ui,
    ctx: &egui::Context,
    icons: &mut IconCache,
    flag: &FieldBinding,
    theme: &Theme,
) {
    let display = flag.display(theme);
    let texture = match &display.style {
        DisplayStyle::Icon(key) => icons.get(ctx, key),
        DisplayStyle::Color(_) => None,
    };
    if let Some(texture) = texture {
        let size = egui::vec2(gui::STATUS_ICON_SIZE, gui::STATUS_ICON_SIZE);
        ui.add(egui::Image::new(egui::load::SizedTexture::new(texture.id(), size)))
            .on_hover_text(display.text.as_str());
        return;
    }

    // Text rendering, also the fallback for missing icons
    let color = if flag.as_flag().unwrap_or(false) {
        theme.on
    } else {
        theme.off
    };
    colored_label(ui, &FieldDisplay::colored(display.text, color), false);
}

impl eframe::App for MonitorApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = Instant::now();
        self.poll.poll(now, &mut self.store, &mut self.monitor);

        let frame = egui::Frame::new()
            .fill(self.background)
            .corner_radius(6.0)
            .inner_margin(8.0);

        egui::CentralPanel::default().frame(frame).show(ctx, |ui| {
            // Drag anywhere on the background to move the undecorated window
            let drag = ui.interact(
                ui.max_rect(),
                ui.id().with("monitor_drag"),
                egui::Sense::drag(),
            );
            if drag.drag_started() {
                ctx.send_viewport_cmd(egui::ViewportCommand::StartDrag);
            }

            self.header(ctx, ui);
            ui.separator();

            // Five fixed rows so the layout never shifts
            for index in 0..self.monitor.characters().len() {
                self.character_row(ctx, ui, index);
            }
        });

        if let Some(wait) = self.poll.time_until_next(Instant::now()) {
            ctx.request_repaint_after(wait);
        }
    }

    fn clear_color(&self, _visuals: &egui::Visuals) -> [f32; 4] {
        egui::Rgba::TRANSPARENT.to_array()
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.poll.cancel();
        info!(ticks = self.poll.ticks(), "Monitor exiting");
    }
}

pub fn run_monitor(store: ConfigStore, variant: Variant, hint: RenderHint) -> Result<()> {
    let settings = OverlaySettings::from_store(&store);
    let assets = AssetPaths::from_store(&store);
    let monitor = Monitor::new(variant, hint, settings.low_threshold);

    info!(
        path = %store.path().display(),
        ?variant,
        ?hint,
        interval_ms = settings.poll_interval.as_millis() as u64,
        "Starting monitor"
    );

    let mut viewport_builder = egui::ViewportBuilder::default()
        .with_inner_size([gui::MONITOR_WIDTH, gui::MONITOR_HEIGHT])
        .with_min_inner_size([gui::MONITOR_MIN_WIDTH, gui::MONITOR_MIN_HEIGHT])
        .with_title("Status Monitor")
        .with_decorations(false)
        .with_transparent(true)
        .with_window_level(egui::WindowLevel::AlwaysOnTop);

    if let Some(icon_data) = optional_window_icon(assets.icon.as_deref()) {
        viewport_builder = viewport_builder.with_icon(icon_data);
    }

    let options = NativeOptions {
        viewport: viewport_builder,
        ..Default::default()
    };

    eframe::run_native(
        "Status Monitor",
        options,
        Box::new(move |_cc| Ok(Box::new(MonitorApp::new(store, monitor, settings, &assets)))),
    )
    .map_err(|err| anyhow!("Failed to launch monitor window: {err}"))
}
