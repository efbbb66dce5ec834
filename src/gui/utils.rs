use std::collections::HashMap;
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use eframe::egui;
use tracing::{debug, warn};

/// Decoded PNG as straight RGBA8
pub struct RgbaImage {
    pub rgba: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Decode a PNG file into RGBA8, expanding palette, grayscale and 16-bit images
pub fn decode_png(path: &Path) -> Result<RgbaImage> {
    let bytes = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let mut decoder = png::Decoder::new(Cursor::new(bytes));
    decoder.set_transformations(png::Transformations::normalize_to_color8());
    let mut reader = decoder
        .read_info()
        .with_context(|| format!("Failed to decode PNG header of {}", path.display()))?;
    let mut buf = vec![
        0;
        reader
            .output_buffer_size()
            .context("PNG has no output buffer size")?
    ];
    let info = reader.next_frame(&mut buf)?;
    let pixels = &buf[..info.buffer_size()];

    // egui expects RGBA
    let rgba = match info.color_type {
        png::ColorType::Rgba => pixels.to_vec(),
        png::ColorType::Rgb => pixels
            .chunks_exact(3)
            .flat_map(|c| [c[0], c[1], c[2], 0xFF])
            .collect(),
        png::ColorType::GrayscaleAlpha => pixels
            .chunks_exact(2)
            .flat_map(|c| [c[0], c[0], c[0], c[1]])
            .collect(),
        png::ColorType::Grayscale => pixels.iter().flat_map(|&g| [g, g, g, 0xFF]).collect(),
        other => {
            return Err(anyhow!(
                "Unsupported color type {:?} in {}",
                other,
                path.display()
            ));
        }
    };

    Ok(RgbaImage {
        rgba,
        width: info.width,
        height: info.height,
    })
}

pub fn load_window_icon(path: &Path) -> Result<egui::IconData> {
    let image = decode_png(path)?;
    Ok(egui::IconData {
        rgba: image.rgba,
        width: image.width,
        height: image.height,
    })
}

/// Window icon from `[Paths] ICON_PATH`, logged and skipped when unusable
pub fn optional_window_icon(path: Option<&Path>) -> Option<egui::IconData> {
    let path = path?;
    match load_window_icon(path) {
        Ok(icon) => {
            debug!(
                path = %path.display(),
                width = icon.width,
                height = icon.height,
                "Loaded window icon"
            );
            Some(icon)
        }
        Err(e) => {
            warn!(error = ?e, "Failed to load window icon");
            None
        }
    }
}

pub fn load_texture(ctx: &egui::Context, path: &Path, name: &str) -> Result<egui::TextureHandle> {
    let image = decode_png(path)?;
    let color_image = egui::ColorImage::from_rgba_unmultiplied(
        [image.width as usize, image.height as usize],
        &image.rgba,
    );
    Ok(ctx.load_texture(name, color_image, egui::TextureOptions::LINEAR))
}

/// Lazily loaded `{name}.png` textures from one directory. Failed loads are
/// remembered so a missing icon is only reported once.
pub struct IconCache {
    dir: Option<PathBuf>,
    textures: HashMap<String, Option<egui::TextureHandle>>,
}

impl IconCache {
    pub fn new(dir: Option<PathBuf>) -> Self {
        Self {
            dir,
            textures: HashMap::new(),
        }
    }

    pub fn get(&mut self, ctx: &egui::Context, key: &str) -> Option<egui::TextureHandle> {
        let dir = self.dir.as_ref()?;
        self.textures
            .entry(key.to_string())
            .or_insert_with(|| {
                let path = dir.join(format!("{key}.png"));
                match load_texture(ctx, &path, key) {
                    Ok(texture) => Some(texture),
                    Err(e) => {
                        warn!(icon = %key, error = ?e, "Status icon unavailable, using text");
                        None
                    }
                }
            })
            .clone()
    }
}
