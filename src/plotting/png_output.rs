//! Raster output: every panel is drawn into a temporary PNG file with the bitmap
//! backend and handed back as bytes.
use crate::errors::{RenderResult, drawing_error};
use log::debug;
use plotters::coord::Shift;
use plotters::prelude::*;
use std::fs;
use std::path::Path;

/// Size and decoration of the produced images.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotStyle {
    pub width: u32,
    pub height: u32,
    /// captions, axis labels, colour bar ticks and legends; needs system fonts
    pub annotate: bool,
}

impl Default for PlotStyle {
    fn default() -> Self {
        PlotStyle {
            width: 800,
            height: 700,
            annotate: true,
        }
    }
}

impl PlotStyle {
    /// Undecorated images, drawable without any font available.
    pub fn plain(width: u32, height: u32) -> Self {
        PlotStyle {
            width,
            height,
            annotate: false,
        }
    }
}

/// One encoded image.
#[derive(Debug, Clone, PartialEq)]
pub struct PngImage {
    /// short panel name, used as file stem when written out
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub bytes: Vec<u8>,
}

pub const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

impl PngImage {
    pub fn is_png(&self) -> bool {
        self.bytes.starts_with(&PNG_SIGNATURE)
    }

    /// Writes `<dir>/<prefix><name>.png`.
    pub fn save(&self, dir: &Path, prefix: &str) -> RenderResult<std::path::PathBuf> {
        fs::create_dir_all(dir)?;
        let path = dir.join(format!("{}{}.png", prefix, self.name));
        fs::write(&path, &self.bytes)?;
        Ok(path)
    }
}

/// Runs `draw` on a white canvas of the style's size and returns the encoded PNG.
pub(crate) fn render_png<F>(name: &str, style: &PlotStyle, draw: F) -> RenderResult<PngImage>
where
    F: FnOnce(&DrawingArea<BitMapBackend<'_>, Shift>) -> RenderResult<()>,
{
    let file = tempfile::Builder::new()
        .prefix("rusted_contours_")
        .suffix(".png")
        .tempfile()?;
    let path = file.path().to_path_buf();
    {
        let root = BitMapBackend::new(&path, (style.width, style.height)).into_drawing_area();
        root.fill(&WHITE).map_err(drawing_error)?;
        draw(&root)?;
        root.present().map_err(drawing_error)?;
    }
    let bytes = fs::read(&path)?;
    debug!("panel '{}' encoded into {} bytes", name, bytes.len());
    Ok(PngImage {
        name: name.to_string(),
        width: style.width,
        height: style.height,
        bytes,
    })
}
