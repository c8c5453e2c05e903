//! Strand previews for configuration menus.
//!
//! A preview lays a dash configuration's strand out flat: one square cell
//! per hair segment, left to right from the bangs, each filled with the
//! color that segment would have at a given animation time.

use image::{Rgba, RgbaImage};

use crate::color::Rgb;
use crate::hyperline::{Hyperline, strand_phase};
use crate::settings::DashSettings;
use crate::source::HairSource;

/// Layout and sampling parameters of a strand preview.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PreviewOptions {
    /// Edge length of one segment cell in pixels.
    pub cell_size: u32,
    /// Number of segments to draw. `None` uses the configured hair length.
    pub segments: Option<u32>,
    /// Animation time to sample at, in seconds.
    pub time: f32,
    /// Color handed to the hair type as the host's own color.
    pub original: Rgb,
}

impl Default for PreviewOptions {
    fn default() -> Self {
        Self {
            cell_size: 8,
            segments: None,
            time: 0.0,
            original: Rgb::new(0xAC, 0x32, 0x32),
        }
    }
}

impl PreviewOptions {
    pub fn with_cell_size(mut self, cell_size: u32) -> Self {
        self.cell_size = cell_size.max(1);
        self
    }

    pub fn with_segments(mut self, segments: u32) -> Self {
        self.segments = Some(segments.max(1));
        self
    }

    pub fn with_time(mut self, time: f32) -> Self {
        self.time = time;
        self
    }

    pub fn with_original(mut self, original: Rgb) -> Self {
        self.original = original;
        self
    }
}

/// Renders the strand of one dash record.
///
/// Segments whose record has no resolvable hair type show
/// [`PreviewOptions::original`].
pub fn render_strand_preview(dash: &DashSettings, options: &PreviewOptions) -> RgbaImage {
    let segments = options
        .segments
        .unwrap_or_else(|| dash.hair_length.max(1) as u32);
    let cell = options.cell_size.max(1);
    let hair = dash.selected_hair();

    let mut image = RgbaImage::new(segments * cell, cell);
    for segment in 0..segments {
        let color = match hair {
            Some(hair) => {
                let phase = strand_phase(
                    segment as usize,
                    dash.hair_length,
                    dash.hair_phase,
                    dash.hair_speed,
                    options.time,
                );
                hair.color_at_phase(options.original, phase)
            }
            None => options.original,
        };
        fill_cell(&mut image, segment * cell, cell, color);
    }
    image
}

fn fill_cell(image: &mut RgbaImage, x0: u32, size: u32, color: Rgb) {
    let pixel = Rgba([color.red, color.green, color.blue, 255]);
    for y in 0..size {
        for x in x0..x0 + size {
            image.put_pixel(x, y, pixel);
        }
    }
}

impl Hyperline {
    /// Renders the strand that currently governs `dashes`.
    ///
    /// Returns `None` for dash counts with no record.
    pub fn strand_preview(&self, dashes: i32, options: &PreviewOptions) -> Option<RgbaImage> {
        let sources = self.sources();
        let dash = sources.dash(dashes)?;
        Some(render_strand_preview(dash, options))
    }
}
