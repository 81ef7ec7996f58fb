use std::path::Path;

use anyhow::Context as _;

use crate::foundation::error::{SearchVizError, SearchVizResult};

/// Opaque RGBA8 pixels, row-major, tightly packed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGBA {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl FrameRGBA {
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let mut data = Vec::with_capacity(width as usize * height as usize * 4);
        for _ in 0..(width as usize * height as usize) {
            data.extend_from_slice(&rgba);
        }
        Self {
            width,
            height,
            data,
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        Some([
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ])
    }

    /// Fill the pixels whose centers fall inside `rect`, clipped to the frame.
    pub fn fill_rect(&mut self, rect: kurbo::Rect, rgba: [u8; 4]) {
        let x0 = rect.x0.max(0.0).round() as u32;
        let y0 = rect.y0.max(0.0).round() as u32;
        let x1 = (rect.x1.max(0.0).round() as u32).min(self.width);
        let y1 = (rect.y1.max(0.0).round() as u32).min(self.height);
        for y in y0..y1 {
            let row = y as usize * self.width as usize;
            for x in x0..x1 {
                let i = (row + x as usize) * 4;
                self.data[i..i + 4].copy_from_slice(&rgba);
            }
        }
    }

    /// Draw a `width`-pixel outline just inside `rect`.
    pub fn stroke_rect(&mut self, rect: kurbo::Rect, width: f64, rgba: [u8; 4]) {
        let w = width.min(rect.width() / 2.0).min(rect.height() / 2.0);
        self.fill_rect(kurbo::Rect::new(rect.x0, rect.y0, rect.x1, rect.y0 + w), rgba);
        self.fill_rect(kurbo::Rect::new(rect.x0, rect.y1 - w, rect.x1, rect.y1), rgba);
        self.fill_rect(kurbo::Rect::new(rect.x0, rect.y0, rect.x0 + w, rect.y1), rgba);
        self.fill_rect(kurbo::Rect::new(rect.x1 - w, rect.y0, rect.x1, rect.y1), rgba);
    }
}

/// Write a frame as PNG, creating the parent directory if needed.
pub fn write_png(frame: &FrameRGBA, path: &Path) -> SearchVizResult<()> {
    if frame.data.len() != frame.width as usize * frame.height as usize * 4 {
        return Err(SearchVizError::validation(
            "frame.data size mismatch with width*height*4",
        ));
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    image::save_buffer_with_format(
        path,
        &frame.data,
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", path.display()))?;
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/render/frame.rs"]
mod tests;
