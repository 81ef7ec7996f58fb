use kurbo::Rect;

use crate::{
    foundation::error::{SearchVizError, SearchVizResult},
    marks::tracker::{IndexMark, MarkFrame},
    render::{frame::FrameRGBA, sink::StepSink},
    search::model::{Step, StepKind, Trace},
};

/// Colors used by the storyboard, RGBA8 with straight alpha.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Palette {
    pub background: [u8; 4],
    pub cell_border: [u8; 4],
    pub untouched: [u8; 4],
    pub under_test: [u8; 4],
    pub scanned: [u8; 4],
    pub skipped: [u8; 4],
    pub found: [u8; 4],
    pub excluded: [u8; 4],
    pub low: [u8; 4],
    pub mid: [u8; 4],
    pub high: [u8; 4],
    pub not_found: [u8; 4],
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            background: [0xFF, 0xFF, 0xFF, 0xFF],
            cell_border: [0x2C, 0x3E, 0x50, 0xFF],
            untouched: [0xFF, 0xFF, 0xFF, 0xFF],
            under_test: [0x34, 0x98, 0xDB, 0xFF],
            scanned: [0x9B, 0x59, 0xB6, 0xFF],
            skipped: [0x95, 0xA5, 0xA6, 0xFF],
            found: [0x2E, 0xCC, 0x71, 0xFF],
            excluded: [0xEC, 0xF0, 0xF1, 0xFF],
            low: [0x34, 0x98, 0xDB, 0xFF],
            mid: [0x9B, 0x59, 0xB6, 0xFF],
            high: [0xE6, 0x7E, 0x22, 0xFF],
            not_found: [0xFF, 0x00, 0x00, 0xFF],
        }
    }
}

impl Palette {
    pub fn for_mark(&self, mark: IndexMark) -> [u8; 4] {
        match mark {
            IndexMark::Untouched => self.untouched,
            IndexMark::UnderTest => self.under_test,
            IndexMark::Scanned => self.scanned,
            IndexMark::Skipped => self.skipped,
            IndexMark::Found => self.found,
            IndexMark::Excluded => self.excluded,
        }
    }
}

/// Layout and pacing of storyboard frames.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct StoryboardStyle {
    /// Side length of one array cell.
    pub cell_px: u32,
    pub gap_px: u32,
    pub margin_px: u32,
    pub border_px: u32,
    pub fps: u32,
    /// How long each step stays on screen.
    pub frames_per_step: u32,
    /// Extra frames the terminal step is held for.
    pub hold_frames: u32,
    pub palette: Palette,
}

impl Default for StoryboardStyle {
    fn default() -> Self {
        Self {
            cell_px: 64,
            gap_px: 4,
            margin_px: 32,
            border_px: 2,
            fps: 30,
            frames_per_step: 30,
            hold_frames: 60,
            palette: Palette::default(),
        }
    }
}

impl StoryboardStyle {
    pub fn validate(&self) -> SearchVizResult<()> {
        if self.cell_px < 8 {
            return Err(SearchVizError::validation("cell_px must be >= 8"));
        }
        if self.border_px * 2 >= self.cell_px {
            return Err(SearchVizError::validation(
                "border_px must be less than half of cell_px",
            ));
        }
        if self.fps == 0 {
            return Err(SearchVizError::validation("fps must be non-zero"));
        }
        if self.frames_per_step == 0 {
            return Err(SearchVizError::validation(
                "frames_per_step must be non-zero",
            ));
        }
        Ok(())
    }

    fn lane_px(&self) -> u32 {
        (self.cell_px / 6).max(2)
    }
}

/// Draws one frame per step: a row of cells colored by mark, with `low`, `mid` and `high`
/// markers in three lanes under the row.
#[derive(Clone, Debug)]
pub struct Storyboard {
    style: StoryboardStyle,
    width: u32,
    height: u32,
    cells: Vec<Rect>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Lane {
    Low,
    Mid,
    High,
}

impl Storyboard {
    pub fn new(style: StoryboardStyle, len: usize) -> SearchVizResult<Self> {
        style.validate()?;
        if len == 0 {
            return Err(SearchVizError::EmptyArray);
        }

        let too_large = || {
            SearchVizError::validation(format!(
                "storyboard for {len} cells does not fit in a u32 canvas"
            ))
        };
        let n = u32::try_from(len).map_err(|_| too_large())?;
        let (width, height) = canvas_size(&style, n).ok_or_else(too_large)?;

        let cells = (0..n)
            .map(|i| {
                let x0 = f64::from(style.margin_px + i * (style.cell_px + style.gap_px));
                let y0 = f64::from(style.margin_px);
                Rect::new(
                    x0,
                    y0,
                    x0 + f64::from(style.cell_px),
                    y0 + f64::from(style.cell_px),
                )
            })
            .collect();

        Ok(Self {
            style,
            width,
            height,
            cells,
        })
    }

    pub fn for_trace<T>(style: StoryboardStyle, trace: &Trace<T>) -> SearchVizResult<Self> {
        Self::new(style, trace.array.len())
    }

    /// Even canvas size, as required for yuv420p output.
    pub fn canvas(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn style(&self) -> &StoryboardStyle {
        &self.style
    }

    pub fn cell(&self, index: usize) -> Option<Rect> {
        self.cells.get(index).copied()
    }

    /// Draw the marks, plus the cursor of `step` when given.
    pub fn draw<T>(&self, step: Option<&Step<T>>, marks: &[IndexMark]) -> SearchVizResult<FrameRGBA> {
        if marks.len() != self.cells.len() {
            return Err(SearchVizError::validation(format!(
                "storyboard has {} cells but {} marks were given",
                self.cells.len(),
                marks.len()
            )));
        }

        let p = &self.style.palette;
        let border = f64::from(self.style.border_px);
        let mut frame = FrameRGBA::filled(self.width, self.height, p.background);

        for (cell, mark) in self.cells.iter().zip(marks) {
            frame.fill_rect(*cell, p.for_mark(*mark));
            frame.stroke_rect(*cell, border, p.cell_border);
        }

        let Some(step) = step else {
            return Ok(frame);
        };

        let cursor = step.cursor;
        if cursor.is_open() || step.kind == StepKind::Found {
            self.draw_marker(&mut frame, cursor.low, Lane::Low, p.low);
            self.draw_marker(&mut frame, cursor.high, Lane::High, p.high);
            if let Some(mid) = cursor.mid {
                self.draw_marker(&mut frame, mid, Lane::Mid, p.mid);
            }
        }

        if step.kind == StepKind::NotFound {
            if let (Some(first), Some(last)) = (self.cells.first(), self.cells.last()) {
                let pad = f64::from(self.style.gap_px);
                let around = Rect::new(
                    first.x0 - pad,
                    first.y0 - pad,
                    last.x1 + pad,
                    last.y1 + pad,
                );
                frame.stroke_rect(around, border, p.not_found);
            }
        }

        Ok(frame)
    }

    fn draw_marker(&self, frame: &mut FrameRGBA, index: i64, lane: Lane, rgba: [u8; 4]) {
        let Some(cell) = usize::try_from(index).ok().and_then(|i| self.cells.get(i)) else {
            return;
        };
        let lane_px = f64::from(self.style.lane_px());
        let gap = f64::from(self.style.gap_px);
        let row = match lane {
            Lane::Low => 0.0,
            Lane::Mid => 1.0,
            Lane::High => 2.0,
        };
        let y0 = cell.y1 + gap + row * (lane_px + gap);
        let inset = cell.width() / 4.0;
        frame.fill_rect(
            Rect::new(cell.x0 + inset, y0, cell.x1 - inset, y0 + lane_px),
            rgba,
        );
    }
}

fn canvas_size(style: &StoryboardStyle, n: u32) -> Option<(u32, u32)> {
    let row_w = n
        .checked_mul(style.cell_px)?
        .checked_add((n - 1).checked_mul(style.gap_px)?)?;
    let lanes_h = style.lane_px().checked_add(style.gap_px)?.checked_mul(3)?;
    let margins = style.margin_px.checked_mul(2)?;
    let width = margins.checked_add(row_w)?;
    let height = margins
        .checked_add(style.cell_px)?
        .checked_add(style.gap_px)?
        .checked_add(lanes_h)?;
    Some((even(width)?, even(height)?))
}

fn even(v: u32) -> Option<u32> {
    v.checked_add(v % 2)
}

/// Collects one storyboard frame per step, preceded by the untouched starting frame.
pub struct FrameCollector {
    board: Storyboard,
    frames: Vec<FrameRGBA>,
}

impl FrameCollector {
    pub fn new(board: Storyboard) -> Self {
        Self {
            board,
            frames: Vec::new(),
        }
    }

    pub fn frames(&self) -> &[FrameRGBA] {
        &self.frames
    }

    pub fn into_frames(self) -> Vec<FrameRGBA> {
        self.frames
    }
}

impl<T> StepSink<T> for FrameCollector {
    fn begin(&mut self, trace: &Trace<T>) -> SearchVizResult<()> {
        let marks = vec![IndexMark::Untouched; trace.array.len()];
        self.frames.push(self.board.draw::<T>(None, &marks)?);
        Ok(())
    }

    fn step(&mut self, step: &Step<T>, marks: &MarkFrame) -> SearchVizResult<()> {
        self.frames.push(self.board.draw(Some(step), &marks.marks)?);
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/storyboard.rs"]
mod tests;
