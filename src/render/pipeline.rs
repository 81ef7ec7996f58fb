use std::path::PathBuf;

use crate::{
    encode::ffmpeg::{EncodeConfig, FfmpegEncoder},
    foundation::error::{SearchVizError, SearchVizResult},
    marks::tracker::{IndexMark, MarkFrame},
    render::{
        frame::FrameRGBA,
        sink::{StepSink, drive},
        storyboard::{Storyboard, StoryboardStyle},
    },
    search::model::{Step, Trace},
};

/// Options for [`render_trace_to_mp4`].
#[derive(Clone, Debug)]
pub struct RenderToMp4Opts {
    pub style: StoryboardStyle,
    /// Whether to overwrite the output if it already exists.
    pub overwrite: bool,
}

impl Default for RenderToMp4Opts {
    fn default() -> Self {
        Self {
            style: StoryboardStyle::default(),
            overwrite: true,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub steps: u64,
    pub frames: u64,
}

/// Number of video frames a trace occupies: the starting frame and every step are shown
/// for `frames_per_step`, and the terminal step is held for `hold_frames` more.
pub fn frames_for_trace<T>(trace: &Trace<T>, style: &StoryboardStyle) -> u64 {
    (trace.steps.len() as u64 + 1) * u64::from(style.frames_per_step)
        + u64::from(style.hold_frames)
}

/// Render `trace` as a storyboard MP4 through the system `ffmpeg` binary.
///
/// `ffmpeg` must be installed and on `PATH`; this is checked before the first frame is
/// drawn.
#[tracing::instrument(skip(trace, opts), fields(variant = %trace.variant, steps = trace.steps.len()))]
pub fn render_trace_to_mp4<T>(
    trace: &Trace<T>,
    out_path: impl Into<PathBuf> + std::fmt::Debug,
    opts: RenderToMp4Opts,
) -> SearchVizResult<RenderStats> {
    let board = Storyboard::for_trace(opts.style, trace)?;
    let (width, height) = board.canvas();
    let cfg = EncodeConfig {
        width,
        height,
        fps: board.style().fps,
        out_path: out_path.into(),
        overwrite: opts.overwrite,
        crf: 18,
    };

    let mut sink = Mp4Sink {
        encoder: Some(FfmpegEncoder::new(cfg)?),
        board,
        last: None,
        stats: RenderStats::default(),
    };
    drive(trace, &mut sink)?;
    Ok(sink.stats)
}

struct Mp4Sink {
    encoder: Option<FfmpegEncoder>,
    board: Storyboard,
    last: Option<FrameRGBA>,
    stats: RenderStats,
}

impl Mp4Sink {
    fn show(&mut self, frame: FrameRGBA) -> SearchVizResult<()> {
        let count = self.board.style().frames_per_step;
        let encoder = self
            .encoder
            .as_mut()
            .ok_or_else(|| SearchVizError::media("storyboard encoder already finished"))?;
        encoder.encode_frame_repeated(&frame, count)?;
        self.stats.frames += u64::from(count);
        self.last = Some(frame);
        Ok(())
    }
}

impl<T> StepSink<T> for Mp4Sink {
    fn begin(&mut self, trace: &Trace<T>) -> SearchVizResult<()> {
        let marks = vec![IndexMark::Untouched; trace.array.len()];
        let frame = self.board.draw::<T>(None, &marks)?;
        self.show(frame)
    }

    fn step(&mut self, step: &Step<T>, marks: &MarkFrame) -> SearchVizResult<()> {
        let frame = self.board.draw(Some(step), &marks.marks)?;
        self.show(frame)?;
        self.stats.steps += 1;
        Ok(())
    }

    fn finish(&mut self) -> SearchVizResult<()> {
        let mut encoder = self
            .encoder
            .take()
            .ok_or_else(|| SearchVizError::media("storyboard encoder already finished"))?;
        let hold = self.board.style().hold_frames;
        if let Some(last) = &self.last {
            encoder.encode_frame_repeated(last, hold)?;
            self.stats.frames += u64::from(hold);
        }
        encoder.finish()?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/pipeline.rs"]
mod tests;
