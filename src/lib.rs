//! Searchviz turns a search over a small array into a step-by-step visual trace.
//!
//! A session (array, optional target, variant) is played through linear search, binary
//! search or binary peak finding, and every probe, bracket update and outcome becomes one
//! [`Step`]. The steps drive a per-index mark state machine, and the marks drive the
//! output surfaces: JSON lines, storyboard PNG frames and MP4 video.
//!
//! # Pipeline overview
//!
//! 1. **Generate**: `SessionSpec -> Trace` ([`generate`], or lazily via [`steps`])
//! 2. **Track**: `Trace -> MarkFrame` per step ([`MarkTracker`], [`replay`])
//! 3. **Sink**: each `(Step, MarkFrame)` pair is handed to a [`StepSink`] by [`drive`]
//! 4. **Encode** (optional): storyboard frames are streamed to the system `ffmpeg` binary
//!
//! Frame extraction and clip merging for finished videos live alongside, in
//! [`extract_frames`] and [`merge_clips`].
//!
//! Generation is pure and deterministic: the same session always produces the same trace,
//! and [`fingerprint_trace`] gives a stable digest to compare replays against.
#![forbid(unsafe_code)]

mod encode;
mod foundation;
mod marks;
mod media;
mod render;
mod search;

pub use encode::ffmpeg::{
    EncodeConfig, FfmpegEncoder, default_mp4_config, ensure_parent_dir, is_ffmpeg_on_path,
    is_ffprobe_on_path,
};
pub use foundation::core::{Bracket, Cursor, Fps, IndexSpan};
pub use foundation::error::{SearchVizError, SearchVizResult};
pub use marks::tracker::{IndexMark, MarkFrame, MarkTracker, MarkTransition, replay};
pub use media::extract::{ExtractStats, extract_frames};
pub use media::merge::{
    ClipFile, MergeGroup, MergePlan, list_clips, merge_clips, parse_group, run_merge_plan,
};
pub use media::naming::{FrameName, format_elapsed, frame_file_name, parse_frame_file_name};
pub use media::probe::{VideoSourceInfo, parse_probe_output, probe_video};
pub use render::frame::{FrameRGBA, write_png};
pub use render::pipeline::{RenderStats, RenderToMp4Opts, frames_for_trace, render_trace_to_mp4};
pub use render::sink::{JsonLinesSink, StepSink, drive};
pub use render::storyboard::{FrameCollector, Palette, Storyboard, StoryboardStyle};
pub use search::fingerprint::{TraceFingerprint, fingerprint_trace};
pub use search::generator::{
    Steps, generate, generate_session, generate_within, steps, steps_within,
};
pub use search::model::{Comparison, SessionSpec, Step, StepKind, Trace, Variant};
pub use search::precondition::{check_preconditions, check_sorted, check_unimodal};
