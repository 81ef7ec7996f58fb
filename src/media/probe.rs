use std::path::{Path, PathBuf};

use crate::foundation::{
    core::Fps,
    error::{SearchVizError, SearchVizResult},
};

/// Stream facts about a video file, as reported by `ffprobe`.
#[derive(Clone, Debug, PartialEq)]
pub struct VideoSourceInfo {
    pub source_path: PathBuf,
    pub width: u32,
    pub height: u32,
    pub fps: Fps,
    pub duration_sec: f64,
    /// Container frame count, when the muxer records one.
    pub frame_count: Option<u64>,
    pub has_audio: bool,
}

impl VideoSourceInfo {
    /// Best estimate of the number of frames, for progress reporting.
    pub fn estimated_frames(&self) -> u64 {
        self.frame_count
            .unwrap_or_else(|| (self.duration_sec * self.fps.as_f64()).round().max(0.0) as u64)
    }
}

pub fn probe_video(source_path: &Path) -> SearchVizResult<VideoSourceInfo> {
    let out = std::process::Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-print_format",
            "json",
            "-show_streams",
            "-show_format",
        ])
        .arg(source_path)
        .output()
        .map_err(|e| SearchVizError::media(format!("failed to run ffprobe: {e}")))?;
    if !out.status.success() {
        return Err(SearchVizError::media(format!(
            "ffprobe failed for '{}': {}",
            source_path.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }
    parse_probe_output(source_path, &out.stdout)
}

/// Interpret `ffprobe -print_format json -show_streams -show_format` output.
pub fn parse_probe_output(source_path: &Path, json: &[u8]) -> SearchVizResult<VideoSourceInfo> {
    #[derive(serde::Deserialize)]
    struct ProbeStream {
        codec_type: Option<String>,
        width: Option<u32>,
        height: Option<u32>,
        avg_frame_rate: Option<String>,
        r_frame_rate: Option<String>,
        nb_frames: Option<String>,
    }
    #[derive(serde::Deserialize)]
    struct ProbeFormat {
        duration: Option<String>,
    }
    #[derive(serde::Deserialize)]
    struct ProbeOut {
        streams: Vec<ProbeStream>,
        format: Option<ProbeFormat>,
    }

    let parsed: ProbeOut = serde_json::from_slice(json)
        .map_err(|e| SearchVizError::media(format!("ffprobe json parse failed: {e}")))?;
    let video = parsed
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or_else(|| SearchVizError::media("no video stream found"))?;
    let width = video
        .width
        .ok_or_else(|| SearchVizError::media("missing video width from ffprobe"))?;
    let height = video
        .height
        .ok_or_else(|| SearchVizError::media("missing video height from ffprobe"))?;

    // avg_frame_rate is "0/0" for some streams; fall back to the container rate.
    let (num, den) = video
        .avg_frame_rate
        .as_deref()
        .and_then(parse_ff_ratio)
        .or_else(|| video.r_frame_rate.as_deref().and_then(parse_ff_ratio))
        .ok_or_else(|| SearchVizError::media("invalid video frame rate"))?;
    let fps = Fps::new(num, den)?;

    let duration_sec = parsed
        .format
        .as_ref()
        .and_then(|f| f.duration.as_ref())
        .and_then(|s| s.parse::<f64>().ok())
        .unwrap_or(0.0);
    let frame_count = video.nb_frames.as_ref().and_then(|s| s.parse::<u64>().ok());
    let has_audio = parsed
        .streams
        .iter()
        .any(|s| s.codec_type.as_deref() == Some("audio"));

    Ok(VideoSourceInfo {
        source_path: source_path.to_path_buf(),
        width,
        height,
        fps,
        duration_sec,
        frame_count,
        has_audio,
    })
}

fn parse_ff_ratio(s: &str) -> Option<(u32, u32)> {
    let (a, b) = s.split_once('/')?;
    let a = a.parse::<u32>().ok()?;
    let b = b.parse::<u32>().ok()?;
    if a == 0 || b == 0 {
        return None;
    }
    Some((a, b))
}

#[cfg(test)]
#[path = "../../tests/unit/media/probe.rs"]
mod tests;
