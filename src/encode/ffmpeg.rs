use std::{
    io::Write as _,
    path::{Path, PathBuf},
    process::{Child, ChildStdin, Command, Stdio},
};

use crate::{
    foundation::error::{SearchVizError, SearchVizResult},
    render::frame::FrameRGBA,
};

/// Output settings for [`FfmpegEncoder`].
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct EncodeConfig {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    pub out_path: PathBuf,
    pub overwrite: bool,
    /// x264 constant rate factor; lower is better quality.
    #[serde(default = "default_crf")]
    pub crf: u8,
}

fn default_crf() -> u8 {
    18
}

impl EncodeConfig {
    pub fn validate(&self) -> SearchVizResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(SearchVizError::validation(
                "encode width/height must be non-zero",
            ));
        }
        if self.fps == 0 {
            return Err(SearchVizError::validation("encode fps must be non-zero"));
        }
        if !self.width.is_multiple_of(2) || !self.height.is_multiple_of(2) {
            return Err(SearchVizError::validation(
                "encode width/height must be even (required for yuv420p mp4 output)",
            ));
        }
        if self.crf > 51 {
            return Err(SearchVizError::validation("encode crf must be in 0..=51"));
        }
        Ok(())
    }
}

pub fn default_mp4_config(
    out_path: impl Into<PathBuf>,
    width: u32,
    height: u32,
    fps: u32,
) -> EncodeConfig {
    EncodeConfig {
        width,
        height,
        fps,
        out_path: out_path.into(),
        overwrite: true,
        crf: default_crf(),
    }
}

pub fn is_ffmpeg_on_path() -> bool {
    binary_on_path("ffmpeg")
}

pub fn is_ffprobe_on_path() -> bool {
    binary_on_path("ffprobe")
}

fn binary_on_path(name: &str) -> bool {
    Command::new(name)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

pub fn ensure_parent_dir(path: &Path) -> SearchVizResult<()> {
    if let Some(parent) = path.parent() {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Streams opaque RGBA frames into a system `ffmpeg` child producing an H.264 MP4.
pub struct FfmpegEncoder {
    cfg: EncodeConfig,
    child: Child,
    stdin: Option<ChildStdin>,
    frames_written: u64,
}

impl FfmpegEncoder {
    pub fn new(cfg: EncodeConfig) -> SearchVizResult<Self> {
        cfg.validate()?;
        ensure_parent_dir(&cfg.out_path)?;

        if !cfg.overwrite && cfg.out_path.exists() {
            return Err(SearchVizError::validation(format!(
                "output file '{}' already exists",
                cfg.out_path.display()
            )));
        }

        if !is_ffmpeg_on_path() {
            return Err(SearchVizError::media(
                "ffmpeg is required for MP4 encoding, but was not found on PATH",
            ));
        }

        let mut cmd = Command::new("ffmpeg");
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());

        cmd.arg(if cfg.overwrite { "-y" } else { "-n" });
        cmd.args([
            "-loglevel",
            "error",
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgba",
            "-s",
            &format!("{}x{}", cfg.width, cfg.height),
            "-r",
            &cfg.fps.to_string(),
            "-i",
            "pipe:0",
            "-an",
            "-c:v",
            "libx264",
            "-crf",
            &cfg.crf.to_string(),
            "-pix_fmt",
            "yuv420p",
            "-movflags",
            "+faststart",
        ])
        .arg(&cfg.out_path);

        tracing::debug!(out = %cfg.out_path.display(), "spawning ffmpeg encoder");
        let mut child = cmd.spawn().map_err(|e| {
            SearchVizError::media(format!(
                "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
            ))
        })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| SearchVizError::media("failed to open ffmpeg stdin (unexpected)"))?;

        Ok(Self {
            cfg,
            child,
            stdin: Some(stdin),
            frames_written: 0,
        })
    }

    pub fn frames_written(&self) -> u64 {
        self.frames_written
    }

    pub fn encode_frame(&mut self, frame: &FrameRGBA) -> SearchVizResult<()> {
        self.encode_frame_repeated(frame, 1)
    }

    /// Write `frame` `count` times; used to hold a step on screen.
    pub fn encode_frame_repeated(&mut self, frame: &FrameRGBA, count: u32) -> SearchVizResult<()> {
        if frame.width != self.cfg.width || frame.height != self.cfg.height {
            return Err(SearchVizError::validation(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width, frame.height, self.cfg.width, self.cfg.height
            )));
        }
        if frame.data.len() != self.cfg.width as usize * self.cfg.height as usize * 4 {
            return Err(SearchVizError::validation(
                "frame.data size mismatch with width*height*4",
            ));
        }

        let Some(stdin) = self.stdin.as_mut() else {
            return Err(SearchVizError::media("ffmpeg encoder is already finalized"));
        };

        for _ in 0..count {
            stdin.write_all(&frame.data).map_err(|e| {
                SearchVizError::media(format!("failed to write frame to ffmpeg stdin: {e}"))
            })?;
        }
        self.frames_written += u64::from(count);
        Ok(())
    }

    pub fn finish(mut self) -> SearchVizResult<u64> {
        drop(self.stdin.take());

        let output = self.child.wait_with_output().map_err(|e| {
            SearchVizError::media(format!("failed to wait for ffmpeg to finish: {e}"))
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SearchVizError::media(format!(
                "ffmpeg exited with status {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        tracing::info!(
            frames = self.frames_written,
            out = %self.cfg.out_path.display(),
            "encoded mp4"
        );
        Ok(self.frames_written)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
