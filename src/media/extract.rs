use std::{
    path::{Path, PathBuf},
    process::{Command, Stdio},
};

use anyhow::Context as _;

use crate::{
    foundation::error::{SearchVizError, SearchVizResult},
    media::{
        naming::frame_file_name,
        probe::{VideoSourceInfo, probe_video},
    },
};

/// Progress is logged every this many frames.
const PROGRESS_EVERY: u64 = 100;

#[derive(Clone, Debug, PartialEq)]
pub struct ExtractStats {
    pub source: VideoSourceInfo,
    pub frames_written: u64,
    pub out_dir: PathBuf,
}

/// Decode every frame of `video_path` and save it as
/// `out_dir/frame_{index:03}_{elapsed}.jpg`.
///
/// `out_dir` is created if missing. Existing files with the same names are overwritten.
#[tracing::instrument]
pub fn extract_frames(video_path: &Path, out_dir: &Path) -> SearchVizResult<ExtractStats> {
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("create frame directory '{}'", out_dir.display()))?;

    let source = probe_video(video_path)?;
    tracing::info!(
        fps = source.fps.as_f64(),
        frames = source.estimated_frames(),
        duration_sec = source.duration_sec,
        "probed video"
    );

    let frame_len = source.width as usize * source.height as usize * 3;
    if frame_len == 0 {
        return Err(SearchVizError::media(
            "decoded video frame size is zero (invalid source dimensions)",
        ));
    }

    let mut child = Command::new("ffmpeg")
        .args(["-v", "error", "-i"])
        .arg(video_path)
        .args(["-f", "rawvideo", "-pix_fmt", "rgb24", "pipe:1"])
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| SearchVizError::media(format!("failed to spawn ffmpeg for decode: {e}")))?;

    let mut stdout = child
        .stdout
        .take()
        .ok_or_else(|| SearchVizError::media("failed to open ffmpeg stdout (unexpected)"))?;

    // stderr must be read while stdout is: a full stderr pipe blocks the decoder.
    let stderr_reader = child.stderr.take().map(drain_in_background);

    let mut buf = vec![0u8; frame_len];
    let total = source.estimated_frames();

    let decoded = (|| -> SearchVizResult<u64> {
        let mut written = 0u64;
        while read_frame(&mut stdout, &mut buf)? {
            let elapsed = source.fps.frames_to_secs(written);
            let path = out_dir.join(frame_file_name(written, elapsed));
            image::save_buffer_with_format(
                &path,
                &buf,
                source.width,
                source.height,
                image::ColorType::Rgb8,
                image::ImageFormat::Jpeg,
            )
            .with_context(|| format!("write jpeg '{}'", path.display()))?;

            written += 1;
            if written.is_multiple_of(PROGRESS_EVERY) {
                tracing::info!("processed {written}/{total} frames");
            }
        }
        Ok(written)
    })();
    if decoded.is_err() {
        let _ = child.kill();
        let _ = child.wait();
    }
    let written = decoded?;
    drop(stdout);

    let status = child
        .wait()
        .map_err(|e| SearchVizError::media(format!("failed to wait for ffmpeg: {e}")))?;
    let stderr = stderr_reader
        .and_then(|h| h.join().ok())
        .unwrap_or_default();
    if !status.success() {
        return Err(SearchVizError::media(format!(
            "ffmpeg decode failed for '{}': {}",
            video_path.display(),
            stderr.trim()
        )));
    }

    tracing::info!(frames = written, out = %out_dir.display(), "extracted all frames");
    Ok(ExtractStats {
        source,
        frames_written: written,
        out_dir: out_dir.to_path_buf(),
    })
}

/// Collect everything `r` produces on a separate thread.
fn drain_in_background<R>(mut r: R) -> std::thread::JoinHandle<String>
where
    R: std::io::Read + Send + 'static,
{
    std::thread::spawn(move || {
        let mut bytes = Vec::new();
        let _ = r.read_to_end(&mut bytes);
        String::from_utf8_lossy(&bytes).into_owned()
    })
}

/// Fill `buf` with the next frame. `Ok(false)` at a clean end of stream; a frame cut
/// short is an error.
fn read_frame(r: &mut impl std::io::Read, buf: &mut [u8]) -> SearchVizResult<bool> {
    let mut filled = 0;
    while filled < buf.len() {
        let n = r
            .read(&mut buf[filled..])
            .map_err(|e| SearchVizError::media(format!("failed to read decoded frame: {e}")))?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    match filled {
        0 => Ok(false),
        n if n == buf.len() => Ok(true),
        n => Err(SearchVizError::media(format!(
            "decoded stream ended mid-frame ({n} of {} bytes)",
            buf.len()
        ))),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/media/extract.rs"]
mod tests;
