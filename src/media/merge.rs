use std::{
    path::{Path, PathBuf},
    process::{Command, Stdio},
    time::SystemTime,
};

use anyhow::Context as _;

use crate::{
    encode::ffmpeg::{ensure_parent_dir, is_ffmpeg_on_path},
    foundation::error::{SearchVizError, SearchVizResult},
};

/// A video file found by [`list_clips`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClipFile {
    pub path: PathBuf,
    /// Creation time, or modification time where the platform does not record creation.
    pub created: SystemTime,
}

/// All `*.mp4` files under `dir` (recursively, extension case-insensitive), oldest first.
///
/// Render tools write partial clips in playback order, so creation time is the order
/// that matters; names are only used to break ties.
pub fn list_clips(dir: &Path) -> SearchVizResult<Vec<ClipFile>> {
    if !dir.is_dir() {
        return Err(SearchVizError::validation(format!(
            "clip folder '{}' does not exist",
            dir.display()
        )));
    }
    let mut clips = Vec::new();
    collect_clips(dir, &mut clips)?;
    sort_clips(&mut clips);
    Ok(clips)
}

fn collect_clips(dir: &Path, out: &mut Vec<ClipFile>) -> SearchVizResult<()> {
    let entries =
        std::fs::read_dir(dir).with_context(|| format!("read clip folder '{}'", dir.display()))?;
    for entry in entries {
        let entry = entry.with_context(|| format!("read entry in '{}'", dir.display()))?;
        let path = entry.path();
        let meta = entry
            .metadata()
            .with_context(|| format!("stat '{}'", path.display()))?;
        if meta.is_dir() {
            collect_clips(&path, out)?;
        } else if is_mp4(&path) {
            let created = meta
                .created()
                .or_else(|_| meta.modified())
                .with_context(|| format!("read timestamps of '{}'", path.display()))?;
            out.push(ClipFile { path, created });
        }
    }
    Ok(())
}

fn is_mp4(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("mp4"))
}

pub(crate) fn sort_clips(clips: &mut [ClipFile]) {
    clips.sort_by(|a, b| a.created.cmp(&b.created).then_with(|| a.path.cmp(&b.path)));
}

/// One output file built from the clips at positions `start..=end` of [`list_clips`].
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct MergeGroup {
    pub output: PathBuf,
    pub start: usize,
    pub end: usize, // inclusive
}

/// Named output groups, processed in order.
///
/// ```json
/// { "groups": [ { "output": "merge1.mp4", "start": 0, "end": 4 } ] }
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct MergePlan {
    pub groups: Vec<MergeGroup>,
    #[serde(default = "default_overwrite")]
    pub overwrite: bool,
}

fn default_overwrite() -> bool {
    true
}

impl MergePlan {
    /// Check every range against `clip_count` before anything is encoded.
    pub fn validate(&self, clip_count: usize) -> SearchVizResult<()> {
        if self.groups.is_empty() {
            return Err(SearchVizError::validation("merge plan has no groups"));
        }
        for g in &self.groups {
            if g.start > g.end {
                return Err(SearchVizError::validation(format!(
                    "group '{}': start {} is after end {}",
                    g.output.display(),
                    g.start,
                    g.end
                )));
            }
            if g.end >= clip_count {
                return Err(SearchVizError::validation(format!(
                    "group '{}': end {} is past the last clip (found {clip_count})",
                    g.output.display(),
                    g.end
                )));
            }
        }
        Ok(())
    }
}

/// Parse `OUTPUT=START-END`, the command-line spelling of a [`MergeGroup`].
pub fn parse_group(s: &str) -> SearchVizResult<MergeGroup> {
    let bad = || SearchVizError::validation(format!("expected OUTPUT=START-END, got '{s}'"));
    let (output, range) = s.rsplit_once('=').ok_or_else(bad)?;
    let (start, end) = range.split_once('-').ok_or_else(bad)?;
    if output.trim().is_empty() {
        return Err(bad());
    }
    Ok(MergeGroup {
        output: PathBuf::from(output.trim()),
        start: start.trim().parse().map_err(|_| bad())?,
        end: end.trim().parse().map_err(|_| bad())?,
    })
}

/// Concatenate `clips` into `out_path`, re-encoding to H.264 video and AAC audio.
#[tracing::instrument(skip(clips), fields(clips = clips.len()))]
pub fn merge_clips(clips: &[PathBuf], out_path: &Path, overwrite: bool) -> SearchVizResult<()> {
    if clips.is_empty() {
        return Err(SearchVizError::validation("nothing to merge"));
    }
    if !overwrite && out_path.exists() {
        return Err(SearchVizError::validation(format!(
            "output file '{}' already exists",
            out_path.display()
        )));
    }
    if !is_ffmpeg_on_path() {
        return Err(SearchVizError::media(
            "ffmpeg is required for merging, but was not found on PATH",
        ));
    }
    ensure_parent_dir(out_path)?;

    let list_path = concat_list_path(out_path);
    std::fs::write(&list_path, concat_list(clips)?)
        .with_context(|| format!("write concat list '{}'", list_path.display()))?;

    let result = Command::new("ffmpeg")
        .arg(if overwrite { "-y" } else { "-n" })
        .args(["-loglevel", "error", "-f", "concat", "-safe", "0", "-i"])
        .arg(&list_path)
        .args([
            "-c:v",
            "libx264",
            "-pix_fmt",
            "yuv420p",
            "-c:a",
            "aac",
            "-movflags",
            "+faststart",
        ])
        .arg(out_path)
        .stdin(Stdio::null())
        .output();
    let _ = std::fs::remove_file(&list_path);

    let output =
        result.map_err(|e| SearchVizError::media(format!("failed to run ffmpeg: {e}")))?;
    if !output.status.success() {
        return Err(SearchVizError::media(format!(
            "ffmpeg merge into '{}' failed: {}",
            out_path.display(),
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }
    tracing::info!(out = %out_path.display(), "merged clips");
    Ok(())
}

fn concat_list_path(out_path: &Path) -> PathBuf {
    let mut name = out_path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".concat.txt");
    out_path.with_file_name(name)
}

/// Body of an ffmpeg concat-demuxer list. Paths are made absolute because the demuxer
/// resolves relative entries against the list file's folder.
fn concat_list(clips: &[PathBuf]) -> SearchVizResult<String> {
    let mut body = String::from("ffconcat version 1.0\n");
    for clip in clips {
        let abs = std::path::absolute(clip)
            .with_context(|| format!("resolve '{}'", clip.display()))?;
        let s = abs.to_string_lossy().replace('\'', r"'\''");
        body.push_str(&format!("file '{s}'\n"));
    }
    Ok(body)
}

/// List the clips in `dir`, then build every group of `plan` in order.
///
/// Group outputs that are relative paths are resolved against the current directory.
/// The whole plan is validated before the first merge starts.
pub fn run_merge_plan(dir: &Path, plan: &MergePlan) -> SearchVizResult<Vec<PathBuf>> {
    let clips = list_clips(dir)?;
    if clips.is_empty() {
        return Err(SearchVizError::validation(format!(
            "no mp4 files found in '{}'",
            dir.display()
        )));
    }
    plan.validate(clips.len())?;

    let mut outputs = Vec::with_capacity(plan.groups.len());
    for g in &plan.groups {
        tracing::info!(
            output = %g.output.display(),
            start = g.start,
            end = g.end,
            "merging group"
        );
        let selected: Vec<PathBuf> = clips[g.start..=g.end]
            .iter()
            .map(|c| c.path.clone())
            .collect();
        merge_clips(&selected, &g.output, plan.overwrite)?;
        outputs.push(g.output.clone());
    }
    Ok(outputs)
}

#[cfg(test)]
#[path = "../../tests/unit/media/merge.rs"]
mod tests;
