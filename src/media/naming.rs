//! File naming for extracted frames: `frame_{index:03}_{elapsed}.jpg`.
//!
//! `elapsed` is the frame's timestamp written the way Python prints a `timedelta`
//! (`H:MM:SS` with an optional `.ffffff` microsecond part, and a `N day(s), ` prefix
//! past 24 hours), with every `:` replaced by `-` so the name is valid on every
//! filesystem. Existing frame folders use this layout, so it must not drift.

const MICROS_PER_SEC: u64 = 1_000_000;
const MICROS_PER_DAY: u64 = 86_400 * MICROS_PER_SEC;

/// `elapsed_secs` rendered as `H-MM-SS[.ffffff]`.
pub fn format_elapsed(elapsed_secs: f64) -> String {
    let micros = (elapsed_secs.max(0.0) * MICROS_PER_SEC as f64).round_ties_even() as u64;
    let days = micros / MICROS_PER_DAY;
    let rem = micros % MICROS_PER_DAY;

    let secs = rem / MICROS_PER_SEC;
    let frac = rem % MICROS_PER_SEC;
    let (h, m, s) = (secs / 3600, (secs / 60) % 60, secs % 60);

    let mut out = String::new();
    if days > 0 {
        let plural = if days == 1 { "" } else { "s" };
        out.push_str(&format!("{days} day{plural}, "));
    }
    out.push_str(&format!("{h}-{m:02}-{s:02}"));
    if frac != 0 {
        out.push_str(&format!(".{frac:06}"));
    }
    out
}

/// Name of the JPEG holding frame `index`, shown `elapsed_secs` into the video.
pub fn frame_file_name(index: u64, elapsed_secs: f64) -> String {
    format!("frame_{index:03}_{}.jpg", format_elapsed(elapsed_secs))
}

/// Parts of a name produced by [`frame_file_name`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameName {
    pub index: u64,
    pub elapsed: String,
}

pub fn parse_frame_file_name(name: &str) -> Option<FrameName> {
    let body = name.strip_prefix("frame_")?.strip_suffix(".jpg")?;
    let (index, elapsed) = body.split_once('_')?;
    if index.len() < 3 || !index.bytes().all(|b| b.is_ascii_digit()) || elapsed.is_empty() {
        return None;
    }
    Some(FrameName {
        index: index.parse().ok()?,
        elapsed: elapsed.to_string(),
    })
}

#[cfg(test)]
#[path = "../../tests/unit/media/naming.rs"]
mod tests;
