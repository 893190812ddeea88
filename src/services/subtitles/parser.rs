use log::warn;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::Cue;

/// The two timestamp tokens of a cue delimiter line. Both `,` and `.` are
/// accepted as the millisecond separator.
static TIME_RANGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d{1,2}:\d{2}:\d{2}[,.]\d{3})\s*-->\s*(\d{1,2}:\d{2}:\d{2}[,.]\d{3})")
        .expect("Failed to compile time range pattern")
});

static TIME_TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d{1,2}):(\d{2}):(\d{2})[,.](\d{3})").expect("Failed to compile timestamp pattern")
});

/// Parses one `H{1,2}:MM:SS{,|.}mmm` token to seconds.
fn parse_timestamp(token: &str) -> Option<f64> {
    let caps = TIME_TOKEN.captures(token)?;
    let hours: f64 = caps[1].parse().ok()?;
    let minutes: f64 = caps[2].parse().ok()?;
    let seconds: f64 = caps[3].parse().ok()?;
    let milliseconds: f64 = caps[4].parse().ok()?;
    Some(hours * 3600.0 + minutes * 60.0 + seconds + milliseconds / 1000.0)
}

/// Parses raw SRT text into an ordered cue sequence.
///
/// Fails soft: input without a single valid cue block yields an empty
/// sequence rather than an error. Blocks are separated by blank lines
/// (carriage returns tolerated); within a block the delimiter line is found
/// by scanning, so the conventional leading index line is optional. A block
/// with a malformed delimiter line or empty text is skipped whole.
pub fn parse_srt(raw: &str) -> Vec<Cue> {
    let mut cues = Vec::new();
    if raw.trim().is_empty() {
        return cues;
    }

    let normalized = raw.trim().replace('\r', "");
    for block in normalized.split("\n\n") {
        let lines: Vec<&str> = block.split('\n').collect();
        if lines.len() < 2 {
            continue;
        }

        let Some(time_line_index) = lines.iter().position(|line| line.contains("-->")) else {
            continue;
        };
        let Some(caps) = TIME_RANGE.captures(lines[time_line_index]) else {
            warn!(
                "Skipping subtitle block with malformed delimiter line: {}",
                lines[time_line_index]
            );
            continue;
        };
        let (Some(start_time), Some(end_time)) =
            (parse_timestamp(&caps[1]), parse_timestamp(&caps[2]))
        else {
            continue;
        };
        if start_time > end_time {
            warn!(
                "Skipping subtitle block with reversed time range: {}",
                lines[time_line_index]
            );
            continue;
        }

        let text = lines[time_line_index + 1..].join("\n").trim().to_string();
        if text.is_empty() {
            continue;
        }

        cues.push(Cue::new(start_time, end_time, text));
    }

    cues
}
