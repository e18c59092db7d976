//! Minimal WebVTT cue parser for synthesized subtitle files.

use readaloud_core::Caption;

/// Parse the cues of a WebVTT document into captions.
///
/// Only cue timing and payload are read. Header, notes and cue identifiers
/// are skipped, multi-line payloads are joined with a space, and cues whose
/// timing line does not parse or whose payload is blank are dropped.
#[must_use]
pub fn parse_vtt(content: &str) -> Vec<Caption> {
    let mut captions = Vec::new();
    let mut lines = content.lines().map(str::trim).peekable();

    while let Some(line) = lines.next() {
        let Some((start, end)) = parse_timing(line) else {
            continue;
        };

        let mut text = String::new();
        while let Some(payload) = lines.next_if(|l| !l.is_empty()) {
            if !text.is_empty() {
                text.push(' ');
            }
            text.push_str(payload);
        }

        if text.is_empty() {
            continue;
        }
        captions.push(Caption::new(start, end, text));
    }

    captions
}

/// Parse `start --> end [settings]`.
fn parse_timing(line: &str) -> Option<(f64, f64)> {
    let (start, rest) = line.split_once("-->")?;
    let end = rest.split_whitespace().next()?;
    Some((parse_timestamp(start.trim())?, parse_timestamp(end)?))
}

/// Parse `HH:MM:SS.mmm` or `MM:SS.mmm` into seconds.
///
/// A comma decimal separator (SRT style) is accepted too.
fn parse_timestamp(stamp: &str) -> Option<f64> {
    let stamp = stamp.replace(',', ".");
    let parts: Vec<&str> = stamp.split(':').collect();
    let (hours, minutes, seconds) = match parts.as_slice() {
        [h, m, s] => (h.parse::<u32>().ok()?, m.parse::<u32>().ok()?, *s),
        [m, s] => (0, m.parse::<u32>().ok()?, *s),
        _ => return None,
    };
    let seconds: f64 = seconds.parse().ok()?;
    if !seconds.is_finite() || seconds < 0.0 {
        return None;
    }
    Some(f64::from(hours) * 3600.0 + f64::from(minutes) * 60.0 + seconds)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "WEBVTT\n\n\
        00:00:00.100 --> 00:00:01.850\n\
        안녕하세요.\n\n\
        2\n\
        00:00:01.900 --> 00:00:04.200 align:start\n\
        오늘은 날씨가\n\
        좋네요.\n\n";

    #[test]
    fn test_parses_cues_and_joins_payload_lines() {
        let captions = parse_vtt(SAMPLE);
        assert_eq!(captions.len(), 2);
        assert!((captions[0].start - 0.1).abs() < 1e-9);
        assert!((captions[0].end - 1.85).abs() < 1e-9);
        assert_eq!(captions[0].text, "안녕하세요.");
        assert_eq!(captions[1].text, "오늘은 날씨가 좋네요.");
        assert!((captions[1].end - 4.2).abs() < 1e-9);
    }

    #[test]
    fn test_hours_and_short_form_timestamps() {
        assert_eq!(parse_timestamp("01:02:03.5"), Some(3723.5));
        assert_eq!(parse_timestamp("02:03.250"), Some(123.25));
        assert_eq!(parse_timestamp("00:00:01,500"), Some(1.5));
        assert_eq!(parse_timestamp("garbage"), None);
    }

    #[test]
    fn test_blank_and_malformed_cues_are_dropped() {
        let content = "WEBVTT\n\n00:00:00.000 --> 00:00:01.000\n\n\
            xx:00 --> 00:00:02.000\n무시\n\n\
            00:00:02.000 --> 00:00:03.000\n남는 문장\n";
        let captions = parse_vtt(content);
        assert_eq!(captions.len(), 1);
        assert_eq!(captions[0].text, "남는 문장");
    }

    #[test]
    fn test_crlf_input() {
        let captions = parse_vtt("WEBVTT\r\n\r\n00:00.000 --> 00:01.000\r\n하나\r\n");
        assert_eq!(captions.len(), 1);
        assert_eq!(captions[0].text, "하나");
    }
}
