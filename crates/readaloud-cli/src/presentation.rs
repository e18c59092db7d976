//! Terminal formatting helpers.

use readaloud_core::Caption;

/// Format seconds as `MM:SS.mmm`.
pub fn format_timestamp(seconds: f64) -> String {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let millis = (seconds.max(0.0) * 1000.0).round() as u64;
    format!("{:02}:{:02}.{:03}", millis / 60_000, (millis / 1000) % 60, millis % 1000)
}

/// One table row per caption.
pub fn caption_rows(captions: &[Caption]) -> Vec<String> {
    let width = captions.len().to_string().len();
    captions
        .iter()
        .enumerate()
        .map(|(i, c)| {
            format!(
                "{i:>width$}  {} → {}  {}",
                format_timestamp(c.start),
                format_timestamp(c.end),
                c.text
            )
        })
        .collect()
}

pub fn print_separator() {
    println!("{}", "─".repeat(60));
}
