//! `match` command: offline fragment lookup against a caption file.

use std::path::Path;

use anyhow::{Context, Result, bail};
use readaloud_core::{Caption, CaptionIndex, normalize};

use crate::handlers::read_text;
use crate::presentation::format_timestamp;

pub async fn execute(captions: &Path, fragment: &str) -> Result<()> {
    let raw = read_text(captions).await?;
    let captions: Vec<Caption> = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not a caption list", captions.display()))?;
    let index = CaptionIndex::from_captions(captions);

    tracing::debug!(key = %normalize(fragment), captions = index.len(), "Matching fragment");
    let Some(found) = index.find_by_fragment(fragment) else {
        bail!("No caption matches \"{fragment}\"");
    };

    if let Some(caption) = index.get(found) {
        println!(
            "#{found} at {}: {}",
            format_timestamp(caption.start),
            caption.text
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn caption_file() -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let captions = vec![
            Caption::new(0.0, 2.0, "안녕하세요."),
            Caption::new(2.0, 4.5, "오늘은 날씨가 좋네요!"),
        ];
        file.write_all(serde_json::to_string(&captions).unwrap().as_bytes())
            .unwrap();
        file
    }

    #[tokio::test]
    async fn test_match_finds_caption() {
        let file = caption_file();
        assert!(execute(file.path(), "날씨가 좋네요").await.is_ok());
    }

    #[tokio::test]
    async fn test_miss_is_an_error() {
        let file = caption_file();
        let err = execute(file.path(), "산책하러").await.unwrap_err();
        assert!(err.to_string().contains("No caption matches"));
    }

    #[tokio::test]
    async fn test_invalid_file_is_reported() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"not json").unwrap();
        let err = execute(file.path(), "날씨가").await.unwrap_err();
        assert!(err.to_string().contains("is not a caption list"));
    }
}
