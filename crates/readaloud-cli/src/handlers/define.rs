//! `define` command: print a dictionary entry.

use anyhow::Result;
use readaloud_core::{DictionaryLookup, normalize_word};
use readaloud_remote::HttpDictionary;

use crate::bootstrap::CliContext;

pub async fn execute(ctx: &CliContext, word: &str) -> Result<()> {
    if normalize_word(word).is_empty() {
        println!("\"{word}\" is not a word that can be looked up.");
        return Ok(());
    }
    let dictionary = HttpDictionary::new(ctx.remote.clone())?;
    let entry = dictionary.lookup(word).await?;
    println!("{}", serde_json::to_string_pretty(&entry)?);
    Ok(())
}
