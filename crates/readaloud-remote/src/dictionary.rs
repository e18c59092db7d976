//! HTTP dictionary client.

use async_trait::async_trait;
use readaloud_core::{DictionaryError, DictionaryLookup};

use crate::config::TtsClientConfig;
use crate::error::RemoteResult;
use crate::narration::{failure_from, http_client};

/// Dictionary lookup over `GET <dictionary_path>?word=<word>`.
pub struct HttpDictionary {
    client: reqwest::Client,
    config: TtsClientConfig,
}

impl HttpDictionary {
    pub fn new(config: TtsClientConfig) -> RemoteResult<Self> {
        Ok(Self {
            client: http_client(&config)?,
            config,
        })
    }

    async fn request(&self, word: &str) -> RemoteResult<serde_json::Value> {
        let url = self.config.endpoint(&self.config.dictionary_path);
        tracing::debug!(%url, word, "Dictionary lookup");

        let response = self
            .client
            .get(&url)
            .query(&[("word", word)])
            .timeout(self.config.timeout)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(failure_from(response).await);
        }
        Ok(response.json().await?)
    }
}

#[async_trait]
impl DictionaryLookup for HttpDictionary {
    async fn lookup(&self, word: &str) -> Result<serde_json::Value, DictionaryError> {
        Ok(self.request(word).await?)
    }
}
