//! Media-related AnkiConnect actions.

use serde::Serialize;

use crate::client::AnkiClient;
use crate::error::Result;
use crate::types::StoreMediaParams;

/// Provides access to media-related AnkiConnect operations.
///
/// Obtained via [`AnkiClient::media()`].
#[derive(Debug)]
pub struct MediaActions<'a> {
    pub(crate) client: &'a AnkiClient,
}

#[derive(Serialize)]
struct ListParams<'a> {
    pattern: &'a str,
}

#[derive(Serialize)]
struct DeleteParams<'a> {
    filename: &'a str,
}

impl<'a> MediaActions<'a> {
    /// Store a media file in Anki's media folder.
    ///
    /// Returns the filename actually used (Anki may rename on collision).
    pub async fn store(&self, params: StoreMediaParams) -> Result<String> {
        self.client.invoke("storeMediaFile", params).await
    }

    /// List media files matching a glob pattern (e.g. `01-001_*`).
    pub async fn list(&self, pattern: &str) -> Result<Vec<String>> {
        self.client
            .invoke("getMediaFilesNames", ListParams { pattern })
            .await
    }

    /// Delete a media file from Anki's media folder.
    pub async fn delete(&self, filename: &str) -> Result<()> {
        self.client
            .invoke_void("deleteMediaFile", DeleteParams { filename })
            .await
    }
}
