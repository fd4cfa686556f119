//! Image upload relay.
//!
//! Turns a `data:image/<type>;base64,<payload>` URI into a two-message
//! client stream to the image service (type first, then bytes) and returns
//! the URL the image service assigns.

use std::sync::Arc;

use base64::Engine;
use tracing::debug;

use crate::context::CallContext;
use crate::peers::{ImagePeer, PeerError, UploadMessage};

/// Marker preceding the image type in a data URI.
pub const DATA_URI_MARKER: &str = "data:image/";

/// Errors from relaying an image upload. Each upload phase has its own variant.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("Invalid image input: {0}")]
    InvalidInput(String),

    #[error("Invalid image payload: {0}")]
    InvalidPayload(String),

    #[error("Failed to open image upload: {0}")]
    Open(#[source] PeerError),

    #[error("Failed to send image data: {0}")]
    Send(#[source] PeerError),

    #[error("Failed to finish image upload: {0}")]
    Close(#[source] PeerError),
}

/// A decoded data URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageData {
    pub image_type: String,
    pub bytes: Vec<u8>,
}

/// Split and decode a base64 image data URI.
pub fn parse_data_uri(input: &str) -> Result<ImageData, UploadError> {
    let segments: Vec<&str> = input.split(DATA_URI_MARKER).collect();
    if segments.len() < 2 {
        return Err(UploadError::InvalidInput(format!(
            "missing '{DATA_URI_MARKER}' marker"
        )));
    }
    let body = segments[1];

    let image_type = match body.split_once(';') {
        Some((image_type, _)) if !image_type.is_empty() => image_type,
        _ => {
            return Err(UploadError::InvalidInput(
                "missing image type before ';'".to_string(),
            ))
        }
    };

    let (_, payload) = body
        .split_once(',')
        .ok_or_else(|| UploadError::InvalidPayload("missing ',' before payload".to_string()))?;

    let bytes = base64::engine::general_purpose::STANDARD
        .decode(payload.trim())
        .map_err(|e| UploadError::InvalidPayload(e.to_string()))?;

    Ok(ImageData {
        image_type: image_type.to_string(),
        bytes,
    })
}

/// Relays data URIs to the image service.
#[derive(Clone)]
pub struct ImageUploader {
    peer: Arc<dyn ImagePeer>,
}

impl ImageUploader {
    pub fn new(peer: Arc<dyn ImagePeer>) -> Self {
        Self { peer }
    }

    /// Upload the image in `data_uri` and return its URL.
    ///
    /// The URI is validated before the image service is contacted.
    pub async fn upload(&self, data_uri: &str, ctx: &CallContext) -> Result<String, UploadError> {
        let image = parse_data_uri(data_uri)?;
        let size = image.bytes.len();

        let mut stream = self
            .peer
            .open_upload(ctx)
            .await
            .map_err(UploadError::Open)?;

        stream
            .send(UploadMessage::Info {
                image_type: image.image_type.clone(),
            })
            .await
            .map_err(UploadError::Send)?;
        stream
            .send(UploadMessage::Chunk(image.bytes))
            .await
            .map_err(UploadError::Send)?;

        let url = stream.close_and_recv().await.map_err(UploadError::Close)?;

        debug!(image_type = %image.image_type, size, url = %url, "Image uploaded");
        Ok(url)
    }
}
