//! Client-streaming image upload over gRPC.

use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{mpsc, OnceCell};
use tokio::task::JoinHandle;
use tokio_stream::wrappers::ReceiverStream;
use tonic::transport::{Channel, Endpoint};
use tracing::debug;

use super::{ImagePeer, PeerError, Result, UploadMessage, UploadStream};
use crate::context::CallContext;
use crate::proto::{
    image_service_client::ImageServiceClient, upload_image_request, ImageInfo, UploadImageRequest,
};

/// Messages buffered between the relay and the outgoing stream.
const UPLOAD_BUFFER: usize = 4;

/// Image service over gRPC.
///
/// The channel is established on the first upload and reused afterwards,
/// so a failure to reach the image service surfaces as an open failure.
pub struct GrpcImagePeer {
    endpoint: Endpoint,
    channel: OnceCell<Channel>,
    timeout: Duration,
}

impl GrpcImagePeer {
    pub fn new(endpoint: Endpoint, timeout: Duration) -> Self {
        Self {
            endpoint,
            channel: OnceCell::new(),
            timeout,
        }
    }

    async fn channel(&self) -> Result<Channel> {
        let channel = self
            .channel
            .get_or_try_init(|| async {
                self.endpoint
                    .connect()
                    .await
                    .map_err(|e| PeerError::Connection {
                        peer: "image",
                        message: e.to_string(),
                    })
            })
            .await?;
        Ok(channel.clone())
    }
}

#[async_trait]
impl ImagePeer for GrpcImagePeer {
    async fn open_upload(&self, ctx: &CallContext) -> Result<Box<dyn UploadStream>> {
        let mut client = ImageServiceClient::new(self.channel().await?);
        let budget = ctx.budget(self.timeout);

        let (tx, rx) = mpsc::channel(UPLOAD_BUFFER);
        let request = ctx.peer_request(ReceiverStream::new(rx), self.timeout);

        let call = tokio::spawn(async move {
            client
                .upload_image(request)
                .await
                .map(|response| response.into_inner().image_url)
        });

        debug!("Image upload stream opened");
        Ok(Box::new(GrpcUploadStream {
            tx: Some(tx),
            call: Some(call),
            budget,
        }))
    }
}

/// An in-progress upload. The RPC runs on its own task fed by `tx`.
struct GrpcUploadStream {
    tx: Option<mpsc::Sender<UploadImageRequest>>,
    call: Option<JoinHandle<std::result::Result<String, tonic::Status>>>,
    budget: Duration,
}

impl From<UploadMessage> for UploadImageRequest {
    fn from(message: UploadMessage) -> Self {
        let data = match message {
            UploadMessage::Info { image_type } => {
                upload_image_request::Data::Info(ImageInfo { image_type })
            }
            UploadMessage::Chunk(bytes) => upload_image_request::Data::ChunkData(bytes),
        };
        UploadImageRequest { data: Some(data) }
    }
}

#[async_trait]
impl UploadStream for GrpcUploadStream {
    async fn send(&mut self, message: UploadMessage) -> Result<()> {
        let tx = self.tx.as_ref().ok_or(PeerError::StreamClosed)?;
        tx.send(message.into())
            .await
            .map_err(|_| PeerError::StreamClosed)
    }

    async fn close_and_recv(mut self: Box<Self>) -> Result<String> {
        drop(self.tx.take());
        let mut call = self.call.take().ok_or(PeerError::StreamClosed)?;

        match tokio::time::timeout(self.budget, &mut call).await {
            Ok(Ok(result)) => Ok(result?),
            Ok(Err(_)) => Err(PeerError::StreamClosed),
            Err(_) => {
                call.abort();
                Err(PeerError::Timeout("image".to_string()))
            }
        }
    }
}

impl Drop for GrpcUploadStream {
    fn drop(&mut self) {
        if let Some(call) = self.call.take() {
            call.abort();
        }
    }
}
