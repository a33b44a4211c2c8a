use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use super::backend::Microphone;
use super::codec;
use crate::error::Result;
use crate::provider::OutboundFrame;

/// Microphone → codec → provider uplink
///
/// Owns the microphone. Every `start()` first completes a `stop()` of the
/// previous chain, so two chains never hold the device at once.
pub struct CapturePipeline {
    microphone: Box<dyn Microphone>,
    forwarder: Option<JoinHandle<()>>,
    blocks_sent: Arc<AtomicUsize>,
}

impl CapturePipeline {
    pub fn new(microphone: Box<dyn Microphone>) -> Self {
        Self {
            microphone,
            forwarder: None,
            blocks_sent: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Acquire the microphone and stream encoded blocks to `outbound`
    pub async fn start(&mut self, outbound: mpsc::Sender<OutboundFrame>) -> Result<()> {
        self.stop().await?;

        info!("Starting capture on {}", self.microphone.name());

        let mut frames = self.microphone.start().await?;
        let blocks_sent = Arc::clone(&self.blocks_sent);

        let forwarder = tokio::spawn(async move {
            while let Some(frame) = frames.recv().await {
                let payload = codec::encode_to_transport(&frame.samples);

                if outbound.send(OutboundFrame::media(payload)).await.is_err() {
                    warn!("Provider uplink closed, dropping captured audio");
                    break;
                }

                blocks_sent.fetch_add(1, Ordering::SeqCst);
            }
        });

        self.forwarder = Some(forwarder);

        info!("Capture started");

        Ok(())
    }

    /// Disconnect the forwarder, then stop and release the microphone
    ///
    /// Idempotent. Returns only after the device is released.
    pub async fn stop(&mut self) -> Result<()> {
        if let Some(forwarder) = self.forwarder.take() {
            forwarder.abort();
            if let Err(e) = forwarder.await {
                if e.is_panic() {
                    error!("Capture forwarder panicked: {}", e);
                }
            }
        }

        if self.microphone.is_capturing() {
            info!("Stopping capture on {}", self.microphone.name());
        }
        self.microphone.stop().await
    }

    pub fn is_capturing(&self) -> bool {
        self.forwarder.is_some() && self.microphone.is_capturing()
    }

    /// Number of blocks forwarded to the provider since creation
    pub fn blocks_sent(&self) -> usize {
        self.blocks_sent.load(Ordering::SeqCst)
    }
}
