use ferrous_capture_application::ports::{StreamMessage, StreamSink};
use ferrous_capture_domain::DomainError;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Stream sink that writes length-prefixed frames to a byte stream from a
/// background task.
///
/// Frame layout: `u32` BE key length, key, `u32` BE payload length, payload.
/// The topic is not written. Write failures go to the error channel returned
/// by [`FramedStreamSink::spawn`] and are not retried.
pub struct FramedStreamSink {
    sender: Option<mpsc::UnboundedSender<StreamMessage>>,
    writer_task: Option<JoinHandle<()>>,
    runtime: Handle,
}

impl FramedStreamSink {
    pub fn spawn<W>(writer: W, runtime: Handle) -> (Self, mpsc::UnboundedReceiver<DomainError>)
    where
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        let (error_tx, error_rx) = mpsc::unbounded_channel();
        let writer_task = runtime.spawn(write_frames(writer, rx, error_tx));

        let sink = Self {
            sender: Some(tx),
            writer_task: Some(writer_task),
            runtime,
        };
        (sink, error_rx)
    }
}

impl StreamSink for FramedStreamSink {
    fn submit(&self, message: StreamMessage) -> Result<(), DomainError> {
        let sender = self
            .sender
            .as_ref()
            .ok_or_else(|| DomainError::SinkError("sink already closed".to_string()))?;
        sender
            .send(message)
            .map_err(|_| DomainError::SinkError("writer task stopped".to_string()))
    }

    /// Must not be called from within an async context.
    fn close(&mut self) -> Result<(), DomainError> {
        self.sender.take();
        if let Some(task) = self.writer_task.take() {
            self.runtime
                .block_on(task)
                .map_err(|e| DomainError::SinkError(format!("writer task failed: {}", e)))?;
        }
        Ok(())
    }
}

async fn write_frames<W>(
    mut writer: W,
    mut messages: mpsc::UnboundedReceiver<StreamMessage>,
    errors: mpsc::UnboundedSender<DomainError>,
) where
    W: AsyncWrite + Unpin,
{
    let mut delivered = 0u64;
    while let Some(message) = messages.recv().await {
        match write_frame(&mut writer, &message).await {
            Ok(()) => delivered += 1,
            Err(e) => {
                let _ = errors.send(DomainError::SinkError(format!(
                    "topic {}: {}",
                    message.topic, e
                )));
            }
        }
    }

    if let Err(e) = writer.flush().await {
        let _ = errors.send(DomainError::SinkError(format!("flush failed: {}", e)));
    }
    debug!(delivered, "Stream writer finished");
}

async fn write_frame<W>(writer: &mut W, message: &StreamMessage) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    writer.write_u32(frame_len(&message.key)?).await?;
    writer.write_all(&message.key).await?;
    writer.write_u32(frame_len(&message.payload)?).await?;
    writer.write_all(&message.payload).await?;
    Ok(())
}

fn frame_len(bytes: &[u8]) -> std::io::Result<u32> {
    u32::try_from(bytes.len())
        .map_err(|_| std::io::Error::new(std::io::ErrorKind::InvalidInput, "frame too large"))
}

/// Logs delivery failures reported by a sink until the sink is gone.
pub fn spawn_error_logger(mut errors: mpsc::UnboundedReceiver<DomainError>, runtime: &Handle) {
    runtime.spawn(async move {
        while let Some(error) = errors.recv().await {
            warn!(error = %error, "Failed to deliver stream message");
        }
    });
}
