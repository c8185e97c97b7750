use std::{
    io,
    sync::Arc,
    time::Duration,
};

use futures::StreamExt;
use hilrelay_codec::{
    tokio_codec::FramedRead,
    FrameStream,
};
use message::Dictionary;
use tokio::io::{
    AsyncWriteExt,
    WriteHalf,
};
use tokio_serial::SerialStream;

use super::{
    FrameSink,
    Link,
    PortError,
    SerialConfig,
};

const OPEN_BASE_DELAY: Duration = Duration::from_millis(100);
const OPEN_MAX_DELAY: Duration = Duration::from_secs(2);

#[tracing::instrument(skip_all, fields(path = %config.path, baud = config.baud))]
pub async fn open(config: &SerialConfig, dictionary: Arc<Dictionary>) -> Result<Link, PortError> {
    // proportion of each delay to jitter: delays are scaled by a sample from
    // [1 - JITTER_FACTOR, 1 + JITTER_FACTOR]
    const JITTER_FACTOR: f64 = 0.5;

    let strategy = tokio_retry::strategy::ExponentialBackoff::from_millis(OPEN_BASE_DELAY.as_millis() as u64)
        .max_delay(OPEN_MAX_DELAY)
        .map(|dur| {
            let jitter = (rand::random::<f64>() - 0.5) * JITTER_FACTOR * 2. + 1.;

            dur.mul_f64(jitter)
        })
        .take(config.open_attempts.saturating_sub(1));

    let builder = tokio_serial::new(&config.path, config.baud)
        .data_bits(config.data_bits)
        .stop_bits(config.stop_bits)
        .parity(config.parity);

    let stream = tokio_retry::Retry::spawn(strategy, || {
        let result = SerialStream::open(&builder).map_err(io::Error::from);

        async move {
            if let Err(ref e) = result {
                tracing::warn!(error = %e, "opening serial port failed");
            }

            result
        }
    })
    .await
    .map_err(|source| PortError::Open {
        name: config.path.clone(),
        source,
    })?;

    tracing::info!("serial port open");

    let (r, w) = tokio::io::split(stream);

    Ok(Link {
        frames: FramedRead::new(r, FrameStream::new(dictionary))
            .map(|frame| frame.map_err(PortError::from))
            .boxed(),
        sink:   Box::new(SerialSink {
            writer:  w,
            timeout: config.write_timeout,
        }),
    })
}

struct SerialSink {
    writer:  WriteHalf<SerialStream>,
    timeout: Duration,
}

#[async_trait::async_trait]
impl FrameSink for SerialSink {
    async fn write_frame(&mut self, frame: &[u8]) -> Result<(), PortError> {
        let writer = &mut self.writer;

        let write = async move {
            writer.write_all(frame).await?;
            writer.flush().await
        };

        match tokio::time::timeout(self.timeout, write).await {
            Ok(result) => result.map_err(PortError::Send),
            Err(_) => Err(PortError::Timeout(self.timeout)),
        }
    }
}
