use std::{
    io,
    net::SocketAddr,
    sync::Arc,
};

use futures::{
    stream,
    StreamExt,
};
use hilrelay_codec::{
    Frame,
    FrameStream,
};
use message::Dictionary;
use net::{
    DatagramOps,
    DatagramReceiver,
    DatagramSender,
    Peer,
};
use tokio::net::UdpSocket;

use super::{
    FrameSink,
    Link,
    PortError,
    UdpConfig,
};

#[tracing::instrument(skip_all, fields(bind = %config.bind, peer = %config.peer, mode = %config.mode))]
pub async fn open(config: &UdpConfig, dictionary: Arc<Dictionary>) -> Result<Link, PortError> {
    let socket = <UdpSocket as DatagramOps>::bind(&config.bind).await.map_err(|source| PortError::Open {
        name: config.bind.to_string(),
        source,
    })?;

    match DatagramOps::local_addr(&socket) {
        Ok(local) => tracing::info!(%local, "udp port bound"),
        Err(e) => tracing::warn!(error = %e, "udp port bound, local address unknown"),
    }

    let socket = Arc::new(socket);
    let peer = Arc::new(Peer::new(config.peer, config.mode));

    let reader = Reader {
        socket: socket.clone(),
        peer:   peer.clone(),
        frames: FrameStream::new(dictionary),
        buf:    vec![0; net::MAX_DATAGRAM],
    };

    let frames = stream::unfold(reader, |mut reader| async move {
        let batch = reader.next_datagram().await;
        Some((stream::iter(batch), reader))
    })
    .flatten()
    .boxed();

    Ok(Link {
        frames,
        sink: Box::new(UdpSink {
            socket,
            peer,
        }),
    })
}

/// Errors a datagram socket reports on behalf of an earlier exchange (an ICMP
/// unreachable surfacing as a reset, for instance). The socket stays usable.
fn is_transient(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionRefused
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::Interrupted
            | io::ErrorKind::WouldBlock
            | io::ErrorKind::TimedOut
    )
}

struct Reader<S> {
    socket: Arc<S>,
    peer:   Arc<Peer<SocketAddr>>,
    frames: FrameStream,
    buf:    Vec<u8>,
}

impl<S> Reader<S>
where
    S: DatagramReceiver<Address = SocketAddr> + Send + Sync,
{
    /// Frames from the next accepted datagram. Frames never span datagrams.
    async fn next_datagram(&mut self) -> Vec<Result<Frame, PortError>> {
        loop {
            let (n, source) = match self.socket.recv_from(&mut self.buf).await {
                Ok(x) => x,
                Err(e) if is_transient(&e) => {
                    tracing::warn!(error = %e, "transient receive error");
                    continue;
                },
                Err(e) => return vec![Err(PortError::Receive(e))],
            };

            if !self.peer.accept(&source) {
                tracing::debug!(%source, "dropping datagram from unexpected peer");
                continue;
            }

            let mut frames = self.frames.feed(&self.buf[..n]).map(Ok).collect::<Vec<_>>();
            frames.extend(self.frames.finish().map(Ok));

            return frames;
        }
    }
}

struct UdpSink<S> {
    socket: Arc<S>,
    peer:   Arc<Peer<SocketAddr>>,
}

#[async_trait::async_trait]
impl<S> FrameSink for UdpSink<S>
where
    S: DatagramSender<Address = SocketAddr> + Send + Sync,
{
    async fn write_frame(&mut self, frame: &[u8]) -> Result<(), PortError> {
        let target = self.peer.target();

        match self.socket.send_to(frame, &target).await {
            Ok(_) => Ok(()),
            Err(e) if is_transient(&e) => {
                tracing::warn!(error = %e, %target, "transient send error, frame dropped");
                Ok(())
            },
            Err(e) => Err(PortError::Send(e)),
        }
    }
}
