use std::{
    fmt::Debug,
    io,
    net::SocketAddr,
};

use tokio::net::UdpSocket;

#[async_trait::async_trait]
pub trait DatagramOps: Sized {
    type Address: Clone + Debug + PartialEq + Send + Sync;

    async fn bind(address: &Self::Address) -> io::Result<Self>;
    fn local_addr(&self) -> io::Result<Self::Address>;
    fn display_addr(addr: &Self::Address) -> String;
}

#[async_trait::async_trait]
pub trait DatagramReceiver: DatagramOps {
    async fn recv_from(&self, packet: &mut [u8]) -> io::Result<(usize, Self::Address)>;
}

#[async_trait::async_trait]
pub trait DatagramSender: DatagramOps {
    async fn send_to(&self, packet: &[u8], address: &Self::Address) -> io::Result<usize>;
}

#[async_trait::async_trait]
impl DatagramOps for UdpSocket {
    type Address = SocketAddr;

    #[tracing::instrument(err, fields(address = Self::display_addr(address).as_str()))]
    #[inline]
    async fn bind(address: &Self::Address) -> io::Result<Self> {
        UdpSocket::bind(address).await
    }

    #[inline]
    fn local_addr(&self) -> io::Result<SocketAddr> {
        UdpSocket::local_addr(self)
    }

    #[inline]
    fn display_addr(addr: &SocketAddr) -> String {
        addr.to_string()
    }
}

#[async_trait::async_trait]
impl DatagramSender for UdpSocket {
    #[tracing::instrument(level = "trace", err, fields(packet.len = packet.len()), skip(packet, self))]
    #[inline]
    async fn send_to(&self, packet: &[u8], address: &SocketAddr) -> io::Result<usize> {
        UdpSocket::send_to(self, packet, address).await
    }
}

#[async_trait::async_trait]
impl DatagramReceiver for UdpSocket {
    #[tracing::instrument(level = "trace", err, fields(buf.len = packet.len()), skip(self, packet))]
    #[inline]
    async fn recv_from(&self, packet: &mut [u8]) -> io::Result<(usize, SocketAddr)> {
        UdpSocket::recv_from(self, packet).await
    }
}
