use std::{
    fmt,
    net::{
        Ipv4Addr,
        SocketAddr,
    },
    time::Duration,
};

use net::PeerMode;
use tokio_serial::{
    DataBits,
    Parity,
    StopBits,
};

#[derive(Debug, Clone, PartialEq)]
pub enum PortConfig {
    Serial(SerialConfig),
    Udp(UdpConfig),
}

impl PortConfig {
    /// Human-readable name used in logs.
    pub fn name(&self) -> String {
        match self {
            PortConfig::Serial(serial) => serial.path.clone(),
            PortConfig::Udp(udp) => format!("udp:{}", udp.peer),
        }
    }
}

impl fmt::Display for PortConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PortConfig::Serial(serial) => write!(
                f,
                "serial {} @ {} ({:?}, {:?}, {:?})",
                serial.path, serial.baud, serial.data_bits, serial.parity, serial.stop_bits
            ),
            PortConfig::Udp(udp) => write!(f, "udp {} -> {} ({})", udp.bind, udp.peer, udp.mode),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SerialConfig {
    pub path:          String,
    pub baud:          u32,
    pub data_bits:     DataBits,
    pub stop_bits:     StopBits,
    pub parity:        Parity,
    /// Upper bound on writing a single frame.
    pub write_timeout: Duration,
    /// Attempts at opening the device before giving up.
    pub open_attempts: usize,
}

impl SerialConfig {
    pub fn new(path: impl Into<String>, baud: u32) -> Self {
        Self {
            path: path.into(),
            baud,
            ..Default::default()
        }
    }
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            path:          "/dev/ttyACM0".to_owned(),
            baud:          230400,
            data_bits:     DataBits::Eight,
            stop_bits:     StopBits::One,
            parity:        Parity::None,
            write_timeout: Duration::from_millis(100),
            open_attempts: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UdpConfig {
    /// Local address; port 0 binds an ephemeral port.
    pub bind: SocketAddr,
    pub peer: SocketAddr,
    pub mode: PeerMode,
}

impl UdpConfig {
    pub fn new(peer: SocketAddr) -> Self {
        Self {
            peer,
            ..Default::default()
        }
    }
}

impl Default for UdpConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0)),
            peer: SocketAddr::from((Ipv4Addr::LOCALHOST, 14560)),
            mode: PeerMode::default(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn names() -> eyre::Result<()> {
        let udp = PortConfig::Udp(UdpConfig::new("127.0.0.1:14550".parse()?));
        assert_eq!(udp.name(), "udp:127.0.0.1:14550");
        assert_eq!(udp.to_string(), "udp 0.0.0.0:0 -> 127.0.0.1:14550 (permissive)");

        let serial = PortConfig::Serial(SerialConfig::new("/dev/ttyUSB0", 57600));
        assert_eq!(serial.name(), "/dev/ttyUSB0");

        Ok(())
    }
}
