use std::{
    net::SocketAddr,
    num::ParseIntError,
    str::FromStr,
};

use net::PeerMode;
use tokio_serial::{
    DataBits,
    Parity,
    StopBits,
};

#[derive(Debug, Clone, PartialEq, structopt::StructOpt)]
#[structopt(about = "Bridges a MAVLink autopilot to a simulated vehicle for hardware-in-the-loop runs")]
pub struct Options {
    /// Serial device of the autopilot. Overrides `--udp`.
    #[structopt(long)]
    pub serial: Option<String>,

    #[structopt(long, default_value = "230400")]
    pub baud: u32,

    #[structopt(long, default_value = "8", parse(try_from_str = parse_data_bits))]
    pub data_bits: DataBits,

    #[structopt(long, default_value = "1", parse(try_from_str = parse_stop_bits))]
    pub stop_bits: StopBits,

    #[structopt(long, default_value = "none", parse(try_from_str = parse_parity))]
    pub parity: Parity,

    /// Start MAVLink on a PX4 USB console after opening the serial port.
    #[structopt(long)]
    pub px4_usb_handshake: bool,

    /// Autopilot UDP address.
    #[structopt(long, default_value = "127.0.0.1:14560")]
    pub udp: SocketAddr,

    /// Local port for the autopilot link; 0 picks one.
    #[structopt(long, default_value = "0")]
    pub udp_bind: u16,

    /// Ground control UDP address.
    #[structopt(long, default_value = "127.0.0.1:14550")]
    pub qgc: SocketAddr,

    #[structopt(long, default_value = "0")]
    pub qgc_bind: u16,

    /// Do not relay to ground control.
    #[structopt(long)]
    pub no_qgc: bool,

    /// permissive, learn or strict.
    #[structopt(long, default_value = "permissive")]
    pub peer_mode: PeerMode,

    /// Log inbound messages with these ids (comma separated); all when no list is given.
    #[structopt(short, long)]
    pub monitor: Option<Option<IdList>>,

    /// Reference latitude, degrees.
    #[structopt(long, default_value = "47.397742", allow_hyphen_values = true)]
    pub lat: f64,

    /// Reference longitude, degrees.
    #[structopt(long, default_value = "8.545594", allow_hyphen_values = true)]
    pub lon: f64,

    /// Reference altitude above mean sea level, m.
    #[structopt(long, default_value = "488", allow_hyphen_values = true)]
    pub alt: f64,

    #[structopt(long, default_value = "2")]
    pub tick_ms: u64,

    #[structopt(long, default_value = "1000")]
    pub gps_start_ms: u64,

    #[structopt(long, default_value = "200")]
    pub gps_latency_ms: u64,

    /// Outbound queue capacity per port.
    #[structopt(long, default_value = "64")]
    pub queue: usize,

    #[structopt(long, default_value = "1")]
    pub system_id: u8,

    #[structopt(long, default_value = "51")]
    pub component_id: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IdList(pub Vec<u8>);

impl FromStr for IdList {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(u8::from_str)
            .collect::<Result<Vec<_>, _>>()
            .map(IdList)
    }
}

fn parse_data_bits(s: &str) -> Result<DataBits, String> {
    match s {
        "5" => Ok(DataBits::Five),
        "6" => Ok(DataBits::Six),
        "7" => Ok(DataBits::Seven),
        "8" => Ok(DataBits::Eight),
        _ => Err(format!("unsupported data bits: {}", s)),
    }
}

fn parse_stop_bits(s: &str) -> Result<StopBits, String> {
    match s {
        "1" => Ok(StopBits::One),
        "2" => Ok(StopBits::Two),
        _ => Err(format!("unsupported stop bits: {}", s)),
    }
}

fn parse_parity(s: &str) -> Result<Parity, String> {
    match s.to_ascii_lowercase().as_str() {
        "none" | "n" => Ok(Parity::None),
        "odd" | "o" => Ok(Parity::Odd),
        "even" | "e" => Ok(Parity::Even),
        _ => Err(format!("unsupported parity: {}", s)),
    }
}
