use std::{
    net::{
        Ipv4Addr,
        SocketAddr,
    },
    sync::Arc,
    time::Duration,
};

use actix::SystemService as _;
use eyre::Result;
use structopt::StructOpt as _;
use tap::Pipe;

use hil::{
    BridgeConfig,
    ChannelConfig,
    GlobalPositionProjector,
    HilBridge,
    SchedulerConfig,
};
use message::{
    ids,
    Dictionary,
};
use runtime::{
    port::{
        Monitor,
        OpenHook,
        PortConfig,
        SendRaw,
        SerialConfig,
        UdpConfig,
    },
    ConnectionSetup,
    Hub,
    HubSetup,
    PortSetup,
    Signal,
};
use util::build;

pub use crate::options::Options;

mod options;
mod trace;
mod vehicle;

/// HIL traffic kept off the ground control link.
const HIL_ONLY: [u8; 6] = [
    ids::HIL_CONTROLS,
    ids::HIL_RC_INPUTS_RAW,
    ids::HIL_ACTUATOR_CONTROLS,
    ids::HIL_SENSOR,
    ids::HIL_GPS,
    ids::HIL_STATE_QUATERNION,
];

fn main() -> Result<()> {
    util::bootstrap!(
        "starting {} {} ({}, built at {} with rustc {})",
        build::PACKAGE,
        build::VERSION,
        build::COMMIT_HASH,
        build::BUILD_TIMESTAMP,
        build::RUSTC_COMMIT_HASH,
    );

    let options: Options = Options::from_args();

    trace::init();

    tracing::info!(
        application = build::PACKAGE,
        version = build::VERSION,
        build_commit = build::COMMIT_HASH,
        built_at = build::BUILD_TIMESTAMP,
        using_rustc = build::RUSTC_COMMIT_HASH,
        "tracing subsystem initialized"
    );

    let system = actix::System::new();

    util::trace_catch!(system.block_on(async move { start(&options) }), "startup failed")?;

    let code = system.run_with_code()?;
    tracing::info!(code, "exiting");

    std::process::exit(code);
}

fn start(options: &Options) -> Result<()> {
    eyre::ensure!(options.tick_ms > 0, "tick period must be positive");

    let dictionary = Dictionary::common();

    let bridge = HilBridge::new(
        dictionary.clone(),
        GlobalPositionProjector::at(options.lat, options.lon),
        bridge_config(options),
    )?;

    Signal::from_registry();

    let (ports, connections) = topology(options);

    Hub::start(HubSetup {
        dictionary,
        bridge,
        vehicle: Box::new(vehicle::PointMass::new(options.alt)),
        scheduler: SchedulerConfig {
            period: Duration::from_millis(options.tick_ms),
            ..Default::default()
        },
        queue: options.queue,
        monitor: options.monitor.clone().map(|ids| ids.unwrap_or_default().0.pipe(Monitor::tracing)),
        ports,
        connections,
    });

    Ok(())
}

fn bridge_config(options: &Options) -> BridgeConfig {
    let mut config = BridgeConfig {
        system_id: options.system_id,
        component_id: options.component_id,
        reference_alt: options.alt,
        ..Default::default()
    };

    config.channels.gps = ChannelConfig {
        start_delay: Duration::from_millis(options.gps_start_ms),
        latency: Duration::from_millis(options.gps_latency_ms),
        ..config.channels.gps
    };

    config
}

/// The autopilot shares a connection with the bridge and, unless disabled,
/// another with ground control that carries everything but HIL traffic.
fn topology(options: &Options) -> (Vec<PortSetup>, Vec<ConnectionSetup>) {
    let autopilot = match options.serial {
        Some(ref path) => PortSetup {
            config: PortConfig::Serial(SerialConfig {
                path: path.clone(),
                baud: options.baud,
                data_bits: options.data_bits,
                stop_bits: options.stop_bits,
                parity: options.parity,
                ..Default::default()
            }),
            hook:   options
                .px4_usb_handshake
                .then(|| Arc::new(SendRaw::px4_usb()) as Arc<dyn OpenHook>),
        },
        None => {
            if options.px4_usb_handshake {
                tracing::warn!("usb handshake only applies to serial ports, ignoring");
            }

            PortConfig::Udp(UdpConfig {
                bind: SocketAddr::from((Ipv4Addr::UNSPECIFIED, options.udp_bind)),
                peer: options.udp,
                mode: options.peer_mode,
            })
            .into()
        },
    };

    let mut ports = vec![autopilot];
    let mut connections = vec![ConnectionSetup {
        name:       "hil".to_owned(),
        ports:      vec![0],
        suppressed: vec![],
        bridge:     true,
    }];

    if !options.no_qgc {
        ports.push(
            PortConfig::Udp(UdpConfig {
                bind: SocketAddr::from((Ipv4Addr::UNSPECIFIED, options.qgc_bind)),
                peer: options.qgc,
                mode: options.peer_mode,
            })
            .into(),
        );

        connections.push(ConnectionSetup {
            name:       "common".to_owned(),
            ports:      vec![0, 1],
            suppressed: HIL_ONLY.to_vec(),
            bridge:     false,
        });
    }

    (ports, connections)
}
