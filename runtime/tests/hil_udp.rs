//! Autopilot and ground control on UDP, bridged through the hub.

use std::{
    collections::HashSet,
    net::SocketAddr,
    sync::Arc,
    time::Duration,
};

use hil::{
    ActuatorInputs,
    BridgeConfig,
    GlobalPositionProjector,
    HilBridge,
    SchedulerConfig,
    VehicleModel,
    VehicleState,
};
use hilrelay_codec::{
    Frame,
    FrameStream,
};
use message::{
    ids,
    Dictionary,
    Header,
    Message,
    Value,
};
use hilrelay_runtime::{
    port::{
        PortConfig,
        UdpConfig,
    },
    ConnectionSetup,
    GetActuators,
    Hub,
    HubSetup,
};
use tokio::{
    net::UdpSocket,
    time::{
        timeout,
        Instant,
    },
};

struct Hover;

impl VehicleModel for Hover {
    fn step(&mut self, _dt: Duration, _inputs: &ActuatorInputs) -> VehicleState {
        VehicleState::default()
    }
}

/// Read datagrams until `deadline`, returning every valid message and its source.
async fn collect(socket: &UdpSocket, dictionary: &Arc<Dictionary>, deadline: Instant) -> Vec<(Message, SocketAddr)> {
    let mut stream = FrameStream::new(dictionary.clone());
    let mut buf = [0u8; 2048];
    let mut out = vec![];

    while let Ok(Ok((n, from))) = tokio::time::timeout_at(deadline, socket.recv_from(&mut buf)).await {
        for frame in stream.feed(&buf[..n]) {
            if let Frame::Valid(msg) = frame {
                out.push((msg, from));
            }
        }
    }

    out
}

fn actuator_controls(dictionary: &Dictionary) -> eyre::Result<Message> {
    let mut controls = vec![Value::F32(0.); 16];
    controls[0] = Value::F32(0.5);
    controls[3] = Value::F32(0.25);

    Ok(dictionary.build("HIL_ACTUATOR_CONTROLS", Header::new(1, 1), &[
        ("time_usec", Value::U64(1_000)),
        ("flags", Value::U64(0)),
        ("controls", Value::Array(controls)),
        ("mode", Value::U8(0x80 | 0x20)),
    ])?)
}

fn heartbeat(dictionary: &Dictionary) -> eyre::Result<Message> {
    Ok(dictionary.build("HEARTBEAT", Header::new(1, 1), &[
        ("custom_mode", Value::U32(0)),
        ("type", Value::U8(2)),
        ("autopilot", Value::U8(12)),
        ("base_mode", Value::U8(0x80 | 0x20)),
        ("system_status", Value::U8(4)),
        ("mavlink_version", Value::U8(3)),
    ])?)
}

#[actix::test]
async fn hil_control_stays_off_ground_control() -> eyre::Result<()> {
    let dictionary = Dictionary::common();

    let autopilot = UdpSocket::bind("127.0.0.1:0").await?;
    let ground = UdpSocket::bind("127.0.0.1:0").await?;

    let bridge = HilBridge::new(
        dictionary.clone(),
        GlobalPositionProjector::at(47.397742, 8.545594),
        BridgeConfig::default(),
    )?;

    let port = |peer| {
        PortConfig::Udp(UdpConfig {
            bind: "127.0.0.1:0".parse().unwrap(),
            peer,
            mode: Default::default(),
        })
    };

    let hub = Hub::start(HubSetup {
        dictionary: dictionary.clone(),
        bridge,
        vehicle: Box::new(Hover),
        scheduler: SchedulerConfig {
            period: Duration::from_millis(5),
            ..Default::default()
        },
        queue: 64,
        monitor: None,
        ports: vec![port(autopilot.local_addr()?).into(), port(ground.local_addr()?).into()],
        connections: vec![
            ConnectionSetup {
                name:       "hil".into(),
                ports:      vec![0],
                suppressed: vec![],
                bridge:     true,
            },
            ConnectionSetup {
                name:       "common".into(),
                ports:      vec![0, 1],
                suppressed: vec![
                    ids::HIL_CONTROLS,
                    ids::HIL_ACTUATOR_CONTROLS,
                    ids::HIL_SENSOR,
                    ids::HIL_GPS,
                    ids::HIL_STATE_QUATERNION,
                ],
                bridge:     false,
            },
        ],
    });

    // sensor output tells the autopilot where the bridge's port lives
    let mut port_addr = None;
    let mut buf = [0u8; 2048];
    let mut stream = FrameStream::new(dictionary.clone());

    while port_addr.is_none() {
        let (n, from) = timeout(Duration::from_secs(5), autopilot.recv_from(&mut buf)).await??;

        if stream.feed(&buf[..n]).any(|f| matches!(f, Frame::Valid(m) if m.id == ids::HIL_SENSOR)) {
            port_addr = Some(from);
        }
    }

    let port_addr = port_addr.ok_or_else(|| eyre::eyre!("no sensor output"))?;

    for msg in [actuator_controls(&dictionary)?, heartbeat(&dictionary)?] {
        autopilot.send_to(&message::encode(&dictionary, &msg)?, port_addr).await?;
    }

    let deadline = Instant::now() + Duration::from_secs(5);
    let actuators = loop {
        let actuators = hub.send(GetActuators).await?;

        if actuators.armed || Instant::now() > deadline {
            break actuators;
        }

        tokio::time::sleep(Duration::from_millis(10)).await;
    };

    assert!(actuators.armed);
    assert!((actuators.controls[0] - 0.5).abs() < 1e-6);
    assert!((actuators.controls[3] - 0.25).abs() < 1e-6);

    let received = collect(&ground, &dictionary, Instant::now() + Duration::from_millis(300)).await;
    let got = received.iter().map(|(m, _)| m.id).collect::<HashSet<_>>();

    assert!(received
        .iter()
        .any(|(m, _)| m.id == ids::HEARTBEAT && m.header.component_id == 1));

    for id in [ids::HIL_ACTUATOR_CONTROLS, ids::HIL_SENSOR, ids::HIL_GPS] {
        assert!(!got.contains(&id), "ground control saw message {}", id);
    }

    Ok(())
}
