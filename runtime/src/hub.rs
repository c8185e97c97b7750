use std::{
    sync::Arc,
    time::Instant,
};

use actix::{
    prelude::*,
    Actor,
    AsyncContext,
    Context,
    Handler,
    MessageResult,
    System,
};
use actix_broker::{
    BrokerSubscribe,
    SystemBroker,
};
use hil::{
    ActuatorInputs,
    HilBridge,
    Scheduler,
    SchedulerConfig,
    VehicleModel,
};
use message::Dictionary;

use crate::{
    port::{
        Inbound,
        Monitor,
        OpenHook,
        PortActor,
        PortClosed,
        PortConfig,
        PortId,
    },
    signals::Term,
    Connection,
    Endpoint,
    Router,
};

const MAILBOX_CAPACITY: usize = 1024;

pub struct PortSetup {
    pub config: PortConfig,
    pub hook:   Option<Arc<dyn OpenHook>>,
}

impl From<PortConfig> for PortSetup {
    fn from(config: PortConfig) -> Self {
        Self {
            config,
            hook: None,
        }
    }
}

pub struct ConnectionSetup {
    pub name:       String,
    /// Indices into [`HubSetup::ports`].
    pub ports:      Vec<usize>,
    pub suppressed: Vec<u8>,
    pub bridge:     bool,
}

/// Everything the hub needs to run: ports, how they are wired, and the
/// simulation side.
pub struct HubSetup {
    pub dictionary:  Arc<Dictionary>,
    pub bridge:      HilBridge,
    pub vehicle:     Box<dyn VehicleModel>,
    pub scheduler:   SchedulerConfig,
    /// Outbound queue capacity per port.
    pub queue:       usize,
    pub monitor:     Option<Monitor>,
    pub ports:       Vec<PortSetup>,
    pub connections: Vec<ConnectionSetup>,
}

/// Single dispatch context: routes inbound messages, owns the bridge and the
/// vehicle, and drives the simulation tick.
pub struct Hub {
    router:    Router,
    bridge:    HilBridge,
    vehicle:   Box<dyn VehicleModel>,
    scheduler: Scheduler,
    actuators: ActuatorInputs,
}

impl Hub {
    /// Start the hub and one [`PortActor`] per configured port.
    pub fn start(setup: HubSetup) -> Addr<Hub> {
        Hub::create(move |ctx| {
            let HubSetup {
                dictionary,
                bridge,
                vehicle,
                scheduler,
                queue,
                monitor,
                ports,
                connections,
            } = setup;

            let monitor = monitor.map(Arc::new);
            let addr = ctx.address();

            let handles = ports
                .into_iter()
                .enumerate()
                .map(|(i, port)| {
                    let (mut actor, handle) = PortActor::new(
                        PortId(i),
                        port.config,
                        dictionary.clone(),
                        addr.clone().recipient(),
                        addr.clone().recipient(),
                        queue,
                    );

                    if let Some(hook) = port.hook {
                        actor = actor.with_hook(hook);
                    }

                    if let Some(ref monitor) = monitor {
                        actor = actor.with_monitor(monitor.clone());
                    }

                    actor.start();
                    handle
                })
                .collect::<Vec<_>>();

            let mut router = Router::default();

            for setup in connections {
                let mut connection = Connection::new(setup.name);

                if setup.bridge {
                    connection = connection.with_bridge();
                }

                for i in setup.ports {
                    match handles.get(i) {
                        Some(handle) => connection.add_port(Arc::new(handle.clone())),
                        None => tracing::warn!(connection = connection.name(), port = i, "no such port"),
                    }
                }

                for id in setup.suppressed {
                    connection.add_suppressed_message(id);
                }

                tracing::debug!(?connection, "connection configured");
                router.add_connection(connection);
            }

            Hub {
                router,
                bridge,
                vehicle,
                scheduler: Scheduler::new(scheduler),
                actuators: ActuatorInputs::default(),
            }
        })
    }

    fn tick(&mut self, ctx: &mut Context<Self>) {
        let tick = self.scheduler.advance(Instant::now());
        let state = self.vehicle.step(tick.dt, &self.actuators);

        match self.bridge.produce_outbound(&state, tick.sim_time) {
            Ok(messages) => {
                for message in &messages {
                    self.router.dispatch(Endpoint::Bridge, message);
                }
            },
            Err(e) => {
                tracing::error!(error = %e, sim_time = ?tick.sim_time, "cannot produce hil output, stopping");
                ctx.stop();
                System::current().stop_with_code(1);
            },
        }
    }
}

impl Actor for Hub {
    type Context = Context<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        ctx.set_mailbox_capacity(MAILBOX_CAPACITY);
        self.subscribe_async::<SystemBroker, Term>(ctx);

        tracing::info!(period = ?self.scheduler.period(), "starting simulation");
        ctx.run_interval(self.scheduler.period(), |a, ctx| a.tick(ctx));
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        tracing::info!(
            sim_time = ?self.scheduler.sim_time(),
            skipped = self.scheduler.skipped(),
            "simulation stopped"
        );
    }
}

impl Handler<Inbound> for Hub {
    type Result = ();

    fn handle(&mut self, msg: Inbound, _ctx: &mut Self::Context) -> Self::Result {
        let Inbound {
            port,
            message,
        } = msg;

        tracing::trace!(%port, msg_id = message.id, "inbound");

        if !self.router.dispatch(Endpoint::Port(port), &message) {
            return;
        }

        if let Some(update) = self.bridge.consume_inbound(&message) {
            self.actuators.apply(&update);
        }

        if let Some(request) = self.bridge.mode_request(&message) {
            self.router.dispatch(Endpoint::Bridge, &request);
        }
    }
}

impl Handler<PortClosed> for Hub {
    type Result = ();

    fn handle(&mut self, msg: PortClosed, ctx: &mut Self::Context) -> Self::Result {
        match msg.error {
            Some(e) => {
                tracing::error!(port = %msg.name, id = %msg.port, error = %e, "port failed, shutting down");
                ctx.stop();
                System::current().stop_with_code(1);
            },
            None => tracing::info!(port = %msg.name, id = %msg.port, "port closed"),
        }
    }
}

impl Handler<Term> for Hub {
    type Result = ();

    fn handle(&mut self, _msg: Term, ctx: &mut Self::Context) -> Self::Result {
        tracing::info!("shutting down");
        ctx.stop();
        System::current().stop();
    }
}

/// Current actuator inputs, as last updated by the autopilot.
#[derive(Debug, Clone, Copy, actix::Message)]
#[rtype(result = "ActuatorInputs")]
pub struct GetActuators;

impl Handler<GetActuators> for Hub {
    type Result = MessageResult<GetActuators>;

    fn handle(&mut self, _msg: GetActuators, _ctx: &mut Self::Context) -> Self::Result {
        MessageResult(self.actuators)
    }
}
