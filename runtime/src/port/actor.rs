use std::sync::Arc;

use actix::{
    fut,
    fut::{
        ActorFutureExt,
        ActorStreamExt,
    },
    prelude::*,
    Actor,
    AsyncContext,
    Context,
    Handler,
    Recipient,
};
use actix_broker::{
    BrokerSubscribe,
    SystemBroker,
};
use bytes::BytesMut;
use hilrelay_codec::{
    tokio_codec::Encoder,
    Frame,
    FrameEncoder,
    Malformed,
};
use message::{
    frame::MAX_FRAME_LEN,
    Dictionary,
    Message,
};
use tokio::sync::mpsc;

use super::{
    Close,
    Inbound,
    Link,
    Monitor,
    OpenHook,
    PortClosed,
    PortConfig,
    PortError,
    PortHandle,
    PortId,
    PortStats,
};
use crate::signals::Term;

/// Owns one transport. Opens it on start, then runs a reader that forwards
/// decoded messages to the hub and a writer that drains the outbound queue.
/// Any transport error stops the actor; it is reported in [`PortClosed`].
pub struct PortActor {
    id:         PortId,
    name:       Arc<str>,
    config:     PortConfig,
    dictionary: Arc<Dictionary>,
    hook:       Option<Arc<dyn OpenHook>>,
    monitor:    Option<Arc<Monitor>>,
    inbound:    Recipient<Inbound>,
    closed:     Recipient<PortClosed>,
    outbound:   Option<mpsc::Receiver<Message>>,
    stats:      Arc<PortStats>,
    failure:    Option<PortError>,
}

impl PortActor {
    pub fn new(
        id: PortId,
        config: PortConfig,
        dictionary: Arc<Dictionary>,
        inbound: Recipient<Inbound>,
        closed: Recipient<PortClosed>,
        queue: usize,
    ) -> (Self, PortHandle) {
        let name: Arc<str> = config.name().into();
        let stats = Arc::new(PortStats::default());
        let (handle, rx) = PortHandle::new(id, name.clone(), queue, stats.clone());

        let actor = Self {
            id,
            name,
            config,
            dictionary,
            hook: None,
            monitor: None,
            inbound,
            closed,
            outbound: Some(rx),
            stats,
            failure: None,
        };

        (actor, handle)
    }

    pub fn with_hook(mut self, hook: Arc<dyn OpenHook>) -> Self {
        self.hook = Some(hook);
        self
    }

    pub fn with_monitor(mut self, monitor: Arc<Monitor>) -> Self {
        self.monitor = Some(monitor);
        self
    }

    fn attach(&mut self, link: Link, ctx: &mut Context<Self>) {
        let Link {
            frames,
            mut sink,
        } = link;

        let mut rx = match self.outbound.take() {
            Some(rx) => rx,
            None => {
                self.fail(PortError::Closed, ctx);
                return;
            },
        };

        tracing::info!(port = %self.name, id = %self.id, "port open");

        let dictionary = self.dictionary.clone();
        let stats = self.stats.clone();

        let writer = async move {
            let mut encoder = FrameEncoder::new(dictionary);
            let mut buf = BytesMut::with_capacity(MAX_FRAME_LEN);

            while let Some(message) = rx.recv().await {
                buf.clear();

                let id = message.id;
                if let Err(error) = encoder.encode(message, &mut buf) {
                    tracing::warn!(%error, msg_id = id, "dropping unencodable message");
                    continue;
                }

                sink.write_frame(&buf).await?;
                PortStats::bump(&stats.sent);
            }

            Ok::<_, PortError>(())
        };

        ctx.spawn(fut::wrap_future(writer).map(|result, a: &mut Self, ctx: &mut Context<Self>| {
            match result {
                Ok(()) => {
                    tracing::debug!(port = %a.name, "outbound queue closed");
                    ctx.stop();
                },
                Err(e) => a.fail(e, ctx),
            }
        }));

        ctx.spawn(
            fut::wrap_stream(frames)
                .map(|frame, a: &mut Self, ctx| a.on_frame(frame, ctx))
                .finish()
                .map(|_, a: &mut Self, ctx: &mut Context<Self>| {
                    tracing::info!(port = %a.name, "port input ended");
                    ctx.stop();
                }),
        );
    }

    fn on_frame(&mut self, frame: Result<Frame, PortError>, ctx: &mut Context<Self>) {
        match frame {
            Ok(Frame::Valid(message)) => {
                PortStats::bump(&self.stats.frames);

                if let Some(monitor) = &self.monitor {
                    monitor.observe(&self.name, &message);
                }

                if let Err(e) = self.inbound.try_send(Inbound {
                    port: self.id,
                    message,
                }) {
                    tracing::warn!(port = %self.name, error = %e, "hub mailbox full, dropping inbound message");
                }
            },
            Ok(Frame::Malformed(Malformed {
                error,
                raw,
            })) => {
                PortStats::bump(&self.stats.malformed);
                tracing::warn!(port = %self.name, %error, raw = %hex::encode(&raw), "malformed frame");
            },
            Err(e) => self.fail(e, ctx),
        }
    }

    fn fail(&mut self, error: PortError, ctx: &mut Context<Self>) {
        tracing::error!(port = %self.name, error = %error, "transport failure, closing port");

        if self.failure.is_none() {
            self.failure = Some(error);
        }

        ctx.stop();
    }
}

impl Actor for PortActor {
    type Context = Context<Self>;

    #[tracing::instrument(skip_all, fields(port = %self.name))]
    fn started(&mut self, ctx: &mut Self::Context) {
        self.subscribe_async::<SystemBroker, Term>(ctx);

        let config = self.config.clone();
        let dictionary = self.dictionary.clone();
        let hook = self.hook.clone();

        tracing::debug!(%config, "opening port");

        let open = async move {
            let mut link = Link::open(&config, dictionary).await?;

            if let Some(hook) = hook {
                hook.on_open(link.sink.as_mut()).await?;
            }

            Ok::<_, PortError>(link)
        };

        ctx.wait(fut::wrap_future(open).map(|result, a: &mut Self, ctx: &mut Context<Self>| {
            match result {
                Ok(link) => a.attach(link, ctx),
                Err(e) => a.fail(e, ctx),
            }
        }));
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        tracing::info!(port = %self.name, stats = %self.stats, "port closed");

        self.closed.do_send(PortClosed {
            port:  self.id,
            name:  self.name.clone(),
            error: self.failure.take(),
        });
    }
}

impl Handler<Close> for PortActor {
    type Result = ();

    fn handle(&mut self, _msg: Close, ctx: &mut Self::Context) -> Self::Result {
        ctx.stop();
    }
}

impl Handler<Term> for PortActor {
    type Result = ();

    fn handle(&mut self, _msg: Term, ctx: &mut Self::Context) -> Self::Result {
        ctx.stop();
    }
}
