use actix::{
    fut,
    fut::ActorStreamExt,
    prelude::*,
    Actor,
    AsyncContext,
    Context,
    Supervised,
    SystemService,
};
use actix_broker::{
    BrokerIssue,
    SystemBroker,
};
use tokio::signal::unix::{
    signal,
    SignalKind,
};
use tokio_stream::{
    wrappers::SignalStream,
    StreamExt,
};

use super::Term;

/// Turns SIGINT and SIGTERM into [`Term`].
#[derive(Default)]
pub struct UnixSignal;

impl Actor for UnixSignal {
    type Context = Context<Self>;

    fn started(&mut self, ctx: &mut Context<Self>) {
        let streams = signal(SignalKind::interrupt()).and_then(|ints| Ok((ints, signal(SignalKind::terminate())?)));

        let (ints, terms) = match streams {
            Ok(s) => s,
            Err(e) => {
                tracing::error!(error = %e, "unable to listen for signals");
                return;
            },
        };

        let sigstream = SignalStream::new(ints).merge(SignalStream::new(terms));

        ctx.spawn(
            fut::wrap_stream(sigstream)
                .map(|_, a: &mut Self, _ctx| {
                    tracing::info!("received termination signal");
                    a.issue_async::<SystemBroker, _>(Term);
                })
                .finish(),
        );
    }
}

impl Supervised for UnixSignal {}

impl SystemService for UnixSignal {}
