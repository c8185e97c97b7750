use actix::{
    fut,
    fut::ActorFutureExt,
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

use super::Term;

/// Turns ctrl-c into [`Term`].
#[derive(Default)]
pub struct WindowsSignal;

impl Actor for WindowsSignal {
    type Context = Context<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        ctx.spawn(fut::wrap_future(tokio::signal::ctrl_c()).map(|result, a: &mut Self, _ctx| match result {
            Ok(()) => a.issue_async::<SystemBroker, _>(Term),
            Err(e) => tracing::error!(error = %e, "unable to listen for ctrl-c"),
        }));
    }
}

impl Supervised for WindowsSignal {}

impl SystemService for WindowsSignal {}
