use tracing_subscriber::{
    fmt::format::FmtSpan,
    prelude::*,
    EnvFilter,
};

use util::bootstrap;

/// Targets of this workspace; everything else logs at the base level.
const TARGETS: [&str; 7] = [
    "hilrelay",
    "hilrelay_codec",
    "hilrelay_hil",
    "hilrelay_message",
    "hilrelay_net",
    "hilrelay_runtime",
    "hilrelay_util",
];

cfg_if::cfg_if! {
    if #[cfg(debug_assertions)] {
        const BASE_LEVEL: &str = "info";
        const OWN_LEVEL: &str = "debug";
    } else {
        const BASE_LEVEL: &str = "warn";
        const OWN_LEVEL: &str = "info";
    }
}

/// Human-readable output in debug builds, one JSON object per event in release.
pub fn init() {
    let filter = filter();
    bootstrap!("enabling tracing with filter directive: {}", filter);

    let layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_span_events(FmtSpan::CLOSE);

    #[cfg(debug_assertions)]
    let layer = layer.pretty().with_filter(filter);
    #[cfg(not(debug_assertions))]
    let layer = layer.json().with_current_span(false).with_filter(filter);

    tracing_subscriber::registry().with(layer).init();
}

/// `RUST_LOG` wins when it parses.
fn filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive()))
}

fn default_directive() -> String {
    TARGETS.iter().fold(BASE_LEVEL.to_owned(), |mut directive, target| {
        directive.push(',');
        directive.push_str(target);
        directive.push('=');
        directive.push_str(OWN_LEVEL);
        directive
    })
}
