//! Application-wide structured logging.
//!
//! Logs are emitted as Bunyan-formatted JSON so they can be shipped to any
//! log collector as is. Span fields are stored by [`JsonStorageLayer`] so
//! every event carries the fields of its enclosing spans (request id, model,
//! verdict, ...). Records emitted through the `log` facade by dependencies
//! are bridged with [`LogTracer`].

use tracing::Subscriber;
use tracing::subscriber::set_global_default;
use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
use tracing_log::LogTracer;
use tracing_subscriber::{EnvFilter, Registry, fmt::MakeWriter, layer::SubscriberExt};

/// Builds the subscriber without installing it.
///
/// # Parameters
/// - `name`: service name written into every record
/// - `env_filter`: fallback filter used when `RUST_LOG` is unset
/// - `sink`: writer the JSON records go to, e.g. `std::io::stdout`
///
/// # Example
/// ```rust,no_run
/// use fakecheck_server::{get_subscriber, init_subscriber};
///
/// let subscriber = get_subscriber("fakecheck".into(), "info".into(), std::io::stdout);
/// init_subscriber(subscriber).expect("failed to install tracing subscriber");
/// ```
pub fn get_subscriber<Sink>(
    name: String,
    env_filter: String,
    sink: Sink,
) -> impl Subscriber + Send + Sync
where
    Sink: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(env_filter));
    let formatting_layer = BunyanFormattingLayer::new(name, sink);

    Registry::default()
        .with(env_filter)
        .with(JsonStorageLayer)
        .with(formatting_layer)
}

/// Installs `subscriber` as the global default and bridges `log` records.
///
/// # Errors
///
/// Fails if a logger or global subscriber was already installed.
pub fn init_subscriber(subscriber: impl Subscriber + Send + Sync) -> anyhow::Result<()> {
    LogTracer::init()?;
    set_global_default(subscriber)?;
    Ok(())
}
