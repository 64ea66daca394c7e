//!
//! Setup logging subsystem.
//!

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use super::config::{Log, LogFormat};

/// Keeps the non-blocking console writer flushing until dropped.
#[derive(Debug)]
pub struct LogGuard {
    _log_guards: Vec<WorkerGuard>,
}

/// Install a global subscriber for the connector crates.
///
/// `RUST_LOG` overrides the configured level. Fails if a global subscriber
/// was already installed by the host application.
pub fn setup(conf: &Log) -> Result<LogGuard, tracing_subscriber::util::TryInitError> {
    let mut guards = Vec::new();
    let directive = conf
        .console
        .filtering_directive
        .clone()
        .unwrap_or_else(|| conf.console.level.into_level().to_string().to_lowercase());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::builder()
            .with_default_directive(conf.console.level.into_level().into())
            .parse_lossy(directive)
    });

    let subscriber = tracing_subscriber::registry().with(filter);

    if !conf.console.enabled {
        subscriber.try_init()?;
        return Ok(LogGuard {
            _log_guards: guards,
        });
    }

    let (console_writer, guard) = tracing_appender::non_blocking(std::io::stdout());
    guards.push(guard);

    match conf.console.log_format {
        LogFormat::Default => {
            let logging_layer = fmt::layer()
                .with_span_events(fmt::format::FmtSpan::CLOSE)
                .pretty()
                .with_writer(console_writer);
            subscriber.with(logging_layer).try_init()?;
        }
        LogFormat::Json => {
            let logging_layer = fmt::layer()
                .json()
                .with_current_span(true)
                .with_span_list(false)
                .with_writer(console_writer);
            subscriber.with(logging_layer).try_init()?;
        }
    }

    Ok(LogGuard {
        _log_guards: guards,
    })
}
