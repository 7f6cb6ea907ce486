use clap::ValueEnum;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_tracing_level(self) -> tracing::Level {
        match self {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

/// Install the global subscriber once. `RUST_LOG` wins over `level` when set.
pub fn init_logging(level: LogLevel, format: LogFormat) {
    use std::io::IsTerminal;
    use std::sync::OnceLock;
    use tracing_subscriber::{fmt, EnvFilter};

    static INITIALISED: OnceLock<()> = OnceLock::new();

    let _ = INITIALISED.get_or_init(|| {
        let use_ansi = std::env::var_os("NO_COLOR").is_none() && std::io::stderr().is_terminal();
        let make_filter = || {
            EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                EnvFilter::default().add_directive(level.as_tracing_level().into())
            })
        };

        match format {
            LogFormat::Json => {
                let subscriber = fmt::fmt()
                    .with_env_filter(make_filter())
                    .with_ansi(use_ansi)
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_level(true)
                    .json()
                    .finish();
                let _ = tracing::subscriber::set_global_default(subscriber);
            }
            LogFormat::Text => {
                let subscriber = fmt::fmt()
                    .with_env_filter(make_filter())
                    .with_ansi(use_ansi)
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_level(true)
                    .compact()
                    .finish();
                let _ = tracing::subscriber::set_global_default(subscriber);
            }
        }
    });
}
