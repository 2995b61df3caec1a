use crate::config::settings::LoggingSettings;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};
use std::env;
use std::fs;
use std::io;

/// Initialize logging: console layer plus an optional session log file
pub fn init_logging(settings: &LoggingSettings) -> anyhow::Result<()> {
    let enable_backtrace = env::var("RUST_BACKTRACE").unwrap_or_else(|_| "0".to_string()) == "1";

    // RUST_LOG wins over the configured level
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&settings.level)?
            .add_directive("phys_pipeline=debug".parse()?),
    };

    let file_layer = match &settings.file {
        Some(path) => {
            // Session-based log: start from an empty file
            if let Err(e) = fs::remove_file(path) {
                if e.kind() != io::ErrorKind::NotFound {
                    return Err(anyhow::anyhow!("Failed to remove existing {}: {}", path, e));
                }
            }
            let log_file = fs::File::create(path)?;
            Some(
                fmt::layer()
                    .with_writer(log_file)
                    .with_span_events(FmtSpan::CLOSE)
                    .with_target(true)
                    .with_thread_names(true)
                    .with_file(true)
                    .with_line_number(true)
                    .with_ansi(false)
                    .boxed(),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_thread_names(true)
                .with_ansi(true),
        )
        .with(file_layer)
        .try_init()?;

    std::panic::set_hook(Box::new(move |panic_info| {
        tracing::error!("Panic occurred: {}", panic_info);

        if let Some(location) = panic_info.location() {
            tracing::error!(
                "Panic location: {}:{}:{}",
                location.file(),
                location.line(),
                location.column()
            );
        }

        if enable_backtrace {
            tracing::error!("Backtrace:\n{:?}", std::backtrace::Backtrace::capture());
        }
    }));

    tracing::info!("Logging initialized with level: {}", settings.level);
    if let Some(path) = &settings.file {
        tracing::info!("File logging enabled: {} (session-based, cleaned on startup)", path);
    }
    Ok(())
}

/// Log system information for debugging
pub fn log_system_info() {
    tracing::info!("=== System Information ===");
    tracing::info!("OS: {}", std::env::consts::OS);
    tracing::info!("Architecture: {}", std::env::consts::ARCH);
    tracing::info!("Logical CPUs: {}", num_cpus::get());
    tracing::info!("Crate Version: {}", env!("CARGO_PKG_VERSION"));
    tracing::info!("==========================");
}
