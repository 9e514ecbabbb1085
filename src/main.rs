//! tablepick binary entrypoint kept minimal. The full runtime lives in `app`.

mod app;
mod args;

use std::fmt;
use std::path::PathBuf;
use std::sync::OnceLock;

use clap::Parser;

struct TablepickTimer;

impl tracing_subscriber::fmt::time::FormatTime for TablepickTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> fmt::Result {
        let ts = chrono::Local::now().format("%Y-%m-%d-T%H:%M:%S").to_string();
        w.write_str(&ts)
    }
}

static LOG_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();

/// Default log directory: `$XDG_CONFIG_HOME/tablepick/logs` or `~/.config/tablepick/logs`.
fn logs_dir() -> Option<PathBuf> {
    let base = std::env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
    let dir = base.join("tablepick").join("logs");
    std::fs::create_dir_all(&dir).ok()?;
    Some(dir)
}

/// Initialize tracing into a log file, falling back to stderr.
fn init_logging(args: &args::Args) {
    let env_filter = || {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(args.log_filter()))
    };
    let log_path = args
        .log_file
        .clone()
        .or_else(|| logs_dir().map(|d| d.join("tablepick.log")));
    let file = log_path.as_ref().map(|p| {
        std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(p)
    });
    match file {
        Some(Ok(file)) => {
            let (non_blocking, guard) = tracing_appender::non_blocking(file);
            tracing_subscriber::fmt()
                .with_env_filter(env_filter())
                .with_target(false)
                .with_ansi(false)
                .with_writer(non_blocking)
                .with_timer(TablepickTimer)
                .init();
            let _ = LOG_GUARD.set(guard);
            if let Some(path) = &log_path {
                tracing::info!(path = %path.display(), "logging initialized");
            }
        }
        other => {
            // Fallback: stderr logger, only warnings so the TUI stays readable
            tracing_subscriber::fmt()
                .with_env_filter(tracing_subscriber::EnvFilter::new("warn"))
                .with_target(false)
                .with_ansi(true)
                .with_writer(std::io::stderr)
                .with_timer(TablepickTimer)
                .init();
            if let Some(Err(e)) = other {
                tracing::warn!(error = %e, "failed to open log file; using stderr");
            }
        }
    }
}

#[tokio::main]
async fn main() {
    let args = args::Args::parse();
    init_logging(&args);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "tablepick starting");

    let settings = match args::build_settings(&args) {
        Ok(s) => s,
        Err(err) => {
            tracing::error!(error = %err, "invalid configuration");
            eprintln!("tablepick: {err}");
            std::process::exit(2);
        }
    };
    match app::run(settings, args.query.clone()).await {
        Ok(rows) => match serde_json::to_string_pretty(&rows) {
            Ok(json) => println!("{json}"),
            Err(err) => tracing::error!(error = %err, "failed to encode selection"),
        },
        Err(err) => {
            tracing::error!(error = %err, "application error");
            eprintln!("tablepick: {err}");
            std::process::exit(1);
        }
    }
    tracing::info!("tablepick exited");
}

#[cfg(test)]
mod tests {
    /// What: FormatTime impl writes a non-empty timestamp without panicking
    ///
    /// - Input: Tracing writer buffer
    /// - Output: Buffer receives a `YYYY-MM-DD-THH:MM:SS` timestamp
    #[test]
    fn tablepick_timer_formats_time_without_panic() {
        use tracing_subscriber::fmt::time::FormatTime;
        let mut buf = String::new();
        let mut writer = tracing_subscriber::fmt::format::Writer::new(&mut buf);
        let t = super::TablepickTimer;
        let _ = t.format_time(&mut writer);
        assert_eq!(buf.len(), 20);
        assert!(buf.contains("-T"));
    }
}
