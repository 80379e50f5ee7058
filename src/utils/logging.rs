use crate::error::Result;
use crate::leap_error;
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::Path;
use std::sync::Mutex;
use tracing::warn;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry};

/// stderr по фильтру `RUST_LOG` / `level`, плюс debug-лог в файл, если путь передан.
///
/// Если файл открыть не удалось, логирование продолжается только в stderr.
pub fn init_tracing(level: &str, format: &str, debug_log: Option<&Path>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .map_err(|e| leap_error!(internal, "Неверный фильтр логирования '{}': {}", level, e))?;

    let stderr_layer: Box<dyn Layer<Registry> + Send + Sync> = match format {
        "full" => fmt::layer().with_writer(io::stderr).boxed(),
        _ => fmt::layer().compact().with_writer(io::stderr).boxed(),
    };

    let (file, open_error) = match debug_log.map(open_debug_log) {
        Some(Ok(file)) => (Some(file), None),
        Some(Err(e)) => (None, Some(e)),
        None => (None, None),
    };
    let file_layer = file.map(|file| {
        fmt::layer()
            .with_writer(Mutex::new(file))
            .with_target(false)
            .with_filter(LevelFilter::DEBUG)
    });

    tracing_subscriber::registry()
        .with(stderr_layer.with_filter(filter))
        .with(file_layer)
        .try_init()
        .map_err(|e| leap_error!(internal, "Не удалось инициализировать логирование: {}", e))?;

    if let (Some(path), Some(e)) = (debug_log, open_error) {
        warn!("Не удалось открыть debug-лог {}: {}", path.display(), e);
    }

    Ok(())
}

/// Открывает файл на дозапись, создавая недостающие каталоги.
pub fn open_debug_log(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}
