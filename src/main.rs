use clap::{Parser, Subcommand};
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info, warn};
mod config;
mod engine;
mod error;
mod events;
mod mappings;
mod services;
mod utils;

use config::paths;
use config::{MarkConfig, Settings};
use engine::MarkPolicy;
use error::Result;
use services::{create_window_system, Switcher, SETUP_FAILURE_EXIT};

#[derive(Parser, Debug)]
#[command(name = "winleap", version)]
#[command(about = "Переключение окон X11 набором префикса класса или по числовой метке")]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Путь к файлу меток (по умолчанию ~/.config/winleap/winleap.conf)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Путь к settings.toml
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    /// Писать подробный лог в файл
    #[arg(long, global = true)]
    debug: bool,

    /// Уровень логирования (перекрывает settings.toml)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Режим сухого запуска (без X-сервера)
    #[arg(long, global = true)]
    dry_run: bool,

    /// Нажатия для dry-run, например "f2" или "qa<esc>"
    #[arg(long, global = true, requires = "dry_run")]
    script: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Набор префикса: окна получают короткие идентификаторы вида f1, f2, a
    Type,
    /// Переход к окну класса, назначенного метке
    Mark {
        #[arg(value_parser = clap::value_parser!(u32).range(1..))]
        mark: u32,

        /// Только окна текущего рабочего стола
        #[arg(long)]
        current_workspace: bool,

        /// Выбор экземпляра клавишей из instance_keys вместо цикла
        #[arg(long)]
        select: bool,
    },
    /// Печать нажатых клавиш до Escape
    Keys,
    /// Показать путь и содержимое debug-лога
    DebugLog,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    match run(args).await {
        Ok(code) => code,
        Err(e) => {
            error!("{}", e);
            eprintln!("winleap: {}", e);
            ExitCode::from(SETUP_FAILURE_EXIT)
        }
    }
}

async fn run(args: Args) -> Result<ExitCode> {
    if let Command::DebugLog = args.command {
        utils::debug_log::print_debug_log(&paths::debug_log_path(), &mut io::stdout())?;
        return Ok(ExitCode::SUCCESS);
    }

    let settings_path = paths::resolve_settings_file(args.settings.as_deref());
    let settings = Settings::load(&settings_path)?;

    let marks = match args.command {
        Command::Mark { .. } => {
            let mark_path = paths::resolve_mark_file(args.config.as_deref());
            Some((MarkConfig::load(&mark_path, settings.limits.max_marks)?, mark_path))
        }
        _ => None,
    };

    // Инициализация системы логирования
    let debug_enabled = args.debug || marks.as_ref().is_some_and(|(marks, _)| marks.debug);
    let debug_log = debug_enabled.then(paths::debug_log_path);
    let level = args.log_level.as_deref().unwrap_or(&settings.logging.level);
    utils::init_tracing(level, &settings.logging.format, debug_log.as_deref())?;

    info!("Запуск winleap v{}", env!("CARGO_PKG_VERSION"));
    info!("Настройки: {}", settings_path.display());
    if let Some((marks, path)) = &marks {
        info!("Файл меток: {} ({} меток)", path.display(), marks.marks().len());
    }
    if let Some(path) = &debug_log {
        info!("Debug-лог: {}", path.display());
    }
    if args.dry_run {
        warn!("Режим сухого запуска - X-сервер не используется");
    }

    let window_system = create_window_system(args.dry_run, args.script.as_deref())?;
    let switcher = Switcher::new(window_system.as_ref(), &settings);

    let outcome = match args.command {
        Command::Type => switcher.run_typing().await?,
        Command::Mark {
            mark,
            current_workspace,
            select,
        } => {
            let Some((marks, _)) = &marks else {
                return Err(leap_error!(internal, "файл меток не загружен"));
            };
            let policy = if select { MarkPolicy::Keyed } else { MarkPolicy::Cycle };
            switcher.run_mark(mark, policy, current_workspace, marks).await?
        }
        Command::Keys => {
            switcher.run_key_dump(&mut io::stdout()).await?;
            return Ok(ExitCode::SUCCESS);
        }
        Command::DebugLog => return Ok(ExitCode::SUCCESS),
    };

    info!("Результат: {:?}", outcome);
    Ok(ExitCode::from(outcome.exit_code()))
}
