use anyhow::Result;
use clap::Parser;
use std::io::IsTerminal;
use std::time::Duration;
use tokio::signal;
use tracing::{debug, info, warn};
mod config;
mod error;
mod events;
mod mappings;
mod services;
mod utils;

use config::{Config, LoggingConfig};
use events::format_listing;
use services::{
    connect_window_directory, Action, GsettingsProvider, KeybindingProvider, Keybindings,
    LaunchedCommand, MatchCriteria, MatchOptions, VirtualKeyboard, WindowManipulator,
};

#[derive(Parser, Debug)]
#[command(name = "minimzd")]
#[command(version)]
#[command(about = "Запуск программ свёрнутыми или закрытыми, даже если они этому сопротивляются")]
struct Args {
    /// Команда для запуска (разделяется по пробелам)
    command: Option<String>,

    /// Вывести список окон
    #[arg(short, long)]
    list: bool,

    /// Остановиться после первого обработанного окна
    #[arg(short = 'F', long)]
    first: bool,

    /// Не ждать завершения запущенной команды
    #[arg(short = 'B', long)]
    background: bool,

    /// Считать окно обработанным, только если после действия оно пропало
    /// или потеряло фокус
    #[arg(long)]
    verify: bool,

    /// Закрыть окно вместо сворачивания
    #[arg(short = 'x', long)]
    close_window: bool,

    /// Использовать сочетание клавиш оконного менеджера через виртуальную клавиатуру
    #[arg(short, long)]
    keybind: bool,

    /// Читать сочетания клавиш из настроек GNOME
    #[arg(short, long)]
    extract_keybind: bool,

    /// Искать окна по pid запущенной команды
    #[arg(long)]
    match_pid: bool,

    /// Искать окна по имени процесса
    #[arg(long)]
    match_process_name: bool,

    /// pid для поиска (важнее --match-pid)
    #[arg(long)]
    pid: Option<i32>,

    /// Имя процесса (по умолчанию имя команды)
    #[arg(long)]
    process_name: Option<String>,

    /// Экземпляр класса окна, важнее класса (по умолчанию имя команды)
    #[arg(long)]
    window_class_instance: Option<String>,

    /// Класс окна, низший приоритет (по умолчанию имя команды)
    #[arg(long)]
    window_class: Option<String>,

    /// Сколько искать окна, мс (0 - один проход)
    #[arg(short, long)]
    timeout_ms: Option<u64>,

    /// Путь к файлу конфигурации
    #[arg(short, long, default_value = "minimzd.toml")]
    config: String,

    /// Режим сухого запуска (без реальных действий)
    #[arg(long)]
    dry_run: bool,

    /// Уровень логирования
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = Config::load(&args.config)?;
    if let Some(level) = &args.log_level {
        config.logging.level = level.clone();
    }

    init_tracing(&config.logging)?;

    info!("Запуск minimzd v{}", env!("CARGO_PKG_VERSION"));
    info!("Конфигурация загружена из: {}", args.config);

    if args.dry_run {
        warn!("Режим сухого запуска - реальные действия отключены");
    }

    let directory = connect_window_directory(&config, args.dry_run).await?;
    let mut manipulator = WindowManipulator::new(directory);

    let outcome = drive(&mut manipulator, &args, &config).await;

    // Устройство и соединение освобождаются и при ошибке, и после Ctrl+C
    if let Err(e) = manipulator.close().await {
        warn!("Не удалось корректно закрыть соединение: {}", e);
    }

    let Some(launched) = outcome? else {
        return Ok(());
    };

    if args.background {
        info!("Команда продолжает работать в фоне");
        return Ok(());
    }

    let code = launched.wait().await?;
    info!("minimzd завершил работу");
    std::process::exit(code);
}

/// Список, клавиатура, запуск команды и поиск окон. Возвращает запущенную команду.
async fn drive(
    manipulator: &mut WindowManipulator,
    args: &Args,
    config: &Config,
) -> Result<Option<LaunchedCommand>> {
    if args.list {
        let windows = manipulator.list().await?;
        print!("{}", format_listing(&windows, std::io::stdout().is_terminal()));
    }

    if args.keybind {
        match setup_keyboard(args, config) {
            Ok((keyboard, keybindings)) => manipulator.attach_keyboard(keyboard, keybindings),
            Err(e) if e.is_recoverable() => {
                warn!("{}. Продолжаем прямыми вызовами D-Bus", e);
            }
            Err(e) => return Err(e.into()),
        }
    } else if args.extract_keybind {
        warn!("--extract-keybind действует только вместе с --keybind");
    }

    let launched = match args.command.as_deref() {
        Some(command) => LaunchedCommand::spawn(command, args.background)?,
        None => None,
    };

    let launched_pid = if args.match_pid {
        launched.as_ref().and_then(LaunchedCommand::pid)
    } else {
        None
    };

    let criteria = MatchCriteria {
        pid: args.pid.or(launched_pid),
        match_process_name: args.match_process_name,
        process_name: args.process_name.clone(),
        class_instance: args.window_class_instance.clone(),
        class: args.window_class.clone(),
    }
    .with_command_fallback(args.command.as_deref());

    let Some(filter) = criteria.into_filter() else {
        info!("Критерий поиска окон не задан, окна не обрабатываются");
        return Ok(launched);
    };

    let options = MatchOptions {
        action: if args.close_window {
            Action::Close
        } else {
            Action::Minimize
        },
        first: args.first,
        verify: args.verify,
    };
    let timeout = args
        .timeout_ms
        .map(Duration::from_millis)
        .unwrap_or_else(|| config.matching.timeout());

    info!(
        "Поиск окон {:?} для действия '{}' в течение {:?} (сочетания клавиш: {}, проверка: {})",
        filter,
        options.action,
        timeout,
        manipulator.uses_keyboard(),
        options.verify
    );

    tokio::select! {
        result = manipulator.run_until(&filter, &options, timeout, config.matching.poll_interval()) => {
            result?;
        }
        _ = signal::ctrl_c() => {
            warn!("Получен сигнал завершения (Ctrl+C), поиск окон прерван");
        }
    }

    Ok(launched)
}

/// Сочетания клавиш и активированная виртуальная клавиатура, объявившая их все
fn setup_keyboard(
    args: &Args,
    config: &Config,
) -> error::Result<(VirtualKeyboard, Keybindings)> {
    let gsettings = args
        .extract_keybind
        .then(|| GsettingsProvider::new(&config.keybindings.schema));
    let provider = gsettings.as_ref().map(|p| p as &dyn KeybindingProvider);
    let keybindings = Keybindings::resolve(&config.keybindings, provider)?;

    if !args.dry_run {
        utils::permissions::check_permissions()?;
    }

    let mut pending = VirtualKeyboard::open(config.input.settle_delay(), args.dry_run)?;
    pending.declare(&keybindings.minimize);
    pending.declare(&keybindings.close);
    debug!("Объявлены коды клавиш: {:?}", pending.capabilities().codes());
    let keyboard = pending.activate()?;

    Ok((keyboard, keybindings))
}

fn init_tracing(logging: &LoggingConfig) -> Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&logging.level))?;

    // stdout занят выводом --list
    let layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);
    let registry = tracing_subscriber::registry().with(filter);

    if logging.format == "compact" {
        registry.with(layer.compact()).init();
    } else {
        registry.with(layer.pretty()).init();
    }

    Ok(())
}
