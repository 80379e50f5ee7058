use super::activation::activate_window;
use super::grab::acquire_keyboard;
use super::window_system::WindowSystem;
use crate::config::{MarkConfig, Settings};
use crate::debug_if_enabled;
use crate::engine::{
    decide_mark, match_class, IdentifierTable, KeyedStep, MarkDecision, MarkPolicy, MatchResult, TypingSession,
    TypingStep, WindowSnapshot, WorkspaceScope,
};
use crate::error::{LeapError, Result};
use crate::events::KeyInput;
use crate::mappings::KeysymToInput;
use std::io::Write;
use tracing::{info, warn};

/// Код выхода при ошибке настройки (нет окон, нет клавиатуры, плохой конфиг)
pub const SETUP_FAILURE_EXIT: u8 = 2;

/// Чем закончился запуск переключателя
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Activated,
    NoMatch,
    Cancelled,
}

impl Outcome {
    pub fn exit_code(self) -> u8 {
        match self {
            Outcome::Activated => 0,
            Outcome::NoMatch => 1,
            Outcome::Cancelled => 3,
        }
    }
}

pub struct Switcher<'a> {
    window_system: &'a dyn WindowSystem,
    settings: &'a Settings,
}

impl<'a> Switcher<'a> {
    pub fn new(window_system: &'a dyn WindowSystem, settings: &'a Settings) -> Self {
        Self {
            window_system,
            settings,
        }
    }

    /// Свободный набор: клавиатура захватывается до снимка окон.
    pub async fn run_typing(&self) -> Result<Outcome> {
        let _grab = acquire_keyboard(self.window_system, &self.settings.grab).await?;

        let snapshot = self.capture().await?;
        let table = IdentifierTable::build(&snapshot, self.settings.limits.max_groups);

        debug_if_enabled!("=== PREFIX TABLE ===");
        for group in table.groups() {
            debug_if_enabled!(
                "  '{}' prefix='{}' ({} windows){}",
                group.class_lower,
                group.prefix(),
                group.members.len(),
                if group.fallback { " [fallback]" } else { "" }
            );
        }

        let mut session = TypingSession::new(&snapshot, &table, self.settings.limits.max_buffer_len);
        info!("Ожидание ввода...");

        loop {
            let key = self.window_system.next_key_event().await?;
            match session.feed(key) {
                TypingStep::Resolved(window) => {
                    info!("UNIQUE MATCH for buffer='{}'", session.buffer());
                    activate_window(self.window_system, window, &self.settings.activation).await?;
                    return Ok(Outcome::Activated);
                }
                TypingStep::Cancelled => {
                    info!("Отменено пользователем");
                    return Ok(Outcome::Cancelled);
                }
                TypingStep::Pending(MatchResult::NoMatch) => {
                    info!("NO MATCH for buffer='{}'", session.buffer());
                }
                TypingStep::Pending(result) => {
                    info!("PARTIAL MATCH for buffer='{}': {} possible", session.buffer(), result.count());
                }
                TypingStep::Ignored => debug_if_enabled!("Нажатие {} проигнорировано", key),
            }
        }
    }

    /// Переход по метке: циклический или с выбором экземпляра клавишей.
    pub async fn run_mark(&self, mark: u32, policy: MarkPolicy, current_only: bool, marks: &MarkConfig) -> Result<Outcome> {
        let Some(target_class) = marks.class_for(mark) else {
            warn!("Метка {} не назначена", mark);
            return Ok(Outcome::NoMatch);
        };
        info!("Mark {} -> class '{}'", mark, target_class);

        let snapshot = self.capture().await?;

        let scope = if current_only {
            let current = self.window_system.current_workspace().await.unwrap_or_else(|e| {
                warn!("Текущий рабочий стол неизвестен: {}", e);
                None
            });
            info!("Только текущий рабочий стол: {:?}", current);
            WorkspaceScope::Current(current)
        } else {
            WorkspaceScope::Global
        };

        let candidates = match_class(target_class, &snapshot, scope);
        debug_if_enabled!("=== MATCHING WINDOWS ===");
        for window in &candidates {
            debug_if_enabled!("  {}", window);
        }
        info!("Найдено окон класса '{}': {}", target_class, candidates.len());

        let active = if policy == MarkPolicy::Cycle && candidates.len() > 1 {
            self.window_system.active_window().await.unwrap_or_else(|e| {
                warn!("Активное окно неизвестно: {}", e);
                None
            })
        } else {
            None
        };

        match decide_mark(&candidates, policy, active, &marks.instance_keys)? {
            MarkDecision::NoCandidates => {
                warn!("No windows found for: {}", target_class);
                Ok(Outcome::NoMatch)
            }
            MarkDecision::Activate(window) => {
                activate_window(self.window_system, window, &self.settings.activation).await?;
                Ok(Outcome::Activated)
            }
            MarkDecision::SelectByKey(selection) => {
                info!("=== INSTANCE KEYS ===");
                for (key, window) in selection.bindings() {
                    info!("  [{}] {}", key, window);
                }

                let grab = acquire_keyboard(self.window_system, &self.settings.grab).await?;
                loop {
                    match selection.feed(self.window_system.next_key_event().await?) {
                        KeyedStep::Selected(window) => {
                            drop(grab);
                            activate_window(self.window_system, window, &self.settings.activation).await?;
                            return Ok(Outcome::Activated);
                        }
                        KeyedStep::Cancelled => {
                            info!("Отменено пользователем");
                            return Ok(Outcome::Cancelled);
                        }
                        KeyedStep::Ignored => {}
                    }
                }
            }
        }
    }

    /// Печатает каждое нажатие до Escape. Используется для проверки раскладки.
    pub async fn run_key_dump(&self, out: &mut dyn Write) -> Result<()> {
        let _grab = acquire_keyboard(self.window_system, &self.settings.grab).await?;

        writeln!(out, "READY")?;
        out.flush()?;

        loop {
            let key = self.window_system.next_key_event().await?;
            match key {
                KeyInput::Printable(ch) => writeln!(out, "KEY:{}", ch)?,
                KeyInput::Enter => writeln!(out, "RETURN")?,
                KeyInput::Backspace => writeln!(out, "BACKSPACE")?,
                KeyInput::Other(keysym) => match KeysymToInput::name(keysym) {
                    Some(name) => writeln!(out, "SYM:{}", name)?,
                    None => writeln!(out, "SYM:0x{:x}", keysym)?,
                },
                KeyInput::Cancel => {
                    writeln!(out, "ESCAPE")?;
                    out.flush()?;
                    return Ok(());
                }
            }
            out.flush()?;
        }
    }

    async fn capture(&self) -> Result<WindowSnapshot> {
        let raw = self.window_system.list_windows().await?;
        let snapshot = WindowSnapshot::from_raw(raw, self.settings.limits.max_windows);

        if snapshot.is_empty() {
            return LeapError::no_windows("ни у одного окна нет WM_CLASS");
        }

        debug_if_enabled!("=== DISCOVERED WINDOWS ===");
        for window in snapshot.windows() {
            debug_if_enabled!("  {}", window);
        }
        info!("Total windows: {}", snapshot.len());

        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::InstanceKeyAlphabet;
    use crate::events::{parse_key_script, RawWindow, WindowId};
    use crate::mappings::keysym::XK_TAB;
    use crate::services::window_system::dry_run::{Command, DryRunWindowSystem};
    use crate::services::window_system::GrabResponse;
    use parking_lot::Mutex;
    use pretty_assertions::assert_eq;
    use std::io;
    use std::sync::Arc;
    use tracing::instrument::WithSubscriber;
    use tracing::Level;

    fn typing_system(script: &str) -> DryRunWindowSystem {
        DryRunWindowSystem::new(vec![
            RawWindow::new(1, "Firefox").with_title("Tab A").on_workspace(0),
            RawWindow::new(2, "Firefox").with_title("Tab B").on_workspace(0),
            RawWindow::new(3, "Alacritty").with_title("term").on_workspace(0),
        ])
        .with_current_workspace(0)
        .with_keys(parse_key_script(script))
    }

    fn slack_system() -> DryRunWindowSystem {
        DryRunWindowSystem::new(vec![
            RawWindow::new(10, "Slack").with_title("general").on_workspace(0),
            RawWindow::new(11, "Firefox").on_workspace(0),
            RawWindow::new(12, "slack").with_title("random").on_workspace(1),
        ])
        .with_current_workspace(0)
    }

    fn marks(text: &str) -> MarkConfig {
        MarkConfig::parse(text, 100).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_typing_activates_unique_prefix() {
        let ws = typing_system("f2");
        let settings = Settings::default();

        let outcome = Switcher::new(&ws, &settings).run_typing().await.unwrap();

        assert_eq!(outcome, Outcome::Activated);
        assert_eq!(
            ws.commands(),
            vec![
                Command::GrabKeyboard,
                Command::Activate(WindowId(2)),
                Command::RaiseAndFocus(WindowId(2)),
                Command::UngrabKeyboard,
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_typing_cancel_releases_grab() {
        let ws = typing_system("fz<bs><esc>");
        let settings = Settings::default();

        let outcome = Switcher::new(&ws, &settings).run_typing().await.unwrap();

        assert_eq!(outcome, Outcome::Cancelled);
        assert_eq!(ws.commands(), vec![Command::GrabKeyboard, Command::UngrabKeyboard]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_typing_no_windows_still_releases_grab() {
        let ws = DryRunWindowSystem::new(vec![RawWindow {
            id: WindowId(5),
            class: None,
            title: Some("classless".to_string()),
            workspace: None,
        }]);
        let settings = Settings::default();

        let err = Switcher::new(&ws, &settings).run_typing().await.unwrap_err();

        assert!(matches!(err, LeapError::NoWindows(_)));
        assert_eq!(ws.commands(), vec![Command::GrabKeyboard, Command::UngrabKeyboard]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_typing_grab_contended_reads_nothing() {
        let ws = typing_system("a").with_grab_responses(vec![GrabResponse::AlreadyHeld; 10]);
        let settings = Settings::default();

        let err = Switcher::new(&ws, &settings).run_typing().await.unwrap_err();

        assert!(matches!(err, LeapError::GrabContended { attempts: 10 }));
        assert_eq!(ws.keys_left(), 1);
        assert!(ws.commands().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_mark_cycles_from_active_window() {
        let config = marks("7=slack\n");
        let settings = Settings::default();

        // Активного среди кандидатов нет: первый по порядку
        let ws = slack_system();
        let outcome = Switcher::new(&ws, &settings)
            .run_mark(7, MarkPolicy::Cycle, false, &config)
            .await
            .unwrap();
        assert_eq!(outcome, Outcome::Activated);
        assert_eq!(
            ws.commands(),
            vec![Command::Activate(WindowId(10)), Command::RaiseAndFocus(WindowId(10))]
        );

        // Активен первый: следующий, на другом рабочем столе
        let ws = slack_system().with_active(10);
        Switcher::new(&ws, &settings)
            .run_mark(7, MarkPolicy::Cycle, false, &config)
            .await
            .unwrap();
        assert_eq!(
            ws.commands(),
            vec![
                Command::SwitchWorkspace(1),
                Command::Activate(WindowId(12)),
                Command::RaiseAndFocus(WindowId(12)),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_mark_current_workspace_only() {
        let config = marks("7=Slack\n");
        let settings = Settings::default();
        let ws = slack_system().with_active(10);

        Switcher::new(&ws, &settings)
            .run_mark(7, MarkPolicy::Cycle, true, &config)
            .await
            .unwrap();

        // Единственный кандидат на столе 0 активируется, даже если он уже активен
        assert_eq!(
            ws.commands(),
            vec![Command::Activate(WindowId(10)), Command::RaiseAndFocus(WindowId(10))]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_mark_unknown_current_workspace_matches_nothing() {
        let config = marks("7=Slack\n");
        let settings = Settings::default();
        let ws = DryRunWindowSystem::new(vec![RawWindow::new(10, "Slack").on_workspace(0)]);

        let outcome = Switcher::new(&ws, &settings)
            .run_mark(7, MarkPolicy::Cycle, true, &config)
            .await
            .unwrap();

        assert_eq!(outcome, Outcome::NoMatch);
        assert!(ws.commands().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_unmapped_mark_is_no_match() {
        let config = marks("7=Slack\n");
        let settings = Settings::default();
        let ws = slack_system();

        let outcome = Switcher::new(&ws, &settings)
            .run_mark(3, MarkPolicy::Keyed, false, &config)
            .await
            .unwrap();

        assert_eq!(outcome, Outcome::NoMatch);
        assert_eq!(outcome.exit_code(), 1);
        assert!(ws.commands().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_keyed_selection_releases_before_activation() {
        let config = marks("instance_keys=qaz\n7=slack\n");
        let settings = Settings::default();
        let ws = slack_system().with_keys(parse_key_script("xa"));

        let outcome = Switcher::new(&ws, &settings)
            .run_mark(7, MarkPolicy::Keyed, false, &config)
            .await
            .unwrap();

        assert_eq!(outcome, Outcome::Activated);
        assert_eq!(
            ws.commands(),
            vec![
                Command::GrabKeyboard,
                Command::UngrabKeyboard,
                Command::SwitchWorkspace(1),
                Command::Activate(WindowId(12)),
                Command::RaiseAndFocus(WindowId(12)),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_keyed_alphabet_too_short_fails_before_grab() {
        let mut config = marks("7=slack\n");
        config.instance_keys = InstanceKeyAlphabet::parse("q").unwrap();
        let settings = Settings::default();
        let ws = slack_system().with_keys(parse_key_script("q"));

        let err = Switcher::new(&ws, &settings)
            .run_mark(7, MarkPolicy::Keyed, false, &config)
            .await
            .unwrap_err();

        assert!(matches!(err, LeapError::AlphabetTooShort { candidates: 2, keys: 1 }));
        assert!(ws.commands().is_empty());
        assert_eq!(ws.keys_left(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_keyed_cancel() {
        let config = marks("7=slack\n");
        let settings = Settings::default();
        let ws = slack_system().with_keys(parse_key_script("<esc>q"));

        let outcome = Switcher::new(&ws, &settings)
            .run_mark(7, MarkPolicy::Keyed, false, &config)
            .await
            .unwrap();

        assert_eq!(outcome, Outcome::Cancelled);
        assert_eq!(outcome.exit_code(), 3);
        assert_eq!(ws.commands(), vec![Command::GrabKeyboard, Command::UngrabKeyboard]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_key_dump() {
        let ws = DryRunWindowSystem::new(vec![])
            .with_keys(parse_key_script("aB<bs><enter>"))
            .with_keys([KeyInput::Other(XK_TAB), KeyInput::Other(0x1234_5678), KeyInput::Cancel]);
        let settings = Settings::default();
        let mut out = Vec::new();

        Switcher::new(&ws, &settings).run_key_dump(&mut out).await.unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "READY\nKEY:a\nKEY:B\nBACKSPACE\nRETURN\nSYM:Tab\nSYM:0x12345678\nESCAPE\n"
        );
        assert_eq!(ws.commands(), vec![Command::GrabKeyboard, Command::UngrabKeyboard]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_demo_system_cycles_from_active_window() {
        let config = marks("2=firefox\n");
        let settings = Settings::default();
        let ws = DryRunWindowSystem::demo();

        Switcher::new(&ws, &settings)
            .run_mark(2, MarkPolicy::Cycle, false, &config)
            .await
            .unwrap();

        assert_eq!(
            ws.commands(),
            vec![
                Command::SwitchWorkspace(1),
                Command::Activate(WindowId(0x0140_0107)),
                Command::RaiseAndFocus(WindowId(0x0140_0107)),
            ]
        );
    }

    #[derive(Clone, Default)]
    struct CapturedLog(Arc<Mutex<Vec<u8>>>);

    impl io::Write for CapturedLog {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    async fn mark_log(level: Level) -> String {
        let log = CapturedLog::default();
        let writer = log.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(level)
            .with_writer(move || writer.clone())
            .finish();

        let config = marks("7=slack\n");
        let settings = Settings::default();
        let ws = slack_system();
        Switcher::new(&ws, &settings)
            .run_mark(7, MarkPolicy::Cycle, false, &config)
            .with_subscriber(subscriber)
            .await
            .unwrap();

        let bytes = log.0.lock().clone();
        String::from_utf8(bytes).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_window_dumps_stay_out_of_info_log() {
        let info = mark_log(Level::INFO).await;
        assert!(!info.contains("=== DISCOVERED WINDOWS ==="));
        assert!(!info.contains("=== MATCHING WINDOWS ==="));
        assert!(info.contains("Total windows: 3"));

        let debug = mark_log(Level::DEBUG).await;
        assert!(debug.contains("=== DISCOVERED WINDOWS ==="));
        assert!(debug.contains("=== MATCHING WINDOWS ==="));
    }

    #[test]
    fn test_exit_codes_are_distinct() {
        let codes = [
            Outcome::Activated.exit_code(),
            Outcome::NoMatch.exit_code(),
            SETUP_FAILURE_EXIT,
            Outcome::Cancelled.exit_code(),
        ];
        assert_eq!(codes, [0, 1, 2, 3]);
    }
}
