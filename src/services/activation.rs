use super::window_system::WindowSystem;
use crate::config::ActivationConfig;
use crate::error::Result;
use crate::events::WindowRecord;
use crate::leap_error;
use tracing::{info, warn};

/// Переводит окно на передний план.
///
/// Сначала при необходимости переключает рабочий стол и ждёт settle_delay,
/// затем отправляет запрос активации и дублирует его прямым raise + focus.
/// Ошибка возвращается, только если не сработал ни один из двух способов.
pub async fn activate_window(
    window_system: &dyn WindowSystem,
    window: &WindowRecord,
    config: &ActivationConfig,
) -> Result<()> {
    info!("ACTIVATING: {}", window);

    if let Some(target) = window.workspace {
        let current = window_system.current_workspace().await.unwrap_or_else(|e| {
            warn!("Текущий рабочий стол неизвестен: {}", e);
            None
        });

        if current != Some(target) {
            match window_system.switch_workspace(target).await {
                Ok(()) => tokio::time::sleep(config.settle_delay()).await,
                Err(e) => warn!("Не удалось переключиться на рабочий стол {}: {}", target, e),
            }
        }
    }

    let requested = window_system.activate(window.id).await;
    let focused = window_system.raise_and_focus(window.id).await;

    match (requested, focused) {
        (Err(a), Err(b)) => Err(leap_error!(activation, "{}: {}; {}", window.id, a, b)),
        (Err(e), Ok(())) | (Ok(()), Err(e)) => {
            warn!("Активация {} выполнена частично: {}", window.id, e);
            Ok(())
        }
        (Ok(()), Ok(())) => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{RawWindow, WindowId};
    use crate::services::window_system::dry_run::{Command, DryRunWindowSystem};
    use std::time::Duration;
    use tokio::time::Instant;

    fn record(raw: RawWindow) -> WindowRecord {
        WindowRecord::from_raw(raw).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_switches_workspace_first() {
        let ws = DryRunWindowSystem::new(vec![]).with_current_workspace(0);
        let window = record(RawWindow::new(7, "Slack").on_workspace(1));
        let started = Instant::now();

        activate_window(&ws, &window, &ActivationConfig::default()).await.unwrap();

        assert!(started.elapsed() >= Duration::from_millis(50));
        assert_eq!(
            ws.commands(),
            vec![
                Command::SwitchWorkspace(1),
                Command::Activate(WindowId(7)),
                Command::RaiseAndFocus(WindowId(7)),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_same_workspace_no_switch() {
        let ws = DryRunWindowSystem::new(vec![]).with_current_workspace(1);
        let window = record(RawWindow::new(7, "Slack").on_workspace(1));
        let started = Instant::now();

        activate_window(&ws, &window, &ActivationConfig::default()).await.unwrap();

        assert_eq!(started.elapsed(), Duration::ZERO);
        assert_eq!(
            ws.commands(),
            vec![Command::Activate(WindowId(7)), Command::RaiseAndFocus(WindowId(7))]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_workspaces() {
        // Стол окна неизвестен: не переключаем
        let ws = DryRunWindowSystem::new(vec![]).with_current_workspace(0);
        activate_window(&ws, &record(RawWindow::new(3, "xterm")), &ActivationConfig::default())
            .await
            .unwrap();
        assert!(!ws.commands().contains(&Command::SwitchWorkspace(0)));

        // Текущий стол неизвестен, стол окна известен: переключаем
        let ws = DryRunWindowSystem::new(vec![]);
        activate_window(&ws, &record(RawWindow::new(3, "xterm").on_workspace(2)), &ActivationConfig::default())
            .await
            .unwrap();
        assert_eq!(ws.commands()[0], Command::SwitchWorkspace(2));
    }
}
