use super::r#trait::{GrabResponse, WindowSystem};
use crate::error::Result;
use crate::events::{KeyInput, RawWindow, WindowId};
use parking_lot::Mutex;
use std::collections::VecDeque;
use tracing::info;

/// Действие, которое dry-run система получила бы от переключателя
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    SwitchWorkspace(u32),
    Activate(WindowId),
    RaiseAndFocus(WindowId),
    GrabKeyboard,
    UngrabKeyboard,
}

/// Оконная система без X-сервера: фиксированный список окон, нажатия из сценария.
pub struct DryRunWindowSystem {
    windows: Vec<RawWindow>,
    active: Option<WindowId>,
    current_workspace: Option<u32>,
    keys: Mutex<VecDeque<KeyInput>>,
    grab_responses: Mutex<VecDeque<GrabResponse>>,
    commands: Mutex<Vec<Command>>,
}

impl DryRunWindowSystem {
    pub fn new(windows: Vec<RawWindow>) -> Self {
        Self {
            windows,
            active: None,
            current_workspace: None,
            keys: Mutex::new(VecDeque::new()),
            grab_responses: Mutex::new(VecDeque::new()),
            commands: Mutex::new(Vec::new()),
        }
    }

    /// Набор окон для запуска с --dry-run
    pub fn demo() -> Self {
        Self::new(vec![
            RawWindow::new(0x0140_0003, "Firefox").with_title("Mozilla Firefox").on_workspace(0),
            RawWindow::new(0x0140_0107, "Firefox").with_title("Docs - Mozilla Firefox").on_workspace(1),
            RawWindow::new(0x0260_000a, "Alacritty").with_title("~/src").on_workspace(0),
            RawWindow::new(0x0320_0001, "Slack").with_title("general").on_workspace(0),
            RawWindow::new(0x0320_0044, "Slack").with_title("random").on_workspace(1),
        ])
        .with_current_workspace(0)
        .with_active(0x0140_0003)
    }

    pub fn with_active(mut self, window: u32) -> Self {
        self.active = Some(WindowId(window));
        self
    }

    pub fn with_current_workspace(mut self, workspace: u32) -> Self {
        self.current_workspace = Some(workspace);
        self
    }

    pub fn with_keys(self, keys: impl IntoIterator<Item = KeyInput>) -> Self {
        self.keys.lock().extend(keys);
        self
    }

    /// Ответы на попытки захвата; когда очередь пуста, захват успешен.
    #[cfg(test)]
    pub fn with_grab_responses(self, responses: impl IntoIterator<Item = GrabResponse>) -> Self {
        self.grab_responses.lock().extend(responses);
        self
    }

    #[cfg(test)]
    pub fn commands(&self) -> Vec<Command> {
        self.commands.lock().clone()
    }

    #[cfg(test)]
    pub fn keys_left(&self) -> usize {
        self.keys.lock().len()
    }

    fn record(&self, command: Command) {
        info!("Dry-run: {:?}", command);
        self.commands.lock().push(command);
    }
}

#[async_trait::async_trait]
impl WindowSystem for DryRunWindowSystem {
    async fn list_windows(&self) -> Result<Vec<RawWindow>> {
        Ok(self.windows.clone())
    }

    async fn active_window(&self) -> Result<Option<WindowId>> {
        Ok(self.active)
    }

    async fn current_workspace(&self) -> Result<Option<u32>> {
        Ok(self.current_workspace)
    }

    async fn switch_workspace(&self, workspace: u32) -> Result<()> {
        self.record(Command::SwitchWorkspace(workspace));
        Ok(())
    }

    async fn activate(&self, window: WindowId) -> Result<()> {
        self.record(Command::Activate(window));
        Ok(())
    }

    async fn raise_and_focus(&self, window: WindowId) -> Result<()> {
        self.record(Command::RaiseAndFocus(window));
        Ok(())
    }

    async fn acquire_keyboard(&self) -> Result<GrabResponse> {
        let response = self
            .grab_responses
            .lock()
            .pop_front()
            .unwrap_or(GrabResponse::Success);
        if response == GrabResponse::Success {
            self.record(Command::GrabKeyboard);
        }
        Ok(response)
    }

    fn release_keyboard(&self) -> Result<()> {
        self.record(Command::UngrabKeyboard);
        Ok(())
    }

    async fn next_key_event(&self) -> Result<KeyInput> {
        match self.keys.lock().pop_front() {
            Some(key) => Ok(key),
            None => {
                info!("Dry-run: сценарий нажатий закончился, эмулируем Escape");
                Ok(KeyInput::Cancel)
            }
        }
    }
}
