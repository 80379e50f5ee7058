use crate::error::Result;
use crate::events::{parse_key_script, KeyInput, RawWindow, WindowId};

/// Ответ оконной системы на попытку захвата клавиатуры
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrabResponse {
    Success,
    /// Клавиатуру держит кто-то другой (обычно оконный менеджер сразу после хоткея)
    AlreadyHeld,
    Failed(u8),
}

/// Trait for window systems exposing a client list and a property/message model
#[async_trait::async_trait]
pub trait WindowSystem: Send + Sync {
    /// Client list snapshot, in the order the window manager reports it
    async fn list_windows(&self) -> Result<Vec<RawWindow>>;

    async fn active_window(&self) -> Result<Option<WindowId>>;

    async fn current_workspace(&self) -> Result<Option<u32>>;

    async fn switch_workspace(&self, workspace: u32) -> Result<()>;

    /// High-level activation request to the window manager
    async fn activate(&self, window: WindowId) -> Result<()>;

    /// Direct map + raise + focus, for window managers ignoring the request above
    async fn raise_and_focus(&self, window: WindowId) -> Result<()>;

    async fn acquire_keyboard(&self) -> Result<GrabResponse>;

    /// Synchronous so it can run from `Drop`
    fn release_keyboard(&self) -> Result<()>;

    /// Blocks until the next key press
    async fn next_key_event(&self) -> Result<KeyInput>;
}

/// Factory function to create an appropriate window system based on the dry_run flag
pub fn create_window_system(dry_run: bool, script: Option<&str>) -> Result<Box<dyn WindowSystem>> {
    if dry_run {
        let keys = script.map(parse_key_script).unwrap_or_default();
        Ok(Box::new(super::dry_run::DryRunWindowSystem::demo().with_keys(keys)))
    } else {
        Ok(Box::new(super::x11::X11WindowSystem::connect()?))
    }
}
