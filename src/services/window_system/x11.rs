use super::keymap::KeyboardMap;
use super::r#trait::{GrabResponse, WindowSystem};
use crate::error::Result;
use crate::events::{KeyInput, RawWindow, WindowId};
use crate::mappings::KeysymToInput;
use tracing::{debug, info};
use x11rb::connection::Connection;
use x11rb::protocol::xproto::*;
use x11rb::protocol::Event;
use x11rb::rust_connection::RustConnection;
use x11rb::CURRENT_TIME;

x11rb::atom_manager! {
    pub Atoms: AtomsCookie {
        UTF8_STRING,
        _NET_WM_NAME,
        _NET_CLIENT_LIST,
        _NET_ACTIVE_WINDOW,
        _NET_WM_DESKTOP,
        _NET_CURRENT_DESKTOP,
    }
}

/// `_NET_WM_DESKTOP` окна, видимого на всех рабочих столах
const ALL_DESKTOPS: u32 = 0xFFFF_FFFF;

/// Источник-«приложение» в сообщении `_NET_ACTIVE_WINDOW`
const SOURCE_APPLICATION: u32 = 2;

/// WM_CLASS хранит "instance\0class\0"; нужен класс, при его отсутствии instance.
fn parse_wm_class(value: &[u8]) -> Option<String> {
    let mut parts = value.split(|byte| *byte == 0);
    let instance = parts.next().filter(|part| !part.is_empty());
    let class = parts.next().filter(|part| !part.is_empty()).or(instance)?;
    Some(String::from_utf8_lossy(class).into_owned())
}

/// Окно на всех рабочих столах считается окном с неизвестным столом.
fn desktop_from_cardinal(value: u32) -> Option<u32> {
    (value != ALL_DESKTOPS).then_some(value)
}

pub struct X11WindowSystem {
    conn: RustConnection,
    root: Window,
    atoms: Atoms,
    keymap: KeyboardMap,
}

impl X11WindowSystem {
    pub fn connect() -> Result<Self> {
        let (conn, screen_num) = x11rb::connect(None)?;
        let root = conn.setup().roots[screen_num].root;
        let atoms = Atoms::new(&conn)?.reply()?;
        let keymap = KeyboardMap::load(&conn)?;

        info!("Подключено к X-серверу, экран {}, root 0x{:08x}", screen_num, root);
        Ok(Self {
            conn,
            root,
            atoms,
            keymap,
        })
    }

    fn property32(&self, window: Window, property: Atom, kind: impl Into<Atom>) -> Result<Option<Vec<u32>>> {
        let reply = self
            .conn
            .get_property(false, window, property, kind, 0, 1024)?
            .reply()?;
        Ok(reply.value32().map(|values| values.collect()))
    }

    fn first32(&self, window: Window, property: Atom, kind: impl Into<Atom>) -> Result<Option<u32>> {
        Ok(self
            .property32(window, property, kind)?
            .and_then(|values| values.first().copied()))
    }

    fn property_bytes(&self, window: Window, property: impl Into<Atom>, kind: impl Into<Atom>) -> Option<Vec<u8>> {
        let reply = self
            .conn
            .get_property(false, window, property, kind, 0, 1024)
            .ok()?
            .reply()
            .ok()?;
        Some(reply.value)
    }

    fn wm_class(&self, window: Window) -> Option<String> {
        let value = self.property_bytes(window, AtomEnum::WM_CLASS, AtomEnum::STRING)?;
        parse_wm_class(&value)
    }

    fn title(&self, window: Window) -> Option<String> {
        let utf8 = self
            .property_bytes(window, self.atoms._NET_WM_NAME, self.atoms.UTF8_STRING)
            .filter(|value| !value.is_empty());
        let value = match utf8 {
            Some(value) => value,
            None => self
                .property_bytes(window, AtomEnum::WM_NAME, AtomEnum::ANY)
                .filter(|value| !value.is_empty())?,
        };
        Some(String::from_utf8_lossy(&value).into_owned())
    }

    fn desktop(&self, window: Window) -> Option<u32> {
        match self.first32(window, self.atoms._NET_WM_DESKTOP, AtomEnum::CARDINAL) {
            Ok(desktop) => desktop.and_then(desktop_from_cardinal),
            Err(e) => {
                debug!("_NET_WM_DESKTOP для 0x{:08x} не прочитан: {}", window, e);
                None
            }
        }
    }

    fn send_root_message(&self, window: Window, kind: Atom, data: [u32; 5]) -> Result<()> {
        let event = ClientMessageEvent::new(32, window, kind, data);
        self.conn.send_event(
            false,
            self.root,
            EventMask::SUBSTRUCTURE_REDIRECT | EventMask::SUBSTRUCTURE_NOTIFY,
            event,
        )?;
        self.conn.flush()?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl WindowSystem for X11WindowSystem {
    async fn list_windows(&self) -> Result<Vec<RawWindow>> {
        let Some(clients) = self.property32(self.root, self.atoms._NET_CLIENT_LIST, AtomEnum::WINDOW)? else {
            return crate::error::LeapError::no_windows("_NET_CLIENT_LIST отсутствует на корневом окне");
        };

        debug!("_NET_CLIENT_LIST: {} окон", clients.len());
        Ok(clients
            .into_iter()
            .map(|window| RawWindow {
                id: WindowId(window),
                class: self.wm_class(window),
                title: self.title(window),
                workspace: self.desktop(window),
            })
            .collect())
    }

    async fn active_window(&self) -> Result<Option<WindowId>> {
        Ok(self
            .first32(self.root, self.atoms._NET_ACTIVE_WINDOW, AtomEnum::WINDOW)?
            .filter(|window| *window != x11rb::NONE)
            .map(WindowId))
    }

    async fn current_workspace(&self) -> Result<Option<u32>> {
        self.first32(self.root, self.atoms._NET_CURRENT_DESKTOP, AtomEnum::CARDINAL)
    }

    async fn switch_workspace(&self, workspace: u32) -> Result<()> {
        debug!("Переключение на рабочий стол {}", workspace);
        self.send_root_message(
            self.root,
            self.atoms._NET_CURRENT_DESKTOP,
            [workspace, CURRENT_TIME, 0, 0, 0],
        )
    }

    async fn activate(&self, window: WindowId) -> Result<()> {
        self.send_root_message(
            window.0,
            self.atoms._NET_ACTIVE_WINDOW,
            [SOURCE_APPLICATION, CURRENT_TIME, 0, 0, 0],
        )
    }

    async fn raise_and_focus(&self, window: WindowId) -> Result<()> {
        self.conn.map_window(window.0)?;
        self.conn
            .configure_window(window.0, &ConfigureWindowAux::new().stack_mode(StackMode::ABOVE))?;
        self.conn
            .set_input_focus(InputFocus::POINTER_ROOT, window.0, CURRENT_TIME)?;
        self.conn.flush()?;
        Ok(())
    }

    async fn acquire_keyboard(&self) -> Result<GrabResponse> {
        let reply = self
            .conn
            .grab_keyboard(true, self.root, CURRENT_TIME, GrabMode::ASYNC, GrabMode::ASYNC)?
            .reply()?;

        Ok(match reply.status {
            GrabStatus::SUCCESS => GrabResponse::Success,
            GrabStatus::ALREADY_GRABBED => GrabResponse::AlreadyHeld,
            other => GrabResponse::Failed(u8::from(other)),
        })
    }

    fn release_keyboard(&self) -> Result<()> {
        self.conn.ungrab_keyboard(CURRENT_TIME)?;
        self.conn.flush()?;
        Ok(())
    }

    async fn next_key_event(&self) -> Result<KeyInput> {
        tokio::task::block_in_place(|| -> Result<KeyInput> {
            loop {
                if let Event::KeyPress(key) = self.conn.wait_for_event()? {
                    let shifted = u16::from(key.state) & u16::from(KeyButMask::SHIFT) != 0;
                    let keysym = self.keymap.keysym(key.detail, shifted);
                    return Ok(KeysymToInput::translate(keysym));
                }
            }
        })
    }
}

impl Drop for X11WindowSystem {
    fn drop(&mut self) {
        debug!("Закрытие соединения с X-сервером");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wm_class_prefers_class_string() {
        assert_eq!(parse_wm_class(b"navigator\0Firefox\0").as_deref(), Some("Firefox"));
        assert_eq!(parse_wm_class(b"\0Alacritty\0").as_deref(), Some("Alacritty"));
    }

    #[test]
    fn test_wm_class_falls_back_to_instance() {
        assert_eq!(parse_wm_class(b"xterm\0").as_deref(), Some("xterm"));
        assert_eq!(parse_wm_class(b"xterm\0\0").as_deref(), Some("xterm"));
    }

    #[test]
    fn test_empty_wm_class_excludes_window() {
        assert_eq!(parse_wm_class(b""), None);
        assert_eq!(parse_wm_class(b"\0\0"), None);
    }

    #[test]
    fn test_sticky_desktop_is_unknown() {
        assert_eq!(desktop_from_cardinal(ALL_DESKTOPS), None);
        assert_eq!(desktop_from_cardinal(0), Some(0));
        assert_eq!(desktop_from_cardinal(3), Some(3));
    }
}
