use crate::error::Result;
use crate::mappings::keysym::NO_SYMBOL;
use x11rb::connection::Connection;
use x11rb::protocol::xproto::ConnectionExt as _;
use x11rb::rust_connection::RustConnection;

/// Таблица keycode → keysym, прочитанная один раз при подключении
pub struct KeyboardMap {
    min_keycode: u8,
    keysyms_per_keycode: usize,
    keysyms: Vec<u32>,
}

impl KeyboardMap {
    pub fn load(conn: &RustConnection) -> Result<Self> {
        let setup = conn.setup();
        let min_keycode = setup.min_keycode;
        let count = setup.max_keycode - min_keycode + 1;

        let reply = conn.get_keyboard_mapping(min_keycode, count)?.reply()?;

        Ok(Self::from_table(min_keycode, reply.keysyms_per_keycode as usize, reply.keysyms))
    }

    pub fn from_table(min_keycode: u8, keysyms_per_keycode: usize, keysyms: Vec<u32>) -> Self {
        Self {
            min_keycode,
            keysyms_per_keycode,
            keysyms,
        }
    }

    /// Первая колонка без Shift, вторая с Shift; при пустой второй берём первую.
    pub fn keysym(&self, keycode: u8, shifted: bool) -> u32 {
        if keycode < self.min_keycode || self.keysyms_per_keycode == 0 {
            return NO_SYMBOL;
        }

        let base = (keycode - self.min_keycode) as usize * self.keysyms_per_keycode;
        let lookup = |column: usize| {
            if column >= self.keysyms_per_keycode {
                return NO_SYMBOL;
            }
            self.keysyms.get(base + column).copied().unwrap_or(NO_SYMBOL)
        };

        match (shifted, lookup(1)) {
            (true, NO_SYMBOL) | (false, _) => lookup(0),
            (true, sym) => sym,
        }
    }
}
