use crate::events::KeyInput;

pub const XK_BACKSPACE: u32 = 0xff08;
pub const XK_TAB: u32 = 0xff09;
pub const XK_RETURN: u32 = 0xff0d;
pub const XK_ESCAPE: u32 = 0xff1b;
pub const XK_KP_ENTER: u32 = 0xff8d;
pub const XK_KP_0: u32 = 0xffb0;
pub const XK_KP_9: u32 = 0xffb9;
pub const NO_SYMBOL: u32 = 0;

/// Преобразование X keysym в `KeyInput`
/// Отвечает только за трансляцию, без знания о режиме выбора
pub struct KeysymToInput;

impl KeysymToInput {
    pub fn translate(keysym: u32) -> KeyInput {
        match keysym {
            XK_ESCAPE => KeyInput::Cancel,
            XK_BACKSPACE => KeyInput::Backspace,
            XK_RETURN | XK_KP_ENTER => KeyInput::Enter,
            // Цифры на цифровом блоке
            XK_KP_0..=XK_KP_9 => {
                let digit = char::from(b'0' + (keysym - XK_KP_0) as u8);
                KeyInput::Printable(digit)
            }
            // Latin-1: keysym совпадает с кодом символа
            0x20..=0x7e | 0xa0..=0xff => match char::from_u32(keysym) {
                Some(ch) => KeyInput::Printable(ch),
                None => KeyInput::Other(keysym),
            },
            // Юникодные keysym: 0x01000000 + код символа
            0x0100_00a0..=0x0110_ffff => match char::from_u32(keysym - 0x0100_0000) {
                Some(ch) if !ch.is_control() => KeyInput::Printable(ch),
                _ => KeyInput::Other(keysym),
            },
            _ => KeyInput::Other(keysym),
        }
    }

    /// Имя keysym для вывода `SYM:<name>`
    pub fn name(keysym: u32) -> Option<&'static str> {
        let name = match keysym {
            XK_TAB => "Tab",
            0xff13 => "Pause",
            0xff14 => "Scroll_Lock",
            0xff50 => "Home",
            0xff51 => "Left",
            0xff52 => "Up",
            0xff53 => "Right",
            0xff54 => "Down",
            0xff55 => "Prior",
            0xff56 => "Next",
            0xff57 => "End",
            0xff63 => "Insert",
            0xff67 => "Menu",
            0xff7f => "Num_Lock",
            0xffe1 => "Shift_L",
            0xffe2 => "Shift_R",
            0xffe3 => "Control_L",
            0xffe4 => "Control_R",
            0xffe5 => "Caps_Lock",
            0xffe9 => "Alt_L",
            0xffea => "Alt_R",
            0xffeb => "Super_L",
            0xffec => "Super_R",
            0xfe03 => "ISO_Level3_Shift",
            0xffff => "Delete",
            // F1..F12
            0xffbe..=0xffc9 => return Some(FUNCTION_KEYS[(keysym - 0xffbe) as usize]),
            _ => return None,
        };
        Some(name)
    }
}

const FUNCTION_KEYS: [&str; 12] = [
    "F1", "F2", "F3", "F4", "F5", "F6", "F7", "F8", "F9", "F10", "F11", "F12",
];
