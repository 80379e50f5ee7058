use std::fmt;

/// Нажатие клавиши после перевода keysym в то, что понимает движок выбора
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyInput {
    Printable(char),
    Backspace,
    Enter,
    Cancel,
    /// Непечатная клавиша (keysym как есть)
    Other(u32),
}

impl fmt::Display for KeyInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyInput::Printable(ch) => write!(f, "'{}'", ch),
            KeyInput::Backspace => write!(f, "BACKSPACE"),
            KeyInput::Enter => write!(f, "RETURN"),
            KeyInput::Cancel => write!(f, "ESCAPE"),
            KeyInput::Other(keysym) => write!(f, "keysym 0x{:x}", keysym),
        }
    }
}

/// Разбор сценария нажатий для dry-run: `<esc>`, `<bs>`, `<enter>`,
/// всё остальное посимвольно. Незакрытая `<` считается обычным символом.
pub fn parse_key_script(script: &str) -> Vec<KeyInput> {
    let mut keys = Vec::new();
    let mut rest = script;

    while let Some(ch) = rest.chars().next() {
        if ch == '<' {
            if let Some(end) = rest.find('>') {
                let token = &rest[1..end];
                let special = match token.to_ascii_lowercase().as_str() {
                    "esc" | "escape" => Some(KeyInput::Cancel),
                    "bs" | "backspace" => Some(KeyInput::Backspace),
                    "enter" | "ret" | "return" => Some(KeyInput::Enter),
                    _ => None,
                };
                if let Some(key) = special {
                    keys.push(key);
                    rest = &rest[end + 1..];
                    continue;
                }
            }
        }

        keys.push(KeyInput::Printable(ch));
        rest = &rest[ch.len_utf8()..];
    }

    keys
}
