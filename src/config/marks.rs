//! Файл меток: плоский `ключ=значение`.
//!
//! ```text
//! # комментарий
//! 1=firefox
//! 7=Slack
//! instance_keys=asdfjkl
//! debug=yes
//! ```

use std::fmt;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, warn};

/// Алфавит выбора экземпляра по умолчанию (порядок QWERTY).
pub const DEFAULT_INSTANCE_KEYS: &str = "qwertyuiopasdfghjklzxcvbnm1234567890";

#[derive(Error, Debug)]
pub enum MarkConfigError {
    #[error("Не удалось прочитать {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Повторяющаяся клавиша в instance_keys: '{0}'")]
    DuplicateInstanceKey(char),

    #[error("instance_keys не может быть пустым")]
    EmptyInstanceKeys,

    #[error("Неверное значение debug: {0}")]
    InvalidDebugValue(String),

    #[error("В файле меток нет ни одной метки")]
    NoMarks,
}

/// Упорядоченный набор различных клавиш для выбора экземпляра.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceKeyAlphabet {
    keys: Vec<char>,
}

impl InstanceKeyAlphabet {
    /// Пробелы и непечатные символы выбрасываются, остальное приводится к нижнему регистру.
    pub fn parse(raw: &str) -> Result<Self, MarkConfigError> {
        let mut keys: Vec<char> = Vec::with_capacity(raw.len());

        for ch in raw.chars() {
            if ch.is_whitespace() || ch.is_control() {
                continue;
            }
            for normalized in ch.to_lowercase() {
                if keys.contains(&normalized) {
                    return Err(MarkConfigError::DuplicateInstanceKey(normalized));
                }
                keys.push(normalized);
            }
        }

        if keys.is_empty() {
            return Err(MarkConfigError::EmptyInstanceKeys);
        }

        Ok(Self { keys })
    }

    pub fn keys(&self) -> &[char] {
        &self.keys
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }
}

impl Default for InstanceKeyAlphabet {
    fn default() -> Self {
        Self {
            keys: DEFAULT_INSTANCE_KEYS.chars().collect(),
        }
    }
}

impl fmt::Display for InstanceKeyAlphabet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for key in &self.keys {
            write!(f, "{}", key)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkMapping {
    pub number: u32,
    pub class: String,
}

#[derive(Debug, Clone)]
pub struct MarkConfig {
    marks: Vec<MarkMapping>,
    pub instance_keys: InstanceKeyAlphabet,
    pub debug: bool,
}

impl MarkConfig {
    pub fn load<P: AsRef<Path>>(path: P, max_marks: usize) -> Result<Self, MarkConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| MarkConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&text, max_marks)
    }

    /// Разбор текста файла меток.
    ///
    /// Строки с нечисловым неизвестным ключом пропускаются. После `max_marks`
    /// загруженных меток остальные метки игнорируются, но `instance_keys`
    /// и `debug` всё ещё читаются.
    pub fn parse(text: &str, max_marks: usize) -> Result<Self, MarkConfigError> {
        let mut config = Self {
            marks: Vec::new(),
            instance_keys: InstanceKeyAlphabet::default(),
            debug: false,
        };

        for (line_no, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let key = key.trim();
            let value = value.trim();

            if key.is_empty() {
                continue;
            }

            if key.eq_ignore_ascii_case("instance_keys") {
                config.instance_keys = InstanceKeyAlphabet::parse(value)?;
                continue;
            }

            if key.eq_ignore_ascii_case("debug") {
                config.debug = parse_bool(value)
                    .ok_or_else(|| MarkConfigError::InvalidDebugValue(value.to_string()))?;
                continue;
            }

            let Some(number) = parse_mark_number(key) else {
                debug!("Строка {} пропущена: неизвестный ключ '{}'", line_no + 1, key);
                continue;
            };

            if value.is_empty() {
                continue;
            }

            if config.marks.len() >= max_marks {
                warn!("Метка {} пропущена: достигнут предел в {} меток", number, max_marks);
                continue;
            }

            config.marks.push(MarkMapping {
                number,
                class: value.to_string(),
            });
        }

        if config.marks.is_empty() {
            return Err(MarkConfigError::NoMarks);
        }

        Ok(config)
    }

    /// Класс окна для метки. При повторе номера побеждает первая запись.
    pub fn class_for(&self, mark: u32) -> Option<&str> {
        self.marks
            .iter()
            .find(|mapping| mapping.number == mark)
            .map(|mapping| mapping.class.as_str())
    }

    pub fn marks(&self) -> &[MarkMapping] {
        &self.marks
    }
}

pub fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" => Some(true),
        "false" | "no" | "0" => Some(false),
        _ => None,
    }
}

fn parse_mark_number(key: &str) -> Option<u32> {
    if !key.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let number: u32 = key.parse().ok()?;
    (number > 0 && number <= i32::MAX as u32).then_some(number)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_marks_and_reserved_keys() {
        let text = "\
# метки
  1 = firefox

7=Slack
instance_keys = a s D f
DEBUG=Yes
";
        let config = MarkConfig::parse(text, 100).unwrap();
        assert_eq!(config.class_for(1), Some("firefox"));
        assert_eq!(config.class_for(7), Some("Slack"));
        assert_eq!(config.class_for(2), None);
        assert_eq!(config.instance_keys.keys(), &['a', 's', 'd', 'f']);
        assert!(config.debug);
    }

    #[test]
    fn test_duplicate_mark_first_wins() {
        let config = MarkConfig::parse("3=Alacritty\n3=kitty\n", 100).unwrap();
        assert_eq!(config.class_for(3), Some("Alacritty"));
        assert_eq!(config.marks().len(), 2);
    }

    #[test]
    fn test_unknown_and_malformed_lines_skipped() {
        let text = "theme=dark\nno equals sign\n0=zero\n-4=neg\n+5=plus\n9=\n=x\n2=code\n";
        let config = MarkConfig::parse(text, 100).unwrap();
        assert_eq!(config.marks().len(), 1);
        assert_eq!(config.class_for(2), Some("code"));
        assert!(!config.debug);
        assert_eq!(config.instance_keys, InstanceKeyAlphabet::default());
    }

    #[test]
    fn test_no_marks_is_error() {
        let err = MarkConfig::parse("debug=false\n# пусто\n", 100).unwrap_err();
        assert!(matches!(err, MarkConfigError::NoMarks));
    }

    #[test]
    fn test_invalid_debug_is_error() {
        let err = MarkConfig::parse("1=a\ndebug=maybe\n", 100).unwrap_err();
        assert!(matches!(err, MarkConfigError::InvalidDebugValue(v) if v == "maybe"));
    }

    #[test]
    fn test_duplicate_instance_key_after_normalization() {
        let err = InstanceKeyAlphabet::parse("abA").unwrap_err();
        assert!(matches!(err, MarkConfigError::DuplicateInstanceKey('a')));

        let err = MarkConfig::parse("1=a\ninstance_keys=q w Q\n", 100).unwrap_err();
        assert!(matches!(err, MarkConfigError::DuplicateInstanceKey('q')));
    }

    #[test]
    fn test_empty_instance_keys_rejected() {
        assert!(matches!(
            InstanceKeyAlphabet::parse(" \t "),
            Err(MarkConfigError::EmptyInstanceKeys)
        ));
    }

    #[test]
    fn test_default_alphabet() {
        let alphabet = InstanceKeyAlphabet::default();
        assert_eq!(alphabet.len(), 36);
        assert_eq!(alphabet.keys()[0], 'q');
        assert_eq!(alphabet.to_string(), DEFAULT_INSTANCE_KEYS);
    }

    #[test]
    fn test_mark_cap_keeps_reading_reserved_keys() {
        let text = "1=a\n2=b\n3=c\ninstance_keys=xyz\n";
        let config = MarkConfig::parse(text, 2).unwrap();
        assert_eq!(config.marks().len(), 2);
        assert_eq!(config.class_for(3), None);
        assert_eq!(config.instance_keys.to_string(), "xyz");
    }

    #[test]
    fn test_parse_bool_spellings() {
        for v in ["true", "TRUE", "yes", "Yes", "1"] {
            assert_eq!(parse_bool(v), Some(true), "{}", v);
        }
        for v in ["false", "No", "0"] {
            assert_eq!(parse_bool(v), Some(false), "{}", v);
        }
        assert_eq!(parse_bool("on"), None);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = MarkConfig::load(dir.path().join("winleap.conf"), 100).unwrap_err();
        assert!(matches!(err, MarkConfigError::Read { .. }));
    }
}
