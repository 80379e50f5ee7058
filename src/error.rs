use crate::config::marks::MarkConfigError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LeapError {
    #[error("Ошибка конфигурации: {0}")]
    Settings(#[from] anyhow::Error),

    #[error("Ошибка файла меток: {0}")]
    Marks(#[from] MarkConfigError),

    #[error("Ошибка ввода-вывода: {0}")]
    Io(#[from] std::io::Error),

    #[error("Не удалось подключиться к X-серверу: {0}")]
    Connect(#[from] x11rb::errors::ConnectError),

    #[error("Соединение с X-сервером потеряно: {0}")]
    Connection(#[from] x11rb::errors::ConnectionError),

    #[error("Ошибка ответа X-сервера: {0}")]
    Reply(#[from] x11rb::errors::ReplyError),

    #[error("Не удалось получить список окон: {0}")]
    NoWindows(String),

    #[error("Не удалось захватить клавиатуру (код {code})")]
    GrabFailed { code: u8 },

    #[error("Клавиатура занята другим клиентом после {attempts} попыток")]
    GrabContended { attempts: u32 },

    #[error("Слишком много окон ({candidates}) для instance_keys длины {keys}")]
    AlphabetTooShort { candidates: usize, keys: usize },

    #[error("Не удалось активировать окно: {0}")]
    Activation(String),

    #[error("Внутренняя ошибка: {0}")]
    Internal(String),
}

impl LeapError {
    pub fn no_windows<T>(msg: impl Into<String>) -> Result<T> {
        Err(LeapError::NoWindows(msg.into()))
    }
}

pub type Result<T> = std::result::Result<T, LeapError>;

// Удобные макросы для создания ошибок
#[macro_export]
macro_rules! leap_error {
    (no_windows, $($arg:tt)*) => {
        $crate::error::LeapError::NoWindows(format!($($arg)*))
    };
    (activation, $($arg:tt)*) => {
        $crate::error::LeapError::Activation(format!($($arg)*))
    };
    (internal, $($arg:tt)*) => {
        $crate::error::LeapError::Internal(format!($($arg)*))
    };
}
