use std::fmt;

/// Заголовок для окон без `_NET_WM_NAME` и `WM_NAME`.
pub const UNTITLED: &str = "(untitled)";

/// Идентификатор окна, выданный X-сервером
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowId(pub u32);

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08x}", self.0)
    }
}

/// Окно в том виде, в каком его вернула оконная система. Класс может отсутствовать.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawWindow {
    pub id: WindowId,
    pub class: Option<String>,
    pub title: Option<String>,
    pub workspace: Option<u32>,
}

impl RawWindow {
    pub fn new(id: u32, class: &str) -> Self {
        Self {
            id: WindowId(id),
            class: Some(class.to_string()),
            title: None,
            workspace: None,
        }
    }

    pub fn with_title(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }

    pub fn on_workspace(mut self, workspace: u32) -> Self {
        self.workspace = Some(workspace);
        self
    }
}

/// Информация об окне из снимка. Не изменяется после создания.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowRecord {
    pub id: WindowId,
    pub class: String,
    pub title: String,
    pub workspace: Option<u32>,
}

impl WindowRecord {
    /// `None`, если класс не прочитан или пуст: такие окна в снимок не попадают.
    pub fn from_raw(raw: RawWindow) -> Option<Self> {
        let class = raw.class.filter(|class| !class.is_empty())?;
        Some(Self {
            id: raw.id,
            class,
            title: raw.title.unwrap_or_else(|| UNTITLED.to_string()),
            workspace: raw.workspace,
        })
    }

    pub fn class_lower(&self) -> String {
        self.class.to_lowercase()
    }

    /// Сравнение класса без учёта регистра
    pub fn has_class(&self, class: &str) -> bool {
        self.class.to_lowercase() == class.to_lowercase()
    }
}

impl fmt::Display for WindowRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.workspace {
            Some(ws) => write!(f, "[{}] desktop={} {} - {}", self.id, ws, self.class, self.title),
            None => write!(f, "[{}] desktop=? {} - {}", self.id, self.class, self.title),
        }
    }
}
