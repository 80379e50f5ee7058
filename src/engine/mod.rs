//! Движок выбора окна: снимок, префиксы, сопоставление, автомат выбора.
//!
//! Здесь нет ввода-вывода: всё, что касается X-сервера, живёт в `services`.

pub mod matcher;
pub mod prefix;
pub mod selection;
pub mod snapshot;

pub use matcher::{match_class, MatchResult, WorkspaceScope};
pub use prefix::IdentifierTable;
pub use selection::{decide_mark, KeyedStep, MarkDecision, MarkPolicy, TypingSession, TypingStep};
pub use snapshot::WindowSnapshot;
