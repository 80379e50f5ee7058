use super::matcher::{match_prefix, MatchResult};
use super::prefix::IdentifierTable;
use super::snapshot::WindowSnapshot;
use crate::config::InstanceKeyAlphabet;
use crate::error::{LeapError, Result};
use crate::events::{KeyInput, WindowId, WindowRecord};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypingState {
    Prompting,
    Resolved,
    Cancelled,
}

/// Что произошло после одного нажатия в режиме набора
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypingStep<'a> {
    /// Буфер изменился, но однозначного окна пока нет
    Pending(MatchResult<'a>),
    /// Нажатие ничего не изменило
    Ignored,
    Resolved(&'a WindowRecord),
    Cancelled,
}

/// Сессия свободного набора: буфер плюс состояние автомата.
///
/// Окно выбирается сразу, как только напечатанный символ оставляет ровно одно
/// совпадение. Backspace пересчитывает совпадения, но сам ничего не активирует:
/// для этого нужен следующий символ или Enter.
pub struct TypingSession<'a> {
    snapshot: &'a WindowSnapshot,
    table: &'a IdentifierTable,
    buffer: String,
    max_buffer_len: usize,
    state: TypingState,
}

impl<'a> TypingSession<'a> {
    pub fn new(snapshot: &'a WindowSnapshot, table: &'a IdentifierTable, max_buffer_len: usize) -> Self {
        Self {
            snapshot,
            table,
            buffer: String::new(),
            max_buffer_len,
            state: TypingState::Prompting,
        }
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    #[cfg(test)]
    pub fn state(&self) -> TypingState {
        self.state
    }

    pub fn current_match(&self) -> MatchResult<'a> {
        match_prefix(&self.buffer, self.table, self.snapshot)
    }

    pub fn feed(&mut self, key: KeyInput) -> TypingStep<'a> {
        if self.state != TypingState::Prompting {
            return TypingStep::Ignored;
        }

        match key {
            KeyInput::Cancel => {
                self.state = TypingState::Cancelled;
                TypingStep::Cancelled
            }
            KeyInput::Backspace => {
                if self.buffer.pop().is_none() {
                    return TypingStep::Ignored;
                }
                debug!("BACKSPACE: buffer='{}'", self.buffer);
                TypingStep::Pending(self.current_match())
            }
            KeyInput::Enter => {
                if self.buffer.is_empty() {
                    return TypingStep::Ignored;
                }
                match self.current_match() {
                    MatchResult::Unique(window) => self.resolve(window),
                    _ => TypingStep::Ignored,
                }
            }
            KeyInput::Printable(ch) => {
                if self.buffer.chars().count() >= self.max_buffer_len {
                    debug!("Буфер заполнен ({} символов), '{}' проигнорирован", self.max_buffer_len, ch);
                    return TypingStep::Ignored;
                }
                self.buffer.extend(ch.to_lowercase());
                debug!("KEY: '{}' -> buffer='{}'", ch, self.buffer);

                match self.current_match() {
                    MatchResult::Unique(window) => self.resolve(window),
                    other => TypingStep::Pending(other),
                }
            }
            KeyInput::Other(_) => TypingStep::Ignored,
        }
    }

    fn resolve(&mut self, window: &'a WindowRecord) -> TypingStep<'a> {
        self.state = TypingState::Resolved;
        TypingStep::Resolved(window)
    }
}

/// Следующий кандидат после активного окна (с переходом в начало),
/// либо первый кандидат, если активное окно не среди них.
pub fn cycle_target<'a>(candidates: &[&'a WindowRecord], active: Option<WindowId>) -> Option<&'a WindowRecord> {
    let first = *candidates.first()?;
    let position = active.and_then(|active| candidates.iter().position(|w| w.id == active));

    match position {
        Some(pos) => Some(candidates[(pos + 1) % candidates.len()]),
        None => Some(first),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyedStep<'a> {
    Selected(&'a WindowRecord),
    Ignored,
    Cancelled,
}

/// Привязка клавиш алфавита к кандидатам в порядке обнаружения
#[derive(Debug, Clone)]
pub struct KeyedSelection<'a> {
    bindings: Vec<(char, &'a WindowRecord)>,
}

impl<'a> KeyedSelection<'a> {
    /// Если клавиш меньше, чем кандидатов, выбор невозможен.
    pub fn new(alphabet: &InstanceKeyAlphabet, candidates: &[&'a WindowRecord]) -> Result<Self> {
        if alphabet.len() < candidates.len() {
            return Err(LeapError::AlphabetTooShort {
                candidates: candidates.len(),
                keys: alphabet.len(),
            });
        }

        let bindings = alphabet
            .keys()
            .iter()
            .copied()
            .zip(candidates.iter().copied())
            .collect();

        Ok(Self { bindings })
    }

    pub fn bindings(&self) -> &[(char, &'a WindowRecord)] {
        &self.bindings
    }

    pub fn feed(&self, key: KeyInput) -> KeyedStep<'a> {
        match key {
            KeyInput::Cancel => KeyedStep::Cancelled,
            KeyInput::Printable(ch) => {
                let typed = ch.to_lowercase().next().unwrap_or(ch);
                match self.bindings.iter().find(|(selector, _)| *selector == typed) {
                    Some((_, window)) => KeyedStep::Selected(window),
                    None => {
                        debug!("Ignored selector key '{}'", typed);
                        KeyedStep::Ignored
                    }
                }
            }
            _ => KeyedStep::Ignored,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkPolicy {
    /// Переход к следующему экземпляру относительно активного окна
    Cycle,
    /// Явный выбор экземпляра клавишей из instance_keys
    Keyed,
}

#[derive(Debug)]
pub enum MarkDecision<'a> {
    NoCandidates,
    Activate(&'a WindowRecord),
    SelectByKey(KeyedSelection<'a>),
}

pub fn decide_mark<'a>(
    candidates: &[&'a WindowRecord],
    policy: MarkPolicy,
    active: Option<WindowId>,
    alphabet: &InstanceKeyAlphabet,
) -> Result<MarkDecision<'a>> {
    match candidates {
        [] => Ok(MarkDecision::NoCandidates),
        [only] => Ok(MarkDecision::Activate(only)),
        _ => match policy {
            MarkPolicy::Cycle => Ok(cycle_target(candidates, active)
                .map(MarkDecision::Activate)
                .unwrap_or(MarkDecision::NoCandidates)),
            MarkPolicy::Keyed => KeyedSelection::new(alphabet, candidates).map(MarkDecision::SelectByKey),
        },
    }
}
