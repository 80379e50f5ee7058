use super::prefix::IdentifierTable;
use super::snapshot::WindowSnapshot;
use crate::events::WindowRecord;
use smallvec::SmallVec;

pub type Candidates<'a> = SmallVec<[&'a WindowRecord; 8]>;

/// Результат одной попытки сопоставления
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchResult<'a> {
    NoMatch,
    Unique(&'a WindowRecord),
    Ambiguous(Candidates<'a>),
}

impl<'a> MatchResult<'a> {
    pub fn from_candidates(mut candidates: Candidates<'a>) -> Self {
        match candidates.len() {
            0 => MatchResult::NoMatch,
            1 => MatchResult::Unique(candidates.remove(0)),
            _ => MatchResult::Ambiguous(candidates),
        }
    }

    pub fn count(&self) -> usize {
        match self {
            MatchResult::NoMatch => 0,
            MatchResult::Unique(_) => 1,
            MatchResult::Ambiguous(candidates) => candidates.len(),
        }
    }

    #[cfg(test)]
    pub fn unique(&self) -> Option<&'a WindowRecord> {
        match self {
            MatchResult::Unique(window) => Some(*window),
            _ => None,
        }
    }
}

/// Окна, для которых буфер является префиксом идентификатора (без учёта регистра).
///
/// Пустой буфер подходит ко всем окнам и всегда даёт `Ambiguous`.
pub fn match_prefix<'a>(
    buffer: &str,
    table: &IdentifierTable,
    snapshot: &'a WindowSnapshot,
) -> MatchResult<'a> {
    let all = || {
        table
            .entries()
            .iter()
            .filter_map(|entry| snapshot.get(entry.index))
            .collect::<Candidates<'a>>()
    };

    if buffer.is_empty() {
        return MatchResult::Ambiguous(all());
    }

    let needle = buffer.to_lowercase();
    let candidates: Candidates<'a> = table
        .entries()
        .iter()
        .filter(|entry| entry.identifier.to_lowercase().starts_with(&needle))
        .filter_map(|entry| snapshot.get(entry.index))
        .collect();

    MatchResult::from_candidates(candidates)
}

/// Область поиска окон по метке
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkspaceScope {
    Global,
    /// Только текущий рабочий стол; при `None` стол неизвестен и подходящих окон нет
    Current(Option<u32>),
}

/// Окна с точно таким же классом (без учёта регистра) в порядке обнаружения.
pub fn match_class<'a>(
    target_class: &str,
    snapshot: &'a WindowSnapshot,
    scope: WorkspaceScope,
) -> Candidates<'a> {
    snapshot
        .windows()
        .iter()
        .filter(|window| window.has_class(target_class))
        .filter(|window| match scope {
            WorkspaceScope::Global => true,
            WorkspaceScope::Current(None) => false,
            WorkspaceScope::Current(Some(current)) => window.workspace == Some(current),
        })
        .collect()
}
