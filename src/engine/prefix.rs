//! Кратчайшие уникальные префиксы классов приложений.
//!
//! Окна группируются по классу в нижнем регистре (в порядке первого появления).
//! Для каждой группы ищется минимальная длина `L`, при которой первые `L`
//! символов класса не совпадают с первыми `L` символами ни одного другого
//! класса. Если такой длины нет (класс целиком является префиксом другого),
//! берётся весь класс, и группа помечается как неоднозначная.
//!
//! Одно окно в группе получает голый префикс, а при нескольких к префиксу добавляется
//! порядковый номер с единицы: `f1`, `f2`.

use super::snapshot::WindowSnapshot;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppGroup {
    pub class_lower: String,
    /// Индексы окон в снимке, в порядке обнаружения
    pub members: Vec<usize>,
    pub prefix_len: usize,
    /// Префикс пришлось взять целиком, и он может совпасть с чужим
    pub fallback: bool,
}

impl AppGroup {
    pub fn prefix(&self) -> &str {
        head(&self.class_lower, self.prefix_len)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentifiedWindow {
    pub index: usize,
    pub identifier: String,
}

/// Идентификаторы окон одного снимка, упорядоченные по индексу окна.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentifierTable {
    groups: Vec<AppGroup>,
    entries: Vec<IdentifiedWindow>,
}

impl IdentifierTable {
    pub fn build(snapshot: &WindowSnapshot, max_groups: usize) -> Self {
        let mut groups = group_windows(snapshot, max_groups);

        let classes: Vec<String> = groups.iter().map(|g| g.class_lower.clone()).collect();
        for (i, group) in groups.iter_mut().enumerate() {
            let (len, fallback) = unique_prefix_len(&classes, i);
            group.prefix_len = len;
            group.fallback = fallback;
            if fallback {
                warn!(
                    "Класс '{}' является префиксом другого класса, идентификатор может быть неоднозначен",
                    group.class_lower
                );
            }
        }

        let mut entries = Vec::with_capacity(snapshot.len());
        for group in &groups {
            let prefix = group.prefix();
            if group.members.len() == 1 {
                entries.push(IdentifiedWindow {
                    index: group.members[0],
                    identifier: prefix.to_string(),
                });
            } else {
                for (ordinal, &index) in group.members.iter().enumerate() {
                    entries.push(IdentifiedWindow {
                        index,
                        identifier: format!("{}{}", prefix, ordinal + 1),
                    });
                }
            }
        }
        entries.sort_by_key(|entry| entry.index);

        let table = Self { groups, entries };
        table.log_table(snapshot);
        table
    }

    pub fn groups(&self) -> &[AppGroup] {
        &self.groups
    }

    pub fn entries(&self) -> &[IdentifiedWindow] {
        &self.entries
    }

    #[cfg(test)]
    pub fn identifier_for(&self, index: usize) -> Option<&str> {
        self.entries
            .iter()
            .find(|entry| entry.index == index)
            .map(|entry| entry.identifier.as_str())
    }

    fn log_table(&self, snapshot: &WindowSnapshot) {
        if !tracing::enabled!(tracing::Level::DEBUG) {
            return;
        }
        debug!("ТАБЛИЦА ПРЕФИКСОВ:");
        for entry in &self.entries {
            if let Some(window) = snapshot.get(entry.index) {
                debug!("  '{}' -> [{}] {}", entry.identifier, window.class, window.title);
            }
        }
    }
}

/// Группы сверх `max_groups` отбрасываются вместе со своими окнами.
pub fn group_windows(snapshot: &WindowSnapshot, max_groups: usize) -> Vec<AppGroup> {
    let mut groups: Vec<AppGroup> = Vec::new();

    for (index, window) in snapshot.windows().iter().enumerate() {
        let class_lower = window.class_lower();
        if let Some(group) = groups.iter_mut().find(|g| g.class_lower == class_lower) {
            group.members.push(index);
        } else if groups.len() < max_groups {
            groups.push(AppGroup {
                class_lower,
                members: vec![index],
                prefix_len: 0,
                fallback: false,
            });
        } else {
            debug!("Группа '{}' отброшена: предел в {} групп", class_lower, max_groups);
        }
    }

    groups
}

/// Длина префикса для `classes[target]` и признак того, что пришлось взять весь класс.
pub fn unique_prefix_len(classes: &[String], target: usize) -> (usize, bool) {
    let class = &classes[target];
    let class_len = class.chars().count();

    for len in 1..=class_len {
        let candidate = head(class, len);
        let clashes = classes
            .iter()
            .enumerate()
            .any(|(i, other)| i != target && head(other, len) == candidate);
        if !clashes {
            return (len, false);
        }
    }

    (class_len, true)
}

/// Первые `n` символов строки (или вся строка, если она короче).
fn head(s: &str, n: usize) -> &str {
    match s.char_indices().nth(n) {
        Some((byte_idx, _)) => &s[..byte_idx],
        None => s,
    }
}
