use crate::events::{RawWindow, WindowRecord};
use tracing::{debug, warn};

/// Снимок списка окон, снятый один раз за запуск, в порядке обнаружения.
#[derive(Debug, Clone, Default)]
pub struct WindowSnapshot {
    windows: Vec<WindowRecord>,
}

impl WindowSnapshot {
    /// Окна без класса выбрасываются; всё сверх `max_windows` отрезается.
    pub fn from_raw(raw: Vec<RawWindow>, max_windows: usize) -> Self {
        let total = raw.len();
        let mut windows = Vec::with_capacity(total.min(max_windows));

        for entry in raw {
            if windows.len() >= max_windows {
                warn!("Достигнут предел в {} окон, остальные отброшены", max_windows);
                break;
            }
            let id = entry.id;
            match WindowRecord::from_raw(entry) {
                Some(record) => windows.push(record),
                None => debug!("Окно {} без WM_CLASS пропущено", id),
            }
        }

        debug!("В снимок попало {} из {} окон", windows.len(), total);
        Self { windows }
    }

    pub fn windows(&self) -> &[WindowRecord] {
        &self.windows
    }

    pub fn get(&self, index: usize) -> Option<&WindowRecord> {
        self.windows.get(index)
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classless_windows_excluded() {
        let mut broken = RawWindow::new(2, "x");
        broken.class = None;
        let snapshot = WindowSnapshot::from_raw(
            vec![RawWindow::new(1, "Firefox"), broken, RawWindow::new(3, "Alacritty")],
            256,
        );
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.windows()[1].class, "Alacritty");
    }

    #[test]
    fn test_cap_counts_accepted_windows() {
        let mut broken = RawWindow::new(1, "x");
        broken.class = None;
        let raw = vec![
            broken,
            RawWindow::new(2, "a"),
            RawWindow::new(3, "b"),
            RawWindow::new(4, "c"),
        ];
        let snapshot = WindowSnapshot::from_raw(raw, 2);
        let ids: Vec<u32> = snapshot.windows().iter().map(|w| w.id.0).collect();
        assert_eq!(ids, vec![2, 3]);
    }
}
