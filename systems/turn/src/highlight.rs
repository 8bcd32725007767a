//! Selectable tiles and enemy markers offered during target selection.

use fog_tactics_core::{GridCoord, UnitId};

/// Single entry of a [`HighlightSet`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Highlight {
    /// A destination tile offered by the move submenu.
    Tile(GridCoord),
    /// An enemy offered by the attack submenu.
    EnemyMarker(UnitId),
}

/// Ordered, duplicate-free collection of highlights.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HighlightSet {
    entries: Vec<Highlight>,
}

impl HighlightSet {
    /// Replaces the current entries with `highlights`, dropping duplicates.
    pub fn replace_with<I>(&mut self, highlights: I)
    where
        I: IntoIterator<Item = Highlight>,
    {
        self.entries.clear();
        for highlight in highlights {
            if !self.entries.contains(&highlight) {
                self.entries.push(highlight);
            }
        }
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Drops the marker belonging to `unit`. Returns whether one was present.
    pub fn remove_unit(&mut self, unit: UnitId) -> bool {
        let before = self.entries.len();
        self.entries
            .retain(|entry| *entry != Highlight::EnemyMarker(unit));
        self.entries.len() != before
    }

    /// Reports whether `cell` is offered as a destination.
    #[must_use]
    pub fn contains_tile(&self, cell: GridCoord) -> bool {
        self.entries.contains(&Highlight::Tile(cell))
    }

    /// Reports whether `unit` is offered as a target.
    #[must_use]
    pub fn contains_enemy(&self, unit: UnitId) -> bool {
        self.entries.contains(&Highlight::EnemyMarker(unit))
    }

    /// Iterates over the entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Highlight> {
        self.entries.iter()
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Reports whether the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
