//! Fog-of-war visibility field maintained by the world crate.

use fog_tactics_core::{grid_index, GridCoord};

/// Dense per-tile visibility bitmap derived from the living player units.
///
/// A tile is visible when its Manhattan distance to at least one player unit
/// does not exceed the radius. The bitmap is rebuilt from scratch on every
/// recompute; only the diamond around each player is visited.
#[derive(Clone, Debug, Default)]
pub(crate) struct FogField {
    columns: u32,
    rows: u32,
    radius: u32,
    visible: Vec<bool>,
}

impl FogField {
    /// Rebuilds the bitmap for a grid of the provided dimensions.
    pub(crate) fn recompute(&mut self, columns: u32, rows: u32, players: &[GridCoord], radius: u32) {
        let tile_count = usize::try_from(u64::from(columns) * u64::from(rows)).unwrap_or(0);
        if self.visible.len() != tile_count {
            self.visible = vec![false; tile_count];
        } else {
            self.visible.fill(false);
        }

        self.columns = columns;
        self.rows = rows;
        self.radius = radius;

        if tile_count == 0 {
            return;
        }

        for &player in players {
            let first_row = player.row().saturating_sub(radius);
            let last_row = player.row().saturating_add(radius).min(rows - 1);
            for row in first_row..=last_row {
                let remaining = radius - player.row().abs_diff(row);
                let first_column = player.column().saturating_sub(remaining);
                let last_column = player.column().saturating_add(remaining).min(columns - 1);
                for column in first_column..=last_column {
                    if let Some(index) = grid_index(GridCoord::new(column, row), columns, rows) {
                        self.visible[index] = true;
                    }
                }
            }
        }
    }

    pub(crate) fn cells(&self) -> &[bool] {
        &self.visible
    }

    pub(crate) fn is_visible(&self, cell: GridCoord) -> bool {
        grid_index(cell, self.columns, self.rows)
            .and_then(|index| self.visible.get(index).copied())
            .unwrap_or(false)
    }

    pub(crate) fn visible_count(&self) -> u32 {
        let count = self.visible.iter().filter(|visible| **visible).count();
        u32::try_from(count).unwrap_or(u32::MAX)
    }

    pub(crate) const fn radius(&self) -> u32 {
        self.radius
    }
}

#[cfg(test)]
mod tests {
    use super::FogField;
    use fog_tactics_core::GridCoord;

    #[test]
    fn visibility_matches_manhattan_radius_for_every_tile() {
        let players = [GridCoord::new(20, 20), GridCoord::new(0, 0)];
        let mut field = FogField::default();
        field.recompute(40, 40, &players, 10);

        for row in 0..40 {
            for column in 0..40 {
                let cell = GridCoord::new(column, row);
                let expected = players
                    .iter()
                    .any(|player| player.manhattan_distance(cell) <= 10);
                assert_eq!(field.is_visible(cell), expected, "tile {cell}");
            }
        }
    }

    #[test]
    fn recompute_clears_tiles_left_behind() {
        let mut field = FogField::default();
        field.recompute(10, 10, &[GridCoord::new(0, 0)], 2);
        assert!(field.is_visible(GridCoord::new(1, 1)));

        field.recompute(10, 10, &[GridCoord::new(9, 9)], 2);
        assert!(!field.is_visible(GridCoord::new(1, 1)));
        assert!(field.is_visible(GridCoord::new(8, 8)));
        assert_eq!(field.visible_count(), 6);
    }

    #[test]
    fn no_players_hides_everything() {
        let mut field = FogField::default();
        field.recompute(5, 5, &[], 10);
        assert_eq!(field.visible_count(), 0);
        assert!(!field.is_visible(GridCoord::new(2, 2)));
    }
}
