use serde::{Deserialize, Serialize};

use crate::cell::{parse_cell, CellCode};
use crate::intent::{AstralObject, ClearIntent, ObjectIntent};

/// Target layout as returned by the goal endpoint. Read-only once fetched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GoalGrid {
    rows: Vec<Vec<String>>,
}

impl GoalGrid {
    pub fn new(rows: Vec<Vec<String>>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Width of the widest row.
    pub fn column_count(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// Side of the square region the clearer sweeps.
    pub fn grid_size(&self) -> usize {
        self.row_count().max(self.column_count())
    }

    pub fn is_empty(&self) -> bool {
        self.grid_size() == 0
    }

    /// Every cell in row-major order, decoded.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize, CellCode)> + '_ {
        self.rows.iter().enumerate().flat_map(|(row, cells)| {
            cells
                .iter()
                .enumerate()
                .map(move |(column, raw)| (row, column, parse_cell(raw)))
        })
    }

    /// Creation intents for every non-empty cell, row-major.
    ///
    /// Unrecognized cells are logged and dropped.
    pub fn intents(&self) -> Vec<ObjectIntent> {
        let mut intents = Vec::new();
        for (row, column, cell) in self.cells() {
            if let CellCode::Unknown(raw) = &cell {
                tracing::warn!(row, column, cell = %raw, "ignoring unrecognized goal cell");
                continue;
            }
            if let Some(object) = AstralObject::from_cell(&cell) {
                intents.push(ObjectIntent::new(row, column, object));
            }
        }
        intents
    }
}

/// Every (row, column) of the `size` × `size` square, row-major.
pub fn clear_region(size: usize) -> impl Iterator<Item = ClearIntent> {
    (0..size).flat_map(move |row| (0..size).map(move |column| ClearIntent { row, column }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::{ComethDirection, SoloonColor};

    fn grid(rows: &[&[&str]]) -> GoalGrid {
        GoalGrid::new(
            rows.iter()
                .map(|r| r.iter().map(|c| c.to_string()).collect())
                .collect(),
        )
    }

    #[test]
    fn test_grid_size_is_max_dimension() {
        let g = grid(&[&["SPACE", "SPACE", "SPACE"], &["SPACE", "SPACE", "SPACE"]]);
        assert_eq!(g.row_count(), 2);
        assert_eq!(g.column_count(), 3);
        assert_eq!(g.grid_size(), 3);
    }

    #[test]
    fn test_ragged_grid_uses_widest_row() {
        let g = grid(&[&["SPACE"], &["SPACE", "SPACE", "SPACE", "POLYANET"]]);
        assert_eq!(g.grid_size(), 4);
    }

    #[test]
    fn test_empty_grid() {
        let g = GoalGrid::default();
        assert_eq!(g.grid_size(), 0);
        assert!(g.is_empty());
        assert!(g.intents().is_empty());
    }

    #[test]
    fn test_intents_row_major_and_skip_empty() {
        let g = grid(&[
            &["SPACE", "POLYANET", "MOON"],
            &["SOLOON_BLUE", "SPACE", "COMETH_UP"],
        ]);
        let intents = g.intents();
        assert_eq!(
            intents,
            vec![
                ObjectIntent::new(0, 1, AstralObject::Polyanet),
                ObjectIntent::new(1, 0, AstralObject::Soloon { color: SoloonColor::Blue }),
                ObjectIntent::new(1, 2, AstralObject::Cometh { direction: ComethDirection::Up }),
            ]
        );
    }

    #[test]
    fn test_goal_grid_deserializes_from_nested_arrays() {
        let g: GoalGrid = serde_json::from_str(r#"[["SPACE","POLYANET"],["SPACE","SPACE"]]"#).unwrap();
        assert_eq!(g.row_count(), 2);
        assert_eq!(g.intents(), vec![ObjectIntent::new(0, 1, AstralObject::Polyanet)]);
    }

    #[test]
    fn test_clear_region_covers_square_once() {
        for n in 0..6 {
            let cells: Vec<_> = clear_region(n).map(|c| (c.row, c.column)).collect();
            assert_eq!(cells.len(), n * n);
            let unique: std::collections::HashSet<_> = cells.iter().copied().collect();
            assert_eq!(unique.len(), n * n);
            assert!(cells.iter().all(|&(r, c)| r < n && c < n));
        }
    }
}
