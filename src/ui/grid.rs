use ratatui::layout::{Constraint, Direction, Layout, Position, Rect};

use crate::session::TARGET_COUNT;

pub const ROWS: usize = 3;
pub const COLUMNS: usize = TARGET_COUNT / ROWS;

/// Splits the board area into one rect per target, row by row
pub fn cells(area: Rect) -> Vec<Rect> {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![Constraint::Ratio(1, ROWS as u32); ROWS])
        .split(area);

    rows.iter()
        .flat_map(|row| {
            Layout::default()
                .direction(Direction::Horizontal)
                .constraints(vec![Constraint::Ratio(1, COLUMNS as u32); COLUMNS])
                .split(*row)
                .to_vec()
        })
        .collect()
}

/// Which target, if any, sits under a terminal cell
pub fn target_at(area: Rect, column: u16, row: u16) -> Option<usize> {
    cells(area)
        .iter()
        .position(|cell| cell.contains(Position::new(column, row)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn twelve_cells_in_reading_order() {
        let area = Rect::new(0, 0, 40, 12);
        let cells = cells(area);
        assert_eq!(cells.len(), TARGET_COUNT);
        assert_eq!(cells[0], Rect::new(0, 0, 10, 4));
        assert_eq!(cells[3], Rect::new(30, 0, 10, 4));
        assert_eq!(cells[4], Rect::new(0, 4, 10, 4));
        assert_eq!(cells[11], Rect::new(30, 8, 10, 4));
    }

    #[test]
    fn hit_testing() {
        let area = Rect::new(2, 3, 40, 12);
        assert_eq!(target_at(area, 2, 3), Some(0));
        assert_eq!(target_at(area, 15, 8), Some(5));
        assert_eq!(target_at(area, 41, 14), Some(11));
        assert_eq!(target_at(area, 0, 0), None);
        assert_eq!(target_at(area, 42, 3), None);
    }
}
