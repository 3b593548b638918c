use crate::snake::Direction;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct GridPosition {
    pub x: i32,
    pub y: i32,
}

impl GridPosition {
    pub const fn new(x: i32, y: i32) -> Self {
        GridPosition { x, y }
    }

    pub fn step(self, direction: Direction) -> Self {
        let (dx, dy) = direction.offset();
        GridPosition { x: self.x + dx, y: self.y + dy }
    }
}

/// Board dimensions, measured in cells.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    pub width: i32,
    pub height: i32,
}

impl Grid {
    pub const fn new(width: i32, height: i32) -> Self {
        Grid { width, height }
    }

    pub fn contains(&self, pos: GridPosition) -> bool {
        (0..self.width).contains(&pos.x) && (0..self.height).contains(&pos.y)
    }

    pub fn cell_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Every cell, row by row.
    pub fn cells(&self) -> impl Iterator<Item = GridPosition> + '_ {
        (0..self.height).flat_map(move |y| (0..self.width).map(move |x| GridPosition::new(x, y)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snake::Direction::*;

    #[test]
    fn test_bounds_are_half_open() {
        let grid = Grid::new(20, 20);
        assert!(grid.contains(GridPosition::new(0, 0)));
        assert!(grid.contains(GridPosition::new(19, 19)));
        assert!(!grid.contains(GridPosition::new(20, 5)));
        assert!(!grid.contains(GridPosition::new(5, -1)));
    }

    #[test]
    fn test_step_moves_one_cell() {
        let pos = GridPosition::new(3, 3);
        assert_eq!(pos.step(Up), GridPosition::new(3, 2));
        assert_eq!(pos.step(Down), GridPosition::new(3, 4));
        assert_eq!(pos.step(Left), GridPosition::new(2, 3));
        assert_eq!(pos.step(Right), GridPosition::new(4, 3));
    }

    #[test]
    fn test_cells_covers_the_whole_grid() {
        let grid = Grid::new(4, 3);
        let cells: Vec<_> = grid.cells().collect();
        assert_eq!(cells.len(), grid.cell_count());
        assert_eq!(cells[0], GridPosition::new(0, 0));
        assert_eq!(cells[11], GridPosition::new(3, 2));
    }
}
