use std::collections::VecDeque;

use crate::grid::GridPosition;
use Direction::*;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right
}

impl Direction {
    pub fn offset(&self) -> (i32, i32) {
        match self {
            Up => (0, -1),
            Down => (0, 1),
            Left => (-1, 0),
            Right => (1, 0),
        }
    }
}

/// Head is the front of `body`, tail is the back.
#[derive(Clone, Debug)]
pub struct Snake {
    body: VecDeque<GridPosition>,
    direction: Direction,
}

impl Snake {
    /// Lays the body out in a straight line behind `head`, opposite to `direction`.
    pub fn new(head: GridPosition, size: usize, direction: Direction) -> Self {
        let (dx, dy) = direction.offset();

        let body = (0..size as i32)
            .map(|i| GridPosition::new(head.x - dx * i, head.y - dy * i))
            .collect();
        Snake { body, direction }
    }

    pub fn body(&self) -> &VecDeque<GridPosition> {
        &self.body
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn head(&self) -> GridPosition {
        self.body[0]
    }

    pub fn next_head(&self) -> GridPosition {
        self.head().step(self.direction)
    }

    pub fn occupies(&self, pos: GridPosition) -> bool {
        self.body.contains(&pos)
    }

    // Segments 1..len-1 only. The tail is never tested against the new head.
    pub fn hits_body(&self, pos: GridPosition) -> bool {
        let end = self.body.len().saturating_sub(1);
        self.body.range(1usize.min(end)..end).any(|seg| *seg == pos)
    }

    /// Translates the whole body one cell along the head's path and returns
    /// the cell the tail vacated.
    pub fn move_to(&mut self, new_head: GridPosition) -> Option<GridPosition> {
        self.body.push_front(new_head);
        self.body.pop_back()
    }

    /// Like `move_to`, but keeps the tail so the snake is one segment longer.
    pub fn grow_to(&mut self, new_head: GridPosition) {
        self.body.push_front(new_head);
    }

    pub fn set_direction(&mut self, new_direction: Direction) {
        self.direction = new_direction;
    }

    #[cfg(test)]
    pub fn get_direction(&self) -> Direction {
        self.direction
    }

    pub fn head_char(&self) -> char {
        match self.direction {
            Up => '^',
            Down => 'v',
            Left => '<',
            Right => '>',
        }
    }
}
