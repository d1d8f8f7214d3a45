// Copyright (c) 2026 rezky_nightky

use crossterm::style::Color;

use crate::cell::Cell;

#[derive(Clone, Debug)]
pub struct Frame {
    pub width: u16,
    pub height: u16,
    cells: Vec<Cell>,
    dirty_all: bool,
    dirty_map: Vec<bool>,
    dirty: Vec<usize>,
}

impl Frame {
    pub fn new(width: u16, height: u16, bg: Option<Color>) -> Self {
        let len = width as usize * height as usize;
        Self {
            width,
            height,
            cells: vec![Cell::blank(bg); len],
            dirty_all: true,
            dirty_map: vec![false; len],
            dirty: Vec::new(),
        }
    }

    pub fn is_dirty_all(&self) -> bool {
        self.dirty_all
    }

    pub fn has_changes(&self) -> bool {
        self.dirty_all || !self.dirty.is_empty()
    }

    pub fn dirty_indices(&self) -> &[usize] {
        &self.dirty
    }

    pub fn mark_all_dirty(&mut self) {
        self.dirty_all = true;
    }

    pub fn clear_dirty(&mut self) {
        for &i in &self.dirty {
            self.dirty_map[i] = false;
        }
        self.dirty.clear();
        self.dirty_all = false;
    }

    pub fn index(&self, x: u16, y: u16) -> Option<usize> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    pub fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        self.index(x, y).map(|i| &self.cells[i])
    }

    pub fn cell_at_index(&self, i: usize) -> Cell {
        self.cells[i]
    }

    pub fn set(&mut self, x: u16, y: u16, cell: Cell) {
        let Some(i) = self.index(x, y) else {
            return;
        };
        if self.cells[i] == cell {
            return;
        }
        self.cells[i] = cell;
        if !self.dirty_all && !self.dirty_map[i] {
            self.dirty_map[i] = true;
            self.dirty.push(i);
        }
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.chunks(self.width.max(1) as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn x_cell() -> Cell {
        Cell {
            ch: 'x',
            fg: None,
            bg: None,
        }
    }

    #[test]
    fn set_tracks_only_changed_cells() {
        let mut f = Frame::new(3, 2, None);
        assert!(f.is_dirty_all());
        f.clear_dirty();
        assert!(!f.has_changes());

        f.set(1, 1, x_cell());
        f.set(1, 1, x_cell());
        f.set(0, 0, Cell::blank(None));
        f.set(9, 9, x_cell());
        assert_eq!(f.dirty_indices(), &[4]);
        assert_eq!(f.get(1, 1).unwrap().ch, 'x');

        f.clear_dirty();
        assert!(!f.has_changes());
        f.mark_all_dirty();
        assert!(f.has_changes());
    }

    #[test]
    fn rows_split_by_width() {
        let f = Frame::new(4, 3, None);
        assert_eq!(f.rows().count(), 3);
        assert!(f.rows().all(|r| r.len() == 4));
    }
}
