// Copyright (c) 2026 rezky_nightky

use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(transparent)]
pub struct Pattern {
    rows: Vec<Vec<u8>>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PatternCell {
    pub row: usize,
    pub col: usize,
    pub color_index: u8,
}

impl Pattern {
    pub fn new(rows: Vec<Vec<u8>>) -> Self {
        Self { rows }
    }

    pub fn from_rows<const W: usize>(rows: &[[u8; W]]) -> Self {
        Self {
            rows: rows.iter().map(|r| r.to_vec()).collect(),
        }
    }

    pub fn rows(&self) -> usize {
        self.rows.len()
    }

    pub fn cols(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    pub fn cells(&self) -> impl Iterator<Item = PatternCell> + '_ {
        self.rows.iter().enumerate().flat_map(|(row, line)| {
            line.iter()
                .enumerate()
                .filter(|&(_, &v)| v != 0)
                .map(move |(col, &color_index)| PatternCell {
                    row,
                    col,
                    color_index,
                })
        })
    }

    pub fn filled(&self) -> usize {
        self.cells().count()
    }

    pub fn color_indices(&self) -> impl Iterator<Item = u8> + '_ {
        self.cells().map(|c| c.color_index)
    }
}

#[rustfmt::skip]
const SANTA: [[u8; 14]; 20] = [
    [0,0,0,0,1,1,1,1,1,1,0,0,0,0],
    [0,0,0,1,1,1,1,1,1,1,1,0,0,0],
    [0,0,1,2,2,2,2,2,2,2,2,1,0,0],
    [0,1,2,2,2,2,2,2,2,2,2,2,1,0],
    [0,1,2,3,3,2,2,2,2,3,3,2,1,0],
    [0,1,2,3,3,2,2,2,2,3,3,2,1,0],
    [0,1,2,2,2,4,2,2,4,2,2,2,1,0],
    [0,1,2,2,2,2,2,2,2,2,2,2,1,0],
    [0,0,1,2,2,5,5,5,5,2,2,1,0,0],
    [0,0,0,1,1,5,5,5,5,1,1,0,0,0],
    [0,0,1,1,1,1,5,5,1,1,1,1,0,0],
    [0,1,6,6,6,6,6,6,6,6,6,6,1,0],
    [1,6,6,6,6,6,6,6,6,6,6,6,6,1],
    [1,6,6,6,6,6,6,6,6,6,6,6,6,1],
    [1,6,6,6,6,6,6,6,6,6,6,6,6,1],
    [0,1,6,6,6,6,6,6,6,6,6,6,1,0],
    [0,0,1,7,7,6,6,6,6,7,7,1,0,0],
    [0,0,0,1,7,7,1,1,7,7,1,0,0,0],
    [0,0,0,1,7,7,1,1,7,7,1,0,0,0],
    [0,0,0,0,1,1,0,0,1,1,0,0,0,0],
];

// The trunk rows are one cell narrower than the crown; padded with a
// trailing zero so the grid stays rectangular.
#[rustfmt::skip]
const TREE: [[u8; 12]; 17] = [
    [0,0,0,0,0,8,8,0,0,0,0,0],
    [0,0,0,0,8,8,8,8,0,0,0,0],
    [0,0,0,8,8,8,8,8,8,0,0,0],
    [0,0,8,8,8,9,8,8,8,8,0,0],
    [0,8,8,8,8,8,8,8,8,8,8,0],
    [8,8,8,9,8,8,8,9,8,8,8,8],
    [0,0,8,8,8,8,8,8,8,8,0,0],
    [0,8,8,8,8,9,8,8,8,8,8,0],
    [8,8,8,8,8,8,8,8,8,8,8,8],
    [0,8,8,8,8,8,8,8,8,8,8,0],
    [0,0,8,8,9,8,8,9,8,8,0,0],
    [0,8,8,8,8,8,8,8,8,8,8,0],
    [8,8,8,9,8,8,8,8,9,8,8,8],
    [0,8,8,8,8,8,8,8,8,8,8,0],
    [0,0,0,10,10,10,10,10,0,0,0,0],
    [0,0,0,10,10,10,10,10,0,0,0,0],
    [0,0,0,10,10,10,10,10,0,0,0,0],
];

pub fn santa() -> Pattern {
    Pattern::from_rows(&SANTA)
}

pub fn tree() -> Pattern {
    Pattern::from_rows(&TREE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_patterns_have_expected_cell_counts() {
        assert_eq!(santa().filled(), 208);
        assert_eq!(tree().filled(), 137);
        assert_eq!((santa().rows(), santa().cols()), (20, 14));
        assert_eq!((tree().rows(), tree().cols()), (17, 12));
    }

    #[test]
    fn cells_skip_zeros_and_keep_coordinates() {
        let p = Pattern::new(vec![vec![0, 3], vec![5]]);
        let cells: Vec<_> = p.cells().collect();
        assert_eq!(
            cells,
            vec![
                PatternCell { row: 0, col: 1, color_index: 3 },
                PatternCell { row: 1, col: 0, color_index: 5 },
            ]
        );
        assert_eq!(p.cols(), 2);
    }
}
