//! Fixed-size grid topology with 4-connected adjacency

use crate::core::error::{FieldError, Result};
use crate::core::types::CellCoord;

/// Orthogonal neighbor slots, in the order the engine visits them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    North,
    South,
    West,
    East,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::South,
        Direction::West,
        Direction::East,
    ];
}

/// Index space of a `width x height` grid. No wraparound, no diagonals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridTopology {
    width: usize,
    height: usize,
}

impl GridTopology {
    pub fn new(width: usize, height: usize) -> Result<Self> {
        if width == 0 || height == 0 || width.checked_mul(height).is_none() {
            return Err(FieldError::InvalidDimensions { width, height });
        }
        Ok(Self { width, height })
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.width * self.height
    }

    /// Always false; a topology cannot be constructed empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        false
    }

    #[inline]
    pub fn contains(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height
    }

    /// Row-major index of `(x, y)`
    #[inline]
    pub fn index(&self, x: usize, y: usize) -> Result<usize> {
        if self.contains(x, y) {
            Ok(y * self.width + x)
        } else {
            Err(FieldError::OutOfBounds { x, y })
        }
    }

    /// Inverse of `index`
    #[inline]
    pub fn coords(&self, idx: usize) -> Option<CellCoord> {
        if idx < self.len() {
            Some(CellCoord::new(idx % self.width, idx / self.width))
        } else {
            None
        }
    }

    /// Neighbor of `idx` in `dir`, or `None` at the boundary
    #[inline]
    pub fn neighbor(&self, idx: usize, dir: Direction) -> Option<usize> {
        let x = idx % self.width;
        let y = idx / self.width;
        match dir {
            Direction::North if y > 0 => Some(idx - self.width),
            Direction::South if y + 1 < self.height => Some(idx + self.width),
            Direction::West if x > 0 => Some(idx - 1),
            Direction::East if x + 1 < self.width => Some(idx + 1),
            _ => None,
        }
    }

    /// All four neighbor slots of `idx`; boundary slots are `None`
    #[inline]
    pub fn neighbor_slots(&self, idx: usize) -> [Option<usize>; 4] {
        Direction::ALL.map(|dir| self.neighbor(idx, dir))
    }

    /// Valid orthogonal neighbors of `idx` (0 to 4 of them)
    pub fn neighbors(&self, idx: usize) -> impl Iterator<Item = usize> {
        self.neighbor_slots(idx).into_iter().flatten()
    }

    /// Indices of the square of Chebyshev radius `radius` around `center`,
    /// clipped to the grid
    pub fn square(&self, center: CellCoord, radius: usize) -> Vec<usize> {
        let x0 = center.x.saturating_sub(radius);
        let y0 = center.y.saturating_sub(radius);
        let x1 = center.x.saturating_add(radius).min(self.width - 1);
        let y1 = center.y.saturating_add(radius).min(self.height - 1);

        let mut out = Vec::with_capacity((x1 + 1 - x0) * (y1 + 1 - y0));
        for y in y0..=y1 {
            for x in x0..=x1 {
                out.push(y * self.width + x);
            }
        }
        out
    }

    /// Grid center, rounding down
    pub fn center(&self) -> CellCoord {
        CellCoord::new(self.width / 2, self.height / 2)
    }
}
