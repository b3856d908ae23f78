//! Fixed rectangular extent of a grid.

use crate::error::GridError;
use motif_core::GridPos;

/// The `cols × rows` extent of a grid.
///
/// Valid positions satisfy `0 <= x < cols` and `0 <= y < rows`.
///
/// # Examples
///
/// ```
/// use motif_core::GridPos;
/// use motif_grid::GridBounds;
///
/// let b = GridBounds::new(11, 7).unwrap();
/// assert_eq!(b.center(), GridPos::new(5, 3));
/// assert!(b.contains(GridPos::new(10, 6)));
/// assert_eq!(b.clamp(GridPos::new(-2, 9)), GridPos::new(0, 6));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GridBounds {
    cols: u32,
    rows: u32,
}

impl GridBounds {
    /// Maximum dimension size: coordinates use `i32`, so each axis must fit.
    pub const MAX_DIM: u32 = i32::MAX as u32;

    /// Create bounds of `cols` columns and `rows` rows.
    ///
    /// Returns `Err(GridError::EmptyGrid)` if either dimension is 0, or
    /// `Err(GridError::DimensionTooLarge)` if either exceeds `i32::MAX`.
    pub fn new(cols: u32, rows: u32) -> Result<Self, GridError> {
        if cols == 0 || rows == 0 {
            return Err(GridError::EmptyGrid { cols, rows });
        }
        if cols > Self::MAX_DIM {
            return Err(GridError::DimensionTooLarge {
                name: "cols",
                value: cols,
                max: Self::MAX_DIM,
            });
        }
        if rows > Self::MAX_DIM {
            return Err(GridError::DimensionTooLarge {
                name: "rows",
                value: rows,
                max: Self::MAX_DIM,
            });
        }
        Ok(Self { cols, rows })
    }

    /// Number of columns.
    pub fn cols(&self) -> u32 {
        self.cols
    }

    /// Number of rows.
    pub fn rows(&self) -> u32 {
        self.rows
    }

    /// Total number of positions.
    pub fn cell_count(&self) -> usize {
        self.cols as usize * self.rows as usize
    }

    /// Whether `pos` lies inside the grid.
    pub fn contains(&self, pos: GridPos) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as u32) < self.cols && (pos.y as u32) < self.rows
    }

    /// The nearest in-bounds position to `pos`.
    pub fn clamp(&self, pos: GridPos) -> GridPos {
        GridPos::new(pos.x.clamp(0, self.max_x()), pos.y.clamp(0, self.max_y()))
    }

    /// The middle position, `(cols / 2, rows / 2)` with integer division.
    pub fn center(&self) -> GridPos {
        GridPos::new((self.cols / 2) as i32, (self.rows / 2) as i32)
    }

    /// The four grid corners ordered top-left, top-right, bottom-left,
    /// bottom-right.
    pub fn corners(&self) -> [GridPos; 4] {
        [
            GridPos::new(0, 0),
            GridPos::new(self.max_x(), 0),
            GridPos::new(0, self.max_y()),
            GridPos::new(self.max_x(), self.max_y()),
        ]
    }

    /// Every position in row-major order (`y` outer, `x` inner).
    pub fn positions(&self) -> impl Iterator<Item = GridPos> + '_ {
        let cols = self.cols as i32;
        (0..self.rows as i32).flat_map(move |y| (0..cols).map(move |x| GridPos::new(x, y)))
    }

    /// Row-major index of `pos`, or `None` when out of bounds.
    pub fn index_of(&self, pos: GridPos) -> Option<usize> {
        self.contains(pos)
            .then(|| pos.y as usize * self.cols as usize + pos.x as usize)
    }

    fn max_x(&self) -> i32 {
        self.cols as i32 - 1
    }

    fn max_y(&self) -> i32 {
        self.rows as i32 - 1
    }
}
