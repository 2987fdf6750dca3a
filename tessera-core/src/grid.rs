//! Dashboard grid geometry
//!
//! Windows are laid out row-major: slot `i` sits at column `i % columns`
//! and row `i / columns`, each window `window_width` characters wide and
//! `window_height` lines tall.

/// Geometry errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GridError {
    /// A dimension is zero
    ZeroSized,
    /// The full grid does not fit in 16-bit character coordinates
    TooLarge,
}

/// Upper-left corner of a window, in character units from the top-left
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Origin {
    pub column: u16,
    pub row: u16,
}

/// Fixed layout of the dashboard grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GridGeometry {
    columns: u16,
    rows: u16,
    window_width: u16,
    window_height: u16,
}

impl GridGeometry {
    /// Create a grid geometry
    ///
    /// Rejects any zero dimension, and grids whose far edge would not fit
    /// in a `u16` coordinate.
    pub fn new(
        columns: u16,
        rows: u16,
        window_width: u16,
        window_height: u16,
    ) -> Result<Self, GridError> {
        if columns == 0 || rows == 0 || window_width == 0 || window_height == 0 {
            return Err(GridError::ZeroSized);
        }
        columns
            .checked_mul(window_width)
            .ok_or(GridError::TooLarge)?;
        rows.checked_mul(window_height)
            .ok_or(GridError::TooLarge)?;

        Ok(Self {
            columns,
            rows,
            window_width,
            window_height,
        })
    }

    /// Number of windows the grid holds
    pub fn cells(&self) -> usize {
        self.columns as usize * self.rows as usize
    }

    /// Origin of the window for slot `index`
    ///
    /// Returns `None` past the last cell.
    pub fn origin(&self, index: usize) -> Option<Origin> {
        if index >= self.cells() {
            return None;
        }
        let columns = self.columns as usize;
        let column = (index % columns) as u16;
        let row = (index / columns) as u16;

        // Bounded by the checks in `new`
        Some(Origin {
            column: column * self.window_width,
            row: row * self.window_height,
        })
    }

    pub fn columns(&self) -> u16 {
        self.columns
    }

    pub fn rows(&self) -> u16 {
        self.rows
    }

    pub fn window_width(&self) -> u16 {
        self.window_width
    }

    pub fn window_height(&self) -> u16 {
        self.window_height
    }

    /// Total width in characters
    pub fn width(&self) -> u16 {
        self.columns * self.window_width
    }

    /// Total height in lines
    pub fn height(&self) -> u16 {
        self.rows * self.window_height
    }
}

impl Default for GridGeometry {
    /// Three by three grid of 20x8 windows
    fn default() -> Self {
        Self {
            columns: 3,
            rows: 3,
            window_width: 20,
            window_height: 8,
        }
    }
}
