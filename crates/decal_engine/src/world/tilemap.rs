use thiserror::Error;

/// Read-only view of the map's tile grid, consulted once when the floor mask is built
/// and by [`TileRaycaster`](super::TileRaycaster) for obstacle hits.
pub trait TileGrid {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    /// Tiles outside the grid count as walls.
    fn is_wall(&self, x: u32, y: u32) -> bool;
}

/// Tilemap origin convention:
/// - tile (0,0) occupies world `[0,1) x [0,1)`.
/// - the center of tile (x,y) is `(x + 0.5, y + 0.5)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tilemap {
    width: u32,
    height: u32,
    walls: Vec<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TilemapError {
    #[error("tile count mismatch: expected {expected}, got {actual}")]
    TileCountMismatch { expected: usize, actual: usize },
    #[error("row {row} has {actual} tiles, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        actual: usize,
    },
    #[error("unknown tile glyph {glyph:?} at column {column} of row {row}")]
    UnknownGlyph {
        glyph: char,
        row: usize,
        column: usize,
    },
}

impl Tilemap {
    pub fn new(width: u32, height: u32, walls: Vec<bool>) -> Result<Self, TilemapError> {
        let expected = width as usize * height as usize;
        let actual = walls.len();
        if expected != actual {
            return Err(TilemapError::TileCountMismatch { expected, actual });
        }
        Ok(Self {
            width,
            height,
            walls,
        })
    }

    pub fn all_floor(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            walls: vec![false; width as usize * height as usize],
        }
    }

    /// Builds a map from text rows, `#` for walls and `.` for floor.
    ///
    /// The first row is the top of the map (highest `y`), so the layout reads like it
    /// renders.
    pub fn from_rows(rows: &[&str]) -> Result<Self, TilemapError> {
        let height = rows.len();
        let width = rows.first().map(|row| row.chars().count()).unwrap_or(0);
        let mut walls = vec![false; width * height];
        for (row_index, row) in rows.iter().enumerate() {
            let actual = row.chars().count();
            if actual != width {
                return Err(TilemapError::RaggedRow {
                    row: row_index,
                    expected: width,
                    actual,
                });
            }
            let y = height - 1 - row_index;
            for (column, glyph) in row.chars().enumerate() {
                walls[y * width + column] = match glyph {
                    '#' => true,
                    '.' => false,
                    _ => {
                        return Err(TilemapError::UnknownGlyph {
                            glyph,
                            row: row_index,
                            column,
                        })
                    }
                };
            }
        }
        Self::new(width as u32, height as u32, walls)
    }

    pub fn index_of(&self, x: u32, y: u32) -> Option<usize> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    pub fn set_wall(&mut self, x: u32, y: u32, is_wall: bool) -> bool {
        let Some(index) = self.index_of(x, y) else {
            return false;
        };
        self.walls[index] = is_wall;
        true
    }
}

impl TileGrid for Tilemap {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn is_wall(&self, x: u32, y: u32) -> bool {
        self.index_of(x, y)
            .and_then(|index| self.walls.get(index).copied())
            .unwrap_or(true)
    }
}
