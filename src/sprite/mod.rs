pub mod animation;

/// Frames per row of a character sheet.
pub const COLS: u32 = 6;
/// Rows per character sheet.
pub const ROWS: u32 = 4;
/// Width of one animation frame in sheet pixels.
pub const FRAME_WIDTH: u32 = 750;
/// Height of one animation frame in sheet pixels.
pub const FRAME_HEIGHT: u32 = 720;

/// Which of the two character sheets is on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Character {
    #[default]
    Ame,
    Kfc,
}

impl Character {
    pub fn toggled(self) -> Self {
        match self {
            Character::Ame => Character::Kfc,
            Character::Kfc => Character::Ame,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Character::Ame => "Ame",
            Character::Kfc => "KFC",
        }
    }
}

/// Pixel rectangle of one frame inside a sheet. `right`/`bottom` are exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceRect {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

impl SourceRect {
    /// Rectangle for a 1-based `(column, row)` cell.
    pub fn for_cell(column: u32, row: u32) -> Self {
        let left = (column - 1) * FRAME_WIDTH;
        let top = (row - 1) * FRAME_HEIGHT;
        Self {
            left,
            top,
            right: left + FRAME_WIDTH,
            bottom: top + FRAME_HEIGHT,
        }
    }

    pub fn width(&self) -> u32 {
        self.right - self.left
    }

    pub fn height(&self) -> u32 {
        self.bottom - self.top
    }

    /// Normalized `[u0, v0, u1, v1]` for a sheet of the given size.
    pub fn uv(&self, sheet_w: u32, sheet_h: u32) -> [f32; 4] {
        let w = sheet_w.max(1) as f32;
        let h = sheet_h.max(1) as f32;
        [
            self.left as f32 / w,
            self.top as f32 / h,
            self.right as f32 / w,
            self.bottom as f32 / h,
        ]
    }
}

/// Smallest sheet that holds the full `ROWS x COLS` grid.
pub fn required_sheet_size() -> (u32, u32) {
    (COLS * FRAME_WIDTH, ROWS * FRAME_HEIGHT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_is_an_involution() {
        for c in [Character::Ame, Character::Kfc] {
            assert_ne!(c.toggled(), c);
            assert_eq!(c.toggled().toggled(), c);
        }
    }

    #[test]
    fn first_and_last_cells() {
        assert_eq!(
            SourceRect::for_cell(1, 1),
            SourceRect { left: 0, top: 0, right: 750, bottom: 720 }
        );
        assert_eq!(
            SourceRect::for_cell(COLS, ROWS),
            SourceRect { left: 3750, top: 2160, right: 4500, bottom: 2880 }
        );
    }

    #[test]
    fn cells_tile_the_sheet() {
        let (w, h) = required_sheet_size();
        let last = SourceRect::for_cell(COLS, ROWS);
        assert_eq!((last.right, last.bottom), (w, h));
        assert_eq!(last.width(), FRAME_WIDTH);
        assert_eq!(last.height(), FRAME_HEIGHT);
    }

    #[test]
    fn uv_of_second_column() {
        let (w, h) = required_sheet_size();
        let uv = SourceRect::for_cell(2, 1).uv(w, h);
        assert!((uv[0] - 1.0 / 6.0).abs() < 1e-6);
        assert!((uv[2] - 2.0 / 6.0).abs() < 1e-6);
        assert_eq!(uv[1], 0.0);
        assert!((uv[3] - 0.25).abs() < 1e-6);
    }
}
