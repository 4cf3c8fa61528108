/// In-memory character grid the terminal backend paints from.
pub struct TextGrid {
    pub rows: u16,
    pub cols: u16,
    cells: Vec<char>,
}

impl TextGrid {
    pub fn new(rows: u16, cols: u16) -> Self {
        Self {
            rows,
            cols,
            cells: vec![' '; rows as usize * cols as usize],
        }
    }

    pub fn resize(&mut self, rows: u16, cols: u16) {
        *self = Self::new(rows, cols);
    }

    pub fn clear(&mut self) {
        self.cells.fill(' ');
    }

    /// Write text at (row, col), clipped to the grid.
    pub fn write_text(&mut self, row: u16, col: u16, text: &str) {
        for (i, ch) in text.chars().enumerate() {
            let Some(col) = col.checked_add(i as u16) else {
                break;
            };
            if col >= self.cols {
                break;
            }
            self.set_char(row, col, ch);
        }
    }

    /// Write text centered on `center_col`
    pub fn write_centered(&mut self, row: u16, center_col: u16, text: &str) {
        let half = (text.chars().count() / 2) as u16;
        self.write_text(row, center_col.saturating_sub(half), text);
    }

    pub fn set_char(&mut self, row: u16, col: u16, ch: char) {
        if row < self.rows && col < self.cols {
            let idx = row as usize * self.cols as usize + col as usize;
            self.cells[idx] = ch;
        }
    }

    pub fn get_char(&self, row: u16, col: u16) -> Option<char> {
        if row < self.rows && col < self.cols {
            Some(self.cells[row as usize * self.cols as usize + col as usize])
        } else {
            None
        }
    }

    pub fn line_as_str(&self, row: u16) -> String {
        if row >= self.rows {
            return String::new();
        }
        let start = row as usize * self.cols as usize;
        self.cells[start..start + self.cols as usize].iter().collect()
    }

    /// Draw a box around a region
    pub fn draw_box(&mut self, top: u16, left: u16, bottom: u16, right: u16) {
        self.set_char(top, left, '┌');
        self.set_char(top, right, '┐');
        self.set_char(bottom, left, '└');
        self.set_char(bottom, right, '┘');

        for col in left.saturating_add(1)..right {
            self.set_char(top, col, '─');
            self.set_char(bottom, col, '─');
        }

        for row in top.saturating_add(1)..bottom {
            self.set_char(row, left, '│');
            self.set_char(row, right, '│');
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_is_clipped() {
        let mut grid = TextGrid::new(2, 5);
        grid.write_text(0, 3, "abc");
        grid.write_text(5, 0, "ignored");
        assert_eq!(grid.line_as_str(0), "   ab");
        assert_eq!(grid.line_as_str(1), "     ");
        assert_eq!(grid.line_as_str(2), "");
    }

    #[test]
    fn test_draw_box() {
        let mut grid = TextGrid::new(3, 4);
        grid.draw_box(0, 0, 2, 3);
        assert_eq!(grid.line_as_str(0), "┌──┐");
        assert_eq!(grid.line_as_str(1), "│  │");
        assert_eq!(grid.line_as_str(2), "└──┘");
    }
}
