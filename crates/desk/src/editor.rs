/// Plain multi-line text buffer with a char-indexed cursor.
#[derive(Debug, Clone)]
pub struct TextEditor {
    lines: Vec<String>,
    row: usize,
    col: usize,
}

impl TextEditor {
    pub fn new(text: &str) -> Self {
        let mut lines: Vec<String> = text.split('\n').map(str::to_string).collect();
        if lines.is_empty() {
            lines.push(String::new());
        }
        Self {
            lines,
            row: 0,
            col: 0,
        }
    }

    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn cursor(&self) -> (usize, usize) {
        (self.row, self.col)
    }

    fn line_len(&self, row: usize) -> usize {
        self.lines[row].chars().count()
    }

    fn byte_idx(&self, row: usize, col: usize) -> usize {
        self.lines[row]
            .char_indices()
            .nth(col)
            .map(|(i, _)| i)
            .unwrap_or(self.lines[row].len())
    }

    pub fn insert_char(&mut self, c: char) {
        let at = self.byte_idx(self.row, self.col);
        self.lines[self.row].insert(at, c);
        self.col += 1;
    }

    pub fn insert_str(&mut self, s: &str) {
        for c in s.chars() {
            match c {
                '\n' => self.newline(),
                '\r' => {}
                c => self.insert_char(c),
            }
        }
    }

    pub fn newline(&mut self) {
        let at = self.byte_idx(self.row, self.col);
        let rest = self.lines[self.row].split_off(at);
        self.lines.insert(self.row + 1, rest);
        self.row += 1;
        self.col = 0;
    }

    pub fn backspace(&mut self) {
        if self.col > 0 {
            let at = self.byte_idx(self.row, self.col - 1);
            self.lines[self.row].remove(at);
            self.col -= 1;
        } else if self.row > 0 {
            let line = self.lines.remove(self.row);
            self.row -= 1;
            self.col = self.line_len(self.row);
            self.lines[self.row].push_str(&line);
        }
    }

    pub fn delete(&mut self) {
        if self.col < self.line_len(self.row) {
            let at = self.byte_idx(self.row, self.col);
            self.lines[self.row].remove(at);
        } else if self.row + 1 < self.lines.len() {
            let next = self.lines.remove(self.row + 1);
            self.lines[self.row].push_str(&next);
        }
    }

    pub fn move_left(&mut self) {
        if self.col > 0 {
            self.col -= 1;
        } else if self.row > 0 {
            self.row -= 1;
            self.col = self.line_len(self.row);
        }
    }

    pub fn move_right(&mut self) {
        if self.col < self.line_len(self.row) {
            self.col += 1;
        } else if self.row + 1 < self.lines.len() {
            self.row += 1;
            self.col = 0;
        }
    }

    pub fn move_up(&mut self) {
        if self.row > 0 {
            self.row -= 1;
            self.col = self.col.min(self.line_len(self.row));
        }
    }

    pub fn move_down(&mut self) {
        if self.row + 1 < self.lines.len() {
            self.row += 1;
            self.col = self.col.min(self.line_len(self.row));
        }
    }

    pub fn home(&mut self) {
        self.col = 0;
    }

    pub fn end(&mut self) {
        self.col = self.line_len(self.row);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_text() {
        let e = TextEditor::new("{\n  'A': {}\n}");
        assert_eq!(e.lines().len(), 3);
        assert_eq!(e.text(), "{\n  'A': {}\n}");
    }

    #[test]
    fn inserts_and_splits_lines() {
        let mut e = TextEditor::new("ab");
        e.move_right();
        e.newline();
        e.insert_char('x');
        assert_eq!(e.text(), "a\nxb");
        assert_eq!(e.cursor(), (1, 1));
    }

    #[test]
    fn backspace_joins_lines() {
        let mut e = TextEditor::new("ab\ncd");
        e.move_down();
        e.backspace();
        assert_eq!(e.text(), "abcd");
        assert_eq!(e.cursor(), (0, 2));
    }

    #[test]
    fn delete_at_line_end_joins_next() {
        let mut e = TextEditor::new("ab\ncd");
        e.end();
        e.delete();
        assert_eq!(e.text(), "abcd");
    }

    #[test]
    fn handles_multibyte_chars() {
        let mut e = TextEditor::new("組合");
        e.end();
        e.insert_char('A');
        e.move_left();
        e.move_left();
        e.backspace();
        assert_eq!(e.text(), "合A");
    }

    #[test]
    fn vertical_moves_clamp_column() {
        let mut e = TextEditor::new("long line\nab");
        e.end();
        e.move_down();
        assert_eq!(e.cursor(), (1, 2));
    }

    #[test]
    fn pasted_text_keeps_newlines() {
        let mut e = TextEditor::new("");
        e.insert_str("{'A':\r\n {'X': 1}}");
        assert_eq!(e.text(), "{'A':\n {'X': 1}}");
    }
}
