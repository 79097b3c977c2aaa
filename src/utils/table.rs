/// A simple text table for terminal output
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    col_widths: Vec<usize>,
    max_width: Option<usize>,
}

impl Table {
    /// Create a new table with the given headers
    pub fn new(headers: Vec<&str>) -> Self {
        let col_widths = headers.iter().map(|h| h.chars().count()).collect();
        let headers = headers.iter().map(|h| h.to_string()).collect();
        Table {
            headers,
            rows: Vec::new(),
            col_widths,
            max_width: None,
        }
    }

    /// Truncate every cell to at most `width` characters
    pub fn with_max_width(mut self, width: usize) -> Self {
        self.max_width = Some(width.max(2));
        self
    }

    /// Add a row to the table
    pub fn add_row(&mut self, row: Vec<&str>) {
        let row_strings: Vec<String> = row.iter().map(|s| self.truncate(s)).collect();

        // Update column widths if needed
        for (i, col) in row_strings.iter().enumerate() {
            if i < self.col_widths.len() {
                self.col_widths[i] = self.col_widths[i].max(col.chars().count());
            }
        }

        self.rows.push(row_strings);
    }

    /// Render the table as a formatted string
    pub fn render(&self) -> String {
        let mut output = String::new();

        output.push_str(&self.render_row(&self.headers));
        output.push('\n');

        output.push_str(&self.render_separator());
        output.push('\n');

        for row in &self.rows {
            output.push_str(&self.render_row(row));
            output.push('\n');
        }

        output
    }

    fn truncate(&self, cell: &str) -> String {
        match self.max_width {
            Some(max) if cell.chars().count() > max => {
                let mut cut: String = cell.chars().take(max - 1).collect();
                cut.push('…');
                cut
            }
            _ => cell.to_string(),
        }
    }

    /// Render a single row with proper spacing.
    /// Padding counts characters, not bytes, so non-Latin titles line up.
    fn render_row(&self, row: &[String]) -> String {
        let mut line = String::new();
        for (i, col) in row.iter().enumerate() {
            if i < self.col_widths.len() {
                line.push_str(col);
                if i < row.len() - 1 {
                    let pad = self.col_widths[i].saturating_sub(col.chars().count());
                    line.push_str(&" ".repeat(pad));
                    line.push_str(" | ");
                }
            }
        }
        line
    }

    /// Render a separator line
    fn render_separator(&self) -> String {
        let mut line = String::new();
        for (i, &width) in self.col_widths.iter().enumerate() {
            line.push_str(&"-".repeat(width));
            if i < self.col_widths.len() - 1 {
                line.push_str("-+-");
            }
        }
        line
    }
}
