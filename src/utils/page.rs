/// Fixed-size pagination over an owned list
#[derive(Debug, Clone)]
pub struct Page<T> {
    items: Vec<T>,
    page_size: usize,
    current_page: usize,
}

impl<T> Page<T> {
    /// Create a new pagination starting on the first page
    pub fn new(items: Vec<T>, page_size: usize) -> Self {
        Page {
            items,
            page_size: page_size.max(1),
            current_page: 0,
        }
    }

    /// Items on the current page
    pub fn current(&self) -> &[T] {
        let start = self.current_page * self.page_size;
        let end = std::cmp::min(start + self.page_size, self.items.len());
        &self.items[start.min(end)..end]
    }

    /// Move to next page
    pub fn next(&mut self) -> bool {
        if !self.is_last() {
            self.current_page += 1;
            true
        } else {
            false
        }
    }

    /// Move to previous page
    pub fn previous(&mut self) -> bool {
        if self.current_page > 0 {
            self.current_page -= 1;
            true
        } else {
            false
        }
    }

    /// Jump to a 1-based page number
    pub fn goto(&mut self, page_num: usize) -> Result<(), String> {
        let total_pages = self.total_pages();
        if page_num < 1 || page_num > total_pages {
            return Err(format!(
                "❌ Invalid page number. This list has {} page(s)",
                total_pages
            ));
        }
        self.current_page = page_num - 1;
        Ok(())
    }

    /// Get total number of pages; an empty list still has one (empty) page
    pub fn total_pages(&self) -> usize {
        self.items.len().div_ceil(self.page_size).max(1)
    }

    /// 1-based number of the current page
    pub fn number(&self) -> usize {
        self.current_page + 1
    }

    pub fn total_items(&self) -> usize {
        self.items.len()
    }

    /// Check if on first page
    pub fn is_first(&self) -> bool {
        self.current_page == 0
    }

    /// Check if on last page
    pub fn is_last(&self) -> bool {
        self.current_page + 1 >= self.total_pages()
    }

    /// Pager line shown under the list
    pub fn pager_line(&self) -> String {
        format!(
            "{} Page {}/{} ({} items) {}",
            if self.is_first() { " " } else { "◀" },
            self.number(),
            self.total_pages(),
            self.total_items(),
            if self.is_last() { " " } else { "▶" },
        )
    }
}
