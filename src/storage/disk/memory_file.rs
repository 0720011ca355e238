use std::collections::HashMap;

use crate::errors::FileError;
use crate::storage::disk::page_file::PageFile;
use crate::storage::page::{Page, PageId};

/// Volatile page file. Pages live in a map and are lost on drop.
///
/// Counts every read and write so callers can tell cache hits from real I/O.
pub struct MemFile {
    filename: String,
    pages: HashMap<PageId, Page>,
    next_page_id: PageId,
    reads: usize,
    writes: usize,
}

impl MemFile {
    pub fn new(filename: impl Into<String>) -> Self {
        MemFile {
            filename: filename.into(),
            pages: HashMap::new(),
            next_page_id: 0,
            reads: 0,
            writes: 0,
        }
    }

    /// Number of live (allocated and not deleted) pages
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn contains(&self, page_id: PageId) -> bool {
        self.pages.contains_key(&page_id)
    }

    /// Number of `read_page` calls served so far
    pub fn read_count(&self) -> usize {
        self.reads
    }

    /// Number of `write_page` calls served so far
    pub fn write_count(&self) -> usize {
        self.writes
    }

    fn not_found(&self, page_id: PageId) -> FileError {
        FileError::PageNotFound {
            filename: self.filename.clone(),
            page_id,
        }
    }
}

impl PageFile for MemFile {
    fn filename(&self) -> &str {
        &self.filename
    }

    fn read_page(&mut self, page_id: PageId, page: &mut Page) -> Result<(), FileError> {
        let stored = self
            .pages
            .get(&page_id)
            .ok_or_else(|| self.not_found(page_id))?;
        page.copy_from(stored);
        self.reads += 1;
        Ok(())
    }

    fn write_page(&mut self, page: &Page) -> Result<(), FileError> {
        let page_id = page.page_number();
        if !self.pages.contains_key(&page_id) {
            return Err(self.not_found(page_id));
        }
        self.pages.insert(page_id, page.clone());
        self.writes += 1;
        Ok(())
    }

    fn allocate_page(&mut self) -> Result<Page, FileError> {
        let page = Page::new(self.next_page_id);
        self.next_page_id += 1;
        self.pages.insert(page.page_number(), page.clone());
        Ok(page)
    }

    fn delete_page(&mut self, page_id: PageId) -> Result<(), FileError> {
        match self.pages.remove(&page_id) {
            Some(_) => Ok(()),
            None => Err(self.not_found(page_id)),
        }
    }
}
