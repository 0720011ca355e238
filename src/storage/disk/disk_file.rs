use std::collections::BTreeSet;
use std::fs;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use crate::config::PAGE_SIZE;
use crate::errors::FileError;
use crate::storage::disk::page_file::PageFile;
use crate::storage::page::{Page, PageId};

/// Page file over any seekable byte stream. Page `n` lives at offset `n * PAGE_SIZE`.
///
/// The set of deleted pages is only kept in memory: reopening a file brings
/// every page below the end of the stream back to life.
pub struct DiskFile<F: Read + Write + Seek> {
    filename: String,
    inner: F,
    /// Number of page slots in the stream, deleted ones included
    n_pages: PageId,
    /// Deleted slots, reused lowest first by allocate_page
    deleted: BTreeSet<PageId>,
}

impl DiskFile<fs::File> {
    /// Opens (or creates) a page file on disk
    pub fn open(path: impl AsRef<Path>) -> Result<Self, FileError> {
        let path = path.as_ref();
        let file = fs::OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;

        DiskFile::from_reader(path.display().to_string(), file)
    }
}

impl<F: Read + Write + Seek> DiskFile<F> {
    /// Wraps an existing stream. A trailing partial page is ignored.
    pub fn from_reader(filename: impl Into<String>, mut inner: F) -> Result<Self, FileError> {
        let filename = filename.into();
        let len = inner.seek(SeekFrom::End(0))?;
        let n_pages = len / PAGE_SIZE as u64;
        let n_pages = PageId::try_from(n_pages)
            .map_err(|_| FileError::TooManyPages {
                filename: filename.clone(),
                n_pages,
            })?;

        log::debug!("Opened page file with {n_pages} pages");

        Ok(DiskFile {
            filename,
            inner,
            n_pages,
            deleted: BTreeSet::new(),
        })
    }

    /// Number of live pages
    pub fn page_count(&self) -> usize {
        self.n_pages as usize - self.deleted.len()
    }

    pub fn into_inner(self) -> F {
        self.inner
    }

    fn check_exists(&self, page_id: PageId) -> Result<(), FileError> {
        if page_id >= self.n_pages || self.deleted.contains(&page_id) {
            return Err(FileError::PageNotFound {
                filename: self.filename.clone(),
                page_id,
            });
        }
        Ok(())
    }

    fn write_at(&mut self, page_id: PageId, data: &[u8]) -> Result<(), FileError> {
        self.inner
            .seek(SeekFrom::Start(page_id_to_file_offset(page_id)))?;
        self.inner.write_all(data)?;
        Ok(())
    }
}

impl<F: Read + Write + Seek> PageFile for DiskFile<F> {
    fn filename(&self) -> &str {
        &self.filename
    }

    fn read_page(&mut self, page_id: PageId, page: &mut Page) -> Result<(), FileError> {
        self.check_exists(page_id)?;

        self.inner
            .seek(SeekFrom::Start(page_id_to_file_offset(page_id)))?;
        self.inner.read_exact(page.data_mut())?;
        page.set_page_number(page_id);
        Ok(())
    }

    fn write_page(&mut self, page: &Page) -> Result<(), FileError> {
        let page_id = page.page_number();
        self.check_exists(page_id)?;
        self.write_at(page_id, page.data())
    }

    fn allocate_page(&mut self) -> Result<Page, FileError> {
        let page_id = match self.deleted.first().copied() {
            Some(page_id) => page_id,
            // The last id is kept out of reach so n_pages never overflows
            None if self.n_pages == PageId::MAX => {
                return Err(FileError::TooManyPages {
                    filename: self.filename.clone(),
                    n_pages: self.n_pages as u64 + 1,
                })
            }
            None => self.n_pages,
        };

        let page = Page::new(page_id);
        // Zero the slot on disk first so a failed write leaves no half allocated page
        self.write_at(page_id, page.data())?;

        if !self.deleted.remove(&page_id) {
            self.n_pages += 1;
        }
        Ok(page)
    }

    fn delete_page(&mut self, page_id: PageId) -> Result<(), FileError> {
        self.check_exists(page_id)?;
        self.deleted.insert(page_id);
        Ok(())
    }
}

/* Utils */

fn page_id_to_file_offset(id: PageId) -> u64 {
    id as u64 * PAGE_SIZE as u64
}
