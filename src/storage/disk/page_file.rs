use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;

use crate::errors::FileError;
use crate::storage::page::{Page, PageId};

/// A file of fixed size pages addressed by page id.
///
/// The buffer pool is the only component that should talk to a page file
/// while the file is registered in it. It reads pages into its own frames and
/// writes them back when they are evicted or flushed.
pub trait PageFile {
    /// Name used to identify the file in logs and errors
    fn filename(&self) -> &str;

    /// Reads `page_id` into the caller owned `page`, tagging it with its page number.
    /// Fails if the page does not exist in the file.
    fn read_page(&mut self, page_id: PageId, page: &mut Page) -> Result<(), FileError>;

    /// Persists `page` under its own page number.
    fn write_page(&mut self, page: &Page) -> Result<(), FileError>;

    /// Creates a new page with a fresh page id and returns its initial content.
    fn allocate_page(&mut self) -> Result<Page, FileError>;

    /// Permanently removes a page from the file.
    fn delete_page(&mut self, page_id: PageId) -> Result<(), FileError>;
}

/// Identity of an open page file. Two handles compare equal iff they share the same file.
pub type FileId = usize;

/// Shared handle to a page file.
///
/// Cloning the handle is cheap and keeps the file alive, which is what lets a
/// frame write its page back long after the caller that loaded it is gone.
#[derive(Clone)]
pub struct FileHandle(Rc<RefCell<dyn PageFile>>);

impl FileHandle {
    pub fn new<F: PageFile + 'static>(file: F) -> Self {
        FileHandle(Rc::new(RefCell::new(file)))
    }

    /// Wraps a file the caller keeps its own typed reference to
    pub fn from_shared<F: PageFile + 'static>(file: Rc<RefCell<F>>) -> Self {
        FileHandle(file)
    }

    pub fn id(&self) -> FileId {
        Rc::as_ptr(&self.0) as *const () as usize
    }

    pub fn filename(&self) -> String {
        self.0.borrow().filename().to_owned()
    }

    pub fn borrow(&self) -> Ref<'_, dyn PageFile> {
        self.0.borrow()
    }

    pub fn borrow_mut(&self) -> RefMut<'_, dyn PageFile> {
        self.0.borrow_mut()
    }
}

impl PartialEq for FileHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl Eq for FileHandle {}

impl fmt::Debug for FileHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FileHandle({})", self.filename())
    }
}
