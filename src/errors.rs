use std::error::Error;

use crate::storage::buffer::FrameId;
use crate::storage::PageId;

#[derive(Debug)]
pub enum FileError {
    IOError(std::io::Error),
    /// The page was never allocated in the file, or it was deleted.
    PageNotFound { filename: String, page_id: PageId },
    /// The file holds more pages than a PageId can address.
    TooManyPages { filename: String, n_pages: u64 },
}

#[derive(Debug)]
pub enum PageTableError {
    /// No frame is registered for the (file, page) pair.
    NotFound { page_id: PageId },
    /// The (file, page) pair already maps to a frame.
    DuplicateKey { page_id: PageId, frame_id: FrameId },
}

#[derive(Debug)]
pub enum BufferPoolError {
    /// Every frame of the pool is pinned, so there is no frame to evict.
    PoolExhausted,
    /// The page was unpinned more times than it was pinned.
    PageNotPinned {
        filename: String,
        page_id: PageId,
        frame_id: FrameId,
    },
    /// The page is in use and the requested operation needs it unpinned.
    PagePinned {
        filename: String,
        page_id: PageId,
        frame_id: FrameId,
    },
    /// A frame claims to belong to a file but holds no valid page.
    BadBuffer {
        frame_id: FrameId,
        dirty: bool,
        valid: bool,
        ref_bit: bool,
    },
    /// The page table disagrees with the frame descriptors.
    PageTable(PageTableError),
    /// Derived error from the file holding the page
    File(FileError),
}

impl std::fmt::Display for FileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileError::IOError(err) => write!(f, "IO error: {}", err),
            FileError::PageNotFound { filename, page_id } => {
                write!(f, "Page {} not found in file {}", page_id, filename)
            }
            FileError::TooManyPages { filename, n_pages } => write!(
                f,
                "File {} has {} pages, more than a page id can address",
                filename, n_pages
            ),
        }
    }
}

impl std::fmt::Display for PageTableError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PageTableError::NotFound { page_id } => {
                write!(f, "Page {} has no entry in the page table", page_id)
            }
            PageTableError::DuplicateKey { page_id, frame_id } => write!(
                f,
                "Page {} is already mapped to frame {}",
                page_id, frame_id
            ),
        }
    }
}

impl std::fmt::Display for BufferPoolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BufferPoolError::PoolExhausted => {
                write!(f, "Buffer pool exhausted: all frames are pinned")
            }
            BufferPoolError::PageNotPinned {
                filename,
                page_id,
                frame_id,
            } => write!(
                f,
                "Page {} of file {} in frame {} is not pinned",
                page_id, filename, frame_id
            ),
            BufferPoolError::PagePinned {
                filename,
                page_id,
                frame_id,
            } => write!(
                f,
                "Page {} of file {} in frame {} is pinned",
                page_id, filename, frame_id
            ),
            BufferPoolError::BadBuffer {
                frame_id,
                dirty,
                valid,
                ref_bit,
            } => write!(
                f,
                "Bad buffer in frame {} (dirty={}, valid={}, ref_bit={})",
                frame_id, dirty, valid, ref_bit
            ),
            BufferPoolError::PageTable(err) => write!(f, "Page table error: {}", err),
            BufferPoolError::File(err) => write!(f, "File error: {}", err),
        }
    }
}

impl std::convert::From<std::io::Error> for FileError {
    fn from(err: std::io::Error) -> Self {
        FileError::IOError(err)
    }
}

impl std::convert::From<FileError> for BufferPoolError {
    fn from(err: FileError) -> Self {
        BufferPoolError::File(err)
    }
}

impl std::convert::From<PageTableError> for BufferPoolError {
    fn from(err: PageTableError) -> Self {
        BufferPoolError::PageTable(err)
    }
}

impl std::convert::From<BufferPoolError> for std::io::Error {
    fn from(err: BufferPoolError) -> Self {
        std::io::Error::new(std::io::ErrorKind::Other, err)
    }
}

impl Error for FileError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            FileError::IOError(err) => Some(err),
            FileError::PageNotFound { .. } | FileError::TooManyPages { .. } => None,
        }
    }
}

impl Error for PageTableError {}

impl Error for BufferPoolError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            BufferPoolError::PageTable(err) => Some(err),
            BufferPoolError::File(err) => Some(err),
            _ => None,
        }
    }
}
