use std::fmt;

use crate::config::PAGE_SIZE;

pub type PageId = u32;

/// A page worth of bytes tagged with the page number it was read from.
///
/// The buffer pool never looks inside `data`. Interpreting the bytes is left
/// to the access methods sitting on top of it.
#[derive(Clone, PartialEq, Eq)]
pub struct Page {
    number: PageId,
    /// Heap allocated buffer of exactly PAGE_SIZE bytes
    data: Box<[u8]>,
}

impl Page {
    /// Creates a zeroed page carrying the given page number
    pub fn new(number: PageId) -> Self {
        Page {
            number,
            data: vec![0u8; PAGE_SIZE].into_boxed_slice(),
        }
    }

    pub fn page_number(&self) -> PageId {
        self.number
    }

    pub fn set_page_number(&mut self, number: PageId) {
        self.number = number;
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Overwrites this page (number and content) with `other` without reallocating
    pub fn copy_from(&mut self, other: &Page) {
        self.number = other.number;
        self.data.copy_from_slice(&other.data);
    }
}

impl fmt::Debug for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Dumping 4K of bytes helps nobody
        f.debug_struct("Page")
            .field("number", &self.number)
            .field("len", &self.data.len())
            .finish()
    }
}
