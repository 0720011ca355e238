use std::collections::hash_map::Entry;
use std::collections::HashMap;

use super::frame::FrameId;
use crate::errors::PageTableError;
use crate::storage::disk::FileId;
use crate::storage::PageId;

/// Maps (file, page id) to the frame caching that page.
///
/// Holds an entry for every valid frame and for nothing else. Keeping it in
/// step with the frame descriptors is the job of the buffer pool.
pub struct PageTable {
    entries: HashMap<(FileId, PageId), FrameId>,
}

impl PageTable {
    pub fn with_capacity(pool_size: usize) -> Self {
        // Some headroom so a full pool does not sit right at the resize threshold
        let capacity = pool_size + pool_size / 5 + 1;
        PageTable {
            entries: HashMap::with_capacity(capacity),
        }
    }

    pub fn lookup(&self, file: FileId, page_id: PageId) -> Option<FrameId> {
        self.entries.get(&(file, page_id)).copied()
    }

    pub fn insert(
        &mut self,
        file: FileId,
        page_id: PageId,
        frame_id: FrameId,
    ) -> Result<(), PageTableError> {
        match self.entries.entry((file, page_id)) {
            Entry::Occupied(entry) => Err(PageTableError::DuplicateKey {
                page_id,
                frame_id: *entry.get(),
            }),
            Entry::Vacant(entry) => {
                entry.insert(frame_id);
                Ok(())
            }
        }
    }

    /// Removes the entry and returns the frame it pointed to
    pub fn remove(&mut self, file: FileId, page_id: PageId) -> Result<FrameId, PageTableError> {
        self.entries
            .remove(&(file, page_id))
            .ok_or(PageTableError::NotFound { page_id })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
