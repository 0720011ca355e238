use std::fmt;

use crate::storage::disk::FileHandle;
use crate::storage::PageId;

/// The Buffer Pool frame id for internal use only. It is not associated with the page id.
pub type FrameId = usize;

/// Bookkeeping for one frame of the buffer pool.
///
/// A frame is either free (`valid == false`) or caches exactly one page of
/// `file`. A cached frame with `pin_count > 0` is in use and never evicted.
pub struct FrameDescriptor {
    pub(super) frame_id: FrameId,
    /// The file owning the cached page. None while the frame is free.
    pub(super) file: Option<FileHandle>,
    pub(super) page_id: PageId,
    /// How many callers hold this page. A page can only be evicted if pin_count is 0.
    pub(super) pin_count: u32,
    /// The cached copy differs from the one in the file
    pub(super) dirty: bool,
    pub(super) valid: bool,
    /// Reference bit of the clock. Set on every access, cleared by the clock sweep.
    pub(super) ref_bit: bool,
}

impl FrameDescriptor {
    pub fn new(frame_id: FrameId) -> Self {
        FrameDescriptor {
            frame_id,
            file: None,
            page_id: 0,
            pin_count: 0,
            dirty: false,
            valid: false,
            ref_bit: false,
        }
    }

    /// Occupies the frame with a freshly loaded page, pinned once
    pub(super) fn set(&mut self, file: FileHandle, page_id: PageId) {
        self.file = Some(file);
        self.page_id = page_id;
        self.pin_count = 1;
        self.dirty = false;
        self.valid = true;
        self.ref_bit = true;
    }

    /// Returns the frame to the free state
    pub(super) fn clear(&mut self) {
        self.file = None;
        self.page_id = 0;
        self.pin_count = 0;
        self.dirty = false;
        self.valid = false;
        self.ref_bit = false;
    }

    pub(super) fn belongs_to(&self, file: &FileHandle) -> bool {
        self.file.as_ref().is_some_and(|owner| owner == file)
    }

    pub(super) fn filename(&self) -> String {
        self.file
            .as_ref()
            .map(FileHandle::filename)
            .unwrap_or_default()
    }

    pub fn frame_id(&self) -> FrameId {
        self.frame_id
    }

    pub fn page_id(&self) -> Option<PageId> {
        self.valid.then_some(self.page_id)
    }

    pub fn pin_count(&self) -> u32 {
        self.pin_count
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn ref_bit(&self) -> bool {
        self.ref_bit
    }
}

impl fmt::Display for FrameDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "frame={} ", self.frame_id)?;
        match &self.file {
            Some(file) => write!(f, "file={} page={} ", file.filename(), self.page_id)?,
            None => write!(f, "file=- page=- ")?,
        }
        write!(
            f,
            "valid={} pin_count={} dirty={} ref_bit={}",
            self.valid, self.pin_count, self.dirty, self.ref_bit
        )
    }
}
