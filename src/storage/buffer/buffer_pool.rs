use std::fmt;

use super::clock::ClockHand;
use super::frame::{FrameDescriptor, FrameId};
use super::page_table::PageTable;
use crate::config::BUFFER_POOL_N_FRAMES;
use crate::errors::{BufferPoolError, PageTableError};
use crate::storage::disk::FileHandle;
use crate::storage::{Page, PageId};

/// Fixed size cache of pages with clock (second chance) replacement.
///
/// Every page access of the storage layer goes through the buffer pool:
/// callers fetch or allocate a page, which pins it in its frame, and unpin it
/// once they are done, telling the pool whether they modified it. Unpinned
/// pages stay cached until the clock picks their frame for another page, at
/// which point dirty pages are written back to their file.
///
/// # Design principles
///
/// - Frames and their descriptors are allocated once in `new` and never resized.
/// - The page table and the descriptors change together inside each operation,
///   so a (file, page) pair has an entry iff a valid frame holds that page.
/// - Nothing is flushed implicitly. Dropping the pool discards dirty pages,
///   call `flush_file` first.
pub struct BufferPool {
    /// The size of the buffer pool in number of frames
    pool_size: usize,
    /// Page sized memory of every frame, indexed by FrameId
    frames: Box<[Page]>,
    /// Metadata of every frame, same indices as `frames`
    descriptors: Box<[FrameDescriptor]>,
    /// Maps (file, page id) to the frame caching it
    page_table: PageTable,
    clock: ClockHand,
}

impl BufferPool {
    /// Creates a new buffer pool manager with the given number of frames. Panics if it is 0.
    pub fn new(pool_size: usize) -> Self {
        assert!(pool_size > 0, "buffer pool needs at least one frame");

        log::debug!("Allocating buffer pool of {pool_size} frames");

        let frames = (0..pool_size).map(|_| Page::new(0)).collect();
        let descriptors = (0..pool_size).map(FrameDescriptor::new).collect();

        BufferPool {
            pool_size,
            frames,
            descriptors,
            page_table: PageTable::with_capacity(pool_size),
            clock: ClockHand::new(pool_size),
        }
    }

    /// Returns a frame that is free to be (re)populated, evicting a page if needed.
    ///
    /// The clock sweeps the frames starting after its last position. Free
    /// frames are taken right away. Frames with the reference bit set get a
    /// second chance: the bit is cleared and the sweep moves on. Pinned frames
    /// are skipped. The first unpinned, unreferenced frame is evicted, writing
    /// its page back first if it is dirty.
    ///
    /// Fails with `PoolExhausted` once a full revolution of the clock met only
    /// pinned frames.
    fn alloc_buf(&mut self) -> Result<FrameId, BufferPoolError> {
        let mut pinned_in_sweep = 0;
        let mut sweep_len = 0;

        loop {
            if sweep_len == self.pool_size {
                pinned_in_sweep = 0;
                sweep_len = 0;
            }
            sweep_len += 1;

            let frame_id = self.clock.advance();
            let desc = &mut self.descriptors[frame_id];

            if !desc.valid {
                log::trace!("Found free frame_id={frame_id}");
                return Ok(frame_id);
            }

            if desc.ref_bit {
                desc.ref_bit = false;
                continue;
            }

            if desc.pin_count > 0 {
                pinned_in_sweep += 1;
                if pinned_in_sweep == self.pool_size {
                    log::debug!("Every one of the {} frames is pinned", self.pool_size);
                    return Err(BufferPoolError::PoolExhausted);
                }
                continue;
            }

            let Some(file) = desc.file.clone() else {
                return Err(BufferPoolError::BadBuffer {
                    frame_id,
                    dirty: desc.dirty,
                    valid: desc.valid,
                    ref_bit: desc.ref_bit,
                });
            };

            if desc.dirty {
                log::debug!(
                    "Writing back page_id={} of {} before evicting frame_id={frame_id}",
                    desc.page_id,
                    file.filename()
                );
                let page = &mut self.frames[frame_id];
                // Callers hold `&mut Page`, so the frame's own number cannot be trusted
                page.set_page_number(desc.page_id);
                file.borrow_mut().write_page(page)?;
                desc.dirty = false;
            }

            match self.page_table.remove(file.id(), desc.page_id) {
                Ok(_) => {}
                Err(PageTableError::NotFound { page_id }) => {
                    log::debug!("Evicted page_id={page_id} had no page table entry");
                }
                Err(err) => return Err(err.into()),
            }

            log::debug!("Evicted page_id={} from frame_id={frame_id}", desc.page_id);
            desc.clear();
            return Ok(frame_id);
        }
    }

    /// Returns the page `page_id` of `file`, loading it if it is not cached, and pins it.
    ///
    /// Each successful call adds one pin that must be released with `unpin_page`.
    pub fn read_page(
        &mut self,
        file: &FileHandle,
        page_id: PageId,
    ) -> Result<&mut Page, BufferPoolError> {
        let frame_id = match self.page_table.lookup(file.id(), page_id) {
            Some(frame_id) => {
                log::trace!("Found page_id={page_id} in frame_id={frame_id}");
                let desc = &mut self.descriptors[frame_id];
                desc.ref_bit = true;
                desc.pin_count += 1;
                frame_id
            }
            None => {
                log::trace!("Page id={page_id} not found in buffer pool. Fetching from file");
                let frame_id = self.alloc_buf()?;

                file.borrow_mut()
                    .read_page(page_id, &mut self.frames[frame_id])?;
                self.page_table.insert(file.id(), page_id, frame_id)?;
                self.descriptors[frame_id].set(file.clone(), page_id);

                log::trace!("Loaded page_id={page_id} into frame_id={frame_id}");
                frame_id
            }
        };

        Ok(&mut self.frames[frame_id])
    }

    /// Releases one pin on a cached page, marking it dirty if `dirty` is set.
    ///
    /// Unpinning a page that is not cached only logs a warning. Unpinning a
    /// cached page that holds no pin fails with `PageNotPinned`.
    pub fn unpin_page(
        &mut self,
        file: &FileHandle,
        page_id: PageId,
        dirty: bool,
    ) -> Result<(), BufferPoolError> {
        let Some(frame_id) = self.page_table.lookup(file.id(), page_id) else {
            log::warn!(
                "Unpinning page_id={page_id} of {} which is not in the buffer pool",
                file.filename()
            );
            return Ok(());
        };

        let desc = &mut self.descriptors[frame_id];
        if desc.pin_count == 0 {
            return Err(BufferPoolError::PageNotPinned {
                filename: desc.filename(),
                page_id,
                frame_id,
            });
        }

        desc.pin_count -= 1;
        if dirty {
            desc.dirty = true;
        }
        Ok(())
    }

    /// Allocates a new page in `file`, caches it and pins it.
    ///
    /// Returns the new page id together with the cached page.
    pub fn alloc_page(
        &mut self,
        file: &FileHandle,
    ) -> Result<(PageId, &mut Page), BufferPoolError> {
        let page = file.borrow_mut().allocate_page()?;
        let page_id = page.page_number();

        let frame_id = self.alloc_buf()?;
        self.frames[frame_id].copy_from(&page);
        self.page_table.insert(file.id(), page_id, frame_id)?;
        self.descriptors[frame_id].set(file.clone(), page_id);

        log::trace!("Allocated page_id={page_id} into frame_id={frame_id}");
        Ok((page_id, &mut self.frames[frame_id]))
    }

    /// Deletes `page_id` from `file`, dropping its cached copy without writing it back.
    ///
    /// Disposal wins over pinning: a pinned page is discarded all the same,
    /// and the outstanding pins become stale.
    pub fn dispose_page(
        &mut self,
        file: &FileHandle,
        page_id: PageId,
    ) -> Result<(), BufferPoolError> {
        if let Ok(frame_id) = self.page_table.remove(file.id(), page_id) {
            let desc = &mut self.descriptors[frame_id];
            if desc.pin_count > 0 {
                log::warn!(
                    "Disposing page_id={page_id} of {} while it holds {} pins",
                    file.filename(),
                    desc.pin_count
                );
            }
            desc.clear();
        }

        file.borrow_mut().delete_page(page_id)?;
        Ok(())
    }

    /// Writes back every dirty page of `file` and evicts all its pages from the pool.
    ///
    /// Fails with `PagePinned` if one of its pages is in use. Frames visited
    /// before the failing one stay flushed.
    pub fn flush_file(&mut self, file: &FileHandle) -> Result<(), BufferPoolError> {
        log::debug!("Flushing {}", file.filename());

        for frame_id in 0..self.pool_size {
            let desc = &mut self.descriptors[frame_id];
            if !desc.belongs_to(file) {
                continue;
            }

            if !desc.valid {
                return Err(BufferPoolError::BadBuffer {
                    frame_id,
                    dirty: desc.dirty,
                    valid: desc.valid,
                    ref_bit: desc.ref_bit,
                });
            }

            if desc.pin_count > 0 {
                return Err(BufferPoolError::PagePinned {
                    filename: file.filename(),
                    page_id: desc.page_id,
                    frame_id,
                });
            }

            if desc.dirty {
                let page = &mut self.frames[frame_id];
                page.set_page_number(desc.page_id);
                file.borrow_mut().write_page(page)?;
                desc.dirty = false;
            }

            self.page_table.remove(file.id(), desc.page_id)?;
            desc.clear();
        }

        Ok(())
    }

    /// Prints the state of every frame to stdout
    pub fn print_self(&self) {
        println!("{self}");
    }

    /// The number of frames in the buffer pool
    pub fn pool_size(&self) -> usize {
        self.pool_size
    }

    /// Returns the number of frames holding a page
    pub fn len(&self) -> usize {
        self.page_table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn descriptors(&self) -> &[FrameDescriptor] {
        &self.descriptors
    }
}

impl Default for BufferPool {
    fn default() -> Self {
        BufferPool::new(BUFFER_POOL_N_FRAMES)
    }
}

impl fmt::Display for BufferPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for desc in self.descriptors.iter() {
            writeln!(f, "{desc}")?;
        }
        let valid = self.descriptors.iter().filter(|desc| desc.valid).count();
        write!(f, "valid frames: {valid} clock hand: {}", self.clock.position())
    }
}

#[cfg(test)]
mod test {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::errors::FileError;
    use crate::shared::logger::setup_logger;
    use crate::storage::disk::{MemFile, PageFile};

    /// A file holding `n_pages` pages whose first byte is their page id
    fn mem_file(name: &str, n_pages: u8) -> (Rc<RefCell<MemFile>>, FileHandle) {
        let mut file = MemFile::new(name);
        for i in 0..n_pages {
            let mut page = file.allocate_page().unwrap();
            page.data_mut()[0] = i;
            file.write_page(&page).unwrap();
        }
        let file = Rc::new(RefCell::new(file));
        let handle = FileHandle::from_shared(file.clone());
        (file, handle)
    }

    fn assert_consistent(pool: &BufferPool) {
        let mut valid = 0;
        for (frame_id, desc) in pool.descriptors().iter().enumerate() {
            assert_eq!(desc.frame_id(), frame_id);
            if desc.pin_count > 0 {
                assert!(desc.valid, "pinned frame {frame_id} is not valid");
            }
            if desc.valid {
                valid += 1;
                let file = desc.file.as_ref().unwrap();
                assert_eq!(
                    pool.page_table.lookup(file.id(), desc.page_id),
                    Some(frame_id)
                );
                assert_eq!(pool.frames[frame_id].page_number(), desc.page_id);
            }
        }
        assert_eq!(valid, pool.page_table.len());
    }

    fn cached_frame(pool: &BufferPool, file: &FileHandle, page_id: PageId) -> Option<FrameId> {
        pool.page_table.lookup(file.id(), page_id)
    }

    #[test]
    fn test_new_pool_is_empty() {
        let pool = BufferPool::new(4);
        assert_eq!(pool.pool_size(), 4);
        assert!(pool.is_empty());
        assert_eq!(pool.clock.position(), 3);
        assert!(pool.descriptors().iter().all(|desc| !desc.is_valid()));

        assert_eq!(BufferPool::default().pool_size(), BUFFER_POOL_N_FRAMES);
    }

    #[test]
    fn test_read_hit_pins_again_without_io() {
        setup_logger();
        let (mem, file) = mem_file("hit.db", 2);
        let mut pool = BufferPool::new(3);

        let first = pool.read_page(&file, 1).unwrap();
        assert_eq!(first.data()[0], 1);
        let first = first.data().as_ptr();
        let second = pool.read_page(&file, 1).unwrap().data().as_ptr();

        assert_eq!(first, second);
        assert_eq!(mem.borrow().read_count(), 1);

        let frame_id = cached_frame(&pool, &file, 1).unwrap();
        assert_eq!(pool.descriptors()[frame_id].pin_count(), 2);
        assert!(pool.descriptors()[frame_id].ref_bit());
        assert_consistent(&pool);
    }

    #[test]
    fn test_dirty_page_survives_eviction() {
        setup_logger();
        let (mem, file) = mem_file("dirty.db", 0);
        let (_, other) = mem_file("other.db", 4);
        let mut pool = BufferPool::new(3);

        let (page_id, page) = pool.alloc_page(&file).unwrap();
        page.data_mut()[..5].copy_from_slice(b"hello");
        pool.unpin_page(&file, page_id, true).unwrap();

        for i in 0..3 {
            pool.read_page(&other, i).unwrap();
            pool.unpin_page(&other, i, false).unwrap();
        }

        assert_eq!(cached_frame(&pool, &file, page_id), None);
        assert_eq!(mem.borrow().write_count(), 1);
        assert_consistent(&pool);

        let page = pool.read_page(&file, page_id).unwrap();
        assert_eq!(&page.data()[..5], b"hello");
        assert_eq!(mem.borrow().read_count(), 1);
    }

    #[test]
    fn test_clean_page_is_not_written_back() {
        let (mem, file) = mem_file("clean.db", 4);
        let setup_writes = mem.borrow().write_count();
        let mut pool = BufferPool::new(1);

        for i in 0..4 {
            pool.read_page(&file, i).unwrap();
            pool.unpin_page(&file, i, false).unwrap();
        }

        assert_eq!(mem.borrow().write_count(), setup_writes);
        assert_eq!(cached_frame(&pool, &file, 3), Some(0));
        assert_consistent(&pool);
    }

    #[test]
    fn test_clock_gives_second_chance() {
        let (_, file) = mem_file("clock.db", 5);
        let mut pool = BufferPool::new(3);

        for i in 0..3 {
            pool.read_page(&file, i).unwrap();
            pool.unpin_page(&file, i, false).unwrap();
        }

        // Every frame is referenced: the sweep clears them all, then takes frame 0
        pool.read_page(&file, 3).unwrap();
        pool.unpin_page(&file, 3, false).unwrap();
        assert_eq!(cached_frame(&pool, &file, 0), None);
        assert_eq!(cached_frame(&pool, &file, 3), Some(0));

        // Touching page 1 saves it from the next sweep, page 2 goes instead
        pool.read_page(&file, 1).unwrap();
        pool.unpin_page(&file, 1, false).unwrap();
        pool.read_page(&file, 4).unwrap();

        assert_eq!(cached_frame(&pool, &file, 1), Some(1));
        assert_eq!(cached_frame(&pool, &file, 2), None);
        assert_eq!(cached_frame(&pool, &file, 4), Some(2));
        assert!(!pool.descriptors()[1].ref_bit());
        assert_consistent(&pool);
    }

    #[test]
    fn test_pool_exhausted() {
        setup_logger();
        let (mem, file) = mem_file("full.db", 4);
        let mut pool = BufferPool::new(3);

        for i in 0..3 {
            pool.read_page(&file, i).unwrap();
        }

        assert!(matches!(
            pool.read_page(&file, 3),
            Err(BufferPoolError::PoolExhausted)
        ));
        assert_eq!(mem.borrow().read_count(), 3);
        assert_eq!(cached_frame(&pool, &file, 3), None);
        for i in 0..3 {
            let frame_id = cached_frame(&pool, &file, i).unwrap();
            assert_eq!(pool.descriptors()[frame_id].pin_count(), 1);
            assert_eq!(pool.frames[frame_id].data()[0], i as u8);
        }
        assert_consistent(&pool);

        // Releasing a single pin makes room again
        pool.unpin_page(&file, 1, false).unwrap();
        assert_eq!(pool.read_page(&file, 3).unwrap().data()[0], 3);
        assert_eq!(cached_frame(&pool, &file, 1), None);
    }

    #[test]
    fn test_referenced_frame_is_not_mistaken_for_pinned() {
        let (_, file) = mem_file("sweep.db", 5);
        let mut pool = BufferPool::new(3);

        for i in 0..3 {
            pool.read_page(&file, i).unwrap();
        }
        pool.unpin_page(&file, 2, false).unwrap();

        // Clears every reference bit and reuses frame 2
        pool.read_page(&file, 3).unwrap();
        pool.unpin_page(&file, 3, false).unwrap();
        assert_eq!(cached_frame(&pool, &file, 3), Some(2));

        // Frames 0 and 1 are pinned, frame 2 only referenced: it must still be found
        pool.read_page(&file, 4).unwrap();
        assert_eq!(cached_frame(&pool, &file, 4), Some(2));
        assert_consistent(&pool);
    }

    #[test]
    fn test_double_unpin() {
        let (_, file) = mem_file("unpin.db", 1);
        let mut pool = BufferPool::new(2);

        pool.read_page(&file, 0).unwrap();
        pool.unpin_page(&file, 0, false).unwrap();

        let err = pool.unpin_page(&file, 0, false).unwrap_err();
        assert!(matches!(
            err,
            BufferPoolError::PageNotPinned { page_id: 0, frame_id: 0, ref filename } if filename == "unpin.db"
        ));
        assert_consistent(&pool);
    }

    #[test]
    fn test_unpin_unknown_page_is_a_warning() {
        setup_logger();
        let (_, file) = mem_file("unknown.db", 2);
        let mut pool = BufferPool::new(2);
        pool.read_page(&file, 0).unwrap();
        let before = pool.to_string();

        pool.unpin_page(&file, 1, true).unwrap();

        assert_eq!(pool.to_string(), before);
        assert_consistent(&pool);
    }

    #[test]
    fn test_dirty_flag_is_sticky() {
        let (_, file) = mem_file("sticky.db", 1);
        let mut pool = BufferPool::new(2);

        pool.read_page(&file, 0).unwrap();
        pool.read_page(&file, 0).unwrap();
        pool.unpin_page(&file, 0, true).unwrap();
        pool.unpin_page(&file, 0, false).unwrap();

        let frame_id = cached_frame(&pool, &file, 0).unwrap();
        assert!(pool.descriptors()[frame_id].is_dirty());
        assert_eq!(pool.descriptors()[frame_id].pin_count(), 0);
    }

    #[test]
    fn test_flush_while_pinned() {
        let (mem, file) = mem_file("pinned.db", 2);
        let setup_writes = mem.borrow().write_count();
        let mut pool = BufferPool::new(2);

        pool.read_page(&file, 1).unwrap();

        assert!(matches!(
            pool.flush_file(&file),
            Err(BufferPoolError::PagePinned { page_id: 1, .. })
        ));
        let frame_id = cached_frame(&pool, &file, 1).unwrap();
        assert!(pool.descriptors()[frame_id].is_valid());
        assert_eq!(pool.descriptors()[frame_id].pin_count(), 1);
        assert_eq!(mem.borrow().write_count(), setup_writes);
        assert_consistent(&pool);
    }

    #[test]
    fn test_flush_file() {
        let (mem, file) = mem_file("flush.db", 3);
        let setup_writes = mem.borrow().write_count();
        let (_, other) = mem_file("keep.db", 1);
        let mut pool = BufferPool::new(4);

        for i in 0..3 {
            pool.read_page(&file, i).unwrap().data_mut()[1] = 0xFF;
            pool.unpin_page(&file, i, i != 1).unwrap();
        }
        pool.read_page(&other, 0).unwrap();

        pool.flush_file(&file).unwrap();

        assert_eq!(mem.borrow().write_count() - setup_writes, 2);
        assert_eq!(pool.len(), 1);
        assert_eq!(pool.page_table.len(), 1);
        assert!(cached_frame(&pool, &other, 0).is_some());
        assert_consistent(&pool);

        // Written pages come back with their changes, the clean one from the file
        assert_eq!(pool.read_page(&file, 0).unwrap().data()[1], 0xFF);
        assert_eq!(pool.read_page(&file, 1).unwrap().data()[1], 0);
        assert_eq!(pool.read_page(&file, 2).unwrap().data()[1], 0xFF);

        // Flushing a file with nothing cached is a no-op
        let (_, idle) = mem_file("idle.db", 0);
        pool.flush_file(&idle).unwrap();
    }

    #[test]
    fn test_dispose_page() {
        let (mem, file) = mem_file("dispose.db", 3);
        let setup_writes = mem.borrow().write_count();
        let mut pool = BufferPool::new(3);

        pool.read_page(&file, 0).unwrap().data_mut()[0] = 0xEE;
        pool.unpin_page(&file, 0, true).unwrap();

        pool.dispose_page(&file, 0).unwrap();
        assert_eq!(cached_frame(&pool, &file, 0), None);
        assert!(!mem.borrow().contains(0));
        assert_eq!(mem.borrow().write_count(), setup_writes);
        assert!(pool.is_empty());

        // Not cached: only the file is touched
        pool.dispose_page(&file, 1).unwrap();
        assert!(!mem.borrow().contains(1));

        // Pinned pages are disposed all the same
        pool.read_page(&file, 2).unwrap();
        pool.dispose_page(&file, 2).unwrap();
        assert!(pool.is_empty());
        assert_consistent(&pool);

        assert!(matches!(
            pool.dispose_page(&file, 2),
            Err(BufferPoolError::File(FileError::PageNotFound { page_id: 2, .. }))
        ));
    }

    #[test]
    fn test_alloc_page() {
        let (mem, file) = mem_file("alloc.db", 2);
        let mut pool = BufferPool::new(2);

        let (page_id, page) = pool.alloc_page(&file).unwrap();
        assert_eq!(page_id, 2);
        assert_eq!(page.page_number(), 2);
        assert!(page.data().iter().all(|&b| b == 0));
        assert!(mem.borrow().contains(2));

        let frame_id = cached_frame(&pool, &file, page_id).unwrap();
        assert_eq!(pool.descriptors()[frame_id].pin_count(), 1);
        assert!(!pool.descriptors()[frame_id].is_dirty());

        pool.alloc_page(&file).unwrap();
        assert!(matches!(
            pool.alloc_page(&file),
            Err(BufferPoolError::PoolExhausted)
        ));
        assert_consistent(&pool);
    }

    #[test]
    fn test_read_missing_page_leaves_frame_free() {
        let (_, file) = mem_file("missing.db", 1);
        let mut pool = BufferPool::new(1);

        pool.read_page(&file, 0).unwrap();
        pool.unpin_page(&file, 0, false).unwrap();

        assert!(matches!(
            pool.read_page(&file, 7),
            Err(BufferPoolError::File(FileError::PageNotFound { page_id: 7, .. }))
        ));
        // Page 0 was evicted to make room, the frame is free now
        assert!(pool.is_empty());
        assert_consistent(&pool);
    }

    #[test]
    fn test_same_page_id_in_two_files() {
        let (_, a) = mem_file("a.db", 1);
        let (_, b) = mem_file("b.db", 1);
        let mut pool = BufferPool::new(2);

        pool.read_page(&a, 0).unwrap().data_mut()[0] = b'a';
        pool.read_page(&b, 0).unwrap().data_mut()[0] = b'b';

        assert_ne!(cached_frame(&pool, &a, 0), cached_frame(&pool, &b, 0));
        assert_eq!(pool.read_page(&a, 0).unwrap().data()[0], b'a');
        assert_eq!(pool.read_page(&b, 0).unwrap().data()[0], b'b');
        assert_consistent(&pool);
    }

    #[test]
    fn test_display() {
        let (_, file) = mem_file("show.db", 1);
        let mut pool = BufferPool::new(2);
        pool.read_page(&file, 0).unwrap();

        let shown = pool.to_string();
        let lines: Vec<&str> = shown.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("frame=0 file=show.db page=0 valid=true pin_count=1"));
        assert!(lines[1].starts_with("frame=1 file=- "));
        assert_eq!(lines[2], "valid frames: 1 clock hand: 0");
        pool.print_self();
    }

    /// Serves reads from a MemFile but refuses every write
    struct ReadOnlyFile(MemFile);

    impl PageFile for ReadOnlyFile {
        fn filename(&self) -> &str {
            self.0.filename()
        }

        fn read_page(&mut self, page_id: PageId, page: &mut Page) -> Result<(), FileError> {
            self.0.read_page(page_id, page)
        }

        fn write_page(&mut self, _page: &Page) -> Result<(), FileError> {
            Err(FileError::IOError(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "read only file",
            )))
        }

        fn allocate_page(&mut self) -> Result<Page, FileError> {
            self.0.allocate_page()
        }

        fn delete_page(&mut self, page_id: PageId) -> Result<(), FileError> {
            self.0.delete_page(page_id)
        }
    }

    fn first_byte_in_file(mem: &Rc<RefCell<MemFile>>, page_id: PageId) -> u8 {
        let mut page = Page::new(0);
        mem.borrow_mut().read_page(page_id, &mut page).unwrap();
        page.data()[0]
    }

    #[test]
    fn test_write_back_ignores_renumbered_frame() {
        let (mem, file) = mem_file("renumber.db", 3);
        let mut pool = BufferPool::new(1);

        // Flush path
        let page = pool.read_page(&file, 0).unwrap();
        page.data_mut()[0] = 0xAA;
        page.set_page_number(1);
        pool.unpin_page(&file, 0, true).unwrap();
        pool.flush_file(&file).unwrap();

        assert_eq!(first_byte_in_file(&mem, 0), 0xAA);
        assert_eq!(first_byte_in_file(&mem, 1), 1);
        assert_consistent(&pool);

        // Eviction path, with the whole page replaced
        let page = pool.read_page(&file, 2).unwrap();
        *page = Page::new(1);
        page.data_mut()[0] = 0xBB;
        pool.unpin_page(&file, 2, true).unwrap();
        pool.read_page(&file, 1).unwrap();

        assert_eq!(first_byte_in_file(&mem, 2), 0xBB);
        assert_eq!(first_byte_in_file(&mem, 1), 1);
        assert_eq!(pool.read_page(&file, 1).unwrap().data()[0], 1);
        assert_consistent(&pool);
    }

    #[test]
    fn test_failed_write_back_keeps_victim_cached() {
        setup_logger();
        let mut inner = MemFile::new("readonly.db");
        inner.allocate_page().unwrap();
        inner.allocate_page().unwrap();
        let file = FileHandle::new(ReadOnlyFile(inner));
        let mut pool = BufferPool::new(1);

        pool.read_page(&file, 0).unwrap().data_mut()[0] = 0xCC;
        pool.unpin_page(&file, 0, true).unwrap();

        assert!(matches!(
            pool.read_page(&file, 1),
            Err(BufferPoolError::File(FileError::IOError(_)))
        ));

        let desc = &pool.descriptors()[0];
        assert!(desc.is_valid());
        assert!(desc.is_dirty());
        assert_eq!(desc.page_id(), Some(0));
        assert_eq!(desc.pin_count(), 0);
        assert_eq!(cached_frame(&pool, &file, 0), Some(0));
        assert_eq!(cached_frame(&pool, &file, 1), None);
        assert_eq!(pool.frames[0].data()[0], 0xCC);
        assert_consistent(&pool);
    }

    #[test]
    fn test_valid_frame_without_file_is_a_bad_buffer() {
        let (_, file) = mem_file("orphan.db", 1);
        let mut pool = BufferPool::new(1);

        // Valid but ownerless: an inconsistency the sweep must report, not reuse
        let desc = &mut pool.descriptors[0];
        desc.valid = true;
        desc.page_id = 5;

        assert!(matches!(
            pool.read_page(&file, 0),
            Err(BufferPoolError::BadBuffer {
                frame_id: 0,
                valid: true,
                ..
            })
        ));
        assert!(pool.descriptors()[0].is_valid());
        assert_eq!(cached_frame(&pool, &file, 0), None);
    }
}
