mod config;
mod errors;

// Submodules only expose their public API to the parent module

pub mod shared {
    pub mod logger;
}

pub mod storage {
    mod page;

    pub mod disk {
        mod disk_file;
        mod memory_file;
        mod page_file;

        pub use disk_file::DiskFile;
        pub use memory_file::MemFile;
        pub use page_file::{FileHandle, FileId, PageFile};
    }

    pub mod buffer {
        mod buffer_pool;
        mod clock;
        mod frame;
        mod page_table;

        pub use buffer_pool::BufferPool;
        pub use frame::{FrameDescriptor, FrameId};
    }

    pub use buffer::BufferPool;
    pub use page::{Page, PageId};
}

pub use config::{BUFFER_POOL_N_FRAMES, PAGE_SIZE};
pub use errors::{BufferPoolError, FileError, PageTableError};
