/// The size (in bytes) of a page, both on disk and in a buffer pool frame
pub const PAGE_SIZE: usize = 4096;

/// The number of frames of a default buffer pool.
/// Every frame pins PAGE_SIZE bytes of memory for the whole life of the pool.
pub const BUFFER_POOL_N_FRAMES: usize = 100;

pub const CARGO_PKG_NAME: &str = env!("CARGO_PKG_NAME");

const _: () = assert!(PAGE_SIZE % 8 == 0, "PAGE_SIZE must be 8 byte aligned");
