//! Entry store implementations
//!
//! `EntryStore` is the persistence contract the diary service depends on.
//! `DiaryRepository` backs it with PostgreSQL; `MemoryEntryStore` keeps rows in process.

#[cfg(feature = "memory")]
pub mod memory;
pub mod repository;
pub mod store;

#[cfg(feature = "memory")]
pub use memory::MemoryEntryStore;
pub use repository::DiaryRepository;
pub use store::EntryStore;
