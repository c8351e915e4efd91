//! Listing persistence adapters.

mod memory;

pub use memory::InMemoryListingRepository;
