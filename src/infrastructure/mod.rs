pub mod memory;
pub mod object_store;

pub use memory::InMemoryObjectStore;
pub use object_store::LocalObjectStore;
