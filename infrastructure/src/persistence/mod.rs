pub mod file_store;
pub mod in_memory_store;

// Re-export both adapter types
pub use file_store::FileKeyValueStore;
pub use in_memory_store::InMemoryKeyValueStore;
