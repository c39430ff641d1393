pub mod repository;
pub mod word_store;

pub use repository::{JsonFileRepository, MemoryRepository, PersistedState, WordRepository};
pub use word_store::{validate_pair, WordStore};
