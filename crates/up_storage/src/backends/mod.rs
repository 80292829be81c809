pub mod memory;
pub mod rest;

pub use memory::InMemoryStorage;
pub use rest::RestArticleStore;
