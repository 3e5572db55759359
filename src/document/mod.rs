//! Document layer
//! - line_index.rs: line-start index and UTF-16 position conversion
//! - types.rs: versioned text document
//! - store.rs: open document store (open / change / close)
//! - error.rs: document errors

pub mod error;
pub mod line_index;
pub mod store;
pub mod types;

pub use error::DocumentError;
pub use line_index::LineIndex;
pub use store::DocumentStore;
pub use types::Document;
