//! Persistence collaborator.
//!
//! The admission core never touches the store; handlers reach it only after
//! every gate has passed.

pub mod memory;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use memory::MemoryStore;

/// A stored record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: Uuid,
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub published_year: i32,
    pub price: i64,
    pub category: String,
}

/// Client-supplied record fields.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordInput {
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub published_year: i32,
    pub price: i64,
    pub category: String,
}

impl RecordInput {
    /// Title, author and a positive price are required.
    pub fn is_valid(&self) -> bool {
        !self.title.is_empty() && !self.author.is_empty() && self.price > 0
    }

    pub fn into_record(self, id: Uuid) -> Record {
        Record {
            id,
            title: self.title,
            author: self.author,
            isbn: self.isbn,
            published_year: self.published_year,
            price: self.price,
            category: self.category,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn list(&self) -> Result<Vec<Record>, StoreError>;

    async fn insert(&self, input: RecordInput) -> Result<Record, StoreError>;

    /// Replace the fields of `id`. `None` when no such record exists.
    async fn update(&self, id: Uuid, input: RecordInput) -> Result<Option<Record>, StoreError>;

    /// `false` when no such record exists.
    async fn delete(&self, id: Uuid) -> Result<bool, StoreError>;

    /// Number of records removed.
    async fn delete_all(&self) -> Result<usize, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_input_validation() {
        let valid = RecordInput {
            title: "The Rust Programming Language".into(),
            author: "Klabnik".into(),
            price: 3999,
            ..RecordInput::default()
        };
        assert!(valid.is_valid());
        assert!(!RecordInput { price: 0, ..valid.clone() }.is_valid());
        assert!(!RecordInput { title: String::new(), ..valid.clone() }.is_valid());
        assert!(!RecordInput { author: String::new(), ..valid }.is_valid());
    }
}
