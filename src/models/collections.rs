//! Per-category record collections accumulated during a session

use serde::Serialize;

use super::record::Record;
use super::status::Category;

/// Three ordered, append-only record sequences, one per category
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Collections {
    pub tweets: Vec<Record>,
    pub retweets: Vec<Record>,
    pub quoted: Vec<Record>,
}

impl Collections {
    /// Create empty collections
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record to the collection of its category
    pub fn push(&mut self, category: Category, record: Record) {
        match category {
            Category::Tweet => self.tweets.push(record),
            Category::Retweet => self.retweets.push(record),
            Category::Quoted => self.quoted.push(record),
        }
    }

    /// Records of one category
    pub fn get(&self, category: Category) -> &[Record] {
        match category {
            Category::Tweet => &self.tweets,
            Category::Retweet => &self.retweets,
            Category::Quoted => &self.quoted,
        }
    }

    /// Total number of records across all categories
    pub fn len(&self) -> usize {
        self.tweets.len() + self.retweets.len() + self.quoted.len()
    }

    /// Check if no record was collected
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Record counts in block order (Tweet, Retweet, Quoted)
    pub fn counts(&self) -> [(Category, usize); 3] {
        Category::ALL.map(|category| (category, self.get(category).len()))
    }
}
