//! Play history tracking
//!
//! Maintains a bounded history of played track names per source folder,
//! used both for step-back and to keep recently played tracks from being
//! picked again.

use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};

/// Default history size, per folder
pub const DEFAULT_HISTORY_CAPACITY: usize = 50;

/// Bounded FIFO of recently played track names
///
/// Implements a ring buffer that automatically discards the oldest entry.
#[derive(Debug, Clone)]
pub struct HistoryQueue {
    /// History buffer (most recent = back)
    names: VecDeque<String>,

    /// Maximum history size
    capacity: usize,
}

impl HistoryQueue {
    /// Create a new queue with the given capacity
    pub fn new(capacity: usize) -> Self {
        Self {
            names: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Record a played track
    ///
    /// If the queue is full, the oldest entry is evicted.
    pub fn push(&mut self, name: impl Into<String>) {
        if self.capacity == 0 {
            return;
        }
        if self.names.len() >= self.capacity {
            self.names.pop_front(); // Remove oldest
        }
        self.names.push_back(name.into());
    }

    /// Remove and return the most recently pushed name
    pub fn pop(&mut self) -> Option<String> {
        self.names.pop_back()
    }

    /// Remove and return the least recently pushed name
    pub fn pop_oldest(&mut self) -> Option<String> {
        self.names.pop_front()
    }

    /// Check whether `name` was played recently
    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    /// Get all entries (oldest first)
    pub fn get_all(&self) -> Vec<&str> {
        self.names.iter().map(String::as_str).collect()
    }

    /// Get number of entries
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Check if history is empty
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Get maximum history size
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for HistoryQueue {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

/// One `HistoryQueue` per source folder
///
/// Queues are created on first use and live as long as the map.
#[derive(Debug, Clone)]
pub struct HistoryMap {
    queues: HashMap<PathBuf, HistoryQueue>,
    capacity: usize,
}

impl HistoryMap {
    /// Create an empty map whose queues hold `capacity` entries
    pub fn new(capacity: usize) -> Self {
        Self {
            queues: HashMap::new(),
            capacity,
        }
    }

    /// Folder whose history a source path plays against
    ///
    /// A single file shares the history of the folder it lives in.
    pub fn key_for(source: &Path) -> PathBuf {
        if source.is_dir() {
            return source.to_path_buf();
        }
        match source.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }

    /// Queue for `folder`, created on first access
    pub fn queue_mut(&mut self, folder: &Path) -> &mut HistoryQueue {
        let capacity = self.capacity;
        self.queues
            .entry(folder.to_path_buf())
            .or_insert_with(|| HistoryQueue::new(capacity))
    }

    /// Queue for `folder`, if it has been used
    pub fn get(&self, folder: &Path) -> Option<&HistoryQueue> {
        self.queues.get(folder)
    }
}

impl Default for HistoryMap {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}
