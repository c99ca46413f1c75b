use std::collections::{HashSet, VecDeque};
use url::Url;

/// Tracks which pages have been visited and which are waiting to be crawled
///
/// The queue defines BFS order; the pending set mirrors it for O(1)
/// membership checks. The two always hold the same URLs, and a URL is never
/// pending and visited at the same time.
#[derive(Debug, Default)]
pub struct FrontierState {
    visited: HashSet<Url>,
    frontier_set: HashSet<Url>,
    frontier_queue: VecDeque<Url>,
}

impl FrontierState {
    /// Creates an empty frontier
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a frontier holding only the seed URL
    pub fn with_seed(seed: Url) -> Self {
        let mut state = Self::new();
        state.push(seed);
        state
    }

    /// Enqueues a URL at the back of the frontier
    ///
    /// Returns false (and does nothing) if the URL is already pending or has
    /// already been visited.
    pub fn push(&mut self, url: Url) -> bool {
        if self.visited.contains(&url) || self.frontier_set.contains(&url) {
            return false;
        }

        self.frontier_set.insert(url.clone());
        self.frontier_queue.push_back(url);
        true
    }

    /// Removes and returns the oldest pending URL
    pub fn pop(&mut self) -> Option<Url> {
        let url = self.frontier_queue.pop_front()?;
        self.frontier_set.remove(&url);
        Some(url)
    }

    /// Records a URL as fetched or attempted
    ///
    /// A visited URL is dropped from the pending set so it can never be
    /// dequeued again.
    pub fn mark_visited(&mut self, url: Url) {
        if self.frontier_set.remove(&url) {
            self.frontier_queue.retain(|pending| pending != &url);
        }
        self.visited.insert(url);
    }

    pub fn is_visited(&self, url: &Url) -> bool {
        self.visited.contains(url)
    }

    pub fn is_pending(&self, url: &Url) -> bool {
        self.frontier_set.contains(url)
    }

    /// Returns true if the URL has been seen in any form
    pub fn is_known(&self, url: &Url) -> bool {
        self.is_visited(url) || self.is_pending(url)
    }

    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    pub fn pending_count(&self) -> usize {
        self.frontier_queue.len()
    }
}
