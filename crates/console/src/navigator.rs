//! Routing collaborator: current location and a navigate primitive.

use std::sync::RwLock;

pub trait Navigator: Send + Sync {
    fn current_path(&self) -> String;

    fn navigate(&self, path: &str);
}

/// In-memory location history, starting at `/`.
#[derive(Debug)]
pub struct HistoryNavigator {
    history: RwLock<Vec<String>>,
}

impl HistoryNavigator {
    pub fn new() -> Self {
        Self::starting_at("/")
    }

    pub fn starting_at(path: impl Into<String>) -> Self {
        Self {
            history: RwLock::new(vec![path.into()]),
        }
    }

    pub fn history(&self) -> Vec<String> {
        self.history.read().unwrap().clone()
    }

    /// Go back one entry. The first entry is never popped.
    pub fn back(&self) -> String {
        let mut history = self.history.write().unwrap();
        if history.len() > 1 {
            history.pop();
        }
        history.last().cloned().unwrap_or_else(|| "/".to_string())
    }
}

impl Default for HistoryNavigator {
    fn default() -> Self {
        Self::new()
    }
}

impl Navigator for HistoryNavigator {
    fn current_path(&self) -> String {
        self.history
            .read()
            .unwrap()
            .last()
            .cloned()
            .unwrap_or_else(|| "/".to_string())
    }

    fn navigate(&self, path: &str) {
        let mut history = self.history.write().unwrap();
        if history.last().map(String::as_str) != Some(path) {
            history.push(path.to_string());
        }
    }
}
