//! Keyboard-navigation cursor over the published results.
//!
//! The cursor is not stored separately: it is whichever entry carries the
//! highlight flag, and at most one entry ever does.

use crate::results::{Highlightable, Hit, ResultSet};
use std::sync::Arc;

/// Direction of a keyboard move through the results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

impl Direction {
    /// Parse the `+1`/`-1` increment used by input events.
    pub const fn from_increment(increment: i32) -> Option<Self> {
        match increment {
            1 => Some(Self::Forward),
            -1 => Some(Self::Backward),
            _ => None,
        }
    }
}

/// Index of the highlighted entry, if any.
pub fn highlighted_index<T: Highlightable>(items: &[T]) -> Option<usize> {
    items.iter().position(Highlightable::is_highlighted)
}

/// Index the cursor would move to.
///
/// From no highlight, forward enters at the first entry and backward at the
/// last. Moving past either end yields `None` instead of wrapping.
pub fn next_index<T: Highlightable>(items: &[T], direction: Direction) -> Option<usize> {
    let last = items.len().checked_sub(1)?;

    match (highlighted_index(items), direction) {
        (None, Direction::Forward) => Some(0),
        (None, Direction::Backward) => Some(last),
        (Some(i), Direction::Forward) if i == last => None,
        (Some(0), Direction::Backward) => None,
        (Some(i), Direction::Forward) => Some(i + 1),
        (Some(i), Direction::Backward) => Some(i - 1),
    }
}

/// Move the highlight to `index`.
///
/// Clears the first currently highlighted entry before setting the new one.
/// Returns `false` when `index` is out of range.
pub fn set_highlight<T: Highlightable>(items: &mut [T], index: usize) -> bool {
    if index >= items.len() {
        return false;
    }
    clear_highlight(items);
    items[index].set_highlighted(true);
    true
}

/// Clear the highlight, returning the index that held it.
pub fn clear_highlight<T: Highlightable>(items: &mut [T]) -> Option<usize> {
    let index = highlighted_index(items)?;
    items[index].set_highlighted(false);
    Some(index)
}

/// Callback invoked after the highlight lands on a result.
///
/// The renderer uses it to scroll the highlighted row into view.
pub type HighlightObserver<R> = Arc<dyn Fn(usize, &R) + Send + Sync>;

/// Owns the current result set and the cursor over it.
pub struct HighlightNavigator<R> {
    results: ResultSet<R>,
    on_highlight_changed: Option<HighlightObserver<R>>,
}

impl<R> Default for HighlightNavigator<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: std::fmt::Debug> std::fmt::Debug for HighlightNavigator<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HighlightNavigator")
            .field("results", &self.results)
            .field("has_observer", &self.on_highlight_changed.is_some())
            .finish()
    }
}

impl<R> HighlightNavigator<R> {
    pub const fn new() -> Self {
        Self {
            results: Vec::new(),
            on_highlight_changed: None,
        }
    }

    pub fn with_observer(observer: HighlightObserver<R>) -> Self {
        Self {
            results: Vec::new(),
            on_highlight_changed: Some(observer),
        }
    }

    /// Take ownership of a new result set. The previous set is dropped, so
    /// nothing is highlighted afterwards.
    pub fn replace(&mut self, results: ResultSet<R>) {
        self.results = results;
    }

    pub fn results(&self) -> &[Hit<R>] {
        &self.results
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn highlighted(&self) -> Option<(usize, &R)> {
        let index = highlighted_index(&self.results)?;
        Some((index, &self.results[index].record))
    }

    /// Where `direction` would move the cursor.
    pub fn next(&self, direction: Direction) -> Option<usize> {
        next_index(&self.results, direction)
    }

    /// Highlight the result at `index`. `None` and out-of-range indices are
    /// ignored.
    pub fn highlight(&mut self, index: Option<usize>) -> bool {
        let Some(index) = index else {
            return false;
        };
        if !set_highlight(&mut self.results, index) {
            tracing::debug!(
                "Ignoring highlight of index {} in {} results",
                index,
                self.results.len()
            );
            return false;
        }
        if let Some(observer) = &self.on_highlight_changed {
            observer(index, &self.results[index].record);
        }
        true
    }

    /// Move the cursor one step. Stepping off either end leaves nothing
    /// highlighted.
    pub fn move_highlight(&mut self, direction: Direction) -> Option<usize> {
        if self.results.is_empty() {
            return None;
        }
        match self.next(direction) {
            Some(index) => {
                self.highlight(Some(index));
                Some(index)
            }
            None => {
                clear_highlight(&mut self.results);
                None
            }
        }
    }
}

impl<R: Clone> HighlightNavigator<R> {
    /// The highlighted record, if one is highlighted.
    pub fn selected(&self) -> Option<R> {
        self.highlighted().map(|(_, record)| record.clone())
    }
}
