//! Result records and the highlight flag the core attaches to them.

/// Anything that can carry the keyboard-navigation highlight.
pub trait Highlightable {
    fn is_highlighted(&self) -> bool;
    fn set_highlighted(&mut self, highlighted: bool);
}

/// A record supplied by the remote source, plus the core-owned highlight flag.
///
/// The record itself is opaque: the core never inspects it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hit<R> {
    pub record: R,
    pub is_highlighted: bool,
}

impl<R> Hit<R> {
    pub const fn new(record: R) -> Self {
        Self {
            record,
            is_highlighted: false,
        }
    }
}

impl<R> Highlightable for Hit<R> {
    fn is_highlighted(&self) -> bool {
        self.is_highlighted
    }

    fn set_highlighted(&mut self, highlighted: bool) {
        self.is_highlighted = highlighted;
    }
}

/// Ordered results exactly as returned by the fetch function.
///
/// Every set starts with nothing highlighted.
pub type ResultSet<R> = Vec<Hit<R>>;

/// Wrap raw records into a fresh, unhighlighted result set.
pub fn result_set<R>(records: impl IntoIterator<Item = R>) -> ResultSet<R> {
    records.into_iter().map(Hit::new).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::check;

    #[test]
    fn fresh_sets_are_unhighlighted() {
        let set = result_set(["a", "b", "c"]);
        check!(set.len() == 3);
        check!(set.iter().all(|hit| !hit.is_highlighted()));
        check!(set.iter().map(|hit| hit.record).collect::<Vec<_>>() == vec!["a", "b", "c"]);
    }
}
