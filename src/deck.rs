use crate::source::ImageRef;

/// One session's batch of images and the decisions made so far.
///
/// `accepted` only ever grows by appending the item under the cursor, so it
/// stays an ordered subsequence of the already-decided prefix of `items`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Deck {
    items: Vec<ImageRef>,
    cursor: usize,
    accepted: Vec<ImageRef>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub liked: Vec<ImageRef>,
    pub total: usize,
}

impl Summary {
    pub fn liked_count(&self) -> usize {
        self.liked.len()
    }
}

impl Deck {
    pub fn new(items: Vec<ImageRef>) -> Self {
        Self {
            items,
            cursor: 0,
            accepted: Vec::new(),
        }
    }

    pub fn items(&self) -> &[ImageRef] {
        &self.items
    }

    pub fn accepted(&self) -> &[ImageRef] {
        &self.accepted
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_finished(&self) -> bool {
        self.cursor >= self.items.len()
    }

    pub fn current(&self) -> Option<&ImageRef> {
        self.items.get(self.cursor)
    }

    /// 1-based position of the current item and the deck size.
    pub fn progress(&self) -> Option<(usize, usize)> {
        if self.is_finished() {
            None
        } else {
            Some((self.cursor + 1, self.items.len()))
        }
    }

    /// Records a decision for the current item and advances.
    ///
    /// Returns `false` without touching anything once the deck is exhausted.
    pub fn decide(&mut self, liked: bool) -> bool {
        let Some(current) = self.items.get(self.cursor) else {
            return false;
        };
        if liked {
            self.accepted.push(current.clone());
        }
        self.cursor += 1;
        true
    }

    /// Moves past an item that could not be displayed.
    pub fn skip(&mut self) -> bool {
        if self.is_finished() {
            return false;
        }
        self.cursor += 1;
        true
    }

    pub fn summary(&self) -> Summary {
        Summary {
            liked: self.accepted.clone(),
            total: self.items.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deck_of(labels: &[&str]) -> Deck {
        Deck::new(labels.iter().map(|label| ImageRef::from(*label)).collect())
    }

    #[test]
    fn accepted_follows_decision_order() {
        let mut deck = deck_of(&["a", "b", "c", "d"]);
        assert!(deck.decide(true));
        assert!(deck.decide(false));
        assert!(deck.decide(true));
        assert!(deck.decide(true));

        let accepted: Vec<&str> = deck.accepted().iter().map(ImageRef::as_str).collect();
        assert_eq!(accepted, vec!["a", "c", "d"]);
        assert!(deck.is_finished());
    }

    #[test]
    fn duplicates_in_items_are_kept() {
        let mut deck = deck_of(&["a", "a"]);
        deck.decide(true);
        deck.decide(true);
        assert_eq!(deck.accepted().len(), 2);
    }

    #[test]
    fn finished_deck_ignores_decisions() {
        let mut deck = deck_of(&["a"]);
        assert!(deck.decide(true));
        assert!(!deck.decide(true));
        assert!(!deck.skip());
        assert_eq!(deck.cursor(), 1);
        assert_eq!(deck.accepted().len(), 1);
    }

    #[test]
    fn skip_advances_without_accepting() {
        let mut deck = deck_of(&["a", "b"]);
        assert_eq!(deck.progress(), Some((1, 2)));
        assert!(deck.skip());
        assert_eq!(deck.current().map(ImageRef::as_str), Some("b"));
        assert_eq!(deck.progress(), Some((2, 2)));
        assert!(deck.accepted().is_empty());
    }

    #[test]
    fn summary_counts_match() {
        let mut deck = deck_of(&["a", "b", "c"]);
        deck.decide(false);
        deck.decide(true);
        deck.decide(false);

        let summary = deck.summary();
        assert_eq!(summary.total, 3);
        assert_eq!(summary.liked_count(), 1);
        assert!(summary.liked_count() <= summary.total);
    }

    #[test]
    fn empty_deck_is_finished_immediately() {
        let deck = Deck::new(Vec::new());
        assert!(deck.is_empty());
        assert!(deck.is_finished());
        assert_eq!(deck.progress(), None);
    }
}
