use std::collections::{BTreeSet, HashMap};

use crate::wallet::WalletData;

/// question id -> selected option id
pub type Answers = HashMap<String, String>;

/// State of one in-progress run. Never persisted; dropped on restart.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState<D> {
    pub current_step: usize,
    pub collected: D,
    /// steps whose hint was revealed
    pub hints_viewed: BTreeSet<usize>,
    pub user_actions: Vec<String>,
}

impl<D: Default> Default for SessionState<D> {
    fn default() -> Self {
        Self {
            current_step: 0,
            collected: D::default(),
            hints_viewed: BTreeSet::new(),
            user_actions: Vec::new(),
        }
    }
}

impl<D: Default> SessionState<D> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move forward by exactly one step. Returns false at `terminal`.
    pub fn advance(&mut self, terminal: usize) -> bool {
        if self.current_step >= terminal {
            return false;
        }
        self.current_step += 1;
        true
    }

    pub fn mark_hint_viewed(&mut self, step: usize) -> bool {
        self.hints_viewed.insert(step)
    }

    pub fn record_action(&mut self, action: impl Into<String>) {
        self.user_actions.push(action.into());
    }

    /// Discard everything collected so far and go back to step 0
    pub fn restart(&mut self) {
        *self = Self::default();
    }
}

pub type WalletSession = SessionState<WalletData>;
pub type QuizSessionState = SessionState<Answers>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_stops_at_terminal() {
        let mut s: SessionState<Answers> = SessionState::new();
        assert!(s.advance(2));
        assert!(s.advance(2));
        assert!(!s.advance(2));
        assert_eq!(s.current_step, 2);
    }

    #[test]
    fn test_hints_viewed_is_a_set() {
        let mut s: WalletSession = SessionState::new();
        assert!(s.mark_hint_viewed(1));
        assert!(!s.mark_hint_viewed(1));
        s.mark_hint_viewed(0);
        assert_eq!(s.hints_viewed.iter().copied().collect::<Vec<_>>(), vec![0, 1]);
    }

    #[test]
    fn test_restart_discards_everything() {
        let mut s: QuizSessionState = SessionState::new();
        s.collected.insert("q1".into(), "a".into());
        s.advance(5);
        s.mark_hint_viewed(0);
        s.record_action("select");

        s.restart();

        assert_eq!(s, SessionState::default());
        assert!(s.collected.is_empty());
        assert_eq!(s.current_step, 0);
    }
}
