use tracing::info;

use crate::content::{Question, QuizDefinition};
use crate::scoring::{evaluate, QuizOutcome};
use crate::session::QuizSessionState;

#[derive(Debug, Clone, PartialEq)]
pub enum QuizPhase {
    Selecting,
    Result(QuizOutcome),
}

/// One pass through a quiz: answer questions in order, then a terminal result
#[derive(Debug, Clone)]
pub struct QuizSession {
    pub quiz: QuizDefinition,
    pub state: QuizSessionState,
    pub phase: QuizPhase,
}

impl QuizSession {
    pub fn new(quiz: QuizDefinition) -> Self {
        let mut session = Self {
            quiz,
            state: QuizSessionState::new(),
            phase: QuizPhase::Selecting,
        };
        session.finish_if_empty();
        session
    }

    fn finish_if_empty(&mut self) {
        if self.quiz.questions.is_empty() {
            self.finish();
        }
    }

    fn finish(&mut self) {
        let outcome = evaluate(&self.quiz, &self.state.collected);
        info!(
            quiz = %self.quiz.slug,
            kind = %self.quiz.kind,
            result = %outcome.headline(),
            "quiz completed"
        );
        self.phase = QuizPhase::Result(outcome);
    }

    pub fn current_index(&self) -> usize {
        self.state.current_step
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.quiz.questions.get(self.state.current_step)
    }

    pub fn is_last_question(&self) -> bool {
        self.state.current_step + 1 >= self.quiz.question_count()
    }

    pub fn selected(&self) -> Option<&str> {
        let q = self.current_question()?;
        self.state.collected.get(&q.id).map(String::as_str)
    }

    /// Record `option_id` for the current question; re-selecting replaces
    pub fn select(&mut self, option_id: &str) -> bool {
        if self.phase != QuizPhase::Selecting {
            return false;
        }
        let Some(question) = self.current_question() else {
            return false;
        };
        if question.option(option_id).is_none() {
            return false;
        }
        let qid = question.id.clone();
        self.state.collected.insert(qid, option_id.to_string());
        self.state.record_action(format!("select:{option_id}"));
        true
    }

    pub fn can_advance(&self) -> bool {
        self.phase == QuizPhase::Selecting && self.selected().is_some()
    }

    /// Next question, or the result after the last one. No-op when unanswered.
    pub fn next(&mut self) -> bool {
        if !self.can_advance() {
            return false;
        }
        if self.is_last_question() {
            self.finish();
        } else {
            self.state.advance(self.quiz.question_count() - 1);
        }
        true
    }

    /// Previous question; answers are kept
    pub fn back(&mut self) -> bool {
        if self.phase != QuizPhase::Selecting || self.state.current_step == 0 {
            return false;
        }
        self.state.current_step -= 1;
        true
    }

    pub fn retake(&mut self) {
        self.state.restart();
        self.phase = QuizPhase::Selecting;
        self.finish_if_empty();
    }

    pub fn outcome(&self) -> Option<&QuizOutcome> {
        match &self.phase {
            QuizPhase::Result(outcome) => Some(outcome),
            QuizPhase::Selecting => None,
        }
    }

    pub fn answered_count(&self) -> usize {
        self.state.collected.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::SeedBundle;
    use crate::scoring::{KnowledgeScore, QuizOutcome};
    use assert_matches::assert_matches;

    fn seeded(slug: &str) -> QuizDefinition {
        SeedBundle::load()
            .unwrap()
            .quizzes
            .into_iter()
            .find(|q| q.slug == slug)
            .unwrap()
    }

    fn answer_all(session: &mut QuizSession, pick: impl Fn(&Question) -> String) {
        while session.phase == QuizPhase::Selecting {
            let q = session.current_question().unwrap().clone();
            assert!(session.select(&pick(&q)));
            assert!(session.next());
        }
    }

    #[test]
    fn test_next_requires_answer() {
        let mut session = QuizSession::new(seeded("web3-basics"));
        assert!(!session.can_advance());
        assert!(!session.next());
        assert_eq!(session.current_index(), 0);
    }

    #[test]
    fn test_reselect_replaces() {
        let mut session = QuizSession::new(seeded("web3-basics"));
        let q = session.current_question().unwrap().clone();
        session.select(&q.options[0].id);
        session.select(&q.options[1].id);
        assert_eq!(session.selected(), Some(q.options[1].id.as_str()));
        assert_eq!(session.answered_count(), 1);
    }

    #[test]
    fn test_unknown_option_rejected() {
        let mut session = QuizSession::new(seeded("web3-basics"));
        assert!(!session.select("no-such-option"));
        assert!(!session.can_advance());
    }

    #[test]
    fn test_back_keeps_answers() {
        let mut session = QuizSession::new(seeded("web3-basics"));
        let first = session.current_question().unwrap().options[0].id.clone();
        session.select(&first);
        session.next();
        assert!(session.back());
        assert_eq!(session.selected(), Some(first.as_str()));
        assert!(!session.back());
    }

    #[test]
    fn test_all_correct_knowledge_run() {
        let mut session = QuizSession::new(seeded("web3-basics"));
        answer_all(&mut session, |q| {
            q.options.iter().find(|o| o.is_correct()).unwrap().id.clone()
        });
        assert_matches!(
            session.outcome(),
            Some(QuizOutcome::Knowledge(KnowledgeScore {
                score: 5,
                total: 5,
                percentage: 100,
                passed: true
            }))
        );
        assert!(!session.select("a"));
    }

    #[test]
    fn test_personality_run_and_retake() {
        let mut session = QuizSession::new(seeded("bull-or-bear"));
        answer_all(&mut session, |q| q.options[0].id.clone());
        assert_matches!(session.outcome(), Some(QuizOutcome::Personality(_)));

        session.retake();
        assert_eq!(session.phase, QuizPhase::Selecting);
        assert_eq!(session.current_index(), 0);
        assert_eq!(session.answered_count(), 0);
    }

    #[test]
    fn test_empty_quiz_goes_straight_to_result() {
        let mut quiz = seeded("web3-basics");
        quiz.questions.clear();
        let mut session = QuizSession::new(quiz);
        assert_matches!(
            session.outcome(),
            Some(QuizOutcome::Knowledge(KnowledgeScore {
                percentage: 0,
                passed: false,
                ..
            }))
        );
        session.retake();
        assert!(session.outcome().is_some());
    }
}
