use std::io::Write;

use chrono::{DateTime, Local};
use serde::Serialize;

use crate::content::QuizKind;
use crate::error::Result;
use crate::scoring::QuizOutcome;

/// A finished quiz as kept in the history table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuizAttempt {
    pub quiz_slug: String,
    pub kind: QuizKind,
    pub score: usize,
    pub total: usize,
    pub percentage: u32,
    pub passed: bool,
    /// winning category of a personality quiz
    pub category: Option<String>,
    pub taken_at: DateTime<Local>,
}

impl QuizAttempt {
    pub fn from_outcome(quiz_slug: &str, outcome: &QuizOutcome) -> Self {
        let mut attempt = Self {
            quiz_slug: quiz_slug.to_string(),
            kind: outcome.kind(),
            score: 0,
            total: 0,
            percentage: 0,
            passed: false,
            category: None,
            taken_at: Local::now(),
        };
        match outcome {
            QuizOutcome::Knowledge(s) => {
                attempt.score = s.score;
                attempt.total = s.total;
                attempt.percentage = s.percentage;
                attempt.passed = s.passed;
            }
            QuizOutcome::Personality(p) => {
                attempt.category = p.category.clone();
            }
        }
        attempt
    }

    pub fn summary(&self) -> String {
        match self.kind {
            QuizKind::Knowledge => format!(
                "{}/{} ({}%){}",
                self.score,
                self.total,
                self.percentage,
                if self.passed { " passed" } else { "" }
            ),
            QuizKind::Personality => self
                .category
                .clone()
                .unwrap_or_else(|| "no answers".to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationRun {
    pub simulation_slug: String,
    pub hints_viewed: usize,
    pub completed_at: DateTime<Local>,
}

impl SimulationRun {
    pub fn new(simulation_slug: &str, hints_viewed: usize) -> Self {
        Self {
            simulation_slug: simulation_slug.to_string(),
            hints_viewed,
            completed_at: Local::now(),
        }
    }
}

fn format_time(at: &DateTime<Local>) -> String {
    at.format("%Y-%m-%d %H:%M").to_string()
}

pub fn attempt_lines(attempts: &[QuizAttempt]) -> Vec<String> {
    attempts
        .iter()
        .map(|a| {
            format!(
                "{}  {:<24} {:<11} {}",
                format_time(&a.taken_at),
                a.quiz_slug,
                a.kind,
                a.summary()
            )
        })
        .collect()
}

pub fn run_lines(runs: &[SimulationRun]) -> Vec<String> {
    runs.iter()
        .map(|r| {
            format!(
                "{}  {:<32} hints viewed: {}",
                format_time(&r.completed_at),
                r.simulation_slug,
                r.hints_viewed
            )
        })
        .collect()
}

#[derive(Serialize)]
struct AttemptRow<'a> {
    taken_at: String,
    quiz_slug: &'a str,
    kind: String,
    score: usize,
    total: usize,
    percentage: u32,
    passed: bool,
    category: &'a str,
}

/// Quiz history as CSV with a header row
pub fn export_attempts_csv<W: Write>(attempts: &[QuizAttempt], out: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(out);
    for a in attempts {
        wtr.serialize(AttemptRow {
            taken_at: a.taken_at.to_rfc3339(),
            quiz_slug: &a.quiz_slug,
            kind: a.kind.to_string(),
            score: a.score,
            total: a.total,
            percentage: a.percentage,
            passed: a.passed,
            category: a.category.as_deref().unwrap_or(""),
        })?;
    }
    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::ResultCategory;
    use crate::scoring::{KnowledgeScore, PersonalityResult};

    #[test]
    fn test_attempt_from_knowledge_outcome() {
        let outcome = QuizOutcome::Knowledge(KnowledgeScore {
            score: 4,
            total: 5,
            percentage: 80,
            passed: true,
        });
        let attempt = QuizAttempt::from_outcome("web3-basics", &outcome);
        assert_eq!(attempt.kind, QuizKind::Knowledge);
        assert_eq!(attempt.summary(), "4/5 (80%) passed");
        assert_eq!(attempt.category, None);
    }

    #[test]
    fn test_attempt_from_personality_outcome() {
        let outcome = QuizOutcome::Personality(PersonalityResult {
            category: Some("bull".into()),
            totals: vec![("bull".into(), 6)],
            result: ResultCategory::fallback(),
        });
        let attempt = QuizAttempt::from_outcome("bull-or-bear", &outcome);
        assert_eq!(attempt.summary(), "bull");
        assert!(!attempt.passed);
    }

    #[test]
    fn test_csv_export_has_header_and_rows() {
        let outcome = QuizOutcome::Knowledge(KnowledgeScore {
            score: 3,
            total: 5,
            percentage: 60,
            passed: false,
        });
        let attempts = vec![QuizAttempt::from_outcome("web3-basics", &outcome)];
        let mut buf = Vec::new();
        export_attempts_csv(&attempts, &mut buf).unwrap();

        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("taken_at,quiz_slug,kind,score,total,percentage,passed,category")
        );
        let row = lines.next().unwrap();
        assert!(row.contains(",web3-basics,knowledge,3,5,60,false,"));
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn test_run_lines() {
        let runs = vec![SimulationRun::new("create-your-first-wallet", 2)];
        let lines = run_lines(&runs);
        assert!(lines[0].contains("create-your-first-wallet"));
        assert!(lines[0].ends_with("hints viewed: 2"));
    }
}
