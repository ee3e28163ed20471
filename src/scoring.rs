use serde::Serialize;

use crate::content::{QuizDefinition, QuizKind, ResultCategory};
use crate::session::Answers;
use crate::steps::StepDefinition;
use crate::util::percentage;
use crate::wallet::{shorten_address, WalletData};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KnowledgeScore {
    pub score: usize,
    pub total: usize,
    pub percentage: u32,
    pub passed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PersonalityResult {
    /// None when nothing was answered
    pub category: Option<String>,
    /// per-category totals in the order categories were first reached
    pub totals: Vec<(String, i64)>,
    pub result: ResultCategory,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum QuizOutcome {
    Knowledge(KnowledgeScore),
    Personality(PersonalityResult),
}

impl QuizOutcome {
    pub fn kind(&self) -> QuizKind {
        match self {
            QuizOutcome::Knowledge(_) => QuizKind::Knowledge,
            QuizOutcome::Personality(_) => QuizKind::Personality,
        }
    }

    pub fn headline(&self) -> String {
        match self {
            QuizOutcome::Knowledge(s) => format!(
                "{}/{} correct ({}%) - {}",
                s.score,
                s.total,
                s.percentage,
                if s.passed { "passed" } else { "not passed" }
            ),
            QuizOutcome::Personality(p) => p.result.title.clone(),
        }
    }
}

/// Count of answered questions whose chosen option is the correct one
pub fn score_knowledge(quiz: &QuizDefinition, answers: &Answers) -> KnowledgeScore {
    let score = quiz
        .questions
        .iter()
        .filter_map(|q| answers.get(&q.id).and_then(|opt| q.option(opt)))
        .filter(|opt| opt.is_correct())
        .count();
    let total = quiz.question_count();
    let percentage = percentage(score, total);

    KnowledgeScore {
        score,
        total,
        percentage,
        passed: percentage >= quiz.passing_score,
    }
}

pub fn category_totals(quiz: &QuizDefinition, answers: &Answers) -> Vec<(String, i64)> {
    let mut totals: Vec<(String, i64)> = Vec::new();
    let weights = quiz
        .questions
        .iter()
        .filter_map(|q| answers.get(&q.id).and_then(|opt| q.option(opt)))
        .filter_map(|opt| opt.weight());

    for (category, value) in weights {
        match totals.iter_mut().find(|(c, _)| c == category) {
            Some((_, total)) => *total += value,
            None => totals.push((category.to_string(), value)),
        }
    }
    totals
}

/// Highest total wins; on a tie the category reached first keeps the lead
pub fn dominant_category(totals: &[(String, i64)]) -> Option<&str> {
    let mut best: Option<(&str, i64)> = None;
    for (category, total) in totals {
        match best {
            Some((_, lead)) if *total <= lead => {}
            _ => best = Some((category.as_str(), *total)),
        }
    }
    best.map(|(c, _)| c)
}

pub fn lookup_result(quiz: &QuizDefinition, category: Option<&str>) -> ResultCategory {
    category
        .and_then(|c| quiz.result_categories.get(c))
        .cloned()
        .unwrap_or_else(ResultCategory::fallback)
}

pub fn score_personality(quiz: &QuizDefinition, answers: &Answers) -> PersonalityResult {
    let totals = category_totals(quiz, answers);
    let category = dominant_category(&totals).map(str::to_string);
    let result = lookup_result(quiz, category.as_deref());
    PersonalityResult {
        category,
        totals,
        result,
    }
}

pub fn evaluate(quiz: &QuizDefinition, answers: &Answers) -> QuizOutcome {
    match quiz.kind {
        QuizKind::Knowledge => QuizOutcome::Knowledge(score_knowledge(quiz, answers)),
        QuizKind::Personality => QuizOutcome::Personality(score_personality(quiz, answers)),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompletionSummary {
    pub title: String,
    /// "What you learned": every step but the terminal one
    pub learned: Vec<String>,
    pub hints_viewed: usize,
    pub short_address: Option<String>,
}

pub fn summarize_simulation(
    title: &str,
    steps: &[StepDefinition],
    hints_viewed: usize,
    wallet: &WalletData,
) -> CompletionSummary {
    let learned = steps
        .iter()
        .take(steps.len().saturating_sub(1))
        .map(|s| s.title.clone())
        .collect();

    CompletionSummary {
        title: title.to_string(),
        learned,
        hints_viewed,
        short_address: (!wallet.address.is_empty()).then(|| shorten_address(&wallet.address)),
    }
}
