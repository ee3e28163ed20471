//! Parsing and shape checks for hand-edited content.
//!
//! Every failure is reported as [`Error::Validation`] carrying a message that
//! points at the offending question or option, so an import can be fixed and
//! retried without losing the rest of the file.

use std::collections::{BTreeMap, HashSet};

use super::{
    Blog, OptionScoring, Question, QuizDefinition, QuizKind, ResultCategory, Simulation,
    SimulationStep,
};
use crate::error::{Error, Result};
use crate::util::slugify;

pub const MIN_OPTIONS: usize = 2;

fn invalid(msg: impl Into<String>) -> Error {
    Error::Validation(msg.into())
}

fn parse_json<T: serde::de::DeserializeOwned>(what: &str, json: &str) -> Result<T> {
    serde_json::from_str(json).map_err(|e| invalid(format!("{what}: {e}")))
}

pub fn parse_questions(json: &str, kind: QuizKind) -> Result<Vec<Question>> {
    let questions: Vec<Question> = parse_json("questions", json)?;
    validate_questions(&questions, kind)?;
    Ok(questions)
}

pub fn parse_result_categories(json: &str) -> Result<BTreeMap<String, ResultCategory>> {
    let categories: BTreeMap<String, ResultCategory> = parse_json("result categories", json)?;
    validate_result_categories(&categories)?;
    Ok(categories)
}

/// A quiz document; the slug may be left out for the importer to derive
pub fn parse_quiz(json: &str) -> Result<QuizDefinition> {
    let quiz: QuizDefinition = parse_json("quiz", json)?;
    validate_slug_if_set(&quiz.slug)?;
    validate_quiz_fields(&quiz)?;
    Ok(quiz)
}

pub fn parse_simulation(json: &str) -> Result<Simulation> {
    let simulation: Simulation = parse_json("simulation", json)?;
    validate_slug_if_set(&simulation.slug)?;
    validate_simulation_fields(&simulation)?;
    Ok(simulation)
}

pub fn parse_blog(json: &str) -> Result<Blog> {
    let blog: Blog = parse_json("blog", json)?;
    validate_slug_if_set(&blog.slug)?;
    validate_blog_fields(&blog)?;
    Ok(blog)
}

/// A JSON array of steps replacing a simulation's stored ones
pub fn parse_steps(json: &str) -> Result<Vec<SimulationStep>> {
    let steps: Vec<SimulationStep> = parse_json("steps", json)?;
    validate_steps(&steps)?;
    Ok(steps)
}

pub fn validate_blog(blog: &Blog) -> Result<()> {
    validate_slug(&blog.slug)?;
    validate_blog_fields(blog)
}

fn validate_blog_fields(blog: &Blog) -> Result<()> {
    if blog.title.trim().is_empty() {
        return Err(invalid("blog has no title"));
    }
    Ok(())
}

fn validate_slug(slug: &str) -> Result<()> {
    if slug.is_empty() {
        return Err(invalid("slug is empty"));
    }
    validate_slug_if_set(slug)
}

fn validate_slug_if_set(slug: &str) -> Result<()> {
    if slugify(slug) != slug {
        return Err(invalid(format!(
            "slug '{slug}' is not normalized, expected '{}'",
            slugify(slug)
        )));
    }
    Ok(())
}

pub fn validate_quiz(quiz: &QuizDefinition) -> Result<()> {
    validate_slug(&quiz.slug)?;
    validate_quiz_fields(quiz)
}

fn validate_quiz_fields(quiz: &QuizDefinition) -> Result<()> {
    if quiz.title.trim().is_empty() {
        return Err(invalid("quiz has no title"));
    }
    if quiz.passing_score > 100 {
        return Err(invalid(format!(
            "passing score {} is above 100",
            quiz.passing_score
        )));
    }
    validate_questions(&quiz.questions, quiz.kind)?;
    validate_result_categories(&quiz.result_categories)
}

pub fn validate_result_categories(categories: &BTreeMap<String, ResultCategory>) -> Result<()> {
    for (name, category) in categories {
        if name.trim().is_empty() {
            return Err(invalid("result categories: empty category name"));
        }
        if category.title.trim().is_empty() {
            return Err(invalid(format!("result category '{name}' has no title")));
        }
    }
    Ok(())
}

/// Enforces the shape family: every option of a quiz scores the same way
pub fn validate_questions(questions: &[Question], kind: QuizKind) -> Result<()> {
    let mut question_ids = HashSet::new();

    for (idx, question) in questions.iter().enumerate() {
        let label = format!("question {} ('{}')", idx + 1, question.id);

        if question.id.trim().is_empty() {
            return Err(invalid(format!("question {} has no id", idx + 1)));
        }
        if !question_ids.insert(question.id.as_str()) {
            return Err(invalid(format!("{label}: duplicate question id")));
        }
        if question.prompt.trim().is_empty() {
            return Err(invalid(format!("{label}: empty question text")));
        }
        if question.options.len() < MIN_OPTIONS {
            return Err(invalid(format!(
                "{label}: needs at least {MIN_OPTIONS} options"
            )));
        }

        let mut option_ids = HashSet::new();
        for option in &question.options {
            if !option_ids.insert(option.id.as_str()) {
                return Err(invalid(format!(
                    "{label}: duplicate option id '{}'",
                    option.id
                )));
            }
            if option.scoring.kind() != kind {
                return Err(invalid(format!(
                    "{label}: option '{}' is scored as {} in a {kind} quiz",
                    option.id,
                    option.scoring.kind()
                )));
            }
            match &option.scoring {
                OptionScoring::Knowledge { correct } if *correct > 1 => {
                    return Err(invalid(format!(
                        "{label}: option '{}' has correct={correct}, expected 0 or 1",
                        option.id
                    )));
                }
                OptionScoring::Personality { category, .. } if category.trim().is_empty() => {
                    return Err(invalid(format!(
                        "{label}: option '{}' has no category",
                        option.id
                    )));
                }
                _ => {}
            }
        }

        if kind == QuizKind::Knowledge {
            let correct = question.options.iter().filter(|o| o.is_correct()).count();
            if correct != 1 {
                return Err(invalid(format!(
                    "{label}: expected exactly one correct option, found {correct}"
                )));
            }
        }
    }

    Ok(())
}

pub fn validate_simulation(simulation: &Simulation) -> Result<()> {
    validate_slug(&simulation.slug)?;
    validate_simulation_fields(simulation)
}

fn validate_simulation_fields(simulation: &Simulation) -> Result<()> {
    if simulation.title.trim().is_empty() {
        return Err(invalid("simulation has no title"));
    }
    if simulation.component_type.trim().is_empty() {
        return Err(invalid("simulation has no component_type"));
    }
    validate_steps(&simulation.steps)
}

fn validate_steps(steps: &[SimulationStep]) -> Result<()> {
    for (idx, step) in steps.iter().enumerate() {
        if step.title.trim().is_empty() {
            return Err(invalid(format!("step {} has no title", idx + 1)));
        }
    }
    Ok(())
}
