use include_dir::{include_dir, Dir};
use serde::de::DeserializeOwned;

use super::{Blog, QuizDefinition, Simulation};
use crate::error::{Error, Result};

static SEED_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/src/content/seed");

/// Content shipped inside the binary and imported into a fresh store
#[derive(Debug, Clone)]
pub struct SeedBundle {
    pub blogs: Vec<Blog>,
    pub quizzes: Vec<QuizDefinition>,
    pub simulations: Vec<Simulation>,
}

impl SeedBundle {
    pub fn load() -> Result<Self> {
        Ok(Self {
            blogs: read_seed_file("blogs.json")?,
            quizzes: read_seed_file("quizzes.json")?,
            simulations: read_seed_file("simulations.json")?,
        })
    }
}

fn read_seed_file<T: DeserializeOwned>(file_name: &str) -> Result<T> {
    let file = SEED_DIR
        .get_file(file_name)
        .ok_or_else(|| Error::not_found("seed file", file_name))?;

    let contents = file
        .contents_utf8()
        .ok_or_else(|| Error::Validation(format!("{file_name} is not valid utf-8")))?;

    Ok(serde_json::from_str(contents)?)
}
