use std::path::Path;

use chrono::{DateTime, Local};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info};

use crate::admin::hash_password;
use crate::content::validate::{
    parse_blog, parse_questions, parse_quiz, parse_result_categories, parse_simulation,
    parse_steps, validate_blog, validate_quiz, validate_simulation,
};
use crate::content::{Blog, QuizDefinition, QuizKind, SeedBundle, Simulation, SimulationStep};
use crate::error::{Error, Result};
use crate::history::{QuizAttempt, SimulationRun};
use crate::util::{random_id, unique_slug};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS blogs (
    id TEXT PRIMARY KEY,
    slug TEXT NOT NULL UNIQUE,
    title TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    content TEXT NOT NULL DEFAULT '',
    read_time TEXT NOT NULL DEFAULT '',
    image_url TEXT NOT NULL DEFAULT '',
    category TEXT NOT NULL DEFAULT '',
    difficulty TEXT NOT NULL DEFAULT '',
    published BOOLEAN NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS quizzes (
    id TEXT PRIMARY KEY,
    slug TEXT NOT NULL UNIQUE,
    title TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    quiz_type TEXT NOT NULL,
    questions TEXT NOT NULL,
    result_categories TEXT NOT NULL DEFAULT '{}',
    passing_score INTEGER NOT NULL DEFAULT 70,
    icon TEXT NOT NULL DEFAULT '',
    color_scheme TEXT NOT NULL DEFAULT '',
    published BOOLEAN NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS simulations (
    id TEXT PRIMARY KEY,
    slug TEXT NOT NULL UNIQUE,
    title TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    category TEXT NOT NULL DEFAULT '',
    difficulty TEXT NOT NULL DEFAULT '',
    duration TEXT NOT NULL DEFAULT '',
    component_type TEXT NOT NULL,
    order_index INTEGER NOT NULL DEFAULT 0,
    icon TEXT NOT NULL DEFAULT '',
    color_scheme TEXT NOT NULL DEFAULT '',
    published BOOLEAN NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS simulation_steps (
    id TEXT PRIMARY KEY,
    simulation_id TEXT NOT NULL REFERENCES simulations(id) ON DELETE CASCADE,
    step_order INTEGER NOT NULL,
    title TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    hints TEXT NOT NULL DEFAULT '[]'
);

CREATE INDEX IF NOT EXISTS idx_simulation_steps_sim
    ON simulation_steps(simulation_id, step_order);

CREATE TABLE IF NOT EXISTS admin_config (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    password_hash TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS quiz_attempts (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    quiz_slug TEXT NOT NULL,
    kind TEXT NOT NULL,
    score INTEGER NOT NULL,
    total INTEGER NOT NULL,
    percentage INTEGER NOT NULL,
    passed BOOLEAN NOT NULL,
    category TEXT,
    taken_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS simulation_runs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    simulation_slug TEXT NOT NULL,
    hints_viewed INTEGER NOT NULL,
    completed_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS meta (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);
"#;

const SEEDED_KEY: &str = "seeded";

/// Read side used by the TUI, so views can be driven by a fake in tests
pub trait ContentSource {
    fn fetch_quizzes(&self, kind: Option<QuizKind>) -> Result<Vec<QuizDefinition>>;
    fn fetch_quiz_by_slug(&self, slug: &str) -> Result<Option<QuizDefinition>>;
    fn fetch_simulations(&self) -> Result<Vec<Simulation>>;
    fn fetch_simulation_by_slug(&self, slug: &str) -> Result<Option<Simulation>>;
    fn fetch_simulation_steps(&self, simulation_id: &str) -> Result<Vec<SimulationStep>>;
    fn record_quiz_attempt(&self, attempt: &QuizAttempt) -> Result<()>;
    fn record_simulation_run(&self, run: &SimulationRun) -> Result<()>;
}

/// SQLite-backed store for all site content plus local history
#[derive(Debug)]
pub struct ContentStore {
    conn: Connection,
}

fn now() -> String {
    Local::now().to_rfc3339()
}

fn json_column<T: DeserializeOwned>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T> {
    let text: String = row.get(idx)?;
    serde_json::from_str(&text)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// A JSON column run through one of the content parsers
fn parsed_column<T>(
    row: &Row<'_>,
    idx: usize,
    parse: impl FnOnce(&str) -> Result<T>,
) -> rusqlite::Result<T> {
    let text: String = row.get(idx)?;
    parse(&text)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn time_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Local>> {
    let text: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&text)
        .map(|t| t.with_timezone(&Local))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn to_json<T: Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string(value)?)
}

const BLOG_COLUMNS: &str = "id, slug, title, description, content, read_time, image_url, \
                            category, difficulty, published, created_at, updated_at";

fn blog_from_row(row: &Row<'_>) -> rusqlite::Result<Blog> {
    Ok(Blog {
        id: row.get(0)?,
        slug: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        content: row.get(4)?,
        read_time: row.get(5)?,
        image_url: row.get(6)?,
        category: row.get(7)?,
        difficulty: row.get(8)?,
        published: row.get(9)?,
        created_at: row.get(10)?,
        updated_at: row.get(11)?,
    })
}

const QUIZ_COLUMNS: &str = "id, slug, title, description, quiz_type, questions, \
                            result_categories, passing_score, icon, color_scheme, published";

fn quiz_from_row(row: &Row<'_>) -> rusqlite::Result<QuizDefinition> {
    let kind_text: String = row.get(4)?;
    let kind = QuizKind::parse(&kind_text).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            4,
            Type::Text,
            format!("unknown quiz type '{kind_text}'").into(),
        )
    })?;
    Ok(QuizDefinition {
        id: row.get(0)?,
        slug: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        kind,
        questions: parsed_column(row, 5, |json| parse_questions(json, kind))?,
        result_categories: parsed_column(row, 6, parse_result_categories)?,
        passing_score: row.get(7)?,
        icon: row.get(8)?,
        color_scheme: row.get(9)?,
        published: row.get(10)?,
    })
}

const SIMULATION_COLUMNS: &str = "id, slug, title, description, category, difficulty, duration, \
                                  component_type, order_index, icon, color_scheme, published";

fn simulation_from_row(row: &Row<'_>) -> rusqlite::Result<Simulation> {
    Ok(Simulation {
        id: row.get(0)?,
        slug: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        category: row.get(4)?,
        difficulty: row.get(5)?,
        duration: row.get(6)?,
        component_type: row.get(7)?,
        order_index: row.get(8)?,
        icon: row.get(9)?,
        color_scheme: row.get(10)?,
        published: row.get(11)?,
        steps: Vec::new(),
    })
}

fn existing_id(conn: &Connection, table: &str, slug: &str) -> Result<Option<String>> {
    let sql = format!("SELECT id FROM {table} WHERE slug = ?1");
    Ok(conn
        .query_row(&sql, [slug], |row| row.get(0))
        .optional()?)
}

/// Keeps the id of an existing row with the same slug so updates don't orphan children
fn resolve_id(conn: &Connection, table: &str, slug: &str, given: &str) -> Result<String> {
    if let Some(id) = existing_id(conn, table, slug)? {
        return Ok(id);
    }
    Ok(if given.is_empty() {
        random_id()
    } else {
        given.to_string()
    })
}

fn upsert_blog_in(conn: &Connection, blog: &Blog) -> Result<String> {
    let id = resolve_id(conn, "blogs", &blog.slug, &blog.id)?;
    let stamp = now();
    let created_at = if blog.created_at.is_empty() {
        stamp.clone()
    } else {
        blog.created_at.clone()
    };
    conn.execute(
        r#"
        INSERT INTO blogs (id, slug, title, description, content, read_time, image_url,
                           category, difficulty, published, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
        ON CONFLICT(id) DO UPDATE SET
            slug = excluded.slug, title = excluded.title, description = excluded.description,
            content = excluded.content, read_time = excluded.read_time,
            image_url = excluded.image_url, category = excluded.category,
            difficulty = excluded.difficulty, published = excluded.published,
            updated_at = excluded.updated_at
        "#,
        params![
            id,
            blog.slug,
            blog.title,
            blog.description,
            blog.content,
            blog.read_time,
            blog.image_url,
            blog.category,
            blog.difficulty,
            blog.published,
            created_at,
            stamp,
        ],
    )?;
    Ok(id)
}

fn upsert_quiz_in(conn: &Connection, quiz: &QuizDefinition) -> Result<String> {
    let id = resolve_id(conn, "quizzes", &quiz.slug, &quiz.id)?;
    let stamp = now();
    conn.execute(
        r#"
        INSERT INTO quizzes (id, slug, title, description, quiz_type, questions,
                             result_categories, passing_score, icon, color_scheme, published,
                             created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?12)
        ON CONFLICT(id) DO UPDATE SET
            slug = excluded.slug, title = excluded.title, description = excluded.description,
            quiz_type = excluded.quiz_type, questions = excluded.questions,
            result_categories = excluded.result_categories,
            passing_score = excluded.passing_score, icon = excluded.icon,
            color_scheme = excluded.color_scheme, published = excluded.published,
            updated_at = excluded.updated_at
        "#,
        params![
            id,
            quiz.slug,
            quiz.title,
            quiz.description,
            quiz.kind.to_string(),
            to_json(&quiz.questions)?,
            to_json(&quiz.result_categories)?,
            quiz.passing_score,
            quiz.icon,
            quiz.color_scheme,
            quiz.published,
            stamp,
        ],
    )?;
    Ok(id)
}

fn upsert_simulation_in(conn: &Connection, sim: &Simulation) -> Result<String> {
    let id = resolve_id(conn, "simulations", &sim.slug, &sim.id)?;
    let stamp = now();
    conn.execute(
        r#"
        INSERT INTO simulations (id, slug, title, description, category, difficulty, duration,
                                 component_type, order_index, icon, color_scheme, published,
                                 created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?13)
        ON CONFLICT(id) DO UPDATE SET
            slug = excluded.slug, title = excluded.title, description = excluded.description,
            category = excluded.category, difficulty = excluded.difficulty,
            duration = excluded.duration, component_type = excluded.component_type,
            order_index = excluded.order_index, icon = excluded.icon,
            color_scheme = excluded.color_scheme, published = excluded.published,
            updated_at = excluded.updated_at
        "#,
        params![
            id,
            sim.slug,
            sim.title,
            sim.description,
            sim.category,
            sim.difficulty,
            sim.duration,
            sim.component_type,
            sim.order_index,
            sim.icon,
            sim.color_scheme,
            sim.published,
            stamp,
        ],
    )?;
    if !sim.steps.is_empty() {
        replace_steps_in(conn, &id, &sim.steps)?;
    }
    Ok(id)
}

/// Steps are renumbered 0.. in the order given
fn replace_steps_in(conn: &Connection, simulation_id: &str, steps: &[SimulationStep]) -> Result<()> {
    conn.execute(
        "DELETE FROM simulation_steps WHERE simulation_id = ?1",
        [simulation_id],
    )?;
    let mut stmt = conn.prepare(
        r#"
        INSERT INTO simulation_steps (id, simulation_id, step_order, title, description, hints)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        "#,
    )?;
    for (idx, step) in steps.iter().enumerate() {
        let id = if step.id.is_empty() {
            random_id()
        } else {
            step.id.clone()
        };
        stmt.execute(params![
            id,
            simulation_id,
            idx as u32,
            step.title,
            step.description,
            to_json(&step.hints)?,
        ])?;
    }
    Ok(())
}

impl ContentStore {
    /// Open (creating if needed) the database at `path` and seed it on first use
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;
        debug!(path = %path.display(), "content store opened");
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.execute_batch(SCHEMA)?;
        let mut store = Self { conn };
        store.seed_bundled()?;
        Ok(store)
    }

    pub fn is_seeded(&self) -> Result<bool> {
        let value: Option<String> = self
            .conn
            .query_row("SELECT value FROM meta WHERE key = ?1", [SEEDED_KEY], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value.is_some())
    }

    /// Import the content bundled into the binary. Runs once per database.
    pub fn seed_bundled(&mut self) -> Result<bool> {
        if self.is_seeded()? {
            return Ok(false);
        }
        let bundle = SeedBundle::load()?;
        let tx = self.conn.transaction()?;
        for blog in &bundle.blogs {
            upsert_blog_in(&tx, blog)?;
        }
        for quiz in &bundle.quizzes {
            upsert_quiz_in(&tx, quiz)?;
        }
        for sim in &bundle.simulations {
            upsert_simulation_in(&tx, sim)?;
        }
        tx.execute(
            "INSERT INTO meta (key, value) VALUES (?1, ?2)",
            params![SEEDED_KEY, now()],
        )?;
        tx.commit()?;
        info!(
            blogs = bundle.blogs.len(),
            quizzes = bundle.quizzes.len(),
            simulations = bundle.simulations.len(),
            "content seeded"
        );
        Ok(true)
    }

    /// Published blogs, newest first
    pub fn fetch_blogs(&self) -> Result<Vec<Blog>> {
        let sql = format!(
            "SELECT {BLOG_COLUMNS} FROM blogs WHERE published = 1 \
             ORDER BY created_at DESC, rowid DESC"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([], blog_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn fetch_blog_by_slug(&self, slug: &str) -> Result<Option<Blog>> {
        let sql = format!("SELECT {BLOG_COLUMNS} FROM blogs WHERE slug = ?1 AND published = 1");
        Ok(self.conn.query_row(&sql, [slug], blog_from_row).optional()?)
    }

    pub fn blog_slugs(&self) -> Result<Vec<String>> {
        self.slugs("blogs")
    }

    pub fn quiz_slugs(&self) -> Result<Vec<String>> {
        self.slugs("quizzes")
    }

    pub fn simulation_slugs(&self) -> Result<Vec<String>> {
        self.slugs("simulations")
    }

    /// Every slug in `table`, drafts included
    fn slugs(&self, table: &str) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(&format!("SELECT slug FROM {table}"))?;
        let rows = stmt.query_map([], |row| row.get(0))?;
        Ok(rows.collect::<rusqlite::Result<Vec<String>>>()?)
    }

    pub fn upsert_blog(&self, blog: &Blog) -> Result<String> {
        validate_blog(blog)?;
        upsert_blog_in(&self.conn, blog)
    }

    pub fn delete_blog(&self, slug: &str) -> Result<bool> {
        Ok(self.conn.execute("DELETE FROM blogs WHERE slug = ?1", [slug])? > 0)
    }

    pub fn upsert_quiz(&self, quiz: &QuizDefinition) -> Result<String> {
        validate_quiz(quiz)?;
        upsert_quiz_in(&self.conn, quiz)
    }

    pub fn delete_quiz(&self, slug: &str) -> Result<bool> {
        Ok(self.conn.execute("DELETE FROM quizzes WHERE slug = ?1", [slug])? > 0)
    }

    /// Upsert plus, when the simulation carries steps, a replacement of its stored steps
    pub fn upsert_simulation(&mut self, sim: &Simulation) -> Result<String> {
        validate_simulation(sim)?;
        let tx = self.conn.transaction()?;
        let id = upsert_simulation_in(&tx, sim)?;
        tx.commit()?;
        Ok(id)
    }

    pub fn delete_simulation(&self, slug: &str) -> Result<bool> {
        Ok(self
            .conn
            .execute("DELETE FROM simulations WHERE slug = ?1", [slug])?
            > 0)
    }

    /// Replace a simulation's stored steps with a JSON array of steps
    pub fn import_steps(
        &mut self,
        simulation_slug: &str,
        json: &str,
    ) -> Result<Vec<SimulationStep>> {
        let steps = parse_steps(json)?;
        let id = existing_id(&self.conn, "simulations", simulation_slug)?
            .ok_or_else(|| Error::not_found("simulation", simulation_slug))?;
        self.replace_steps(&id, &steps)?;
        info!(slug = simulation_slug, steps = steps.len(), "simulation steps replaced");
        self.fetch_simulation_steps(&id)
    }

    pub fn replace_steps(&mut self, simulation_id: &str, steps: &[SimulationStep]) -> Result<()> {
        let tx = self.conn.transaction()?;
        replace_steps_in(&tx, simulation_id, steps)?;
        tx.commit()?;
        Ok(())
    }

    /// Reorder by step ids, looked up through the simulation's slug
    pub fn reorder_steps_by_slug(
        &mut self,
        simulation_slug: &str,
        ordered_ids: &[String],
    ) -> Result<()> {
        let id = existing_id(&self.conn, "simulations", simulation_slug)?
            .ok_or_else(|| Error::not_found("simulation", simulation_slug))?;
        self.reorder_steps(&id, ordered_ids)
    }

    /// Rewrite `step_order` to each id's index in `ordered_ids`
    pub fn reorder_steps(&mut self, simulation_id: &str, ordered_ids: &[String]) -> Result<()> {
        let tx = self.conn.transaction()?;
        for (idx, step_id) in ordered_ids.iter().enumerate() {
            let changed = tx.execute(
                "UPDATE simulation_steps SET step_order = ?1 WHERE id = ?2 AND simulation_id = ?3",
                params![idx as u32, step_id, simulation_id],
            )?;
            if changed == 0 {
                return Err(Error::not_found("simulation step", step_id.as_str()));
            }
        }
        tx.commit()?;
        Ok(())
    }

    /// Parse, fill in a slug when missing, validate and store a quiz document
    pub fn import_quiz(&self, json: &str) -> Result<QuizDefinition> {
        let mut quiz = parse_quiz(json)?;
        if quiz.slug.is_empty() {
            quiz.slug = unique_slug(&quiz.title, &self.quiz_slugs()?);
        }
        quiz.id = self.upsert_quiz(&quiz)?;
        info!(slug = %quiz.slug, "quiz imported");
        Ok(quiz)
    }

    pub fn import_blog(&self, json: &str) -> Result<Blog> {
        let mut blog = parse_blog(json)?;
        if blog.slug.is_empty() {
            blog.slug = unique_slug(&blog.title, &self.blog_slugs()?);
        }
        let id = self.upsert_blog(&blog)?;
        info!(slug = %blog.slug, "blog imported");
        Ok(Blog { id, ..blog })
    }

    pub fn import_simulation(&mut self, json: &str) -> Result<Simulation> {
        let mut sim = parse_simulation(json)?;
        if sim.slug.is_empty() {
            sim.slug = unique_slug(&sim.title, &self.simulation_slugs()?);
        }
        sim.id = self.upsert_simulation(&sim)?;
        info!(slug = %sim.slug, steps = sim.steps.len(), "simulation imported");
        Ok(sim)
    }

    pub fn admin_password_hash(&self) -> Result<Option<String>> {
        Ok(self
            .conn
            .query_row(
                "SELECT password_hash FROM admin_config WHERE id = 1",
                [],
                |row| row.get(0),
            )
            .optional()?)
    }

    pub fn set_admin_password(&self, password: &str) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT INTO admin_config (id, password_hash, updated_at) VALUES (1, ?1, ?2)
            ON CONFLICT(id) DO UPDATE SET
                password_hash = excluded.password_hash, updated_at = excluded.updated_at
            "#,
            params![hash_password(password), now()],
        )?;
        info!("admin password updated");
        Ok(())
    }

    pub fn recent_quiz_attempts(&self, limit: usize) -> Result<Vec<QuizAttempt>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT quiz_slug, kind, score, total, percentage, passed, category, taken_at
            FROM quiz_attempts
            ORDER BY taken_at DESC, id DESC
            LIMIT ?1
            "#,
        )?;
        let rows = stmt.query_map([limit as i64], |row| {
            let kind_text: String = row.get(1)?;
            Ok(QuizAttempt {
                quiz_slug: row.get(0)?,
                kind: QuizKind::parse(&kind_text).unwrap_or(QuizKind::Knowledge),
                score: row.get::<_, i64>(2)? as usize,
                total: row.get::<_, i64>(3)? as usize,
                percentage: row.get(4)?,
                passed: row.get(5)?,
                category: row.get(6)?,
                taken_at: time_column(row, 7)?,
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn recent_simulation_runs(&self, limit: usize) -> Result<Vec<SimulationRun>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT simulation_slug, hints_viewed, completed_at
            FROM simulation_runs
            ORDER BY completed_at DESC, id DESC
            LIMIT ?1
            "#,
        )?;
        let rows = stmt.query_map([limit as i64], |row| {
            Ok(SimulationRun {
                simulation_slug: row.get(0)?,
                hints_viewed: row.get::<_, i64>(1)? as usize,
                completed_at: time_column(row, 2)?,
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }
}

impl ContentSource for ContentStore {
    /// Published quizzes, newest first, optionally of one kind
    fn fetch_quizzes(&self, kind: Option<QuizKind>) -> Result<Vec<QuizDefinition>> {
        let sql = format!(
            "SELECT {QUIZ_COLUMNS} FROM quizzes \
             WHERE published = 1 AND (?1 IS NULL OR quiz_type = ?1) \
             ORDER BY created_at DESC, rowid DESC"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([kind.map(|k| k.to_string())], quiz_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    fn fetch_quiz_by_slug(&self, slug: &str) -> Result<Option<QuizDefinition>> {
        let sql = format!("SELECT {QUIZ_COLUMNS} FROM quizzes WHERE slug = ?1 AND published = 1");
        Ok(self.conn.query_row(&sql, [slug], quiz_from_row).optional()?)
    }

    /// Published simulations by `order_index`
    fn fetch_simulations(&self) -> Result<Vec<Simulation>> {
        let sql = format!(
            "SELECT {SIMULATION_COLUMNS} FROM simulations WHERE published = 1 \
             ORDER BY order_index ASC, title ASC"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([], simulation_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    fn fetch_simulation_by_slug(&self, slug: &str) -> Result<Option<Simulation>> {
        let sql = format!(
            "SELECT {SIMULATION_COLUMNS} FROM simulations WHERE slug = ?1 AND published = 1"
        );
        Ok(self
            .conn
            .query_row(&sql, [slug], simulation_from_row)
            .optional()?)
    }

    fn fetch_simulation_steps(&self, simulation_id: &str) -> Result<Vec<SimulationStep>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, step_order, title, description, hints
            FROM simulation_steps
            WHERE simulation_id = ?1
            ORDER BY step_order ASC
            "#,
        )?;
        let rows = stmt.query_map([simulation_id], |row| {
            Ok(SimulationStep {
                id: row.get(0)?,
                step_order: row.get(1)?,
                title: row.get(2)?,
                description: row.get(3)?,
                hints: json_column(row, 4)?,
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    fn record_quiz_attempt(&self, attempt: &QuizAttempt) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT INTO quiz_attempts
            (quiz_slug, kind, score, total, percentage, passed, category, taken_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                attempt.quiz_slug,
                attempt.kind.to_string(),
                attempt.score as i64,
                attempt.total as i64,
                attempt.percentage,
                attempt.passed,
                attempt.category,
                attempt.taken_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    fn record_simulation_run(&self, run: &SimulationRun) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT INTO simulation_runs (simulation_slug, hints_viewed, completed_at)
            VALUES (?1, ?2, ?3)
            "#,
            params![
                run.simulation_slug,
                run.hints_viewed as i64,
                run.completed_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }
}
