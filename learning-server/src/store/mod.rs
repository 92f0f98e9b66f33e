//! SQLite-backed store for lectures, learner progress and quiz questions.

mod seed;

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use learning_common::{Lecture, NewLecture, PerformanceSummary, Progress, StoredQuestion};
use rusqlite::{params, Connection};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(String),
    #[error("IO error: {0}")]
    Io(String),
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        StoreError::Database(e.to_string())
    }
}

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS lectures (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        title TEXT NOT NULL,
        video_url TEXT,
        transcript TEXT,
        summary TEXT,
        created_at TEXT NOT NULL
    );
    CREATE TABLE IF NOT EXISTS progress (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id INTEGER NOT NULL,
        week TEXT,
        mastery INTEGER NOT NULL,
        engagement INTEGER NOT NULL,
        accuracy INTEGER NOT NULL
    );
    CREATE TABLE IF NOT EXISTS questions (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        topic TEXT NOT NULL,
        question TEXT NOT NULL UNIQUE,
        options_json TEXT NOT NULL,
        answer TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_progress_user_id ON progress(user_id);
";

/// Persistent learning records.
pub struct LearningStore {
    conn: Mutex<Connection>,
}

impl LearningStore {
    /// Open (or create) the database at `database_url`.
    ///
    /// Accepts an optional `sqlite:` prefix; `:memory:` opens a private
    /// in-memory database.
    pub fn open(database_url: &str) -> Result<Self, StoreError> {
        let path = database_url.strip_prefix("sqlite:").unwrap_or(database_url);

        if path != ":memory:" {
            if let Some(parent) = Path::new(path).parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent).map_err(|e| StoreError::Io(e.to_string()))?;
            }
        }

        let conn = Connection::open(path)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;

        tracing::info!("Learning store initialized with database: {}", path);
        Ok(store)
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn
            .lock()
            .map_err(|e| StoreError::Database(e.to_string()))
    }

    /// Create any missing tables. Safe to call repeatedly.
    pub fn init_schema(&self) -> Result<(), StoreError> {
        self.conn()?.execute_batch(SCHEMA)?;
        Ok(())
    }

    pub fn save_lecture(&self, title: &str, lecture: &NewLecture) -> Result<i64, StoreError> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO lectures (title, video_url, transcript, summary, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                title,
                lecture.video_url,
                lecture.transcript,
                lecture.summary,
                Utc::now().to_rfc3339(),
            ],
        )?;
        let id = conn.last_insert_rowid();
        tracing::debug!("Saved lecture {}: {}", id, title);
        Ok(id)
    }

    /// All lectures, newest first.
    pub fn list_lectures(&self) -> Result<Vec<Lecture>, StoreError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, title, video_url, transcript, summary, created_at
             FROM lectures ORDER BY id DESC",
        )?;

        let rows = stmt.query_map([], |row| {
            let created_at: String = row.get(5)?;
            Ok(Lecture {
                id: row.get(0)?,
                title: row.get(1)?,
                video_url: row.get(2)?,
                transcript: row.get(3)?,
                summary: row.get(4)?,
                created_at: DateTime::parse_from_rfc3339(&created_at)
                    .map(|dt| dt.with_timezone(&Utc))
                    .unwrap_or_else(|_| Utc::now()),
            })
        })?;

        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn save_progress(
        &self,
        user_id: i64,
        week: Option<&str>,
        mastery: i64,
        engagement: i64,
        accuracy: i64,
    ) -> Result<i64, StoreError> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO progress (user_id, week, mastery, engagement, accuracy)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![user_id, week, mastery, engagement, accuracy],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn list_progress(&self) -> Result<Vec<Progress>, StoreError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, user_id, week, mastery, engagement, accuracy FROM progress ORDER BY id",
        )?;

        let rows = stmt.query_map([], |row| {
            Ok(Progress {
                id: row.get(0)?,
                user_id: row.get(1)?,
                week: row.get(2)?,
                mastery: row.get(3)?,
                engagement: row.get(4)?,
                accuracy: row.get(5)?,
            })
        })?;

        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Averages across all progress entries.
    pub fn performance_summary(&self) -> Result<PerformanceSummary, StoreError> {
        let conn = self.conn()?;
        let (entries, mastery, engagement, accuracy): (i64, Option<f64>, Option<f64>, Option<f64>) =
            conn.query_row(
                "SELECT COUNT(*), AVG(mastery), AVG(engagement), AVG(accuracy) FROM progress",
                [],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
            )?;

        let weakest_area = [
            ("mastery", mastery),
            ("engagement", engagement),
            ("accuracy", accuracy),
        ]
        .into_iter()
        .filter_map(|(name, avg)| avg.map(|a| (name, a)))
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(name, _)| name.to_string());

        Ok(PerformanceSummary {
            entries: entries as usize,
            average_mastery: mastery,
            average_engagement: engagement,
            average_accuracy: accuracy,
            weakest_area,
        })
    }

    /// Insert the sample question set. Questions already present are skipped;
    /// returns how many were inserted.
    pub fn seed_questions(&self) -> Result<usize, StoreError> {
        let conn = self.conn()?;
        let mut inserted = 0;
        for q in seed::SAMPLE_QUESTIONS {
            let options = serde_json::to_string(q.options)
                .map_err(|e| StoreError::Database(e.to_string()))?;
            inserted += conn.execute(
                "INSERT OR IGNORE INTO questions (topic, question, options_json, answer)
                 VALUES (?1, ?2, ?3, ?4)",
                params![q.topic, q.question, options, q.answer],
            )?;
        }
        tracing::info!("Seeded {} questions", inserted);
        Ok(inserted)
    }

    pub fn list_questions(&self) -> Result<Vec<StoredQuestion>, StoreError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, topic, question, options_json, answer FROM questions ORDER BY id",
        )?;

        let rows = stmt.query_map([], |row| {
            let options_json: String = row.get(3)?;
            Ok(StoredQuestion {
                id: row.get(0)?,
                topic: row.get(1)?,
                question: row.get(2)?,
                options: serde_json::from_str(&options_json).unwrap_or_default(),
                answer: row.get(4)?,
            })
        })?;

        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }
}
