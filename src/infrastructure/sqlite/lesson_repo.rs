use super::signal_repo::{lock, parse_col, parse_rfc3339};
use crate::domain::entities::lesson::Lesson;
use crate::domain::error::DomainError;
use crate::domain::ports::lesson_repository::LessonRepository;
use crate::domain::values::pattern::PatternId;
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

const COLUMNS: &str =
    "id, pattern, score, win_rate, avg_r, avg_win_r, avg_loss_r, sample_size, summary, updated_at";

pub struct SqliteLessonRepo {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteLessonRepo {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn row_to_lesson(row: &rusqlite::Row) -> Result<Lesson, rusqlite::Error> {
        let pattern: String = row.get(1)?;
        let sample_size: i64 = row.get(7)?;
        let updated: String = row.get(9)?;

        Ok(Lesson {
            id: row.get(0)?,
            pattern: parse_col(&pattern)?,
            score: row.get(2)?,
            win_rate: row.get(3)?,
            avg_r: row.get(4)?,
            avg_win_r: row.get(5)?,
            avg_loss_r: row.get(6)?,
            sample_size: sample_size as usize,
            summary: row.get(8)?,
            updated_at: parse_rfc3339(&updated)?,
        })
    }
}

impl LessonRepository for SqliteLessonRepo {
    fn upsert(&self, lesson: &Lesson) -> Result<(), DomainError> {
        let conn = lock(&self.conn)?;
        conn.execute(
            &format!(
                "INSERT OR REPLACE INTO lessons ({COLUMNS}) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)"
            ),
            params![
                lesson.id,
                lesson.pattern.to_string(),
                lesson.score,
                lesson.win_rate,
                lesson.avg_r,
                lesson.avg_win_r,
                lesson.avg_loss_r,
                lesson.sample_size as i64,
                lesson.summary,
                lesson.updated_at.to_rfc3339(),
            ],
        )
        .map_err(|e| DomainError::Database(format!("Failed to upsert lesson: {e}")))?;
        Ok(())
    }

    fn for_pattern(&self, pattern: PatternId) -> Result<Option<Lesson>, DomainError> {
        let conn = lock(&self.conn)?;
        let mut stmt = conn
            .prepare(&format!("SELECT {COLUMNS} FROM lessons WHERE pattern = ?1"))
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let mut rows = stmt
            .query_map(params![pattern.to_string()], Self::row_to_lesson)
            .map_err(|e| DomainError::Database(e.to_string()))?;
        Ok(rows
            .next()
            .transpose()
            .map_err(|e| DomainError::Parse(e.to_string()))?)
    }

    fn list(&self) -> Result<Vec<Lesson>, DomainError> {
        let conn = lock(&self.conn)?;
        let mut stmt = conn
            .prepare(&format!("SELECT {COLUMNS} FROM lessons ORDER BY pattern ASC"))
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let lessons = stmt
            .query_map([], Self::row_to_lesson)
            .map_err(|e| DomainError::Database(e.to_string()))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| DomainError::Parse(e.to_string()))?;
        Ok(lessons)
    }
}
