use crate::domain::error::{AppError, Result};
use crate::domain::question::{QuestionCatalog, QuestionDefinition};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

pub const QUESTIONS_FILE: &str = "questions.json";

/// Reads `<questions_dir>/<event>/questions.json` for every event directory.
/// Events whose file is missing or malformed are skipped with a warning.
pub fn load_question_catalog(questions_dir: &Path) -> Result<QuestionCatalog> {
    let entries = fs::read_dir(questions_dir).map_err(|e| {
        AppError::ConfigError(format!(
            "Failed to read questions dir {}: {}",
            questions_dir.display(),
            e
        ))
    })?;

    let mut events = BTreeMap::new();
    for entry in entries {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        let event_name = entry.file_name().to_string_lossy().to_string();
        let file = entry.path().join(QUESTIONS_FILE);

        match read_questions(&file) {
            Ok(questions) => {
                info!(event = %event_name, count = questions.len(), "Loaded questions");
                events.insert(event_name, questions);
            }
            Err(err) => {
                warn!(event = %event_name, file = %file.display(), error = %err, "Skipping event");
            }
        }
    }

    Ok(QuestionCatalog::new(events))
}

fn read_questions(file: &Path) -> Result<Vec<QuestionDefinition>> {
    let raw = fs::read_to_string(file)?;
    serde_json::from_str(&raw)
        .map_err(|e| AppError::ConfigError(format!("Invalid question file: {}", e)))
}

/// Creates the directory holding a `sqlite://` database file.
pub fn ensure_database_dir(database_url: &str) -> std::io::Result<()> {
    let Some(path) = database_url.strip_prefix("sqlite://") else {
        return Ok(());
    };
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() || path.starts_with(":memory:") {
        return Ok(());
    }
    match Path::new(path).parent() {
        Some(parent) if !parent.as_os_str().is_empty() => ensure_dir(parent),
        _ => Ok(()),
    }
}

fn ensure_dir(path: &Path) -> std::io::Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)?;
    }
    Ok(())
}
