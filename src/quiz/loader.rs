use std::fs::File;
use std::io;
use std::path::Path;

use crate::quiz::Question;

/// Why a topic selection could not turn into a quiz.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoadError {
    #[error("topic file is missing")]
    NotFound,
    #[error("topic file is not a valid question set: {0}")]
    Malformed(String),
    #[error("topic has no usable questions")]
    Empty,
}

/// On-disk shape of one topic resource.
#[derive(serde::Deserialize)]
struct TopicFile {
    #[serde(default)]
    title: Option<String>,
    questions: Vec<Question>,
}

/// Reads a topic file and returns its questions, invalid entries included --
/// the session skips those one by one so the rest of the set still plays.
/// Fails with `Empty` when not a single question is playable.
pub fn load(path: &Path) -> Result<Vec<Question>, LoadError> {
    let parsed = parse_topic_file(path)?;
    if !parsed.questions.iter().any(Question::is_valid) {
        return Err(LoadError::Empty);
    }
    Ok(parsed.questions)
}

/// Structural check used at catalog-build time: the resource must parse and
/// carry a `questions` list. Returns the optional `title` field.
pub fn probe_title(path: &Path) -> Result<Option<String>, LoadError> {
    Ok(parse_topic_file(path)?.title)
}

fn parse_topic_file(path: &Path) -> Result<TopicFile, LoadError> {
    let file = File::open(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => LoadError::NotFound,
        _ => LoadError::Malformed(e.to_string()),
    })?;
    serde_json::from_reader(file).map_err(|e| LoadError::Malformed(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_topic(dir: &tempfile::TempDir, name: &str, body: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut file = File::create(&path).unwrap();
        file.write_all(body.as_bytes()).unwrap();
        path
    }

    #[test]
    fn loads_a_valid_topic() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_topic(
            &dir,
            "capitals.json",
            r#"{"title": "Capitals", "questions": [
                {"question": "Capital of France?", "options": ["Paris", "Berlin"], "answer": "Paris"}
            ]}"#,
        );
        let questions = load(&path).unwrap();
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].answer, "Paris");
    }

    #[test]
    fn keeps_invalid_entries_alongside_valid_ones() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_topic(
            &dir,
            "mixed.json",
            r#"{"questions": [
                {"question": "Capital of France?", "options": ["Paris", "Berlin"], "answer": "Paris"},
                {"question": "Capital of Japan?", "options": ["Tokyo", "Seoul"]}
            ]}"#,
        );
        let questions = load(&path).unwrap();
        assert_eq!(questions.len(), 2);
        assert!(!questions[1].is_valid());
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(
            load(&dir.path().join("nope.json")),
            Err(LoadError::NotFound)
        );
    }

    #[test]
    fn bad_json_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_topic(&dir, "broken.json", "{not json");
        assert!(matches!(load(&path), Err(LoadError::Malformed(_))));
    }

    #[test]
    fn questions_field_must_be_a_list() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_topic(&dir, "shape.json", r#"{"questions": "all of them"}"#);
        assert!(matches!(load(&path), Err(LoadError::Malformed(_))));
        let path = write_topic(&dir, "absent.json", r#"{"title": "Empty shell"}"#);
        assert!(matches!(load(&path), Err(LoadError::Malformed(_))));
    }

    #[test]
    fn all_invalid_questions_count_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_topic(
            &dir,
            "empty.json",
            r#"{"questions": [{"question": "No options here"}]}"#,
        );
        assert_eq!(load(&path), Err(LoadError::Empty));
        let path = write_topic(&dir, "none.json", r#"{"questions": []}"#);
        assert_eq!(load(&path), Err(LoadError::Empty));
    }

    #[test]
    fn probe_reads_the_title_without_requiring_valid_questions() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_topic(
            &dir,
            "titled.json",
            r#"{"title": "World Capitals", "questions": []}"#,
        );
        assert_eq!(probe_title(&path).unwrap(), Some("World Capitals".to_string()));
    }
}
