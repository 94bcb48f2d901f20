use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::quiz::loader;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Category {
    General,
    CurrentAffairs,
}

impl Category {
    pub const ALL: [Category; 2] = [Category::General, Category::CurrentAffairs];

    /// Directory scanned for this category's topic files.
    pub fn directory(&self) -> &'static str {
        match self {
            Category::General => "gk_topics",
            Category::CurrentAffairs => "current_affairs",
        }
    }

    /// Short code used by transports in button payloads.
    pub fn code(&self) -> &'static str {
        match self {
            Category::General => "gk",
            Category::CurrentAffairs => "ca",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "gk" => Some(Category::General),
            "ca" => Some(Category::CurrentAffairs),
            _ => None,
        }
    }
}

/// One selectable topic. The path is only ever handed to the loader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicEntry {
    pub category: Category,
    pub id: String,
    pub title: String,
    pub path: PathBuf,
}

/// Read-only index of every playable topic, built once at startup and shared
/// behind an `Arc`. Reads never take a lock.
#[derive(Debug, Default)]
pub struct TopicCatalog {
    topics: HashMap<Category, Vec<TopicEntry>>,
}

impl TopicCatalog {
    /// Scans the category directories under `root`. A missing directory or a
    /// structurally broken topic file is logged and skipped, never fatal.
    pub fn build(root: &Path) -> Self {
        let mut topics = HashMap::new();
        for category in Category::ALL {
            topics.insert(category, scan_category(root, category));
        }
        Self { topics }
    }

    pub fn list(&self, category: Category) -> &[TopicEntry] {
        self.topics.get(&category).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn resolve(&self, category: Category, id: &str) -> Option<&TopicEntry> {
        self.list(category).iter().find(|entry| entry.id == id)
    }
}

fn scan_category(root: &Path, category: Category) -> Vec<TopicEntry> {
    let dir = root.join(category.directory());
    let entries = match fs::read_dir(&dir) {
        Ok(entries) => entries,
        Err(_) => {
            warn!(
                "Directory '{}' not found. Create it and add JSON topic files.",
                dir.display()
            );
            return Vec::new();
        }
    };

    let mut paths: Vec<PathBuf> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.extension().map_or(false, |ext| ext == "json"))
        .collect();
    paths.sort();

    let mut topics = Vec::new();
    for path in paths {
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        match loader::probe_title(&path) {
            Ok(title) => {
                let title = title.unwrap_or_else(|| prettify_stem(stem));
                info!("Loaded topic: {}", title);
                topics.push(TopicEntry {
                    category,
                    id: stem.to_string(),
                    title,
                    path,
                });
            }
            Err(err) => {
                warn!("Skipping topic file {}: {}", path.display(), err);
            }
        }
    }
    topics
}

/// Fallback title when the resource has none: "world_capitals" and
/// "WORLD_CAPITALS" both become "World Capitals".
fn prettify_stem(stem: &str) -> String {
    stem.split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(|c| c.to_lowercase()))
                    .collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;

    fn write_file(dir: &Path, name: &str, body: &str) {
        let mut file = File::create(dir.join(name)).unwrap();
        file.write_all(body.as_bytes()).unwrap();
    }

    fn seed_root() -> tempfile::TempDir {
        let root = tempfile::tempdir().unwrap();
        let gk = root.path().join("gk_topics");
        fs::create_dir(&gk).unwrap();
        write_file(
            &gk,
            "world_capitals.json",
            r#"{"questions": [{"question": "Capital of France?", "options": ["Paris"], "answer": "Paris"}]}"#,
        );
        write_file(
            &gk,
            "rivers.json",
            r#"{"title": "Great Rivers", "questions": []}"#,
        );
        write_file(&gk, "broken.json", r#"{"questions": 42}"#);
        write_file(&gk, "notes.txt", "not a topic");
        root
    }

    #[test]
    fn build_indexes_valid_topics_and_drops_broken_ones() {
        let root = seed_root();
        let catalog = TopicCatalog::build(root.path());
        let entries = catalog.list(Category::General);
        let ids: Vec<&str> = entries.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["rivers", "world_capitals"]);
    }

    #[test]
    fn titles_come_from_the_file_or_the_filename() {
        let root = seed_root();
        let catalog = TopicCatalog::build(root.path());
        let rivers = catalog.resolve(Category::General, "rivers").unwrap();
        assert_eq!(rivers.title, "Great Rivers");
        let capitals = catalog.resolve(Category::General, "world_capitals").unwrap();
        assert_eq!(capitals.title, "World Capitals");
    }

    #[test]
    fn missing_category_directory_yields_an_empty_listing() {
        let root = seed_root();
        let catalog = TopicCatalog::build(root.path());
        assert!(catalog.list(Category::CurrentAffairs).is_empty());
    }

    #[test]
    fn resolve_misses_cleanly() {
        let root = seed_root();
        let catalog = TopicCatalog::build(root.path());
        assert!(catalog.resolve(Category::General, "oceans").is_none());
        assert!(catalog.resolve(Category::CurrentAffairs, "rivers").is_none());
    }

    #[test]
    fn prettify_title_cases_each_word() {
        assert_eq!(prettify_stem("world_capitals"), "World Capitals");
        assert_eq!(prettify_stem("WORLD_CAPITALS"), "World Capitals");
        assert_eq!(prettify_stem("indian__history"), "Indian History");
    }

    #[test]
    fn category_codes_round_trip() {
        for category in Category::ALL {
            assert_eq!(Category::from_code(category.code()), Some(category));
        }
        assert_eq!(Category::from_code("nope"), None);
    }
}
