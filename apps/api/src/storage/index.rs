//! Identifier → directory resolution.
//!
//! Sessions and transcriptions live at paths that embed their parent's
//! identifier, but callers usually only hold the child id. The store keeps
//! an in-process map filled on creation; ids it has never seen (data written
//! by an earlier process) are resolved by walking the upload root by naming
//! convention and then cached.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use uuid::Uuid;
use walkdir::WalkDir;

/// Deepest layout is `root/{resume}/interviews/{session}/audio/{transcription}`.
const SEARCH_MAX_DEPTH: usize = 5;

pub const INTERVIEWS_DIR: &str = "interviews";
pub const AUDIO_DIR: &str = "audio";
pub const TEMP_DIR: &str = "temp";
pub const SESSION_FILE: &str = "session.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    Session,
    Transcription,
}

#[derive(Debug, Default)]
pub struct PathIndex {
    entries: RwLock<HashMap<(EntryKind, Uuid), PathBuf>>,
}

impl PathIndex {
    pub fn insert(&self, kind: EntryKind, id: Uuid, dir: PathBuf) {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.insert((kind, id), dir);
    }

    pub fn get(&self, kind: EntryKind, id: Uuid) -> Option<PathBuf> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.get(&(kind, id)).cloned()
    }
}

/// Finds `…/interviews/{session_id}/` holding a `session.json`.
/// First match in walk order wins.
pub fn search_session_dir(root: &Path, session_id: Uuid) -> Option<PathBuf> {
    let name = session_id.to_string();
    search(root, |dir| {
        file_name_is(dir, &name)
            && dir.parent().is_some_and(|p| file_name_is(p, INTERVIEWS_DIR))
            && dir.join(SESSION_FILE).is_file()
    })
}

/// Finds `root/temp/{id}/` or `…/audio/{id}/`.
pub fn search_transcription_dir(root: &Path, transcription_id: Uuid) -> Option<PathBuf> {
    let direct = root.join(TEMP_DIR).join(transcription_id.to_string());
    if direct.is_dir() {
        return Some(direct);
    }
    let name = transcription_id.to_string();
    search(root, |dir| {
        file_name_is(dir, &name) && dir.parent().is_some_and(|p| file_name_is(p, AUDIO_DIR))
    })
}

fn search(root: &Path, matches: impl Fn(&Path) -> bool) -> Option<PathBuf> {
    WalkDir::new(root)
        .min_depth(1)
        .max_depth(SEARCH_MAX_DEPTH)
        .follow_links(false)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_dir())
        .find(|e| matches(e.path()))
        .map(|e| e.into_path())
}

fn file_name_is(path: &Path, name: &str) -> bool {
    path.file_name().is_some_and(|n| n == name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_index_insert_and_get() {
        let index = PathIndex::default();
        let id = Uuid::new_v4();
        assert!(index.get(EntryKind::Session, id).is_none());
        index.insert(EntryKind::Session, id, PathBuf::from("/x"));
        assert_eq!(index.get(EntryKind::Session, id), Some(PathBuf::from("/x")));
        // Kinds are separate namespaces.
        assert!(index.get(EntryKind::Transcription, id).is_none());
    }

    #[test]
    fn test_search_session_requires_interviews_parent_and_file() {
        let root = TempDir::new().unwrap();
        let session_id = Uuid::new_v4();

        // Wrong parent: not found.
        let decoy = root.path().join("elsewhere").join(session_id.to_string());
        std::fs::create_dir_all(&decoy).unwrap();
        std::fs::write(decoy.join(SESSION_FILE), "{}").unwrap();
        assert!(search_session_dir(root.path(), session_id).is_none());

        // Right parent, no session.json yet: not found.
        let real = root
            .path()
            .join(Uuid::new_v4().to_string())
            .join(INTERVIEWS_DIR)
            .join(session_id.to_string());
        std::fs::create_dir_all(&real).unwrap();
        assert!(search_session_dir(root.path(), session_id).is_none());

        std::fs::write(real.join(SESSION_FILE), "{}").unwrap();
        assert_eq!(search_session_dir(root.path(), session_id), Some(real));
    }

    #[test]
    fn test_search_transcription_temp_and_session_audio() {
        let root = TempDir::new().unwrap();

        let temp_id = Uuid::new_v4();
        let temp = root.path().join(TEMP_DIR).join(temp_id.to_string());
        std::fs::create_dir_all(&temp).unwrap();
        assert_eq!(search_transcription_dir(root.path(), temp_id), Some(temp));

        let nested_id = Uuid::new_v4();
        let nested = root
            .path()
            .join(Uuid::new_v4().to_string())
            .join(INTERVIEWS_DIR)
            .join(Uuid::new_v4().to_string())
            .join(AUDIO_DIR)
            .join(nested_id.to_string());
        std::fs::create_dir_all(&nested).unwrap();
        assert_eq!(search_transcription_dir(root.path(), nested_id), Some(nested));

        assert!(search_transcription_dir(root.path(), Uuid::new_v4()).is_none());
    }
}
