//! Durable storage for the post collection. The whole collection lives
//! in one JSON document that is rewritten on every mutation; readers
//! never observe a partial write because the new document is staged in
//! a sibling temp file and renamed over the target.

use crate::{
    post::{Post, PostDraft, PostPatch},
    query::{self, SearchCriteria},
    state::StoreMetadata,
    validate, BlogError, BlogResult,
};
use rand::{thread_rng, Rng};
use std::path::{Path, PathBuf};

const STORE_EXTENSION: &str = "json";

/// Handle over the backing document. The store owns every post's state;
/// each operation is a full load, an in-memory change and a full
/// persist, in that order. Serializing mutations is the caller's job
/// (the server runs them all on a single task).
#[derive(Debug, Clone)]
pub struct PostStore {
    path: PathBuf,
}

impl PostStore {
    /// Open a store at `path`, creating an empty document if none
    /// exists yet. Only `.json` targets are accepted.
    pub fn attach(path: impl Into<PathBuf>) -> BlogResult<Self> {
        let path: PathBuf = path.into();
        if path.extension().and_then(|ext| ext.to_str()) != Some(STORE_EXTENSION) {
            return Err(BlogError::InvalidStorePath { path }.into());
        }
        if !path.try_exists()? {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() && !parent.try_exists()? {
                    std::fs::create_dir_all(parent)?;
                }
            }
            std::fs::write(&path, b"[]")?;
        }
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The full collection in persisted order. An empty store is a
    /// valid empty collection; a document that cannot be read or parsed
    /// is a storage failure, never silently empty.
    pub fn load(&self) -> BlogResult<Vec<Post>> {
        let buf = std::fs::read_to_string(&self.path).map_err(|source| {
            BlogError::storage_unavailable(format!(
                "cannot read {}: {source}",
                self.path.display()
            ))
        })?;
        let posts = serde_json::from_str(&buf).map_err(|source| {
            BlogError::storage_unavailable(format!(
                "corrupt document at {}: {source}",
                self.path.display()
            ))
        })?;
        Ok(posts)
    }

    /// Validate a draft, mint the next id and append the new post.
    /// This is the only place identity is assigned.
    pub fn add(&self, draft: PostDraft) -> BlogResult<Post> {
        let mut posts = self.load()?;
        let next_id = posts.iter().map(Post::id).max().map_or(1, |max| max + 1);
        let post = Post::new(next_id, draft)?;
        posts.push(post.clone());
        self.persist(&posts)?;
        Ok(post)
    }

    /// Remove the post with `id` and hand it back. A missing id is a
    /// documented no-match outcome, not an error, and leaves the
    /// document untouched.
    pub fn delete(&self, id: u32) -> BlogResult<Option<Post>> {
        let mut posts = self.load()?;
        let Some(index) = posts.iter().position(|post| post.id() == id) else {
            return Ok(None);
        };
        let removed = posts.remove(index);
        self.persist(&posts)?;
        Ok(Some(removed))
    }

    /// Apply a partial update to the post with `id`. Only non-empty
    /// patch members overwrite; a patched date must be valid before
    /// anything changes.
    pub fn update(&self, id: u32, patch: PostPatch) -> BlogResult<Post> {
        let mut posts = self.load()?;
        let Some(index) = posts.iter().position(|post| post.id() == id) else {
            return Err(BlogError::PostNotFound { id }.into());
        };
        if let Some(date) = patch.date.as_deref() {
            if !date.is_empty() && !validate::validate_date(date) {
                return Err(BlogError::InvalidDate { given: date.into() }.into());
            }
        }
        posts[index].apply(patch);
        let updated = posts[index].clone();
        self.persist(&posts)?;
        Ok(updated)
    }

    /// The post with `id`, if present.
    pub fn get(&self, id: u32) -> BlogResult<Option<Post>> {
        let posts = self.load()?;
        Ok(posts.into_iter().find(|post| post.id() == id))
    }

    /// Whole-word search across the supplied criteria.
    pub fn search(&self, criteria: &SearchCriteria) -> BlogResult<Vec<Post>> {
        let posts = self.load()?;
        Ok(query::search_posts(&posts, criteria))
    }

    pub fn metadata(&self) -> BlogResult<StoreMetadata> {
        let posts = self.load()?;
        Ok(StoreMetadata {
            posts_count: posts.len(),
            latest_post_id: posts.iter().map(Post::id).max(),
        })
    }

    /// Rewrite the whole document. Staged in a sibling temp file and
    /// renamed over the target so a reader either sees the old document
    /// or the new one.
    fn persist(&self, posts: &[Post]) -> BlogResult<()> {
        let staging = self.path.with_extension("json.tmp");
        let buf = serde_json::to_vec(posts)?;
        std::fs::write(&staging, buf).map_err(|source| {
            BlogError::storage_unavailable(format!(
                "cannot stage {}: {source}",
                staging.display()
            ))
        })?;
        std::fs::rename(&staging, &self.path).map_err(|source| {
            BlogError::storage_unavailable(format!(
                "cannot replace {}: {source}",
                self.path.display()
            ))
        })?;
        Ok(())
    }
}

/// Generates a random store name with four 16-bit fields, such that when
/// generating random numbers, the range of each field is 0-65536. Hence,
/// each random store name is `blog-xxxxx-xxxxx-xxxxx-xxxxx.json`, with
/// the digits zero padded to keep every field the same width.
pub fn generate_random_store_name() -> String {
    let mut buffer = [0u16; 4];
    thread_rng().fill(&mut buffer);
    let mut result = buffer
        .into_iter()
        .map(|val| format!("{:05}", val.to_be()))
        .collect::<Vec<String>>()
        .join("-");
    result.insert_str(0, "blog-");
    result.push_str(".json");
    result
}

pub fn generate_temp_store() -> PathBuf {
    std::env::temp_dir().join(generate_random_store_name())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(title: &str, content: &str, author: &str, date: &str) -> PostDraft {
        PostDraft {
            title: Some(title.into()),
            content: Some(content.into()),
            author: Some(author.into()),
            date: Some(date.into()),
        }
    }

    fn temp_store() -> PostStore {
        PostStore::attach(generate_temp_store()).unwrap()
    }

    fn cleanup(store: PostStore) {
        std::fs::remove_file(store.path()).expect("store cleanup failed");
    }

    #[test]
    fn test_generate_random_store_name() {
        for _ in 0..5 {
            let name = generate_random_store_name();
            assert!(name.starts_with("blog-"));
            assert!(name.ends_with(".json"));
            assert!(name.len() == 33);
        }
    }

    #[test]
    fn attach_initializes_an_empty_document() {
        let store = temp_store();
        assert!(store.path().exists(), "store creation failed at expected path");
        assert_eq!(
            std::fs::read_to_string(store.path()).unwrap(),
            "[]",
            "new stores must start as an empty collection"
        );
        assert!(store.load().unwrap().is_empty());
        cleanup(store);
    }

    #[test]
    fn attach_rejects_non_json_targets() {
        let result = PostStore::attach(std::env::temp_dir().join("posts.txt"));
        let err = result.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<BlogError>(),
            Some(BlogError::InvalidStorePath { .. })
        ));
    }

    #[test]
    fn ids_are_unique_and_monotonic() {
        let store = temp_store();
        let first = store
            .add(draft("First post", "Body one.", "John Doe", "2023-06-07"))
            .unwrap();
        let second = store
            .add(draft("Second post", "Body two.", "Jane Roe", "2013-06-23"))
            .unwrap();
        assert_eq!(first.id(), 1);
        assert_eq!(second.id(), 2);

        // deleting an older post must not free its id for reuse
        store.delete(1).unwrap();
        let third = store
            .add(draft("Third post", "Body three.", "John Doe", "2023-07-01"))
            .unwrap();
        assert_eq!(third.id(), 3);
        cleanup(store);
    }

    #[test]
    fn add_then_load_round_trips_every_field() {
        let store = temp_store();
        let added = store
            .add(draft("First post", "This is my first post.", "John Doe", "2023-06-07"))
            .unwrap();
        let loaded = store.load().unwrap();
        assert_eq!(loaded, vec![added]);
        cleanup(store);
    }

    #[test]
    fn add_rejects_incomplete_drafts_without_touching_disk() {
        let store = temp_store();
        let result = store.add(PostDraft {
            title: Some("Only a title".into()),
            ..Default::default()
        });
        let err = result.unwrap_err();
        match err.downcast_ref::<BlogError>() {
            Some(BlogError::MissingFields { fields }) => {
                assert_eq!(
                    fields,
                    &vec!["content".to_string(), "author".into(), "date".into()]
                );
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(std::fs::read_to_string(store.path()).unwrap(), "[]");
        cleanup(store);
    }

    #[test]
    fn add_rejects_invalid_dates() {
        let store = temp_store();
        let result = store.add(draft("Post", "Body.", "John Doe", "2023-6-7"));
        let err = result.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<BlogError>(),
            Some(BlogError::InvalidDate { .. })
        ));
        assert!(store.load().unwrap().is_empty());
        cleanup(store);
    }

    #[test]
    fn delete_removes_exactly_one_and_is_idempotent() {
        let store = temp_store();
        store
            .add(draft("First post", "Body one.", "John Doe", "2023-06-07"))
            .unwrap();
        store
            .add(draft("Second post", "Body two.", "Jane Roe", "2013-06-23"))
            .unwrap();

        let removed = store.delete(1).unwrap().expect("post 1 should exist");
        assert_eq!(removed.id(), 1);
        let remaining = store.load().unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id(), 2);
        assert_eq!(remaining[0].title, "Second post");

        // second delete of the same id is a no-match, not an error
        assert!(store.delete(1).unwrap().is_none());
        assert_eq!(store.load().unwrap().len(), 1);
        cleanup(store);
    }

    #[test]
    fn update_touches_only_supplied_fields() {
        let store = temp_store();
        store
            .add(draft("First post", "This is my first post.", "John Doe", "2023-06-07"))
            .unwrap();

        let updated = store
            .update(
                1,
                PostPatch {
                    title: Some("Renamed post".into()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.title, "Renamed post");
        assert_eq!(updated.content, "This is my first post.");
        assert_eq!(updated.author, "John Doe");
        assert_eq!(updated.date, "2023-06-07");

        let loaded = store.load().unwrap();
        assert_eq!(loaded[0], updated);
        cleanup(store);
    }

    #[test]
    fn update_with_invalid_date_changes_nothing() {
        let store = temp_store();
        let original = store
            .add(draft("First post", "Body.", "John Doe", "2023-06-07"))
            .unwrap();

        let result = store.update(
            1,
            PostPatch {
                title: Some("Renamed".into()),
                date: Some("2023-13-40".into()),
                ..Default::default()
            },
        );
        let err = result.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<BlogError>(),
            Some(BlogError::InvalidDate { .. })
        ));
        assert_eq!(store.load().unwrap(), vec![original]);
        cleanup(store);
    }

    #[test]
    fn update_of_missing_id_reports_not_found() {
        let store = temp_store();
        let result = store.update(42, PostPatch::default());
        let err = result.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<BlogError>(),
            Some(BlogError::PostNotFound { id: 42 })
        ));
        cleanup(store);
    }

    #[test]
    fn corrupt_document_is_a_storage_failure() {
        let store = temp_store();
        std::fs::write(store.path(), "{not json").unwrap();
        let err = store.load().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<BlogError>(),
            Some(BlogError::StorageUnavailable { .. })
        ));
        cleanup(store);
    }

    #[test]
    fn search_reads_the_persisted_collection() {
        let store = temp_store();
        store
            .add(draft("First post", "This is my first post.", "John Doe", "2023-06-07"))
            .unwrap();
        store
            .add(draft("Second post", "Another body.", "Jane Roe", "2013-06-23"))
            .unwrap();

        let result = store
            .search(&SearchCriteria {
                title: Some("first".into()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].title, "First post");
        cleanup(store);
    }

    #[test]
    fn metadata_reports_count_and_latest_id() {
        let store = temp_store();
        assert_eq!(
            store.metadata().unwrap(),
            StoreMetadata {
                posts_count: 0,
                latest_post_id: None
            }
        );
        store
            .add(draft("First post", "Body.", "John Doe", "2023-06-07"))
            .unwrap();
        store
            .add(draft("Second post", "Body.", "Jane Roe", "2013-06-23"))
            .unwrap();
        assert_eq!(
            store.metadata().unwrap(),
            StoreMetadata {
                posts_count: 2,
                latest_post_id: Some(2)
            }
        );
        cleanup(store);
    }

    #[test]
    fn empty_store_scenario_end_to_end() {
        let store = temp_store();
        let first = store
            .add(draft("A", "B", "C", "2023-06-07"))
            .unwrap();
        assert_eq!(first.id(), 1);
        let second = store
            .add(draft("D", "E", "F", "2023-06-08"))
            .unwrap();
        assert_eq!(second.id(), 2);

        store.delete(1).unwrap().expect("post 1 should exist");
        let loaded = store.load().unwrap();
        assert_eq!(loaded, vec![second]);
        cleanup(store);
    }
}
