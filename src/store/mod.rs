pub mod org;

use std::cmp::Ordering;
use std::path::PathBuf;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tokio::sync::broadcast;

/// A record stored in a collection, addressed by an opaque string id.
pub trait Document: Clone + Serialize + DeserializeOwned + Send + 'static {
    fn id(&self) -> &str;
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no document with id {0}")]
    NotFound(String),
    #[error("failed to persist collection: {0}")]
    Persist(#[from] std::io::Error),
    #[error("failed to encode collection: {0}")]
    Encode(#[from] serde_json::Error),
}

/// One live collection: an ordered document list persisted as a JSON file,
/// with a full ordered snapshot pushed to every subscriber on each mutation.
///
/// Mutations are synchronous and run on the event loop; subscribers on other
/// tasks see the store eventually, not transactionally. Two writes issued
/// back to back arrive as two separate pushes.
pub struct Collection<T: Document> {
    docs: Vec<T>,
    path: PathBuf,
    order: fn(&T, &T) -> Ordering,
    tx: broadcast::Sender<Vec<T>>,
}

impl<T: Document> Collection<T> {
    /// Open the collection file, tolerating a missing or unreadable file as
    /// an empty collection.
    pub fn open(path: PathBuf, order: fn(&T, &T) -> Ordering) -> Self {
        let mut docs: Vec<T> = match std::fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_default(),
            Err(_) => Vec::new(),
        };
        docs.sort_by(order);
        let (tx, _) = broadcast::channel(64);
        Self { docs, path, order, tx }
    }

    /// Live result set: every mutation pushes a fresh ordered snapshot for
    /// as long as the receiver is held.
    pub fn subscribe(&self) -> broadcast::Receiver<Vec<T>> {
        self.tx.subscribe()
    }

    pub fn snapshot(&self) -> Vec<T> {
        self.docs.clone()
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        self.docs.iter().find(|d| d.id() == id)
    }

    pub fn create(&mut self, doc: T) -> Result<T, StoreError> {
        self.docs.push(doc.clone());
        self.commit()?;
        Ok(doc)
    }

    pub fn update(&mut self, id: &str, apply: impl FnOnce(&mut T)) -> Result<T, StoreError> {
        let Some(doc) = self.docs.iter_mut().find(|d| d.id() == id) else {
            return Err(StoreError::NotFound(id.to_string()));
        };
        apply(doc);
        let updated = doc.clone();
        self.commit()?;
        Ok(updated)
    }

    pub fn delete(&mut self, id: &str) -> Result<(), StoreError> {
        let before = self.docs.len();
        self.docs.retain(|d| d.id() != id);
        if self.docs.len() == before {
            return Err(StoreError::NotFound(id.to_string()));
        }
        self.commit()
    }

    /// Re-sort, persist, and push the new snapshot. A push with no
    /// subscribers is not an error.
    fn commit(&mut self) -> Result<(), StoreError> {
        let order = self.order;
        self.docs.sort_by(order);
        let json = serde_json::to_string_pretty(&self.docs)?;
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, json)?;
        let _ = self.tx.send(self.docs.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Entry {
        id: String,
        rank: u32,
    }

    impl Document for Entry {
        fn id(&self) -> &str {
            &self.id
        }
    }

    fn temp_collection() -> Collection<Entry> {
        let path = std::env::temp_dir()
            .join(format!("mortar-store-test-{}", uuid::Uuid::new_v4()))
            .join("entries.json");
        Collection::open(path, |a, b| a.rank.cmp(&b.rank))
    }

    fn entry(id: &str, rank: u32) -> Entry {
        Entry { id: id.to_string(), rank }
    }

    #[test]
    fn create_pushes_ordered_snapshot() {
        let mut coll = temp_collection();
        let mut rx = coll.subscribe();

        coll.create(entry("b", 2)).unwrap();
        coll.create(entry("a", 1)).unwrap();

        let first = rx.try_recv().unwrap();
        assert_eq!(first.len(), 1);
        let second = rx.try_recv().unwrap();
        assert_eq!(second[0].id, "a");
        assert_eq!(second[1].id, "b");
    }

    #[test]
    fn update_mutates_and_persists() {
        let mut coll = temp_collection();
        let path = coll.path.clone();
        coll.create(entry("a", 1)).unwrap();

        let updated = coll.update("a", |e| e.rank = 9).unwrap();
        assert_eq!(updated.rank, 9);

        // Re-open from disk and check the write landed
        let reopened: Collection<Entry> = Collection::open(path, |a, b| a.rank.cmp(&b.rank));
        assert_eq!(reopened.get("a").unwrap().rank, 9);
    }

    #[test]
    fn missing_ids_are_not_found() {
        let mut coll = temp_collection();
        assert!(matches!(
            coll.update("ghost", |_| {}),
            Err(StoreError::NotFound(_))
        ));
        assert!(matches!(coll.delete("ghost"), Err(StoreError::NotFound(_))));
    }

    #[test]
    fn delete_removes_document() {
        let mut coll = temp_collection();
        coll.create(entry("a", 1)).unwrap();
        coll.create(entry("b", 2)).unwrap();

        coll.delete("a").unwrap();
        assert!(coll.get("a").is_none());
        assert_eq!(coll.len(), 1);
    }

    #[test]
    fn open_tolerates_missing_file() {
        let coll = temp_collection();
        assert!(coll.is_empty());
    }
}
