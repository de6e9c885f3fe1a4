//! In-memory container for tests and embedding.
//!
//! Copies normally complete synchronously. Tests that need to exercise the
//! copy wait loop can script the status sequence a target key reports via
//! [`MemoryContainer::script_copy_status`]; the copied bytes only become
//! visible once the scripted sequence reaches `Success`, so a reader polling
//! the target observes the same all-or-nothing behavior as the real store.

use async_trait::async_trait;
use bytes::Bytes;
use std::collections::{HashMap, VecDeque};
use tokio::sync::Mutex;

use crate::container::{BlobContainer, CopyStatus, ObjectMeta};
use crate::errors::{StoreError, StoreResult};

#[derive(Default)]
struct MemoryState {
    created: bool,
    objects: HashMap<String, Bytes>,
    copy_states: HashMap<String, CopyStatus>,
    // Scripted status sequences and the bytes held back until they complete.
    scripts: HashMap<String, VecDeque<CopyStatus>>,
    staged_copies: HashMap<String, Bytes>,
}

/// HashMap-backed container
pub struct MemoryContainer {
    state: Mutex<MemoryState>,
}

impl MemoryContainer {
    /// Create a container that already exists and is ready for writes.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MemoryState {
                created: true,
                ..Default::default()
            }),
        }
    }

    /// Create a container that does not exist yet; `create_container` brings
    /// it into existence.
    pub fn new_absent() -> Self {
        Self {
            state: Mutex::new(MemoryState::default()),
        }
    }

    /// Script the sequence of states `copy_status(key)` reports for the next
    /// copy targeting `key`.
    pub async fn script_copy_status(&self, key: &str, statuses: Vec<CopyStatus>) {
        let mut state = self.state.lock().await;
        state.scripts.insert(key.to_string(), statuses.into());
    }

    /// Raw snapshot of the stored keys, for assertions.
    pub async fn keys(&self) -> Vec<String> {
        let state = self.state.lock().await;
        state.objects.keys().cloned().collect()
    }
}

impl Default for MemoryContainer {
    fn default() -> Self {
        Self::new()
    }
}

fn ensure_created(state: &MemoryState) -> StoreResult<()> {
    if state.created {
        Ok(())
    } else {
        Err(StoreError::Container {
            name: "memory".to_string(),
            details: "container does not exist".to_string(),
        })
    }
}

#[async_trait]
impl BlobContainer for MemoryContainer {
    async fn container_exists(&self) -> StoreResult<bool> {
        Ok(self.state.lock().await.created)
    }

    async fn create_container(&self) -> StoreResult<()> {
        self.state.lock().await.created = true;
        Ok(())
    }

    async fn exists(&self, key: &str) -> StoreResult<bool> {
        let state = self.state.lock().await;
        ensure_created(&state)?;
        Ok(state.objects.contains_key(key))
    }

    async fn put(&self, key: &str, data: Bytes) -> StoreResult<()> {
        let mut state = self.state.lock().await;
        ensure_created(&state)?;
        state.objects.insert(key.to_string(), data);
        Ok(())
    }

    async fn get(&self, key: &str) -> StoreResult<Bytes> {
        let state = self.state.lock().await;
        ensure_created(&state)?;
        state
            .objects
            .get(key)
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                key: key.to_string(),
            })
    }

    async fn delete(&self, key: &str) -> StoreResult<()> {
        let mut state = self.state.lock().await;
        ensure_created(&state)?;
        state
            .objects
            .remove(key)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound {
                key: key.to_string(),
            })
    }

    async fn list(&self, prefix: &str) -> StoreResult<Vec<ObjectMeta>> {
        let state = self.state.lock().await;
        ensure_created(&state)?;
        Ok(state
            .objects
            .iter()
            .filter(|(key, _)| key.starts_with(prefix))
            .map(|(key, data)| ObjectMeta::new(key.clone(), data.len() as u64))
            .collect())
    }

    async fn start_copy(&self, from_key: &str, to_key: &str) -> StoreResult<()> {
        let mut state = self.state.lock().await;
        ensure_created(&state)?;
        let data = state
            .objects
            .get(from_key)
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                key: from_key.to_string(),
            })?;

        let scripted = state
            .scripts
            .get(to_key)
            .map(|statuses| !statuses.is_empty())
            .unwrap_or(false);

        if scripted {
            state.staged_copies.insert(to_key.to_string(), data);
            state
                .copy_states
                .insert(to_key.to_string(), CopyStatus::Pending);
        } else {
            state.objects.insert(to_key.to_string(), data);
            state
                .copy_states
                .insert(to_key.to_string(), CopyStatus::Success);
        }
        Ok(())
    }

    async fn copy_status(&self, key: &str) -> StoreResult<CopyStatus> {
        let mut state = self.state.lock().await;
        ensure_created(&state)?;

        let next = state
            .scripts
            .get_mut(key)
            .and_then(|statuses| statuses.pop_front());

        if let Some(status) = next {
            match status {
                CopyStatus::Success => {
                    if let Some(data) = state.staged_copies.remove(key) {
                        state.objects.insert(key.to_string(), data);
                    }
                }
                CopyStatus::Aborted | CopyStatus::Failed => {
                    state.staged_copies.remove(key);
                }
                CopyStatus::Unspecified | CopyStatus::Pending => {}
            }
            state.copy_states.insert(key.to_string(), status);
            return Ok(status);
        }

        Ok(state
            .copy_states
            .get(key)
            .copied()
            .unwrap_or(CopyStatus::Unspecified))
    }
}
