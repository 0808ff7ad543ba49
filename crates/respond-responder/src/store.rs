//! Trigger → response mapping persisted through the brain.
//!
//! Triggers are kept exactly as they were typed. Two triggers that differ
//! only by case are the same respond, compared with the case folding the
//! matcher uses.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::{Map, Value};
use tokio::sync::Mutex;

use respond_storage::{Brain, StorageError};
use respond_types::ResponseEntry;

use crate::matcher::{self, TriggerMatcher};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("Brain value under {key:?} is not a trigger map: {reason}")]
    Corrupt { key: String, reason: String },
    #[error("Trigger pattern error: {0}")]
    Pattern(#[from] regex::Error),
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// Outcome of registering a trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    Added,
    Updated,
}

type Entries = BTreeMap<String, String>;

/// The registered trigger equivalent to `trigger`, if any.
fn registered(entries: &Entries, trigger: &str) -> Result<Option<String>> {
    let same = matcher::equivalent(trigger)?;
    Ok(entries.keys().find(|t| same.is_match(t)).cloned())
}

/// Insert `trigger`, replacing an equivalent one. Returns the replaced trigger.
fn insert(entries: &mut Entries, trigger: &str, response: String) -> Result<Option<String>> {
    let previous = registered(entries, trigger)?;
    if let Some(previous) = &previous {
        entries.remove(previous);
    }
    entries.insert(trigger.to_string(), response);
    Ok(previous)
}

struct Loaded {
    entries: Entries,
    matcher: TriggerMatcher,
}

impl Loaded {
    fn new(entries: Entries) -> Result<Self> {
        let matcher = TriggerMatcher::new(entries.keys().cloned())?;
        Ok(Self { entries, matcher })
    }
}

/// Responds stored under a single brain key, loaded on first use.
pub struct ResponseStore {
    brain: Arc<dyn Brain>,
    key: String,
    state: Mutex<Option<Loaded>>,
}

impl ResponseStore {
    pub fn new(brain: Arc<dyn Brain>, key: impl Into<String>) -> Self {
        Self {
            brain,
            key: key.into(),
            state: Mutex::new(None),
        }
    }

    async fn read_entries(&self) -> Result<Entries> {
        let Some(value) = self.brain.get(&self.key).await? else {
            return Ok(Entries::new());
        };
        let Value::Object(map) = value else {
            return Err(self.corrupt("expected a JSON object"));
        };

        let mut entries = Entries::new();
        for (trigger, response) in map {
            let Value::String(response) = response else {
                return Err(self.corrupt(&format!("response for {trigger:?} is not a string")));
            };
            let trigger = trigger.trim();
            if trigger.is_empty() {
                continue;
            }
            if let Some(previous) = insert(&mut entries, trigger, response)? {
                tracing::warn!(key = %self.key, %previous, %trigger, "Merged duplicate trigger");
            }
        }
        tracing::debug!(key = %self.key, count = entries.len(), "Loaded responds");
        Ok(entries)
    }

    async fn write_entries(&self, entries: &Entries) -> Result<()> {
        if entries.is_empty() {
            self.brain.remove(&self.key).await?;
            return Ok(());
        }
        let map: Map<String, Value> = entries
            .iter()
            .map(|(t, r)| (t.clone(), Value::String(r.clone())))
            .collect();
        self.brain.set(&self.key, Value::Object(map)).await?;
        Ok(())
    }

    fn corrupt(&self, reason: &str) -> StoreError {
        StoreError::Corrupt {
            key: self.key.clone(),
            reason: reason.to_string(),
        }
    }

    /// Run `f` against the loaded state, loading it from the brain first if needed.
    async fn with_state<T>(&self, f: impl FnOnce(&Loaded) -> T) -> Result<T> {
        let mut guard = self.state.lock().await;
        let state = match guard.take() {
            Some(state) => state,
            None => Loaded::new(self.read_entries().await?)?,
        };
        Ok(f(guard.insert(state)))
    }

    /// Apply a mutation and, if anything changed, persist it before swapping it in.
    async fn mutate<T>(&self, f: impl FnOnce(&mut Entries) -> Result<T>) -> Result<T> {
        let mut guard = self.state.lock().await;
        let before = match guard.as_ref() {
            Some(state) => state.entries.clone(),
            None => self.read_entries().await?,
        };
        let mut entries = before.clone();
        let out = f(&mut entries)?;
        if entries != before {
            let next = Loaded::new(entries)?;
            self.write_entries(&next.entries).await?;
            *guard = Some(next);
        } else if guard.is_none() {
            *guard = Some(Loaded::new(entries)?);
        }
        Ok(out)
    }

    /// Register `trigger`, or replace the respond registered under an
    /// equivalent trigger. The trigger is kept as typed.
    pub async fn upsert(&self, trigger: &str, response: &str) -> Result<Upsert> {
        let trigger = trigger.trim();
        let response = response.to_string();
        self.mutate(move |entries| {
            Ok(match insert(entries, trigger, response)? {
                Some(_) => Upsert::Updated,
                None => Upsert::Added,
            })
        })
        .await
    }

    /// Remove the respond registered under `trigger` or an equivalent of it.
    /// Returns whether one was registered.
    pub async fn remove(&self, trigger: &str) -> Result<bool> {
        let trigger = trigger.trim();
        self.mutate(move |entries| {
            Ok(match registered(entries, trigger)? {
                Some(existing) => entries.remove(&existing).is_some(),
                None => false,
            })
        })
        .await
    }

    /// All responds, ordered by trigger.
    pub async fn list(&self) -> Result<Vec<ResponseEntry>> {
        self.with_state(|state| {
            state
                .entries
                .iter()
                .map(|(trigger, response)| ResponseEntry {
                    trigger: trigger.clone(),
                    response: response.clone(),
                })
                .collect()
        })
        .await
    }

    /// The respond whose trigger occurs leftmost in `text`.
    pub async fn find(&self, text: &str) -> Result<Option<ResponseEntry>> {
        self.with_state(|state| {
            let trigger = state.matcher.find(text)?;
            state.entries.get(trigger).map(|response| ResponseEntry {
                trigger: trigger.to_string(),
                response: response.clone(),
            })
        })
        .await
    }
}
