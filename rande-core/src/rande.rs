//! Workspace context: configuration, local store, and the collection
//! operations.
//!
//! Every mutating operation reads the full collection from the local
//! store, mutates the in-memory sequence and writes the full sequence
//! back, then mirrors best-effort when the remote is enabled.

use chrono::{NaiveDate, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::collection::Collection;
use crate::config::GlobalConfig;
use crate::error::{RandeError, RandeResult};
use crate::mirror::{MirrorSync, push_items};
use crate::record::{Attachment, Event, Note, Paper, RecordId, Researcher};
use crate::remote::ProviderStore;
use crate::session::Session;
use crate::store::LocalStore;

/// What happened to the remote mirror when a local write was persisted.
///
/// The local write has already succeeded in every case; a `Failed` push is
/// for the caller to report, not to roll back.
#[derive(Debug)]
pub enum MirrorOutcome {
    /// Mirroring is not enabled; only the local slot was written.
    Disabled,
    /// The remote document was overwritten too.
    Pushed,
    /// The push failed; the local write stands.
    Failed(RandeError),
}

pub struct Rande {
    config: GlobalConfig,
    store: LocalStore,
    remote: Option<ProviderStore>,
}

impl Rande {
    pub fn load() -> RandeResult<Self> {
        Ok(Self::from_config(GlobalConfig::load()?))
    }

    pub fn from_config(config: GlobalConfig) -> Self {
        let store = LocalStore::new(config.data_path());
        let remote = config
            .remote
            .as_ref()
            .filter(|r| r.enabled)
            .map(ProviderStore::from_settings);

        Rande {
            config,
            store,
            remote,
        }
    }

    pub fn config(&self) -> &GlobalConfig {
        &self.config
    }

    pub fn store(&self) -> &LocalStore {
        &self.store
    }

    pub fn session(&self) -> Session {
        Session::new(&self.store)
    }

    /// The mirror component over the configured remote, regardless of the
    /// steady-state `enabled` flag: running a sync is an explicit action.
    pub fn mirror(&self) -> MirrorSync<ProviderStore> {
        let remote = self.config.remote.as_ref().map(ProviderStore::from_settings);
        MirrorSync::new(self.store.clone(), remote)
    }

    pub fn researchers(&self) -> &[Researcher] {
        &self.config.researchers
    }

    pub fn researcher(&self, id: i64) -> Option<&Researcher> {
        self.config.researcher(id)
    }

    /// Write the full sequence locally, then mirror it best-effort.
    async fn persist<T: Serialize>(
        &self,
        collection: Collection,
        items: &[T],
    ) -> RandeResult<MirrorOutcome> {
        self.store.save(collection, items)?;

        let Some(remote) = &self.remote else {
            return Ok(MirrorOutcome::Disabled);
        };

        let values: Vec<Value> = items
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<_, _>>()
            .map_err(|e| RandeError::Serialization(e.to_string()))?;

        match push_items(remote, collection, values).await {
            Ok(()) => Ok(MirrorOutcome::Pushed),
            Err(e) => Ok(MirrorOutcome::Failed(e)),
        }
    }

    // EVENTS

    pub fn events(&self) -> Vec<Event> {
        self.store.load(Collection::Events)
    }

    pub async fn add_event(
        &self,
        title: String,
        date: NaiveDate,
        description: String,
    ) -> RandeResult<(Event, MirrorOutcome)> {
        let event = Event {
            id: RecordId::now(),
            title,
            date,
            description,
            created_at: Utc::now(),
        };

        let mut events = self.events();
        events.push(event.clone());
        let outcome = self.persist(Collection::Events, &events).await?;
        Ok((event, outcome))
    }

    pub async fn delete_event(&self, id: RecordId) -> RandeResult<MirrorOutcome> {
        let mut events = self.events();
        let before = events.len();
        events.retain(|e| e.id != id);
        if events.len() == before {
            return Err(RandeError::RecordNotFound(id));
        }
        self.persist(Collection::Events, &events).await
    }

    // NOTES

    pub fn notes(&self) -> Vec<Note> {
        self.store.load(Collection::Notes)
    }

    pub fn notes_for(&self, researcher_id: i64) -> Vec<Note> {
        let mut notes = self.notes();
        notes.retain(|n| n.user_id == researcher_id);
        notes
    }

    pub async fn add_note(
        &self,
        researcher: &Researcher,
        week: String,
        research_content: String,
        results: String,
        next_plan: String,
    ) -> RandeResult<(Note, MirrorOutcome)> {
        let now = Utc::now();
        let note = Note {
            id: RecordId::now(),
            user_id: researcher.id,
            user_name: researcher.name.clone(),
            week,
            research_content,
            results,
            next_plan,
            created_at: now,
            updated_at: now,
        };

        let mut notes = self.notes();
        notes.push(note.clone());
        let outcome = self.persist(Collection::Notes, &notes).await?;
        Ok((note, outcome))
    }

    /// Full-record replace of a note's text fields; refreshes the
    /// last-modified timestamp. Id, owner and created-at are immutable.
    pub async fn update_note(
        &self,
        id: RecordId,
        week: String,
        research_content: String,
        results: String,
        next_plan: String,
    ) -> RandeResult<(Note, MirrorOutcome)> {
        let mut notes = self.notes();
        let note = notes
            .iter_mut()
            .find(|n| n.id == id)
            .ok_or(RandeError::RecordNotFound(id))?;

        note.week = week;
        note.research_content = research_content;
        note.results = results;
        note.next_plan = next_plan;
        note.updated_at = Utc::now();
        let updated = note.clone();

        let outcome = self.persist(Collection::Notes, &notes).await?;
        Ok((updated, outcome))
    }

    pub async fn delete_note(&self, id: RecordId) -> RandeResult<MirrorOutcome> {
        let mut notes = self.notes();
        let before = notes.len();
        notes.retain(|n| n.id != id);
        if notes.len() == before {
            return Err(RandeError::RecordNotFound(id));
        }
        self.persist(Collection::Notes, &notes).await
    }

    // PAPERS

    pub fn papers(&self) -> Vec<Paper> {
        self.store.load(Collection::Papers)
    }

    pub fn paper(&self, id: RecordId) -> Option<Paper> {
        self.papers().into_iter().find(|p| p.id == id)
    }

    pub async fn add_paper(&self, new: NewPaper) -> RandeResult<(Paper, MirrorOutcome)> {
        let paper = Paper {
            id: RecordId::now(),
            title: new.title,
            authors: new.authors,
            year: new.year,
            journal: new.journal,
            description: new.description,
            file: new.file,
            url: new.url,
            created_at: Utc::now(),
        };

        let mut papers = self.papers();
        papers.push(paper.clone());
        let outcome = self.persist(Collection::Papers, &papers).await?;
        Ok((paper, outcome))
    }

    pub async fn delete_paper(&self, id: RecordId) -> RandeResult<MirrorOutcome> {
        let mut papers = self.papers();
        let before = papers.len();
        papers.retain(|p| p.id != id);
        if papers.len() == before {
            return Err(RandeError::RecordNotFound(id));
        }
        self.persist(Collection::Papers, &papers).await
    }
}

/// Fields for a new paper entry.
#[derive(Debug, Default)]
pub struct NewPaper {
    pub title: String,
    pub authors: Option<String>,
    pub year: Option<i32>,
    pub journal: Option<String>,
    pub description: Option<String>,
    pub file: Option<Attachment>,
    pub url: Option<String>,
}
