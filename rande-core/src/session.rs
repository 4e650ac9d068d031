//! Current researcher selection.
//!
//! The selection is session state, persisted as one small file under the
//! store's state directory. Note operations require a selection.

use std::path::PathBuf;

use crate::error::{RandeError, RandeResult};
use crate::record::Researcher;
use crate::store::LocalStore;

const SESSION_FILE: &str = "researcher";

pub struct Session {
    state_dir: PathBuf,
}

impl Session {
    pub fn new(store: &LocalStore) -> Self {
        Session {
            state_dir: store.state_dir(),
        }
    }

    fn path(&self) -> PathBuf {
        self.state_dir.join(SESSION_FILE)
    }

    /// The currently selected researcher, if any.
    pub fn current(&self) -> Option<Researcher> {
        let content = std::fs::read_to_string(self.path()).ok()?;
        serde_json::from_str(&content).ok()
    }

    pub fn require(&self) -> RandeResult<Researcher> {
        self.current().ok_or(RandeError::NoResearcherSelected)
    }

    pub fn select(&self, researcher: &Researcher) -> RandeResult<()> {
        std::fs::create_dir_all(&self.state_dir)?;
        let content = serde_json::to_string(researcher)
            .map_err(|e| RandeError::Serialization(e.to_string()))?;
        std::fs::write(self.path(), content)?;
        Ok(())
    }

    pub fn clear(&self) -> RandeResult<()> {
        match std::fs::remove_file(self.path()) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn select_current_clear_cycle() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path());
        let session = Session::new(&store);

        assert!(session.current().is_none());
        assert!(matches!(
            session.require(),
            Err(RandeError::NoResearcherSelected)
        ));

        let researcher = Researcher {
            id: 2,
            name: "Kim".to_string(),
        };
        session.select(&researcher).unwrap();
        assert_eq!(session.current(), Some(researcher));

        session.clear().unwrap();
        assert!(session.current().is_none());

        // Clearing twice is fine
        session.clear().unwrap();
    }
}
