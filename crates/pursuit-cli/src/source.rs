//! Collection fetch and the file-backed confirmation gateway.
//!
//! The core never fetches: an externally owned layer produces the full
//! candidate collection and confirms writes. For the CLI that layer is a
//! JSON file: `fetch` loads it, and [`FileBackend`] plays the remote
//! collaborator by persisting confirmed stage/cell writes back to it.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use pursuit_core::model::item::{Stage, WorkItem};
use pursuit_core::model::value::CellValue;
use pursuit_core::transition::{GatewayError, StageGateway};
use pursuit_grid::edit::CellGateway;

/// JSON-file data source.
#[derive(Debug, Clone)]
pub struct JsonSource {
    path: PathBuf,
}

impl JsonSource {
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the full candidate collection.
    pub fn fetch(&self) -> Result<Vec<WorkItem>> {
        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read {}", self.path.display()))?;
        let items: Vec<WorkItem> = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse {}", self.path.display()))?;
        tracing::debug!(count = items.len(), path = %self.path.display(), "collection fetched");
        Ok(items)
    }

    fn write_back(&self, items: &[WorkItem]) -> Result<()> {
        let rendered = serde_json::to_string_pretty(items)?;
        std::fs::write(&self.path, rendered)
            .with_context(|| format!("failed to write {}", self.path.display()))?;
        Ok(())
    }
}

/// The "remote" side of the optimistic protocol, backed by the data file.
///
/// Each confirmation re-reads the file, applies the change, and writes it
/// back, so the file stays the source of truth the next fetch returns.
#[derive(Debug)]
pub struct FileBackend {
    source: JsonSource,
}

impl FileBackend {
    #[must_use]
    pub const fn new(source: JsonSource) -> Self {
        Self { source }
    }

    fn mutate<F>(&self, item_id: &str, apply: F) -> Result<(), GatewayError>
    where
        F: FnOnce(&mut WorkItem) -> Result<(), GatewayError>,
    {
        let mut items = self
            .source
            .fetch()
            .map_err(|e| GatewayError::Network(e.to_string()))?;
        let item = items
            .iter_mut()
            .find(|item| item.id == item_id)
            .ok_or_else(|| GatewayError::Rejected(format!("unknown item '{item_id}'")))?;
        apply(item)?;
        self.source
            .write_back(&items)
            .map_err(|e| GatewayError::Network(e.to_string()))
    }
}

impl StageGateway for FileBackend {
    fn request_stage_change(
        &mut self,
        item_id: &str,
        to: Stage,
        actor: &str,
    ) -> Result<(), GatewayError> {
        tracing::debug!(item_id, to = %to, actor, "confirming stage change");
        self.mutate(item_id, |item| {
            item.stage = to;
            Ok(())
        })
    }
}

impl CellGateway for FileBackend {
    fn persist_cell(
        &mut self,
        item_id: &str,
        column_key: &str,
        value: &CellValue,
    ) -> Result<(), GatewayError> {
        tracing::debug!(item_id, column_key, "persisting cell edit");
        self.mutate(item_id, |item| {
            item.set_value(column_key, value.clone())
                .map_err(|e| GatewayError::Rejected(e.to_string()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{FileBackend, JsonSource};
    use pursuit_core::model::item::{Stage, WorkItem};
    use pursuit_core::model::value::CellValue;
    use pursuit_core::transition::{GatewayError, StageGateway};
    use pursuit_grid::edit::CellGateway;

    fn seed(dir: &std::path::Path) -> JsonSource {
        let items = vec![WorkItem {
            id: "rfp-1".into(),
            title: "Seeded".into(),
            stage: Stage::Assigned,
            ..WorkItem::default()
        }];
        let path = dir.join("items.json");
        std::fs::write(&path, serde_json::to_string(&items).unwrap()).unwrap();
        JsonSource::new(path)
    }

    #[test]
    fn fetch_roundtrips_the_seeded_collection() {
        let dir = tempfile::tempdir().unwrap();
        let source = seed(dir.path());
        let items = source.fetch().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].stage, Stage::Assigned);
    }

    #[test]
    fn stage_confirmation_persists_to_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let source = seed(dir.path());
        let mut backend = FileBackend::new(source.clone());
        backend
            .request_stage_change("rfp-1", Stage::Submitted, "imani")
            .unwrap();
        assert_eq!(source.fetch().unwrap()[0].stage, Stage::Submitted);
    }

    #[test]
    fn unknown_item_is_rejected_not_a_panic() {
        let dir = tempfile::tempdir().unwrap();
        let mut backend = FileBackend::new(seed(dir.path()));
        let err = backend
            .request_stage_change("ghost", Stage::Won, "imani")
            .unwrap_err();
        assert!(matches!(err, GatewayError::Rejected(_)));
    }

    #[test]
    fn cell_persist_updates_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let source = seed(dir.path());
        let mut backend = FileBackend::new(source.clone());
        backend
            .persist_cell("rfp-1", "title", &CellValue::Text("Renamed".into()))
            .unwrap();
        assert_eq!(source.fetch().unwrap()[0].title, "Renamed");
    }

    #[test]
    fn missing_file_surfaces_as_network_error() {
        let source = JsonSource::new(std::path::PathBuf::from("/nonexistent/items.json"));
        let mut backend = FileBackend::new(source);
        let err = backend
            .request_stage_change("rfp-1", Stage::Won, "imani")
            .unwrap_err();
        assert!(matches!(err, GatewayError::Network(_)));
    }
}
