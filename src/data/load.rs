use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};

use super::{DatasetSource, GraphDataset, sample_dataset};

/// Resolves a dataset source to its wire-form graph. This is the single
/// asynchronous boundary of the view session; the caller runs it on a
/// worker thread and polls for the result.
pub fn load_dataset(source: &DatasetSource) -> Result<GraphDataset> {
    match source {
        DatasetSource::Sample => Ok(sample_dataset()),
        DatasetSource::File(path) => load_dataset_file(path),
    }
}

fn load_dataset_file(path: &Path) -> Result<GraphDataset> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read dataset file {}", path.display()))?;

    let dataset: GraphDataset = serde_json::from_str(&raw)
        .with_context(|| format!("invalid graph dataset JSON in {}", path.display()))?;

    if dataset.nodes.is_empty() && dataset.links.is_empty() {
        return Err(anyhow!(
            "dataset {} contains no nodes and no links",
            path.display()
        ));
    }

    Ok(dataset)
}

#[cfg(test)]
mod tests {
    use super::super::EntityKind;
    use super::*;

    #[test]
    fn parses_the_wire_format() {
        let raw = r#"{
            "nodes": [
                {"id": "1", "label": "Strategic Plan 2025", "type": "Document", "val": 5},
                {"id": "4", "label": "Sarah Connor", "type": "Person", "val": 3}
            ],
            "links": [
                {"source": "4", "target": "1", "type": "MENTIONED_IN"}
            ]
        }"#;

        let dataset: GraphDataset = serde_json::from_str(raw).unwrap();
        assert_eq!(dataset.nodes.len(), 2);
        assert_eq!(dataset.nodes[0].kind, EntityKind::Document);
        assert_eq!(dataset.nodes[1].kind, EntityKind::Person);
        assert_eq!(dataset.links.len(), 1);
        assert_eq!(dataset.links[0].relation, "MENTIONED_IN");
    }

    #[test]
    fn rejects_unknown_entity_kinds() {
        let raw = r#"{
            "nodes": [{"id": "1", "label": "x", "type": "Wormhole", "val": 1}],
            "links": []
        }"#;

        assert!(serde_json::from_str::<GraphDataset>(raw).is_err());
    }

    #[test]
    fn missing_sections_default_to_empty() {
        let dataset: GraphDataset = serde_json::from_str("{}").unwrap();
        assert!(dataset.nodes.is_empty());
        assert!(dataset.links.is_empty());
    }

    #[test]
    fn missing_file_is_an_error_not_a_panic() {
        let source = DatasetSource::File("/nonexistent/graph.json".into());
        assert!(load_dataset(&source).is_err());
    }

    #[test]
    fn sample_source_always_loads() {
        assert!(load_dataset(&DatasetSource::Sample).is_ok());
    }
}
