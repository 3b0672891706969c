use super::{EntityKind, GraphDataset, GraphLink, GraphNode};

fn node(id: &str, label: &str, kind: EntityKind, size: f32) -> GraphNode {
    GraphNode {
        id: id.to_owned(),
        label: label.to_owned(),
        kind,
        size,
    }
}

fn link(source: &str, target: &str, relation: &str) -> GraphLink {
    GraphLink {
        source: source.to_owned(),
        target: target.to_owned(),
        relation: relation.to_owned(),
    }
}

/// Built-in corpus graph used when no dataset file is given: entities and
/// relations as a document-ingestion pipeline would have extracted them
/// from a small strategy-document corpus.
pub fn sample_dataset() -> GraphDataset {
    use EntityKind::*;

    GraphDataset {
        nodes: vec![
            node("1", "Strategic Plan 2025", Document, 5.0),
            node("2", "Project Titan", Event, 4.0),
            node("3", "Q3 Revenue", Concept, 3.0),
            node("4", "Sarah Connor", Person, 3.0),
            node("5", "Cyberdyne Systems", Organisation, 5.0),
            node("6", "AI Regulation", Concept, 3.0),
            node("7", "John Doe", Person, 2.0),
            node("8", "Infrastructure Upgrade", Event, 3.0),
            node("9", "Budget Report", Document, 4.0),
            node("10", "Cloud Migration", Concept, 3.0),
            node("11", "Security Protocol", Concept, 2.0),
            node("12", "Global Tech Corp", Organisation, 4.0),
            node("13", "Meeting Minutes", Document, 3.0),
            node("14", "Alice Smith", Person, 2.0),
            node("15", "Bob Jones", Person, 2.0),
        ],
        links: vec![
            link("1", "2", "MENTIONED_IN"),
            link("1", "3", "MENTIONED_IN"),
            link("2", "4", "LED_BY"),
            link("4", "5", "WORKS_FOR"),
            link("2", "5", "FUNDED_BY"),
            link("6", "1", "RELATES_TO"),
            link("7", "5", "WORKS_FOR"),
            link("2", "8", "CAUSED_BY"),
            link("9", "3", "DETAILS"),
            link("10", "5", "PLANNED_BY"),
            link("11", "10", "REQUIRES"),
            link("12", "5", "PARTNER_OF"),
            link("13", "2", "DOCUMENTS"),
            link("14", "12", "WORKS_FOR"),
            link("15", "12", "WORKS_FOR"),
            link("14", "2", "PARTICIPATED_IN"),
        ],
    }
}
