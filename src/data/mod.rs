use std::collections::HashMap;
use std::path::PathBuf;

use serde::Deserialize;

mod load;
mod sample;

pub use load::load_dataset;
pub use sample::sample_dataset;

/// Smallest size metric a node may carry; non-positive wire values are
/// clamped here so radius and collision math stay well defined.
pub const MIN_NODE_SIZE: f32 = 0.5;

/// Where the view session gets its graph from.
#[derive(Clone, Debug)]
pub enum DatasetSource {
    /// Built-in sample corpus graph.
    Sample,
    /// JSON dataset on disk.
    File(PathBuf),
}

impl DatasetSource {
    pub fn label(&self) -> String {
        match self {
            Self::Sample => "sample corpus".to_owned(),
            Self::File(path) => path.display().to_string(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
pub enum EntityKind {
    Person,
    Concept,
    Organisation,
    Event,
    Document,
}

impl EntityKind {
    pub const ALL: [EntityKind; 5] = [
        Self::Person,
        Self::Concept,
        Self::Organisation,
        Self::Event,
        Self::Document,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Person => "Person",
            Self::Concept => "Concept",
            Self::Organisation => "Organisation",
            Self::Event => "Event",
            Self::Document => "Document",
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct GraphNode {
    pub id: String,
    pub label: String,
    #[serde(rename = "type")]
    pub kind: EntityKind,
    #[serde(rename = "val")]
    pub size: f32,
}

#[derive(Clone, Debug, Deserialize)]
pub struct GraphLink {
    pub source: String,
    pub target: String,
    #[serde(rename = "type")]
    pub relation: String,
}

/// Wire form of a dataset, as delivered by the external provider.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct GraphDataset {
    #[serde(default)]
    pub nodes: Vec<GraphNode>,
    #[serde(default)]
    pub links: Vec<GraphLink>,
}

/// A link whose endpoints resolved to node indices. Duplicates are kept;
/// each one renders and pulls independently.
#[derive(Clone, Debug)]
pub struct ResolvedLink {
    pub source: usize,
    pub target: usize,
    pub relation: String,
}

/// One adjacency entry as seen from a node: the neighbor plus the relation
/// label and direction of the underlying link.
#[derive(Clone, Debug)]
pub struct Neighbor {
    pub index: usize,
    pub relation: String,
    pub outgoing: bool,
}

/// Sanitized, index-addressed graph. Topology is immutable for the life of
/// a view session; position state lives in the layout engine, keyed by the
/// node indices handed out here.
#[derive(Clone, Debug, Default)]
pub struct GraphModel {
    nodes: Vec<GraphNode>,
    index_by_id: HashMap<String, usize>,
    links: Vec<ResolvedLink>,
    neighbors: Vec<Vec<Neighbor>>,
    dropped_links: usize,
    dropped_nodes: usize,
}

impl GraphModel {
    /// Builds the indexed model, dropping links whose endpoints do not
    /// resolve and nodes whose id repeats (first occurrence wins). Drops
    /// are counted, reported by the caller, and never fatal.
    pub fn from_dataset(dataset: GraphDataset) -> Self {
        let mut nodes = Vec::with_capacity(dataset.nodes.len());
        let mut index_by_id = HashMap::with_capacity(dataset.nodes.len());
        let mut dropped_nodes = 0usize;

        for mut node in dataset.nodes {
            if index_by_id.contains_key(&node.id) {
                dropped_nodes += 1;
                continue;
            }
            if !node.size.is_finite() || node.size < MIN_NODE_SIZE {
                node.size = MIN_NODE_SIZE;
            }
            index_by_id.insert(node.id.clone(), nodes.len());
            nodes.push(node);
        }

        let mut links = Vec::with_capacity(dataset.links.len());
        let mut neighbors = vec![Vec::new(); nodes.len()];
        let mut dropped_links = 0usize;

        for link in dataset.links {
            let (Some(&source), Some(&target)) = (
                index_by_id.get(&link.source),
                index_by_id.get(&link.target),
            ) else {
                dropped_links += 1;
                continue;
            };

            neighbors[source].push(Neighbor {
                index: target,
                relation: link.relation.clone(),
                outgoing: true,
            });
            if target != source {
                neighbors[target].push(Neighbor {
                    index: source,
                    relation: link.relation.clone(),
                    outgoing: false,
                });
            }
            links.push(ResolvedLink {
                source,
                target,
                relation: link.relation,
            });
        }

        Self {
            nodes,
            index_by_id,
            links,
            neighbors,
            dropped_links,
            dropped_nodes,
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    pub fn node(&self, index: usize) -> Option<&GraphNode> {
        self.nodes.get(index)
    }

    pub fn links(&self) -> &[ResolvedLink] {
        &self.links
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index_by_id.get(id).copied()
    }

    pub fn neighbors(&self, index: usize) -> &[Neighbor] {
        self.neighbors
            .get(index)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn degree(&self, index: usize) -> usize {
        self.neighbors(index).len()
    }

    pub fn dropped_links(&self) -> usize {
        self.dropped_links
    }

    pub fn dropped_nodes(&self) -> usize {
        self.dropped_nodes
    }
}
