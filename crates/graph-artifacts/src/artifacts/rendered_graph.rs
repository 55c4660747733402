use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::json;
use std::fmt;
use std::io::Write;
use std::str::FromStr;

/// An RGB color, serialized the way vis-network expects it: `rgb(r, g, b)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({}, {}, {})", self.r, self.g, self.b)
    }
}

impl FromStr for Rgb {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let inner = s
            .trim()
            .strip_prefix("rgb(")
            .and_then(|rest| rest.strip_suffix(')'))
            .ok_or_else(|| anyhow::anyhow!("Invalid rgb color: {s:?}"))?;

        let channels = inner
            .split(',')
            .map(|channel| channel.trim().parse::<u8>())
            .collect::<Result<Vec<_>, _>>()?;
        let [r, g, b] = channels[..] else {
            anyhow::bail!("Expected 3 channels in rgb color: {s:?}");
        };

        Ok(Self { r, g, b })
    }
}

impl Serialize for Rgb {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Rgb {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// A node of the process graph, annotated with its visual encoding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderedNode {
    pub id: String,
    pub label: String,
    pub color: Rgb,
    pub size: f64,
}

/// A parent -> child edge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedEdge {
    pub from: String,
    pub to: String,
}

/// Layout parameters handed to the renderer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum LayoutOptions {
    #[serde(rename_all = "kebab-case")]
    BarnesHut {
        gravitational_constant: f64,
        central_gravity: f64,
        spring_length: f64,
        spring_constant: f64,
        damping: f64,
        avoid_overlap: f64,
    },
    #[serde(rename_all = "kebab-case")]
    Hierarchical {
        level_separation: f64,
        node_spacing: f64,
        tree_spacing: f64,
        direction: String,
        sort_method: String,
    },
}

impl Default for LayoutOptions {
    fn default() -> Self {
        LayoutOptions::BarnesHut {
            gravitational_constant: -17000.0,
            central_gravity: 0.2,
            spring_length: 50.0,
            spring_constant: 0.05,
            damping: 0.7,
            avoid_overlap: 0.7,
        }
    }
}

impl LayoutOptions {
    pub fn hierarchical() -> Self {
        LayoutOptions::Hierarchical {
            level_separation: 300.0,
            node_spacing: 600.0,
            tree_spacing: 600.0,
            direction: "UD".to_string(),
            sort_method: "directed".to_string(),
        }
    }

    /// Options object in the shape vis-network's `setOptions` accepts
    pub fn to_vis_options(&self) -> serde_json::Value {
        match self {
            LayoutOptions::BarnesHut {
                gravitational_constant,
                central_gravity,
                spring_length,
                spring_constant,
                damping,
                avoid_overlap,
            } => json!({
                "physics": {
                    "barnesHut": {
                        "gravitationalConstant": gravitational_constant,
                        "centralGravity": central_gravity,
                        "springLength": spring_length,
                        "springConstant": spring_constant,
                        "damping": damping,
                        "avoidOverlap": avoid_overlap,
                    }
                }
            }),
            LayoutOptions::Hierarchical {
                level_separation,
                node_spacing,
                tree_spacing,
                direction,
                sort_method,
            } => json!({
                "layout": {
                    "hierarchical": {
                        "enabled": true,
                        "levelSeparation": level_separation,
                        "nodeSpacing": node_spacing,
                        "treeSpacing": tree_spacing,
                        "direction": direction,
                        "sortMethod": sort_method,
                    }
                }
            }),
        }
    }
}

/// Annotated process graph, ready to be laid out and drawn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderedGraph {
    pub root_id: String,
    pub nodes: Vec<RenderedNode>,
    pub edges: Vec<RenderedEdge>,
    pub layout: LayoutOptions,
}

impl RenderedGraph {
    /// The graph as a vis-network `DataSet` pair plus the options object for `setOptions`
    pub fn to_vis_network(&self) -> serde_json::Value {
        json!({
            "root_id": self.root_id,
            "nodes": self.nodes,
            "edges": self.edges,
            "options": self.layout.to_vis_options(),
        })
    }
}

impl super::ArtifactExt for RenderedGraph {
    fn encode_json_to_writer<W: Write>(&self, writer: W) -> anyhow::Result<()> {
        serde_json::to_writer_pretty(writer, &self.to_vis_network())?;
        Ok(())
    }
}
