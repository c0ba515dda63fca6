// ---------------------------------------------------------------------------
// Attack graph export
// ---------------------------------------------------------------------------
//
// Flattens an `AttackGraph` into a serializable view and renders it as DOT
// (Graphviz), GraphML, or JSON.

use std::net::IpAddr;

use serde::Serialize;
use vectormap_types::Severity;

use crate::graph::AttackGraph;
use crate::node::{NodeData, NodeId, NodeKind};

const MAX_LABEL_CHARS: usize = 30;

// ---------------------------------------------------------------------------
// Data model
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphViewNode {
    pub id: NodeId,
    pub kind: NodeKind,
    pub label: String,
    pub host: IpAddr,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphViewEdge {
    pub source: NodeId,
    pub target: NodeId,
    pub weight: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GraphView {
    pub nodes: Vec<GraphViewNode>,
    pub edges: Vec<GraphViewEdge>,
}

impl GraphView {
    /// Nodes and edges in graph insertion order.
    pub fn from_graph(graph: &AttackGraph) -> Self {
        let nodes = graph
            .nodes()
            .map(|(_, node)| {
                let label = match &node.data {
                    NodeData::Vulnerability(v) => truncate(&v.title, MAX_LABEL_CHARS),
                    _ => node.label(),
                };
                GraphViewNode {
                    id: node.id.clone(),
                    kind: node.kind(),
                    label,
                    host: node.host_ip(),
                    severity: node.severity(),
                }
            })
            .collect();

        let edges = graph
            .edges()
            .map(|(from, to, weight)| GraphViewEdge {
                source: graph.node(from).id.clone(),
                target: graph.node(to).id.clone(),
                weight: weight.get(),
            })
            .collect();

        GraphView { nodes, edges }
    }
}

fn truncate(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((cut, _)) => s[..cut].to_string(),
        None => s.to_string(),
    }
}

// ---------------------------------------------------------------------------
// DOT (Graphviz) output
// ---------------------------------------------------------------------------

pub fn format_dot(view: &GraphView) -> String {
    let mut out = String::from("digraph attack_graph {\n");
    out.push_str("    rankdir=LR;\n");
    out.push_str("    node [fontname=\"Helvetica\"];\n");
    out.push_str("    edge [fontname=\"Helvetica\", fontsize=10];\n\n");

    for node in &view.nodes {
        let (shape, fill) = match node.kind {
            NodeKind::Host => ("box", "#7ec87e"),
            NodeKind::Vulnerability => ("ellipse", severity_colour(node.severity)),
            NodeKind::AttackAttempt => ("diamond", "#4a90d9"),
        };

        let mut parts = vec![dot_escape(&node.label)];
        if let Some(severity) = node.severity {
            parts.push(severity.to_string().to_uppercase());
        }
        let label = parts.join("\\n");

        let id = dot_escape(node.id.as_str());
        out.push_str(&format!(
            "    \"{id}\" [label=\"{label}\", shape={shape}, style=filled, fillcolor=\"{fill}\"];\n"
        ));
    }

    out.push('\n');

    for edge in &view.edges {
        let from = dot_escape(edge.source.as_str());
        let to = dot_escape(edge.target.as_str());
        out.push_str(&format!(
            "    \"{from}\" -> \"{to}\" [label=\"{:.1}\"];\n",
            edge.weight
        ));
    }

    out.push_str("}\n");
    out
}

fn severity_colour(severity: Option<Severity>) -> &'static str {
    match severity {
        Some(Severity::Critical) => "#d9534f",
        Some(Severity::High) => "#f0883e",
        Some(Severity::Medium) => "#f5d76e",
        Some(Severity::Low) => "#a8d5e2",
        Some(Severity::Info) | None => "#cccccc",
    }
}

fn dot_escape(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
        .replace('{', "\\{")
        .replace('}', "\\}")
        .replace('|', "\\|")
        .replace('<', "\\<")
        .replace('>', "\\>")
}

// ---------------------------------------------------------------------------
// GraphML output
// ---------------------------------------------------------------------------

pub fn format_graphml(view: &GraphView) -> String {
    let mut out = String::new();
    out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    out.push_str(
        "<graphml xmlns=\"http://graphml.graphdrawing.org/xmlns\"\n\
         \x20        xmlns:xsi=\"http://www.w3.org/2001/XMLSchema-instance\"\n\
         \x20        xsi:schemaLocation=\"http://graphml.graphdrawing.org/xmlns http://graphml.graphdrawing.org/xmlns/1.0/graphml.xsd\">\n",
    );

    out.push_str("  <key id=\"kind\" for=\"node\" attr.name=\"kind\" attr.type=\"string\"/>\n");
    out.push_str("  <key id=\"label\" for=\"node\" attr.name=\"label\" attr.type=\"string\"/>\n");
    out.push_str("  <key id=\"host\" for=\"node\" attr.name=\"host\" attr.type=\"string\"/>\n");
    out.push_str(
        "  <key id=\"severity\" for=\"node\" attr.name=\"severity\" attr.type=\"string\"/>\n",
    );
    out.push_str(
        "  <key id=\"weight\" for=\"edge\" attr.name=\"weight\" attr.type=\"double\"/>\n",
    );

    out.push_str("  <graph id=\"attack_graph\" edgedefault=\"directed\">\n");

    for node in &view.nodes {
        let id = xml_escape(node.id.as_str());
        out.push_str(&format!("    <node id=\"{id}\">\n"));
        out.push_str(&format!("      <data key=\"kind\">{}</data>\n", node.kind));
        out.push_str(&format!(
            "      <data key=\"label\">{}</data>\n",
            xml_escape(&node.label)
        ));
        out.push_str(&format!(
            "      <data key=\"host\">{}</data>\n",
            xml_escape(&node.host.to_string())
        ));
        if let Some(severity) = node.severity {
            out.push_str(&format!("      <data key=\"severity\">{severity}</data>\n"));
        }
        out.push_str("    </node>\n");
    }

    for (i, edge) in view.edges.iter().enumerate() {
        let from = xml_escape(edge.source.as_str());
        let to = xml_escape(edge.target.as_str());
        out.push_str(&format!(
            "    <edge id=\"e{i}\" source=\"{from}\" target=\"{to}\">\n"
        ));
        out.push_str(&format!(
            "      <data key=\"weight\">{:.2}</data>\n",
            edge.weight
        ));
        out.push_str("    </edge>\n");
    }

    out.push_str("  </graph>\n");
    out.push_str("</graphml>\n");
    out
}

fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

// ---------------------------------------------------------------------------
// JSON output
// ---------------------------------------------------------------------------

pub fn format_json_graph(view: &GraphView) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(view)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
