use super::{Check, Detection, Dialect, DialectChecker, score_checklist};
use crate::schema;
use regex::bytes::Regex;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::LazyLock;

// Also matches the `components` key nested inside V1 services, so broken or
// templated V1 input ties with V1's own score. The tie is intended: the V1
// checker is registered first and wins it.
static NODES_KEY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""(components|nodes)"\s*:"#).expect("nodes key pattern is valid")
});

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ProbeNode {
    image: String,
    ports: Vec<Value>,
    expose: Value,
    scale: Value,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ProbeGraph {
    #[serde(alias = "nodes")]
    components: BTreeMap<String, ProbeNode>,
}

impl ProbeGraph {
    fn first_node(&self) -> Option<(&String, &ProbeNode)> {
        self.components.iter().next()
    }
}

const CHECKS: &[Check<ProbeGraph>] = &[
    ("has_nodes", has_nodes),
    ("has_node_name", has_node_name),
    ("has_node_image", has_node_image),
    ("has_node_ports", has_node_ports),
    ("has_node_expose", has_node_expose),
    ("has_node_scale", has_node_scale),
];

/// Recognizes V2 definitions (a flat `components` or `nodes` map).
pub struct CanonicalChecker {
    checks: &'static [Check<ProbeGraph>],
}

impl CanonicalChecker {
    pub fn new() -> Self {
        Self { checks: CHECKS }
    }
}

impl Default for CanonicalChecker {
    fn default() -> Self {
        Self::new()
    }
}

impl DialectChecker for CanonicalChecker {
    fn dialect(&self) -> Dialect {
        Dialect::V2
    }

    fn score(&self, bytes: &[u8]) -> Detection {
        score_checklist(
            Dialect::V2,
            bytes,
            &NODES_KEY,
            |b| schema::parse_canonical(b).err(),
            self.checks,
        )
    }
}

fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Array(items) => !items.is_empty(),
        Value::Object(fields) => !fields.is_empty(),
        _ => true,
    }
}

fn has_nodes(graph: &ProbeGraph) -> bool {
    !graph.components.is_empty()
}

fn has_node_name(graph: &ProbeGraph) -> bool {
    graph.first_node().is_some_and(|(name, _)| !name.is_empty())
}

fn has_node_image(graph: &ProbeGraph) -> bool {
    graph.first_node().is_some_and(|(_, n)| !n.image.is_empty())
}

fn has_node_ports(graph: &ProbeGraph) -> bool {
    graph.first_node().is_some_and(|(_, n)| !n.ports.is_empty())
}

fn has_node_expose(graph: &ProbeGraph) -> bool {
    graph.first_node().is_some_and(|(_, n)| is_present(&n.expose))
}

fn has_node_scale(graph: &ProbeGraph) -> bool {
    graph.first_node().is_some_and(|(_, n)| is_present(&n.scale))
}
