use std::collections::hash_map::DefaultHasher;
use std::collections::{HashMap, HashSet};
use std::hash::{Hash, Hasher};

// STATE GRAPH / DOT EXPORT
// ================================================================================================

/// An optional record of the reachability graph explored, written to the `-d/--dotfile` path when
/// requested (spec §6). Nodes are identified by the `Hash` of the state they represent rather than
/// by reference — the driver never keeps every visited state resident in a graph-friendly
/// structure, so a 64-bit digest is the cheapest stable handle.
#[derive(Debug, Default)]
pub struct StateGraph {
    edges: Vec<(u64, u64, String)>,
    labels: HashMap<u64, String>,
    halted: HashSet<u64>,
}

/// Digests anything `Hash` down to a node id for DOT rendering only. Every driver's `visited`/`seen`
/// set is keyed on the state's own `Eq`/`Hash` impl, never on this digest, so a collision here only
/// costs a cosmetic DOT-rendering glitch (two distinct states sharing a node label), not a dropped
/// reachable vertex.
pub fn node_id<S: Hash>(state: &S) -> u64 {
    let mut hasher = DefaultHasher::new();
    state.hash(&mut hasher);
    hasher.finish()
}

impl StateGraph {
    pub fn new() -> Self {
        StateGraph::default()
    }

    pub fn label(&mut self, id: u64, text: impl Into<String>) {
        self.labels.entry(id).or_insert_with(|| text.into());
    }

    pub fn edge(&mut self, from: u64, to: u64, action: impl Into<String>) {
        self.edges.push((from, to, action.into()));
    }

    pub fn mark_halted(&mut self, id: u64) {
        self.halted.insert(id);
    }

    pub fn node_count(&self) -> usize {
        self.labels.len()
    }

    /// Renders as Graphviz DOT: one node per visited state (double-circled if it reached a final
    /// value), one directed edge per transition, labeled with the action that produced it.
    pub fn to_dot(&self, name: &str) -> String {
        let mut out = String::new();
        out.push_str(&format!("digraph {name} {{\n"));
        out.push_str("  rankdir=LR;\n");
        let mut node_ids: Vec<&u64> = self.labels.keys().collect();
        node_ids.sort();
        for id in node_ids {
            let label = self.labels.get(id).map(String::as_str).unwrap_or("?");
            let shape = if self.halted.contains(id) { "doublecircle" } else { "circle" };
            out.push_str(&format!("  n{id} [shape={shape}, label={:?}];\n", label));
        }
        for (from, to, action) in &self.edges {
            out.push_str(&format!("  n{from} -> n{to} [label={:?}];\n", action));
        }
        out.push_str("}\n");
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_id_is_deterministic_for_equal_values() {
        assert_eq!(node_id(&"hello"), node_id(&"hello"));
        assert_ne!(node_id(&"hello"), node_id(&"world"));
    }

    #[test]
    fn to_dot_emits_one_line_per_node_and_edge() {
        let mut g = StateGraph::new();
        g.label(1, "eval(x)");
        g.label(2, "kont(1)");
        g.mark_halted(2);
        g.edge(1, 2, "Eval");
        let dot = g.to_dot("program");
        assert!(dot.contains("digraph program"));
        assert!(dot.contains("n1 -> n2"));
        assert!(dot.contains("doublecircle"));
    }
}
