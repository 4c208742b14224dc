//! Dependency graph construction and traversal.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::grammar::{Alternative, Rule};
use crate::syntax::Token;

/// Names that resolve without a rule definition.
pub const BUILT_IN_TOKENS: &[&str] = &["EOF"];

/// Directed graph from each rule to the defined rules it references.
///
/// Rebuilt from scratch for every validation run.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    /// Defined names in declaration order, each once.
    nodes: Vec<String>,
    edges: HashMap<String, Vec<String>>,
    /// `(referencing rule, referenced name)` for names with no definition.
    dangling: Vec<(String, String)>,
}

impl DependencyGraph {
    pub fn build(rules: &[Rule]) -> Self {
        let mut graph = DependencyGraph::default();
        let mut defined = HashSet::new();

        for rule in rules {
            if defined.insert(rule.name.as_str()) {
                graph.nodes.push(rule.name.clone());
                graph.edges.insert(rule.name.clone(), Vec::new());
            }
        }

        for rule in rules {
            for alternative in rule.alternatives() {
                for reference in references(&alternative) {
                    let name = reference.text.as_str();
                    if defined.contains(name) {
                        graph.add_edge(&rule.name, name);
                    } else if !BUILT_IN_TOKENS.contains(&name) {
                        graph.add_dangling(&rule.name, name);
                    }
                }
            }
        }

        graph
    }

    fn add_edge(&mut self, from: &str, to: &str) {
        let targets = self.edges.entry(from.to_string()).or_default();
        if !targets.iter().any(|t| t == to) {
            targets.push(to.to_string());
        }
    }

    fn add_dangling(&mut self, from: &str, to: &str) {
        if !self.dangling.iter().any(|(f, t)| f == from && t == to) {
            self.dangling.push((from.to_string(), to.to_string()));
        }
    }

    pub fn nodes(&self) -> &[String] {
        &self.nodes
    }

    pub fn is_defined(&self, name: &str) -> bool {
        self.edges.contains_key(name)
    }

    /// Rules referenced by `name`, in order of first reference.
    pub fn dependencies(&self, name: &str) -> &[String] {
        self.edges.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn dangling(&self) -> &[(String, String)] {
        &self.dangling
    }

    /// Every rule reachable from `start`, `start` included when defined.
    pub fn reachable_from(&self, start: &str) -> HashSet<String> {
        let mut visited = HashSet::new();
        let mut queue = VecDeque::new();

        if self.is_defined(start) {
            visited.insert(start.to_string());
            queue.push_back(start);
        }

        while let Some(current) = queue.pop_front() {
            for next in self.dependencies(current) {
                if visited.insert(next.clone()) {
                    queue.push_back(next.as_str());
                }
            }
        }

        visited
    }
}

/// Identifier references inside `alternative`, each name once, in order.
///
/// Quoted literals and character classes are separate token kinds, so names
/// spelled inside them are never references.
pub fn references<'a>(alternative: &Alternative<'a>) -> Vec<&'a Token> {
    let mut seen = HashSet::new();
    alternative
        .significant()
        .filter(|t| t.is_word())
        .filter(|t| seen.insert(t.text.as_str()))
        .collect()
}
