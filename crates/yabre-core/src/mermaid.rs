//! Mermaid flowchart export
//!
//! Renders a resolved graph as a `flowchart TD` diagram: one decision node per
//! condition, one box per decision with an action, and a terminal circle per
//! terminating decision.
//!
//! Node ids are derived from names but restricted to `[A-Za-z0-9_]`, kept
//! clear of Mermaid keywords and made unique; the raw name stays as the label.

use crate::ast::{Condition, Decision, Rules};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write;

const RESERVED_IDS: &[&str] = &[
    "end", "graph", "flowchart", "subgraph", "direction", "style", "linkStyle", "class",
    "classDef", "click", "call", "href",
];

/// Render `rules` as a Mermaid flowchart
pub fn export_mermaid(rules: &Rules) -> String {
    let ids = NodeIds::new(rules);
    let mut out = String::from("flowchart TD\n");
    out.push_str("    %% Definitions\n");

    let names = rules.condition_names();

    for name in &names {
        let condition = &rules.conditions[*name];
        let label = condition.description.as_deref().unwrap_or(&condition.name);
        let _ = writeln!(
            out,
            "    {}{{\"`{}`\"}}",
            ids.get(Node::Condition, &condition.name),
            escape(label)
        );

        for decision in condition.decisions() {
            if decision.action.is_some() {
                let label = decision.description.as_deref().unwrap_or(&decision.name);
                let _ = writeln!(
                    out,
                    "    {}[\"`{}`\"]",
                    ids.get(Node::Decision, &decision.name),
                    escape(label)
                );
            }
            if decision.terminate {
                let _ = writeln!(out, "    {}((( )))", ids.get(Node::End, &decision.name));
            }
        }
    }

    out.push_str("    %% Transitions\n");
    for name in &names {
        let condition = &rules.conditions[*name];
        for decision in condition.decisions() {
            render_decision(&ids, condition, decision, &mut out);
        }
    }

    out
}

fn render_decision(ids: &NodeIds, condition: &Condition, decision: &Decision, out: &mut String) {
    let branch = decision.branch;
    let from = ids.get(Node::Condition, &condition.name);

    if decision.action.is_some() {
        let action = ids.get(Node::Decision, &decision.name);
        let _ = writeln!(out, "    {} --> |{}| {}", from, branch, action);
        if let Some(next) = &decision.next {
            let _ = writeln!(out, "    {} --> {}", action, ids.get(Node::Condition, next));
        }
        if decision.terminate {
            let _ = writeln!(out, "    {} --> {}", action, ids.get(Node::End, &decision.name));
        }
    } else {
        if let Some(next) = &decision.next {
            let _ = writeln!(
                out,
                "    {} --> |{}| {}",
                from,
                branch,
                ids.get(Node::Condition, next)
            );
        }
        if decision.terminate {
            let _ = writeln!(
                out,
                "    {} --> |{}| {}",
                from,
                branch,
                ids.get(Node::End, &decision.name)
            );
        }
    }
}

fn escape(label: &str) -> String {
    label.replace('"', "#quot;").replace('`', "'")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Node {
    Condition,
    Decision,
    End,
}

/// Diagram ids for every node of a graph
struct NodeIds {
    ids: BTreeMap<(Node, String), String>,
    taken: BTreeSet<String>,
}

impl NodeIds {
    /// Conditions are assigned first so they keep their plain ids
    fn new(rules: &Rules) -> Self {
        let mut ids = Self {
            ids: BTreeMap::new(),
            taken: BTreeSet::new(),
        };

        let names = rules.condition_names();
        for name in &names {
            ids.assign(Node::Condition, name, name);
        }
        for name in &names {
            for decision in rules.conditions[*name].decisions() {
                if decision.action.is_some() {
                    ids.assign(Node::Decision, &decision.name, &decision.name);
                }
                if decision.terminate {
                    let end = format!("{}_end", decision.name);
                    ids.assign(Node::End, &decision.name, &end);
                }
            }
        }
        ids
    }

    fn assign(&mut self, node: Node, name: &str, raw: &str) {
        let base = node_id(raw);
        let mut id = base.clone();
        let mut suffix = 2;
        while self.taken.contains(&id) {
            id = format!("{}_{}", base, suffix);
            suffix += 1;
        }
        self.taken.insert(id.clone());
        self.ids.insert((node, name.to_string()), id);
    }

    /// Unknown names (a dangling `next`) fall back to the plain mangled id
    fn get(&self, node: Node, name: &str) -> String {
        self.ids
            .get(&(node, name.to_string()))
            .cloned()
            .unwrap_or_else(|| node_id(name))
    }
}

fn node_id(name: &str) -> String {
    let id: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();

    let reserved = RESERVED_IDS.contains(&id.as_str());
    if id.is_empty() || id.starts_with(|c: char| c.is_ascii_digit()) || reserved {
        format!("n_{}", id)
    } else {
        id
    }
}
