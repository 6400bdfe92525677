//! Markdown and Mermaid views of a merged plan graph.

use std::fmt;

use crate::graph::{NodeRole, PlanGraph, StepNodeId};

fn label(graph: &PlanGraph, id: StepNodeId) -> String {
    graph
        .node(id)
        .map(|node| node.step().goal.clone())
        .unwrap_or_else(|| id.to_string())
}

impl fmt::Display for PlanGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "# Plan graph ({} steps, {} edges)",
            self.step_count(),
            self.edges().len()
        )?;

        writeln!(f, "\n## Steps\n")?;
        let steps: Vec<_> = self
            .node_ids()
            .filter_map(|id| self.node(id).map(|node| (id, node)))
            .filter(|(_, node)| !node.is_sentinel())
            .collect();
        if steps.is_empty() {
            writeln!(f, "No steps merged.")?;
        }
        for (id, node) in steps {
            write!(f, "- `{id}` {}", node.step())?;
            match node.result() {
                Some(result) => writeln!(f, " (done: {result})")?,
                None => writeln!(f)?,
            }
        }

        writeln!(f, "\n## Edges\n")?;
        for (from, to) in self.edges() {
            writeln!(f, "- {} → {}", label(self, from), label(self, to))?;
        }

        if let Some(answer) = self.final_answer() {
            writeln!(f, "\n## Answer\n")?;
            writeln!(f, "{answer}")?;
            return Ok(());
        }

        writeln!(f, "\n## Frontier\n")?;
        let frontier = self.next_exec_steps();
        if frontier.is_empty() {
            writeln!(f, "Nothing is ready; END is unreachable.")?;
        }
        for id in frontier {
            writeln!(f, "- {}", label(self, id))?;
        }
        Ok(())
    }
}

/// Mermaid `flowchart TD` source for a plan graph.
///
/// Sentinels are drawn as stadiums and resolved steps get the `done` class.
pub struct Mermaid<'a>(pub &'a PlanGraph);

/// Makes text safe inside a quoted Mermaid label.
fn escape(text: &str) -> String {
    text.replace('#', "#35;")
        .replace('"', "#quot;")
        .replace(['\r', '\n'], " ")
}

impl fmt::Display for Mermaid<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let graph = self.0;
        writeln!(f, "flowchart TD")?;

        let mut done = Vec::new();
        for id in graph.node_ids() {
            let Some(node) = graph.node(id) else {
                continue;
            };
            match node.role() {
                NodeRole::Start => writeln!(f, "    {id}([START])")?,
                NodeRole::End => writeln!(f, "    {id}([END])")?,
                NodeRole::Step => {
                    writeln!(f, "    {id}[\"{}\"]", escape(&node.step().goal))?;
                    if node.is_resolved() {
                        done.push(id.to_string());
                    }
                }
            }
        }

        for (from, to) in graph.edges() {
            writeln!(f, "    {from} --> {to}")?;
        }

        if !done.is_empty() {
            writeln!(f, "    classDef done fill:#d4edda,stroke:#28a745")?;
            writeln!(f, "    class {} done", done.join(","))?;
        }
        Ok(())
    }
}
