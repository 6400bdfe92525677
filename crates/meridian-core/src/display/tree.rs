//! Indented markdown view of a search tree.

use std::fmt;

use crate::search::{NodeId, SearchTree};

/// Renders every node in pre-order, indented by depth, with the action that
/// produced it and its score.
pub struct TreeView<'a>(pub &'a SearchTree);

impl TreeView<'_> {
    fn fmt_node(&self, f: &mut fmt::Formatter<'_>, id: NodeId) -> fmt::Result {
        let tree = self.0;
        let (Some(node), Some(depth)) = (tree.node(id), tree.depth(id)) else {
            return Ok(());
        };

        write!(f, "{}- `{id}` ", "  ".repeat(depth))?;
        match node.modification() {
            Some(modification) => write!(f, "{modification}")?,
            None => write!(f, "initial plan")?,
        }
        match node.score() {
            Some(score) => writeln!(f, " [{}/9]", score.total()),
            None => writeln!(f, " [unscored]"),
        }
    }
}

impl fmt::Display for TreeView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# Search tree ({} nodes)\n", self.0.len())?;
        for id in self.0.preorder() {
            self.fmt_node(f, id)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Modification, Plan, PlanScore, Step};

    #[test]
    fn test_tree_view_indents_by_depth() {
        let score = PlanScore::new(2, 2, 2).unwrap();
        let mut tree = SearchTree::new("q", Plan::new(vec![Step::new("A", "a")]), Some(score));
        let child = tree
            .add_child(SearchTree::ROOT, Modification::add(1, Step::new("B", "b")))
            .unwrap();
        tree.add_child(child, Modification::remove(0)).unwrap();

        let output = TreeView(&tree).to_string();
        assert!(output.contains("# Search tree (3 nodes)"));
        assert!(output.contains("- `n0` initial plan [6/9]\n"));
        assert!(output.contains("  - `n1` add at 1: \"B\" [unscored]\n"));
        assert!(output.contains("    - `n2` remove at 0 [unscored]\n"));
    }
}
