//! Best-first search over plan mutations.
//!
//! The tree is an arena: every node lives in one vector and refers to its
//! parent and children by [`NodeId`]. The root owns the initial plan; every
//! other node owns a single [`Modification`] and rebuilds its plan by
//! replaying the modifications on the path from the root.
//!
//! ```text
//!            root (initial plan)
//!           /                 \
//!     add @1 (score 7)    remove @0 (score 8)
//!         |
//!     update @2 (score 9)
//! ```
//!
//! Selection uses a UCT-shaped priority in which child counts stand in for
//! visit counts:
//!
//! - a node with no children has priority `+inf`;
//! - otherwise `total / children + C * sqrt(ln(parent_children) / children)`
//!   with `C = 1.41` and `parent_children = 1` for the root.
//!
//! The select/expand loop belongs to the caller (see [`crate::solver`]).

use std::fmt;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::{
    error::{MeridianError, Result},
    models::{Modification, Plan, PlanScore},
    oracle::{PlanMutator, PlanScorer},
};


/// Exploration weight of the selection priority.
pub const EXPLORATION_CONSTANT: f64 = 1.41;
/// Default depth bound; nodes at this depth or deeper are never expanded.
pub const DEFAULT_MAX_DEPTH: usize = 2;
/// Default number of children after which a node counts as fully expanded.
pub const DEFAULT_MAX_CHILDREN: usize = 2;

/// Stable handle of a node inside one [`SearchTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// What a node contributes to the plan it represents.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// Owns the initial plan
    Root { plan: Plan },
    /// Applies one modification on top of its parent's plan
    Mutation {
        parent: NodeId,
        modification: Modification,
    },
}

/// A node of the search tree.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchNode {
    kind: NodeKind,
    score: Option<PlanScore>,
    children: Vec<NodeId>,
}

impl SearchNode {
    fn new(kind: NodeKind, score: Option<PlanScore>) -> Self {
        Self {
            kind,
            score,
            children: Vec::new(),
        }
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn score(&self) -> Option<PlanScore> {
        self.score
    }

    /// Children in creation order.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn parent(&self) -> Option<NodeId> {
        match &self.kind {
            NodeKind::Root { .. } => None,
            NodeKind::Mutation { parent, .. } => Some(*parent),
        }
    }

    pub fn modification(&self) -> Option<&Modification> {
        match &self.kind {
            NodeKind::Root { .. } => None,
            NodeKind::Mutation { modification, .. } => Some(modification),
        }
    }

    /// Total score, with an unscored node counting as zero.
    pub fn total_score(&self) -> u32 {
        self.score.map_or(0, |score| score.total())
    }
}

fn missing(id: NodeId) -> MeridianError {
    MeridianError::invalid_input("node").with_reason(format!("no search node {id}"))
}

/// Tree of plan variants rooted at an initial plan.
#[derive(Debug, Clone)]
pub struct SearchTree {
    question: String,
    nodes: Vec<SearchNode>,
    max_depth: usize,
    max_children: usize,
}

impl SearchTree {
    /// Handle of the root node of every tree.
    pub const ROOT: NodeId = NodeId(0);

    /// Creates a tree whose root holds `plan` and an optional initial score.
    pub fn new(question: impl Into<String>, plan: Plan, score: Option<PlanScore>) -> Self {
        Self {
            question: question.into(),
            nodes: vec![SearchNode::new(NodeKind::Root { plan }, score)],
            max_depth: DEFAULT_MAX_DEPTH,
            max_children: DEFAULT_MAX_CHILDREN,
        }
    }

    /// Overrides the depth and breadth bounds used by [`SearchTree::select`].
    pub fn with_limits(mut self, max_depth: usize, max_children: usize) -> Self {
        self.max_depth = max_depth;
        self.max_children = max_children;
        self
    }

    pub fn question(&self) -> &str {
        &self.question
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn max_children(&self) -> usize {
        self.max_children
    }

    /// Number of nodes, root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// A tree always holds its root.
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn node(&self, id: NodeId) -> Option<&SearchNode> {
        self.nodes.get(id.0)
    }

    fn require(&self, id: NodeId) -> Result<&SearchNode> {
        self.node(id).ok_or_else(|| missing(id))
    }

    /// Distance from the root, which sits at depth 0.
    pub fn depth(&self, id: NodeId) -> Option<usize> {
        let mut node = self.node(id)?;
        let mut depth = 0;
        while let Some(parent) = node.parent() {
            node = self.node(parent)?;
            depth += 1;
        }
        Some(depth)
    }

    /// Modifications on the path from the root to `id`, root side first.
    pub fn modifications(&self, id: NodeId) -> Option<Vec<Modification>> {
        let mut modifications = Vec::new();
        let mut node = self.node(id)?;
        while let NodeKind::Mutation {
            parent,
            modification,
        } = &node.kind
        {
            modifications.push(modification.clone());
            node = self.node(*parent)?;
        }
        modifications.reverse();
        Some(modifications)
    }

    /// Rebuilds the plan a node represents.
    pub fn plan(&self, id: NodeId) -> Option<Plan> {
        let modifications = self.modifications(id)?;
        match &self.nodes.first()?.kind {
            NodeKind::Root { plan } => Some(plan.apply_modifications(&modifications)),
            NodeKind::Mutation { .. } => None,
        }
    }

    /// Selection priority of a node.
    pub fn priority(&self, id: NodeId) -> Option<f64> {
        self.node(id).map(|node| self.priority_of(node))
    }

    fn priority_of(&self, node: &SearchNode) -> f64 {
        if node.children.is_empty() {
            return f64::INFINITY;
        }

        let child_count = node.children.len() as f64;
        let parent_visits = node
            .parent()
            .and_then(|parent| self.node(parent))
            .map_or(1, |parent| parent.children.len()) as f64;

        let exploitation = f64::from(node.total_score()) / child_count;
        let exploration = EXPLORATION_CONSTANT * (parent_visits.ln() / child_count).sqrt();
        exploitation + exploration
    }

    /// Picks the expandable node with the highest priority.
    ///
    /// Walks the tree in pre-order down to `max_depth`. A node is a candidate
    /// while it has fewer than `max_children` children; its children are
    /// visited either way. Ties keep the first node seen. Returns `None` once
    /// every node within the depth bound is fully expanded.
    pub fn select(&self) -> Option<NodeId> {
        let mut best: Option<(NodeId, f64)> = None;
        let mut stack = vec![(Self::ROOT, 0usize)];

        while let Some((id, depth)) = stack.pop() {
            if depth >= self.max_depth {
                continue;
            }
            let Some(node) = self.node(id) else {
                continue;
            };

            if node.children.len() < self.max_children {
                let priority = self.priority_of(node);
                if best.map_or(true, |(_, top)| priority > top) {
                    best = Some((id, priority));
                }
            }

            stack.extend(node.children.iter().rev().map(|&child| (child, depth + 1)));
        }

        if let Some((id, priority)) = best {
            debug!("Selected {id} for expansion (priority {priority})");
        }
        best.map(|(id, _)| id)
    }

    /// Appends a mutation child under `parent` and returns its handle.
    pub fn add_child(&mut self, parent: NodeId, modification: Modification) -> Result<NodeId> {
        self.require(parent)?;
        let id = NodeId(self.nodes.len());
        self.nodes.push(SearchNode::new(
            NodeKind::Mutation {
                parent,
                modification,
            },
            None,
        ));
        self.nodes[parent.0].children.push(id);
        Ok(id)
    }

    /// Stores the score of a node after validating its range.
    pub fn set_score(&mut self, id: NodeId, score: PlanScore) -> Result<()> {
        score.validate()?;
        self.require(id)?;
        self.nodes[id.0].score = Some(score);
        Ok(())
    }

    /// Expands `id` with one mutation from `mutator` and scores the result.
    ///
    /// The child is attached before it is scored; a scorer failure leaves an
    /// unscored child in the tree and is returned to the caller.
    pub async fn expand(
        &mut self,
        id: NodeId,
        mutator: &dyn PlanMutator,
        scorer: &dyn PlanScorer,
    ) -> Result<NodeId> {
        let plan = self.plan(id).ok_or_else(|| missing(id))?;

        let modification = mutator.mutate(&self.question, &plan).await?;
        let action = modification.action;
        let child = self.add_child(id, modification)?;

        let child_plan = self.plan(child).ok_or_else(|| missing(child))?;
        let score = scorer.score(&self.question, &child_plan).await?;
        self.set_score(child, score)?;

        info!(
            "Expanded {id} with '{}' into {child} (score {})",
            action.as_str(),
            score.total()
        );
        Ok(child)
    }

    /// Every node in pre-order, root first.
    pub fn preorder(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![Self::ROOT];
        while let Some(id) = stack.pop() {
            order.push(id);
            if let Some(node) = self.node(id) {
                stack.extend(node.children.iter().rev().copied());
            }
        }
        order
    }

    /// Plans of every node sharing the highest total score, ties included,
    /// in pre-order.
    pub fn select_top_plans(&self) -> Vec<Plan> {
        let order = self.preorder();
        let Some(best) = order
            .iter()
            .filter_map(|&id| self.node(id))
            .map(SearchNode::total_score)
            .max()
        else {
            return Vec::new();
        };

        order
            .into_iter()
            .filter(|&id| self.node(id).map(SearchNode::total_score) == Some(best))
            .filter_map(|id| self.plan(id))
            .collect()
    }

    /// Plans of a `k`-sized candidate set built in one pre-order pass.
    ///
    /// The first `k` nodes fill the set; afterwards a node replaces the
    /// lowest-scoring member (the earliest one on ties) only when its score
    /// is strictly greater, so earlier nodes win ties.
    pub fn select_top_k(&self, k: usize) -> Vec<Plan> {
        if k == 0 {
            return Vec::new();
        }

        let mut candidates: Vec<(NodeId, u32)> = Vec::with_capacity(k);
        for id in self.preorder() {
            let Some(node) = self.node(id) else {
                continue;
            };
            let total = node.total_score();

            if candidates.len() < k {
                candidates.push((id, total));
                continue;
            }

            let mut lowest = 0;
            for (index, &(_, score)) in candidates.iter().enumerate() {
                if score < candidates[lowest].1 {
                    lowest = index;
                }
            }
            if total > candidates[lowest].1 {
                candidates[lowest] = (id, total);
            }
        }

        candidates
            .into_iter()
            .filter_map(|(id, _)| self.plan(id))
            .collect()
    }
}
