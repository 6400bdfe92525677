//! Merging scored plans into one step-dependency graph.
//!
//! Every graph is bounded by two sentinels, START and END. Steps are
//! deduplicated by value, so two plans that share a step share its node and
//! the graph becomes the union of their orderings:
//!
//! ```text
//! A = [S1, S2]        START -> S1 -> S2 -> END
//! B = [S1, S3]                  \-> S3 -> END
//! ```
//!
//! The execution frontier is the set of unresolved nodes whose every
//! predecessor on some path from START is resolved. Each branch holds at
//! most one pending step at a time.

use std::{
    collections::{HashMap, HashSet, VecDeque},
    fmt,
};

use log::{debug, info};

use crate::{
    error::{MeridianError, Result},
    models::{CompletedStep, Plan, Step},
};


/// Result preset on START when a graph is created.
pub const STARTED_RESULT: &str = "Started the execution";

/// Handle of a node inside one [`PlanGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StepNodeId(usize);

impl StepNodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for StepNodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s{}", self.0)
    }
}

/// Whether a node is a sentinel or a plan step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeRole {
    Start,
    End,
    Step,
}

/// A node of the merged graph.
#[derive(Debug, Clone, PartialEq)]
pub struct StepNode {
    role: NodeRole,
    step: Step,
    children: Vec<StepNodeId>,
    result: Option<String>,
}

impl StepNode {
    fn new(role: NodeRole, step: Step) -> Self {
        Self {
            role,
            step,
            children: Vec::new(),
            result: None,
        }
    }

    fn sentinel(role: NodeRole, label: &str) -> Self {
        Self::new(role, Step::new(label, label))
    }

    pub fn role(&self) -> NodeRole {
        self.role
    }

    pub fn is_sentinel(&self) -> bool {
        self.role != NodeRole::Step
    }

    pub fn step(&self) -> &Step {
        &self.step
    }

    /// Successors in link order.
    pub fn children(&self) -> &[StepNodeId] {
        &self.children
    }

    /// Execution result; `None` until the step has been run or skipped.
    pub fn result(&self) -> Option<&str> {
        self.result.as_deref()
    }

    pub fn is_resolved(&self) -> bool {
        self.result.is_some()
    }
}

/// Union of plans as a directed graph of deduplicated steps.
///
/// The graph owns every node in a flat arena. Index 0 is START and index 1 is
/// END; plan steps follow in creation order. Lookups by value go through a
/// hash registry that never contains the sentinels.
#[derive(Debug, Clone)]
pub struct PlanGraph {
    nodes: Vec<StepNode>,
    registry: HashMap<Step, StepNodeId>,
}

impl Default for PlanGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl PlanGraph {
    pub const START: StepNodeId = StepNodeId(0);
    pub const END: StepNodeId = StepNodeId(1);

    /// Creates an empty graph holding only the two sentinels.
    pub fn new() -> Self {
        let mut start = StepNode::sentinel(NodeRole::Start, "START");
        start.result = Some(STARTED_RESULT.to_string());
        let end = StepNode::sentinel(NodeRole::End, "END");

        Self {
            nodes: vec![start, end],
            registry: HashMap::new(),
        }
    }

    /// Builds a graph from a batch of plans.
    pub fn from_plans(plans: &[Plan]) -> Self {
        let mut graph = Self::new();
        graph.add_plan_list(plans);
        graph
    }

    /// Number of nodes, sentinels included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// A graph always holds its sentinels.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Number of plan-step nodes.
    pub fn step_count(&self) -> usize {
        self.registry.len()
    }

    pub fn node(&self, id: StepNodeId) -> Option<&StepNode> {
        self.nodes.get(id.0)
    }

    /// Every node handle, sentinels first, then steps in creation order.
    pub fn node_ids(&self) -> impl Iterator<Item = StepNodeId> + '_ {
        (0..self.nodes.len()).map(StepNodeId)
    }

    /// Every edge as `(from, to)`, grouped by source in creation order.
    pub fn edges(&self) -> Vec<(StepNodeId, StepNodeId)> {
        self.nodes
            .iter()
            .enumerate()
            .flat_map(|(index, node)| {
                node.children
                    .iter()
                    .map(move |&child| (StepNodeId(index), child))
            })
            .collect()
    }

    /// Node holding a step equal to `step`, if any.
    pub fn exist_step(&self, step: &Step) -> Option<StepNodeId> {
        self.registry.get(step).copied()
    }

    fn find_or_create(&mut self, step: &Step) -> (StepNodeId, bool) {
        if let Some(id) = self.exist_step(step) {
            return (id, false);
        }
        let id = StepNodeId(self.nodes.len());
        self.nodes.push(StepNode::new(NodeRole::Step, step.clone()));
        self.registry.insert(step.clone(), id);
        (id, true)
    }

    fn link(&mut self, from: StepNodeId, to: StepNodeId) {
        let children = &mut self.nodes[from.0].children;
        if !children.contains(&to) {
            children.push(to);
        }
    }

    /// Merges one plan into the graph.
    ///
    /// Consecutive steps are linked in order. START gains an edge to the
    /// first step and the last step gains an edge to END only when this plan
    /// created those nodes; a step that already exists keeps the edges it
    /// had. A single-step plan is linked between both sentinels.
    pub fn add_plan(&mut self, plan: &Plan) {
        let before = self.nodes.len();
        let steps = &plan.steps;

        if let [only] = steps.as_slice() {
            let (id, created) = self.find_or_create(only);
            if created {
                self.link(Self::START, id);
                self.link(id, Self::END);
            }
        }

        let last_pair = steps.len().saturating_sub(2);
        for (index, pair) in steps.windows(2).enumerate() {
            let (current, current_created) = self.find_or_create(&pair[0]);
            if index == 0 && current_created {
                self.link(Self::START, current);
            }

            let (next, next_created) = self.find_or_create(&pair[1]);
            if index == last_pair && next_created {
                self.link(next, Self::END);
            }

            self.link(current, next);
        }

        debug!(
            "Merged plan of {} steps, {} new nodes",
            steps.len(),
            self.nodes.len() - before
        );
    }

    /// Merges plans in order; later plans may link into earlier nodes.
    pub fn add_plan_list(&mut self, plans: &[Plan]) {
        for plan in plans {
            self.add_plan(plan);
        }
        info!(
            "Merged {} plans into {} step nodes and {} edges",
            plans.len(),
            self.step_count(),
            self.edges().len()
        );
    }

    /// Computes the execution frontier.
    ///
    /// Breadth-first from START with a visited set, so cycles terminate.
    /// An unresolved node is collected and its branch is not explored
    /// further; a resolved node has its children enqueued. END is collected
    /// like any other unresolved node once a path to it is resolved.
    pub fn next_exec_steps(&self) -> Vec<StepNodeId> {
        let mut visited = HashSet::new();
        let mut queue = VecDeque::from([Self::START]);
        let mut frontier = Vec::new();

        while let Some(id) = queue.pop_front() {
            if !visited.insert(id) {
                continue;
            }
            let Some(node) = self.node(id) else {
                continue;
            };

            if id != Self::START && !node.is_resolved() {
                frontier.push(id);
                continue;
            }

            queue.extend(
                node.children
                    .iter()
                    .copied()
                    .filter(|child| !visited.contains(child)),
            );
        }

        debug!("Frontier holds {} nodes", frontier.len());
        frontier
    }

    /// Resolved plan steps with their results, in creation order.
    pub fn current_exec_results(&self) -> Vec<CompletedStep> {
        self.nodes
            .iter()
            .filter(|node| !node.is_sentinel())
            .filter_map(|node| {
                node.result.as_ref().map(|result| CompletedStep {
                    step: node.step.clone(),
                    result: result.clone(),
                })
            })
            .collect()
    }

    /// Writes the result of a node. Results are written once.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for an unknown handle and
    /// `ResultAlreadyRecorded` when the node already holds a result.
    pub fn record_result(&mut self, id: StepNodeId, result: impl Into<String>) -> Result<()> {
        let node = self.nodes.get_mut(id.0).ok_or_else(|| {
            MeridianError::invalid_input("node").with_reason(format!("no graph node {id}"))
        })?;
        if node.result.is_some() {
            return Err(MeridianError::ResultAlreadyRecorded {
                goal: node.step.goal.clone(),
            });
        }
        node.result = Some(result.into());
        Ok(())
    }

    /// Stores the final answer on END.
    pub fn finalize(&mut self, answer: impl Into<String>) -> Result<()> {
        self.record_result(Self::END, answer)
    }

    /// The final answer, once END has been resolved.
    pub fn final_answer(&self) -> Option<&str> {
        self.node(Self::END).and_then(StepNode::result)
    }
}
