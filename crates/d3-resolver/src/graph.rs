//! Inheritance graph over claims of a single kind

use crate::error::GraphError;
use d3_domain::{Claim, ClaimId, ClaimKind};
use std::collections::{BTreeMap, BTreeSet, VecDeque};

/// Directed graph of claim identifiers with `parent -> child` edges
///
/// Types and behaviours each get their own graph; a type's parent must be
/// a type and a behaviour's parent must be a behaviour. The graph is built
/// once per build, is guaranteed acyclic and is read-only afterwards.
#[derive(Debug, Clone)]
pub struct ClaimGraph {
    kind: ClaimKind,
    parents: BTreeMap<ClaimId, Vec<ClaimId>>,
    children: BTreeMap<ClaimId, Vec<ClaimId>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Visiting,
    Done,
}

impl ClaimGraph {
    /// Build the graph of `kind` from a claim set
    ///
    /// Claims of other kinds are ignored. Fails on the first parent that is
    /// not a claim of the same kind, then on any cycle.
    pub fn build<'a, I>(kind: ClaimKind, claims: I) -> Result<Self, GraphError>
    where
        I: IntoIterator<Item = &'a Claim>,
    {
        let claims: Vec<&Claim> = claims.into_iter().filter(|c| c.kind == kind).collect();

        let mut graph = Self {
            kind,
            parents: claims.iter().map(|c| (c.id.clone(), Vec::new())).collect(),
            children: claims.iter().map(|c| (c.id.clone(), Vec::new())).collect(),
        };

        for claim in &claims {
            for parent in claim.parent_ids() {
                graph.add_edge(parent, &claim.id)?;
            }
        }

        if let Some(id) = graph.find_cycle() {
            return Err(GraphError::CyclicDependency { kind, id });
        }

        tracing::debug!("Built {} graph with {} claims", kind, graph.len());
        Ok(graph)
    }

    fn add_edge(&mut self, parent: &ClaimId, child: &ClaimId) -> Result<(), GraphError> {
        let Some(siblings) = self.children.get_mut(parent) else {
            return Err(GraphError::UnknownParent {
                kind: self.kind,
                child: child.clone(),
                parent: parent.clone(),
            });
        };
        if siblings.contains(child) {
            return Ok(());
        }
        siblings.push(child.clone());
        self.parents.entry(child.clone()).or_default().push(parent.clone());
        Ok(())
    }

    /// Kind of claim this graph covers
    pub fn kind(&self) -> ClaimKind {
        self.kind
    }

    /// Number of claims in the graph
    pub fn len(&self) -> usize {
        self.parents.len()
    }

    /// Whether the graph has no claims
    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
    }

    /// Whether `id` is a node of this graph
    pub fn contains(&self, id: &ClaimId) -> bool {
        self.parents.contains_key(id)
    }

    /// Direct parents of `id`, in declaration order
    pub fn parents_of(&self, id: &ClaimId) -> &[ClaimId] {
        self.parents.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Direct children of `id`, in discovery order
    pub fn children_of(&self, id: &ClaimId) -> &[ClaimId] {
        self.children.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every transitive ancestor of `id`, in ascending id order
    pub fn ancestors_of(&self, id: &ClaimId) -> BTreeSet<ClaimId> {
        let mut seen = BTreeSet::new();
        let mut queue: VecDeque<&ClaimId> = self.parents_of(id).iter().collect();
        while let Some(next) = queue.pop_front() {
            if seen.insert(next.clone()) {
                queue.extend(self.parents_of(next));
            }
        }
        seen
    }

    /// Whether parent references loop back on themselves
    pub fn has_cycle(&self) -> bool {
        self.find_cycle().is_some()
    }

    /// A claim on some cycle, if any (iterative depth-first search)
    pub fn find_cycle(&self) -> Option<ClaimId> {
        let mut marks: BTreeMap<&ClaimId, Mark> = BTreeMap::new();

        for start in self.parents.keys() {
            if marks.contains_key(start) {
                continue;
            }
            marks.insert(start, Mark::Visiting);
            let mut stack: Vec<(&ClaimId, usize)> = vec![(start, 0)];

            while let Some(top) = stack.last_mut() {
                let node = top.0;
                let edges = self.parents_of(node);
                if top.1 < edges.len() {
                    let next = &edges[top.1];
                    top.1 += 1;
                    match marks.get(next) {
                        Some(Mark::Visiting) => return Some(next.clone()),
                        Some(Mark::Done) => {}
                        None => {
                            marks.insert(next, Mark::Visiting);
                            stack.push((next, 0));
                        }
                    }
                } else {
                    marks.insert(node, Mark::Done);
                    stack.pop();
                }
            }
        }

        None
    }

    /// All claims ordered so that every parent precedes its children
    ///
    /// Kahn's algorithm; ties broken by ascending id.
    pub fn topological_order(&self) -> Vec<ClaimId> {
        let mut pending: BTreeMap<&ClaimId, usize> =
            self.parents.iter().map(|(id, parents)| (id, parents.len())).collect();
        let mut ready: BTreeSet<&ClaimId> =
            pending.iter().filter(|(_, n)| **n == 0).map(|(id, _)| *id).collect();
        let mut order = Vec::with_capacity(self.len());

        while let Some(id) = ready.pop_first() {
            order.push(id.clone());
            for child in self.children_of(id) {
                if let Some(count) = pending.get_mut(child) {
                    *count -= 1;
                    if *count == 0 {
                        ready.insert(child);
                    }
                }
            }
        }

        order
    }
}
