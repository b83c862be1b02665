//! Runlevel inheritance and effective membership.
//!
//! `RunlevelInherits multi single` means services tagged `single` are also active in
//! `multi`. The relation is one hop only: it is never transitively closed.
use serde::Serialize;

use crate::service::ServiceDescriptor;

/// A directed `(child, parent)` edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InheritanceEdge {
    pub child: String,
    pub parent: String,
}

/// All inheritance edges declared by the source, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InheritanceGraph {
    edges: Vec<InheritanceEdge>,
}

impl InheritanceGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_edge(&mut self, child: impl Into<String>, parent: impl Into<String>) {
        self.edges.push(InheritanceEdge {
            child: child.into(),
            parent: parent.into(),
        });
    }

    /// Literal one-hop lookup.
    pub fn has_edge(&self, child: &str, parent: &str) -> bool {
        self.edges
            .iter()
            .any(|edge| edge.child == child && edge.parent == parent)
    }

    pub fn edges(&self) -> &[InheritanceEdge] {
        &self.edges
    }

    /// Whether `service` is active in `runlevel`: literally, or through one edge
    /// `(runlevel, L)` for some runlevel `L` the service lists.
    pub fn is_member(&self, service: &ServiceDescriptor, runlevel: &str) -> bool {
        service.has_runlevel(runlevel)
            || service
                .runlevels
                .iter()
                .any(|listed| self.has_edge(runlevel, listed))
    }
}
