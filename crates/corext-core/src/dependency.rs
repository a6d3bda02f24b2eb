//! Dependency graph and activation ordering for extensions.
//!
//! Extensions declare the names of the extensions they need. This module
//! turns a discovered set into a total order in which every extension comes
//! after all of its dependencies. Ties between unrelated extensions are
//! broken by discovery order, so the same input always yields the same
//! sequence in the logs.
//!
//! # Example
//!
//! ```
//! use corext_core::dependency::{DependencyResolver, TopologicalResolver};
//! use corext_core::ExtensionInfo;
//!
//! let discovered = vec![
//!     ExtensionInfo::new("agent", ["repository"]),
//!     ExtensionInfo::new("repository", Vec::<String>::new()),
//! ];
//!
//! let order = TopologicalResolver.resolve(&discovered).unwrap();
//! assert_eq!(order.names(), vec!["repository", "agent"]);
//! assert_eq!(order.positions(), &[1, 0]);
//! ```

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::capability::CoreExtensions;
use crate::error::{Error, Result};
use crate::extension::ExtensionInfo;

/// Computes the activation order for a discovered extension set.
pub trait DependencyResolver: Send + Sync + fmt::Debug {
    /// Order `extensions` so that every extension follows its dependencies.
    ///
    /// # Errors
    ///
    /// Returns `Error::DuplicateExtension`, `Error::UnresolvedDependency`, or
    /// `Error::CyclicDependency` when the set cannot be ordered.
    fn resolve(&self, extensions: &[ExtensionInfo]) -> Result<ExtensionOrder>;
}

/// Resolver that performs a stable topological sort over declared
/// dependencies.
#[derive(Debug, Clone, Copy, Default)]
pub struct TopologicalResolver;

impl DependencyResolver for TopologicalResolver {
    fn resolve(&self, extensions: &[ExtensionInfo]) -> Result<ExtensionOrder> {
        let graph = DependencyGraph::build(extensions)?;
        let positions = graph.topological_sort()?;
        Ok(ExtensionOrder::from_positions(extensions, positions))
    }
}

/// The resolved activation order.
///
/// Forward iteration is the initialise/start order; [`ExtensionOrder::stop_order`]
/// is its exact reverse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionOrder {
    /// Ordered snapshot of the extensions.
    extensions: Vec<ExtensionInfo>,
    /// Index of each ordered extension in the discovered input.
    positions: Vec<usize>,
}

impl ExtensionOrder {
    /// Build an order from indices into `discovered`.
    ///
    /// This is how custom resolvers produce their result: `positions[k]` is
    /// the discovery index of the `k`-th extension to activate.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidOrder` unless `positions` names every index of
    /// `discovered` exactly once.
    pub fn new(discovered: &[ExtensionInfo], positions: Vec<usize>) -> Result<Self> {
        check_positions(&positions, discovered.len())?;
        Ok(Self::from_positions(discovered, positions))
    }

    /// Confirm that this order covers exactly `discovered`.
    ///
    /// Every discovered extension must appear once, and the snapshot at
    /// each slot must equal the discovered extension its position points at.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidOrder` describing the first mismatch.
    pub fn validate(&self, discovered: &[ExtensionInfo]) -> Result<()> {
        check_positions(&self.positions, discovered.len())?;
        for (info, &pos) in self.extensions.iter().zip(&self.positions) {
            let expected = &discovered[pos];
            if info != expected {
                return Err(Error::InvalidOrder {
                    reason: format!(
                        "'{}' is ordered at position {pos}, which holds '{}'",
                        info.name, expected.name
                    ),
                });
            }
        }
        Ok(())
    }

    fn from_positions(discovered: &[ExtensionInfo], positions: Vec<usize>) -> Self {
        Self {
            extensions: positions.iter().map(|&i| discovered[i].clone()).collect(),
            positions,
        }
    }

    /// Indices into the discovered input, in activation order.
    pub fn positions(&self) -> &[usize] {
        &self.positions
    }

    /// Indices into the discovered input, in stop order.
    pub fn stop_order(&self) -> impl Iterator<Item = usize> + '_ {
        self.positions.iter().rev().copied()
    }

    /// Extension names in activation order.
    pub fn names(&self) -> Vec<&str> {
        self.extensions.iter().map(|e| e.name.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ExtensionInfo> {
        self.extensions.iter()
    }

    pub fn len(&self) -> usize {
        self.extensions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }

    /// Shared read-only view handed to `CoreExtensionsAware` extensions.
    pub fn to_core_extensions(&self) -> CoreExtensions {
        Arc::from(self.extensions.clone())
    }
}

/// Require `positions` to be a permutation of `0..discovered`.
fn check_positions(positions: &[usize], discovered: usize) -> Result<()> {
    if positions.len() != discovered {
        return Err(Error::InvalidOrder {
            reason: format!(
                "{} extensions discovered but {} ordered",
                discovered,
                positions.len()
            ),
        });
    }
    let mut seen = vec![false; discovered];
    for &pos in positions {
        match seen.get_mut(pos) {
            Some(flag) if !*flag => *flag = true,
            _ => {
                return Err(Error::InvalidOrder {
                    reason: format!("position {pos} is out of range or repeated"),
                });
            }
        }
    }
    Ok(())
}

/// Directed graph of dependencies between discovered extensions.
///
/// Edges point from dependent to dependency: if A depends on B, the edge is
/// `A -> B`. Nodes are identified by their discovery index.
#[derive(Debug, Clone)]
pub struct DependencyGraph<'a> {
    nodes: &'a [ExtensionInfo],
    index: HashMap<&'a str, usize>,
    /// `dependencies[i]`: nodes that `i` depends on (deduplicated).
    dependencies: Vec<Vec<usize>>,
    /// `dependents[i]`: nodes that depend on `i`.
    dependents: Vec<Vec<usize>>,
}

impl<'a> DependencyGraph<'a> {
    /// Build the graph, validating names and dependency references.
    ///
    /// # Errors
    ///
    /// Returns `Error::DuplicateExtension` if two extensions share a name,
    /// and `Error::UnresolvedDependency` if a dependency names an extension
    /// that is not in `extensions`.
    pub fn build(extensions: &'a [ExtensionInfo]) -> Result<Self> {
        let mut index = HashMap::with_capacity(extensions.len());
        for (i, ext) in extensions.iter().enumerate() {
            if index.insert(ext.name.as_str(), i).is_some() {
                return Err(Error::DuplicateExtension {
                    name: ext.name.clone(),
                });
            }
        }

        let mut dependencies = vec![Vec::new(); extensions.len()];
        let mut dependents = vec![Vec::new(); extensions.len()];
        for (i, ext) in extensions.iter().enumerate() {
            for dep in &ext.dependencies {
                let Some(&target) = index.get(dep.as_str()) else {
                    return Err(Error::UnresolvedDependency {
                        extension: ext.name.clone(),
                        dependency: dep.clone(),
                    });
                };
                if !dependencies[i].contains(&target) {
                    dependencies[i].push(target);
                    dependents[target].push(i);
                }
            }
        }

        Ok(Self {
            nodes: extensions,
            index,
            dependencies,
            dependents,
        })
    }

    /// Return the number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Return the number of distinct edges.
    pub fn edge_count(&self) -> usize {
        self.dependencies.iter().map(Vec::len).sum()
    }

    /// Get the direct dependencies of a node, in declaration order.
    pub fn dependencies_of(&self, name: &str) -> Vec<&'a str> {
        self.index
            .get(name)
            .map(|&i| {
                self.dependencies[i]
                    .iter()
                    .map(|&d| self.nodes[d].name.as_str())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Perform a topological sort using Kahn's algorithm.
    ///
    /// Returns discovery indices in dependency-first order. Among the nodes
    /// that are ready at any step, the one discovered first is emitted first.
    ///
    /// # Errors
    ///
    /// Returns `Error::CyclicDependency` if the graph contains a cycle.
    pub fn topological_sort(&self) -> Result<Vec<usize>> {
        let mut in_degree: Vec<usize> = self.dependencies.iter().map(Vec::len).collect();
        let mut ready: BTreeSet<usize> = in_degree
            .iter()
            .enumerate()
            .filter(|(_, deg)| **deg == 0)
            .map(|(i, _)| i)
            .collect();

        let mut sorted = Vec::with_capacity(self.nodes.len());
        while let Some(current) = ready.pop_first() {
            sorted.push(current);
            for &dependent in &self.dependents[current] {
                in_degree[dependent] -= 1;
                if in_degree[dependent] == 0 {
                    ready.insert(dependent);
                }
            }
        }

        if sorted.len() != self.nodes.len() {
            let mut remaining = vec![true; self.nodes.len()];
            for &i in &sorted {
                remaining[i] = false;
            }
            return Err(Error::CyclicDependency {
                participants: self.find_cycle(&remaining),
            });
        }

        debug!(
            order = ?sorted.iter().map(|&i| self.nodes[i].name.as_str()).collect::<Vec<_>>(),
            "Resolved extension order"
        );
        Ok(sorted)
    }

    /// Walk unsorted nodes along their dependencies until one repeats.
    ///
    /// Every unsorted node still has an unsorted dependency, so the walk
    /// always closes a cycle. The result starts and ends with the same name.
    fn find_cycle(&self, remaining: &[bool]) -> Vec<String> {
        let Some(start) = remaining.iter().position(|&r| r) else {
            return Vec::new();
        };

        let mut path: Vec<usize> = Vec::new();
        let mut current = start;
        loop {
            if let Some(pos) = path.iter().position(|&n| n == current) {
                let mut cycle: Vec<String> = path[pos..]
                    .iter()
                    .map(|&n| self.nodes[n].name.clone())
                    .collect();
                cycle.push(self.nodes[current].name.clone());
                return cycle;
            }
            path.push(current);
            match self.dependencies[current].iter().find(|&&d| remaining[d]) {
                Some(&next) => current = next,
                None => {
                    return path.iter().map(|&n| self.nodes[n].name.clone()).collect();
                }
            }
        }
    }
}
