//! Dependency resolution using topological sort with DFS
//!
//! Produces the activation order for the registry: every enabled
//! dependency strictly before its dependents, priority deciding the order
//! among independent plugins, registration order breaking priority ties.
//! The order is recomputed on every call because metadata may change
//! between calls.

use brokkr_core::{Error, Result};
use std::collections::HashSet;
use tracing::debug;

use crate::normalize::dependency_id;
use crate::registry::PluginRegistry;

/// Dependency resolver using DFS-based topological sort
pub struct DependencyResolver<'a> {
    registry: &'a PluginRegistry,
}

impl<'a> DependencyResolver<'a> {
    /// Create a new dependency resolver over a registry
    pub fn new(registry: &'a PluginRegistry) -> Self {
        Self { registry }
    }

    /// Resolve the activation order for every enabled plugin
    pub fn resolve_all(&self) -> Result<Vec<String>> {
        let mut resolved = Vec::new();
        let mut seen = HashSet::new();
        let mut visiting = HashSet::new();
        let mut path = Vec::new();

        for id in self.roots() {
            self.visit(&id, &mut resolved, &mut seen, &mut visiting, &mut path)?;
        }
        Ok(resolved)
    }

    /// Resolve the transitive closure of a single plugin
    pub fn resolve(&self, id: &str) -> Result<Vec<String>> {
        if !self.registry.has(id) {
            return Err(Error::not_found(id));
        }

        let mut resolved = Vec::new();
        let mut seen = HashSet::new();
        let mut visiting = HashSet::new();
        let mut path = Vec::new();

        self.visit(id, &mut resolved, &mut seen, &mut visiting, &mut path)?;
        Ok(resolved)
    }

    /// Enabled plugins ordered by priority descending, registration order
    /// breaking ties
    fn roots(&self) -> Vec<String> {
        let mut roots: Vec<(usize, i32, String)> = self
            .registry
            .records()
            .filter(|record| record.metadata.enabled)
            .enumerate()
            .map(|(index, record)| (index, record.spec.priority, record.spec.id.clone()))
            .collect();

        roots.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        roots.into_iter().map(|(_, _, id)| id).collect()
    }

    /// Visit a plugin node using DFS
    fn visit(
        &self,
        id: &str,
        resolved: &mut Vec<String>,
        seen: &mut HashSet<String>,
        visiting: &mut HashSet<String>,
        path: &mut Vec<String>,
    ) -> Result<()> {
        // Cycle detection: re-entering a node on the current path
        if visiting.contains(id) {
            let start = path.iter().position(|entry| entry == id).unwrap_or(0);
            let mut cycle: Vec<&str> = path[start..].iter().map(|entry| entry.as_str()).collect();
            cycle.push(id);
            return Err(Error::circular_dependency(cycle.join(" -> ")));
        }

        // Already finalized
        if seen.contains(id) {
            return Ok(());
        }

        // Dependencies on plugins outside the registry, or disabled ones,
        // are treated as already satisfied
        let record = match self.registry.get(id) {
            Some(record) => record,
            None => {
                debug!("Skipping dependency '{}': not in registry", id);
                seen.insert(id.to_string());
                return Ok(());
            }
        };
        if !record.metadata.enabled {
            debug!("Skipping dependency '{}': disabled", id);
            seen.insert(id.to_string());
            return Ok(());
        }

        visiting.insert(id.to_string());
        path.push(id.to_string());

        // Visit dependencies first, in declaration order
        for dep in &record.metadata.dependencies {
            let dep_id = dependency_id(dep);
            self.visit(&dep_id, resolved, seen, visiting, path)?;
        }

        path.pop();
        visiting.remove(id);
        seen.insert(id.to_string());
        resolved.push(id.to_string());

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brokkr_core::types::{PluginMetadata, PluginRecord, PluginSpec};

    fn create_test_registry(plugins: Vec<(&str, Vec<&str>, i32)>) -> PluginRegistry {
        let mut registry = PluginRegistry::new();
        for (id, deps, priority) in plugins {
            let spec = PluginSpec {
                id: id.to_string(),
                source: format!("https://github.com/owner/{}", id),
                version: None,
                priority,
            };
            let metadata = PluginMetadata {
                dependencies: deps.iter().map(|s| s.to_string()).collect(),
                ..PluginMetadata::default()
            };
            registry.insert(PluginRecord::new(spec, metadata));
        }
        registry
    }

    #[test]
    fn test_simple_dependency_chain() {
        // C -> B -> A
        let registry = create_test_registry(vec![
            ("A", vec![], 50),
            ("B", vec!["A"], 50),
            ("C", vec!["B"], 50),
        ]);

        let resolver = DependencyResolver::new(&registry);
        let result = resolver.resolve("C").unwrap();

        assert_eq!(result, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_full_registry_covers_enabled_plugins() {
        let registry = create_test_registry(vec![
            ("A", vec![], 50),
            ("B", vec!["A"], 50),
            ("C", vec![], 50),
        ]);

        let resolver = DependencyResolver::new(&registry);
        let result = resolver.resolve_all().unwrap();

        assert_eq!(result, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_priority_orders_independent_plugins() {
        let registry = create_test_registry(vec![
            ("low", vec![], 10),
            ("high", vec![], 100),
            ("mid", vec![], 50),
        ]);

        let resolver = DependencyResolver::new(&registry);
        let result = resolver.resolve_all().unwrap();

        assert_eq!(result, vec!["high", "mid", "low"]);
    }

    #[test]
    fn test_dependency_order_overrides_priority() {
        // Y has the highest priority but depends on X
        let registry = create_test_registry(vec![("X", vec![], 10), ("Y", vec!["X"], 100)]);

        let resolver = DependencyResolver::new(&registry);
        let result = resolver.resolve_all().unwrap();

        assert_eq!(result, vec!["X", "Y"]);
    }

    #[test]
    fn test_registration_order_breaks_priority_ties() {
        let registry = create_test_registry(vec![
            ("second", vec![], 50),
            ("first", vec![], 50),
        ]);

        let resolver = DependencyResolver::new(&registry);
        let result = resolver.resolve_all().unwrap();

        assert_eq!(result, vec!["second", "first"]);
    }

    #[test]
    fn test_repeated_calls_are_deterministic() {
        let registry = create_test_registry(vec![
            ("A", vec![], 50),
            ("B", vec!["A"], 80),
            ("C", vec!["A"], 50),
            ("D", vec!["B", "C"], 20),
        ]);

        let resolver = DependencyResolver::new(&registry);
        let first = resolver.resolve_all().unwrap();
        for _ in 0..5 {
            assert_eq!(resolver.resolve_all().unwrap(), first);
        }
    }

    #[test]
    fn test_circular_dependency_names_full_cycle() {
        let registry =
            create_test_registry(vec![("A", vec!["B"], 50), ("B", vec!["A"], 50)]);

        let resolver = DependencyResolver::new(&registry);
        let err = resolver.resolve_all().unwrap_err();

        match err {
            Error::CircularDependency { cycle } => {
                assert!(cycle.contains('A'), "cycle should name A: {}", cycle);
                assert!(cycle.contains('B'), "cycle should name B: {}", cycle);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_dangling_dependency_is_skipped() {
        let registry = create_test_registry(vec![("A", vec!["ghost"], 50)]);

        let resolver = DependencyResolver::new(&registry);
        let result = resolver.resolve_all().unwrap();

        assert_eq!(result, vec!["A"]);
    }

    #[test]
    fn test_disabled_plugins_are_excluded() {
        let mut registry = create_test_registry(vec![("A", vec![], 50), ("B", vec!["A"], 50)]);
        registry.get_mut("A").unwrap().metadata.enabled = false;

        let resolver = DependencyResolver::new(&registry);
        let result = resolver.resolve_all().unwrap();

        // A is disabled: excluded from the order, and B's edge to it is
        // treated as satisfied
        assert_eq!(result, vec!["B"]);
    }

    #[test]
    fn test_locator_shaped_dependency_reduces_to_id() {
        let registry = create_test_registry(vec![
            ("name", vec![], 50),
            ("B", vec!["owner/name"], 50),
        ]);

        let resolver = DependencyResolver::new(&registry);
        let result = resolver.resolve_all().unwrap();

        assert_eq!(result, vec!["name", "B"]);
    }

    #[test]
    fn test_diamond_dependency_resolves_once() {
        // D -> B -> A
        // D -> C -> A
        let registry = create_test_registry(vec![
            ("A", vec![], 50),
            ("B", vec!["A"], 50),
            ("C", vec!["A"], 50),
            ("D", vec!["B", "C"], 50),
        ]);

        let resolver = DependencyResolver::new(&registry);
        let result = resolver.resolve("D").unwrap();

        assert_eq!(result.iter().filter(|id| *id == "A").count(), 1);

        let a_pos = result.iter().position(|x| x == "A").unwrap();
        let b_pos = result.iter().position(|x| x == "B").unwrap();
        let c_pos = result.iter().position(|x| x == "C").unwrap();
        let d_pos = result.iter().position(|x| x == "D").unwrap();

        assert!(a_pos < b_pos);
        assert!(a_pos < c_pos);
        assert!(b_pos < d_pos);
        assert!(c_pos < d_pos);
    }

    #[test]
    fn test_single_resolve_unknown_id_fails() {
        let registry = create_test_registry(vec![("A", vec![], 50)]);
        let resolver = DependencyResolver::new(&registry);
        assert!(matches!(
            resolver.resolve("ghost"),
            Err(Error::NotFound { .. })
        ));
    }
}
