//! Build-time validation of declared dependencies.
//!
//! Resolution never consults declared dependencies; this module walks them
//! to catch configuration errors before any factory runs. Registrations
//! declare dependencies through [`Registration::depends_on`](crate::Registration::depends_on),
//! [`Injectable::DEPENDENCIES`](crate::Injectable::DEPENDENCIES) or
//! [`Registration::alias`](crate::Registration::alias).
//!
//! # Validation Rules
//!
//! - **Missing dependency**: a declared key is not registered
//! - **Self dependency**: a key declares itself
//! - **Lifetime mismatch**: a singleton may depend only on singletons, a
//!   scoped key on singleton or scoped keys, a transient on anything
//! - **Circular dependency**: declared dependencies form a cycle

use std::collections::{BTreeSet, HashSet};

use thiserror::Error;

use crate::collection::Registry;
use crate::key::KeyPath;
use crate::{Container, DiError, DiResult, Key, Lifetime};

/// A problem found in the declared dependency graph.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Declared dependency is not registered
    #[error("Key {key} requires unregistered key {dependency}")]
    MissingDependency { key: Key, dependency: Key },
    /// Key declares itself as a dependency
    #[error("Key {key} requires self")]
    SelfDependency { key: Key },
    /// Dependency is shorter-lived than its dependent
    #[error("{lifetime} key {key} cannot depend on {dependency_lifetime} key {dependency}")]
    LifetimeMismatch {
        key: Key,
        lifetime: Lifetime,
        dependency: Key,
        dependency_lifetime: Lifetime,
    },
    /// Declared dependencies form a cycle
    #[error("Circular dependency: {}", KeyPath(.cycle))]
    CircularDependency {
        /// Keys along the cycle, first key repeated at the end
        cycle: Vec<Key>,
    },
}

/// Result of [`Registry::validate`].
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    /// Problems found, ordered by key.
    pub errors: Vec<ValidationError>,
}

impl ValidationResult {
    /// Returns true if validation passed without errors.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Formats errors for display, one per line.
    pub fn format_issues(&self) -> String {
        let mut output = String::new();
        if !self.errors.is_empty() {
            output.push_str("Validation Errors:\n");
            for error in &self.errors {
                output.push_str(&format!("  - {}\n", error));
            }
        }
        output
    }

    /// Converts into `Err(DiError::Validation)` when there are errors.
    pub fn into_result(self) -> DiResult<()> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(DiError::Validation(self.errors))
        }
    }
}

impl Registry {
    /// Checks declared dependencies of every registration.
    ///
    /// # Examples
    ///
    /// ```
    /// use keyed_di::{register, Registration, ValidationError};
    ///
    /// let registry = register([
    ///     ("request", Registration::from_fn(|_| 0u64).scoped()),
    ///     ("audit", Registration::from_fn(|_| ()).depends_on(["request"])),
    /// ])
    /// .unwrap();
    ///
    /// let result = registry.validate();
    /// assert!(!result.is_valid());
    /// assert!(matches!(
    ///     &result.errors[0],
    ///     ValidationError::LifetimeMismatch { key, .. } if key == "audit"
    /// ));
    /// ```
    pub fn validate(&self) -> ValidationResult {
        let mut errors = Vec::new();
        let keys = self.keys();

        for key in &keys {
            let Some(registration) = self.get(key.as_str()) else {
                continue;
            };
            let lifetime = registration.lifetime();
            for dependency in registration.dependencies() {
                if dependency == key {
                    errors.push(ValidationError::SelfDependency { key: key.clone() });
                    continue;
                }
                match self.lifetime_of(dependency.as_str()) {
                    None => errors.push(ValidationError::MissingDependency {
                        key: key.clone(),
                        dependency: dependency.clone(),
                    }),
                    Some(dependency_lifetime) if !lifetime.can_depend_on(dependency_lifetime) => {
                        errors.push(ValidationError::LifetimeMismatch {
                            key: key.clone(),
                            lifetime,
                            dependency: dependency.clone(),
                            dependency_lifetime,
                        })
                    }
                    Some(_) => {}
                }
            }
        }

        errors.extend(
            self.detect_cycles(&keys)
                .into_iter()
                .map(|cycle| ValidationError::CircularDependency { cycle }),
        );

        if !errors.is_empty() {
            tracing::debug!(errors = errors.len(), "registry validation found problems");
        }
        ValidationResult { errors }
    }

    /// Detects cycles using DFS. Self edges are reported separately.
    fn detect_cycles(&self, keys: &[Key]) -> Vec<Vec<Key>> {
        let mut visited = HashSet::new();
        let mut path = Vec::new();
        let mut cycles = Vec::new();

        for key in keys {
            if !visited.contains(key) {
                self.dfs_cycles(key, &mut visited, &mut path, &mut cycles);
            }
        }

        cycles
    }

    fn dfs_cycles(
        &self,
        current: &Key,
        visited: &mut HashSet<Key>,
        path: &mut Vec<Key>,
        cycles: &mut Vec<Vec<Key>>,
    ) {
        if let Some(start) = path.iter().position(|key| key == current) {
            let mut cycle = path[start..].to_vec();
            cycle.push(current.clone());
            cycles.push(cycle);
            return;
        }

        if !visited.insert(current.clone()) {
            return;
        }

        let Some(registration) = self.get(current.as_str()) else {
            return;
        };

        path.push(current.clone());
        for dependency in registration.dependencies() {
            if dependency != current {
                self.dfs_cycles(dependency, visited, path, cycles);
            }
        }
        path.pop();
    }

    /// Unregistered keys that `key` needs, directly or through its declared
    /// dependencies, sorted.
    ///
    /// An unregistered `key` reports itself.
    ///
    /// # Examples
    ///
    /// ```
    /// use keyed_di::{register, Key, Registration};
    ///
    /// let registry = register([
    ///     ("a", Registration::from_value("a")),
    ///     ("b", Registration::from_value("b")),
    ///     ("c", Registration::from_fn(|_| "ab").depends_on(["a", "b"])),
    ///     ("e", Registration::from_fn(|_| "gh").depends_on(["g", "h"])),
    ///     ("f", Registration::from_fn(|_| "de").depends_on(["d", "e"])),
    /// ])
    /// .unwrap();
    ///
    /// assert!(registry.unresolved_keys("c").is_empty());
    /// assert_eq!(
    ///     registry.unresolved_keys("f"),
    ///     vec![Key::from("d"), Key::from("g"), Key::from("h")]
    /// );
    /// ```
    pub fn unresolved_keys(&self, key: &str) -> Vec<Key> {
        let mut missing = BTreeSet::new();
        let mut seen = HashSet::new();
        let mut stack = vec![Key::from(key)];

        while let Some(current) = stack.pop() {
            if !seen.insert(current.clone()) {
                continue;
            }
            match self.get(current.as_str()) {
                Some(registration) => stack.extend(registration.dependencies().iter().cloned()),
                None => {
                    missing.insert(current);
                }
            }
        }

        missing.into_iter().collect()
    }

    /// Keys whose declared dependency closure is fully registered, sorted.
    ///
    /// Computed as a fixpoint: a key is resolvable once all of its declared
    /// dependencies are. Keys on a declared cycle never become resolvable.
    pub fn resolvable_keys(&self) -> Vec<Key> {
        let mut resolved: BTreeSet<Key> = BTreeSet::new();
        loop {
            let before = resolved.len();
            for (key, registration) in self.iter() {
                if resolved.contains(key) {
                    continue;
                }
                let ready = registration
                    .dependencies()
                    .iter()
                    .all(|dependency| dependency != key && resolved.contains(dependency));
                if ready {
                    resolved.insert(key.clone());
                }
            }
            if resolved.len() == before {
                break;
            }
        }
        resolved.into_iter().collect()
    }

    /// Validates, then builds the root container with default options.
    ///
    /// # Errors
    ///
    /// [`DiError::Validation`] carrying every problem found.
    pub fn try_build(&self) -> DiResult<Container> {
        self.validate().into_result()?;
        Ok(self.build())
    }
}
