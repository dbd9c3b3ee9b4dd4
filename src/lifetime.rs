//! Service lifetime definitions.

use std::fmt;

/// Service lifetimes controlling instance caching behavior
///
/// # Examples
///
/// ```rust
/// use keyed_di::{register, Registration, Resolver, Lifetime};
/// use std::sync::Arc;
///
/// struct Database { url: String }
/// struct Repository { db: Arc<Database> }
/// struct RequestModel { id: u32 }
///
/// let container = register([
///     ("db", Registration::from_value(Database { url: "postgres://localhost".to_string() })),
///     ("repo", Registration::from_fn(|r| Repository { db: r.get_required::<Database>("db") }).scoped()),
///     ("model", Registration::from_fn(|_| RequestModel { id: 12345 }).transient()),
/// ])
/// .unwrap()
/// .build();
///
/// // Singleton: same instance across scopes
/// let scope1 = container.scope();
/// let db1 = container.get_required::<Database>("db");
/// let db2 = scope1.get_required::<Database>("db");
/// assert!(Arc::ptr_eq(&db1, &db2));
///
/// // Scoped: same within a scope, different across scopes
/// let repo1a = scope1.get_required::<Repository>("repo");
/// let repo1b = scope1.get_required::<Repository>("repo");
/// assert!(Arc::ptr_eq(&repo1a, &repo1b));
/// let scope2 = container.scope();
/// let repo2 = scope2.get_required::<Repository>("repo");
/// assert!(!Arc::ptr_eq(&repo1a, &repo2));
///
/// // Transient: always different instances
/// let m1 = scope1.get_required::<RequestModel>("model");
/// let m2 = scope1.get_required::<RequestModel>("model");
/// assert!(!Arc::ptr_eq(&m1, &m2));
/// assert_eq!(m1.id, 12345);
/// assert_eq!(Lifetime::Scoped.to_string(), "scoped");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lifetime {
    /// Single instance per root container, cached forever
    ///
    /// Singleton instances live in the root's cache and are shared by every
    /// scope derived from that root.
    Singleton,
    /// Single instance per scope, cached for the scope's lifetime
    Scoped,
    /// New instance per resolution, never cached
    Transient,
}

impl Lifetime {
    /// Lower-case name used in diagnostics.
    pub fn as_str(&self) -> &'static str {
        match self {
            Lifetime::Singleton => "singleton",
            Lifetime::Scoped => "scoped",
            Lifetime::Transient => "transient",
        }
    }

    /// Whether a service of this lifetime may depend on one of `dependency`.
    ///
    /// A dependency must live at least as long as its dependent: singletons
    /// take only singletons, scoped services take singletons or scoped
    /// services, and transients take anything.
    pub fn can_depend_on(self, dependency: Lifetime) -> bool {
        match (self, dependency) {
            (Lifetime::Transient, _) => true,
            (Lifetime::Scoped, Lifetime::Transient) => false,
            (Lifetime::Scoped, _) => true,
            (Lifetime::Singleton, Lifetime::Singleton) => true,
            (Lifetime::Singleton, _) => false,
        }
    }
}

impl fmt::Display for Lifetime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dependency_rules() {
        use Lifetime::*;

        assert!(Singleton.can_depend_on(Singleton));
        assert!(!Singleton.can_depend_on(Scoped));
        assert!(!Singleton.can_depend_on(Transient));

        assert!(Scoped.can_depend_on(Singleton));
        assert!(Scoped.can_depend_on(Scoped));
        assert!(!Scoped.can_depend_on(Transient));

        assert!(Transient.can_depend_on(Singleton));
        assert!(Transient.can_depend_on(Scoped));
        assert!(Transient.can_depend_on(Transient));
    }
}
