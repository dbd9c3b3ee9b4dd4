//! Container configuration.

#[cfg(feature = "config")]
use serde::{Deserialize, Serialize};

/// Default bound on the length of a single resolution chain.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Options applied when a [`Registry`](crate::Registry) is built into a container.
///
/// # Examples
///
/// ```rust
/// use keyed_di::{ContainerOptions, Registry};
///
/// let options = ContainerOptions::new().max_depth(32).validate_on_build(true);
/// assert_eq!(options.max_depth, 32);
///
/// let container = Registry::new().build_with(options).unwrap();
/// assert!(container.is_root());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct ContainerOptions {
    /// Longest resolution chain allowed before failing with
    /// [`DiError::DepthExceeded`](crate::DiError::DepthExceeded).
    ///
    /// Transient registrations are not cycle-guarded, so this is what stops a
    /// transient that requests itself from recursing until the stack overflows.
    pub max_depth: usize,
    /// Run [`Registry::validate`](crate::Registry::validate) before building
    /// and refuse to build when it reports errors.
    pub validate_on_build: bool,
}

impl ContainerOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets [`max_depth`](Self::max_depth). Values below 1 are raised to 1.
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth.max(1);
        self
    }

    /// Sets [`validate_on_build`](Self::validate_on_build).
    pub fn validate_on_build(mut self, enabled: bool) -> Self {
        self.validate_on_build = enabled;
        self
    }

    /// Parses options from JSON. Missing fields keep their defaults.
    ///
    /// ```rust
    /// use keyed_di::ContainerOptions;
    ///
    /// let options = ContainerOptions::from_json_str(r#"{ "max_depth": 64 }"#).unwrap();
    /// assert_eq!(options.max_depth, 64);
    /// assert!(!options.validate_on_build);
    /// ```
    #[cfg(feature = "config")]
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        let options: Self = serde_json::from_str(json)?;
        let depth = options.max_depth;
        Ok(options.max_depth(depth))
    }
}

impl Default for ContainerOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            validate_on_build: false,
        }
    }
}
