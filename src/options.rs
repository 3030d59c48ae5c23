//! Options for [`resolve_decorators`](crate::resolve_decorators).

#[cfg(feature = "config")]
use serde::{Deserialize, Serialize};

/// Orchestrator flags.
///
/// # Examples
///
/// ```rust
/// use ferrous_decor::ResolveOptions;
///
/// let options = ResolveOptions::new().make_instance(true);
/// assert!(options.make_instance);
/// assert!(!ResolveOptions::default().make_instance);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default, rename_all = "camelCase"))]
pub struct ResolveOptions {
    /// Construct the target and bind it to [`TARGET_INSTANCE`](crate::TARGET_INSTANCE)
    pub make_instance: bool,
}

impl ResolveOptions {
    /// Options with every flag off.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether the target is constructed before resolution.
    pub fn make_instance(mut self, make_instance: bool) -> Self {
        self.make_instance = make_instance;
        self
    }

    /// Parses options from JSON such as `{"makeInstance": true}`.
    ///
    /// Missing fields take their defaults.
    #[cfg(feature = "config")]
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}
