//! Ordered precedence list for resolving a configuration value.
//!
//! Layers are consulted in the order they were added; the first layer with a
//! non-empty value wins. Empty strings count as unset, the same as `None`.

use std::fmt;

/// Where a resolved value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverrideSource {
    Widget,
    Profile,
    Demo,
    Environment,
}

impl fmt::Display for OverrideSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            OverrideSource::Widget => "widget",
            OverrideSource::Profile => "profile",
            OverrideSource::Demo => "demo settings",
            OverrideSource::Environment => "environment",
        };
        f.write_str(label)
    }
}

/// A value together with the layer that supplied it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub value: String,
    pub source: OverrideSource,
}

#[derive(Debug, Default)]
pub struct OverrideChain {
    layers: Vec<(OverrideSource, Option<String>)>,
}

impl OverrideChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a lower-priority layer.
    pub fn layer(mut self, source: OverrideSource, value: Option<String>) -> Self {
        self.layers.push((source, value));
        self
    }

    /// First non-empty value, or `None` when every layer is unset.
    pub fn resolve(self) -> Option<Resolved> {
        self.layers
            .into_iter()
            .find_map(|(source, value)| match value {
                Some(value) if !value.is_empty() => Some(Resolved { value, source }),
                _ => None,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_set_layer_wins() {
        let resolved = OverrideChain::new()
            .layer(OverrideSource::Widget, Some("w".to_string()))
            .layer(OverrideSource::Profile, Some("p".to_string()))
            .layer(OverrideSource::Environment, Some("e".to_string()))
            .resolve()
            .unwrap();

        assert_eq!(resolved.value, "w");
        assert_eq!(resolved.source, OverrideSource::Widget);
    }

    #[test]
    fn skips_unset_and_empty_layers() {
        let resolved = OverrideChain::new()
            .layer(OverrideSource::Widget, None)
            .layer(OverrideSource::Profile, Some(String::new()))
            .layer(OverrideSource::Environment, Some("e".to_string()))
            .resolve()
            .unwrap();

        assert_eq!(resolved.value, "e");
        assert_eq!(resolved.source, OverrideSource::Environment);
    }

    #[test]
    fn all_unset_resolves_to_none() {
        let resolved = OverrideChain::new()
            .layer(OverrideSource::Demo, Some(String::new()))
            .layer(OverrideSource::Environment, None)
            .resolve();

        assert!(resolved.is_none());
        assert!(OverrideChain::new().resolve().is_none());
    }
}
