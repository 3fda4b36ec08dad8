//! Process-level widget registry for remote-address dispatch.
//!
//! Created once at application startup and passed explicitly to the
//! transport router; inbound messages whose address matches no explicit
//! handler are resolved here to a live widget. Widgets register at
//! placement and unregister at teardown.

use std::collections::HashMap;

use crate::widget::WidgetId;

/// Maps publish keys to live widgets.
#[derive(Debug, Default)]
pub struct Registry {
    by_key: HashMap<String, WidgetId>,
}

impl Registry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `widget` under `key`, replacing any previous holder.
    pub fn register(&mut self, key: impl Into<String>, widget: WidgetId) {
        let key = key.into();
        tracing::info!(key = %key, widget = %widget, "registered widget");
        self.by_key.insert(key, widget);
    }

    /// Remove the registration for `key`. Returns the widget that held
    /// it, if any.
    pub fn unregister(&mut self, key: &str) -> Option<WidgetId> {
        let removed = self.by_key.remove(key);
        if let Some(widget) = removed {
            tracing::info!(key = %key, widget = %widget, "unregistered widget");
        }
        removed
    }

    /// Look up the widget registered under `key`.
    #[must_use]
    pub fn lookup(&self, key: &str) -> Option<WidgetId> {
        self.by_key.get(key).copied()
    }

    /// Number of registered keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    /// Whether no widgets are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_lookup_unregister() {
        let mut registry = Registry::new();
        let id = WidgetId::new();
        registry.register("/fader", id);
        assert_eq!(registry.lookup("/fader"), Some(id));

        assert_eq!(registry.unregister("/fader"), Some(id));
        assert_eq!(registry.lookup("/fader"), None);
        assert_eq!(registry.unregister("/fader"), None);
    }

    #[test]
    fn re_register_replaces_holder() {
        let mut registry = Registry::new();
        let first = WidgetId::new();
        let second = WidgetId::new();
        registry.register("/fader", first);
        registry.register("/fader", second);
        assert_eq!(registry.lookup("/fader"), Some(second));
        assert_eq!(registry.len(), 1);
    }
}
