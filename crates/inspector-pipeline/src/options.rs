//! Inspector configuration.

use crate::render::ListStyle;

/// Default bound on nested pipeline recursion.
pub const DEFAULT_MAX_DEPTH: usize = 8;

/// Default bound on archetype expansion depth.
pub const DEFAULT_MAX_ARCHETYPE_DEPTH: usize = 4;

/// Options for an [`InspectorHost`](crate::InspectorHost).
#[derive(Debug, Clone, PartialEq)]
pub struct InspectorOptions {
    /// Maximum nesting depth for inline sub-editors.
    ///
    /// Fields nested deeper render a placeholder instead of recursing.
    pub max_depth: usize,

    /// Maximum depth of archetypes expanding into other archetypes.
    pub max_archetype_depth: usize,

    /// Text shown in place of a value when targets disagree.
    pub mixed_value_label: String,

    /// List style used for sequence fields without a list attribute.
    pub default_list_style: ListStyle,

    /// Report each (field, attribute, code) diagnostic only once.
    pub report_once: bool,

    /// Convert drawer panics into placeholders instead of unwinding.
    pub catch_panics: bool,
}

impl Default for InspectorOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_archetype_depth: DEFAULT_MAX_ARCHETYPE_DEPTH,
            mixed_value_label: "\u{2014}".to_string(),
            default_list_style: ListStyle::default(),
            report_once: true,
            catch_panics: true,
        }
    }
}

impl InspectorOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn max_archetype_depth(mut self, depth: usize) -> Self {
        self.max_archetype_depth = depth;
        self
    }

    pub fn mixed_value_label(mut self, label: impl Into<String>) -> Self {
        self.mixed_value_label = label.into();
        self
    }

    pub fn default_list_style(mut self, style: ListStyle) -> Self {
        self.default_list_style = style;
        self
    }

    pub fn report_once(mut self, report_once: bool) -> Self {
        self.report_once = report_once;
        self
    }

    pub fn catch_panics(mut self, catch_panics: bool) -> Self {
        self.catch_panics = catch_panics;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = InspectorOptions::default();
        assert_eq!(options.max_depth, 8);
        assert_eq!(options.mixed_value_label, "\u{2014}");
        assert!(options.report_once);
        assert!(options.catch_panics);
    }

    #[test]
    fn test_builder() {
        let options = InspectorOptions::new()
            .max_depth(2)
            .mixed_value_label("~")
            .catch_panics(false);
        assert_eq!(options.max_depth, 2);
        assert_eq!(options.mixed_value_label, "~");
        assert!(!options.catch_panics);
    }
}
