//! Generator configuration
//!
//! Controls the layout of emitted Java source and the optional annotations the host environment supports.

/// Generator configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorConfig {
    /// Indent with tabs instead of spaces
    pub use_tabs: bool,
    /// Number of spaces per indentation level when not using tabs
    pub indent_width: usize,
    /// Annotate non-null parameters and the session field with `@Nonnull`
    pub add_nonnull_annotation: bool,
    /// Annotate the repository constructor with `@Inject`
    pub add_inject_annotation: bool,
    /// Annotate generated classes with `@Generated`
    pub add_generated_annotation: bool,
    /// Rounds to run before giving up on deferred methods
    pub max_rounds: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            use_tabs: false,
            indent_width: 4,
            add_nonnull_annotation: true,
            add_inject_annotation: false,
            add_generated_annotation: true,
            max_rounds: 5,
        }
    }
}

impl GeneratorConfig {
    /// Create a new config with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// One level of indentation.
    pub fn indent_unit(&self) -> String {
        if self.use_tabs {
            "\t".to_string()
        } else {
            " ".repeat(self.indent_width)
        }
    }

    /// Set the indentation width (and switch to spaces)
    pub fn with_indent_width(mut self, width: usize) -> Self {
        self.use_tabs = false;
        self.indent_width = width;
        self
    }

    /// Indent with tabs
    pub fn with_tabs(mut self) -> Self {
        self.use_tabs = true;
        self
    }

    pub fn with_nonnull_annotation(mut self, enabled: bool) -> Self {
        self.add_nonnull_annotation = enabled;
        self
    }

    pub fn with_inject_annotation(mut self, enabled: bool) -> Self {
        self.add_inject_annotation = enabled;
        self
    }

    pub fn with_generated_annotation(mut self, enabled: bool) -> Self {
        self.add_generated_annotation = enabled;
        self
    }

    /// Set the round limit (at least one round always runs)
    pub fn with_max_rounds(mut self, rounds: usize) -> Self {
        self.max_rounds = rounds.max(1);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GeneratorConfig::default();
        assert_eq!(config.indent_unit(), "    ");
        assert!(config.add_nonnull_annotation);
        assert!(!config.add_inject_annotation);
        assert!(config.add_generated_annotation);
        assert_eq!(config.max_rounds, 5);
    }

    #[test]
    fn test_indent_unit() {
        assert_eq!(GeneratorConfig::new().with_tabs().indent_unit(), "\t");
        assert_eq!(GeneratorConfig::new().with_tabs().with_indent_width(2).indent_unit(), "  ");
    }

    #[test]
    fn test_builder_override() {
        let config = GeneratorConfig::new()
            .with_nonnull_annotation(false)
            .with_inject_annotation(true)
            .with_max_rounds(0);
        assert!(!config.add_nonnull_annotation);
        assert!(config.add_inject_annotation);
        assert_eq!(config.max_rounds, 1); // clamped
    }
}
