//! Variable substitution over free text.
//!
//! ```rust
//! use tchat::{MiniJinjaTemplateEngine, TemplateEngine};
//! use tcommon::VariableMap;
//!
//! let engine = MiniJinjaTemplateEngine::new();
//! let mut variables = VariableMap::new();
//! variables.insert("lang".to_string(), "French".to_string());
//!
//! let text = engine.apply("Answer in {{lang}}.", &variables).unwrap();
//! assert_eq!(text, "Answer in French.");
//! assert!(engine.apply("Answer in {{missing}}.", &variables).is_err());
//! ```

use minijinja::{Environment, UndefinedBehavior};
use tcommon::VariableMap;

use crate::ChatError;

pub trait TemplateEngine: Send + Sync {
    /// Fails on unresolved or malformed variable references.
    fn apply(&self, text: &str, variables: &VariableMap) -> Result<String, ChatError>;
}

#[derive(Debug)]
pub struct MiniJinjaTemplateEngine {
    env: Environment<'static>,
}

impl MiniJinjaTemplateEngine {
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        env.set_keep_trailing_newline(true);
        Self { env }
    }
}

impl Default for MiniJinjaTemplateEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateEngine for MiniJinjaTemplateEngine {
    fn apply(&self, text: &str, variables: &VariableMap) -> Result<String, ChatError> {
        self.env
            .render_str(text, variables)
            .map_err(|err| ChatError::template(err.to_string()))
    }
}
