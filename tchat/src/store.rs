//! Asset store contracts and in-memory implementations.
//!
//! Stores are synchronous and internally synchronized. Every lookup round-trips; nothing is
//! cached on the caller side.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use tcommon::{SessionName, VariableMap};
use tprovider::Message;

use crate::{ChatError, Context, Pattern, Session, Strategy, TemplateEngine};

pub trait SessionStore: Send + Sync {
    fn get(&self, name: &SessionName) -> Result<Session, ChatError>;

    /// Overwrites whatever was stored under the session's name.
    fn save(&self, session: &Session) -> Result<(), ChatError>;
}

pub trait ContextStore: Send + Sync {
    fn get(&self, name: &str) -> Result<Context, ChatError>;
}

pub trait PatternStore: Send + Sync {
    /// Resolves a pattern against `variables` plus the user's `input`.
    fn resolve(
        &self,
        name: &str,
        variables: &VariableMap,
        input: &str,
    ) -> Result<Pattern, ChatError>;
}

pub trait StrategyLoader: Send + Sync {
    /// `Ok(None)` for an empty name; `NotFound` when a named strategy is missing.
    fn load(&self, name: &str) -> Result<Option<Strategy>, ChatError>;
}

fn lock<'a, T>(mutex: &'a Mutex<T>, store: &str) -> Result<MutexGuard<'a, T>, ChatError> {
    mutex
        .lock()
        .map_err(|_| ChatError::store(format!("{store} lock poisoned")))
}

#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    sessions: Mutex<HashMap<SessionName, Vec<Message>>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(self, session: Session) -> Result<Self, ChatError> {
        self.save(&session)?;
        Ok(self)
    }
}

impl SessionStore for InMemorySessionStore {
    fn get(&self, name: &SessionName) -> Result<Session, ChatError> {
        let sessions = lock(&self.sessions, "session store")?;
        let messages = sessions
            .get(name)
            .cloned()
            .ok_or_else(|| ChatError::not_found(format!("could not find session {name}")))?;

        Ok(Session {
            name: Some(name.clone()),
            messages,
        })
    }

    fn save(&self, session: &Session) -> Result<(), ChatError> {
        let name = session
            .name
            .clone()
            .ok_or_else(|| ChatError::validation("cannot save an unnamed session"))?;

        lock(&self.sessions, "session store")?.insert(name, session.messages.clone());
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct InMemoryContextStore {
    contexts: Mutex<HashMap<String, String>>,
}

impl InMemoryContextStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_context(self, name: impl Into<String>, content: impl Into<String>) -> Self {
        self.insert(name, content);
        self
    }

    pub fn insert(&self, name: impl Into<String>, content: impl Into<String>) {
        if let Ok(mut contexts) = self.contexts.lock() {
            contexts.insert(name.into(), content.into());
        }
    }
}

impl ContextStore for InMemoryContextStore {
    fn get(&self, name: &str) -> Result<Context, ChatError> {
        let contexts = lock(&self.contexts, "context store")?;
        contexts
            .get(name)
            .map(|content| Context::new(name, content.clone()))
            .ok_or_else(|| ChatError::not_found(format!("could not find context {name}")))
    }
}

/// Pattern templates rendered with the caller's variables and `input` bound to the user text.
pub struct InMemoryPatternStore {
    templates: Mutex<HashMap<String, String>>,
    engine: Arc<dyn TemplateEngine>,
}

impl InMemoryPatternStore {
    pub const INPUT_VARIABLE: &'static str = "input";

    pub fn new(engine: Arc<dyn TemplateEngine>) -> Self {
        Self {
            templates: Mutex::new(HashMap::new()),
            engine,
        }
    }

    pub fn with_pattern(self, name: impl Into<String>, template: impl Into<String>) -> Self {
        self.insert(name, template);
        self
    }

    pub fn insert(&self, name: impl Into<String>, template: impl Into<String>) {
        if let Ok(mut templates) = self.templates.lock() {
            templates.insert(name.into(), template.into());
        }
    }
}

impl PatternStore for InMemoryPatternStore {
    fn resolve(
        &self,
        name: &str,
        variables: &VariableMap,
        input: &str,
    ) -> Result<Pattern, ChatError> {
        let template = lock(&self.templates, "pattern store")?
            .get(name)
            .cloned()
            .ok_or_else(|| ChatError::not_found(format!("could not find pattern {name}")))?;

        let mut bindings = variables.clone();
        bindings.insert(Self::INPUT_VARIABLE.to_string(), input.to_string());

        Ok(Pattern {
            name: name.to_string(),
            text: self.engine.apply(&template, &bindings)?,
        })
    }
}

#[derive(Debug, Default)]
pub struct InMemoryStrategyLoader {
    strategies: Mutex<HashMap<String, Strategy>>,
}

impl InMemoryStrategyLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_strategy(self, strategy: Strategy) -> Self {
        if let Ok(mut strategies) = self.strategies.lock() {
            strategies.insert(strategy.name.clone(), strategy);
        }
        self
    }
}

impl StrategyLoader for InMemoryStrategyLoader {
    fn load(&self, name: &str) -> Result<Option<Strategy>, ChatError> {
        if name.trim().is_empty() {
            return Ok(None);
        }

        lock(&self.strategies, "strategy loader")?
            .get(name)
            .cloned()
            .map(Some)
            .ok_or_else(|| ChatError::not_found(format!("could not load strategy {name}")))
    }
}

#[cfg(test)]
mod tests {
    use tprovider::Role;

    use super::*;
    use crate::{ChatErrorKind, MiniJinjaTemplateEngine};

    #[test]
    fn session_round_trip_preserves_order() {
        let store = InMemorySessionStore::new();
        let session = Session::named("s1").with_messages(vec![
            Message::new(Role::Meta, "audit"),
            Message::new(Role::System, "sys"),
            Message::new(Role::User, "hi"),
            Message::new(Role::Assistant, "hello"),
        ]);

        store.save(&session).expect("save");
        let loaded = store.get(&SessionName::new("s1")).expect("get");
        assert_eq!(loaded, session);
    }

    #[test]
    fn save_overwrites_by_name() {
        let store = InMemorySessionStore::new();
        store
            .save(&Session::named("s1").with_messages(vec![Message::new(Role::User, "a")]))
            .expect("first save");
        store
            .save(&Session::named("s1").with_messages(vec![Message::new(Role::User, "b")]))
            .expect("second save");

        let loaded = store.get(&SessionName::new("s1")).expect("get");
        assert_eq!(loaded.messages, vec![Message::new(Role::User, "b")]);
    }

    #[test]
    fn missing_assets_are_not_found() {
        let sessions = InMemorySessionStore::new();
        let contexts = InMemoryContextStore::new();
        let patterns = InMemoryPatternStore::new(Arc::new(MiniJinjaTemplateEngine::new()));
        let strategies = InMemoryStrategyLoader::new();

        let errors = [
            sessions.get(&SessionName::new("nope")).expect_err("session"),
            contexts.get("nope").expect_err("context"),
            patterns
                .resolve("nope", &VariableMap::new(), "")
                .expect_err("pattern"),
            strategies.load("nope").expect_err("strategy"),
        ];
        for err in errors {
            assert_eq!(err.kind, ChatErrorKind::NotFound);
        }
    }

    #[test]
    fn unnamed_session_cannot_be_saved() {
        let store = InMemorySessionStore::new();
        let err = store.save(&Session::new()).expect_err("unnamed save");
        assert_eq!(err.kind, ChatErrorKind::Validation);
    }

    #[test]
    fn pattern_resolution_binds_input_and_variables() {
        let patterns = InMemoryPatternStore::new(Arc::new(MiniJinjaTemplateEngine::new()))
            .with_pattern("translate", "Translate to {{lang}}: {{input}}");
        let mut variables = VariableMap::new();
        variables.insert("lang".to_string(), "German".to_string());

        let pattern = patterns
            .resolve("translate", &variables, "good morning")
            .expect("resolve");
        assert_eq!(pattern.text, "Translate to German: good morning");
    }

    #[test]
    fn empty_strategy_name_loads_nothing() {
        let strategies = InMemoryStrategyLoader::new();
        assert_eq!(strategies.load("").expect("empty name"), None);
    }
}
