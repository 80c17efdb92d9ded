//! Composes a session's message list from layered request inputs.
//!
//! The composed system text is `strategy + "\n" + trim(context) + trim(pattern)` followed by
//! an optional language instruction. Non-raw sessions carry it as its own system message;
//! raw sessions fold it into the user message instead.

use std::sync::Arc;

use tprovider::{Message, Role};

use crate::types::non_empty;
use crate::{
    ChatError, ChatRequest, ContextStore, PatternStore, Session, SessionStore, StrategyLoader,
    TemplateEngine,
};

/// Content of the user message synthesized when the request carries none.
pub const PLACEHOLDER_INPUT: &str = " ";

#[derive(Clone)]
pub struct RequestAssembler {
    sessions: Arc<dyn SessionStore>,
    contexts: Arc<dyn ContextStore>,
    patterns: Arc<dyn PatternStore>,
    strategies: Arc<dyn StrategyLoader>,
    templates: Arc<dyn TemplateEngine>,
}

impl RequestAssembler {
    pub fn new(
        sessions: Arc<dyn SessionStore>,
        contexts: Arc<dyn ContextStore>,
        patterns: Arc<dyn PatternStore>,
        strategies: Arc<dyn StrategyLoader>,
        templates: Arc<dyn TemplateEngine>,
    ) -> Self {
        Self {
            sessions,
            contexts,
            patterns,
            strategies,
            templates,
        }
    }

    pub fn build_session(&self, request: ChatRequest, raw: bool) -> Result<Session, ChatError> {
        let ChatRequest {
            session_name,
            context_name,
            pattern_name,
            strategy_name,
            language,
            pattern_variables,
            message,
            input_has_vars,
            meta,
        } = request;

        let mut session = match session_name.filter(|name| !name.as_str().trim().is_empty()) {
            Some(name) => self.sessions.get(&name)?,
            None => Session::new(),
        };

        if let Some(meta) = meta.filter(|meta| !meta.is_empty()) {
            session.append(Message::new(Role::Meta, meta));
        }

        let context_text = match non_empty(context_name.as_deref()) {
            Some(name) => self.contexts.get(name)?.content,
            None => String::new(),
        };

        let mut message = message.unwrap_or_else(|| Message::new(Role::User, PLACEHOLDER_INPUT));

        if input_has_vars {
            message.content = self.templates.apply(&message.content, &pattern_variables)?;
        }

        let pattern_text = match non_empty(pattern_name.as_deref()) {
            Some(name) => {
                self.patterns
                    .resolve(name, &pattern_variables, &message.content)
                    .map_err(|err| err.context(format!("could not get pattern {name}")))?
                    .text
            }
            None => String::new(),
        };

        let mut system_text = format!("{}{}", context_text.trim(), pattern_text.trim());

        if let Some(name) = non_empty(strategy_name.as_deref()) {
            let strategy = self.strategies.load(name)?;
            if let Some(prompt) = strategy
                .map(|strategy| strategy.prompt)
                .filter(|prompt| !prompt.is_empty())
            {
                system_text = format!("{prompt}\n{system_text}");
            }
        }

        if let Some(language) = non_empty(language.as_deref()) {
            system_text.push_str(&format!(
                ". Please use the language '{language}' for the output."
            ));
        }

        if raw {
            if !system_text.is_empty() {
                message.content = system_text;
            }
        } else if !system_text.is_empty() {
            session.append(Message::new(Role::System, system_text));
        }

        session.append(message);

        if !session.has_content() {
            return Err(ChatError::no_session_pattern_or_message());
        }

        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use tcommon::SessionName;

    use super::*;
    use crate::{
        ChatErrorKind, InMemoryContextStore, InMemoryPatternStore, InMemorySessionStore,
        InMemoryStrategyLoader, MiniJinjaTemplateEngine, Strategy,
    };

    struct Fixture {
        sessions: Arc<InMemorySessionStore>,
        assembler: RequestAssembler,
    }

    fn fixture() -> Fixture {
        let engine = Arc::new(MiniJinjaTemplateEngine::new());
        let sessions = Arc::new(InMemorySessionStore::new());
        let contexts = Arc::new(
            InMemoryContextStore::new()
                .with_context("project", "  We build compilers.  ")
                .with_context("blank", "   "),
        );
        let patterns = Arc::new(
            InMemoryPatternStore::new(engine.clone())
                .with_pattern("summarize", "Summarize:")
                .with_pattern("silent", "")
                .with_pattern("echo", "Repeat after me: {{input}}")
                .with_pattern("greet", "Greet {{who}}."),
        );
        let strategies = Arc::new(
            InMemoryStrategyLoader::new()
                .with_strategy(Strategy::new("cot", "Think step by step."))
                .with_strategy(Strategy::new("empty", "")),
        );

        Fixture {
            sessions: sessions.clone(),
            assembler: RequestAssembler::new(sessions, contexts, patterns, strategies, engine),
        }
    }

    fn user(content: &str) -> Message {
        Message::new(Role::User, content)
    }

    fn system(content: &str) -> Message {
        Message::new(Role::System, content)
    }

    #[test]
    fn empty_request_fails_with_no_session_pattern_or_message() {
        let err = fixture()
            .assembler
            .build_session(ChatRequest::new(), false)
            .expect_err("empty request must fail");
        assert_eq!(err, ChatError::no_session_pattern_or_message());

        let err = fixture()
            .assembler
            .build_session(ChatRequest::new(), true)
            .expect_err("empty raw request must fail");
        assert_eq!(err.kind, ChatErrorKind::Validation);
    }

    #[test]
    fn meta_only_request_still_fails() {
        let err = fixture()
            .assembler
            .build_session(ChatRequest::new().with_meta("audit"), false)
            .expect_err("meta alone is not content");
        assert_eq!(err, ChatError::no_session_pattern_or_message());
    }

    #[test]
    fn pattern_with_message_yields_system_then_user() {
        let session = fixture()
            .assembler
            .build_session(ChatRequest::user("hello").with_pattern("summarize"), false)
            .expect("assemble");
        assert_eq!(session.messages, vec![system("Summarize:"), user("hello")]);
        assert!(!session.is_named());
    }

    #[test]
    fn empty_pattern_omits_system_entry() {
        let session = fixture()
            .assembler
            .build_session(ChatRequest::user("hello").with_pattern("silent"), false)
            .expect("assemble");
        assert_eq!(session.messages, vec![user("hello")]);
    }

    #[test]
    fn strategy_precedes_pattern_and_language_comes_last() {
        let session = fixture()
            .assembler
            .build_session(
                ChatRequest::user("hello")
                    .with_strategy("cot")
                    .with_pattern("summarize")
                    .with_language("French"),
                false,
            )
            .expect("assemble");
        assert_eq!(
            session.messages[0].content,
            "Think step by step.\nSummarize:. Please use the language 'French' for the output."
        );
    }

    #[test]
    fn empty_strategy_prompt_is_ignored() {
        let session = fixture()
            .assembler
            .build_session(
                ChatRequest::user("hello")
                    .with_strategy("empty")
                    .with_pattern("summarize"),
                false,
            )
            .expect("assemble");
        assert_eq!(session.messages[0], system("Summarize:"));
    }

    #[test]
    fn context_and_pattern_are_trimmed_and_joined_without_separator() {
        let session = fixture()
            .assembler
            .build_session(
                ChatRequest::user("hello")
                    .with_context("project")
                    .with_pattern("summarize"),
                false,
            )
            .expect("assemble");
        assert_eq!(session.messages[0], system("We build compilers.Summarize:"));
    }

    #[test]
    fn raw_mode_overwrites_message_with_system_text() {
        let session = fixture()
            .assembler
            .build_session(
                ChatRequest::user("hello")
                    .with_pattern("echo")
                    .with_language("German"),
                true,
            )
            .expect("assemble");
        assert_eq!(
            session.messages,
            vec![user(
                "Repeat after me: hello. Please use the language 'German' for the output."
            )]
        );
    }

    #[test]
    fn raw_mode_without_system_text_keeps_message() {
        let session = fixture()
            .assembler
            .build_session(ChatRequest::user("hello").with_context("blank"), true)
            .expect("assemble");
        assert_eq!(session.messages, vec![user("hello")]);
    }

    #[test]
    fn input_variables_are_substituted_before_pattern_resolution() {
        let session = fixture()
            .assembler
            .build_session(
                ChatRequest::user("hi {{name}}")
                    .with_variable("name", "Ada")
                    .with_input_vars()
                    .with_pattern("echo"),
                false,
            )
            .expect("assemble");
        assert_eq!(session.messages[0], system("Repeat after me: hi Ada"));
        assert_eq!(session.messages[1], user("hi Ada"));
    }

    #[test]
    fn unresolved_input_variable_is_a_template_error() {
        let err = fixture()
            .assembler
            .build_session(
                ChatRequest::user("hi {{name}}").with_input_vars(),
                false,
            )
            .expect_err("missing variable must fail");
        assert_eq!(err.kind, ChatErrorKind::Template);
    }

    #[test]
    fn pattern_variable_errors_keep_their_kind() {
        let err = fixture()
            .assembler
            .build_session(ChatRequest::user("hello").with_pattern("greet"), false)
            .expect_err("unbound pattern variable must fail");
        assert_eq!(err.kind, ChatErrorKind::Template);
        assert!(err.message.starts_with("could not get pattern greet"));
    }

    #[test]
    fn pattern_alone_uses_placeholder_input() {
        let session = fixture()
            .assembler
            .build_session(ChatRequest::new().with_pattern("summarize"), false)
            .expect("assemble");
        assert_eq!(
            session.messages,
            vec![system("Summarize:"), user(PLACEHOLDER_INPUT)]
        );
    }

    #[test]
    fn missing_assets_surface_not_found() {
        let f = fixture();
        let cases = [
            ChatRequest::user("x").with_session("ghost"),
            ChatRequest::user("x").with_context("ghost"),
            ChatRequest::user("x").with_pattern("ghost"),
            ChatRequest::user("x").with_strategy("ghost"),
        ];
        for request in cases {
            let err = f
                .assembler
                .build_session(request, false)
                .expect_err("missing asset must fail");
            assert_eq!(err.kind, ChatErrorKind::NotFound);
        }
    }

    #[test]
    fn named_session_grows_by_one_or_two() {
        let f = fixture();
        let prior = Session::named("chat").with_messages(vec![
            user("first"),
            Message::new(Role::Assistant, "reply"),
        ]);
        f.sessions.save(&prior).expect("seed");

        let plain = f
            .assembler
            .build_session(ChatRequest::user("second").with_session("chat"), false)
            .expect("assemble");
        assert_eq!(plain.len(), prior.len() + 1);
        assert_eq!(plain.name, Some(SessionName::new("chat")));

        let with_system = f
            .assembler
            .build_session(
                ChatRequest::user("second")
                    .with_session("chat")
                    .with_pattern("summarize"),
                false,
            )
            .expect("assemble");
        assert_eq!(with_system.len(), prior.len() + 2);
        assert_eq!(with_system.messages[..2], prior.messages[..]);
    }

    #[test]
    fn meta_is_appended_after_loaded_history() {
        let session = fixture()
            .assembler
            .build_session(ChatRequest::user("hello").with_meta("run 42"), false)
            .expect("assemble");
        assert_eq!(
            session.messages,
            vec![Message::new(Role::Meta, "run 42"), user("hello")]
        );
        assert_eq!(session.vendor_messages(), vec![user("hello")]);
    }
}
