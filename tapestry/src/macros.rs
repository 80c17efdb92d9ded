/// Creates a single chat [`Message`](crate::Message) from a role shorthand.
///
/// ```rust
/// use tapestry::{Role, tp_msg};
///
/// let message = tp_msg!(assistant => "Done.");
/// assert_eq!(message.role, Role::Assistant);
/// assert_eq!(message.content, "Done.");
/// ```
#[macro_export]
macro_rules! tp_msg {
    (system => $content:expr $(,)?) => {
        $crate::Message::new($crate::Role::System, $content)
    };
    (user => $content:expr $(,)?) => {
        $crate::Message::new($crate::Role::User, $content)
    };
    (assistant => $content:expr $(,)?) => {
        $crate::Message::new($crate::Role::Assistant, $content)
    };
    (meta => $content:expr $(,)?) => {
        $crate::Message::new($crate::Role::Meta, $content)
    };
    ($role:ident => $content:expr $(,)?) => {
        compile_error!("unsupported role: use system, user, assistant, or meta");
    };
}

/// Creates a `Vec<Message>` from role/content pairs.
///
/// ```rust
/// use tapestry::{Role, tp_messages};
///
/// let messages = tp_messages![
///     system => "You are concise.",
///     user => "Summarize this repository.",
/// ];
///
/// assert_eq!(messages.len(), 2);
/// assert_eq!(messages[0].role, Role::System);
/// assert_eq!(messages[1].role, Role::User);
/// ```
#[macro_export]
macro_rules! tp_messages {
    () => {
        Vec::<$crate::Message>::new()
    };
    ($($role:ident => $content:expr),+ $(,)?) => {
        vec![$($crate::tp_msg!($role => $content)),+]
    };
}

/// Builds a [`VariableMap`](crate::VariableMap) for pattern and input templating.
///
/// ```rust
/// use tapestry::tp_vars;
///
/// let variables = tp_vars! { "lang_code" => "fr", "topic" => "rust" };
/// assert_eq!(variables.get("lang_code").map(String::as_str), Some("fr"));
/// assert_eq!(variables.len(), 2);
/// ```
#[macro_export]
macro_rules! tp_vars {
    () => {
        $crate::VariableMap::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut variables = $crate::VariableMap::new();
        $(variables.insert(::std::string::String::from($key), ::std::string::String::from($value));)+
        variables
    }};
}
