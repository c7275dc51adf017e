// Standard Library Imports
use std::fmt::{self, Display, Formatter};

// Public API ==========================================================================================================

/// A filter expression, kept exactly as the user typed it (minus surrounding whitespace). Expressions are evaluated
/// by the server, so the only thing this type knows about their grammar is how to quote a string literal.
#[derive(Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct Filter(String);

impl Filter {
    const MATCH_ALL: &str = "true";

    #[must_use]
    pub fn parse(expression: &str) -> Self {
        Self(expression.trim().to_owned())
    }

    #[must_use]
    pub fn id_equals(id: &str) -> Self {
        Self(format!("_id = {}", quote(id)))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The expression to send to the server. An empty filter matches everything
    #[must_use]
    pub fn as_expression(&self) -> &str {
        if self.is_empty() {
            Self::MATCH_ALL
        } else {
            &self.0
        }
    }
}

impl Display for Filter {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// Private Helper Code =================================================================================================

fn quote(literal: &str) -> String {
    let escaped = literal.replace('\\', r"\\").replace('"', r#"\""#);
    format!("\"{escaped}\"")
}

// Unit Tests ==========================================================================================================
