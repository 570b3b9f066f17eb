//! Equation sequence - ordered token accumulation for one round
//!
//! The sequence is exclusively owned by the engine for the lifetime of a
//! round: created empty, mutated only through `push`, destroyed (cleared)
//! on every evaluation or explicit reset.

use crate::types::{Token, MIN_COMPLETE_LENGTH};

/// Tokens accumulated for the current round, in arrival order.
#[derive(Debug, Clone, Default)]
pub struct EquationSequence {
    tokens: Vec<Token>,
}

impl EquationSequence {
    pub fn new() -> Self {
        Self { tokens: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn push(&mut self, token: Token) {
        self.tokens.push(token);
    }

    pub fn clear(&mut self) {
        self.tokens.clear();
    }

    /// Completeness predicate.
    ///
    /// A sequence of length `n` is complete iff `n >= 3`, numbers sit at
    /// even indices, operators at odd indices, and it ends on a number
    /// (`n` odd). With `allow_multiple_operators == false` only the minimal
    /// 3-token form qualifies.
    pub fn is_complete(&self, allow_multiple_operators: bool) -> bool {
        let n = self.tokens.len();
        if n < MIN_COMPLETE_LENGTH {
            return false;
        }

        if n == MIN_COMPLETE_LENGTH {
            return self.tokens[0].is_number()
                && self.tokens[1].is_operator()
                && self.tokens[2].is_number();
        }

        if !allow_multiple_operators {
            return false;
        }

        // Must end on a number (operator-terminated sequences never
        // complete, so an even length can never pass).
        if !self.tokens[n - 1].is_number() {
            return false;
        }

        self.tokens.iter().enumerate().all(|(i, token)| {
            if i % 2 == 0 {
                token.is_number()
            } else {
                token.is_operator()
            }
        })
    }

    /// Render the running equation for display, e.g. `"2 + 3"`.
    pub fn render(&self) -> String {
        render_tokens(&self.tokens)
    }
}

/// Render a token slice as a space-separated equation string.
pub fn render_tokens(tokens: &[Token]) -> String {
    let mut out = String::new();
    for (i, token) in tokens.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        out.push_str(&token.render());
    }
    out
}

/// Re-tokenize a rendered equation string.
///
/// Inverse of [`render_tokens`]: every display update must parse back to the
/// exact token sequence that produced it. Returns `None` on any
/// unclassifiable fragment.
pub fn parse_equation(text: &str) -> Option<Vec<Token>> {
    text.split_whitespace().map(Token::from_symbol).collect()
}
