//! Binding tokens and symbolic keys.

use std::any::TypeId;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

// Ids below this bound are reserved for the built-in symbols.
const FIRST_USER_SYMBOL: u64 = 1024;

static NEXT_SYMBOL: AtomicU64 = AtomicU64::new(FIRST_USER_SYMBOL);

/// Process-unique symbolic key.
///
/// Two symbols are equal only if they come from the same [`Symbol::new`]
/// call; the description is for diagnostics and never takes part in
/// comparisons. Decorator authors use symbols both as metadata keys and as
/// binding tokens, so unrelated decorator families never collide.
///
/// # Examples
///
/// ```rust
/// use ferrous_decor::Symbol;
///
/// let a = Symbol::new("routes");
/// let b = Symbol::new("routes");
/// assert_ne!(a, b);
/// assert_eq!(a, a.clone());
/// assert_eq!(a.description(), "routes");
/// ```
#[derive(Clone, Copy)]
pub struct Symbol {
    id: u64,
    description: &'static str,
}

impl Symbol {
    /// Creates a fresh symbol.
    pub fn new(description: &'static str) -> Self {
        Self {
            id: NEXT_SYMBOL.fetch_add(1, Ordering::Relaxed),
            description,
        }
    }

    pub(crate) const fn reserved(id: u64, description: &'static str) -> Self {
        Self { id, description }
    }

    /// Human-readable description given at creation.
    pub fn description(&self) -> &'static str {
        self.description
    }
}

impl PartialEq for Symbol {
    #[inline(always)]
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Symbol {}

impl std::hash::Hash for Symbol {
    #[inline(always)]
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({})", self.description)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({})", self.description)
    }
}

/// Key for binding and resolving a value in a [`Container`](crate::Container).
///
/// # Token Types
///
/// - **Type**: a constructible type bound to itself
/// - **Named**: a string token
/// - **Symbol**: a symbolic token, including the built-in resolution tokens
///
/// # Examples
///
/// ```rust
/// use ferrous_decor::{Token, Symbol};
///
/// struct Database;
///
/// let by_type = Token::of::<Database>();
/// let by_name = Token::from("database_url");
/// let by_symbol = Token::from(Symbol::new("pool"));
///
/// assert_eq!(by_type, Token::of::<Database>());
/// assert_eq!(by_name, Token::from(String::from("database_url")));
/// assert_ne!(by_symbol, by_name);
/// ```
#[derive(Clone)]
pub enum Token {
    /// Concrete type token with TypeId and name for diagnostics
    Type(TypeId, &'static str),
    /// String token
    Named(Arc<str>),
    /// Symbolic token
    Symbol(Symbol),
}

impl Token {
    /// Token for a concrete type.
    #[inline(always)]
    pub fn of<T: 'static>() -> Self {
        Token::Type(TypeId::of::<T>(), std::any::type_name::<T>())
    }
}

// Equality ignores the diagnostic type name.
impl PartialEq for Token {
    #[inline(always)]
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Token::Type(a, _), Token::Type(b, _)) => a == b,
            (Token::Named(a), Token::Named(b)) => a == b,
            (Token::Symbol(a), Token::Symbol(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Token {}

impl std::hash::Hash for Token {
    #[inline(always)]
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        match self {
            Token::Type(id, _) => {
                0u8.hash(state);
                id.hash(state);
            }
            Token::Named(name) => {
                1u8.hash(state);
                name.hash(state);
            }
            Token::Symbol(symbol) => {
                2u8.hash(state);
                symbol.hash(state);
            }
        }
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Type(_, name) => f.write_str(name),
            Token::Named(name) => write!(f, "{:?}", name),
            Token::Symbol(symbol) => write!(f, "{}", symbol),
        }
    }
}

impl From<&str> for Token {
    fn from(name: &str) -> Self {
        Token::Named(Arc::from(name))
    }
}

impl From<String> for Token {
    fn from(name: String) -> Self {
        Token::Named(Arc::from(name))
    }
}

impl From<Symbol> for Token {
    fn from(symbol: Symbol) -> Self {
        Token::Symbol(symbol)
    }
}

impl From<&Token> for Token {
    fn from(token: &Token) -> Self {
        token.clone()
    }
}

/// Accumulated values produced so far in the current factory list (`Data`).
pub const PREVIOUS_DATA: Token = Token::Symbol(Symbol::reserved(1, "previous_data"));
/// Value produced by the preceding factory, or [`Absent`](crate::Absent) for the first.
pub const RESULT: Token = Token::Symbol(Symbol::reserved(2, "result"));
/// Per-member value lists produced by sub metadata (`SubData`).
pub const SUB_DATA: Token = Token::Symbol(Symbol::reserved(3, "sub_data"));
/// Last value per member produced by sub metadata (`SubResult`).
pub const SUB_RESULT: Token = Token::Symbol(Symbol::reserved(4, "sub_result"));
/// The [`Target`](crate::Target) under resolution.
pub const TARGET: Token = Token::Symbol(Symbol::reserved(5, "target"));
/// Freshly constructed instance of the target, when requested.
pub const TARGET_INSTANCE: Token = Token::Symbol(Symbol::reserved(6, "target_instance"));
/// The resolving [`Container`](crate::Container) itself.
pub const CONTAINER: Token = Token::Symbol(Symbol::reserved(7, "container"));

pub(crate) const INJECTABLE: Symbol = Symbol::reserved(8, "injectable");

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn builtin_tokens_are_distinct() {
        let all = [PREVIOUS_DATA, RESULT, SUB_DATA, SUB_RESULT, TARGET, TARGET_INSTANCE, CONTAINER];
        let set: HashSet<Token> = all.iter().cloned().collect();
        assert_eq!(set.len(), all.len());
    }

    #[test]
    fn user_symbols_never_collide_with_reserved() {
        let symbol = Symbol::new("result");
        assert_ne!(Token::from(symbol), RESULT);
        assert_ne!(symbol, INJECTABLE);
    }

    #[test]
    fn token_display() {
        assert_eq!(Token::of::<u32>().to_string(), "u32");
        assert_eq!(Token::from("name").to_string(), "\"name\"");
        assert_eq!(RESULT.to_string(), "Symbol(result)");
    }
}
