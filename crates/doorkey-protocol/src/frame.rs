//! Wire units.

use std::fmt;

use doorkey_core::Symbol;

use crate::{Token, error::LinkError};

/// Kind byte of a token frame.
pub const KIND_TOKEN: u8 = b'T';

/// Kind byte of a password symbol frame.
pub const KIND_SYMBOL: u8 = b'S';

/// One unit on the link: a command/status token or a password symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frame {
    Token(Token),
    Symbol(Symbol),
}

impl Frame {
    /// `(kind, value)` byte pair for the wire.
    pub fn to_parts(self) -> (u8, u8) {
        match self {
            Frame::Token(token) => (KIND_TOKEN, token.as_u8()),
            Frame::Symbol(symbol) => (KIND_SYMBOL, symbol.as_u8()),
        }
    }

    /// Rebuild a frame from its `(kind, value)` bytes.
    ///
    /// # Errors
    /// Returns `LinkError::InvalidFrame` for an unknown kind, token value or
    /// non-digit symbol.
    pub fn from_parts(kind: u8, value: u8) -> Result<Self, LinkError> {
        match kind {
            KIND_TOKEN => Ok(Frame::Token(Token::try_from(value)?)),
            KIND_SYMBOL => Symbol::new(value)
                .map(Frame::Symbol)
                .map_err(|e| LinkError::invalid_frame(e.to_string())),
            other => Err(LinkError::invalid_frame(format!(
                "unknown frame kind {other:#04x}"
            ))),
        }
    }

    pub fn as_token(&self) -> Option<Token> {
        match self {
            Frame::Token(token) => Some(*token),
            Frame::Symbol(_) => None,
        }
    }
}

impl From<Token> for Frame {
    fn from(token: Token) -> Self {
        Frame::Token(token)
    }
}

impl From<Symbol> for Frame {
    fn from(symbol: Symbol) -> Self {
        Frame::Symbol(symbol)
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Frame::Token(token) => write!(f, "token {}", token),
            // symbol values are credentials
            Frame::Symbol(_) => f.write_str("symbol"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_and_symbol_with_same_value_differ() {
        let token = Frame::Token(Token::Success);
        let symbol = Frame::Symbol(Symbol::new(1).unwrap());

        assert_eq!(token.to_parts().1, symbol.to_parts().1);
        assert_ne!(token.to_parts(), symbol.to_parts());
        assert_ne!(token, symbol);
    }

    #[test]
    fn test_from_parts() {
        assert_eq!(
            Frame::from_parts(KIND_TOKEN, 4).unwrap(),
            Frame::Token(Token::Match)
        );
        assert_eq!(
            Frame::from_parts(KIND_SYMBOL, 7).unwrap(),
            Frame::Symbol(Symbol::new(7).unwrap())
        );
    }

    #[test]
    fn test_from_parts_rejects_garbage() {
        assert!(Frame::from_parts(b'X', 0).is_err());
        assert!(Frame::from_parts(KIND_SYMBOL, 10).is_err());
        assert!(Frame::from_parts(KIND_TOKEN, 200).is_err());
    }

    #[test]
    fn test_display_hides_symbol_value() {
        let frame = Frame::Symbol(Symbol::new(8).unwrap());
        assert_eq!(frame.to_string(), "symbol");
        assert_eq!(Frame::Token(Token::Ready).to_string(), "token READY");
    }
}
