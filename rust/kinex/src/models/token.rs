use serde::{
    Deserialize,
    Deserializer,
    Serialize,
    Serializer,
};
use std::fmt::Display;
use std::str::FromStr;

/// A position/residue pair indexing one PSSM column, e.g. `-3G` or `2s`.
///
/// Position 0 is reserved for the acceptor favorability columns (`0S`, `0T`).
///
/// ```
/// use kinex::models::Token;
///
/// let token: Token = "-3G".parse().unwrap();
/// assert_eq!(token.position(), -3);
/// assert_eq!(token.residue(), 'G');
/// assert_eq!(token.to_string(), "-3G");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Token {
    position: i8,
    residue: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenParsingError {
    pub value: String,
}

impl Display for TokenParsingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Unable to parse '{}' as a position token", self.value)
    }
}

impl Token {
    pub fn new(position: i8, residue: char) -> Self {
        debug_assert!(residue.is_ascii(), "Residues are ascii letters");
        Self {
            position,
            residue: residue as u8,
        }
    }

    pub fn position(&self) -> i8 {
        self.position
    }

    pub fn residue(&self) -> char {
        self.residue as char
    }

    pub fn is_favorability(&self) -> bool {
        self.position == 0
    }
}

impl Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.position, self.residue as char)
    }
}

impl FromStr for Token {
    type Err = TokenParsingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || TokenParsingError {
            value: s.to_string(),
        };
        let s = s.trim();
        let residue = s.chars().last().ok_or_else(err)?;
        if !residue.is_ascii_alphabetic() {
            return Err(err());
        }
        let position: i8 = s[..s.len() - 1].parse().map_err(|_| err())?;
        Ok(Token::new(position, residue))
    }
}

impl Serialize for Token {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Token {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
