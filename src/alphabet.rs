//! Alphabet: bidirectional mapping between symbols and dense indices.

use std::collections::HashMap;
use std::fmt;

use crate::error::EnigmaError;

/// Symbols of the default alphabet.
pub const UPPER: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// An ordered set of distinct symbols. The symbol at position `k` has index `k`.
///
/// Alphabets are immutable once built and are shared through an
/// [`Arc`](std::sync::Arc) by every permutation, rotor and machine that uses them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alphabet {
    chars: Vec<char>,
    index: HashMap<char, usize>,
}

impl Default for Alphabet {
    fn default() -> Self {
        let chars: Vec<char> = UPPER.chars().collect();
        let index = chars.iter().enumerate().map(|(i, &c)| (c, i)).collect();
        Alphabet { chars, index }
    }
}

impl Alphabet {
    /// Creates an alphabet from the symbols of `symbols`, in order.
    ///
    /// # Errors
    /// Returns [`EnigmaError::Configuration`] if `symbols` is empty or a
    /// symbol appears twice.
    ///
    /// # Examples
    ///
    /// ```
    /// use enigma::Alphabet;
    ///
    /// let abcd = Alphabet::new("ABCD").unwrap();
    /// assert_eq!(abcd.size(), 4);
    /// assert!(Alphabet::new("ABCA").is_err());
    /// ```
    pub fn new(symbols: &str) -> Result<Self, EnigmaError> {
        let chars: Vec<char> = symbols.chars().collect();
        if chars.is_empty() {
            return Err(EnigmaError::config("alphabet must not be empty"));
        }
        let mut index = HashMap::with_capacity(chars.len());
        for (i, &c) in chars.iter().enumerate() {
            if index.insert(c, i).is_some() {
                return Err(EnigmaError::config(format!(
                    "duplicate symbol '{}' in alphabet",
                    c
                )));
            }
        }
        Ok(Alphabet { chars, index })
    }

    /// Returns the number of symbols.
    pub fn size(&self) -> usize {
        self.chars.len()
    }

    /// Returns true if `symbol` belongs to the alphabet.
    pub fn contains(&self, symbol: char) -> bool {
        self.index.contains_key(&symbol)
    }

    /// Returns the symbol at `index`.
    ///
    /// # Panics
    /// Panics if `index >= size()`. Indices produced by a
    /// [`Permutation`](crate::Permutation) over this alphabet are always in range.
    pub fn to_char(&self, index: usize) -> char {
        self.chars[index]
    }

    /// Returns the index of `symbol`.
    ///
    /// # Errors
    /// Returns [`EnigmaError::UnknownSymbol`] if the symbol is absent.
    pub fn to_int(&self, symbol: char) -> Result<usize, EnigmaError> {
        self.index
            .get(&symbol)
            .copied()
            .ok_or(EnigmaError::UnknownSymbol(symbol))
    }

    /// Iterates over the symbols in index order.
    pub fn symbols(&self) -> impl Iterator<Item = char> + '_ {
        self.chars.iter().copied()
    }
}

impl fmt::Display for Alphabet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in &self.chars {
            write!(f, "{}", c)?;
        }
        Ok(())
    }
}
