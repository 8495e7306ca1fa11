//! Permutation: a bijection over alphabet indices written in cycle notation.
//!
//! A permutation such as `(AELTPHQXRU) (BKNW)` maps each symbol to the one
//! that follows it in its cycle, wrapping from the last symbol back to the
//! first. Symbols that appear in no cycle map to themselves.
//!
//! Both directions are stored as dense tables indexed by alphabet index, so
//! `permute` and `invert` are single array lookups.

use std::fmt;
use std::sync::Arc;

use crate::alphabet::Alphabet;
use crate::error::EnigmaError;

/// A permutation of `[0, size)` for the indices of an [`Alphabet`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Permutation {
    alphabet: Arc<Alphabet>,
    forward: Vec<usize>,
    inverse: Vec<usize>,
}

impl Permutation {
    /// Builds the permutation described by `cycles` over `alphabet`.
    ///
    /// `cycles` is a sequence of parenthesised groups, optionally separated
    /// by whitespace: `"(AB)(CD)"`, `"(AB) (CD)"` and `""` are all valid.
    ///
    /// # Parameters
    /// - `cycles`: Cycle notation; symbols not mentioned map to themselves.
    /// - `alphabet`: Alphabet the permutation acts on.
    ///
    /// # Errors
    /// Returns [`EnigmaError::Configuration`] if a cycle names a symbol
    /// outside the alphabet, a symbol is used twice, a group is empty, or
    /// the parentheses are unbalanced.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::sync::Arc;
    /// use enigma::{Alphabet, Permutation};
    ///
    /// let abcd = Arc::new(Alphabet::new("ABCD").unwrap());
    /// let perm = Permutation::new("(AB)(CD)", abcd).unwrap();
    /// assert_eq!(perm.permute_symbol('A').unwrap(), 'B');
    /// assert_eq!(perm.invert_symbol('B').unwrap(), 'A');
    /// assert!(perm.derangement());
    /// ```
    pub fn new(cycles: &str, alphabet: Arc<Alphabet>) -> Result<Self, EnigmaError> {
        let size = alphabet.size();
        let mut forward: Vec<usize> = (0..size).collect();
        let mut used = vec![false; size];

        for cycle in parse_cycles(cycles)? {
            let mut indices = Vec::with_capacity(cycle.len());
            for c in cycle.chars() {
                let i = alphabet.to_int(c).map_err(|_| {
                    EnigmaError::config(format!(
                        "cycle ({}) uses '{}', which is not in the alphabet",
                        cycle, c
                    ))
                })?;
                if used[i] {
                    return Err(EnigmaError::config(format!(
                        "symbol '{}' appears more than once in \"{}\"",
                        c,
                        cycles.trim()
                    )));
                }
                used[i] = true;
                indices.push(i);
            }
            for (k, &from) in indices.iter().enumerate() {
                forward[from] = indices[(k + 1) % indices.len()];
            }
        }

        let mut inverse = vec![0; size];
        for (from, &to) in forward.iter().enumerate() {
            inverse[to] = from;
        }
        debug_assert!((0..size).all(|i| inverse[forward[i]] == i));

        Ok(Permutation {
            alphabet,
            forward,
            inverse,
        })
    }

    /// Returns the identity permutation over `alphabet`.
    pub fn identity(alphabet: Arc<Alphabet>) -> Self {
        let size = alphabet.size();
        Permutation {
            alphabet,
            forward: (0..size).collect(),
            inverse: (0..size).collect(),
        }
    }

    /// Returns the size of the permuted alphabet.
    pub fn size(&self) -> usize {
        self.forward.len()
    }

    /// Returns the alphabet this permutation ranges over.
    pub fn alphabet(&self) -> &Arc<Alphabet> {
        &self.alphabet
    }

    /// Reduces `p` modulo the alphabet size into `[0, size)`, also for negative `p`.
    pub fn wrap(&self, p: isize) -> usize {
        p.rem_euclid(self.size() as isize) as usize
    }

    /// Applies the permutation to `p` (taken modulo the alphabet size).
    pub fn permute(&self, p: usize) -> usize {
        self.forward[p % self.size()]
    }

    /// Applies the inverse permutation to `c` (taken modulo the alphabet size).
    pub fn invert(&self, c: usize) -> usize {
        self.inverse[c % self.size()]
    }

    /// Applies the permutation to a symbol.
    ///
    /// # Errors
    /// Returns [`EnigmaError::UnknownSymbol`] if `p` is not in the alphabet.
    pub fn permute_symbol(&self, p: char) -> Result<char, EnigmaError> {
        let i = self.alphabet.to_int(p)?;
        Ok(self.alphabet.to_char(self.permute(i)))
    }

    /// Applies the inverse permutation to a symbol.
    ///
    /// # Errors
    /// Returns [`EnigmaError::UnknownSymbol`] if `c` is not in the alphabet.
    pub fn invert_symbol(&self, c: char) -> Result<char, EnigmaError> {
        let i = self.alphabet.to_int(c)?;
        Ok(self.alphabet.to_char(self.invert(i)))
    }

    /// Returns true iff no index maps to itself.
    pub fn derangement(&self) -> bool {
        self.forward.iter().enumerate().all(|(i, &j)| i != j)
    }
}

impl fmt::Display for Permutation {
    /// Canonical cycle notation, each cycle starting at its smallest index.
    /// Fixed points are omitted, so the identity renders as an empty string.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut seen = vec![false; self.size()];
        let mut first = true;
        for start in 0..self.size() {
            if seen[start] || self.forward[start] == start {
                continue;
            }
            if !first {
                write!(f, " ")?;
            }
            first = false;
            write!(f, "(")?;
            let mut i = start;
            while !seen[i] {
                seen[i] = true;
                write!(f, "{}", self.alphabet.to_char(i))?;
                i = self.forward[i];
            }
            write!(f, ")")?;
        }
        Ok(())
    }
}

/// Splits cycle text into the symbol runs of its groups.
fn parse_cycles(text: &str) -> Result<Vec<String>, EnigmaError> {
    let mut cycles = Vec::new();
    let mut current: Option<String> = None;

    for c in text.chars() {
        match (c, current.as_mut()) {
            ('(', None) => current = Some(String::new()),
            ('(', Some(_)) => {
                return Err(EnigmaError::config(format!(
                    "nested '(' in cycles \"{}\"",
                    text.trim()
                )))
            }
            (')', Some(cycle)) => {
                if cycle.is_empty() {
                    return Err(EnigmaError::config("empty cycle \"()\""));
                }
                cycles.push(std::mem::take(cycle));
                current = None;
            }
            (')', None) => {
                return Err(EnigmaError::config(format!(
                    "unmatched ')' in cycles \"{}\"",
                    text.trim()
                )))
            }
            (c, _) if c.is_whitespace() => {
                if current.is_some() {
                    return Err(EnigmaError::config(format!(
                        "whitespace inside a cycle in \"{}\"",
                        text.trim()
                    )));
                }
            }
            (c, Some(cycle)) => cycle.push(c),
            (c, None) => {
                return Err(EnigmaError::config(format!(
                    "symbol '{}' outside of parentheses in \"{}\"",
                    c,
                    text.trim()
                )))
            }
        }
    }

    if current.is_some() {
        return Err(EnigmaError::config(format!(
            "unterminated cycle in \"{}\"",
            text.trim()
        )));
    }
    Ok(cycles)
}
