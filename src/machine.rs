//! Machine: rotor slots, plugboard, stepping and the signal path.
//!
//! Slot 0 holds the reflector and slot `num_rotors - 1` the fastest rotor.
//! The rightmost `pawls` slots sit under pawls and may step. Each keypress
//! first steps the rotors, then sends the signal through
//!
//! ```text
//! plugboard → slots N-1 … 1 (forward) → reflector → slots 1 … N-1 (backward) → plugboard
//! ```
//!
//! For a fixed rotor position this path is an involution, so encoding and
//! decoding are the same operation.

use std::fmt;
use std::sync::Arc;

use crate::alphabet::Alphabet;
use crate::error::EnigmaError;
use crate::permutation::Permutation;
use crate::rotor::{Rotor, RotorId, RotorPool};

/// A configurable rotor machine.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use enigma::{Alphabet, Machine, Permutation, Rotor};
///
/// let az = Arc::new(Alphabet::default());
/// let wiring = |cycles: &str| Permutation::new(cycles, az.clone()).unwrap();
/// let rotors = vec![
///     Rotor::reflector("B", wiring("(AY) (BR) (CU) (DH) (EQ) (FS) (GL) (IP) (JX) (KN) (MO) (TZ) (VW)")),
///     Rotor::moving("I", wiring("(AELTPHQXRU) (BKNW) (CMOY) (DFG) (IV) (JZ) (S)"), "Q").unwrap(),
///     Rotor::moving("II", wiring("(FIXVYOMW) (CDKLHUP) (ESZ) (BJ) (GR) (NT) (A) (Q)"), "E").unwrap(),
///     Rotor::moving("III", wiring("(ABDHPEJT) (CFLVMZOYQIRWUKXSG) (N)"), "V").unwrap(),
/// ];
///
/// let mut machine = Machine::new(az.clone(), 4, 3, rotors).unwrap();
/// machine.insert_rotors(&["B", "I", "II", "III"]).unwrap();
/// machine.set_rotors("AAA").unwrap();
/// assert_eq!(machine.convert_message("AAAAA").unwrap(), "BDZGO");
/// ```
#[derive(Debug, Clone)]
pub struct Machine {
    alphabet: Arc<Alphabet>,
    num_rotors: usize,
    pawls: usize,
    pool: RotorPool,
    slots: Vec<RotorId>,
    plugboard: Permutation,
}

impl Machine {
    /// Creates a machine with `num_rotors` slots, `pawls` steppable slots and
    /// the rotors of `rotors` available for insertion. The plugboard starts
    /// as the identity and no rotors are inserted.
    ///
    /// # Parameters
    /// - `alphabet`: Alphabet shared by the plugboard and all rotors.
    /// - `num_rotors`: Number of slots, reflector included.
    /// - `pawls`: Number of rightmost slots driven by pawls.
    /// - `rotors`: Pool of rotors available to `insert_rotors`.
    ///
    /// # Returns
    /// A machine with an identity plugboard and empty slots.
    ///
    /// # Errors
    /// Returns [`EnigmaError::Configuration`] if `num_rotors < 2`,
    /// `pawls >= num_rotors`, two rotors share a name, or a rotor is wired
    /// over a different alphabet.
    pub fn new(
        alphabet: Arc<Alphabet>,
        num_rotors: usize,
        pawls: usize,
        rotors: Vec<Rotor>,
    ) -> Result<Self, EnigmaError> {
        if num_rotors < 2 {
            return Err(EnigmaError::config(format!(
                "a machine needs at least 2 rotor slots, got {}",
                num_rotors
            )));
        }
        if pawls >= num_rotors {
            return Err(EnigmaError::config(format!(
                "pawl count {} must be less than the {} rotor slots",
                pawls, num_rotors
            )));
        }
        let mut pool = RotorPool::new();
        for rotor in rotors {
            if **rotor.alphabet() != *alphabet {
                return Err(EnigmaError::config(format!(
                    "rotor {} is wired over a different alphabet",
                    rotor.name()
                )));
            }
            pool.add(rotor)?;
        }
        let plugboard = Permutation::identity(alphabet.clone());
        Ok(Machine {
            alphabet,
            num_rotors,
            pawls,
            pool,
            slots: Vec::new(),
            plugboard,
        })
    }

    /// Returns the number of rotor slots.
    pub fn num_rotors(&self) -> usize {
        self.num_rotors
    }

    /// Returns the number of pawls (and thus of steppable slots).
    pub fn num_pawls(&self) -> usize {
        self.pawls
    }

    /// Returns the alphabet shared by the plugboard and every rotor.
    pub fn alphabet(&self) -> &Arc<Alphabet> {
        &self.alphabet
    }

    /// Returns the current plugboard.
    pub fn plugboard(&self) -> &Permutation {
        &self.plugboard
    }

    /// Returns every rotor available to the machine.
    pub fn pool(&self) -> &RotorPool {
        &self.pool
    }

    /// Returns the rotor in slot `k`, where slot 0 is the reflector and slot
    /// `num_rotors() - 1` the fast rotor. `None` before
    /// [`insert_rotors`](Self::insert_rotors) or when `k` is out of range.
    pub fn get_rotor(&self, k: usize) -> Option<&Rotor> {
        self.slots.get(k).map(|&id| self.pool.get(id))
    }

    /// Fills the slots with the pool rotors named by `names`, left to right
    /// (`names[0]` names the reflector). Inserted rotors start at setting 0
    /// with ring offset 0.
    ///
    /// On error the previous slot assignment is kept.
    ///
    /// # Errors
    /// Returns [`EnigmaError::Configuration`] if `names.len()` differs from
    /// `num_rotors()`, a name is unknown or repeated, slot 0 is not a
    /// reflector, or a reflector is named for any other slot.
    pub fn insert_rotors<S: AsRef<str>>(&mut self, names: &[S]) -> Result<(), EnigmaError> {
        if names.len() != self.num_rotors {
            return Err(EnigmaError::config(format!(
                "expected {} rotor names, got {}",
                self.num_rotors,
                names.len()
            )));
        }

        let mut slots = Vec::with_capacity(self.num_rotors);
        for (k, name) in names.iter().enumerate() {
            let name = name.as_ref();
            let id = self
                .pool
                .find(name)
                .ok_or_else(|| EnigmaError::config(format!("unknown rotor {}", name)))?;
            if slots.contains(&id) {
                return Err(EnigmaError::config(format!(
                    "rotor {} is named for more than one slot",
                    name
                )));
            }
            let reflecting = self.pool.get(id).reflecting();
            if k == 0 && !reflecting {
                return Err(EnigmaError::config(format!(
                    "the rotor in slot 0 must be a reflector, {} is not",
                    name
                )));
            }
            if k > 0 && reflecting {
                return Err(EnigmaError::config(format!(
                    "reflector {} can only be placed in slot 0",
                    name
                )));
            }
            slots.push(id);
        }

        for &id in &slots {
            self.pool.get_mut(id).reset();
        }
        let inserted: Vec<&str> = names.iter().map(|n| n.as_ref()).collect();
        tracing::debug!(rotors = ?inserted, "inserted rotors");
        self.slots = slots;
        Ok(())
    }

    /// Sets the ring offsets of slots `1..num_rotors()` from `rings`, one
    /// symbol per slot, left to right. The reflector has no ring.
    ///
    /// # Errors
    /// Returns [`EnigmaError::Configuration`] if no rotors are inserted or
    /// the length is not `num_rotors() - 1`, and
    /// [`EnigmaError::UnknownSymbol`] for a symbol outside the alphabet.
    pub fn insert_rings(&mut self, rings: &str) -> Result<(), EnigmaError> {
        let symbols = self.checked_symbols(rings, "ring setting")?;
        for (&id, c) in self.slots[1..].iter().zip(symbols) {
            self.pool.get_mut(id).set_ring(c)?;
        }
        tracing::debug!(rings, "set ring offsets");
        Ok(())
    }

    /// Sets the settings of slots `1..num_rotors()` from `setting`, one
    /// symbol per slot, left to right.
    ///
    /// # Errors
    /// Returns [`EnigmaError::Configuration`] if no rotors are inserted or
    /// the length is not `num_rotors() - 1`, and
    /// [`EnigmaError::UnknownSymbol`] for a symbol outside the alphabet.
    pub fn set_rotors(&mut self, setting: &str) -> Result<(), EnigmaError> {
        let symbols = self.checked_symbols(setting, "rotor setting")?;
        for (&id, c) in self.slots[1..].iter().zip(symbols) {
            self.pool.get_mut(id).set_symbol(c)?;
        }
        tracing::debug!(setting, "set rotors");
        Ok(())
    }

    /// Validates a per-slot symbol string against the inserted rotors.
    fn checked_symbols(&self, text: &str, what: &str) -> Result<Vec<char>, EnigmaError> {
        if self.slots.is_empty() {
            return Err(EnigmaError::config(format!(
                "cannot apply {} before rotors are inserted",
                what
            )));
        }
        let symbols: Vec<char> = text.chars().collect();
        if symbols.len() != self.num_rotors - 1 {
            return Err(EnigmaError::config(format!(
                "{} \"{}\" must have {} symbols",
                what,
                text,
                self.num_rotors - 1
            )));
        }
        if let Some(&c) = symbols.iter().find(|&&c| !self.alphabet.contains(c)) {
            return Err(EnigmaError::UnknownSymbol(c));
        }
        Ok(symbols)
    }

    /// Replaces the plugboard.
    ///
    /// # Errors
    /// Returns [`EnigmaError::Configuration`] if `plugboard` permutes a
    /// different alphabet.
    pub fn set_plugboard(&mut self, plugboard: Permutation) -> Result<(), EnigmaError> {
        if **plugboard.alphabet() != *self.alphabet {
            return Err(EnigmaError::config(
                "plugboard is wired over a different alphabet",
            ));
        }
        tracing::debug!(plugboard = %plugboard, "set plugboard");
        self.plugboard = plugboard;
        Ok(())
    }

    /// Returns the symbols showing in the window of slots `1..num_rotors()`.
    pub fn window(&self) -> String {
        self.slots
            .iter()
            .skip(1)
            .map(|&id| self.alphabet.to_char(self.pool.get(id).setting()))
            .collect()
    }

    /// Steps the rotors, then converts the symbol index `c` (taken modulo
    /// the alphabet size).
    ///
    /// # Errors
    /// Returns [`EnigmaError::Configuration`] if no rotors are inserted.
    pub fn convert(&mut self, c: usize) -> Result<usize, EnigmaError> {
        self.ensure_inserted()?;
        self.advance_rotors();
        Ok(self.signal_path(c, None))
    }

    /// Like [`convert`](Self::convert), also recording the window after
    /// stepping and every contact the signal passes.
    ///
    /// # Errors
    /// Returns [`EnigmaError::Configuration`] if no rotors are inserted.
    pub fn convert_traced(&mut self, c: usize) -> Result<(usize, SignalTrace), EnigmaError> {
        self.ensure_inserted()?;
        self.advance_rotors();
        let mut contacts = Vec::with_capacity(2 * self.num_rotors + 2);
        let out = self.signal_path(c, Some(&mut contacts));
        let trace = SignalTrace {
            window: self.window(),
            path: contacts
                .into_iter()
                .map(|i| self.alphabet.to_char(i))
                .collect(),
        };
        Ok((out, trace))
    }

    /// Converts every symbol of `msg` in order, advancing the rotors as it
    /// goes. Converting the same text twice gives different results.
    ///
    /// # Errors
    /// Returns [`EnigmaError::UnknownSymbol`] at the first symbol outside
    /// the alphabet; rotors have advanced for the symbols before it.
    pub fn convert_message(&mut self, msg: &str) -> Result<String, EnigmaError> {
        self.ensure_inserted()?;
        let mut result = String::with_capacity(msg.len());
        for ch in msg.chars() {
            let c = self.alphabet.to_int(ch)?;
            let out = self.convert(c)?;
            result.push(self.alphabet.to_char(out));
        }
        Ok(result)
    }

    fn ensure_inserted(&self) -> Result<(), EnigmaError> {
        if self.slots.is_empty() {
            return Err(EnigmaError::config(
                "no rotors have been inserted into the machine",
            ));
        }
        Ok(())
    }

    /// Advances the rotors for one keypress.
    ///
    /// Marks are taken before anything moves, so notch tests see the
    /// positions from before this keypress.
    fn advance_rotors(&mut self) {
        let n = self.num_rotors;
        let pawl_start = n - self.pawls;
        let mut marked = vec![false; n];

        for i in ((pawl_start + 1)..n).rev() {
            let rotor = self.pool.get(self.slots[i]);
            if rotor.at_notch() {
                if rotor.rotates() {
                    marked[i] = true;
                }
                // Double step: a middle rotor on its notch moves with its neighbour.
                if self.pool.get(self.slots[i - 1]).rotates() {
                    marked[i - 1] = true;
                }
            }
        }
        marked[n - 1] = true;

        for i in pawl_start..n {
            if marked[i] {
                self.pool.get_mut(self.slots[i]).advance();
            }
        }
    }

    /// Sends index `c` from the keyboard to the lamps, optionally recording
    /// each intermediate contact.
    fn signal_path(&self, c: usize, mut trace: Option<&mut Vec<usize>>) -> usize {
        let mut record = |i: usize| {
            if let Some(t) = trace.as_deref_mut() {
                t.push(i);
            }
        };

        let c = c % self.alphabet.size();
        record(c);
        let mut c = self.plugboard.permute(c);
        record(c);
        for &id in self.slots[1..].iter().rev() {
            c = self.pool.get(id).convert_forward(c);
            record(c);
        }
        c = self.pool.get(self.slots[0]).convert_forward(c);
        record(c);
        for &id in &self.slots[1..] {
            c = self.pool.get(id).convert_backward(c);
            record(c);
        }
        c = self.plugboard.permute(c);
        record(c);
        c
    }
}

/// One keypress as seen by a verbose trace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignalTrace {
    /// Window after stepping, leftmost rotor first.
    pub window: String,
    /// Input symbol, symbol after the plugboard, after each rotor pass and
    /// the reflector, and the output symbol.
    pub path: Vec<char>,
}

impl fmt::Display for SignalTrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.window)?;
        for (k, c) in self.path.iter().enumerate() {
            if k == 0 {
                write!(f, " {}", c)?;
            } else {
                write!(f, " -> {}", c)?;
            }
        }
        Ok(())
    }
}
