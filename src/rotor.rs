//! Rotor: a wiring permutation with rotational state.
//!
//! Every rotor carries a `setting` (the symbol showing in the machine's
//! window) and a `ring` offset (the alignment between wiring and lettered
//! ring). A signal entering contact `p` is re-expressed in the rotor's
//! rotated frame, passed through the wiring, and shifted back:
//!
//! ```text
//! out = wrap( wiring( wrap(p + setting - ring) ) - setting + ring )
//! ```
//!
//! The available rotors of a machine live in a [`RotorPool`] and are
//! referenced by [`RotorId`], so a machine's slots share identity with the
//! pool entries instead of holding copies.

use std::fmt;
use std::sync::Arc;

use crate::alphabet::Alphabet;
use crate::error::EnigmaError;
use crate::permutation::Permutation;

/// The closed set of rotor variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RotorKind {
    /// Steps under a pawl. `notches` holds the alphabet indices at which the
    /// rotor lets its left neighbour advance on the next keypress.
    Moving { notches: Vec<usize> },
    /// Never moves.
    Fixed,
    /// Never moves and sends the signal back through the stack. Only valid
    /// in slot 0.
    Reflector,
}

/// A single rotor.
#[derive(Debug, Clone)]
pub struct Rotor {
    name: String,
    permutation: Permutation,
    kind: RotorKind,
    setting: usize,
    ring: usize,
}

impl Rotor {
    /// Creates a moving rotor whose notches sit at the symbols of `notches`.
    ///
    /// # Parameters
    /// - `name`: Name used by settings lines to place the rotor.
    /// - `permutation`: Wiring at setting 0 and ring 0.
    /// - `notches`: Window symbols at which the left neighbour is carried.
    ///   May be empty.
    ///
    /// # Errors
    /// Returns [`EnigmaError::Configuration`] if a notch symbol is not in
    /// the rotor's alphabet or appears twice.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::sync::Arc;
    /// use enigma::{Alphabet, Permutation, Rotor};
    ///
    /// let az = Arc::new(Alphabet::default());
    /// let wiring = Permutation::new("(AELTPHQXRU) (BKNW) (CMOY) (DFG) (IV) (JZ)", az).unwrap();
    /// let mut rotor = Rotor::moving("I", wiring, "Q").unwrap();
    /// rotor.set_symbol('Q').unwrap();
    /// assert!(rotor.at_notch());
    /// rotor.advance();
    /// assert!(!rotor.at_notch());
    /// ```
    pub fn moving(
        name: impl Into<String>,
        permutation: Permutation,
        notches: &str,
    ) -> Result<Self, EnigmaError> {
        let name = name.into();
        let alphabet = permutation.alphabet();
        let mut indices = Vec::with_capacity(notches.len());
        for c in notches.chars() {
            let i = alphabet.to_int(c).map_err(|_| {
                EnigmaError::config(format!(
                    "notch '{}' of rotor {} is not in the alphabet",
                    c, name
                ))
            })?;
            if indices.contains(&i) {
                return Err(EnigmaError::config(format!(
                    "notch '{}' repeated on rotor {}",
                    c, name
                )));
            }
            indices.push(i);
        }
        Ok(Self::build(
            name,
            permutation,
            RotorKind::Moving { notches: indices },
        ))
    }

    /// Creates a rotor that never moves.
    pub fn fixed(name: impl Into<String>, permutation: Permutation) -> Self {
        Self::build(name.into(), permutation, RotorKind::Fixed)
    }

    /// Creates a reflector.
    pub fn reflector(name: impl Into<String>, permutation: Permutation) -> Self {
        let name = name.into();
        if !permutation.derangement() {
            tracing::warn!(rotor = %name, "reflector wiring has a fixed point");
        }
        Self::build(name, permutation, RotorKind::Reflector)
    }

    fn build(name: String, permutation: Permutation, kind: RotorKind) -> Self {
        Rotor {
            name,
            permutation,
            kind,
            setting: 0,
            ring: 0,
        }
    }

    /// Returns the rotor's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the rotor's variant.
    pub fn kind(&self) -> &RotorKind {
        &self.kind
    }

    /// Returns the wiring at setting 0 and ring 0.
    pub fn permutation(&self) -> &Permutation {
        &self.permutation
    }

    /// Returns the alphabet the rotor is wired over.
    pub fn alphabet(&self) -> &Arc<Alphabet> {
        self.permutation.alphabet()
    }

    /// Returns the number of contacts on each face.
    pub fn size(&self) -> usize {
        self.permutation.size()
    }

    /// Notch indices; empty for fixed rotors and reflectors.
    pub fn notches(&self) -> &[usize] {
        match &self.kind {
            RotorKind::Moving { notches } => notches.as_slice(),
            RotorKind::Fixed | RotorKind::Reflector => &[],
        }
    }

    /// Returns true iff the rotor has a ratchet and can move.
    pub fn rotates(&self) -> bool {
        matches!(self.kind, RotorKind::Moving { .. })
    }

    /// Returns true iff the rotor is a reflector.
    pub fn reflecting(&self) -> bool {
        matches!(self.kind, RotorKind::Reflector)
    }

    /// Returns the current setting in `[0, size)`.
    pub fn setting(&self) -> usize {
        self.setting
    }

    /// Returns the current ring offset in `[0, size)`.
    pub fn ring(&self) -> usize {
        self.ring
    }

    /// Sets the setting to `position`, reduced modulo the alphabet size.
    pub fn set(&mut self, position: isize) {
        self.setting = self.permutation.wrap(position);
    }

    /// Sets the setting to the index of `symbol`.
    ///
    /// # Errors
    /// Returns [`EnigmaError::UnknownSymbol`] if `symbol` is not in the alphabet.
    pub fn set_symbol(&mut self, symbol: char) -> Result<(), EnigmaError> {
        self.setting = self.alphabet().to_int(symbol)?;
        Ok(())
    }

    /// Sets the ring offset to the index of `symbol`.
    ///
    /// # Errors
    /// Returns [`EnigmaError::UnknownSymbol`] if `symbol` is not in the alphabet.
    pub fn set_ring(&mut self, symbol: char) -> Result<(), EnigmaError> {
        self.ring = self.alphabet().to_int(symbol)?;
        Ok(())
    }

    /// Resets setting and ring offset to 0.
    pub(crate) fn reset(&mut self) {
        self.setting = 0;
        self.ring = 0;
    }

    /// Offset between absolute contact numbering and the wiring's frame.
    fn shift(&self) -> isize {
        self.setting as isize - self.ring as isize
    }

    /// Passes contact `p` through the wiring from right to left. Contacts
    /// at or above `size()` are reduced modulo `size()` first.
    pub fn convert_forward(&self, p: usize) -> usize {
        let p = p % self.size();
        let shift = self.shift();
        let contact = self.permutation.wrap(p as isize + shift);
        let out = self.permutation.permute(contact);
        self.permutation.wrap(out as isize - shift)
    }

    /// Passes contact `e` through the inverse wiring from left to right.
    /// Contacts at or above `size()` are reduced modulo `size()` first.
    pub fn convert_backward(&self, e: usize) -> usize {
        let e = e % self.size();
        let shift = self.shift();
        let contact = self.permutation.wrap(e as isize + shift);
        let out = self.permutation.invert(contact);
        self.permutation.wrap(out as isize - shift)
    }

    /// Returns true iff the rotor is positioned to let its left neighbour
    /// advance. Always false for fixed rotors and reflectors.
    pub fn at_notch(&self) -> bool {
        self.notches().contains(&self.setting)
    }

    /// Advances a moving rotor by one position. No-op for other variants.
    pub fn advance(&mut self) {
        if self.rotates() {
            self.set(self.setting as isize + 1);
        }
    }
}

impl fmt::Display for Rotor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Rotor {}", self.name)
    }
}

/// Identifier of a rotor within a [`RotorPool`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RotorId(pub usize);

/// Arena owning every rotor available to a machine.
///
/// Slots refer to pool entries by [`RotorId`], which lets a rotor keep its
/// identity (and its setting) while it sits in a slot, without
/// `Rc<RefCell<_>>`.
#[derive(Debug, Clone, Default)]
pub struct RotorPool {
    rotors: Vec<Rotor>,
}

impl RotorPool {
    /// Creates a new empty pool.
    pub fn new() -> Self {
        RotorPool { rotors: Vec::new() }
    }

    /// Adds a rotor and returns its id.
    ///
    /// # Errors
    /// Returns [`EnigmaError::Configuration`] if a rotor with the same name
    /// is already in the pool.
    pub fn add(&mut self, rotor: Rotor) -> Result<RotorId, EnigmaError> {
        if self.find(rotor.name()).is_some() {
            return Err(EnigmaError::config(format!(
                "rotor {} is described more than once",
                rotor.name()
            )));
        }
        let id = RotorId(self.rotors.len());
        self.rotors.push(rotor);
        Ok(id)
    }

    /// Looks up a rotor by name.
    pub fn find(&self, name: &str) -> Option<RotorId> {
        self.rotors
            .iter()
            .position(|r| r.name() == name)
            .map(RotorId)
    }

    /// Returns the number of rotors in the pool.
    pub fn len(&self) -> usize {
        self.rotors.len()
    }

    /// Returns true if the pool holds no rotors.
    pub fn is_empty(&self) -> bool {
        self.rotors.is_empty()
    }

    /// Returns the rotor with id `id`.
    ///
    /// # Panics
    /// Panics if `id` was not issued by this pool.
    pub fn get(&self, id: RotorId) -> &Rotor {
        &self.rotors[id.0]
    }

    /// Mutable form of [`get`](Self::get).
    ///
    /// # Panics
    /// Panics if `id` was not issued by this pool.
    pub fn get_mut(&mut self, id: RotorId) -> &mut Rotor {
        &mut self.rotors[id.0]
    }

    /// Iterates over the pool in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Rotor> {
        self.rotors.iter()
    }
}
