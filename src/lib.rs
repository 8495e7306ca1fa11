//! Enigma: a rotor cipher machine simulator.
//!
//! A machine sends each keypress through a plugboard, a stack of rotating
//! substitution rotors, a reflector, back through the rotors and the
//! plugboard again. Because the reflector is an involution, the same
//! configuration both encodes and decodes.
//!
//! # Architecture
//!
//! ```text
//! Alphabet     (symbol <-> index)
//!     ↓ shared by Arc
//! Permutation  (cycle notation, dense forward/inverse tables)
//!     ↓ owned by
//! Rotor        (Moving | Fixed | Reflector, setting + ring offset)
//!     ↓ pooled in a RotorPool, referenced by RotorId from
//! Machine      (slots, pawls, plugboard, stepping + signal path)
//!     ↑ built and configured by
//! config       (configuration files and settings lines)
//! session      (line-oriented driver with five-symbol output groups)
//! ```
//!
//! # Examples
//!
//! Build a machine from a configuration file and encode a message:
//!
//! ```
//! use enigma::config::{MachineConfig, Settings};
//!
//! let config = MachineConfig::parse(
//!     "ABCDEFGHIJKLMNOPQRSTUVWXYZ 4 3
//!      I   MQ (AELTPHQXRU) (BKNW) (CMOY) (DFG) (IV) (JZ) (S)
//!      II  ME (FIXVYOMW) (CDKLHUP) (ESZ) (BJ) (GR) (NT) (A) (Q)
//!      III MV (ABDHPEJT) (CFLVMZOYQIRWUKXSG) (N)
//!      B   R  (AY) (BR) (CU) (DH) (EQ) (FS) (GL) (IP) (JX) (KN) (MO) (TZ) (VW)",
//! )
//! .unwrap();
//! let mut machine = config.build().unwrap();
//!
//! Settings::parse("* B I II III AAA", 4).unwrap().apply(&mut machine).unwrap();
//! let cipher = machine.convert_message("HELLOWORLD").unwrap();
//! assert_eq!(cipher, "ILBDAAMTAZ");
//!
//! Settings::parse("* B I II III AAA", 4).unwrap().apply(&mut machine).unwrap();
//! assert_eq!(machine.convert_message(&cipher).unwrap(), "HELLOWORLD");
//! ```

#![deny(clippy::all)]

pub mod alphabet;
pub mod config;
pub mod error;
pub mod machine;
pub mod permutation;
pub mod rotor;
pub mod session;

pub use alphabet::Alphabet;
pub use error::{EnigmaError, SessionError};
pub use machine::{Machine, SignalTrace};
pub use permutation::Permutation;
pub use rotor::{Rotor, RotorId, RotorKind, RotorPool};
