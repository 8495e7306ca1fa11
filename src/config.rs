//! Machine descriptions and settings lines.
//!
//! A configuration file describes the alphabet, the slot and pawl counts,
//! and the pool of available rotors:
//!
//! ```text
//! ABCDEFGHIJKLMNOPQRSTUVWXYZ
//! 5 3
//! I     MQ   (AELTPHQXRU) (BKNW) (CMOY) (DFG) (IV) (JZ) (S)
//! Beta  N    (ALBEVFCYODJWUGNMQTZSKPR) (HIX)
//! B     R    (AY) (BR) (CU) (DH) (EQ) (FS) (GL) (IP) (JX) (KN) (MO) (TZ) (VW)
//! ```
//!
//! The second token of a rotor is its type (`M` moving, `N` fixed, `R`
//! reflector), followed for moving rotors by its notch symbols. Line breaks
//! carry no meaning; the file is a stream of whitespace-separated tokens.
//!
//! A settings line selects rotors and positions for a configured machine:
//!
//! ```text
//! * B Beta III IV I AXLE [RING] (YF) (ZH)
//! ```

use std::sync::Arc;

use crate::alphabet::Alphabet;
use crate::error::EnigmaError;
use crate::machine::Machine;
use crate::permutation::Permutation;
use crate::rotor::Rotor;

/// Marker that opens a settings line.
pub const SETTINGS_MARKER: &str = "*";

/// Variant tag of a rotor description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RotorType {
    /// `M` followed by the notch symbols.
    Moving { notches: String },
    /// `N`.
    Fixed,
    /// `R`.
    Reflector,
}

/// One rotor of a configuration file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotorSpec {
    pub name: String,
    pub rotor_type: RotorType,
    /// Cycle-notation wiring, one entry per cycle.
    pub cycles: Vec<String>,
}

impl RotorSpec {
    /// Builds the rotor over `alphabet`.
    ///
    /// # Errors
    /// Returns [`EnigmaError::Configuration`] for wiring or notches that do
    /// not fit `alphabet`.
    pub fn build(&self, alphabet: Arc<Alphabet>) -> Result<Rotor, EnigmaError> {
        let perm = Permutation::new(&self.cycles.join(" "), alphabet).map_err(|e| {
            EnigmaError::config(format!("rotor {}: {}", self.name, strip_prefix(&e)))
        })?;
        Ok(match &self.rotor_type {
            RotorType::Moving { notches } => Rotor::moving(self.name.clone(), perm, notches)?,
            RotorType::Fixed => Rotor::fixed(self.name.clone(), perm),
            RotorType::Reflector => Rotor::reflector(self.name.clone(), perm),
        })
    }
}

/// Parsed contents of a configuration file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MachineConfig {
    pub alphabet: String,
    pub num_rotors: usize,
    pub pawls: usize,
    pub rotors: Vec<RotorSpec>,
}

impl MachineConfig {
    /// Parses a configuration file.
    ///
    /// # Errors
    /// Returns [`EnigmaError::Configuration`] if the text is truncated, a
    /// count is not a number, the alphabet token contains `*`, `(` or `)`,
    /// or a rotor description is malformed.
    ///
    /// # Examples
    ///
    /// ```
    /// use enigma::config::MachineConfig;
    ///
    /// let config = MachineConfig::parse("ABCD 2 0  R R (AC) (BD)  F N").unwrap();
    /// assert_eq!(config.rotors.len(), 2);
    /// let mut machine = config.build().unwrap();
    /// machine.insert_rotors(&["R", "F"]).unwrap();
    /// assert_eq!(machine.convert_message("A").unwrap(), "C");
    /// ```
    pub fn parse(text: &str) -> Result<Self, EnigmaError> {
        let mut tokens = text.split_whitespace().peekable();

        let alphabet = tokens
            .next()
            .ok_or_else(|| EnigmaError::config("configuration file is empty"))?
            .to_string();
        if alphabet.contains(['*', '(', ')']) {
            return Err(EnigmaError::config(format!(
                "alphabet \"{}\" may not contain '*', '(' or ')'",
                alphabet
            )));
        }
        let num_rotors = parse_count(tokens.next(), "rotor slots")?;
        let pawls = parse_count(tokens.next(), "pawls")?;

        let mut rotors = Vec::new();
        while let Some(name) = tokens.next() {
            let type_token = tokens.next().ok_or_else(|| {
                EnigmaError::config(format!("configuration file truncated at rotor {}", name))
            })?;
            let rotor_type = parse_rotor_type(name, type_token)?;
            let mut cycles = Vec::new();
            while let Some(token) = tokens.next_if(|t| t.starts_with('(')) {
                cycles.push(token.to_string());
            }
            rotors.push(RotorSpec {
                name: name.to_string(),
                rotor_type,
                cycles,
            });
        }

        Ok(MachineConfig {
            alphabet,
            num_rotors,
            pawls,
            rotors,
        })
    }

    /// Builds an unconfigured [`Machine`] holding every described rotor.
    ///
    /// # Errors
    /// Returns [`EnigmaError::Configuration`] for an invalid alphabet,
    /// rotor, or slot/pawl combination.
    pub fn build(&self) -> Result<Machine, EnigmaError> {
        let alphabet = Arc::new(Alphabet::new(&self.alphabet)?);
        let rotors = self
            .rotors
            .iter()
            .map(|spec| spec.build(alphabet.clone()))
            .collect::<Result<Vec<_>, _>>()?;
        tracing::debug!(
            alphabet = %alphabet,
            num_rotors = self.num_rotors,
            pawls = self.pawls,
            available = rotors.len(),
            "built machine"
        );
        Machine::new(alphabet, self.num_rotors, self.pawls, rotors)
    }
}

fn parse_count(token: Option<&str>, what: &str) -> Result<usize, EnigmaError> {
    let token = token
        .ok_or_else(|| EnigmaError::config(format!("configuration file truncated before {}", what)))?;
    token.parse().map_err(|_| {
        EnigmaError::config(format!("number of {} must be a count, got \"{}\"", what, token))
    })
}

fn parse_rotor_type(name: &str, token: &str) -> Result<RotorType, EnigmaError> {
    let mut chars = token.chars();
    let tag = chars.next();
    let rest: String = chars.collect();
    match tag {
        Some('M') => Ok(RotorType::Moving { notches: rest }),
        Some('N') | Some('R') if !rest.is_empty() => Err(EnigmaError::config(format!(
            "rotor {} cannot have notches \"{}\"",
            name, rest
        ))),
        Some('N') => Ok(RotorType::Fixed),
        Some('R') => Ok(RotorType::Reflector),
        _ => Err(EnigmaError::config(format!(
            "bad rotor description for {}: type \"{}\" is not M, N or R",
            name, token
        ))),
    }
}

/// Message of a configuration error without its display prefix.
fn strip_prefix(err: &EnigmaError) -> String {
    match err {
        EnigmaError::Configuration(msg) => msg.clone(),
        other => other.to_string(),
    }
}

/// A parsed settings line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Rotor names, reflector first.
    pub rotors: Vec<String>,
    /// Initial window, one symbol per non-reflector slot.
    pub positions: String,
    /// Ring settings, when given.
    pub rings: Option<String>,
    /// Plugboard cycles.
    pub plugboard: String,
}

impl Settings {
    /// Returns true if `line` is a settings line rather than a message.
    pub fn is_settings_line(line: &str) -> bool {
        line.trim_start().starts_with(SETTINGS_MARKER)
    }

    /// Parses a settings line for a machine with `num_rotors` slots.
    ///
    /// # Errors
    /// Returns [`EnigmaError::Configuration`] if the line does not start
    /// with `*`, names too few rotors, or lacks the position token.
    pub fn parse(line: &str, num_rotors: usize) -> Result<Self, EnigmaError> {
        let mut tokens = line.split_whitespace();
        match tokens.next() {
            Some(SETTINGS_MARKER) => {}
            Some(first) if first.starts_with(SETTINGS_MARKER) => {
                // "*B Beta ..." is accepted like "* B Beta ...".
                return Self::parse(&format!("* {}", line.trim_start()[1..].trim_start()), num_rotors);
            }
            _ => {
                return Err(EnigmaError::config(format!(
                    "settings line must start with '*': \"{}\"",
                    line.trim()
                )))
            }
        }

        let rotors: Vec<String> = tokens.by_ref().take(num_rotors).map(String::from).collect();
        if rotors.len() != num_rotors || rotors.iter().any(|r| r.starts_with('(')) {
            return Err(EnigmaError::config(format!(
                "settings line must name {} rotors: \"{}\"",
                num_rotors,
                line.trim()
            )));
        }
        let positions = tokens
            .next()
            .filter(|t| !t.starts_with('('))
            .ok_or_else(|| {
                EnigmaError::config(format!(
                    "settings line is missing the rotor positions: \"{}\"",
                    line.trim()
                ))
            })?
            .to_string();

        let mut rest = tokens.peekable();
        let rings = rest
            .next_if(|t| !t.starts_with('('))
            .map(String::from);
        let plugboard = rest.collect::<Vec<_>>().join(" ");

        Ok(Settings {
            rotors,
            positions,
            rings,
            plugboard,
        })
    }

    /// Applies the settings to `machine`: plugboard, rotors, positions, then
    /// rings. Either every step succeeds or `machine` is left unchanged.
    ///
    /// # Parameters
    /// - `machine`: the machine to reconfigure.
    ///
    /// # Errors
    /// Propagates the machine's configuration errors. A position or ring
    /// symbol outside the alphabet is reported as a configuration error.
    pub fn apply(&self, machine: &mut Machine) -> Result<(), EnigmaError> {
        let mut next = machine.clone();
        let plugboard = Permutation::new(&self.plugboard, next.alphabet().clone())
            .map_err(|e| EnigmaError::config(format!("plugboard: {}", strip_prefix(&e))))?;
        next.set_plugboard(plugboard)?;
        next.insert_rotors(self.rotors.as_slice())?;
        next.set_rotors(&self.positions).map_err(|e| match e {
            EnigmaError::UnknownSymbol(c) => EnigmaError::config(format!(
                "setting \"{}\" contains unknown symbol '{}'",
                self.positions, c
            )),
            other => other,
        })?;
        if let Some(rings) = &self.rings {
            next.insert_rings(rings).map_err(|e| match e {
                EnigmaError::UnknownSymbol(c) => EnigmaError::config(format!(
                    "ring setting \"{}\" contains unknown symbol '{}'",
                    rings, c
                )),
                other => other,
            })?;
        }
        *machine = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SMALL: &str = "
        ABCD 3 2
        L  MA  (ABCD)
        M  MC  (AB) (CD)
        F  N   (AD)
        R  R   (AC)(BD)
    ";

    #[test]
    fn test_parse_small_config() {
        let config = MachineConfig::parse(SMALL).unwrap();
        assert_eq!(config.alphabet, "ABCD");
        assert_eq!(config.num_rotors, 3);
        assert_eq!(config.pawls, 2);
        assert_eq!(config.rotors.len(), 4);
        assert_eq!(
            config.rotors[1],
            RotorSpec {
                name: "M".into(),
                rotor_type: RotorType::Moving {
                    notches: "C".into()
                },
                cycles: vec!["(AB)".into(), "(CD)".into()],
            }
        );
        assert_eq!(config.rotors[2].rotor_type, RotorType::Fixed);
        assert_eq!(config.rotors[3].rotor_type, RotorType::Reflector);
        assert_eq!(config.rotors[3].cycles, ["(AC)(BD)"]);
    }

    #[test]
    fn test_build_machine() {
        let machine = MachineConfig::parse(SMALL).unwrap().build().unwrap();
        assert_eq!(machine.num_rotors(), 3);
        assert_eq!(machine.num_pawls(), 2);
        assert_eq!(machine.pool().len(), 4);
        assert!(machine.get_rotor(0).is_none());
    }

    #[test]
    fn test_rotor_without_cycles_is_identity() {
        let config = MachineConfig::parse("ABCD 2 1 R R (AB)(CD) M MA").unwrap();
        assert!(config.rotors[1].cycles.is_empty());
        let rotor = config.rotors[1]
            .build(Arc::new(Alphabet::new("ABCD").unwrap()))
            .unwrap();
        assert!(!rotor.permutation().derangement());
    }

    #[test]
    fn test_parse_errors() {
        for bad in [
            "",
            "ABCD",
            "ABCD 3",
            "ABCD x 2",
            "AB*D 3 2",
            "AB(D 3 2",
            "ABCD 3 2 L",
            "ABCD 3 2 L X (AB)",
            "ABCD 3 2 F NA (AB)",
            "ABCD 3 2 R RB (AB)",
        ] {
            assert!(
                matches!(MachineConfig::parse(bad), Err(EnigmaError::Configuration(_))),
                "expected {:?} to be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_build_errors() {
        for bad in [
            "ABCA 3 2 R R (AB)",
            "ABCD 3 2 L MAA (AB)",
            "ABCD 3 2 L MA (AE)",
            "ABCD 3 3 R R (AB)(CD)",
            "ABCD 1 0 R R (AB)(CD)",
            "ABCD 3 2 R R (AB)(CD) R R (AC)",
        ] {
            let config = MachineConfig::parse(bad).unwrap();
            assert!(
                matches!(config.build(), Err(EnigmaError::Configuration(_))),
                "expected {:?} to fail to build",
                bad
            );
        }
    }

    #[test]
    fn test_parse_settings_full() {
        let settings = Settings::parse("* B Beta III IV I AXLE BBBB (YF) (ZH)", 5).unwrap();
        assert_eq!(settings.rotors, ["B", "Beta", "III", "IV", "I"]);
        assert_eq!(settings.positions, "AXLE");
        assert_eq!(settings.rings.as_deref(), Some("BBBB"));
        assert_eq!(settings.plugboard, "(YF) (ZH)");
    }

    #[test]
    fn test_parse_settings_minimal() {
        let settings = Settings::parse("* R L M AB", 3).unwrap();
        assert_eq!(settings.rings, None);
        assert_eq!(settings.plugboard, "");

        let glued = Settings::parse("*R L M AB (AB)", 3).unwrap();
        assert_eq!(glued.rotors, ["R", "L", "M"]);
        assert_eq!(glued.plugboard, "(AB)");
    }

    #[test]
    fn test_parse_settings_errors() {
        for bad in ["R L M AB", "* R L", "* R L M", "* R L M (AB)", "* R (AB) M AB"] {
            assert!(
                matches!(Settings::parse(bad, 3), Err(EnigmaError::Configuration(_))),
                "expected {:?} to be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_is_settings_line() {
        assert!(Settings::is_settings_line("* B I II III AAA"));
        assert!(Settings::is_settings_line("  *B"));
        assert!(!Settings::is_settings_line("HELLO WORLD"));
        assert!(!Settings::is_settings_line(""));
    }

    #[test]
    fn test_apply_settings() {
        let mut machine = MachineConfig::parse(SMALL).unwrap().build().unwrap();
        Settings::parse("* R L M CB DA (AB)", 3)
            .unwrap()
            .apply(&mut machine)
            .unwrap();
        assert_eq!(machine.window(), "CB");
        assert_eq!(machine.get_rotor(1).unwrap().ring(), 3);
        assert_eq!(machine.get_rotor(2).unwrap().ring(), 0);
        assert_eq!(machine.plugboard().to_string(), "(AB)");
    }

    #[test]
    fn test_apply_settings_errors() {
        let mut machine = MachineConfig::parse(SMALL).unwrap().build().unwrap();
        for bad in [
            "* L R M AB",
            "* R L L AB",
            "* R L X AB",
            "* R L M ABC",
            "* R L M AZ",
            "* R L M AB AZ",
            "* R L M AB (AZ)",
        ] {
            let settings = Settings::parse(bad, 3).unwrap();
            assert!(
                matches!(settings.apply(&mut machine), Err(EnigmaError::Configuration(_))),
                "expected {:?} to be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_failed_apply_keeps_previous_configuration() {
        let mut machine = MachineConfig::parse(SMALL).unwrap().build().unwrap();
        Settings::parse("* R L M CB DA", 3)
            .unwrap()
            .apply(&mut machine)
            .unwrap();

        for bad in ["* R L X AA (AB)", "* R M L AZ (AB)", "* R M L AA AZ (AB)"] {
            let settings = Settings::parse(bad, 3).unwrap();
            assert!(settings.apply(&mut machine).is_err());
            assert_eq!(machine.plugboard().to_string(), "", "{}", bad);
            assert_eq!(machine.get_rotor(1).unwrap().name(), "L");
            assert_eq!(machine.window(), "CB");
            assert_eq!(machine.get_rotor(1).unwrap().ring(), 3);
        }
    }
}
