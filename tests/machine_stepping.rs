//! Stepping behaviour of the machine: odometer carry, the double-step
//! anomaly, and the boundary at the leftmost steppable slot.

use std::sync::Arc;

use enigma::{Alphabet, Machine, Permutation, Rotor};

const REFLECTOR_B: &str = "(AY) (BR) (CU) (DH) (EQ) (FS) (GL) (IP) (JX) (KN) (MO) (TZ) (VW)";
const ROTOR_I: &str = "(AELTPHQXRU) (BKNW) (CMOY) (DFG) (IV) (JZ) (S)";
const ROTOR_II: &str = "(FIXVYOMW) (CDKLHUP) (ESZ) (BJ) (GR) (NT) (A) (Q)";
const ROTOR_III: &str = "(ABDHPEJT) (CFLVMZOYQIRWUKXSG) (N)";

/// Reflector B plus historical rotors I, II and III, with `pawls` pawls.
fn historical_machine(num_rotors: usize, pawls: usize) -> Machine {
    let az = Arc::new(Alphabet::default());
    let perm = |cycles: &str| Permutation::new(cycles, az.clone()).unwrap();
    let rotors = vec![
        Rotor::reflector("B", perm(REFLECTOR_B)),
        Rotor::moving("I", perm(ROTOR_I), "Q").unwrap(),
        Rotor::moving("II", perm(ROTOR_II), "E").unwrap(),
        Rotor::moving("III", perm(ROTOR_III), "V").unwrap(),
        Rotor::fixed("ID", Permutation::identity(az.clone())),
    ];
    Machine::new(az.clone(), num_rotors, pawls, rotors).unwrap()
}

fn press(machine: &mut Machine) -> String {
    machine.convert(0).unwrap();
    machine.window()
}

#[test]
fn odometer_carry_over_a_full_revolution() {
    let mut machine = historical_machine(3, 2);
    machine.insert_rotors(&["B", "I", "III"]).unwrap();
    machine.set_rotors("AA").unwrap();

    for _ in 0..26 {
        machine.convert(0).unwrap();
    }

    // Rotor III passed its notch V exactly once.
    assert_eq!(machine.get_rotor(2).unwrap().setting(), 0);
    assert_eq!(machine.get_rotor(1).unwrap().setting(), 1);
    assert_eq!(machine.window(), "BA");
}

#[test]
fn carry_happens_on_the_keypress_leaving_the_notch() {
    let mut machine = historical_machine(3, 2);
    machine.insert_rotors(&["B", "I", "III"]).unwrap();
    machine.set_rotors("AU").unwrap();

    assert_eq!(press(&mut machine), "AV");
    assert_eq!(press(&mut machine), "BW");
    assert_eq!(press(&mut machine), "BX");
}

#[test]
fn double_step_anomaly() {
    let mut machine = historical_machine(4, 3);
    machine.insert_rotors(&["B", "I", "II", "III"]).unwrap();
    machine.set_rotors("ADU").unwrap();

    assert_eq!(press(&mut machine), "ADV");
    assert_eq!(press(&mut machine), "AEW");
    // Middle rotor on its notch: all three rotors move on one keypress.
    assert_eq!(press(&mut machine), "BFX");
    assert_eq!(press(&mut machine), "BFY");
}

#[test]
fn leftmost_steppable_slot_only_moves_by_carry() {
    // Slots: B | I | II | III with two pawls, so pawl_start = 2 and rotor I
    // sits outside the pawl range.
    let mut machine = historical_machine(4, 2);
    machine.insert_rotors(&["B", "I", "II", "III"]).unwrap();
    machine.set_rotors("QEV").unwrap();

    // III carries into II; II is on its notch but at pawl_start, so it does
    // not double-step and I never moves even though it is on its notch.
    assert_eq!(press(&mut machine), "QFW");
    assert_eq!(press(&mut machine), "QFX");
}

#[test]
fn slot_right_of_pawl_start_double_steps() {
    let mut machine = historical_machine(4, 3);
    machine.insert_rotors(&["B", "I", "II", "III"]).unwrap();
    machine.set_rotors("AEV").unwrap();

    assert_eq!(press(&mut machine), "BFW");
}

#[test]
fn fixed_rotor_next_to_a_notched_rotor_stays_put() {
    // ID is fixed in slot 1 within the pawl range.
    let mut machine = historical_machine(4, 3);
    machine.insert_rotors(&["B", "ID", "II", "III"]).unwrap();
    machine.set_rotors("AEV").unwrap();

    assert_eq!(press(&mut machine), "AFW");
    assert_eq!(press(&mut machine), "AFX");
}

#[test]
fn no_pawls_means_no_motion() {
    let mut machine = historical_machine(2, 0);
    machine.insert_rotors(&["B", "III"]).unwrap();
    machine.set_rotors("C").unwrap();

    let first = machine.convert(7).unwrap();
    for _ in 0..30 {
        assert_eq!(machine.convert(7).unwrap(), first);
    }
    assert_eq!(machine.window(), "C");
}

#[test]
fn stepping_ignores_ring_offset() {
    let mut machine = historical_machine(4, 3);
    machine.insert_rotors(&["B", "I", "II", "III"]).unwrap();
    machine.set_rotors("ADU").unwrap();
    machine.insert_rings("XYZ").unwrap();

    assert_eq!(press(&mut machine), "ADV");
    assert_eq!(press(&mut machine), "AEW");
    assert_eq!(press(&mut machine), "BFX");
}
