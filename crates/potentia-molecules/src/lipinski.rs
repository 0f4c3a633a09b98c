//! Lipinski descriptor estimates computed from the parsed graph.
//!
//! Pure functions, no I/O. Molecular weight uses average atomic masses;
//! logP is a Wildman-Crippen-style sum of per-atom contributions; donor
//! and acceptor counts follow the usual N/O heuristics. These stand in
//! for the external toolkit the original delegated to, and are estimates
//! rather than reference values.

use serde::Serialize;

use crate::smiles::{Element, Molecule};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LipinskiDescriptors {
    /// Molecular weight in Daltons, hydrogens included.
    pub mw: f64,
    /// Estimated octanol-water partition coefficient.
    pub logp: f64,
    /// Hydrogen-bond donors: N or O atoms carrying at least one hydrogen.
    pub hbd: u32,
    /// Hydrogen-bond acceptors: N and O atoms.
    pub hba: u32,
}

impl LipinskiDescriptors {
    /// Rule-of-five violation count, kept for the log line.
    pub fn ro5_violations(&self) -> u32 {
        let mut violations = 0;
        if self.mw > 500.0 {
            violations += 1;
        }
        if self.logp > 5.0 {
            violations += 1;
        }
        if self.hbd > 5 {
            violations += 1;
        }
        if self.hba > 10 {
            violations += 1;
        }
        violations
    }
}

/// Compute the four Lipinski descriptors for a parsed molecule.
pub fn lipinski(molecule: &Molecule) -> LipinskiDescriptors {
    let graph = molecule.graph();
    let mut mw = 0.0;
    let mut logp = 0.0;
    let mut hbd = 0;
    let mut hba = 0;

    for node in graph.node_indices() {
        let atom = &graph[node];
        let hydrogens = atom.hydrogens() as f64;
        mw += atom.element.average_mass() + hydrogens * Element::H.average_mass();
        logp += atom_logp_contribution(atom.element, atom.aromatic)
            + hydrogens * HYDROGEN_LOGP;

        if matches!(atom.element, Element::N | Element::O) {
            hba += 1;
            if atom.hydrogens() > 0 {
                hbd += 1;
            }
        }
    }

    LipinskiDescriptors { mw, logp, hbd, hba }
}

const HYDROGEN_LOGP: f64 = 0.1230;

/// Per-atom logP contributions, collapsed to element/aromaticity classes
/// from the Wildman-Crippen table.
fn atom_logp_contribution(element: Element, aromatic: bool) -> f64 {
    match (element, aromatic) {
        (Element::C, false) => 0.1441,
        (Element::C, true) => 0.1581,
        (Element::N, false) => -1.0190,
        (Element::N, true) => -0.3239,
        (Element::O, false) => -0.2893,
        (Element::O, true) => 0.1552,
        (Element::S, false) => 0.6482,
        (Element::S, true) => 0.6237,
        (Element::P, _) => 0.8612,
        (Element::B, _) => -0.3187,
        (Element::F, _) => 0.4202,
        (Element::Cl, _) => 0.6895,
        (Element::Br, _) => 0.8456,
        (Element::I, _) => 0.8857,
        (Element::H, _) => HYDROGEN_LOGP,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::smiles::parse_smiles;

    #[test]
    fn ethanol_descriptors() {
        let d = lipinski(&parse_smiles("CCO").unwrap());
        assert!((d.mw - 46.07).abs() < 0.05);
        assert_eq!(d.hbd, 1);
        assert_eq!(d.hba, 1);
        assert!(d.logp.is_finite());
    }

    #[test]
    fn caffeine_counts() {
        let d = lipinski(&parse_smiles("CN1C=NC2=C1C(=O)N(C(=O)N2C)C").unwrap());
        assert!((d.mw - 194.19).abs() < 0.5);
        assert_eq!(d.hbd, 0);
        assert_eq!(d.hba, 6);
    }

    #[test]
    fn aspirin_counts() {
        let d = lipinski(&parse_smiles("CC(=O)Oc1ccccc1C(=O)O").unwrap());
        assert!((d.mw - 180.16).abs() < 0.5);
        assert_eq!(d.hbd, 1);
        assert_eq!(d.hba, 4);
    }

    #[test]
    fn all_values_finite_for_valid_molecules() {
        for smiles in [
            "C",
            "c1ccccc1",
            "CC(=O)Oc1ccccc1C(=O)O",
            "CN1C=NC2=C1C(=O)N(C(=O)N2C)C",
            "CC(C)Cc1ccc(cc1)C(C)C(=O)O",
        ] {
            let d = lipinski(&parse_smiles(smiles).unwrap());
            assert!(d.mw.is_finite() && d.mw > 0.0);
            assert!(d.logp.is_finite());
        }
    }

    #[test]
    fn longer_alkanes_are_greasier() {
        let ethane = lipinski(&parse_smiles("CC").unwrap());
        let hexane = lipinski(&parse_smiles("CCCCCC").unwrap());
        assert!(hexane.logp > ethane.logp);
    }

    #[test]
    fn cholesterol_mw_violates_ro5() {
        let d = lipinski(
            &parse_smiles("CC(C)CCCC(C)C1CCC2C1(CCC3C2CC=C4C3(CCC(C4)O)C)C").unwrap(),
        );
        assert!(d.mw > 380.0);
        assert!(d.ro5_violations() <= 1);
    }
}
