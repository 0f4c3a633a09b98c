//! SMILES parsing into an undirected molecular graph.
//!
//! Covers the organic subset plus bracket atoms (isotope, chirality
//! marks, explicit hydrogen counts, charges), branches, ring closures
//! (including `%nn`), and explicit bond symbols. Stereo bond symbols
//! (`/`, `\`) are accepted and flattened to single bonds; isotopes and
//! chirality are accepted and discarded. Anything else is an
//! `InvalidStructure` error, which terminates the whole request.

use std::collections::HashMap;

use petgraph::graph::{NodeIndex, UnGraph};
use potentia_common::error::{PotencyError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Element {
    H,
    B,
    C,
    N,
    O,
    F,
    P,
    S,
    Cl,
    Br,
    I,
}

impl Element {
    fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "H" => Some(Element::H),
            "B" => Some(Element::B),
            "C" => Some(Element::C),
            "N" => Some(Element::N),
            "O" => Some(Element::O),
            "F" => Some(Element::F),
            "P" => Some(Element::P),
            "S" => Some(Element::S),
            "Cl" => Some(Element::Cl),
            "Br" => Some(Element::Br),
            "I" => Some(Element::I),
            _ => None,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Element::H => "H",
            Element::B => "B",
            Element::C => "C",
            Element::N => "N",
            Element::O => "O",
            Element::F => "F",
            Element::P => "P",
            Element::S => "S",
            Element::Cl => "Cl",
            Element::Br => "Br",
            Element::I => "I",
        }
    }

    /// Average atomic mass in Daltons.
    pub fn average_mass(self) -> f64 {
        match self {
            Element::H => 1.008,
            Element::B => 10.811,
            Element::C => 12.011,
            Element::N => 14.007,
            Element::O => 15.999,
            Element::F => 18.998,
            Element::P => 30.974,
            Element::S => 32.065,
            Element::Cl => 35.453,
            Element::Br => 79.904,
            Element::I => 126.904,
        }
    }

    /// Standard valences, smallest first, used for implicit hydrogen
    /// assignment on unbracketed atoms.
    fn valences(self) -> &'static [u8] {
        match self {
            Element::H => &[1],
            Element::B => &[3],
            Element::C => &[4],
            Element::N => &[3, 5],
            Element::O => &[2],
            Element::F | Element::Cl | Element::Br | Element::I => &[1],
            Element::P => &[3, 5],
            Element::S => &[2, 4, 6],
        }
    }

    fn aromatic_form(self) -> bool {
        matches!(
            self,
            Element::B | Element::C | Element::N | Element::O | Element::P | Element::S
        )
    }
}

#[derive(Debug, Clone)]
pub struct Atom {
    pub element: Element,
    pub aromatic: bool,
    pub charge: i8,
    /// Hydrogen count given explicitly in a bracket atom. Bracket atoms
    /// with no `H` suffix carry `Some(0)`; unbracketed atoms carry `None`
    /// and get their count from valence rules.
    pub explicit_h: Option<u8>,
    pub implicit_h: u8,
}

impl Atom {
    fn organic(element: Element, aromatic: bool) -> Self {
        Self {
            element,
            aromatic,
            charge: 0,
            explicit_h: None,
            implicit_h: 0,
        }
    }

    /// Hydrogens attached to this atom, explicit or implied.
    pub fn hydrogens(&self) -> u8 {
        self.explicit_h.unwrap_or(self.implicit_h)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bond {
    Single,
    Double,
    Triple,
    Aromatic,
}

impl Bond {
    pub fn order(self) -> f64 {
        match self {
            Bond::Single => 1.0,
            Bond::Double => 2.0,
            Bond::Triple => 3.0,
            Bond::Aromatic => 1.5,
        }
    }
}

pub type MoleculeGraph = UnGraph<Atom, Bond>;

/// A parsed molecule: the graph plus the SMILES string it came from.
#[derive(Debug, Clone)]
pub struct Molecule {
    graph: MoleculeGraph,
    smiles: String,
}

impl Molecule {
    pub fn graph(&self) -> &MoleculeGraph {
        &self.graph
    }

    pub fn smiles(&self) -> &str {
        &self.smiles
    }

    pub fn heavy_atom_count(&self) -> usize {
        self.graph
            .node_indices()
            .filter(|&n| self.graph[n].element != Element::H)
            .count()
    }

    /// Sum of the bond orders incident to one atom.
    pub fn bond_order_sum(&self, node: NodeIndex) -> f64 {
        self.graph
            .edges(node)
            .map(|e| e.weight().order())
            .sum()
    }
}

fn err(message: impl Into<String>) -> PotencyError {
    PotencyError::InvalidStructure(message.into())
}

/// Parse a SMILES string into a [`Molecule`].
pub fn parse_smiles(smiles: &str) -> Result<Molecule> {
    let input = smiles.trim();
    if input.is_empty() {
        return Err(err("empty SMILES string"));
    }

    let chars: Vec<char> = input.chars().collect();
    let mut graph = MoleculeGraph::default();
    let mut current: Option<NodeIndex> = None;
    let mut pending_bond: Option<Bond> = None;
    let mut branch_stack: Vec<NodeIndex> = Vec::new();
    let mut ring_map: HashMap<u16, (NodeIndex, Option<Bond>)> = HashMap::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            '(' => {
                let atom = current
                    .ok_or_else(|| err(format!("branch opened at position {i} with no atom")))?;
                branch_stack.push(atom);
                i += 1;
            }
            ')' => {
                if pending_bond.is_some() {
                    return Err(err(format!("dangling bond before ')' at position {i}")));
                }
                current = Some(
                    branch_stack
                        .pop()
                        .ok_or_else(|| err(format!("unmatched ')' at position {i}")))?,
                );
                i += 1;
            }
            '-' | '=' | '#' | ':' | '/' | '\\' => {
                if pending_bond.is_some() {
                    return Err(err(format!("two bond symbols in a row at position {i}")));
                }
                pending_bond = Some(match c {
                    '=' => Bond::Double,
                    '#' => Bond::Triple,
                    ':' => Bond::Aromatic,
                    // Stereo bonds flattened; geometry is irrelevant here.
                    _ => Bond::Single,
                });
                i += 1;
            }
            '.' => {
                if pending_bond.is_some() {
                    return Err(err(format!("bond across '.' separator at position {i}")));
                }
                current = None;
                i += 1;
            }
            '0'..='9' | '%' => {
                let ring_number = if c == '%' {
                    let hi = chars.get(i + 1).and_then(|d| d.to_digit(10));
                    let lo = chars.get(i + 2).and_then(|d| d.to_digit(10));
                    match (hi, lo) {
                        (Some(hi), Some(lo)) => {
                            i += 3;
                            (hi * 10 + lo) as u16
                        }
                        _ => return Err(err(format!("malformed '%nn' ring label at position {i}"))),
                    }
                } else {
                    i += 1;
                    c.to_digit(10).unwrap() as u16
                };
                let atom = current.ok_or_else(|| {
                    err(format!("ring-closure digit {ring_number} with no current atom"))
                })?;
                match ring_map.remove(&ring_number) {
                    Some((other, bond_at_open)) => {
                        if other == atom {
                            return Err(err(format!("ring bond {ring_number} closes on itself")));
                        }
                        let bond = pending_bond
                            .take()
                            .or(bond_at_open)
                            .unwrap_or_else(|| default_bond(&graph[other], &graph[atom]));
                        graph.add_edge(atom, other, bond);
                    }
                    None => {
                        ring_map.insert(ring_number, (atom, pending_bond.take()));
                    }
                }
            }
            '[' => {
                let close = chars[i..]
                    .iter()
                    .position(|&x| x == ']')
                    .map(|p| i + p)
                    .ok_or_else(|| err(format!("unclosed '[' at position {i}")))?;
                let body: String = chars[i + 1..close].iter().collect();
                let atom = parse_bracket_atom(&body)
                    .map_err(|e| err(format!("bad bracket atom '[{body}]': {e}")))?;
                let node = graph.add_node(atom);
                attach(&mut graph, current, node, &mut pending_bond);
                current = Some(node);
                i = close + 1;
            }
            _ => {
                let (element, aromatic, consumed) = scan_organic_atom(&chars, i)
                    .ok_or_else(|| err(format!("unexpected character '{c}' at position {i}")))?;
                let node = graph.add_node(Atom::organic(element, aromatic));
                attach(&mut graph, current, node, &mut pending_bond);
                current = Some(node);
                i += consumed;
            }
        }
    }

    if pending_bond.is_some() {
        return Err(err("SMILES ends with a dangling bond symbol"));
    }
    if !branch_stack.is_empty() {
        return Err(err("unclosed '(' branch"));
    }
    if let Some(ring) = ring_map.keys().next() {
        return Err(err(format!("unclosed ring bond {ring}")));
    }
    if graph.node_count() == 0 {
        return Err(err("SMILES describes no atoms"));
    }

    assign_implicit_hydrogens(&mut graph);

    Ok(Molecule {
        graph,
        smiles: input.to_string(),
    })
}

fn default_bond(a: &Atom, b: &Atom) -> Bond {
    if a.aromatic && b.aromatic {
        Bond::Aromatic
    } else {
        Bond::Single
    }
}

fn attach(
    graph: &mut MoleculeGraph,
    previous: Option<NodeIndex>,
    node: NodeIndex,
    pending_bond: &mut Option<Bond>,
) {
    if let Some(prev) = previous {
        let bond = pending_bond
            .take()
            .unwrap_or_else(|| default_bond(&graph[prev], &graph[node]));
        graph.add_edge(prev, node, bond);
    } else {
        *pending_bond = None;
    }
}

/// Scan an organic-subset atom at position `i`, preferring the two-letter
/// symbols `Cl` and `Br`. Returns the element, its aromaticity, and how
/// many characters were consumed.
fn scan_organic_atom(chars: &[char], i: usize) -> Option<(Element, bool, usize)> {
    let c = chars[i];
    if c.is_ascii_uppercase() {
        if let Some(&next) = chars.get(i + 1) {
            let two: String = [c, next].iter().collect();
            if matches!(two.as_str(), "Cl" | "Br") {
                return Element::from_symbol(&two).map(|e| (e, false, 2));
            }
        }
        let one = c.to_string();
        // Bare hydrogen must be bracketed in SMILES.
        if one == "H" {
            return None;
        }
        return Element::from_symbol(&one).map(|e| (e, false, 1));
    }
    if c.is_ascii_lowercase() {
        let upper = c.to_ascii_uppercase().to_string();
        return Element::from_symbol(&upper)
            .filter(|e| e.aromatic_form())
            .map(|e| (e, true, 1));
    }
    None
}

// Formal charges beyond this magnitude do not occur in real structures.
const MAX_CHARGE: i32 = 15;

/// Parse the body of a bracket atom: `isotope? symbol chirality? Hcount?
/// charge? (':' class)?`.
fn parse_bracket_atom(body: &str) -> std::result::Result<Atom, String> {
    let chars: Vec<char> = body.chars().collect();
    let mut i = 0;

    while i < chars.len() && chars[i].is_ascii_digit() {
        i += 1; // isotope, discarded
    }

    let (element, aromatic) = match chars.get(i) {
        Some(c) if c.is_ascii_uppercase() => {
            let mut symbol = c.to_string();
            if let Some(&next) = chars.get(i + 1) {
                if next.is_ascii_lowercase() && Element::from_symbol(&format!("{c}{next}")).is_some()
                {
                    symbol.push(next);
                }
            }
            i += symbol.len();
            (
                Element::from_symbol(&symbol).ok_or(format!("unknown element '{symbol}'"))?,
                false,
            )
        }
        Some(c) if c.is_ascii_lowercase() => {
            let element = Element::from_symbol(&c.to_ascii_uppercase().to_string())
                .filter(|e| e.aromatic_form())
                .ok_or(format!("'{c}' is not an aromatic element"))?;
            i += 1;
            (element, true)
        }
        _ => return Err("missing element symbol".to_string()),
    };

    let mut hydrogens: u8 = 0;
    let mut charge: i8 = 0;
    while i < chars.len() {
        match chars[i] {
            '@' => i += 1, // chirality, discarded
            'H' => {
                i += 1;
                let mut count = String::new();
                while i < chars.len() && chars[i].is_ascii_digit() {
                    count.push(chars[i]);
                    i += 1;
                }
                hydrogens = if count.is_empty() {
                    1
                } else {
                    count.parse().map_err(|_| "bad H count".to_string())?
                };
            }
            sign @ ('+' | '-') => {
                let unit: i32 = if sign == '+' { 1 } else { -1 };
                i += 1;
                let mut magnitude = String::new();
                while i < chars.len() && chars[i].is_ascii_digit() {
                    magnitude.push(chars[i]);
                    i += 1;
                }
                let total: i32 = if magnitude.is_empty() {
                    let mut total = unit;
                    while i < chars.len() && chars[i] == sign {
                        total += unit;
                        i += 1;
                        if total.abs() > MAX_CHARGE {
                            return Err(format!("charge {total:+} out of range"));
                        }
                    }
                    total
                } else {
                    unit * magnitude
                        .parse::<i32>()
                        .map_err(|_| "bad charge".to_string())?
                };
                if total.abs() > MAX_CHARGE {
                    return Err(format!("charge {total:+} out of range"));
                }
                charge = total as i8;
            }
            ':' => {
                i += 1;
                while i < chars.len() && chars[i].is_ascii_digit() {
                    i += 1; // atom class, discarded
                }
            }
            other => return Err(format!("unexpected '{other}'")),
        }
    }

    Ok(Atom {
        element,
        aromatic,
        charge,
        explicit_h: Some(hydrogens),
        implicit_h: 0,
    })
}

/// Fill in implicit hydrogen counts for unbracketed atoms from the
/// smallest standard valence that covers the incident bond orders.
fn assign_implicit_hydrogens(graph: &mut MoleculeGraph) {
    let nodes: Vec<NodeIndex> = graph.node_indices().collect();
    for node in nodes {
        if graph[node].explicit_h.is_some() {
            continue;
        }
        let bond_sum: f64 = graph.edges(node).map(|e| e.weight().order()).sum();
        let needed = bond_sum.ceil() as u8;
        let implicit = graph[node]
            .element
            .valences()
            .iter()
            .find(|&&v| v >= needed)
            .map(|&v| v - needed)
            .unwrap_or(0);
        graph[node].implicit_h = implicit;
    }
}
