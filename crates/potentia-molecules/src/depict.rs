//! 2D depiction of a parsed molecule as SVG markup.
//!
//! Deterministic layout: atoms seeded on a circle in graph order, then
//! relaxed with a small force model (springs along bonds, pairwise
//! repulsion) and scaled into the viewport. Heteroatoms get element
//! labels in conventional colors; carbons stay bare, skeletal style.

use std::fmt::Write;

use petgraph::visit::EdgeRef;
use potentia_common::error::{PotencyError, Result};

use crate::smiles::{Bond, Element, Molecule};

pub const DEFAULT_SIZE: u32 = 300;

const RELAXATION_ROUNDS: usize = 200;
const IDEAL_BOND_LENGTH: f64 = 1.0;
const MARGIN: f64 = 24.0;

/// Render a molecule into an SVG document of the given pixel size.
pub fn render_svg(molecule: &Molecule, width: u32, height: u32) -> Result<String> {
    let graph = molecule.graph();
    let n = graph.node_count();
    if n == 0 {
        return Err(PotencyError::DepictionFailed(
            "molecule has no atoms".to_string(),
        ));
    }

    let positions = layout(molecule);
    let (positions, label_radius) = fit_to_viewport(positions, width as f64, height as f64);

    // Writes to a String are infallible; the results are discarded.
    let mut svg = String::new();
    let _ = write!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}">"#
    );
    let _ = write!(
        svg,
        r#"<rect width="{width}" height="{height}" fill="white"/>"#
    );

    for edge in graph.edge_references() {
        let (x1, y1) = positions[edge.source().index()];
        let (x2, y2) = positions[edge.target().index()];
        draw_bond(&mut svg, *edge.weight(), x1, y1, x2, y2);
    }

    for node in graph.node_indices() {
        let atom = &graph[node];
        if atom.element == Element::C && atom.charge == 0 {
            continue;
        }
        let (x, y) = positions[node.index()];
        let label = atom_label(atom.element, atom.hydrogens(), atom.charge);
        let color = element_color(atom.element);
        let _ = write!(
            svg,
            r#"<circle cx="{x:.1}" cy="{y:.1}" r="{label_radius:.1}" fill="white"/>"#
        );
        let _ = write!(
            svg,
            r#"<text x="{x:.1}" y="{y:.1}" fill="{color}" font-family="sans-serif" font-size="14" text-anchor="middle" dominant-baseline="central">{label}</text>"#
        );
    }

    svg.push_str("</svg>");
    Ok(svg)
}

/// Circle seed plus force relaxation. Deterministic for a given graph.
fn layout(molecule: &Molecule) -> Vec<(f64, f64)> {
    let graph = molecule.graph();
    let n = graph.node_count();
    let radius = (n as f64).sqrt().max(1.0);

    let mut pos: Vec<(f64, f64)> = (0..n)
        .map(|i| {
            let angle = 2.0 * std::f64::consts::PI * i as f64 / n as f64;
            (radius * angle.cos(), radius * angle.sin())
        })
        .collect();

    if n == 1 {
        return pos;
    }

    for round in 0..RELAXATION_ROUNDS {
        let step = 0.1 * (1.0 - round as f64 / RELAXATION_ROUNDS as f64) + 0.01;
        let mut force = vec![(0.0f64, 0.0f64); n];

        for i in 0..n {
            for j in (i + 1)..n {
                let dx = pos[j].0 - pos[i].0;
                let dy = pos[j].1 - pos[i].1;
                let dist_sq = (dx * dx + dy * dy).max(1e-4);
                let dist = dist_sq.sqrt();
                // Repulsion falls off with squared distance.
                let push = 0.4 / dist_sq;
                force[i].0 -= push * dx / dist;
                force[i].1 -= push * dy / dist;
                force[j].0 += push * dx / dist;
                force[j].1 += push * dy / dist;
            }
        }

        for edge in graph.edge_references() {
            let a = edge.source().index();
            let b = edge.target().index();
            let dx = pos[b].0 - pos[a].0;
            let dy = pos[b].1 - pos[a].1;
            let dist = (dx * dx + dy * dy).sqrt().max(1e-4);
            let pull = dist - IDEAL_BOND_LENGTH;
            force[a].0 += pull * dx / dist;
            force[a].1 += pull * dy / dist;
            force[b].0 -= pull * dx / dist;
            force[b].1 -= pull * dy / dist;
        }

        for i in 0..n {
            pos[i].0 += step * force[i].0;
            pos[i].1 += step * force[i].1;
        }
    }

    pos
}

/// Scale abstract coordinates into pixel space with a margin. Returns the
/// pixel positions and a backdrop radius for atom labels.
fn fit_to_viewport(pos: Vec<(f64, f64)>, width: f64, height: f64) -> (Vec<(f64, f64)>, f64) {
    let min_x = pos.iter().map(|p| p.0).fold(f64::INFINITY, f64::min);
    let max_x = pos.iter().map(|p| p.0).fold(f64::NEG_INFINITY, f64::max);
    let min_y = pos.iter().map(|p| p.1).fold(f64::INFINITY, f64::min);
    let max_y = pos.iter().map(|p| p.1).fold(f64::NEG_INFINITY, f64::max);

    let span_x = (max_x - min_x).max(1e-6);
    let span_y = (max_y - min_y).max(1e-6);
    let scale = ((width - 2.0 * MARGIN) / span_x).min((height - 2.0 * MARGIN) / span_y);

    let offset_x = (width - span_x * scale) / 2.0;
    let offset_y = (height - span_y * scale) / 2.0;

    let fitted = pos
        .into_iter()
        .map(|(x, y)| {
            (
                (x - min_x) * scale + offset_x,
                (y - min_y) * scale + offset_y,
            )
        })
        .collect();

    let label_radius = (scale * 0.35).clamp(7.0, 12.0);
    (fitted, label_radius)
}

fn draw_bond(svg: &mut String, bond: Bond, x1: f64, y1: f64, x2: f64, y2: f64) {
    let dx = x2 - x1;
    let dy = y2 - y1;
    let len = (dx * dx + dy * dy).sqrt().max(1e-6);
    // Unit normal, for the parallel strokes of multiple bonds.
    let nx = -dy / len;
    let ny = dx / len;

    let strokes: &[(f64, &str)] = match bond {
        Bond::Single => &[(0.0, "")],
        Bond::Double => &[(-2.2, ""), (2.2, "")],
        Bond::Triple => &[(-3.0, ""), (0.0, ""), (3.0, "")],
        Bond::Aromatic => &[(-2.2, ""), (2.2, r#" stroke-dasharray="4 3""#)],
    };

    for (offset, extra) in strokes {
        let _ = write!(
            svg,
            r#"<line x1="{:.1}" y1="{:.1}" x2="{:.1}" y2="{:.1}" stroke="black" stroke-width="1.6"{extra}/>"#,
            x1 + nx * offset,
            y1 + ny * offset,
            x2 + nx * offset,
            y2 + ny * offset,
        );
    }
}

fn atom_label(element: Element, hydrogens: u8, charge: i8) -> String {
    let mut label = element.symbol().to_string();
    match hydrogens {
        0 => {}
        1 => label.push('H'),
        n => {
            label.push('H');
            label.push_str(&n.to_string());
        }
    }
    match charge {
        0 => {}
        1 => label.push('+'),
        -1 => label.push('-'),
        c if c > 0 => label.push_str(&format!("{c}+")),
        c => label.push_str(&format!("{}-", -c)),
    }
    label
}

fn element_color(element: Element) -> &'static str {
    match element {
        Element::O => "red",
        Element::N => "blue",
        Element::S => "goldenrod",
        Element::P => "darkorange",
        Element::F => "teal",
        Element::Cl => "darkgreen",
        Element::Br => "brown",
        Element::I => "purple",
        Element::B => "salmon",
        Element::C | Element::H => "black",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::smiles::parse_smiles;

    #[test]
    fn ethanol_svg_has_markup() {
        let mol = parse_smiles("CCO").unwrap();
        let svg = render_svg(&mol, DEFAULT_SIZE, DEFAULT_SIZE).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("</svg>"));
        assert!(svg.contains("width=\"300\""));
        // Oxygen gets a label; carbons stay bare.
        assert!(svg.contains(">OH</text>"));
    }

    #[test]
    fn depiction_is_deterministic() {
        let mol = parse_smiles("CC(=O)Oc1ccccc1C(=O)O").unwrap();
        let a = render_svg(&mol, DEFAULT_SIZE, DEFAULT_SIZE).unwrap();
        let b = render_svg(&mol, DEFAULT_SIZE, DEFAULT_SIZE).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn single_atom_renders() {
        let mol = parse_smiles("O").unwrap();
        let svg = render_svg(&mol, DEFAULT_SIZE, DEFAULT_SIZE).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("H2O") || svg.contains("OH2"));
    }

    #[test]
    fn charge_labels() {
        assert_eq!(atom_label(Element::O, 0, -1), "O-");
        assert_eq!(atom_label(Element::N, 3, 1), "NH3+");
        assert_eq!(atom_label(Element::N, 0, 0), "N");
    }
}
