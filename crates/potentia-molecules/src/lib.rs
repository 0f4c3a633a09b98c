//! potentia-molecules — Chemistry domain for the potency predictor.
//!
//! SMILES parsing into a molecular graph, Lipinski descriptor estimates,
//! 2D SVG depiction, the external fingerprinting pipeline, the canonical
//! feature schema, and PubChem name resolution.

pub mod depict;
pub mod features;
pub mod lipinski;
pub mod padel;
pub mod pipeline;
pub mod pubchem;
pub mod smiles;

pub use lipinski::LipinskiDescriptors;
pub use padel::{FingerprintRecord, PadelRunner};
pub use pipeline::DescriptorPipeline;
pub use pubchem::NameResolver;
pub use smiles::{parse_smiles, Molecule};
