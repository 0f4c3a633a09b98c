//! Orchestrator for the descriptor stage: Lipinski values in-process,
//! fingerprints from the external tool, merged into the canonical
//! feature order.

use potentia_common::config::PadelConfig;
use potentia_common::error::Result;
use potentia_common::features::FeatureVector;
use tracing::debug;

use crate::features::assemble;
use crate::lipinski::{lipinski, LipinskiDescriptors};
use crate::padel::PadelRunner;
use crate::smiles::Molecule;

pub struct DescriptorPipeline {
    padel: PadelRunner,
}

impl DescriptorPipeline {
    pub fn new(config: &PadelConfig) -> Self {
        Self {
            padel: PadelRunner::new(config),
        }
    }

    /// Compute the full feature vector for an already-parsed molecule.
    ///
    /// Parsing happens before this stage; an unparseable SMILES never
    /// reaches the external tool.
    pub async fn run(&self, molecule: &Molecule) -> Result<(FeatureVector, LipinskiDescriptors)> {
        let descriptors = lipinski(molecule);
        debug!(
            mw = descriptors.mw,
            logp = descriptors.logp,
            hbd = descriptors.hbd,
            hba = descriptors.hba,
            ro5_violations = descriptors.ro5_violations(),
            "computed Lipinski descriptors"
        );

        let fingerprints = self.padel.run(molecule.smiles()).await?;
        let features = assemble(&fingerprints, &descriptors)?;
        Ok((features, descriptors))
    }
}

#[cfg(test)]
#[cfg(unix)]
mod tests {
    use super::*;
    use crate::features::MODEL_FEATURES;
    use crate::smiles::parse_smiles;
    use std::os::unix::fs::PermissionsExt;
    use std::path::PathBuf;

    /// Stub tool emitting every fingerprint column the schema needs.
    fn full_stub(dir: &std::path::Path) -> PathBuf {
        let header: Vec<&str> = MODEL_FEATURES
            .iter()
            .filter(|n| n.starts_with("PubchemFP"))
            .copied()
            .collect();
        let values = vec!["1"; header.len()];
        let body = format!(
            "#!/bin/sh\nout=\"\"\nwhile [ $# -gt 0 ]; do\n  case \"$1\" in\n    -file) out=\"$2\"; shift 2 ;;\n    *) shift ;;\n  esac\ndone\necho 'Name,{}' > \"$out\"\necho 'MOL,{}' >> \"$out\"\n",
            header.join(","),
            values.join(",")
        );
        let path = dir.join("fake-padel");
        std::fs::write(&path, body).unwrap();
        let mut perms = std::fs::metadata(&path).unwrap().permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&path, perms).unwrap();
        path
    }

    #[tokio::test]
    async fn produces_full_schema_for_valid_molecule() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = DescriptorPipeline::new(&PadelConfig {
            java_bin: full_stub(dir.path()),
            jar_path: PathBuf::from("unused.jar"),
            descriptor_types_path: PathBuf::from("unused.xml"),
            timeout_secs: 10,
        });

        let molecule = parse_smiles("CC(=O)Oc1ccccc1C(=O)O").unwrap();
        let (features, descriptors) = pipeline.run(&molecule).await.unwrap();

        assert_eq!(features.len(), MODEL_FEATURES.len());
        assert_eq!(
            features.names().iter().map(String::as_str).collect::<Vec<_>>(),
            MODEL_FEATURES.to_vec()
        );
        assert!((descriptors.mw - 180.16).abs() < 0.5);
        // The last four values are the Lipinski columns in schema order.
        let tail = &features.values()[MODEL_FEATURES.len() - 4..];
        assert_eq!(tail[0], descriptors.mw);
        assert_eq!(tail[1], descriptors.logp);
        assert_eq!(tail[2], descriptors.hba as f64);
        assert_eq!(tail[3], descriptors.hbd as f64);
    }
}
