//! The canonical feature schema the predictor was trained on.
//!
//! One ordered list, consumed by both the assembler here and the model's
//! schema validation, so the two can never drift apart silently.

use potentia_common::error::{PotencyError, Result};
use potentia_common::features::FeatureVector;

use crate::lipinski::LipinskiDescriptors;
use crate::padel::FingerprintRecord;

/// Column order expected by the pretrained model: 124 PubChem fingerprint
/// bits followed by the four Lipinski descriptors.
pub const MODEL_FEATURES: [&str; 128] = [
    "PubchemFP12",
    "PubchemFP19",
    "PubchemFP20",
    "PubchemFP143",
    "PubchemFP146",
    "PubchemFP186",
    "PubchemFP187",
    "PubchemFP188",
    "PubchemFP192",
    "PubchemFP258",
    "PubchemFP259",
    "PubchemFP308",
    "PubchemFP338",
    "PubchemFP341",
    "PubchemFP345",
    "PubchemFP346",
    "PubchemFP357",
    "PubchemFP359",
    "PubchemFP365",
    "PubchemFP366",
    "PubchemFP372",
    "PubchemFP373",
    "PubchemFP374",
    "PubchemFP377",
    "PubchemFP378",
    "PubchemFP380",
    "PubchemFP381",
    "PubchemFP382",
    "PubchemFP385",
    "PubchemFP386",
    "PubchemFP388",
    "PubchemFP389",
    "PubchemFP391",
    "PubchemFP392",
    "PubchemFP405",
    "PubchemFP406",
    "PubchemFP420",
    "PubchemFP431",
    "PubchemFP435",
    "PubchemFP437",
    "PubchemFP438",
    "PubchemFP439",
    "PubchemFP440",
    "PubchemFP443",
    "PubchemFP445",
    "PubchemFP447",
    "PubchemFP451",
    "PubchemFP452",
    "PubchemFP476",
    "PubchemFP485",
    "PubchemFP491",
    "PubchemFP493",
    "PubchemFP498",
    "PubchemFP499",
    "PubchemFP502",
    "PubchemFP521",
    "PubchemFP528",
    "PubchemFP535",
    "PubchemFP536",
    "PubchemFP539",
    "PubchemFP540",
    "PubchemFP541",
    "PubchemFP542",
    "PubchemFP546",
    "PubchemFP547",
    "PubchemFP548",
    "PubchemFP553",
    "PubchemFP565",
    "PubchemFP566",
    "PubchemFP569",
    "PubchemFP572",
    "PubchemFP573",
    "PubchemFP574",
    "PubchemFP576",
    "PubchemFP577",
    "PubchemFP579",
    "PubchemFP589",
    "PubchemFP594",
    "PubchemFP597",
    "PubchemFP600",
    "PubchemFP602",
    "PubchemFP604",
    "PubchemFP606",
    "PubchemFP611",
    "PubchemFP614",
    "PubchemFP617",
    "PubchemFP619",
    "PubchemFP623",
    "PubchemFP626",
    "PubchemFP637",
    "PubchemFP638",
    "PubchemFP641",
    "PubchemFP643",
    "PubchemFP645",
    "PubchemFP646",
    "PubchemFP651",
    "PubchemFP655",
    "PubchemFP656",
    "PubchemFP659",
    "PubchemFP666",
    "PubchemFP671",
    "PubchemFP672",
    "PubchemFP680",
    "PubchemFP682",
    "PubchemFP684",
    "PubchemFP685",
    "PubchemFP689",
    "PubchemFP690",
    "PubchemFP691",
    "PubchemFP692",
    "PubchemFP693",
    "PubchemFP694",
    "PubchemFP695",
    "PubchemFP696",
    "PubchemFP697",
    "PubchemFP698",
    "PubchemFP699",
    "PubchemFP704",
    "PubchemFP707",
    "PubchemFP712",
    "PubchemFP716",
    "PubchemFP758",
    "PubchemFP779",
    "PubchemFP821",
    "MW",
    "logP",
    "HBA",
    "HBD",
];

/// Merge the external fingerprint columns with the in-process Lipinski
/// values into the canonical column order.
///
/// A fingerprint bit the tool did not report is a malformed-output error,
/// not a zero: the fingerprinter always emits the full bit set, so a
/// missing column means we are not looking at the output we expect.
pub fn assemble(
    fingerprints: &FingerprintRecord,
    descriptors: &LipinskiDescriptors,
) -> Result<FeatureVector> {
    let mut values = Vec::with_capacity(MODEL_FEATURES.len());
    for &name in MODEL_FEATURES.iter() {
        let value = match name {
            "MW" => descriptors.mw,
            "logP" => descriptors.logp,
            "HBA" => descriptors.hba as f64,
            "HBD" => descriptors.hbd as f64,
            _ => fingerprints.get(name).ok_or_else(|| {
                PotencyError::DescriptorComputationFailed(format!(
                    "fingerprint output is missing column {name}"
                ))
            })?,
        };
        values.push(value);
    }

    FeatureVector::new(
        MODEL_FEATURES.iter().map(|s| s.to_string()).collect(),
        values,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_record() -> FingerprintRecord {
        FingerprintRecord::from_columns(
            MODEL_FEATURES
                .iter()
                .filter(|name| name.starts_with("PubchemFP"))
                .map(|name| (name.to_string(), 1.0))
                .collect(),
        )
    }

    fn descriptors() -> LipinskiDescriptors {
        LipinskiDescriptors {
            mw: 180.16,
            logp: 1.3,
            hbd: 1,
            hba: 4,
        }
    }

    #[test]
    fn assembled_vector_matches_schema_order() {
        let fv = assemble(&full_record(), &descriptors()).unwrap();
        assert_eq!(fv.len(), MODEL_FEATURES.len());
        assert_eq!(fv.names()[0], "PubchemFP12");
        assert_eq!(fv.names()[MODEL_FEATURES.len() - 4..], ["MW", "logP", "HBA", "HBD"]);
        assert_eq!(fv.values()[MODEL_FEATURES.len() - 4], 180.16);
        assert_eq!(*fv.values().last().unwrap(), 1.0);
    }

    #[test]
    fn extra_tool_columns_are_ignored() {
        let mut columns: Vec<(String, f64)> = MODEL_FEATURES
            .iter()
            .filter(|name| name.starts_with("PubchemFP"))
            .map(|name| (name.to_string(), 0.0))
            .collect();
        columns.push(("PubchemFP999".to_string(), 1.0));
        let record = FingerprintRecord::from_columns(columns);

        let fv = assemble(&record, &descriptors()).unwrap();
        assert_eq!(fv.len(), MODEL_FEATURES.len());
        assert!(!fv.names().iter().any(|n| n == "PubchemFP999"));
    }

    #[test]
    fn missing_fingerprint_column_is_an_error() {
        let record = FingerprintRecord::from_columns(vec![("PubchemFP12".to_string(), 1.0)]);
        let err = assemble(&record, &descriptors()).unwrap_err();
        assert!(matches!(err, PotencyError::DescriptorComputationFailed(_)));
    }
}
