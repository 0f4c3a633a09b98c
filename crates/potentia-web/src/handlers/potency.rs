//! The potency prediction endpoint: parse, descriptors, predict, depict,
//! resolve the name, assemble the response.

use axum::extract::State;
use axum::Json;
use potentia_common::error::ApiError;
use potentia_model::PotencyEstimate;
use potentia_molecules::depict::{render_svg, DEFAULT_SIZE};
use potentia_molecules::parse_smiles;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::state::SharedState;

#[derive(Debug, Deserialize)]
pub struct PotencyRequest {
    pub canonical_smile: String,
}

/// Field names mirror the original public API of this service verbatim,
/// spaces and casing included.
#[derive(Debug, Serialize)]
pub struct PotencyResponse {
    #[serde(rename = "Canonical Smile")]
    pub canonical_smile: String,
    #[serde(rename = "pIC50")]
    pub pic50: f64,
    /// Nanomolar IC50, rounded to two decimals.
    #[serde(rename = "IC50")]
    pub ic50: f64,
    #[serde(rename = "MW")]
    pub mw: f64,
    /// Rounded to a whole number and emitted as a JSON integer, as the
    /// original API did.
    #[serde(rename = "logP")]
    pub logp: i64,
    #[serde(rename = "HBD")]
    pub hbd: u32,
    #[serde(rename = "HBA")]
    pub hba: u32,
    pub inhibitor: &'static str,
    pub ispotent: bool,
    pub svg: String,
    pub iupac: Option<String>,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub async fn get_potency(
    State(state): State<SharedState>,
    Json(request): Json<PotencyRequest>,
) -> Result<Json<PotencyResponse>, ApiError> {
    let molecule = parse_smiles(&request.canonical_smile)?;

    let (features, descriptors) = state.pipeline.run(&molecule).await?;
    let pic50 = state.model.predict(&features)?;
    let estimate = PotencyEstimate::from_pic50(pic50);

    let svg = render_svg(&molecule, DEFAULT_SIZE, DEFAULT_SIZE)?;

    // Name resolution is best-effort: the prediction is still useful when
    // PubChem is down, so a failure degrades to a null name.
    let iupac = match state.resolver.iupac_name(molecule.smiles()).await {
        Ok(name) => Some(name),
        Err(e) => {
            warn!(error = %e, "IUPAC lookup failed, omitting name");
            None
        }
    };

    info!(
        smiles = molecule.smiles(),
        pic50,
        ic50_nm = estimate.ic50_nanomolar,
        classification = estimate.classification(),
        "potency predicted"
    );

    Ok(Json(PotencyResponse {
        canonical_smile: request.canonical_smile,
        pic50,
        ic50: round2(estimate.ic50_nanomolar),
        mw: round2(descriptors.mw),
        logp: descriptors.logp.round() as i64,
        hbd: descriptors.hbd,
        hba: descriptors.hba,
        inhibitor: estimate.classification(),
        ispotent: estimate.is_potent(),
        svg,
        iupac,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounding_matches_the_original_api() {
        assert_eq!(round2(1234.5678), 1234.57);
        assert_eq!(round2(180.158), 180.16);
        assert_eq!(2.7f64.round() as i64, 3);
        assert_eq!((-0.4f64).round() as i64, 0);
    }

    #[test]
    fn response_serializes_with_original_field_names() {
        let response = PotencyResponse {
            canonical_smile: "CCO".to_string(),
            pic50: 6.2,
            ic50: 630.96,
            mw: 46.07,
            logp: 0,
            hbd: 1,
            hba: 1,
            inhibitor: "Active",
            ispotent: true,
            svg: "<svg/>".to_string(),
            iupac: None,
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["Canonical Smile"], "CCO");
        assert_eq!(json["pIC50"], 6.2);
        assert_eq!(json["IC50"], 630.96);
        assert_eq!(json["inhibitor"], "Active");
        assert_eq!(json["ispotent"], true);
        assert!(json["iupac"].is_null());
        // logP is a bare integer on the wire, not 0.0.
        assert!(json["logP"].is_i64());
        assert!(serde_json::to_string(&response)
            .unwrap()
            .contains("\"logP\":0,"));
    }
}
