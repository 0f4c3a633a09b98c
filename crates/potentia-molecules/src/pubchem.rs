//! IUPAC name resolution against the PubChem PUG REST service.

use std::time::Duration;

use potentia_common::config::PubchemConfig;
use potentia_common::error::{PotencyError, Result};
use serde::Deserialize;
use tracing::debug;

/// Client for looking up a compound's IUPAC name by SMILES.
///
/// This is a fallible external dependency: callers decide whether a
/// failure degrades (the potency handler omits the name) or propagates.
pub struct NameResolver {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Deserialize)]
struct PropertyResponse {
    #[serde(rename = "PropertyTable")]
    property_table: PropertyTable,
}

#[derive(Deserialize)]
struct PropertyTable {
    #[serde(rename = "Properties")]
    properties: Vec<CompoundProperties>,
}

#[derive(Deserialize)]
struct CompoundProperties {
    #[serde(rename = "IUPACName")]
    iupac_name: Option<String>,
}

impl NameResolver {
    pub fn new(config: &PubchemConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Resolve the IUPAC name for a SMILES string.
    ///
    /// Service errors, an empty match list, and a match without a name
    /// all surface as `NameResolutionFailed`.
    pub async fn iupac_name(&self, smiles: &str) -> Result<String> {
        let url = format!(
            "{}/compound/smiles/property/IUPACName/JSON",
            self.base_url
        );
        debug!(smiles, "resolving IUPAC name via PubChem");

        let response = self
            .client
            .get(&url)
            .query(&[("smiles", smiles)])
            .send()
            .await
            .map_err(|e| PotencyError::NameResolutionFailed(format!("request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(PotencyError::NameResolutionFailed(format!(
                "PubChem returned HTTP {}",
                response.status()
            )));
        }

        let body: PropertyResponse = response
            .json()
            .await
            .map_err(|e| PotencyError::NameResolutionFailed(format!("malformed response: {e}")))?;

        body.property_table
            .properties
            .into_iter()
            .next()
            .and_then(|p| p.iupac_name)
            .ok_or_else(|| {
                PotencyError::NameResolutionFailed("no match for compound".to_string())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver(base_url: &str) -> NameResolver {
        NameResolver::new(&PubchemConfig {
            base_url: base_url.to_string(),
            timeout_secs: 1,
        })
        .unwrap()
    }

    #[test]
    fn trims_trailing_slash() {
        let r = resolver("https://example.org/rest/pug/");
        assert_eq!(r.base_url, "https://example.org/rest/pug");
    }

    #[tokio::test]
    async fn unreachable_service_is_name_resolution_failure() {
        // Nothing listens on this port; the request fails fast.
        let r = resolver("http://127.0.0.1:9");
        let err = r.iupac_name("CCO").await.unwrap_err();
        assert!(matches!(err, PotencyError::NameResolutionFailed(_)));
    }

    #[test]
    fn parses_property_table_shape() {
        let body = r#"{"PropertyTable":{"Properties":[{"CID":702,"IUPACName":"ethanol"}]}}"#;
        let parsed: PropertyResponse = serde_json::from_str(body).unwrap();
        assert_eq!(
            parsed.property_table.properties[0].iupac_name.as_deref(),
            Some("ethanol")
        );
    }
}
