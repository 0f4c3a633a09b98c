//! Potency metrics derived from a pIC50 prediction. Pure math.

use serde::Serialize;

/// Nanomolar IC50 at or below this is classified "Active".
pub const ACTIVE_THRESHOLD_NM: f64 = 1000.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PotencyEstimate {
    /// Negative log10 of the molar IC50, straight from the model.
    pub pic50: f64,
    /// IC50 in mol/L: 10^(-pIC50).
    pub ic50_molar: f64,
    /// IC50 in nmol/L.
    pub ic50_nanomolar: f64,
}

impl PotencyEstimate {
    pub fn from_pic50(pic50: f64) -> Self {
        Self {
            pic50,
            ic50_molar: 10f64.powf(-pic50),
            // One power instead of powf(-pic50) * 1e9, so the nanomolar
            // value is exact at integer pIC50 and the 1000 nM boundary
            // classifies consistently.
            ic50_nanomolar: 10f64.powf(9.0 - pic50),
        }
    }

    pub fn is_potent(&self) -> bool {
        self.ic50_nanomolar <= ACTIVE_THRESHOLD_NM
    }

    pub fn classification(&self) -> &'static str {
        if self.is_potent() {
            "Active"
        } else {
            "Inactive"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pic50_six_is_the_active_boundary() {
        let estimate = PotencyEstimate::from_pic50(6.0);
        assert_eq!(estimate.ic50_nanomolar, 1000.0);
        assert!(estimate.is_potent());
        assert_eq!(estimate.classification(), "Active");
    }

    #[test]
    fn pic50_five_is_inactive() {
        let estimate = PotencyEstimate::from_pic50(5.0);
        assert_eq!(estimate.ic50_nanomolar, 10000.0);
        assert!(!estimate.is_potent());
        assert_eq!(estimate.classification(), "Inactive");
    }

    #[test]
    fn higher_pic50_means_lower_ic50() {
        let weak = PotencyEstimate::from_pic50(4.0);
        let strong = PotencyEstimate::from_pic50(8.0);
        assert!(strong.ic50_nanomolar < weak.ic50_nanomolar);
        assert!(strong.is_potent());
        assert!(!weak.is_potent());
    }

    #[test]
    fn classification_mirrors_ispotent() {
        for pic50 in [3.0, 5.999, 6.0, 6.001, 9.0] {
            let e = PotencyEstimate::from_pic50(pic50);
            assert_eq!(e.is_potent(), e.classification() == "Active");
        }
    }
}
