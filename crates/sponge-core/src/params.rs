//! Model constants and their validation.
//!
//! A [`ParameterSet`] is a plain value shared read-only by a whole run.
//! [`ParameterSet::validate`] checks six bounds and three stability
//! inequalities and reports every violation at once:
//!
//! ```text
//! 0 < p0 < 1        eps > 0           k >= 0
//! 0 <= alpha <= 1   0 <= eta <= 1     0 <= beta <= 1
//! alpha * eta > 1 - alpha     (healing outpaces entropy loss)
//! beta < alpha * eta          (leak is slower than healing)
//! p0 < (1 + eps) / 20         (expected defects stay below one per parent)
//! ```
//!
//! Non-finite values fail every check they take part in.

use serde::{Deserialize, Serialize};

/// Physical constants of the growth model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParameterSet {
    /// Base defect probability at level 0 with an empty healing reservoir.
    pub p0: f64,
    /// Geometric decay rate of the defect probability per level.
    pub eps: f64,
    /// Sensitivity of the defect probability to healing energy.
    pub k: f64,
    /// Share of the defect deficit routed into the healing reservoir.
    pub alpha: f64,
    /// Fraction of available healing energy that can be spent.
    pub eta: f64,
    /// Per-step leak rate from the healing reservoir into entropy.
    pub beta: f64,
}

impl Default for ParameterSet {
    /// `p0` is 0.05: the commonly quoted 0.10 fails `p0 < (1+eps)/20`
    /// at `eps = 0.30`.
    fn default() -> Self {
        Self {
            p0: 0.05,
            eps: 0.30,
            k: 2.00,
            alpha: 0.70,
            eta: 0.50,
            beta: 0.02,
        }
    }
}

/// One of the nine conditions a [`ParameterSet`] must satisfy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Constraint {
    /// `0 < p0 < 1`.
    P0Range,
    /// `eps > 0`.
    EpsPositive,
    /// `k >= 0`.
    KNonNegative,
    /// `0 <= alpha <= 1`.
    AlphaRange,
    /// `0 <= eta <= 1`.
    EtaRange,
    /// `0 <= beta <= 1`.
    BetaRange,
    /// `alpha * eta > 1 - alpha`.
    HealingOutpacesLoss,
    /// `beta < alpha * eta`.
    LeakBelowHealing,
    /// `p0 < (1 + eps) / 20`.
    DefectRateBelowGrowth,
}

impl Constraint {
    /// Every constraint, in the order they are checked.
    pub const ALL: [Self; 9] = [
        Self::P0Range,
        Self::EpsPositive,
        Self::KNonNegative,
        Self::AlphaRange,
        Self::EtaRange,
        Self::BetaRange,
        Self::HealingOutpacesLoss,
        Self::LeakBelowHealing,
        Self::DefectRateBelowGrowth,
    ];

    /// The constraint as a formula.
    pub const fn formula(self) -> &'static str {
        match self {
            Self::P0Range => "0 < p0 < 1",
            Self::EpsPositive => "eps > 0",
            Self::KNonNegative => "k >= 0",
            Self::AlphaRange => "0 <= alpha <= 1",
            Self::EtaRange => "0 <= eta <= 1",
            Self::BetaRange => "0 <= beta <= 1",
            Self::HealingOutpacesLoss => "alpha*eta > (1-alpha)",
            Self::LeakBelowHealing => "beta < alpha*eta",
            Self::DefectRateBelowGrowth => "p0 < (1+eps)/20",
        }
    }

    /// Whether `params` satisfies this constraint.
    #[allow(clippy::arithmetic_side_effects)]
    fn holds(self, params: &ParameterSet) -> bool {
        let ParameterSet {
            p0,
            eps,
            k,
            alpha,
            eta,
            beta,
        } = *params;
        match self {
            Self::P0Range => 0.0 < p0 && p0 < 1.0,
            Self::EpsPositive => eps > 0.0,
            Self::KNonNegative => k >= 0.0,
            Self::AlphaRange => (0.0..=1.0).contains(&alpha),
            Self::EtaRange => (0.0..=1.0).contains(&eta),
            Self::BetaRange => (0.0..=1.0).contains(&beta),
            Self::HealingOutpacesLoss => alpha * eta > 1.0 - alpha,
            Self::LeakBelowHealing => beta < alpha * eta,
            Self::DefectRateBelowGrowth => p0 < (1.0 + eps) / 20.0,
        }
    }

    /// The observed values relevant to this constraint, for error reports.
    #[allow(clippy::arithmetic_side_effects)]
    fn observed(self, params: &ParameterSet) -> String {
        let ParameterSet {
            p0,
            eps,
            k,
            alpha,
            eta,
            beta,
        } = *params;
        match self {
            Self::P0Range => format!("p0 = {p0}"),
            Self::EpsPositive => format!("eps = {eps}"),
            Self::KNonNegative => format!("k = {k}"),
            Self::AlphaRange => format!("alpha = {alpha}"),
            Self::EtaRange => format!("eta = {eta}"),
            Self::BetaRange => format!("beta = {beta}"),
            Self::HealingOutpacesLoss => {
                format!("alpha*eta = {}, 1-alpha = {}", alpha * eta, 1.0 - alpha)
            }
            Self::LeakBelowHealing => format!("beta = {beta}, alpha*eta = {}", alpha * eta),
            Self::DefectRateBelowGrowth => {
                format!("p0 = {p0}, (1+eps)/20 = {}", (1.0 + eps) / 20.0)
            }
        }
    }
}

impl core::fmt::Display for Constraint {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.formula())
    }
}

/// A failed constraint together with the values that failed it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConstraintViolation {
    /// The violated constraint.
    pub constraint: Constraint,
    /// The observed values, e.g. `"p0 = 1.5"`.
    pub observed: String,
}

impl core::fmt::Display for ConstraintViolation {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} ({})", self.constraint, self.observed)
    }
}

/// A parameter set failed validation.
///
/// Lists every violated constraint, not only the first.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid parameter set: {}", join_violations(.violations))]
pub struct ConfigurationError {
    /// Every violated constraint, in check order. Never empty.
    pub violations: Vec<ConstraintViolation>,
}

impl ConfigurationError {
    /// Whether `constraint` is among the violations.
    pub fn violates(&self, constraint: Constraint) -> bool {
        self.violations.iter().any(|v| v.constraint == constraint)
    }
}

fn join_violations(violations: &[ConstraintViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl ParameterSet {
    /// Check every bound and stability constraint.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigurationError`] listing all violated constraints.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        let violations: Vec<ConstraintViolation> = Constraint::ALL
            .into_iter()
            .filter(|c| !c.holds(self))
            .map(|constraint| ConstraintViolation {
                constraint,
                observed: constraint.observed(self),
            })
            .collect();

        if violations.is_empty() {
            Ok(())
        } else {
            Err(ConfigurationError { violations })
        }
    }

    /// Return a validated copy of `self`.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigurationError`] listing all violated constraints.
    pub fn validated(self) -> Result<Self, ConfigurationError> {
        self.validate().map(|()| self)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(ParameterSet::default().validate().is_ok());
    }

    #[test]
    fn default_values() {
        let p = ParameterSet::default();
        assert!((p.p0 - 0.05).abs() < f64::EPSILON);
        assert!((p.eps - 0.30).abs() < f64::EPSILON);
        assert!((p.k - 2.00).abs() < f64::EPSILON);
        assert!((p.alpha - 0.70).abs() < f64::EPSILON);
        assert!((p.eta - 0.50).abs() < f64::EPSILON);
        assert!((p.beta - 0.02).abs() < f64::EPSILON);
    }

    #[test]
    fn p0_of_one_tenth_breaks_growth_bound() {
        let p = ParameterSet {
            p0: 0.10,
            ..ParameterSet::default()
        };
        let err = p.validate().unwrap_err();
        assert_eq!(err.violations.len(), 1);
        assert!(err.violates(Constraint::DefectRateBelowGrowth));
    }

    #[test]
    fn p0_out_of_range_is_reported() {
        let p = ParameterSet {
            p0: 1.5,
            ..ParameterSet::default()
        };
        let err = p.validate().unwrap_err();
        assert!(err.violates(Constraint::P0Range));
        // 1.5 also breaks the growth-rate bound.
        assert!(err.violates(Constraint::DefectRateBelowGrowth));
        assert_eq!(err.violations.len(), 2);
    }

    #[test]
    fn every_violation_is_listed() {
        let p = ParameterSet {
            p0: 0.0,
            eps: -1.0,
            k: -1.0,
            alpha: 2.0,
            eta: -0.5,
            beta: 3.0,
        };
        let err = p.validate().unwrap_err();
        for constraint in [
            Constraint::P0Range,
            Constraint::EpsPositive,
            Constraint::KNonNegative,
            Constraint::AlphaRange,
            Constraint::EtaRange,
            Constraint::BetaRange,
            Constraint::LeakBelowHealing,
        ] {
            assert!(err.violates(constraint), "missing {constraint}");
        }
        let message = err.to_string();
        assert!(message.contains("eps > 0 (eps = -1)"));
        assert!(message.contains("0 <= beta <= 1"));
    }

    #[test]
    fn stability_constraints_are_checked_independently() {
        // alpha*eta = 0.25 < 1 - alpha = 0.5.
        let weak_healing = ParameterSet {
            alpha: 0.5,
            eta: 0.5,
            beta: 0.01,
            ..ParameterSet::default()
        };
        let err = weak_healing.validate().unwrap_err();
        assert_eq!(err.violations.len(), 1);
        assert!(err.violates(Constraint::HealingOutpacesLoss));

        // beta = 0.4 >= alpha*eta = 0.35.
        let leaky = ParameterSet {
            beta: 0.4,
            ..ParameterSet::default()
        };
        let err = leaky.validate().unwrap_err();
        assert_eq!(err.violations.len(), 1);
        assert!(err.violates(Constraint::LeakBelowHealing));

        // (1 + 0.3) / 20 = 0.065 <= 0.08.
        let defect_prone = ParameterSet {
            p0: 0.08,
            ..ParameterSet::default()
        };
        let err = defect_prone.validate().unwrap_err();
        assert_eq!(err.violations.len(), 1);
        assert!(err.violates(Constraint::DefectRateBelowGrowth));
    }

    #[test]
    fn nan_fails_its_checks() {
        let p = ParameterSet {
            eta: f64::NAN,
            ..ParameterSet::default()
        };
        let err = p.validate().unwrap_err();
        assert!(err.violates(Constraint::EtaRange));
        assert!(err.violates(Constraint::HealingOutpacesLoss));
        assert!(err.violates(Constraint::LeakBelowHealing));
    }

    #[test]
    fn validated_returns_self() {
        let p = ParameterSet::default();
        assert_eq!(p.validated().unwrap(), p);
    }

    #[test]
    fn deserializes_with_defaults_for_missing_fields() {
        let p: ParameterSet = serde_json::from_str(r#"{"p0": 0.05, "k": 1.0}"#).unwrap();
        assert!((p.p0 - 0.05).abs() < f64::EPSILON);
        assert!((p.k - 1.0).abs() < f64::EPSILON);
        assert!((p.alpha - 0.70).abs() < f64::EPSILON);
    }

    #[test]
    fn serializes_as_flat_mapping() {
        let json = serde_json::to_value(ParameterSet::default()).unwrap();
        let obj = json.as_object().unwrap();
        assert_eq!(obj.len(), 6);
        for key in ["p0", "eps", "k", "alpha", "eta", "beta"] {
            assert!(obj.contains_key(key), "missing {key}");
        }
    }
}
