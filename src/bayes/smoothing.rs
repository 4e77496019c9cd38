use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Deserialize};

use crate::error::{ClassifierError, Result};

/// Additive smoothing constant `beta` for the multinomial estimates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Smoothing {
    /// `beta = 1 / V`.
    #[default]
    InverseVocabulary,
    /// A fixed positive `beta`.
    Explicit(f64),
}

impl Smoothing {
    /// Resolves `beta` for a vocabulary of `vocabulary_size` terms.
    pub fn beta(&self, vocabulary_size: usize) -> Result<f64> {
        let beta = match *self {
            Smoothing::InverseVocabulary => {
                if vocabulary_size == 0 {
                    return Err(ClassifierError::invalid_hyperparameter("vocabulary is empty"));
                }
                1.0 / vocabulary_size as f64
            }
            Smoothing::Explicit(beta) => beta,
        };
        if !beta.is_finite() || beta <= 0.0 {
            return Err(ClassifierError::invalid_hyperparameter(format!("beta must be positive, got {beta}")));
        }
        Ok(beta)
    }
}

/// Accepts `default` (meaning `1/V`) or a positive number.
impl FromStr for Smoothing {
    type Err = ClassifierError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("default") {
            return Ok(Smoothing::InverseVocabulary);
        }
        let beta: f64 = s.parse().map_err(|_| {
            ClassifierError::invalid_hyperparameter(format!("beta '{s}' is neither 'default' nor a number"))
        })?;
        let smoothing = Smoothing::Explicit(beta);
        smoothing.beta(1)?;
        Ok(smoothing)
    }
}

impl fmt::Display for Smoothing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Smoothing::InverseVocabulary => write!(f, "default"),
            Smoothing::Explicit(beta) => write!(f, "{beta}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_resolves_to_inverse_vocabulary() {
        let s: Smoothing = "default".parse().unwrap();
        assert_eq!(s, Smoothing::InverseVocabulary);
        assert_eq!(s.beta(4).unwrap(), 0.25);
    }

    #[test]
    fn explicit_values_parse() {
        let s: Smoothing = "0.5".parse().unwrap();
        assert_eq!(s.beta(1000).unwrap(), 0.5);
        assert_eq!(s.to_string(), "0.5");
    }

    #[test]
    fn non_positive_beta_is_rejected() {
        assert!("0".parse::<Smoothing>().is_err());
        assert!("-1".parse::<Smoothing>().is_err());
        assert!("abc".parse::<Smoothing>().is_err());
        assert!(Smoothing::InverseVocabulary.beta(0).is_err());
    }
}
