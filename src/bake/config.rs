use std::fmt;
use std::str::FromStr;

use super::BakeError;

/// How corner normals are combined into one normal per vertex.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Strategy {
    /// Mean of the corner normals, unit length.
    Average,
    /// The mesh's own smoothed vertex normals, unit length.
    VertexNormals,
    /// Pairwise plane-intersection fusion of the corner normals.
    Cross { normalize_distance: bool },
    /// Smoothed vertex normals, lengthened by the angle-weighted mean of
    /// `1/cos` between the vertex normal and each incident face normal.
    AngleWeight,
}

impl Strategy {
    pub const NAMES: [&'static str; 4] = ["average", "vertex-normals", "cross", "angle-weight"];
}

impl FromStr for Strategy {
    type Err = BakeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "average" => Ok(Self::Average),
            "vertex-normals" => Ok(Self::VertexNormals),
            "cross" => Ok(Self::Cross {
                normalize_distance: false,
            }),
            "angle-weight" => Ok(Self::AngleWeight),
            _ => Err(BakeError::UnsupportedStrategy(s.to_string())),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Average => "average",
            Self::VertexNormals => "vertex-normals",
            Self::Cross { .. } => "cross",
            Self::AngleWeight => "angle-weight",
        };
        f.write_str(name)
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BakeConfig {
    pub strategy: Strategy,
    /// Overrides the other length options and writes 1 everywhere.
    pub force_unit_length: bool,
    pub length_limit: f32,
    /// Rescale lengths so the longest vertex normal is exactly 1.
    pub normalize_to_max: bool,
}

impl Default for BakeConfig {
    fn default() -> Self {
        Self {
            strategy: Strategy::AngleWeight,
            force_unit_length: false,
            length_limit: 2.0,
            normalize_to_max: true,
        }
    }
}

impl BakeConfig {
    pub fn new(strategy: Strategy) -> Self {
        Self {
            strategy,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), BakeError> {
        // also rejects NaN
        if !(self.length_limit >= 0.0) {
            return Err(BakeError::InvalidLengthLimit(self.length_limit));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_names_round_trip() {
        for name in Strategy::NAMES {
            let strategy: Strategy = name.parse().unwrap();
            assert_eq!(strategy.to_string(), name);
        }
    }

    #[test]
    fn test_strategy_parse_is_case_insensitive() {
        assert_eq!("Angle-Weight".parse::<Strategy>().unwrap(), Strategy::AngleWeight);
    }

    #[test]
    fn test_unsupported_strategy() {
        let result = "laplacian".parse::<Strategy>();
        assert_eq!(
            result,
            Err(BakeError::UnsupportedStrategy("laplacian".to_string()))
        );
        if let Err(e) = result {
            assert!(e.to_string().contains("unsupported strategy"));
        }
    }

    #[test]
    fn test_length_limit_validation() {
        let mut config = BakeConfig::default();
        assert!(config.validate().is_ok());

        config.length_limit = 0.0;
        assert!(config.validate().is_ok());

        config.length_limit = -1.0;
        assert_eq!(config.validate(), Err(BakeError::InvalidLengthLimit(-1.0)));

        config.length_limit = f32::NAN;
        assert!(config.validate().is_err());
    }
}
