//! Seed patterns for initializing cell state.

use serde::{Deserialize, Serialize};

/// Predefined patterns stamped into the current state buffer by `seed()`.
///
/// Every pattern writes a disk of the given radius; cells strictly outside
/// the radius are left untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeedPattern {
    /// Independent uniform values in [-1, 1] per active channel.
    #[default]
    Random,
    /// Radial linear falloff `1 - distance/radius`, replicated across
    /// active channels.
    Center,
    /// Peak at 0.7 * radius, linear falloff over a band 0.3 * radius wide.
    Ring,
    /// Channel 0 = cos(angle), channel 1 = sin(angle) of the cell-to-center
    /// direction; channels 2-3 zero.
    Gradient,
}

impl SeedPattern {
    /// All patterns, used when reset() randomizes the seed pattern.
    pub const ALL: [SeedPattern; 4] = [
        SeedPattern::Random,
        SeedPattern::Center,
        SeedPattern::Ring,
        SeedPattern::Gradient,
    ];

    /// Parse a pattern name. Unknown names fall back to Random, logged at
    /// warn level.
    pub fn from_name(name: &str) -> Self {
        match name {
            "random" => Self::Random,
            "center" => Self::Center,
            "ring" => Self::Ring,
            "gradient" => Self::Gradient,
            other => {
                log::warn!("Unknown seed pattern '{other}', falling back to random");
                Self::Random
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Random => "random",
            Self::Center => "center",
            Self::Ring => "ring",
            Self::Gradient => "gradient",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_name() {
        assert_eq!(SeedPattern::from_name("ring"), SeedPattern::Ring);
        assert_eq!(SeedPattern::from_name("blob"), SeedPattern::Random);
    }

    #[test]
    fn test_name_round_trip() {
        for pattern in SeedPattern::ALL {
            assert_eq!(SeedPattern::from_name(pattern.name()), pattern);
        }
    }
}
