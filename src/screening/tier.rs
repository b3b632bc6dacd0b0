use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const STRONG_THRESHOLD: f64 = 60.0;
const MODERATE_THRESHOLD: f64 = 35.0;
const WEAK_THRESHOLD: f64 = 15.0;

/// Screening tier derived from a percentage score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Strong,
    Moderate,
    Weak,
    NoSignal,
}

impl Tier {
    pub const ALL: [Tier; 4] = [Tier::Strong, Tier::Moderate, Tier::Weak, Tier::NoSignal];

    /// strong (>=60), moderate (>=35), weak (>=15), otherwise no_signal.
    /// Each lower bound is inclusive.
    pub fn classify(pct: f64) -> Tier {
        if pct >= STRONG_THRESHOLD {
            Tier::Strong
        } else if pct >= MODERATE_THRESHOLD {
            Tier::Moderate
        } else if pct >= WEAK_THRESHOLD {
            Tier::Weak
        } else {
            Tier::NoSignal
        }
    }

    /// Higher is better
    pub fn rank(self) -> u8 {
        match self {
            Tier::Strong => 3,
            Tier::Moderate => 2,
            Tier::Weak => 1,
            Tier::NoSignal => 0,
        }
    }

    /// Whether this tier is at least as good as `min`. No minimum admits everything.
    pub fn meets(self, min: Option<Tier>) -> bool {
        min.map_or(true, |min| self.rank() >= min.rank())
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Tier::Strong => "strong",
            Tier::Moderate => "moderate",
            Tier::Weak => "weak",
            Tier::NoSignal => "no_signal",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        Tier::ALL
            .into_iter()
            .find(|tier| tier.as_str() == normalized)
            .ok_or_else(|| {
                format!(
                    "unknown tier '{}' (expected strong, moderate, weak or no_signal)",
                    s
                )
            })
    }
}

/// Count of screened records per tier
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TierSummary {
    pub strong: usize,
    pub moderate: usize,
    pub weak: usize,
    pub no_signal: usize,
}

impl TierSummary {
    pub fn record(&mut self, tier: Tier) {
        match tier {
            Tier::Strong => self.strong += 1,
            Tier::Moderate => self.moderate += 1,
            Tier::Weak => self.weak += 1,
            Tier::NoSignal => self.no_signal += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.strong + self.moderate + self.weak + self.no_signal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_boundaries() {
        assert_eq!(Tier::classify(100.0), Tier::Strong);
        assert_eq!(Tier::classify(60.0), Tier::Strong);
        assert_eq!(Tier::classify(59.9), Tier::Moderate);
        assert_eq!(Tier::classify(35.0), Tier::Moderate);
        assert_eq!(Tier::classify(34.9), Tier::Weak);
        assert_eq!(Tier::classify(15.0), Tier::Weak);
        assert_eq!(Tier::classify(14.9), Tier::NoSignal);
        assert_eq!(Tier::classify(0.0), Tier::NoSignal);
    }

    #[test]
    fn test_meets_minimum() {
        assert!(Tier::Strong.meets(Some(Tier::Strong)));
        assert!(!Tier::Moderate.meets(Some(Tier::Strong)));
        assert!(Tier::Moderate.meets(Some(Tier::Weak)));
        assert!(!Tier::NoSignal.meets(Some(Tier::Weak)));
        assert!(Tier::NoSignal.meets(Some(Tier::NoSignal)));
        for tier in Tier::ALL {
            assert!(tier.meets(None));
        }
    }

    #[test]
    fn test_parse_and_display() {
        for tier in Tier::ALL {
            assert_eq!(tier.to_string().parse::<Tier>().unwrap(), tier);
        }
        assert_eq!(" Strong ".parse::<Tier>().unwrap(), Tier::Strong);
        assert!("excellent".parse::<Tier>().is_err());
    }

    #[test]
    fn test_serde_names() {
        assert_eq!(serde_json::to_string(&Tier::NoSignal).unwrap(), "\"no_signal\"");
        let summary = TierSummary {
            strong: 1,
            moderate: 0,
            weak: 2,
            no_signal: 3,
        };
        let json = serde_json::to_value(summary).unwrap();
        assert_eq!(json["noSignal"], 3);
        assert_eq!(summary.total(), 6);
    }

    #[test]
    fn test_summary_record() {
        let mut summary = TierSummary::default();
        summary.record(Tier::Weak);
        summary.record(Tier::Weak);
        summary.record(Tier::Strong);
        assert_eq!(summary.weak, 2);
        assert_eq!(summary.strong, 1);
        assert_eq!(summary.total(), 3);
    }
}
