use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use std::fmt;
use std::str::FromStr;

/// Formula turning aggregated engagement into an influence score.
///
/// Exactly one variant is active per process; it is picked from configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InfluenceStrategy {
    /// `0.7 * views + 0.3 * likes`, in exact decimal arithmetic.
    #[default]
    Weighted,
    /// `ln(1 + views) + ln(1 + likes)`; compresses outliers.
    Composite,
}

const VIEW_WEIGHT: Decimal = Decimal::from_parts(7, 0, 0, false, 1);
const LIKE_WEIGHT: Decimal = Decimal::from_parts(3, 0, 0, false, 1);

impl InfluenceStrategy {
    pub fn score(self, total_views: i64, total_likes: i64) -> Decimal {
        match self {
            InfluenceStrategy::Weighted => {
                Decimal::from(total_views) * VIEW_WEIGHT + Decimal::from(total_likes) * LIKE_WEIGHT
            }
            InfluenceStrategy::Composite => log1p(total_views) + log1p(total_likes),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            InfluenceStrategy::Weighted => "weighted",
            InfluenceStrategy::Composite => "composite",
        }
    }
}

fn log1p(counter: i64) -> Decimal {
    Decimal::from_f64((counter.max(0) as f64).ln_1p()).unwrap_or_default()
}

impl fmt::Display for InfluenceStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InfluenceStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "weighted" => Ok(InfluenceStrategy::Weighted),
            "composite" => Ok(InfluenceStrategy::Composite),
            other => Err(format!(
                "unknown influence strategy '{}' (expected 'weighted' or 'composite')",
                other
            )),
        }
    }
}
