pub mod engine;
pub mod extract;
pub mod rubric;
pub mod tier;
pub mod validation;

pub use engine::{score_candidate, CategoryScore, ScoreResult};
pub use extract::{extract_text, for_each_string};
pub use rubric::{Criterion, Rubric, DEFAULT_RUBRIC};
pub use tier::{Tier, TierSummary};
pub use validation::validate_rubric;
