use std::collections::HashSet;

use super::rubric::Rubric;

/// Validate a rubric at startup.
/// Returns all validation errors at once (not just the first).
pub fn validate_rubric(rubric: &Rubric) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();
    let mut seen = HashSet::new();

    for (i, criterion) in rubric.iter().enumerate() {
        let name = if criterion.key.is_empty() {
            format!("rubric[{}]", i)
        } else {
            format!("rubric.{}", criterion.key)
        };

        if criterion.key.is_empty() {
            errors.push(format!("{}: key must not be empty", name));
        } else if !seen.insert(criterion.key) {
            errors.push(format!("{}: duplicate category key", name));
        }

        if !(criterion.weight > 0.0 && criterion.weight.is_finite()) {
            errors.push(format!(
                "{}.weight: must be a positive number, got {}",
                name, criterion.weight
            ));
        }

        if criterion.label.trim().is_empty() {
            errors.push(format!("{}.label: must not be empty", name));
        }

        if criterion.keywords.is_empty() {
            errors.push(format!("{}.keywords: must list at least one keyword", name));
        }

        for (j, keyword) in criterion.keywords.iter().enumerate() {
            if keyword.is_empty() {
                errors.push(format!("{}.keywords[{}]: must not be empty", name, j));
            } else if keyword.to_lowercase() != *keyword {
                errors.push(format!(
                    "{}.keywords[{}]: '{}' must be lowercase",
                    name, j, keyword
                ));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
