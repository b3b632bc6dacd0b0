use owo_colors::OwoColorize;
use std::io::IsTerminal;
use terminal_size::{terminal_size, Width};

use crate::fetch::{ScreenOutput, ScreenedRecord};
use crate::screening::Tier;

/// Matches shown per category, and overall, in the table view
const MATCHES_PER_CATEGORY: usize = 2;
const MATCHES_TOTAL: usize = 5;

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Get terminal width, defaulting to None for pipes (unlimited)
fn get_terminal_width() -> Option<usize> {
    terminal_size().map(|(Width(w), _)| w as usize)
}

/// Truncate text to fit available width, accounting for Unicode
fn truncate_text(text: &str, max_width: usize) -> String {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= max_width {
        text.to_string()
    } else if max_width > 3 {
        format!("{}...", chars[..max_width - 3].iter().collect::<String>())
    } else {
        chars[..max_width].iter().collect()
    }
}

/// "37.1%"
pub fn format_pct(pct: f64) -> String {
    format!("{:.1}%", pct)
}

fn paint_tier(tier: Tier, text: &str, use_colors: bool) -> String {
    if !use_colors {
        return text.to_string();
    }
    match tier {
        Tier::Strong => text.green().bold().to_string(),
        Tier::Moderate => text.yellow().to_string(),
        Tier::Weak => text.to_string(),
        Tier::NoSignal => text.dimmed().to_string(),
    }
}

/// "Protocol Engineer / Onsite", omitting whichever part is empty
fn job_and_stage(record: &ScreenedRecord) -> String {
    match (record.job_title.is_empty(), record.stage.is_empty()) {
        (false, false) => format!("{} / {}", record.job_title, record.stage),
        (false, true) => record.job_title.clone(),
        (true, false) => record.stage.clone(),
        (true, true) => String::new(),
    }
}

/// Format screened candidates as a ranked table
///
/// Columns: index, percentage, tier, candidate name, job and stage, top
/// keyword matches. No headers. The name column is truncated to fit the
/// terminal; pipes get it in full.
pub fn format_screen_table(candidates: &[ScreenedRecord], use_colors: bool) -> String {
    if candidates.is_empty() {
        return "No candidates met the minimum tier.".to_string();
    }

    let term_width = get_terminal_width();

    // Index "99." + space, pct "100.0%" right-aligned in 6, tier in 9
    let index_width = 3;
    let pct_width = 6;
    let tier_width = 9;
    let separator = "  ";

    candidates
        .iter()
        .enumerate()
        .map(|(idx, record)| {
            let index_str = format!("{:>2}.", idx + 1);
            let pct_str = format!("{:>width$}", format_pct(record.score.pct), width = pct_width);
            let tier_str = format!("{:<width$}", record.tier.as_str(), width = tier_width);

            let job = job_and_stage(record);
            let matches = record
                .score
                .top_matches(MATCHES_PER_CATEGORY, MATCHES_TOTAL)
                .join(", ");

            let fixed_width = index_width + 1 + pct_width + tier_width + separator.len() * 4
                + job.chars().count()
                + matches.chars().count();

            let name = match term_width {
                Some(width) if width > fixed_width + 10 => {
                    truncate_text(&record.candidate_name, width - fixed_width)
                }
                Some(_) => truncate_text(&record.candidate_name, 20),
                None => record.candidate_name.clone(),
            };

            let line = if use_colors {
                format!(
                    "{} {}{}{}{}{}{}{}{}{}",
                    index_str.dimmed(),
                    pct_str.bold(),
                    separator,
                    paint_tier(record.tier, &tier_str, true),
                    separator,
                    name,
                    separator,
                    job.cyan(),
                    separator,
                    matches.dimmed()
                )
            } else {
                format!(
                    "{} {}{}{}{}{}{}{}{}{}",
                    index_str, pct_str, separator, tier_str, separator, name, separator, job,
                    separator, matches
                )
            };
            line.trim_end().to_string()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// One-line tier breakdown for a batch
/// "Screened 12: 2 strong, 3 moderate, 4 weak, 3 no_signal (showing 5)"
pub fn format_summary(output: &ScreenOutput, use_colors: bool) -> String {
    let summary = &output.summary;
    let counts = [
        (Tier::Strong, summary.strong),
        (Tier::Moderate, summary.moderate),
        (Tier::Weak, summary.weak),
        (Tier::NoSignal, summary.no_signal),
    ]
    .iter()
    .map(|(tier, count)| paint_tier(*tier, &format!("{} {}", count, tier), use_colors))
    .collect::<Vec<_>>()
    .join(", ");

    format!(
        "Screened {}: {} (showing {})",
        output.total_screened,
        counts,
        output.candidates.len()
    )
}

/// Multi-line breakdown of one candidate, category by category
pub fn format_candidate_detail(record: &ScreenedRecord, use_colors: bool) -> String {
    let mut lines = Vec::with_capacity(record.score.categories.len() + 4);

    let header = format!(
        "{}  {}  {}",
        record.candidate_name,
        format_pct(record.score.pct),
        record.tier
    );
    lines.push(if use_colors {
        paint_tier(record.tier, &header, true)
    } else {
        header
    });

    lines.push(format!("  Application: {}", record.application_id));
    if !record.candidate_id.is_empty() {
        lines.push(format!("  Candidate: {}", record.candidate_id));
    }
    let job = job_and_stage(record);
    if !job.is_empty() {
        lines.push(format!("  Job: {}", job));
    }
    lines.push(format!(
        "  Score: {} / {}",
        record.score.total_score, record.score.max_possible
    ));

    for category in record.score.categories.values() {
        let matched = if category.matched.is_empty() {
            "-".to_string()
        } else {
            category.matched.join(", ")
        };
        let line = format!(
            "    {:<24} {:>5.2} / {:<4}  {}",
            category.label, category.score, category.max, matched
        );
        lines.push(if use_colors && category.match_count == 0 {
            line.dimmed().to_string()
        } else {
            line
        });
    }

    lines.join("\n")
}
