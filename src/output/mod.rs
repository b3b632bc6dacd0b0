pub mod formatter;

pub use formatter::{
    format_candidate_detail, format_pct, format_screen_table, format_summary, should_use_colors,
};
