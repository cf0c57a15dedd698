pub mod formatter;

pub use formatter::{
    format_report, format_score, format_status, should_use_colors, Verdict,
};
