use owo_colors::OwoColorize;
use std::io::IsTerminal;
use terminal_size::{terminal_size, Width};

use crate::predictor::{LoadStatus, PredictorRegistry};
use crate::scoring::{PairingRequest, PairingResult, Person};

/// Rough reading of a final score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Excellent,
    Good,
    Fair,
    Caution,
}

impl Verdict {
    pub fn from_score(score: f64) -> Self {
        if score >= 80.0 {
            Verdict::Excellent
        } else if score >= 60.0 {
            Verdict::Good
        } else if score >= 40.0 {
            Verdict::Fair
        } else {
            Verdict::Caution
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Verdict::Excellent => "excellent",
            Verdict::Good => "good",
            Verdict::Fair => "fair",
            Verdict::Caution => "caution",
        }
    }
}

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// One decimal place, with negative zero printed as 0.0
pub fn format_score(score: f64) -> String {
    let formatted = format!("{:.1}", score);
    if formatted == "-0.0" {
        "0.0".to_string()
    } else {
        formatted
    }
}

/// Get terminal width, defaulting to None for pipes
fn get_terminal_width() -> Option<usize> {
    terminal_size().map(|(Width(w), _)| w as usize)
}

/// Horizontal divider, capped at 48 columns and narrowed to fit the terminal
fn divider() -> String {
    let width = get_terminal_width().map_or(48, |w| w.clamp(10, 48));
    "─".repeat(width)
}

fn colored_verdict(verdict: Verdict, use_colors: bool) -> String {
    let label = verdict.label();
    if !use_colors {
        return label.to_string();
    }
    match verdict {
        Verdict::Excellent => label.green().bold().to_string(),
        Verdict::Good => label.green().to_string(),
        Verdict::Fair => label.yellow().to_string(),
        Verdict::Caution => label.red().bold().to_string(),
    }
}

/// Human-readable breakdown of a scored pairing
///
/// Lists the headline score and verdict, then each person's pillars and
/// non-zero deductions with the rules that produced them.
pub fn format_report(
    request: &PairingRequest,
    result: &PairingResult,
    use_colors: bool,
) -> String {
    let verdict = Verdict::from_score(result.final_score);
    let score = format_score(result.final_score);
    let mut lines = Vec::new();

    if use_colors {
        lines.push(format!(
            "Score: {} ({})",
            score.bold(),
            colored_verdict(verdict, true)
        ));
    } else {
        lines.push(format!("Score: {} ({})", score, verdict.label()));
    }
    lines.push(format!(
        "  Base: {}  Deductions: {}",
        format_score(result.base_score),
        format_score(result.total_deduction())
    ));

    let people = [
        (Person::A, &request.token0, request.gender0),
        (Person::B, &request.token1, request.gender1),
    ];
    for (person, token, gender) in people {
        let sal = &result.sal[person.index()];
        lines.push(divider());

        let heading = format!("{} ({}) {}", person, gender, token.pillars());
        if use_colors {
            lines.push(heading.cyan().to_string());
        } else {
            lines.push(heading);
        }

        if sal.total() == 0.0 {
            lines.push("  no deductions".to_string());
            continue;
        }

        for (category, amount) in sal.iter().filter(|(_, amount)| *amount > 0.0) {
            let amount_str = format!("-{}", format_score(amount));
            let amount_str = if use_colors {
                amount_str.red().to_string()
            } else {
                amount_str
            };
            let rules: Vec<&str> = result
                .fired
                .iter()
                .filter(|f| f.person == person && f.category == category)
                .map(|f| f.rule)
                .collect();
            lines.push(format!(
                "  {:<28} {:>6}  {}",
                category.to_string(),
                amount_str,
                rules.join(", ")
            ));
        }
        lines.push(format!("  total -{}", format_score(sal.total())));
    }

    lines.join("\n")
}

/// One line per predictor: kind, load state and model path
pub fn format_status(registry: &PredictorRegistry, use_colors: bool) -> String {
    registry
        .slots()
        .iter()
        .map(|slot| {
            let path = slot
                .path()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "(not configured)".to_string());
            let state = match slot.status() {
                LoadStatus::Unloaded => "unloaded".to_string(),
                LoadStatus::Loaded => "loaded".to_string(),
                LoadStatus::Failed(reason) => format!("fallback: {}", reason),
            };
            let state = if use_colors {
                match slot.status() {
                    LoadStatus::Loaded => state.green().to_string(),
                    LoadStatus::Unloaded => state.dimmed().to_string(),
                    LoadStatus::Failed(_) => state.yellow().to_string(),
                }
            } else {
                state
            };
            format!("{:<7}{}  {}", slot.kind().to_string(), path, state)
        })
        .collect::<Vec<_>>()
        .join("\n")
}
