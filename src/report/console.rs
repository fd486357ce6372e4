use crate::detect::result_model::MappedField;
use crate::report::report_model::{DetectionReport, LOW_CONFIDENCE};

// ============================================================================
// Console reporter: formatted terminal output
// ============================================================================

/// Format a detection report for terminal output.
///
/// Produces output like:
/// ```text
/// === Fields: https://boards.greenhouse.io/acme/jobs/1 (board: greenhouse) ===
///
///   firstName        0.99  #first_name            First Name *  [gh-firstName]
/// ? unknown          0.00  #question_7            Why us?
///
/// === 2 fields: 1 known, 1 unknown, 0 low confidence (14 scanned, 3ms) ===
/// ```
pub fn format_console_report(report: &DetectionReport, verbose: bool) -> String {
    let mut out = String::new();

    let board = report.board.as_deref().unwrap_or("none");
    out.push_str(&format!(
        "=== Fields: {} (board: {}) ===\n\n",
        report.url, board
    ));

    for field in &report.fields {
        out.push_str(&format_field_line(field));
        if verbose {
            for signal in &field.signals {
                let marker = if signal.matched { "+" } else { "-" };
                out.push_str(&format!(
                    "      {} {:<16} {:.2}  {}\n",
                    marker,
                    signal.signal.as_str(),
                    signal.weight,
                    signal.reason
                ));
            }
        }
    }

    for failed in &report.failed_contexts {
        out.push_str(&format!(
            "  [FAILED] frame {} ({}): {}\n",
            failed.frame_id, failed.url, failed.error
        ));
    }

    if !report.by_category.is_empty() {
        let categories: Vec<String> = report
            .by_category
            .iter()
            .map(|(category, n)| format!("{} {}", category, n))
            .collect();
        out.push_str(&format!("\nCategories: {}\n", categories.join(", ")));
    }

    out.push_str(&format!(
        "\n=== {} fields: {} known, {} unknown, {} low confidence ({} scanned, {}ms) ===\n",
        report.total,
        report.total - report.unknown,
        report.unknown,
        report.low_confidence,
        report.total_elements_scanned,
        report.duration_ms
    ));

    out
}

fn format_field_line(field: &MappedField) -> String {
    let marker = if field.matched_signals().next().is_none() {
        "?"
    } else if field.confidence < LOW_CONFIDENCE {
        "~"
    } else {
        " "
    };

    let mut line = format!(
        "{} {:<20} {:.2}  {:<28} {}",
        marker,
        field.field_type.as_str(),
        field.confidence,
        field.selector,
        field.label
    );
    if let Some(entry) = &field.registry_entry_id {
        line.push_str(&format!("  [{}]", entry));
    }
    if field.frame_id != 0 {
        line.push_str(&format!("  (frame {})", field.frame_id));
    }
    line.push('\n');
    line
}
