use std::path::Path;

use anyhow::Context;
use tracing::info;

use crate::board::board_detector::detect_board;
use crate::cli::config::{DetectSettings, OutputFormat};
use crate::detect::aggregate::{ContextSnapshot, detect_across_contexts};
use crate::detect::detector::detect_form_fields;
use crate::dom::snapshot_model::DocumentSnapshot;
use crate::registry::registry_model::Registry;
use crate::registry::resolver::ActiveRegistry;
use crate::report::console::format_console_report;
use crate::report::report_model::DetectionReport;
use crate::trace::logger::TraceLogger;
use crate::trace::trace::TraceEvent;

// ============================================================================
// detect subcommand
// ============================================================================

/// Run detection and write (or print) the rendered output.
pub fn cmd_detect(
    snapshot_paths: &[String],
    settings: &DetectSettings,
    output: Option<&str>,
    verbose: u8,
) -> anyhow::Result<()> {
    let rendered = run_detect(snapshot_paths, settings, verbose)?;
    match output {
        Some(path) => std::fs::write(path, &rendered)
            .with_context(|| format!("failed to write output to {}", path))?,
        None => print!("{}", rendered),
    }
    Ok(())
}

/// Detect over the given snapshots and render the report.
///
/// One snapshot is a single pass; several are treated as frames of one page,
/// the first being the primary context.
pub fn run_detect(
    snapshot_paths: &[String],
    settings: &DetectSettings,
    verbose: u8,
) -> anyhow::Result<String> {
    let registry = load_registry(settings.registry.as_deref())?;
    let fingerprint = registry.fingerprint();

    let snapshots = snapshot_paths
        .iter()
        .map(|p| load_snapshot(Path::new(p)))
        .collect::<anyhow::Result<Vec<_>>>()?;

    let tracer = match &settings.trace {
        Some(path) => TraceLogger::new(path),
        None => TraceLogger::disabled(),
    };

    let (report, json) = match snapshots.len() {
        1 => {
            let snapshot = &snapshots[0];
            let board = settings
                .board
                .as_deref()
                .or_else(|| detect_board(&snapshot.url));
            let result = detect_form_fields(snapshot, board, &registry.entries)
                .with_context(|| format!("detection failed for {}", snapshot_paths[0]))?;
            tracer.log(&TraceEvent::for_pass(&result, &fingerprint));
            (
                DetectionReport::from_result(&result),
                serde_json::to_string_pretty(&result),
            )
        }
        _ => {
            let contexts: Vec<ContextSnapshot> = snapshots
                .into_iter()
                .enumerate()
                .map(|(frame_id, snapshot)| ContextSnapshot::new(frame_id as u32, snapshot))
                .collect();
            let result =
                detect_across_contexts(&contexts, settings.board.as_deref(), &registry.entries);
            tracer.log(&TraceEvent::for_aggregate(&result, &fingerprint));
            (
                DetectionReport::from_aggregate(&result),
                serde_json::to_string_pretty(&result),
            )
        }
    };

    info!(
        fields = report.total,
        unknown = report.unknown,
        registry = %fingerprint,
        "detection complete"
    );

    match settings.format {
        OutputFormat::Json => {
            let mut json = json.context("failed to serialize detection result")?;
            json.push('\n');
            Ok(json)
        }
        OutputFormat::Console => Ok(format_console_report(&report, verbose > 0)),
    }
}

/// Read one snapshot JSON file.
pub fn load_snapshot(path: &Path) -> anyhow::Result<DocumentSnapshot> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read snapshot {}", path.display()))?;
    DocumentSnapshot::from_json(&content)
        .with_context(|| format!("invalid snapshot {}", path.display()))
}

/// The registry at `path`, or the built-in one.
pub fn load_registry(path: Option<&str>) -> anyhow::Result<Registry> {
    match path {
        Some(path) => Registry::load(Path::new(path))
            .with_context(|| format!("failed to load registry {}", path)),
        None => Registry::builtin().context("built-in registry is invalid"),
    }
}

// ============================================================================
// board subcommand
// ============================================================================

pub fn cmd_board(url: &str) -> String {
    match detect_board(url) {
        Some(board) => format!("{}\n", board),
        None => "none\n".to_string(),
    }
}

// ============================================================================
// registry subcommand
// ============================================================================

pub fn cmd_registry_validate(path: Option<&str>) -> anyhow::Result<String> {
    let registry = load_registry(path)?;
    Ok(format!(
        "ok: {} entries, boards [{}], fingerprint {}\n",
        registry.entries.len(),
        registry.boards().join(", "),
        registry.fingerprint()
    ))
}

/// Entries participating for `board`, one per line in trial order.
pub fn cmd_registry_list(path: Option<&str>, board: Option<&str>) -> anyhow::Result<String> {
    let registry = load_registry(path)?;
    let active = ActiveRegistry::new(&registry.entries, board);

    let mut out = String::new();
    for id in active.entry_ids() {
        if let Some(entry) = registry.entries.iter().find(|e| e.id == id) {
            out.push_str(&format!(
                "{:>4}  {:<32} {:<16} {}\n",
                entry.priority,
                entry.id,
                entry.board,
                entry.field_type.as_str()
            ));
        }
    }
    Ok(out)
}
