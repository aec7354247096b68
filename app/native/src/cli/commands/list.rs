//! The `list` command: print the current catalog.

use std::path::Path;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use colored::Colorize;
use tabled::settings::object::Columns;
use tabled::settings::{Alignment, Modify, Style};
use tabled::{Table, Tabled};

use crate::cli::output;
use crate::config;
use crate::error::AgentError;
use crate::wallpaper::catalog::{self, Candidate, CatalogOptions, CatalogScan, Orientation};
use crate::wallpaper::FsDirectory;

#[derive(Tabled)]
struct CandidateRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Resolution")]
    resolution: String,
    #[tabled(rename = "Orientation")]
    orientation: &'static str,
    #[tabled(rename = "Modified")]
    modified: String,
}

/// Maximum width of the name column.
const NAME_WIDTH: usize = 48;

/// Execute the list command.
///
/// # Errors
///
/// Returns an error if the configuration cannot be loaded or the watched
/// directory cannot be read.
pub fn execute(json: bool, config_path: Option<&Path>) -> Result<(), AgentError> {
    let loaded = config::load(config_path)?;
    let options = CatalogOptions::from_config(&loaded.config);
    let scan = catalog::refresh(&FsDirectory, &options, None, None)?;

    let candidates: &[Candidate] = match &scan {
        CatalogScan::Ready { catalog, .. } => catalog.candidates(),
        CatalogScan::Empty { .. } => &[],
    };

    if json {
        let values: Vec<serde_json::Value> = candidates.iter().map(candidate_json).collect();
        output::print_highlighted_json(&serde_json::Value::Array(values));
        return Ok(());
    }

    if candidates.is_empty() {
        println!("{}", format!("No wallpapers found in {}.", options.directory.display()).dimmed());
        return Ok(());
    }

    let now = SystemTime::now();
    let rows: Vec<CandidateRow> = candidates
        .iter()
        .enumerate()
        .map(|(index, candidate)| CandidateRow {
            index: index + 1,
            name: output::truncate(&candidate.name, NAME_WIDTH),
            resolution: format!("{}x{}", candidate.width, candidate.height),
            orientation: orientation_label(candidate.orientation()),
            modified: format_age(now.duration_since(candidate.modified).unwrap_or_default()),
        })
        .collect();

    let table = Table::new(rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::first()).with(Alignment::right()))
        .with(Modify::new(Columns::new(2..3)).with(Alignment::right()))
        .to_string();

    println!(
        "{} {}",
        format!("Wallpapers ({})", candidates.len()).bold(),
        options.directory.display().to_string().dimmed()
    );
    println!("{table}");
    Ok(())
}

const fn orientation_label(orientation: Orientation) -> &'static str {
    match orientation {
        Orientation::Landscape => "landscape",
        Orientation::Portrait => "portrait",
    }
}

fn candidate_json(candidate: &Candidate) -> serde_json::Value {
    let modified = candidate
        .modified
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or_default();

    serde_json::json!({
        "name": candidate.name,
        "path": candidate.path.display().to_string(),
        "width": candidate.width,
        "height": candidate.height,
        "orientation": orientation_label(candidate.orientation()),
        "modified": modified,
    })
}

/// Formats an age as a short human-readable string.
fn format_age(age: Duration) -> String {
    const MINUTE: u64 = 60;
    const HOUR: u64 = MINUTE * 60;
    const DAY: u64 = HOUR * 24;

    let secs = age.as_secs();
    if secs < MINUTE {
        "just now".to_string()
    } else if secs < HOUR {
        format!("{}m ago", secs / MINUTE)
    } else if secs < DAY {
        format!("{}h ago", secs / HOUR)
    } else {
        format!("{}d ago", secs / DAY)
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn test_format_age() {
        assert_eq!(format_age(Duration::from_secs(5)), "just now");
        assert_eq!(format_age(Duration::from_secs(120)), "2m ago");
        assert_eq!(format_age(Duration::from_secs(3 * 3600)), "3h ago");
        assert_eq!(format_age(Duration::from_secs(2 * 86_400 + 5)), "2d ago");
    }

    #[test]
    fn test_candidate_json_fields() {
        let candidate = Candidate {
            name: "tall.png".to_string(),
            path: PathBuf::from("/walls/tall.png"),
            modified: UNIX_EPOCH + Duration::from_secs(1_700_000_000),
            width: 1080,
            height: 1920,
        };

        let value = candidate_json(&candidate);
        assert_eq!(value["name"], "tall.png");
        assert_eq!(value["path"], "/walls/tall.png");
        assert_eq!(value["orientation"], "portrait");
        assert_eq!(value["modified"], 1_700_000_000);
    }
}
