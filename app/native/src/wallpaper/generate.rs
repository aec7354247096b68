//! Bulk fit-cache generation with terminal progress.
//!
//! Backs `wallpaper-agent cache generate`: every catalog image is fitted in
//! parallel while a spinner reports progress on a TTY.

use std::io::Write as IoWrite;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use colored::Colorize;
use rayon::prelude::*;

use super::catalog::Candidate;
use super::fit_cache::{FitOutcome, fit_candidate};
use super::source::ScreenSize;

/// Terminal control sequences used by the progress line.
mod term {
    pub const CLEAR_LINE: &str = "\x1b[2K\r";
    pub const HIDE_CURSOR: &str = "\x1b[?25l";
    pub const SHOW_CURSOR: &str = "\x1b[?25h";
}

/// Spinner frames for progress animation.
const SPINNER_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Result of fitting a single image.
#[derive(Debug, Clone)]
struct FitReport {
    name: String,
    outcome: Result<FitOutcome, String>,
}

/// Counts for a generation run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GenerationSummary {
    pub generated: usize,
    pub cached: usize,
    pub original: usize,
    pub errors: usize,
    pub elapsed: Duration,
}

/// Fits every candidate with real-time progress feedback.
///
/// Already fitted images are reported as cached; images smaller than the
/// target are reported as used unresized. The spinner is only drawn when
/// `is_tty` is set.
pub fn generate_all_streaming<W: IoWrite + Send + 'static>(
    writer: W,
    is_tty: bool,
    candidates: &[Candidate],
    root: &Path,
    target: ScreenSize,
) -> GenerationSummary {
    if candidates.is_empty() {
        let mut w = writer;
        let _ = writeln!(w, "No wallpapers to generate.");
        return GenerationSummary::default();
    }

    let writer = Arc::new(Mutex::new(writer));
    let total = candidates.len();
    let completed = Arc::new(AtomicUsize::new(0));
    let start_time = Instant::now();

    print_generation_header(&writer, is_tty, total, root, target);

    let progress_done = Arc::new(AtomicBool::new(false));
    let progress_handle = spawn_progress_reporter(
        is_tty,
        Arc::clone(&writer),
        Arc::clone(&completed),
        Arc::clone(&progress_done),
        total,
    );

    let reports: Vec<FitReport> = candidates
        .par_iter()
        .map(|candidate| {
            let outcome = fit_candidate(candidate, root, target).map_err(|err| err.to_string());
            completed.fetch_add(1, Ordering::Relaxed);
            FitReport {
                name: candidate.name.clone(),
                outcome,
            }
        })
        .collect();

    progress_done.store(true, Ordering::Relaxed);
    if let Some(handle) = progress_handle {
        let _ = handle.join();
    }

    let mut summary = GenerationSummary {
        elapsed: start_time.elapsed(),
        ..GenerationSummary::default()
    };
    for report in &reports {
        match &report.outcome {
            Ok(FitOutcome::Generated(_)) => summary.generated += 1,
            Ok(FitOutcome::Cached(_)) => summary.cached += 1,
            Ok(FitOutcome::Original(_)) => summary.original += 1,
            Err(_) => summary.errors += 1,
        }
    }

    print_generation_results(&writer, is_tty, &reports, &summary);
    summary
}

fn print_generation_header<W: IoWrite>(
    writer: &Arc<Mutex<W>>,
    is_tty: bool,
    total: usize,
    root: &Path,
    target: ScreenSize,
) {
    let mut w = writer.lock().unwrap_or_else(PoisonError::into_inner);
    let _ = writeln!(
        w,
        "{} {} wallpaper(s) for {}",
        "Fitting".bold().cyan(),
        total,
        target.to_string().bold()
    );
    let _ = writeln!(w, "{}", format!("Output: {}", root.display()).dimmed());
    let _ = writeln!(w);
    if is_tty {
        let _ = write!(w, "{}", term::HIDE_CURSOR);
    }
    let _ = w.flush();
}

fn spawn_progress_reporter<W: IoWrite + Send + 'static>(
    is_tty: bool,
    writer: Arc<Mutex<W>>,
    completed: Arc<AtomicUsize>,
    progress_done: Arc<AtomicBool>,
    total: usize,
) -> Option<std::thread::JoinHandle<()>> {
    if !is_tty {
        return None;
    }

    Some(std::thread::spawn(move || {
        let mut frame = 0;
        while !progress_done.load(Ordering::Relaxed) {
            let done = completed.load(Ordering::Relaxed);
            let percent = (done * 100) / total;
            let spinner = SPINNER_FRAMES[frame % SPINNER_FRAMES.len()];

            if let Ok(mut w) = writer.lock() {
                let line = format!("{spinner} Processing... {done}/{total} ({percent}%)");
                let _ = write!(w, "{}{}", term::CLEAR_LINE, line.cyan());
                let _ = w.flush();
            }

            frame += 1;
            std::thread::sleep(Duration::from_millis(80));
        }
    }))
}

fn print_generation_results<W: IoWrite>(
    writer: &Arc<Mutex<W>>,
    is_tty: bool,
    reports: &[FitReport],
    summary: &GenerationSummary,
) {
    let mut w = writer.lock().unwrap_or_else(PoisonError::into_inner);
    if is_tty {
        let _ = write!(w, "{}{}", term::CLEAR_LINE, term::SHOW_CURSOR);
    }

    for report in reports {
        print_single_result(&mut *w, report);
    }
    let _ = writeln!(w);

    let _ = write!(w, "{} ", "Done!".bold());
    if summary.generated > 0 {
        let _ = write!(w, "{} ", format!("Generated: {}", summary.generated).green());
    }
    if summary.cached > 0 {
        let _ = write!(w, "{} ", format!("Cached: {}", summary.cached).yellow());
    }
    if summary.original > 0 {
        let _ = write!(w, "{} ", format!("Unresized: {}", summary.original).dimmed());
    }
    if summary.errors > 0 {
        let _ = write!(w, "{} ", format!("Errors: {}", summary.errors).red());
    }
    let _ = writeln!(w, "{}", format!("({:.2}s)", summary.elapsed.as_secs_f64()).dimmed());
    let _ = w.flush();
}

fn print_single_result<W: IoWrite>(w: &mut W, report: &FitReport) {
    let file_name = |path: &Path| {
        path.file_name().map_or_else(String::new, |name| name.to_string_lossy().into_owned())
    };

    let _ = match &report.outcome {
        Ok(FitOutcome::Generated(path)) => {
            writeln!(w, "  {} {} -> {}", "✓".green(), report.name, file_name(path))
        }
        Ok(FitOutcome::Cached(_)) => {
            writeln!(w, "  {} {} {}", "●".dimmed(), report.name, "(cached)".dimmed())
        }
        Ok(FitOutcome::Original(_)) => {
            writeln!(w, "  {} {} {}", "○".dimmed(), report.name, "(smaller than display)".dimmed())
        }
        Err(err) => writeln!(w, "  {} {} -> {}", "✗".red(), report.name, err),
    };
}
