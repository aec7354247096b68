//! End-to-end rotation tests.
//!
//! Drives the scheduler against a real directory of generated images and a
//! real fit cache. Desktop settings, lock state and notifications are
//! replaced by in-memory recorders.
//!
//! ```bash
//! cargo test -p wallpaper-agent --test rotation_integration
//! ```

use std::cell::{Cell, RefCell};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::{Duration, SystemTime};

use image::{GenericImageView, RgbImage};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tempfile::TempDir;
use wallpaper_agent_lib::config::{
    AgentConfig, CatalogStyle, GateVariant, PrimaryOrientation, SelectionPolicyKind,
};
use wallpaper_agent_lib::wallpaper::source::NotificationId;
use wallpaper_agent_lib::wallpaper::{
    Collaborators, DisplaySource, FsDirectory, LockError, LockSource, NotificationSink, Notifier,
    NotifyError, Scheduler, SchedulerOptions, ScreenSize, SettingError, SettingScope, SettingSink,
    Target,
};

// ============================================================================
// Fixtures
// ============================================================================

/// Writes a solid image and backdates its modification time.
fn write_image(dir: &Path, name: &str, width: u32, height: u32, age_secs: u64) -> PathBuf {
    let path = dir.join(name);
    RgbImage::from_pixel(width, height, image::Rgb([40, 90, 160])).save(&path).unwrap();
    let modified = SystemTime::now() - Duration::from_secs(age_secs);
    File::options().write(true).open(&path).unwrap().set_modified(modified).unwrap();
    path
}

/// Six landscape images (newest is `land0`), one portrait image and one text file.
fn populate(dir: &Path) {
    for i in 0..6u64 {
        write_image(dir, &format!("land{i}.png"), 64, 36, 600 + i * 60);
    }
    write_image(dir, "tall.png", 36, 64, 300);
    std::fs::write(dir.join("notes.txt"), "not an image").unwrap();
}

struct FixedDisplays(Vec<ScreenSize>);

impl DisplaySource for FixedDisplays {
    fn list_displays(&self) -> Vec<ScreenSize> { self.0.clone() }
}

#[derive(Clone, Default)]
struct RecordingSettings {
    writes: Rc<RefCell<Vec<(SettingScope, String)>>>,
}

impl SettingSink for RecordingSettings {
    fn set_picture_uri(&self, scope: SettingScope, uri: &str) -> Result<(), SettingError> {
        self.writes.borrow_mut().push((scope, uri.to_string()));
        Ok(())
    }
}

#[derive(Clone, Default)]
struct ScriptedLock {
    states: Rc<RefCell<Vec<bool>>>,
    calls: Rc<Cell<usize>>,
}

impl ScriptedLock {
    fn new(states: &[bool]) -> Self {
        let lock = Self::default();
        lock.states.borrow_mut().extend_from_slice(states);
        lock
    }
}

impl LockSource for ScriptedLock {
    fn is_locked(&self) -> Result<bool, LockError> {
        let index = self.calls.get();
        self.calls.set(index + 1);
        Ok(self.states.borrow().get(index).copied().unwrap_or(false))
    }
}

#[derive(Clone, Default)]
struct RecordingNotes {
    shown: Rc<RefCell<Vec<(String, String)>>>,
    closed: Rc<Cell<usize>>,
}

impl NotificationSink for RecordingNotes {
    fn show(&mut self, title: &str, body: &str, _icon: &str) -> Result<NotificationId, NotifyError> {
        let mut shown = self.shown.borrow_mut();
        shown.push((title.to_string(), body.to_string()));
        Ok(NotificationId(u32::try_from(shown.len()).unwrap()))
    }

    fn close(&mut self, _id: NotificationId) { self.closed.set(self.closed.get() + 1); }
}

struct Harness {
    _images: TempDir,
    cache: TempDir,
    images_dir: PathBuf,
    settings: RecordingSettings,
    notes: RecordingNotes,
}

impl Harness {
    fn new() -> Self {
        let images = TempDir::new().unwrap();
        populate(images.path());
        Self {
            images_dir: images.path().to_path_buf(),
            _images: images,
            cache: TempDir::new().unwrap(),
            settings: RecordingSettings::default(),
            notes: RecordingNotes::default(),
        }
    }

    fn config(&self, gate: GateVariant) -> AgentConfig {
        AgentConfig {
            watch_directory: self.images_dir.to_string_lossy().into_owned(),
            supported_extensions: vec!["png".to_string()],
            primary_orientation: PrimaryOrientation::Landscape,
            gate_variant: gate,
            catalog_style: CatalogStyle::Incremental,
            selection_policy: SelectionPolicyKind::NestedBands,
            fit_to_display: true,
            prewarm_cache: false,
            cache_directory: self.cache.path().to_string_lossy().into_owned(),
            ..AgentConfig::default()
        }
    }

    fn start(&self, gate: GateVariant, lock: Option<ScriptedLock>) -> Scheduler {
        self.start_with(&self.config(gate), lock)
    }

    fn start_with(&self, config: &AgentConfig, lock: Option<ScriptedLock>) -> Scheduler {
        let collaborators = Collaborators {
            directory: Box::new(FsDirectory),
            displays: Box::new(FixedDisplays(vec![ScreenSize::new(32, 18)])),
            settings: Box::new(self.settings.clone()),
            lock: lock.map(|lock| Box::new(lock) as Box<dyn LockSource>),
            notifier: Notifier::new(Box::new(self.notes.clone())),
        };
        let options = SchedulerOptions::from_config(config);
        Scheduler::start(options, collaborators, Box::new(StdRng::seed_from_u64(7))).unwrap()
    }
}

// ============================================================================
// Catalog
// ============================================================================

#[test]
fn test_startup_catalog_is_filtered_and_newest_first() {
    let harness = Harness::new();
    let scheduler = harness.start(GateVariant::Alternating, None);

    let names: Vec<&str> = scheduler.catalog().iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["land0.png", "land1.png", "land2.png", "land3.png", "land4.png", "land5.png"]);
    assert!(scheduler.unseen().is_empty());
}

#[test]
fn test_new_image_is_shown_first() {
    let harness = Harness::new();
    let mut scheduler = harness.start(GateVariant::Alternating, None);

    std::thread::sleep(Duration::from_millis(20));
    RgbImage::new(64, 36).save(harness.images_dir.join("fresh.png")).unwrap();

    let report = scheduler.tick();
    assert_eq!(report.applied.len(), 1);
    assert_eq!(report.applied[0].name, "fresh.png");
    assert_eq!(scheduler.catalog().candidates()[0].name, "fresh.png");
    assert!(scheduler.unseen().is_empty());
}

#[test]
fn test_deleted_image_is_never_applied() {
    let harness = Harness::new();
    let mut scheduler = harness.start(GateVariant::Alternating, None);

    for i in 1..6 {
        std::fs::remove_file(harness.images_dir.join(format!("land{i}.png"))).unwrap();
    }

    for _ in 0..6 {
        let report = scheduler.tick();
        for applied in &report.applied {
            assert_eq!(applied.name, "land0.png");
        }
    }
}

// ============================================================================
// Applying
// ============================================================================

#[test]
fn test_undecodable_images_are_never_applied() {
    let harness = Harness::new();
    // Headers stay readable, pixel data is cut off
    for i in 1..6 {
        let path = harness.images_dir.join(format!("land{i}.png"));
        let bytes = std::fs::read(&path).unwrap();
        std::fs::write(&path, &bytes[..bytes.len() / 2]).unwrap();
    }
    let mut scheduler = harness.start(GateVariant::Alternating, None);
    assert_eq!(scheduler.catalog().len(), 6);

    for _ in 0..6 {
        for applied in &scheduler.tick().applied {
            assert_eq!(applied.name, "land0.png");
        }
    }

    let writes = harness.settings.writes.borrow();
    assert!(!writes.is_empty());
    for (_, uri) in writes.iter() {
        assert!(uri.ends_with("/land0-32x18.png"), "{uri}");
    }
}

#[test]
fn test_replaced_image_is_fitted_again() {
    let harness = Harness::new();
    let config = AgentConfig {
        prewarm_cache: true,
        ..harness.config(GateVariant::Alternating)
    };
    let mut scheduler = harness.start_with(&config, None);
    assert!(harness.cache.path().join("land3-32x18.png").exists());

    // Same name, square and blue, newer than anything in the cache
    let path = harness.images_dir.join("land3.png");
    RgbImage::from_pixel(64, 64, image::Rgb([0, 0, 255])).save(&path).unwrap();
    let future = SystemTime::now() + Duration::from_secs(120);
    File::options().write(true).open(&path).unwrap().set_modified(future).unwrap();

    let report = scheduler.tick();
    assert_eq!(report.applied[0].name, "land3.png");

    let fitted = image::open(&report.applied[0].path).unwrap();
    assert_eq!(fitted.dimensions(), (32, 32));
    let pixel = fitted.to_rgb8().get_pixel(16, 16).0;
    assert!(pixel[2] > 200 && pixel[0] < 50, "{pixel:?}");
}

#[test]
fn test_alternating_rotation_writes_fitted_uris() {
    let harness = Harness::new();
    let mut scheduler = harness.start(GateVariant::Alternating, None);

    for _ in 0..4 {
        scheduler.tick();
    }

    let writes = harness.settings.writes.borrow();
    let scopes: Vec<SettingScope> = writes.iter().map(|(scope, _)| *scope).collect();
    assert_eq!(
        scopes,
        vec![
            SettingScope::Background,
            SettingScope::Screensaver,
            SettingScope::Background,
            SettingScope::Screensaver,
        ]
    );

    let cache_uri = format!("file://{}", harness.cache.path().display());
    for (_, uri) in writes.iter() {
        assert!(uri.starts_with(&cache_uri), "{uri} is not in the fit cache");
        assert!(uri.ends_with("-32x18.png"), "{uri} is not fitted to the display");
    }

    let titles: Vec<String> = harness.notes.shown.borrow().iter().map(|(t, _)| t.clone()).collect();
    assert_eq!(titles, vec!["Wallpaper", "Lock Screen", "Wallpaper", "Lock Screen"]);
}

#[test]
fn test_lock_aware_rotation_follows_session() {
    let harness = Harness::new();
    // Startup probe, then: unlocked, unlocked, locked, locked, unlocked
    let lock = ScriptedLock::new(&[false, false, false, true, true, false]);
    let mut scheduler = harness.start(GateVariant::LockAware, Some(lock));

    let reports: Vec<_> = (0..5).map(|_| scheduler.tick()).collect();

    let wallpaper_ticks: Vec<usize> = reports
        .iter()
        .enumerate()
        .filter(|(_, r)| r.for_target(Target::Wallpaper).is_some())
        .map(|(i, _)| i + 1)
        .collect();
    let lockscreen_ticks: Vec<usize> = reports
        .iter()
        .enumerate()
        .filter(|(_, r)| r.for_target(Target::Lockscreen).is_some())
        .map(|(i, _)| i + 1)
        .collect();

    assert_eq!(wallpaper_ticks, vec![1, 2, 5]);
    assert_eq!(lockscreen_ticks, vec![5]);
    assert!(reports[2].skipped.is_some());
    assert!(reports[3].skipped.is_some());
}

#[test]
fn test_shutdown_closes_notifications() {
    let harness = Harness::new();
    let mut scheduler = harness.start(GateVariant::Alternating, None);

    scheduler.tick();
    scheduler.tick();
    scheduler.shutdown();

    assert_eq!(harness.notes.closed.get(), 2);
}
