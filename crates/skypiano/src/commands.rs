//! CLI command implementations

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use autoplay::{PlaybackEvent, PlaybackSettings, Scheduler, SessionEnd, SessionId, TracingPort};
use indicatif::{ProgressBar, ProgressStyle};
use keystore::{import_batch, FileStore, KeymapId, KeymapStore, StoreConfig};
use sheet::{export_sheet, KeyAlphabet, KeySchedule, SheetDocument, SheetMeta};
use skyconf::{ConfigSources, SkyConfig};
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};

fn open_store(config: &SkyConfig) -> Result<FileStore> {
    let base = config.paths.keymap_dir();
    FileStore::new(StoreConfig::with_base_path(base.clone()))
        .with_context(|| format!("failed to open keymap store at {}", base.display()))
}

fn read_sheet(path: &Path) -> Result<SheetDocument> {
    let bytes =
        fs::read(path).with_context(|| format!("failed to read sheet: {}", path.display()))?;
    SheetDocument::from_bytes(&bytes).with_context(|| format!("invalid sheet: {}", path.display()))
}

/// Resolve a keymap id from the store, or compile a sheet file.
fn load_target(config: &SkyConfig, target: &str) -> Result<(KeySchedule, SheetMeta)> {
    if let Ok(id) = target.parse::<KeymapId>() {
        let store = open_store(config)?;
        if let Some(schedule) = store.get(&id)? {
            return Ok((schedule, SheetMeta::default()));
        }
    }

    let path = PathBuf::from(target);
    if !path.exists() {
        bail!(
            "'{}' is neither a stored keymap id nor a sheet file\n\n\
             Import a sheet first:\n  \
             skypiano import song.json",
            target
        );
    }

    let doc = read_sheet(&path)?;
    let schedule = doc
        .compile(&KeyAlphabet::default())
        .with_context(|| format!("failed to compile {}", path.display()))?;
    Ok((schedule, doc.meta))
}

/// Import sheets and print one catalog entry per line
pub fn import(config: &SkyConfig, files: &[PathBuf]) -> Result<()> {
    let store = open_store(config)?;
    let report = import_batch(&store, files, &KeyAlphabet::default());

    for entry in &report.imported {
        println!("{}", serde_json::to_string(entry)?);
    }
    for failure in &report.failed {
        eprintln!("{}: {}", failure.path.display(), failure.reason);
    }
    eprintln!("{}", report);

    if report.imported.is_empty() && !report.failed.is_empty() {
        bail!("no sheets imported");
    }
    Ok(())
}

/// Print a sheet's compiled keymap
pub fn compile(file: &Path) -> Result<()> {
    let schedule = read_sheet(file)?
        .compile(&KeyAlphabet::default())
        .with_context(|| format!("failed to compile {}", file.display()))?;
    println!("{}", schedule.to_json());
    Ok(())
}

/// Print a sheet's plaintext note list
pub fn decode(file: &Path) -> Result<()> {
    let doc = read_sheet(file)?;
    if !doc.needs_decoding() {
        info!(path = %file.display(), "sheet is not encrypted");
    }
    let text = doc
        .plain_notes_text()
        .with_context(|| format!("failed to decode {}", file.display()))?;
    println!("{}", text);
    Ok(())
}

pub struct PlayOptions {
    pub from: f64,
    pub speed: Option<f64>,
    pub long_press: bool,
    pub delay_next: Option<f64>,
}

/// Play through the dry-run port, with a progress bar
pub async fn play(config: &SkyConfig, target: &str, opts: PlayOptions) -> Result<()> {
    let (schedule, _meta) = load_target(config, target)?;

    let mut settings = PlaybackSettings::from_config(config);
    if let Some(speed) = opts.speed {
        settings = settings.with_speed(speed);
    }
    if opts.long_press {
        settings = settings.with_long_press(true);
    }
    if let Some(secs) = opts.delay_next {
        let delay = Duration::try_from_secs_f64(secs)
            .with_context(|| format!("invalid --delay-next: {}", secs))?;
        settings = settings.with_delay_next(delay);
    }

    let scheduler = Scheduler::new(Arc::new(TracingPort), settings);
    let mut events = scheduler.subscribe();

    let pb = ProgressBar::new(schedule.total_seconds());
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.cyan} [{bar:40.green/dim}] {pos}/{len}s {msg:.dim}")?
            .progress_chars("█▓▒░ "),
    );
    pb.set_position(opts.from.max(0.0).trunc() as u64);

    let handle = scheduler.play(schedule, opts.from, SessionId::generate());
    let session = handle.id.clone();

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(PlaybackEvent::Progress { session: s, seconds }) if s == session => {
                    pb.set_position(seconds);
                }
                Ok(PlaybackEvent::Finished { session: s }) if s == session => {
                    pb.finish_with_message("finished");
                    break;
                }
                Ok(PlaybackEvent::Stopped { session: s }) if s == session => {
                    pb.abandon_with_message("stopped");
                    break;
                }
                Ok(_) => {}
                Err(RecvError::Lagged(missed)) => {
                    warn!(missed, "progress display fell behind");
                }
                Err(RecvError::Closed) => break,
            },
            _ = tokio::signal::ctrl_c() => {
                scheduler.stop();
            }
        }
    }

    match handle.wait().await? {
        SessionEnd::Failed(e) => bail!("playback failed: {}", e),
        SessionEnd::Finished | SessionEnd::Cancelled => Ok(()),
    }
}

pub struct ExportOptions {
    pub name: Option<String>,
    pub author: Option<String>,
    pub transcribed_by: Option<String>,
    pub bpm: Option<f64>,
    pub encrypt: bool,
}

/// Write a keymap back out as a sheet file
pub fn export(config: &SkyConfig, target: &str, out: &Path, opts: ExportOptions) -> Result<()> {
    let (schedule, mut meta) = load_target(config, target)?;

    if opts.name.is_some() {
        meta.name = opts.name;
    }
    if opts.author.is_some() {
        meta.author = opts.author;
    }
    if opts.transcribed_by.is_some() {
        meta.transcribed_by = opts.transcribed_by;
    }
    if opts.bpm.is_some() {
        meta.bpm = opts.bpm;
    }

    let sheet = export_sheet(&meta, &schedule, &KeyAlphabet::default(), opts.encrypt);
    if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    fs::write(out, sheet.to_string())
        .with_context(|| format!("failed to write {}", out.display()))?;

    info!(path = %out.display(), encrypted = opts.encrypt, "exported sheet");
    Ok(())
}

/// Print the effective configuration and its sources
pub fn config_show(config: &SkyConfig, sources: &ConfigSources) {
    if sources.files.is_empty() {
        println!("# sources: compiled defaults");
    }
    for file in &sources.files {
        println!("# source: {}", file.display());
    }
    for var in &sources.env_overrides {
        println!("# env: {}", var);
    }
    println!();
    print!("{}", config.to_toml());
}
