//! Headless demo driver for the folder-view pane.
//!
//! Stands up one pane against an in-memory filesystem and a null device,
//! then pushes it through a realistic session: enumerate, paint, scroll,
//! search, refresh. Useful for exercising the full pipeline without a
//! window system, and as a reference for how a host embeds the pane.

mod stubs;

use anyhow::Result;
use clap::Parser;
use core_config::load_from;
use core_geometry::Scale;
use core_icons::IconCache;
use core_input::{Key, KeyChord};
use core_model::SelectionStats;
use core_overlay::ANIMATION_TICK;
use core_pane::{FolderPane, NavigationRequest, PaneCallbacks, PaneDeps};
use core_render::Theme;
use core_worker::WorkerConfig;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::Once;
use std::time::{Duration, Instant};
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;

/// CLI arguments.
#[derive(Parser, Debug)]
#[command(name = "folderview", version, about = "Folder-view pane demo driver")]
struct Args {
    /// Synthetic folder to open at startup.
    #[arg(long, default_value = "/demo")]
    folder: PathBuf,
    /// Number of synthetic files to populate.
    #[arg(long, default_value_t = 5_000)]
    items: usize,
    /// Demo frames to drive after the listing lands.
    #[arg(long, default_value_t = 120)]
    frames: u32,
    /// Append one synthetic entry every N milliseconds while driving
    /// frames; 0 appends at most once per animation tick.
    #[arg(long)]
    append_interval_ms: Option<u64>,
    /// Optional configuration file path.
    #[arg(long)]
    config: Option<PathBuf>,
}

struct DemoCallbacks;

impl PaneCallbacks for DemoCallbacks {
    fn path_changed(&mut self, path: Option<&Path>) {
        info!(target: "demo.callbacks", path = ?path, "path_changed");
    }
    fn selection_changed(&mut self, stats: &SelectionStats) {
        info!(
            target: "demo.callbacks",
            folders = stats.selected_folders,
            files = stats.selected_files,
            bytes = stats.selected_file_bytes,
            "selection_changed"
        );
    }
    fn enumeration_completed(&mut self, folder: &Path) {
        info!(target: "demo.callbacks", folder = %folder.display(), "enumeration_completed");
    }
    fn navigation_request(&mut self, request: NavigationRequest) {
        info!(target: "demo.callbacks", ?request, "navigation_request");
    }
    fn open_file_request(&mut self, path: &Path) -> bool {
        info!(target: "demo.callbacks", path = %path.display(), "open_file_request");
        true
    }
}

fn configure_logging() -> Option<WorkerGuard> {
    let file_appender = tracing_appender::rolling::never(".", "folderview.log");
    let (writer, guard) = tracing_appender::non_blocking(file_appender);
    match tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(writer)
        .try_init()
    {
        Ok(()) => Some(guard),
        Err(_) => None, // subscriber already installed
    }
}

fn install_panic_hook() {
    static HOOK: Once = Once::new();
    HOOK.call_once(|| {
        let default_panic = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |panic_info| {
            error!(target: "demo.panic", ?panic_info, "panic");
            default_panic(panic_info);
        }));
    });
}

fn main() -> Result<()> {
    let _log_guard = configure_logging();
    install_panic_hook();
    let args = Args::parse();
    let settings = load_from(args.config.clone());
    info!(target: "demo", items = args.items, folder = %args.folder.display(), "startup");

    let source = Arc::new(stubs::DemoSource::populate(&args.folder, args.items));
    let backend = Arc::new(stubs::DemoIconBackend::default());
    let cache = Arc::new(IconCache::new(backend.clone(), 48 * 1024 * 1024));
    cache.set_special_folders(vec![args.folder.join("Desktop")]);

    let mut pane = FolderPane::new(PaneDeps {
        source: source.clone(),
        icon_cache: Arc::clone(&cache),
        device_factory: Box::new(stubs::NullDeviceFactory::default()),
        text_engine: Box::new(stubs::DemoTextEngine),
        callbacks: Box::new(DemoCallbacks),
        theme: Theme::default(),
        settings: settings.pane.left.clone(),
        worker_config: WorkerConfig::default(),
    });
    pane.set_client((1280, 720), Scale::from_dpi(96));
    pane.set_folder(Some(args.folder.clone()), Instant::now());

    // Wait for the listing; debug-build sorts of huge listings take a
    // moment.
    let deadline = Instant::now() + Duration::from_secs(30);
    while pane.adopted_generation() != pane.generation() {
        pane.pump_messages(Instant::now());
        if Instant::now() > deadline {
            anyhow::bail!("enumeration did not complete");
        }
        std::thread::sleep(Duration::from_millis(2));
    }
    info!(target: "demo", items = pane.model().len(), "listing_adopted");

    // Drive frames: paint, scroll, type a search, refresh midway.
    let append_every = args.append_interval_ms.map(Duration::from_millis);
    let mut next_append = Instant::now();
    for frame in 0..args.frames {
        let now = Instant::now();
        pane.pump_messages(now);
        pane.tick(now);

        match frame {
            10 => pane.wheel(-360.0, false, now),
            30 => {
                for c in "file0042".chars() {
                    pane.key_event(KeyChord::plain(Key::Char(c)), now);
                }
            }
            50 => pane.key_event(KeyChord::plain(Key::Esc), now),
            60 => pane.force_refresh(now),
            _ => {}
        }

        // Demo append pacing: interval 0 degrades to once per tick; the
        // deadline derives from the tick timestamp so nothing else starves.
        if let Some(interval) = append_every {
            if now >= next_append {
                source.append_entry();
                pane.force_refresh(now);
                next_append = now + interval.max(ANIMATION_TICK);
            }
        }

        if let Err(e) = pane.render(now) {
            error!(target: "demo", error = %e, frame, "render_failed_recovering");
        }
        std::thread::sleep(ANIMATION_TICK);
    }

    let stats = pane.renderer().present_stats();
    info!(
        target: "demo",
        fulls = stats.full_presents,
        partials = stats.partial_presents,
        degraded = stats.degraded_to_full,
        icon_cache = ?cache.stats(),
        "session_complete"
    );
    println!(
        "items={} presents(full={}, partial={}) icons={:?}",
        pane.model().len(),
        stats.full_presents,
        stats.partial_presents,
        cache.stats()
    );
    Ok(())
}
