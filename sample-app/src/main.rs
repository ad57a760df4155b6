mod console_delegate;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;

use photo_capture_core::{
    CaptureConfiguration, CaptureSession, DeviceProfile, EntryHint, EntryMode, FileResultStore,
    OneShotFlag, DEFAULT_ANALYSIS_ENDPOINT,
};
use photo_capture_native::{HttpAnalysisService, PathFilePicker, VirtualCamera, VirtualSurface};

use console_delegate::ConsoleDelegate;

/// Capture a photo (from an image-backed virtual camera or a file) and
/// submit it for analysis.
#[derive(Parser)]
#[command(name = "photo-capture", version)]
struct Cli {
    /// Image file the virtual camera streams
    #[arg(long)]
    camera_image: Option<PathBuf>,

    /// Pick this file from the "gallery" instead of using the camera
    #[arg(long)]
    gallery: Option<PathBuf>,

    /// Route query string, e.g. "mode=gallery"
    #[arg(long, default_value = "")]
    query: String,

    /// Analysis endpoint
    #[arg(long, env = "PHOTO_CAPTURE_ENDPOINT", default_value = DEFAULT_ANALYSIS_ENDPOINT)]
    endpoint: String,

    /// Viewport width used to pick the device profile
    #[arg(long, default_value_t = 1280)]
    viewport_width: u32,

    /// Camera warm-up before the live preview is shown
    #[arg(long, default_value_t = 2000)]
    warmup_ms: u64,

    /// Request timeout
    #[arg(long, default_value_t = 60)]
    timeout_secs: u64,

    /// Where the last analysis result is stored
    #[arg(long)]
    store_dir: Option<PathBuf>,

    /// Refuse camera access, to exercise the error view
    #[arg(long)]
    deny_camera: bool,
}

fn store_dir(cli: &Cli) -> PathBuf {
    cli.store_dir.clone().unwrap_or_else(|| {
        dirs_next::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("photo-capture")
    })
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let flag = OneShotFlag::new();
    if cli.gallery.is_some() {
        flag.set();
    }
    let hint = EntryHint::from_query(cli.query.clone()).with_flag(flag);

    let config = CaptureConfiguration {
        endpoint: cli.endpoint.clone(),
        device_profile: DeviceProfile::detect("", cli.viewport_width),
        warmup: Duration::from_millis(cli.warmup_ms),
        ..Default::default()
    };
    let service = HttpAnalysisService::with_timeout(Duration::from_secs(cli.timeout_secs))?;

    let picker =
        PathFilePicker::with_paths(cli.gallery.clone()).with_max_bytes(config.max_file_bytes);

    let mut builder = CaptureSession::builder_from_hint(&hint)
        .config(config)
        .analysis_service(service)
        .file_picker(picker)
        .result_store(Arc::new(FileResultStore::new(store_dir(&cli))))
        .delegate(Arc::new(ConsoleDelegate));
    if let Some(path) = &cli.camera_image {
        let camera = VirtualCamera::new(path);
        camera.set_permission_denied(cli.deny_camera);
        builder = builder.camera(camera, VirtualSurface::new());
    }

    let session = builder.build().context("invalid session setup")?;
    log::info!("entry mode: {:?}", session.entry_mode());

    session
        .activate()
        .await
        .map_err(|e| anyhow::anyhow!(e.user_message()))?;
    match session.entry_mode() {
        EntryMode::Camera => session
            .capture()
            .map_err(|e| anyhow::anyhow!(e.user_message()))?,
        EntryMode::Gallery if session.captured_frame().is_none() => {
            bail!("no photo selected")
        }
        EntryMode::Gallery => {}
    }

    let handoff = session
        .proceed()
        .await
        .map_err(|e| anyhow::anyhow!(e.user_message()))?;
    println!("{}", serde_json::to_string_pretty(&handoff)?);
    Ok(())
}
