use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use glam::Vec3;
use tracing_subscriber::EnvFilter;
use walkthrough_collision::{Aabb, ProxyDescription, TriangleMeshProxy};
use walkthrough_input::{ControllerSignal, DwellGazeController};
use walkthrough_locomotion::ViewerRig;
use walkthrough_proximity::{
    AnchorInfo, AnchorRegistry, HeadlessPanel, ProximityChange, SceneIndex,
};
use walkthrough_session::{
    FrameDriver, LoadError, LoadSender, LoadedAsset, NoopHooks, WalkthroughConfig,
};
use walkthrough_tools::SessionInspector;

type Driver = FrameDriver<DwellGazeController, HeadlessPanel, NoopHooks>;

#[derive(Parser)]
#[command(name = "walkthrough-cli", about = "Headless walkthrough simulator")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and default tuning
    Info,
    /// Walk a presenting session through proxy and anchor data
    Simulate {
        /// Number of frames to run
        #[arg(short, long, default_value = "600")]
        frames: u32,
        /// Frame interval in milliseconds
        #[arg(long, default_value = "16")]
        dt_ms: u64,
        /// Collision proxy description (JSON)
        #[arg(long)]
        proxy: Option<PathBuf>,
        /// Anchor data: name -> { name, info } (JSON)
        #[arg(long)]
        anchors: Option<PathBuf>,
        /// Scene object positions: name -> [x, y, z] (JSON)
        #[arg(long)]
        scene: Option<PathBuf>,
        /// Engine tuning (JSON)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Never connect a controller; fall back to gaze dwell
        #[arg(long)]
        gaze: bool,
    },
    /// Walk down a built-in corridor past two information boards
    Demo {
        /// Number of frames to run
        #[arg(short, long, default_value = "720")]
        frames: u32,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            let config = WalkthroughConfig::default();
            println!("walkthrough-cli v{}", env!("CARGO_PKG_VERSION"));
            println!(
                "locomotion: speed={} wall_limit={} eye_height={}",
                config.locomotion.speed,
                config.locomotion.wall_limit,
                config.locomotion.eye_height
            );
            println!("input: connect_timeout={:?}", config.input.connect_timeout());
            println!(
                "gaze: dwell={}s tolerance={}deg",
                config.gaze.dwell_secs, config.gaze.steady_tolerance_deg
            );
            println!(
                "proximity: threshold={} panel_offset={}",
                config.proximity.threshold, config.proximity.panel_offset
            );
        }
        Commands::Simulate {
            frames,
            dt_ms,
            proxy,
            anchors,
            scene,
            config,
            gaze,
        } => {
            let config = match config {
                Some(path) => {
                    let json = std::fs::read_to_string(&path)
                        .with_context(|| format!("reading {}", path.display()))?;
                    WalkthroughConfig::from_json(&json)
                        .with_context(|| format!("parsing {}", path.display()))?
                }
                None => WalkthroughConfig::default(),
            };
            let mut driver = new_driver(&config);

            // Loads finish off-thread; the driver picks them up on its first frame.
            let loader = driver.loader();
            std::thread::spawn(move || load_assets(&loader, proxy, anchors, scene))
                .join()
                .map_err(|_| anyhow::anyhow!("loader thread panicked"))?;

            run(&mut driver, frames, Duration::from_millis(dt_ms), !gaze);
        }
        Commands::Demo { frames } => {
            let mut driver =
                new_driver(&WalkthroughConfig::default()).with_rig(ViewerRig::at(Vec3::ZERO));
            let (proxy, anchors, scene) = corridor()?;
            driver.set_proxy(proxy);
            driver.set_anchors(anchors);
            *driver.scene_mut() = scene;
            run(&mut driver, frames, Duration::from_millis(16), true);
        }
    }

    Ok(())
}

fn new_driver(config: &WalkthroughConfig) -> Driver {
    let gaze = config.gaze;
    FrameDriver::new(config, Duration::ZERO, HeadlessPanel::new(), NoopHooks, move || {
        DwellGazeController::new(gaze)
    })
}

/// Present and walk for `frames` frames, printing panel changes as they happen.
fn run(driver: &mut Driver, frames: u32, dt: Duration, controller: bool) {
    if controller {
        driver.controller_signal(0, ControllerSignal::Connected);
        driver.controller_signal(0, ControllerSignal::SelectStart);
    }
    driver.set_presenting(true);

    for i in 0..frames {
        let report = driver.frame(dt * i, None);
        match report.proximity {
            Some(ProximityChange::Shown(name)) => {
                let body = driver
                    .anchors()
                    .and_then(|a| a.get(&name))
                    .map(|info| info.body.as_str())
                    .unwrap_or("");
                println!("[frame {i}] panel: {name} | {body}");
            }
            Some(ProximityChange::Hidden) => println!("[frame {i}] panel hidden"),
            _ => {}
        }
        if report.step.is_some_and(|s| s.blocked) {
            tracing::debug!(frame = i, "blocked by wall");
        }
    }

    println!("{}", SessionInspector::summary(driver));
    println!("{}", SessionInspector::inspect_rig(driver));
}

/// Read the optional data files and hand them to the driver's inbox.
fn load_assets(
    loader: &LoadSender,
    proxy: Option<PathBuf>,
    anchors: Option<PathBuf>,
    scene: Option<PathBuf>,
) {
    if let Some(path) = proxy {
        loader.send(read(&path).and_then(|json| {
            let proxy = ProxyDescription::from_json(&json)?.build()?;
            tracing::info!(triangles = proxy.triangle_count(), "proxy built");
            Ok(LoadedAsset::Proxy(Box::new(proxy)))
        }));
    }
    if let Some(path) = scene {
        loader.send(read(&path).and_then(|json| {
            Ok(LoadedAsset::Scene(SceneIndex::from_json(&json)?))
        }));
    }
    if let Some(path) = anchors {
        loader.send(read(&path).and_then(|json| {
            Ok(LoadedAsset::Anchors(AnchorRegistry::from_json(&json)?))
        }));
    }
}

fn read(path: &Path) -> Result<String, LoadError> {
    Ok(std::fs::read_to_string(path)?)
}

/// A 4-unit wide corridor running toward -Z with a lobby board and a library
/// board along the way.
fn corridor() -> anyhow::Result<(TriangleMeshProxy, AnchorRegistry, SceneIndex)> {
    let proxy = TriangleMeshProxy::from_boxes(
        "corridor",
        &[
            Aabb::new(Vec3::new(-2.0, -1.0, -30.0), Vec3::new(2.0, 0.0, 2.0)),
            Aabb::new(Vec3::new(-3.0, 0.0, -30.0), Vec3::new(-2.0, 3.0, 2.0)),
            Aabb::new(Vec3::new(2.0, 0.0, -30.0), Vec3::new(3.0, 3.0, 2.0)),
            Aabb::new(Vec3::new(-3.0, 0.0, -31.0), Vec3::new(3.0, 3.0, -30.0)),
        ],
    )?;

    let mut anchors = AnchorRegistry::new();
    anchors.insert("Lobby", AnchorInfo::new("Lobby", "Reception and coat check."))?;
    anchors.insert("Library", AnchorInfo::new("Library", "Quiet reading rooms."))?;
    anchors.insert("LobbyShop", AnchorInfo::new("Shop", "Souvenirs between the doors."))?;

    let mut scene = SceneIndex::new();
    scene.insert("Lobby", Vec3::new(-1.5, 0.0, -4.0));
    scene.insert("Library", Vec3::new(1.5, 0.0, -20.0));
    scene.insert("DoorWest", Vec3::new(-1.8, 0.0, -11.0));
    scene.insert("DoorEast", Vec3::new(1.8, 0.0, -11.0));
    scene.insert_midpoint("LobbyShop", "DoorWest", "DoorEast")?;

    Ok((proxy, anchors, scene))
}
