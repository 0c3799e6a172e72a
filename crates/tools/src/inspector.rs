use walkthrough_input::{GazeController, ModeKind};
use walkthrough_proximity::InfoPanel;
use walkthrough_session::{FrameDriver, SessionHooks};

/// Session inspector for developer tooling.
///
/// Provides read-only queries against a frame driver for debugging and
/// headless runs.
pub struct SessionInspector;

impl SessionInspector {
    /// Produce a summary of the session state.
    pub fn summary<G, P, H>(driver: &FrameDriver<G, P, H>) -> SessionSummary
    where
        G: GazeController,
        P: InfoPanel,
        H: SessionHooks,
    {
        let p = driver.position();
        SessionSummary {
            frame: driver.frame_count(),
            mode: driver.mode(),
            presenting: driver.is_presenting(),
            position: [p.x, p.y, p.z],
            shown_anchor: driver.shown_anchor().map(str::to_string),
            proxy_loaded: driver.has_proxy(),
            anchor_count: driver.anchors().map(|a| a.len()),
            avg_fps: driver.timer().fps(),
        }
    }

    /// Dolly and head placement of the viewer.
    pub fn inspect_rig<G, P, H>(driver: &FrameDriver<G, P, H>) -> RigInfo
    where
        G: GazeController,
        P: InfoPanel,
        H: SessionHooks,
    {
        let rig = driver.rig();
        let p = rig.position();
        let h = rig.head_world_position();
        let f = rig.head_world().forward();
        RigInfo {
            position: [p.x, p.y, p.z],
            head: [h.x, h.y, h.z],
            forward: [f.x, f.y, f.z],
        }
    }
}

/// Summary of session state for the inspector.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSummary {
    pub frame: u64,
    pub mode: ModeKind,
    pub presenting: bool,
    pub position: [f32; 3],
    pub shown_anchor: Option<String>,
    pub proxy_loaded: bool,
    /// `None` until anchor data has arrived.
    pub anchor_count: Option<usize>,
    pub avg_fps: f32,
}

impl std::fmt::Display for SessionSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Session: frame={} mode={} presenting={} pos=({:.2}, {:.2}, {:.2}) panel={} proxy={} anchors={} fps={:.1}",
            self.frame,
            self.mode,
            self.presenting,
            self.position[0],
            self.position[1],
            self.position[2],
            self.shown_anchor.as_deref().unwrap_or("-"),
            if self.proxy_loaded { "loaded" } else { "pending" },
            self.anchor_count.map_or_else(|| "pending".to_string(), |n| n.to_string()),
            self.avg_fps,
        )
    }
}

/// Placement of the viewer rig.
#[derive(Debug, Clone, PartialEq)]
pub struct RigInfo {
    pub position: [f32; 3],
    pub head: [f32; 3],
    pub forward: [f32; 3],
}

impl std::fmt::Display for RigInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Rig pos=({:.2}, {:.2}, {:.2}) head=({:.2}, {:.2}, {:.2}) forward=({:.2}, {:.2}, {:.2})",
            self.position[0],
            self.position[1],
            self.position[2],
            self.head[0],
            self.head[1],
            self.head[2],
            self.forward[0],
            self.forward[1],
            self.forward[2],
        )
    }
}
