use std::time::Duration;

use glam::Vec3;
use walkthrough_collision::CollisionProxy;
use walkthrough_common::Transform;
use walkthrough_input::{
    ControllerSignal, Controllers, GazeController, InputModeSelector, ModeKind,
};
use walkthrough_locomotion::{LocomotionEngine, StepOutcome, ViewerRig};
use walkthrough_proximity::{
    AnchorRegistry, InfoPanel, ProximityChange, ProximityTrigger, SceneIndex,
};

use crate::config::WalkthroughConfig;
use crate::hooks::{SessionHooks, Viewport};
use crate::inbox::{LoadInbox, LoadSender, LoadedAsset};
use crate::timing::FrameTimer;

/// Per-frame device data supplied by the presentation session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameState {
    /// Tracked head pose, local to the dolly.
    pub head: Transform,
}

/// Presentation edge observed during a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presentation {
    Entered,
    Exited,
}

/// What one `frame` call did.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameReport {
    /// Zero-based index of this frame.
    pub frame: u64,
    pub dt: Duration,
    pub movement_requested: bool,
    /// Set when the locomotion engine ran.
    pub step: Option<StepOutcome>,
    /// Set when the proximity trigger ran.
    pub proximity: Option<ProximityChange>,
    pub transition: Option<Presentation>,
}

/// Owns all walkthrough state and runs it once per display refresh.
///
/// Host events (controller signals, presentation state, resize) are applied
/// between frames through the entry points below; loaders deliver through
/// [`LoadSender`]s obtained from [`FrameDriver::loader`].
pub struct FrameDriver<G, P, H> {
    rig: ViewerRig,
    controllers: Controllers,
    selector: InputModeSelector<G>,
    make_gaze: Box<dyn FnMut() -> G>,
    locomotion: LocomotionEngine,
    proximity: ProximityTrigger,
    panel: P,
    hooks: H,
    proxy: Option<Box<dyn CollisionProxy + Send>>,
    anchors: Option<AnchorRegistry>,
    scene: SceneIndex,
    inbox: LoadInbox,
    presenting: bool,
    was_presenting: bool,
    viewport: Viewport,
    last_timestamp: Option<Duration>,
    frame_count: u64,
    timer: FrameTimer,
}

impl<G, P, H> FrameDriver<G, P, H>
where
    G: GazeController,
    P: InfoPanel,
    H: SessionHooks,
{
    /// Driver for a session that started at `session_start`. The input mode
    /// is decided by `session_start + input.connect_timeout` at the latest.
    ///
    /// `make_gaze` builds the gaze fallback if no controller connects in time.
    pub fn new(
        config: &WalkthroughConfig,
        session_start: Duration,
        panel: P,
        hooks: H,
        make_gaze: impl FnMut() -> G + 'static,
    ) -> Self {
        Self {
            rig: ViewerRig::default(),
            controllers: Controllers::new(),
            selector: InputModeSelector::new(session_start, &config.input),
            make_gaze: Box::new(make_gaze),
            locomotion: LocomotionEngine::new(config.locomotion),
            proximity: ProximityTrigger::new(config.proximity),
            panel,
            hooks,
            proxy: None,
            anchors: None,
            scene: SceneIndex::new(),
            inbox: LoadInbox::new(),
            presenting: false,
            was_presenting: false,
            viewport: Viewport::default(),
            last_timestamp: None,
            frame_count: 0,
            timer: FrameTimer::default(),
        }
    }

    /// Start the viewer somewhere other than the default pose.
    pub fn with_rig(mut self, rig: ViewerRig) -> Self {
        self.rig = rig;
        self
    }

    /// Run one frame. `frame` is `None` when the device supplied no pose.
    pub fn frame(&mut self, timestamp: Duration, frame: Option<&FrameState>) -> FrameReport {
        let _span = tracing::info_span!("frame", n = self.frame_count).entered();

        self.drain_inbox();

        let dt = match self.last_timestamp {
            Some(previous) => timestamp.saturating_sub(previous),
            None => Duration::ZERO,
        };
        self.last_timestamp = Some(self.last_timestamp.map_or(timestamp, |t| t.max(timestamp)));

        if let Some(frame) = frame {
            self.rig.set_head_pose(frame.head);
        }

        let make_gaze = &mut self.make_gaze;
        self.selector.poll(timestamp, || make_gaze());

        let mut report = FrameReport {
            frame: self.frame_count,
            dt,
            movement_requested: false,
            step: None,
            proximity: None,
            transition: None,
        };

        if self.presenting {
            let dt_secs = dt.as_secs_f32();
            let head = self.rig.head_world();
            report.movement_requested =
                self.selector
                    .is_movement_requested(&self.controllers, &head, dt_secs);

            if report.movement_requested {
                report.step = Some(self.locomotion.advance(
                    &mut self.rig,
                    self.proxy.as_deref(),
                    dt_secs,
                ));

                if let Some(anchors) = &self.anchors {
                    report.proximity = Some(self.proximity.update(
                        self.rig.position(),
                        self.rig.head_world_position(),
                        anchors,
                        &self.scene,
                        &mut self.panel,
                    ));
                }
            }
        }

        report.transition = self.detect_transition();

        self.timer.record(dt);
        self.frame_count += 1;
        tracing::trace!(dt = ?dt, moved = report.step.is_some(), "frame complete");
        report
    }

    /// Controller event for slot `index`. A connection decides controller
    /// mode unless the mode is already decided.
    pub fn controller_signal(&mut self, index: usize, signal: ControllerSignal) {
        if self.controllers.apply(index, signal) && signal == ControllerSignal::Connected {
            self.selector.on_controller_connected();
        }
    }

    /// Presentation state as reported by the session; takes effect at the
    /// next frame.
    pub fn set_presenting(&mut self, presenting: bool) {
        self.presenting = presenting;
    }

    /// Host surface changed size.
    pub fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.hooks.resize(viewport);
    }

    /// Write end for asynchronous loaders.
    pub fn loader(&self) -> LoadSender {
        self.inbox.sender()
    }

    /// Install a proxy directly, for hosts that load synchronously.
    pub fn set_proxy(&mut self, proxy: impl CollisionProxy + Send + 'static) {
        self.proxy = Some(Box::new(proxy));
    }

    pub fn set_anchors(&mut self, anchors: AnchorRegistry) {
        self.anchors = Some(anchors);
        self.proximity.reset();
    }

    pub fn scene_mut(&mut self) -> &mut SceneIndex {
        &mut self.scene
    }

    pub fn rig(&self) -> &ViewerRig {
        &self.rig
    }

    pub fn position(&self) -> Vec3 {
        self.rig.position()
    }

    pub fn controllers(&self) -> &Controllers {
        &self.controllers
    }

    pub fn mode(&self) -> ModeKind {
        self.selector.kind()
    }

    pub fn selector(&self) -> &InputModeSelector<G> {
        &self.selector
    }

    pub fn is_presenting(&self) -> bool {
        self.presenting
    }

    pub fn has_proxy(&self) -> bool {
        self.proxy.is_some()
    }

    pub fn anchors(&self) -> Option<&AnchorRegistry> {
        self.anchors.as_ref()
    }

    pub fn scene(&self) -> &SceneIndex {
        &self.scene
    }

    pub fn shown_anchor(&self) -> Option<&str> {
        self.proximity.shown()
    }

    pub fn panel(&self) -> &P {
        &self.panel
    }

    pub fn hooks(&self) -> &H {
        &self.hooks
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn timer(&self) -> &FrameTimer {
        &self.timer
    }

    fn drain_inbox(&mut self) {
        for delivery in self.inbox.drain() {
            match delivery {
                Ok(LoadedAsset::Proxy(proxy)) => {
                    tracing::info!("collision proxy ready");
                    self.proxy = Some(proxy);
                }
                Ok(LoadedAsset::Anchors(anchors)) => {
                    tracing::info!(anchors = anchors.len(), "anchor registry ready");
                    self.set_anchors(anchors);
                }
                Ok(LoadedAsset::Scene(scene)) => {
                    tracing::info!(objects = scene.len(), "scene index ready");
                    self.scene = scene;
                }
                Err(e) => tracing::warn!(error = %e, "asset load failed"),
            }
        }
    }

    fn detect_transition(&mut self) -> Option<Presentation> {
        if self.presenting == self.was_presenting {
            return None;
        }
        self.was_presenting = self.presenting;
        self.hooks.resize(self.viewport);
        let edge = if self.presenting {
            self.hooks.on_enter_immersive();
            Presentation::Entered
        } else {
            self.hooks.on_exit_immersive();
            Presentation::Exited
        };
        tracing::info!(?edge, "presentation changed");
        Some(edge)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Quat;
    use walkthrough_collision::{Aabb, TriangleMeshProxy};
    use walkthrough_input::{DwellGazeController, GazeConfig};
    use walkthrough_proximity::{AnchorInfo, HeadlessPanel, TITLE_KEY};

    use crate::inbox::LoadError;

    #[derive(Debug, Default)]
    struct RecordingHooks {
        resizes: Vec<Viewport>,
        entered: u32,
        exited: u32,
    }

    impl SessionHooks for RecordingHooks {
        fn resize(&mut self, viewport: Viewport) {
            self.resizes.push(viewport);
        }

        fn on_enter_immersive(&mut self) {
            self.entered += 1;
        }

        fn on_exit_immersive(&mut self) {
            self.exited += 1;
        }
    }

    type Driver = FrameDriver<DwellGazeController, HeadlessPanel, RecordingHooks>;

    const MS: Duration = Duration::from_millis(1);

    fn driver() -> Driver {
        FrameDriver::new(
            &WalkthroughConfig::default(),
            Duration::ZERO,
            HeadlessPanel::new(),
            RecordingHooks::default(),
            || DwellGazeController::new(GazeConfig::default()),
        )
        .with_rig(ViewerRig::at(Vec3::ZERO))
    }

    fn floor() -> TriangleMeshProxy {
        TriangleMeshProxy::from_boxes(
            "floor",
            &[Aabb::new(Vec3::new(-50.0, -1.0, -50.0), Vec3::new(50.0, 0.0, 50.0))],
        )
        .unwrap()
    }

    fn walking_driver() -> Driver {
        let mut d = driver();
        d.set_proxy(floor());
        d.controller_signal(0, ControllerSignal::Connected);
        d.controller_signal(0, ControllerSignal::SelectStart);
        d.set_presenting(true);
        d
    }

    #[test]
    fn first_frame_has_zero_dt() {
        let mut d = walking_driver();
        let report = d.frame(Duration::from_secs(5), None);
        assert_eq!(report.dt, Duration::ZERO);
        assert!(report.movement_requested);
        assert_eq!(report.step.map(|s| s.forward), Some(0.0));
    }

    #[test]
    fn walks_forward_while_select_held() {
        let mut d = walking_driver();
        d.frame(Duration::ZERO, None);
        let report = d.frame(500 * MS, None);
        assert_eq!(report.dt, 500 * MS);
        let step = report.step.unwrap();
        assert!((step.forward - 1.0).abs() < 1e-5);
        assert!((d.position().z + 1.0).abs() < 1e-5);
    }

    #[test]
    fn backwards_timestamp_gives_zero_dt() {
        let mut d = walking_driver();
        d.frame(100 * MS, None);
        let report = d.frame(50 * MS, None);
        assert_eq!(report.dt, Duration::ZERO);
        let report = d.frame(150 * MS, None);
        assert_eq!(report.dt, 50 * MS);
    }

    #[test]
    fn not_presenting_skips_locomotion() {
        let mut d = walking_driver();
        d.set_presenting(false);
        d.frame(Duration::ZERO, None);
        let report = d.frame(MS * 100, None);
        assert!(!report.movement_requested);
        assert_eq!(report.step, None);
        assert_eq!(d.position(), Vec3::ZERO);
    }

    #[test]
    fn select_released_stops_movement() {
        let mut d = walking_driver();
        d.frame(Duration::ZERO, None);
        d.controller_signal(0, ControllerSignal::SelectEnd);
        let report = d.frame(100 * MS, None);
        assert!(!report.movement_requested);
        assert_eq!(d.position(), Vec3::ZERO);
    }

    #[test]
    fn missing_proxy_is_a_noop_step() {
        let mut d = driver();
        d.controller_signal(1, ControllerSignal::Connected);
        d.controller_signal(1, ControllerSignal::SelectStart);
        d.set_presenting(true);
        d.frame(Duration::ZERO, None);
        let report = d.frame(100 * MS, None);
        assert!(report.movement_requested);
        assert!(report.step.unwrap().skipped);
        assert_eq!(d.position(), Vec3::ZERO);
    }

    #[test]
    fn head_pose_applied_before_moving() {
        let mut d = walking_driver();
        let turned = FrameState {
            head: Transform::from_position(Vec3::new(0.0, 1.6, 0.0))
                .with_rotation(Quat::from_rotation_y(-std::f32::consts::FRAC_PI_2)),
        };
        d.frame(Duration::ZERO, Some(&turned));
        d.frame(500 * MS, Some(&turned));
        // Yawing -90 degrees faces +X.
        assert!((d.position().x - 1.0).abs() < 1e-4);
        assert!(d.position().z.abs() < 1e-4);
    }

    #[test]
    fn controller_connected_before_timeout() {
        let mut d = driver();
        d.frame(Duration::ZERO, None);
        d.controller_signal(0, ControllerSignal::Connected);
        d.frame(3000 * MS, None);
        assert_eq!(d.mode(), ModeKind::Controller);
    }

    #[test]
    fn timeout_falls_back_to_gaze() {
        let mut d = driver();
        d.frame(Duration::ZERO, None);
        d.frame(1999 * MS, None);
        assert_eq!(d.mode(), ModeKind::Undecided);
        d.frame(2000 * MS, None);
        assert_eq!(d.mode(), ModeKind::Gaze);

        d.controller_signal(0, ControllerSignal::Connected);
        assert_eq!(d.mode(), ModeKind::Gaze);
        assert!(d.controllers().any_connected());
    }

    #[test]
    fn gaze_dwell_moves_viewer() {
        let mut d = driver();
        d.set_proxy(floor());
        d.set_presenting(true);
        d.frame(2000 * MS, None);
        assert_eq!(d.mode(), ModeKind::Gaze);

        let mut t = 2000 * MS;
        let mut moved = false;
        for _ in 0..40 {
            t += 100 * MS;
            moved |= d.frame(t, None).step.is_some();
        }
        assert!(moved);
        assert!(d.position().z < 0.0);
    }

    #[test]
    fn presentation_hooks_fire_once_per_edge() {
        let mut d = driver();
        d.frame(Duration::ZERO, None);
        d.set_presenting(true);
        let report = d.frame(10 * MS, None);
        assert_eq!(report.transition, Some(Presentation::Entered));
        for i in 2..5u32 {
            assert_eq!(d.frame(i * 10 * MS, None).transition, None);
        }
        d.set_presenting(false);
        assert_eq!(d.frame(60 * MS, None).transition, Some(Presentation::Exited));
        d.frame(70 * MS, None);

        assert_eq!(d.hooks().entered, 1);
        assert_eq!(d.hooks().exited, 1);
        assert_eq!(d.hooks().resizes.len(), 2);
    }

    #[test]
    fn resize_forwards_to_hooks() {
        let mut d = driver();
        let viewport = Viewport {
            width: 800,
            height: 600,
        };
        d.resize(viewport);
        assert_eq!(d.viewport(), viewport);
        assert_eq!(d.hooks().resizes, vec![viewport]);
    }

    #[test]
    fn loader_results_apply_at_next_frame() {
        let mut d = driver();
        let loader = d.loader();
        let proxy = floor();
        std::thread::spawn(move || loader.deliver(LoadedAsset::Proxy(Box::new(proxy))))
            .join()
            .unwrap();
        assert!(!d.has_proxy());
        d.frame(Duration::ZERO, None);
        assert!(d.has_proxy());
    }

    #[test]
    fn load_failure_does_not_halt_frames() {
        let mut d = walking_driver();
        d.loader().fail(LoadError::Failed {
            what: "anchors".into(),
            reason: "not found".into(),
        });
        d.frame(Duration::ZERO, None);
        let report = d.frame(100 * MS, None);
        assert!(report.step.is_some());
        assert!(d.anchors().is_none());
    }

    #[test]
    fn proximity_inert_without_registry() {
        let mut d = walking_driver();
        d.scene_mut().insert("Lobby", Vec3::ZERO);
        d.frame(Duration::ZERO, None);
        let report = d.frame(100 * MS, None);
        assert!(report.step.is_some());
        assert_eq!(report.proximity, None);
        assert!(!d.panel().visible);
    }

    #[test]
    fn walking_near_anchor_shows_panel() {
        let mut d = walking_driver();
        let mut anchors = AnchorRegistry::new();
        anchors.insert("Lobby", AnchorInfo::new("Lobby", "Welcome")).unwrap();
        let mut scene = SceneIndex::new();
        scene.insert("Lobby", Vec3::new(0.0, 0.0, -2.0));
        let loader = d.loader();
        loader.deliver(LoadedAsset::Anchors(anchors));
        loader.deliver(LoadedAsset::Scene(scene));

        assert_eq!(
            d.frame(Duration::ZERO, None).proximity,
            Some(ProximityChange::Shown("Lobby".into()))
        );
        assert_eq!(d.shown_anchor(), Some("Lobby"));
        assert_eq!(d.panel().element(TITLE_KEY), Some("Lobby"));
        assert_eq!(d.frame(100 * MS, None).proximity, Some(ProximityChange::Unchanged));
    }

    #[test]
    fn proximity_only_runs_while_moving() {
        let mut d = walking_driver();
        let mut anchors = AnchorRegistry::new();
        anchors.insert("Lobby", AnchorInfo::new("Lobby", "Welcome")).unwrap();
        d.set_anchors(anchors);
        d.scene_mut().insert("Lobby", Vec3::new(0.0, 0.0, -1.0));
        d.controller_signal(0, ControllerSignal::SelectEnd);

        d.frame(Duration::ZERO, None);
        let report = d.frame(100 * MS, None);
        assert_eq!(report.proximity, None);
        assert_eq!(d.shown_anchor(), None);
    }

    #[test]
    fn frame_stats_recorded() {
        let mut d = driver();
        for i in 0..5u32 {
            d.frame(i * 10 * MS, None);
        }
        assert_eq!(d.frame_count(), 5);
        assert_eq!(d.timer().max(), 10 * MS);
    }
}
