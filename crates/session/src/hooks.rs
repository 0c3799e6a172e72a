/// Output surface size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
        }
    }
}

impl Viewport {
    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }
}

/// Side effects owned by external collaborators (renderer, audio).
///
/// The driver calls `resize` on every presentation transition and on host
/// resize events, then `on_enter_immersive` or `on_exit_immersive` once per
/// transition.
pub trait SessionHooks {
    fn resize(&mut self, viewport: Viewport);

    /// First frame of an immersive session, e.g. start background audio.
    fn on_enter_immersive(&mut self) {}

    fn on_exit_immersive(&mut self) {}
}

/// Hooks that do nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHooks;

impl SessionHooks for NoopHooks {
    fn resize(&mut self, _viewport: Viewport) {}
}
