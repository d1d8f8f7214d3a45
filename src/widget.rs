// Copyright (c) 2026 rezky_nightky

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crossterm::event::Event;
use rand::rngs::StdRng;
use tracing::info;

use crate::config::Settings;
use crate::frame::Frame;
use crate::input::{Disposition, PointerTracker};
use crate::layout::Viewport;
use crate::raster::Rasterizer;
use crate::scene::Scene;

#[derive(Clone, Debug, Default)]
pub struct LoopHandle {
    cancelled: Arc<AtomicBool>,
}

impl LoopHandle {
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Lifecycle {
    Created,
    Running,
    Stopped,
}

pub struct Widget {
    scene: Scene,
    pointer: PointerTracker,
    raster: Rasterizer,
    handle: LoopHandle,
    state: Lifecycle,
}

impl Widget {
    pub fn new(settings: Settings, raster: Rasterizer, cols: u16, rows: u16, rng: StdRng) -> Self {
        let scene = Scene::new(settings, Viewport::from_cells(cols, rows), rng);
        info!(particles = scene.particles().len(), cols, rows, "widget created");
        Self {
            scene,
            pointer: PointerTracker::default(),
            raster,
            handle: LoopHandle::default(),
            state: Lifecycle::Created,
        }
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    pub fn pointer(&self) -> &PointerTracker {
        &self.pointer
    }

    pub fn state(&self) -> Lifecycle {
        if self.state == Lifecycle::Running && self.handle.is_cancelled() {
            return Lifecycle::Stopped;
        }
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state() == Lifecycle::Running
    }

    pub fn start(&mut self) -> LoopHandle {
        if self.state == Lifecycle::Created {
            self.state = Lifecycle::Running;
            info!("frame loop started");
        }
        self.handle.clone()
    }

    pub fn stop(&mut self) {
        self.handle.cancel();
        if self.state != Lifecycle::Stopped {
            self.state = Lifecycle::Stopped;
            info!("frame loop stopped");
        }
    }

    pub fn handle_event(&mut self, ev: &Event) -> Disposition {
        self.pointer.handle(ev)
    }

    pub fn resize(&mut self, cols: u16, rows: u16) {
        self.pointer.reset();
        self.scene.resize(Viewport::from_cells(cols, rows));
    }

    /// Run one tick and paint it into `frame`. Returns `false` once the loop
    /// is cancelled, and then leaves `frame` untouched.
    pub fn frame(&mut self, dt: f32, frame: &mut Frame) -> bool {
        if !self.is_running() {
            return false;
        }
        self.scene.step(dt, self.pointer.pointer());
        self.scene.paint();
        self.raster.draw(self.scene.canvas(), frame);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Pointer;
    use crate::runtime::ColorMode;
    use crossterm::event::{KeyModifiers, MouseEvent, MouseEventKind};
    use rand::SeedableRng;

    fn widget(cols: u16, rows: u16) -> Widget {
        Widget::new(
            Settings::default(),
            Rasterizer {
                color_mode: ColorMode::TrueColor,
                default_background: false,
            },
            cols,
            rows,
            StdRng::seed_from_u64(9),
        )
    }

    #[test]
    fn frames_only_render_while_running() {
        let mut w = widget(40, 12);
        let mut f = Frame::new(40, 12, None);
        f.clear_dirty();

        assert_eq!(w.state(), Lifecycle::Created);
        assert!(!w.frame(1.0 / 60.0, &mut f));

        let handle = w.start();
        assert!(w.frame(1.0 / 60.0, &mut f));
        assert!(f.has_changes());

        f.clear_dirty();
        handle.cancel();
        assert_eq!(w.state(), Lifecycle::Stopped);
        assert!(!w.frame(1.0 / 60.0, &mut f));
        assert!(!f.has_changes());

        w.start();
        assert!(!w.is_running());
    }

    #[test]
    fn resize_while_paused_still_paints_the_new_frame() {
        let mut w = widget(40, 12);
        w.start();
        w.scene_mut().toggle_pause();

        w.resize(60, 20);
        let mut f = Frame::new(60, 20, None);
        f.clear_dirty();
        assert!(w.frame(1.0 / 60.0, &mut f));
        assert!(w.scene().is_paused());
        assert!(f.has_changes());

        let lit = f.rows().flatten().filter(|c| c.ch != ' ').count();
        assert!(lit > 0);
    }

    #[test]
    fn stop_cancels_outstanding_handles() {
        let mut w = widget(20, 10);
        let handle = w.start();
        w.stop();
        assert!(handle.is_cancelled());
        assert_eq!(w.state(), Lifecycle::Stopped);
    }

    #[test]
    fn pointer_events_reach_the_scene_and_resize_clears_them() {
        let mut w = widget(40, 12);
        w.handle_event(&Event::Mouse(MouseEvent {
            kind: MouseEventKind::Moved,
            column: 4,
            row: 2,
            modifiers: KeyModifiers::NONE,
        }));
        assert_eq!(w.pointer().pointer(), Pointer::at(4.5, 5.0));

        w.resize(80, 24);
        assert!(w.pointer().pointer().is_far());
        assert_eq!(w.scene().viewport(), Viewport::new(80.0, 48.0));
        assert_eq!(w.scene().particles().len(), 345);
    }
}
