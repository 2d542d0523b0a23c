use std::sync::Arc;

use anyhow::Result;
use gonogo_core::Screen;
use gonogo_experiment::{Sequencer, SequencerSignal};
use gonogo_render::{FrameView, SkiaRenderer};
use gonogo_timing::{Clock, HighPrecisionClock};
use pixels::{Pixels, SurfaceTexture};
use rand::rngs::StdRng;
use tracing::{error, info, warn};
use winit::{
    application::ApplicationHandler,
    dpi::{LogicalSize, PhysicalPosition, PhysicalSize},
    event::{ElementState, MouseButton, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use crate::report::{log_outcome, log_summary, Report};

type TaskSequencer = Sequencer<HighPrecisionClock, StdRng>;

pub struct App {
    window: Option<Arc<Window>>,
    pixels: Option<Pixels<'static>>,
    renderer: Option<SkiaRenderer>,
    sequencer: TaskSequencer,
    screen: Screen,
    cursor: PhysicalPosition<f64>,
    abort_guard: AbortGuard,

    should_exit: bool,
}

/// Escape must be pressed twice within `window_ms` to abort a run.
#[derive(Debug, Clone)]
struct AbortGuard {
    armed_at_ms: Option<u64>,
    window_ms: u64,
}

impl AbortGuard {
    fn new(window_ms: u64) -> Self {
        Self {
            armed_at_ms: None,
            window_ms,
        }
    }

    /// Returns true when this press confirms an earlier one.
    fn press(&mut self, now_ms: u64) -> bool {
        match self.armed_at_ms.take() {
            Some(armed) if now_ms.saturating_sub(armed) <= self.window_ms => true,
            _ => {
                self.armed_at_ms = Some(now_ms);
                false
            }
        }
    }

    fn reset(&mut self) {
        self.armed_at_ms = None;
    }
}

/// What the current screen should show. Kept free of `&mut self` so the
/// renderer can be borrowed alongside it.
fn frame_view<'a>(screen: Screen, sequencer: &'a TaskSequencer) -> FrameView<'a> {
    match (screen, sequencer.summary()) {
        (Screen::Profile, _) => FrameView::Profile,
        (Screen::Result, Some(summary)) => FrameView::Result { summary },
        (Screen::Task, _) | (Screen::Result, None) => FrameView::Task {
            state: sequencer.state(),
            stimulus: sequencer.visible_stimulus(),
            progress: sequencer.progress(),
        },
    }
}

impl App {
    pub fn new(sequencer: TaskSequencer) -> Self {
        Self {
            window: None,
            pixels: None,
            renderer: None,
            sequencer,
            screen: Screen::default(),
            cursor: PhysicalPosition::new(0.0, 0.0),
            abort_guard: AbortGuard::new(2000),
            should_exit: false,
        }
    }

    pub fn run(mut self) -> Result<()> {
        let event_loop = EventLoop::new()?;
        info!(
            os = std::env::consts::OS,
            arch = std::env::consts::ARCH,
            "click START to begin; ESC twice aborts a run, once goes back or quits"
        );
        event_loop.run_app(&mut self)?;
        Ok(())
    }

    fn create_window_and_surface(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let refresh_rate = event_loop
            .primary_monitor()
            .or_else(|| event_loop.available_monitors().next())
            .and_then(|m| m.refresh_rate_millihertz())
            .map(|rate| rate as f64 / 1000.0);

        let window_attributes = Window::default_attributes()
            .with_title("Go / No-Go")
            .with_inner_size(LogicalSize::new(1024.0, 768.0))
            .with_min_inner_size(LogicalSize::new(480.0, 360.0));

        let window = Arc::new(event_loop.create_window(window_attributes)?);
        let physical_size = window.inner_size();
        info!(
            width = physical_size.width,
            height = physical_size.height,
            scale_factor = window.scale_factor(),
            refresh_hz = ?refresh_rate,
            "display configured"
        );

        let surface_texture =
            SurfaceTexture::new(physical_size.width, physical_size.height, window.clone());
        self.pixels = Some(Pixels::new(
            physical_size.width,
            physical_size.height,
            surface_texture,
        )?);
        self.renderer = Some(SkiaRenderer::new(
            physical_size.width,
            physical_size.height,
        )?);

        window.request_redraw();
        self.window = Some(window);
        Ok(())
    }

    fn render(&mut self) -> Result<()> {
        let (Some(pixels), Some(renderer)) = (self.pixels.as_mut(), self.renderer.as_mut()) else {
            return Ok(());
        };
        let view = frame_view(self.screen, &self.sequencer);
        renderer.render_frame(&view, pixels.frame_mut())?;
        pixels.render()?;
        Ok(())
    }

    fn update(&mut self) -> Result<()> {
        let signals = self.sequencer.update()?;
        self.handle_signals(signals)
    }

    fn handle_signals(&mut self, signals: Vec<SequencerSignal>) -> Result<()> {
        for signal in signals {
            match signal {
                SequencerSignal::OutcomeRecorded(outcome) => log_outcome(&outcome)?,
                SequencerSignal::Completed(summary) => {
                    self.abort_guard.reset();
                    log_summary(&summary)?;
                    println!("{}", Report::new(self.sequencer.results(), &summary));
                    self.screen = Screen::Result;
                }
                SequencerSignal::Aborted { .. } => {
                    self.abort_guard.reset();
                    self.screen = Screen::Profile;
                }
                SequencerSignal::StimulusShown { .. } | SequencerSignal::StimulusHidden { .. } => {}
            }
        }
        Ok(())
    }

    fn handle_click(&mut self) {
        let pos = (self.cursor.x as f32, self.cursor.y as f32);
        let on_start = self.renderer.as_ref().is_some_and(|r| {
            r.hits_start_button(&frame_view(self.screen, &self.sequencer), pos)
        });

        match self.screen {
            Screen::Profile if on_start => self.screen = self.screen.next(),
            Screen::Profile => {}
            Screen::Task if self.sequencer.state().is_running() => self.sequencer.click(),
            Screen::Task if on_start => {
                if let Err(e) = self.sequencer.start() {
                    error!("could not start run: {e}");
                }
            }
            Screen::Task => {}
            Screen::Result => self.screen = self.screen.next(),
        }
    }

    fn handle_escape(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        if self.sequencer.state().is_running() {
            if !self.abort_guard.press(self.sequencer.clock().now_ms()) {
                info!("press ESC again to abort the run");
                return Ok(());
            }
            let signals = self.sequencer.abort();
            return self.handle_signals(signals);
        }
        match self.screen {
            Screen::Profile => self.cleanup_and_exit(event_loop),
            _ => self.screen = Screen::Profile,
        }
        Ok(())
    }

    fn handle_resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }
        if let Some(pixels) = &mut self.pixels {
            if let Err(e) = pixels.resize_surface(new_size.width, new_size.height) {
                warn!("failed to resize surface: {e}");
            }
            if let Err(e) = pixels.resize_buffer(new_size.width, new_size.height) {
                warn!("failed to resize buffer: {e}");
            }
        }
        if let Some(renderer) = &mut self.renderer {
            if let Err(e) = renderer.resize(new_size.width, new_size.height) {
                warn!("failed to resize canvas: {e}");
            }
        }
        info!(width = new_size.width, height = new_size.height, "display resized");
    }

    fn cleanup_and_exit(&mut self, event_loop: &ActiveEventLoop) {
        if self.sequencer.state().is_running() {
            self.sequencer.abort();
        }
        self.should_exit = true;
        event_loop.exit();
    }

    fn report_and_exit(&mut self, event_loop: &ActiveEventLoop, e: anyhow::Error) {
        error!("{e:#}");
        self.cleanup_and_exit(event_loop);
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            if let Err(e) = self.create_window_and_surface(event_loop) {
                self.report_and_exit(event_loop, e.context("failed to create window and surface"));
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => self.cleanup_and_exit(event_loop),
            WindowEvent::RedrawRequested => {
                let frame = self.update().and_then(|()| self.render());
                if let Err(e) = frame {
                    self.report_and_exit(event_loop, e);
                    return;
                }
                if let Some(win) = &self.window {
                    win.request_redraw();
                }
            }
            WindowEvent::CursorMoved { position, .. } => self.cursor = position,
            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                button: MouseButton::Left,
                ..
            } => self.handle_click(),
            WindowEvent::KeyboardInput { event, .. }
                if event.state.is_pressed()
                    && event.physical_key == PhysicalKey::Code(KeyCode::Escape) =>
            {
                if let Err(e) = self.handle_escape(event_loop) {
                    self.report_and_exit(event_loop, e);
                }
            }
            WindowEvent::Resized(size) => self.handle_resize(size),
            WindowEvent::ScaleFactorChanged { .. } => {
                if let Some(size) = self.window.as_ref().map(|w| w.inner_size()) {
                    self.handle_resize(size);
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.should_exit {
            event_loop.exit();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_press_only_arms() {
        let mut guard = AbortGuard::new(2000);
        assert!(!guard.press(100));
        assert!(guard.press(900));
        // confirmed, so the next press starts over
        assert!(!guard.press(1000));
    }

    #[test]
    fn late_second_press_rearms() {
        let mut guard = AbortGuard::new(2000);
        assert!(!guard.press(0));
        assert!(!guard.press(2500));
        assert!(guard.press(4500));
    }

    #[test]
    fn reset_forgets_a_pending_press() {
        let mut guard = AbortGuard::new(2000);
        assert!(!guard.press(0));
        guard.reset();
        assert!(!guard.press(10));
    }
}
