use anyhow::{anyhow, Result};
use gonogo_core::{RunState, StimulusKind, Summary};
use tiny_skia::{Color, FillRule, Paint, PathBuilder, Pixmap, PixmapPaint, Rect, Transform};

pub const BACKGROUND: [u8; 4] = [243, 244, 246, 255];
pub const TRACK: [u8; 4] = [229, 231, 235, 255];
pub const PROGRESS: [u8; 4] = [37, 99, 235, 255];
pub const BUTTON: [u8; 4] = [79, 70, 229, 255];
pub const SPINNER: [u8; 4] = [156, 163, 175, 255];
pub const CORRECT: [u8; 4] = [22, 163, 74, 255];
pub const WITHHOLD: [u8; 4] = [107, 114, 128, 255];

const STIMULUS_RADIUS: f32 = 64.0;
const ICON_RADIUS: f32 = 24.0;
const SPINNER_RADII: (f32, f32) = (16.0, 11.0);
const BUTTON_SIZE: (f32, f32) = (200.0, 64.0);
const BAR_WIDTH: f32 = 60.0;
const BAR_SPACING: f32 = 120.0;

#[repr(usize)]
#[derive(Debug, Clone, Copy)]
enum CacheIndex {
    GoStim = 0,
    NoGoStim = 1,
    GoIcon = 2,
    NoGoIcon = 3,
    Spinner = 4,
    StartButton = 5,
}

impl CacheIndex {
    const STATIC_COUNT: usize = 6;

    fn stimulus(kind: StimulusKind) -> Self {
        match kind {
            StimulusKind::Go => CacheIndex::GoStim,
            StimulusKind::NoGo => CacheIndex::NoGoStim,
        }
    }
}

/// Everything a frame depends on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FrameView<'a> {
    Profile,
    Task {
        state: RunState,
        stimulus: Option<StimulusKind>,
        progress: Option<(usize, usize)>,
    },
    Result {
        summary: &'a Summary,
    },
}

pub trait ViewRenderer {
    fn render_view(&mut self, view: &FrameView<'_>) -> Result<()>;
    /// Copies the finished canvas into an RGBA8 frame of the same size.
    fn present(&self, frame_buffer: &mut [u8]) -> Result<()>;
}

fn paint(color: [u8; 4]) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.anti_alias = false;
    paint.set_color(Color::from_rgba8(color[0], color[1], color[2], color[3]));
    paint
}

fn blank(width: u32, height: u32) -> Result<Pixmap> {
    Pixmap::new(width, height).ok_or_else(|| anyhow!("cannot allocate {width}x{height} pixmap"))
}

fn circle_pixmap(radius: f32, color: [u8; 4]) -> Result<Pixmap> {
    let size = (radius * 2.0).ceil() as u32;
    let mut pm = blank(size, size)?;
    let path = PathBuilder::from_circle(radius, radius, radius)
        .ok_or_else(|| anyhow!("invalid circle radius {radius}"))?;
    pm.fill_path(&path, &paint(color), FillRule::Winding, Transform::identity(), None);
    Ok(pm)
}

fn ring_pixmap(outer: f32, inner: f32, color: [u8; 4]) -> Result<Pixmap> {
    let size = (outer * 2.0).ceil() as u32;
    let mut pm = blank(size, size)?;
    let mut pb = PathBuilder::new();
    pb.push_circle(outer, outer, outer);
    pb.push_circle(outer, outer, inner);
    let path = pb.finish().ok_or_else(|| anyhow!("invalid ring"))?;
    pm.fill_path(&path, &paint(color), FillRule::EvenOdd, Transform::identity(), None);
    Ok(pm)
}

fn button_pixmap(size: (f32, f32), color: [u8; 4]) -> Result<Pixmap> {
    let mut pm = blank(size.0 as u32, size.1 as u32)?;
    pm.fill(Color::from_rgba8(color[0], color[1], color[2], color[3]));
    Ok(pm)
}

/// Shape-only renderer: every element is a pre-rendered pixmap or a flat
/// rectangle, blitted onto an opaque canvas.
pub struct SkiaRenderer {
    width: u32,
    height: u32,
    center: (f32, f32),
    static_cache: Vec<Pixmap>,
    canvas: Pixmap,
}

impl SkiaRenderer {
    pub fn new(width: u32, height: u32) -> Result<Self> {
        let mut renderer = SkiaRenderer {
            width,
            height,
            center: (width as f32 / 2.0, height as f32 / 2.0),
            static_cache: Vec::with_capacity(CacheIndex::STATIC_COUNT),
            canvas: blank(width, height)?,
        };
        renderer.init_cache()?;
        Ok(renderer)
    }

    pub fn resize(&mut self, new_width: u32, new_height: u32) -> Result<()> {
        self.canvas = blank(new_width, new_height)?;
        self.width = new_width;
        self.height = new_height;
        self.center = (new_width as f32 / 2.0, new_height as f32 / 2.0);
        Ok(())
    }

    fn init_cache(&mut self) -> Result<()> {
        // order must follow CacheIndex
        self.static_cache = vec![
            circle_pixmap(STIMULUS_RADIUS, StimulusKind::Go.color())?,
            circle_pixmap(STIMULUS_RADIUS, StimulusKind::NoGo.color())?,
            circle_pixmap(ICON_RADIUS, StimulusKind::Go.color())?,
            circle_pixmap(ICON_RADIUS, StimulusKind::NoGo.color())?,
            ring_pixmap(SPINNER_RADII.0, SPINNER_RADII.1, SPINNER)?,
            button_pixmap(BUTTON_SIZE, BUTTON)?,
        ];
        Ok(())
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn canvas(&self) -> &Pixmap {
        &self.canvas
    }

    /// Where the start button sits on `view`, if it shows one.
    fn start_button_center(&self, view: &FrameView<'_>) -> Option<(f32, f32)> {
        match view {
            FrameView::Profile => Some((self.center.0, self.center.1 + 120.0)),
            FrameView::Task {
                state: RunState::Idle | RunState::Complete,
                ..
            } => Some(self.center),
            _ => None,
        }
    }

    pub fn hits_start_button(&self, view: &FrameView<'_>, pos: (f32, f32)) -> bool {
        self.start_button_center(view).is_some_and(|(cx, cy)| {
            (pos.0 - cx).abs() <= BUTTON_SIZE.0 / 2.0 && (pos.1 - cy).abs() <= BUTTON_SIZE.1 / 2.0
        })
    }

    fn blit_cached(&mut self, index: CacheIndex, pos: (f32, f32)) {
        let pixmap = &self.static_cache[index as usize];
        let x = (pos.0 - pixmap.width() as f32 * 0.5).floor() as i32;
        let y = (pos.1 - pixmap.height() as f32 * 0.5).floor() as i32;
        self.canvas.draw_pixmap(
            x,
            y,
            pixmap.as_ref(),
            &PixmapPaint::default(),
            Transform::identity(),
            None,
        );
    }

    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: [u8; 4]) {
        // empty bars draw nothing
        if w <= 0.0 || h <= 0.0 {
            return;
        }
        if let Some(rect) = Rect::from_xywh(x, y, w, h) {
            self.canvas
                .fill_rect(rect, &paint(color), Transform::identity(), None);
        }
    }

    fn draw_progress(&mut self, done: usize, total: usize) {
        let track_w = self.width as f32 * 0.6;
        let x = (self.width as f32 - track_w) / 2.0;
        self.fill_rect(x, 40.0, track_w, 8.0, TRACK);
        if total > 0 {
            let fill_w = track_w * done.min(total) as f32 / total as f32;
            self.fill_rect(x, 40.0, fill_w, 8.0, PROGRESS);
        }
    }

    fn draw_profile(&mut self) {
        let (cx, cy) = self.center;
        // blue: click, red: hold still
        self.blit_cached(CacheIndex::GoIcon, (cx - 80.0, cy - 80.0));
        self.fill_rect(cx - 30.0, cy - 86.0, 110.0, 12.0, CORRECT);
        self.blit_cached(CacheIndex::NoGoIcon, (cx - 80.0, cy));
        self.fill_rect(cx - 30.0, cy - 6.0, 110.0, 12.0, WITHHOLD);
        if let Some(pos) = self.start_button_center(&FrameView::Profile) {
            self.blit_cached(CacheIndex::StartButton, pos);
        }
    }

    fn draw_task(
        &mut self,
        state: RunState,
        stimulus: Option<StimulusKind>,
        progress: Option<(usize, usize)>,
    ) {
        if let Some((done, total)) = progress {
            if state.is_running() {
                self.draw_progress(done, total);
            }
        }
        match state {
            // a finished run can be started again
            RunState::Idle | RunState::Complete => {
                self.blit_cached(CacheIndex::StartButton, self.center)
            }
            RunState::AwaitingInterval | RunState::InterTrialGap => {
                self.blit_cached(CacheIndex::Spinner, self.center)
            }
            RunState::StimulusVisible => {
                if let Some(kind) = stimulus {
                    self.blit_cached(CacheIndex::stimulus(kind), self.center);
                }
            }
        }
    }

    fn draw_result(&mut self, summary: &Summary) {
        let (cx, cy) = self.center;
        let baseline = cy + 150.0;
        let max_h = (self.height as f32 * 0.5).min(300.0);
        let bars = [
            (summary.accuracy_pct, CORRECT),
            (summary.go_accuracy_pct, StimulusKind::Go.color()),
            (summary.nogo_accuracy_pct, StimulusKind::NoGo.color()),
        ];
        for (i, (pct, color)) in bars.into_iter().enumerate() {
            let x = cx + (i as f32 - 1.0) * BAR_SPACING - BAR_WIDTH / 2.0;
            let h = max_h * (pct.clamp(0.0, 100.0) as f32 / 100.0);
            self.fill_rect(x, baseline - max_h, BAR_WIDTH, max_h, TRACK);
            self.fill_rect(x, baseline - h, BAR_WIDTH, h, color);
        }
    }

    pub fn render_frame(&mut self, view: &FrameView<'_>, frame_buffer: &mut [u8]) -> Result<()> {
        self.render_view(view)?;
        self.present(frame_buffer)
    }
}

impl ViewRenderer for SkiaRenderer {
    fn render_view(&mut self, view: &FrameView<'_>) -> Result<()> {
        self.canvas.fill(Color::from_rgba8(
            BACKGROUND[0],
            BACKGROUND[1],
            BACKGROUND[2],
            BACKGROUND[3],
        ));
        match view {
            FrameView::Profile => self.draw_profile(),
            FrameView::Task {
                state,
                stimulus,
                progress,
            } => self.draw_task(*state, *stimulus, *progress),
            FrameView::Result { summary } => self.draw_result(summary),
        }
        Ok(())
    }

    fn present(&self, frame_buffer: &mut [u8]) -> Result<()> {
        let data = self.canvas.data();
        if frame_buffer.len() != data.len() {
            return Err(anyhow!(
                "frame buffer holds {} bytes, canvas {}x{} needs {}",
                frame_buffer.len(),
                self.width,
                self.height,
                data.len()
            ));
        }
        // the canvas is opaque, so premultiplied RGBA equals straight RGBA
        frame_buffer.copy_from_slice(data);
        Ok(())
    }
}
