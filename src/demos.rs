// Demo screens
// Small examples registered with the launcher, each revealed by a full-screen fade

use anyhow::Result;
use log::{error, info};
use wallkit::{
    ApplicationListener, Canvas, Color, ExampleRegistry, FadeCurve, FaderError, FullScreenFader,
    Graphics, InputProcessor, Key, LiveWallpaperListener, Screen, WallpaperOffsets,
};

/// Fader configuration shared by every demo
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FadeSettings {
    pub delay: f32,
    pub fade_time: f32,
    pub curve: FadeCurve,
}

impl FadeSettings {
    fn fader<Q>(&self) -> Result<FullScreenFader<Q>, FaderError> {
        Ok(FullScreenFader::new(self.delay, self.fade_time)?.with_curve(self.curve))
    }
}

impl Default for FadeSettings {
    fn default() -> Self {
        Self {
            delay: 0.5,
            fade_time: 1.5,
            curve: FadeCurve::default(),
        }
    }
}

/// All demos, in menu order
pub fn registry<G: Graphics + 'static>(settings: FadeSettings) -> Result<ExampleRegistry<G>> {
    let mut registry = ExampleRegistry::new();
    registry.register("FaderTest", move || {
        Ok(Box::new(FaderTest::<G>::new(settings)?) as Box<dyn Screen<G>>)
    })?;
    registry.register("ClearColorTest", || {
        Ok(Box::new(ClearColorTest::default()) as Box<dyn Screen<G>>)
    })?;
    registry.register("ParallaxTest", move || {
        Ok(Box::new(ParallaxTest::<G>::new(settings)?) as Box<dyn Screen<G>>)
    })?;
    Ok(registry)
}

/// Draw the fader, dropping it if the backend cannot draw it
fn advance_fader<G: Graphics>(
    fader: &mut Option<FullScreenFader<G::FlatQuad>>,
    gfx: &mut G,
    delta: f32,
) {
    if let Some(f) = fader.as_mut() {
        if let Err(e) = f.advance(gfx, delta) {
            error!("Fade overlay disabled: {}", e);
            *fader = None;
        }
    }
}

/// Hue-cycling background revealed by a fade; Space replays the fade
pub struct FaderTest<G: Graphics> {
    settings: FadeSettings,
    fader: Option<FullScreenFader<G::FlatQuad>>,
    hue: f32,
}

impl<G: Graphics> FaderTest<G> {
    pub fn new(settings: FadeSettings) -> Result<Self, FaderError> {
        Ok(Self {
            settings,
            fader: Some(settings.fader()?),
            hue: 0.0,
        })
    }

    fn restart(&mut self) {
        if let Some(mut old) = self.fader.take() {
            old.dispose();
        }
        // Settings were validated by `new`
        self.fader = self.settings.fader().ok();
    }
}

impl<G: Graphics> InputProcessor for FaderTest<G> {
    fn key_down(&mut self, key: Key) -> bool {
        if key == Key::Space {
            info!("Replaying fade");
            self.restart();
            return true;
        }
        false
    }
}

impl<G: Graphics> Screen<G> for FaderTest<G> {
    fn render(&mut self, gfx: &mut G, delta: f32) {
        self.hue = (self.hue + delta * 30.0) % 360.0;
        gfx.clear(Color::from_hsv(self.hue, 0.6, 0.9));
        advance_fader(&mut self.fader, gfx, delta);
    }

    fn dispose(&mut self) {
        if let Some(fader) = self.fader.as_mut() {
            fader.dispose();
        }
    }
}

const MIN_SPEED: f32 = 10.0;
const MAX_SPEED: f32 = 720.0;

/// Cycles the clear color; Up and Down change the speed
#[derive(Debug)]
pub struct ClearColorTest {
    hue: f32,
    /// Degrees per second
    speed: f32,
}

impl Default for ClearColorTest {
    fn default() -> Self {
        Self {
            hue: 0.0,
            speed: 60.0,
        }
    }
}

impl ClearColorTest {
    pub fn speed(&self) -> f32 {
        self.speed
    }
}

impl InputProcessor for ClearColorTest {
    fn key_down(&mut self, key: Key) -> bool {
        match key {
            Key::Up => self.speed = (self.speed * 2.0).min(MAX_SPEED),
            Key::Down => self.speed = (self.speed / 2.0).max(MIN_SPEED),
            _ => return false,
        }
        info!("Clear color speed: {} deg/s", self.speed);
        true
    }
}

impl<G: Graphics> Screen<G> for ClearColorTest {
    fn render(&mut self, gfx: &mut G, delta: f32) {
        self.hue = (self.hue + delta * self.speed) % 360.0;
        gfx.clear(Color::from_hsv(self.hue, 1.0, 1.0));
    }
}

const SCENE_WIDTH: u32 = 320;
const SCENE_HEIGHT: u32 = 180;
/// How far the nearest layer moves across the full offset range, in scene pixels
const PARALLAX_SPAN: f32 = 160.0;
const OFFSET_STEP: f32 = 0.1;

/// Layered skyline that pans with the wallpaper offset.
///
/// As a launcher example, Left and Right stand in for home screen swipes.
pub struct ParallaxTest<G: Graphics> {
    settings: FadeSettings,
    fader: Option<FullScreenFader<G::FlatQuad>>,
    scene: Canvas,
    painted_offset: Option<f32>,
    offset: f32,
    pending_delta: f32,
    preview: bool,
}

impl<G: Graphics> ParallaxTest<G> {
    pub fn new(settings: FadeSettings) -> Result<Self, FaderError> {
        Ok(Self {
            settings,
            fader: Some(settings.fader()?),
            scene: Canvas::new(SCENE_WIDTH, SCENE_HEIGHT),
            painted_offset: None,
            offset: 0.5,
            pending_delta: 0.0,
            preview: false,
        })
    }

    pub fn offset(&self) -> f32 {
        self.offset
    }

    pub fn is_preview(&self) -> bool {
        self.preview
    }

    fn paint_scene(&mut self) {
        if self.painted_offset == Some(self.offset) {
            return;
        }

        // sky
        let top = Color::rgb(0.1, 0.12, 0.3);
        let bottom = Color::rgb(0.9, 0.5, 0.35);
        for y in 0..SCENE_HEIGHT {
            let t = y as f32 / SCENE_HEIGHT as f32;
            let color = Color::rgb(
                top.r + (bottom.r - top.r) * t,
                top.g + (bottom.g - top.g) * t,
                top.b + (bottom.b - top.b) * t,
            );
            self.scene.fill_rect(0, y as i32, SCENE_WIDTH, 1, color);
        }

        for layer in 0..3u32 {
            let depth = (layer + 1) as f32 / 3.0;
            let shade = 0.35 - 0.1 * layer as f32;
            let color = Color::rgb(shade * 0.6, shade * 0.5, shade);
            let shift = ((self.offset - 0.5) * PARALLAX_SPAN * depth) as i32;
            let spacing = 24 + 8 * layer as i32;

            for i in -8..(SCENE_WIDTH as i32 / spacing + 8) {
                // Deterministic building heights
                let seed = (i * 37 + layer as i32 * 101).rem_euclid(53) as u32;
                let height = 30 + layer * 20 + seed;
                let x = i * spacing - shift;
                let y = SCENE_HEIGHT.saturating_sub(height) as i32;
                self.scene
                    .fill_rect(x, y, (spacing - 4) as u32, height, color);
            }
        }

        self.painted_offset = Some(self.offset);
    }

    fn draw(&mut self, gfx: &mut G, delta: f32) {
        self.paint_scene();
        gfx.draw_canvas(&self.scene);
        advance_fader(&mut self.fader, gfx, delta);
    }

    fn restart_fade(&mut self) {
        if let Some(mut old) = self.fader.take() {
            old.dispose();
        }
        self.fader = self.settings.fader().ok();
    }
}

impl<G: Graphics> InputProcessor for ParallaxTest<G> {
    fn key_down(&mut self, key: Key) -> bool {
        match key {
            Key::Left => self.offset = (self.offset - OFFSET_STEP).max(0.0),
            Key::Right => self.offset = (self.offset + OFFSET_STEP).min(1.0),
            _ => return false,
        }
        true
    }
}

impl<G: Graphics> Screen<G> for ParallaxTest<G> {
    fn render(&mut self, gfx: &mut G, delta: f32) {
        self.draw(gfx, delta);
    }

    fn dispose(&mut self) {
        if let Some(fader) = self.fader.as_mut() {
            fader.dispose();
        }
    }
}

impl<G: Graphics> ApplicationListener<G> for ParallaxTest<G> {
    fn create(&mut self) {
        info!("Parallax wallpaper created");
    }

    fn resize(&mut self, _width: u32, _height: u32) {}

    // Drawing waits for the offsets that follow
    fn render(&mut self, _gfx: &mut G, delta: f32) {
        self.pending_delta = delta;
    }

    fn pause(&mut self) {}

    fn resume(&mut self) {}

    fn dispose(&mut self) {
        Screen::<G>::dispose(self);
    }
}

impl<G: Graphics> LiveWallpaperListener<G> for ParallaxTest<G> {
    fn render_with_offsets(&mut self, gfx: &mut G, offsets: WallpaperOffsets) {
        self.offset = offsets.x_offset.clamp(0.0, 1.0);
        let delta = std::mem::take(&mut self.pending_delta);
        self.draw(gfx, delta);
    }

    fn on_preview_state_change(&mut self, is_preview: bool) {
        self.preview = is_preview;
    }

    fn on_settings_changed(&mut self) {
        self.restart_fade();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wallkit::{Blending, GraphicsError, WallpaperAdapter};

    #[derive(Default)]
    struct Recorder {
        clears: Vec<Color>,
        quads_created: u32,
        quads_drawn: u32,
        canvases: u32,
    }

    impl Graphics for Recorder {
        type FlatQuad = ();

        fn viewport(&self) -> (u32, u32) {
            (640, 360)
        }
        fn clear(&mut self, color: Color) {
            self.clears.push(color);
        }
        fn set_blending(&mut self, _blending: Blending) {}
        fn create_flat_quad(&mut self) -> Result<(), GraphicsError> {
            self.quads_created += 1;
            Ok(())
        }
        fn draw_flat_quad(&mut self, _quad: &(), _color: Color) {
            self.quads_drawn += 1;
        }
        fn draw_canvas(&mut self, _canvas: &Canvas) {
            self.canvases += 1;
        }
    }

    fn quick() -> FadeSettings {
        FadeSettings {
            delay: 0.0,
            fade_time: 0.1,
            curve: FadeCurve::Linear,
        }
    }

    #[test]
    fn registry_lists_demos_in_order() {
        let registry = registry::<Recorder>(FadeSettings::default()).unwrap();
        let names: Vec<_> = registry.names().collect();
        assert_eq!(names, vec!["FaderTest", "ClearColorTest", "ParallaxTest"]);
        for index in 0..registry.len() {
            assert!(registry.instantiate(index).is_ok());
        }
    }

    #[test]
    fn fader_test_fades_once_and_replays_on_space() {
        let mut demo = FaderTest::<Recorder>::new(quick()).unwrap();
        let mut gfx = Recorder::default();
        for _ in 0..5 {
            Screen::render(&mut demo, &mut gfx, 0.05);
        }
        assert_eq!(gfx.clears.len(), 5);
        assert_eq!(gfx.quads_drawn, 2);

        assert!(demo.key_down(Key::Space));
        Screen::render(&mut demo, &mut gfx, 0.05);
        assert_eq!(gfx.quads_drawn, 3);
        assert_eq!(gfx.quads_created, 2);
    }

    #[test]
    fn clear_color_speed_is_bounded() {
        let mut demo = ClearColorTest::default();
        for _ in 0..10 {
            demo.key_down(Key::Up);
        }
        assert_eq!(demo.speed(), MAX_SPEED);
        for _ in 0..20 {
            demo.key_down(Key::Down);
        }
        assert_eq!(demo.speed(), MIN_SPEED);
        assert!(!demo.key_down(Key::Enter));
    }

    #[test]
    fn parallax_follows_wallpaper_offsets() {
        let mut adapter = WallpaperAdapter::new(ParallaxTest::<Recorder>::new(quick()).unwrap());
        adapter.set_preview(true);
        adapter.set_offsets(WallpaperOffsets {
            x_offset: 0.75,
            ..WallpaperOffsets::default()
        });

        let mut gfx = Recorder::default();
        ApplicationListener::<Recorder>::render(&mut adapter, &mut gfx, 0.016);

        assert!(adapter.listener().is_preview());
        assert_eq!(adapter.listener().offset(), 0.75);
        assert_eq!(gfx.canvases, 1);
        assert_eq!(gfx.quads_drawn, 1);
    }

    #[test]
    fn settings_change_replays_parallax_fade() {
        let mut adapter = WallpaperAdapter::new(ParallaxTest::<Recorder>::new(quick()).unwrap());
        let mut gfx = Recorder::default();
        for _ in 0..4 {
            ApplicationListener::<Recorder>::render(&mut adapter, &mut gfx, 0.05);
        }
        assert_eq!(gfx.quads_drawn, 2);

        adapter.notify_settings_changed::<Recorder>();
        ApplicationListener::<Recorder>::render(&mut adapter, &mut gfx, 0.05);
        assert_eq!(gfx.quads_drawn, 3);
        assert_eq!(gfx.quads_created, 2);
    }

    #[test]
    fn parallax_keys_clamp_offset() {
        let mut demo = ParallaxTest::<Recorder>::new(quick()).unwrap();
        for _ in 0..20 {
            demo.key_down(Key::Right);
        }
        assert_eq!(demo.offset(), 1.0);
        assert!(!demo.key_down(Key::Up));
    }
}
