// End-to-end checks of the launcher driving faded example screens

use std::cell::Cell;
use std::rc::Rc;
use wallkit::{
    ApplicationListener, Blending, Canvas, Color, ExampleRegistry, ExampleRunner,
    FullScreenFader, Graphics, GraphicsError, InputProcessor, Key, RunnerState, Screen,
};

/// Flat quad handle that tracks how many are alive
struct Quad(Rc<Cell<i32>>);

impl Drop for Quad {
    fn drop(&mut self) {
        self.0.set(self.0.get() - 1);
    }
}

#[derive(Default)]
struct Recorder {
    live_quads: Rc<Cell<i32>>,
    created: u32,
    overlay_alphas: Vec<f32>,
    clears: u32,
    canvases: u32,
}

impl Graphics for Recorder {
    type FlatQuad = Quad;

    fn viewport(&self) -> (u32, u32) {
        (800, 600)
    }

    fn clear(&mut self, _color: Color) {
        self.clears += 1;
    }

    fn set_blending(&mut self, _blending: Blending) {}

    fn create_flat_quad(&mut self) -> Result<Quad, GraphicsError> {
        self.created += 1;
        self.live_quads.set(self.live_quads.get() + 1);
        Ok(Quad(self.live_quads.clone()))
    }

    fn draw_flat_quad(&mut self, _quad: &Quad, color: Color) {
        self.overlay_alphas.push(color.a);
    }

    fn draw_canvas(&mut self, _canvas: &Canvas) {
        self.canvases += 1;
    }
}

struct Faded {
    fader: FullScreenFader<Quad>,
}

impl Faded {
    fn new() -> Self {
        Self {
            fader: FullScreenFader::new(0.1, 0.2).unwrap(),
        }
    }
}

impl InputProcessor for Faded {}

impl Screen<Recorder> for Faded {
    fn render(&mut self, gfx: &mut Recorder, delta: f32) {
        gfx.clear(Color::WHITE);
        self.fader.advance(gfx, delta).unwrap();
    }

    fn dispose(&mut self) {
        self.fader.dispose();
    }
}

fn registry() -> ExampleRegistry<Recorder> {
    let mut registry = ExampleRegistry::new();
    registry
        .register("Plain", || {
            Ok(Box::new(Faded::new()) as Box<dyn Screen<Recorder>>)
        })
        .unwrap();
    registry
        .register("Faded", || {
            Ok(Box::new(Faded::new()) as Box<dyn Screen<Recorder>>)
        })
        .unwrap();
    registry
}

#[test]
fn startup_example_fades_in_and_releases_on_exit() {
    let mut runner = ExampleRunner::new(registry(), Some("Faded".to_string()));
    let mut gfx = Recorder::default();

    runner.create();
    runner.resize(800, 600);
    assert_eq!(runner.state(), RunnerState::Running);
    assert_eq!(runner.active_name(), Some("Faded"));

    for _ in 0..10 {
        runner.render(&mut gfx, 0.05);
    }

    // one quad, drawn until the fade finished
    assert_eq!(gfx.created, 1);
    assert_eq!(gfx.live_quads.get(), 1);
    assert_eq!(gfx.canvases, 0);
    assert_eq!(gfx.clears, 10);
    assert_eq!(gfx.overlay_alphas.first(), Some(&1.0));
    assert!(gfx
        .overlay_alphas
        .windows(2)
        .all(|pair| pair[1] <= pair[0]));
    let drawn = gfx.overlay_alphas.len();
    assert!(drawn < 10);

    assert!(runner.key_down(Key::Backspace));
    assert_eq!(runner.state(), RunnerState::Picking);
    assert_eq!(runner.select_box().selected(), Some("Faded"));
    assert_eq!(gfx.live_quads.get(), 0);

    runner.render(&mut gfx, 0.05);
    assert_eq!(gfx.canvases, 1);
    assert_eq!(gfx.overlay_alphas.len(), drawn);
}

#[test]
fn picker_keys_choose_and_start() {
    let mut runner = ExampleRunner::new(registry(), None);
    let mut gfx = Recorder::default();
    runner.create();
    runner.resize(800, 600);
    assert_eq!(runner.state(), RunnerState::Picking);
    assert_eq!(runner.select_box().selected(), Some("Plain"));

    assert!(runner.key_down(Key::Up));
    assert_eq!(runner.select_box().selected(), Some("Faded"));
    assert!(runner.key_down(Key::Enter));
    assert_eq!(runner.active_name(), Some("Faded"));

    runner.render(&mut gfx, 0.016);
    assert_eq!(gfx.live_quads.get(), 1);

    runner.pause();
    runner.dispose();
    assert_eq!(runner.state(), RunnerState::Picking);
    assert_eq!(gfx.live_quads.get(), 0);
}
