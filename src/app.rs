// Application lifecycle module
// Contracts the host calls into: application listeners, screens and input

use crate::graphics::Graphics;

/// Keys the host forwards to applications
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Enter,
    Up,
    Down,
    Left,
    Right,
    Backspace,
    Escape,
    Space,
    Char(char),
    Other,
}

/// Receives input events. Returns `true` when the event was consumed.
pub trait InputProcessor {
    fn key_down(&mut self, _key: Key) -> bool {
        false
    }

    /// Pointer press at surface-local coordinates
    fn touch_down(&mut self, _x: f64, _y: f64) -> bool {
        false
    }
}

/// Top-level application driven by the host.
///
/// The host calls `create` once, `resize` whenever the surface size changes
/// (at least once before the first `render`), `render` once per frame and
/// `dispose` once at shutdown, preceded by `pause`.
pub trait ApplicationListener<G: Graphics> {
    fn create(&mut self);

    fn resize(&mut self, width: u32, height: u32);

    /// Render one frame; `delta` is the time since the previous frame in seconds
    fn render(&mut self, gfx: &mut G, delta: f32);

    fn pause(&mut self);

    fn resume(&mut self);

    fn dispose(&mut self);
}

/// One full-screen state of an application (a menu, a demo, a level).
///
/// `show` is called when the screen becomes current and `hide` when it stops
/// being current. Hidden screens are not disposed automatically.
pub trait Screen<G: Graphics>: InputProcessor {
    fn show(&mut self) {}

    fn render(&mut self, gfx: &mut G, delta: f32);

    fn resize(&mut self, _width: u32, _height: u32) {}

    fn pause(&mut self) {}

    fn resume(&mut self) {}

    fn hide(&mut self) {}

    fn dispose(&mut self) {}
}

/// Last path segment of a type name, without generic arguments.
///
/// `wallkit::demos::FaderTest<u8>` becomes `FaderTest`.
pub fn simple_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Plain;
    struct Wrapper<T>(T);

    #[test]
    fn simple_type_name_strips_path_and_generics() {
        assert_eq!(simple_type_name::<Plain>(), "Plain");
        assert_eq!(simple_type_name::<Wrapper<Plain>>(), "Wrapper");
        assert_eq!(simple_type_name::<u32>(), "u32");
    }
}
