// Live wallpaper support
// Extra lifecycle hooks for applications running as a wallpaper

use crate::app::{ApplicationListener, InputProcessor};
use crate::graphics::Graphics;
use log::{debug, info};

/// Pan signals reported by the wallpaper host for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WallpaperOffsets {
    /// Horizontal offset as reported by the host launcher
    pub x_offset: f32,
    /// Vertical offset as reported by the host launcher
    pub y_offset: f32,
    /// `x_offset` with smoothing applied. Launchers that loop from the last
    /// home screen back to the first jump from 1.0 to 0.0; this value pans
    /// back across instead.
    pub x_offset_smooth_looping: f32,
    /// Offset synthesised from the user's swipes, for launchers that never
    /// change `x_offset`
    pub x_offset_fake: f32,
}

impl Default for WallpaperOffsets {
    /// Centred, as for a single home screen
    fn default() -> Self {
        Self {
            x_offset: 0.5,
            y_offset: 0.5,
            x_offset_smooth_looping: 0.5,
            x_offset_fake: 0.5,
        }
    }
}

/// An application listener with additional live wallpaper hooks.
///
/// The extra methods are only called when the listener is wrapped in a
/// [`WallpaperAdapter`] before being handed to the host.
pub trait LiveWallpaperListener<G: Graphics>: ApplicationListener<G> {
    /// Called immediately after every [`ApplicationListener::render`]
    fn render_with_offsets(&mut self, gfx: &mut G, offsets: WallpaperOffsets);

    /// Called after the preview state changed, generally once at startup
    fn on_preview_state_change(&mut self, is_preview: bool);

    /// Called when persisted wallpaper settings were modified
    fn on_settings_changed(&mut self);
}

/// Presents a [`LiveWallpaperListener`] to the host as a plain
/// [`ApplicationListener`], delivering the wallpaper hooks in order.
///
/// A preview change is delivered before the next render; offsets are
/// delivered right after every render.
#[derive(Debug)]
pub struct WallpaperAdapter<L> {
    listener: L,
    offsets: WallpaperOffsets,
    preview: Option<bool>,
    pending_preview: Option<bool>,
}

impl<L> WallpaperAdapter<L> {
    pub fn new(listener: L) -> Self {
        Self {
            listener,
            offsets: WallpaperOffsets::default(),
            preview: None,
            pending_preview: None,
        }
    }

    /// Queue a preview notification if the flag differs from the last one delivered
    pub fn set_preview(&mut self, is_preview: bool) {
        if self.preview == Some(is_preview) {
            self.pending_preview = None;
        } else {
            self.pending_preview = Some(is_preview);
        }
    }

    pub fn set_offsets(&mut self, offsets: WallpaperOffsets) {
        self.offsets = offsets;
    }

    pub fn offsets(&self) -> WallpaperOffsets {
        self.offsets
    }

    pub fn listener(&self) -> &L {
        &self.listener
    }

    pub fn listener_mut(&mut self) -> &mut L {
        &mut self.listener
    }

    pub fn into_inner(self) -> L {
        self.listener
    }
}

impl<L> WallpaperAdapter<L> {
    /// Tell the listener its settings changed. Not called by the Wayland host;
    /// whoever stores the settings calls this after writing them.
    pub fn notify_settings_changed<G>(&mut self)
    where
        G: Graphics,
        L: LiveWallpaperListener<G>,
    {
        debug!("Wallpaper settings changed");
        self.listener.on_settings_changed();
    }

    fn flush_preview<G>(&mut self)
    where
        G: Graphics,
        L: LiveWallpaperListener<G>,
    {
        if let Some(is_preview) = self.pending_preview.take() {
            info!("Wallpaper preview state: {}", is_preview);
            self.preview = Some(is_preview);
            self.listener.on_preview_state_change(is_preview);
        }
    }
}

impl<G, L> ApplicationListener<G> for WallpaperAdapter<L>
where
    G: Graphics,
    L: LiveWallpaperListener<G>,
{
    fn create(&mut self) {
        self.listener.create();
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.listener.resize(width, height);
    }

    fn render(&mut self, gfx: &mut G, delta: f32) {
        self.flush_preview::<G>();
        self.listener.render(gfx, delta);
        self.listener.render_with_offsets(gfx, self.offsets);
    }

    fn pause(&mut self) {
        self.listener.pause();
    }

    fn resume(&mut self) {
        self.listener.resume();
    }

    fn dispose(&mut self) {
        self.listener.dispose();
    }
}

// Wallpapers never get keyboard focus
impl<L> InputProcessor for WallpaperAdapter<L> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphics::{Blending, Canvas, Color, GraphicsError};

    struct NullGraphics;

    impl Graphics for NullGraphics {
        type FlatQuad = ();

        fn viewport(&self) -> (u32, u32) {
            (1, 1)
        }
        fn clear(&mut self, _color: Color) {}
        fn set_blending(&mut self, _blending: Blending) {}
        fn create_flat_quad(&mut self) -> Result<(), GraphicsError> {
            Ok(())
        }
        fn draw_flat_quad(&mut self, _quad: &(), _color: Color) {}
        fn draw_canvas(&mut self, _canvas: &Canvas) {}
    }

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Create,
        Resize(u32, u32),
        Render,
        Offsets(WallpaperOffsets),
        Preview(bool),
        Settings,
        Pause,
        Resume,
        Dispose,
    }

    #[derive(Default)]
    struct Journal(Vec<Call>);

    impl ApplicationListener<NullGraphics> for Journal {
        fn create(&mut self) {
            self.0.push(Call::Create);
        }
        fn resize(&mut self, width: u32, height: u32) {
            self.0.push(Call::Resize(width, height));
        }
        fn render(&mut self, _gfx: &mut NullGraphics, _delta: f32) {
            self.0.push(Call::Render);
        }
        fn pause(&mut self) {
            self.0.push(Call::Pause);
        }
        fn resume(&mut self) {
            self.0.push(Call::Resume);
        }
        fn dispose(&mut self) {
            self.0.push(Call::Dispose);
        }
    }

    impl LiveWallpaperListener<NullGraphics> for Journal {
        fn render_with_offsets(&mut self, _gfx: &mut NullGraphics, offsets: WallpaperOffsets) {
            self.0.push(Call::Offsets(offsets));
        }
        fn on_preview_state_change(&mut self, is_preview: bool) {
            self.0.push(Call::Preview(is_preview));
        }
        fn on_settings_changed(&mut self) {
            self.0.push(Call::Settings);
        }
    }

    fn render(adapter: &mut WallpaperAdapter<Journal>) {
        ApplicationListener::<NullGraphics>::render(adapter, &mut NullGraphics, 0.016);
    }

    #[test]
    fn preview_precedes_first_render_and_offsets_follow() {
        let mut adapter = WallpaperAdapter::new(Journal::default());
        adapter.set_preview(true);
        ApplicationListener::<NullGraphics>::create(&mut adapter);
        ApplicationListener::<NullGraphics>::resize(&mut adapter, 800, 600);
        render(&mut adapter);
        render(&mut adapter);

        let offsets = WallpaperOffsets::default();
        assert_eq!(
            adapter.listener().0,
            vec![
                Call::Create,
                Call::Resize(800, 600),
                Call::Preview(true),
                Call::Render,
                Call::Offsets(offsets),
                Call::Render,
                Call::Offsets(offsets),
            ]
        );
    }

    #[test]
    fn unchanged_preview_is_not_redelivered() {
        let mut adapter = WallpaperAdapter::new(Journal::default());
        adapter.set_preview(false);
        render(&mut adapter);
        adapter.set_preview(false);
        render(&mut adapter);
        adapter.set_preview(true);
        render(&mut adapter);

        let previews: Vec<_> = adapter
            .listener()
            .0
            .iter()
            .filter(|call| matches!(call, Call::Preview(_)))
            .cloned()
            .collect();
        assert_eq!(previews, vec![Call::Preview(false), Call::Preview(true)]);
    }

    #[test]
    fn offsets_are_forwarded_as_set() {
        let mut adapter = WallpaperAdapter::new(Journal::default());
        let offsets = WallpaperOffsets {
            x_offset: 0.25,
            y_offset: 0.0,
            x_offset_smooth_looping: 0.3,
            x_offset_fake: 0.75,
        };
        adapter.set_offsets(offsets);
        render(&mut adapter);
        assert_eq!(adapter.listener().0.last(), Some(&Call::Offsets(offsets)));
    }

    #[test]
    fn lifecycle_and_settings_pass_through() {
        let mut adapter = WallpaperAdapter::new(Journal::default());
        adapter.notify_settings_changed::<NullGraphics>();
        ApplicationListener::<NullGraphics>::pause(&mut adapter);
        ApplicationListener::<NullGraphics>::resume(&mut adapter);
        ApplicationListener::<NullGraphics>::dispose(&mut adapter);
        assert_eq!(
            adapter.into_inner().0,
            vec![Call::Settings, Call::Pause, Call::Resume, Call::Dispose]
        );
    }
}
