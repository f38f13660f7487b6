// wallkit - application lifecycle toolkit for Wayland wallpapers and demos
// Library half: lifecycle traits, the fade effect, the example launcher and the GPU host

pub mod app;
pub mod fader;
pub mod graphics;
pub mod launcher;
pub mod menu;
pub mod wallpaper;
pub mod wayland;
pub mod wgpu_renderer;

pub use app::{ApplicationListener, InputProcessor, Key, Screen};
pub use fader::{FadeCurve, FaderError, FullScreenFader};
pub use graphics::{Blending, Canvas, Color, Graphics, GraphicsError};
pub use launcher::{ExampleRegistry, ExampleRunner, RegistryError, RunnerState, SelectBox};
pub use wallpaper::{LiveWallpaperListener, WallpaperAdapter, WallpaperOffsets};
