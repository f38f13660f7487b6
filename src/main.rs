// wallkit - live wallpaper and demo launcher for Wayland
// Runs the demo picker on an overlay layer, or a demo as the desktop wallpaper

mod cli;
mod demos;

use anyhow::Result;
use clap::Parser;
use log::info;
use wallkit::wayland::{self, HostMode};
use wallkit::wgpu_renderer::GpuContext;
use wallkit::{ExampleRunner, WallpaperAdapter};

use crate::demos::{FadeSettings, ParallaxTest};

fn main() -> Result<()> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Parse command line arguments
    let args = cli::Args::parse();

    let settings = FadeSettings {
        delay: args.fade_delay,
        fade_time: args.fade_time,
        curve: args.fade_curve.into(),
    };

    if args.list {
        let registry = demos::registry::<GpuContext>(settings)?;
        for name in registry.names() {
            println!("{}", name);
        }
        return Ok(());
    }

    if args.wallpaper {
        info!(
            "Starting wallpaper (preview: {}, fade: {:?})",
            args.preview, settings
        );
        let mut adapter = WallpaperAdapter::new(ParallaxTest::<GpuContext>::new(settings)?);
        adapter.set_preview(args.preview);
        return wayland::run(Box::new(adapter), HostMode::Wallpaper);
    }

    let registry = demos::registry::<GpuContext>(settings)?;
    info!(
        "Starting example launcher with {} examples (startup: {:?})",
        registry.len(),
        args.example
    );
    let runner = ExampleRunner::new(registry, args.example);
    wayland::run(Box::new(runner), HostMode::Window)
}
