// Wayland integration module
// Hosts an application on a layer-shell surface using smithay-client-toolkit

use crate::app::{ApplicationListener, InputProcessor, Key};
use crate::wgpu_renderer::GpuContext;
use anyhow::{Context, Result};
use log::{debug, error, info, warn};
use smithay_client_toolkit::{
    compositor::{CompositorHandler, CompositorState},
    delegate_compositor, delegate_keyboard, delegate_layer, delegate_output, delegate_pointer,
    delegate_registry, delegate_seat,
    output::{OutputHandler, OutputState},
    registry::{ProvidesRegistryState, RegistryState},
    registry_handlers,
    seat::{
        keyboard::{KeyEvent, KeyboardHandler, Keysym, Modifiers},
        pointer::{PointerEvent, PointerEventKind, PointerHandler},
        Capability, SeatHandler, SeatState,
    },
    shell::{
        wlr_layer::{
            Anchor, KeyboardInteractivity, Layer, LayerShell, LayerShellHandler, LayerSurface,
            LayerSurfaceConfigure,
        },
        WaylandSurface,
    },
};
use std::time::Instant;
use wayland_client::{
    globals::registry_queue_init,
    protocol::{wl_keyboard, wl_output, wl_pointer, wl_seat, wl_surface},
    Connection, Proxy, QueueHandle,
};

/// Mouse button constants
const BTN_LEFT: u32 = 272;

/// Longest frame delta handed to the application, in seconds
const MAX_FRAME_DELTA: f32 = 0.25;

/// Anything the host can drive
pub trait HostedApp: ApplicationListener<GpuContext> + InputProcessor {}

impl<T> HostedApp for T where T: ApplicationListener<GpuContext> + InputProcessor {}

/// Which layer the application lives on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostMode {
    /// Full-screen overlay with exclusive keyboard focus
    Window,
    /// Behind all windows, no input
    Wallpaper,
}

impl HostMode {
    fn layer(self) -> Layer {
        match self {
            HostMode::Window => Layer::Overlay,
            HostMode::Wallpaper => Layer::Background,
        }
    }

    fn namespace(self) -> &'static str {
        match self {
            HostMode::Window => "wallkit",
            HostMode::Wallpaper => "wallkit-wallpaper",
        }
    }
}

/// Main Wayland host state
struct WaylandHost {
    // Registry state
    registry_state: RegistryState,
    // Seat state for input handling
    seat_state: SeatState,
    // Output state for display info
    output_state: OutputState,

    // Wayland display pointer (for GPU rendering)
    display_ptr: *mut std::ffi::c_void,

    // Hosted application
    app: Box<dyn HostedApp>,
    should_exit: bool,

    // Dropped before the surface it renders to
    gpu: Option<GpuContext>,

    layer_surface: Option<LayerSurface>,
    width: u32,
    height: u32,
    configured: bool,
    frame_scheduled: bool,
    last_frame: Option<Instant>,
}

impl WaylandHost {
    fn new(
        registry_state: RegistryState,
        seat_state: SeatState,
        output_state: OutputState,
        display_ptr: *mut std::ffi::c_void,
        app: Box<dyn HostedApp>,
    ) -> Self {
        Self {
            registry_state,
            seat_state,
            output_state,
            display_ptr,
            app,
            should_exit: false,
            gpu: None,
            layer_surface: None,
            width: 0,
            height: 0,
            configured: false,
            frame_scheduled: false,
            last_frame: None,
        }
    }

    /// Initialize the GPU context from the Wayland surface
    fn init_gpu(&mut self) -> Result<()> {
        let layer_surface = self
            .layer_surface
            .as_ref()
            .context("Cannot init GPU: no layer surface")?;

        // With wayland-backend client_system feature, ObjectId.as_ptr() is available
        let wl_surface = layer_surface.wl_surface();
        let surface_ptr = wl_surface.id().as_ptr() as *mut std::ffi::c_void;

        info!("Initializing GPU context...");
        debug!("  Surface ptr: {:?}", surface_ptr);
        debug!("  Display ptr: {:?}", self.display_ptr);
        info!("  Size: {}x{}", self.width, self.height);

        let gpu = GpuContext::new(self.display_ptr, surface_ptr, self.width, self.height)?;
        self.gpu = Some(gpu);
        info!("GPU context initialized successfully");
        Ok(())
    }

    /// Ask the compositor for the next frame callback
    fn schedule_frame(&mut self, qh: &QueueHandle<Self>) {
        if self.frame_scheduled {
            return;
        }
        if let Some(ref layer_surface) = self.layer_surface {
            let surface = layer_surface.wl_surface();
            surface.frame(qh, surface.clone());
            self.frame_scheduled = true;
        }
    }

    /// Render one frame of the application
    fn draw(&mut self, qh: &QueueHandle<Self>) {
        if !self.configured || self.should_exit {
            return;
        }

        let now = Instant::now();
        let delta = self
            .last_frame
            .map(|last| now.duration_since(last).as_secs_f32())
            .unwrap_or(0.0)
            .min(MAX_FRAME_DELTA);
        self.last_frame = Some(now);

        // Requested before presenting so the present commit carries it
        self.schedule_frame(qh);

        let Some(gpu) = self.gpu.as_mut() else {
            return;
        };

        match gpu.begin_frame() {
            Ok(true) => {
                self.app.render(gpu, delta);
                gpu.end_frame();
            }
            Ok(false) => {
                if let Some(ref layer_surface) = self.layer_surface {
                    layer_surface.commit();
                }
            }
            Err(e) => {
                error!("GPU render error: {:?}", e);
                self.should_exit = true;
            }
        }
    }
}

impl CompositorHandler for WaylandHost {
    fn scale_factor_changed(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _surface: &wl_surface::WlSurface,
        _new_factor: i32,
    ) {
        debug!("Scale factor changed");
    }

    fn transform_changed(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _surface: &wl_surface::WlSurface,
        _new_transform: wl_output::Transform,
    ) {
        debug!("Transform changed");
    }

    fn frame(
        &mut self,
        _conn: &Connection,
        qh: &QueueHandle<Self>,
        _surface: &wl_surface::WlSurface,
        _time: u32,
    ) {
        self.frame_scheduled = false;
        self.draw(qh);
    }

    fn surface_enter(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _surface: &wl_surface::WlSurface,
        _output: &wl_output::WlOutput,
    ) {
    }

    fn surface_leave(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _surface: &wl_surface::WlSurface,
        _output: &wl_output::WlOutput,
    ) {
    }
}

impl OutputHandler for WaylandHost {
    fn output_state(&mut self) -> &mut OutputState {
        &mut self.output_state
    }

    fn new_output(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _output: wl_output::WlOutput,
    ) {
        debug!("New output detected");
    }

    fn update_output(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _output: wl_output::WlOutput,
    ) {
        debug!("Output updated");
    }

    fn output_destroyed(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _output: wl_output::WlOutput,
    ) {
        debug!("Output destroyed");
    }
}

impl LayerShellHandler for WaylandHost {
    fn closed(&mut self, _conn: &Connection, _qh: &QueueHandle<Self>, _layer: &LayerSurface) {
        info!("Layer surface closed");
        self.should_exit = true;
    }

    fn configure(
        &mut self,
        _conn: &Connection,
        qh: &QueueHandle<Self>,
        _layer: &LayerSurface,
        configure: LayerSurfaceConfigure,
        _serial: u32,
    ) {
        debug!("Layer surface configured: {:?}", configure);

        if configure.new_size.0 > 0 {
            self.width = configure.new_size.0;
        }
        if configure.new_size.1 > 0 {
            self.height = configure.new_size.1;
        }
        if self.width == 0 || self.height == 0 {
            let (width, height) = get_display_dimensions(&self.output_state);
            self.width = width;
            self.height = height;
        }
        self.configured = true;

        match self.gpu.as_mut() {
            Some(gpu) => gpu.resize(self.width, self.height),
            None => {
                if let Err(e) = self.init_gpu() {
                    error!("Failed to initialize GPU context: {:?}", e);
                    self.should_exit = true;
                    return;
                }
            }
        }

        self.app.resize(self.width, self.height);

        // Draw initial frame
        if !self.frame_scheduled {
            self.draw(qh);
        }
    }
}

impl SeatHandler for WaylandHost {
    fn seat_state(&mut self) -> &mut SeatState {
        &mut self.seat_state
    }

    fn new_seat(&mut self, _conn: &Connection, _qh: &QueueHandle<Self>, _seat: wl_seat::WlSeat) {
        debug!("New seat");
    }

    fn new_capability(
        &mut self,
        _conn: &Connection,
        qh: &QueueHandle<Self>,
        seat: wl_seat::WlSeat,
        capability: Capability,
    ) {
        debug!("New capability: {:?}", capability);

        if capability == Capability::Keyboard {
            if let Err(e) = self.seat_state.get_keyboard(qh, &seat, None) {
                error!("Failed to get keyboard: {}", e);
            }
        }
        if capability == Capability::Pointer {
            if let Err(e) = self.seat_state.get_pointer(qh, &seat) {
                error!("Failed to get pointer: {}", e);
            }
        }
    }

    fn remove_capability(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _seat: wl_seat::WlSeat,
        _capability: Capability,
    ) {
        debug!("Capability removed");
    }

    fn remove_seat(&mut self, _conn: &Connection, _qh: &QueueHandle<Self>, _seat: wl_seat::WlSeat) {
        debug!("Seat removed");
    }
}

impl KeyboardHandler for WaylandHost {
    fn enter(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _keyboard: &wl_keyboard::WlKeyboard,
        _surface: &wl_surface::WlSurface,
        _serial: u32,
        _raw: &[u32],
        _keysyms: &[Keysym],
    ) {
        debug!("Keyboard entered surface");
    }

    fn leave(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _keyboard: &wl_keyboard::WlKeyboard,
        _surface: &wl_surface::WlSurface,
        _serial: u32,
    ) {
        debug!("Keyboard left surface");
    }

    fn press_key(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _keyboard: &wl_keyboard::WlKeyboard,
        _serial: u32,
        event: KeyEvent,
    ) {
        debug!("Key pressed: {:?}", event.keysym);

        let key = map_key(event.keysym, event.utf8.as_deref());
        if self.app.key_down(key) {
            return;
        }

        // Close on Escape unless the application used it
        if key == Key::Escape {
            info!("Exit key pressed");
            self.should_exit = true;
        }
    }

    fn release_key(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _keyboard: &wl_keyboard::WlKeyboard,
        _serial: u32,
        _event: KeyEvent,
    ) {
    }

    fn update_modifiers(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _keyboard: &wl_keyboard::WlKeyboard,
        _serial: u32,
        _modifiers: Modifiers,
        _layout: u32,
    ) {
    }
}

impl PointerHandler for WaylandHost {
    fn pointer_frame(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _pointer: &wl_pointer::WlPointer,
        events: &[PointerEvent],
    ) {
        for event in events {
            match event.kind {
                PointerEventKind::Enter { .. } => {
                    debug!("Pointer entered");
                }
                PointerEventKind::Leave { .. } => {
                    debug!("Pointer left");
                }
                PointerEventKind::Press { button, .. } if button == BTN_LEFT => {
                    let (x, y) = event.position;
                    self.app.touch_down(x, y);
                }
                _ => {}
            }
        }
    }
}

impl ProvidesRegistryState for WaylandHost {
    fn registry(&mut self) -> &mut RegistryState {
        &mut self.registry_state
    }

    registry_handlers![OutputState, SeatState];
}

// Delegate macros
delegate_compositor!(WaylandHost);
delegate_output!(WaylandHost);
delegate_layer!(WaylandHost);
delegate_seat!(WaylandHost);
delegate_keyboard!(WaylandHost);
delegate_pointer!(WaylandHost);
delegate_registry!(WaylandHost);

/// Translate a keysym into the toolkit's key set
fn map_key(keysym: Keysym, utf8: Option<&str>) -> Key {
    match keysym {
        Keysym::Return | Keysym::KP_Enter => Key::Enter,
        Keysym::Up => Key::Up,
        Keysym::Down => Key::Down,
        Keysym::Left => Key::Left,
        Keysym::Right => Key::Right,
        Keysym::BackSpace => Key::Backspace,
        Keysym::Escape => Key::Escape,
        Keysym::space => Key::Space,
        _ => match utf8.and_then(|text| text.chars().next()) {
            Some(c) if !c.is_control() => Key::Char(c),
            _ => Key::Other,
        },
    }
}

/// Run `app` on a layer-shell surface until it is closed.
///
/// The compositor has no notion of wallpaper settings, so the host never
/// delivers a settings change; an embedder that persists settings calls
/// [`WallpaperAdapter::notify_settings_changed`](crate::wallpaper::WallpaperAdapter::notify_settings_changed)
/// itself. Offsets stay at their centred defaults.
pub fn run(app: Box<dyn HostedApp>, mode: HostMode) -> Result<()> {
    info!("Connecting to Wayland display");

    // Connect to Wayland display
    let conn = Connection::connect_to_env().context("Failed to connect to Wayland display")?;

    // Initialize registry and event queue
    let (globals, mut event_queue) =
        registry_queue_init(&conn).context("Failed to initialize registry")?;
    let qh = event_queue.handle();

    // Initialize required globals
    let compositor_state =
        CompositorState::bind(&globals, &qh).context("Failed to bind compositor")?;
    let layer_shell = LayerShell::bind(&globals, &qh).context("Failed to bind layer shell")?;

    // Get the display pointer for GPU rendering
    let display_ptr = conn.backend().display_ptr() as *mut std::ffi::c_void;
    if display_ptr.is_null() {
        anyhow::bail!("Wayland display pointer is null");
    }

    let mut host = WaylandHost::new(
        RegistryState::new(&globals),
        SeatState::new(&globals, &qh),
        OutputState::new(&globals, &qh),
        display_ptr,
        app,
    );

    // Dispatch once to get output info
    event_queue.roundtrip(&mut host)?;

    host.app.create();

    // Create the layer surface
    let surface = compositor_state.create_surface(&qh);
    let layer_surface = layer_shell.create_layer_surface(
        &qh,
        surface,
        mode.layer(),
        Some(mode.namespace()),
        None,
    );

    // Fill the output
    layer_surface.set_anchor(Anchor::TOP | Anchor::BOTTOM | Anchor::LEFT | Anchor::RIGHT);
    layer_surface.set_size(0, 0);
    match mode {
        HostMode::Window => {
            layer_surface.set_keyboard_interactivity(KeyboardInteractivity::Exclusive);
        }
        HostMode::Wallpaper => {
            layer_surface.set_keyboard_interactivity(KeyboardInteractivity::None);
            layer_surface.set_exclusive_zone(-1);
        }
    }

    // Commit the surface to trigger configure
    layer_surface.commit();

    host.layer_surface = Some(layer_surface);

    info!("Starting event loop ({:?} mode)", mode);

    // Main event loop
    let result = loop {
        if let Err(e) = event_queue.blocking_dispatch(&mut host) {
            break Err(anyhow::Error::new(e).context("Error while processing Wayland events"));
        }

        if host.should_exit {
            info!("Exiting application");
            break Ok(());
        }
    };

    if result.is_err() {
        warn!("Event loop stopped with an error, shutting down");
    }
    host.app.pause();
    host.app.dispose();
    host.gpu = None;

    result
}

/// Get display dimensions from the output state
fn get_display_dimensions(output_state: &OutputState) -> (u32, u32) {
    for output in output_state.outputs() {
        if let Some(info) = output_state.info(&output) {
            if let Some(mode) = info.modes.iter().find(|m| m.current) {
                return (mode.dimensions.0 as u32, mode.dimensions.1 as u32);
            }
            if let Some(mode) = info.modes.first() {
                return (mode.dimensions.0 as u32, mode.dimensions.1 as u32);
            }
        }
    }
    (1920, 1080)
}
