// Example launcher
// Lets the user pick a registered example screen and run it full-screen

use crate::app::{simple_type_name, ApplicationListener, InputProcessor, Key, Screen};
use crate::graphics::{Color, Graphics};
use crate::menu::{MenuHit, MenuLayout, MenuView};
use anyhow::Result;
use log::{debug, error, info, warn};
use thiserror::Error;

/// Menu background
const MENU_CLEAR_COLOR: Color = Color::rgb(0.08, 0.08, 0.1);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("an example named '{0}' is already registered")]
    Duplicate(String),
}

/// Builds a fresh example screen
pub type ExampleFactory<G> = Box<dyn Fn() -> Result<Box<dyn Screen<G>>>>;

struct ExampleEntry<G: Graphics> {
    name: String,
    factory: ExampleFactory<G>,
}

/// Ordered table of launchable examples
pub struct ExampleRegistry<G: Graphics> {
    entries: Vec<ExampleEntry<G>>,
}

impl<G: Graphics> ExampleRegistry<G> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Register a factory under `name`. Names are unique and case-sensitive.
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F) -> Result<(), RegistryError>
    where
        F: Fn() -> Result<Box<dyn Screen<G>>> + 'static,
    {
        let name = name.into();
        if self.position(&name).is_some() {
            return Err(RegistryError::Duplicate(name));
        }
        debug!("Registered example '{}'", name);
        self.entries.push(ExampleEntry {
            name,
            factory: Box::new(factory),
        });
        Ok(())
    }

    /// Register a default-constructible screen under its simple type name
    pub fn register_type<T>(&mut self) -> Result<(), RegistryError>
    where
        T: Screen<G> + Default + 'static,
    {
        self.register(simple_type_name::<T>(), || {
            Ok(Box::new(T::default()) as Box<dyn Screen<G>>)
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Names in registration order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.name.as_str())
    }

    pub fn name(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(|entry| entry.name.as_str())
    }

    /// Index of the entry named exactly `name`
    pub fn position(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|entry| entry.name == name)
    }

    /// Build a new instance of entry `index`
    pub fn instantiate(&self, index: usize) -> Result<Box<dyn Screen<G>>> {
        match self.entries.get(index) {
            Some(entry) => (entry.factory)(),
            None => anyhow::bail!("no example registered at index {}", index),
        }
    }
}

impl<G: Graphics> Default for ExampleRegistry<G> {
    fn default() -> Self {
        Self::new()
    }
}

/// Drop-down selection model: a list of labels and at most one selected index
#[derive(Debug, Clone, Default)]
pub struct SelectBox {
    items: Vec<String>,
    selected: Option<usize>,
}

impl SelectBox {
    /// Selects the first item, if any
    pub fn new(items: Vec<String>) -> Self {
        let selected = if items.is_empty() { None } else { Some(0) };
        Self { items, selected }
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.map(|index| self.items[index].as_str())
    }

    /// Ignored when `index` is out of range
    pub fn set_selected_index(&mut self, index: usize) {
        if index < self.items.len() {
            self.selected = Some(index);
        }
    }

    pub fn select_next(&mut self) {
        let count = self.items.len();
        if count == 0 {
            return;
        }
        let current = self.selected.unwrap_or(count - 1);
        self.selected = Some((current + 1) % count);
    }

    pub fn select_previous(&mut self) {
        let count = self.items.len();
        if count == 0 {
            return;
        }
        let current = self.selected.unwrap_or(0);
        self.selected = Some((current + count - 1) % count);
    }
}

/// What the runner is currently showing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunnerState {
    /// Menu visible, no example active
    Picking,
    /// An example owns the screen
    Running,
}

/// Who receives input events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InputTarget {
    Menu,
    Example,
}

struct ActiveExample<G: Graphics> {
    index: usize,
    screen: Box<dyn Screen<G>>,
}

/// Application that picks one registered example and runs it.
///
/// At most one example is alive at a time. Backspace returns from a running
/// example to the picker with that example preselected.
pub struct ExampleRunner<G: Graphics> {
    registry: ExampleRegistry<G>,
    select_box: SelectBox,
    active: Option<ActiveExample<G>>,
    input: InputTarget,
    startup_example: Option<String>,
    size: Option<(u32, u32)>,
    menu: Option<MenuView>,
}

impl<G: Graphics> ExampleRunner<G> {
    /// `startup_example` names an entry to launch immediately, bypassing the picker
    pub fn new(registry: ExampleRegistry<G>, startup_example: Option<String>) -> Self {
        let select_box = SelectBox::new(registry.names().map(str::to_owned).collect());
        Self {
            registry,
            select_box,
            active: None,
            input: InputTarget::Menu,
            startup_example,
            size: None,
            menu: None,
        }
    }

    pub fn state(&self) -> RunnerState {
        if self.active.is_some() {
            RunnerState::Running
        } else {
            RunnerState::Picking
        }
    }

    pub fn registry(&self) -> &ExampleRegistry<G> {
        &self.registry
    }

    pub fn select_box(&self) -> &SelectBox {
        &self.select_box
    }

    /// Name of the running example
    pub fn active_name(&self) -> Option<&str> {
        self.active
            .as_ref()
            .and_then(|active| self.registry.name(active.index))
    }

    /// Start whatever the drop-down has selected
    pub fn start_selected(&mut self) -> bool {
        match self.select_box.selected_index() {
            Some(index) => self.start(index),
            None => false,
        }
    }

    /// Start entry `index`, replacing any running example.
    ///
    /// A failing factory is logged and leaves the runner as it was.
    pub fn start(&mut self, index: usize) -> bool {
        let name = self.registry.name(index).unwrap_or("?").to_owned();
        let mut screen = match self.registry.instantiate(index) {
            Ok(screen) => screen,
            Err(e) => {
                error!("Failed to start example '{}': {:#}", name, e);
                return false;
            }
        };

        if let Some(mut previous) = self.active.take() {
            previous.screen.hide();
            previous.screen.dispose();
        }

        info!("Starting example '{}'", name);
        screen.show();
        if let Some((width, height)) = self.size {
            screen.resize(width, height);
        }
        self.active = Some(ActiveExample { index, screen });
        self.input = InputTarget::Example;
        true
    }

    /// Tear down the running example and go back to the picker
    pub fn exit_current_example(&mut self) -> bool {
        let Some(mut exited) = self.active.take() else {
            return false;
        };
        info!(
            "Exiting example '{}'",
            self.registry.name(exited.index).unwrap_or("?")
        );
        exited.screen.hide();
        exited.screen.dispose();
        self.select_box.set_selected_index(exited.index);
        self.input = InputTarget::Menu;
        true
    }

    fn menu_key_down(&mut self, key: Key) -> bool {
        match key {
            Key::Enter => {
                self.start_selected();
                true
            }
            Key::Up => {
                self.select_box.select_previous();
                true
            }
            Key::Down => {
                self.select_box.select_next();
                true
            }
            _ => false,
        }
    }

    fn menu_touch_down(&mut self, x: f64, y: f64) -> bool {
        let Some((width, height)) = self.size else {
            return false;
        };
        // The menu may have been painted smaller than the surface and stretched over it
        let (menu_width, menu_height) = self
            .menu
            .as_ref()
            .map(|menu| (menu.canvas().width(), menu.canvas().height()))
            .unwrap_or((width, height));
        let x = x * menu_width as f64 / width.max(1) as f64;
        let y = y * menu_height as f64 / height.max(1) as f64;

        let layout = MenuLayout::new(menu_width, menu_height, self.select_box.items().len());
        match layout.hit_test(x, y) {
            Some(MenuHit::Entry(index)) => {
                self.select_box.set_selected_index(index);
                true
            }
            Some(MenuHit::Start) => {
                self.start_selected();
                true
            }
            None => false,
        }
    }

    fn render_menu(&mut self, gfx: &mut G) {
        let (width, height) = gfx.viewport();
        gfx.clear(MENU_CLEAR_COLOR);
        let menu = self.menu.get_or_insert_with(MenuView::new);
        menu.paint(&self.select_box, width, height);
        gfx.draw_canvas(menu.canvas());
    }
}

impl<G: Graphics> ApplicationListener<G> for ExampleRunner<G> {
    fn create(&mut self) {
        if self.registry.is_empty() {
            warn!("No examples registered");
        }
        if let Some(name) = self.startup_example.take() {
            match self.registry.position(&name) {
                Some(index) => {
                    if self.start(index) {
                        return;
                    }
                }
                None => warn!("No example named '{}', showing the picker", name),
            }
        }
        self.input = InputTarget::Menu;
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.size = Some((width, height));
        if let Some(active) = self.active.as_mut() {
            active.screen.resize(width, height);
        }
    }

    fn render(&mut self, gfx: &mut G, delta: f32) {
        match self.active.as_mut() {
            Some(active) => active.screen.render(gfx, delta),
            None => self.render_menu(gfx),
        }
    }

    fn pause(&mut self) {
        if let Some(active) = self.active.as_mut() {
            active.screen.pause();
        }
    }

    fn resume(&mut self) {
        if let Some(active) = self.active.as_mut() {
            active.screen.resume();
        }
    }

    fn dispose(&mut self) {
        if let Some(mut active) = self.active.take() {
            active.screen.hide();
            active.screen.dispose();
        }
        self.menu = None;
        self.input = InputTarget::Menu;
    }
}

impl<G: Graphics> InputProcessor for ExampleRunner<G> {
    fn key_down(&mut self, key: Key) -> bool {
        if key == Key::Backspace && self.active.is_some() {
            return self.exit_current_example();
        }
        match self.input {
            InputTarget::Menu => self.menu_key_down(key),
            InputTarget::Example => self
                .active
                .as_mut()
                .map(|active| active.screen.key_down(key))
                .unwrap_or(false),
        }
    }

    fn touch_down(&mut self, x: f64, y: f64) -> bool {
        match self.input {
            InputTarget::Menu => self.menu_touch_down(x, y),
            InputTarget::Example => self
                .active
                .as_mut()
                .map(|active| active.screen.touch_down(x, y))
                .unwrap_or(false),
        }
    }
}
