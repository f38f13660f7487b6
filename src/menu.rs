// Example picker menu
// Lays out and rasterises the drop-down and start button into a canvas

use crate::graphics::{Canvas, Color};
use crate::launcher::SelectBox;
use cosmic_text::{Attrs, Buffer, FontSystem, Metrics, Shaping, SwashCache};
use log::debug;

const ROW_HEIGHT: u32 = 32;
const MENU_WIDTH: u32 = 420;
/// Gap between the drop-down and the start button
const SPACING: u32 = 20;
const BUTTON_HEIGHT: u32 = 40;
const TITLE_HEIGHT: u32 = 48;
const MARGIN: u32 = 20;
/// Larger canvases are painted at this size and stretched
const MAX_CANVAS_SIZE: u32 = 4096;

const FONT_SIZE: f32 = 18.0;
const LINE_HEIGHT: f32 = 22.0;

const BACKGROUND: Color = Color::rgb(0.08, 0.08, 0.1);
const ROW: Color = Color::rgb(0.22, 0.22, 0.24);
const ROW_SELECTED: Color = Color::rgb(0.31, 0.47, 0.71);
const BUTTON: Color = Color::rgb(0.35, 0.35, 0.38);
const TEXT: Color = Color::rgb(0.95, 0.95, 0.95);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x as f64
            && y >= self.y as f64
            && x < (self.x + self.width as i32) as f64
            && y < (self.y + self.height as i32) as f64
    }
}

/// What a pointer press landed on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuHit {
    Entry(usize),
    Start,
}

/// Positions of the menu widgets, centred in the viewport
#[derive(Debug, Clone, PartialEq)]
pub struct MenuLayout {
    pub title: Rect,
    pub rows: Vec<Rect>,
    pub button: Rect,
}

impl MenuLayout {
    pub fn new(width: u32, height: u32, entries: usize) -> Self {
        let menu_width = MENU_WIDTH.min(width.saturating_sub(2 * MARGIN)).max(1);
        let total_height = TITLE_HEIGHT + entries as u32 * ROW_HEIGHT + SPACING + BUTTON_HEIGHT;
        let x = (width as i32 - menu_width as i32) / 2;
        let top = ((height as i32 - total_height as i32) / 2).max(0);

        let title = Rect {
            x,
            y: top,
            width: menu_width,
            height: TITLE_HEIGHT,
        };
        let rows_top = top + TITLE_HEIGHT as i32;
        let rows = (0..entries)
            .map(|i| Rect {
                x,
                y: rows_top + (i as u32 * ROW_HEIGHT) as i32,
                width: menu_width,
                height: ROW_HEIGHT,
            })
            .collect();
        let button = Rect {
            x,
            y: rows_top + (entries as u32 * ROW_HEIGHT + SPACING) as i32,
            width: menu_width,
            height: BUTTON_HEIGHT,
        };

        Self {
            title,
            rows,
            button,
        }
    }

    pub fn hit_test(&self, x: f64, y: f64) -> Option<MenuHit> {
        if let Some(index) = self.rows.iter().position(|row| row.contains(x, y)) {
            return Some(MenuHit::Entry(index));
        }
        if self.button.contains(x, y) {
            return Some(MenuHit::Start);
        }
        None
    }
}

/// Paints the picker into a canvas, repainting only when something changed
pub struct MenuView {
    font_system: FontSystem,
    swash_cache: SwashCache,
    canvas: Canvas,
    painted: Option<(Option<usize>, u32, u32)>,
}

impl MenuView {
    pub fn new() -> Self {
        debug!("Loading fonts for the example menu");
        Self {
            font_system: FontSystem::new(),
            swash_cache: SwashCache::new(),
            canvas: Canvas::new(1, 1),
            painted: None,
        }
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn paint(&mut self, select_box: &SelectBox, width: u32, height: u32) {
        let width = width.clamp(1, MAX_CANVAS_SIZE);
        let height = height.clamp(1, MAX_CANVAS_SIZE);
        let key = (select_box.selected_index(), width, height);
        if self.painted == Some(key) {
            return;
        }

        self.canvas.resize(width, height);
        self.canvas.fill(BACKGROUND);

        let layout = MenuLayout::new(width, height, select_box.items().len());
        self.draw_label(layout.title, "Examples");

        for (index, (row, label)) in layout.rows.iter().zip(select_box.items()).enumerate() {
            let fill = if select_box.selected_index() == Some(index) {
                ROW_SELECTED
            } else {
                ROW
            };
            self.canvas
                .fill_rect(row.x, row.y, row.width, row.height - 1, fill);
            self.draw_label(*row, label);
        }

        let button = layout.button;
        self.canvas
            .fill_rect(button.x, button.y, button.width, button.height, BUTTON);
        self.draw_label(button, "Start example");

        self.painted = Some(key);
    }

    fn draw_label(&mut self, rect: Rect, text: &str) {
        let mut buffer = Buffer::new(&mut self.font_system, Metrics::new(FONT_SIZE, LINE_HEIGHT));
        buffer.set_size(
            &mut self.font_system,
            Some(rect.width as f32),
            Some(rect.height as f32),
        );
        buffer.set_text(&mut self.font_system, text, Attrs::new(), Shaping::Advanced);
        buffer.shape_until_scroll(&mut self.font_system, false);

        let origin_x = rect.x + 10;
        let origin_y = rect.y + ((rect.height as f32 - LINE_HEIGHT) / 2.0) as i32;
        let [r, g, b, _] = TEXT.to_rgba8();
        let canvas = &mut self.canvas;
        buffer.draw(
            &mut self.font_system,
            &mut self.swash_cache,
            cosmic_text::Color::rgb(r, g, b),
            |x, y, w, h, color| {
                for dy in 0..h as i32 {
                    for dx in 0..w as i32 {
                        let px = origin_x + x + dx;
                        let py = origin_y + y + dy;
                        if px >= 0 && py >= 0 {
                            canvas.blend_pixel(
                                px as u32,
                                py as u32,
                                [color.r(), color.g(), color.b(), color.a()],
                            );
                        }
                    }
                }
            },
        );
    }
}

impl Default for MenuView {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_is_centred() {
        let layout = MenuLayout::new(1000, 800, 2);
        assert_eq!(layout.rows.len(), 2);
        assert_eq!(layout.rows[0].x, (1000 - MENU_WIDTH as i32) / 2);
        let total = TITLE_HEIGHT + 2 * ROW_HEIGHT + SPACING + BUTTON_HEIGHT;
        assert_eq!(layout.title.y, (800 - total as i32) / 2);
        assert_eq!(
            layout.button.y,
            layout.rows[1].y + (ROW_HEIGHT + SPACING) as i32
        );
    }

    #[test]
    fn narrow_viewport_shrinks_menu() {
        let layout = MenuLayout::new(200, 600, 1);
        assert_eq!(layout.button.width, 200 - 2 * MARGIN);
        assert_eq!(layout.button.x, MARGIN as i32);
    }

    #[test]
    fn hit_test_finds_rows_and_button() {
        let layout = MenuLayout::new(800, 600, 3);
        let row = layout.rows[1];
        let hit = layout.hit_test(row.x as f64 + 5.0, row.y as f64 + 5.0);
        assert_eq!(hit, Some(MenuHit::Entry(1)));

        let button = layout.button;
        let hit = layout.hit_test(button.x as f64 + 1.0, button.y as f64 + 1.0);
        assert_eq!(hit, Some(MenuHit::Start));

        // the gap between the last row and the button
        let gap_y = layout.rows[2].y as f64 + ROW_HEIGHT as f64 + 1.0;
        assert_eq!(layout.hit_test(button.x as f64 + 1.0, gap_y), None);
        assert_eq!(layout.hit_test(0.0, 0.0), None);
    }
}
