//! Scene composition in logical pixels and its rasterisation onto a terminal
//! buffer.
//!
//! [`compose`] turns the bar collection into a flat list of filled
//! rectangles and labels in a fixed logical coordinate space (the window).
//! [`SceneWidget`] then samples that scene onto ratatui cells using
//! half-block glyphs, so every cell carries two sub-pixels. They are stacked
//! vertically when the area has a column for every bar, and placed side by
//! side otherwise so that narrow terminals still show each bar.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier},
    widgets::Widget,
};

use crate::{
    bars::BarCollection,
    config::{DisplayConfig, LabelConfig},
    mapping::{bar_height, bar_width, Rgb},
};

pub const BACKGROUND: Rgb = Rgb::new(15, 10, 20);
pub const GLOW_ALPHA: u8 = 80;
pub const WATERMARK_COLOR: Rgb = Rgb::new(255, 255, 255);
pub const WATERMARK_ALPHA: u8 = 25;
pub const CORNER_TAG_COLOR: Rgb = Rgb::new(200, 200, 255);
/// Corner tag position, measured from the bottom-left corner.
pub const CORNER_TAG_OFFSET: (u32, u32) = (10, 30);

const UPPER_HALF: &str = "▀";
const LEFT_HALF: &str = "▌";

/// Axis-aligned rectangle in logical pixels, `y` growing downwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilledRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    pub color: Rgb,
    pub alpha: u8,
}

impl FilledRect {
    fn contains_x(&self, x: f32) -> bool {
        x >= self.x as f32 && x < (self.x + self.width) as f32
    }

    fn contains_y(&self, y: f32) -> bool {
        y >= self.y as f32 && y < (self.y + self.height) as f32
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelAnchor {
    Center { x: u32, y: u32 },
    TopLeft { x: u32, y: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelSize {
    Large,
    Small,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextLabel {
    pub text: String,
    pub anchor: LabelAnchor,
    pub size: LabelSize,
    pub color: Rgb,
    pub alpha: u8,
}

/// Everything drawn in one frame, back to front.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameScene {
    pub width: u32,
    pub height: u32,
    pub background: Rgb,
    /// Number of equal-width bar slots laid out from the left edge.
    pub slot_count: usize,
    /// Width of one bar slot in logical pixels.
    pub slot_width: u32,
    pub rects: Vec<FilledRect>,
    pub labels: Vec<TextLabel>,
}

impl FrameScene {
    /// Colour at a logical pixel after compositing every rectangle.
    pub fn color_at(&self, x: f32, y: f32) -> Rgb {
        self.rects
            .iter()
            .filter(|rect| rect.contains_x(x) && rect.contains_y(y))
            .fold(self.background, |below, rect| rect.color.over(below, rect.alpha))
    }
}

/// Lays out the bars (glow first, then the solid bar) and the two labels.
pub fn compose(bars: &BarCollection, display: &DisplayConfig, labels: &LabelConfig) -> FrameScene {
    let slot = bar_width(display.width, bars.len());
    let mut rects = Vec::with_capacity(bars.len() * 2);

    for bar in bars {
        let height = bar_height(bar.value, display.height);
        let x = bar.index as u32 * slot;
        let y = display.height - height;

        rects.push(FilledRect {
            x,
            y,
            width: slot,
            height,
            color: bar.color,
            alpha: GLOW_ALPHA,
        });
        rects.push(FilledRect {
            x,
            y,
            width: slot.saturating_sub(1),
            height,
            color: bar.color,
            alpha: u8::MAX,
        });
    }

    let (tag_x, tag_y) = CORNER_TAG_OFFSET;
    let labels = vec![
        TextLabel {
            text: labels.watermark.clone(),
            anchor: LabelAnchor::Center {
                x: display.width / 2,
                y: display.height / 2,
            },
            size: LabelSize::Large,
            color: WATERMARK_COLOR,
            alpha: WATERMARK_ALPHA,
        },
        TextLabel {
            text: labels.corner_tag.clone(),
            anchor: LabelAnchor::TopLeft {
                x: tag_x,
                y: display.height.saturating_sub(tag_y),
            },
            size: LabelSize::Small,
            color: CORNER_TAG_COLOR,
            alpha: u8::MAX,
        },
    ];

    FrameScene {
        width: display.width,
        height: display.height,
        background: BACKGROUND,
        slot_count: bars.len(),
        slot_width: slot,
        rects,
        labels,
    }
}

/// Rasterises a [`FrameScene`] scaled to whatever area it is given.
pub struct SceneWidget<'a> {
    scene: &'a FrameScene,
}

impl<'a> SceneWidget<'a> {
    pub fn new(scene: &'a FrameScene) -> Self {
        Self { scene }
    }

    fn draw_pixels(&self, area: Rect, buf: &mut Buffer) {
        let scene = self.scene;
        let stacked = area.width as usize >= scene.slot_count;
        let (columns, rows) = if stacked {
            (area.width as f32, area.height as f32 * 2.0)
        } else {
            (area.width as f32 * 2.0, area.height as f32)
        };
        let y_scale = scene.height as f32 / rows;

        for column in 0..area.width {
            let (left_x, right_x) = if stacked {
                let x = self.sample_x(column as f32, columns);
                (x, x)
            } else {
                let first = column as f32 * 2.0;
                (self.sample_x(first, columns), self.sample_x(first + 1.0, columns))
            };
            let left_rects = rects_at(&scene.rects, left_x);
            let right_rects = rects_at(&scene.rects, right_x);

            for row in 0..area.height {
                let (fg, bg, symbol) = if stacked {
                    let top_y = (row as f32 * 2.0 + 0.5) * y_scale;
                    let bottom_y = (row as f32 * 2.0 + 1.5) * y_scale;
                    (
                        composite(&left_rects, scene.background, top_y),
                        composite(&left_rects, scene.background, bottom_y),
                        UPPER_HALF,
                    )
                } else {
                    let y = (row as f32 + 0.5) * y_scale;
                    (
                        composite(&left_rects, scene.background, y),
                        composite(&right_rects, scene.background, y),
                        LEFT_HALF,
                    )
                };

                if let Some(cell) = buf.cell_mut((area.x + column, area.y + row)) {
                    cell.set_symbol(symbol)
                        .set_fg(to_color(fg))
                        .set_bg(to_color(bg));
                }
            }
        }
    }

    /// Logical x sampled by sub-column `column` out of `columns`.
    ///
    /// Sub-columns are spread over the bar slots rather than the whole scene
    /// width, so with at least one sub-column per slot every slot is hit. When
    /// a slot's only sample would land in the glow gap past the solid bar, it
    /// is moved onto the bar.
    fn sample_x(&self, column: f32, columns: f32) -> f32 {
        let scene = self.scene;
        if scene.slot_count == 0 || scene.slot_width < 2 {
            return (column + 0.5) * scene.width as f32 / columns;
        }

        let step = scene.slot_count as f32 / columns;
        let position = (column + 0.5) * step;
        let slot = position.floor();
        let within = position - slot;
        let width = scene.slot_width as f32;
        let solid = (width - 1.0) / width;

        if within >= solid && within - step < 0.0 {
            return (slot + solid / 2.0) * width;
        }
        position * width
    }

    fn draw_label(&self, label: &TextLabel, area: Rect, buf: &mut Buffer) {
        let scene = self.scene;
        let width = label.text.chars().count() as i64;
        let to_column = |x: u32| (x as i64 * area.width as i64) / scene.width.max(1) as i64;
        let to_row = |y: u32| (y as i64 * area.height as i64) / scene.height.max(1) as i64;

        let (start, row) = match label.anchor {
            LabelAnchor::Center { x, y } => (to_column(x) - width / 2, to_row(y)),
            LabelAnchor::TopLeft { x, y } => (to_column(x), to_row(y)),
        };
        if row < 0 || row >= area.height as i64 {
            return;
        }

        for (offset, ch) in label.text.chars().enumerate() {
            let column = start + offset as i64;
            if column < 0 || column >= area.width as i64 {
                continue;
            }
            let position = (area.x + column as u16, area.y + row as u16);
            if let Some(cell) = buf.cell_mut(position) {
                let below = from_color(cell.bg).unwrap_or(scene.background);
                let mut symbol = [0u8; 4];
                cell.set_symbol(ch.encode_utf8(&mut symbol))
                    .set_fg(to_color(label.color.over(below, label.alpha)));
                if label.size == LabelSize::Large {
                    cell.modifier.insert(Modifier::BOLD);
                }
            }
        }
    }
}

impl Widget for SceneWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }
        self.draw_pixels(area, buf);
        for label in &self.scene.labels {
            self.draw_label(label, area, buf);
        }
    }
}

fn rects_at(rects: &[FilledRect], x: f32) -> Vec<&FilledRect> {
    rects.iter().filter(|rect| rect.contains_x(x)).collect()
}

fn composite(rects: &[&FilledRect], background: Rgb, y: f32) -> Rgb {
    rects
        .iter()
        .filter(|rect| rect.contains_y(y))
        .fold(background, |below, rect| rect.color.over(below, rect.alpha))
}

fn to_color(rgb: Rgb) -> Color {
    Color::Rgb(rgb.r, rgb.g, rgb.b)
}

fn from_color(color: Color) -> Option<Rgb> {
    match color {
        Color::Rgb(r, g, b) => Some(Rgb::new(r, g, b)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scene_for(values: Vec<f32>) -> FrameScene {
        compose(
            &BarCollection::from_values(values),
            &DisplayConfig::default(),
            &LabelConfig::default(),
        )
    }

    #[test]
    fn bars_grow_up_from_the_bottom_edge() {
        let scene = scene_for(vec![0.5, 0.0, 0.25, 0.75]);
        assert_eq!(scene.rects.len(), 8);

        let glow = scene.rects[0];
        let solid = scene.rects[1];
        assert_eq!((glow.x, glow.y, glow.width, glow.height), (0, 300, 250, 300));
        assert_eq!(glow.alpha, GLOW_ALPHA);
        assert_eq!((solid.width, solid.alpha), (249, 255));

        let last = scene.rects[7];
        assert_eq!((last.x, last.y, last.height), (750, 150, 450));
        assert!(scene.rects.iter().all(|rect| rect.y + rect.height == 600));
    }

    #[test]
    fn labels_are_centred_and_cornered() {
        let scene = scene_for(vec![0.0]);
        assert_eq!(scene.labels.len(), 2);
        assert_eq!(scene.labels[0].anchor, LabelAnchor::Center { x: 500, y: 300 });
        assert_eq!(scene.labels[0].alpha, WATERMARK_ALPHA);
        assert_eq!(scene.labels[1].anchor, LabelAnchor::TopLeft { x: 10, y: 570 });
    }

    #[test]
    fn glow_shows_in_the_gap_between_bars() {
        let scene = scene_for(vec![0.99, 0.99]);
        let color = scene.rects[0].color;

        assert_eq!(scene.color_at(100.0, 590.0), color);
        let gap = scene.color_at(499.5, 590.0);
        assert_eq!(gap, color.over(BACKGROUND, GLOW_ALPHA));
        assert_eq!(scene.color_at(100.0, 1.0), BACKGROUND);
    }

    #[test]
    fn widget_paints_background_and_bars() {
        let mut scene = scene_for(vec![0.5, 0.0]);
        scene.labels.clear();
        let area = Rect::new(0, 0, 20, 10);
        let mut buf = Buffer::empty(area);
        SceneWidget::new(&scene).render(area, &mut buf);

        let top_left = buf.cell((0, 0)).unwrap();
        assert_eq!(top_left.symbol(), UPPER_HALF);
        assert_eq!(top_left.fg, to_color(BACKGROUND));

        let bar_color = to_color(scene.rects[1].color);
        let bottom_left = buf.cell((2, 9)).unwrap();
        assert_eq!(bottom_left.fg, bar_color);
        assert_eq!(bottom_left.bg, bar_color);

        let empty_bar = buf.cell((15, 9)).unwrap();
        assert_eq!(empty_bar.bg, to_color(BACKGROUND));
    }

    #[test]
    fn every_bar_is_visible_on_narrow_and_wide_terminals() {
        let values: Vec<f32> = (0..100).map(|k| 0.5 + k as f32 / 200.0).collect();
        let mut scene = scene_for(values);
        scene.labels.clear();
        let bar_colors: Vec<Color> = scene.rects.iter().step_by(2).map(|r| to_color(r.color)).collect();

        for width in [50u16, 80, 99, 100, 137, 200] {
            let area = Rect::new(0, 0, width, 24);
            let mut buf = Buffer::empty(area);
            SceneWidget::new(&scene).render(area, &mut buf);

            let mut seen = Vec::new();
            for x in 0..width {
                let cell = buf.cell((x, 23)).unwrap();
                seen.push(cell.fg);
                seen.push(cell.bg);
            }
            let missing = bar_colors.iter().filter(|c| !seen.contains(c)).count();
            assert_eq!(missing, 0, "{missing} bars hidden at {width} columns");
        }
    }

    #[test]
    fn narrow_terminals_split_cells_side_by_side() {
        let mut scene = scene_for((0..100).map(|k| k as f32 / 100.0).collect());
        scene.labels.clear();
        let area = Rect::new(0, 0, 80, 24);
        let mut buf = Buffer::empty(area);
        SceneWidget::new(&scene).render(area, &mut buf);
        assert_eq!(buf.cell((0, 0)).unwrap().symbol(), LEFT_HALF);
    }

    #[test]
    fn widget_writes_label_text() {
        let scene = scene_for(vec![0.1, 0.2, 0.3]);
        let area = Rect::new(0, 0, 80, 24);
        let mut buf = Buffer::empty(area);
        SceneWidget::new(&scene).render(area, &mut buf);

        let row: String = (0..area.width)
            .map(|x| buf.cell((x, 22)).unwrap().symbol().to_string())
            .collect();
        assert!(row.contains(&LabelConfig::default().corner_tag));

        let centre: String = (0..area.width)
            .map(|x| buf.cell((x, 12)).unwrap().symbol().to_string())
            .collect();
        assert!(centre.contains(&LabelConfig::default().watermark));
    }
}
