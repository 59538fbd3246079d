//! Turns logical units into positioned drawing items on a fixed-width surface.
//!
//! Coordinates are surface pixels, origin top-left, y growing downwards.
//! A laid unit is a stack of strips; a strip is the smallest piece the
//! paginator may move to the next page.

use super::fonts::FontSet;
use super::script::{visual_order, Direction};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb(pub f32, pub f32, pub f32);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0.0, 0.0, 0.0);
    pub const SLATE: Rgb = Rgb(0.2, 0.255, 0.333);
    pub const GRAY: Rgb = Rgb(0.4, 0.4, 0.4);
    pub const LIGHT_GRAY: Rgb = Rgb(0.8, 0.8, 0.8);
    pub const SHADE: Rgb = Rgb(0.95, 0.95, 0.95);
    pub const NOTE_FILL: Rgb = Rgb(0.973, 0.98, 0.988);
    pub const BLUE: Rgb = Rgb(0.102, 0.337, 0.859);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Start,
    Center,
    End,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub size: f32,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub color: Rgb,
    /// Multiple of `size`.
    pub leading: f32,
}

impl TextStyle {
    pub fn new(size: f32) -> Self {
        Self {
            size,
            bold: false,
            italic: false,
            underline: false,
            color: Rgb::BLACK,
            leading: 1.5,
        }
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn italic(mut self) -> Self {
        self.italic = true;
        self
    }

    pub fn underline(mut self) -> Self {
        self.underline = true;
        self
    }

    pub fn color(mut self, color: Rgb) -> Self {
        self.color = color;
        self
    }

    pub fn leading(mut self, leading: f32) -> Self {
        self.leading = leading;
        self
    }

    fn line_height(&self) -> f32 {
        self.size * self.leading
    }
}

#[derive(Debug, Clone)]
pub struct Paragraph {
    pub text: String,
    pub style: TextStyle,
    pub align: Align,
    pub direction: Direction,
}

impl Paragraph {
    /// Direction is detected from the text.
    pub fn new(text: impl Into<String>, style: TextStyle) -> Self {
        let text = text.into();
        let direction = Direction::of(&text);
        Self {
            text,
            style,
            align: Align::Start,
            direction,
        }
    }

    pub fn align(mut self, align: Align) -> Self {
        self.align = align;
        self
    }

    pub fn direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }
}

#[derive(Debug, Clone)]
pub struct Cell {
    pub paragraphs: Vec<Paragraph>,
    pub weight: f32,
    /// Signature line drawn across the top of the cell.
    pub rule_above: bool,
}

impl Cell {
    pub fn new(paragraph: Paragraph) -> Self {
        Self {
            paragraphs: vec![paragraph],
            weight: 1.0,
            rule_above: false,
        }
    }

    pub fn stack(paragraphs: Vec<Paragraph>) -> Self {
        Self {
            paragraphs,
            weight: 1.0,
            rule_above: false,
        }
    }

    pub fn weight(mut self, weight: f32) -> Self {
        self.weight = weight;
        self
    }

    pub fn rule_above(mut self) -> Self {
        self.rule_above = true;
        self
    }
}

#[derive(Debug, Clone)]
pub struct Row {
    pub cells: Vec<Cell>,
    /// Rtl places the first cell on the right.
    pub direction: Direction,
    pub gap: f32,
    pub padding: f32,
    /// Stroke around every cell.
    pub border: Option<Rgb>,
    pub fill: Option<Rgb>,
    pub dashed: bool,
}

impl Row {
    pub fn new(cells: Vec<Cell>) -> Self {
        Self {
            cells,
            direction: Direction::Ltr,
            gap: 0.0,
            padding: 0.0,
            border: None,
            fill: None,
            dashed: false,
        }
    }

    pub fn direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    pub fn gap(mut self, gap: f32) -> Self {
        self.gap = gap;
        self
    }

    pub fn padding(mut self, padding: f32) -> Self {
        self.padding = padding;
        self
    }

    pub fn border(mut self, color: Rgb) -> Self {
        self.border = Some(color);
        self
    }

    pub fn fill(mut self, color: Rgb) -> Self {
        self.fill = Some(color);
        self
    }

    pub fn dashed(mut self) -> Self {
        self.dashed = true;
        self
    }

    /// No box, fill or signature rule ties the lines of this row together.
    fn is_open(&self) -> bool {
        self.padding == 0.0
            && self.border.is_none()
            && self.fill.is_none()
            && !self.cells.iter().any(|c| c.rule_above)
    }
}

#[derive(Debug, Clone)]
pub enum Block {
    Paragraph(Paragraph),
    /// Open rows break between lines; boxed rows are one strip.
    Row(Row),
    Rule { thickness: f32, color: Rgb },
    Space(f32),
}

/// A logical unit: a question, a syllabus subject block, a calendar month.
#[derive(Debug, Clone, Default)]
pub struct Unit {
    pub blocks: Vec<Block>,
    pub break_before: bool,
}

impl Unit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn break_before(mut self) -> Self {
        self.break_before = true;
        self
    }

    pub fn push(&mut self, block: Block) -> &mut Self {
        self.blocks.push(block);
        self
    }

    pub fn paragraph(&mut self, p: Paragraph) -> &mut Self {
        self.push(Block::Paragraph(p))
    }

    pub fn row(&mut self, r: Row) -> &mut Self {
        self.push(Block::Row(r))
    }

    pub fn space(&mut self, px: f32) -> &mut Self {
        self.push(Block::Space(px))
    }

    pub fn rule(&mut self, thickness: f32, color: Rgb) -> &mut Self {
        self.push(Block::Rule { thickness, color })
    }

    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.blocks.iter().flat_map(|b| {
            let v: Vec<&str> = match b {
                Block::Paragraph(p) => vec![p.text.as_str()],
                Block::Row(r) => r
                    .cells
                    .iter()
                    .flat_map(|c| c.paragraphs.iter().map(|p| p.text.as_str()))
                    .collect(),
                _ => Vec::new(),
            };
            v.into_iter()
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    /// `y` is the baseline; `text` is already in drawing order.
    Text {
        x: f32,
        y: f32,
        size: f32,
        bold: bool,
        italic: bool,
        color: Rgb,
        text: String,
    },
    Line {
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        width: f32,
        color: Rgb,
        dashed: bool,
    },
    Rect {
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        fill: Option<Rgb>,
        stroke: Option<Rgb>,
        dashed: bool,
    },
}

impl Item {
    pub fn offset(&self, dx: f32, dy: f32) -> Item {
        match self.clone() {
            Item::Text {
                x,
                y,
                size,
                bold,
                italic,
                color,
                text,
            } => Item::Text {
                x: x + dx,
                y: y + dy,
                size,
                bold,
                italic,
                color,
                text,
            },
            Item::Line {
                x1,
                y1,
                x2,
                y2,
                width,
                color,
                dashed,
            } => Item::Line {
                x1: x1 + dx,
                y1: y1 + dy,
                x2: x2 + dx,
                y2: y2 + dy,
                width,
                color,
                dashed,
            },
            Item::Rect {
                x,
                y,
                w,
                h,
                fill,
                stroke,
                dashed,
            } => Item::Rect {
                x: x + dx,
                y: y + dy,
                w,
                h,
                fill,
                stroke,
                dashed,
            },
        }
    }
}

/// Items relative to the strip's top edge.
#[derive(Debug, Clone, Default)]
pub struct Strip {
    pub height: f32,
    pub items: Vec<Item>,
}

#[derive(Debug, Clone, Default)]
pub struct LaidUnit {
    pub strips: Vec<Strip>,
    pub break_before: bool,
}

impl LaidUnit {
    pub fn height(&self) -> f32 {
        self.strips.iter().map(|s| s.height).sum()
    }
}

/// Greedy word wrap of one source line. Words wider than the line are split
/// between characters.
pub fn wrap_line(line: &str, width: f32, size: f32, bold: bool, fonts: &FontSet) -> Vec<String> {
    let space = fonts.measure(" ", size, bold);
    let mut out = Vec::new();
    let mut current = String::new();
    let mut current_w = 0.0;

    for word in line.split(' ') {
        let word_w = fonts.measure(word, size, bold);
        let sep = if current.is_empty() { 0.0 } else { space };
        if current_w + sep + word_w <= width || (current.is_empty() && word_w <= width) {
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(word);
            current_w += sep + word_w;
            continue;
        }
        if !current.is_empty() {
            out.push(std::mem::take(&mut current));
            current_w = 0.0;
        }
        if word_w <= width {
            current.push_str(word);
            current_w = word_w;
            continue;
        }
        for c in word.chars() {
            let cw = fonts.advance(c, bold) * size;
            if current_w + cw > width && !current.is_empty() {
                out.push(std::mem::take(&mut current));
                current_w = 0.0;
            }
            current.push(c);
            current_w += cw;
        }
    }
    out.push(current);
    out
}

fn line_x(p: &Paragraph, x0: f32, width: f32, line_w: f32) -> f32 {
    let slack = (width - line_w).max(0.0);
    match (p.align, p.direction) {
        (Align::Center, _) => x0 + slack / 2.0,
        (Align::Start, Direction::Ltr) | (Align::End, Direction::Rtl) => x0,
        (Align::End, Direction::Ltr) | (Align::Start, Direction::Rtl) => x0 + slack,
    }
}

/// One strip per visual line; source line breaks are preserved and blank
/// lines keep their height.
pub fn layout_paragraph(p: &Paragraph, x0: f32, width: f32, fonts: &FontSet) -> Vec<Strip> {
    let style = &p.style;
    let line_h = style.line_height();
    let avail = width.max(1.0);
    let mut strips = Vec::new();

    for source in p.text.split('\n') {
        let source = source.trim_end_matches('\r');
        if source.trim().is_empty() {
            strips.push(Strip {
                height: line_h,
                items: Vec::new(),
            });
            continue;
        }
        for line in wrap_line(source, avail, style.size, style.bold, fonts) {
            let line_w = fonts.measure(&line, style.size, style.bold);
            let x = line_x(p, x0, width, line_w);
            let baseline = (line_h + style.size * 0.7) / 2.0;
            let mut items = vec![Item::Text {
                x,
                y: baseline,
                size: style.size,
                bold: style.bold,
                italic: style.italic,
                color: style.color,
                text: visual_order(&line, p.direction),
            }];
            if style.underline {
                items.push(Item::Line {
                    x1: x,
                    y1: baseline + 2.0,
                    x2: x + line_w,
                    y2: baseline + 2.0,
                    width: (style.size / 14.0).max(0.75),
                    color: style.color,
                    dashed: false,
                });
            }
            strips.push(Strip {
                height: line_h,
                items,
            });
        }
    }
    strips
}

/// Left edge and width of each cell, in logical order.
fn cell_columns(row: &Row, x0: f32, width: f32) -> Vec<(f32, f32)> {
    let n = row.cells.len();
    let total_weight: f32 = row.cells.iter().map(|c| c.weight.max(0.0)).sum::<f32>().max(f32::EPSILON);
    let usable = (width - row.gap * (n as f32 - 1.0)).max(0.0);
    let widths: Vec<f32> = row
        .cells
        .iter()
        .map(|c| usable * c.weight.max(0.0) / total_weight)
        .collect();

    let mut columns = vec![(0.0, 0.0); n];
    let mut x = x0;
    let order: Vec<usize> = match row.direction {
        Direction::Ltr => (0..n).collect(),
        Direction::Rtl => (0..n).rev().collect(),
    };
    for &i in &order {
        columns[i] = (x, widths[i]);
        x += widths[i] + row.gap;
    }
    columns
}

fn cell_lines(cell: &Cell, x: f32, width: f32, fonts: &FontSet) -> Vec<Strip> {
    cell.paragraphs
        .iter()
        .flat_map(|p| layout_paragraph(p, x, width, fonts))
        .collect()
}

/// Strips for a row inside a unit. An open row yields one strip per line
/// index, line `k` of every cell side by side, so a row taller than a page
/// can continue on the next one.
pub fn layout_row_lines(row: &Row, x0: f32, width: f32, fonts: &FontSet) -> Vec<Strip> {
    if !row.is_open() {
        return vec![layout_row(row, x0, width, fonts)];
    }
    let per_cell: Vec<Vec<Strip>> = row
        .cells
        .iter()
        .zip(cell_columns(row, x0, width))
        .map(|(cell, (left, w))| cell_lines(cell, left, w.max(1.0), fonts))
        .collect();
    let depth = per_cell.iter().map(Vec::len).max().unwrap_or(0);
    (0..depth)
        .map(|k| {
            let mut strip = Strip::default();
            for line in per_cell.iter().filter_map(|lines| lines.get(k)) {
                strip.height = strip.height.max(line.height);
                strip.items.extend(line.items.iter().cloned());
            }
            strip
        })
        .collect()
}

/// A row as one strip, as tall as its tallest cell.
pub fn layout_row(row: &Row, x0: f32, width: f32, fonts: &FontSet) -> Strip {
    let n = row.cells.len();
    if n == 0 {
        return Strip::default();
    }
    let columns = cell_columns(row, x0, width);
    let lefts: Vec<f32> = columns.iter().map(|c| c.0).collect();
    let widths: Vec<f32> = columns.iter().map(|c| c.1).collect();

    let rule_room = 8.0;
    let mut cell_items: Vec<(f32, Vec<Item>)> = Vec::with_capacity(n);
    let mut inner_h: f32 = 0.0;
    for (i, cell) in row.cells.iter().enumerate() {
        let inner_x = lefts[i] + row.padding;
        let inner_w = (widths[i] - 2.0 * row.padding).max(1.0);
        let mut y = if cell.rule_above { rule_room } else { 0.0 };
        let mut items = Vec::new();
        for strip in cell_lines(cell, inner_x, inner_w, fonts) {
            items.extend(strip.items.iter().map(|it| it.offset(0.0, y + row.padding)));
            y += strip.height;
        }
        inner_h = inner_h.max(y);
        cell_items.push((y, items));
    }
    let height = inner_h + 2.0 * row.padding;

    let mut items = Vec::new();
    if let Some(fill) = row.fill {
        items.push(Item::Rect {
            x: x0,
            y: 0.0,
            w: width,
            h: height,
            fill: Some(fill),
            stroke: None,
            dashed: false,
        });
    }
    for (i, cell) in row.cells.iter().enumerate() {
        if cell.rule_above {
            items.push(Item::Line {
                x1: lefts[i] + row.padding,
                y1: row.padding + 1.0,
                x2: lefts[i] + widths[i] - row.padding,
                y2: row.padding + 1.0,
                width: 1.5,
                color: Rgb::BLACK,
                dashed: false,
            });
        }
    }
    for (_, cell) in cell_items {
        items.extend(cell);
    }
    if let Some(stroke) = row.border {
        for i in 0..n {
            items.push(Item::Rect {
                x: lefts[i],
                y: 0.0,
                w: widths[i],
                h: height,
                fill: None,
                stroke: Some(stroke),
                dashed: row.dashed,
            });
        }
    }
    Strip { height, items }
}

pub fn layout_unit(unit: &Unit, width: f32, fonts: &FontSet) -> LaidUnit {
    let mut strips = Vec::new();
    for block in &unit.blocks {
        match block {
            Block::Paragraph(p) => strips.extend(layout_paragraph(p, 0.0, width, fonts)),
            Block::Row(r) => strips.extend(layout_row_lines(r, 0.0, width, fonts)),
            Block::Rule { thickness, color } => {
                let height = thickness + 12.0;
                strips.push(Strip {
                    height,
                    items: vec![Item::Line {
                        x1: 0.0,
                        y1: height / 2.0,
                        x2: width,
                        y2: height / 2.0,
                        width: *thickness,
                        color: *color,
                        dashed: false,
                    }],
                });
            }
            Block::Space(h) => strips.push(Strip {
                height: *h,
                items: Vec::new(),
            }),
        }
    }
    LaidUnit {
        strips,
        break_before: unit.break_before,
    }
}
