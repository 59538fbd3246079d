use super::layout::{Item, LaidUnit};
use super::RenderError;

pub const A4_WIDTH_PT: f32 = 595.28;
pub const A4_HEIGHT_PT: f32 = 841.89;

const EPS: f32 = 0.01;

/// Surface and page dimensions. The surface is a fixed pixel width that is
/// scaled onto the page width; padding and footer are in surface pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub surface_width: f32,
    pub padding: f32,
    pub footer_height: f32,
    pub page_width_pt: f32,
    pub page_height_pt: f32,
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self {
            surface_width: 800.0,
            padding: 40.0,
            footer_height: 36.0,
            page_width_pt: A4_WIDTH_PT,
            page_height_pt: A4_HEIGHT_PT,
        }
    }
}

impl PageGeometry {
    pub fn content_width(&self) -> f32 {
        self.surface_width - 2.0 * self.padding
    }

    /// Page height in surface pixels, from the page aspect ratio.
    pub fn page_height(&self) -> f32 {
        self.surface_width * self.page_height_pt / self.page_width_pt
    }

    pub fn band_height(&self) -> f32 {
        self.page_height() - 2.0 * self.padding - self.footer_height
    }

    /// Points per surface pixel.
    pub fn scale(&self) -> f32 {
        self.page_width_pt / self.surface_width
    }

    pub fn validate(&self) -> Result<(), RenderError> {
        if !(self.surface_width > 0.0 && self.page_width_pt > 0.0 && self.page_height_pt > 0.0) {
            return Err(RenderError::Geometry("page and surface must have a size".into()));
        }
        if self.content_width() <= 0.0 || self.band_height() <= 0.0 {
            return Err(RenderError::Geometry(format!(
                "padding {} and footer {} leave no room on the page",
                self.padding, self.footer_height
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct PlacedStrip {
    pub top: f32,
    pub items: Vec<Item>,
}

/// The whole document on one continuous surface.
#[derive(Debug, Clone, Default)]
pub struct Surface {
    pub height: f32,
    pub strips: Vec<PlacedStrip>,
}

fn offset_in_band(cursor: f32, band: f32) -> f32 {
    let off = cursor - (cursor / band).floor() * band;
    if band - off < EPS {
        0.0
    } else {
        off
    }
}

fn next_band(cursor: f32, band: f32) -> f32 {
    ((cursor + EPS) / band).floor() * band + band
}

/// Stacks the units top to bottom, inserting blank space so that
/// `break_before` units start a band, a unit that fits a band is never split,
/// and an oversized unit breaks only between strips.
pub fn compose(units: &[LaidUnit], band: f32) -> Surface {
    let mut cursor: f32 = 0.0;
    let mut strips = Vec::new();
    for unit in units {
        if unit.break_before && offset_in_band(cursor, band) > EPS {
            cursor = next_band(cursor, band);
        }
        let h = unit.height();
        if h <= band && offset_in_band(cursor, band) + h > band + EPS {
            cursor = next_band(cursor, band);
        }
        for strip in &unit.strips {
            let off = offset_in_band(cursor, band);
            if off > EPS && strip.height <= band && off + strip.height > band + EPS {
                cursor = next_band(cursor, band);
            }
            strips.push(PlacedStrip {
                top: cursor,
                items: strip.items.clone(),
            });
            cursor += strip.height;
        }
    }
    Surface {
        height: cursor,
        strips,
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Band {
    pub index: usize,
    pub top: f32,
    pub height: f32,
}

/// Consecutive bands covering the surface; the last may be partial and an
/// empty surface still yields one page.
pub fn slice_bands(surface_height: f32, band: f32) -> Vec<Band> {
    let count = ((surface_height - EPS) / band).ceil().max(1.0) as usize;
    (0..count)
        .map(|index| {
            let top = index as f32 * band;
            Band {
                index,
                top,
                height: (surface_height - top).clamp(0.0, band),
            }
        })
        .collect()
}

#[derive(Debug, Clone)]
pub struct Page {
    pub band: Band,
    /// Relative to the band's top edge.
    pub items: Vec<Item>,
}

pub fn paginate(surface: Surface, band: f32) -> Vec<Page> {
    let mut pages: Vec<Page> = slice_bands(surface.height, band)
        .into_iter()
        .map(|band| Page {
            band,
            items: Vec::new(),
        })
        .collect();
    let last = pages.len() - 1;
    for strip in surface.strips {
        let index = (((strip.top + EPS) / band).floor() as usize).min(last);
        let dy = strip.top - pages[index].band.top;
        pages[index]
            .items
            .extend(strip.items.iter().map(|it| it.offset(0.0, dy)));
    }
    pages
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::layout::{Rgb, Strip};

    fn unit(heights: &[f32], break_before: bool) -> LaidUnit {
        LaidUnit {
            strips: heights
                .iter()
                .map(|h| Strip {
                    height: *h,
                    items: vec![Item::Line {
                        x1: 0.0,
                        y1: 0.0,
                        x2: 1.0,
                        y2: 0.0,
                        width: 1.0,
                        color: Rgb::BLACK,
                        dashed: false,
                    }],
                })
                .collect(),
            break_before,
        }
    }

    #[test]
    fn a4_band_height() {
        let g = PageGeometry::default();
        assert!((g.page_height() - 1131.4).abs() < 0.1);
        assert!((g.band_height() - 1015.4).abs() < 0.1);
        g.validate().expect("valid");
        let squeezed = PageGeometry {
            padding: 600.0,
            ..g
        };
        assert!(squeezed.validate().is_err());
    }

    #[test]
    fn unit_that_fits_moves_whole() {
        let s = compose(&[unit(&[60.0], false), unit(&[30.0, 30.0], false)], 100.0);
        let tops: Vec<f32> = s.strips.iter().map(|p| p.top).collect();
        assert_eq!(tops, vec![0.0, 100.0, 130.0]);
        assert_eq!(s.height, 160.0);
    }

    #[test]
    fn oversized_unit_breaks_between_strips() {
        let s = compose(&[unit(&[10.0], false), unit(&[40.0; 4], false)], 100.0);
        let tops: Vec<f32> = s.strips.iter().map(|p| p.top).collect();
        // 160 px unit cannot fit any band; it continues after the 10 px one.
        assert_eq!(tops, vec![0.0, 10.0, 50.0, 100.0, 140.0]);
    }

    #[test]
    fn break_before_starts_a_band() {
        let s = compose(&[unit(&[10.0], true), unit(&[10.0], true)], 100.0);
        assert_eq!(s.strips[0].top, 0.0);
        assert_eq!(s.strips[1].top, 100.0);
    }

    #[test]
    fn slicing_keeps_a_partial_last_band() {
        let bands = slice_bands(250.0, 100.0);
        assert_eq!(bands.len(), 3);
        assert_eq!(bands[2].top, 200.0);
        assert_eq!(bands[2].height, 50.0);
        assert_eq!(slice_bands(0.0, 100.0).len(), 1);
        assert_eq!(slice_bands(200.0, 100.0).len(), 2);
    }

    #[test]
    fn pages_receive_band_relative_items() {
        let s = compose(&[unit(&[60.0], false), unit(&[60.0], false)], 100.0);
        let pages = paginate(s, 100.0);
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[1].items.len(), 1);
        match &pages[1].items[0] {
            Item::Line { y1, .. } => assert_eq!(*y1, 0.0),
            other => panic!("unexpected item {:?}", other),
        }
    }
}
