use std::collections::BTreeMap;

use pdf_writer::types::{CidFontType, FontFlags, SystemInfo, UnicodeCmap};
use pdf_writer::{Content, Finish, Name, Pdf, Rect, Ref, Str, TextStr};

use super::fonts::{encode_winansi, FontSet, TrueTypeFont};
use super::layout::{Item, Rgb};
use super::paginate::PageGeometry;

const HELVETICA: [(&[u8], &[u8]); 4] = [
    (b"F1", b"Helvetica"),
    (b"F2", b"Helvetica-Bold"),
    (b"F3", b"Helvetica-Oblique"),
    (b"F4", b"Helvetica-BoldOblique"),
];
const EMBEDDED: &[u8] = b"F0";

fn helvetica_slot(bold: bool, italic: bool) -> usize {
    match (bold, italic) {
        (false, false) => 0,
        (true, false) => 1,
        (false, true) => 2,
        (true, true) => 3,
    }
}

struct Mapper {
    scale: f32,
    padding: f32,
    page_height_pt: f32,
}

impl Mapper {
    fn x(&self, x: f32) -> f32 {
        (self.padding + x) * self.scale
    }

    fn y(&self, y: f32) -> f32 {
        self.page_height_pt - (self.padding + y) * self.scale
    }
}

fn fill(content: &mut Content, c: Rgb) {
    content.set_fill_rgb(c.0, c.1, c.2);
}

fn stroke(content: &mut Content, c: Rgb) {
    content.set_stroke_rgb(c.0, c.1, c.2);
}

/// Writes one content stream per page. Items are in content coordinates
/// (top-left of the padded area), as produced by the paginator. Callers
/// refuse right-to-left text before getting here when no face is embedded.
pub fn write_pdf(pages: &[Vec<Item>], geometry: &PageGeometry, fonts: &FontSet, title: &str) -> Vec<u8> {
    let mut next = 1;
    let mut alloc = || {
        let r = Ref::new(next);
        next += 1;
        r
    };
    let catalog_id = alloc();
    let tree_id = alloc();
    let info_id = alloc();
    let helvetica_ids: Vec<Ref> = HELVETICA.iter().map(|_| alloc()).collect();
    let embedded_ids = fonts
        .truetype()
        .map(|_| (alloc(), alloc(), alloc(), alloc(), alloc()));
    let page_ids: Vec<(Ref, Ref)> = pages.iter().map(|_| (alloc(), alloc())).collect();

    let mut pdf = Pdf::new();
    pdf.catalog(catalog_id).pages(tree_id);
    pdf.pages(tree_id)
        .kids(page_ids.iter().map(|(page, _)| *page))
        .count(page_ids.len() as i32);
    pdf.document_info(info_id)
        .title(TextStr(title))
        .producer(TextStr("examdeskd"));

    let map = Mapper {
        scale: geometry.scale(),
        padding: geometry.padding,
        page_height_pt: geometry.page_height_pt,
    };
    let mut used_glyphs: BTreeMap<u16, (f32, char)> = BTreeMap::new();

    for (items, (page_id, content_id)) in pages.iter().zip(&page_ids) {
        let mut page = pdf.page(*page_id);
        page.media_box(Rect::new(
            0.0,
            0.0,
            geometry.page_width_pt,
            geometry.page_height_pt,
        ));
        page.parent(tree_id);
        page.contents(*content_id);
        {
            let mut resources = page.resources();
            let mut font_dict = resources.fonts();
            for ((name, _), id) in HELVETICA.iter().zip(&helvetica_ids) {
                font_dict.pair(Name(*name), *id);
            }
            if let Some((type0_id, ..)) = embedded_ids {
                font_dict.pair(Name(EMBEDDED), type0_id);
            }
        }
        page.finish();

        let mut content = Content::new();
        for item in items {
            draw(&mut content, item, &map, fonts, &mut used_glyphs);
        }
        pdf.stream(*content_id, &content.finish());
    }

    for ((_, base), id) in HELVETICA.iter().zip(&helvetica_ids) {
        pdf.type1_font(*id)
            .base_font(Name(*base))
            .encoding_predefined(Name(b"WinAnsiEncoding"));
    }

    if let (Some(font), Some(ids)) = (fonts.truetype(), embedded_ids) {
        write_embedded_font(&mut pdf, font, ids, &used_glyphs);
    }

    pdf.finish()
}

fn draw(
    content: &mut Content,
    item: &Item,
    map: &Mapper,
    fonts: &FontSet,
    used: &mut BTreeMap<u16, (f32, char)>,
) {
    match item {
        Item::Text {
            x,
            y,
            size,
            bold,
            italic,
            color,
            text,
        } => {
            if text.is_empty() {
                return;
            }
            let size_pt = size * map.scale;
            fill(content, *color);
            content.begin_text();
            match fonts.truetype() {
                Some(font) => {
                    let mut encoded = Vec::with_capacity(text.len() * 2);
                    for c in text.chars() {
                        let (gid, adv) = font.glyph(c);
                        used.entry(gid).or_insert(((adv * 1000.0).round(), c));
                        encoded.extend_from_slice(&gid.to_be_bytes());
                    }
                    content.set_font(Name(EMBEDDED), size_pt);
                    content.next_line(map.x(*x), map.y(*y));
                    content.show(Str(&encoded));
                }
                None => {
                    let (name, _) = HELVETICA[helvetica_slot(*bold, *italic)];
                    content.set_font(Name(name), size_pt);
                    content.next_line(map.x(*x), map.y(*y));
                    content.show(Str(&encode_winansi(text)));
                }
            }
            content.end_text();
        }
        Item::Line {
            x1,
            y1,
            x2,
            y2,
            width,
            color,
            dashed,
        } => {
            content.save_state();
            stroke(content, *color);
            content.set_line_width(width * map.scale);
            if *dashed {
                content.set_dash_pattern([3.0, 2.0], 0.0);
            }
            content.move_to(map.x(*x1), map.y(*y1));
            content.line_to(map.x(*x2), map.y(*y2));
            content.stroke();
            content.restore_state();
        }
        Item::Rect {
            x,
            y,
            w,
            h,
            fill: fill_color,
            stroke: stroke_color,
            dashed,
        } => {
            content.save_state();
            // PDF rectangles grow upwards from the lower-left corner.
            let rect = (map.x(*x), map.y(y + h), w * map.scale, h * map.scale);
            if let Some(c) = fill_color {
                fill(content, *c);
                content.rect(rect.0, rect.1, rect.2, rect.3);
                content.fill_nonzero();
            }
            if let Some(c) = stroke_color {
                stroke(content, *c);
                content.set_line_width(0.75);
                if *dashed {
                    content.set_dash_pattern([3.0, 2.0], 0.0);
                }
                content.rect(rect.0, rect.1, rect.2, rect.3);
                content.stroke();
            }
            content.restore_state();
        }
    }
}

fn identity_info() -> SystemInfo<'static> {
    SystemInfo {
        registry: Str(b"Adobe"),
        ordering: Str(b"Identity"),
        supplement: 0,
    }
}

fn write_embedded_font(
    pdf: &mut Pdf,
    font: &TrueTypeFont,
    (type0_id, cid_id, descriptor_id, file_id, cmap_id): (Ref, Ref, Ref, Ref, Ref),
    used: &BTreeMap<u16, (f32, char)>,
) {
    let base = font.base_name.as_bytes();
    pdf.type0_font(type0_id)
        .base_font(Name(base))
        .encoding_predefined(Name(b"Identity-H"))
        .descendant_font(cid_id)
        .to_unicode(cmap_id);

    let mut cid = pdf.cid_font(cid_id);
    cid.subtype(CidFontType::Type2);
    cid.base_font(Name(base));
    cid.system_info(identity_info());
    cid.font_descriptor(descriptor_id);
    cid.cid_to_gid_map_predefined(Name(b"Identity"));
    {
        let mut widths = cid.widths();
        for (gid, (width, _)) in used {
            widths.consecutive(*gid, [*width]);
        }
    }
    cid.finish();

    pdf.font_descriptor(descriptor_id)
        .name(Name(base))
        .flags(FontFlags::NON_SYMBOLIC)
        .bbox(Rect::new(font.bbox[0], font.bbox[1], font.bbox[2], font.bbox[3]))
        .italic_angle(0.0)
        .ascent(font.ascent)
        .descent(font.descent)
        .cap_height(font.cap_height)
        .stem_v(80.0)
        .font_file2(file_id);

    pdf.stream(file_id, font.data())
        .pair(Name(b"Length1"), font.data().len() as i32);

    let mut cmap = UnicodeCmap::new(Name(b"Examdesk-UTF16"), identity_info());
    for (gid, (_, c)) in used {
        cmap.pair(*gid, *c);
    }
    pdf.cmap(cmap_id, &cmap.finish());
}
