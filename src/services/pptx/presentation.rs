use super::PptxError;
use super::assets::AssetSink;
use super::extract::*;
use super::model::*;
use super::package::{
    PRESENTATION_PART, PRESENTATION_RELS_PART, PptxPackage, rels_path_for, resolve_target,
};
use super::xml::XmlElement;
use tracing::{debug, info, warn};

pub const SLIDES_DIR: &str = "ppt/slides";
pub const MASTERS_DIR: &str = "ppt/slideMasters";
pub const LAYOUTS_DIR: &str = "ppt/slideLayouts";
pub const THEMES_DIR: &str = "ppt/theme";

/// Master placeholders treated as decoration repeated on every slide.
const MASTER_BACKGROUND_TYPES: &[&str] = &["title", "sldNum", "ftr", "hdr"];
const MASTER_HEADER_TYPES: &[&str] = &["title", "hdr"];
/// Slide placeholders left to the master.
const SLIDE_SKIPPED_TYPES: &[&str] = &["sldNum", "ftr", "hdr"];
const SLIDE_HEADER_TYPES: &[&str] = &["title", "ctrTitle"];

const DRAWABLES: &[&str] = &["p:sp", "p:pic", "p:graphicFrame"];

/// A slide part in presentation order, with its ids from `presentation.xml`.
#[derive(Debug, Clone, PartialEq)]
pub struct SlideEntry {
    pub part: String,
    pub r_id: Option<String>,
    pub sld_id: Option<String>,
}

/// Slides in the order `presentation.xml` lists them. Falls back to the
/// natural order of the slide parts when that list cannot be resolved.
pub fn slide_entries(package: &mut PptxPackage) -> Result<Vec<SlideEntry>, PptxError> {
    let mut entries = Vec::new();

    if let Some(pres) = package.load_xml(PRESENTATION_PART)? {
        let rels = package.relationships(PRESENTATION_RELS_PART)?;
        for sld in pres.find_all_path("p:sldIdLst/p:sldId") {
            let Some(r_id) = sld.attr(R_ID) else {
                continue;
            };
            let Some(target) = rels.target(r_id) else {
                warn!("Slide relationship {} has no target", r_id);
                continue;
            };
            let part = resolve_target(PRESENTATION_PART, target);
            if package.has_part(&part) {
                entries.push(SlideEntry {
                    part,
                    r_id: Some(r_id.to_string()),
                    sld_id: sld.attr("id").map(str::to_string),
                });
            }
        }
    } else {
        warn!("No presentation.xml found");
    }

    if entries.is_empty() {
        entries = package
            .list_parts(SLIDES_DIR, ".xml")
            .into_iter()
            .map(|part| SlideEntry {
                part,
                r_id: None,
                sld_id: None,
            })
            .collect();
    }
    Ok(entries)
}

/// Parse a `.pptx` file with the default inflate limits, exporting
/// referenced media into `sink`.
pub fn parse_presentation(
    bytes: Vec<u8>,
    sink: &mut dyn AssetSink,
) -> Result<Presentation, PptxError> {
    parse_package(PptxPackage::from_bytes(bytes)?, sink)
}

pub fn parse_package(
    mut package: PptxPackage,
    sink: &mut dyn AssetSink,
) -> Result<Presentation, PptxError> {
    if !package.has_part(PRESENTATION_PART) && package.list_parts(SLIDES_DIR, ".xml").is_empty() {
        return Err(PptxError::NotAPresentation);
    }

    let entries = slide_entries(&mut package)?;
    debug!(
        "Slide order: {:?}",
        entries.iter().map(|e| e.part.as_str()).collect::<Vec<_>>()
    );

    let background_elements = match package.list_parts(MASTERS_DIR, ".xml").first() {
        Some(part) => package
            .load_xml(part)?
            .map(|master| parse_master(&master))
            .unwrap_or_default(),
        None => Vec::new(),
    };
    info!("Background elements parsed: {}", background_elements.len());

    let mut slides = Vec::with_capacity(entries.len());
    for (index, entry) in entries.iter().enumerate() {
        let Some(slide) = package.load_xml(&entry.part)? else {
            continue;
        };
        let rels_part = rels_path_for(&entry.part);
        let rels = package.relationships(&rels_part)?;
        if rels.is_empty() {
            debug!("No relationships found for {}", rels_part);
        }

        let mut ctx = PartContext {
            package: &mut package,
            part: &entry.part,
            rels: &rels,
            slide_index: index,
            sink: &mut *sink,
        };
        slides.push(parse_slide(&slide, &mut ctx, &background_elements)?);
    }
    info!("Total slides parsed: {}", slides.len());

    let mut layouts = Vec::new();
    for part in package.list_parts(LAYOUTS_DIR, ".xml") {
        if let Some(layout) = package.load_xml(&part)? {
            layouts.push(parse_layout(&layout));
        }
    }

    let theme = match package.list_parts(THEMES_DIR, ".xml").first() {
        Some(part) => package
            .load_xml(part)?
            .map(|theme| parse_theme(&theme))
            .unwrap_or_default(),
        None => Theme::default(),
    };
    debug!("Inflated {} bytes", package.inflated());

    Ok(Presentation {
        slides,
        template: Template { layouts, theme },
    })
}

/// Drawable elements of a part with their drawing order.
fn drawables(root: &XmlElement) -> Vec<(i64, &XmlElement)> {
    root.descendants()
        .into_iter()
        .filter(|e| DRAWABLES.contains(&e.name.as_str()))
        .enumerate()
        .map(|(i, e)| (i as i64, e))
        .collect()
}

fn has_type(kind: Option<&str>, set: &[&str]) -> bool {
    kind.is_some_and(|k| set.contains(&k))
}

pub fn parse_master(master: &XmlElement) -> Vec<Element> {
    let mut elements = Vec::new();
    for (z_order, sp) in drawables(master) {
        if sp.name != "p:sp" {
            continue;
        }
        let kind = placeholder_type(sp);
        let flags = TextFlags {
            is_header: has_type(kind, MASTER_HEADER_TYPES),
            is_background: has_type(kind, MASTER_BACKGROUND_TYPES),
            is_page_number: kind == Some("sldNum"),
        };
        if let Some(text) = extract_text_shape(sp, z_order, flags) {
            elements.push(Element::Text(text));
        } else if let Some(shape) = extract_shape(sp, z_order) {
            elements.push(Element::Shape(shape));
        }
    }
    elements
}

pub fn parse_slide(
    slide: &XmlElement,
    ctx: &mut PartContext<'_>,
    background_elements: &[Element],
) -> Result<Slide, PptxError> {
    let background = extract_background(slide, ctx)?;
    let mut elements = Vec::new();

    for (z_order, element) in drawables(slide) {
        match element.name.as_str() {
            "p:sp" => {
                let kind = placeholder_type(element);
                if has_type(kind, SLIDE_SKIPPED_TYPES) {
                    continue;
                }
                let flags = TextFlags {
                    is_header: has_type(kind, SLIDE_HEADER_TYPES),
                    ..Default::default()
                };
                if let Some(text) = extract_text_shape(element, z_order, flags) {
                    elements.push(Element::Text(text));
                } else if let Some(shape) = extract_shape(element, z_order) {
                    elements.push(Element::Shape(shape));
                }
            }
            "p:pic" => {
                if let Some(image) = extract_image(element, z_order, ctx)? {
                    elements.push(Element::Image(image));
                }
            }
            "p:graphicFrame" => {
                if let Some(table) = extract_table(element, z_order) {
                    elements.push(Element::Table(table));
                }
                if let Some(chart) = extract_chart(element, z_order, ctx)? {
                    elements.push(Element::Chart(chart));
                }
            }
            _ => {}
        }
    }

    elements.sort_by_key(|e| (e.z_order(), e.position().y));

    Ok(Slide {
        background,
        background_elements: background_elements.to_vec(),
        elements,
    })
}

pub fn parse_layout(layout: &XmlElement) -> Layout {
    let name = layout
        .find("p:cSld")
        .and_then(|c| c.attr("name"))
        .unwrap_or("unknown")
        .to_string();

    let placeholders = layout
        .find_all("p:sp")
        .into_iter()
        .filter_map(|sp| {
            let ph = sp.find_path("p:nvSpPr/p:nvPr/p:ph")?;
            Some(Placeholder {
                kind: ph.attr("type").unwrap_or("body").to_string(),
                position: extract_position(sp),
            })
        })
        .collect();

    Layout { name, placeholders }
}

pub fn parse_theme(theme: &XmlElement) -> Theme {
    let mut out = Theme::default();
    let Some(scheme) = theme.find("a:clrScheme") else {
        return out;
    };
    for color in scheme.child_elements() {
        let value = color
            .child("a:srgbClr")
            .and_then(|c| c.attr("val"))
            .or_else(|| color.child("a:sysClr").and_then(|c| c.attr("lastClr")));
        if let Some(value) = value {
            out.colors
                .insert(color.local_name().to_string(), value.to_string());
        }
    }
    out
}
