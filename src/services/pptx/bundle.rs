use super::PptxError;
use super::package::{PRESENTATION_PART, PptxPackage, file_name};
use super::presentation::{LAYOUTS_DIR, MASTERS_DIR, SLIDES_DIR, THEMES_DIR, slide_entries};
use super::xml::XmlElement;
use quick_xml::events::{BytesDecl, Event};
use quick_xml::writer::Writer;
use serde::Serialize;
use tracing::info;

/// Number of parts of each kind written into a bundle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BundleSummary {
    pub slides: usize,
    pub layouts: usize,
    pub masters: usize,
    pub themes: usize,
}

/// Wrap every part under `dir` in a `<tag file="...">` element inside a
/// `<group>` element. Returns `None` when the directory holds no parts.
fn wrap_dir(
    package: &mut PptxPackage,
    dir: &str,
    suffix: &str,
    group: &str,
    tag: &str,
) -> Result<Option<(XmlElement, usize)>, PptxError> {
    let parts = package.list_parts(dir, suffix);
    if parts.is_empty() {
        return Ok(None);
    }
    let mut wrapper = XmlElement::new(group);
    let mut count = 0;
    for part in &parts {
        if let Some(root) = package.load_xml(part)? {
            let mut item = XmlElement::new(tag).with_attr("file", file_name(part));
            item.push(root);
            wrapper.push(item);
            count += 1;
        }
    }
    Ok(Some((wrapper, count)))
}

/// Build the combined `<pptx>` document holding the presentation, masters,
/// themes, layouts, slides and slide relationships of a package.
pub fn build_bundle(package: &mut PptxPackage) -> Result<(XmlElement, BundleSummary), PptxError> {
    let mut root = XmlElement::new("pptx");
    let mut summary = BundleSummary::default();

    if let Some(pres) = package.load_xml(PRESENTATION_PART)? {
        let mut presentation = XmlElement::new("presentation");
        presentation.push(pres);
        root.push(presentation);
    }

    if let Some((masters, count)) =
        wrap_dir(package, MASTERS_DIR, ".xml", "slideMasters", "slideMaster")?
    {
        summary.masters = count;
        root.push(masters);
    }
    if let Some((themes, count)) = wrap_dir(package, THEMES_DIR, ".xml", "themes", "theme")? {
        summary.themes = count;
        root.push(themes);
    }
    if let Some((layouts, count)) =
        wrap_dir(package, LAYOUTS_DIR, ".xml", "slideLayouts", "slideLayout")?
    {
        summary.layouts = count;
        root.push(layouts);
    }

    let entries = slide_entries(package)?;
    if !entries.is_empty() {
        let mut slides = XmlElement::new("slides");
        for entry in &entries {
            let Some(slide_xml) = package.load_xml(&entry.part)? else {
                continue;
            };
            let mut slide = XmlElement::new("slide").with_attr("file", file_name(&entry.part));
            if let Some(r_id) = &entry.r_id {
                slide.set_attr("rId", r_id.as_str());
                let sld_id = entry
                    .sld_id
                    .clone()
                    .unwrap_or_else(|| format!("unknown_{}", r_id));
                slide.set_attr("sldId", sld_id);
            }
            slide.push(slide_xml);
            slides.push(slide);
            summary.slides += 1;
        }
        root.push(slides);
    }

    let rels_dir = format!("{}/_rels", SLIDES_DIR);
    if let Some((rels, _)) = wrap_dir(package, &rels_dir, ".rels", "relationships", "relationship")?
    {
        root.push(rels);
    }

    Ok((root, summary))
}

/// Serialize the combined document with an XML declaration and indentation.
pub fn write_bundle(package: &mut PptxPackage) -> Result<(Vec<u8>, BundleSummary), PptxError> {
    let (root, summary) = build_bundle(package)?;

    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    root.write_to(&mut writer)?;

    info!(
        "Components included: Slides={}, Layouts={}, Masters={}, Themes={}",
        summary.slides, summary.layouts, summary.masters, summary.themes
    );
    Ok((writer.into_inner(), summary))
}
