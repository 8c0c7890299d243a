//! Shape-level extraction: turns individual DrawingML elements into the
//! serialisable model.

use super::PptxError;
use super::assets::AssetSink;
use super::model::*;
use super::package::{PptxPackage, Relationships, file_name, resolve_target};
use super::xml::XmlElement;
use tracing::warn;

/// EMU per pixel at 96 dpi.
const EMU_PER_PIXEL: f64 = 9525.0;
/// DrawingML angles are stored in 60000ths of a degree.
const ANGLE_UNITS: f64 = 60000.0;

pub const R_EMBED: &str = "r:embed";
pub const R_ID: &str = "r:id";

/// The part being parsed, with what is needed to resolve and export its
/// related media.
pub struct PartContext<'a> {
    pub package: &'a mut PptxPackage,
    pub part: &'a str,
    pub rels: &'a Relationships,
    pub slide_index: usize,
    pub sink: &'a mut dyn AssetSink,
}

impl PartContext<'_> {
    /// Read the part a relationship id points at, returning its file name and
    /// bytes. Unresolvable references are `None`; inflate limits are errors.
    fn read_related(&mut self, r_id: &str) -> Result<Option<(String, Vec<u8>)>, PptxError> {
        let Some(target) = self.rels.target(r_id) else {
            warn!("Relationship {} of {} has no target", r_id, self.part);
            return Ok(None);
        };
        let path = resolve_target(self.part, target);
        let name = file_name(&path);
        if name.is_empty() || name == ".." {
            return Ok(None);
        }
        match self.package.read_part(&path) {
            Ok(data) => Ok(Some((name.to_string(), data))),
            Err(e) if e.is_limit() => Err(e),
            Err(e) => {
                warn!("Related part {} of {} unavailable: {}", path, self.part, e);
                Ok(None)
            }
        }
    }

    fn export(&mut self, name: &str, data: &[u8]) -> Result<(), PptxError> {
        self.sink.store(name, data)
    }
}

/// Placeholder type of a shape (`title`, `sldNum`, ...), if it is one.
pub fn placeholder_type(shape: &XmlElement) -> Option<&str> {
    shape.find_path("p:nvSpPr/p:nvPr/p:ph").and_then(|ph| ph.attr("type"))
}

pub fn extract_position(element: &XmlElement) -> Position {
    let xfrm = element
        .find("a:xfrm")
        .or_else(|| element.find("p:xfrm"));
    let Some(xfrm) = xfrm else {
        return Position::default();
    };

    let mut position = Position::default();
    if let Some(off) = xfrm.child("a:off") {
        position.x = off.attr_i64("x");
        position.y = off.attr_i64("y");
    }
    if let Some(ext) = xfrm.child("a:ext") {
        position.width = ext.attr_i64("cx");
        position.height = ext.attr_i64("cy");
    }
    position
}

fn is_on(value: Option<&str>) -> bool {
    matches!(value, Some("1") | Some("true"))
}

/// Color of the `solidFill` directly under `element`, preferring a scheme
/// reference over a literal RGB when both are present.
fn solid_fill_color(element: &XmlElement) -> Option<String> {
    let fill = element.child("a:solidFill")?;
    let scheme = fill.child("a:schemeClr").and_then(|c| c.attr("val"));
    let rgb = fill.child("a:srgbClr").and_then(|c| c.attr("val"));
    scheme.or(rgb).map(str::to_string)
}

pub fn extract_text_attributes(element: &XmlElement) -> TextAttributes {
    let mut attrs = TextAttributes::default();
    let Some(rpr) = element.find("a:rPr") else {
        return attrs;
    };

    if let Some(sz) = rpr.attr("sz").and_then(|v| v.parse::<f64>().ok()) {
        attrs.size = sz / 100.0;
    }
    attrs.bold = is_on(rpr.attr("b"));
    attrs.italic = is_on(rpr.attr("i"));
    attrs.underline = rpr.attr("u").is_some_and(|u| u != "none");
    if let Some(font) = rpr.child("a:latin").and_then(|l| l.attr("typeface")) {
        attrs.font = font.to_string();
    }
    if let Some(color) = solid_fill_color(rpr) {
        attrs.color = color;
    }
    attrs
}

/// Text runs of a paragraph: plain runs and fields such as slide numbers.
const RUN_TAGS: &[&str] = &["a:r", "a:fld"];

/// One entry per non-empty paragraph. A paragraph takes the attributes of its
/// last run that carries text.
pub fn group_text_content(paragraphs: &[&XmlElement]) -> Vec<Paragraph> {
    let mut content = Vec::new();
    for p in paragraphs {
        let mut text = String::new();
        let mut attributes = None;
        for run in p
            .child_elements()
            .filter(|c| RUN_TAGS.contains(&c.name.as_str()))
        {
            let Some(t) = run.child("a:t") else {
                continue;
            };
            let run_text = t.text();
            if run_text.is_empty() {
                continue;
            }
            text.push_str(&run_text);
            attributes = Some(extract_text_attributes(run));
        }
        if !text.is_empty() {
            content.push(Paragraph {
                text,
                attributes: attributes.unwrap_or_else(|| extract_text_attributes(p)),
            });
        }
    }
    content
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TextFlags {
    pub is_header: bool,
    pub is_background: bool,
    pub is_page_number: bool,
}

/// A shape with visible text, or `None` when it carries none.
pub fn extract_text_shape(shape: &XmlElement, z_order: i64, flags: TextFlags) -> Option<TextElement> {
    let tx_body = shape.find("p:txBody")?;
    let content = group_text_content(&tx_body.find_all("a:p"));
    if content.is_empty() {
        return None;
    }

    let shape_background = shape.child("p:spPr").and_then(solid_fill_color);

    Some(TextElement {
        content,
        position: extract_position(shape),
        shape_background,
        z_order,
        is_header: flags.is_header,
        is_background: flags.is_background,
        is_page_number: flags.is_page_number,
    })
}

pub fn extract_shape_style(shape: &XmlElement) -> ShapeStyle {
    let mut style = ShapeStyle::default();
    let sp_pr = shape.child("p:spPr");

    style.fill_color = sp_pr.and_then(solid_fill_color);

    if let Some(ln) = sp_pr.and_then(|p| p.child("a:ln")) {
        style.border_color = solid_fill_color(ln);
        style.border_width = Some(match (&style.border_color, ln.attr("w")) {
            (Some(_), Some(w)) => w.parse::<f64>().unwrap_or(0.0) / EMU_PER_PIXEL,
            _ => 0.0,
        });
    }

    if let Some(xfrm) = sp_pr.and_then(|p| p.child("a:xfrm")) {
        style.rotation = Some(xfrm.attr_i64("rot") as f64 / ANGLE_UNITS);
    }
    style
}

/// A preset-geometry shape; custom geometry is not described.
pub fn extract_shape(shape: &XmlElement, z_order: i64) -> Option<ShapeElement> {
    let geom = shape.find("a:prstGeom")?;
    Some(ShapeElement {
        shape_type: geom.attr("prst").unwrap_or("unknown").to_string(),
        position: extract_position(shape),
        style: extract_shape_style(shape),
        z_order,
    })
}

pub fn extract_image(
    pic: &XmlElement,
    z_order: i64,
    ctx: &mut PartContext<'_>,
) -> Result<Option<ImageElement>, PptxError> {
    let Some(r_id) = pic.find("a:blip").and_then(|b| b.attr(R_EMBED)) else {
        return Ok(None);
    };
    let Some((name, data)) = ctx.read_related(r_id)? else {
        return Ok(None);
    };

    let file = format!("image_slide_{}_{}", ctx.slide_index, name);
    ctx.export(&file, &data)?;
    Ok(Some(ImageElement {
        file,
        position: extract_position(pic),
        z_order,
    }))
}

pub fn extract_table(frame: &XmlElement, z_order: i64) -> Option<TableElement> {
    let table = frame.find("a:tbl")?;
    let rows = table
        .find_all("a:tr")
        .into_iter()
        .map(|tr| {
            tr.child_elements()
                .filter(|c| c.name == "a:tc")
                .map(|tc| TableCell {
                    content: tc.find_all("a:t").iter().map(|t| t.text()).collect(),
                    attributes: extract_text_attributes(tc),
                })
                .collect()
        })
        .collect();

    Some(TableElement {
        position: extract_position(frame),
        rows,
        z_order,
    })
}

pub fn extract_chart(
    frame: &XmlElement,
    z_order: i64,
    ctx: &mut PartContext<'_>,
) -> Result<Option<ChartElement>, PptxError> {
    let Some(r_id) = frame.find("c:chart").and_then(|c| c.attr(R_ID)) else {
        return Ok(None);
    };
    let Some((name, data)) = ctx.read_related(r_id)? else {
        return Ok(None);
    };

    let chart_file = format!("chart_slide_{}_{}", ctx.slide_index, name);
    ctx.export(&chart_file, &data)?;
    Ok(Some(ChartElement {
        chart_file,
        position: extract_position(frame),
        z_order,
    }))
}

pub fn extract_background(
    slide: &XmlElement,
    ctx: &mut PartContext<'_>,
) -> Result<Background, PptxError> {
    let Some(bg_pr) = slide.find("p:bg").and_then(|bg| bg.find("p:bgPr")) else {
        return Ok(Background::default());
    };

    if let Some(value) = solid_fill_color(bg_pr) {
        return Ok(Background::Color { value });
    }

    if let Some(r_id) = bg_pr
        .find_path("a:blipFill/a:blip")
        .and_then(|b| b.attr(R_EMBED))
    {
        if let Some((name, data)) = ctx.read_related(r_id)? {
            let ext = name.rsplit_once('.').map(|(_, e)| e).unwrap_or("bin");
            let file = format!("background_slide_{}.{}", ctx.slide_index, ext);
            ctx.export(&file, &data)?;
            return Ok(Background::Image { file });
        }
    }

    Ok(Background::default())
}
