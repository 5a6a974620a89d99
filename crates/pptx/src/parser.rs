//! PPTX slide text and picture extraction.

use crate::package::{attr_value, local_name, Package, Relationships};
use doc_extract_core::{encode_data_uri, mime_type_for_path, Error, Result, SlideContent, SlideDeck};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::io::{Cursor, Read, Seek};

const PRESENTATION_PATH: &str = "ppt/presentation.xml";

/// Default cap on the decompressed size of any single package part.
pub const DEFAULT_MAX_PART_BYTES: u64 = 256 * 1024 * 1024;

/// Parser for PPTX (Office Open XML) files.
pub struct PptxParser {
    max_part_bytes: u64,
}

impl PptxParser {
    /// Create a new PPTX parser.
    pub fn new() -> Self {
        Self {
            max_part_bytes: DEFAULT_MAX_PART_BYTES,
        }
    }

    /// Sets the largest decompressed size accepted for one part.
    pub fn with_max_part_bytes(mut self, max: u64) -> Self {
        self.max_part_bytes = max;
        self
    }

    /// Parse a PPTX file from a reader.
    pub fn parse<R: Read + Seek>(&self, reader: R) -> Result<SlideDeck> {
        let mut package = Package::open(reader, self.max_part_bytes)?;
        let slide_order = self.get_slide_order(&mut package)?;
        log::debug!("Presentation lists {} slides", slide_order.len());

        let mut deck = SlideDeck::new();
        for slide_path in &slide_order {
            let slide = self.parse_slide(&mut package, slide_path)?;
            deck.add_slide(slide);
        }

        Ok(deck)
    }

    /// Parse a PPTX file held in memory.
    pub fn parse_bytes(&self, bytes: &[u8]) -> Result<SlideDeck> {
        self.parse(Cursor::new(bytes))
    }

    /// Get the ordered list of slide part paths.
    ///
    /// The order comes from `p:sldIdLst`. Presentations without one fall
    /// back to the slide relationships sorted by number.
    fn get_slide_order<R: Read + Seek>(&self, package: &mut Package<R>) -> Result<Vec<String>> {
        let xml = package.read_xml(PRESENTATION_PATH)?;
        let rels = package.relationships(PRESENTATION_PATH)?;

        let Some(slide_ids) = slide_id_list(&xml)? else {
            log::debug!("No sldIdLst in presentation, ordering slides by relationship");
            return Ok(slides_by_relationship(&rels));
        };

        slide_ids
            .iter()
            .map(|rid| {
                rels.get(rid)
                    .filter(|rel| rel.is_slide() && !rel.external)
                    .map(|rel| rels.resolve(rel))
                    .ok_or_else(|| {
                        Error::PptxParseError(format!("Slide relationship '{}' not found", rid))
                    })
            })
            .collect()
    }

    /// Parse a single slide from the package.
    fn parse_slide<R: Read + Seek>(
        &self,
        package: &mut Package<R>,
        slide_path: &str,
    ) -> Result<SlideContent> {
        let content = package.read_xml(slide_path)?;
        let shapes = extract_shapes_from_xml(&content)?;

        let has_pictures = shapes.iter().any(|s| matches!(s, Shape::Picture { .. }));
        let rels = if has_pictures {
            match package.relationships(slide_path) {
                Ok(rels) => Some(rels),
                Err(e) => {
                    log::debug!("No relationships for {}: {}", slide_path, e);
                    None
                }
            }
        } else {
            None
        };

        let mut frames = Vec::new();
        let mut images = Vec::new();
        for shape in shapes {
            match shape {
                Shape::Text(text) => frames.push(text),
                Shape::Picture { embed } => {
                    match self.load_picture(package, rels.as_ref(), embed.as_deref()) {
                        Ok(uri) => images.push(uri),
                        Err(e) => log::debug!("Skipping picture on {}: {}", slide_path, e),
                    }
                }
            }
        }

        Ok(SlideContent::from_text_frames(frames, images))
    }

    /// Resolve a picture's embedded image and encode it as a data URI.
    fn load_picture<R: Read + Seek>(
        &self,
        package: &mut Package<R>,
        rels: Option<&Relationships>,
        embed: Option<&str>,
    ) -> Result<String> {
        let embed = embed
            .ok_or_else(|| Error::PptxParseError("Picture has no embedded image".to_string()))?;
        let rels = rels.ok_or_else(|| Error::MissingPart("slide relationships".to_string()))?;
        let rel = rels
            .get(embed)
            .ok_or_else(|| Error::PptxParseError(format!("Image relationship '{}' not found", embed)))?;
        if rel.external {
            return Err(Error::PptxParseError(format!(
                "Image '{}' is linked, not embedded",
                rel.target
            )));
        }

        let path = rels.resolve(rel);
        let bytes = package.read_bytes(&path)?;
        let mime_type = package
            .content_type(&path)
            .map(str::to_string)
            .unwrap_or_else(|| mime_type_for_path(&path));

        Ok(encode_data_uri(&mime_type, &bytes))
    }
}

impl Default for PptxParser {
    fn default() -> Self {
        Self::new()
    }
}

/// A top-level slide shape that contributes to the output.
#[derive(Debug, PartialEq)]
enum Shape {
    /// A shape with a text frame, carrying its paragraphs joined by newlines.
    Text(String),
    /// A picture, carrying the relationship id of its embedded image.
    Picture { embed: Option<String> },
}

/// In-progress state for the shape currently being read.
#[derive(Debug)]
enum ShapeBuilder {
    Text {
        text: String,
        paragraphs: usize,
        in_text_body: bool,
        in_run_text: bool,
    },
    Picture {
        embed: Option<String>,
    },
}

impl ShapeBuilder {
    fn text() -> Self {
        Self::Text {
            text: String::new(),
            paragraphs: 0,
            in_text_body: false,
            in_run_text: false,
        }
    }

    /// Handle a start (or empty) element nested inside the shape.
    ///
    /// A line break (`a:br`) inside a paragraph is written as `'\n'`, the
    /// same as a paragraph boundary, rather than a vertical tab.
    fn start(&mut self, e: &BytesStart, empty: bool) {
        let name = e.name();
        match self {
            Self::Text {
                text,
                paragraphs,
                in_text_body,
                in_run_text,
            } => match local_name(name.as_ref()) {
                b"txBody" if !empty => *in_text_body = true,
                b"p" if *in_text_body => {
                    if *paragraphs > 0 {
                        text.push('\n');
                    }
                    *paragraphs += 1;
                }
                b"t" if *in_text_body && !empty => *in_run_text = true,
                b"br" if *in_text_body => text.push('\n'),
                _ => {}
            },
            Self::Picture { embed } => {
                if local_name(name.as_ref()) == b"blip" {
                    for attr in e.attributes().flatten() {
                        if attr.key.prefix().is_some() && local_name(attr.key.as_ref()) == b"embed" {
                            *embed = Some(attr_value(&attr));
                        }
                    }
                }
            }
        }
    }

    fn end(&mut self, local: &[u8]) {
        if let Self::Text {
            in_text_body,
            in_run_text,
            ..
        } = self
        {
            match local {
                b"txBody" => *in_text_body = false,
                b"t" => *in_run_text = false,
                _ => {}
            }
        }
    }

    fn text_content(&mut self, content: &str) {
        if let Self::Text {
            text,
            in_run_text: true,
            ..
        } = self
        {
            text.push_str(content);
        }
    }

    fn finish(self) -> Shape {
        match self {
            Self::Text { text, .. } => Shape::Text(text),
            Self::Picture { embed } => Shape::Picture { embed },
        }
    }
}

/// Extract the direct children of the slide's shape tree that carry text
/// or pictures, in document order. Shapes nested in groups are not walked.
fn extract_shapes_from_xml(xml_content: &str) -> Result<Vec<Shape>> {
    let mut shapes = Vec::new();
    let mut reader = Reader::from_str(xml_content);

    // Number of currently open elements, and the depth at which the shape
    // tree's children start.
    let mut depth = 0usize;
    let mut tree_level: Option<usize> = None;
    let mut current: Option<ShapeBuilder> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                let name = e.name();
                let local = local_name(name.as_ref());

                if tree_level == Some(depth) {
                    current = match local {
                        b"sp" => Some(ShapeBuilder::text()),
                        b"pic" => Some(ShapeBuilder::Picture { embed: None }),
                        _ => None,
                    };
                } else if let Some(ref mut shape) = current {
                    shape.start(e, false);
                } else if local == b"spTree" && tree_level.is_none() {
                    tree_level = Some(depth + 1);
                }

                depth += 1;
            }
            Ok(Event::Empty(ref e)) => {
                let name = e.name();
                let local = local_name(name.as_ref());

                if tree_level == Some(depth) {
                    match local {
                        b"sp" => shapes.push(Shape::Text(String::new())),
                        b"pic" => shapes.push(Shape::Picture { embed: None }),
                        _ => {}
                    }
                } else if let Some(ref mut shape) = current {
                    shape.start(e, true);
                }
            }
            Ok(Event::Text(ref e)) => {
                if let Some(ref mut shape) = current {
                    let text = e.unescape().unwrap_or_default();
                    shape.text_content(&text);
                }
            }
            Ok(Event::End(ref e)) => {
                depth = depth.saturating_sub(1);
                let name = e.name();

                if tree_level == Some(depth) {
                    if let Some(shape) = current.take() {
                        shapes.push(shape.finish());
                    }
                } else if let Some(ref mut shape) = current {
                    shape.end(local_name(name.as_ref()));
                } else if tree_level == Some(depth + 1) && local_name(name.as_ref()) == b"spTree" {
                    break;
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::XmlError(format!(
                    "Error parsing slide at position {}: {}",
                    reader.buffer_position(),
                    e
                )));
            }
            _ => {}
        }
    }

    Ok(shapes)
}

/// Parse `p:sldIdLst`, returning the relationship id of each slide in order.
/// Returns `None` when the presentation has no slide list at all.
fn slide_id_list(xml: &str) -> Result<Option<Vec<String>>> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut ids: Option<Vec<String>> = None;
    let mut in_list = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) if local_name(e.name().as_ref()) == b"sldIdLst" => {
                in_list = true;
                ids.get_or_insert_with(Vec::new);
            }
            Ok(Event::Empty(ref e)) if local_name(e.name().as_ref()) == b"sldIdLst" => {
                ids.get_or_insert_with(Vec::new);
            }
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                if in_list && local_name(e.name().as_ref()) == b"sldId" =>
            {
                // The relationship id is the namespaced `r:id`, not the numeric `id`.
                let rid = e
                    .attributes()
                    .flatten()
                    .find(|attr| attr.key.prefix().is_some() && local_name(attr.key.as_ref()) == b"id")
                    .map(|attr| attr_value(&attr));

                if let (Some(rid), Some(list)) = (rid, ids.as_mut()) {
                    list.push(rid);
                }
            }
            Ok(Event::End(ref e)) if local_name(e.name().as_ref()) == b"sldIdLst" => {
                in_list = false;
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::XmlError(format!(
                    "Error parsing presentation: {}",
                    e
                )));
            }
            _ => {}
        }
    }

    Ok(ids)
}

/// Slide parts referenced from the presentation, sorted by slide number.
fn slides_by_relationship(rels: &Relationships) -> Vec<String> {
    let mut slides: Vec<(String, Option<usize>)> = rels
        .iter()
        .filter(|rel| rel.is_slide() && !rel.external)
        .map(|rel| {
            let order_num = extract_slide_number(&rel.target).or_else(|| extract_slide_number(&rel.id));
            (rels.resolve(rel), order_num)
        })
        .collect();

    slides.sort_by(|a, b| match (a.1, b.1) {
        (Some(na), Some(nb)) => na.cmp(&nb),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => a.0.cmp(&b.0),
    });

    slides.into_iter().map(|(path, _)| path).collect()
}

/// Extract a slide number from a string like "rId2" or "slide3.xml".
fn extract_slide_number(s: &str) -> Option<usize> {
    let s = s.trim_end_matches(".xml").trim_end_matches(".rels");

    let digits: String = s.chars().rev().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    let digits: String = digits.chars().rev().collect();
    digits.parse().ok()
}
