//! Access to the parts of an OPC package: raw part data, relationships,
//! and content types.

use doc_extract_core::{Error, Result};
use quick_xml::events::attributes::Attribute;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::collections::HashMap;
use std::io::{Read, Seek};
use zip::result::ZipError;
use zip::ZipArchive;

const CONTENT_TYPES_PATH: &str = "[Content_Types].xml";

/// An opened PPTX package.
pub(crate) struct Package<R> {
    archive: ZipArchive<R>,
    content_types: ContentTypes,
    max_part_bytes: u64,
}

impl<R: Read + Seek> Package<R> {
    /// Open the ZIP container and load its content type map. No part may
    /// decompress to more than `max_part_bytes`.
    pub fn open(reader: R, max_part_bytes: u64) -> Result<Self> {
        let mut archive = ZipArchive::new(reader)
            .map_err(|e| Error::ZipError(format!("Failed to open ZIP: {}", e)))?;

        let bytes = read_part(&mut archive, CONTENT_TYPES_PATH, max_part_bytes)?;
        let xml = String::from_utf8_lossy(&bytes).into_owned();
        let content_types = ContentTypes::parse(&xml)?;

        Ok(Self {
            archive,
            content_types,
            max_part_bytes,
        })
    }

    /// Read a part as text.
    pub fn read_xml(&mut self, path: &str) -> Result<String> {
        let bytes = self.read_bytes(path)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Read a part's raw bytes.
    pub fn read_bytes(&mut self, path: &str) -> Result<Vec<u8>> {
        read_part(&mut self.archive, path, self.max_part_bytes)
    }

    /// Load the relationships declared by `part_path`.
    pub fn relationships(&mut self, part_path: &str) -> Result<Relationships> {
        let xml = self.read_xml(&rels_path_for(part_path))?;
        Relationships::parse(&xml, parent_dir(part_path))
    }

    /// Declared content type of a part, if the package lists one.
    pub fn content_type(&self, path: &str) -> Option<&str> {
        self.content_types.lookup(path)
    }
}

/// Read one entry. Both the size declared in its header and the bytes
/// actually decompressed must stay within `limit`.
fn read_part<R: Read + Seek>(archive: &mut ZipArchive<R>, path: &str, limit: u64) -> Result<Vec<u8>> {
    let mut file = archive.by_name(path).map_err(|e| match e {
        ZipError::FileNotFound => Error::MissingPart(path.to_string()),
        other => Error::ZipError(format!("Failed to open '{}': {}", path, other)),
    })?;

    if file.size() > limit {
        return Err(Error::ZipError(format!(
            "'{}' declares {} bytes, over the {} byte limit",
            path,
            file.size(),
            limit
        )));
    }

    let mut content = Vec::new();
    file.by_ref()
        .take(limit + 1)
        .read_to_end(&mut content)
        .map_err(|e| Error::ZipError(format!("Failed to read '{}': {}", path, e)))?;

    if content.len() as u64 > limit {
        return Err(Error::ZipError(format!(
            "'{}' expands past the {} byte limit",
            path, limit
        )));
    }

    Ok(content)
}

/// A single `<Relationship>` entry.
#[derive(Debug, Clone, Default)]
pub(crate) struct Relationship {
    pub id: String,
    pub rel_type: String,
    pub target: String,
    pub external: bool,
}

impl Relationship {
    /// Whether this relationship points at a slide part.
    pub fn is_slide(&self) -> bool {
        self.rel_type.ends_with("/slide")
    }
}

/// Relationships of one part, with targets resolved against that part's directory.
#[derive(Debug, Default)]
pub(crate) struct Relationships {
    base_dir: String,
    entries: Vec<Relationship>,
}

impl Relationships {
    /// Parse a `.rels` document. `base_dir` is the directory of the source part.
    pub fn parse(xml: &str, base_dir: &str) -> Result<Self> {
        let mut entries = Vec::new();
        let mut reader = Reader::from_str(xml);
        reader.trim_text(true);

        loop {
            match reader.read_event() {
                Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                    if local_name(e.name().as_ref()) == b"Relationship" =>
                {
                    let mut rel = Relationship::default();

                    for attr in e.attributes().flatten() {
                        match attr.key.as_ref() {
                            b"Id" => rel.id = attr_value(&attr),
                            b"Type" => rel.rel_type = attr_value(&attr),
                            b"Target" => rel.target = attr_value(&attr),
                            b"TargetMode" => rel.external = attr_value(&attr) == "External",
                            _ => {}
                        }
                    }

                    entries.push(rel);
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(Error::XmlError(format!(
                        "Error parsing relationships: {}",
                        e
                    )));
                }
                _ => {}
            }
        }

        Ok(Self {
            base_dir: base_dir.to_string(),
            entries,
        })
    }

    pub fn get(&self, id: &str) -> Option<&Relationship> {
        self.entries.iter().find(|r| r.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Relationship> {
        self.entries.iter()
    }

    /// Package path of an internal relationship's target.
    pub fn resolve(&self, rel: &Relationship) -> String {
        resolve_target(&self.base_dir, &rel.target)
    }
}

/// The `[Content_Types].xml` map.
#[derive(Debug, Default)]
struct ContentTypes {
    defaults: HashMap<String, String>,
    overrides: HashMap<String, String>,
}

impl ContentTypes {
    fn parse(xml: &str) -> Result<Self> {
        let mut types = Self::default();
        let mut reader = Reader::from_str(xml);
        reader.trim_text(true);

        loop {
            match reader.read_event() {
                Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e)) => {
                    let name = e.name();
                    let kind = local_name(name.as_ref());
                    if kind != b"Default" && kind != b"Override" {
                        continue;
                    }

                    let mut key = String::new();
                    let mut content_type = String::new();
                    for attr in e.attributes().flatten() {
                        match attr.key.as_ref() {
                            b"Extension" | b"PartName" => key = attr_value(&attr),
                            b"ContentType" => content_type = attr_value(&attr),
                            _ => {}
                        }
                    }

                    // Part names and extensions compare case-insensitively.
                    if kind == b"Default" {
                        types.defaults.insert(key.to_lowercase(), content_type);
                    } else {
                        let part = key.trim_start_matches('/').to_lowercase();
                        types.overrides.insert(part, content_type);
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(Error::XmlError(format!(
                        "Error parsing content types: {}",
                        e
                    )));
                }
                _ => {}
            }
        }

        Ok(types)
    }

    fn lookup(&self, path: &str) -> Option<&str> {
        let path = path.trim_start_matches('/').to_lowercase();
        if let Some(ct) = self.overrides.get(&path) {
            return Some(ct);
        }

        let ext = path.rsplit_once('.').map(|(_, ext)| ext)?;
        self.defaults.get(ext).map(String::as_str)
    }
}

/// Extract the local name from a potentially namespaced XML name.
pub(crate) fn local_name(name: &[u8]) -> &[u8] {
    if let Some(pos) = name.iter().position(|&b| b == b':') {
        &name[pos + 1..]
    } else {
        name
    }
}

/// Attribute value with XML entities resolved.
pub(crate) fn attr_value(attr: &Attribute) -> String {
    attr.unescape_value()
        .map(|v| v.into_owned())
        .unwrap_or_else(|_| String::from_utf8_lossy(&attr.value).into_owned())
}

/// `ppt/slides/slide1.xml` -> `ppt/slides/_rels/slide1.xml.rels`
fn rels_path_for(part_path: &str) -> String {
    match part_path.rsplit_once('/') {
        Some((dir, file)) => format!("{}/_rels/{}.rels", dir, file),
        None => format!("_rels/{}.rels", part_path),
    }
}

fn parent_dir(part_path: &str) -> &str {
    part_path.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("")
}

/// Resolve a relationship target against the source part's directory,
/// collapsing `.` and `..` segments.
fn resolve_target(base_dir: &str, target: &str) -> String {
    let joined = if let Some(absolute) = target.strip_prefix('/') {
        absolute.to_string()
    } else if base_dir.is_empty() {
        target.to_string()
    } else {
        format!("{}/{}", base_dir, target)
    };

    let mut segments: Vec<&str> = Vec::new();
    for segment in joined.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }
    segments.join("/")
}
