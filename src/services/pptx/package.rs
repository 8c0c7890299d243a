use super::PptxError;
use super::xml::XmlElement;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::io::{Cursor, Read};
use zip::ZipArchive;

pub const PRESENTATION_PART: &str = "ppt/presentation.xml";
pub const PRESENTATION_RELS_PART: &str = "ppt/_rels/presentation.xml.rels";

/// Default cap on the inflated size of a single part.
pub const DEFAULT_MAX_PART_SIZE: u64 = 64 * 1024 * 1024;
/// Default cap on the inflated size of everything read from one package.
pub const DEFAULT_MAX_INFLATED_SIZE: u64 = 256 * 1024 * 1024;

/// How far a package may inflate while it is read. Zip headers declare sizes
/// the archive chooses for itself, so both caps are enforced on the bytes
/// actually decompressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InflateLimits {
    pub max_part_size: u64,
    pub max_total_size: u64,
}

impl Default for InflateLimits {
    fn default() -> Self {
        Self {
            max_part_size: DEFAULT_MAX_PART_SIZE,
            max_total_size: DEFAULT_MAX_INFLATED_SIZE,
        }
    }
}

/// An opened OOXML package held in memory.
pub struct PptxPackage {
    archive: ZipArchive<Cursor<Vec<u8>>>,
    limits: InflateLimits,
    inflated: u64,
}

impl PptxPackage {
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, PptxError> {
        Self::with_limits(bytes, InflateLimits::default())
    }

    pub fn with_limits(bytes: Vec<u8>, limits: InflateLimits) -> Result<Self, PptxError> {
        let archive = ZipArchive::new(Cursor::new(bytes))?;
        Ok(Self {
            archive,
            limits,
            inflated: 0,
        })
    }

    /// Bytes decompressed so far.
    pub fn inflated(&self) -> u64 {
        self.inflated
    }

    pub fn has_part(&self, path: &str) -> bool {
        self.archive.file_names().any(|n| n == path)
    }

    pub fn read_part(&mut self, path: &str) -> Result<Vec<u8>, PptxError> {
        let limits = self.limits;
        let remaining = limits.max_total_size.saturating_sub(self.inflated);

        let file = match self.archive.by_name(path) {
            Ok(file) => file,
            Err(zip::result::ZipError::FileNotFound) => {
                return Err(PptxError::MissingPart(path.to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        let declared = file.size();
        if declared > limits.max_part_size {
            return Err(PptxError::PartTooLarge {
                part: path.to_string(),
                limit: limits.max_part_size,
            });
        }
        if declared > remaining {
            return Err(PptxError::PackageTooLarge {
                limit: limits.max_total_size,
            });
        }

        let cap = limits.max_part_size.min(remaining);
        let mut data = Vec::with_capacity(declared as usize);
        file.take(cap + 1).read_to_end(&mut data)?;

        let read = data.len() as u64;
        if read > limits.max_part_size {
            return Err(PptxError::PartTooLarge {
                part: path.to_string(),
                limit: limits.max_part_size,
            });
        }
        if read > remaining {
            return Err(PptxError::PackageTooLarge {
                limit: limits.max_total_size,
            });
        }
        self.inflated += read;
        Ok(data)
    }

    /// Read and parse an XML part. Missing or malformed parts yield `None`
    /// after a warning, so one broken part does not sink the whole deck.
    /// Exceeding the inflate limits is an error.
    pub fn load_xml(&mut self, path: &str) -> Result<Option<XmlElement>, PptxError> {
        let data = match self.read_part(path) {
            Ok(data) => data,
            Err(e) if e.is_limit() => return Err(e),
            Err(PptxError::MissingPart(_)) => {
                tracing::warn!("{} not found, skipping", path);
                return Ok(None);
            }
            Err(e) => {
                tracing::warn!("Error reading {}: {}", path, e);
                return Ok(None);
            }
        };
        match XmlElement::parse(&data) {
            Ok(root) => Ok(Some(root)),
            Err(e) => {
                tracing::warn!("Error loading {}: {}", path, e);
                Ok(None)
            }
        }
    }

    /// Files directly inside `dir` with the given suffix, in natural order
    /// (`slide2.xml` before `slide10.xml`).
    pub fn list_parts(&self, dir: &str, suffix: &str) -> Vec<String> {
        let prefix = format!("{}/", dir.trim_end_matches('/'));
        let mut names: Vec<String> = self
            .archive
            .file_names()
            .filter(|n| {
                n.strip_prefix(&prefix)
                    .is_some_and(|rest| !rest.contains('/') && rest.ends_with(suffix))
            })
            .map(str::to_string)
            .collect();
        names.sort_by(|a, b| natural_cmp(a, b));
        names
    }

    /// Relationship id -> target for a `.rels` part. Empty when the part is absent.
    pub fn relationships(&mut self, rels_path: &str) -> Result<Relationships, PptxError> {
        if !self.has_part(rels_path) {
            return Ok(Relationships::default());
        }
        Ok(self
            .load_xml(rels_path)?
            .map(|root| Relationships::from_element(&root))
            .unwrap_or_default())
    }
}

#[derive(Debug, Clone, Default)]
pub struct Relationships {
    targets: HashMap<String, String>,
}

impl Relationships {
    pub fn from_element(root: &XmlElement) -> Self {
        let targets = root
            .child_elements()
            .filter(|e| e.local_name() == "Relationship")
            .filter_map(|e| Some((e.attr("Id")?.to_string(), e.attr("Target")?.to_string())))
            .collect();
        Self { targets }
    }

    pub fn target(&self, id: &str) -> Option<&str> {
        self.targets.get(id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

/// Path of the `.rels` part belonging to `part` (`ppt/slides/slide1.xml` ->
/// `ppt/slides/_rels/slide1.xml.rels`).
pub fn rels_path_for(part: &str) -> String {
    match part.rsplit_once('/') {
        Some((dir, file)) => format!("{}/_rels/{}.rels", dir, file),
        None => format!("_rels/{}.rels", part),
    }
}

/// Resolve a relationship target relative to the directory of `source_part`.
pub fn resolve_target(source_part: &str, target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return absolute.to_string();
    }
    let mut segments: Vec<&str> = match source_part.rsplit_once('/') {
        Some((dir, _)) => dir.split('/').collect(),
        None => Vec::new(),
    };
    for segment in target.split('/') {
        match segment {
            ".." => {
                segments.pop();
            }
            "." | "" => {}
            other => segments.push(other),
        }
    }
    segments.join("/")
}

pub fn file_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

fn natural_cmp(a: &str, b: &str) -> Ordering {
    let (mut ai, mut bi) = (a.chars().peekable(), b.chars().peekable());
    loop {
        match (ai.peek().copied(), bi.peek().copied()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) if x.is_ascii_digit() && y.is_ascii_digit() => {
                let na = take_number(&mut ai);
                let nb = take_number(&mut bi);
                match na.cmp(&nb) {
                    Ordering::Equal => continue,
                    other => return other,
                }
            }
            (Some(x), Some(y)) => {
                ai.next();
                bi.next();
                match x.cmp(&y) {
                    Ordering::Equal => continue,
                    other => return other,
                }
            }
        }
    }
}

fn take_number(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> u64 {
    let mut n: u64 = 0;
    while let Some(c) = chars.peek().copied() {
        match c.to_digit(10) {
            Some(d) => {
                n = n.saturating_mul(10).saturating_add(d as u64);
                chars.next();
            }
            None => break,
        }
    }
    n
}
