//! lopdf-backed document access

use lopdf::{Dictionary, Object, ObjectId};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt::{self, Write as _};
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use tracing::debug;

use super::{Annotation, Destination, DocumentAccess, OutlineNode, PageGeometry};
use crate::error::{AccessError, DocumentOpenError};

const MIN_FILE_SIZE: u64 = 100;
const MAX_FILE_SIZE: u64 = 500_000_000; // 500MB
const EOF_SEARCH_WINDOW: u64 = 1024;

const MAX_REFERENCE_CHAIN: usize = 8;
const MAX_OUTLINE_DEPTH: usize = 64;
const MAX_INHERITANCE_DEPTH: usize = 32;
const MAX_CANONICAL_DEPTH: usize = 16;

/// Keys pointing back up the object graph; left out of canonical forms.
const BACK_POINTER_KEYS: [&[u8]; 3] = [b"P", b"Parent", b"Popup"];

/// A PDF file opened for structural reads.
///
/// The parsed document is released when the value is dropped.
pub struct PdfDocument {
    path: PathBuf,
    inner: lopdf::Document,
    page_ids: Vec<ObjectId>,
    page_numbers: HashMap<ObjectId, u32>,
}

impl fmt::Debug for PdfDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PdfDocument")
            .field("path", &self.path)
            .field("page_count", &self.page_ids.len())
            .finish_non_exhaustive()
    }
}

/// Cheap checks before handing the file to the parser:
/// `%PDF-` header, size bounds and a `%%EOF` marker near the end.
fn quick_validate(path: &Path) -> Result<(), DocumentOpenError> {
    let io_err = |source| DocumentOpenError::Io {
        path: path.to_path_buf(),
        source,
    };
    let not_pdf = |reason: String| DocumentOpenError::NotPdf {
        path: path.to_path_buf(),
        reason,
    };

    let mut file = File::open(path).map_err(io_err)?;
    let file_size = file.metadata().map_err(io_err)?.len();

    if file_size < MIN_FILE_SIZE {
        return Err(not_pdf(format!("file too small: {} bytes", file_size)));
    }
    if file_size > MAX_FILE_SIZE {
        return Err(not_pdf(format!("file too large: {} bytes", file_size)));
    }

    let mut header = [0u8; 5];
    file.read_exact(&mut header).map_err(io_err)?;
    if &header != b"%PDF-" {
        return Err(not_pdf("missing %PDF- header".into()));
    }

    let tail_size = file_size.min(EOF_SEARCH_WINDOW);
    file.seek(SeekFrom::End(-(tail_size as i64)))
        .map_err(io_err)?;
    let mut tail = vec![0u8; tail_size as usize];
    file.read_exact(&mut tail).map_err(io_err)?;
    if !tail.windows(5).any(|w| w == b"%%EOF") {
        return Err(not_pdf("missing %%EOF marker".into()));
    }

    Ok(())
}

impl PdfDocument {
    /// Open and parse a PDF file.
    ///
    /// Parser panics are caught and reported as [`DocumentOpenError::Panicked`].
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DocumentOpenError> {
        let path = path.as_ref();
        quick_validate(path)?;

        let loaded = panic::catch_unwind(AssertUnwindSafe(|| lopdf::Document::load(path)));
        let inner = match loaded {
            Ok(Ok(doc)) => doc,
            Ok(Err(e)) => {
                return Err(DocumentOpenError::Parse {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })
            }
            Err(_panic) => {
                return Err(DocumentOpenError::Panicked {
                    path: path.to_path_buf(),
                })
            }
        };

        let page_ids: Vec<ObjectId> = inner.get_pages().into_values().collect();
        let page_numbers = page_ids
            .iter()
            .enumerate()
            .map(|(idx, id)| (*id, idx as u32 + 1))
            .collect();

        debug!(path = %path.display(), pages = page_ids.len(), "opened document");

        Ok(Self {
            path: path.to_path_buf(),
            inner,
            page_ids,
            page_numbers,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn page_id(&self, page: u32) -> Result<ObjectId, AccessError> {
        let count = self.page_count();
        if page == 0 || page > count {
            return Err(AccessError::PageOutOfRange { page, count });
        }
        Ok(self.page_ids[(page - 1) as usize])
    }

    fn page_dict(&self, page: u32) -> Result<&Dictionary, AccessError> {
        Ok(self.inner.get_object(self.page_id(page)?)?.as_dict()?)
    }

    /// Follow indirect references until a direct object is reached.
    fn resolve<'a>(&'a self, object: &'a Object) -> Result<&'a Object, AccessError> {
        let mut current = object;
        for _ in 0..MAX_REFERENCE_CHAIN {
            match current {
                Object::Reference(id) => current = self.inner.get_object(*id)?,
                direct => return Ok(direct),
            }
        }
        Err(AccessError::Structure("reference chain too long".into()))
    }

    fn catalog(&self) -> Result<&Dictionary, AccessError> {
        let root = self.inner.trailer.get(b"Root")?;
        Ok(self.resolve(root)?.as_dict()?)
    }

    fn text_value(&self, object: &Object) -> Option<String> {
        match self.resolve(object).ok()? {
            Object::String(bytes, _) => Some(decode_text_string(bytes)),
            Object::Name(name) => Some(String::from_utf8_lossy(name).into_owned()),
            Object::Integer(i) => Some(i.to_string()),
            Object::Real(r) => Some(r.to_string()),
            Object::Boolean(b) => Some(b.to_string()),
            _ => None,
        }
    }

    fn name_value(&self, object: &Object) -> Option<String> {
        match self.resolve(object).ok()? {
            Object::Name(name) => Some(String::from_utf8_lossy(name).into_owned()),
            _ => None,
        }
    }

    fn rectangle(&self, object: &Object) -> Option<[f64; 4]> {
        let Object::Array(items) = self.resolve(object).ok()? else {
            return None;
        };
        if items.len() != 4 {
            return None;
        }
        let mut rect = [0.0; 4];
        for (slot, item) in rect.iter_mut().zip(items) {
            *slot = self.number(item)?;
        }
        Some(rect)
    }

    fn number(&self, object: &Object) -> Option<f64> {
        match self.resolve(object).ok()? {
            Object::Integer(i) => Some(*i as f64),
            Object::Real(r) => Some(f64::from(*r)),
            _ => None,
        }
    }

    fn destination(&self, object: &Object) -> Option<Destination> {
        match self.resolve(object).ok()? {
            Object::Array(items) => match items.first()? {
                Object::Reference(id) => self.page_numbers.get(id).map(|n| Destination::Page(*n)),
                _ => None,
            },
            Object::String(bytes, _) => Some(Destination::Named(decode_text_string(bytes))),
            Object::Name(name) => Some(Destination::Named(
                String::from_utf8_lossy(name).into_owned(),
            )),
            // Named destination values may be wrapped as << /D [...] >>
            Object::Dictionary(dict) => dict.get(b"D").ok().and_then(|d| self.destination(d)),
            _ => None,
        }
    }

    /// Action type and target of an outline item or annotation.
    /// An `/A` action takes precedence over a bare `/Dest`.
    fn action_target(&self, dict: &Dictionary) -> (Option<String>, Option<Destination>) {
        let action = dict
            .get(b"A")
            .ok()
            .and_then(|a| self.resolve(a).ok())
            .and_then(|a| a.as_dict().ok());

        let Some(action) = action else {
            let target = dict.get(b"Dest").ok().and_then(|d| self.destination(d));
            return (None, target);
        };

        let action_type = action.get(b"S").ok().and_then(|s| self.name_value(s));
        let target = match action_type.as_deref() {
            Some("URI") => action
                .get(b"URI")
                .ok()
                .and_then(|u| self.text_value(u))
                .map(Destination::Uri),
            Some("GoTo") => action.get(b"D").ok().and_then(|d| self.destination(d)),
            _ => None,
        };
        (action_type, target)
    }

    fn outline_entries(
        &self,
        first: Option<ObjectId>,
        depth: usize,
        visited: &mut HashSet<ObjectId>,
    ) -> Vec<OutlineNode> {
        let mut entries = Vec::new();
        if depth >= MAX_OUTLINE_DEPTH {
            return entries;
        }

        let mut current = first;
        while let Some(id) = current {
            // Circular /Next chains
            if !visited.insert(id) {
                break;
            }
            let Some(item) = self.inner.get_object(id).ok().and_then(|o| o.as_dict().ok()) else {
                break;
            };

            let title = item
                .get(b"Title")
                .ok()
                .and_then(|t| self.text_value(t))
                .unwrap_or_default();
            let (_, target) = self.action_target(item);
            let children = self.outline_entries(reference(item, b"First"), depth + 1, visited);

            entries.push(OutlineNode {
                title,
                target,
                children,
            });
            current = reference(item, b"Next");
        }
        entries
    }

    fn annotation(&self, entry: &Object) -> Result<Annotation, AccessError> {
        let canonical = self.canonical(entry);
        let Ok(dict) = self.resolve(entry)?.as_dict() else {
            return Ok(Annotation::with_canonical(None, None, None, None, canonical));
        };

        let subtype = dict.get(b"Subtype").ok().and_then(|s| self.name_value(s));
        let (action_type, target) = self.action_target(dict);
        let bounding_box = dict.get(b"Rect").ok().and_then(|r| self.rectangle(r));

        Ok(Annotation::with_canonical(
            subtype,
            action_type,
            target,
            bounding_box,
            canonical,
        ))
    }

    /// Structural serialization independent of object numbering: keys sorted,
    /// references resolved, page references rendered as `page:N`.
    fn canonical(&self, object: &Object) -> String {
        let mut out = String::new();
        let mut stack = Vec::new();
        self.write_canonical(object, 0, &mut stack, &mut out);
        out
    }

    fn write_canonical(
        &self,
        object: &Object,
        depth: usize,
        stack: &mut Vec<ObjectId>,
        out: &mut String,
    ) {
        match object {
            Object::Null => out.push_str("null"),
            Object::Boolean(b) => {
                let _ = write!(out, "{}", b);
            }
            Object::Integer(i) => {
                let _ = write!(out, "{}", i);
            }
            Object::Real(r) => {
                let _ = write!(out, "{}", r);
            }
            Object::Name(name) => {
                out.push('/');
                out.push_str(&String::from_utf8_lossy(name));
            }
            Object::String(bytes, _) => {
                out.push('(');
                out.push_str(&decode_text_string(bytes));
                out.push(')');
            }
            Object::Array(items) => {
                out.push('[');
                for (idx, item) in items.iter().enumerate() {
                    if idx > 0 {
                        out.push(' ');
                    }
                    self.write_canonical(item, depth + 1, stack, out);
                }
                out.push(']');
            }
            Object::Dictionary(dict) => self.write_dictionary(dict, depth, stack, out),
            Object::Stream(stream) => {
                let _ = write!(out, "stream[{}]", stream.content.len());
                self.write_dictionary(&stream.dict, depth, stack, out);
            }
            Object::Reference(id) => {
                if let Some(page) = self.page_numbers.get(id) {
                    let _ = write!(out, "page:{}", page);
                } else if depth >= MAX_CANONICAL_DEPTH || stack.contains(id) {
                    let _ = write!(out, "{} {} R", id.0, id.1);
                } else {
                    match self.inner.get_object(*id) {
                        Ok(target) => {
                            stack.push(*id);
                            self.write_canonical(target, depth + 1, stack, out);
                            stack.pop();
                        }
                        Err(_) => out.push_str("null"),
                    }
                }
            }
        }
    }

    fn write_dictionary(
        &self,
        dict: &Dictionary,
        depth: usize,
        stack: &mut Vec<ObjectId>,
        out: &mut String,
    ) {
        let mut entries: Vec<(&Vec<u8>, &Object)> = dict
            .iter()
            .filter(|(key, _)| !BACK_POINTER_KEYS.iter().any(|skip| *skip == key.as_slice()))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));

        out.push_str("<<");
        for (key, value) in entries {
            out.push_str(" /");
            out.push_str(&String::from_utf8_lossy(key));
            out.push(' ');
            self.write_canonical(value, depth + 1, stack, out);
        }
        out.push_str(" >>");
    }

    /// Look up a page attribute, walking `/Parent` for inherited values.
    fn inherited(&self, page_id: ObjectId, key: &[u8]) -> Result<Option<&Object>, AccessError> {
        let mut node = self.inner.get_object(page_id)?.as_dict()?;
        for _ in 0..MAX_INHERITANCE_DEPTH {
            if let Ok(value) = node.get(key) {
                return Ok(Some(value));
            }
            match node.get(b"Parent") {
                Ok(parent) => node = self.resolve(parent)?.as_dict()?,
                Err(_) => return Ok(None),
            }
        }
        Ok(None)
    }
}

impl DocumentAccess for PdfDocument {
    fn page_count(&self) -> u32 {
        self.page_ids.len() as u32
    }

    fn page_text(&self, page: u32) -> Result<String, AccessError> {
        self.page_id(page)?;
        let extracted =
            panic::catch_unwind(AssertUnwindSafe(|| self.inner.extract_text(&[page])));
        match extracted {
            Ok(Ok(text)) => Ok(text),
            Ok(Err(e)) => Err(AccessError::TextExtraction {
                page,
                message: e.to_string(),
            }),
            Err(_panic) => Err(AccessError::TextExtraction {
                page,
                message: "text extractor panicked".into(),
            }),
        }
    }

    fn metadata(&self) -> Result<BTreeMap<String, String>, AccessError> {
        let mut entries = BTreeMap::new();
        let info = match self.inner.trailer.get(b"Info") {
            Ok(info) => info,
            Err(_) => return Ok(entries),
        };

        let info = self.resolve(info)?.as_dict()?;
        for (key, value) in info.iter() {
            if let Some(text) = self.text_value(value) {
                entries.insert(String::from_utf8_lossy(key).into_owned(), text);
            }
        }
        Ok(entries)
    }

    fn outline_root(&self) -> Result<Option<OutlineNode>, AccessError> {
        let outlines = match self.catalog()?.get(b"Outlines") {
            Ok(outlines) => outlines,
            Err(_) => return Ok(None),
        };
        // An unresolvable or non-dictionary /Outlines counts as no outline
        let outlines = match self.resolve(outlines) {
            Ok(Object::Dictionary(dict)) => dict,
            _ => return Ok(None),
        };

        let mut visited = HashSet::new();
        let children = self.outline_entries(reference(outlines, b"First"), 0, &mut visited);
        Ok(Some(OutlineNode::root(children)))
    }

    fn page_annotations(&self, page: u32) -> Result<Vec<Annotation>, AccessError> {
        let page_dict = self.page_dict(page)?;
        let annots = match page_dict.get(b"Annots") {
            Ok(annots) => self.resolve(annots)?,
            Err(_) => return Ok(Vec::new()),
        };

        match annots {
            Object::Array(entries) => entries.iter().map(|entry| self.annotation(entry)).collect(),
            Object::Null => Ok(Vec::new()),
            _ => Err(AccessError::Structure(format!(
                "/Annots on page {} is not an array",
                page
            ))),
        }
    }

    fn page_geometry(&self, page: u32) -> Result<PageGeometry, AccessError> {
        let page_id = self.page_id(page)?;
        let media_box = self
            .inherited(page_id, b"MediaBox")?
            .ok_or_else(|| AccessError::Structure(format!("page {} has no /MediaBox", page)))?;
        let [x1, y1, x2, y2] = self.rectangle(media_box).ok_or_else(|| {
            AccessError::Structure(format!("page {} has a malformed /MediaBox", page))
        })?;
        Ok(PageGeometry::new((x2 - x1).abs(), (y2 - y1).abs()))
    }
}

fn reference(dict: &Dictionary, key: &[u8]) -> Option<ObjectId> {
    match dict.get(key) {
        Ok(Object::Reference(id)) => Some(*id),
        _ => None,
    }
}

/// Decode a PDF text string: UTF-16BE with BOM, then UTF-8, then Latin-1.
fn decode_text_string(bytes: &[u8]) -> String {
    if let Some(utf16) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units: Vec<u16> = utf16
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }
    let bytes = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(bytes);
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}
