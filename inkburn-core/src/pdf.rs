//! lopdf glue: everything that touches the document object graph
//!
//! Burning only appends. Existing content streams, resources and annotations
//! are kept; new streams and objects are added next to them.

use std::path::Path;

use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};
use tracing::{debug, warn};

use crate::error::{BurnError, Result};
use crate::geometry::{Point, Rectangle};
use crate::render::{PageRotation, FONT_RESOURCE_NAME};

/// Guard against cyclic `/Parent` chains
const MAX_TREE_DEPTH: usize = 64;

/// A loaded document being burned
#[derive(Debug)]
pub struct PdfSurface {
    doc: Document,
    font_id: Option<ObjectId>,
    compress: bool,
}

impl PdfSurface {
    /// Loads `path`, rejecting encrypted documents
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        Self::load_mem(&bytes)
    }

    pub fn load_mem(bytes: &[u8]) -> Result<Self> {
        let doc = Document::load_mem(bytes)?;
        Self::from_document(doc)
    }

    pub fn from_document(doc: Document) -> Result<Self> {
        if doc.trailer.has(b"Encrypt") {
            return Err(BurnError::EncryptedUnsupported);
        }
        if doc.get_pages().is_empty() {
            return Err(BurnError::InvalidPageTree(
                "document has no pages".to_string(),
            ));
        }
        Ok(Self {
            doc,
            font_id: None,
            compress: cfg!(feature = "compression"),
        })
    }

    /// Disables Flate compression of burned streams
    pub fn without_compression(mut self) -> Self {
        self.compress = false;
        self
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn page_count(&self) -> u32 {
        self.doc.get_pages().len() as u32
    }

    /// Object id of the 1-indexed page `number`
    pub fn page_id(&self, number: u32) -> Option<ObjectId> {
        self.doc.get_pages().get(&number).copied()
    }

    fn resolve<'a>(&'a self, object: &'a Object) -> &'a Object {
        match object {
            Object::Reference(id) => self.doc.get_object(*id).unwrap_or(object),
            other => other,
        }
    }

    /// Looks up `key` on the page or, for inheritable attributes, on its
    /// ancestors in the page tree.
    fn inherited(&self, page_id: ObjectId, key: &[u8]) -> Option<&Object> {
        let mut current = self.doc.get_dictionary(page_id).ok()?;
        for _ in 0..MAX_TREE_DEPTH {
            if let Ok(value) = current.get(key) {
                return Some(self.resolve(value));
            }
            let parent = current.get(b"Parent").ok()?.as_reference().ok()?;
            current = self.doc.get_dictionary(parent).ok()?;
        }
        None
    }

    fn number(&self, object: &Object) -> Option<f64> {
        match self.resolve(object) {
            Object::Integer(i) => Some(*i as f64),
            Object::Real(r) => Some(*r as f64),
            _ => None,
        }
    }

    fn rectangle(&self, object: &Object) -> Option<Rectangle> {
        let values = object.as_array().ok()?;
        if values.len() != 4 {
            return None;
        }
        let v: Vec<f64> = values.iter().filter_map(|o| self.number(o)).collect();
        if v.len() != 4 {
            return None;
        }
        Some(Rectangle::from_corners(
            Point::new(v[0], v[1]),
            Point::new(v[2], v[3]),
        ))
    }

    /// The visible page box: `/CropBox` when present, else `/MediaBox`.
    ///
    /// A page without either falls back to US Letter.
    pub fn page_box(&self, page_id: ObjectId, page_number: u32) -> Result<Rectangle> {
        let rect = [b"CropBox".as_slice(), b"MediaBox".as_slice()]
            .iter()
            .find_map(|key| self.inherited(page_id, key).and_then(|o| self.rectangle(o)));

        let rect = match rect {
            Some(rect) => rect,
            None => {
                warn!("Page {} has no usable page box, assuming US Letter", page_number);
                Rectangle::new(Point::new(0.0, 0.0), Point::new(612.0, 792.0))
            }
        };

        let (w, h) = (rect.width(), rect.height());
        if !(w.is_finite() && h.is_finite() && w > 0.0 && h > 0.0) {
            return Err(BurnError::InvalidPageBox {
                page: page_number,
                reason: format!("degenerate size {w}x{h}"),
            });
        }
        Ok(rect)
    }

    /// The page's inheritable `/Rotate`. Values that are not a multiple of
    /// 90 are ignored.
    pub fn page_rotation(&self, page_id: ObjectId, page_number: u32) -> PageRotation {
        let Some(degrees) = self
            .inherited(page_id, b"Rotate")
            .and_then(|o| self.number(o))
        else {
            return PageRotation::None;
        };
        match PageRotation::from_degrees(degrees as i64).filter(|_| degrees.fract() == 0.0) {
            Some(rotation) => rotation,
            None => {
                warn!("Page {} has invalid /Rotate {}, ignoring it", page_number, degrees);
                PageRotation::None
            }
        }
    }

    fn page_dict_mut(&mut self, page_id: ObjectId) -> Result<&mut Dictionary> {
        Ok(self.doc.get_object_mut(page_id)?.as_dict_mut()?)
    }

    /// Existing content stream references of a page, flattened
    fn content_refs(&self, page_id: ObjectId) -> Result<Vec<Object>> {
        let page = self.doc.get_dictionary(page_id)?;
        let refs = match page.get(b"Contents") {
            Ok(Object::Reference(id)) => match self.doc.get_object(*id)? {
                Object::Array(items) => items.clone(),
                _ => vec![Object::Reference(*id)],
            },
            Ok(Object::Array(items)) => items.clone(),
            _ => Vec::new(),
        };
        Ok(refs)
    }

    fn add_stream(&mut self, content: Vec<u8>, compress: bool) -> Result<ObjectId> {
        #[cfg(feature = "compression")]
        if compress {
            let encoded = crate::compression::compress(&content)?;
            let stream = Stream::new(dictionary! { "Filter" => "FlateDecode" }, encoded);
            return Ok(self.doc.add_object(stream));
        }
        #[cfg(not(feature = "compression"))]
        let _ = compress;

        Ok(self.doc.add_object(Stream::new(Dictionary::new(), content)))
    }

    /// Appends `content` after the page's existing content. The existing
    /// content is bracketed by `q`/`Q` so graphics state it leaves behind
    /// does not affect the appended marks.
    pub fn append_content(&mut self, page_id: ObjectId, content: Vec<u8>) -> Result<()> {
        let existing = self.content_refs(page_id)?;

        let mut contents = Vec::with_capacity(existing.len() + 2);
        let burned = if existing.is_empty() {
            content
        } else {
            let open = self.add_stream(b"q\n".to_vec(), false)?;
            contents.push(Object::Reference(open));
            contents.extend(existing);
            let mut prefixed = b"Q\n".to_vec();
            prefixed.extend(content);
            prefixed
        };
        let compress = self.compress;
        let burned_id = self.add_stream(burned, compress)?;
        contents.push(Object::Reference(burned_id));

        self.page_dict_mut(page_id)?
            .set("Contents", Object::Array(contents));
        Ok(())
    }

    fn font_object(&mut self) -> ObjectId {
        if let Some(id) = self.font_id {
            return id;
        }
        let id = self.doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });
        self.font_id = Some(id);
        id
    }

    /// Makes [`FONT_RESOURCE_NAME`] resolve to Helvetica on this page.
    ///
    /// The effective resources (own or inherited) are copied onto the page so
    /// sibling pages sharing a resource dictionary are left untouched.
    pub fn ensure_font_resource(&mut self, page_id: ObjectId) -> Result<()> {
        let mut resources = match self.inherited(page_id, b"Resources") {
            Some(Object::Dictionary(dict)) => dict.clone(),
            _ => Dictionary::new(),
        };
        let mut fonts = match resources.get(b"Font").map(|o| self.resolve(o)) {
            Ok(Object::Dictionary(dict)) => dict.clone(),
            _ => Dictionary::new(),
        };

        if fonts.has(FONT_RESOURCE_NAME.as_bytes()) {
            return Ok(());
        }

        let font_id = self.font_object();
        fonts.set(FONT_RESOURCE_NAME, Object::Reference(font_id));
        resources.set("Font", Object::Dictionary(fonts));
        self.page_dict_mut(page_id)?
            .set("Resources", Object::Dictionary(resources));
        debug!("Registered /{} on page object {:?}", FONT_RESOURCE_NAME, page_id);
        Ok(())
    }

    /// Adds `annotation` as a new object and appends it to the page's
    /// `/Annots` array.
    pub fn add_annotation(&mut self, page_id: ObjectId, annotation: Dictionary) -> Result<ObjectId> {
        let annot_id = self.doc.add_object(annotation);

        let annots_ref = match self.doc.get_dictionary(page_id)?.get(b"Annots") {
            Ok(Object::Reference(id)) => Some(*id),
            _ => None,
        };
        if let Some(array_id) = annots_ref {
            if let Object::Array(items) = self.doc.get_object_mut(array_id)? {
                items.push(Object::Reference(annot_id));
                return Ok(annot_id);
            }
        }

        let page = self.page_dict_mut(page_id)?;
        if let Ok(Object::Array(items)) = page.get_mut(b"Annots") {
            items.push(Object::Reference(annot_id));
        } else {
            page.set("Annots", Object::Array(vec![Object::Reference(annot_id)]));
        }
        Ok(annot_id)
    }

    pub fn save<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let mut file = std::fs::File::create(path)?;
        self.doc.save_to(&mut file)?;
        Ok(())
    }

    pub fn save_to_vec(&mut self) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        self.doc.save_to(&mut buffer)?;
        Ok(buffer)
    }
}
