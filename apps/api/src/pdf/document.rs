//! Document-level operations: load, save, page tree walking and concatenation.

use std::path::Path;

use chrono::Utc;
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};

use super::PdfError;

/// Page attributes a page may inherit from its ancestors in the page tree.
const INHERITABLE: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Upper bound on `/Parent` hops, guards against cyclic page trees.
const MAX_TREE_DEPTH: usize = 64;

/// Loads a document from a file on disk.
pub fn load_path(path: &Path) -> Result<Document, PdfError> {
    let bytes = std::fs::read(path).map_err(|e| PdfError::Open {
        origin: path.display().to_string(),
        reason: e.to_string(),
    })?;
    load_bytes(&bytes, &path.display().to_string())
}

/// Loads a document from memory. `origin` only labels error messages.
pub fn load_bytes(bytes: &[u8], origin: &str) -> Result<Document, PdfError> {
    let doc = Document::load_mem(bytes).map_err(|e| PdfError::Open {
        origin: origin.to_string(),
        reason: e.to_string(),
    })?;
    if doc.get_pages().is_empty() {
        return Err(PdfError::Open {
            origin: origin.to_string(),
            reason: "document has no pages".to_string(),
        });
    }
    Ok(doc)
}

/// Page object ids in page order.
pub fn page_ids(doc: &Document) -> Vec<ObjectId> {
    doc.get_pages().into_values().collect()
}

/// Reads a number operand or array element.
pub(crate) fn number(object: &Object) -> Option<f32> {
    match object {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r as f32),
        _ => None,
    }
}

/// Resolves an object that is either inline or an indirect reference.
pub(crate) fn resolve<'a>(doc: &'a Document, object: &'a Object) -> Result<&'a Object, PdfError> {
    match object {
        Object::Reference(id) => Ok(doc.get_object(*id)?),
        other => Ok(other),
    }
}

/// Looks up `key` on the page, walking up `/Parent` links for inheritable attributes.
pub fn inherited_attribute(doc: &Document, page_id: ObjectId, key: &[u8]) -> Option<Object> {
    let mut node = doc.get_dictionary(page_id).ok()?;
    for _ in 0..MAX_TREE_DEPTH {
        if let Ok(value) = node.get(key) {
            return Some(value.clone());
        }
        let parent = node.get(b"Parent").and_then(Object::as_reference).ok()?;
        node = doc.get_dictionary(parent).ok()?;
    }
    None
}

/// The page's media box as `[x0, y0, x1, y1]`, defaulting to A4 when absent.
pub fn media_box(doc: &Document, page_id: ObjectId) -> Result<[f32; 4], PdfError> {
    let Some(object) = inherited_attribute(doc, page_id, b"MediaBox") else {
        return Ok([0.0, 0.0, 595.0, 842.0]);
    };
    let values = resolve(doc, &object)?
        .as_array()?
        .iter()
        .map(|v| resolve(doc, v).ok().and_then(number))
        .collect::<Option<Vec<f32>>>()
        .filter(|v| v.len() == 4)
        .ok_or_else(|| PdfError::Malformed(format!("page {page_id:?} has an invalid MediaBox")))?;
    Ok([
        values[0].min(values[2]),
        values[1].min(values[3]),
        values[0].max(values[2]),
        values[1].max(values[3]),
    ])
}

/// Width and height of the first page.
pub fn first_page_size(doc: &Document) -> Result<(f32, f32), PdfError> {
    let page_id = page_ids(doc)
        .first()
        .copied()
        .ok_or_else(|| PdfError::Malformed("document has no pages".to_string()))?;
    let [x0, y0, x1, y1] = media_box(doc, page_id)?;
    Ok((x1 - x0, y1 - y0))
}

fn page_dict_mut(doc: &mut Document, page_id: ObjectId) -> Result<&mut Dictionary, PdfError> {
    Ok(doc.get_object_mut(page_id)?.as_dict_mut()?)
}

fn owned_dict(doc: &Document, object: &Object) -> Result<Dictionary, PdfError> {
    match resolve(doc, object)? {
        Object::Dictionary(dict) => Ok(dict.clone()),
        _ => Err(PdfError::Malformed("expected a dictionary".to_string())),
    }
}

/// The page's effective `/Resources`, inherited or not, as an owned dictionary.
pub fn page_resources(doc: &Document, page_id: ObjectId) -> Result<Dictionary, PdfError> {
    match inherited_attribute(doc, page_id, b"Resources") {
        Some(object) => owned_dict(doc, &object),
        None => Ok(Dictionary::new()),
    }
}

/// Registers `font_id` in the page's font resources and returns the resource name.
///
/// The page gets its own copy of its resources so shared resource dictionaries
/// are never modified. `prefix` seeds the name; a numeric suffix avoids collisions.
pub fn add_page_font(
    doc: &mut Document,
    page_id: ObjectId,
    prefix: &str,
    font_id: ObjectId,
) -> Result<String, PdfError> {
    let mut resources = page_resources(doc, page_id)?;
    let mut fonts = match resources.get(b"Font") {
        Ok(object) => owned_dict(doc, object)?,
        Err(_) => Dictionary::new(),
    };

    let name = (1..)
        .map(|n| format!("{prefix}{n}"))
        .find(|candidate| {
            fonts
                .get(candidate.as_bytes())
                .map(|existing| existing.as_reference().ok() == Some(font_id))
                .unwrap_or(true)
        })
        .unwrap_or_else(|| prefix.to_string());

    fonts.set(name.as_str(), Object::Reference(font_id));
    resources.set("Font", Object::Dictionary(fonts));
    page_dict_mut(doc, page_id)?.set("Resources", Object::Dictionary(resources));
    Ok(name)
}

/// Appends drawing operations to a page.
///
/// Existing content is wrapped in `q`/`Q` so any graphics state it leaves
/// behind (transforms, colours) cannot leak into the appended operations.
pub fn append_page_content(
    doc: &mut Document,
    page_id: ObjectId,
    operations: Vec<Operation>,
) -> Result<(), PdfError> {
    let mut body = vec![Operation::new("Q", vec![])];
    body.extend(operations);
    // Leading newline keeps the first operator apart from a preceding stream
    // that ends without whitespace.
    let mut encoded = b"\n".to_vec();
    encoded.extend(Content { operations: body }.encode()?);

    let existing = match doc.get_dictionary(page_id)?.get(b"Contents") {
        Ok(Object::Array(items)) => items.clone(),
        Ok(Object::Reference(id)) => match doc.get_object(*id)? {
            Object::Array(items) => items.clone(),
            _ => vec![Object::Reference(*id)],
        },
        _ => Vec::new(),
    };

    let open_id = doc.add_object(Stream::new(Dictionary::new(), b"q\n".to_vec()));
    let body_id = doc.add_object(Stream::new(Dictionary::new(), encoded));

    let mut contents = Vec::with_capacity(existing.len() + 2);
    contents.push(Object::Reference(open_id));
    contents.extend(existing);
    contents.push(Object::Reference(body_id));
    page_dict_mut(doc, page_id)?.set("Contents", Object::Array(contents));
    Ok(())
}

fn pages_root_id(doc: &Document) -> Result<ObjectId, PdfError> {
    let catalog_id = doc.trailer.get(b"Root")?.as_reference()?;
    Ok(doc.get_dictionary(catalog_id)?.get(b"Pages")?.as_reference()?)
}

/// Appends every page of `other` after the last page of `base`.
///
/// Returns the number of pages appended. Inherited attributes are copied onto
/// each moved page before it is re-parented under `base`'s page tree root.
pub fn append_document(base: &mut Document, mut other: Document) -> Result<usize, PdfError> {
    other.renumber_objects_with(base.max_id + 1);
    let moved = page_ids(&other);

    for &page_id in &moved {
        for key in INHERITABLE {
            if other.get_dictionary(page_id)?.has(key) {
                continue;
            }
            if let Some(value) = inherited_attribute(&other, page_id, key) {
                page_dict_mut(&mut other, page_id)?.set(key.to_vec(), value);
            }
        }
    }

    let root_id = pages_root_id(base)?;
    base.max_id = base.max_id.max(other.max_id);
    base.objects.extend(other.objects);

    for &page_id in &moved {
        page_dict_mut(base, page_id)?.set("Parent", Object::Reference(root_id));
    }

    let root = page_dict_mut(base, root_id)?;
    root.get_mut(b"Kids")?
        .as_array_mut()?
        .extend(moved.iter().map(|id| Object::Reference(*id)));
    let count = root.get(b"Count").ok().and_then(number).unwrap_or(0.0) as i64;
    root.set("Count", count + moved.len() as i64);

    Ok(moved.len())
}

fn stamp_info(doc: &mut Document) {
    let info_id = match doc.trailer.get(b"Info").and_then(Object::as_reference) {
        Ok(id) => id,
        Err(_) => {
            let id = doc.add_object(Dictionary::new());
            doc.trailer.set("Info", Object::Reference(id));
            id
        }
    };
    if let Ok(Object::Dictionary(info)) = doc.get_object_mut(info_id) {
        info.set("Producer", Object::string_literal(env!("CARGO_PKG_NAME")));
        info.set(
            "ModDate",
            Object::string_literal(format!("D:{}Z", Utc::now().format("%Y%m%d%H%M%S"))),
        );
    }
}

/// Serializes the document with unreferenced objects dropped and streams compressed.
pub fn save_to_bytes(doc: &mut Document) -> Result<Vec<u8>, PdfError> {
    stamp_info(doc);
    doc.prune_objects();
    doc.compress();
    let mut out = Vec::new();
    doc.save_to(&mut out)
        .map_err(|e| PdfError::Save(e.to_string()))?;
    Ok(out)
}
