use crate::error::{OpError, Result};
use lopdf::{Document, Object, ObjectId};
use std::collections::BTreeMap;

/// One picked page: (index into `sources`, zero-based page index).
pub type PagePick = (usize, usize);

/// Build a new document containing the picked pages, in pick order.
///
/// This is the copy-pages primitive behind extract, split, reorder, and
/// merge: the output page list follows `picks` exactly, including duplicates.
/// Page objects keep their content and resources; outlines are dropped since
/// their destinations are stale after picking.
pub fn compose(sources: &[Document], picks: &[PagePick]) -> Result<Document> {
    // All index math happens before the output document is touched.
    let mut source_pages: Vec<Vec<Object>> = Vec::new();
    let mut all_objects = BTreeMap::new();
    let mut max_id = 1;

    for source in sources {
        let mut doc = source.clone();
        doc.renumber_objects_with(max_id);
        max_id = doc.max_id + 1;

        let mut pages = Vec::new();
        for (_, object_id) in doc.get_pages() {
            pages.push(doc.get_object(object_id)?.to_owned());
        }
        source_pages.push(pages);
        all_objects.extend(doc.objects);
    }

    for &(source_index, page_index) in picks {
        let count = source_pages
            .get(source_index)
            .map(Vec::len)
            .ok_or_else(|| {
                OpError::ExternalService(format!("no input document at index {source_index}"))
            })?;
        if page_index >= count {
            return Err(OpError::ExternalService(format!(
                "page index {page_index} out of bounds for a {count}-page document"
            )));
        }
    }

    let mut document = Document::with_version("1.5");

    // Keep the first Catalog and the first Pages root; merge the Pages
    // dictionaries so inheritable attributes (MediaBox, Resources) survive.
    let mut catalog_object: Option<(ObjectId, Object)> = None;
    let mut pages_object: Option<(ObjectId, Object)> = None;

    for (object_id, object) in all_objects.iter() {
        match object.type_name().unwrap_or(b"") {
            b"Catalog" => {
                catalog_object = Some((
                    catalog_object.map(|(id, _)| id).unwrap_or(*object_id),
                    object.clone(),
                ));
            }
            b"Pages" => {
                if let Ok(dictionary) = object.as_dict() {
                    let mut dictionary = dictionary.clone();
                    if let Some((_, ref existing)) = pages_object {
                        if let Ok(existing) = existing.as_dict() {
                            dictionary.extend(existing);
                        }
                    }
                    pages_object = Some((
                        pages_object.map(|(id, _)| id).unwrap_or(*object_id),
                        Object::Dictionary(dictionary),
                    ));
                }
            }
            // Page objects are re-parented below; outline objects are stale
            // after picking and get rebuilt by build_outline.
            b"Page" => {}
            b"Outlines" => {}
            b"Outline" => {}
            _ => {
                document.objects.insert(*object_id, object.clone());
            }
        }
    }

    let Some(pages_object) = pages_object else {
        return Err(OpError::ExternalService(
            "invalid PDF: no Pages root found".to_string(),
        ));
    };
    let Some(catalog_object) = catalog_object else {
        return Err(OpError::ExternalService(
            "invalid PDF: no Catalog found".to_string(),
        ));
    };

    // Every pick occurrence becomes its own page object, so a page picked
    // twice stays two distinct kids through renumbering. Content streams and
    // resources are still shared by reference.
    let mut next_id = max_id;
    let mut kids = Vec::new();
    for &(source_index, page_index) in picks {
        let object = &source_pages[source_index][page_index];
        if let Ok(dictionary) = object.as_dict() {
            let mut dictionary = dictionary.clone();
            dictionary.set("Parent", pages_object.0);
            let object_id: ObjectId = (next_id, 0);
            next_id += 1;
            kids.push(object_id);
            document
                .objects
                .insert(object_id, Object::Dictionary(dictionary));
        }
    }

    if let Ok(dictionary) = pages_object.1.as_dict() {
        let mut dictionary = dictionary.clone();
        dictionary.set("Count", picks.len() as i64);
        dictionary.set(
            "Kids",
            kids.into_iter().map(Object::Reference).collect::<Vec<_>>(),
        );
        document
            .objects
            .insert(pages_object.0, Object::Dictionary(dictionary));
    }

    if let Ok(dictionary) = catalog_object.1.as_dict() {
        let mut dictionary = dictionary.clone();
        dictionary.set("Pages", pages_object.0);
        dictionary.remove(b"Outlines");
        document
            .objects
            .insert(catalog_object.0, Object::Dictionary(dictionary));
    }

    document.trailer.set("Root", catalog_object.0);
    document.max_id = next_id - 1;
    document.renumber_objects();
    document.adjust_zero_pages();
    document.prune_objects();
    document.compress();

    Ok(document)
}

/// Compose from a single source document.
pub fn pick_pages(source: &Document, pages: &[usize]) -> Result<Document> {
    let picks: Vec<PagePick> = pages.iter().map(|&p| (0, p)).collect();
    compose(std::slice::from_ref(source), &picks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::testutil::{page_markers, sample_doc};
    use std::collections::HashSet;

    #[test]
    fn test_pick_subset_in_order() {
        let doc = sample_doc(3);
        let out = pick_pages(&doc, &[0, 1]).unwrap();
        assert_eq!(2, out.page_iter().count());
        assert_eq!(vec!["Page 1", "Page 2"], page_markers(&out));

        // Stale bookmarks are dropped, not carried over.
        let catalog = out.catalog().unwrap();
        assert!(catalog.get(b"Outlines").is_err());
    }

    #[test]
    fn test_pick_preserves_given_order_and_duplicates() {
        let doc = sample_doc(5);
        let out = pick_pages(&doc, &[2, 0, 0]).unwrap();
        assert_eq!(3, out.page_iter().count());
        assert_eq!(vec!["Page 3", "Page 1", "Page 1"], page_markers(&out));

        // The duplicated page must be two distinct page objects, not one
        // object listed twice in Kids.
        let ids: HashSet<_> = out.get_pages().into_values().collect();
        assert_eq!(3, ids.len());
    }

    #[test]
    fn test_duplicates_survive_byte_round_trip() {
        let doc = sample_doc(3);
        let out = pick_pages(&doc, &[0, 0, 1]).unwrap();
        let bytes = crate::pdf::PdfDocument::to_bytes(out).unwrap();
        let reloaded = Document::load_mem(&bytes).unwrap();
        assert_eq!(
            vec!["Page 1", "Page 1", "Page 2"],
            page_markers(&reloaded)
        );
    }

    #[test]
    fn test_compose_across_documents() {
        let a = sample_doc(2);
        let b = sample_doc(3);
        let picks: Vec<PagePick> = vec![(0, 0), (0, 1), (1, 0), (1, 1), (1, 2)];
        let out = compose(&[a, b], &picks).unwrap();
        assert_eq!(5, out.page_iter().count());
    }

    #[test]
    fn test_pick_out_of_bounds_errors() {
        let doc = sample_doc(2);
        assert!(pick_pages(&doc, &[5]).is_err());
    }

    #[test]
    fn test_empty_pick_list() {
        let doc = sample_doc(2);
        let out = pick_pages(&doc, &[]).unwrap();
        assert_eq!(0, out.page_iter().count());
    }
}
