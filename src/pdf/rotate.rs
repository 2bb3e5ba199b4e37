use crate::error::Result;
use lopdf::{Document, Object, ObjectId};

/// Add `degrees` to the current rotation of each listed page (zero-based
/// indices), reducing into `[0, 360)`. Rotation accumulates: a page already
/// at 270 rotated by 180 ends up at 90.
pub fn rotate_pages(doc: &mut Document, pages: &[usize], degrees: i64) -> Result<()> {
    let page_map = doc.get_pages();
    let targets: Vec<ObjectId> = pages
        .iter()
        .filter_map(|&p| page_map.get(&(p as u32 + 1)).copied())
        .collect();

    for page_id in targets {
        let current = current_rotation(doc, page_id);
        // rem_euclid keeps negative deltas in [0, 360) as well.
        let next = (current + degrees).rem_euclid(360);
        let dict = doc.get_dictionary_mut(page_id)?;
        dict.set("Rotate", next);
    }
    Ok(())
}

/// Effective rotation of a page, following /Rotate inheritance up the page
/// tree. Defaults to 0.
fn current_rotation(doc: &Document, page_id: ObjectId) -> i64 {
    let mut object_id = page_id;
    // Depth limit guards against malformed parent cycles.
    for _ in 0..10 {
        let Ok(dict) = doc.get_dictionary(object_id) else {
            return 0;
        };
        if let Ok(value) = dict.get(b"Rotate").and_then(Object::as_i64) {
            return value;
        }
        match dict.get(b"Parent") {
            Ok(Object::Reference(parent_id)) => object_id = *parent_id,
            _ => return 0,
        }
    }
    0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::testutil::sample_doc;

    fn rotation_of(doc: &Document, page: usize) -> i64 {
        let page_id = doc.get_pages()[&(page as u32 + 1)];
        doc.get_dictionary(page_id)
            .unwrap()
            .get(b"Rotate")
            .and_then(Object::as_i64)
            .unwrap_or(0)
    }

    #[test]
    fn test_rotation_is_additive_modulo_360() {
        let mut doc = sample_doc(1);
        rotate_pages(&mut doc, &[0], 270).unwrap();
        assert_eq!(270, rotation_of(&doc, 0));
        rotate_pages(&mut doc, &[0], 180).unwrap();
        // 270 + 180 = 450 -> 90, not 450 or -180
        assert_eq!(90, rotation_of(&doc, 0));
    }

    #[test]
    fn test_negative_delta_floor_mod() {
        let mut doc = sample_doc(1);
        rotate_pages(&mut doc, &[0], -90).unwrap();
        assert_eq!(270, rotation_of(&doc, 0));
    }

    #[test]
    fn test_only_listed_pages_rotate() {
        let mut doc = sample_doc(3);
        rotate_pages(&mut doc, &[1], 90).unwrap();
        assert_eq!(0, rotation_of(&doc, 0));
        assert_eq!(90, rotation_of(&doc, 1));
        assert_eq!(0, rotation_of(&doc, 2));
    }
}
