//! Entity-name resolution against cached lists.
//!
//! Users refer to courses and lessons by id or by any part of the title.
//! Resolution is pure: it never fetches, so callers populate the cache first.

use tlearn_types::model::Entity;

/// Find the entity a free-text query refers to.
///
/// An exact (case-sensitive) id match wins. Otherwise the first candidate
/// whose title contains the query, case-insensitively, is returned. Blank
/// queries match nothing.
pub fn resolve_entity<'a, T: Entity>(query: &str, candidates: &'a [T]) -> Option<&'a T> {
    if query.trim().is_empty() {
        return None;
    }
    if let Some(exact) = candidates.iter().find(|c| c.id() == query) {
        return Some(exact);
    }
    let needle = query.to_lowercase();
    candidates
        .iter()
        .find(|c| c.title().to_lowercase().contains(&needle))
}

/// Like [`resolve_entity`], returning only the id.
pub fn resolve<'a, T: Entity>(query: &str, candidates: &'a [T]) -> Option<&'a str> {
    resolve_entity(query, candidates).map(|c| c.id())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tlearn_types::model::Course;

    fn course(id: &str, title: &str) -> Course {
        Course {
            id: id.into(),
            title: title.into(),
            description: String::new(),
        }
    }

    #[test]
    fn first_title_match_wins() {
        let list = [course("x", "Go Basics"), course("y", "Advanced Go")];
        assert_eq!(resolve("go", &list), Some("x"));
    }

    #[test]
    fn exact_id_beats_title_substring() {
        // "y" is the id of the second entry but also appears in the first title.
        let list = [course("x", "Python Basics"), course("y", "Rust")];
        assert_eq!(resolve("y", &list), Some("y"));
    }

    #[test]
    fn id_match_is_case_sensitive() {
        let list = [course("ABC", "Shell")];
        assert_eq!(resolve("abc", &list), None);
    }

    #[test]
    fn title_match_is_case_insensitive() {
        let list = [course("1", "Go HTTP Mastery")];
        assert_eq!(resolve("http MAST", &list), Some("1"));
    }

    #[test]
    fn no_match() {
        let list = [course("x", "Go Basics")];
        assert_eq!(resolve("zzz", &list), None);
    }

    #[test]
    fn empty_cache_is_not_found() {
        let list: [Course; 0] = [];
        assert_eq!(resolve("go", &list), None);
    }

    #[test]
    fn blank_query_is_not_found() {
        let list = [course("x", "Go Basics")];
        assert_eq!(resolve("", &list), None);
        assert_eq!(resolve("   ", &list), None);
    }

    #[test]
    fn resolve_entity_returns_candidate() {
        let list = [course("x", "Go Basics")];
        let found = resolve_entity("basics", &list).unwrap();
        assert_eq!(found.title, "Go Basics");
    }
}
