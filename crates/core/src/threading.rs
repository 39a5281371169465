//! Comment threading: flat records into a one-level display tree.
//!
//! Only direct replies are materialized. A reply to a reply keys off its
//! own parent and never surfaces under the top-level thread; the API
//! layer rejects such replies at creation time so none exist in practice.

use std::collections::HashMap;

use crate::types::{DbId, Timestamp};

/// Minimal view of a comment needed to build display threads.
///
/// The persistence layer's comment model implements this so threading
/// stays free of storage concerns.
pub trait Threadable {
    fn id(&self) -> DbId;
    fn parent_id(&self) -> Option<DbId>;
    fn created_at(&self) -> Timestamp;
    fn is_pinned(&self) -> bool;
}

/// Threaded comments ready for rendering.
#[derive(Debug)]
pub struct CommentThreads<T> {
    /// Pinned top-level comments first (in input order), then the
    /// remaining top-level comments newest-first.
    pub top_level: Vec<T>,
    /// Direct children per parent id, oldest-first.
    pub children: HashMap<DbId, Vec<T>>,
}

/// Partition a flat, ordered comment collection into top-level comments
/// and per-parent reply lists.
pub fn build_threads<T: Threadable>(comments: Vec<T>) -> CommentThreads<T> {
    let mut pinned = Vec::new();
    let mut unpinned = Vec::new();
    let mut children: HashMap<DbId, Vec<T>> = HashMap::new();

    for comment in comments {
        match comment.parent_id() {
            Some(parent) => children.entry(parent).or_default().push(comment),
            None if comment.is_pinned() => pinned.push(comment),
            None => unpinned.push(comment),
        }
    }

    unpinned.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
    for replies in children.values_mut() {
        replies.sort_by(|a, b| a.created_at().cmp(&b.created_at()));
    }

    let mut top_level = pinned;
    top_level.extend(unpinned);

    CommentThreads {
        top_level,
        children,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[derive(Debug, Clone)]
    struct TestComment {
        id: DbId,
        parent_id: Option<DbId>,
        created_at: Timestamp,
        is_pinned: bool,
    }

    impl Threadable for TestComment {
        fn id(&self) -> DbId {
            self.id
        }
        fn parent_id(&self) -> Option<DbId> {
            self.parent_id
        }
        fn created_at(&self) -> Timestamp {
            self.created_at
        }
        fn is_pinned(&self) -> bool {
            self.is_pinned
        }
    }

    fn comment(id: DbId, parent_id: Option<DbId>, minute: u32) -> TestComment {
        TestComment {
            id,
            parent_id,
            created_at: Utc.with_ymd_and_hms(2024, 3, 1, 9, minute, 0).unwrap(),
            is_pinned: false,
        }
    }

    fn pinned(id: DbId, minute: u32) -> TestComment {
        TestComment {
            is_pinned: true,
            ..comment(id, None, minute)
        }
    }

    #[test]
    fn partitions_top_level_and_children() {
        let threads = build_threads(vec![
            comment(1, None, 0),
            comment(2, Some(1), 1),
            comment(3, None, 2),
        ]);

        let top_ids: Vec<DbId> = threads.top_level.iter().map(|c| c.id).collect();
        assert!(top_ids.contains(&1) && top_ids.contains(&3));
        assert_eq!(top_ids.len(), 2);

        let child_ids: Vec<DbId> = threads.children[&1].iter().map(|c| c.id).collect();
        assert_eq!(child_ids, vec![2]);
    }

    #[test]
    fn top_level_sorted_newest_first() {
        let threads = build_threads(vec![
            comment(1, None, 0),
            comment(2, None, 5),
            comment(3, None, 3),
        ]);
        let ids: Vec<DbId> = threads.top_level.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }

    #[test]
    fn pinned_comments_come_first() {
        let threads = build_threads(vec![
            comment(1, None, 0),
            pinned(2, 1),
            comment(3, None, 9),
            pinned(4, 2),
        ]);
        let ids: Vec<DbId> = threads.top_level.iter().map(|c| c.id).collect();
        // Pinned in input order, then the rest newest-first.
        assert_eq!(ids, vec![2, 4, 3, 1]);
    }

    #[test]
    fn children_sorted_oldest_first() {
        let threads = build_threads(vec![
            comment(1, None, 0),
            comment(2, Some(1), 9),
            comment(3, Some(1), 2),
            comment(4, Some(1), 5),
        ]);
        let ids: Vec<DbId> = threads.children[&1].iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![3, 4, 2]);
    }

    #[test]
    fn reply_to_reply_keys_off_direct_parent_only() {
        let threads = build_threads(vec![
            comment(1, None, 0),
            comment(2, Some(1), 1),
            comment(3, Some(2), 2),
        ]);
        // The grandchild is keyed under its direct parent, not under the
        // top-level comment.
        assert_eq!(threads.children[&2].len(), 1);
        assert_eq!(threads.children[&1].len(), 1);
    }

    #[test]
    fn empty_input_yields_empty_threads() {
        let threads = build_threads(Vec::<TestComment>::new());
        assert!(threads.top_level.is_empty());
        assert!(threads.children.is_empty());
    }

    #[test]
    fn pinned_comment_keeps_its_children() {
        let threads = build_threads(vec![pinned(1, 0), comment(2, Some(1), 1)]);
        assert_eq!(threads.top_level[0].id, 1);
        assert_eq!(threads.children[&1][0].id(), 2);
    }
}
