use std::collections::{HashSet, VecDeque};

use crate::{
    error::AppError,
    models::comments::CommentFlag,
    repositories::comments::CommentRepository,
};

/// Sets `flag` to `value` on every descendant of `root_id`. Each descendant
/// is visited once even if stored threads contain a cycle. Returns how many
/// descendants were updated.
pub async fn cascade_flag(
    comments: &dyn CommentRepository,
    root_id: i64,
    flag: CommentFlag,
    value: bool,
) -> Result<usize, AppError> {
    let mut visited = HashSet::from([root_id]);
    let mut queue = VecDeque::from([root_id]);
    let mut descendants = Vec::new();

    while let Some(id) = queue.pop_front() {
        for child in comments.find_reply_ids(id).await? {
            if visited.insert(child) {
                descendants.push(child);
                queue.push_back(child);
            }
        }
    }

    if descendants.is_empty() {
        return Ok(0);
    }
    comments.set_flag(&descendants, flag, value).await?;
    Ok(descendants.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{InMemoryComments, comment_fixture, reply_fixture};

    #[tokio::test]
    async fn flags_all_descendants_but_not_siblings() {
        let store = InMemoryComments::with(vec![
            comment_fixture(1, "article:1"),
            reply_fixture(2, 1),
            reply_fixture(3, 2),
            reply_fixture(4, 1),
            comment_fixture(5, "article:1"),
        ]);

        let touched = cascade_flag(&store, 1, CommentFlag::Removed, true)
            .await
            .unwrap();

        assert_eq!(touched, 3);
        assert!(store.get(2).removed && store.get(3).removed && store.get(4).removed);
        assert!(!store.get(1).removed);
        assert!(!store.get(5).removed);
    }

    #[tokio::test]
    async fn terminates_on_cycles() {
        let store = InMemoryComments::with(vec![reply_fixture(1, 2), reply_fixture(2, 1)]);

        let touched = cascade_flag(&store, 1, CommentFlag::Blocked, true)
            .await
            .unwrap();

        assert_eq!(touched, 1);
        assert!(store.get(2).blocked);
        assert!(!store.get(2).blocked_thread);
        assert_eq!(store.flag_updates(), 1);
    }

    #[tokio::test]
    async fn leaf_comment_touches_nothing() {
        let store = InMemoryComments::with(vec![comment_fixture(1, "article:1")]);
        let touched = cascade_flag(&store, 1, CommentFlag::Removed, true)
            .await
            .unwrap();
        assert_eq!(touched, 0);
        assert_eq!(store.flag_updates(), 0);
    }
}
