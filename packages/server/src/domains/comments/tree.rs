//! Comment threads rebuilt from a flat page of comments.
//!
//! The page is indexed by id once, children are attached by position, and
//! the nested nodes are assembled with an explicit stack, so very deep reply
//! chains never recurse.
//!
//! Replies whose parent is not in the input have nowhere to attach and are
//! left out of the forest together with their own replies. This is expected
//! whenever a page boundary cuts through a thread.

use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, warn};

use super::models::{Comment, ParentRef};
use crate::common::{CommentId, CoreError, CoreResult};

/// A comment with its replies, in the order they appeared in the input.
///
/// Built per request and thrown away after serialization.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentNode {
    #[serde(flatten)]
    pub comment: Comment,
    pub children: Vec<CommentNode>,
}

impl CommentNode {
    pub fn id(&self) -> CommentId {
        self.comment.id
    }

    /// Number of replies below this node, at any depth.
    pub fn descendant_count(&self) -> usize {
        let mut count = 0;
        let mut pending: Vec<&CommentNode> = self.children.iter().collect();
        while let Some(node) = pending.pop() {
            count += 1;
            pending.extend(node.children.iter());
        }
        count
    }
}

// Dropping a long reply chain must not recurse once per level.
impl Drop for CommentNode {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.children);
        }
    }
}

/// Rebuild the forest of top-level comments from a flat list in any order.
///
/// Duplicate ids: the last occurrence wins and earlier ones are discarded.
/// A comment that is its own parent, a reply whose parent belongs to another
/// post, or a parent cycle is reported as [`CoreError::Invariant`].
pub fn build_forest(comments: Vec<Comment>) -> CoreResult<Vec<CommentNode>> {
    let len = comments.len();

    // Pass 1: id -> position.
    let mut index: HashMap<CommentId, usize> = HashMap::with_capacity(len);
    for (pos, comment) in comments.iter().enumerate() {
        if comment.parent == ParentRef::Reply(comment.id) {
            warn!(comment_id = %comment.id, "Comment references itself as parent");
            return Err(CoreError::invariant(format!(
                "comment {} is its own parent",
                comment.id
            )));
        }
        index.insert(comment.id, pos);
    }

    // Pass 2: attach every live comment to its parent.
    let mut parent_of: Vec<Option<usize>> = vec![None; len];
    let mut children: Vec<Vec<usize>> = vec![Vec::new(); len];
    let mut roots = Vec::new();
    let mut live = 0usize;

    for (pos, comment) in comments.iter().enumerate() {
        if index.get(&comment.id) != Some(&pos) {
            continue;
        }
        live += 1;

        match comment.parent {
            ParentRef::Root => roots.push(pos),
            ParentRef::Reply(parent_id) => {
                let Some(&parent_pos) = index.get(&parent_id) else {
                    continue;
                };
                let parent = &comments[parent_pos];
                if parent.post_id != comment.post_id {
                    warn!(
                        comment_id = %comment.id,
                        parent_id = %parent_id,
                        "Reply and parent belong to different posts"
                    );
                    return Err(CoreError::invariant(format!(
                        "comment {} replies to {} on another post",
                        comment.id, parent_id
                    )));
                }
                parent_of[pos] = Some(parent_pos);
                children[parent_pos].push(pos);
            }
        }
    }

    if let Some(pos) = find_cycle(&parent_of) {
        let id = comments[pos].id;
        warn!(comment_id = %id, "Comment parents form a cycle");
        return Err(CoreError::invariant(format!(
            "comment {} is part of a parent cycle",
            id
        )));
    }

    // Pass 3: assemble nodes bottom-up, children before parents.
    let mut slots: Vec<Option<Comment>> = comments.into_iter().map(Some).collect();
    let mut built: Vec<Option<CommentNode>> = Vec::with_capacity(len);
    built.resize_with(len, || None);

    let mut forest = Vec::with_capacity(roots.len());
    let mut assembled = 0usize;
    let mut stack: Vec<(usize, bool)> = Vec::new();

    for &root in &roots {
        stack.push((root, false));
        while let Some((pos, expanded)) = stack.pop() {
            if !expanded {
                stack.push((pos, true));
                stack.extend(children[pos].iter().map(|&child| (child, false)));
                continue;
            }

            let comment = slots[pos]
                .take()
                .ok_or_else(|| CoreError::invariant("comment reached twice while building thread"))?;
            let kids = children[pos]
                .iter()
                .filter_map(|&child| built[child].take())
                .collect();
            built[pos] = Some(CommentNode {
                comment,
                children: kids,
            });
            assembled += 1;
        }

        if let Some(node) = built[root].take() {
            forest.push(node);
        }
    }

    if assembled < live {
        debug!(
            dropped = live - assembled,
            "Dropped replies whose parent is outside this page"
        );
    }

    Ok(forest)
}

/// Walk parent links from every comment; returns a position on a cycle.
fn find_cycle(parent_of: &[Option<usize>]) -> Option<usize> {
    #[derive(Clone, Copy, PartialEq, Eq)]
    enum Mark {
        Unvisited,
        OnPath,
        Done,
    }

    let mut marks = vec![Mark::Unvisited; parent_of.len()];
    let mut path = Vec::new();

    for start in 0..parent_of.len() {
        let mut current = Some(start);
        while let Some(pos) = current {
            match marks[pos] {
                Mark::Done => break,
                Mark::OnPath => return Some(pos),
                Mark::Unvisited => {
                    marks[pos] = Mark::OnPath;
                    path.push(pos);
                    current = parent_of[pos];
                }
            }
        }
        for pos in path.drain(..) {
            marks[pos] = Mark::Done;
        }
    }

    None
}
