//! Path reconstruction
//!
//! The forward cache maps each title to the page that links to it, so walking
//! parents from the meeting title leads back to the start page. The backward
//! cache maps each title to a page it links to, so walking parents from the
//! meeting title leads on to the end page. Stitching the reversed forward walk
//! onto the backward walk gives the full chain.

use crate::PathError;
use std::collections::{HashMap, HashSet};

/// Follows parent pointers from `title` to the anchor (the entry with an empty parent)
///
/// The returned chain starts with `title` and ends with the anchor.
pub fn walk_to_anchor(
    title: &str,
    cache: &HashMap<String, String>,
) -> Result<Vec<String>, PathError> {
    let mut chain = Vec::new();
    let mut seen = HashSet::new();
    let mut current = title.to_string();

    loop {
        if !seen.insert(current.clone()) {
            return Err(PathError::Cycle { title: current });
        }

        let parent = cache
            .get(&current)
            .ok_or_else(|| PathError::Missing {
                title: current.clone(),
            })?
            .clone();

        chain.push(current);

        if parent.is_empty() {
            return Ok(chain);
        }
        current = parent;
    }
}

/// Builds the start-to-end path through a meeting title present in both caches
///
/// The meeting title appears exactly once. When it is one of the anchors the
/// corresponding walk is a single entry and the path collapses to one side.
pub fn reconstruct_path(
    meeting: &str,
    forward: &HashMap<String, String>,
    backward: &HashMap<String, String>,
) -> Result<Vec<String>, PathError> {
    let mut path = walk_to_anchor(meeting, forward)?;
    path.reverse();

    let tail = walk_to_anchor(meeting, backward)?;
    path.extend(tail.into_iter().skip(1));

    Ok(path)
}
