//! Attribute selection
//!
//! Flattens an attribute tree into the ordered list of nodes matching a
//! path-selection query. The query grammar is an alternation of absolute
//! child paths, e.g. `/HCData | /MCData | /LCData | /Manual`; each path
//! addresses descendants of the root container by name, one segment per
//! tree level. Only this fixed grammar is supported.

use shared_attributes::Attribute;

use crate::error::AccuracyError;

/// Select every node of `root`'s subtree matched by `query`, in document
/// order.
///
/// The root itself is a container and is never selected; the first path
/// segment names its direct children. Name comparison is ASCII
/// case-insensitive. A node is returned at most once even when several
/// alternatives match it, and sub-trees that cannot extend any alternative
/// are not descended into.
pub fn select<'a>(root: &'a Attribute, query: &str) -> Result<Vec<&'a Attribute>, AccuracyError> {
    let paths = parse_query(query)?;

    let mut selected = Vec::new();
    let mut stack = Vec::new();
    walk(&root.sub_attributes, &paths, &mut stack, &mut selected);
    Ok(selected)
}

/// Parse the alternation into per-path segment lists.
///
/// Fails fast on an empty or whitespace query and on empty alternatives or
/// segments, before any tree traversal happens.
fn parse_query(query: &str) -> Result<Vec<Vec<String>>, AccuracyError> {
    if query.trim().is_empty() {
        return Err(AccuracyError::InvalidSelector(
            "selection query is empty".to_string(),
        ));
    }

    let mut paths = Vec::new();
    for alternative in query.split('|') {
        let alternative = alternative.trim();
        if alternative.is_empty() {
            return Err(AccuracyError::InvalidSelector(format!(
                "empty alternative in query {:?}",
                query
            )));
        }

        let path = alternative.strip_prefix('/').unwrap_or(alternative);
        let mut segments = Vec::new();
        for segment in path.split('/') {
            let segment = segment.trim();
            if segment.is_empty() {
                return Err(AccuracyError::InvalidSelector(format!(
                    "empty path segment in {:?}",
                    alternative
                )));
            }
            segments.push(segment.to_string());
        }
        paths.push(segments);
    }

    Ok(paths)
}

fn walk<'a>(
    nodes: &'a [Attribute],
    paths: &[Vec<String>],
    stack: &mut Vec<&'a str>,
    selected: &mut Vec<&'a Attribute>,
) {
    for node in nodes {
        stack.push(node.name.as_str());

        let depth = stack.len();
        let mut matches_here = false;
        let mut may_match_deeper = false;
        for path in paths {
            if path.len() < depth || !is_prefix(path, stack) {
                continue;
            }
            if path.len() == depth {
                matches_here = true;
            } else {
                may_match_deeper = true;
            }
        }

        if matches_here {
            selected.push(node);
        }
        if may_match_deeper {
            walk(&node.sub_attributes, paths, stack, selected);
        }

        stack.pop();
    }
}

fn is_prefix(path: &[String], stack: &[&str]) -> bool {
    stack
        .iter()
        .zip(path)
        .all(|(name, segment)| name.eq_ignore_ascii_case(segment))
}
