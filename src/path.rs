//! Relative path helpers
//!
//! Every path handled by the crate is a forward-slash string relative to the
//! filesystem root, without `.`/`..` segments and without a leading or
//! trailing slash. The root itself is the empty string. Segments are kept
//! byte-for-byte so they match the names the walker reports.

use crate::error::ApiError;

/// Normalize a user supplied relative path.
pub fn normalize(raw: &str) -> Result<String, ApiError> {
    let unified = raw.replace('\\', "/");
    if unified.starts_with('/') {
        return Err(ApiError::InvalidPath(raw.to_string()));
    }

    let mut segments = Vec::new();
    for segment in unified.split('/') {
        match segment {
            "" | "." => continue,
            ".." => return Err(ApiError::InvalidPath(raw.to_string())),
            s => segments.push(s),
        }
    }
    Ok(segments.join("/"))
}

/// Parent directory; the root for single-segment paths.
pub fn dirname(path: &str) -> &str {
    match path.rfind('/') {
        Some(idx) => &path[..idx],
        None => "",
    }
}

/// Last segment of the path.
pub fn basename(path: &str) -> &str {
    match path.rfind('/') {
        Some(idx) => &path[idx + 1..],
        None => path,
    }
}

/// Lowercase extension of the last segment, empty when there is none.
pub fn extension(path: &str) -> String {
    let name = basename(path);
    match name.rfind('.') {
        Some(idx) if idx > 0 => name[idx + 1..].to_lowercase(),
        _ => String::new(),
    }
}

pub fn join(base: &str, child: &str) -> String {
    match (base.is_empty(), child.is_empty()) {
        (true, _) => child.to_string(),
        (_, true) => base.to_string(),
        _ => format!("{}/{}", base, child),
    }
}

/// Segment-aware prefix test: `a` covers `a` and `a/b`, never `ab`.
pub fn is_within(path: &str, prefix: &str) -> bool {
    if prefix.is_empty() {
        return true;
    }
    path == prefix
        || (path.len() > prefix.len()
            && path.starts_with(prefix)
            && path.as_bytes()[prefix.len()] == b'/')
}

/// Replace the leading `from` segment run of `path` with `to`.
pub fn rebase(path: &str, from: &str, to: &str) -> Option<String> {
    if !is_within(path, from) {
        return None;
    }
    let rest = path[from.len()..].trim_start_matches('/');
    Some(join(to, rest))
}

/// Cumulative prefixes of `path` below `base`, outermost first.
///
/// `descend_from("files", "files/a/b")` yields `files/a`, `files/a/b`.
pub fn descend_from(base: &str, path: &str) -> Vec<String> {
    let mut out = Vec::new();
    let Some(rest) = rebase(path, base, "") else {
        return out;
    };
    let mut current = base.to_string();
    for segment in rest.split('/').filter(|s| !s.is_empty()) {
        current = join(&current, segment);
        out.push(current.clone());
    }
    out
}

pub fn depth(path: &str) -> usize {
    if path.is_empty() {
        0
    } else {
        path.matches('/').count() + 1
    }
}
