//! Folder path utilities.
//!
//! Paths name folders as `/` (the root) or `/name1/name2/.../nameK/`: a
//! leading slash, each component followed by a slash. Components are 1 to
//! [`MAX_FOLDER_NAME_LENGTH`] bytes of ASCII lowercase letters. All
//! functions here borrow from the input instead of allocating.

/// Maximum length of a single folder name, in bytes.
pub const MAX_FOLDER_NAME_LENGTH: usize = 255;

/// Check whether `path` is a well-formed folder path.
pub fn is_valid(path: &str) -> bool {
    if !path.starts_with('/') || !path.ends_with('/') {
        return false;
    }
    if path == "/" {
        return true;
    }
    // Interior of "/a/b/" is "a/b"; any empty piece means a doubled slash.
    path[1..path.len() - 1].split('/').all(is_valid_name)
}

/// Check whether `name` is a usable folder name.
pub fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= MAX_FOLDER_NAME_LENGTH
        && name.bytes().all(|b| b.is_ascii_lowercase())
}

/// Check whether `path` names the root folder.
pub fn is_root(path: &str) -> bool {
    path == "/"
}

/// Iterate over the folder names of a valid path, outermost first.
///
/// Yields nothing for `/`.
pub fn components(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

/// Number of folder names in a valid path. `/` has depth 0.
pub fn depth(path: &str) -> usize {
    components(path).count()
}

/// Split a valid path into its parent path and final folder name.
///
/// Returns `None` for `/`, which has no parent.
///
/// ```
/// assert_eq!(arbor::path::split_last("/a/b/c/"), Some(("/a/b/", "c")));
/// assert_eq!(arbor::path::split_last("/a/"), Some(("/", "a")));
/// assert_eq!(arbor::path::split_last("/"), None);
/// ```
pub fn split_last(path: &str) -> Option<(&str, &str)> {
    if path == "/" {
        return None;
    }
    let trimmed = &path[..path.len() - 1];
    let cut = trimmed.rfind('/')?;
    Some((&path[..cut + 1], &trimmed[cut + 1..]))
}

/// Number of leading folder names two valid paths share.
///
/// `common_depth("/", anything)` is 0; `common_depth(p, p)` is `depth(p)`.
pub fn common_depth(a: &str, b: &str) -> usize {
    components(a)
        .zip(components(b))
        .take_while(|(x, y)| x == y)
        .count()
}
