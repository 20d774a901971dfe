use std::borrow::Cow;

const PARENT_MARKER: &str = "/../";

/// Collapse `/../` segments in a slash-separated path without touching the
/// filesystem.
///
/// Each marker is removed together with the segment in front of it, found by
/// the nearest preceding `/`. A marker with nothing in front of it collapses
/// onto the start of the string. The loop runs until no marker remains, so the
/// result never contains `/../`.
pub fn normalize_path(path: &str) -> Cow<'_, str> {
    if !path.contains(PARENT_MARKER) {
        return Cow::Borrowed(path);
    }
    let mut normalized = path.to_string();
    while let Some(marker) = normalized.find(PARENT_MARKER) {
        let segment_start = normalized[..marker].rfind('/').unwrap_or(0);
        // keep the marker's trailing slash; it now separates the survivors
        normalized.replace_range(segment_start..marker + PARENT_MARKER.len() - 1, "");
    }
    Cow::Owned(normalized)
}
