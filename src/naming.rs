//! Derived filenames for compressed output.
//!
//! Every result is offered as `compressed_<original-name>`. The name is kept
//! verbatim, extension included, even when the codec changed (a PNG
//! re-encoded as JPEG is still `compressed_logo.png`).
//!
//! ## Collisions
//!
//! Two inputs can share a display name (`a/photo.jpg` and `b/photo.jpg`).
//! Writing both into one directory or archive would lose one, so
//! [`unique_names`] suffixes repeats before the extension:
//!
//! - `compressed_photo.jpg`
//! - `compressed_photo-2.jpg`
//! - `compressed_photo-3.jpg`

use std::collections::HashSet;

/// Prefix prepended to every output filename.
pub const COMPRESSED_PREFIX: &str = "compressed_";

/// Output filename for an input display name.
pub fn compressed_name(name: &str) -> String {
    format!("{COMPRESSED_PREFIX}{name}")
}

/// Split `name` into stem and extension (with the dot), keeping dotfiles whole.
fn split_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(0) | None => (name, ""),
        Some(pos) => name.split_at(pos),
    }
}

/// Deduplicate a list of filenames, preserving order.
///
/// The first occurrence keeps its name; later ones get `-2`, `-3`, ... before
/// the extension, skipping any candidate already taken.
pub fn unique_names<I, S>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut taken: HashSet<String> = HashSet::new();
    let mut result = Vec::new();
    for name in names {
        let name = name.as_ref();
        let mut candidate = name.to_string();
        let mut n = 2;
        while taken.contains(&candidate) {
            let (stem, ext) = split_extension(name);
            candidate = format!("{stem}-{n}{ext}");
            n += 1;
        }
        taken.insert(candidate.clone());
        result.push(candidate);
    }
    result
}
