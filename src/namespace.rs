//! Dotted namespace helpers.

pub const SEPARATOR: char = '.';

/// Collapses `candidate` to the namespace one level below `base`.
///
/// `candidate` is expected to equal `base` or to start with `base` followed by a
/// separator. Anything shorter than or equal to `base` is returned unchanged.
pub fn direct_sub_package<'a>(base: &str, candidate: &'a str) -> &'a str {
    if candidate.len() <= base.len() {
        return candidate;
    }

    let start = base.len() + 1;
    let end = candidate
        .get(start..)
        .and_then(|rest| rest.find(SEPARATOR))
        .map(|idx| start + idx)
        .unwrap_or(candidate.len());

    &candidate[..end]
}

/// Last segment of a dotted name, or the full name if it has no separator.
pub fn local_name(name: &str) -> &str {
    match name.rfind(SEPARATOR) {
        Some(idx) => &name[idx + 1..],
        None => name,
    }
}

/// Everything before the last separator, empty for names without one.
pub fn parent_name(name: &str) -> &str {
    match name.rfind(SEPARATOR) {
        Some(idx) => &name[..idx],
        None => "",
    }
}

/// Whether `candidate` is `base` itself or lives below it.
pub fn is_same_or_nested(base: &str, candidate: &str) -> bool {
    match candidate.strip_prefix(base) {
        Some("") => true,
        Some(rest) => rest.starts_with(SEPARATOR),
        None => false,
    }
}

/// `org.springframework.modulith.PackageInfo` -> `o.s.m.PackageInfo`.
pub fn abbreviate(name: &str) -> String {
    let parent = parent_name(name);
    if parent.is_empty() {
        return name.to_string();
    }

    let mut out = String::with_capacity(name.len());
    for segment in parent.split(SEPARATOR) {
        if let Some(first) = segment.chars().next() {
            out.push(first);
        }
        out.push(SEPARATOR);
    }
    out.push_str(local_name(name));
    out
}
