use std::collections::BTreeSet;

/// Variable names present in both scopes, sorted.
///
/// Pure set intersection, informational only; nothing downstream depends on
/// the result.
pub fn common_names(left: &[String], right: &[String]) -> Vec<String> {
    let left: BTreeSet<&str> = left.iter().map(String::as_str).collect();
    let right: BTreeSet<&str> = right.iter().map(String::as_str).collect();

    left.intersection(&right).map(|s| s.to_string()).collect()
}
