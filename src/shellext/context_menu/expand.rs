/// Placeholder for the first selected item.
pub const FIRST_ITEM_TOKEN: &str = "%1";
/// Placeholder for every selected item.
pub const ALL_ITEMS_TOKEN: &str = "%*";

/// Wraps `path` in double quotes. Embedded quotes are not escaped.
pub fn quote(path: &str) -> String {
    format!("\"{}\"", path)
}

/// Substitutes `%1` with the quoted first item and `%*` with every item quoted
/// and space separated.
///
/// The template is scanned once, left to right; substituted text is never
/// scanned again, so a path that itself contains a token is copied verbatim.
pub fn expand_command(template: &str, selection: &[String]) -> String {
    let first = selection.first().map(|path| quote(path)).unwrap_or_default();
    let all = selection
        .iter()
        .map(|path| quote(path))
        .collect::<Vec<_>>()
        .join(" ");

    let mut expanded = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(position) = rest.find('%') {
        expanded.push_str(&rest[..position]);
        let candidate = &rest[position..];

        if candidate.starts_with(FIRST_ITEM_TOKEN) {
            expanded.push_str(&first);
            rest = &candidate[FIRST_ITEM_TOKEN.len()..];
        } else if candidate.starts_with(ALL_ITEMS_TOKEN) {
            expanded.push_str(&all);
            rest = &candidate[ALL_ITEMS_TOKEN.len()..];
        } else {
            expanded.push('%');
            rest = &candidate[1..];
        }
    }

    expanded.push_str(rest);
    expanded
}

/// Directory containing the first selected item: everything before its last
/// `\` or `/`. Empty when the selection is empty or the path has no separator.
pub fn directory_of(selection: &[String]) -> String {
    selection
        .first()
        .and_then(|path| path.rfind(['\\', '/']).map(|index| path[..index].to_string()))
        .unwrap_or_default()
}
