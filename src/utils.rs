/// Converts a class or member name into a tag name: each upper-case letter
/// becomes a hyphen followed by its lower-case form, each underscore becomes
/// a hyphen, and a leading hyphen is stripped.
///
/// ```
/// # use pretty_assertions::assert_eq;
/// use xml_model::utils::kebab_case;
///
/// assert_eq!(kebab_case("Library"), "library");
/// assert_eq!(kebab_case("nbPages"), "nb-pages");
/// assert_eq!(kebab_case("nb_pages"), "nb-pages");
/// ```
pub fn kebab_case(name: &str) -> String {
    let mut result = String::with_capacity(name.len() + 4);
    for ch in name.chars() {
        if ch.is_uppercase() {
            result.push('-');
            result.extend(ch.to_lowercase());
        } else if ch == '_' {
            result.push('-');
        } else {
            result.push(ch);
        }
    }
    match result.strip_prefix('-') {
        Some(stripped) => stripped.to_owned(),
        None => result,
    }
}
