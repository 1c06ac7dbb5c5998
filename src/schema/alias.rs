//! Alias generators for naming-convention translation at the boundary.

/// `str_field_name` → `StrFieldName`: every `_`-separated word capitalized.
#[must_use]
pub fn to_camel(name: &str) -> String {
    name.split('_').map(capitalize).collect()
}

/// `str_field_name` → `strFieldName`.
#[must_use]
pub fn to_lower_camel(name: &str) -> String {
    let mut words = name.split('_').filter(|w| !w.is_empty());
    let mut out = String::with_capacity(name.len());
    if let Some(first) = words.next() {
        out.push_str(&first.to_lowercase());
    }
    for word in words {
        out.push_str(&capitalize(word));
    }
    out
}

/// First character upper-cased, the rest lower-cased.
fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_camel() {
        assert_eq!(to_camel("str_field_name"), "StrFieldName");
        assert_eq!(to_camel("float_field_name"), "FloatFieldName");
        assert_eq!(to_camel("single"), "Single");
        assert_eq!(to_camel("HTTP_code"), "HttpCode");
    }

    #[test]
    fn test_to_lower_camel() {
        assert_eq!(to_lower_camel("str_field_name"), "strFieldName");
        assert_eq!(to_lower_camel("_leading"), "leading");
    }
}
