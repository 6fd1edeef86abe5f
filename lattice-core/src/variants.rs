//! Name variants for fuzzy search recall.
//!
//! A search for `http_client` should find `HTTPClient`, and a search for
//! `getuser` should find `get_user`. Rather than teaching the search engine
//! about identifier conventions we index a few lexical spellings per name.

/// Produces the lexical variants of an identifier name.
///
/// In order, deduplicated by first occurrence:
/// 1. the name itself
/// 2. the name lowercased
/// 3. a snake_case form: `_` inserted before every ASCII uppercase letter
///    that is not the first character, then lowercased
/// 4. the name with every `_` removed
///
/// An empty name yields no variants.
pub fn name_variants(name: &str) -> Vec<String> {
    if name.is_empty() {
        return Vec::new();
    }

    let candidates = [
        name.to_string(),
        name.to_lowercase(),
        snake_case(name),
        name.replace('_', ""),
    ];

    let mut variants: Vec<String> = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        if !variants.contains(&candidate) {
            variants.push(candidate);
        }
    }
    variants
}

fn snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (i, c) in name.chars().enumerate() {
        if i > 0 && c.is_ascii_uppercase() {
            out.push('_');
        }
        out.push(c);
    }
    out.to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acronym_name() {
        let v = name_variants("HTTPClient");
        assert_eq!(v, vec!["HTTPClient", "httpclient", "h_t_t_p_client"]);
    }

    #[test]
    fn test_camel_case_name() {
        let v = name_variants("getUserName");
        assert_eq!(
            v,
            vec!["getUserName", "getusername", "get_user_name"],
            "no-underscore form equals the original and is dropped"
        );
    }

    #[test]
    fn test_snake_case_name() {
        let v = name_variants("load_config");
        assert_eq!(v, vec!["load_config", "loadconfig"]);
    }

    #[test]
    fn test_mixed_name_keeps_all_four() {
        let v = name_variants("Max_Size");
        assert_eq!(v[0], "Max_Size");
        assert_eq!(v[1], "max_size");
        assert_eq!(v[2], "max__size");
        assert_eq!(v[3], "MaxSize");
    }

    #[test]
    fn test_empty_name() {
        assert!(name_variants("").is_empty());
    }

    #[test]
    fn test_no_duplicates_original_first() {
        for name in ["x", "X", "__init__", "ABC", "a_B_c"] {
            let v = name_variants(name);
            assert_eq!(v[0], name);
            let mut sorted = v.clone();
            sorted.sort();
            sorted.dedup();
            assert_eq!(sorted.len(), v.len(), "duplicates for {}", name);
        }
    }
}
