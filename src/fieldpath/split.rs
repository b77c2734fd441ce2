//! Path expression splitting.

/// Splits a dot-delimited field path into tokens.
///
/// A backslash escapes the next character, so keys containing dots can be
/// written as `a\.b`. Single- or double-quoted sections may span dots; the
/// quotes are stripped. Empty tokens are dropped.
pub fn split_path(path: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut chars = path.chars();

    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                if let Some(next) = chars.next() {
                    current.push(next);
                }
            }
            '\'' | '"' => match quote {
                Some(q) if q == c => quote = None,
                Some(_) => current.push(c),
                None => quote = Some(c),
            },
            '.' if quote.is_none() => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            _ => current.push(c),
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_split() {
        assert_eq!(split_path("spec.containers.0.image"), vec![
            "spec",
            "containers",
            "0",
            "image"
        ]);
    }

    #[test]
    fn test_escaped_dot_is_literal() {
        assert_eq!(split_path(r"data.config\.yaml"), vec!["data", "config.yaml"]);
    }

    #[test]
    fn test_quoted_section_spans_dots() {
        assert_eq!(
            split_path("metadata.annotations.'app.kubernetes.io/name'"),
            vec!["metadata", "annotations", "app.kubernetes.io/name"]
        );
        assert_eq!(
            split_path(r#"data."a.b".c"#),
            vec!["data", "a.b", "c"]
        );
    }

    #[test]
    fn test_empty_tokens_dropped() {
        assert_eq!(split_path(""), Vec::<String>::new());
        assert_eq!(split_path("a..b"), vec!["a", "b"]);
    }
}
