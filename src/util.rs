/// First balanced `{...}` block in `text`, string-literal aware. Used for
/// model replies and script-embedded JSON, both of which arrive surrounded
/// by arbitrary text.
pub fn first_json_block(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (i, c) in text[start..].char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + i + c.len_utf8()]);
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn balanced_block() {
        assert_eq!(first_json_block("x = {\"a\":1}; rest"), Some("{\"a\":1}"));
    }

    #[test]
    fn nested_and_string_braces() {
        let s = "pre {\"a\":{\"b\":\"}{\"}} post";
        assert_eq!(first_json_block(s), Some("{\"a\":{\"b\":\"}{\"}}"));
    }

    #[test]
    fn unbalanced_is_none() {
        assert_eq!(first_json_block("{\"a\":1"), None);
        assert_eq!(first_json_block("no braces"), None);
    }
}
