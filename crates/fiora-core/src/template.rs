//! Template substitution for workflow step values.
//!
//! Steps may reference caller-supplied inputs as `{name}` placeholders,
//! e.g. `"value": "{username}"` with `template_inputs: {"username": "alice"}`.
//! Names without a matching input are left verbatim, as is any text with
//! unbalanced or malformed braces.

use std::collections::HashMap;

/// Replace every `{name}` placeholder in `text` with the matching value
/// from `inputs`. Unknown names are left untouched.
pub fn substitute(text: &str, inputs: &HashMap<String, String>) -> String {
    let re = regex::Regex::new(r"\{([A-Za-z0-9_.-]+)\}").unwrap();
    re.replace_all(text, |caps: &regex::Captures| {
        let name = &caps[1];
        inputs
            .get(name)
            .cloned()
            .unwrap_or_else(|| format!("{{{}}}", name))
    })
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_substitute_single_placeholder() {
        let m = inputs(&[("username", "alice")]);
        assert_eq!(substitute("hello {username}", &m), "hello alice");
    }

    #[test]
    fn test_substitute_repeated_and_multiple() {
        let m = inputs(&[("a", "1"), ("b", "2")]);
        assert_eq!(substitute("{a}{b}{a}", &m), "121");
        assert_eq!(substitute("{a} and {b}", &m), "1 and 2");
    }

    #[test]
    fn test_unknown_placeholder_left_verbatim() {
        let m = inputs(&[("a", "1")]);
        assert_eq!(substitute("{a} {missing}", &m), "1 {missing}");
    }

    #[test]
    fn test_hyphenated_names_substitute() {
        let m = inputs(&[("order-id", "4711")]);
        assert_eq!(substitute("PO {order-id}", &m), "PO 4711");
    }

    #[test]
    fn test_malformed_braces_left_verbatim() {
        let m = inputs(&[("a", "1")]);
        assert_eq!(substitute("{a {a} }b{", &m), "{a 1 }b{");
        assert_eq!(substitute("{}", &m), "{}");
    }

    #[test]
    fn test_substitution_is_idempotent_when_covered() {
        let m = inputs(&[("user", "bob"), ("pass", "secret")]);
        let once = substitute("{user}:{pass}", &m);
        assert_eq!(substitute(&once, &m), once);
    }
}
