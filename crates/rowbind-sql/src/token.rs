use rowbind_core::{Error, Result};

/// Scans `text` for `open`…`close` tokens, replacing each token body through
/// `handler`. A backslash before the opening marker escapes it literally.
/// An opened token with no closing marker is a template error.
pub fn parse_tokens(
    text: &str,
    open: &str,
    close: &str,
    handler: &mut dyn FnMut(&str) -> Result<String>,
) -> Result<String> {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(start) = rest.find(open) {
        if start > 0 && rest.as_bytes()[start - 1] == b'\\' {
            // escaped opening marker: emit it literally, drop the backslash
            out.push_str(&rest[..start - 1]);
            out.push_str(open);
            rest = &rest[start + open.len()..];
            continue;
        }
        out.push_str(&rest[..start]);
        let after_open = &rest[start + open.len()..];
        let Some(end) = after_open.find(close) else {
            return Err(Error::template(format!(
                "unterminated `{open}` token in: {text}"
            )));
        };
        out.push_str(&handler(&after_open[..end])?);
        rest = &after_open[end + close.len()..];
    }
    out.push_str(rest);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upper(text: &str) -> String {
        parse_tokens(text, "${", "}", &mut |body| Ok(body.to_uppercase())).unwrap()
    }

    #[test]
    fn replaces_each_token() {
        assert_eq!(upper("select ${a} from ${b}"), "select A from B");
    }

    #[test]
    fn escaped_open_is_literal() {
        assert_eq!(upper(r"select \${a} from t"), "select ${a} from t");
    }

    #[test]
    fn unterminated_token_is_error() {
        let err =
            parse_tokens("select ${a from t", "${", "}", &mut |b| Ok(b.into())).unwrap_err();
        assert!(err.is_template());
    }
}
