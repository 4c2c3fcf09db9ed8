//! Query-string helpers shared by the consent URL, the token request body,
//! and the approval page title.

use std::collections::BTreeMap;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};

/// Bytes left as-is: letters, digits and `-_.!~*'()`.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Join key/value pairs into `k1=v1&k2=v2`, percent-encoding each value.
///
/// Keys are written as-is; every key used here is a plain identifier.
pub fn to_query<I, K, V>(pairs: I) -> String
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    pairs
        .into_iter()
        .map(|(k, v)| {
            let value = utf8_percent_encode(v.as_ref(), COMPONENT);
            format!("{}={}", k.as_ref(), value)
        })
        .collect::<Vec<_>>()
        .join("&")
}

/// Parse `k1=v1&k2=v2` into a map, percent-decoding each value.
/// A `+` is kept literally.
///
/// Segments that do not split into exactly one key and one value on `=`
/// are skipped.
pub fn from_query(query: &str) -> BTreeMap<String, String> {
    let mut out = BTreeMap::new();
    for segment in query.split('&') {
        let mut parts = segment.split('=');
        let (Some(key), Some(value), None) = (parts.next(), parts.next(), parts.next()) else {
            continue;
        };
        let value = percent_decode_str(value).decode_utf8_lossy();
        out.insert(key.to_string(), value.into_owned());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_reserved_characters() {
        let q = to_query([("redirect_uri", "urn:ietf:wg:oauth:2.0:oob")]);
        assert_eq!(q, "redirect_uri=urn%3Aietf%3Awg%3Aoauth%3A2.0%3Aoob");
    }

    #[test]
    fn joins_in_given_order() {
        let q = to_query([("b", "2"), ("a", "1")]);
        assert_eq!(q, "b=2&a=1");
    }

    #[test]
    fn empty_pairs_give_empty_string() {
        let pairs: [(&str, &str); 0] = [];
        assert_eq!(to_query(pairs), "");
    }

    #[test]
    fn round_trips_through_parse() {
        let dicts: Vec<Vec<(&str, &str)>> = vec![
            vec![("code", "4/abc123"), ("state", "NotUsedInThisExample")],
            vec![("scope", "https://www.googleapis.com/auth/userinfo.profile")],
            vec![("msg", "hello world"), ("sym", "a+b/c?d:e~f")],
            vec![("unicode", "héllo ✓")],
        ];
        for dict in dicts {
            let parsed = from_query(&to_query(dict.iter().copied()));
            let expected: BTreeMap<String, String> = dict
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect();
            assert_eq!(parsed, expected);
            assert_eq!(
                to_query(&parsed),
                to_query(expected.iter()),
                "re-encoding must be stable"
            );
        }
    }

    #[test]
    fn skips_malformed_segments() {
        let parsed = from_query("code=abc&novalue&a=b=c&=&state=xyz");
        assert_eq!(parsed.get("code").map(String::as_str), Some("abc"));
        assert_eq!(parsed.get("state").map(String::as_str), Some("xyz"));
        assert!(!parsed.contains_key("novalue"));
        assert!(!parsed.contains_key("a"));
        assert_eq!(parsed.len(), 3);
    }

    #[test]
    fn decodes_percent_escapes() {
        let parsed = from_query("error=access%5Fdenied");
        assert_eq!(parsed["error"], "access_denied");
    }

    #[test]
    fn plus_stays_literal() {
        let parsed = from_query("state=x&code=4/abc+def");
        assert_eq!(parsed["code"], "4/abc+def");
    }

    #[test]
    fn space_and_plus_encode_distinctly() {
        assert_eq!(to_query([("msg", "hello world")]), "msg=hello%20world");
        assert_eq!(to_query([("code", "a+b")]), "code=a%2Bb");
    }

    #[test]
    fn unreserved_marks_are_not_encoded() {
        assert_eq!(to_query([("v", "a-b_c.d!e~f*g'h(i)")]), "v=a-b_c.d!e~f*g'h(i)");
    }

    #[test]
    fn empty_query_is_empty_map() {
        assert!(from_query("").is_empty());
    }
}
