use std::sync::LazyLock;

use regex::Regex;

// the fixed decoder signature all p.a.c.k.e.r variants share, spacing kept
// loose because minifiers disagree on it
static PACKED_HEAD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"eval[ ]*\([ ]*function[ ]*\([ ]*p[ ]*,[ ]*a[ ]*,[ ]*c[ ]*,[ ]*k[ ]*,[ ]*e[ ]*,")
        .expect("packed head pattern should compile")
});

/// Scans page text for every eval-packed script block, in order of
/// appearance. Each match runs from `eval(` through the balanced closing
/// parenthesis of the call. Matches never overlap; an unterminated call is
/// skipped. An empty vec just means the page carries no packed scripts.
pub fn find_packed_scripts(page: &str) -> Vec<&str> {
    let mut scripts = Vec::new();
    let mut cursor = 0;

    while let Some(head) = PACKED_HEAD.find(&page[cursor..]) {
        let start = cursor + head.start();
        match balanced_call_end(page, start) {
            Some(end) => {
                scripts.push(&page[start..end]);
                cursor = end;
            }
            None => cursor += head.end(),
        }
    }

    scripts
}

/// Finds the byte offset one past the parenthesis that closes the `eval(`
/// call starting at `start`. Quote-aware so parens inside the payload string
/// literals don't throw the depth count off; backslash escapes are honored.
fn balanced_call_end(text: &str, start: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut depth = 0i32;
    let mut quote: Option<u8> = None;

    let mut i = start + text[start..].find('(')?;
    while i < bytes.len() {
        let b = bytes[i];
        match quote {
            Some(q) => {
                if b == b'\\' {
                    i += 1;
                } else if b == q {
                    quote = None;
                }
            }
            None => match b {
                b'\'' | b'"' => quote = Some(b),
                b'(' => depth += 1,
                b')' => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(i + 1);
                    }
                    if depth < 0 {
                        return None;
                    }
                }
                _ => {}
            },
        }
        i += 1;
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const PACKED: &str = "eval(function(p,a,c,k,e,d){while(c--)if(k[c])p=p.replace(new RegExp('\\\\b'+c.toString(a)+'\\\\b','g'),k[c]);return p}('0 1',10,2,'var|x'.split('|'),0,{}))";

    #[test]
    fn finds_single_block() {
        let page = format!("<html><script>{PACKED}</script></html>");
        let found = find_packed_scripts(&page);
        assert_eq!(found, vec![PACKED]);
    }

    #[test]
    fn finds_multiple_blocks_in_order() {
        let page = format!("a {PACKED} b {PACKED} c");
        let found = find_packed_scripts(&page);
        assert_eq!(found.len(), 2);
        assert!(found.iter().all(|s| *s == PACKED));
    }

    #[test]
    fn parens_inside_payload_strings_do_not_truncate() {
        let packed =
            "eval(function(p,a,c,k,e,d){return p}('alert(\"(hi)\")',10,1,'x'.split('|'),0,{}))";
        let found = find_packed_scripts(packed);
        assert_eq!(found, vec![packed]);
    }

    #[test]
    fn unterminated_call_is_skipped() {
        let page = "eval(function(p,a,c,k,e,d){broken";
        assert!(find_packed_scripts(page).is_empty());
    }

    #[test]
    fn plain_pages_yield_nothing() {
        assert!(find_packed_scripts("<html><body>no scripts</body></html>").is_empty());
        assert!(find_packed_scripts("").is_empty());
    }
}
