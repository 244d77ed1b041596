use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::scraper::unbaser::Unbaser;

/// Anything shorter than this after a plain decode is almost certainly a
/// broken payload, so the chain falls through to the next strategy.
const MIN_PLAUSIBLE_LEN: usize = 100;

#[derive(Debug, thiserror::Error)]
pub enum UnpackError {
    #[error("could not make sense of packer arguments")]
    MalformedArguments,
    #[error("symbol table count mismatch ({expected} != {actual})")]
    SymtabMismatch { expected: usize, actual: usize },
    #[error("unsupported radix {0}")]
    UnsupportedRadix(usize),
}

/// Reverses one eval-packed script block back into plain script text.
///
/// Strategies are tried in order, first success wins:
/// 1. plain structural decode, rejected when implausibly short
/// 2. the same decode plus a cosmetic reformat pass
/// 3. a lenient decode that shrugs off a symbol-table count mismatch
///
/// Returns `None` when every strategy fails; the caller is expected to log
/// and move on to the next script rather than abort.
pub fn unpack(packed: &str) -> Option<String> {
    let strategies: [fn(&str) -> Option<String>; 3] =
        [unpack_plain, unpack_formatted, unpack_lenient];

    strategies.iter().find_map(|strategy| strategy(packed))
}

fn unpack_plain(packed: &str) -> Option<String> {
    match decode(packed, true) {
        Ok(code) if code.len() >= MIN_PLAUSIBLE_LEN => Some(code),
        Ok(code) => {
            debug!(
                "plain decode produced only {} chars, falling through",
                code.len()
            );
            None
        }
        Err(e) => {
            debug!("plain decode failed: {e}");
            None
        }
    }
}

fn unpack_formatted(packed: &str) -> Option<String> {
    match decode(packed, true) {
        Ok(code) if !code.is_empty() => Some(reformat(&code)),
        Ok(_) => None,
        Err(e) => {
            debug!("formatted decode failed: {e}");
            None
        }
    }
}

fn unpack_lenient(packed: &str) -> Option<String> {
    match decode(packed, false) {
        Ok(code) if !code.is_empty() => Some(code),
        Ok(_) => None,
        Err(e) => {
            debug!("lenient decode failed: {e}");
            None
        }
    }
}

/// The structural p.a.c.k.e.r reversal: pull the call arguments apart,
/// decode every placeholder word through the symbol table, then resolve any
/// string-array indirection some packer variants layer on top.
fn decode(packed: &str, strict: bool) -> Result<String, UnpackError> {
    let args = PackerArgs::parse(packed)?;

    if strict && args.count != args.symtab.len() {
        return Err(UnpackError::SymtabMismatch {
            expected: args.count,
            actual: args.symtab.len(),
        });
    }

    let unbaser = Unbaser::new(args.radix)?;
    let decoded = decode_words(&args.payload, &args.symtab, &unbaser);

    Ok(resolve_string_arrays(&decoded))
}

struct PackerArgs {
    payload: String,
    symtab: Vec<String>,
    radix: usize,
    count: usize,
}

impl PackerArgs {
    /// Matches the packer call's trailing argument list. Two shapes occur in
    /// the wild: the full form with the extra `, 0, {})` parameters and a
    /// truncated form that stops at the `.split('|')`.
    fn parse(packed: &str) -> Result<Self, UnpackError> {
        static ARG_SHAPES: LazyLock<[Regex; 2]> = LazyLock::new(|| {
            [
                Regex::new(
                    r"}\('(.*)', *(\d+|\[\]), *(\d+), *'(.*)'\.split\('\|'\), *(\d+), *(.*)\)\)",
                )
                .expect("full packer argument pattern should compile"),
                Regex::new(r"}\('(.*)', *(\d+|\[\]), *(\d+), *'(.*)'\.split\('\|'\)")
                    .expect("truncated packer argument pattern should compile"),
            ]
        });

        for shape in ARG_SHAPES.iter() {
            let Some(caps) = shape.captures(packed) else {
                continue;
            };

            let radix = match &caps[2] {
                // some packers pass [] for the radix, which behaves as 62
                "[]" => 62,
                digits => digits
                    .parse()
                    .map_err(|_| UnpackError::MalformedArguments)?,
            };
            let count = caps[3]
                .parse()
                .map_err(|_| UnpackError::MalformedArguments)?;

            return Ok(Self {
                payload: caps[1].to_string(),
                symtab: caps[4].split('|').map(String::from).collect(),
                radix,
                count,
            });
        }

        Err(UnpackError::MalformedArguments)
    }
}

/// Replaces every placeholder word in the payload with its symbol-table
/// entry. Words that don't decode, point past the table, or map to an empty
/// entry are left alone.
fn decode_words(payload: &str, symtab: &[String], unbaser: &Unbaser) -> String {
    static WORD: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\b\w+\b").expect("word pattern should compile"));

    let cleaned = payload.replace(r"\\", r"\").replace(r"\'", "'");

    WORD.replace_all(&cleaned, |caps: &regex::Captures| {
        let word = &caps[0];
        match unbaser.unbase(word) {
            Some(index) if index < symtab.len() && !symtab[index].is_empty() => {
                symtab[index].clone()
            }
            _ => word.to_string(),
        }
    })
    .into_owned()
}

/// Some packer variants keep their strings in a lookup array
/// (`var _0x1234=["a","b"];` referenced as `_0x1234[0]`). Inlines the values
/// and drops the declaration.
fn resolve_string_arrays(code: &str) -> String {
    static STRING_ARRAY: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r#"var *(_\w+)\=\["(.*?)"\];"#).expect("string array pattern should compile")
    });

    let Some(caps) = STRING_ARRAY.captures(code) else {
        return code.to_string();
    };

    let var_name = &caps[1];
    let values: Vec<&str> = caps[2].split("\",\"").collect();

    // inlining shrinks the text, so split the declaration off first instead
    // of slicing at its pre-replacement offset; references ahead of the
    // declaration are dead code and go with it
    let declaration_end = caps.get(0).map_or(0, |m| m.end());
    let mut resolved = code[declaration_end..].to_string();
    for (index, value) in values.iter().enumerate() {
        resolved = resolved.replace(&format!("{var_name}[{index}]"), &format!("\"{value}\""));
    }

    resolved
}

/// Cosmetic only: spreads statements and blocks onto their own lines and
/// re-indents by brace depth so the decoded script is readable in logs.
fn reformat(code: &str) -> String {
    let spread = code
        .replace(';', ";\n")
        .replace('{', "\n{\n")
        .replace('}', "\n}\n")
        .replace("\n;\n", ";\n")
        .replace("\n\n", "\n");

    let mut depth = 0usize;
    let mut formatted = String::with_capacity(spread.len());
    for line in spread.lines() {
        if line.contains('}') {
            depth = depth.saturating_sub(1);
        }
        for _ in 0..depth {
            formatted.push('\t');
        }
        formatted.push_str(line);
        formatted.push('\n');
        if line.contains('{') {
            depth += 1;
        }
    }

    formatted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_simple_payload() {
        let packed = "eval(function(p,a,c,k,e,r){e=String;if(!''.replace(/^/,String)){while(c--)r[c]=k[c]||c;k=[function(e){return r[e]}];e=function(){return'\\\\w+'};c=1};while(c--)if(k[c])p=p.replace(new RegExp('\\\\b'+e(c)+'\\\\b','g'),k[c]);return p}('0 2=1',62,3,'var||a'.split('|'),0,{}))";
        // too short for the plain strategy, so the formatted one answers
        assert_eq!(unpack(packed), Some("var a=1\n".to_string()));
    }

    #[test]
    fn decodes_base_12_payload() {
        let packed = "eval(function(p,a,c,k,e,d){e=function(c){return c.toString(36)};if(!''.replace(/^/,String)){while(c--){d[c.toString(a)]=k[c]||c.toString(a)}k=[function(e){return d[e]}];e=function(){return'\\w+'};c=1};while(c--){if(k[c]){p=p.replace(Regex('\\b'+e(c)+'\\b'),'g'),k[c])}}return p}('2 0=\"4 3!\";2 1=0.5(/b/6);a.9(\"8\").7=1;',12,12,'str|n|var|W3Schools|Visit|search|i|innerHTML|demo|getElementById|document|w3Schools'.split('|'),0,{}))";
        let expected = "var str=\"Visit W3Schools!\";var n=str.search(/w3Schools/i);document.getElementById(\"demo\").innerHTML=n;";
        assert_eq!(decode(packed, true).unwrap(), expected);
    }

    #[test]
    fn empty_radix_brackets_mean_base_62() {
        let packed = "eval(function(p,a,c,k,e,r){e=function(c){return c.toString(36)};if('0'.replace(0,e)==0){while(c--)r[e(c)]=k[c];k=[function(e){return r[e]||e}];e=function(){return'[0-9ab]'};c=1};while(c--)if(k[c])p=p.replace(new RegExp('\\b'+e(c)+'\\b','g'),k[c]);return p}('$(5).a(6(){ $('.8').0(1); $('.b').0(4); $('.9').0(2); $('.7').0(3)})',[],12,'html|52136|555|65103|8088|document|function|r542c|r8ce6|rb0de|ready|rfab0'.split('|'),0,{}))";
        let expected = "$(document).ready(function(){ $('.r8ce6').html(52136); $('.rfab0').html(8088); $('.rb0de').html(555); $('.r542c').html(65103)})";
        assert_eq!(decode(packed, true).unwrap(), expected);
    }

    #[test]
    fn short_decode_falls_through_to_formatted_strategy() {
        let packed = "eval(function(p,a,c,k,e,d){return p}('0 1=2;',10,3,'var|x|9'.split('|'),0,{}))";
        let unpacked = unpack(packed).expect("chain should produce output");
        // the formatted strategy's newline proves the short plain decode was
        // rejected rather than passed along
        assert_eq!(unpacked, "var x=9;\n");
    }

    #[test]
    fn symtab_mismatch_fails_strict_but_not_lenient() {
        let packed =
            "eval(function(p,a,c,k,e,d){return p}('0 1=2;',10,5,'var|x|9'.split('|'),0,{}))";
        assert!(matches!(
            decode(packed, true),
            Err(UnpackError::SymtabMismatch {
                expected: 5,
                actual: 3
            })
        ));
        assert_eq!(decode(packed, false).unwrap(), "var x=9;");
        // the full chain still answers through the lenient strategy
        assert_eq!(unpack(packed), Some("var x=9;".to_string()));
    }

    #[test]
    fn garbage_fails_every_strategy() {
        assert_eq!(unpack("eval(function(p,a,c,k,e,d){nothing here"), None);
        assert_eq!(unpack(""), None);
    }

    #[test]
    fn string_arrays_are_inlined() {
        let code = "var _0xab12=[\"hello\",\"world\"];console.log(_0xab12[0]+\" \"+_0xab12[1]);";
        assert_eq!(
            resolve_string_arrays(code),
            "console.log(\"hello\"+\" \"+\"world\");"
        );
    }

    #[test]
    fn array_references_before_the_declaration_do_not_blow_up() {
        // the lookup array can be declared after its first use; everything
        // ahead of the declaration is dropped along with it
        let code = "a=_0xab[0];b=_0xab[1];var _0xab=[\"hello\",\"world\"];";
        assert_eq!(resolve_string_arrays(code), "");

        // and through the full chain it falls out as a clean miss
        let packed = "eval(function(p,a,c,k,e,d){return p}('a=_0xab[0];b=_0xab[1];var _0xab=[\"hello\",\"world\"];',10,1,'0'.split('|'),0,{}))";
        assert_eq!(unpack(packed), None);
    }

    #[test]
    fn reformat_spreads_and_indents() {
        let formatted = reformat("if(a){b();c()}d();");
        let expected = "if(a)\n{\n\tb();\n\tc()\n}\nd();\n";
        assert_eq!(formatted, expected);
    }
}
