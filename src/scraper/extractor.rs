use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

/// The manifest extension everything in this pipeline hunts for.
pub const MANIFEST_EXT: &str = ".m3u8";

// first bracketed list after a `sources` key; non-greedy so nested player
// config after the list doesn't get swallowed
static SOURCES_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)sources\s*:\s*\[([^\]]+)\]").expect("sources pattern should compile")
});

static MANIFEST_FILE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"file\s*:\s*["']([^"']+\.m3u8[^"']*)["']"#)
        .expect("manifest file pattern should compile")
});

static ANY_FILE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"file\s*:\s*["']([^"']+)["']"#).expect("file pattern should compile")
});

static LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"label\s*:\s*["']([^"']+)["']"#).expect("label pattern should compile")
});

// a manifest URL anywhere in the text, greedy up to the next quote or
// whitespace boundary
static MANIFEST_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"https?://[^"'\s]+\.m3u8[^"'\s]*"#).expect("manifest url pattern should compile")
});

// last-resort variant that tolerates quote characters glued onto or embedded
// in the URL; any that end up on the match boundary get trimmed off
static MANIFEST_URL_LOOSE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"["']?https?://\S+?\.m3u8[^\s"',)}\]]*"#)
        .expect("loose manifest url pattern should compile")
});

/// One entry of a player `sources` block: the stream URL plus the quality
/// label when the block carries one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceEntry {
    pub file: String,
    pub label: Option<String>,
}

/// Extracts every manifest URL from one unpacked script, ordered and
/// deduplicated.
///
/// Three layered passes: `file:` values inside the first `sources` block,
/// then a generic URL sweep over the whole text (always appended after the
/// structured hits), and only when both come up empty a looser sweep that
/// trims stray quotes off the match.
pub fn extract_links(unpacked: &str) -> Vec<String> {
    let mut links = Vec::new();
    let mut seen = HashSet::new();

    if let Some(block) = SOURCES_BLOCK.captures(unpacked) {
        for caps in MANIFEST_FILE.captures_iter(&block[1]) {
            push_unique(&mut links, &mut seen, caps[1].to_string());
        }
    }

    for found in MANIFEST_URL.find_iter(unpacked) {
        push_unique(&mut links, &mut seen, found.as_str().to_string());
    }

    if links.is_empty() {
        for found in MANIFEST_URL_LOOSE.find_iter(unpacked) {
            let trimmed = found.as_str().trim_matches(['"', '\'']);
            push_unique(&mut links, &mut seen, trimmed.to_string());
        }
    }

    links
}

/// Structured variant of the extraction: the entries of the first `sources`
/// block with quality labels attached. Pairing is positional and only done
/// when `file` and `label` occurrences line up one to one; otherwise the
/// entries come back unlabeled.
pub fn extract_sources(unpacked: &str) -> Vec<SourceEntry> {
    let Some(block) = SOURCES_BLOCK.captures(unpacked) else {
        return Vec::new();
    };

    let files: Vec<String> = ANY_FILE
        .captures_iter(&block[1])
        .map(|caps| caps[1].to_string())
        .collect();
    let labels: Vec<String> = LABEL
        .captures_iter(&block[1])
        .map(|caps| caps[1].to_string())
        .collect();

    let paired = files.len() == labels.len();

    files
        .into_iter()
        .enumerate()
        .filter(|(_, file)| file.contains(MANIFEST_EXT))
        .map(|(i, file)| SourceEntry {
            label: paired.then(|| labels[i].clone()),
            file,
        })
        .collect()
}

fn push_unique(links: &mut Vec<String>, seen: &mut HashSet<String>, link: String) {
    if seen.insert(link.clone()) {
        links.push(link);
    }
}
