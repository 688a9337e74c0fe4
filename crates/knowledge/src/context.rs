//! Context formatting: retrieved chunks into a bounded prompt block.

use crate::types::{RetrievedChunk, SourceRef};

/// Separator between context blocks.
const BLOCK_SEPARATOR: &str = "\n---\n";

/// Maximum snippet length in characters for source citations.
const SNIPPET_CHARS: usize = 300;

/// Format retrieved chunks into a prompt context string plus the
/// citation list.
///
/// Each chunk becomes a `[SOURCE: <path>]` block; blocks are joined
/// with `---` separators and accumulated in retrieval order until
/// adding the next block (separator included) would push the context
/// past `max_chars`. The first block that does not fit ends
/// accumulation: later, smaller chunks are not back-filled, so the
/// context is always a prefix of the ranked results.
///
/// The citation list is built from every non-empty chunk, including the
/// ones the character budget excluded from the context.
pub fn format_context(chunks: &[RetrievedChunk], max_chars: usize) -> (String, Vec<SourceRef>) {
    let mut blocks: Vec<String> = Vec::new();
    let mut sources: Vec<SourceRef> = Vec::new();
    let mut used = 0usize;
    let mut budget_exhausted = false;

    for chunk in chunks {
        let text = chunk.text.trim();
        if text.is_empty() {
            continue;
        }

        sources.push(SourceRef {
            source: chunk.source.clone(),
            snippet: make_snippet(text),
        });

        if budget_exhausted {
            continue;
        }

        let block = format!("[SOURCE: {}]\n{}\n", chunk.source, text);
        let cost = if blocks.is_empty() {
            block.len()
        } else {
            BLOCK_SEPARATOR.len() + block.len()
        };

        if used + cost > max_chars {
            budget_exhausted = true;
            continue;
        }

        used += cost;
        blocks.push(block);
    }

    (blocks.join(BLOCK_SEPARATOR), sources)
}

/// Collapse a chunk to a single-line snippet of at most
/// [`SNIPPET_CHARS`] characters, with a `...` marker when truncated.
fn make_snippet(text: &str) -> String {
    let flat = text.replace('\n', " ");
    if flat.chars().count() > SNIPPET_CHARS {
        let truncated: String = flat.chars().take(SNIPPET_CHARS).collect();
        format!("{}...", truncated)
    } else {
        flat
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(source: &str, text: &str) -> RetrievedChunk {
        RetrievedChunk {
            text: text.to_string(),
            source: source.to_string(),
            distance: 0.1,
        }
    }

    #[test]
    fn test_blocks_are_joined_with_separator() {
        let chunks = vec![chunk("a.rs", "alpha"), chunk("b.rs", "beta")];
        let (context, sources) = format_context(&chunks, 8000);

        assert_eq!(context, "[SOURCE: a.rs]\nalpha\n\n---\n[SOURCE: b.rs]\nbeta\n");
        assert_eq!(sources.len(), 2);
        assert_eq!(sources[0].source, "a.rs");
        assert_eq!(sources[0].snippet, "alpha");
    }

    #[test]
    fn test_context_never_exceeds_budget() {
        let chunks = vec![
            chunk("a.txt", &"x".repeat(50)),
            chunk("b.txt", &"y".repeat(50)),
            chunk("c.txt", &"z".repeat(50)),
        ];
        let max = 80;
        let (context, sources) = format_context(&chunks, max);

        assert!(context.len() <= max);
        assert!(context.contains("[SOURCE: a.txt]"));
        assert!(!context.contains("[SOURCE: b.txt]"));
        // Citations still cover every retrieved chunk.
        assert_eq!(sources.len(), 3);
    }

    #[test]
    fn test_no_backfill_after_first_overflow() {
        // The second chunk overflows; the third would fit but the
        // context must stay a prefix of the ranked results.
        let chunks = vec![
            chunk("a.txt", &"a".repeat(30)),
            chunk("b.txt", &"b".repeat(500)),
            chunk("c.txt", "tiny"),
        ];
        let (context, _) = format_context(&chunks, 100);

        assert!(context.contains("[SOURCE: a.txt]"));
        assert!(!context.contains("[SOURCE: b.txt]"));
        assert!(!context.contains("[SOURCE: c.txt]"));
    }

    #[test]
    fn test_whitespace_only_chunks_are_skipped() {
        let chunks = vec![chunk("blank.txt", "  \n\t "), chunk("a.rs", "content")];
        let (context, sources) = format_context(&chunks, 8000);

        assert!(!context.contains("blank.txt"));
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].source, "a.rs");
    }

    #[test]
    fn test_empty_retrieval_yields_empty_context() {
        let (context, sources) = format_context(&[], 8000);
        assert!(context.is_empty());
        assert!(sources.is_empty());
    }

    #[test]
    fn test_snippet_is_single_line_and_truncated() {
        let long = format!("line one\nline two\n{}", "s".repeat(400));
        let chunks = vec![chunk("doc.pdf", &long)];
        let (_, sources) = format_context(&chunks, 8000);

        let snippet = &sources[0].snippet;
        assert!(!snippet.contains('\n'));
        assert!(snippet.ends_with("..."));
        assert_eq!(snippet.chars().count(), 303);
    }
}
