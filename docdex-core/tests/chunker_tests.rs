//! Property tests for token-window chunking.

use proptest::prelude::*;

use docdex_core::{DocumentEntry, TokenChunker};

fn entry(text: String) -> DocumentEntry {
    DocumentEntry::new("Doc", "doc.html", text)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn windows_tile_the_token_sequence(words in prop::collection::vec("[a-z]{1,8}", 1..120)) {
        let max_tokens = 16;
        let overlap = 4;
        let stride = max_tokens - overlap;
        let chunker = TokenChunker::new(max_tokens, overlap).unwrap();

        let text = words.join(" ");
        let total = chunker.count_tokens(&text);
        let chunks = chunker.chunk(&entry(text)).unwrap();

        prop_assert!(!chunks.is_empty());
        for (i, chunk) in chunks.iter().enumerate() {
            let (start, end) = chunk.token_span;
            prop_assert_eq!(start, i * stride);
            prop_assert_eq!(end, usize::min(start + max_tokens, total));
            prop_assert!(end > start);
            prop_assert!(end - start <= max_tokens);
            prop_assert!(!chunk.text.is_empty());
        }
        prop_assert_eq!(chunks[chunks.len() - 1].token_span.1, total);
    }

    #[test]
    fn short_documents_round_trip_verbatim(words in prop::collection::vec("[a-z]{1,8}", 1..40)) {
        let chunker = TokenChunker::new(500, 50).unwrap();
        let text = words.join(" ");
        prop_assert!(chunker.count_tokens(&text) < 500);

        let chunks = chunker.chunk(&entry(text.clone())).unwrap();
        prop_assert_eq!(chunks.len(), 1);
        prop_assert_eq!(chunks[0].text.as_str(), text.as_str());
    }

    #[test]
    fn chunking_is_deterministic(words in prop::collection::vec("[a-z]{1,8}", 1..80)) {
        let chunker = TokenChunker::new(12, 3).unwrap();
        let doc = entry(words.join(" "));
        prop_assert_eq!(chunker.chunk(&doc).unwrap(), chunker.chunk(&doc).unwrap());
    }
}

#[test]
fn window_parameters_match_across_sizes() {
    // A few concrete size pairs, checked the same way the property test
    // checks the default pair.
    let text = "let mut view = UIView::new(); view.set_frame(frame); \
                view.add_subview(child); view.layout_if_needed();"
        .repeat(4);
    for (max_tokens, overlap) in [(8, 0), (8, 3), (16, 5), (5, 4)] {
        let chunker = TokenChunker::new(max_tokens, overlap).unwrap();
        let total = chunker.count_tokens(&text);
        let chunks = chunker
            .chunk(&DocumentEntry::new("Sizes", "sizes.html", text.clone()))
            .unwrap();
        let stride = max_tokens - overlap;
        for (i, chunk) in chunks.iter().enumerate() {
            let (start, end) = chunk.token_span;
            assert_eq!(start, i * stride, "start for ({max_tokens}, {overlap})");
            assert_eq!(
                end,
                usize::min(start + max_tokens, total),
                "end for ({max_tokens}, {overlap})"
            );
        }
        assert_eq!(chunks[chunks.len() - 1].token_span.1, total);
    }
}
