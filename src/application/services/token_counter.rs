use std::sync::LazyLock;
use tiktoken_rs::CoreBPE;

static TOKENIZER: LazyLock<CoreBPE> = LazyLock::new(|| {
    tiktoken_rs::cl100k_base().expect("Failed to initialize cl100k_base tokenizer")
});

/// cl100k_base token count, the encoding shared by most hosted chat models.
pub fn count_tokens(text: &str) -> usize {
    TOKENIZER.encode_with_special_tokens(text).len()
}

/// Longest prefix of `text`, cut on a char boundary, whose token count is at
/// most `allowance`. Binary search over char boundaries; the result always
/// fits but can be a few chars short of optimal since BPE counts are not
/// strictly monotonic in prefix length.
pub fn fit_token_prefix(text: &str, allowance: usize) -> &str {
    if count_tokens(text) <= allowance {
        return text;
    }

    let boundaries: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
    let mut low = 0;
    let mut high = boundaries.len();
    while low + 1 < high {
        let mid = (low + high) / 2;
        if count_tokens(&text[..boundaries[mid]]) <= allowance {
            low = mid;
        } else {
            high = mid;
        }
    }
    &text[..boundaries[low]]
}
