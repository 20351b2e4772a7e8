//! Mixed-script tokenization for relevance scoring and content dedup.
//!
//! Space-delimited scripts tokenize as lower-cased alphanumeric runs.
//! Scripts without word spacing (CJK ideographs, kana, hangul) emit
//! overlapping character bigrams, the usual trick for segmenting them
//! without a dictionary. Tokens of a single character are discarded.

use std::collections::HashSet;

/// Tokenize text into lower-cased terms.
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    let mut tokens = Vec::new();
    let mut word = String::new();
    let mut cjk_run: Vec<char> = Vec::new();

    for c in lowered.chars() {
        if is_cjk(c) {
            flush_word(&mut word, &mut tokens);
            cjk_run.push(c);
        } else if c.is_alphanumeric() {
            flush_cjk(&mut cjk_run, &mut tokens);
            word.push(c);
        } else {
            flush_word(&mut word, &mut tokens);
            flush_cjk(&mut cjk_run, &mut tokens);
        }
    }
    flush_word(&mut word, &mut tokens);
    flush_cjk(&mut cjk_run, &mut tokens);

    tokens
}

/// Emit a completed alphanumeric run, dropping single-character tokens.
fn flush_word(word: &mut String, tokens: &mut Vec<String>) {
    if word.chars().count() > 1 {
        tokens.push(std::mem::take(word));
    } else {
        word.clear();
    }
}

/// Emit a completed CJK run as overlapping bigrams. A run of one
/// character yields nothing, matching the single-character rule.
fn flush_cjk(run: &mut Vec<char>, tokens: &mut Vec<String>) {
    for pair in run.windows(2) {
        tokens.push(pair.iter().collect());
    }
    run.clear();
}

/// Tokenize into a set, for Jaccard comparison.
pub fn token_set(text: &str) -> HashSet<String> {
    tokenize(text).into_iter().collect()
}

/// Token stream for relevance scoring: title counted twice, then snippet.
pub fn doc_tokens(title: &str, snippet: &str) -> Vec<String> {
    let title_tokens = tokenize(title);
    let mut tokens = Vec::with_capacity(title_tokens.len() * 2);
    tokens.extend(title_tokens.iter().cloned());
    tokens.extend(title_tokens);
    tokens.extend(tokenize(snippet));
    tokens
}

/// Characters from scripts written without word spacing.
fn is_cjk(c: char) -> bool {
    matches!(c,
        '\u{3040}'..='\u{30FF}'   // hiragana, katakana
        | '\u{3400}'..='\u{4DBF}' // CJK extension A
        | '\u{4E00}'..='\u{9FFF}' // CJK unified ideographs
        | '\u{F900}'..='\u{FAFF}' // CJK compatibility
        | '\u{AC00}'..='\u{D7AF}' // hangul syllables
    )
}
