use super::*;

/// Monospace measure: every char is 10px wide.
fn mono(s: &str) -> f64 {
    s.chars().count() as f64 * 10.0
}

#[test]
fn wraps_greedily_on_word_boundaries() {
    let lines = wrap_words("the quick brown fox jumps over", 110.0, mono);
    assert_eq!(lines, vec!["the quick", "brown fox", "jumps over"]);
}

#[test]
fn never_splits_a_word_and_flushes_the_tail() {
    let text = "a supercalifragilistic word";
    let lines = wrap_words(text, 60.0, mono);
    assert_eq!(lines, vec!["a", "supercalifragilistic", "word"]);

    let rejoined: Vec<&str> = lines.iter().flat_map(|l| l.split(' ')).collect();
    assert_eq!(rejoined, text.split_whitespace().collect::<Vec<_>>());
}

#[test]
fn lines_fit_unless_a_single_word_is_too_wide() {
    let text = "lorem ipsum dolor sit amet consectetur adipiscing elit sed do eiusmod tempor";
    for max in [40.0, 80.0, 120.0, 250.0] {
        for line in wrap_words(text, max, mono) {
            assert!(mono(&line) <= max || !line.contains(' '), "{line:?} > {max}");
        }
    }
}

#[test]
fn empty_and_whitespace_only_produce_no_lines() {
    assert!(wrap_words("", 100.0, mono).is_empty());
    assert!(wrap_words("   \n\t ", 100.0, mono).is_empty());
}

#[test]
fn collapses_runs_of_whitespace() {
    assert_eq!(wrap_words("a   b\n c", 1000.0, mono), vec!["a b c"]);
}

#[test]
fn font_registration_rejects_garbage_bytes() {
    assert!(TextLayoutEngine::from_font_bytes(b"not a font".to_vec()).is_err());
}
