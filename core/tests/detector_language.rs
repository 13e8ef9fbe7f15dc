//! Language detection after training on distinct-script samples, and
//! determinism independent of load order.

use spellwarp_core::detector::Detector;
use spellwarp_core::letter::{to_letters_str, to_lower};

fn letters(s: &str) -> Vec<char> {
    to_lower(&to_letters_str(s))
}

#[test]
fn detects_trained_languages_by_distinct_scripts() {
    let detector = Detector::new(200);
    detector.add_language(
        "english",
        &letters("the quick brown fox jumps over the lazy dog hello world"),
    );
    detector.add_language("russian", &letters("привет как дела хорошо спасибо пока"));

    assert_eq!(detector.detect(&letters("hello")), Some("english".to_string()));
    assert_eq!(detector.detect(&letters("привет")), Some("russian".to_string()));
}

#[test]
fn detection_is_independent_of_load_order() {
    let forward = Detector::new(100);
    forward.add_language("a", &letters("aaaa bbbb cccc"));
    forward.add_language("b", &letters("dddd eeee ffff"));

    let backward = Detector::new(100);
    backward.add_language("b", &letters("dddd eeee ffff"));
    backward.add_language("a", &letters("aaaa bbbb cccc"));

    assert_eq!(forward.detect(&letters("aaaa")), Some("a".to_string()));
    assert_eq!(backward.detect(&letters("aaaa")), Some("a".to_string()));
}
