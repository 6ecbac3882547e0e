//! Property tests for sort key generation and reordering

use collkey_codec::{sample_root, Collator, CollError, Strength};
use collkey_format::constants::*;
use proptest::prelude::*;
use std::cmp::Ordering;
use std::sync::OnceLock;

fn shared_collator() -> &'static Collator {
    static COLLATOR: OnceLock<Collator> = OnceLock::new();
    COLLATOR.get_or_init(|| Collator::new(sample_root().unwrap()))
}

/// Characters whose collation order matches their code point order and
/// whose weights are all tertiary-common.
const ORDERED_ALPHABET: &str =
    " -0123456789abcdefghijklmnopqrstuvwxyz\u{3b1}\u{3b2}\u{3b3}\u{3b4}\u{3c9}\u{430}\u{431}\u{44f}\u{5d0}\u{5ea}";

const MARKS: [char; 5] = ['\u{300}', '\u{301}', '\u{302}', '\u{308}', '\u{30a}'];

fn ordered_string(max_len: usize) -> impl Strategy<Value = String> {
    let chars: Vec<char> = ORDERED_ALPHABET.chars().collect();
    prop::collection::vec(prop::sample::select(chars), 0..max_len)
        .prop_map(|cs| cs.into_iter().collect())
}

fn lowercase_word() -> impl Strategy<Value = Vec<char>> {
    prop::collection::vec(prop::char::range('a', 'z'), 0..8)
}

/// Uppercase some letters and attach marks to others.
fn decorate(word: &[char], flags: &[(bool, Option<usize>)]) -> String {
    let mut out = String::new();
    for (i, &c) in word.iter().enumerate() {
        let (upper, mark) = flags.get(i).copied().unwrap_or((false, None));
        out.push(if upper { c.to_ascii_uppercase() } else { c });
        if let Some(m) = mark {
            out.push(MARKS[m % MARKS.len()]);
        }
    }
    out
}

fn decorations() -> impl Strategy<Value = Vec<(bool, Option<usize>)>> {
    prop::collection::vec((any::<bool>(), prop::option::of(0usize..5)), 8)
}

/// Sample characters per group, lowest first.
fn group_samples(code: i32) -> [&'static str; 2] {
    match code {
        REORDER_CODE_PUNCTUATION => ["_", "%"],
        REORDER_CODE_DIGIT => ["0", "9"],
        SCRIPT_LATIN => ["a", "z"],
        SCRIPT_GREEK => ["\u{3b1}", "\u{3c9}"],
        SCRIPT_CYRILLIC => ["\u{430}", "\u{44f}"],
        SCRIPT_HEBREW => ["\u{5d0}", "\u{5ea}"],
        SCRIPT_HANGUL => ["\u{1100}", "\u{11c2}"],
        _ => ["\u{4e00}", "\u{9fa5}"],
    }
}

const REORDERABLE: [i32; 8] = [
    REORDER_CODE_PUNCTUATION,
    REORDER_CODE_DIGIT,
    SCRIPT_LATIN,
    SCRIPT_GREEK,
    SCRIPT_CYRILLIC,
    SCRIPT_HEBREW,
    SCRIPT_HANGUL,
    SCRIPT_HAN,
];

proptest! {
    #[test]
    fn test_order_preserved_at_every_strength(
        a in ordered_string(10),
        b in ordered_string(10),
    ) {
        let expected = a.chars().cmp(b.chars());
        for strength in [Strength::Primary, Strength::Tertiary, Strength::Identical] {
            let mut c = shared_collator().clone();
            c.set_strength(strength);
            prop_assert_eq!(c.compare(&a, &b).unwrap(), expected);
        }
    }

    #[test]
    fn test_weaker_levels_never_override_primary(
        a in lowercase_word(),
        b in lowercase_word(),
        da in decorations(),
        db in decorations(),
    ) {
        prop_assume!(a != b);
        let c = shared_collator();
        let (sa, sb) = (decorate(&a, &da), decorate(&b, &db));
        prop_assert_eq!(c.compare(&sa, &sb).unwrap(), a.cmp(&b));
    }

    #[test]
    fn test_case_and_marks_vanish_at_primary_strength(
        word in lowercase_word(),
        da in decorations(),
        db in decorations(),
    ) {
        let c = shared_collator();
        let (sa, sb) = (decorate(&word, &da), decorate(&word, &db));
        let mut primary = c.clone();
        primary.set_strength(Strength::Primary);
        prop_assert_eq!(primary.compare(&sa, &sb).unwrap(), Ordering::Equal);
    }

    #[test]
    fn test_reserved_bytes_only_at_structural_positions(s in ordered_string(24), da in decorations()) {
        let mut c = shared_collator().clone();
        let s = format!("{}{}", s, decorate(&['q', 'r'], &da));
        let key = c.sort_key(&s).unwrap();
        prop_assert_eq!(key.iter().filter(|&&b| b == TERMINATOR_BYTE).count(), 1);
        prop_assert_eq!(key.last(), Some(&TERMINATOR_BYTE));
        prop_assert_eq!(key.iter().filter(|&&b| b == LEVEL_SEPARATOR_BYTE).count(), 2);
        prop_assert!(!key.contains(&MERGE_SEPARATOR_BYTE));

        c.set_strength(Strength::Identical);
        let key = c.sort_key(&s).unwrap();
        prop_assert_eq!(key.iter().filter(|&&b| b == TERMINATOR_BYTE).count(), 1);
        prop_assert_eq!(key.iter().filter(|&&b| b == LEVEL_SEPARATOR_BYTE).count(), 4);
        prop_assert!(!key.contains(&MERGE_SEPARATOR_BYTE));
    }

    #[test]
    fn test_reordering_follows_requested_group_order(
        order in Just(REORDERABLE.to_vec()).prop_shuffle(),
        len in 1usize..=REORDERABLE.len(),
    ) {
        let codes = &order[..len];
        let mut c = shared_collator().clone();
        c.set_strength(Strength::Primary);
        match c.set_reordering(codes) {
            Ok(()) => {}
            Err(CollError::ReorderOverflow) => return Ok(()),
            Err(e) => return Err(TestCaseError::fail(e.to_string())),
        }
        for pair in codes.windows(2) {
            let [_, high] = group_samples(pair[0]);
            let [low, _] = group_samples(pair[1]);
            prop_assert_eq!(c.compare(high, low).unwrap(), Ordering::Less, "{:?}", codes);
        }
        for &code in &REORDERABLE {
            let [low, high] = group_samples(code);
            prop_assert_eq!(c.compare(low, high).unwrap(), Ordering::Less);
        }
        // scripts not named follow the named groups
        let [_, last_high] = group_samples(codes[len - 1]);
        for &code in REORDERABLE.iter().filter(|&&code| code < REORDER_CODE_FIRST) {
            if !codes.contains(&code) {
                let [low, _] = group_samples(code);
                prop_assert_eq!(c.compare(last_high, low).unwrap(), Ordering::Less, "{:?}", codes);
            }
        }
    }
}

#[test]
fn test_reordering_to_current_order_is_a_no_op() {
    let data = sample_root().unwrap();
    for codes in [
        vec![],
        vec![SCRIPT_LATIN],
        vec![SCRIPT_UNKNOWN],
        vec![
            REORDER_CODE_SPACE,
            REORDER_CODE_PUNCTUATION,
            REORDER_CODE_SYMBOL,
            REORDER_CODE_CURRENCY,
            REORDER_CODE_DIGIT,
        ],
    ] {
        assert!(data.make_reorder_ranges(&codes).unwrap().is_empty(), "{:?}", codes);
    }
}
