// SPDX-FileCopyrightText: 2026 Servineo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Normalized edit-distance similarity between free-text strings.

/// Similarity of `a` and `b` in `[0, 1]`.
///
/// Levenshtein distance (unit cost insert/delete/substitute) over Unicode
/// scalar values, normalized as `(max_len - distance) / max_len`. Two empty
/// strings are identical.
pub fn similarity(a: &str, b: &str) -> f64 {
    let longest = a.chars().count().max(b.chars().count());
    if longest == 0 {
        return 1.0;
    }
    let distance = strsim::levenshtein(a, b);
    (longest - distance) as f64 / longest as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn empty_strings_are_identical() {
        assert_eq!(similarity("", ""), 1.0);
    }

    #[test]
    fn empty_against_text_is_zero() {
        assert_eq!(similarity("", "abc"), 0.0);
        assert_eq!(similarity("abc", ""), 0.0);
    }

    #[test]
    fn single_substitution() {
        assert!((similarity("kitten", "sitten") - 5.0 / 6.0).abs() < 1e-12);
    }

    #[test]
    fn accents_count_as_one_character() {
        // "rompió" vs "rompio": one substitution over six characters.
        assert!((similarity("rompió", "rompio") - 5.0 / 6.0).abs() < 1e-12);
    }

    #[test]
    fn appended_clause_lowers_similarity() {
        let a = "Necesito reparar la pantalla de mi laptop Dell";
        let b = "Necesito reparar la pantalla de mi laptop Dell que se rompió";
        let s = similarity(a, b);
        // 14 inserted characters over 60.
        assert!((s - 46.0 / 60.0).abs() < 1e-12, "got {s}");
    }

    proptest! {
        #[test]
        fn identity_is_one(a in ".{0,40}") {
            prop_assert_eq!(similarity(&a, &a), 1.0);
        }

        #[test]
        fn symmetric(a in ".{0,30}", b in ".{0,30}") {
            prop_assert_eq!(similarity(&a, &b), similarity(&b, &a));
        }

        #[test]
        fn bounded(a in ".{0,30}", b in ".{0,30}") {
            let s = similarity(&a, &b);
            prop_assert!((0.0..=1.0).contains(&s));
        }
    }
}
