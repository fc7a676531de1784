//! # Luhn Check Digit
//!
//! The Luhn algorithm (ISO/IEC 7812) is the reason a mistyped card number
//! bounces at the keyboard instead of at the clearing house. It catches
//! every single-digit error and almost every adjacent transposition, which
//! is exactly the failure profile of a human copying sixteen digits off a
//! piece of plastic.
//!
//! The rule, over the 15-digit card body (prefix + account segment),
//! 0-indexed from the left:
//!
//! 1. Double every digit at an even index.
//! 2. If a doubled digit exceeds 9, subtract 9.
//! 3. Sum everything — doubled-and-reduced evens plus untouched odds.
//! 4. The check digit is the complement to the next multiple of 10
//!    (`0` if the sum already lands on one).
//!
//! Pure functions only. No I/O, no state, no surprises.

// ---------------------------------------------------------------------------
// Check Digit
// ---------------------------------------------------------------------------

/// Computes the Luhn check digit over a sequence of digit values (each
/// `0..=9`). Card issuing and validation both call this with the 15-digit
/// card body.
pub fn check_digit(digits: &[u8]) -> u8 {
    let sum: u32 = digits
        .iter()
        .enumerate()
        .map(|(i, &d)| {
            let mut v = u32::from(d);
            if i % 2 == 0 {
                v *= 2;
                if v > 9 {
                    v -= 9;
                }
            }
            v
        })
        .sum();

    ((10 - sum % 10) % 10) as u8
}

/// Returns `true` iff `s` is exactly 16 ASCII decimal digits and its last
/// digit equals the Luhn check digit of its first 15.
///
/// This is the *format* gate for transfer destinations: anything that
/// fails here was mistyped (or issued by somebody else's rules) and never
/// reaches the ledger.
pub fn is_valid_card_number(s: &str) -> bool {
    if s.len() != crate::config::CARD_NUMBER_LENGTH {
        return false;
    }
    let Some(digits) = digit_values(s) else {
        return false;
    };
    let (body, check) = digits.split_at(digits.len() - 1);
    check_digit(body) == check[0]
}

/// Converts an ASCII string to digit values, or `None` if any character
/// is not a decimal digit.
pub(crate) fn digit_values(s: &str) -> Option<Vec<u8>> {
    s.bytes()
        .map(|b| b.is_ascii_digit().then(|| b - b'0'))
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn digits(s: &str) -> Vec<u8> {
        digit_values(s).expect("test input is numeric")
    }

    #[test]
    fn known_vector_standard_test_card() {
        // 4000008449433403 is the canonical issued-card example; its body
        // checksums to 3.
        assert_eq!(check_digit(&digits("400000844943340")), 3);
        assert!(is_valid_card_number("4000008449433403"));
    }

    #[test]
    fn known_vector_sparse_body() {
        // Body 400000000000001: doubled evens contribute 8 (from the 4)
        // and 2 (from the trailing 1), sum 10, so the check digit is 0.
        assert_eq!(check_digit(&digits("400000000000001")), 0);
        assert!(is_valid_card_number("4000000000000010"));
    }

    #[test]
    fn all_zero_body_checks_to_zero() {
        assert_eq!(check_digit(&[0; 15]), 0);
    }

    #[test]
    fn check_digit_is_always_a_single_digit() {
        // Sweep a spread of bodies; the result must stay in 0..=9 and
        // appending it must always produce a valid card number.
        for seed in 0u64..1_000 {
            let body: Vec<u8> = (0..15)
                .map(|i| ((seed.wrapping_mul(2654435761).wrapping_add(i * 7)) % 10) as u8)
                .collect();
            let check = check_digit(&body);
            assert!(check <= 9);

            let mut card: String = body.iter().map(|d| (d + b'0') as char).collect();
            card.push((check + b'0') as char);
            assert!(is_valid_card_number(&card), "card {card} should validate");
        }
    }

    #[test]
    fn single_digit_error_is_detected() {
        let card = "4000008449433403";
        for pos in 0..card.len() {
            let original = card.as_bytes()[pos] - b'0';
            let mutated_digit = (original + 1) % 10;
            let mut mutated = card.as_bytes().to_vec();
            mutated[pos] = mutated_digit + b'0';
            let mutated = String::from_utf8(mutated).unwrap();
            assert!(
                !is_valid_card_number(&mutated),
                "mutation at {pos} slipped through: {mutated}"
            );
        }
    }

    #[test]
    fn wrong_length_rejected() {
        assert!(!is_valid_card_number(""));
        assert!(!is_valid_card_number("400000844943340")); // 15 digits
        assert!(!is_valid_card_number("40000084494334031")); // 17 digits
    }

    #[test]
    fn non_digits_rejected() {
        assert!(!is_valid_card_number("400000844943340x"));
        assert!(!is_valid_card_number("4000-0084-4943-34"));
        // Full-width unicode digits are not ASCII digits.
        assert!(!is_valid_card_number("４０００００８４４９４３３４０３"));
    }

    #[test]
    fn bad_check_digit_rejected() {
        for wrong in 0..=9u8 {
            if wrong == 3 {
                continue;
            }
            let card = format!("400000844943340{wrong}");
            assert!(!is_valid_card_number(&card));
        }
    }
}
