//! Checksum and structural validators.
//!
//! Pattern matches alone produce too many false positives for numeric
//! categories; each validator here confirms a candidate before it becomes a
//! reported match. Luhn covers payment cards, Verhoeff covers Aadhaar, and
//! the rest are structural range checks.

/// Strip the separators the numeric patterns tolerate.
fn digits_of(value: &str) -> String {
    value
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect()
}

/// Luhn (mod-10) checksum for credit and debit card numbers.
pub fn luhn_check(number: &str) -> bool {
    let digits = digits_of(number);
    if digits.len() < 13 || digits.len() > 19 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return false;
    }

    let total: u32 = digits
        .chars()
        .rev()
        .enumerate()
        .map(|(i, c)| {
            let mut d = c.to_digit(10).unwrap_or(0);
            if i % 2 == 1 {
                d *= 2;
                if d > 9 {
                    d -= 9;
                }
            }
            d
        })
        .sum();

    total % 10 == 0
}

/// Card network IIN prefix check: Visa, Mastercard (both ranges), Amex,
/// Discover, Diners.
pub fn valid_card_prefix(number: &str) -> bool {
    let d = digits_of(number);
    if d.len() < 13 {
        return false;
    }

    let p2: u32 = d[..2].parse().unwrap_or(0);
    let p3: u32 = d[..3].parse().unwrap_or(0);
    let p4: u32 = d[..4].parse().unwrap_or(0);

    d.starts_with('4')
        || p2 == 34
        || p2 == 37
        || (51..=55).contains(&p2)
        || (2221..=2720).contains(&p4)
        || d.starts_with("6011")
        || d.starts_with("65")
        || p2 == 36
        || p2 == 38
        || (300..=305).contains(&p3)
}

// Verhoeff dihedral group tables.
const VERHOEFF_D: [[u8; 10]; 10] = [
    [0, 1, 2, 3, 4, 5, 6, 7, 8, 9],
    [1, 2, 3, 4, 0, 6, 7, 8, 9, 5],
    [2, 3, 4, 0, 1, 7, 8, 9, 5, 6],
    [3, 4, 0, 1, 2, 8, 9, 5, 6, 7],
    [4, 0, 1, 2, 3, 9, 5, 6, 7, 8],
    [5, 9, 8, 7, 6, 0, 4, 3, 2, 1],
    [6, 5, 9, 8, 7, 1, 0, 4, 3, 2],
    [7, 6, 5, 9, 8, 2, 1, 0, 4, 3],
    [8, 7, 6, 5, 9, 3, 2, 1, 0, 4],
    [9, 8, 7, 6, 5, 4, 3, 2, 1, 0],
];

const VERHOEFF_P: [[u8; 10]; 8] = [
    [0, 1, 2, 3, 4, 5, 6, 7, 8, 9],
    [1, 5, 7, 6, 2, 8, 3, 0, 9, 4],
    [5, 8, 0, 3, 7, 9, 6, 1, 4, 2],
    [8, 9, 1, 6, 0, 4, 3, 5, 2, 7],
    [9, 4, 5, 3, 1, 2, 6, 8, 7, 0],
    [4, 2, 8, 6, 5, 7, 3, 9, 0, 1],
    [2, 7, 9, 3, 8, 0, 6, 4, 1, 5],
    [7, 0, 4, 6, 9, 1, 3, 2, 5, 8],
];

/// Verhoeff checksum for 12-digit Aadhaar numbers.
pub fn verhoeff_check(number: &str) -> bool {
    let digits = digits_of(number);
    if digits.len() != 12 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return false;
    }

    let mut c: u8 = 0;
    for (i, ch) in digits.chars().rev().enumerate() {
        let d = ch.to_digit(10).unwrap_or(0) as usize;
        c = VERHOEFF_D[c as usize][VERHOEFF_P[i % 8][d] as usize];
    }
    c == 0
}

/// US SSN structural rules: area not 000/666/9xx, group not 00, serial not
/// 0000.
pub fn validate_ssn(ssn: &str) -> bool {
    let digits = digits_of(ssn);
    if digits.len() != 9 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return false;
    }

    let area: u32 = digits[..3].parse().unwrap_or(0);
    let group: u32 = digits[3..5].parse().unwrap_or(0);
    let serial: u32 = digits[5..].parse().unwrap_or(0);

    area != 0 && area != 666 && area < 900 && group != 0 && serial != 0
}

/// IPv4 octet range check.
pub fn validate_ip_address(ip: &str) -> bool {
    let parts: Vec<&str> = ip.split('.').collect();
    parts.len() == 4 && parts.iter().all(|p| p.parse::<u16>().map(|v| v <= 255).unwrap_or(false))
}

/// Plausible email structure: one `@`, non-empty local part, dotted domain.
pub fn validate_email_structure(email: &str) -> bool {
    let mut parts = email.splitn(2, '@');
    let (local, domain) = match (parts.next(), parts.next()) {
        (Some(l), Some(d)) => (l, d),
        _ => return false,
    };

    !local.is_empty()
        && !domain.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}

/// Phone candidates must carry a realistic digit count (7 local digits up
/// to 15 per E.164).
pub fn validate_phone(candidate: &str) -> bool {
    let count = candidate.chars().filter(|c| c.is_ascii_digit()).count();
    (7..=15).contains(&count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_luhn_valid_cards() {
        assert!(luhn_check("4111111111111111")); // Visa test number
        assert!(luhn_check("4111 1111 1111 1111"));
        assert!(luhn_check("5500-0000-0000-0004")); // Mastercard test number
        assert!(luhn_check("378282246310005")); // Amex test number
    }

    #[test]
    fn test_luhn_rejects_invalid() {
        assert!(!luhn_check("4111111111111112"));
        assert!(!luhn_check("1234567812345678"));
        assert!(!luhn_check("411111")); // Too short
        assert!(!luhn_check("not a number"));
    }

    #[test]
    fn test_card_prefix() {
        assert!(valid_card_prefix("4111111111111111")); // Visa
        assert!(valid_card_prefix("5500000000000004")); // Mastercard
        assert!(valid_card_prefix("378282246310005")); // Amex
        assert!(valid_card_prefix("6011000990139424")); // Discover
        assert!(!valid_card_prefix("9999999999999999"));
    }

    #[test]
    fn test_verhoeff() {
        // 12-digit numbers with a valid Verhoeff check digit.
        assert!(verhoeff_check("234123412346"));
        assert!(!verhoeff_check("234123412347"));
        assert!(!verhoeff_check("12345")); // Wrong length
    }

    #[test]
    fn test_ssn_rules() {
        assert!(validate_ssn("123-45-6789"));
        assert!(validate_ssn("123 45 6789"));
        assert!(!validate_ssn("000-45-6789")); // Area 000
        assert!(!validate_ssn("666-45-6789")); // Area 666
        assert!(!validate_ssn("900-45-6789")); // Area 9xx
        assert!(!validate_ssn("123-00-6789")); // Group 00
        assert!(!validate_ssn("123-45-0000")); // Serial 0000
    }

    #[test]
    fn test_ip_octets() {
        assert!(validate_ip_address("192.168.1.100"));
        assert!(validate_ip_address("0.0.0.0"));
        assert!(!validate_ip_address("256.1.1.1"));
        assert!(!validate_ip_address("1.2.3"));
    }

    #[test]
    fn test_email_structure() {
        assert!(validate_email_structure("john.doe@email.com"));
        assert!(!validate_email_structure("no-at-sign.com"));
        assert!(!validate_email_structure("user@nodot"));
        assert!(!validate_email_structure("@domain.com"));
        assert!(!validate_email_structure("user@.com"));
    }

    #[test]
    fn test_phone_digit_count() {
        assert!(validate_phone("+1-555-123-4567"));
        assert!(validate_phone("5551234567"));
        assert!(!validate_phone("12345"));
    }
}
