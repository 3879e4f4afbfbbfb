//! Cell addressing: base-26 column letters and A1 references

use crate::error::{FdmError, FdmResult};

/// Convert a zero-based column index to an Excel column letter
///
/// Examples:
/// - 0 → A
/// - 25 → Z
/// - 26 → AA
/// - 701 → ZZ
/// - 702 → AAA
pub fn column_index_to_letter(index: usize) -> String {
    let mut result = String::new();
    let mut idx = index;

    loop {
        let remainder = idx % 26;
        result.insert(0, (b'A' + remainder as u8) as char);
        if idx < 26 {
            break;
        }
        idx = idx / 26 - 1;
    }

    result
}

/// Convert column letters back to a zero-based index (`A` → 0, `AA` → 26)
pub fn column_letter_to_index(letters: &str) -> Option<usize> {
    if letters.is_empty() {
        return None;
    }

    let mut value: usize = 0;
    for c in letters.chars() {
        let c = c.to_ascii_uppercase();
        if !c.is_ascii_uppercase() {
            return None;
        }
        value = value
            .checked_mul(26)?
            .checked_add((c as u8 - b'A') as usize + 1)?;
    }

    Some(value - 1)
}

/// Zero-based (row, column) pair to an A1 address
pub fn to_address(row: u32, col: u32) -> String {
    format!("{}{}", column_index_to_letter(col as usize), row + 1)
}

/// Parse an A1 address (`H37`, `$AB$10`) into zero-based (row, column)
pub fn parse_address(address: &str) -> FdmResult<(u32, u32)> {
    let cleaned: String = address.trim().chars().filter(|c| *c != '$').collect();

    let split = cleaned
        .find(|c: char| c.is_ascii_digit())
        .ok_or_else(|| invalid(address))?;
    let (letters, digits) = cleaned.split_at(split);

    let col = column_letter_to_index(letters).ok_or_else(|| invalid(address))?;
    let row: u32 = digits.parse().map_err(|_| invalid(address))?;
    if row == 0 {
        return Err(invalid(address));
    }

    let col = u32::try_from(col).map_err(|_| invalid(address))?;
    Ok((row - 1, col))
}

fn invalid(address: &str) -> FdmError {
    FdmError::Config(format!("invalid cell address: {}", address))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_index_to_letter() {
        assert_eq!(column_index_to_letter(0), "A");
        assert_eq!(column_index_to_letter(1), "B");
        assert_eq!(column_index_to_letter(25), "Z");
        assert_eq!(column_index_to_letter(26), "AA");
        assert_eq!(column_index_to_letter(27), "AB");
        assert_eq!(column_index_to_letter(54), "BC");
        assert_eq!(column_index_to_letter(701), "ZZ");
        assert_eq!(column_index_to_letter(702), "AAA");
        assert_eq!(column_index_to_letter(16383), "XFD");
    }

    #[test]
    fn test_column_letters_round_trip() {
        for index in 0..20_000 {
            let letters = column_index_to_letter(index);
            assert_eq!(column_letter_to_index(&letters), Some(index), "{}", letters);
        }
    }

    #[test]
    fn test_column_letter_to_index_rejects_garbage() {
        assert_eq!(column_letter_to_index(""), None);
        assert_eq!(column_letter_to_index("A1"), None);
        assert_eq!(column_letter_to_index("ab"), Some(27));
    }

    #[test]
    fn test_parse_address() {
        assert_eq!(parse_address("A1").unwrap(), (0, 0));
        assert_eq!(parse_address("H37").unwrap(), (36, 7));
        assert_eq!(parse_address("$E$14").unwrap(), (13, 4));
        assert_eq!(parse_address("bc2").unwrap(), (1, 54));
    }

    #[test]
    fn test_parse_address_invalid() {
        assert!(parse_address("").is_err());
        assert!(parse_address("H").is_err());
        assert!(parse_address("37").is_err());
        assert!(parse_address("A0").is_err());
        assert!(parse_address("A-1").is_err());
    }

    #[test]
    fn test_to_address() {
        assert_eq!(to_address(0, 0), "A1");
        assert_eq!(to_address(130, 7), "H131");
        assert_eq!(to_address(1, 26), "AA2");
    }
}
