use thiserror::Error;

/// Errors arising from sequence-level operations. Both variants indicate a
/// data-shape violation (bad alphabet, or a barcode-window misconfiguration)
/// and are never recoverable mid-run.
#[derive(Error, Debug, PartialEq)]
pub enum SeqError {
    #[error("unrecognised base `{base}`: sequences must only contain A, T, G, C or N")]
    InvalidBase { base: char },

    #[error("hamming distance is undefined for sequences of unequal length ({left} vs {right})")]
    LengthMismatch { left: usize, right: usize },
}

/// Returns the complement of a single base, over the alphabet {A, T, G, C, N}.
fn complement(base: char) -> Result<char, SeqError> {
    match base {
        'A' => Ok('T'),
        'T' => Ok('A'),
        'G' => Ok('C'),
        'C' => Ok('G'),
        'N' => Ok('N'),
        _ => Err(SeqError::InvalidBase { base }),
    }
}

/// Checks that a sequence only contains valid bases.
pub fn check_alphabet(seq: &str) -> Result<(), SeqError> {
    for base in seq.chars() {
        complement(base)?;
    }
    Ok(())
}

/// Computes the reverse complement of a DNA sequence: each base is
/// complemented (A↔T, G↔C, N↔N) and the result is reversed.
///
/// # Errors
///
/// Returns `SeqError::InvalidBase` if the sequence contains a character
/// outside {A, T, G, C, N}.
pub fn reverse_complement(seq: &str) -> Result<String, SeqError> {
    let mut out = String::with_capacity(seq.len());
    for base in seq.chars().rev() {
        out.push(complement(base)?);
    }
    Ok(out)
}

/// Counts the positions at which two equal-length sequences differ.
/// Case-sensitive, no gap handling.
///
/// # Errors
///
/// Returns `SeqError::LengthMismatch` if the sequences differ in length;
/// the distance is undefined in that case and must never be silently
/// approximated.
pub fn hamming_distance(a: &str, b: &str) -> Result<usize, SeqError> {
    if a.len() != b.len() {
        return Err(SeqError::LengthMismatch {
            left: a.len(),
            right: b.len(),
        });
    }

    Ok(a.bytes().zip(b.bytes()).filter(|(x, y)| x != y).count())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reverse_complement_basic() {
        assert_eq!(reverse_complement("ATGC").unwrap(), "GCAT");
        assert_eq!(reverse_complement("AANTT").unwrap(), "AANTT");
    }

    #[test]
    fn reverse_complement_involution() {
        for s in ["ACGTACGT", "NNNNNNNN", "CATGGGTA", "A", ""] {
            let rc = reverse_complement(s).unwrap();
            assert_eq!(reverse_complement(&rc).unwrap(), s);
        }
    }

    #[test]
    fn reverse_complement_rejects_invalid_base() {
        assert_eq!(
            reverse_complement("ACXT"),
            Err(SeqError::InvalidBase { base: 'X' })
        );
    }

    #[test]
    fn hamming_symmetric_and_zero_iff_equal() {
        assert_eq!(hamming_distance("ACGT", "ACGT").unwrap(), 0);
        assert_eq!(hamming_distance("AAAA", "AATA").unwrap(), 1);
        assert_eq!(
            hamming_distance("AAAA", "TTTT").unwrap(),
            hamming_distance("TTTT", "AAAA").unwrap()
        );
    }

    #[test]
    fn hamming_rejects_unequal_lengths() {
        assert_eq!(
            hamming_distance("ACGT", "ACG"),
            Err(SeqError::LengthMismatch { left: 4, right: 3 })
        );
    }

    #[test]
    fn alphabet_check() {
        assert!(check_alphabet("CATGTAN").is_ok());
        assert!(check_alphabet("CAU").is_err());
    }
}
