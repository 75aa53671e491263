use crate::consts::{CIGAR_FIELD, READ_FIELD, TARGET_FIELD};

///
/// The three fields of an alignment line the counting needs.
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlignmentRecord<'a> {
    pub target: &'a str,
    pub cigar: &'a str,
    pub read_len: usize,
}

impl<'a> AlignmentRecord<'a> {
    ///
    /// Borrow the target, the CIGAR and the read length out of a tab separated
    /// alignment line.
    ///
    pub fn parse(line: &'a str) -> Result<Self, String> {
        let mut target = None;
        let mut cigar = None;
        let mut read = None;
        for (column, field) in line.split('\t').enumerate().take(READ_FIELD + 1) {
            match column {
                TARGET_FIELD => target = Some(field),
                CIGAR_FIELD => cigar = Some(field),
                READ_FIELD => read = Some(field),
                _ => {}
            }
        }

        match (target, cigar, read) {
            (Some(target), Some(cigar), Some(read)) => Ok(AlignmentRecord {
                target,
                cigar,
                read_len: read.len(),
            }),
            _ => Err(format!(
                "expected at least {} tab separated fields",
                READ_FIELD + 1
            )),
        }
    }

    pub fn matched_bases(&self) -> Result<u64, String> {
        matched_bases(self.cigar)
    }
}

///
/// Sum of the lengths of all `M` operations of a CIGAR string.
///
/// `*` (no alignment) has no matched base.
///
pub fn matched_bases(cigar: &str) -> Result<u64, String> {
    let mut matched: u64 = 0;
    let mut run: Option<u64> = None;

    if cigar == "*" {
        return Ok(0);
    }

    for c in cigar.chars() {
        if let Some(digit) = c.to_digit(10) {
            let value = run
                .unwrap_or(0)
                .checked_mul(10)
                .and_then(|v| v.checked_add(digit as u64))
                .ok_or_else(|| format!("operation length overflows in CIGAR {}", cigar))?;
            run = Some(value);
        } else if c.is_ascii_alphabetic() || c == '=' {
            let length =
                run.take()
                    .ok_or_else(|| format!("operation '{}' without a length in CIGAR {}", c, cigar))?;
            if c == 'M' {
                matched += length;
            }
        } else {
            return Err(format!("unexpected character '{}' in CIGAR {}", c, cigar));
        }
    }

    if run.is_some() {
        return Err(format!("trailing length without an operation in CIGAR {}", cigar));
    }

    Ok(matched)
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    #[case("100M", 100)]
    #[case("5S90M5S", 90)]
    #[case("10M2I20M3D30M", 60)]
    #[case("50=", 0)]
    #[case("*", 0)]
    #[case("", 0)]
    fn test_matched_bases(#[case] cigar: &str, #[case] expected: u64) {
        assert_eq!(matched_bases(cigar).unwrap(), expected);
    }

    #[rstest]
    #[case("M")]
    #[case("10M5")]
    #[case("10M-5S")]
    #[case("99999999999999999999999M")]
    fn test_matched_bases_rejects_garbage(#[case] cigar: &str) {
        assert!(matched_bases(cigar).is_err());
    }

    #[rstest]
    fn test_parse_record() {
        let line = "read1\t0\tchrA\t1\t60\t90M10S\tACGTACGTAC\textra";
        let record = AlignmentRecord::parse(line).unwrap();

        assert_eq!(record.target, "chrA");
        assert_eq!(record.cigar, "90M10S");
        assert_eq!(record.read_len, 10);
        assert_eq!(record.matched_bases().unwrap(), 90);
    }

    #[rstest]
    fn test_parse_empty_read_field() {
        let record = AlignmentRecord::parse("r\t0\tchrA\t1\t60\t10M\t").unwrap();
        assert_eq!(record.read_len, 0);
    }

    #[rstest]
    fn test_parse_short_record() {
        assert!(AlignmentRecord::parse("read1\t0\tchrA\t1\t60\t100M").is_err());
    }
}
