/// How one reference character compares with the typed buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharMark {
    Pending,
    Correct,
    Incorrect,
}

/// Mark every reference character against the typed buffer.
/// Typed characters past the end of the reference are not shown.
pub fn mark_chars(typed: &str, reference: &str) -> Vec<(char, CharMark)> {
    let mut typed = typed.chars();

    reference
        .chars()
        .map(|expected| {
            let mark = match typed.next() {
                None => CharMark::Pending,
                Some(c) if c == expected => CharMark::Correct,
                Some(_) => CharMark::Incorrect,
            };
            (expected, mark)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mark_chars() {
        let marks = mark_chars("tw0", "two x");
        let kinds = marks.iter().map(|(_, m)| *m).collect::<Vec<_>>();

        assert_eq!(
            kinds,
            vec![
                CharMark::Correct,
                CharMark::Correct,
                CharMark::Incorrect,
                CharMark::Pending,
                CharMark::Pending,
            ]
        );
        assert_eq!(marks[2].0, 'o');
    }

    #[test]
    fn test_overflow_is_ignored() {
        assert_eq!(mark_chars("abc", "ab").len(), 2);
    }
}
