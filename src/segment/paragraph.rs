//! Delimiter-based paragraph splitting.
//!
//! This is a plain string split, not paragraph detection: callers must know
//! the delimiter their text uses.

/// Split every value on `delimiter`, keeping one piece list per value
pub fn split_paragraphs<I, S>(values: I, delimiter: &str) -> Vec<Vec<String>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    values
        .into_iter()
        .map(|value| split_paragraph(value.as_ref(), delimiter))
        .collect()
}

/// Split one value on `delimiter`. Empty pieces between consecutive
/// delimiters are kept; an empty delimiter leaves the value whole.
pub fn split_paragraph(value: &str, delimiter: &str) -> Vec<String> {
    if delimiter.is_empty() {
        return vec![value.to_string()];
    }
    value.split(delimiter).map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_on_blank_line() {
        assert_eq!(
            split_paragraph("Para one\n\nPara two", "\n\n"),
            vec!["Para one", "Para two"]
        );
    }

    #[test]
    fn test_consecutive_delimiters_keep_empty_pieces() {
        assert_eq!(split_paragraph("a||b||||c", "||"), vec!["a", "b", "", "c"]);
        assert_eq!(split_paragraph("||a", "||"), vec!["", "a"]);
    }

    #[test]
    fn test_one_piece_list_per_value() {
        let pieces = split_paragraphs(["x\n\ny", "z"], "\n\n");
        assert_eq!(pieces, vec![vec!["x", "y"], vec!["z"]]);
    }

    #[test]
    fn test_empty_delimiter_leaves_value_whole() {
        assert_eq!(split_paragraph("no split", ""), vec!["no split"]);
    }
}
