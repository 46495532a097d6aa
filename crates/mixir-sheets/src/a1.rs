//! A1 notation helpers.

/// Last cell of the explicit fallback range.
const FALLBACK_END: &str = "Z1000";

/// Quotes a tab title for use in a range, doubling embedded single quotes.
pub fn quote_sheet(title: &str) -> String {
    format!("'{}'", title.replace('\'', "''"))
}

/// Explicit range covering the roster area of a tab: `'<tab>'!A1:Z1000`.
pub fn roster_range(title: &str) -> String {
    format!("{}!A1:{FALLBACK_END}", quote_sheet(title))
}

/// Range covering column A of a tab.
pub fn id_column_range(title: &str) -> String {
    format!("{}!A:A", quote_sheet(title))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quotes_plain_title() {
        assert_eq!(quote_sheet("1조"), "'1조'");
        assert_eq!(roster_range("1조"), "'1조'!A1:Z1000");
    }

    #[test]
    fn doubles_single_quotes() {
        assert_eq!(quote_sheet("Kim's team"), "'Kim''s team'");
        assert_eq!(roster_range("a'b"), "'a''b'!A1:Z1000");
    }

    #[test]
    fn titles_with_range_syntax() {
        assert_eq!(roster_range("A1:B2"), "'A1:B2'!A1:Z1000");
        assert_eq!(id_column_range("Team 1"), "'Team 1'!A:A");
    }
}
