// CSV feed parsing
use crate::model::{ParserError, RawTable};
use csv::ReaderBuilder;

pub trait Parser {
    fn parse(&self, body: &str) -> Result<RawTable, ParserError>;
}

/// Reads a spreadsheet CSV export into string cells.
///
/// Ragged rows are padded (or cut) to the header width; spreadsheets drop
/// trailing empty cells.
pub struct CsvFeedParser;

impl CsvFeedParser {
    pub fn new() -> Self {
        Self
    }
}

impl Parser for CsvFeedParser {
    fn parse(&self, body: &str) -> Result<RawTable, ParserError> {
        let body = body.strip_prefix('\u{feff}').unwrap_or(body);
        let mut reader = ReaderBuilder::new()
            .flexible(true)
            .from_reader(body.as_bytes());

        let headers: Vec<String> = reader
            .headers()
            .map_err(|e| ParserError::Csv(e.to_string()))?
            .iter()
            .map(String::from)
            .collect();

        let mut rows = Vec::new();
        for result in reader.records() {
            let record = result.map_err(|e| ParserError::Csv(e.to_string()))?;
            let mut row: Vec<String> = record.iter().map(String::from).collect();
            row.resize(headers.len(), String::new());
            rows.push(row);
        }

        Ok(RawTable { headers, rows })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_headers_and_rows() {
        let body = "Category, ProductName ,UCB\nProduce,\"Apples, Fuji\",1\nDairy,Milk,0\n";
        let table = CsvFeedParser::new().parse(body).unwrap();
        assert_eq!(table.headers, vec!["Category", " ProductName ", "UCB"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0][1], "Apples, Fuji");
    }

    #[test]
    fn pads_short_rows() {
        let body = "Category,ProductName,UCB\nProduce,Apples\n";
        let table = CsvFeedParser::new().parse(body).unwrap();
        assert_eq!(table.rows[0], vec!["Produce", "Apples", ""]);
    }

    #[test]
    fn strips_byte_order_mark() {
        let body = "\u{feff}Category\nProduce\n";
        let table = CsvFeedParser::new().parse(body).unwrap();
        assert_eq!(table.headers, vec!["Category"]);
    }

    #[test]
    fn empty_body_yields_empty_table() {
        let table = CsvFeedParser::new().parse("").unwrap();
        assert!(table.headers.is_empty());
        assert!(table.rows.is_empty());
    }
}
