// ── CSV export schemas and import dry-run ──
//
// Export: bare header row, every data field double-quoted with embedded
// quotes doubled, rows joined by "\n". Import: a small RFC 4180 reader
// that mirrors the server's column contract so a file can be checked
// before it is uploaded.

use chrono::{DateTime, SecondsFormat, Utc};
use tracing::debug;

use crate::convert::{f64_to_i64, parse_bool_word};
use crate::lookup::SearchRow;
use crate::model::{Category, Domain, DomainName, Ticket};

// ── Column contract ─────────────────────────────────────────────────

/// Import columns, in file order.
pub const IMPORT_HEADERS: [&str; 17] = [
    "Domain Name",
    "Country",
    "Category",
    "DA",
    "PA",
    "SS",
    "Backlinks",
    "Price",
    "Status",
    "Panel Link",
    "Panel Username",
    "Panel Password",
    "Shell Link",
    "Hosting Link",
    "Hosting Username",
    "Hosting Password",
    "Ischannel",
];

/// Columns an import file cannot do without.
pub const REQUIRED_HEADERS: [&str; 4] = ["Domain Name", "Country", "Category", "Price"];

const TEMPLATE_SAMPLE: [&str; 17] = [
    "example.com",
    "United States",
    "GOV",
    "85",
    "75",
    "5",
    "1500",
    "2500",
    "Available",
    "https://panel.example.com",
    "admin",
    "password123",
    "https://shell.example.com",
    "https://hosting.example.com",
    "hostuser",
    "hostpass",
    "false",
];

// ── Schema ──────────────────────────────────────────────────────────

/// One output column: header text plus a cell renderer.
pub struct Column<T> {
    pub header: &'static str,
    render: fn(&T) -> String,
}

impl<T> Column<T> {
    pub fn new(header: &'static str, render: fn(&T) -> String) -> Self {
        Self { header, render }
    }

    pub fn cell(&self, row: &T) -> String {
        (self.render)(row)
    }
}

/// Ordered list of columns for one export.
pub struct Schema<T> {
    columns: Vec<Column<T>>,
}

impl<T> Schema<T> {
    pub fn new(columns: Vec<Column<T>>) -> Self {
        Self { columns }
    }

    pub fn headers(&self) -> Vec<&'static str> {
        self.columns.iter().map(|c| c.header).collect()
    }

    /// Render the header row and one quoted line per record.
    pub fn render(&self, rows: &[T]) -> String {
        let mut out = self.headers().join(",");
        for row in rows {
            out.push('\n');
            let cells: Vec<String> = self.columns.iter().map(|c| quote(&c.cell(row))).collect();
            out.push_str(&cells.join(","));
        }
        debug!(rows = rows.len(), columns = self.columns.len(), "rendered csv");
        out
    }
}

/// Wrap a field in double quotes, doubling any embedded quote.
pub fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

fn timestamp_cell(at: Option<DateTime<Utc>>) -> String {
    at.map(|t| t.to_rfc3339_opts(SecondsFormat::Millis, true))
        .unwrap_or_default()
}

// ── Export schemas ──────────────────────────────────────────────────

/// Listing export: the import columns, then creation and update times.
pub fn domain_schema() -> Schema<Domain> {
    Schema::new(vec![
        Column::new("Domain Name", |d| d.domain_name.to_string()),
        Column::new("Country", |d| d.country.clone()),
        Column::new("Category", |d| d.category.to_string()),
        Column::new("DA", |d| d.da.to_string()),
        Column::new("PA", |d| d.pa.to_string()),
        Column::new("SS", |d| d.ss.to_string()),
        Column::new("Backlinks", |d| d.backlink.to_string()),
        Column::new("Price", |d| d.price.to_string()),
        Column::new("Status", |d| d.availability_label().to_owned()),
        Column::new("Panel Link", |d| d.panel_link.clone()),
        Column::new("Panel Username", |d| d.panel_username.clone()),
        Column::new("Panel Password", |d| d.panel_password.clone()),
        Column::new("Shell Link", |d| d.good_link.clone()),
        Column::new("Hosting Link", |d| d.hosting_link.clone()),
        Column::new("Hosting Username", |d| d.hosting_username.clone()),
        Column::new("Hosting Password", |d| d.hosting_password.clone()),
        Column::new("Ischannel", |d| d.channel_label().to_owned()),
        Column::new("Created At", |d| timestamp_cell(d.created_at)),
        Column::new("Updated At", |d| timestamp_cell(d.updated_at)),
    ])
}

/// Cell for a search row: the matched listing's value, or `missing`.
fn found_cell(row: &SearchRow, missing: &str, f: fn(&Domain) -> String) -> String {
    row.domain.as_ref().map_or_else(|| missing.to_owned(), f)
}

/// Bulk-search export. A row that was not found carries its input as the
/// name, "-" for text and status columns, 0 for numbers and empty
/// credentials.
pub fn search_schema() -> Schema<SearchRow> {
    Schema::new(vec![
        Column::new("Domain Name", |r| {
            r.domain
                .as_ref()
                .map_or_else(|| r.input.clone(), |d| d.domain_name.to_string())
        }),
        Column::new("Search Status", |r| {
            (if r.found { "Found" } else { "Not Found" }).to_owned()
        }),
        Column::new("Country", |r| found_cell(r, "-", |d| d.country.clone())),
        Column::new("Category", |r| found_cell(r, "-", |d| d.category.to_string())),
        Column::new("DA", |r| found_cell(r, "0", |d| d.da.to_string())),
        Column::new("PA", |r| found_cell(r, "0", |d| d.pa.to_string())),
        Column::new("SS", |r| found_cell(r, "0", |d| d.ss.to_string())),
        Column::new("Backlinks", |r| found_cell(r, "0", |d| d.backlink.to_string())),
        Column::new("Price", |r| found_cell(r, "0", |d| d.price.to_string())),
        Column::new("Status", |r| {
            found_cell(r, "-", |d| d.availability_label().to_owned())
        }),
        Column::new("Channel Status", |r| {
            found_cell(r, "-", |d| d.channel_label().to_owned())
        }),
        Column::new("Panel Link", |r| found_cell(r, "", |d| d.panel_link.clone())),
        Column::new("Panel Username", |r| {
            found_cell(r, "", |d| d.panel_username.clone())
        }),
        Column::new("Panel Password", |r| {
            found_cell(r, "", |d| d.panel_password.clone())
        }),
        Column::new("Shell Link", |r| found_cell(r, "", |d| d.good_link.clone())),
        Column::new("Hosting Link", |r| found_cell(r, "", |d| d.hosting_link.clone())),
        Column::new("Hosting Username", |r| {
            found_cell(r, "", |d| d.hosting_username.clone())
        }),
        Column::new("Hosting Password", |r| {
            found_cell(r, "", |d| d.hosting_password.clone())
        }),
        Column::new("Created At", |r| {
            found_cell(r, "", |d| timestamp_cell(d.created_at))
        }),
        Column::new("Updated At", |r| {
            found_cell(r, "", |d| timestamp_cell(d.updated_at))
        }),
    ])
}

pub fn ticket_schema() -> Schema<Ticket> {
    Schema::new(vec![
        Column::new("Customer ID", |t| t.customer_id.clone()),
        Column::new("Requested Domains", |t| t.request_domains.join("; ")),
        Column::new("Request Time", |t| timestamp_cell(t.request_time)),
        Column::new("Price", |t| t.price.unwrap_or(0.0).to_string()),
        Column::new("Status", |t| t.status.to_string()),
        Column::new("Created At", |t| timestamp_cell(t.created_at)),
        Column::new("Updated At", |t| timestamp_cell(t.updated_at)),
    ])
}

pub fn export_domains(domains: &[Domain]) -> String {
    domain_schema().render(domains)
}

pub fn export_search_results(rows: &[SearchRow]) -> String {
    search_schema().render(rows)
}

pub fn export_tickets(tickets: &[Ticket]) -> String {
    ticket_schema().render(tickets)
}

/// Import headers followed by one sample row.
pub fn import_template() -> String {
    let sample: Vec<String> = TEMPLATE_SAMPLE.iter().map(|f| quote(f)).collect();
    format!("{}\n{}", IMPORT_HEADERS.join(","), sample.join(","))
}

// ── Reader ──────────────────────────────────────────────────────────

/// Split CSV text into records of fields.
///
/// Handles quoted fields, doubled quotes, CRLF or LF line endings and a
/// leading byte-order mark. A quote that is never closed runs to the
/// end of input.
pub fn read_records(input: &str) -> Vec<Vec<String>> {
    let input = input.strip_prefix('\u{feff}').unwrap_or(input);
    let mut records = Vec::new();
    let mut record = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    field.push('"');
                    chars.next();
                }
                '"' => in_quotes = false,
                _ => field.push(c),
            }
            continue;
        }
        match c {
            '"' => in_quotes = true,
            ',' => record.push(std::mem::take(&mut field)),
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' | '\r' => {
                record.push(std::mem::take(&mut field));
                records.push(std::mem::take(&mut record));
            }
            _ => field.push(c),
        }
    }
    if !field.is_empty() || !record.is_empty() {
        record.push(field);
        records.push(record);
    }
    records
}

// ── Import dry-run ──────────────────────────────────────────────────

/// A row that would be sent to the server, with its 1-based file row.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportRow {
    pub row: usize,
    pub domain: Domain,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRowError {
    pub row: usize,
    pub error: String,
}

/// Local validation result for an import file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportPreview {
    pub rows: Vec<ImportRow>,
    pub errors: Vec<ImportRowError>,
    /// Required headers absent from the file; when non-empty, no rows are read.
    pub missing_columns: Vec<String>,
}

impl ImportPreview {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty() && self.missing_columns.is_empty()
    }
}

/// Header name → column index, matched case-insensitively.
struct HeaderMap(Vec<(String, usize)>);

impl HeaderMap {
    fn new(headers: &[String]) -> Self {
        Self(
            headers
                .iter()
                .enumerate()
                .map(|(i, h)| (h.trim().to_lowercase(), i))
                .collect(),
        )
    }

    fn index(&self, header: &str) -> Option<usize> {
        let wanted = header.to_lowercase();
        self.0.iter().find(|(h, _)| *h == wanted).map(|(_, i)| *i)
    }

    fn get<'a>(&self, record: &'a [String], header: &str) -> &'a str {
        self.index(header)
            .and_then(|i| record.get(i))
            .map_or("", |s| s.trim())
    }
}

fn status_word(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "available" => Some(true),
        "sold" => Some(false),
        other => parse_bool_word(other),
    }
}

fn channel_word(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "posted" => Some(true),
        "not posted" => Some(false),
        other => parse_bool_word(other),
    }
}

fn metric(raw: &str) -> i64 {
    raw.parse::<i64>()
        .ok()
        .or_else(|| raw.parse::<f64>().ok().and_then(f64_to_i64))
        .unwrap_or(0)
}

/// Validate an import file locally, without contacting the server.
///
/// Never fails: structural problems land in `missing_columns`, per-row
/// problems in `errors`.
pub fn parse_import(input: &str) -> ImportPreview {
    let mut records = read_records(input).into_iter();
    let Some(header_row) = records.next() else {
        return ImportPreview {
            missing_columns: REQUIRED_HEADERS.iter().map(|h| (*h).to_owned()).collect(),
            ..ImportPreview::default()
        };
    };
    let headers = HeaderMap::new(&header_row);

    let missing: Vec<String> = REQUIRED_HEADERS
        .iter()
        .filter(|h| headers.index(h).is_none())
        .map(|h| (*h).to_owned())
        .collect();
    if !missing.is_empty() {
        debug!(?missing, "import file lacks required columns");
        return ImportPreview {
            missing_columns: missing,
            ..ImportPreview::default()
        };
    }

    let mut preview = ImportPreview::default();
    for (index, record) in records.enumerate() {
        let row = index + 2;
        if record.iter().all(|f| f.trim().is_empty()) {
            continue;
        }
        match import_row(&headers, &record) {
            Ok(domain) => preview.rows.push(ImportRow { row, domain }),
            Err(error) => preview.errors.push(ImportRowError { row, error }),
        }
    }
    debug!(
        rows = preview.rows.len(),
        errors = preview.errors.len(),
        "parsed import file"
    );
    preview
}

fn import_row(headers: &HeaderMap, record: &[String]) -> Result<Domain, String> {
    let get = |h: &str| headers.get(record, h);

    if let Some(empty) = REQUIRED_HEADERS.iter().find(|h| get(h).is_empty()) {
        return Err(format!("{empty} is required"));
    }
    let price: f64 = get("Price")
        .parse()
        .map_err(|_| format!("Price must be a number, got {:?}", get("Price")))?;

    Ok(Domain {
        domain_name: DomainName::new(get("Domain Name")),
        country: get("Country").to_owned(),
        category: Category::from(get("Category").to_owned()),
        da: metric(get("DA")),
        pa: metric(get("PA")),
        ss: metric(get("SS")),
        backlink: u64::try_from(metric(get("Backlinks"))).unwrap_or(0),
        price: price.max(0.0),
        status: status_word(get("Status")).unwrap_or(true),
        good_link: get("Shell Link").to_owned(),
        panel_link: get("Panel Link").to_owned(),
        panel_username: get("Panel Username").to_owned(),
        panel_password: get("Panel Password").to_owned(),
        hosting_link: get("Hosting Link").to_owned(),
        hosting_username: get("Hosting Username").to_owned(),
        hosting_password: get("Hosting Password").to_owned(),
        ischannel: channel_word(get("Ischannel")).unwrap_or(false),
        ..Domain::default()
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::{EntityId, TicketStatus};
    use crate::query::tests::{at, domain};
    use pretty_assertions::assert_eq;

    #[test]
    fn domain_export_header() {
        let csv = export_domains(&[]);
        insta::assert_snapshot!(csv, @"Domain Name,Country,Category,DA,PA,SS,Backlinks,Price,Status,Panel Link,Panel Username,Panel Password,Shell Link,Hosting Link,Hosting Username,Hosting Password,Ischannel,Created At,Updated At");
    }

    #[test]
    fn domain_export_row_uses_labels() {
        let mut d = domain("1", "shop.io", 40, at(1, 10));
        d.price = 120.5;
        d.status = true;
        d.ischannel = false;
        let csv = export_domains(&[d]);
        let row = csv.lines().nth(1).unwrap();
        insta::assert_snapshot!(row, @r#""shop.io","US","GOV","40","0","0","0","120.5","Available","","","","","","","","Not Posted","2024-03-01T10:00:00.000Z","""#);
    }

    #[test]
    fn embedded_quotes_are_doubled() {
        assert_eq!(quote(r#"say "hi""#), r#""say ""hi""""#);
        let mut d = domain("1", "a.com", 0, None);
        d.country = "Côte \"d'Ivoire\", West".into();
        let parsed = parse_import(&export_domains(&[d.clone()]));
        assert_eq!(parsed.rows[0].domain.country, d.country);
    }

    #[test]
    fn export_round_trips_through_import() {
        let mut a = domain("1", "alpha.com", 10, at(1, 1));
        a.price = 99.0;
        a.status = false;
        a.ischannel = true;
        let mut b = domain("2", "bravo.org", 20, at(2, 2));
        b.price = 15.25;
        b.status = true;

        let preview = parse_import(&export_domains(&[a.clone(), b.clone()]));
        assert!(preview.is_clean(), "{preview:?}");
        assert_eq!(preview.rows.len(), 2);
        for (parsed, original) in preview.rows.iter().zip([&a, &b]) {
            assert_eq!(parsed.domain.domain_name, original.domain_name);
            assert!((parsed.domain.price - original.price).abs() < f64::EPSILON);
            assert_eq!(parsed.domain.status, original.status);
            assert_eq!(parsed.domain.ischannel, original.ischannel);
        }
        assert_eq!(preview.rows[0].row, 2);
        assert_eq!(preview.rows[1].row, 3);
    }

    #[test]
    fn template_parses_cleanly() {
        let template = import_template();
        assert_eq!(template.lines().count(), 2);
        let preview = parse_import(&template);
        assert!(preview.is_clean());
        assert_eq!(preview.rows[0].domain.domain_name.as_str(), "example.com");
        assert_eq!(preview.rows[0].domain.da, 85);
        assert!(preview.rows[0].domain.status);
        assert!(!preview.rows[0].domain.ischannel);
    }

    #[test]
    fn missing_required_columns_yield_no_rows() {
        let preview = parse_import("Domain Name,Country\na.com,US\n");
        assert!(preview.rows.is_empty());
        assert_eq!(preview.missing_columns, vec!["Category", "Price"]);
    }

    #[test]
    fn row_errors_carry_file_row_numbers() {
        let input = "\u{feff}domain name,COUNTRY,category,price\r\n\
                     https://ok.com/,US,GOV,10\r\n\
                     ,US,GOV,10\r\n\
                     bad.com,US,GOV,cheap\r\n";
        let preview = parse_import(input);
        assert_eq!(preview.rows.len(), 1);
        assert_eq!(preview.rows[0].domain.domain_name.as_str(), "ok.com");
        assert_eq!(
            preview.errors,
            vec![
                ImportRowError {
                    row: 3,
                    error: "Domain Name is required".into()
                },
                ImportRowError {
                    row: 4,
                    error: "Price must be a number, got \"cheap\"".into()
                },
            ]
        );
    }

    #[test]
    fn status_accepts_labels_and_booleans() {
        assert_eq!(status_word("Sold"), Some(false));
        assert_eq!(status_word("yes"), Some(true));
        assert_eq!(channel_word("Not Posted"), Some(false));
        assert_eq!(channel_word("1"), Some(true));
        assert_eq!(channel_word("sometimes"), None);
    }

    #[test]
    fn reader_handles_multiline_quoted_fields() {
        let records = read_records("a,\"line one\nline two\",c\nd,e,f");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0][1], "line one\nline two");
        assert_eq!(records[1], vec!["d", "e", "f"]);
    }

    #[test]
    fn ticket_export_joins_domains() {
        let t = Ticket {
            id: EntityId::from("t1"),
            customer_id: "555".into(),
            request_domains: vec!["a.com".into(), "b.com".into()],
            status: TicketStatus::Sold,
            ..Ticket::default()
        };
        let csv = export_tickets(&[t]);
        insta::assert_snapshot!(csv.lines().next().unwrap(), @"Customer ID,Requested Domains,Request Time,Price,Status,Created At,Updated At");
        insta::assert_snapshot!(csv.lines().nth(1).unwrap(), @r#""555","a.com; b.com","","0","Sold","","""#);
    }

    #[test]
    fn search_export_fills_missing_details() {
        let rows = vec![
            SearchRow {
                input: "a.com".into(),
                found: true,
                domain: Some(domain("1", "A.com", 5, None)),
            },
            SearchRow {
                input: "zzz.com".into(),
                found: false,
                domain: None,
            },
        ];
        let csv = export_search_results(&rows);
        let lines: Vec<_> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        insta::assert_snapshot!(lines[0], @"Domain Name,Search Status,Country,Category,DA,PA,SS,Backlinks,Price,Status,Channel Status,Panel Link,Panel Username,Panel Password,Shell Link,Hosting Link,Hosting Username,Hosting Password,Created At,Updated At");
        assert!(lines[1].starts_with(r#""A.com","Found","US","GOV","5","0","0","0","0","Sold","Not Posted""#));
        insta::assert_snapshot!(lines[2], @r#""zzz.com","Not Found","-","-","0","0","0","0","0","-","-","","","","","","","","","""#);
    }
}
