//! CSV export of saved papers
//!
//! Fixed twelve-column layout. Every cell is quoted with embedded quotes
//! doubled, and the data-fusion flag is written as `TRUE` / `FALSE`.

use crate::db::models::Paper;

/// Header row, in the column order of [`crate::record::RECORD_FIELDS`]
pub const CSV_HEADERS: [&str; 12] = [
    "DOI",
    "Title",
    "Author",
    "Publication Title",
    "PublicationDate",
    "URL",
    "Keywords",
    "Abstract",
    "Publisher",
    "Field of Study",
    "IsDataFusionPaper",
    "DataFusionClassificationReason",
];

/// File name offered to the browser
pub const EXPORT_FILE_NAME: &str = "papers_export.csv";

fn csv_escape(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

fn flag(value: bool) -> &'static str {
    if value { "TRUE" } else { "FALSE" }
}

fn paper_row(p: &Paper) -> String {
    [
        p.doi.as_str(),
        p.title.as_str(),
        p.author.as_str(),
        p.publication_title.as_str(),
        p.publication_date.as_str(),
        p.url.as_str(),
        p.keywords.as_str(),
        p.abstract_text.as_str(),
        p.publisher.as_str(),
        p.field_of_study.as_str(),
        flag(p.is_data_fusion_paper),
        p.data_fusion_classification_reason.as_str(),
    ]
    .iter()
    .map(|cell| csv_escape(cell))
    .collect::<Vec<_>>()
    .join(",")
}

/// Render papers as CSV, header first, rows joined with `\n`
pub fn papers_to_csv(papers: &[Paper]) -> String {
    std::iter::once(CSV_HEADERS.join(","))
        .chain(papers.iter().map(paper_row))
        .collect::<Vec<_>>()
        .join("\n")
}
