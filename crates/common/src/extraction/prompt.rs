//! Fixed extraction instruction sent with every document

/// Instruction asking the model for exactly the twelve record keys as JSON
pub const EXTRACTION_PROMPT: &str = r#"You are a scientific paper metadata extractor. Analyze this PDF document and extract the following fields. Return ONLY a valid JSON object with these exact keys:

{
  "doi": "the DOI of the paper, e.g. 10.1234/example",
  "title": "the full title of the paper",
  "author": "all authors separated by semicolons",
  "publicationTitle": "the journal or conference name",
  "publicationDate": "publication date in YYYY-MM-DD or YYYY format",
  "url": "the URL if available, otherwise empty string",
  "keywords": "keywords separated by semicolons",
  "abstract": "the full abstract text",
  "publisher": "the publisher name",
  "fieldOfStudy": "the primary field of study",
  "isDataFusionPaper": true or false (whether this paper is related to data fusion, sensor fusion, or information fusion),
  "dataFusionClassificationReason": "brief explanation of why this is or is not a data fusion paper"
}

If a field cannot be determined from the text, use an empty string (or false for isDataFusionPaper).
Return ONLY the JSON object, no markdown formatting, no code blocks."#;
