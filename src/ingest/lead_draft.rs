use regex::Regex;

use crate::database::enums::LeadSource;
use crate::database::models::NewLead;
use crate::ingest::csv_import::normalize_tax_id;

/// Extracts draft lead fields from OCR text
///
/// Business cards and letterheads are free-form, so this is best-effort:
/// the first plausible line becomes the company name, everything else is
/// pattern-matched.
pub struct LeadDraftParser {
    email_re: Regex,
    phone_re: Regex,
    tax_id_re: Regex,
}

impl LeadDraftParser {
    pub fn new() -> Self {
        Self {
            email_re: Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").unwrap(),
            phone_re: Regex::new(r"(?:\+?\d[\d\s\-()]{7,}\d)").unwrap(),
            // Candidate tax ids, separators included; checksum decides
            tax_id_re: Regex::new(r"\d[\d\s\-]{8,13}\d").unwrap(),
        }
    }

    /// Build a draft lead from recognised text; None when the text holds
    /// nothing usable
    pub fn parse(&self, text: &str) -> Option<NewLead> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        let email = self.email_re.find(text).map(|m| m.as_str().to_string());

        let tax_id = self
            .tax_id_re
            .find_iter(text)
            .find_map(|m| normalize_tax_id(m.as_str()));

        // Phone candidates that survive after dropping the tax id match
        let phone = self
            .phone_re
            .find_iter(text)
            .map(|m| m.as_str().trim().to_string())
            .find(|candidate| normalize_tax_id(candidate).is_none());

        let company_name = text
            .lines()
            .map(str::trim)
            .find(|line| {
                !line.is_empty()
                    && !self.email_re.is_match(line)
                    && !self.phone_re.is_match(line)
            })
            .map(str::to_string)?;

        let mut draft = NewLead::new(company_name, LeadSource::Ocr);
        draft.tax_id = tax_id;
        draft.email = email;
        draft.phone = phone;
        draft.notes = Some(format!("OCR draft:\n{}", text));
        Some(draft)
    }
}

impl Default for LeadDraftParser {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_business_card() {
        let parser = LeadDraftParser::new();
        let text = "Zakłady Mięsne Wierzba S.A.\n\
                    NIP: 526-104-08-28\n\
                    tel. +48 601 234 567\n\
                    biuro@wierzba.pl";

        let draft = parser.parse(text).unwrap();

        assert_eq!(draft.company_name, "Zakłady Mięsne Wierzba S.A.");
        assert_eq!(draft.tax_id.as_deref(), Some("5261040828"));
        assert_eq!(draft.email.as_deref(), Some("biuro@wierzba.pl"));
        assert!(draft.phone.unwrap().contains("601"));
        assert_eq!(draft.source, LeadSource::Ocr);
    }

    #[test]
    fn test_parse_skips_invalid_tax_id() {
        let parser = LeadDraftParser::new();
        let text = "Firma Krzak\nNIP: 123-456-78-90";

        let draft = parser.parse(text).unwrap();

        assert_eq!(draft.company_name, "Firma Krzak");
        assert!(draft.tax_id.is_none());
    }

    #[test]
    fn test_parse_empty_text() {
        let parser = LeadDraftParser::new();
        assert!(parser.parse("   \n  ").is_none());
    }

    #[test]
    fn test_parse_text_with_only_contacts() {
        // No line qualifies as a company name
        let parser = LeadDraftParser::new();
        assert!(parser.parse("jan@kowalski.pl").is_none());
    }
}
