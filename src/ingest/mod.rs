/// Import pipelines: CSV uploads, OCR drafts, mailbox polling
pub mod csv_import;
pub mod lead_draft;
pub mod mailbox_import;

pub use csv_import::{
    decode_csv_bytes, parse_futures_csv, parse_leads_csv, parse_rdn_csv, CsvImportError,
    ImportOutcome,
};
pub use lead_draft::LeadDraftParser;
pub use mailbox_import::{MailboxImportSummary, MailboxImporter};
