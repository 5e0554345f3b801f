use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

use crate::clients::{MailboxClient, MailboxError};
use crate::database::enums::LeadSource;
use crate::database::repositories::{EnergyPriceRepository, FuturesRepository, LeadRepository};
use crate::ingest::csv_import::{
    decode_csv_bytes, parse_futures_csv, parse_leads_csv, parse_rdn_csv, ImportOutcome,
};

/// Summary of one mailbox poll
#[derive(Debug, Clone, Default, Serialize, ToSchema)]
pub struct MailboxImportSummary {
    /// Messages seen in the unread folder
    pub messages: usize,

    /// CSV attachments that went through an importer
    pub attachments_processed: usize,

    /// Attachments skipped (not CSV, or unrecognised filename)
    pub attachments_skipped: usize,

    pub outcome: ImportOutcome,
}

impl MailboxImportSummary {
    /// Plain-text body for the report mail
    pub fn report_body(&self) -> String {
        let mut body = format!(
            "Mailbox import finished.\n\n\
             Messages: {}\n\
             Attachments processed: {}\n\
             Attachments skipped: {}\n\
             Rows imported: {}\n\
             Rows skipped: {}\n",
            self.messages,
            self.attachments_processed,
            self.attachments_skipped,
            self.outcome.imported,
            self.outcome.skipped,
        );

        if !self.outcome.errors.is_empty() {
            body.push_str("\nProblems:\n");
            for error in &self.outcome.errors {
                body.push_str("  - ");
                body.push_str(error);
                body.push('\n');
            }
        }

        body
    }
}

/// Polls the mailbox relay and routes CSV attachments to the importers
///
/// Attachment routing is by filename prefix: `rdn*` to the RDN importer,
/// `futures*` to the futures importer, `leads*` to the CRM importer.
pub struct MailboxImporter {
    mailbox: Arc<MailboxClient>,
    energy_prices: Arc<dyn EnergyPriceRepository>,
    futures: Arc<dyn FuturesRepository>,
    leads: Arc<dyn LeadRepository>,
}

impl MailboxImporter {
    pub fn new(
        mailbox: Arc<MailboxClient>,
        energy_prices: Arc<dyn EnergyPriceRepository>,
        futures: Arc<dyn FuturesRepository>,
        leads: Arc<dyn LeadRepository>,
    ) -> Self {
        Self {
            mailbox,
            energy_prices,
            futures,
            leads,
        }
    }

    /// One full poll: fetch, import, mark processed
    pub async fn run(&self) -> Result<MailboxImportSummary, MailboxError> {
        let messages = self.mailbox.fetch_unread().await?;

        let mut summary = MailboxImportSummary {
            messages: messages.len(),
            ..Default::default()
        };

        for message in messages {
            tracing::info!(
                "Processing mailbox message '{}' from {}",
                message.subject,
                message.from
            );

            for attachment in &message.attachments {
                if !attachment.is_csv() {
                    summary.attachments_skipped += 1;
                    continue;
                }

                match self.import_attachment(&attachment.filename, attachment.decode()?) {
                    Some(outcome) => {
                        summary.attachments_processed += 1;
                        summary.outcome.merge(outcome);
                    }
                    None => {
                        tracing::warn!(
                            "Attachment '{}' has no matching importer",
                            attachment.filename
                        );
                        summary.attachments_skipped += 1;
                    }
                }
            }

            self.mailbox.mark_processed(&message.id).await?;
        }

        tracing::info!(
            "Mailbox import done: {} rows from {} attachments",
            summary.outcome.imported,
            summary.attachments_processed
        );

        Ok(summary)
    }

    fn import_attachment(&self, filename: &str, bytes: Vec<u8>) -> Option<ImportOutcome> {
        let text = decode_csv_bytes(&bytes);
        let name = filename.to_lowercase();

        let outcome = if name.starts_with("rdn") {
            self.import_rdn(filename, &text)
        } else if name.starts_with("futures") {
            self.import_futures(filename, &text)
        } else if name.starts_with("leads") {
            self.import_leads(filename, &text)
        } else {
            return None;
        };

        Some(outcome)
    }

    fn import_rdn(&self, filename: &str, text: &str) -> ImportOutcome {
        match parse_rdn_csv(text) {
            Ok((ticks, errors)) => {
                let attempted = ticks.len();
                match self.energy_prices.upsert_batch(ticks) {
                    Ok(imported) => ImportOutcome {
                        imported,
                        skipped: attempted - imported,
                        errors: prefix_errors(filename, errors),
                    },
                    Err(e) => file_error(filename, &e.to_string()),
                }
            }
            Err(e) => file_error(filename, &e.to_string()),
        }
    }

    fn import_futures(&self, filename: &str, text: &str) -> ImportOutcome {
        match parse_futures_csv(text) {
            Ok((ticks, errors)) => {
                let attempted = ticks.len();
                match self.futures.upsert_batch(ticks) {
                    Ok(imported) => ImportOutcome {
                        imported,
                        skipped: attempted - imported,
                        errors: prefix_errors(filename, errors),
                    },
                    Err(e) => file_error(filename, &e.to_string()),
                }
            }
            Err(e) => file_error(filename, &e.to_string()),
        }
    }

    fn import_leads(&self, filename: &str, text: &str) -> ImportOutcome {
        match parse_leads_csv(text, LeadSource::Mailbox) {
            Ok((leads, errors)) => {
                let attempted = leads.len();
                match self.leads.upsert_batch(leads) {
                    Ok(imported) => ImportOutcome {
                        imported,
                        skipped: attempted - imported,
                        errors: prefix_errors(filename, errors),
                    },
                    Err(e) => file_error(filename, &e.to_string()),
                }
            }
            Err(e) => file_error(filename, &e.to_string()),
        }
    }
}

fn prefix_errors(filename: &str, errors: Vec<String>) -> Vec<String> {
    errors
        .into_iter()
        .map(|e| format!("{}: {}", filename, e))
        .collect()
}

fn file_error(filename: &str, message: &str) -> ImportOutcome {
    ImportOutcome {
        imported: 0,
        skipped: 0,
        errors: vec![format!("{}: {}", filename, message)],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_body_lists_problems() {
        let summary = MailboxImportSummary {
            messages: 2,
            attachments_processed: 1,
            attachments_skipped: 1,
            outcome: ImportOutcome {
                imported: 24,
                skipped: 0,
                errors: vec!["rdn.csv: row 7: invalid hour".to_string()],
            },
        };

        let body = summary.report_body();

        assert!(body.contains("Rows imported: 24"));
        assert!(body.contains("rdn.csv: row 7"));
    }

    #[test]
    fn test_report_body_without_problems() {
        let summary = MailboxImportSummary::default();
        assert!(!summary.report_body().contains("Problems"));
    }
}
