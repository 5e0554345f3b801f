/// Cron jobs and scheduled tasks module
///
/// Contains background jobs that run on a schedule:
/// - Mailbox polling and attachment import
pub mod mailbox_import_job;

pub use mailbox_import_job::MailboxImportJob;
