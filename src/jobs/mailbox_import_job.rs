use std::sync::Arc;
use tokio_cron_scheduler::{Job, JobScheduler};

use crate::clients::Mailer;
use crate::ingest::MailboxImporter;

/// Scheduled mailbox import
///
/// Polls the relay on the configured cron expression; failures are
/// logged and the next tick retries. When attachments were processed and
/// SMTP is configured, a report mail goes out.
pub struct MailboxImportJob {
    importer: Arc<MailboxImporter>,
    mailer: Option<Arc<Mailer>>,
    schedule: String,
}

impl MailboxImportJob {
    pub fn new(
        importer: Arc<MailboxImporter>,
        mailer: Option<Arc<Mailer>>,
        schedule: String,
    ) -> Self {
        Self {
            importer,
            mailer,
            schedule,
        }
    }

    /// One poll plus the report mail
    async fn poll(importer: &MailboxImporter, mailer: Option<&Mailer>) {
        let summary = match importer.run().await {
            Ok(summary) => summary,
            Err(e) => {
                tracing::error!("Mailbox import job failed: {}", e);
                return;
            }
        };

        if summary.attachments_processed == 0 {
            tracing::debug!("Mailbox import job: nothing to do");
            return;
        }

        if let Some(mailer) = mailer {
            if let Err(e) = mailer
                .send_report("Mailbox import report", summary.report_body())
                .await
            {
                tracing::warn!("Report mail failed: {}", e);
            }
        }
    }

    /// Register this job with the scheduler
    pub async fn register(
        self,
        scheduler: &JobScheduler,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let importer = self.importer.clone();
        let mailer = self.mailer.clone();
        let schedule = self.schedule.clone();

        let job = Job::new_async(schedule.as_str(), move |_uuid, _lock| {
            let importer = importer.clone();
            let mailer = mailer.clone();

            Box::pin(async move {
                Self::poll(&importer, mailer.as_deref()).await;
            })
        })?;

        scheduler.add(job).await?;

        tracing::info!("Mailbox import job registered (schedule: {})", self.schedule);

        Ok(())
    }

    /// Run the import immediately (manual trigger)
    pub async fn run_now(&self) {
        Self::poll(&self.importer, self.mailer.as_deref()).await;
    }
}
