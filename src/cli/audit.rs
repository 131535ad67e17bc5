//! Audit command: print the tail of the keyring audit log.

use crate::cli::output;
use crate::core::audit::{AuditLog, AuditOutcome};
use crate::core::config::Config;
use crate::error::Result;

/// Show the last `lines` audit records.
pub async fn execute(config: &Config, lines: usize) -> Result<()> {
    let path = config.audit_log_path();
    let records = AuditLog::read_tail(&path, lines).await?;

    if records.is_empty() {
        output::dimmed(&format!("no audit records in {}", path.display()));
        return Ok(());
    }

    output::header(&format!(
        "{} audit {}",
        records.len(),
        output::pluralize("record", records.len())
    ));
    for record in &records {
        let line = record.to_string();
        match record.outcome {
            AuditOutcome::Ok => println!("  {}", line),
            AuditOutcome::Failed => output::warn(&line),
        }
    }
    Ok(())
}
