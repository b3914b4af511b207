use crate::api::Mode;
use crate::commands::{loaded, Out};
use crate::model::{Summary, UserId};
use crate::sync::Snapshot;
use crate::{Config, Result};

/// Loads the transactions and summary of `user_id` and lists them.
pub async fn list(config: Config, mode: Mode, user_id: Option<UserId>) -> Result<Out<Snapshot>> {
    let snapshot = loaded(&config, mode, user_id).await?.snapshot().await;

    let count = snapshot.transactions().len();
    let mut lines = vec![
        summary_line(snapshot.summary()),
        format!("{} transaction{}", count, if count == 1 { "" } else { "s" }),
    ];
    lines.extend(snapshot.transactions().iter().map(|t| {
        format!(
            "  {:>8}  {:<10}  {:>12}  {:<16}  {}",
            t.id().to_string(),
            t.date().map(|d| d.to_string()).unwrap_or_default(),
            t.amount().to_string(),
            t.category(),
            t.title().unwrap_or_default()
        )
    }));
    let message = lines.join("\n");
    Ok(Out::new(message, snapshot))
}

/// Loads the summary of `user_id` and prints it.
pub async fn summary(config: Config, mode: Mode, user_id: Option<UserId>) -> Result<Out<Summary>> {
    let summary = *loaded(&config, mode, user_id).await?.snapshot().await.summary();
    Ok(Out::new(summary_line(&summary), summary))
}

fn summary_line(summary: &Summary) -> String {
    format!(
        "Balance {}, income {}, expenses {}",
        summary.balance(),
        summary.income(),
        summary.expenses()
    )
}
