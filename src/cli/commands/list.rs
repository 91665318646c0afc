//! List command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::knowledge::ContentStore;
use anyhow::Result;

/// Run the list command.
pub async fn run_list(settings: Settings) -> Result<()> {
    preflight::check(Operation::List, &settings)?;
    let store = ContentStore::from_settings(&settings)?;

    match store.list().await {
        Ok(mut items) => {
            if items.is_empty() {
                Output::info("Nothing learned yet. Use 'vett ask <question>' to get started.");
                return Ok(());
            }

            items.sort_by(|a, b| b.learned_at.cmp(&a.learned_at));
            Output::header(&format!("Learned Knowledge ({})", items.len()));
            println!();

            for item in &items {
                Output::knowledge_item(item);
            }
        }
        Err(e) => {
            Output::error(&format!("Failed to list knowledge: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
