//! Vault fixtures.

use lorebase_vault::{InMemoryVault, NoteDraft, VaultStore};
use std::sync::Arc;

/// Build a vault seeded with a few notes for retrieval tests.
pub async fn seeded_vault() -> Arc<InMemoryVault> {
    let vault = Arc::new(InMemoryVault::new());
    for (title, content) in [
        ("Sourdough starter", "Feed the starter every morning with rye."),
        ("Garden plan", "Tomatoes along the south fence, basil between."),
        ("Reading list", "Finish the distributed systems survey."),
    ] {
        vault
            .create_note(NoteDraft {
                title: title.to_string(),
                content: content.to_string(),
                folder_id: None,
            })
            .await
            .expect("seed note");
    }
    vault
}
