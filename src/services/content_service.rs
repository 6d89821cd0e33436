use serde_json::Value;
use tracing::info;
use uuid::Uuid;

use crate::{
    dto::content::{ContentSetSummary, RegisterContentSetRequest},
    error::ServiceError,
    state::{SharedState, paths, session::QuizItem},
};

/// Register a content set after validating every item.
pub async fn register_content_set(
    state: &SharedState,
    request: RegisterContentSetRequest,
) -> Result<ContentSetSummary, ServiceError> {
    let RegisterContentSetRequest { items } = request;

    if items.is_empty() {
        return Err(ServiceError::InvalidArgument(
            "a content set requires at least one item".into(),
        ));
    }
    for (index, item) in items.iter().enumerate() {
        validate_item(index, item)?;
    }

    let content_set_id = Uuid::new_v4().to_string();
    let payload = serde_json::to_value(&items)
        .map_err(|err| ServiceError::InvalidArgument(format!("unserialisable items: {err}")))?;
    state
        .store()
        .put(&paths::content_set(&content_set_id), payload)
        .await?;

    info!(%content_set_id, item_count = items.len(), "registered content set");

    Ok(ContentSetSummary {
        content_set_id,
        item_count: items.len(),
    })
}

/// Fetch a registered content set.
pub async fn get_content_set(
    state: &SharedState,
    content_set_id: &str,
) -> Result<Vec<QuizItem>, ServiceError> {
    let Some(value) = state
        .store()
        .get(&paths::content_set(content_set_id))
        .await?
    else {
        return Err(ServiceError::NotFound(format!(
            "content set `{content_set_id}` not found"
        )));
    };
    decode_items(content_set_id, value)
}

fn decode_items(content_set_id: &str, value: Value) -> Result<Vec<QuizItem>, ServiceError> {
    serde_json::from_value(value).map_err(|err| {
        ServiceError::InvalidState(format!(
            "content set `{content_set_id}` is corrupted: {err}"
        ))
    })
}

/// Validate the loosely structured item shape once, at load time.
fn validate_item(index: usize, item: &QuizItem) -> Result<(), ServiceError> {
    if item.prompt().trim().is_empty() {
        return Err(ServiceError::InvalidArgument(format!(
            "item {index}: prompt must not be empty"
        )));
    }
    if item.options().len() < 2 {
        return Err(ServiceError::InvalidArgument(format!(
            "item {index}: at least two options are required"
        )));
    }
    if item.answer_index() >= item.options().len() {
        return Err(ServiceError::InvalidArgument(format!(
            "item {index}: answer_index {} is out of range for {} options",
            item.answer_index(),
            item.options().len()
        )));
    }
    if !item.explanations().is_empty() && item.explanations().len() != item.options().len() {
        return Err(ServiceError::InvalidArgument(format!(
            "item {index}: explanations must be absent or match the option count"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::{config::AppConfig, state::AppState, store::memory::MemoryStore};

    use super::*;

    fn test_state() -> SharedState {
        AppState::new(Arc::new(MemoryStore::new()), AppConfig::default())
    }

    fn grammar_item(answer_index: usize) -> QuizItem {
        QuizItem::Grammar {
            sentence: "He ___ tea.".into(),
            options: vec!["drink".into(), "drinks".into()],
            answer_index,
            explanations: vec![],
        }
    }

    #[tokio::test]
    async fn register_then_fetch_roundtrips() {
        let state = test_state();
        let summary = register_content_set(
            &state,
            RegisterContentSetRequest {
                items: vec![grammar_item(1)],
            },
        )
        .await
        .unwrap();
        assert_eq!(summary.item_count, 1);

        let items = get_content_set(&state, &summary.content_set_id)
            .await
            .unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].answer_index(), 1);
    }

    #[tokio::test]
    async fn out_of_range_answer_is_rejected() {
        let state = test_state();
        let err = register_content_set(
            &state,
            RegisterContentSetRequest {
                items: vec![grammar_item(5)],
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn unknown_set_is_not_found() {
        let state = test_state();
        let err = get_content_set(&state, "nope").await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }
}
