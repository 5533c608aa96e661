//! Document endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/documents` | The caller's documents, oldest first |
//! | `POST`   | `/documents` | 201; insight extraction is best-effort |
//! | `GET`    | `/documents/{id}` | 403 if another owner's, 404 if absent |
//! | `PUT`    | `/documents/{id}` | Merge-update |
//! | `DELETE` | `/documents/{id}` | 204 |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use finwise_bridge::InsightSource;
use finwise_core::{
  RecordId,
  document::{DocumentUpdate, NewDocument, UserDocument},
  store::FinanceStore,
};

use crate::{
  AppState,
  auth::CurrentUser,
  error::{ApiError, Violations},
};

/// Fetch a document, enforcing ownership. Absent ids map to 404, another
/// owner's to 403.
async fn fetch_owned<S>(
  store: &S,
  user: &CurrentUser,
  id: RecordId,
) -> Result<UserDocument, ApiError>
where
  S: FinanceStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let document = store
    .get_document(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("document {id} not found")))?;
  if document.owner_id != user.user_id {
    return Err(ApiError::Forbidden);
  }
  Ok(document)
}

/// `GET /documents`
pub async fn list<S, B>(
  State(state): State<AppState<S, B>>,
  user: CurrentUser,
) -> Result<Json<Vec<UserDocument>>, ApiError>
where
  S: FinanceStore + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
  B: InsightSource + Send + Sync + 'static,
{
  let documents = state
    .store
    .list_documents(user.user_id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(documents))
}

/// `POST /documents` — stores the document, then asks the sidecar for
/// insights. The upload itself never fails on sidecar trouble; a failed
/// extraction just leaves `insights` unset.
pub async fn create<S, B>(
  State(state): State<AppState<S, B>>,
  user: CurrentUser,
  Json(input): Json<NewDocument>,
) -> Result<impl IntoResponse, ApiError>
where
  S: FinanceStore + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
  B: InsightSource + Send + Sync + 'static,
{
  let mut v = Violations::default();
  v.require(
    !input.filename.trim().is_empty(),
    "filename: must not be empty",
  );
  v.finish()?;

  let mut document = state
    .store
    .create_document(user.user_id, input)
    .await
    .map_err(ApiError::store)?;

  match state
    .bridge
    .document_insights(&document.filename, document.content.as_deref())
    .await
  {
    Ok(insights) => {
      document = state
        .store
        .update_document(document.id, DocumentUpdate {
          insights: Some(insights),
          ..Default::default()
        })
        .await
        .map_err(ApiError::store)?;
    }
    Err(error) => {
      tracing::warn!(
        document_id = document.id,
        %error,
        "document insight extraction failed"
      );
    }
  }

  Ok((StatusCode::CREATED, Json(document)))
}

/// `GET /documents/{id}`
pub async fn get<S, B>(
  State(state): State<AppState<S, B>>,
  user: CurrentUser,
  Path(id): Path<RecordId>,
) -> Result<Json<UserDocument>, ApiError>
where
  S: FinanceStore + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
  B: InsightSource + Send + Sync + 'static,
{
  let document = fetch_owned(state.store.as_ref(), &user, id).await?;
  Ok(Json(document))
}

/// `PUT /documents/{id}`
pub async fn update<S, B>(
  State(state): State<AppState<S, B>>,
  user: CurrentUser,
  Path(id): Path<RecordId>,
  Json(update): Json<DocumentUpdate>,
) -> Result<Json<UserDocument>, ApiError>
where
  S: FinanceStore + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
  B: InsightSource + Send + Sync + 'static,
{
  fetch_owned(state.store.as_ref(), &user, id).await?;

  let mut v = Violations::default();
  if let Some(filename) = &update.filename {
    v.require(!filename.trim().is_empty(), "filename: must not be empty");
  }
  v.finish()?;

  let updated = state
    .store
    .update_document(id, update)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(updated))
}

/// `DELETE /documents/{id}`
pub async fn delete<S, B>(
  State(state): State<AppState<S, B>>,
  user: CurrentUser,
  Path(id): Path<RecordId>,
) -> Result<StatusCode, ApiError>
where
  S: FinanceStore + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
  B: InsightSource + Send + Sync + 'static,
{
  fetch_owned(state.store.as_ref(), &user, id).await?;
  state
    .store
    .delete_document(id)
    .await
    .map_err(ApiError::store)?;
  Ok(StatusCode::NO_CONTENT)
}
