//! Chat query endpoint

use axum::{
    async_trait,
    extract::{FromRequest, Request, State},
    http::header::CONTENT_TYPE,
    Form, Json,
};

use crate::error::{Error, Result};
use crate::server::state::AppState;
use crate::types::{QueryRequest, QueryResponse};

/// A question sent as JSON or as an urlencoded form
pub struct QuestionInput(pub QueryRequest);

#[async_trait]
impl<S> FromRequest<S> for QuestionInput
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request(req: Request, state: &S) -> std::result::Result<Self, Self::Rejection> {
        let is_form = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.starts_with("application/x-www-form-urlencoded"))
            .unwrap_or(false);

        let request = if is_form {
            let Form(request) = Form::<QueryRequest>::from_request(req, state)
                .await
                .map_err(|e| Error::BadRequest(e.body_text()))?;
            request
        } else {
            let Json(request) = Json::<QueryRequest>::from_request(req, state)
                .await
                .map_err(|e| Error::BadRequest(e.body_text()))?;
            request
        };

        if request.question.trim().is_empty() {
            return Err(Error::BadRequest("question must not be empty".to_string()));
        }

        Ok(Self(request))
    }
}

/// POST /query - Answer a question with the tool-calling agent
pub async fn query_chatbot(
    State(state): State<AppState>,
    QuestionInput(request): QuestionInput,
) -> Result<Json<QueryResponse>> {
    tracing::info!("Query request received: {}", request.question);

    let graph = state.agent()?;
    let result = graph.invoke(&request.question).await?;

    tracing::info!(
        "Query answered in {} steps with {} tool calls",
        result.steps,
        result.tool_calls.len()
    );

    Ok(Json(QueryResponse {
        answer: result.answer,
    }))
}
