use axum::{
    extract::{rejection::JsonRejection, FromRequest, Request},
    http::header,
    Json,
};
use serde::de::DeserializeOwned;

use crate::error::AppError;

/// JSON body extractor whose rejections use the API error body
pub struct ApiJson<T>(pub T);

impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(content_type) = req.headers().get(header::CONTENT_TYPE) {
            let media_type = content_type
                .to_str()
                .map_err(|_| invalid_content_type())?
                .split(';')
                .next()
                .unwrap_or("")
                .trim()
                .to_lowercase();

            if media_type != "application/json" {
                return Err(invalid_content_type());
            }
        }

        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(ApiJson(value)),
            Err(rejection) => Err(rejection_to_error(rejection)),
        }
    }
}

fn invalid_content_type() -> AppError {
    AppError::Validation("Content-Type must be application/json".to_string())
}

fn rejection_to_error(rejection: JsonRejection) -> AppError {
    match rejection {
        JsonRejection::JsonDataError(e) => {
            AppError::Validation(format!("Invalid request body: {}", e.body_text()))
        }
        JsonRejection::JsonSyntaxError(_) => {
            AppError::Validation("Request body is not valid JSON".to_string())
        }
        JsonRejection::MissingJsonContentType(_) => invalid_content_type(),
        other => AppError::Validation(other.body_text()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppResult;
    use axum::{routing::post, Router};
    use axum_test::TestServer;
    use http::StatusCode;
    use serde::Deserialize;
    use serde_json::{json, Value};

    #[derive(Deserialize)]
    #[serde(deny_unknown_fields)]
    struct Payload {
        name: String,
    }

    async fn echo(ApiJson(payload): ApiJson<Payload>) -> AppResult<String> {
        Ok(payload.name)
    }

    fn server() -> TestServer {
        TestServer::new(Router::new().route("/echo", post(echo))).unwrap()
    }

    #[tokio::test]
    async fn test_valid_body_accepted() {
        let response = server().post("/echo").json(&json!({"name": "plot"})).await;
        assert_eq!(response.status_code(), StatusCode::OK);
        assert_eq!(response.text(), "plot");
    }

    #[tokio::test]
    async fn test_bad_body_is_validation_error() {
        let response = server().post("/echo").json(&json!({"title": "x"})).await;
        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(response.json::<Value>()["kind"], "validation_error");

        let response = server()
            .post("/echo")
            .text("{not json")
            .content_type("application/json")
            .await;
        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(response.json::<Value>()["kind"], "validation_error");
    }

    #[tokio::test]
    async fn test_wrong_content_type_rejected() {
        let response = server()
            .post("/echo")
            .text("{\"name\":\"plot\"}")
            .await;
        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    }
}
