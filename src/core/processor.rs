// src/core/processor.rs
//! Resume processing pipeline: encode, submit, validate, extract, render

use serde_json::{Map, Value};
use tracing::{error, info};

use crate::config::ServiceConfig;
use crate::core::renderer::{RenderOptions, TemplateRenderer};
use crate::core::ServiceClient;
use crate::error::{FormatterError, FormatterResult};
use crate::types::resume::{ProcessingOutcome, RenderedOutput, ResumeUpload};
use crate::types::response::ProcessingResponse;

pub struct ResumeProcessor {
    client: ServiceClient,
    renderer: TemplateRenderer,
}

impl ResumeProcessor {
    pub fn new(service: &ServiceConfig, render: RenderOptions) -> FormatterResult<Self> {
        Ok(Self {
            client: ServiceClient::new(service)?,
            renderer: TemplateRenderer::new(render),
        })
    }

    pub fn endpoint(&self) -> &str {
        self.client.endpoint()
    }

    pub async fn process(
        &self,
        upload: &ResumeUpload,
        template: &str,
    ) -> FormatterResult<ProcessingOutcome> {
        let encoded = upload.encode_base64();
        let response = self
            .client
            .submit_resume(&upload.filename, &encoded)
            .await?;

        let data = extract_data(response.status, &response.body)?;
        info!(
            "Extracted {} fields from {}",
            data.len(),
            upload.filename
        );

        render_outcome(&self.renderer, data, template)
    }
}

/// Validate the endpoint's answer and pull out the `data` mapping.
///
/// Anything but 200 is an API error. A missing or null `data` is an empty
/// mapping.
pub fn extract_data(status: u16, body: &str) -> FormatterResult<Map<String, Value>> {
    if status != 200 {
        error!("API error {}: {}", status, body);
        return Err(FormatterError::Api {
            status,
            body: body.to_string(),
        });
    }

    let parsed: ProcessingResponse = serde_json::from_str(body)
        .map_err(|e| FormatterError::InvalidResponse(format!("body is not a JSON object: {}", e)))?;

    match parsed.data {
        None | Some(Value::Null) => Ok(Map::new()),
        Some(Value::Object(map)) => Ok(map),
        Some(other) => Err(FormatterError::InvalidResponse(format!(
            "data must be an object, got {}",
            json_kind(&other)
        ))),
    }
}

pub fn render_outcome(
    renderer: &TemplateRenderer,
    data: Map<String, Value>,
    template: &str,
) -> FormatterResult<ProcessingOutcome> {
    let raw = renderer.render(template, &data)?;
    Ok(ProcessingOutcome {
        data,
        output: RenderedOutput::new(raw),
    })
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;
    use tokio::net::TcpListener;

    fn service(endpoint: String, api_key: Option<&str>) -> ServiceConfig {
        ServiceConfig {
            endpoint: Some(endpoint),
            api_key: api_key.map(str::to_string),
            timeout_seconds: 5,
        }
    }

    #[test]
    fn test_non_200_is_api_error() {
        let err = extract_data(404, "not found").unwrap_err();
        match err {
            FormatterError::Api { status, body } => {
                assert_eq!(status, 404);
                assert_eq!(body, "not found");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(matches!(extract_data(201, "{}"), Err(FormatterError::Api { status: 201, .. })));
    }

    #[test]
    fn test_extracts_data_field() {
        let data = extract_data(200, r#"{"data": {"name": "Alice"}, "meta": 1}"#).unwrap();
        assert_eq!(Value::Object(data), json!({"name": "Alice"}));
    }

    #[test]
    fn test_missing_or_null_data_is_empty() {
        assert!(extract_data(200, "{}").unwrap().is_empty());
        assert!(extract_data(200, r#"{"data": null}"#).unwrap().is_empty());
    }

    #[test]
    fn test_unusable_bodies_are_invalid_response() {
        for body in ["<html>oops</html>", "[1, 2]", r#"{"data": "text"}"#] {
            assert!(matches!(
                extract_data(200, body),
                Err(FormatterError::InvalidResponse(_))
            ));
        }
    }

    #[test]
    fn test_extracted_data_keeps_key_order() {
        let data = extract_data(200, r#"{"data": {"zeta": 1, "alpha": 2, "mid": 3}}"#).unwrap();
        let keys: Vec<_> = data.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_processor_requires_endpoint() {
        let config = ServiceConfig {
            endpoint: None,
            api_key: None,
            timeout_seconds: 60,
        };
        assert!(matches!(
            ResumeProcessor::new(&config, RenderOptions::default()),
            Err(FormatterError::MissingConfiguration(_))
        ));
    }

    #[tokio::test]
    async fn test_process_renders_extracted_data() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/score")
            .match_header("content-type", "application/json")
            .match_header("authorization", "Bearer secret")
            .match_body(Matcher::Json(json!({
                "resume_filename": "alice.pdf",
                "resume_base64_encoded": "JVBERg==",
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"data": {"name": "Alice"}}"#)
            .create_async()
            .await;

        let url = format!("{}/score", server.url());
        let processor =
            ResumeProcessor::new(&service(url, Some("secret")), RenderOptions::default()).unwrap();
        let upload = ResumeUpload::new("alice.pdf", b"%PDF".to_vec());

        let outcome = processor
            .process(&upload, "<h1>{{ name }} – CV</h1>")
            .await
            .unwrap();

        assert_eq!(Value::Object(outcome.data.clone()), json!({"name": "Alice"}));
        assert_eq!(outcome.output.raw(), "<h1>Alice – CV</h1>");
        assert_eq!(outcome.output.sanitized(), "<h1>Alice &#8211; CV</h1>");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_process_omits_authorization_without_key() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/score")
            .match_header("authorization", Matcher::Missing)
            .with_status(200)
            .with_body(r#"{"data": {}}"#)
            .create_async()
            .await;

        let url = format!("{}/score", server.url());
        let processor = ResumeProcessor::new(&service(url, None), RenderOptions::default()).unwrap();
        let upload = ResumeUpload::new("cv.pdf", vec![1, 2, 3]);

        let outcome = processor.process(&upload, "static").await.unwrap();
        assert!(outcome.data.is_empty());
        assert_eq!(outcome.output.raw(), "static");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_process_surfaces_api_status() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/score")
            .with_status(404)
            .with_body(r#"{"error": "no such deployment"}"#)
            .create_async()
            .await;

        let url = format!("{}/score", server.url());
        let processor = ResumeProcessor::new(&service(url, None), RenderOptions::default()).unwrap();
        let upload = ResumeUpload::new("cv.pdf", vec![0]);

        let err = processor.process(&upload, "{{ name }}").await.unwrap_err();
        assert!(matches!(err, FormatterError::Api { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_network_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/score", listener.local_addr().unwrap());
        drop(listener);

        let processor = ResumeProcessor::new(&service(url, None), RenderOptions::default()).unwrap();
        let upload = ResumeUpload::new("cv.pdf", vec![0]);

        let err = processor.process(&upload, "x").await.unwrap_err();
        assert!(matches!(err, FormatterError::Network(_)));
    }
}
