//! Outgoing request description.

use reqwest::Method;
use reqwest::multipart::{Form, Part};
use serde::Serialize;
use serde_json::Value;

use crate::Result;

/// One API call: method, path, body, and whether to attach the bearer token.
///
/// Requests are plain data and cheap to clone, so the same request can be
/// issued again after a token refresh.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub body: RequestBody,
    pub include_auth: bool,
}

/// Request payload.
#[derive(Debug, Clone, Default)]
pub enum RequestBody {
    #[default]
    Empty,
    Json(Value),
    Multipart(MultipartPayload),
}

impl ApiRequest {
    /// Create a request with no body that includes the bearer token.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: RequestBody::Empty,
            include_auth: true,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Attach a JSON body.
    ///
    /// # Errors
    ///
    /// Returns an error if `body` cannot be represented as JSON.
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self> {
        self.body = RequestBody::Json(serde_json::to_value(body)?);
        Ok(self)
    }

    /// Attach a multipart payload.
    pub fn multipart(mut self, payload: MultipartPayload) -> Self {
        self.body = RequestBody::Multipart(payload);
        self
    }

    /// Send without the `Authorization` header.
    pub fn without_auth(mut self) -> Self {
        self.include_auth = false;
        self
    }
}

/// A multipart form held as owned data so it can be rebuilt per attempt.
#[derive(Debug, Clone, Default)]
pub struct MultipartPayload {
    parts: Vec<MultipartPart>,
}

#[derive(Clone)]
struct MultipartPart {
    name: String,
    content: PartContent,
}

#[derive(Clone)]
enum PartContent {
    Text(String),
    File {
        file_name: String,
        content_type: Option<String>,
        data: Vec<u8>,
    },
}

impl MultipartPayload {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a plain text field.
    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parts.push(MultipartPart {
            name: name.into(),
            content: PartContent::Text(value.into()),
        });
        self
    }

    /// Add a file field.
    pub fn file(
        mut self,
        name: impl Into<String>,
        file_name: impl Into<String>,
        content_type: Option<String>,
        data: Vec<u8>,
    ) -> Self {
        self.parts.push(MultipartPart {
            name: name.into(),
            content: PartContent::File {
                file_name: file_name.into(),
                content_type,
                data,
            },
        });
        self
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Build a fresh `reqwest` form.
    pub(crate) fn to_form(&self) -> Result<Form> {
        let mut form = Form::new();
        for part in &self.parts {
            form = match &part.content {
                PartContent::Text(value) => form.text(part.name.clone(), value.clone()),
                PartContent::File {
                    file_name,
                    content_type,
                    data,
                } => {
                    let mut file = Part::bytes(data.clone()).file_name(file_name.clone());
                    if let Some(content_type) = content_type {
                        file = file.mime_str(content_type)?;
                    }
                    form.part(part.name.clone(), file)
                }
            };
        }
        Ok(form)
    }
}

// File contents are summarized rather than dumped.
impl std::fmt::Debug for MultipartPart {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.content {
            PartContent::Text(value) => f
                .debug_struct("Text")
                .field("name", &self.name)
                .field("value", value)
                .finish(),
            PartContent::File {
                file_name,
                content_type,
                data,
            } => f
                .debug_struct("File")
                .field("name", &self.name)
                .field("file_name", file_name)
                .field("content_type", content_type)
                .field("bytes", &data.len())
                .finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn requests_include_auth_by_default() {
        let request = ApiRequest::get("/projects");
        assert!(request.include_auth);
        assert_eq!(request.method, Method::GET);
        assert!(matches!(request.body, RequestBody::Empty));

        let request = ApiRequest::post("/auth/login").without_auth();
        assert!(!request.include_auth);
    }

    #[test]
    fn json_body() {
        let request = ApiRequest::put("/tasks/3")
            .json(&json!({"title": "Write docs"}))
            .unwrap();
        match request.body {
            RequestBody::Json(value) => assert_eq!(value["title"], "Write docs"),
            other => panic!("unexpected body: {:?}", other),
        }
    }

    #[test]
    fn multipart_builds_repeatedly() {
        let payload = MultipartPayload::new()
            .text("projectId", "7")
            .file("file", "notes.txt", Some("text/plain".into()), b"hello".to_vec());
        assert_eq!(payload.len(), 2);
        assert!(payload.to_form().is_ok());
        assert!(payload.to_form().is_ok());

        let debug = format!("{:?}", payload);
        assert!(debug.contains("notes.txt"));
        assert!(!debug.contains("hello"));
    }

    #[test]
    fn multipart_rejects_bad_mime() {
        let payload =
            MultipartPayload::new().file("file", "x.bin", Some("not a mime".into()), vec![1]);
        assert!(payload.to_form().is_err());
    }
}
