// file: src/client/transport.rs
// description: narrow http capability used by the client, with a reqwest binding
// reference: https://docs.rs/reqwest

use crate::error::{ClientError, Result};
use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

/// One field of a multipart/form-data request.
#[derive(Debug, Clone, PartialEq)]
pub enum FormField {
    Text {
        name: String,
        value: String,
    },
    File {
        name: String,
        filename: String,
        content_type: String,
        data: Vec<u8>,
    },
}

impl FormField {
    pub fn text(name: &str, value: impl Into<String>) -> Self {
        FormField::Text {
            name: name.to_string(),
            value: value.into(),
        }
    }

    pub fn file(name: &str, filename: &str, content_type: &str, data: Vec<u8>) -> Self {
        FormField::File {
            name: name.to_string(),
            filename: filename.to_string(),
            content_type: content_type.to_string(),
            data,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            FormField::Text { name, .. } | FormField::File { name, .. } => name,
        }
    }
}

/// Body of a POST. The variant decides the content type; the transport owns
/// the wire encoding.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Json(Vec<u8>),
    Form(Vec<FormField>),
}

impl RequestBody {
    pub fn content_type(&self) -> &'static str {
        match self {
            RequestBody::Json(_) => "application/json",
            RequestBody::Form(_) => "multipart/form-data",
        }
    }
}

/// Status and fully read body of an HTTP response.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl TransportResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Decodes a success body, classifying any other status as a service error.
    pub fn into_json<T: DeserializeOwned>(self, url: &str) -> Result<T> {
        if !self.is_success() {
            return Err(ClientError::from_status(self.status, url, &self.body));
        }
        serde_json::from_slice(&self.body).map_err(|e| ClientError::decode(url, e))
    }
}

/// The only way the client talks to the network. Errors are always
/// `ClientError::Transport`; status handling is left to the caller.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn post(&self, url: &str, body: RequestBody) -> Result<TransportResponse>;

    async fn get(&self, url: &str) -> Result<TransportResponse>;
}

#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::transport("<client>", e))?;
        Ok(Self { client })
    }

    async fn read(url: &str, response: reqwest::Response) -> Result<TransportResponse> {
        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| ClientError::transport(url, format!("reading body: {}", e)))?;
        debug!("{} -> {} ({} bytes)", url, status, body.len());
        Ok(TransportResponse::new(status, body.to_vec()))
    }
}

fn build_form(url: &str, fields: Vec<FormField>) -> Result<Form> {
    let mut form = Form::new();
    for field in fields {
        form = match field {
            FormField::Text { name, value } => form.text(name, value),
            FormField::File {
                name,
                filename,
                content_type,
                data,
            } => {
                let part = Part::bytes(data)
                    .file_name(filename)
                    .mime_str(&content_type)
                    .map_err(|e| ClientError::transport(url, e))?;
                form.part(name, part)
            }
        };
    }
    Ok(form)
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post(&self, url: &str, body: RequestBody) -> Result<TransportResponse> {
        let content_type = body.content_type();
        let request = self.client.post(url);
        let request = match body {
            RequestBody::Json(bytes) => {
                debug!("POST {} ({}, {} bytes)", url, content_type, bytes.len());
                request.header(CONTENT_TYPE, content_type).body(bytes)
            }
            RequestBody::Form(fields) => {
                debug!("POST {} ({}, {} fields)", url, content_type, fields.len());
                // reqwest sets the boundary parameter itself
                request.multipart(build_form(url, fields)?)
            }
        };

        let response = request
            .send()
            .await
            .map_err(|e| ClientError::transport(url, e))?;
        Self::read(url, response).await
    }

    async fn get(&self, url: &str) -> Result<TransportResponse> {
        debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ClientError::transport(url, e))?;
        Self::read(url, response).await
    }
}

#[cfg(test)]
pub(crate) mod stub {
    use super::*;
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq)]
    pub enum Method {
        Get,
        Post,
    }

    #[derive(Debug, Clone)]
    pub struct RecordedRequest {
        pub method: Method,
        pub url: String,
        pub body: Option<RequestBody>,
    }

    impl RecordedRequest {
        pub fn json_body(&self) -> Option<&[u8]> {
            match &self.body {
                Some(RequestBody::Json(bytes)) => Some(bytes),
                _ => None,
            }
        }

        pub fn form_field(&self, name: &str) -> Option<&FormField> {
            match &self.body {
                Some(RequestBody::Form(fields)) => fields.iter().find(|f| f.name() == name),
                _ => None,
            }
        }

        pub fn form_text(&self, name: &str) -> Option<&str> {
            match self.form_field(name)? {
                FormField::Text { value, .. } => Some(value),
                FormField::File { .. } => None,
            }
        }

        /// Filename of an uploaded file field.
        pub fn upload_name(&self, name: &str) -> Option<&str> {
            match self.form_field(name)? {
                FormField::File { filename, .. } => Some(filename),
                FormField::Text { .. } => None,
            }
        }

        pub fn query_param(&self, key: &str) -> Option<String> {
            let url = url::Url::parse(&self.url).ok()?;
            url.query_pairs()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.into_owned())
        }
    }

    type Handler = Box<dyn Fn(&RecordedRequest) -> Result<TransportResponse> + Send + Sync>;
    type Delay = Box<dyn Fn(&RecordedRequest) -> Option<Duration> + Send + Sync>;

    /// Scripted transport: every request is recorded and answered by `handler`.
    /// Requests are recorded once answered, so a delayed request shows up late.
    pub struct StubTransport {
        handler: Handler,
        delay: Option<Delay>,
        requests: Mutex<Vec<RecordedRequest>>,
    }

    impl StubTransport {
        pub fn new(
            handler: impl Fn(&RecordedRequest) -> Result<TransportResponse> + Send + Sync + 'static,
        ) -> Self {
            Self {
                handler: Box::new(handler),
                delay: None,
                requests: Mutex::new(Vec::new()),
            }
        }

        pub fn json(status: u16, body: &'static str) -> Self {
            Self::new(move |_| Ok(TransportResponse::new(status, body)))
        }

        /// Holds back the answer to selected requests.
        pub fn with_delay(
            mut self,
            delay: impl Fn(&RecordedRequest) -> Option<Duration> + Send + Sync + 'static,
        ) -> Self {
            self.delay = Some(Box::new(delay));
            self
        }

        pub fn requests(&self) -> Vec<RecordedRequest> {
            self.requests.lock().unwrap().clone()
        }

        async fn handle(&self, request: RecordedRequest) -> Result<TransportResponse> {
            let pause = self.delay.as_ref().and_then(|delay| delay(&request));
            if let Some(pause) = pause {
                tokio::time::sleep(pause).await;
            }
            let response = (self.handler)(&request);
            self.requests.lock().unwrap().push(request);
            response
        }
    }

    #[async_trait]
    impl Transport for StubTransport {
        async fn post(&self, url: &str, body: RequestBody) -> Result<TransportResponse> {
            self.handle(RecordedRequest {
                method: Method::Post,
                url: url.to_string(),
                body: Some(body),
            })
            .await
        }

        async fn get(&self, url: &str) -> Result<TransportResponse> {
            self.handle(RecordedRequest {
                method: Method::Get,
                url: url.to_string(),
                body: None,
            })
            .await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Status {
        status: String,
    }

    #[test]
    fn test_into_json_success() {
        let resp = TransportResponse::new(200, r#"{"status": "healthy"}"#);
        let status: Status = resp.into_json("http://svc/health").unwrap();
        assert_eq!(status.status, "healthy");
    }

    #[test]
    fn test_non_success_is_service_error_regardless_of_body() {
        let resp = TransportResponse::new(404, r#"{"status": "healthy"}"#);
        let err = resp.into_json::<Status>("http://svc/health").unwrap_err();
        assert_eq!(err.status(), Some(404));
    }

    #[test]
    fn test_bad_success_body_is_decode_error() {
        let resp = TransportResponse::new(200, "<html>");
        let err = resp.into_json::<Status>("http://svc/health").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decode);
    }

    #[test]
    fn test_request_body_content_type() {
        assert_eq!(RequestBody::Json(vec![]).content_type(), "application/json");
        assert_eq!(RequestBody::Form(vec![]).content_type(), "multipart/form-data");
    }

    #[test]
    fn test_build_form_rejects_bad_mime() {
        let fields = vec![
            FormField::text("limit", "5"),
            FormField::file("image", "a.png", "not a mime", vec![1, 2, 3]),
        ];
        let err = build_form("http://svc/images", fields).err().unwrap();
        assert_eq!(err.kind(), ErrorKind::Transport);

        let fields = vec![FormField::file("image", "a.png", "image/png", vec![1])];
        assert!(build_form("http://svc/images", fields).is_ok());
    }

    #[tokio::test]
    async fn test_unreachable_host_is_transport_error() {
        let transport = HttpTransport::new(Duration::from_secs(2)).unwrap();
        // port 9 (discard) on loopback is almost never listening
        let err = transport.get("http://127.0.0.1:9/health").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transport);
        assert!(err.to_string().contains("127.0.0.1:9"));
    }
}
