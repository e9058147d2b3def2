use serde::de::DeserializeOwned;

use crate::config::BackendSettings;
use crate::http_client::{self, MultipartFile};

use super::error::extract_detail;
use super::wire::{
    HealthResponse, MessageResponse, PredictRequest, PredictResponse, StatusResponse,
    TrainRequest, TrainResponse, UploadResponse,
};
use super::{ApiError, Backend, DatasetFile};

const MAX_RESPONSE_BYTES: usize = 256 * 1024;
const MAX_ERROR_BODY_BYTES: usize = 64 * 1024;

/// [`Backend`] over HTTP with the configured timeouts.
pub struct HttpBackend {
    agent: ureq::Agent,
    base_url: String,
}

impl HttpBackend {
    pub fn new(settings: &BackendSettings) -> Self {
        Self {
            agent: http_client::agent(settings),
            base_url: settings.base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        tracing::debug!("GET {path}");
        parse_response(self.agent.get(&self.url(path)).call())
    }

    fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        tracing::debug!("DELETE {path}");
        parse_response(self.agent.delete(&self.url(path)).call())
    }

    fn post_json<B: serde::Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        tracing::debug!("POST {path}");
        let request = self
            .agent
            .post(&self.url(path))
            .set("Accept", "application/json");
        parse_response(request.send_json(body))
    }
}

impl Backend for HttpBackend {
    fn health(&self) -> Result<HealthResponse, ApiError> {
        self.get("/health")
    }

    fn status(&self) -> Result<StatusResponse, ApiError> {
        self.get("/status")
    }

    fn upload(&self, dataset: &DatasetFile) -> Result<UploadResponse, ApiError> {
        tracing::debug!("POST /upload ({} bytes)", dataset.bytes.len());
        let form = MultipartFile::new("file", &dataset.file_name, &dataset.bytes);
        let request = self
            .agent
            .post(&self.url("/upload"))
            .set("Accept", "application/json")
            .set("Content-Type", &form.content_type());
        parse_response(request.send_bytes(form.body()))
    }

    fn train(&self, request: &TrainRequest) -> Result<TrainResponse, ApiError> {
        self.post_json("/train", request)
    }

    fn predict(&self, request: &PredictRequest) -> Result<PredictResponse, ApiError> {
        self.post_json("/predict", request)
    }

    fn reset(&self) -> Result<MessageResponse, ApiError> {
        self.delete("/reset")
    }

    fn delete_model(&self) -> Result<MessageResponse, ApiError> {
        self.delete("/model")
    }
}

fn parse_response<T: DeserializeOwned>(
    result: Result<ureq::Response, ureq::Error>,
) -> Result<T, ApiError> {
    let response = match result {
        Ok(response) => response,
        Err(ureq::Error::Status(code, response)) => {
            let body = http_client::read_response_text(response, MAX_ERROR_BODY_BYTES)
                .unwrap_or_default();
            return Err(ApiError::Backend {
                status: code,
                detail: extract_detail(&body),
            });
        }
        Err(ureq::Error::Transport(err)) => return Err(ApiError::Transport(err.to_string())),
    };
    let body = http_client::read_response_text(response, MAX_RESPONSE_BYTES)
        .map_err(|err| ApiError::InvalidResponse(err.to_string()))?;
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return Err(ApiError::InvalidResponse("Empty response body".to_string()));
    }
    serde_json::from_str(trimmed).map_err(|err| ApiError::InvalidResponse(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufRead, BufReader, Read, Write};
    use std::net::TcpListener;
    use std::sync::mpsc;
    use std::thread;

    /// A captured request: the request line, headers, and raw body.
    struct Captured {
        request_line: String,
        headers: Vec<String>,
        body: Vec<u8>,
    }

    fn serve_once(status_line: &str, body: &str) -> (HttpBackend, mpsc::Receiver<Captured>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let response = format!(
            "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let Ok((stream, _)) = listener.accept() else {
                return;
            };
            let mut reader = BufReader::new(stream);
            let mut request_line = String::new();
            let _ = reader.read_line(&mut request_line);
            let mut headers = Vec::new();
            let mut content_length = 0usize;
            loop {
                let mut line = String::new();
                if reader.read_line(&mut line).unwrap_or(0) == 0 {
                    break;
                }
                let line = line.trim_end().to_string();
                if line.is_empty() {
                    break;
                }
                if let Some((name, value)) = line.split_once(':') {
                    if name.eq_ignore_ascii_case("content-length") {
                        content_length = value.trim().parse().unwrap_or(0);
                    }
                }
                headers.push(line);
            }
            let mut body = vec![0u8; content_length];
            let _ = reader.read_exact(&mut body);
            let mut stream = reader.into_inner();
            let _ = stream.write_all(response.as_bytes());
            let _ = tx.send(Captured {
                request_line: request_line.trim_end().to_string(),
                headers,
                body,
            });
        });
        let settings = BackendSettings {
            base_url: format!("http://{addr}"),
            ..BackendSettings::default()
        };
        (HttpBackend::new(&settings), rx)
    }

    #[test]
    fn status_hits_status_endpoint() {
        let (backend, rx) = serve_once(
            "200 OK",
            r#"{"model_loaded": false, "data_loaded": true, "training_state": {"training": true, "current_epoch": 2, "total_epochs": 10}}"#,
        );
        let status = backend.status().unwrap();
        assert!(status.data_loaded);
        assert!(!status.model_loaded);
        assert_eq!(status.training_state.current_epoch, 2);
        let captured = rx.recv().unwrap();
        assert_eq!(captured.request_line, "GET /status HTTP/1.1");
    }

    #[test]
    fn predict_posts_feature_vector_json() {
        let (backend, rx) = serve_once("200 OK", r#"{"prediction": 4.25}"#);
        let response = backend
            .predict(&PredictRequest {
                feature_vector: [0.1, 0.2, 0.3, 0.4, 0.5],
            })
            .unwrap();
        assert_eq!(response.prediction, 4.25);
        assert_eq!(response.confidence, None);

        let captured = rx.recv().unwrap();
        assert_eq!(captured.request_line, "POST /predict HTTP/1.1");
        let body: serde_json::Value = serde_json::from_slice(&captured.body).unwrap();
        assert_eq!(body["feature_vector"], serde_json::json!([0.1, 0.2, 0.3, 0.4, 0.5]));
    }

    #[test]
    fn upload_sends_multipart_file_field() {
        let (backend, rx) = serve_once(
            "200 OK",
            r#"{"message": "ok", "data_shape": {"X": [10, 5], "y": [10]}}"#,
        );
        let dataset = DatasetFile {
            file_name: "train.pkl".to_string(),
            bytes: b"pickle-bytes".to_vec(),
        };
        let response = backend.upload(&dataset).unwrap();
        assert_eq!(response.message, "ok");

        let captured = rx.recv().unwrap();
        assert_eq!(captured.request_line, "POST /upload HTTP/1.1");
        assert!(
            captured
                .headers
                .iter()
                .any(|header| header.to_ascii_lowercase().starts_with("content-type: multipart/form-data; boundary="))
        );
        let body = String::from_utf8_lossy(&captured.body);
        assert!(body.contains("name=\"file\"; filename=\"train.pkl\""));
        assert!(body.contains("pickle-bytes"));
    }

    #[test]
    fn error_status_carries_detail() {
        let (backend, _rx) = serve_once(
            "503 Service Unavailable",
            r#"{"detail": "Model is not loaded. Please wait or check server status."}"#,
        );
        let err = backend
            .predict(&PredictRequest {
                feature_vector: [1.0; 5],
            })
            .unwrap_err();
        assert_eq!(
            err,
            ApiError::Backend {
                status: 503,
                detail: Some("Model is not loaded. Please wait or check server status.".to_string()),
            }
        );
    }

    #[test]
    fn reset_and_delete_use_delete_method() {
        let (backend, rx) = serve_once("200 OK", r#"{"message": "All state cleared successfully."}"#);
        assert_eq!(
            backend.reset().unwrap().message,
            "All state cleared successfully."
        );
        assert_eq!(rx.recv().unwrap().request_line, "DELETE /reset HTTP/1.1");

        let (backend, rx) = serve_once("200 OK", r#"{"message": "Model deleted successfully."}"#);
        backend.delete_model().unwrap();
        assert_eq!(rx.recv().unwrap().request_line, "DELETE /model HTTP/1.1");
    }

    #[test]
    fn unparseable_success_body_is_invalid_response() {
        let (backend, _rx) = serve_once("200 OK", "not json");
        let err = backend.health().unwrap_err();
        assert!(matches!(err, ApiError::InvalidResponse(_)));
    }

    #[test]
    fn unreachable_backend_is_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let settings = BackendSettings {
            base_url: format!("http://{addr}"),
            connect_timeout_secs: 1,
            request_timeout_secs: 1,
        };
        let err = HttpBackend::new(&settings).status().unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)));
    }
}
