//! ureq agent for the backend, bounded body reads, and the upload form encoder.

use std::io::Read;

use crate::config::BackendSettings;

/// Build an agent whose timeouts come from the backend settings.
///
/// Read and write timeouts share `request_timeout`; expiry surfaces as a
/// transport error.
pub(crate) fn agent(settings: &BackendSettings) -> ureq::Agent {
    ureq::AgentBuilder::new()
        .timeout_connect(settings.connect_timeout())
        .timeout_read(settings.request_timeout())
        .timeout_write(settings.request_timeout())
        .user_agent(concat!("fivedash/", env!("CARGO_PKG_VERSION")))
        .build()
}

/// Why a response body could not be read.
#[derive(Debug, thiserror::Error)]
pub(crate) enum BodyError {
    #[error("Response body larger than {limit} bytes")]
    TooLarge { limit: usize },
    #[error("Response body is not UTF-8")]
    NotUtf8,
    #[error("Failed to read response body: {0}")]
    Io(#[from] std::io::Error),
}

/// Read the whole body as text, refusing anything over `limit` bytes.
///
/// A `Content-Length` over the limit is rejected before reading.
pub(crate) fn read_response_text(
    response: ureq::Response,
    limit: usize,
) -> Result<String, BodyError> {
    let declared = response
        .header("Content-Length")
        .and_then(|value| value.trim().parse::<u64>().ok());
    if declared.is_some_and(|length| length > limit as u64) {
        return Err(BodyError::TooLarge { limit });
    }
    let mut bytes = Vec::new();
    response
        .into_reader()
        .take(limit as u64 + 1)
        .read_to_end(&mut bytes)?;
    if bytes.len() > limit {
        return Err(BodyError::TooLarge { limit });
    }
    String::from_utf8(bytes).map_err(|_| BodyError::NotUtf8)
}

/// A `multipart/form-data` body with a single file part.
pub(crate) struct MultipartFile {
    boundary: String,
    body: Vec<u8>,
}

impl MultipartFile {
    /// Encode `bytes` as the form field `field` with the given file name.
    pub(crate) fn new(field: &str, file_name: &str, bytes: &[u8]) -> Self {
        let boundary = random_boundary();
        let safe_name = file_name.replace(['"', '\r', '\n'], "_");
        let mut body = Vec::with_capacity(bytes.len() + 256);
        body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
        body.extend_from_slice(
            format!("Content-Disposition: form-data; name=\"{field}\"; filename=\"{safe_name}\"\r\n")
                .as_bytes(),
        );
        body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
        body.extend_from_slice(bytes);
        body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
        Self { boundary, body }
    }

    pub(crate) fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    pub(crate) fn body(&self) -> &[u8] {
        &self.body
    }
}

fn random_boundary() -> String {
    let suffix: String = (0..24)
        .map(|_| format!("{:x}", rand::random::<u8>() % 16))
        .collect();
    format!("----fivedash{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::net::TcpListener;

    /// Answer one GET with a raw HTTP response.
    fn fetch(raw_response: String) -> ureq::Response {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/status", listener.local_addr().unwrap());
        std::thread::spawn(move || {
            if let Ok((mut stream, _)) = listener.accept() {
                let mut request = [0u8; 1024];
                let _ = stream.read(&mut request);
                let _ = stream.write_all(raw_response.as_bytes());
            }
        });
        agent(&BackendSettings::default()).get(&url).call().unwrap()
    }

    #[test]
    fn declared_length_over_limit_is_refused() {
        let response = fetch("HTTP/1.1 200 OK\r\nContent-Length: 100\r\n\r\n{}".to_string());
        let err = read_response_text(response, 10).unwrap_err();
        assert!(matches!(err, BodyError::TooLarge { limit: 10 }));
    }

    #[test]
    fn undeclared_body_is_cut_at_limit() {
        let body = "x".repeat(32);
        let response = fetch(format!("HTTP/1.0 200 OK\r\n\r\n{body}"));
        assert!(matches!(
            read_response_text(response, 16),
            Err(BodyError::TooLarge { .. })
        ));
    }

    #[test]
    fn small_json_body_reads_back() {
        let body = r#"{"status": "healthy"}"#;
        let response = fetch(format!(
            "HTTP/1.1 200 OK\r\nContent-Length: {}\r\n\r\n{body}",
            body.len()
        ));
        assert_eq!(read_response_text(response, 1024).unwrap(), body);
    }

    #[test]
    fn multipart_body_wraps_file_bytes() {
        let part = MultipartFile::new("file", "data.pkl", b"\x80\x04payload");
        let boundary = part
            .content_type()
            .strip_prefix("multipart/form-data; boundary=")
            .unwrap()
            .to_string();
        let body = part.body();
        let text = String::from_utf8_lossy(body);
        assert!(text.starts_with(&format!("--{boundary}\r\n")));
        assert!(text.contains("name=\"file\"; filename=\"data.pkl\""));
        assert!(text.ends_with(&format!("\r\n--{boundary}--\r\n")));
        assert!(body.windows(9).any(|window| window == b"\x80\x04payload"));
    }

    #[test]
    fn multipart_file_name_cannot_break_header() {
        let part = MultipartFile::new("file", "evil\"\r\nX: y.pkl", b"");
        let text = String::from_utf8_lossy(part.body()).to_string();
        assert!(text.contains("filename=\"evil___X: y.pkl\""));
    }
}
