// src/analysis/client.rs
use std::time::Duration;
use reqwest::blocking::multipart::{Form, Part};
use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::{CarAnalysis, EndpointSettings};
use crate::input::ImageFile;

/// Multipart field carrying the image.
pub const IMAGE_FIELD: &str = "image";

/// User-facing failure of one analysis attempt.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalyzeError {
    #[error("Please upload a valid image file (PNG, JPG, or JPEG)")]
    InvalidFormat,

    #[error("The uploaded image does not appear to be a car")]
    NotCar,

    #[error("No image was provided")]
    NoImage,

    #[error("Unable to process the image response")]
    InvalidResponse,

    #[error("Failed to analyze image")]
    Failed,
}

impl AnalyzeError {
    /// Maps the endpoint's `errorType` classifier.
    pub fn from_error_type(error_type: Option<&str>) -> Self {
        match error_type {
            Some("INVALID_FORMAT") => Self::InvalidFormat,
            Some("NOT_CAR") => Self::NotCar,
            Some("NO_IMAGE") => Self::NoImage,
            Some("INVALID_RESPONSE") => Self::InvalidResponse,
            _ => Self::Failed,
        }
    }
}

pub trait Analyzer: Send + Sync {
    fn analyze(&self, image: &ImageFile) -> Result<CarAnalysis, AnalyzeError>;
}

/// Turns a status and body into an analysis or a classified failure.
pub fn classify_response(status: StatusCode, body: &str) -> Result<CarAnalysis, AnalyzeError> {
    if !status.is_success() {
        let error_type = serde_json::from_str::<Value>(body)
            .ok()
            .and_then(|v| v.get("errorType").and_then(Value::as_str).map(str::to_string));
        let error = AnalyzeError::from_error_type(error_type.as_deref());
        warn!(%status, error_type = ?error_type, "Analysis rejected");
        return Err(error);
    }

    CarAnalysis::from_json(body).map_err(|e| {
        warn!("Malformed analysis body: {}", e);
        AnalyzeError::Failed
    })
}

#[derive(Debug, Clone)]
pub struct HttpAnalyzer {
    client: Client,
    url: String,
}

impl HttpAnalyzer {
    pub fn new(endpoint: &EndpointSettings) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(endpoint.request_timeout_secs.map(Duration::from_secs))
            .build()?;
        Ok(Self {
            client,
            url: endpoint.url(),
        })
    }
}

impl Analyzer for HttpAnalyzer {
    fn analyze(&self, image: &ImageFile) -> Result<CarAnalysis, AnalyzeError> {
        let part = Part::bytes(image.bytes.clone())
            .file_name(image.name.clone())
            .mime_str(&image.mime)
            .map_err(|e| {
                warn!("Invalid MIME type {}: {}", image.mime, e);
                AnalyzeError::InvalidFormat
            })?;
        let form = Form::new().part(IMAGE_FIELD, part);

        info!(url = %self.url, name = %image.name, bytes = image.bytes.len(), "Submitting image");
        let response = self
            .client
            .post(&self.url)
            .multipart(form)
            .send()
            .map_err(|e| {
                warn!("Analysis request failed: {}", e);
                AnalyzeError::Failed
            })?;

        let status = response.status();
        let body = response.text().map_err(|e| {
            warn!("Failed to read analysis response: {}", e);
            AnalyzeError::Failed
        })?;
        debug!(%status, bytes = body.len(), "Analysis response received");

        classify_response(status, &body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufRead, BufReader, Read, Write};
    use std::net::TcpListener;
    use std::thread;

    #[test]
    fn maps_error_classifiers() {
        let cases = [
            (r#"{"errorType":"INVALID_FORMAT"}"#, AnalyzeError::InvalidFormat),
            (r#"{"errorType":"NOT_CAR"}"#, AnalyzeError::NotCar),
            (r#"{"errorType":"NO_IMAGE"}"#, AnalyzeError::NoImage),
            (r#"{"errorType":"INVALID_RESPONSE"}"#, AnalyzeError::InvalidResponse),
            (r#"{"errorType":"SOMETHING_NEW"}"#, AnalyzeError::Failed),
            (r#"{"error":"No image provided"}"#, AnalyzeError::Failed),
            ("<html>bad gateway</html>", AnalyzeError::Failed),
        ];
        for (body, expected) in cases {
            assert_eq!(classify_response(StatusCode::BAD_REQUEST, body), Err(expected), "{}", body);
        }
    }

    #[test]
    fn not_car_message() {
        let err = classify_response(StatusCode::UNPROCESSABLE_ENTITY, r#"{"errorType":"NOT_CAR"}"#)
            .unwrap_err();
        assert_eq!(err.to_string(), "The uploaded image does not appear to be a car");
    }

    #[test]
    fn success_body_must_be_an_object() {
        assert_eq!(classify_response(StatusCode::OK, "[]"), Err(AnalyzeError::Failed));
        assert_eq!(classify_response(StatusCode::OK, "oops"), Err(AnalyzeError::Failed));

        let analysis = classify_response(StatusCode::OK, r#"{"Model":"Fiat 500"}"#).unwrap();
        assert_eq!(analysis.model.as_deref(), Some("Fiat 500"));
    }

    /// Serves one request and hands back what was received.
    fn serve_once(status_line: &'static str, body: &'static str) -> (String, thread::JoinHandle<Vec<u8>>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream);

            let mut head = Vec::new();
            let mut content_length = 0usize;
            loop {
                let mut line = String::new();
                reader.read_line(&mut line).unwrap();
                if let Some((name, value)) = line.split_once(':') {
                    if name.eq_ignore_ascii_case("content-length") {
                        content_length = value.trim().parse().unwrap();
                    }
                }
                head.extend_from_slice(line.as_bytes());
                if line == "\r\n" || line.is_empty() {
                    break;
                }
            }
            let mut request_body = vec![0u8; content_length];
            reader.read_exact(&mut request_body).unwrap();
            head.extend_from_slice(&request_body);

            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            reader.get_mut().write_all(response.as_bytes()).unwrap();
            head
        });

        (format!("http://{}", addr), handle)
    }

    fn endpoint(base_url: String) -> EndpointSettings {
        EndpointSettings {
            base_url,
            ..EndpointSettings::default()
        }
    }

    #[test]
    fn posts_multipart_image_field() {
        let (base_url, server) = serve_once("200 OK", r#"{"Car Make":"Volvo","HP":[100,150]}"#);
        let analyzer = HttpAnalyzer::new(&endpoint(base_url)).unwrap();

        let image = ImageFile {
            name: "car.png".to_string(),
            mime: "image/png".to_string(),
            bytes: b"PNGDATA".to_vec(),
        };
        let analysis = analyzer.analyze(&image).unwrap();
        assert_eq!(analysis.make.as_deref(), Some("Volvo"));

        let request = String::from_utf8_lossy(&server.join().unwrap()).into_owned();
        assert!(request.starts_with("POST /api/analyze "));
        assert!(request.to_ascii_lowercase().contains("content-type: multipart/form-data"));
        assert!(request.contains(r#"name="image"; filename="car.png""#));
        assert!(request.contains("PNGDATA"));
    }

    #[test]
    fn http_error_uses_classifier() {
        let (base_url, server) = serve_once("400 Bad Request", r#"{"errorType":"NOT_CAR"}"#);
        let analyzer = HttpAnalyzer::new(&endpoint(base_url)).unwrap();

        let image = ImageFile::new("cat.jpg", vec![0xFF, 0xD8, 0xFF, 0xE0]);
        assert_eq!(analyzer.analyze(&image), Err(AnalyzeError::NotCar));
        server.join().unwrap();
    }

    #[test]
    fn unreachable_endpoint_is_generic_failure() {
        // Bind then drop to get a port nobody listens on
        let port = TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap().port();
        let analyzer = HttpAnalyzer::new(&endpoint(format!("http://127.0.0.1:{}", port))).unwrap();

        let image = ImageFile::new("car.gif", b"GIF89a".to_vec());
        assert_eq!(analyzer.analyze(&image), Err(AnalyzeError::Failed));
    }
}
