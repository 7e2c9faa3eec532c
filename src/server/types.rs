use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct DiagnosisResponse {
    pub diagnosis: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub detail: String,
}
