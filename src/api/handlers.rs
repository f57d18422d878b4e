/// Health check
pub async fn health_check() -> &'static str {
    "OK"
}
