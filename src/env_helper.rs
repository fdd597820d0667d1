//!
//! Optional module for configuring clients from the environment

/// Build a relay client from environment variables
/// * `TIN_CHAT_URL` - answering service endpoint, e.g. `http://localhost:5000/chat`
/// * `TIN_CA` - optional PEM root certificate for the endpoint
/// * `TIN_TIMEOUT_SECS` - optional request timeout in seconds
pub fn relay() -> crate::Result<crate::RelayClient> {
    let url = std::env::var("TIN_CHAT_URL")
        .map_err(|_| crate::Error::MissingEnv("TIN_CHAT_URL".into()))?;
    tracing::info!("Using answering service at {}", url);

    let builder = crate::RelayClient::builder();

    let builder = match std::env::var("TIN_CA") {
        Ok(ca) => builder.add_root_certificate(ca.as_bytes())?,
        Err(_) => builder,
    };

    let builder = match std::env::var("TIN_TIMEOUT_SECS") {
        Ok(secs) => {
            let secs: u64 = secs.trim().parse().map_err(|_| {
                crate::Error::General(format!("TIN_TIMEOUT_SECS is not a number: {secs}"))
            })?;
            builder.timeout(std::time::Duration::from_secs(secs))
        }
        Err(_) => builder,
    };

    builder.build(&url)
}

/// Build a workload client from environment variables
/// * `TIN_WORKLOAD_URL` - execution backend, e.g. `http://localhost:8000/`
/// * `TIN_REPORT_URL` - where reports are served, defaults to `TIN_WORKLOAD_URL`
#[cfg(feature = "workload")]
pub fn workload() -> crate::Result<crate::workload::WorkloadClient> {
    let base = std::env::var("TIN_WORKLOAD_URL")
        .map_err(|_| crate::Error::MissingEnv("TIN_WORKLOAD_URL".into()))?;
    let reports = std::env::var("TIN_REPORT_URL").unwrap_or_else(|_| base.clone());
    tracing::info!("Using execution backend at {}", base);
    crate::workload::WorkloadClient::new(&base, &reports)
}
