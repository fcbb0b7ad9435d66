use crate::config::HttpOptions;
use crate::error::ApiError;
use crate::truncate_body;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_ENCODING, CONTENT_TYPE};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware, RequestBuilder};
use reqwest_retry::{policies::ExponentialBackoff, RetryTransientMiddleware};
use serde::de::DeserializeOwned;
use serde::Serialize;

static DEFAULT_ACCEPT_ENCODING: &str = "br;q=1.0, gzip;q=0.6, deflate;q=0.4, *;q=0.2";

pub fn build_client(opts: &HttpOptions) -> Result<ClientWithMiddleware, anyhow::Error> {
    let mut map = HeaderMap::new();
    map.append(
        ACCEPT_ENCODING,
        HeaderValue::from_static(DEFAULT_ACCEPT_ENCODING),
    );
    let client = reqwest::ClientBuilder::new()
        .connect_timeout(opts.connect_timeout)
        .timeout(opts.timeout)
        .use_rustls_tls()
        .default_headers(map)
        .build()?;
    let retry_policy = ExponentialBackoff::builder().build_with_max_retries(opts.max_retries);
    Ok(ClientBuilder::new(client)
        .with(RetryTransientMiddleware::new_with_policy(retry_policy))
        .build())
}

pub fn with_json_body<T: Serialize + ?Sized>(
    request: RequestBuilder,
    body: &T,
) -> Result<RequestBuilder, anyhow::Error> {
    Ok(request
        .header(CONTENT_TYPE, "application/json")
        .body(serde_json::to_vec(body)?))
}

/// Sends the request and decodes a JSON response, failing on any non-2xx status.
pub async fn send_json<T: DeserializeOwned>(
    marketplace: &str,
    request: RequestBuilder,
) -> Result<T, anyhow::Error> {
    let resp = request.header(ACCEPT, "application/json").send().await?;
    let status = resp.status();
    let text = resp.text().await?;
    if !status.is_success() {
        return Err(ApiError::Status {
            marketplace: marketplace.to_string(),
            status: status.as_u16(),
            body: truncate_body(&text),
        }
        .into());
    }
    serde_json::from_str::<T>(&text).map_err(|err| {
        anyhow::anyhow!(
            "{marketplace} API decode error: {err}. Body: {}",
            truncate_body(&text)
        )
    })
}
