//! YApi publish fan-out
//!
//! After a successful response, each generated document is POSTed to the
//! configured YApi import endpoint as a form-encoded payload. The whole step
//! is best-effort telemetry: a missing setting skips it entirely, and a
//! failed upload is logged without affecting the remaining files or the
//! process exit status.

use std::time::Duration;

use swagger_gen_common::{Config, GeneratedFile};
use thiserror::Error;

/// Bound on each upload; transfers never block the plugin indefinitely.
const UPLOAD_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("transport error: {0}")]
    Transport(String),
}

impl From<reqwest::Error> for PublishError {
    fn from(err: reqwest::Error) -> Self {
        PublishError::Transport(err.to_string())
    }
}

/// One form-encoded upload to the import endpoint.
#[cfg_attr(test, mockall::automock)]
pub trait PublishTransport {
    fn upload(
        &self,
        addr: &str,
        token: &str,
        merge: &str,
        json: &str,
    ) -> Result<String, PublishError>;
}

pub struct HttpTransport {
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self, PublishError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(UPLOAD_TIMEOUT)
            .build()?;
        Ok(Self { client })
    }
}

impl PublishTransport for HttpTransport {
    fn upload(
        &self,
        addr: &str,
        token: &str,
        merge: &str,
        json: &str,
    ) -> Result<String, PublishError> {
        let form = [
            ("type", "swagger"),
            ("token", token),
            ("merge", merge),
            ("json", json),
        ];
        let response = self.client.post(addr).form(&form).send()?;
        Ok(response.text()?)
    }
}

/// Publish every generated file to YApi, if publishing is configured.
pub fn publish_all(config: &Config, files: &[GeneratedFile]) {
    let Some(merge) = config.yapi_merge.filter(|_| config.yapi_configured()) else {
        tracing::info!(
            url = %config.yapi_url,
            schema = %config.yapi_schema,
            merge = ?config.yapi_merge,
            "yapi publish not configured, skipping upload"
        );
        return;
    };
    let transport = match HttpTransport::new() {
        Ok(transport) => transport,
        Err(e) => {
            tracing::error!(error = %e, "failed to build yapi http client");
            return;
        }
    };
    let addr = format!(
        "{}://{}/api/open/import_data",
        config.yapi_schema, config.yapi_url
    );
    fan_out(&transport, &addr, &config.yapi_token, merge.as_str(), files);
}

/// Upload each file in turn; failures never abort the loop.
fn fan_out<T: PublishTransport>(
    transport: &T,
    addr: &str,
    token: &str,
    merge: &str,
    files: &[GeneratedFile],
) {
    for file in files {
        match transport.upload(addr, token, merge, &file.content) {
            Ok(body) => {
                tracing::info!(file = %file.name, response = %body, "uploaded swagger document to yapi");
            }
            Err(e) => {
                tracing::error!(file = %file.name, error = %e, "yapi upload failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use swagger_gen_common::MergeStrategy;

    fn two_files() -> Vec<GeneratedFile> {
        vec![
            GeneratedFile::new("a.swagger.json", "{\"a\":1}"),
            GeneratedFile::new("b.swagger.json", "{\"b\":2}"),
        ]
    }

    #[test]
    fn test_partial_publish_config_performs_no_calls() {
        // token present, url empty: the whole step is a no-op
        let config = Config {
            yapi_token: "token".to_string(),
            yapi_schema: "https".to_string(),
            yapi_merge: Some(MergeStrategy::Merge),
            ..Default::default()
        };
        assert!(!config.yapi_configured());
        // publish_all returns before building any transport
        publish_all(&config, &two_files());
    }

    #[test]
    fn test_fan_out_uploads_each_file_independently() {
        let mut transport = MockPublishTransport::new();
        transport
            .expect_upload()
            .withf(|addr, token, merge, json| {
                addr == "https://yapi.internal/api/open/import_data"
                    && token == "token"
                    && merge == "merge"
                    && json == "{\"a\":1}"
            })
            .times(1)
            .returning(|_, _, _, _| Err(PublishError::Transport("connection refused".to_string())));
        transport
            .expect_upload()
            .withf(|_, _, _, json| json == "{\"b\":2}")
            .times(1)
            .returning(|_, _, _, _| Ok("{\"errcode\":0}".to_string()));

        // the first failure must not prevent the second upload
        fan_out(
            &transport,
            "https://yapi.internal/api/open/import_data",
            "token",
            "merge",
            &two_files(),
        );
    }
}
