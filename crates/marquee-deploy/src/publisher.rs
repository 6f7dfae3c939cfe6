//! S3 publishing.
//!
//! Every operation applies to each bucket of the target in turn, under the
//! project's deployed name as key prefix.

use std::error::Error;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use aws_sdk_s3::Client;
use aws_sdk_s3::types::{Delete, ObjectIdentifier};
use marquee_config::{Config, ConfigError, DeploymentTarget};

use crate::gzip::{collect_files, is_gzip_type};

/// Configuration for S3 publishing.
#[derive(Debug, Clone)]
pub struct PublishConfig {
    /// Buckets receiving every upload.
    pub buckets: Vec<String>,
    /// Key prefix (the project's deployed name).
    pub prefix: String,
    /// S3-compatible endpoint URL.
    pub endpoint: Option<String>,
    /// AWS region.
    pub region: String,
    /// `Cache-Control: max-age` in seconds.
    pub cache_max_age: u32,
    /// Extensions whose files are stored gzipped.
    pub gzip_types: Vec<String>,
}

impl PublishConfig {
    /// Publishing settings for a deployed target.
    pub fn for_target(config: &Config, target: DeploymentTarget) -> Result<Self, ConfigError> {
        Ok(Self {
            buckets: config.require_buckets(target)?,
            prefix: config.project.deployed_name().to_owned(),
            endpoint: config.deploy.endpoint.clone(),
            region: config.deploy.region.clone(),
            cache_max_age: config.deploy.cache_max_age,
            gzip_types: config.deploy.gzip_types.clone(),
        })
    }
}

/// Error returned by the publisher.
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("S3 error: {0}")]
    S3(String),
    #[error("Directory not found: {0}")]
    DirectoryNotFound(PathBuf),
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Uploads to and deletes from the target's buckets.
pub struct S3Publisher {
    config: PublishConfig,
}

impl S3Publisher {
    #[must_use]
    pub fn new(config: PublishConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &PublishConfig {
        &self.config
    }

    /// Upload every file under `directory` to every bucket.
    ///
    /// Files with a gzip type are expected to be gzipped already and are sent
    /// with `Content-Encoding: gzip`. Returns the number of objects written.
    pub async fn publish(&self, directory: &Path) -> Result<usize, PublishError> {
        if !directory.is_dir() {
            return Err(PublishError::DirectoryNotFound(directory.to_path_buf()));
        }

        let files = collect_files(directory)?;
        let client = self.build_client().await;
        let mut uploaded = 0;

        for bucket in &self.config.buckets {
            for (relative_path, abs_path) in &files {
                let gzipped = is_gzip_type(abs_path, &self.config.gzip_types);
                self.put(&client, bucket, relative_path, abs_path, gzipped)
                    .await?;
                uploaded += 1;
            }
            tracing::info!(bucket = %bucket, files = files.len(), "Published");
        }

        Ok(uploaded)
    }

    /// Upload a single uncompressed file to `relative_path` in every bucket.
    pub async fn put_file(&self, file: &Path, relative_path: &str) -> Result<(), PublishError> {
        if !file.is_file() {
            return Err(PublishError::FileNotFound(file.to_path_buf()));
        }

        let client = self.build_client().await;
        for bucket in &self.config.buckets {
            self.put(&client, bucket, relative_path, file, false).await?;
        }
        Ok(())
    }

    /// Delete every object under the prefix in every bucket.
    ///
    /// Returns the number of objects deleted.
    pub async fn destroy(&self) -> Result<usize, PublishError> {
        let client = self.build_client().await;
        let prefix = format!("{}/", self.config.prefix);
        let mut deleted = 0;

        for bucket in &self.config.buckets {
            let mut continuation_token = None;
            loop {
                let page = client
                    .list_objects_v2()
                    .bucket(bucket)
                    .prefix(&prefix)
                    .set_continuation_token(continuation_token.take())
                    .send()
                    .await
                    .map_err(|e| PublishError::S3(error_chain(&e)))?;

                let objects = page
                    .contents()
                    .iter()
                    .filter_map(|object| object.key())
                    .map(|key| ObjectIdentifier::builder().key(key).build())
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(|e| PublishError::S3(error_chain(&e)))?;

                if !objects.is_empty() {
                    let count = objects.len();
                    let delete = Delete::builder()
                        .set_objects(Some(objects))
                        .quiet(true)
                        .build()
                        .map_err(|e| PublishError::S3(error_chain(&e)))?;
                    client
                        .delete_objects()
                        .bucket(bucket)
                        .delete(delete)
                        .send()
                        .await
                        .map_err(|e| PublishError::S3(error_chain(&e)))?;
                    deleted += count;
                    tracing::debug!(bucket = %bucket, count, "Deleted objects");
                }

                match page.next_continuation_token() {
                    Some(token) if page.is_truncated().unwrap_or(false) => {
                        continuation_token = Some(token.to_owned());
                    }
                    _ => break,
                }
            }
            tracing::info!(bucket = %bucket, prefix = %prefix, "Destroyed");
        }

        Ok(deleted)
    }

    async fn put(
        &self,
        client: &Client,
        bucket: &str,
        relative_path: &str,
        abs_path: &Path,
        gzipped: bool,
    ) -> Result<(), PublishError> {
        let key = self.build_key(relative_path);
        let body = fs::read(abs_path)?;

        let mut request = client
            .put_object()
            .bucket(bucket)
            .key(&key)
            .body(body.into())
            .content_type(marquee_assets::mime_for(relative_path))
            .cache_control(self.cache_control());
        if gzipped {
            request = request.content_encoding("gzip");
        }

        request
            .send()
            .await
            .map_err(|e| PublishError::S3(error_chain(&e)))?;

        tracing::debug!(bucket = %bucket, key = %key, gzipped, "Uploaded");
        Ok(())
    }

    async fn build_client(&self) -> Client {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_config::Region::new(self.config.region.clone()));

        if let Some(endpoint) = &self.config.endpoint {
            loader = loader.endpoint_url(endpoint);
        }

        let sdk_config = loader.load().await;

        // Custom endpoints (LocalStack, MinIO) need path-style addressing.
        if self.config.endpoint.is_some() {
            let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
                .force_path_style(true)
                .build();
            return Client::from_conf(s3_config);
        }

        Client::new(&sdk_config)
    }

    fn build_key(&self, relative_path: &str) -> String {
        format!(
            "{}/{}",
            self.config.prefix,
            relative_path.trim_start_matches('/')
        )
    }

    fn cache_control(&self) -> String {
        format!("max-age={}", self.config.cache_max_age)
    }
}

/// Walk the error source chain and join all messages.
fn error_chain(err: &dyn Error) -> String {
    let mut msgs = vec![err.to_string()];
    let mut source = err.source();
    while let Some(s) = source {
        msgs.push(s.to_string());
        source = s.source();
    }
    msgs.join(": ")
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn publisher() -> S3Publisher {
        S3Publisher::new(PublishConfig {
            buckets: vec!["apps.example.org".to_owned()],
            prefix: "oscars".to_owned(),
            endpoint: None,
            region: "us-east-1".to_owned(),
            cache_max_age: 5,
            gzip_types: vec!["html".to_owned()],
        })
    }

    #[test]
    fn build_key_prefixes_deployed_name() {
        assert_eq!(publisher().build_key("index.html"), "oscars/index.html");
        assert_eq!(
            publisher().build_key("/live-data/awards.json"),
            "oscars/live-data/awards.json"
        );
    }

    #[test]
    fn cache_control_header() {
        assert_eq!(publisher().cache_control(), "max-age=5");
    }

    #[test]
    fn config_for_target() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default_with_base(dir.path());
        config.targets.staging.s3_buckets = vec!["stage.example.org".to_owned()];

        let publish = PublishConfig::for_target(&config, DeploymentTarget::Staging).unwrap();
        assert_eq!(publish.buckets, vec!["stage.example.org"]);
        assert_eq!(publish.prefix, "marquee");
        assert_eq!(publish.cache_max_age, 5);
    }

    #[test]
    fn config_for_development_fails() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default_with_base(dir.path());
        assert!(PublishConfig::for_target(&config, DeploymentTarget::Development).is_err());
        assert!(PublishConfig::for_target(&config, DeploymentTarget::Production).is_err());
    }

    #[test]
    fn error_chain_joins_sources() {
        let err = PublishError::Config(ConfigError::Validation("bad bucket".to_owned()));
        assert_eq!(error_chain(&err), "Configuration error: bad bucket");
    }
}
