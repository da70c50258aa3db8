use anyhow::Context;
use aws_config::{defaults, BehaviorVersion};
use aws_credential_types::Credentials;
use aws_sdk_s3::{
    config::{Builder as S3ConfigBuilder, Region},
    Client,
};
use aws_smithy_types::byte_stream::ByteStream;
use axum::async_trait;
use bytes::Bytes;

use crate::config::StorageConfig;

/// Opaque reference to an uploaded object, kept on the offer row.
#[derive(Debug, Clone)]
pub struct MediaHandle {
    pub key: String,
    pub url: String,
}

/// External media store: upload by key, delete everything under a prefix.
/// Trait object so handlers and tests never touch the SDK directly.
#[async_trait]
pub trait MediaStore: Send + Sync {
    async fn upload(&self, key: &str, body: Bytes, content_type: &str)
        -> anyhow::Result<MediaHandle>;
    async fn delete_prefix(&self, prefix: &str) -> anyhow::Result<()>;
}

#[derive(Clone)]
pub struct S3MediaStore {
    client: Client,
    bucket: String,
    public_base: String,
}

impl S3MediaStore {
    pub async fn new(cfg: &StorageConfig) -> anyhow::Result<Self> {
        let shared = defaults(BehaviorVersion::latest())
            .region(Region::new(cfg.region.clone()))
            .credentials_provider(Credentials::new(
                &cfg.access_key,
                &cfg.secret_key,
                None,
                None,
                "static",
            ))
            .endpoint_url(&cfg.endpoint)
            .load()
            .await;

        let conf = S3ConfigBuilder::from(&shared)
            .endpoint_url(&cfg.endpoint)
            .force_path_style(true)
            .build();

        Ok(Self {
            client: Client::from_conf(conf),
            bucket: cfg.bucket.clone(),
            public_base: format!("{}/{}", cfg.endpoint.trim_end_matches('/'), cfg.bucket),
        })
    }
}

#[async_trait]
impl MediaStore for S3MediaStore {
    async fn upload(
        &self,
        key: &str,
        body: Bytes,
        content_type: &str,
    ) -> anyhow::Result<MediaHandle> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(body))
            .content_type(content_type)
            .send()
            .await
            .with_context(|| format!("s3 put_object {}", key))?;
        Ok(MediaHandle {
            key: key.to_string(),
            url: format!("{}/{}", self.public_base, key),
        })
    }

    async fn delete_prefix(&self, prefix: &str) -> anyhow::Result<()> {
        let mut continuation: Option<String> = None;
        loop {
            let page = self
                .client
                .list_objects_v2()
                .bucket(&self.bucket)
                .prefix(prefix)
                .set_continuation_token(continuation.take())
                .send()
                .await
                .with_context(|| format!("s3 list_objects_v2 {}", prefix))?;

            for obj in page.contents() {
                if let Some(key) = obj.key() {
                    self.client
                        .delete_object()
                        .bucket(&self.bucket)
                        .key(key)
                        .send()
                        .await
                        .with_context(|| format!("s3 delete_object {}", key))?;
                }
            }

            match page.next_continuation_token() {
                Some(token) => continuation = Some(token.to_string()),
                None => break,
            }
        }
        Ok(())
    }
}

pub fn ext_from_mime(ct: &str) -> Option<&'static str> {
    match ct {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/webp" => Some("webp"),
        "image/heic" => Some("heic"),
        _ => None,
    }
}
