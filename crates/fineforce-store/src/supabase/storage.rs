use async_trait::async_trait;
use chrono::Utc;
use tracing::info;
use url::Url;

use super::{SupabaseClient, check, error_message};
use crate::{BlobStore, StoreError, object_name};

impl SupabaseClient {
    /// `<base>/storage/v1/object[/public]/<bucket>/<owner>/<object>`, with
    /// each segment percent-encoded.
    fn object_url(&self, public: bool, owner: &str, object: &str) -> Result<Url, StoreError> {
        let mut url = Url::parse(&self.base_url)?;
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| StoreError::Other(format!("{} cannot be a base URL", self.base_url)))?;
            segments.pop_if_empty().extend(["storage", "v1", "object"]);
            if public {
                segments.push("public");
            }
            segments.extend([self.bucket.as_str(), owner, object]);
        }
        Ok(url)
    }
}

#[async_trait]
impl BlobStore for SupabaseClient {
    async fn upload(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, StoreError> {
        let session = self.require_session("upload evidence")?;
        // Objects live under the uploader's id so bucket policies can scope them.
        let object = object_name(file_name, Utc::now().timestamp_millis());
        let upload_url = self.object_url(false, &session.user.id, &object)?;

        info!(url = %upload_url, size = bytes.len(), "uploading evidence");
        let resp = self
            .request(reqwest::Method::POST, upload_url.as_str())
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .header("x-upsert", "false")
            .body(bytes)
            .send()
            .await?;
        check(resp).await.map_err(|e| match e {
            StoreError::Server { body, .. } => StoreError::Other(error_message(&body)),
            other => other,
        })?;

        let public = self.object_url(true, &session.user.id, &object)?;
        Ok(public.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SupabaseConfig;

    #[test]
    fn object_urls_are_namespaced_and_encoded() {
        let client = SupabaseClient::new(SupabaseConfig::new("https://abc.supabase.co/", "anon"));
        let upload = client.object_url(false, "user-1", "17-cam #1.jpg").unwrap();
        assert_eq!(
            upload.as_str(),
            "https://abc.supabase.co/storage/v1/object/violations/user-1/17-cam%20%231.jpg"
        );
        let public = client.object_url(true, "user-1", "17-a.jpg").unwrap();
        assert_eq!(
            public.as_str(),
            "https://abc.supabase.co/storage/v1/object/public/violations/user-1/17-a.jpg"
        );
    }
}
