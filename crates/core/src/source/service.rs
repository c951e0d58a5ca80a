//! Ledger loader over OpenDAL storage or the files API.

use std::time::Duration;

use async_trait::async_trait;
use bilan_shared::SourceConfig;
use opendal::{ErrorKind, Operator, services};
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{debug, info, warn};

use super::LedgerSource;
use super::error::SourceError;
use crate::ledger::{LedgerRow, ProjectId, decode};

/// File extensions recognized as ledger files in storage.
const LEDGER_EXTENSIONS: [&str; 2] = [".csv", ".json"];

/// Entry of the files API index.
#[derive(Debug, Deserialize)]
struct FileDocument {
    #[serde(rename = "_id")]
    id: String,
}

enum Backend {
    Storage(Operator),
    Http { client: reqwest::Client, base_url: String },
}

/// Loads project ledgers from the configured backend.
pub struct LedgerLoader {
    backend: Backend,
}

impl LedgerLoader {
    /// Create a loader from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operator or HTTP client cannot be built.
    pub fn from_config(config: &SourceConfig) -> Result<Self, SourceError> {
        let backend = match config {
            SourceConfig::LocalFs { root } => {
                let root = root
                    .to_str()
                    .ok_or_else(|| SourceError::configuration("invalid path"))?;
                let builder = services::Fs::default().root(root);

                Operator::new(builder)
                    .map_err(|e| SourceError::configuration(e.to_string()))?
                    .finish()
                    .pipe(Backend::Storage)
            }
            SourceConfig::S3 {
                endpoint,
                bucket,
                access_key_id,
                secret_access_key,
                region,
            } => {
                let builder = services::S3::default()
                    .endpoint(endpoint)
                    .bucket(bucket)
                    .access_key_id(access_key_id)
                    .secret_access_key(secret_access_key)
                    .region(region);

                Operator::new(builder)
                    .map_err(|e| SourceError::configuration(e.to_string()))?
                    .finish()
                    .pipe(Backend::Storage)
            }
            SourceConfig::Http {
                base_url,
                timeout_secs,
            } => {
                let client = reqwest::Client::builder()
                    .timeout(Duration::from_secs(*timeout_secs))
                    .build()
                    .map_err(|e| SourceError::configuration(e.to_string()))?;

                Backend::Http {
                    client,
                    base_url: base_url.trim_end_matches('/').to_string(),
                }
            }
        };

        Ok(Self { backend })
    }

    /// Create a loader over an existing storage operator.
    #[must_use]
    pub fn from_operator(operator: Operator) -> Self {
        Self {
            backend: Backend::Storage(operator),
        }
    }

    /// Get the backend name.
    #[must_use]
    pub fn provider_name(&self) -> &'static str {
        match &self.backend {
            Backend::Storage(_) => "storage",
            Backend::Http { .. } => "http",
        }
    }

    async fn fetch_storage(
        operator: &Operator,
        project_id: &ProjectId,
    ) -> Result<Vec<(String, Vec<u8>)>, SourceError> {
        let prefix = format!("{project_id}/");
        let entries = match operator.list_with(&prefix).recursive(true).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e.into()),
        };

        let mut paths: Vec<String> = entries
            .into_iter()
            .filter(|entry| entry.metadata().is_file())
            .map(|entry| entry.path().to_string())
            .filter(|path| is_ledger_file(path))
            .collect();
        paths.sort();

        let mut files = Vec::with_capacity(paths.len());
        for path in paths {
            let buffer = operator.read(&path).await?;
            files.push((path, buffer.to_vec()));
        }
        Ok(files)
    }

    async fn fetch_http(
        client: &reqwest::Client,
        base_url: &str,
        project_id: &ProjectId,
    ) -> Result<Vec<(String, Vec<u8>)>, SourceError> {
        let index_url = format!("{base_url}/projects/{project_id}/files");
        let response = client.get(&index_url).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(SourceError::not_found(project_id.as_str()));
        }
        let documents: Vec<FileDocument> = response.error_for_status()?.json().await?;
        debug!(project_id = %project_id, count = documents.len(), "fetched file index");

        let mut files = Vec::with_capacity(documents.len());
        for document in documents {
            let url = format!("{base_url}/files/{}/csv", document.id);
            let response = client.get(&url).send().await?;

            if !response.status().is_success() {
                warn!(
                    file_id = %document.id,
                    status = %response.status(),
                    "skipping unreadable file"
                );
                continue;
            }
            files.push((document.id, response.bytes().await?.to_vec()));
        }
        Ok(files)
    }
}

#[async_trait]
impl LedgerSource for LedgerLoader {
    async fn load(&self, project_id: &ProjectId) -> Result<Vec<LedgerRow>, SourceError> {
        let files = match &self.backend {
            Backend::Storage(operator) => Self::fetch_storage(operator, project_id).await?,
            Backend::Http { client, base_url } => {
                Self::fetch_http(client, base_url, project_id).await?
            }
        };

        let mut rows = Vec::new();
        for (name, bytes) in files {
            match decode(&bytes) {
                Ok(decoded) => {
                    info!(
                        project_id = %project_id,
                        file = %name,
                        rows = decoded.len(),
                        "loaded ledger file"
                    );
                    rows.extend(decoded);
                }
                Err(e) => warn!(
                    project_id = %project_id,
                    file = %name,
                    error = %e,
                    "skipping undecodable file"
                ),
            }
        }

        if rows.is_empty() {
            return Err(SourceError::not_found(project_id.as_str()));
        }
        Ok(rows)
    }
}

fn is_ledger_file(path: &str) -> bool {
    let lower = path.to_ascii_lowercase();
    LEDGER_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

/// Extension trait for pipe operator.
trait Pipe: Sized {
    fn pipe<F, R>(self, f: F) -> R
    where
        F: FnOnce(Self) -> R,
    {
        f(self)
    }
}

impl<T> Pipe for T {}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn memory_loader() -> (Operator, LedgerLoader) {
        let operator = Operator::new(services::Memory::default())
            .expect("memory operator")
            .finish();
        (operator.clone(), LedgerLoader::from_operator(operator))
    }

    async fn put(operator: &Operator, path: &str, content: &str) {
        operator
            .write(path, content.as_bytes().to_vec())
            .await
            .expect("write");
    }

    fn project(id: &str) -> ProjectId {
        ProjectId::parse(id).expect("valid project id")
    }

    #[test]
    fn test_is_ledger_file() {
        assert!(is_ledger_file("p1/ledger.csv"));
        assert!(is_ledger_file("p1/EXPORT.JSON"));
        assert!(!is_ledger_file("p1/notes.txt"));
        assert!(!is_ledger_file("p1/"));
    }

    #[test]
    fn test_from_config() {
        let loader = LedgerLoader::from_config(&SourceConfig::Http {
            base_url: "http://localhost:3001/api/".to_string(),
            timeout_secs: 5,
        })
        .expect("http loader");
        assert_eq!(loader.provider_name(), "http");

        let loader = LedgerLoader::from_config(&SourceConfig::LocalFs {
            root: std::env::temp_dir(),
        })
        .expect("fs loader");
        assert_eq!(loader.provider_name(), "storage");
    }

    #[tokio::test]
    async fn test_load_concatenates_files_in_path_order() {
        let (operator, loader) = memory_loader();
        put(
            &operator,
            "p1/b.json",
            r#"[{"Categorie": "Capitaux propres", "Designation": "Reserves",
                "Valeur unitaire": 1500}]"#,
        )
        .await;
        put(
            &operator,
            "p1/a.csv",
            concat!(
                "Categorie,Designation,Valeur unitaire,Total\n",
                "Immobilisations corporelles,Batiments,10000,\n",
            ),
        )
        .await;
        put(&operator, "p1/readme.txt", "ignored").await;
        put(&operator, "p2/other.csv", "Categorie,Designation\nX,Y\n").await;

        let rows = loader.load(&project("p1")).await.expect("rows");

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].designation, "Batiments");
        assert_eq!(rows[0].unit_value, Some(dec!(10000)));
        assert_eq!(rows[1].designation, "Reserves");
    }

    #[tokio::test]
    async fn test_undecodable_file_is_skipped() {
        let (operator, loader) = memory_loader();
        put(&operator, "p1/broken.csv", "Foo,Bar\n1,2\n").await;
        put(
            &operator,
            "p1/ledger.csv",
            "Categorie,Designation,Total\nLoyer,Loyer mars,1200\n",
        )
        .await;

        let rows = loader.load(&project("p1")).await.expect("rows");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].total, Some(dec!(1200)));
    }

    #[tokio::test]
    async fn test_unknown_project_is_not_found() {
        let (_, loader) = memory_loader();
        let err = loader.load(&project("missing")).await.unwrap_err();
        assert!(
            matches!(err, SourceError::NotFound { ref project_id } if project_id == "missing")
        );
    }

    mod files_api {
        use axum::{
            Json, Router,
            extract::Path,
            response::{IntoResponse, Response},
            routing::get,
        };
        use serde_json::json;
        use tokio::net::TcpListener;

        use super::*;

        const FIRST: &str = "Categorie,Designation,Total\nDettes fournisseurs,Fournisseurs A,500\n";
        const SECOND: &str = concat!(
            "Categorie,Designation,Valeur unitaire\n",
            "Capitaux propres,Reserves,75\n",
        );

        async fn file_csv(Path(id): Path<String>) -> Response {
            match id.as_str() {
                "f1" => FIRST.into_response(),
                "f3" => SECOND.into_response(),
                _ => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
            }
        }

        fn router() -> Router {
            Router::new()
                .route(
                    "/projects/p1/files",
                    get(|| async {
                        Json(json!([
                            {"_id": "f1", "filename": "janvier.csv"},
                            {"_id": "f2", "filename": "corrompu.csv"},
                            {"_id": "f3", "filename": "capitaux.csv"}
                        ]))
                    }),
                )
                .route(
                    "/projects/down/files",
                    get(|| async { StatusCode::SERVICE_UNAVAILABLE }),
                )
                .route("/files/{id}/csv", get(file_csv))
        }

        /// Serves the router on an ephemeral port and returns a loader for it.
        async fn http_loader() -> LedgerLoader {
            let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
            let addr = listener.local_addr().expect("local addr");
            tokio::spawn(async move {
                axum::serve(listener, router()).await.expect("serve");
            });

            LedgerLoader::from_config(&SourceConfig::Http {
                base_url: format!("http://{addr}/"),
                timeout_secs: 5,
            })
            .expect("http loader")
        }

        #[tokio::test]
        async fn test_loads_every_readable_file_in_index_order() {
            let loader = http_loader().await;

            let rows = loader.load(&project("p1")).await.expect("rows");

            assert_eq!(rows.len(), 2);
            assert_eq!(rows[0].designation, "Fournisseurs A");
            assert_eq!(rows[0].total, Some(dec!(500)));
            assert_eq!(rows[1].designation, "Reserves");
            assert_eq!(rows[1].unit_value, Some(dec!(75)));
        }

        #[tokio::test]
        async fn test_missing_index_is_not_found() {
            let loader = http_loader().await;

            let err = loader.load(&project("nope")).await.unwrap_err();
            assert!(
                matches!(err, SourceError::NotFound { ref project_id } if project_id == "nope")
            );
        }

        #[tokio::test]
        async fn test_failing_index_is_unavailable() {
            let loader = http_loader().await;

            let err = loader.load(&project("down")).await.unwrap_err();
            assert!(matches!(err, SourceError::Unavailable(_)));
        }
    }

    #[tokio::test]
    async fn test_project_without_rows_is_not_found() {
        let (operator, loader) = memory_loader();
        put(&operator, "p1/empty.csv", "Categorie,Designation\n").await;

        let err = loader.load(&project("p1")).await.unwrap_err();
        assert!(matches!(err, SourceError::NotFound { .. }));
    }
}
