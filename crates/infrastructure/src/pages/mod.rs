use async_trait::async_trait;
use autoguard_application::ports::{GeneratedPage, PageStore};
use autoguard_domain::{DomainError, Variant};
use std::path::{Path, PathBuf};
use tracing::info;

/// Location the front proxy serves for an internal dispatch:
/// `/internal/pages/<subdomain>/<variant>/index.html`.
pub fn internal_location(subdomain: &str, variant: Variant) -> String {
    format!("/internal/pages/{subdomain}/{}/index.html", variant.as_str())
}

/// On-disk path of a variant's index file under the page root.
pub fn page_index_path(root: &Path, subdomain: &str, variant: Variant) -> PathBuf {
    root.join(subdomain).join(variant.as_str()).join("index.html")
}

/// Writes generated pages into the static layout shared with the front
/// proxy: `<root>/<subdomain>/<variant>/index.html` with a co-located
/// `assets/` directory.
pub struct FileSystemPageStore {
    root: PathBuf,
}

impl FileSystemPageStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl PageStore for FileSystemPageStore {
    async fn write_page(
        &self,
        subdomain: &str,
        variant: Variant,
        page: &GeneratedPage,
    ) -> Result<(), DomainError> {
        let dir = self.root.join(subdomain).join(variant.as_str());
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| DomainError::IoError(e.to_string()))?;

        tokio::fs::write(dir.join("index.html"), &page.html)
            .await
            .map_err(|e| DomainError::IoError(e.to_string()))?;

        if !page.assets.is_empty() {
            let assets_dir = dir.join("assets");
            tokio::fs::create_dir_all(&assets_dir)
                .await
                .map_err(|e| DomainError::IoError(e.to_string()))?;
            for (name, content) in &page.assets {
                // Asset names are relative; anything trying to escape the
                // assets directory is rejected.
                if name.contains("..") || name.starts_with('/') {
                    return Err(DomainError::PageGenerationFailed(format!(
                        "unsafe asset path: {name}"
                    )));
                }
                let target = assets_dir.join(name);
                if let Some(parent) = target.parent() {
                    tokio::fs::create_dir_all(parent)
                        .await
                        .map_err(|e| DomainError::IoError(e.to_string()))?;
                }
                tokio::fs::write(target, content)
                    .await
                    .map_err(|e| DomainError::IoError(e.to_string()))?;
            }
        }

        info!(
            subdomain,
            variant = variant.as_str(),
            assets = page.assets.len(),
            "Page written"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn internal_location_layout() {
        assert_eq!(
            internal_location("ab12cd", Variant::A),
            "/internal/pages/ab12cd/a/index.html"
        );
        assert_eq!(
            internal_location("ab12cd", Variant::B),
            "/internal/pages/ab12cd/b/index.html"
        );
    }

    #[test]
    fn index_path_mirrors_internal_location() {
        let path = page_index_path(Path::new("/srv/pages"), "qq11ww", Variant::B);
        assert_eq!(path, PathBuf::from("/srv/pages/qq11ww/b/index.html"));
    }

    #[tokio::test]
    async fn writes_index_and_assets() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSystemPageStore::new(dir.path());
        let page = GeneratedPage {
            html: "<html>money</html>".to_string(),
            assets: vec![("css/style.css".to_string(), b"body{}".to_vec())],
        };

        store.write_page("ab12cd", Variant::A, &page).await.unwrap();

        let html = tokio::fs::read_to_string(dir.path().join("ab12cd/a/index.html"))
            .await
            .unwrap();
        assert_eq!(html, "<html>money</html>");
        let css = tokio::fs::read(dir.path().join("ab12cd/a/assets/css/style.css"))
            .await
            .unwrap();
        assert_eq!(css, b"body{}");
    }

    #[tokio::test]
    async fn rejects_escaping_asset_paths() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSystemPageStore::new(dir.path());
        let page = GeneratedPage {
            html: String::new(),
            assets: vec![("../../etc/passwd".to_string(), vec![])],
        };

        let result = store.write_page("ab12cd", Variant::A, &page).await;
        assert!(result.is_err());
    }
}
