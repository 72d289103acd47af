//! Delivery of exported files.

use crate::export::{ExportError, ExportResult};

/// Somewhere an exported file can be handed off to.
pub trait DownloadTarget {
    fn deliver(&mut self, filename: &str, bytes: &[u8]) -> ExportResult<()>;
}

/// Writes files into a directory, creating it if needed.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone)]
pub struct DirectoryTarget {
    dir: std::path::PathBuf,
}

#[cfg(not(target_arch = "wasm32"))]
impl DirectoryTarget {
    pub fn new(dir: impl Into<std::path::PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &std::path::Path {
        &self.dir
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl DownloadTarget for DirectoryTarget {
    fn deliver(&mut self, filename: &str, bytes: &[u8]) -> ExportResult<()> {
        let delivery = |e: std::io::Error| ExportError::Delivery(e.to_string());
        std::fs::create_dir_all(&self.dir).map_err(delivery)?;
        let path = self.dir.join(filename);
        std::fs::write(&path, bytes).map_err(delivery)?;
        log::info!("Exported PNG to: {:?}", path);
        Ok(())
    }
}

/// Keeps delivered files in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryTarget {
    pub files: Vec<(String, Vec<u8>)>,
}

impl DownloadTarget for MemoryTarget {
    fn deliver(&mut self, filename: &str, bytes: &[u8]) -> ExportResult<()> {
        self.files.push((filename.to_string(), bytes.to_vec()));
        Ok(())
    }
}

/// Triggers a browser download through a temporary object URL.
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserDownload;

#[cfg(target_arch = "wasm32")]
impl DownloadTarget for BrowserDownload {
    fn deliver(&mut self, filename: &str, bytes: &[u8]) -> ExportResult<()> {
        use wasm_bindgen::JsCast;

        let js = |e: wasm_bindgen::JsValue| ExportError::Delivery(format!("{e:?}"));
        let window = web_sys::window().ok_or_else(|| ExportError::Delivery("no window".into()))?;
        let document = window
            .document()
            .ok_or_else(|| ExportError::Delivery("no document".into()))?;

        let uint8_array = js_sys::Uint8Array::from(bytes);
        let blob_parts = js_sys::Array::new();
        blob_parts.push(&uint8_array);

        let options = web_sys::BlobPropertyBag::new();
        options.set_type("image/png");
        let blob = web_sys::Blob::new_with_u8_array_sequence_and_options(&blob_parts, &options)
            .map_err(js)?;
        let url = web_sys::Url::create_object_url_with_blob(&blob).map_err(js)?;

        let anchor = document
            .create_element("a")
            .map_err(js)?
            .dyn_into::<web_sys::HtmlAnchorElement>()
            .map_err(|_| ExportError::Delivery("not an anchor element".into()))?;
        anchor.set_href(&url);
        anchor.set_download(filename);
        anchor.click();

        web_sys::Url::revoke_object_url(&url).ok();
        log::info!("PNG download started: {filename} ({} bytes)", bytes.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_target() {
        let mut target = MemoryTarget::default();
        target.deliver("canvas-image.png", &[1, 2, 3]).unwrap();
        assert_eq!(target.files, vec![("canvas-image.png".to_string(), vec![1, 2, 3])]);
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn test_directory_target_creates_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let mut target = DirectoryTarget::new(tmp.path().join("out"));
        target.deliver("canvas-image.png", b"png").unwrap();
        let written = std::fs::read(tmp.path().join("out/canvas-image.png")).unwrap();
        assert_eq!(written, b"png");
    }
}
