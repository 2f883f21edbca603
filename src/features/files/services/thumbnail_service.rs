use std::collections::BTreeMap;
use std::io::Cursor;
use std::sync::Arc;

use image::imageops::FilterType;
use image::{GenericImageView, ImageFormat};
use tracing::{debug, warn};

use crate::core::error::{AppError, Result};
use crate::features::files::models::{File, FileType};
use crate::modules::storage::AssetStorage;
use crate::shared::constants::{PREFERRED_ICON_SIZE, PREVIEW_THUMBNAIL_SIZE};

/// Icons produced for a file, keyed by nominal size
#[derive(Debug, Default)]
pub struct RenderedIcons {
    pub icons: BTreeMap<String, String>,
    /// Width and height of the original, for images
    pub dimensions: Option<(u32, u32)>,
}

struct RenderedImage {
    width: u32,
    height: u32,
    renditions: Vec<(u32, Vec<u8>)>,
}

/// Renders admin icons and previews for stored files
pub struct ThumbnailService {
    storage: Arc<dyn AssetStorage>,
    icon_sizes: Vec<String>,
    static_url: String,
}

impl ThumbnailService {
    pub fn new(storage: Arc<dyn AssetStorage>, icon_sizes: Vec<String>, static_url: String) -> Self {
        Self {
            storage,
            icon_sizes,
            static_url,
        }
    }

    pub fn icon_sizes(&self) -> &[String] {
        &self.icon_sizes
    }

    /// Storage key of a square crop rendition stored next to the original
    pub fn thumbnail_key(file_key: &str, size: u32) -> String {
        format!("{}__{}x{}_crop_upscale.png", file_key, size, size)
    }

    /// Icons for every configured size. Never fails: a file that cannot be
    /// rendered simply yields no icons.
    pub async fn icons(&self, file: &File, payload: &[u8]) -> RenderedIcons {
        match file.polymorphic_type {
            FileType::Image => self.image_icons(file, payload).await,
            FileType::File => RenderedIcons {
                icons: self.static_icons("file"),
                dimensions: None,
            },
        }
    }

    fn static_icons(&self, icon: &str) -> BTreeMap<String, String> {
        self.icon_sizes
            .iter()
            .map(|size| {
                let url = format!(
                    "{}filer/icons/{}_{}x{}.png",
                    self.static_url, icon, size, size
                );
                (size.clone(), url)
            })
            .collect()
    }

    async fn image_icons(&self, file: &File, payload: &[u8]) -> RenderedIcons {
        let sizes = self.numeric_sizes();

        let rendered = match render_blocking(payload.to_vec(), sizes).await {
            Ok(rendered) => rendered,
            Err(e) => {
                warn!(file_id = file.id, error = %e, "Failed to render icons");
                return RenderedIcons::default();
            }
        };

        let mut icons = BTreeMap::new();
        for (size, data) in rendered.renditions {
            let key = Self::thumbnail_key(&file.file_key, size);
            if let Err(e) = self.storage.upload(&key, data, "image/png").await {
                warn!(file_id = file.id, size, error = %e, "Failed to store icon");
                continue;
            }
            match self.storage.url(&key).await {
                Ok(url) => {
                    icons.insert(size.to_string(), url);
                }
                Err(e) => warn!(file_id = file.id, size, error = %e, "Failed to resolve icon URL"),
            }
        }

        RenderedIcons {
            icons,
            dimensions: Some((rendered.width, rendered.height)),
        }
    }

    /// Render and store the square preview shown after an image upload
    pub async fn preview(&self, file: &File, payload: &[u8]) -> Result<String> {
        let rendered = render_blocking(payload.to_vec(), vec![PREVIEW_THUMBNAIL_SIZE])
            .await
            .map_err(|e| AppError::Internal(format!("Failed to render preview: {}", e)))?;

        let (size, data) = rendered
            .renditions
            .into_iter()
            .next()
            .ok_or_else(|| AppError::Internal("Preview rendition missing".to_string()))?;

        let key = Self::thumbnail_key(&file.file_key, size);
        self.storage.upload(&key, data, "image/png").await?;
        self.storage.url(&key).await
    }

    /// Remove stored renditions of an image. Missing objects are not an error.
    pub async fn delete_renditions(&self, file: &File) {
        if !file.is_image() {
            return;
        }

        let sizes = self
            .numeric_sizes()
            .into_iter()
            .chain(std::iter::once(PREVIEW_THUMBNAIL_SIZE));
        for size in sizes {
            let key = Self::thumbnail_key(&file.file_key, size);
            if let Err(e) = self.storage.delete(&key).await {
                debug!("Could not delete rendition {}: {}", key, e);
            }
        }
    }

    fn numeric_sizes(&self) -> Vec<u32> {
        self.icon_sizes
            .iter()
            .filter_map(|size| size.parse().ok())
            .collect()
    }
}

/// Pick the icon shown after an upload: 32 first, then the second and the
/// first configured sizes.
pub fn select_icon(icons: &BTreeMap<String, String>, configured: &[String]) -> Option<String> {
    let fallback = &configured[..configured.len().min(2)];
    std::iter::once(PREFERRED_ICON_SIZE)
        .chain(fallback.iter().rev().map(String::as_str))
        .find_map(|size| icons.get(size))
        .cloned()
}

async fn render_blocking(
    payload: Vec<u8>,
    sizes: Vec<u32>,
) -> std::result::Result<RenderedImage, String> {
    tokio::task::spawn_blocking(move || render_squares(&payload, &sizes))
        .await
        .map_err(|e| format!("Thumbnail task panicked: {}", e))?
        .map_err(|e| e.to_string())
}

fn render_squares(payload: &[u8], sizes: &[u32]) -> image::ImageResult<RenderedImage> {
    let img = image::load_from_memory(payload)?;
    let (width, height) = img.dimensions();

    let mut renditions = Vec::with_capacity(sizes.len());
    for &size in sizes {
        // Crops to the square and upscales small originals
        let thumb = img.resize_to_fill(size, size, FilterType::Lanczos3);
        let mut buf = Cursor::new(Vec::new());
        thumb.write_to(&mut buf, ImageFormat::Png)?;
        renditions.push((size, buf.into_inner()));
    }

    Ok(RenderedImage {
        width,
        height,
        renditions,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::{png_bytes, MemoryStorage};

    fn sizes(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn icon_map(list: &[&str]) -> BTreeMap<String, String> {
        list.iter()
            .map(|s| (s.to_string(), format!("url-{}", s)))
            .collect()
    }

    #[test]
    fn test_select_icon_prefers_32() {
        let icons = icon_map(&["16", "32", "48", "64"]);
        let picked = select_icon(&icons, &sizes(&["16", "32", "48", "64"]));
        assert_eq!(picked.as_deref(), Some("url-32"));
    }

    #[test]
    fn test_select_icon_falls_back_to_second_then_first() {
        let configured = sizes(&["20", "40", "80"]);

        let icons = icon_map(&["20", "40", "80"]);
        assert_eq!(select_icon(&icons, &configured).as_deref(), Some("url-40"));

        let icons = icon_map(&["20", "80"]);
        assert_eq!(select_icon(&icons, &configured).as_deref(), Some("url-20"));

        // Larger sizes are never used as a fallback
        let icons = icon_map(&["80"]);
        assert_eq!(select_icon(&icons, &configured), None);
    }

    #[test]
    fn test_render_squares_crops_to_requested_sizes() {
        let rendered = render_squares(&png_bytes(40, 20), &[16, 180]).unwrap();
        assert_eq!((rendered.width, rendered.height), (40, 20));

        let (size, data) = &rendered.renditions[1];
        assert_eq!(*size, 180);
        let thumb = image::load_from_memory(data).unwrap();
        assert_eq!(thumb.dimensions(), (180, 180));
    }

    #[test]
    fn test_render_squares_rejects_garbage() {
        assert!(render_squares(b"not an image", &[16]).is_err());
    }

    #[tokio::test]
    async fn test_generic_files_get_static_icons() {
        let storage = Arc::new(MemoryStorage::default());
        let service = ThumbnailService::new(storage, sizes(&["16", "32"]), "/static/".into());
        let file = crate::shared::test_helpers::make_file(7, FileType::File, "public/filer/a/doc.pdf");

        let rendered = service.icons(&file, b"%PDF").await;
        assert_eq!(
            rendered.icons.get("32").map(String::as_str),
            Some("/static/filer/icons/file_32x32.png")
        );
        assert_eq!(rendered.icons.len(), 2);
        assert!(rendered.dimensions.is_none());
    }

    #[tokio::test]
    async fn test_image_icons_are_stored() {
        let storage = Arc::new(MemoryStorage::default());
        let service = ThumbnailService::new(
            storage.clone(),
            sizes(&["16", "32"]),
            "/static/".into(),
        );
        let file = crate::shared::test_helpers::make_file(8, FileType::Image, "public/filer/b/cat.png");

        let rendered = service.icons(&file, &png_bytes(8, 8)).await;
        assert_eq!(rendered.icons.len(), 2);
        assert_eq!(rendered.dimensions, Some((8, 8)));
        assert!(storage.contains("public/filer/b/cat.png__32x32_crop_upscale.png"));

        service.delete_renditions(&file).await;
        assert!(!storage.contains("public/filer/b/cat.png__32x32_crop_upscale.png"));
    }

    #[tokio::test]
    async fn test_unreadable_image_yields_no_icons() {
        let storage = Arc::new(MemoryStorage::default());
        let service = ThumbnailService::new(storage, sizes(&["16", "32"]), "/static/".into());
        let file = crate::shared::test_helpers::make_file(9, FileType::Image, "public/filer/c/bad.png");

        let rendered = service.icons(&file, b"garbage").await;
        assert!(rendered.icons.is_empty());
    }
}
