//! In-memory stand-ins for the database and object storage, plus fixtures
//! shared by unit and HTTP tests.

use std::collections::HashMap;
use std::io::Cursor;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{extract::Request, middleware::Next, Router};
use chrono::Utc;
use fake::faker::lorem::en::Word;
use fake::Fake;
use image::{ImageBuffer, ImageFormat, Rgb, RgbImage};

use crate::core::config::FilerConfig;
use crate::core::error::{AppError, Result};
use crate::features::admin::AdminSite;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::clipboard::models::{Clipboard, ClipboardItem};
use crate::features::clipboard::repositories::ClipboardRepository;
use crate::features::clipboard::{ClipboardAdmin, ClipboardService, UploadService};
use crate::features::files::models::{File, FileType, NewFile};
use crate::features::files::registry::FileTypeRegistry;
use crate::features::files::repositories::FileRepository;
use crate::features::files::services::{FileService, ThumbnailService};
use crate::features::folders::{Folder, FolderPermission, FolderRepository};
use crate::modules::storage::{AssetStorage, FileVisibility};

// =============================================================================
// USERS
// =============================================================================

pub fn create_user(sub: &str, roles: &[&str]) -> AuthenticatedUser {
    AuthenticatedUser {
        account_id: format!("{}-account", sub),
        sub: sub.to_string(),
        session_uid: Some("test-session-uid".to_string()),
        roles: roles.iter().map(|r| r.to_string()).collect(),
    }
}

pub fn create_staff_user() -> AuthenticatedUser {
    create_user("test-staff", &["staff"])
}

pub fn create_superuser() -> AuthenticatedUser {
    create_user("test-superuser", &["superuser"])
}

/// Stand in for the JWT middleware by injecting `user` into every request
pub fn with_user(router: Router, user: AuthenticatedUser) -> Router {
    router.layer(axum::middleware::from_fn(
        move |mut request: Request, next: Next| {
            let user = user.clone();
            async move {
                request.extensions_mut().insert(user);
                next.run(request).await
            }
        },
    ))
}

// =============================================================================
// FIXTURES
// =============================================================================

pub fn make_folder(id: i64, parent_id: Option<i64>, owner: Option<&str>) -> Folder {
    let now = Utc::now();
    Folder {
        id,
        parent_id,
        name: Word().fake(),
        owner_id: owner.map(str::to_string),
        created_at: now,
        modified_at: now,
    }
}

pub fn make_file(id: i64, file_type: FileType, file_key: &str) -> File {
    let now = Utc::now();
    let original_filename = file_key.rsplit('/').next().unwrap_or(file_key).to_string();
    File {
        id,
        polymorphic_type: file_type,
        folder_id: None,
        file_key: file_key.to_string(),
        file_size: 1,
        checksum: String::new(),
        original_filename,
        name: String::new(),
        description: None,
        owner_id: Some("test-staff".to_string()),
        is_public: true,
        uploaded_at: now,
        modified_at: now,
    }
}

/// A valid PNG of the given size
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img: RgbImage = ImageBuffer::from_fn(width, height, |x, y| {
        Rgb([(x * 7 % 255) as u8, (y * 13 % 255) as u8, 128])
    });
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Png)
        .expect("encode test png");
    buf.into_inner()
}

// =============================================================================
// STORAGE
// =============================================================================

/// Object storage kept in a map
#[derive(Default)]
pub struct MemoryStorage {
    objects: Mutex<HashMap<String, (Vec<u8>, String)>>,
    failing_keys: Mutex<Option<String>>,
}

impl MemoryStorage {
    /// Make every upload whose key contains `fragment` fail
    pub fn fail_uploads_containing(&self, fragment: &str) {
        *self.failing_keys.lock().unwrap() = Some(fragment.to_string());
    }

    pub fn contains(&self, key: &str) -> bool {
        self.objects.lock().unwrap().contains_key(key)
    }

    pub fn content_type(&self, key: &str) -> Option<String> {
        self.objects
            .lock()
            .unwrap()
            .get(key)
            .map(|(_, ct)| ct.clone())
    }

    pub fn is_empty(&self) -> bool {
        self.objects.lock().unwrap().is_empty()
    }
}

#[async_trait]
impl AssetStorage for MemoryStorage {
    fn generate_key(&self, visibility: FileVisibility, path: &str) -> String {
        let prefix = match visibility {
            FileVisibility::Public => "public",
            FileVisibility::Private => "private",
        };
        format!("{}/{}", prefix, path)
    }

    async fn upload(
        &self,
        key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> std::result::Result<String, AppError> {
        if let Some(fragment) = self.failing_keys.lock().unwrap().as_deref() {
            if key.contains(fragment) {
                return Err(AppError::Storage(format!("upload of {} refused", key)));
            }
        }
        self.objects
            .lock()
            .unwrap()
            .insert(key.to_string(), (data, content_type.to_string()));
        Ok(key.to_string())
    }

    async fn delete(&self, key: &str) -> std::result::Result<(), AppError> {
        self.objects.lock().unwrap().remove(key);
        Ok(())
    }

    async fn url(&self, key: &str) -> std::result::Result<String, AppError> {
        Ok(format!("http://storage.test/{}", key))
    }
}

// =============================================================================
// DATABASE
// =============================================================================

#[derive(Default)]
struct Tables {
    folders: Vec<Folder>,
    permissions: Vec<FolderPermission>,
    files: Vec<File>,
    images: HashMap<i64, Option<(u32, u32)>>,
    clipboards: Vec<Clipboard>,
    items: Vec<ClipboardItem>,
    next_id: i64,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// The filer tables kept in memory; implements every repository trait
#[derive(Default)]
pub struct MemoryDb {
    tables: Mutex<Tables>,
}

impl MemoryDb {
    pub fn insert_folder(&self, folder: Folder) {
        self.tables.lock().unwrap().folders.push(folder);
    }

    pub fn insert_permission(&self, permission: FolderPermission) {
        self.tables.lock().unwrap().permissions.push(permission);
    }

    pub fn files(&self) -> Vec<File> {
        self.tables.lock().unwrap().files.clone()
    }

    pub fn has_image_record(&self, file_id: i64) -> bool {
        self.tables.lock().unwrap().images.contains_key(&file_id)
    }

    pub fn image_dimensions(&self, file_id: i64) -> Option<(u32, u32)> {
        self.tables
            .lock()
            .unwrap()
            .images
            .get(&file_id)
            .copied()
            .flatten()
    }

    /// Files on the clipboard of `user_id`, in the order they were added
    pub fn clipboard_file_ids(&self, user_id: &str) -> Vec<i64> {
        let tables = self.tables.lock().unwrap();
        let Some(clipboard) = tables.clipboards.iter().find(|c| c.user_id == user_id) else {
            return Vec::new();
        };
        tables
            .items
            .iter()
            .filter(|item| item.clipboard_id == clipboard.id)
            .map(|item| item.file_id)
            .collect()
    }
}

#[async_trait]
impl FolderRepository for MemoryDb {
    async fn find_by_id(&self, id: i64) -> Result<Option<Folder>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.folders.iter().find(|f| f.id == id).cloned())
    }

    async fn permissions_for(&self, folder: &Folder) -> Result<Vec<FolderPermission>> {
        let tables = self.tables.lock().unwrap();

        let mut ancestors = Vec::new();
        let mut parent = folder.parent_id;
        while let Some(id) = parent {
            ancestors.push(id);
            parent = tables
                .folders
                .iter()
                .find(|f| f.id == id)
                .and_then(|f| f.parent_id);
        }

        Ok(tables
            .permissions
            .iter()
            .filter(|p| p.covers(folder.id, &ancestors))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl FileRepository for MemoryDb {
    async fn create(&self, new_file: NewFile) -> Result<File> {
        let mut tables = self.tables.lock().unwrap();
        let now = Utc::now();
        let file = File {
            id: tables.next_id(),
            polymorphic_type: new_file.polymorphic_type,
            folder_id: new_file.folder_id,
            file_key: new_file.file_key,
            file_size: new_file.file_size,
            checksum: new_file.checksum,
            original_filename: new_file.original_filename,
            name: String::new(),
            description: None,
            owner_id: Some(new_file.owner_id),
            is_public: new_file.is_public,
            uploaded_at: now,
            modified_at: now,
        };
        if file.is_image() {
            tables.images.insert(file.id, None);
        }
        tables.files.push(file.clone());
        Ok(file)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<File>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.files.iter().find(|f| f.id == id).cloned())
    }

    async fn find_many(&self, ids: &[i64]) -> Result<Vec<File>> {
        let tables = self.tables.lock().unwrap();
        let mut files: Vec<File> = tables
            .files
            .iter()
            .filter(|f| ids.contains(&f.id))
            .cloned()
            .collect();
        files.sort_by_key(|f| f.id);
        Ok(files)
    }

    async fn save_image_dimensions(&self, file_id: i64, width: u32, height: u32) -> Result<()> {
        let mut tables = self.tables.lock().unwrap();
        tables.images.insert(file_id, Some((width, height)));
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let mut tables = self.tables.lock().unwrap();
        tables.items.retain(|item| item.file_id != id);
        tables.images.remove(&id);
        let before = tables.files.len();
        tables.files.retain(|f| f.id != id);
        Ok(tables.files.len() < before)
    }
}

#[async_trait]
impl ClipboardRepository for MemoryDb {
    async fn find_by_id(&self, id: i64) -> Result<Option<Clipboard>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.clipboards.iter().find(|c| c.id == id).cloned())
    }

    async fn get_or_create_for_user(&self, user_id: &str) -> Result<Clipboard> {
        let mut tables = self.tables.lock().unwrap();
        if let Some(existing) = tables.clipboards.iter().find(|c| c.user_id == user_id) {
            return Ok(existing.clone());
        }
        let clipboard = Clipboard {
            id: tables.next_id(),
            user_id: user_id.to_string(),
        };
        tables.clipboards.push(clipboard.clone());
        Ok(clipboard)
    }

    async fn items(&self, clipboard_id: i64) -> Result<Vec<ClipboardItem>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .items
            .iter()
            .filter(|item| item.clipboard_id == clipboard_id)
            .cloned()
            .collect())
    }

    async fn add_file(&self, clipboard_id: i64, file_id: i64) -> Result<()> {
        let mut tables = self.tables.lock().unwrap();
        let exists = tables
            .items
            .iter()
            .any(|item| item.clipboard_id == clipboard_id && item.file_id == file_id);
        if !exists {
            let item = ClipboardItem {
                id: tables.next_id(),
                clipboard_id,
                file_id,
            };
            tables.items.push(item);
        }
        Ok(())
    }

    async fn clear(&self, clipboard_id: i64) -> Result<u64> {
        let mut tables = self.tables.lock().unwrap();
        let before = tables.items.len();
        tables.items.retain(|item| item.clipboard_id != clipboard_id);
        Ok((before - tables.items.len()) as u64)
    }

    async fn paste_into_folder(&self, clipboard_id: i64, folder_id: i64) -> Result<u64> {
        let mut tables = self.tables.lock().unwrap();
        let file_ids: Vec<i64> = tables
            .items
            .iter()
            .filter(|item| item.clipboard_id == clipboard_id)
            .map(|item| item.file_id)
            .collect();

        let mut moved = 0;
        for file in tables.files.iter_mut().filter(|f| file_ids.contains(&f.id)) {
            file.folder_id = Some(folder_id);
            file.modified_at = Utc::now();
            moved += 1;
        }
        tables.items.retain(|item| item.clipboard_id != clipboard_id);
        Ok(moved)
    }
}

// =============================================================================
// WIRING
// =============================================================================

/// Filer services wired to in-memory storage and tables
pub struct TestFiler {
    pub config: FilerConfig,
    pub db: Arc<MemoryDb>,
    pub storage: Arc<MemoryStorage>,
    pub file_service: Arc<FileService>,
    pub clipboard_service: Arc<ClipboardService>,
    pub upload_service: Arc<UploadService>,
}

impl TestFiler {
    pub fn new() -> Self {
        Self::with_config(FilerConfig::default())
    }

    pub fn with_config(config: FilerConfig) -> Self {
        let db = Arc::new(MemoryDb::default());
        let storage = Arc::new(MemoryStorage::default());

        let registry = Arc::new(
            FileTypeRegistry::from_names(&config.file_models).expect("valid test file kinds"),
        );
        let thumbnails = Arc::new(ThumbnailService::new(
            storage.clone(),
            config.admin_icon_sizes.clone(),
            config.static_url.clone(),
        ));
        let file_service = Arc::new(FileService::new(db.clone(), storage.clone(), thumbnails));
        let clipboard_service = Arc::new(ClipboardService::new(
            db.clone(),
            db.clone(),
            db.clone(),
            file_service.clone(),
            config.enable_permissions,
        ));
        let upload_service = Arc::new(UploadService::new(
            registry,
            db.clone(),
            file_service.clone(),
            clipboard_service.clone(),
            config.is_public_default,
            config.enable_permissions,
        ));

        Self {
            config,
            db,
            storage,
            file_service,
            clipboard_service,
            upload_service,
        }
    }

    pub fn admin(&self) -> ClipboardAdmin {
        ClipboardAdmin::new(
            self.upload_service.clone(),
            self.clipboard_service.clone(),
            self.config.max_upload_size,
        )
    }

    /// The admin site with the clipboard registered, acting as `user`
    pub fn router(&self, user: AuthenticatedUser) -> Router {
        with_user(AdminSite::new().register(self.admin()).router(), user)
    }
}
