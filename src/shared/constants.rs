// =============================================================================
// ROLE CONSTANTS
// =============================================================================

/// Superuser role - bypasses folder permissions and clipboard ownership checks
pub const ROLE_SUPERUSER: &str = "superuser";

/// Staff role - may use the filer admin surface
pub const ROLE_STAFF: &str = "staff";

// =============================================================================
// UPLOADS
// =============================================================================

/// Side of the square preview returned for image uploads
pub const PREVIEW_THUMBNAIL_SIZE: u32 = 180;

/// Icon size preferred over every configured size
pub const PREFERRED_ICON_SIZE: &str = "32";

/// Extra body allowance for multipart boundaries and headers
pub const MULTIPART_OVERHEAD: usize = 1024 * 1024;

// =============================================================================
// ADMIN
// =============================================================================

/// Mount point of the filer admin site
pub const ADMIN_PREFIX: &str = "/api/admin/filer";
