use std::env;
use std::time::Duration;

use crate::shared::validation::IDENTIFIER_REGEX;

#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub swagger: SwaggerConfig,
    pub minio: MinIOConfig,
    pub filer: FilerConfig,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
    pub max_request_body_size: usize,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
    pub idle_timeout_secs: u64,
    pub max_lifetime_secs: u64,
}

#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub issuer: String,
    pub audience: String,
    /// Namespace of the custom claim carrying the user's roles
    pub claims_namespace: String,
    pub jwks_cache_ttl: Duration,
    pub jwt_leeway: Duration,
}

#[derive(Debug, Clone)]
pub struct SwaggerConfig {
    pub username: Option<String>,
    pub password: Option<String>,
    pub title: String,
    pub version: String,
    pub description: String,
}

/// MinIO/S3 storage configuration for file uploads
#[derive(Debug, Clone)]
pub struct MinIOConfig {
    /// MinIO/S3 endpoint URL
    pub endpoint: String,
    /// Public endpoint URL for publicly accessible files (optional, defaults to endpoint)
    pub public_endpoint: String,
    /// Access key for authentication
    pub access_key: String,
    /// Secret key for authentication
    pub secret_key: String,
    /// Bucket name for storing files
    pub bucket: String,
    /// AWS region (for S3 compatibility)
    pub region: String,
    /// Prefix for public files (e.g., "public")
    pub public_prefix: String,
    /// Prefix for private files (e.g., "private")
    pub private_prefix: String,
    /// Presigned URL expiry time in seconds
    pub presigned_url_expiry_secs: u32,
}

/// Which table backs the `File` model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileModel {
    /// The built-in `filer_file` table
    Builtin,
    /// A deployment-provided table with the same columns
    Custom(String),
}

impl FileModel {
    pub const BUILTIN_TABLE: &'static str = "filer_file";

    pub fn table(&self) -> &str {
        match self {
            FileModel::Builtin => Self::BUILTIN_TABLE,
            FileModel::Custom(table) => table,
        }
    }

    pub fn is_builtin(&self) -> bool {
        matches!(self, FileModel::Builtin)
    }

    /// Resolve the file model from the optional `FILER_FILE_MODEL` value
    pub fn resolve(value: Option<&str>) -> Result<Self, String> {
        match value.map(str::trim).filter(|v| !v.is_empty()) {
            None => Ok(FileModel::Builtin),
            Some(table) if table == Self::BUILTIN_TABLE => Ok(FileModel::Builtin),
            Some(table) => {
                if !IDENTIFIER_REGEX.is_match(table) {
                    return Err(format!(
                        "FILER_FILE_MODEL must be a plain table name, got '{}'",
                        table
                    ));
                }
                Ok(FileModel::Custom(table.to_string()))
            }
        }
    }
}

/// Asset-management settings
#[derive(Debug, Clone)]
pub struct FilerConfig {
    /// Ordered file kinds tried when classifying an upload
    pub file_models: Vec<String>,
    /// Visibility given to every new upload
    pub is_public_default: bool,
    /// Icon sizes rendered for the admin, sorted ascending
    pub admin_icon_sizes: Vec<String>,
    pub enable_permissions: bool,
    /// Base URL of the static icon set (always ends with '/')
    pub static_url: String,
    pub file_model: FileModel,
    pub max_upload_size: usize,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        // Load .env file if exists, ignore if not found (optional for production)
        if let Err(e) = dotenvy::dotenv() {
            if !e.to_string().contains("not found") {
                eprintln!("Warning: Error loading .env file: {}", e);
            }
        }

        Ok(Config {
            app: AppConfig::from_env()?,
            database: DatabaseConfig::from_env()?,
            auth: AuthConfig::from_env()?,
            swagger: SwaggerConfig::from_env()?,
            minio: MinIOConfig::from_env()?,
            filer: FilerConfig::from_env()?,
        })
    }
}

impl AppConfig {
    const DEFAULT_MAX_REQUEST_BODY_SIZE: usize = 10 * 1024 * 1024; // 10MB

    pub fn from_env() -> Result<Self, String> {
        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|e| format!("Invalid PORT: {}", e))?;

        let cors_allowed_origins = split_list(
            &env::var("CORS_ALLOWED_ORIGINS").unwrap_or_else(|_| "*".to_string()),
        );

        let max_request_body_size = env::var("MAX_REQUEST_BODY_SIZE")
            .unwrap_or_else(|_| Self::DEFAULT_MAX_REQUEST_BODY_SIZE.to_string())
            .parse::<usize>()
            .map_err(|_| "MAX_REQUEST_BODY_SIZE must be a valid number".to_string())?;

        Ok(Self {
            host,
            port,
            cors_allowed_origins,
            max_request_body_size,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl DatabaseConfig {
    const DEFAULT_MAX_CONNECTIONS: u32 = 10;
    const DEFAULT_MIN_CONNECTIONS: u32 = 1;
    const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 5;
    const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 600; // 10 minutes
    const DEFAULT_MAX_LIFETIME_SECS: u64 = 1800; // 30 minutes

    pub fn from_env() -> Result<Self, String> {
        let url = env::var("DATABASE_URL").map_err(|_| "DATABASE_URL must be set".to_string())?;

        let max_connections = env::var("DB_MAX_CONNECTIONS")
            .unwrap_or_else(|_| Self::DEFAULT_MAX_CONNECTIONS.to_string())
            .parse::<u32>()
            .map_err(|_| "DB_MAX_CONNECTIONS must be a valid number".to_string())?;

        let min_connections = env::var("DB_MIN_CONNECTIONS")
            .unwrap_or_else(|_| Self::DEFAULT_MIN_CONNECTIONS.to_string())
            .parse::<u32>()
            .map_err(|_| "DB_MIN_CONNECTIONS must be a valid number".to_string())?;

        let acquire_timeout_secs = env::var("DB_ACQUIRE_TIMEOUT_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_ACQUIRE_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "DB_ACQUIRE_TIMEOUT_SECS must be a valid number".to_string())?;

        let idle_timeout_secs = env::var("DB_IDLE_TIMEOUT_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_IDLE_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "DB_IDLE_TIMEOUT_SECS must be a valid number".to_string())?;

        let max_lifetime_secs = env::var("DB_MAX_LIFETIME_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_MAX_LIFETIME_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "DB_MAX_LIFETIME_SECS must be a valid number".to_string())?;

        Ok(Self {
            url,
            max_connections,
            min_connections,
            acquire_timeout_secs,
            idle_timeout_secs,
            max_lifetime_secs,
        })
    }
}

impl AuthConfig {
    const DEFAULT_JWKS_CACHE_TTL_SECS: u64 = 3600; // 1 hour
    const DEFAULT_JWT_LEEWAY_SECS: u64 = 60;

    pub fn from_env() -> Result<Self, String> {
        let issuer = env::var("AUTH_ISSUER")
            .map_err(|_| "AUTH_ISSUER environment variable is required".to_string())?;

        let audience = env::var("AUTH_AUDIENCE")
            .map_err(|_| "AUTH_AUDIENCE environment variable is required".to_string())?;

        let claims_namespace = env::var("AUTH_CLAIMS_NAMESPACE")
            .unwrap_or_else(|_| "https://filer.local/claims".to_string());

        let jwks_cache_ttl_secs = env::var("JWKS_CACHE_TTL")
            .unwrap_or_else(|_| Self::DEFAULT_JWKS_CACHE_TTL_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "JWKS_CACHE_TTL must be a valid number".to_string())?;

        let jwt_leeway_secs = env::var("JWT_LEEWAY")
            .unwrap_or_else(|_| Self::DEFAULT_JWT_LEEWAY_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "JWT_LEEWAY must be a valid number".to_string())?;

        Ok(Self {
            issuer,
            audience,
            claims_namespace,
            jwks_cache_ttl: Duration::from_secs(jwks_cache_ttl_secs),
            jwt_leeway: Duration::from_secs(jwt_leeway_secs),
        })
    }
}

impl SwaggerConfig {
    pub fn from_env() -> Result<Self, String> {
        // Only use credentials if they are non-empty
        let username = env::var("SWAGGER_USERNAME").ok().filter(|s| !s.is_empty());
        let password = env::var("SWAGGER_PASSWORD").ok().filter(|s| !s.is_empty());
        let title = env::var("SWAGGER_TITLE").unwrap_or_else(|_| "Filer API".to_string());
        let version = env::var("SWAGGER_VERSION").unwrap_or_else(|_| "0.1.0".to_string());
        let description = env::var("SWAGGER_DESCRIPTION")
            .unwrap_or_else(|_| "File and folder management API".to_string());

        Ok(Self {
            username,
            password,
            title,
            version,
            description,
        })
    }

    /// Returns credentials in "username:password" format if auth is enabled
    pub fn credentials(&self) -> Option<String> {
        match (&self.username, &self.password) {
            (Some(user), Some(pass)) => Some(format!("{}:{}", user, pass)),
            _ => None,
        }
    }
}

impl MinIOConfig {
    const DEFAULT_PRESIGNED_URL_EXPIRY_SECS: u32 = 3600; // 1 hour

    pub fn from_env() -> Result<Self, String> {
        let endpoint =
            env::var("MINIO_ENDPOINT").unwrap_or_else(|_| "http://localhost:9000".to_string());

        let public_endpoint =
            env::var("MINIO_PUBLIC_ENDPOINT").unwrap_or_else(|_| endpoint.clone());

        let access_key = env::var("MINIO_ACCESS_KEY").unwrap_or_else(|_| "minioadmin".to_string());

        let secret_key = env::var("MINIO_SECRET_KEY").unwrap_or_else(|_| "minioadmin".to_string());

        let bucket = env::var("MINIO_BUCKET").unwrap_or_else(|_| "filer-uploads".to_string());

        let region = env::var("MINIO_REGION").unwrap_or_else(|_| "us-east-1".to_string());

        let public_prefix =
            env::var("MINIO_PUBLIC_PREFIX").unwrap_or_else(|_| "public".to_string());

        let private_prefix =
            env::var("MINIO_PRIVATE_PREFIX").unwrap_or_else(|_| "private".to_string());

        let presigned_url_expiry_secs = env::var("MINIO_PRESIGNED_URL_EXPIRY_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_PRESIGNED_URL_EXPIRY_SECS.to_string())
            .parse::<u32>()
            .map_err(|_| "MINIO_PRESIGNED_URL_EXPIRY_SECS must be a valid number".to_string())?;

        Ok(Self {
            endpoint,
            public_endpoint,
            access_key,
            secret_key,
            bucket,
            region,
            public_prefix,
            private_prefix,
            presigned_url_expiry_secs,
        })
    }
}

impl FilerConfig {
    const DEFAULT_FILE_MODELS: &'static str = "image,file";
    const DEFAULT_ADMIN_ICON_SIZES: &'static str = "16,32,48,64";
    const DEFAULT_MAX_UPLOAD_SIZE: usize = 10 * 1024 * 1024; // 10MB

    pub fn from_env() -> Result<Self, String> {
        let file_models = split_list(
            &env::var("FILER_FILE_MODELS").unwrap_or_else(|_| Self::DEFAULT_FILE_MODELS.into()),
        );

        let is_public_default = parse_bool(
            "FILER_IS_PUBLIC_DEFAULT",
            &env::var("FILER_IS_PUBLIC_DEFAULT").unwrap_or_else(|_| "true".to_string()),
        )?;

        let admin_icon_sizes = parse_icon_sizes(
            &env::var("FILER_ADMIN_ICON_SIZES")
                .unwrap_or_else(|_| Self::DEFAULT_ADMIN_ICON_SIZES.into()),
        )?;

        let enable_permissions = parse_bool(
            "FILER_ENABLE_PERMISSIONS",
            &env::var("FILER_ENABLE_PERMISSIONS").unwrap_or_else(|_| "false".to_string()),
        )?;

        let mut static_url = env::var("FILER_STATIC_URL").unwrap_or_else(|_| "/static/".into());
        if !static_url.ends_with('/') {
            static_url.push('/');
        }

        let file_model = FileModel::resolve(env::var("FILER_FILE_MODEL").ok().as_deref())?;

        let max_upload_size = env::var("FILER_MAX_UPLOAD_SIZE")
            .unwrap_or_else(|_| Self::DEFAULT_MAX_UPLOAD_SIZE.to_string())
            .parse::<usize>()
            .map_err(|_| "FILER_MAX_UPLOAD_SIZE must be a valid number".to_string())?;

        Ok(Self {
            file_models,
            is_public_default,
            admin_icon_sizes,
            enable_permissions,
            static_url,
            file_model,
            max_upload_size,
        })
    }
}

impl Default for FilerConfig {
    fn default() -> Self {
        Self {
            file_models: split_list(Self::DEFAULT_FILE_MODELS),
            is_public_default: true,
            admin_icon_sizes: split_list(Self::DEFAULT_ADMIN_ICON_SIZES),
            enable_permissions: false,
            static_url: "/static/".to_string(),
            file_model: FileModel::Builtin,
            max_upload_size: Self::DEFAULT_MAX_UPLOAD_SIZE,
        }
    }
}

/// Split a comma-separated value, trimming entries and dropping empty ones
fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn parse_bool(name: &str, value: &str) -> Result<bool, String> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(format!("{} must be a boolean, got '{}'", name, value)),
    }
}

/// Parse icon sizes and sort them numerically, keeping the string form used as map keys
fn parse_icon_sizes(value: &str) -> Result<Vec<String>, String> {
    let mut sizes = split_list(value)
        .into_iter()
        .map(|s| {
            match s.parse::<u32>() {
                Ok(0) => Err("FILER_ADMIN_ICON_SIZES entries must be at least 1".to_string()),
                Ok(n) => Ok((n, s.clone())),
                Err(_) => Err(format!(
                    "FILER_ADMIN_ICON_SIZES entry '{}' is not a number",
                    s
                )),
            }
        })
        .collect::<Result<Vec<_>, _>>()?;
    sizes.sort_by_key(|(n, _)| *n);
    sizes.dedup_by_key(|(n, _)| *n);
    Ok(sizes.into_iter().map(|(_, s)| s).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_icon_sizes_are_sorted_numerically() {
        let sizes = parse_icon_sizes("64, 16,32,48,16").unwrap();
        assert_eq!(sizes, vec!["16", "32", "48", "64"]);
    }

    #[test]
    fn test_icon_sizes_reject_garbage() {
        assert!(parse_icon_sizes("16,big").is_err());
    }

    #[test]
    fn test_icon_sizes_reject_zero() {
        assert!(parse_icon_sizes("0").is_err());
        assert!(parse_icon_sizes("16,0,32").is_err());
    }

    #[test]
    fn test_parse_bool() {
        assert!(parse_bool("X", "True").unwrap());
        assert!(!parse_bool("X", "off").unwrap());
        assert!(parse_bool("X", "maybe").is_err());
    }

    #[test]
    fn test_file_model_resolution() {
        assert_eq!(FileModel::resolve(None).unwrap(), FileModel::Builtin);
        assert_eq!(FileModel::resolve(Some("  ")).unwrap(), FileModel::Builtin);
        assert_eq!(
            FileModel::resolve(Some("filer_file")).unwrap(),
            FileModel::Builtin
        );
        assert_eq!(
            FileModel::resolve(Some("media_asset")).unwrap(),
            FileModel::Custom("media_asset".to_string())
        );
        assert!(FileModel::resolve(Some("assets; DROP TABLE x")).is_err());
    }

    #[test]
    fn test_default_filer_config() {
        let config = FilerConfig::default();
        assert_eq!(config.file_models, vec!["image", "file"]);
        assert_eq!(config.admin_icon_sizes, vec!["16", "32", "48", "64"]);
        assert!(config.is_public_default);
        assert_eq!(config.file_model.table(), "filer_file");
    }
}
