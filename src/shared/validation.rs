use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Regex for validating SQL identifiers taken from configuration (table names)
    /// Must start with a lowercase letter or underscore, then lowercase alphanumerics or underscores
    /// - Valid: "filer_file", "media_asset", "_files2"
    /// - Invalid: "2files", "Files", "files-table", "files; drop"
    pub static ref IDENTIFIER_REGEX: Regex = Regex::new(r"^[a-z_][a-z0-9_]{0,62}$").unwrap();
}
