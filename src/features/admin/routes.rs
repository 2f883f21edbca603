use std::sync::Arc;

use axum::{routing::get, Router};
use tracing::info;

use crate::features::admin::dtos::AdminModelDto;
use crate::features::admin::handlers::admin_index;
use crate::features::admin::model_admin::ModelAdmin;
use crate::shared::constants::ADMIN_PREFIX;

/// The filer admin: registered models and the index listing them
#[derive(Default)]
pub struct AdminSite {
    models: Vec<Box<dyn ModelAdmin>>,
}

impl AdminSite {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<M: ModelAdmin + 'static>(mut self, admin: M) -> Self {
        info!("Admin model registered: {}", admin.model_name());
        self.models.push(Box::new(admin));
        self
    }

    pub fn model_names(&self) -> Vec<&'static str> {
        self.models.iter().map(|m| m.model_name()).collect()
    }

    /// Index entries for models that expose at least one permission
    pub fn index(&self) -> Vec<AdminModelDto> {
        self.models
            .iter()
            .filter(|m| m.model_perms().any())
            .map(|m| AdminModelDto {
                model_name: m.model_name().to_string(),
                verbose_name: m.verbose_name().to_string(),
                url: format!("{}/{}/", ADMIN_PREFIX, m.model_name()),
                permissions: m.model_perms(),
            })
            .collect()
    }

    /// Index route plus every model's routes under its mount point
    pub fn router(self) -> Router {
        let mut router = Router::new();
        for model in &self.models {
            router = router.nest(
                &format!("{}/{}", ADMIN_PREFIX, model.model_name()),
                model.routes(),
            );
        }

        let index = Router::new()
            .route(&format!("{}/", ADMIN_PREFIX), get(admin_index))
            .with_state(Arc::new(self));

        router.merge(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::admin::model_admin::ModelPermissions;
    use crate::shared::test_helpers::{create_staff_user, with_user};
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::Value;

    struct FolderAdmin;

    impl ModelAdmin for FolderAdmin {
        fn model_name(&self) -> &'static str {
            "folder"
        }

        fn verbose_name(&self) -> &'static str {
            "Folder"
        }

        fn routes(&self) -> Router {
            Router::new().route("/ping", get(|| async { "pong" }))
        }
    }

    struct HiddenAdmin;

    impl ModelAdmin for HiddenAdmin {
        fn model_name(&self) -> &'static str {
            "hidden"
        }

        fn verbose_name(&self) -> &'static str {
            "Hidden"
        }

        fn model_perms(&self) -> ModelPermissions {
            ModelPermissions::NONE
        }

        fn routes(&self) -> Router {
            Router::new().route("/ping", get(|| async { "hidden pong" }))
        }
    }

    fn site() -> AdminSite {
        AdminSite::new().register(FolderAdmin).register(HiddenAdmin)
    }

    #[test]
    fn test_index_hides_models_without_permissions() {
        let index = site().index();
        assert_eq!(index.len(), 1);
        assert_eq!(index[0].model_name, "folder");
        assert_eq!(index[0].url, "/api/admin/filer/folder/");
        assert_eq!(site().model_names(), vec!["folder", "hidden"]);
    }

    #[tokio::test]
    async fn test_models_are_mounted_even_when_hidden() {
        let server = TestServer::new(with_user(site().router(), create_staff_user())).unwrap();

        let response = server.get("/api/admin/filer/hidden/ping").await;
        response.assert_status_ok();
        response.assert_text("hidden pong");

        let response = server.get("/api/admin/filer/folder/ping").await;
        response.assert_text("pong");
    }

    #[tokio::test]
    async fn test_index_lists_visible_models() {
        let server = TestServer::new(with_user(site().router(), create_staff_user())).unwrap();

        let response = server.get("/api/admin/filer/").await;
        response.assert_status_ok();

        let body: Value = response.json();
        assert_eq!(body["meta"]["total"], 1);
        assert_eq!(body["data"][0]["model_name"], "folder");
        assert_eq!(body["data"][0]["permissions"]["delete"], true);
    }

    #[tokio::test]
    async fn test_index_requires_staff() {
        let mut user = create_staff_user();
        user.roles.clear();
        let server = TestServer::new(with_user(site().router(), user)).unwrap();

        server
            .get("/api/admin/filer/")
            .await
            .assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_index_requires_authentication() {
        let server = TestServer::new(site().router()).unwrap();

        server
            .get("/api/admin/filer/")
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }
}
