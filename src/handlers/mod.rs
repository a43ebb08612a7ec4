pub mod forms;

use actix_web::{web, HttpResponse, Resource};
use serde_json::json;

use crate::models::{Application, PartnerApplication, PromotionApplication};
use crate::render::INDEX_HTML;

pub const SERVICE_NAME: &str = "Pickaro";

pub async fn main() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(INDEX_HTML)
}

pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "status": "healthy",
        "message": format!("{} API is running", SERVICE_NAME)
    }))
}

// Placeholder until download tracking exists; serves the landing page.
pub async fn download() -> HttpResponse {
    main().await
}

fn form_resource<A: Application + 'static>() -> Resource {
    web::resource(A::PATH)
        .app_data(forms::form_config::<A>())
        .route(web::get().to(forms::show_form::<A>))
        .route(web::post().to(forms::submit_form::<A>))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(main))
        .route("/health", web::get().to(health_check))
        .route("/download", web::get().to(download))
        .service(form_resource::<PartnerApplication>())
        .service(form_resource::<PromotionApplication>());
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{http::StatusCode, test, App};

    #[actix_web::test]
    async fn health_reports_service_name() {
        let app = test::init_service(App::new().configure(configure)).await;
        let req = test::TestRequest::get().uri("/health").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body, json!({"status": "healthy", "message": "Pickaro API is running"}));
    }

    #[actix_web::test]
    async fn landing_and_download_serve_the_same_page() {
        let app = test::init_service(App::new().configure(configure)).await;

        let resp = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let landing = test::read_body(resp).await;

        let resp = test::call_service(&app, test::TestRequest::get().uri("/download").to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(test::read_body(resp).await, landing);
    }
}
