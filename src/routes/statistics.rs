use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::statistics::{StatisticsParams, SubjectArchiveRequest};
use crate::services::StatisticsService;

// 懒加载的全局 StatisticsService 实例
static STATISTICS_SERVICE: Lazy<StatisticsService> = Lazy::new(StatisticsService::new_lazy);

pub async fn get_statistics(
    req: HttpRequest,
    query: web::Query<StatisticsParams>,
) -> ActixResult<HttpResponse> {
    STATISTICS_SERVICE
        .get_statistics(query.into_inner(), &req)
        .await
}

pub async fn archive_subject(
    req: HttpRequest,
    body: web::Json<SubjectArchiveRequest>,
) -> ActixResult<HttpResponse> {
    STATISTICS_SERVICE
        .set_subject_archived(body.into_inner(), true, &req)
        .await
}

pub async fn unarchive_subject(
    req: HttpRequest,
    body: web::Json<SubjectArchiveRequest>,
) -> ActixResult<HttpResponse> {
    STATISTICS_SERVICE
        .set_subject_archived(body.into_inner(), false, &req)
        .await
}

pub async fn get_dashboard(req: HttpRequest) -> ActixResult<HttpResponse> {
    STATISTICS_SERVICE.get_dashboard(&req).await
}

// 配置路由
pub fn configure_statistics_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/statistics")
            .wrap(middlewares::RequireApiKey)
            .route("", web::get().to(get_statistics))
            .route("/subjects/archive", web::post().to(archive_subject))
            .route("/subjects/unarchive", web::post().to(unarchive_subject)),
    )
    .service(
        web::scope("/api/v1/dashboard")
            .wrap(middlewares::RequireApiKey)
            .route("", web::get().to(get_dashboard)),
    );
}
