use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::assignments::{
    entities::AssignmentFilter,
    requests::{
        AssignmentListParams, CreateAssignmentRequest, DeleteAssignmentParams,
        UpdateAssignmentRequest,
    },
};
use crate::services::AssignmentService;
use crate::utils::SafeIDI64;

// 懒加载的全局 AssignmentService 实例
static ASSIGNMENT_SERVICE: Lazy<AssignmentService> = Lazy::new(AssignmentService::new_lazy);

// HTTP处理程序
pub async fn list_assignments(
    req: HttpRequest,
    query: web::Query<AssignmentListParams>,
) -> ActixResult<HttpResponse> {
    ASSIGNMENT_SERVICE
        .list_assignments(query.into_inner(), &req)
        .await
}

pub async fn list_pending(
    req: HttpRequest,
    query: web::Query<AssignmentListParams>,
) -> ActixResult<HttpResponse> {
    ASSIGNMENT_SERVICE
        .list_by_filter(AssignmentFilter::Pending, query.into_inner(), &req)
        .await
}

pub async fn list_completed(
    req: HttpRequest,
    query: web::Query<AssignmentListParams>,
) -> ActixResult<HttpResponse> {
    ASSIGNMENT_SERVICE
        .list_by_filter(AssignmentFilter::Completed, query.into_inner(), &req)
        .await
}

pub async fn list_overdue(
    req: HttpRequest,
    query: web::Query<AssignmentListParams>,
) -> ActixResult<HttpResponse> {
    ASSIGNMENT_SERVICE
        .list_by_filter(AssignmentFilter::Overdue, query.into_inner(), &req)
        .await
}

pub async fn list_due_today(req: HttpRequest) -> ActixResult<HttpResponse> {
    ASSIGNMENT_SERVICE.list_due_today(&req).await
}

pub async fn list_due_this_week(req: HttpRequest) -> ActixResult<HttpResponse> {
    ASSIGNMENT_SERVICE.list_due_this_week(&req).await
}

pub async fn get_assignment(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    ASSIGNMENT_SERVICE.get_assignment(id.0, &req).await
}

pub async fn create_assignment(
    req: HttpRequest,
    create_data: web::Json<CreateAssignmentRequest>,
) -> ActixResult<HttpResponse> {
    ASSIGNMENT_SERVICE
        .create_assignment(create_data.into_inner(), &req)
        .await
}

pub async fn update_assignment(
    req: HttpRequest,
    id: SafeIDI64,
    update_data: web::Json<UpdateAssignmentRequest>,
) -> ActixResult<HttpResponse> {
    ASSIGNMENT_SERVICE
        .update_assignment(id.0, update_data.into_inner(), &req)
        .await
}

pub async fn delete_assignment(
    req: HttpRequest,
    id: SafeIDI64,
    params: web::Query<DeleteAssignmentParams>,
) -> ActixResult<HttpResponse> {
    ASSIGNMENT_SERVICE
        .delete_assignment(id.0, params.into_inner(), &req)
        .await
}

pub async fn toggle_assignment(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    ASSIGNMENT_SERVICE.toggle_assignment(id.0, &req).await
}

// 配置路由，固定路径需在 /{id} 之前注册
pub fn configure_assignment_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/assignments")
            .wrap(middlewares::RequireApiKey)
            .route("", web::get().to(list_assignments))
            .route("", web::post().to(create_assignment))
            .route("/pending", web::get().to(list_pending))
            .route("/completed", web::get().to(list_completed))
            .route("/overdue", web::get().to(list_overdue))
            .route("/due-today", web::get().to(list_due_today))
            .route("/due-this-week", web::get().to(list_due_this_week))
            .route("/{id}", web::get().to(get_assignment))
            .route("/{id}", web::put().to(update_assignment))
            .route("/{id}", web::delete().to(delete_assignment))
            .route("/{id}/toggle", web::patch().to(toggle_assignment)),
    );
}
