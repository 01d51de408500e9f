pub mod create;
pub mod delete;
pub mod detail;
pub mod list;
pub mod toggle;
pub mod update;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::errors::{HWTrackerError, Result};
use crate::models::assignments::{
    entities::{Assignment, AssignmentFilter},
    requests::{
        AssignmentListParams, CreateAssignmentRequest, DeleteAssignmentParams,
        UpdateAssignmentRequest,
    },
};
use crate::storage::Storage;

pub struct AssignmentService {
    storage: Option<Arc<dyn Storage>>,
}

impl AssignmentService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> Arc<dyn Storage> {
        if let Some(storage) = &self.storage {
            storage.clone()
        } else {
            request
                .app_data::<actix_web::web::Data<Arc<dyn Storage>>>()
                .expect("Storage not found in app data")
                .get_ref()
                .clone()
        }
    }

    // 作业列表，可按状态过滤
    pub async fn list_assignments(
        &self,
        query: AssignmentListParams,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        list::list_assignments(self, query, request).await
    }

    // 固定过滤条件的作业列表
    pub async fn list_by_filter(
        &self,
        filter: AssignmentFilter,
        query: AssignmentListParams,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        let query = AssignmentListParams {
            filter: Some(filter),
            ..query
        };
        list::list_assignments(self, query, request).await
    }

    // 今天到期的未完成作业
    pub async fn list_due_today(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        list::list_due_within_days(self, 1, request).await
    }

    // 七天内到期的未完成作业
    pub async fn list_due_this_week(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        list::list_due_within_days(self, 7, request).await
    }

    pub async fn get_assignment(
        &self,
        assignment_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        detail::get_assignment(self, assignment_id, request).await
    }

    // 创建作业，带周期设置时创建周期作业
    pub async fn create_assignment(
        &self,
        create_data: CreateAssignmentRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_assignment(self, create_data, request).await
    }

    pub async fn update_assignment(
        &self,
        assignment_id: i64,
        update_data: UpdateAssignmentRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        update::update_assignment(self, assignment_id, update_data, request).await
    }

    pub async fn delete_assignment(
        &self,
        assignment_id: i64,
        params: DeleteAssignmentParams,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        delete::delete_assignment(self, assignment_id, params, request).await
    }

    // 切换完成状态
    pub async fn toggle_assignment(
        &self,
        assignment_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        toggle::toggle_assignment(self, assignment_id, request).await
    }
}

/// 读取作业并校验归属
pub(crate) async fn load_owned(
    storage: &Arc<dyn Storage>,
    user_id: i64,
    assignment_id: i64,
) -> Result<Assignment> {
    let assignment = storage
        .get_assignment_by_id(assignment_id)
        .await?
        .ok_or_else(|| HWTrackerError::not_found(format!("作业不存在: {assignment_id}")))?;

    if assignment.user_id != user_id {
        return Err(HWTrackerError::authorization("无权访问该作业"));
    }
    Ok(assignment)
}
