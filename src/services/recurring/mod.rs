pub mod create;
pub mod delete;
pub mod detail;
pub mod list;
pub mod orchestrator;
pub mod update;

pub use orchestrator::{GenerationReport, RecurringOrchestrator};

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::recurring::requests::{
    CreateRecurringRequest, DeleteRecurringParams, UpdateRecurringRequest,
};

/// 周期作业 HTTP 服务，业务逻辑委托给 [`RecurringOrchestrator`]
pub struct RecurringService {
    orchestrator: Option<Arc<RecurringOrchestrator>>,
}

impl RecurringService {
    pub fn new_lazy() -> Self {
        Self { orchestrator: None }
    }

    pub(crate) fn get_orchestrator(&self, request: &HttpRequest) -> Arc<RecurringOrchestrator> {
        if let Some(orchestrator) = &self.orchestrator {
            orchestrator.clone()
        } else {
            crate::services::get_orchestrator(request)
        }
    }

    pub async fn list_recurring(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        list::list_recurring(self, request).await
    }

    pub async fn create_recurring(
        &self,
        create_data: CreateRecurringRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_recurring(self, create_data, request).await
    }

    pub async fn get_recurring(
        &self,
        recurring_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        detail::get_recurring(self, recurring_id, request).await
    }

    // 更新模板与规则
    pub async fn update_recurring(
        &self,
        recurring_id: i64,
        update_data: UpdateRecurringRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        update::update_recurring(self, recurring_id, update_data, request).await
    }

    // 暂停或恢复
    pub async fn set_active(
        &self,
        recurring_id: i64,
        active: bool,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        update::set_active(self, recurring_id, active, request).await
    }

    pub async fn delete_recurring(
        &self,
        recurring_id: i64,
        params: DeleteRecurringParams,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        delete::delete_recurring(self, recurring_id, params, request).await
    }
}
