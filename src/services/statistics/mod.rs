pub mod archive;
pub mod dashboard;
pub mod summary;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::statistics::{StatisticsParams, SubjectArchiveRequest};
use crate::storage::Storage;

pub struct StatisticsService {
    storage: Option<Arc<dyn Storage>>,
}

impl StatisticsService {
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

    // 完成情况统计
    pub async fn get_statistics(
        &self,
        query: StatisticsParams,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        summary::get_statistics(self, query, request).await
    }

    // 按科目归档或取消归档
    pub async fn set_subject_archived(
        &self,
        body: SubjectArchiveRequest,
        archived: bool,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        archive::set_subject_archived(self, body, archived, request).await
    }

    pub async fn get_dashboard(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        dashboard::get_dashboard(self, request).await
    }
}
