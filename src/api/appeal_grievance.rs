// Appeal & grievance incident search

use crate::error::Result;
use crate::http_client::QnxtHttpClient;
use crate::params::{Paging, Params};
use crate::response::Response;

const AG_INCIDENT_SEARCH_PATH: &str = "QNXTApi/AppealAndGrievance/agIncidents/search";

/// Incident detail search with default paging
///
/// The identifying key of each lookup is applied after call-time
/// overrides, so an override can never replace it.
#[derive(Debug, Clone)]
pub struct IncidentSearch {
    http: QnxtHttpClient,
    base_uri: String,
    paging: Paging,
}

impl IncidentSearch {
    pub fn new(http: &QnxtHttpClient, paging: Paging) -> Self {
        Self {
            base_uri: http.resource_uri(AG_INCIDENT_SEARCH_PATH),
            http: http.clone(),
            paging,
        }
    }

    pub fn paging(&self) -> &Paging {
        &self.paging
    }

    pub fn ascending(&mut self) {
        self.paging.order_by = Some("ascending".to_string());
    }

    pub fn descending(&mut self) {
        self.paging.order_by = Some("descending".to_string());
    }

    pub fn get_details_by_id(&self, detail_id: &str, overrides: &Params) -> Result<Response> {
        self.search("detailId", detail_id, overrides)
    }

    pub fn get_details_by_type(&self, detail_type: &str, overrides: &Params) -> Result<Response> {
        self.search("detailType", detail_type, overrides)
    }

    pub fn get_details_by_status(&self, statuses: &str, overrides: &Params) -> Result<Response> {
        self.search("statuses", statuses, overrides)
    }

    fn search(&self, key: &str, value: &str, overrides: &Params) -> Result<Response> {
        let params = self
            .paging
            .apply(Params::new())
            .merge(overrides)
            .set(key, value);
        self.http.get(&self.base_uri, &params)
    }
}
