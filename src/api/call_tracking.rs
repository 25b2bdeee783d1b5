// Call tracking resources
// Call records with their issues, sources, assignments and status

use serde::Serialize;

use crate::error::Result;
use crate::http_client::QnxtHttpClient;
use crate::params::{Paging, ParamValue, Params};
use crate::response::Response;
use crate::utils::{join_segments, join_url};

const CALL_STATISTICS_BASE_PATH: &str = "QNXTApi/CallTracking/stats/calls/dates/count";
const CALL_TRACKING_BASE_PATH: &str = "QNXTApi/CallTracking";

/// Filters for the call count statistics
#[derive(Debug, Clone, Default)]
pub struct CallCountQuery {
    pub mem_id: Option<String>,
    pub prov_id: Option<String>,
    pub eligible_org_id: Option<String>,
    pub date_type: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    /// ByDefault, NewlyAdded, Modified or Deleted
    pub entity_state: Option<String>,
}

impl CallCountQuery {
    pub fn between(mut self, from: impl ParamValue, to: impl ParamValue) -> Self {
        self.date_from = Some(from.to_param());
        self.date_to = Some(to.to_param());
        self
    }

    fn to_params(&self) -> Params {
        Params::new()
            .set_opt("memId", self.mem_id.as_deref())
            .set_opt("provId", self.prov_id.as_deref())
            .set_opt("eligibleOrgId", self.eligible_org_id.as_deref())
            .set_opt("dateType", self.date_type.as_deref())
            .set_opt("dateFrom", self.date_from.as_deref())
            .set_opt("dateTo", self.date_to.as_deref())
            .set_opt("entityState", self.entity_state.as_deref())
    }
}

/// Filters for `callIssues/search`
#[derive(Debug, Clone, Default)]
pub struct CallIssueSearch {
    pub mem_id: Option<String>,
    pub prov_id: Option<String>,
    pub eligible_org_id: Option<String>,
    pub claim_id: Option<String>,
    pub referral_id: Option<String>,
    pub assigned_to_user_id: Option<String>,
    pub status: Option<String>,
    pub call_source_id: Option<String>,
    /// Email, Fax, Call, Walk-In, Letter, ...
    pub submit_method: Option<String>,
    pub call_date_from: Option<String>,
    pub call_date_to: Option<String>,
    pub paging: Paging,
}

impl CallIssueSearch {
    pub fn between(mut self, from: impl ParamValue, to: impl ParamValue) -> Self {
        self.call_date_from = Some(from.to_param());
        self.call_date_to = Some(to.to_param());
        self
    }

    fn to_params(&self) -> Params {
        let params = Params::new()
            .set_opt("memId", self.mem_id.as_deref())
            .set_opt("provId", self.prov_id.as_deref())
            .set_opt("eligibleOrgId", self.eligible_org_id.as_deref())
            .set_opt("claimId", self.claim_id.as_deref())
            .set_opt("referralId", self.referral_id.as_deref())
            .set_opt("assignedToUserId", self.assigned_to_user_id.as_deref())
            .set_opt("status", self.status.as_deref())
            .set_opt("callSourceId", self.call_source_id.as_deref())
            .set_opt("submitMethod", self.submit_method.as_deref())
            .set_opt("callDateFrom", self.call_date_from.as_deref())
            .set_opt("callDateTo", self.call_date_to.as_deref());
        self.paging.apply(params)
    }
}

/// Filters for `calls/search`
#[derive(Debug, Clone, Default)]
pub struct CallSearch {
    pub mem_id: Option<String>,
    pub user_id: Option<String>,
    pub caller_id: Option<String>,
    pub manager_id: Option<String>,
    pub prov_id: Option<String>,
    pub eligible_org_id: Option<String>,
    pub status: Option<String>,
    pub call_date_from: Option<String>,
    pub call_date_to: Option<String>,
    pub access_group_control: Option<String>,
    pub paging: Paging,
}

impl CallSearch {
    pub fn between(mut self, from: impl ParamValue, to: impl ParamValue) -> Self {
        self.call_date_from = Some(from.to_param());
        self.call_date_to = Some(to.to_param());
        self
    }

    fn to_params(&self) -> Params {
        let params = Params::new()
            .set_opt("callerId", self.caller_id.as_deref())
            .set_opt("memId", self.mem_id.as_deref())
            .set_opt("provId", self.prov_id.as_deref())
            .set_opt("eligibleOrgId", self.eligible_org_id.as_deref())
            .set_opt("managerId", self.manager_id.as_deref())
            .set_opt("callDateFrom", self.call_date_from.as_deref())
            .set_opt("callDateTo", self.call_date_to.as_deref())
            .set_opt("status", self.status.as_deref())
            .set_opt("userId", self.user_id.as_deref())
            .set_opt("accessGroupControl", self.access_group_control.as_deref());
        self.paging.apply(params)
    }
}

/// Call statistics: number of calls in the last month, quarter and year
#[derive(Debug, Clone)]
pub struct CallStatistics {
    http: QnxtHttpClient,
    base_uri: String,
}

impl CallStatistics {
    pub fn new(http: &QnxtHttpClient) -> Self {
        Self {
            base_uri: http.resource_uri(CALL_STATISTICS_BASE_PATH),
            http: http.clone(),
        }
    }

    pub fn get_call_count(&self, query: &CallCountQuery) -> Result<Response> {
        self.http.get(&self.base_uri, &query.to_params())
    }
}

/// Call records and their issues
#[derive(Debug, Clone)]
pub struct CallResource {
    http: QnxtHttpClient,
    base_uri: String,
}

impl CallResource {
    pub fn new(http: &QnxtHttpClient) -> Self {
        Self {
            base_uri: http.resource_uri(CALL_TRACKING_BASE_PATH),
            http: http.clone(),
        }
    }

    pub fn base_uri(&self) -> &str {
        &self.base_uri
    }

    /// Issues associated with calls matching the filters
    pub fn search_call_issues(&self, search: &CallIssueSearch) -> Result<Response> {
        self.http
            .get(&join_url(&self.base_uri, "callIssues/search"), &search.to_params())
    }

    /// Calls matching the filters
    pub fn search_calls(&self, search: &CallSearch) -> Result<Response> {
        self.http
            .get(&join_url(&self.base_uri, "calls/search"), &search.to_params())
    }

    /// Issues logged for a caller
    pub fn get_call_issues(&self, caller_id: &str, expand: Option<&str>) -> Result<Response> {
        let uri = join_segments(&self.base_uri, &["calls", caller_id, "issues"])?;
        let params = Params::new().set_opt("expand", expand);
        self.http.get(&uri, &params)
    }

    /// Call details for a caller
    pub fn get_call(&self, caller_id: &str, expand: Option<&str>) -> Result<Response> {
        let uri = join_segments(&self.base_uri, &["calls", caller_id])?;
        let params = Params::new().set_opt("expand", expand);
        self.http.get(&uri, &params)
    }

    /// Create a call record
    pub fn create_call<B: Serialize + ?Sized>(&self, call: &B) -> Result<Response> {
        self.http
            .post(&join_url(&self.base_uri, "calls"), &Params::new(), call)
    }

    /// Update an existing call record
    pub fn update_call<B: Serialize + ?Sized>(&self, call_id: &str, call: &B) -> Result<Response> {
        let uri = join_segments(&self.base_uri, &["calls", call_id])?;
        self.http.put(&uri, &Params::new(), call)
    }
}
