// Member resources
// Continuity of Physician Care (COPC) providers and enrollment accumulators

use crate::error::Result;
use crate::http_client::QnxtHttpClient;
use crate::params::{Paging, ParamValue, Params};
use crate::response::Response;
use crate::utils::join_segments;

const MEMBER_BASE_PATH: &str = "QNXTApi/Member";

/// Filters for the COPC providers of an enrollment
#[derive(Debug, Clone, Default)]
pub struct CopcProviderQuery {
    /// Compare with copc.effdate and copc.termdate for active providers
    pub as_of_date: Option<String>,
    pub paging: Paging,
}

impl CopcProviderQuery {
    pub fn as_of(mut self, date: impl ParamValue) -> Self {
        self.as_of_date = Some(date.to_param());
        self
    }

    fn to_params(&self) -> Params {
        let params = Params::new().set_opt("asOfDate", self.as_of_date.as_deref());
        self.paging.apply(params)
    }
}

/// Inputs for validating a COPC provider
#[derive(Debug, Clone, Default)]
pub struct CopcValidationQuery {
    pub as_of_date: Option<String>,
    pub diag_codes: Option<String>,
    pub code_id: Option<String>,
    pub icd_version: Option<String>,
}

impl CopcValidationQuery {
    pub fn as_of(mut self, date: impl ParamValue) -> Self {
        self.as_of_date = Some(date.to_param());
        self
    }

    fn to_params(&self) -> Params {
        Params::new()
            .set_opt("asOfDate", self.as_of_date.as_deref())
            .set_opt("diagCodes", self.diag_codes.as_deref())
            .set_opt("codeId", self.code_id.as_deref())
            .set_opt("icdVersion", self.icd_version.as_deref())
    }
}

/// COPC providers associated with member enrollments
#[derive(Debug, Clone)]
pub struct CopcProviders {
    http: QnxtHttpClient,
    base_uri: String,
}

impl CopcProviders {
    pub fn new(http: &QnxtHttpClient) -> Self {
        Self {
            base_uri: http.resource_uri(MEMBER_BASE_PATH),
            http: http.clone(),
        }
    }

    /// COPC providers for an enrollment
    pub fn get_enrollment_providers(
        &self,
        enroll_id: &str,
        query: &CopcProviderQuery,
    ) -> Result<Response> {
        let uri = join_segments(&self.base_uri, &["enrollments", enroll_id, "copcProviders"])?;
        self.http.get(&uri, &query.to_params())
    }

    /// Whether a provider is a valid COPC provider for an enrollment
    ///
    /// The result is a boolean in the response body.
    pub fn validate_provider(
        &self,
        enroll_id: &str,
        prov_id: &str,
        query: &CopcValidationQuery,
    ) -> Result<Response> {
        let uri = join_segments(
            &self.base_uri,
            &["enrollments", enroll_id, "copcProviders", prov_id, "validate"],
        )?;
        self.http.get(&uri, &query.to_params())
    }
}

/// Accumulations: total, used and remaining balances for benefits,
/// deductibles and out-of-pocket maximums
#[derive(Debug, Clone)]
pub struct EnrollmentAccumulators {
    http: QnxtHttpClient,
    base_uri: String,
}

impl EnrollmentAccumulators {
    pub fn new(http: &QnxtHttpClient) -> Self {
        Self {
            base_uri: http.resource_uri(MEMBER_BASE_PATH),
            http: http.clone(),
        }
    }

    pub fn get_static_plan_accruals(&self, enroll_id: &str, expand: Option<&str>) -> Result<Response> {
        let uri = join_segments(&self.base_uri, &["accumulations", enroll_id, "staticPlanAccruals"])?;
        let params = Params::new().set_opt("expand", expand);
        self.http.get(&uri, &params)
    }

    /// Individual and family accruals for one accumulator
    ///
    /// `accum_type` is one of ANNUAL, DEDUCTIBLE, LIFETIME, LIFEUNITS, MAXOUT, VISITS.
    pub fn get_static_benefit_accruals(
        &self,
        enroll_id: &str,
        accum_id: &str,
        accum_type: &str,
        entity_state: Option<&str>,
    ) -> Result<Response> {
        let uri = join_segments(
            &self.base_uri,
            &["accumulations", enroll_id, "staticBenefitAccruals", accum_id, accum_type],
        )?;
        let params = Params::new().set_opt("entityState", entity_state);
        self.http.get(&uri, &params)
    }
}
