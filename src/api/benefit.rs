// Benefit resources
// Benefits are services included in a benefit plan: cost share, covered
// services, limits and restrictions.

use crate::error::Result;
use crate::http_client::QnxtHttpClient;
use crate::params::{ParamValue, Params};
use crate::response::Response;
use crate::utils::join_segments;

const BENEFIT_BASE_PATH: &str = "QNXTApi/Benefit";
const BENEFIT_PLAN_BASE_PATH: &str = "QNXTApi/Benefit/plans";

/// Optional filters for coverage details
#[derive(Debug, Clone, Default)]
pub struct CoverageDetailsQuery {
    pub enroll_id: Option<String>,
    /// Formatted `YYYY-MM-DD`, see [`ParamValue`]
    pub as_of_date: Option<String>,
    pub expand: Option<String>,
}

impl CoverageDetailsQuery {
    pub fn as_of(mut self, date: impl ParamValue) -> Self {
        self.as_of_date = Some(date.to_param());
        self
    }

    fn to_params(&self) -> Params {
        Params::new()
            .set_opt("enrollId", self.enroll_id.as_deref())
            .set_opt("asOfDate", self.as_of_date.as_deref())
            .set_opt("expand", self.expand.as_deref())
    }
}

/// Benefits of a plan, addressed by plan and benefit id
#[derive(Debug, Clone)]
pub struct BenefitResource {
    http: QnxtHttpClient,
    base_uri: String,
}

impl BenefitResource {
    pub fn new(http: &QnxtHttpClient) -> Self {
        Self {
            base_uri: http.resource_uri(BENEFIT_BASE_PATH),
            http: http.clone(),
        }
    }

    pub fn base_uri(&self) -> &str {
        &self.base_uri
    }

    /// Accumulators (AccumId, AccumType, Description) for a benefit
    pub fn get_accumulators(&self, plan_id: &str, benefit_id: &str) -> Result<Response> {
        let uri = join_segments(&self.base_uri, &["benefits", plan_id, benefit_id, "accumulators"])?;
        self.http.get(&uri, &Params::new())
    }

    pub fn get_benefit(&self, plan_id: &str, benefit_id: &str) -> Result<Response> {
        let uri = join_segments(&self.base_uri, &["benefits", plan_id, benefit_id])?;
        self.http.get(&uri, &Params::new())
    }

    /// Benefit data including limits and restrictions
    pub fn get_coverage_details(
        &self,
        plan_id: &str,
        benefit_id: &str,
        query: &CoverageDetailsQuery,
    ) -> Result<Response> {
        let uri = join_segments(&self.base_uri, &["benefits", plan_id, benefit_id, "details"])?;
        self.http.get(&uri, &query.to_params())
    }
}

/// A single benefit plan with default query parameters
#[derive(Debug, Clone)]
pub struct BenefitPlan {
    http: QnxtHttpClient,
    base_uri: String,
    plan_id: String,
    expand: Option<String>,
    enroll_type: Option<String>,
    as_of_date: Option<String>,
}

impl BenefitPlan {
    pub fn new(http: &QnxtHttpClient, plan_id: &str) -> Self {
        Self {
            base_uri: http.resource_uri(BENEFIT_PLAN_BASE_PATH),
            plan_id: plan_id.to_string(),
            http: http.clone(),
            expand: None,
            enroll_type: None,
            as_of_date: None,
        }
    }

    pub fn with_expand(mut self, expand: impl Into<String>) -> Self {
        self.expand = Some(expand.into());
        self
    }

    pub fn with_enroll_type(mut self, enroll_type: impl Into<String>) -> Self {
        self.enroll_type = Some(enroll_type.into());
        self
    }

    /// Set the `asOfDate` default used by plan details
    pub fn since(&mut self, as_of: impl ParamValue) {
        self.as_of_date = Some(as_of.to_param());
    }

    pub fn plan_id(&self) -> &str {
        &self.plan_id
    }

    /// URI of the plan itself, with the plan id escaped as one segment
    pub fn plan_uri(&self) -> Result<String> {
        join_segments(&self.base_uri, &[self.plan_id.as_str()])
    }

    /// Plan data; defaults `{expand}` merged with `overrides`
    pub fn get_benefit_plan(&self, overrides: &Params) -> Result<Response> {
        let params = Params::new()
            .set_opt("expand", self.expand.as_deref())
            .merge(overrides);
        self.http.get(&self.plan_uri()?, &params)
    }

    /// Plan details; defaults `{enrollType, asOfDate}` merged with `overrides`
    pub fn get_benefit_plan_details(&self, overrides: &Params) -> Result<Response> {
        let params = Params::new()
            .set_opt("enrollType", self.enroll_type.as_deref())
            .set_opt("asOfDate", self.as_of_date.as_deref())
            .merge(overrides);
        let uri = join_segments(&self.base_uri, &[self.plan_id.as_str(), "details"])?;
        self.http.get(&uri, &params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::tests::{http_for, static_http};
    use chrono::NaiveDate;
    use mockito::Matcher;

    #[test]
    fn test_base_uris() {
        let http = static_http("http://qnxt/");
        assert_eq!(BenefitResource::new(&http).base_uri(), "http://qnxt/QNXTApi/Benefit");
        assert_eq!(
            BenefitPlan::new(&http, "PLAN01").plan_uri().unwrap(),
            "http://qnxt/QNXTApi/Benefit/plans/PLAN01"
        );
    }

    #[test]
    fn test_get_accumulators_path() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/QNXTApi/Benefit/benefits/P1/B7/accumulators")
            .with_status(200)
            .with_body(r#"{"results":[{"accumId":"A1"}]}"#)
            .create();

        let response = BenefitResource::new(&http_for(&server))
            .get_accumulators("P1", "B7")
            .unwrap();

        mock.assert();
        assert_eq!(response.head(1)[0]["accumId"], "A1");
    }

    #[test]
    fn test_get_coverage_details_params() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/QNXTApi/Benefit/benefits/P1/B7/details")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("enrollId".into(), "E100".into()),
                Matcher::UrlEncoded("asOfDate".into(), "2024-02-29".into()),
            ]))
            .with_status(200)
            .with_body("{}")
            .create();

        let query = CoverageDetailsQuery {
            enroll_id: Some("E100".to_string()),
            ..Default::default()
        }
        .as_of(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());

        BenefitResource::new(&http_for(&server))
            .get_coverage_details("P1", "B7", &query)
            .unwrap();
        mock.assert();
    }

    #[test]
    fn test_benefit_plan_overrides_win() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/QNXTApi/Benefit/plans/PLAN01")
            .match_query(Matcher::UrlEncoded("expand".into(), "benefits".into()))
            .with_status(200)
            .with_body("{}")
            .create();

        let plan = BenefitPlan::new(&http_for(&server), "PLAN01").with_expand("none");
        plan.get_benefit_plan(&Params::new().set("expand", "benefits"))
            .unwrap();
        mock.assert();
    }

    #[test]
    fn test_benefit_plan_details_sends_defaults() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/QNXTApi/Benefit/plans/PLAN01/details")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("enrollType".into(), "MEDICAL".into()),
                Matcher::UrlEncoded("asOfDate".into(), "2023-12-31".into()),
            ]))
            .with_status(200)
            .with_body("{}")
            .create();

        let mut plan = BenefitPlan::new(&http_for(&server), "PLAN01").with_enroll_type("MEDICAL");
        plan.since("2023-12-31");
        plan.get_benefit_plan_details(&Params::new()).unwrap();
        mock.assert();
    }
}
