// Plan integration resources: application logs and process log details

use crate::error::Result;
use crate::http_client::QnxtHttpClient;
use crate::params::{ParamValue, Params};
use crate::response::Response;
use crate::utils::{join_segments, join_url};

const PLAN_INTEGRATION_BASE_PATH: &str = "QNXTApi/PlanIntegration";

/// Default filters for the application log search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationLogFilter {
    pub expand: Option<String>,
    pub level: Option<String>,
    pub login_id: Option<String>,
    pub machine_name: Option<String>,
    pub order_by: Option<String>,
    pub reference_id: Option<String>,
    pub skip: Option<u32>,
    pub source: Option<String>,
    pub source_category: Option<String>,
    pub take: Option<u32>,
    pub utc_date_from: Option<String>,
    pub utc_date_to: Option<String>,
}

impl Default for ApplicationLogFilter {
    fn default() -> Self {
        Self {
            expand: None,
            level: None,
            login_id: None,
            machine_name: None,
            order_by: None,
            reference_id: None,
            skip: Some(0),
            source: None,
            source_category: None,
            take: None,
            utc_date_from: None,
            utc_date_to: None,
        }
    }
}

impl ApplicationLogFilter {
    fn to_params(&self) -> Params {
        Params::new()
            .set_opt("expand", self.expand.as_deref())
            .set_opt("level", self.level.as_deref())
            .set_opt("loginId", self.login_id.as_deref())
            .set_opt("machineName", self.machine_name.as_deref())
            .set_opt("orderBy", self.order_by.as_deref())
            .set_opt("referenceId", self.reference_id.as_deref())
            .set_opt("skip", self.skip)
            .set_opt("source", self.source.as_deref())
            .set_opt("sourceCategory", self.source_category.as_deref())
            .set_opt("take", self.take)
            .set_opt("utcDateFrom", self.utc_date_from.as_deref())
            .set_opt("utcDateTo", self.utc_date_to.as_deref())
    }
}

/// Application log search
#[derive(Debug, Clone)]
pub struct ApplicationLogs {
    http: QnxtHttpClient,
    base_uri: String,
    filter: ApplicationLogFilter,
}

impl ApplicationLogs {
    pub fn new(http: &QnxtHttpClient, filter: ApplicationLogFilter) -> Self {
        Self {
            base_uri: http.resource_uri(PLAN_INTEGRATION_BASE_PATH),
            http: http.clone(),
            filter,
        }
    }

    pub fn filter(&self) -> &ApplicationLogFilter {
        &self.filter
    }

    /// Set the default `utcDateFrom`
    pub fn from_date(&mut self, date: impl ParamValue) {
        self.filter.utc_date_from = Some(date.to_param());
    }

    /// Set the default `utcDateTo`
    pub fn to_date(&mut self, date: impl ParamValue) {
        self.filter.utc_date_to = Some(date.to_param());
    }

    /// Search logs with the default filter merged with `overrides`
    pub fn search(&self, overrides: &Params) -> Result<Response> {
        let params = self.filter.to_params().merge(overrides);
        self.http
            .get(&join_url(&self.base_uri, "applicationLogs/search"), &params)
    }
}

/// Full details (XMLs) of one process log entry
#[derive(Debug, Clone)]
pub struct ProcessLogs {
    http: QnxtHttpClient,
    base_uri: String,
    process_log_detail_id: String,
}

impl ProcessLogs {
    pub fn new(http: &QnxtHttpClient, process_log_detail_id: impl Into<String>) -> Self {
        Self {
            base_uri: http.resource_uri(PLAN_INTEGRATION_BASE_PATH),
            http: http.clone(),
            process_log_detail_id: process_log_detail_id.into(),
        }
    }

    pub fn get_details(&self, overrides: &Params) -> Result<Response> {
        let uri = join_segments(
            &self.base_uri,
            &["ProcessLogDetails", self.process_log_detail_id.as_str(), "xmls"],
        )?;
        let params = Params::new()
            .set("processLogDetailId", self.process_log_detail_id.as_str())
            .merge(overrides);
        self.http.get(&uri, &params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::tests::http_for;
    use chrono::{TimeZone, Utc};
    use mockito::Matcher;

    #[test]
    fn test_default_filter_skips_zero() {
        let params = ApplicationLogFilter::default().to_params();
        assert_eq!(params.get("skip"), Some("0"));
        assert_eq!(params.to_query(), vec![("skip", "0")]);
    }

    #[test]
    fn test_search_merges_overrides() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/QNXTApi/PlanIntegration/applicationLogs/search")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("level".into(), "Warning".into()),
                Matcher::UrlEncoded("source".into(), "ClaimEngine".into()),
                Matcher::UrlEncoded("skip".into(), "0".into()),
                Matcher::UrlEncoded("utcDateFrom".into(), "2024-04-01".into()),
                Matcher::UrlEncoded("utcDateTo".into(), "2024-04-02".into()),
            ]))
            .with_status(200)
            .with_body(r#"{"results":[{"message":"slow query"}]}"#)
            .create();

        let filter = ApplicationLogFilter {
            level: Some("Error".to_string()),
            source: Some("ClaimEngine".to_string()),
            ..Default::default()
        };
        let mut logs = ApplicationLogs::new(&http_for(&server), filter);
        logs.from_date(Utc.with_ymd_and_hms(2024, 4, 1, 6, 30, 0).unwrap());
        logs.to_date("2024-04-02");

        let response = logs
            .search(&Params::new().set("level", "Warning"))
            .unwrap();
        mock.assert();
        assert_eq!(response.tail(1)[0]["message"], "slow query");
        assert_eq!(logs.filter().level.as_deref(), Some("Error"));
    }

    #[test]
    fn test_process_log_details() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/QNXTApi/PlanIntegration/ProcessLogDetails/PLD-5/xmls")
            .match_query(Matcher::UrlEncoded(
                "processLogDetailId".into(),
                "PLD-5".into(),
            ))
            .with_status(200)
            .with_body(r#"{"results":[]}"#)
            .create();

        ProcessLogs::new(&http_for(&server), "PLD-5")
            .get_details(&Params::new())
            .unwrap();
        mock.assert();
    }
}
