// Command line front end
// Parses commands, dispatches them to resource clients and renders responses

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde_json::Value;
use std::rc::Rc;

use crate::api::{
    ApplicationLogFilter, ApplicationLogs, BenefitPlan, BenefitResource, CallCountQuery,
    CallIssueSearch, CallResource, CallSearch, CallStatistics, CopcProviderQuery, CopcProviders,
    CopcValidationQuery, CoverageDetailsQuery, EnrollmentAccumulators, IncidentSearch, ProcessLogs,
};
use crate::auth::{Credentials, HeaderProvider, TokenManager};
use crate::config::{parse_param, Config, ConnectionArgs};
use crate::http_client::QnxtHttpClient;
use crate::params::{Paging, Params};
use crate::response::{to_pretty_json, Response};

/// QNXT REST API client
#[derive(Parser, Debug)]
#[command(name = "qnxt", author, version, about, long_about = None)]
pub struct CliArgs {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Print only the first N results
    #[arg(long, conflicts_with = "tail")]
    pub head: Option<usize>,

    /// Print only the last N results
    #[arg(long)]
    pub tail: Option<usize>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Acquire a token and print its status
    Token,
    /// Benefit and benefit plan resources
    Benefit {
        #[command(subcommand)]
        command: BenefitCommand,
    },
    /// Call tracking resources
    Calls {
        #[command(subcommand)]
        command: CallsCommand,
    },
    /// Member COPC providers and accumulators
    Member {
        #[command(subcommand)]
        command: MemberCommand,
    },
    /// Plan integration logs
    Logs {
        #[command(subcommand)]
        command: LogsCommand,
    },
    /// Appeal & grievance incident search
    Ag {
        #[command(subcommand)]
        command: AgCommand,
    },
}

/// Repeated `-p key=value` call-time parameters
#[derive(Args, Debug, Clone, Default)]
pub struct Overrides {
    /// Call-time query parameter; `key=` unsets a default
    #[arg(short = 'p', long = "param", value_name = "KEY=VALUE", value_parser = parse_param)]
    pub params: Vec<(String, String)>,
}

impl Overrides {
    pub fn to_params(&self) -> Params {
        let mut params = Params::new();
        for (key, value) in &self.params {
            let value = (!value.is_empty()).then(|| value.clone());
            params.insert(key, value);
        }
        params
    }
}

#[derive(Args, Debug, Clone, Default)]
pub struct PagingArgs {
    #[arg(long)]
    pub skip: Option<u32>,
    #[arg(long)]
    pub take: Option<u32>,
    /// ascending or descending
    #[arg(long)]
    pub order_by: Option<String>,
    #[arg(long)]
    pub expand: Option<String>,
}

impl From<&PagingArgs> for Paging {
    fn from(args: &PagingArgs) -> Self {
        Paging {
            skip: args.skip,
            take: args.take,
            order_by: args.order_by.clone(),
            expand: args.expand.clone(),
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum BenefitCommand {
    /// Accumulators for a benefit
    Accumulators { plan_id: String, benefit_id: String },
    /// A single benefit
    Get { plan_id: String, benefit_id: String },
    /// Benefit coverage details, limits and restrictions
    Coverage {
        plan_id: String,
        benefit_id: String,
        #[arg(long)]
        enroll_id: Option<String>,
        #[arg(long)]
        as_of: Option<String>,
        #[arg(long)]
        expand: Option<String>,
    },
    /// A benefit plan, or its details with --details
    Plan {
        plan_id: String,
        #[arg(long)]
        details: bool,
        #[arg(long)]
        expand: Option<String>,
        #[arg(long)]
        enroll_type: Option<String>,
        #[arg(long)]
        as_of: Option<String>,
        #[command(flatten)]
        overrides: Overrides,
    },
}

#[derive(Subcommand, Debug)]
pub enum CallsCommand {
    /// Call counts for the last month, quarter and year
    Count {
        #[arg(long)]
        mem_id: Option<String>,
        #[arg(long)]
        prov_id: Option<String>,
        #[arg(long)]
        eligible_org_id: Option<String>,
        #[arg(long)]
        date_type: Option<String>,
        #[arg(long)]
        from: Option<String>,
        #[arg(long)]
        to: Option<String>,
        #[arg(long)]
        entity_state: Option<String>,
    },
    /// Search call issues
    Issues {
        #[arg(long)]
        mem_id: Option<String>,
        #[arg(long)]
        prov_id: Option<String>,
        #[arg(long)]
        claim_id: Option<String>,
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        from: Option<String>,
        #[arg(long)]
        to: Option<String>,
        #[command(flatten)]
        paging: PagingArgs,
    },
    /// Search calls
    Search {
        #[arg(long)]
        mem_id: Option<String>,
        #[arg(long)]
        caller_id: Option<String>,
        #[arg(long)]
        user_id: Option<String>,
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        from: Option<String>,
        #[arg(long)]
        to: Option<String>,
        #[command(flatten)]
        paging: PagingArgs,
    },
    /// Issues logged for a caller
    CallerIssues {
        caller_id: String,
        #[arg(long)]
        expand: Option<String>,
    },
    /// Call details for a caller
    Get {
        caller_id: String,
        #[arg(long)]
        expand: Option<String>,
    },
    /// Create a call from a JSON body
    Create {
        #[arg(long)]
        body: String,
    },
    /// Update a call from a JSON body
    Update {
        call_id: String,
        #[arg(long)]
        body: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum MemberCommand {
    /// COPC providers for an enrollment
    CopcProviders {
        enroll_id: String,
        #[arg(long)]
        as_of: Option<String>,
        #[command(flatten)]
        paging: PagingArgs,
    },
    /// Validate a COPC provider for an enrollment
    ValidateCopc {
        enroll_id: String,
        prov_id: String,
        #[arg(long)]
        as_of: Option<String>,
        #[arg(long)]
        diag_codes: Option<String>,
        #[arg(long)]
        code_id: Option<String>,
        #[arg(long)]
        icd_version: Option<String>,
    },
    /// Static plan accruals for an enrollment
    PlanAccruals {
        enroll_id: String,
        #[arg(long)]
        expand: Option<String>,
    },
    /// Static benefit accruals for one accumulator
    BenefitAccruals {
        enroll_id: String,
        accum_id: String,
        /// ANNUAL, DEDUCTIBLE, LIFETIME, LIFEUNITS, MAXOUT or VISITS
        accum_type: String,
        #[arg(long)]
        entity_state: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum LogsCommand {
    /// Search application logs
    App {
        #[arg(long)]
        level: Option<String>,
        #[arg(long)]
        source: Option<String>,
        #[arg(long)]
        source_category: Option<String>,
        #[arg(long)]
        login_id: Option<String>,
        #[arg(long)]
        machine_name: Option<String>,
        #[arg(long)]
        reference_id: Option<String>,
        #[arg(long)]
        from: Option<String>,
        #[arg(long)]
        to: Option<String>,
        #[arg(long, default_value_t = 0)]
        skip: u32,
        #[arg(long)]
        take: Option<u32>,
        #[arg(long)]
        order_by: Option<String>,
        #[arg(long)]
        expand: Option<String>,
        #[command(flatten)]
        overrides: Overrides,
    },
    /// Process log detail XMLs
    Process {
        process_log_detail_id: String,
        #[command(flatten)]
        overrides: Overrides,
    },
}

#[derive(Subcommand, Debug)]
pub enum AgCommand {
    /// Incidents by detail id
    ById {
        detail_id: String,
        #[command(flatten)]
        paging: PagingArgs,
        #[command(flatten)]
        overrides: Overrides,
    },
    /// Incidents by detail type
    ByType {
        detail_type: String,
        #[command(flatten)]
        paging: PagingArgs,
        #[command(flatten)]
        overrides: Overrides,
    },
    /// Incidents by status list
    ByStatus {
        statuses: String,
        #[command(flatten)]
        paging: PagingArgs,
        #[command(flatten)]
        overrides: Overrides,
    },
}

/// Run a parsed command against the configured servers
pub fn run(config: &Config, args: &CliArgs) -> Result<()> {
    let manager = Rc::new(TokenManager::new(
        &config.sts_server,
        &config.env_id,
        Credentials::new(config.username.clone(), config.password.clone()),
        config.token_refresh_threshold,
    )?);

    if let Command::Token = args.command {
        manager.headers()?;
        println!("{}", manager.status());
        return Ok(());
    }

    let provider: Rc<dyn HeaderProvider> = manager;
    let http = QnxtHttpClient::new(&config.app_server, provider)?;

    let response = execute(&args.command, &http)?.error_for_status()?;
    println!("{}", render(&response, args.head, args.tail));
    Ok(())
}

/// Dispatch a resource command; `token` is handled by [`run`]
pub fn execute(command: &Command, http: &QnxtHttpClient) -> Result<Response> {
    let response = match command {
        Command::Token => anyhow::bail!("`token` does not call a resource"),
        Command::Benefit { command } => execute_benefit(command, http)?,
        Command::Calls { command } => execute_calls(command, http)?,
        Command::Member { command } => execute_member(command, http)?,
        Command::Logs { command } => execute_logs(command, http)?,
        Command::Ag { command } => execute_ag(command, http)?,
    };
    Ok(response)
}

fn execute_benefit(command: &BenefitCommand, http: &QnxtHttpClient) -> crate::error::Result<Response> {
    let benefits = BenefitResource::new(http);
    match command {
        BenefitCommand::Accumulators { plan_id, benefit_id } => {
            benefits.get_accumulators(plan_id, benefit_id)
        }
        BenefitCommand::Get { plan_id, benefit_id } => benefits.get_benefit(plan_id, benefit_id),
        BenefitCommand::Coverage {
            plan_id,
            benefit_id,
            enroll_id,
            as_of,
            expand,
        } => {
            let query = CoverageDetailsQuery {
                enroll_id: enroll_id.clone(),
                as_of_date: as_of.clone(),
                expand: expand.clone(),
            };
            benefits.get_coverage_details(plan_id, benefit_id, &query)
        }
        BenefitCommand::Plan {
            plan_id,
            details,
            expand,
            enroll_type,
            as_of,
            overrides,
        } => {
            let mut plan = BenefitPlan::new(http, plan_id);
            if let Some(expand) = expand {
                plan = plan.with_expand(expand.as_str());
            }
            if let Some(enroll_type) = enroll_type {
                plan = plan.with_enroll_type(enroll_type.as_str());
            }
            if let Some(as_of) = as_of {
                plan.since(as_of);
            }

            if *details {
                plan.get_benefit_plan_details(&overrides.to_params())
            } else {
                plan.get_benefit_plan(&overrides.to_params())
            }
        }
    }
}

fn execute_calls(command: &CallsCommand, http: &QnxtHttpClient) -> Result<Response> {
    let response = match command {
        CallsCommand::Count {
            mem_id,
            prov_id,
            eligible_org_id,
            date_type,
            from,
            to,
            entity_state,
        } => {
            let query = CallCountQuery {
                mem_id: mem_id.clone(),
                prov_id: prov_id.clone(),
                eligible_org_id: eligible_org_id.clone(),
                date_type: date_type.clone(),
                date_from: from.clone(),
                date_to: to.clone(),
                entity_state: entity_state.clone(),
            };
            CallStatistics::new(http).get_call_count(&query)?
        }
        CallsCommand::Issues {
            mem_id,
            prov_id,
            claim_id,
            status,
            from,
            to,
            paging,
        } => {
            let search = CallIssueSearch {
                mem_id: mem_id.clone(),
                prov_id: prov_id.clone(),
                claim_id: claim_id.clone(),
                status: status.clone(),
                call_date_from: from.clone(),
                call_date_to: to.clone(),
                paging: paging.into(),
                ..Default::default()
            };
            CallResource::new(http).search_call_issues(&search)?
        }
        CallsCommand::Search {
            mem_id,
            caller_id,
            user_id,
            status,
            from,
            to,
            paging,
        } => {
            let search = CallSearch {
                mem_id: mem_id.clone(),
                caller_id: caller_id.clone(),
                user_id: user_id.clone(),
                status: status.clone(),
                call_date_from: from.clone(),
                call_date_to: to.clone(),
                paging: paging.into(),
                ..Default::default()
            };
            CallResource::new(http).search_calls(&search)?
        }
        CallsCommand::CallerIssues { caller_id, expand } => {
            CallResource::new(http).get_call_issues(caller_id, expand.as_deref())?
        }
        CallsCommand::Get { caller_id, expand } => {
            CallResource::new(http).get_call(caller_id, expand.as_deref())?
        }
        CallsCommand::Create { body } => {
            let body = parse_body(body)?;
            CallResource::new(http).create_call(&body)?
        }
        CallsCommand::Update { call_id, body } => {
            let body = parse_body(body)?;
            CallResource::new(http).update_call(call_id, &body)?
        }
    };
    Ok(response)
}

fn execute_member(command: &MemberCommand, http: &QnxtHttpClient) -> crate::error::Result<Response> {
    match command {
        MemberCommand::CopcProviders {
            enroll_id,
            as_of,
            paging,
        } => {
            let query = CopcProviderQuery {
                as_of_date: as_of.clone(),
                paging: paging.into(),
            };
            CopcProviders::new(http).get_enrollment_providers(enroll_id, &query)
        }
        MemberCommand::ValidateCopc {
            enroll_id,
            prov_id,
            as_of,
            diag_codes,
            code_id,
            icd_version,
        } => {
            let query = CopcValidationQuery {
                as_of_date: as_of.clone(),
                diag_codes: diag_codes.clone(),
                code_id: code_id.clone(),
                icd_version: icd_version.clone(),
            };
            CopcProviders::new(http).validate_provider(enroll_id, prov_id, &query)
        }
        MemberCommand::PlanAccruals { enroll_id, expand } => {
            EnrollmentAccumulators::new(http).get_static_plan_accruals(enroll_id, expand.as_deref())
        }
        MemberCommand::BenefitAccruals {
            enroll_id,
            accum_id,
            accum_type,
            entity_state,
        } => EnrollmentAccumulators::new(http).get_static_benefit_accruals(
            enroll_id,
            accum_id,
            accum_type,
            entity_state.as_deref(),
        ),
    }
}

fn execute_logs(command: &LogsCommand, http: &QnxtHttpClient) -> crate::error::Result<Response> {
    match command {
        LogsCommand::App {
            level,
            source,
            source_category,
            login_id,
            machine_name,
            reference_id,
            from,
            to,
            skip,
            take,
            order_by,
            expand,
            overrides,
        } => {
            let filter = ApplicationLogFilter {
                expand: expand.clone(),
                level: level.clone(),
                login_id: login_id.clone(),
                machine_name: machine_name.clone(),
                order_by: order_by.clone(),
                reference_id: reference_id.clone(),
                skip: Some(*skip),
                source: source.clone(),
                source_category: source_category.clone(),
                take: *take,
                utc_date_from: from.clone(),
                utc_date_to: to.clone(),
            };
            ApplicationLogs::new(http, filter).search(&overrides.to_params())
        }
        LogsCommand::Process {
            process_log_detail_id,
            overrides,
        } => ProcessLogs::new(http, process_log_detail_id.as_str()).get_details(&overrides.to_params()),
    }
}

fn execute_ag(command: &AgCommand, http: &QnxtHttpClient) -> crate::error::Result<Response> {
    match command {
        AgCommand::ById {
            detail_id,
            paging,
            overrides,
        } => IncidentSearch::new(http, paging.into())
            .get_details_by_id(detail_id, &overrides.to_params()),
        AgCommand::ByType {
            detail_type,
            paging,
            overrides,
        } => IncidentSearch::new(http, paging.into())
            .get_details_by_type(detail_type, &overrides.to_params()),
        AgCommand::ByStatus {
            statuses,
            paging,
            overrides,
        } => IncidentSearch::new(http, paging.into())
            .get_details_by_status(statuses, &overrides.to_params()),
    }
}

fn parse_body(body: &str) -> Result<Value> {
    serde_json::from_str(body).context("--body must be valid JSON")
}

/// Render a response as pretty JSON, optionally only the first or last N results
pub fn render(response: &Response, head: Option<usize>, tail: Option<usize>) -> String {
    match (head, tail) {
        (Some(n), _) => to_pretty_json(response.head(n)),
        (None, Some(n)) => to_pretty_json(response.tail(n)),
        (None, None) => response.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;
    use serde_json::json;

    fn parse(args: &[&str]) -> CliArgs {
        let mut argv = vec!["qnxt"];
        argv.extend_from_slice(args);
        CliArgs::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_parse_benefit_plan_with_overrides() {
        let args = parse(&[
            "--head", "2", "benefit", "plan", "P1", "--details", "-p", "asOfDate=2024-01-01", "-p",
            "enrollType=",
        ]);
        assert_eq!(args.head, Some(2));
        match args.command {
            Command::Benefit {
                command: BenefitCommand::Plan {
                    plan_id,
                    details,
                    overrides,
                    ..
                },
            } => {
                assert_eq!(plan_id, "P1");
                assert!(details);
                let params = overrides.to_params();
                assert_eq!(params.get("asOfDate"), Some("2024-01-01"));
                assert!(params.contains_key("enrollType"));
                assert_eq!(params.get("enrollType"), None);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_head_and_tail_conflict() {
        let result = CliArgs::try_parse_from(["qnxt", "--head", "1", "--tail", "1", "token"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_param_rejected() {
        let result = CliArgs::try_parse_from(["qnxt", "logs", "process", "PLD-1", "-p", "oops"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_ag_paging() {
        let args = parse(&["ag", "by-status", "OPEN", "--take", "5", "--order-by", "descending"]);
        match args.command {
            Command::Ag {
                command: AgCommand::ByStatus { statuses, paging, .. },
            } => {
                assert_eq!(statuses, "OPEN");
                let paging = Paging::from(&paging);
                assert_eq!(paging.take, Some(5));
                assert_eq!(paging.order_by.as_deref(), Some("descending"));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_render_head_tail_and_full() {
        let response = Response::new(
            StatusCode::OK,
            "http://qnxt/x",
            json!({"results": [{"id": 1}, {"id": 2}, {"id": 3}]}),
        );

        let head: Value = serde_json::from_str(&render(&response, Some(1), None)).unwrap();
        assert_eq!(head, json!([{"id": 1}]));

        let tail: Value = serde_json::from_str(&render(&response, None, Some(2))).unwrap();
        assert_eq!(tail, json!([{"id": 2}, {"id": 3}]));

        let full = render(&response, None, None);
        assert!(full.contains("\"results\""));
        assert!(full.contains("\n    \"results\""));
    }

    #[test]
    fn test_parse_body_rejects_invalid_json() {
        assert!(parse_body("{not json").is_err());
        assert_eq!(parse_body(r#"{"memId":"M1"}"#).unwrap(), json!({"memId": "M1"}));
    }
}
