use indexmap::IndexMap;

use crate::backends::{BackendConnection, ConnectionManager};
use crate::error::{Result, ReportflowError};
use crate::executor::ReportExecutor;
use crate::models::{ColumnDescriptor, QueryResult, Report};
use crate::probe::SchemaProber;
use crate::registry::ReportRegistry;

fn resolve<'a>(
    registry: &'a ReportRegistry,
    connections: &'a ConnectionManager,
    report_name: &str,
) -> Result<(&'a Report, &'a dyn BackendConnection)> {
    let report = registry
        .get_report(report_name)
        .ok_or_else(|| ReportflowError::Validation(format!("unknown report {report_name}")))?;
    let data_source = report.data_source_name();
    let connection = connections.get(data_source).ok_or_else(|| {
        ReportflowError::Validation(format!("data source {data_source} not registered"))
    })?;
    Ok((report, connection.as_ref()))
}

/// Look up a report and its data source, parse the grid parameters with
/// that source's settings, and run one page.
///
/// Lookup and dialect configuration problems are returned as errors;
/// query failures are carried inside the returned [`QueryResult`].
pub async fn run_report<I, K, V>(
    registry: &ReportRegistry,
    connections: &ConnectionManager,
    report_name: &str,
    params: I,
) -> Result<QueryResult>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let (report, connection) = resolve(registry, connections, report_name)?;
    let config = connections.config_for(report.data_source_name());
    let executor = ReportExecutor::for_kind(config.dialect_kind()?, &config.query);
    Ok(executor
        .execute_report_params(connection, report, params)
        .await)
}

/// Probe a registered report's output columns.
pub async fn probe_report(
    registry: &ReportRegistry,
    connections: &ConnectionManager,
    report_name: &str,
    variables: &IndexMap<String, String>,
) -> Result<Vec<ColumnDescriptor>> {
    let (report, connection) = resolve(registry, connections, report_name)?;
    let config = connections.config_for(report.data_source_name());
    let prober = SchemaProber::for_kind(config.dialect_kind()?);
    prober
        .test_query(connection, &report.base_query, variables)
        .await
}
