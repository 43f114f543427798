//! Comparison of the `latest` and `trunk` documentation

use crate::extract::extract_endpoints;
use crate::types::{ComparisonResult, EndpointDiff, EndpointRecord, SizeSummary};
use std::collections::HashSet;

/// Focus value that adds an endpoint diff
pub const FOCUS_ENDPOINTS: &str = "endpoints";

/// Compare two documents
///
/// Sizes are character counts. The percentage is taken relative to
/// `latest`. Endpoints are diffed by method and path only.
pub fn compare_payloads(latest: &str, trunk: &str, focus: &[String]) -> ComparisonResult {
    let latest_size = latest.chars().count();
    let trunk_size = trunk.chars().count();
    let size_difference = trunk_size as i64 - latest_size as i64;
    let percent_difference = if latest_size == 0 {
        None
    } else {
        Some(size_difference as f64 * 100.0 / latest_size as f64)
    };

    let summary = SizeSummary {
        latest_size,
        trunk_size,
        size_difference,
        percent_difference,
        identical: latest == trunk,
    };

    let endpoint_diff = wants_endpoints(focus).then(|| {
        let latest_endpoints = extract_endpoints(latest, false);
        let trunk_endpoints = extract_endpoints(trunk, false);
        EndpointDiff {
            latest_count: latest_endpoints.len(),
            trunk_count: trunk_endpoints.len(),
            only_in_latest: difference(&latest_endpoints, &trunk_endpoints),
            only_in_trunk: difference(&trunk_endpoints, &latest_endpoints),
        }
    });

    ComparisonResult {
        summary,
        endpoint_diff,
    }
}

fn wants_endpoints(focus: &[String]) -> bool {
    focus.iter().any(|f| f.eq_ignore_ascii_case(FOCUS_ENDPOINTS))
}

/// Records of `left` whose signature is absent from `right`
fn difference(left: &[EndpointRecord], right: &[EndpointRecord]) -> Vec<EndpointRecord> {
    let present: HashSet<_> = right.iter().map(EndpointRecord::signature).collect();
    left.iter()
        .filter(|record| !present.contains(&record.signature()))
        .cloned()
        .collect()
}
