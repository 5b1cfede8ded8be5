//! Translate abstract jobs into Torque attributes and back.

use crate::types::{JobRecord, SubmitRequest, TorqueNative};
use batchport_core::{
    AdapterError, AllocatedNode, Dependencies, Info, NodeRequest, NodeSpec, Result, Script,
};
use batchport_parsers::{
    duration_to_seconds, format_execution_time, parse_nodes, parse_torque_timestamp,
    seconds_to_duration,
};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;

static OWNER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([\w-]+)@").unwrap());

/// Build the submit request for `script`.
pub fn submit_request(script: &Script, dependencies: &Dependencies) -> Result<SubmitRequest> {
    script.validate()?;

    let mut headers = headers(script);
    if let Some(depend) = depend_expression(dependencies) {
        headers.insert("depend".to_string(), depend);
    }
    let mut resources = resources(script);
    let mut envvars = script.job_environment.clone();

    if let Some(native) = native_overrides(script)? {
        TorqueNative::merge_into(&native.headers, &mut headers);
        TorqueNative::merge_into(&native.resources, &mut resources);
        TorqueNative::merge_into(&native.envvars, &mut envvars);
    }

    Ok(SubmitRequest {
        content: script.content.clone(),
        queue: script.queue_name.clone(),
        headers,
        resources,
        envvars,
    })
}

/// Job attributes for every option the script sets.
fn headers(script: &Script) -> BTreeMap<String, String> {
    let mut headers = BTreeMap::new();
    let mut set = |key: &str, value: String| {
        headers.insert(key.to_string(), value);
    };

    if !script.args.is_empty() {
        set("job_arguments", script.args.join(" "));
    }
    if script.submit_as_hold == Some(true) {
        set("Hold_Types", "u".to_string());
    }
    if let Some(rerunnable) = script.rerunnable {
        let flag = if rerunnable { "y" } else { "n" };
        set("Rerunable", flag.to_string());
    }
    if let Some(workdir) = &script.workdir {
        set("init_work_dir", workdir.to_string());
    }
    if !script.email.is_empty() {
        set("Mail_Users", script.email.join(","));
    }

    let mut mail_points = String::new();
    if script.email_on_started == Some(true) {
        mail_points.push('b');
    }
    if script.email_on_terminated == Some(true) {
        mail_points.push('e');
    }
    if !mail_points.is_empty() {
        set("Mail_Points", mail_points);
    }

    if let Some(name) = &script.job_name {
        set("Job_Name", name.clone());
    }
    // Torque has no input path attribute; input_path is dropped
    if let Some(path) = &script.output_path {
        set("Output_Path", path.to_string());
    }
    if let Some(path) = &script.error_path {
        set("Error_Path", path.to_string());
    }
    if script.join_files == Some(true) {
        set("Join_Path", "oe".to_string());
    }
    if let Some(id) = &script.reservation_id {
        set("reservation_id", id.clone());
    }
    if let Some(priority) = script.priority {
        set("Priority", priority.to_string());
    }
    if let Some(start) = &script.start_time {
        set("Execution_Time", format_execution_time(start));
    }
    if let Some(account) = &script.accounting_id {
        set("Account_Name", account.clone());
    }

    headers
}

/// `after:1:2,afterok:3` style dependency list, or None with no dependencies.
pub fn depend_expression(dependencies: &Dependencies) -> Option<String> {
    let clauses: Vec<String> = [
        ("after", &dependencies.after),
        ("afterok", &dependencies.afterok),
        ("afternotok", &dependencies.afternotok),
        ("afterany", &dependencies.afterany),
    ]
    .into_iter()
    .filter(|(_, ids)| !ids.is_empty())
    .map(|(keyword, ids)| format!("{}:{}", keyword, ids.join(":")))
    .collect();

    if clauses.is_empty() {
        None
    } else {
        Some(clauses.join(","))
    }
}

/// Resource list entries for every limit the script sets.
fn resources(script: &Script) -> BTreeMap<String, String> {
    let mut resources = BTreeMap::new();

    if let Some(mem) = script.min_phys_memory {
        resources.insert("mem".to_string(), format!("{}KB", mem));
    }
    if let Some(wall_time) = script.wall_time {
        resources.insert("walltime".to_string(), seconds_to_duration(wall_time));
    }
    if !script.nodes.is_empty() {
        resources.insert("nodes".to_string(), nodes_resource(&script.nodes));
    }

    resources
}

/// Encode a node list, collapsing identical entries into a count.
///
/// `[req, req, "n01", req2]` becomes `2:ppn=4+n01+1:gpu`. Entries keep the
/// order of their first appearance. A repeated host is still written once.
pub fn nodes_resource(nodes: &[NodeSpec]) -> String {
    let mut groups: Vec<(&NodeSpec, usize)> = Vec::new();
    for node in nodes {
        match groups.iter_mut().find(|(seen, _)| *seen == node) {
            Some((_, count)) => *count += 1,
            None => groups.push((node, 1)),
        }
    }

    groups
        .into_iter()
        .map(|(node, count)| match node {
            NodeSpec::Host(host) => host.clone(),
            NodeSpec::Request(request) => node_request_to_str(request, count),
        })
        .collect::<Vec<_>>()
        .join("+")
}

/// `<count>[:ppn=<procs>][:<prop>...]`
fn node_request_to_str(request: &NodeRequest, count: usize) -> String {
    let mut s = count.to_string();
    if let Some(procs) = request.procs {
        s.push_str(&format!(":ppn={}", procs));
    }
    if let Some(properties) = &request.properties {
        for property in properties {
            s.push(':');
            s.push_str(property);
        }
    }
    s
}

fn native_overrides(script: &Script) -> Result<Option<TorqueNative>> {
    let Some(native) = &script.native else {
        return Ok(None);
    };
    serde_json::from_value(native.clone())
        .map(Some)
        .map_err(|e| AdapterError::Validation(format!("invalid native options: {}", e)))
}

/// Build an [`Info`] from a server record.
pub fn record_to_info(record: &JobRecord) -> Info {
    let allocated_nodes = record
        .exec_host()
        .map(parse_nodes)
        .unwrap_or_default()
        .into_iter()
        .map(|n| AllocatedNode {
            name: n.name,
            procs: n.procs,
        })
        .collect();

    let job_owner = record
        .job_owner()
        .and_then(|owner| OWNER_RE.captures(owner))
        .map(|caps| caps[1].to_string());

    Info {
        id: record.id.clone(),
        status: record.state().to_status(),
        submit_host: record.submit_host().map(str::to_string),
        job_owner,
        queue_name: record.queue().map(str::to_string),
        wallclock_time: duration_to_seconds(record.walltime_used()),
        cpu_time: duration_to_seconds(record.cput_used()),
        submission_time: record.ctime().and_then(parse_timestamp),
        dispatch_time: record.start_time().and_then(parse_timestamp),
        native: serde_json::to_value(record).ok(),
        ..Default::default()
    }
    .with_allocated_nodes(allocated_nodes)
}

fn parse_timestamp(s: &str) -> Option<chrono::DateTime<chrono::Utc>> {
    let parsed = parse_torque_timestamp(s);
    if parsed.is_none() {
        tracing::warn!("Unrecognized Torque timestamp: {}", s);
    }
    parsed
}
