//! Parse `qstat -f` output into job records.

use crate::types::JobRecord;

/// Parse qstat full output (`-f`) into one record per job.
///
/// qstat -f output format:
/// ```text
/// Job Id: 12345.torque-server
///     Job_Name = my_job
///     Job_Owner = bob@login1.cluster
///     job_state = R
///     queue = batch
///     exec_host = n0163/2,7,10-11+n0205/0-11
///     resources_used.walltime = 00:05:23
///     Variable_List = PBS_O_HOME=/home/bob,PBS_O_LANG=en_US.UTF-8,
///         PBS_O_LOGNAME=bob
/// ```
///
/// Long values are wrapped onto continuation lines, which are appended to
/// the previous attribute. Lines outside a `Job Id:` block are ignored.
pub fn parse_qstat_full(output: &str) -> Vec<JobRecord> {
    let mut records = Vec::new();
    let mut current: Option<JobRecord> = None;
    let mut last_key: Option<String> = None;

    for raw in output.lines() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(id) = line.strip_prefix("Job Id:") {
            records.extend(current.take());
            current = Some(JobRecord::new(id.trim()));
            last_key = None;
            continue;
        }

        let Some(record) = current.as_mut() else {
            tracing::warn!("Ignoring qstat line outside a job block: {}", line);
            continue;
        };

        match split_attribute(line) {
            Some((key, value)) => {
                record.attributes.insert(key.to_string(), value.to_string());
                last_key = Some(key.to_string());
            }
            None => match last_key.as_ref().and_then(|k| record.attributes.get_mut(k)) {
                Some(value) => value.push_str(line),
                None => tracing::warn!("Ignoring stray qstat line: {}", line),
            },
        }
    }

    records.extend(current);
    records
}

/// Split `key = value`, where the key is a single attribute name.
fn split_attribute(line: &str) -> Option<(&str, &str)> {
    let (key, value) = line.split_once(" = ")?;
    let key = key.trim();
    if key.is_empty() || key.contains(char::is_whitespace) {
        return None;
    }
    Some((key, value.trim()))
}
