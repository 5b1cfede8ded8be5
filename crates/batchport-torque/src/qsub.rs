//! Build qsub command lines from a submit request.

use crate::types::SubmitRequest;

/// Job attributes that have a dedicated qsub option.
fn header_flag(name: &str) -> Option<&'static str> {
    let flag = match name {
        "Job_Name" => "-N",
        "Rerunable" => "-r",
        "init_work_dir" => "-d",
        "Mail_Users" => "-M",
        "Mail_Points" => "-m",
        "Output_Path" => "-o",
        "Error_Path" => "-e",
        "Join_Path" => "-j",
        "Priority" => "-p",
        "Execution_Time" => "-a",
        "Account_Name" => "-A",
        "job_arguments" => "-F",
        _ => return None,
    };
    Some(flag)
}

/// Translate a submit request into qsub arguments.
///
/// The script body is not included; qsub reads it from stdin. Attributes
/// without a dedicated option are passed as `-W name=value`.
pub fn qsub_args(request: &SubmitRequest) -> Vec<String> {
    let mut args = Vec::new();

    if let Some(queue) = &request.queue {
        args.push("-q".to_string());
        args.push(queue.clone());
    }

    for (name, value) in &request.headers {
        match (name.as_str(), header_flag(name)) {
            // -h is a user hold; other hold types go through -W
            ("Hold_Types", _) if value.contains('u') => args.push("-h".to_string()),
            (_, Some(flag)) => {
                args.push(flag.to_string());
                args.push(value.clone());
            }
            (_, None) => {
                args.push("-W".to_string());
                args.push(format!("{name}={value}"));
            }
        }
    }

    for (name, value) in &request.resources {
        args.push("-l".to_string());
        args.push(format!("{name}={value}"));
    }

    if !request.envvars.is_empty() {
        let vars: Vec<String> = request
            .envvars
            .iter()
            .map(|(k, v)| env_assignment(k, v))
            .collect();
        args.push("-v".to_string());
        args.push(vars.join(","));
    }

    args
}

/// One `-v` entry. qsub splits the list on commas, so values holding one
/// are double-quoted.
fn env_assignment(key: &str, value: &str) -> String {
    if value.contains(',') {
        format!("{key}=\"{value}\"")
    } else {
        format!("{key}={value}")
    }
}

/// Extract the job id from qsub's stdout.
pub fn parse_qsub_output(output: &str) -> Option<String> {
    output
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn map(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_minimal_request_has_no_args() {
        let request = SubmitRequest {
            content: "hostname".into(),
            ..Default::default()
        };
        assert!(qsub_args(&request).is_empty());
    }

    #[test]
    fn test_qsub_args() {
        let request = SubmitRequest {
            content: "hostname".into(),
            queue: Some("batch".into()),
            headers: map(&[
                ("Job_Name", "align"),
                ("Hold_Types", "u"),
                ("depend", "afterok:1.server"),
                ("job_arguments", "a b"),
            ]),
            resources: map(&[("walltime", "01:00:00"), ("nodes", "2:ppn=4")]),
            envvars: map(&[("A", "1"), ("B", "2")]),
        };

        assert_eq!(
            qsub_args(&request),
            vec![
                "-q",
                "batch",
                "-h",
                "-N",
                "align",
                "-W",
                "depend=afterok:1.server",
                "-F",
                "a b",
                "-l",
                "nodes=2:ppn=4",
                "-l",
                "walltime=01:00:00",
                "-v",
                "A=1,B=2",
            ]
        );
    }

    #[test]
    fn test_env_values_with_commas_are_quoted() {
        let request = SubmitRequest {
            content: "hostname".into(),
            envvars: map(&[("PATH", "/a,/b"), ("TMPDIR", "/scratch")]),
            ..Default::default()
        };
        assert_eq!(
            qsub_args(&request),
            vec!["-v", "PATH=\"/a,/b\",TMPDIR=/scratch"]
        );
    }

    #[test]
    fn test_non_user_hold_types_use_w() {
        let request = SubmitRequest {
            content: "hostname".into(),
            headers: map(&[("Hold_Types", "n")]),
            ..Default::default()
        };
        assert_eq!(qsub_args(&request), vec!["-W", "Hold_Types=n"]);

        let request = SubmitRequest {
            content: "hostname".into(),
            headers: map(&[("Hold_Types", "u")]),
            ..Default::default()
        };
        assert_eq!(qsub_args(&request), vec!["-h"]);
    }

    #[test]
    fn test_parse_qsub_output() {
        assert_eq!(
            parse_qsub_output("12345.torque-server\n"),
            Some("12345.torque-server".to_string())
        );
        assert_eq!(parse_qsub_output("  \n"), None);
    }
}
