use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use crate::backend::common::dtos::{
    ActivityState, GrooveListParse, HeaderRule, LogState, OpencodeActivityDetail, OpencodeState,
    WorktreeRow,
};
use crate::error::Result;
use crate::workspace::validate_known_worktrees;

const INSTANCE_MARKER: &str = "instance=";

fn extract_instance_id(value: &str) -> Option<String> {
    let start = value.find(INSTANCE_MARKER)? + INSTANCE_MARKER.len();
    let token = value[start..]
        .split(|c: char| c.is_whitespace() || c == '|')
        .next()
        .unwrap_or_default();
    if token.is_empty() {
        return None;
    }
    Some(token.to_string())
}

pub(crate) fn parse_opencode_segment(value: &str) -> (OpencodeState, Option<String>) {
    let normalized = value.trim().to_lowercase();
    let instance_id = extract_instance_id(value);

    if normalized.starts_with("running") {
        return (OpencodeState::Running, instance_id);
    }

    if normalized.contains("not-running")
        || normalized.contains("not running")
        || normalized.starts_with("stopped")
    {
        return (OpencodeState::NotRunning, instance_id);
    }

    (OpencodeState::Unknown, instance_id)
}

fn log_target_name(target: &str) -> Option<String> {
    Path::new(target.trim())
        .file_name()
        .map(|v| v.to_string_lossy().to_string())
}

pub(crate) fn parse_log_segment(value: &str) -> (LogState, Option<String>) {
    let normalized = value.trim();
    if let Some(target) = normalized.strip_prefix("latest->") {
        return (LogState::Latest, log_target_name(target));
    }

    if let Some(target) = normalized
        .strip_prefix("broken-latest->")
        .or_else(|| normalized.strip_prefix("brokenlatest->"))
    {
        return (LogState::BrokenLatest, log_target_name(target));
    }

    if normalized.starts_with("none") {
        return (LogState::Absent, None);
    }

    (LogState::Unknown, None)
}

pub(crate) fn parse_activity_segment(
    value: &str,
) -> (ActivityState, Option<OpencodeActivityDetail>) {
    let mut tokens = value.split_whitespace();
    let Some(raw_state) = tokens.next() else {
        return (ActivityState::Unknown, None);
    };
    let state = ActivityState::from_token(raw_state);

    let mut detail = OpencodeActivityDetail::default();
    for token in tokens {
        let Some((key, raw_value)) = token.split_once('=') else {
            continue;
        };

        let value = raw_value.trim();
        if value.is_empty() || value == "na" {
            continue;
        }

        match key {
            "reason" => detail.reason = Some(value.to_string()),
            "age_s" => detail.age_s = value.parse::<u64>().ok(),
            "marker" => detail.marker = Some(value.to_string()),
            "log" => detail.log = Some(value.to_string()),
            _ => {}
        }
    }

    if detail == OpencodeActivityDetail::default() {
        return (state, None);
    }

    (state, Some(detail))
}

/// Splits `- <a> (<b>)` into `(worktree, branch)`.
///
/// `groove list` has printed both `branch (worktree)` and `worktree
/// (branch)`. A token the caller already knows as a worktree is decisive;
/// failing that, the token containing `/` is taken as the branch. That
/// heuristic misreads worktree names with `/` and branches without one;
/// `DefaultOrder` (branch first) applies when neither rule decides.
pub(crate) fn parse_worktree_header(
    value: &str,
    known_worktrees: &HashSet<&str>,
) -> Option<(String, String, HeaderRule)> {
    let body = value.trim().strip_prefix("- ")?.trim();
    let left_paren = body.rfind('(')?;
    let right_paren = body.rfind(')')?;
    if right_paren <= left_paren {
        return None;
    }

    let first = body[..left_paren].trim();
    let second = body[left_paren + 1..right_paren].trim();
    if first.is_empty() || second.is_empty() {
        return None;
    }

    let first_known = known_worktrees.contains(first);
    let second_known = known_worktrees.contains(second);
    if first_known && !second_known {
        return Some((first.to_string(), second.to_string(), HeaderRule::MatchedByKnownSet));
    }
    if second_known && !first_known {
        return Some((second.to_string(), first.to_string(), HeaderRule::MatchedByKnownSet));
    }

    let first_branch_like = first.contains('/');
    let second_branch_like = second.contains('/');
    if first_branch_like != second_branch_like {
        tracing::debug!(first, second, "header order decided by branch shape");
        return if first_branch_like {
            Some((second.to_string(), first.to_string(), HeaderRule::MatchedByBranchShape))
        } else {
            Some((first.to_string(), second.to_string(), HeaderRule::MatchedByBranchShape))
        };
    }

    Some((second.to_string(), first.to_string(), HeaderRule::DefaultOrder))
}

fn parse_groove_list_line(line: &str, known_worktrees: &HashSet<&str>) -> Option<WorktreeRow> {
    let mut segments = line.split('|').map(str::trim);
    let (worktree, branch, header_rule) =
        parse_worktree_header(segments.next()?, known_worktrees)?;

    let mut row = WorktreeRow {
        worktree,
        branch,
        opencode_state: OpencodeState::Unknown,
        opencode_instance_id: None,
        log_state: LogState::Unknown,
        log_target: None,
        opencode_activity_state: ActivityState::Unknown,
        opencode_activity_detail: None,
        header_rule,
    };

    for segment in segments {
        let Some((key, value)) = segment.split_once(':') else {
            continue;
        };

        let value = value.trim();
        match key.trim().to_lowercase().as_str() {
            "opencode" => {
                let (state, instance) = parse_opencode_segment(value);
                row.opencode_state = state;
                row.opencode_instance_id = instance;
            }
            "log" => {
                let (state, target) = parse_log_segment(value);
                row.log_state = state;
                row.log_target = target;
            }
            "activity" => {
                let (state, detail) = parse_activity_segment(value);
                row.opencode_activity_state = state;
                row.opencode_activity_detail = detail;
            }
            _ => {}
        }
    }

    Some(row)
}

/// Lines that do not start with `- ` are incidental output and skipped.
/// A `- ` line with an unreadable header is counted as malformed. When a
/// worktree is reported twice, the later line wins.
///
/// `known_worktrees` must already have passed `validate_known_worktrees`.
pub(crate) fn parse_groove_list_rows(
    stdout: &str,
    known_worktrees: &[String],
) -> GrooveListParse {
    let known_set = known_worktrees
        .iter()
        .map(String::as_str)
        .collect::<HashSet<_>>();
    let mut rows = BTreeMap::new();
    let mut malformed_line_count = 0usize;

    for raw in stdout.lines() {
        let line = raw.trim();
        if !line.starts_with("- ") {
            continue;
        }

        match parse_groove_list_line(line, &known_set) {
            Some(row) => {
                rows.insert(row.worktree.clone(), row);
            }
            None => malformed_line_count += 1,
        }
    }

    GrooveListParse {
        rows,
        malformed_line_count,
    }
}

/// Parses `groove list` output into one row per worktree.
///
/// `known_worktrees` is trimmed, deduplicated and rejected when any entry is
/// not a safe worktree token.
pub fn parse_groove_list_output(
    stdout: &str,
    known_worktrees: &[String],
) -> Result<GrooveListParse> {
    let known_worktrees = validate_known_worktrees(known_worktrees)?;
    Ok(parse_groove_list_rows(stdout, &known_worktrees))
}
