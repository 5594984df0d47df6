//! Step traversal.
//!
//! `.ga` workflows key their steps by stringified integers; gxformat2 uses
//! either a list or a mapping keyed by label. Subworkflow steps embed a
//! whole workflow under `subworkflow` (`.ga`) or `run` (gxformat2) and are
//! flattened in place.

use serde_json::Value;

/// Returns every step of the workflow, subworkflow steps flattened in place.
#[must_use]
pub fn workflow_steps(workflow: &Value) -> Vec<&Value> {
    let mut out = Vec::new();
    collect_steps(workflow, &mut out);
    out
}

fn collect_steps<'a>(workflow: &'a Value, out: &mut Vec<&'a Value>) {
    for step in ordered_steps(workflow.get("steps")) {
        out.push(step);
        if let Some(sub) = embedded_workflow(step) {
            collect_steps(sub, out);
        }
    }
}

fn ordered_steps(steps: Option<&Value>) -> Vec<&Value> {
    match steps {
        Some(Value::Array(list)) => list.iter().collect(),
        Some(Value::Object(map)) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            if entries.iter().all(|(k, _)| k.parse::<u64>().is_ok()) {
                entries.sort_by_key(|(k, _)| k.parse::<u64>().unwrap_or(u64::MAX));
            }
            entries.into_iter().map(|(_, v)| v).collect()
        }
        _ => Vec::new(),
    }
}

fn embedded_workflow(step: &Value) -> Option<&Value> {
    step.get("subworkflow")
        .or_else(|| step.get("run"))
        .filter(|sub| sub.is_object())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn ids(steps: &[&Value]) -> Vec<String> {
        steps
            .iter()
            .map(|s| s["id"].to_string().trim_matches('"').to_string())
            .collect()
    }

    #[test]
    fn numeric_keys_are_ordered_numerically() {
        let wf = json!({"steps": {"10": {"id": 10}, "2": {"id": 2}, "0": {"id": 0}}});
        assert_eq!(ids(&workflow_steps(&wf)), ["0", "2", "10"]);
    }

    #[test]
    fn list_steps_keep_document_order() {
        let wf = json!({"steps": [{"id": "b"}, {"id": "a"}]});
        assert_eq!(ids(&workflow_steps(&wf)), ["b", "a"]);
    }

    #[test]
    fn subworkflow_steps_follow_their_parent() {
        let wf = json!({"steps": {
            "0": {"id": 0},
            "1": {"id": 1, "subworkflow": {"steps": {"0": {"id": "1.0"}, "1": {"id": "1.1"}}}},
            "2": {"id": 2}
        }});
        assert_eq!(ids(&workflow_steps(&wf)), ["0", "1", "1.0", "1.1", "2"]);
    }

    #[test]
    fn string_run_reference_is_not_descended() {
        let wf = json!({"steps": [{"id": "x", "run": "other.gxwf.yml"}]});
        assert_eq!(workflow_steps(&wf).len(), 1);
    }

    #[test]
    fn missing_steps_yield_nothing() {
        assert!(workflow_steps(&json!({"name": "empty"})).is_empty());
    }
}
