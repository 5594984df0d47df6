//! Formatted output helpers for CLI commands.
//!
//! Results go to stdout, one line per tool; warnings and the run summary go
//! to stderr.

use shedmull_common::types::ResolutionWarning;
use shedmull_engine::report::{RunReport, ToolOutcome, ToolStatus};

/// Formats the result line of one tool: `<tool>\t<status>\t<spec>\t<image>`.
#[must_use]
pub fn format_outcome(outcome: &ToolOutcome) -> String {
    let (spec, image) = outcome.resolution.as_ref().map_or(("-", "-".to_string()), |r| {
        let spec = if r.spec.is_empty() { "-" } else { r.spec.as_str() };
        let image = r
            .image
            .as_ref()
            .map_or_else(|| "-".to_string(), ToString::to_string);
        (spec, image)
    });
    format!("{}\t{}\t{spec}\t{image}", outcome.tool, format_status(&outcome.status))
}

/// Short human-readable status.
#[must_use]
pub fn format_status(status: &ToolStatus) -> String {
    match status {
        ToolStatus::Listed => "listed".to_string(),
        ToolStatus::Unresolved => "unresolved".to_string(),
        ToolStatus::NoPackages => "no packages".to_string(),
        ToolStatus::Acquired(acq) if acq.already_present => format!("{} (cached)", acq.state),
        ToolStatus::Acquired(acq) => acq.state.to_string(),
        ToolStatus::Failed(message) => format!("failed: {message}"),
    }
}

/// Formats the closing summary of a run.
#[must_use]
pub fn format_summary(report: &RunReport) -> String {
    format!(
        "{} tool(s): {} image(s) available, {} failed",
        report.outcomes.len(),
        report.available(),
        report.failures()
    )
}

/// Prints every outcome to stdout, its warnings and the summary to stderr.
pub fn print_report(report: &RunReport) {
    for outcome in &report.outcomes {
        if let Some(resolution) = &outcome.resolution {
            print_warnings(&resolution.warnings);
        }
        println!("{}", format_outcome(outcome));
    }
    eprintln!("{}", format_summary(report));
}

/// Prints warnings to stderr.
pub fn print_warnings(warnings: &[ResolutionWarning]) {
    for warning in warnings {
        eprintln!("warning: {warning}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shedmull_common::types::{ImageIdentifier, ToolReference};
    use shedmull_engine::report::ToolResolution;
    use shedmull_image::acquire::{Acquisition, AcquisitionState};

    fn tool() -> ToolReference {
        ToolReference {
            name: "bwa".into(),
            owner: "devteam".into(),
            revision: "abc".into(),
            toolshed: "toolshed.g2.bx.psu.edu".into(),
            tool_id: None,
        }
    }

    fn acquisition(state: AcquisitionState, already_present: bool) -> Acquisition {
        Acquisition {
            state,
            image: Some(ImageIdentifier::new("bwa:0.7.17--h1")),
            path: None,
            image_build: None,
            requests: 0,
            already_present,
            depot_failures: Vec::new(),
        }
    }

    #[test]
    fn outcome_line_includes_spec_and_image() {
        let outcome = ToolOutcome {
            tool: tool(),
            resolution: Some(ToolResolution {
                targets: Some(Vec::new()),
                spec: "bwa=0.7.17".into(),
                image: Some(ImageIdentifier::new("bwa:0.7.17--h1")),
                warnings: Vec::new(),
            }),
            status: ToolStatus::Listed,
        };
        assert_eq!(
            format_outcome(&outcome),
            "toolshed.g2.bx.psu.edu/devteam/bwa@abc\tlisted\tbwa=0.7.17\tbwa:0.7.17--h1"
        );
    }

    #[test]
    fn unresolved_outcome_uses_placeholders() {
        let outcome = ToolOutcome {
            tool: tool(),
            resolution: None,
            status: ToolStatus::Unresolved,
        };
        assert!(format_outcome(&outcome).ends_with("\tunresolved\t-\t-"));
    }

    #[test]
    fn cached_images_are_marked() {
        let status = ToolStatus::Acquired(acquisition(AcquisitionState::Downloaded, true));
        assert_eq!(format_status(&status), "downloaded (cached)");
        let status = ToolStatus::Acquired(acquisition(AcquisitionState::BuildFailed, false));
        assert_eq!(format_status(&status), "build failed");
    }

    #[test]
    fn summary_counts_failures() {
        let report = RunReport {
            outcomes: vec![
                ToolOutcome {
                    tool: tool(),
                    resolution: None,
                    status: ToolStatus::Acquired(acquisition(AcquisitionState::Built, false)),
                },
                ToolOutcome {
                    tool: tool(),
                    resolution: None,
                    status: ToolStatus::Failed("boom".into()),
                },
            ],
        };
        assert_eq!(format_summary(&report), "2 tool(s): 1 image(s) available, 1 failed");
    }
}
