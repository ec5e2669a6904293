//! Human-readable and JSON rendering of an [`Assembly`].

use reviews_core::{Assembly, Review};
use serde::Serialize;
use serde_json::{json, Value};

/// Projects in scan order, each followed by its reviews.
pub fn format_listing(assembly: &Assembly) -> String {
    let mut out = String::new();
    if assembly.projects.is_empty() {
        out.push_str("No projects found.\n");
    }
    for (index, project) in assembly.projects.iter().enumerate() {
        if index > 0 {
            out.push('\n');
        }
        out.push_str(&format!("Project {}\n", index + 1));
        out.push_str(&format!("Name: {}\n", project.name));
        out.push_str(&format!("Category: {}\n", project.category));
        out.push_str(&format!("Listed by: {}\n", project.listed_by));
        out.push_str("Reviews:\n");
        let reviews = assembly.reviews_for(&project.address);
        if reviews.is_empty() {
            out.push_str("  No reviews yet.\n");
        }
        for review in reviews {
            write_review(&mut out, review);
        }
    }
    out
}

fn write_review(out: &mut String, review: &Review) {
    out.push_str(&format!("  Rating: {}/5\n", review.rating));
    out.push_str(&format!("  Review: {}\n", review.review_text));
}

/// What is missing from the listing, or `None` when nothing is.
pub fn format_report(assembly: &Assembly) -> Option<String> {
    let orphans = assembly.orphan_reviews();
    if assembly.is_complete() && orphans.is_empty() {
        return None;
    }

    let mut out = String::new();
    for failure in &assembly.failures {
        out.push_str(&format!(
            "Unavailable: {} records ({}): {}\n",
            failure.kind,
            failure.error.kind(),
            failure.error
        ));
    }
    if !assembly.skipped.is_empty() {
        out.push_str(&format!("Skipped {} account(s):\n", assembly.skipped.len()));
        for skip in &assembly.skipped {
            out.push_str(&format!("  {} ({}): {}\n", skip.address, skip.kind, skip.error));
        }
    }
    if !orphans.is_empty() {
        out.push_str(&format!(
            "{} review(s) refer to projects that were not found:\n",
            orphans.len()
        ));
        for review in orphans {
            out.push_str(&format!("  {} -> {}\n", review.address, review.project_id));
        }
    }
    Some(out)
}

/// Nested JSON view: each project carries its reviews.
pub fn listing_json(assembly: &Assembly) -> Value {
    let projects: Vec<Value> = assembly
        .projects
        .iter()
        .map(|project| {
            json!({
                "address": project.address,
                "name": project.name,
                "category": project.category,
                "listed_by": project.listed_by,
                "reviews": assembly.reviews_for(&project.address),
            })
        })
        .collect();
    json!({
        "projects": projects,
        "orphan_reviews": assembly.orphan_reviews(),
        "skipped": assembly.skipped,
        "failures": assembly.failures,
    })
}

/// Format an error for display
pub fn format_error(error: &anyhow::Error, json_output: bool) -> String {
    if json_output {
        #[derive(Serialize)]
        struct ErrorJson {
            error: String,
            #[serde(skip_serializing_if = "Vec::is_empty")]
            causes: Vec<String>,
        }

        let err = ErrorJson {
            error: error.to_string(),
            causes: error.chain().skip(1).map(|c| c.to_string()).collect(),
        };
        serde_json::to_string_pretty(&err).unwrap_or_else(|_| "{}".to_string())
    } else {
        let mut out = format!("Error: {}\n", error);
        let mut causes = error.chain().skip(1).peekable();
        if causes.peek().is_some() {
            out.push_str("Caused by:\n");
            for (idx, cause) in causes.enumerate() {
                out.push_str(&format!("  {}: {}\n", idx + 1, cause));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reviews_core::{
        CategoryError, CategoryFailure, DecodeError, Project, RecordKind, ReviewIndex,
        SkippedRecord,
    };
    use reviews_transport::ScanError;
    use reviews_types::Pubkey;

    fn key(n: u8) -> Pubkey {
        Pubkey::new([n; 32])
    }

    fn sample() -> Assembly {
        let mut reviews = ReviewIndex::new();
        reviews.insert_project(key(1));
        reviews.insert_project(key(2));
        reviews.push(Review {
            address: key(10),
            project_id: key(1),
            reviewer: key(20),
            rating: 4,
            review_text: "Fast and cheap".into(),
        });
        Assembly {
            projects: vec![
                Project {
                    address: key(1),
                    name: "Orca".into(),
                    category: "DEX".into(),
                    listed_by: key(30),
                },
                Project {
                    address: key(2),
                    name: "Tensor".into(),
                    category: "NFT".into(),
                    listed_by: key(31),
                },
            ],
            reviews,
            skipped: Vec::new(),
            failures: Vec::new(),
        }
    }

    #[test]
    fn test_listing_text() {
        let text = format_listing(&sample());
        assert!(text.starts_with("Project 1\nName: Orca\nCategory: DEX\n"));
        assert!(text.contains("  Rating: 4/5\n  Review: Fast and cheap\n"));
        assert!(text.contains("Project 2\nName: Tensor"));
        assert!(text.ends_with("Reviews:\n  No reviews yet.\n"));
        assert!(format_report(&sample()).is_none());
    }

    #[test]
    fn test_empty_listing() {
        assert_eq!(format_listing(&Assembly::default()), "No projects found.\n");
    }

    #[test]
    fn test_report_lists_failures() {
        let mut assembly = sample();
        assembly.failures.push(CategoryFailure {
            kind: RecordKind::Review,
            error: CategoryError::Scan(ScanError::network("http://node", "timed out")),
        });
        assembly.skipped.push(SkippedRecord {
            address: key(3),
            kind: RecordKind::Project,
            error: DecodeError::SchemaMismatch {
                type_name: "Project".into(),
                reason: "bad".into(),
            },
        });
        let report = format_report(&assembly).unwrap();
        assert!(report.contains("Unavailable: Review records (NetworkError)"));
        assert!(report.contains("Skipped 1 account(s):"));
    }

    #[test]
    fn test_report_lists_orphans() {
        let mut assembly = sample();
        assembly.reviews.push(Review {
            address: key(11),
            project_id: key(9),
            reviewer: key(20),
            rating: 2,
            review_text: "gone".into(),
        });
        let report = format_report(&assembly).unwrap();
        assert_eq!(
            report,
            format!(
                "1 review(s) refer to projects that were not found:\n  {} -> {}\n",
                key(11),
                key(9)
            )
        );
    }

    #[test]
    fn test_json_nests_reviews() {
        let json = listing_json(&sample());
        assert_eq!(json["projects"][0]["name"], "Orca");
        assert_eq!(json["projects"][0]["reviews"][0]["rating"], 4);
        assert_eq!(json["projects"][1]["reviews"], json!([]));
        assert_eq!(json["projects"][0]["address"], key(1).to_string());
        assert_eq!(json["failures"], json!([]));
    }

    #[test]
    fn test_format_error_chain() {
        let err = anyhow::anyhow!("root cause").context("loading IDL");
        let text = format_error(&err, false);
        assert!(text.starts_with("Error: loading IDL\n"));
        assert!(text.contains("1: root cause"));
        let json: Value = serde_json::from_str(&format_error(&err, true)).unwrap();
        assert_eq!(json["causes"][0], "root cause");
    }
}
