//! Project/review discovery.
//!
//! [`assemble`] scans both record kinds concurrently, decodes every account it
//! gets back, and groups reviews under the project they point at. Failures
//! stay as local as possible: a bad account is skipped, a failed scan drops
//! only its own kind, and the caller always learns what went missing.

use std::collections::HashMap;

use rayon::prelude::*;
use reviews_transport::{AccountScanner, MemcmpFilter, RawAccount, ScanError};
use reviews_types::Pubkey;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use tracing::{debug, warn};

use crate::error::{AssemblyError, CategoryError, DecodeError};
use crate::idl::Idl;
use crate::records::{decode_kind, Project, Record, RecordKind, Review};

/// Reviews keyed by the 32-byte address of the project they review.
///
/// Every decoded project has an entry, possibly empty. Reviews whose project
/// was not decoded are still indexed under the address they name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ReviewIndex(HashMap<Pubkey, Vec<Review>>);

impl ReviewIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ensure `project` has an entry.
    pub fn insert_project(&mut self, project: Pubkey) {
        self.0.entry(project).or_default();
    }

    /// Append `review` under its `project_id`, after any earlier ones.
    pub fn push(&mut self, review: Review) {
        self.0.entry(review.project_id).or_default().push(review);
    }

    /// Reviews of `project` in scan order; empty when there are none.
    pub fn get(&self, project: &Pubkey) -> &[Review] {
        self.0.get(project).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains(&self, project: &Pubkey) -> bool {
        self.0.contains_key(project)
    }

    /// Number of keys.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Total number of reviews across all keys.
    pub fn review_count(&self) -> usize {
        self.0.values().map(Vec::len).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Pubkey, &[Review])> {
        self.0.iter().map(|(k, v)| (k, v.as_slice()))
    }
}

/// An account that was returned by a scan but could not be decoded.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedRecord {
    pub address: Pubkey,
    pub kind: RecordKind,
    pub error: DecodeError,
}

impl Serialize for SkippedRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("SkippedRecord", 4)?;
        s.serialize_field("address", &self.address)?;
        s.serialize_field("kind", &self.kind)?;
        s.serialize_field("failure", &self.error.kind())?;
        s.serialize_field("message", &self.error.to_string())?;
        s.end()
    }
}

/// A record kind that is missing from the result entirely.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryFailure {
    pub kind: RecordKind,
    pub error: CategoryError,
}

impl Serialize for CategoryFailure {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("CategoryFailure", 3)?;
        s.serialize_field("kind", &self.kind)?;
        s.serialize_field("failure", &self.error.kind())?;
        s.serialize_field("message", &self.error.to_string())?;
        s.end()
    }
}

/// Result of one discovery pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Assembly {
    /// Decoded projects in scan order.
    pub projects: Vec<Project>,
    pub reviews: ReviewIndex,
    pub skipped: Vec<SkippedRecord>,
    pub failures: Vec<CategoryFailure>,
}

impl Assembly {
    /// Reviews of `project`; empty when it has none.
    pub fn reviews_for(&self, project: &Pubkey) -> &[Review] {
        self.reviews.get(project)
    }

    /// True when both kinds were scanned and every account decoded.
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty() && self.failures.is_empty()
    }

    pub fn failure_for(&self, kind: RecordKind) -> Option<&CategoryFailure> {
        self.failures.iter().find(|f| f.kind == kind)
    }

    /// Reviews whose project is not among the decoded projects.
    pub fn orphan_reviews(&self) -> Vec<&Review> {
        let mut orphans: Vec<&Review> = self
            .reviews
            .iter()
            .filter(|(key, _)| !self.projects.iter().any(|p| &p.address == *key))
            .flat_map(|(_, reviews)| reviews.iter())
            .collect();
        orphans.sort_by_key(|r| (r.project_id, r.address));
        orphans
    }
}

enum ScanPlan {
    Scan(MemcmpFilter),
    Unavailable(CategoryError),
}

fn plan_scan(idl: &Idl, kind: RecordKind) -> Result<ScanPlan, AssemblyError> {
    let Some(account) = idl.account(kind.type_name()) else {
        return Ok(ScanPlan::Unavailable(CategoryError::Schema(
            DecodeError::UnknownType {
                type_name: kind.type_name().to_string(),
            },
        )));
    };
    let filter = MemcmpFilter::prefix(account.discriminator.as_bytes().to_vec()).map_err(|e| {
        AssemblyError::InvalidFilter {
            kind,
            reason: e.to_string(),
        }
    })?;
    Ok(ScanPlan::Scan(filter))
}

async fn run_scan<S>(
    scanner: &S,
    program_id: &Pubkey,
    kind: RecordKind,
    plan: ScanPlan,
) -> Result<Vec<RawAccount>, CategoryError>
where
    S: AccountScanner + ?Sized,
{
    let filter = match plan {
        ScanPlan::Scan(filter) => filter,
        ScanPlan::Unavailable(err) => return Err(err),
    };
    debug!(kind = %kind, program = %program_id, "scanning accounts");
    let accounts = scanner
        .scan(program_id, std::slice::from_ref(&filter))
        .await
        .map_err(CategoryError::Scan)?;
    debug!(kind = %kind, count = accounts.len(), "scan complete");
    Ok(accounts)
}

/// Decode one category's accounts in parallel, keeping scan order.
///
/// Runs synchronously on the caller's worker thread. There is one pass per
/// kind and one [`assemble`] per invocation, so nothing else waits on it.
fn decode_category(
    idl: &Idl,
    kind: RecordKind,
    accounts: &[RawAccount],
) -> (Vec<Record>, Vec<SkippedRecord>) {
    let results: Vec<Result<Record, SkippedRecord>> = accounts
        .par_iter()
        .map(|account| {
            decode_kind(idl, kind, account).map_err(|error| SkippedRecord {
                address: account.address,
                kind,
                error,
            })
        })
        .collect();

    let mut records = Vec::with_capacity(results.len());
    let mut skipped = Vec::new();
    for result in results {
        match result {
            Ok(record) => records.push(record),
            Err(skip) => {
                warn!(
                    address = %skip.address,
                    kind = %skip.kind,
                    error = %skip.error,
                    "skipping undecodable account"
                );
                skipped.push(skip);
            }
        }
    }
    (records, skipped)
}

/// Discover every project and review owned by `program_id`.
///
/// Only an invalid scan filter aborts the call, whether it fails to build
/// locally or the scanner rejects it. Everything else is reported through
/// [`Assembly::skipped`] and [`Assembly::failures`].
pub async fn assemble<S>(
    scanner: &S,
    program_id: &Pubkey,
    idl: &Idl,
) -> Result<Assembly, AssemblyError>
where
    S: AccountScanner + ?Sized,
{
    let project_plan = plan_scan(idl, RecordKind::Project)?;
    let review_plan = plan_scan(idl, RecordKind::Review)?;

    let (project_scan, review_scan) = futures::join!(
        run_scan(scanner, program_id, RecordKind::Project, project_plan),
        run_scan(scanner, program_id, RecordKind::Review, review_plan),
    );

    let mut assembly = Assembly::default();
    for (kind, scan) in [
        (RecordKind::Project, project_scan),
        (RecordKind::Review, review_scan),
    ] {
        let accounts = match scan {
            Ok(accounts) => accounts,
            Err(CategoryError::Scan(ScanError::InvalidFilter { reason })) => {
                return Err(AssemblyError::InvalidFilter { kind, reason });
            }
            Err(error) => {
                warn!(kind = %kind, failure = %error.kind(), error = %error, "category unavailable");
                assembly.failures.push(CategoryFailure { kind, error });
                continue;
            }
        };

        let (records, skipped) = decode_category(idl, kind, &accounts);
        assembly.skipped.extend(skipped);
        for record in records {
            match record {
                Record::Project(project) => {
                    assembly.reviews.insert_project(project.address);
                    assembly.projects.push(project);
                }
                Record::Review(review) => assembly.reviews.push(review),
            }
        }
    }

    debug!(
        projects = assembly.projects.len(),
        reviews = assembly.reviews.review_count(),
        skipped = assembly.skipped.len(),
        failures = assembly.failures.len(),
        "assembly complete"
    );
    Ok(assembly)
}
