//! Scanners with injected failures.

use async_trait::async_trait;
use reviews_core::{Discriminator, RecordKind};
use reviews_transport::{AccountScanner, MemcmpFilter, RawAccount, ScanError, SnapshotScanner};
use reviews_types::Pubkey;

/// Serves accounts from memory, except that scans for `failing` kinds return
/// a network error.
pub struct FlakyScanner {
    inner: SnapshotScanner,
    failing: Vec<RecordKind>,
}

impl FlakyScanner {
    pub fn new(owner: Pubkey, accounts: Vec<RawAccount>, failing: &[RecordKind]) -> Self {
        Self {
            inner: SnapshotScanner::from_accounts(owner, accounts),
            failing: failing.to_vec(),
        }
    }
}

#[async_trait]
impl AccountScanner for FlakyScanner {
    async fn scan(
        &self,
        program_id: &Pubkey,
        filters: &[MemcmpFilter],
    ) -> Result<Vec<RawAccount>, ScanError> {
        for kind in &self.failing {
            let tag = Discriminator::derive(kind.type_name());
            if filters.iter().any(|f| f.offset() == 0 && f.bytes() == tag.as_bytes()) {
                return Err(ScanError::network(
                    "http://flaky.invalid",
                    format!("{} scan timed out", kind),
                ));
            }
        }
        self.inner.scan(program_id, filters).await
    }
}

/// A node that ignores the tag filter for one kind: scans for `kind` return
/// the honest matches followed by `extra`, whatever their tag.
pub struct MistaggedScanner {
    inner: SnapshotScanner,
    kind: RecordKind,
    extra: Vec<RawAccount>,
}

impl MistaggedScanner {
    pub fn new(
        owner: Pubkey,
        accounts: Vec<RawAccount>,
        kind: RecordKind,
        extra: Vec<RawAccount>,
    ) -> Self {
        Self {
            inner: SnapshotScanner::from_accounts(owner, accounts),
            kind,
            extra,
        }
    }
}

#[async_trait]
impl AccountScanner for MistaggedScanner {
    async fn scan(
        &self,
        program_id: &Pubkey,
        filters: &[MemcmpFilter],
    ) -> Result<Vec<RawAccount>, ScanError> {
        let mut accounts = self.inner.scan(program_id, filters).await?;
        let tag = Discriminator::derive(self.kind.type_name());
        if filters.iter().any(|f| f.offset() == 0 && f.bytes() == tag.as_bytes()) {
            accounts.extend(self.extra.iter().cloned());
        }
        Ok(accounts)
    }
}
