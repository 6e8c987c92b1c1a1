//! Sequential lookup of a list of postal codes.

use serde::{Deserialize, Serialize};
use std::io::Write;

use crate::{
    error::LookupError,
    model::{LookupOutcome, PostalCode},
    provider::GeocodeProvider,
};

/// What to do when a single lookup fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Stop at the first failure; nothing is written for it or anything after it.
    #[default]
    FailFast,
    /// Log the failure, write nothing for that code and carry on.
    Isolate,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub found: usize,
    pub not_found: usize,
    pub failed: usize,
}

impl RunSummary {
    pub fn total(&self) -> usize {
        self.found + self.not_found + self.failed
    }
}

#[derive(Debug)]
pub struct LookupRunner<'a> {
    provider: &'a dyn GeocodeProvider,
    policy: FailurePolicy,
}

impl<'a> LookupRunner<'a> {
    pub fn new(provider: &'a dyn GeocodeProvider, policy: FailurePolicy) -> Self {
        Self { provider, policy }
    }

    /// Look up every code in order, writing one line per resolved code to `out`.
    ///
    /// Each request completes before the next is sent. Lines are flushed as they are
    /// written, so output produced before a fail-fast abort is kept.
    pub async fn run<W: Write>(
        &self,
        codes: &[PostalCode],
        out: &mut W,
    ) -> Result<RunSummary, LookupError> {
        let mut summary = RunSummary::default();

        for &postal in codes {
            let outcome = match self.provider.search(postal).await {
                Ok(outcome) => outcome,
                Err(err) => match self.policy {
                    FailurePolicy::FailFast => return Err(err),
                    FailurePolicy::Isolate => {
                        tracing::warn!(%postal, error = %err, "lookup failed, continuing");
                        summary.failed += 1;
                        continue;
                    }
                },
            };

            match &outcome {
                LookupOutcome::Found(_) => summary.found += 1,
                LookupOutcome::NotFound => summary.not_found += 1,
            }

            writeln!(out, "{}", outcome.render_line(postal))?;
            out.flush()?;
        }

        tracing::info!(
            found = summary.found,
            not_found = summary.not_found,
            failed = summary.failed,
            "lookup run finished"
        );

        Ok(summary)
    }
}
