//! Sampler interface and the sample set it returns.
//!
//! A sampler takes a QUBO, a chain strength, a read count and a label, and
//! returns one record per distinct bitstring with its energy and how many
//! reads produced it. Retries and backoff, if any, belong to the sampler
//! implementation.

use std::collections::BTreeMap;
use std::fmt;

use crate::error::Result;
use crate::qubo::QuboMatrix;

/// Parameters forwarded with every sampling request.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleParams {
    pub chain_strength: f64,
    pub num_reads: usize,
    pub label: String,
}

impl Default for SampleParams {
    fn default() -> Self {
        Self {
            chain_strength: 8.0,
            num_reads: 10,
            label: String::new(),
        }
    }
}

/// Anything that can minimise a QUBO by sampling.
pub trait QuboSampler {
    /// Short identifier used in logs.
    fn name(&self) -> &str;

    fn sample_qubo(&self, q: &QuboMatrix, params: &SampleParams) -> Result<SampleSet>;
}

/// One distinct sample with its energy and occurrence count.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleRecord {
    /// Bit per variable, aligned with `SampleSet::variables`.
    pub sample: Vec<u8>,
    pub energy: f64,
    pub num_occurrences: usize,
}

impl SampleRecord {
    /// The sample as a `variable -> bit` map.
    pub fn assignment(&self, variables: &[usize]) -> BTreeMap<usize, u8> {
        variables
            .iter()
            .copied()
            .zip(self.sample.iter().copied())
            .collect()
    }
}

/// Aggregated sampler response, lowest energy first.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleSet {
    pub variables: Vec<usize>,
    pub records: Vec<SampleRecord>,
    pub label: String,
    pub num_reads: usize,
}

impl SampleSet {
    /// Aggregate raw reads `(sample, energy)` into distinct records.
    pub fn from_reads(
        variables: Vec<usize>,
        reads: Vec<(Vec<u8>, f64)>,
        label: impl Into<String>,
    ) -> Self {
        let num_reads = reads.len();
        let mut distinct: BTreeMap<Vec<u8>, (f64, usize)> = BTreeMap::new();
        for (sample, energy) in reads {
            distinct.entry(sample).or_insert((energy, 0)).1 += 1;
        }

        let mut records: Vec<SampleRecord> = distinct
            .into_iter()
            .map(|(sample, (energy, num_occurrences))| SampleRecord {
                sample,
                energy,
                num_occurrences,
            })
            .collect();
        records.sort_by(|a, b| {
            a.energy
                .total_cmp(&b.energy)
                .then_with(|| a.sample.cmp(&b.sample))
        });

        Self {
            variables,
            records,
            label: label.into(),
            num_reads,
        }
    }

    /// Lowest-energy record.
    pub fn first(&self) -> Option<&SampleRecord> {
        self.records.first()
    }

    /// Records as `(assignment, energy, occurrences)`.
    pub fn iter(&self) -> impl Iterator<Item = (BTreeMap<usize, u8>, f64, usize)> + '_ {
        self.records
            .iter()
            .map(|r| (r.assignment(&self.variables), r.energy, r.num_occurrences))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn total_occurrences(&self) -> usize {
        self.records.iter().map(|r| r.num_occurrences).sum()
    }
}

impl fmt::Display for SampleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let row_width = self.records.len().saturating_sub(1).to_string().len();
        let col_widths: Vec<usize> = self
            .variables
            .iter()
            .map(|v| v.to_string().len().max(1))
            .collect();

        write!(f, "{:>w$}", "", w = row_width)?;
        for (v, w) in self.variables.iter().zip(&col_widths) {
            write!(f, " {:>w$}", v, w = w)?;
        }
        writeln!(f, " {:>8} {:>7}", "energy", "num_oc.")?;

        for (row, record) in self.records.iter().enumerate() {
            write!(f, "{:>w$}", row, w = row_width)?;
            for (bit, w) in record.sample.iter().zip(&col_widths) {
                write!(f, " {:>w$}", bit, w = w)?;
            }
            writeln!(f, " {:>8.1} {:>7}", record.energy, record.num_occurrences)?;
        }

        write!(
            f,
            "['BINARY', {} rows, {} samples, {} variables]",
            self.records.len(),
            self.num_reads,
            self.variables.len()
        )
    }
}
