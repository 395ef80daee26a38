use crate::*;
use std::collections::BTreeMap;

#[derive(Clone, Debug, Default)]
pub struct Stats {
    pub bytes: usize,
    pub frames: usize,
    pub pages: usize,
    pub records: BTreeMap<RecordKind, usize>,
}

impl Stats {
    pub(crate) fn add_records(&mut self, records: &BTreeMap<RecordKind, usize>) {
        for (&kind, &count) in records {
            *self.records.entry(kind).or_default() += count;
        }
    }

    pub fn records(&self, kind: RecordKind) -> usize {
        self.records.get(&kind).copied().unwrap_or_default()
    }
}
