// src/tokenizer.rs

use crate::error::SkipReason;
use std::str::FromStr;

/// One tokenized shape line: the kind tag and the non-empty fields after it.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeRecord<'a> {
    pub tag: &'a str,
    pub fields: Vec<&'a str>,
}

/// Splits a record on `~`, dropping empty fields (so positions shift when the
/// vendor leaves a field blank, and the handlers index accordingly).
pub fn tokenize(line: &str) -> Option<ShapeRecord<'_>> {
    let mut parts = line.split('~').filter(|f| !f.is_empty());
    let tag = parts.next()?;
    Some(ShapeRecord {
        tag,
        fields: parts.collect(),
    })
}

impl<'a> ShapeRecord<'a> {
    /// Resolves the tag against a closed kind enum.
    pub fn kind<K: FromStr>(&self) -> Result<K, SkipReason> {
        self.tag
            .parse::<K>()
            .map_err(|_| SkipReason::UnknownKind(self.tag.to_string()))
    }
}

/// Typed access to record fields, with errors naming the record kind.
pub struct Fields<'r, 'a> {
    kind: &'static str,
    fields: &'r [&'a str],
}

impl<'r, 'a> Fields<'r, 'a> {
    pub fn new(kind: &'static str, fields: &'r [&'a str]) -> Self {
        Fields { kind, fields }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&'a str> {
        self.fields.get(index).copied()
    }

    pub fn str(&self, index: usize) -> Result<&'a str, SkipReason> {
        self.get(index).ok_or(SkipReason::MissingField {
            kind: self.kind,
            index,
        })
    }

    pub fn num(&self, index: usize) -> Result<f64, SkipReason> {
        let raw = self.str(index)?;
        parse_num(raw).ok_or_else(|| SkipReason::BadNumber {
            kind: self.kind,
            index,
            value: raw.to_string(),
        })
    }

    /// Whitespace-separated coordinate list, paired up. A trailing odd value
    /// is ignored.
    pub fn points(&self, index: usize) -> Result<Vec<(f64, f64)>, SkipReason> {
        let raw = self.str(index)?;
        let values = raw
            .split_whitespace()
            .map(|v| {
                parse_num(v).ok_or_else(|| SkipReason::BadNumber {
                    kind: self.kind,
                    index,
                    value: v.to_string(),
                })
            })
            .collect::<Result<Vec<f64>, _>>()?;
        Ok(values.chunks_exact(2).map(|p| (p[0], p[1])).collect())
    }

    pub fn kind_name(&self) -> &'static str {
        self.kind
    }
}

fn parse_num(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}
