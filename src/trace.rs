use std::path::Path;

use winnow::ascii::space0;
use winnow::combinator::{alt, opt, preceded, terminated};
use winnow::error::{StrContext, StrContextValue};
use winnow::token::{any, take_while};
use winnow::{ModalResult, Parser};

use crate::error::TraceError;

/// Memory operation of a trace record.
///
/// Any letter other than `L`, `S` and `M` (valgrind emits `I` for instruction
/// fetches) is kept as [`Operation::Other`] and skipped by the simulation.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Operation {
    Load,
    Store,
    /// Load immediately followed by a store to the same address.
    Modify,
    Other(char),
}

impl From<char> for Operation {
    fn from(letter: char) -> Self {
        match letter {
            'L' => Operation::Load,
            'S' => Operation::Store,
            'M' => Operation::Modify,
            other => Operation::Other(other),
        }
    }
}

impl Operation {
    pub fn letter(&self) -> char {
        match self {
            Operation::Load => 'L',
            Operation::Store => 'S',
            Operation::Modify => 'M',
            Operation::Other(letter) => *letter,
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!("{}", self.letter()))
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct AccessRecord {
    pub operation: Operation,
    pub address: u64,
    /// Number of bytes accessed, not used for classification.
    pub size: u32,
}

impl std::fmt::Display for AccessRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!(
            "{} {:x},{}",
            self.operation, self.address, self.size
        ))
    }
}

/// A trace line that could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedLine {
    /// 1-based
    pub line: usize,
    pub column: usize,
    pub content: String,
    pub message: String,
}

impl std::fmt::Display for RejectedLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!(
            "line {}:{}: `{}`: {}",
            self.line, self.column, self.content, self.message
        ))
    }
}

/// Parsed valgrind (lackey) memory trace: one `[ ]<op> <hex-address>,<size>`
/// record per line.
#[derive(Debug, Clone, Default)]
pub struct TraceFile {
    records: Vec<AccessRecord>,
    rejected: Vec<RejectedLine>,
}

impl TraceFile {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TraceError> {
        let path = path.as_ref();
        let file_content = std::fs::read_to_string(path).map_err(|source| TraceError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(Self::parse(&file_content))
    }

    /// Parses every line on its own; blank lines are skipped and malformed
    /// ones end up in [`TraceFile::rejected`].
    pub fn parse(input: &str) -> Self {
        let mut trace_file = Self::default();

        for (line_idx, line) in input.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }

            match terminated(record, space0).parse(line) {
                Ok(record) => trace_file.records.push(record),
                Err(e) => trace_file.rejected.push(RejectedLine {
                    line: line_idx + 1,
                    column: e.offset() + 1,
                    content: line.to_string(),
                    message: e.inner().to_string().replace('\n', "; "),
                }),
            }
        }

        trace_file
    }

    pub fn records(&self) -> &[AccessRecord] {
        &self.records
    }

    pub fn rejected(&self) -> &[RejectedLine] {
        &self.rejected
    }

    pub fn format_rejected(&self) -> Vec<String> {
        self.rejected
            .iter()
            .map(|rejected| format!("skipped {rejected}"))
            .collect()
    }
}

impl<'a> IntoIterator for &'a TraceFile {
    type Item = &'a AccessRecord;
    type IntoIter = std::slice::Iter<'a, AccessRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

fn record(input: &mut &str) -> ModalResult<AccessRecord> {
    (
        preceded(space0, operation),
        preceded(space0, address),
        preceded((space0, ',', space0), size),
    )
        .map(|(operation, address, size)| AccessRecord {
            operation,
            address,
            size,
        })
        .parse_next(input)
}

fn operation(input: &mut &str) -> ModalResult<Operation> {
    any.verify(|c: &char| c.is_ascii_alphabetic())
        .map(Operation::from)
        .context(StrContext::Label("operation"))
        .context(StrContext::Expected(StrContextValue::Description(
            "a single letter such as L, S or M",
        )))
        .parse_next(input)
}

fn address(input: &mut &str) -> ModalResult<u64> {
    preceded(
        opt(alt(("0x", "0X"))),
        take_while(1.., ('0'..='9', 'a'..='f', 'A'..='F')),
    )
    .try_map(|s| u64::from_str_radix(s, 16))
    .context(StrContext::Label("address"))
    .context(StrContext::Expected(StrContextValue::Description(
        "a 64-bit hexadecimal address",
    )))
    .parse_next(input)
}

fn size(input: &mut &str) -> ModalResult<u32> {
    take_while(1.., '0'..='9')
        .try_map(str::parse::<u32>)
        .context(StrContext::Label("size"))
        .context(StrContext::Expected(StrContextValue::Description(
            "a decimal access size",
        )))
        .parse_next(input)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parses_lackey_trace() {
        let trace = TraceFile::parse(
            "I 0400d7d4,8\n L 7ff0005c8,8\n S 7ff0005c8,8\n M 0421c7f0,4\n",
        );

        assert!(trace.rejected().is_empty());
        assert_eq!(
            trace.records(),
            &[
                AccessRecord {
                    operation: Operation::Other('I'),
                    address: 0x0400_d7d4,
                    size: 8
                },
                AccessRecord {
                    operation: Operation::Load,
                    address: 0x7_ff00_05c8,
                    size: 8
                },
                AccessRecord {
                    operation: Operation::Store,
                    address: 0x7_ff00_05c8,
                    size: 8
                },
                AccessRecord {
                    operation: Operation::Modify,
                    address: 0x0421_c7f0,
                    size: 4
                },
            ]
        );
    }

    #[test]
    fn lenient_whitespace_and_prefix() {
        let trace = TraceFile::parse("\n\n  L 0xFF , 2  \r\nS10,1\n\t\n");

        assert!(trace.rejected().is_empty());
        assert_eq!(trace.records().len(), 2);
        assert_eq!(trace.records()[0].address, 0xFF);
        assert_eq!(trace.records()[0].size, 2);
        assert_eq!(trace.records()[1].operation, Operation::Store);
        assert_eq!(trace.records()[1].address, 0x10);
    }

    #[test]
    fn rejects_malformed_lines() {
        let trace = TraceFile::parse(
            " L 10,1\n L 10\n S zz,1\n M 10,1 extra\n 7 10,1\n L ffffffffffffffffff,1\n S 20,1\n",
        );

        assert_eq!(trace.records().len(), 2);
        assert_eq!(trace.records()[1].address, 0x20);

        let lines: Vec<usize> = trace.rejected().iter().map(|r| r.line).collect();
        assert_eq!(lines, vec![2, 3, 4, 5, 6]);
        assert_eq!(trace.rejected()[0].content, " L 10");
        assert!(trace.rejected()[0].to_string().starts_with("line 2:"));

        let skipped = trace.format_rejected();
        assert_eq!(skipped.len(), 5);
        assert!(skipped[0].starts_with("skipped line 2:"));
        assert!(skipped[0].contains("` L 10`"));
    }

    #[test]
    fn record_display() {
        let record = AccessRecord {
            operation: Operation::Modify,
            address: 0x12,
            size: 1,
        };
        assert_eq!(record.to_string(), "M 12,1");
        assert_eq!(Operation::from('I').to_string(), "I");
    }

    #[test]
    fn missing_file() {
        let err = TraceFile::load("does/not/exist.trace").unwrap_err();
        assert!(matches!(err, TraceError::Io { .. }));
        assert!(err.to_string().contains("does/not/exist.trace"));
    }
}
