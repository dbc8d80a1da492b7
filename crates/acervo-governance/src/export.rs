//! # Ledger Export
//!
//! Deterministic renderings of a ledger slice. No I/O, no lookups: the output
//! depends only on the entries passed in (and, for the report, the bounds and
//! generation instant the caller supplies).
//!
//! Entries are always emitted in ascending decision order, whatever order the
//! caller passed them in. Instants keep microseconds, so decisions within
//! the same second keep their order. Entries with equal instants are ordered
//! by identifier; identifiers are time-ordered, so those ties follow creation
//! order and the output is a function of the set of entries.

use acervo_core::Timestamp;
use acervo_state::GovernanceEntry;
use thiserror::Error;

/// Byte-order mark prepended to delimited output for spreadsheet tools.
pub const BOM: &str = "\u{FEFF}";

/// Header row of the delimited export.
pub const DELIMITED_HEADER: [&str; 9] = [
    "ID",
    "Data/Hora (UTC)",
    "Categoria",
    "Tipo de Entidade",
    "ID da Entidade",
    "Decisão",
    "Justificativa",
    "Responsável",
    "Papel",
];

/// Placeholder for an absent lower bound in the report header.
pub const OPEN_START: &str = "início";
/// Placeholder for an absent upper bound in the report header.
pub const OPEN_END: &str = "atual";

/// Export failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExportError {
    /// The report period ends before it starts.
    #[error("report period is inverted: {start} is after {end}")]
    InvertedPeriod {
        /// Lower bound.
        start: Timestamp,
        /// Upper bound.
        end: Timestamp,
    },
}

impl From<ExportError> for acervo_core::AcervoError {
    fn from(err: ExportError) -> Self {
        acervo_core::AcervoError::Validation(err.to_string())
    }
}

fn chronological(entries: &[GovernanceEntry]) -> Vec<&GovernanceEntry> {
    let mut sorted: Vec<&GovernanceEntry> = entries.iter().collect();
    sorted.sort_by(|a, b| {
        a.decided_at()
            .cmp(&b.decided_at())
            .then_with(|| a.id().cmp(&b.id()))
    });
    sorted
}

/// Quote a field: wrap in double quotes, double inner quotes, and collapse
/// each line break (`\r\n`, `\n` or `\r`) into one space.
fn quote(field: &str) -> String {
    let flattened = field.replace("\r\n", " ").replace(['\n', '\r'], " ");
    format!("\"{}\"", flattened.replace('"', "\"\""))
}

fn row<'a>(fields: impl IntoIterator<Item = &'a str>) -> String {
    let quoted: Vec<String> = fields.into_iter().map(quote).collect();
    quoted.join(",")
}

/// Render entries as BOM-prefixed, comma-delimited UTF-8 text with a fixed
/// header row and CRLF line endings.
pub fn to_delimited_text(entries: &[GovernanceEntry]) -> Vec<u8> {
    let mut out = String::from(BOM);
    out.push_str(&row(DELIMITED_HEADER));
    out.push_str("\r\n");
    for entry in chronological(entries) {
        let id = entry.id().to_string();
        let decided_at = entry.decided_at().to_iso8601();
        out.push_str(&row([
            id.as_str(),
            decided_at.as_str(),
            entry.category().as_str(),
            entry.entity_type(),
            entry.entity_id(),
            entry.decision(),
            entry.justification(),
            entry.actor_id(),
            entry.actor_role(),
        ]));
        out.push_str("\r\n");
    }
    out.into_bytes()
}

/// Render entries as a human-readable report.
///
/// # Errors
///
/// [`ExportError::InvertedPeriod`] if both bounds are given and `start` is
/// after `end`.
pub fn to_report_text(
    entries: &[GovernanceEntry],
    start: Option<Timestamp>,
    end: Option<Timestamp>,
    generated_at: Timestamp,
) -> Result<String, ExportError> {
    if let (Some(start), Some(end)) = (start, end) {
        if start > end {
            return Err(ExportError::InvertedPeriod { start, end });
        }
    }

    let bound = |t: Option<Timestamp>, placeholder: &str| {
        t.map_or_else(|| placeholder.to_string(), |t| t.to_report_format())
    };

    let mut out = String::new();
    out.push_str("RELATÓRIO DO LIVRO DE GOVERNANÇA\n");
    out.push_str(&format!(
        "Período: {} até {}\n",
        bound(start, OPEN_START),
        bound(end, OPEN_END)
    ));
    out.push_str(&format!("Total de registros: {}\n", entries.len()));
    out.push_str(&format!("Gerado em: {}\n", generated_at.to_report_format()));
    out.push_str(&"=".repeat(72));
    out.push('\n');

    for (n, entry) in chronological(entries).into_iter().enumerate() {
        out.push('\n');
        out.push_str(&format!("#{} | {}\n", n + 1, entry.decided_at().to_report_format()));
        out.push_str(&format!("Categoria: {}\n", entry.category()));
        out.push_str(&format!(
            "Entidade: {} {}\n",
            entry.entity_type(),
            entry.entity_id()
        ));
        out.push_str(&format!("Decisão: {}\n", entry.decision()));
        if !entry.justification().is_empty() {
            out.push_str(&format!("Justificativa: {}\n", entry.justification()));
        }
        out.push_str(&format!(
            "Responsável: {} ({})\n",
            entry.actor_id(),
            entry.actor_role()
        ));
        out.push_str(&format!("Registro: {}\n", entry.id()));
        out.push_str(&"-".repeat(72));
        out.push('\n');
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use acervo_core::{ActorContext, DecisionCategory};
    use acervo_state::Decision;
    use proptest::prelude::*;

    fn ts(s: &str) -> Timestamp {
        Timestamp::parse(s).unwrap()
    }

    fn entry(at: &str, entity: &str, actor: &str, label: &str, justification: &str) -> GovernanceEntry {
        GovernanceEntry::new(
            Decision::new(DecisionCategory::Legal, "rights_document", entity, label)
                .with_justification(justification),
            &ActorContext::new(actor, "LEGAL_REVIEWER"),
            ts(at),
        )
    }

    /// Minimal reader for the delimited format: every field is quoted.
    fn parse(bytes: &[u8]) -> Vec<Vec<String>> {
        let text = std::str::from_utf8(bytes).unwrap();
        let text = text.strip_prefix(BOM).unwrap();
        let mut rows = Vec::new();
        for line in text.split("\r\n").filter(|l| !l.is_empty()) {
            let mut fields = Vec::new();
            let mut chars = line.chars().peekable();
            while let Some(c) = chars.next() {
                assert_eq!(c, '"');
                let mut field = String::new();
                loop {
                    match chars.next() {
                        Some('"') if chars.peek() == Some(&'"') => {
                            chars.next();
                            field.push('"');
                        }
                        Some('"') => break,
                        Some(other) => field.push(other),
                        None => panic!("unterminated field"),
                    }
                }
                fields.push(field);
                if chars.peek() == Some(&',') {
                    chars.next();
                }
            }
            rows.push(fields);
        }
        rows
    }

    // ── delimited ────────────────────────────────────────────────────

    #[test]
    fn starts_with_bom_and_header() {
        let bytes = to_delimited_text(&[]);
        let rows = parse(&bytes);
        assert!(bytes.starts_with(BOM.as_bytes()));
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0], DELIMITED_HEADER.map(String::from).to_vec());
    }

    #[test]
    fn escapes_quotes_and_line_breaks() {
        let e = entry(
            "2026-01-01T00:00:00Z",
            "doc-1",
            "ana",
            "DOCUMENT_REJECTED",
            "assinatura \"ilegível\"\r\nsem\ndata\rvisível",
        );
        let text = String::from_utf8(to_delimited_text(&[e])).unwrap();
        assert!(text.contains("\"assinatura \"\"ilegível\"\" sem data visível\""));
        let rows = parse(text.as_bytes());
        assert_eq!(rows[1][6], "assinatura \"ilegível\" sem data visível");
    }

    #[test]
    fn rows_are_chronological_regardless_of_input_order() {
        let late = entry("2026-03-01T00:00:00Z", "doc-3", "c", "C", "");
        let early = entry("2026-01-01T00:00:00Z", "doc-1", "a", "A", "");
        let mid = entry("2026-02-01T00:00:00Z", "doc-2", "b", "B", "");
        let rows = parse(&to_delimited_text(&[late, early, mid]));
        let labels: Vec<&str> = rows[1..].iter().map(|r| r[5].as_str()).collect();
        assert_eq!(labels, ["A", "B", "C"]);
        assert_eq!(rows[1][1], "2026-01-01T00:00:00Z");
    }

    #[test]
    fn same_second_rows_follow_decision_order() {
        let second = ts("2026-01-01T10:00:00Z");
        let at = |micros: i64| second.shifted(chrono::Duration::microseconds(micros));
        let decision = |label: &str| Decision::new(DecisionCategory::Legal, "rights_document", "doc-1", label);
        let actor = ActorContext::new("ana", "LEGAL_REVIEWER");

        // Minted in reverse so identifier order disagrees with decision order.
        let expired = GovernanceEntry::new(decision("DOCUMENT_EXPIRED"), &actor, at(900_000));
        let validated = GovernanceEntry::new(decision("DOCUMENT_VALIDATED"), &actor, at(100_000));
        let rows = parse(&to_delimited_text(&[expired, validated]));
        let labels: Vec<&str> = rows[1..].iter().map(|r| r[5].as_str()).collect();
        assert_eq!(labels, ["DOCUMENT_VALIDATED", "DOCUMENT_EXPIRED"]);
        assert_eq!(rows[1][1], rows[2][1]);
    }

    #[test]
    fn identical_instants_follow_creation_order() {
        let at = ts("2026-01-01T10:00:00Z");
        let actor = ActorContext::new("sistema", "SYSTEM");
        let first = GovernanceEntry::new(
            Decision::new(DecisionCategory::Legal, "rights_document", "doc-1", "FIRST"),
            &actor,
            at,
        );
        let second = GovernanceEntry::new(
            Decision::new(DecisionCategory::Legal, "rights_document", "doc-2", "SECOND"),
            &actor,
            at,
        );
        let rows = parse(&to_delimited_text(&[second, first]));
        let labels: Vec<&str> = rows[1..].iter().map(|r| r[5].as_str()).collect();
        assert_eq!(labels, ["FIRST", "SECOND"]);
    }

    proptest! {
        #[test]
        fn delimited_round_trip(
            specs in proptest::collection::vec(
                (0i64..1_000_000, "[a-z0-9\"\\- ]{1,12}", "[a-z\"]{1,8}", "[A-Z_]{1,10}"),
                0..12,
            )
        ) {
            let base = ts("2026-01-01T00:00:00Z").epoch_secs();
            let entries: Vec<GovernanceEntry> = specs
                .iter()
                .map(|(offset, entity, actor, label)| {
                    GovernanceEntry::new(
                        Decision::new(DecisionCategory::Financial, "transaction", entity, label),
                        &ActorContext::new(actor.clone(), "FINANCE"),
                        Timestamp::from_epoch_secs(base + offset).unwrap(),
                    )
                })
                .collect();

            let mut reversed = entries.clone();
            reversed.reverse();
            prop_assert_eq!(to_delimited_text(&entries), to_delimited_text(&reversed));

            let rows = parse(&to_delimited_text(&entries));
            let mut parsed: Vec<(String, String, String)> = rows[1..]
                .iter()
                .map(|r| (r[4].clone(), r[7].clone(), r[5].clone()))
                .collect();
            let mut expected: Vec<(String, String, String)> = entries
                .iter()
                .map(|e| (e.entity_id().to_string(), e.actor_id().to_string(), e.decision().to_string()))
                .collect();
            parsed.sort();
            expected.sort();
            prop_assert_eq!(parsed, expected);

            let instants: Vec<&String> = rows[1..].iter().map(|r| &r[1]).collect();
            let mut sorted = instants.clone();
            sorted.sort();
            prop_assert_eq!(instants, sorted);
        }
    }

    // ── report ───────────────────────────────────────────────────────

    #[test]
    fn report_uses_placeholders_for_open_bounds() {
        let text = to_report_text(&[], None, None, ts("2026-05-01T12:00:00Z")).unwrap();
        assert!(text.contains("Período: início até atual"));
        assert!(text.contains("Total de registros: 0"));
        assert!(text.contains("Gerado em: 01/05/2026 12:00:00 UTC"));
    }

    #[test]
    fn report_renders_bounds_and_blocks_in_order() {
        let a = entry("2026-01-02T08:00:00Z", "doc-1", "ana", "DOCUMENT_VALIDATED", "ok");
        let b = entry("2026-01-01T08:00:00Z", "doc-2", "bia", "DOCUMENT_REJECTED", "");
        let text = to_report_text(
            &[a, b],
            Some(ts("2026-01-01T00:00:00Z")),
            None,
            ts("2026-05-01T12:00:00Z"),
        )
        .unwrap();
        assert!(text.contains("Período: 01/01/2026 00:00:00 UTC até atual"));
        assert!(text.contains("Total de registros: 2"));
        let first = text.find("DOCUMENT_REJECTED").unwrap();
        let second = text.find("DOCUMENT_VALIDATED").unwrap();
        assert!(first < second);
        assert!(text.contains("#1 | 01/01/2026 08:00:00 UTC"));
        assert!(text.contains("Responsável: ana (LEGAL_REVIEWER)"));
        assert!(text.contains("Justificativa: ok"));
    }

    #[test]
    fn report_is_deterministic() {
        let a = entry("2026-01-02T08:00:00Z", "doc-1", "ana", "A", "");
        let b = entry("2026-01-01T08:00:00Z", "doc-2", "bia", "B", "");
        let at = ts("2026-05-01T12:00:00Z");
        assert_eq!(
            to_report_text(&[a.clone(), b.clone()], None, None, at).unwrap(),
            to_report_text(&[b, a], None, None, at).unwrap()
        );
    }

    #[test]
    fn inverted_period_is_rejected() {
        let err = to_report_text(
            &[],
            Some(ts("2026-02-01T00:00:00Z")),
            Some(ts("2026-01-01T00:00:00Z")),
            Timestamp::now(),
        )
        .unwrap_err();
        assert!(matches!(err, ExportError::InvertedPeriod { .. }));
    }
}
