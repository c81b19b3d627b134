//! Excellon drill parser.
//!
//! Recognizes the subset of DRL needed for drilling: comments, units
//! directives, tool definitions (`T01C0.8`), tool selections (`T01`) and
//! explicit-decimal coordinates (`X1.5Y-2.0`). Every other line is ignored.

use std::borrow::Cow;

use super::types::{Drawing, ExcellonUnits, Point, ToolBatch};

#[derive(Debug, Default)]
struct ParserState {
    drawing: Drawing,
    /// Index into `drawing.batches` of the selected tool.
    current_batch: Option<usize>,
}

impl ParserState {
    fn define_tool(&mut self, id: &str, diameter_text: &str) {
        if self.drawing.batch(id).is_some() {
            tracing::debug!(tool = id, "duplicate tool definition ignored");
            self.drawing.warnings.push(format!(
                "duplicate tool definition for {id}; first definition wins"
            ));
            return;
        }

        self.drawing
            .batches
            .push(ToolBatch::with_diameter_text(id, diameter_text));
    }

    fn select_tool(&mut self, id: &str) {
        self.current_batch = self.drawing.batches.iter().position(|batch| batch.id == id);
        if self.current_batch.is_none() {
            self.drawing
                .warnings
                .push(format!("tool {id} selected but not defined"));
        }
    }

    fn push_item(&mut self, point: Point) {
        let batch = self
            .current_batch
            .and_then(|index| self.drawing.batches.get_mut(index));

        if let Some(batch) = batch {
            batch.items.push(point);
        } else {
            self.drawing.warnings.push(format!(
                "hole at ({}, {}) skipped: no tool selected",
                point.x, point.y
            ));
        }
    }
}

/// Parse drill file lines into a [`Drawing`].
///
/// Never fails: unrecognized lines are skipped and coordinates seen before
/// any tool selection are dropped with a warning.
pub fn parse<I, S>(lines: I) -> Drawing
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut state = ParserState::default();

    for raw_line in lines {
        let line = raw_line.as_ref().trim();
        if line.is_empty() || line.starts_with(';') {
            continue;
        }

        // The checks below are independent; a line is offered to each one.
        if let Some(units) = parse_units_directive(line) {
            state.drawing.units = units;
        }

        if let Some((id, diameter_text)) = parse_tool_definition(line) {
            state.define_tool(id, diameter_text);
        }

        if is_tool_id(line) {
            state.select_tool(line);
        }

        if let Some(point) = parse_item(line) {
            state.push_item(point);
        }
    }

    let drawing = state.drawing;
    tracing::debug!(
        units = %drawing.units,
        tools = drawing.batches.len(),
        holes = drawing.hole_count(),
        warnings = drawing.warnings.len(),
        "parsed drill file"
    );
    drawing
}

/// Parse a drill file from raw bytes.
///
/// Bytes that are not valid UTF-8 are replaced before parsing, so stray
/// Latin-1 text in comments does not affect the result. Empty data yields
/// an empty drawing.
pub fn parse_bytes(data: &[u8]) -> Drawing {
    let content = String::from_utf8_lossy(data);
    let mut drawing = parse(content.lines());
    if matches!(content, Cow::Owned(_)) {
        drawing
            .warnings
            .push("input is not valid UTF-8; invalid bytes were replaced".to_string());
    }
    drawing
}

fn parse_units_directive(line: &str) -> Option<ExcellonUnits> {
    // `METRIC,TZ` and friends carry a zero-suppression mode that only
    // matters for implicit-decimal coordinates, which are not supported.
    let keyword = line.split(',').next().unwrap_or(line);
    match keyword {
        "METRIC" => Some(ExcellonUnits::Metric),
        "INCH" => Some(ExcellonUnits::Imperial),
        _ => None,
    }
}

fn parse_tool_definition(line: &str) -> Option<(&str, &str)> {
    let (id, diameter_raw) = line.split_once('C')?;
    if !is_tool_id(id) || !is_unsigned_decimal(diameter_raw) {
        return None;
    }

    Some((id, diameter_raw))
}

fn parse_item(line: &str) -> Option<Point> {
    let after_x = line.strip_prefix('X')?;
    let (x_raw, y_raw) = after_x.split_once('Y')?;
    if !is_signed_decimal(x_raw) || !is_signed_decimal(y_raw) {
        return None;
    }

    Some(Point {
        x: parse_number(x_raw),
        y: parse_number(y_raw),
    })
}

fn is_tool_id(text: &str) -> bool {
    text.strip_prefix('T')
        .is_some_and(|digits| !digits.is_empty() && digits.chars().all(|ch| ch.is_ascii_digit()))
}

fn is_unsigned_decimal(text: &str) -> bool {
    !text.is_empty() && text.chars().all(|ch| ch.is_ascii_digit() || ch == '.')
}

fn is_signed_decimal(text: &str) -> bool {
    !text.is_empty()
        && text
            .chars()
            .all(|ch| ch.is_ascii_digit() || ch == '.' || ch == '-')
}

/// Malformed fragments such as `1.2.3` read as `NaN` rather than failing.
pub(crate) fn parse_number(raw: &str) -> f64 {
    raw.parse::<f64>().unwrap_or(f64::NAN)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    fn assert_point(point: Option<&Point>, x: f64, y: f64) {
        assert!(point.is_some(), "point missing");
        if let Some(point) = point {
            assert!((point.x - x).abs() < EPSILON, "x {} != {x}", point.x);
            assert!((point.y - y).abs() < EPSILON, "y {} != {y}", point.y);
        }
    }

    #[test]
    fn unrecognized_input_yields_empty_metric_drawing() {
        let drawing = parse(["M48", "FMAT,2", "%", "G90", "M30", "hello"]);
        assert_eq!(drawing.units, ExcellonUnits::Metric);
        assert!(drawing.batches.is_empty());
    }

    #[test]
    fn minimal_drawing_has_one_batch_with_two_items() {
        let drawing = parse(["T01C0.80", "METRIC", "T01", "X1.000Y2.000", "X-1.500Y0.250"]);
        assert_eq!(drawing.batches.len(), 1);

        let batch = drawing.batches.first();
        assert!(batch.is_some(), "batch missing");
        if let Some(batch) = batch {
            assert_eq!(batch.id, "T01");
            assert!((batch.diameter - 0.8).abs() < EPSILON);
            assert_eq!(batch.items.len(), 2);
            assert_point(batch.items.first(), 1.0, 2.0);
            assert_point(batch.items.get(1), -1.5, 0.25);
        }
    }

    #[test]
    fn tool_definitions_keep_first_occurrence_order() {
        let drawing = parse(["T3C1.2", "T1C0.6", "T02C0.9"]);
        let ids: Vec<&str> = drawing.batches.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, ["T3", "T1", "T02"]);
    }

    #[test]
    fn tool_definition_does_not_select_the_tool() {
        let drawing = parse(["T1C0.8", "X1.0Y1.0"]);
        assert_eq!(drawing.hole_count(), 0);
        assert!(drawing
            .warnings
            .iter()
            .any(|warning| warning.contains("no tool selected")));
    }

    #[test]
    fn items_before_any_selection_are_dropped() {
        let drawing = parse(["T1C0.8", "X1.0Y1.0", "T1", "X2.0Y2.0"]);
        let batch = drawing.batch("T1");
        assert!(batch.is_some(), "batch missing");
        if let Some(batch) = batch {
            assert_eq!(batch.items.len(), 1);
            assert_point(batch.items.first(), 2.0, 2.0);
        }
    }

    #[test]
    fn items_follow_the_most_recent_selection() {
        let drawing = parse([
            "T1C0.8", "T2C1.0", "T2", "X1.0Y1.0", "T1", "X2.0Y2.0", "T2", "X3.0Y3.0",
        ]);
        let t1 = drawing.batch("T1").map(|b| b.items.len());
        let t2 = drawing.batch("T2").map(|b| b.items.clone());
        assert_eq!(t1, Some(1));
        assert!(t2.is_some(), "T2 missing");
        if let Some(items) = t2 {
            assert_eq!(items.len(), 2);
            assert_point(items.first(), 1.0, 1.0);
            assert_point(items.get(1), 3.0, 3.0);
        }
    }

    #[test]
    fn selecting_undefined_tool_clears_the_selection() {
        let drawing = parse(["T1C0.8", "T1", "X1.0Y1.0", "T9", "X2.0Y2.0"]);
        assert_eq!(drawing.hole_count(), 1);
        assert!(drawing
            .warnings
            .iter()
            .any(|warning| warning.contains("T9 selected but not defined")));
    }

    #[test]
    fn tool_ids_are_matched_verbatim() {
        let drawing = parse(["T01C0.8", "T1", "X1.0Y1.0"]);
        assert_eq!(drawing.hole_count(), 0);
    }

    #[test]
    fn duplicate_tool_definition_keeps_first_with_warning() {
        let drawing = parse(["T1C0.8", "T1C1.0", "T1", "X1.0Y1.0"]);
        assert_eq!(drawing.batches.len(), 1);

        let batch = drawing.batch("T1");
        assert!(batch.is_some(), "batch missing");
        if let Some(batch) = batch {
            assert!((batch.diameter - 0.8).abs() < EPSILON);
            assert_eq!(batch.items.len(), 1);
        }
        assert!(drawing
            .warnings
            .iter()
            .any(|warning| warning.contains("duplicate tool definition")));
    }

    #[test]
    fn inch_directive_selects_imperial_units() {
        assert_eq!(parse(["INCH"]).units, ExcellonUnits::Imperial);
        assert_eq!(parse(["INCH,LZ"]).units, ExcellonUnits::Imperial);
        assert_eq!(parse(["INCH", "METRIC,TZ"]).units, ExcellonUnits::Metric);
    }

    #[test]
    fn comments_and_blank_lines_are_skipped() {
        let drawing = parse(["  ; T1C0.8", "", "   ", "\tT2C0.5  ", " T2 ", "X1Y1"]);
        assert_eq!(drawing.batches.len(), 1);
        assert_eq!(drawing.hole_count(), 1);
    }

    #[test]
    fn lines_with_trailing_content_are_ignored() {
        let drawing = parse(["T1C0.8", "T1", "X1.0Y1.0G85X2.0Y2.0", "T1F200S50", "X1.0"]);
        assert_eq!(drawing.hole_count(), 0);
        assert_eq!(drawing.batches.len(), 1);
    }

    #[test]
    fn malformed_number_inside_pattern_reads_as_nan() {
        let drawing = parse(["T1C0.8", "T1", "X1.2.3Y-"]);
        let point = drawing.batch("T1").and_then(|b| b.items.first().copied());
        assert!(point.is_some(), "point missing");
        if let Some(point) = point {
            assert!(point.x.is_nan());
            assert!(point.y.is_nan());
        }
    }

    #[test]
    fn parse_bytes_handles_crlf_line_endings() {
        let drawing = parse_bytes(b"M48\r\nMETRIC\r\nT1C0.8\r\n%\r\nT1\r\nX1.0Y2.0\r\nM30\r\n");
        assert_eq!(drawing.hole_count(), 1);
        assert!(drawing.warnings.is_empty());
    }

    #[test]
    fn parse_bytes_of_empty_data_is_an_empty_metric_drawing() {
        let drawing = parse_bytes(&[]);
        assert_eq!(drawing.units, ExcellonUnits::Metric);
        assert!(drawing.batches.is_empty());
        assert!(drawing.warnings.is_empty());
    }

    #[test]
    fn parse_bytes_tolerates_latin1_comment() {
        let drawing = parse_bytes(b"; Gr\xF6\xDFe 0.8mm\nMETRIC\nT1C0.8\nT1\nX1.0Y1.0\n");
        assert_eq!(drawing.batches.len(), 1);
        assert_eq!(drawing.hole_count(), 1);
        assert!(drawing
            .warnings
            .iter()
            .any(|warning| warning.contains("not valid UTF-8")));
    }

    #[test]
    fn parse_bytes_of_binary_garbage_has_no_batches() {
        let drawing = parse_bytes(&[0xDE, 0xAD, 0xBE, 0xEF]);
        assert!(drawing.batches.is_empty());
    }

    #[test]
    fn diameter_text_is_kept_as_written() {
        let drawing = parse(["T01C0.80"]);
        let batch = drawing.batch("T01");
        assert!(batch.is_some(), "batch missing");
        if let Some(batch) = batch {
            assert_eq!(batch.diameter_text, "0.80");
            assert!((batch.diameter - 0.8).abs() < EPSILON);
        }
    }
}
