use crate::report::Report;

/// Render a report as CSV: a header row, then one line per row.
pub fn render(report: &Report) -> String {
    let mut output = String::new();
    push_record(&mut output, &report.headers());
    for row in &report.rows {
        push_record(&mut output, &row.cells());
    }
    output
}

fn push_record(output: &mut String, fields: &[String]) {
    let record = fields
        .iter()
        .map(|f| escape(f))
        .collect::<Vec<_>>()
        .join(",");
    output.push_str(&record);
    output.push_str("\r\n");
}

/// Quote a field if it holds a delimiter, quote or line break.
fn escape(field: &str) -> String {
    if field.contains(&[',', '"', '\r', '\n'][..]) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{ReportKind, ReportRow};
    use crate::scoring::Score;
    use crate::tags::{Tag, TagSet};
    use pretty_assertions::assert_eq;

    #[test]
    fn scored_report_csv() {
        let mut mutating = ReportRow::new("s3", "PutObject", [Tag::Mutating].into_iter().collect());
        mutating.score = Some(Score::Value(10));
        let mut unknown = ReportRow::new("iam", "ListRoles", [Tag::Read].into_iter().collect());
        unknown.score = Some(Score::Unknown);
        let report = Report {
            kind: ReportKind::Scored,
            rows: vec![mutating, unknown],
            unscored_services: Default::default(),
        };
        assert_eq!(
            render(&report),
            "service,permission,DATA_PLANE,CONTROL_PLANE,MUTATING,READ,SIDE_EFFECT,score\r\n\
             s3,PutObject,false,false,true,false,false,10\r\n\
             iam,ListRoles,false,false,false,true,false,UNKNOWN\r\n"
        );
    }

    #[test]
    fn quotes_fields_with_delimiters() {
        assert_eq!(escape("plain"), "plain");
        assert_eq!(escape("a,b"), "\"a,b\"");
        assert_eq!(escape("say \"hi\""), "\"say \"\"hi\"\"\"");
        let row = ReportRow::new("odd,svc", "Get", TagSet::new());
        let report = Report {
            kind: ReportKind::All,
            rows: vec![row],
            unscored_services: Default::default(),
        };
        assert!(render(&report).contains("\"odd,svc\",Get,"));
    }
}
