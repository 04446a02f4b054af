//! Rendering of a check outcome as plugin output.
//!
//! Text output is one summary line, followed by one line per problem when
//! there is more than one.

use serde::Serialize;

use stackprobe_types::{CheckOutcome, Severity};

/// Everything needed to print the result of one check.
#[derive(Debug, Clone)]
pub struct Report {
    /// Leading label of the summary line, e.g. "Nova API".
    pub prefix: &'static str,
    pub outcome: CheckOutcome,
    /// Summary text when nothing is wrong.
    pub ok_summary: String,
    /// Appended in parentheses to the summary line (e.g. the endpoint).
    pub context: Option<String>,
    /// Summary text when several problems were found. Defaults to a count.
    pub detail: Option<String>,
    /// Appended after `|` to the summary line.
    pub perfdata: Option<String>,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    check: &'static str,
    status: &'static str,
    exit_code: i32,
    summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    context: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    perfdata: Option<&'a str>,
    #[serde(flatten)]
    outcome: &'a CheckOutcome,
}

impl Report {
    pub fn new(prefix: &'static str, outcome: impl Into<CheckOutcome>) -> Self {
        Self {
            prefix,
            outcome: outcome.into(),
            ok_summary: String::new(),
            context: None,
            detail: None,
            perfdata: None,
        }
    }

    /// Report for a run whose collection failed.
    pub fn failed(prefix: &'static str, reason: impl Into<String>) -> Self {
        Self::new(prefix, CheckOutcome::collection_failed(reason))
    }

    pub fn ok_summary(mut self, summary: impl Into<String>) -> Self {
        self.ok_summary = summary.into();
        self
    }

    pub fn context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn perfdata(mut self, perfdata: impl Into<String>) -> Self {
        self.perfdata = Some(perfdata.into());
        self
    }

    pub fn severity(&self) -> Severity {
        self.outcome.severity()
    }

    pub fn exit_code(&self) -> i32 {
        self.outcome.exit_code()
    }

    fn summary(&self) -> String {
        let messages = self.outcome.messages();
        match messages.as_slice() {
            [] => self.ok_summary.clone(),
            [only] => only.to_string(),
            many => self
                .detail
                .clone()
                .unwrap_or_else(|| format!("{} problems found", many.len())),
        }
    }

    pub fn render_text(&self) -> String {
        let mut out = format!("{} {}: {}", self.prefix, self.severity().label(), self.summary());
        if let Some(context) = &self.context {
            out.push_str(&format!(" ({context})"));
        }
        if let Some(perfdata) = &self.perfdata {
            out.push_str(&format!(" | {perfdata}"));
        }

        let messages = self.outcome.messages();
        if messages.len() > 1 {
            for message in messages {
                out.push('\n');
                out.push_str(message);
            }
        }
        out
    }

    pub fn render_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&JsonReport {
            check: self.prefix,
            status: self.severity().label(),
            exit_code: self.exit_code(),
            summary: self.summary(),
            context: self.context.as_deref(),
            perfdata: self.perfdata.as_deref(),
            outcome: &self.outcome,
        })
    }
}
