//! Violation message templates.

use std::fmt;

/// Values available to a template when a violation is rendered.
#[derive(Debug, Clone, Default)]
pub struct MessageContext<'a> {
    pub rule_id: &'a str,
    pub measurement: &'a str,
    pub value: Option<String>,
    pub threshold: Option<String>,
    pub item: Option<&'a str>,
}

/// A message with `{placeholder}` slots.
///
/// Supported placeholders are `{id}`, `{measurement}`, `{value}`,
/// `{threshold}` and `{item}`. Anything else between braces is copied
/// through unchanged.
///
/// ```rust
/// use stackprobe_engine::{MessageContext, MessageTemplate};
///
/// let template = MessageTemplate::new("{item} service is empty");
/// let ctx = MessageContext { item: Some("image"), ..Default::default() };
/// assert_eq!(template.render(&ctx), "image service is empty");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageTemplate(String);

impl MessageTemplate {
    pub fn new(template: impl Into<String>) -> Self {
        Self(template.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn render(&self, ctx: &MessageContext<'_>) -> String {
        let mut out = String::with_capacity(self.0.len() + 16);
        let mut rest = self.0.as_str();

        while let Some(start) = rest.find('{') {
            out.push_str(&rest[..start]);
            let after = &rest[start + 1..];
            let Some(end) = after.find('}') else {
                rest = &rest[start..];
                break;
            };

            let key = &after[..end];
            let value = match key {
                "id" => Some(ctx.rule_id),
                "measurement" => Some(ctx.measurement),
                "value" => ctx.value.as_deref(),
                "threshold" => ctx.threshold.as_deref(),
                "item" => ctx.item,
                _ => None,
            };
            match value {
                Some(v) => out.push_str(v),
                None => {
                    out.push('{');
                    out.push_str(key);
                    out.push('}');
                }
            }
            rest = &after[end + 1..];
        }

        out.push_str(rest);
        out
    }
}

impl From<&str> for MessageTemplate {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for MessageTemplate {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for MessageTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Format a number the way operators type it: `70` rather than `70.0`.
pub fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}
