//! Diagnostic and error reporting for Cascade.
//! Cascade 的诊断和错误报告。
//!
//! This crate renders compiler errors using ariadne.
//! 本 crate 使用 ariadne 库渲染编译错误。

mod codes;
mod diagnostic;

pub use codes::ErrorCode;
pub use diagnostic::{Diagnostic, DiagnosticKind, Label, Severity};

use ariadne::{ColorGenerator, Config, Label as AriadneLabel, Report, ReportKind, Source};

fn build_report<'a>(
    filename: &'a str,
    diagnostic: &Diagnostic,
    color: bool,
) -> Report<'a, (&'a str, std::ops::Range<usize>)> {
    let kind = match diagnostic.severity {
        Severity::Error => ReportKind::Error,
        Severity::Warning => ReportKind::Warning,
        Severity::Note => ReportKind::Advice,
    };

    let mut colors = ColorGenerator::new();
    let mut report = Report::build(kind, filename, diagnostic.span.start.0 as usize)
        .with_config(Config::default().with_color(color))
        .with_message(&diagnostic.message);

    if let Some(code) = &diagnostic.code {
        report = report.with_code(code.as_str());
    }

    if diagnostic.labels.is_empty() {
        report = report.with_label(
            AriadneLabel::new((filename, diagnostic.span.range()))
                .with_message(&diagnostic.message)
                .with_color(colors.next()),
        );
    }

    for label in &diagnostic.labels {
        let ariadne_label = AriadneLabel::new((filename, label.span.range()))
            .with_message(&label.message)
            .with_color(colors.next());
        report = report.with_label(ariadne_label);
    }

    for note in &diagnostic.notes {
        report = report.with_note(note);
    }

    if let Some(help) = &diagnostic.help {
        report = report.with_help(help);
    }

    report.finish()
}

/// Render a diagnostic to stderr.
/// 将诊断信息渲染到标准错误输出。
pub fn emit(source: &str, filename: &str, diagnostic: &Diagnostic) {
    // A failed write to stderr leaves nothing better to report to.
    let _ = build_report(filename, diagnostic, true).eprint((filename, Source::from(source)));
}

/// Render a diagnostic to a plain (uncoloured) string.
/// 将诊断信息渲染为不带颜色的字符串。
pub fn render(source: &str, filename: &str, diagnostic: &Diagnostic) -> String {
    let mut out = Vec::new();
    let _ = build_report(filename, diagnostic, false)
        .write((filename, Source::from(source)), &mut out);
    String::from_utf8_lossy(&out).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use cascade_common::Span;

    #[test]
    fn test_render_contains_code_and_message() {
        let diagnostic = Diagnostic::error(
            DiagnosticKind::Binding,
            Span::from_usize(7, 13),
            "undefined variable `$color`",
        )
        .with_code(ErrorCode::UndefinedVariable)
        .with_help("did you mean `$colour`?");

        let text = render(".a { x: $color; }", "a.mcss", &diagnostic);
        assert!(text.contains("E0200"));
        assert!(text.contains("undefined variable `$color`"));
        assert!(text.contains("did you mean"));
    }

    #[test]
    fn test_code_suggestion_becomes_help() {
        let diagnostic = Diagnostic::error(DiagnosticKind::Type, Span::DUMMY, "1em + 1px")
            .with_code(ErrorCode::IncompatibleUnits);
        assert!(diagnostic.help.as_deref().unwrap_or("").contains("calc()"));
    }
}
