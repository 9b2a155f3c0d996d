//! Email template rendering engine.
//!
//! Handlebars templates for the three message kinds, each rendered to
//! both HTML and plain text from the same typed input. Rendering is
//! deterministic: every input field appears verbatim in both bodies, so
//! tests can assert exact substrings.

use handlebars::Handlebars;
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

use crate::error::{EmailError, EmailResult};
use crate::models::{AssignmentEmailData, EmergencyEmailData, ProgressEmailData};

/// Rendered email content.
#[derive(Debug, Clone)]
pub struct RenderedEmail {
    pub html: String,
    pub text: String,
    pub subject: String,
}

/// Template engine for the transactional email kinds.
pub struct TemplateEngine {
    handlebars: Arc<Handlebars<'static>>,
}

impl TemplateEngine {
    /// Create a new template engine with all templates registered.
    pub fn new() -> EmailResult<Self> {
        let mut handlebars = Handlebars::new();

        for (name, template) in [
            ("assignment_html", ASSIGNMENT_HTML_TEMPLATE),
            ("assignment_text", ASSIGNMENT_TEXT_TEMPLATE),
            ("emergency_html", EMERGENCY_HTML_TEMPLATE),
            ("emergency_text", EMERGENCY_TEXT_TEMPLATE),
            ("progress_html", PROGRESS_HTML_TEMPLATE),
            ("progress_text", PROGRESS_TEXT_TEMPLATE),
        ] {
            handlebars
                .register_template_string(name, template)
                .map_err(|e| EmailError::Template(format!("Failed to register {name}: {e}")))?;
        }

        Ok(Self {
            handlebars: Arc::new(handlebars),
        })
    }

    fn render<T: Serialize>(&self, template_name: &str, data: &T) -> EmailResult<String> {
        self.handlebars
            .render(template_name, data)
            .map_err(|e| EmailError::Template(e.to_string()))
    }

    /// Render an assignment notification email.
    pub fn render_assignment(&self, data: &AssignmentEmailData) -> EmailResult<RenderedEmail> {
        debug!(staff = %data.staff_name, patient = %data.patient_name, "Rendering assignment email");
        Ok(RenderedEmail {
            html: self.render("assignment_html", data)?,
            text: self.render("assignment_text", data)?,
            subject: format!("New patient assignment: {}", data.patient_name),
        })
    }

    /// Render an emergency alert email.
    pub fn render_emergency(&self, data: &EmergencyEmailData) -> EmailResult<RenderedEmail> {
        debug!(staff = %data.staff_name, patient = %data.patient_name, "Rendering emergency email");
        Ok(RenderedEmail {
            html: self.render("emergency_html", data)?,
            text: self.render("emergency_text", data)?,
            subject: format!("EMERGENCY: {} needs immediate attention", data.patient_name),
        })
    }

    /// Render a progress update email.
    pub fn render_progress(&self, data: &ProgressEmailData) -> EmailResult<RenderedEmail> {
        debug!(staff = %data.staff_name, patient = %data.patient_name, "Rendering progress email");
        Ok(RenderedEmail {
            html: self.render("progress_html", data)?,
            text: self.render("progress_text", data)?,
            subject: format!("Progress update for {}", data.patient_name),
        })
    }
}

const ASSIGNMENT_HTML_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"></head>
<body style="font-family: Arial, sans-serif; color: #333;">
  <h2>New Patient Assignment</h2>
  <p>Hello {{staff_name}},</p>
  <p>You have been assigned as <strong>{{role}}</strong> for a patient.</p>
  <table style="border-collapse: collapse;">
    <tr><td style="padding: 4px 12px 4px 0;"><strong>Patient</strong></td><td>{{patient_name}}</td></tr>
    <tr><td style="padding: 4px 12px 4px 0;"><strong>Patient ID</strong></td><td>{{patient_id}}</td></tr>
    <tr><td style="padding: 4px 12px 4px 0;"><strong>Assignment</strong></td><td>{{assignment_type}}</td></tr>
  </table>
  <p>Please review the patient's record at your earliest convenience.</p>
</body>
</html>"#;

const ASSIGNMENT_TEXT_TEMPLATE: &str = r#"New Patient Assignment

Hello {{staff_name}},

You have been assigned as {{role}} for a patient.

Patient: {{patient_name}}
Patient ID: {{patient_id}}
Assignment: {{assignment_type}}

Please review the patient's record at your earliest convenience.
"#;

const EMERGENCY_HTML_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"></head>
<body style="font-family: Arial, sans-serif; color: #333;">
  <h2 style="color: #c0392b;">Emergency Alert</h2>
  <p>Hello {{staff_name}},</p>
  <p>An emergency has been reported for a patient assigned to you. Please respond immediately.</p>
  <table style="border-collapse: collapse;">
    <tr><td style="padding: 4px 12px 4px 0;"><strong>Patient</strong></td><td>{{patient_name}}</td></tr>
    <tr><td style="padding: 4px 12px 4px 0;"><strong>Patient ID</strong></td><td>{{patient_id}}</td></tr>
    <tr><td style="padding: 4px 12px 4px 0;"><strong>Severity</strong></td><td>{{severity}}</td></tr>
    <tr><td style="padding: 4px 12px 4px 0;"><strong>Location</strong></td><td>{{location}}</td></tr>
  </table>
  <p><strong>Description:</strong> {{description}}</p>
</body>
</html>"#;

const EMERGENCY_TEXT_TEMPLATE: &str = r#"EMERGENCY ALERT

Hello {{staff_name}},

An emergency has been reported for a patient assigned to you. Please respond immediately.

Patient: {{patient_name}}
Patient ID: {{patient_id}}
Severity: {{severity}}
Location: {{location}}

Description: {{description}}
"#;

const PROGRESS_HTML_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"></head>
<body style="font-family: Arial, sans-serif; color: #333;">
  <h2>Patient Progress Update</h2>
  <p>Hello {{staff_name}},</p>
  <p>There is a new progress update for a patient on your care team.</p>
  <table style="border-collapse: collapse;">
    <tr><td style="padding: 4px 12px 4px 0;"><strong>Patient</strong></td><td>{{patient_name}}</td></tr>
    <tr><td style="padding: 4px 12px 4px 0;"><strong>Patient ID</strong></td><td>{{patient_id}}</td></tr>
  </table>
  <p><strong>Summary:</strong> {{progress_summary}}</p>
</body>
</html>"#;

const PROGRESS_TEXT_TEMPLATE: &str = r#"Patient Progress Update

Hello {{staff_name}},

There is a new progress update for a patient on your care team.

Patient: {{patient_name}}
Patient ID: {{patient_id}}

Summary: {{progress_summary}}
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assignment_render_contains_every_field_in_both_bodies() {
        let engine = TemplateEngine::new().unwrap();
        let data = AssignmentEmailData {
            staff_name: "Jane Doe".into(),
            role: "nurse".into(),
            patient_name: "Pat Example".into(),
            patient_id: "P1".into(),
            assignment_type: "initial".into(),
        };

        let rendered = engine.render_assignment(&data).unwrap();
        for field in ["Jane Doe", "nurse", "Pat Example", "P1", "initial"] {
            assert!(rendered.html.contains(field), "html missing {field}");
            assert!(rendered.text.contains(field), "text missing {field}");
        }
        assert_eq!(rendered.subject, "New patient assignment: Pat Example");
    }

    #[test]
    fn emergency_render_contains_every_field_in_both_bodies() {
        let engine = TemplateEngine::new().unwrap();
        let data = EmergencyEmailData {
            staff_name: "Greg House".into(),
            patient_name: "Pat Example".into(),
            patient_id: "P1".into(),
            severity: "critical".into(),
            description: "Severe chest pain".into(),
            location: "Room 12".into(),
        };

        let rendered = engine.render_emergency(&data).unwrap();
        for field in [
            "Greg House",
            "Pat Example",
            "P1",
            "critical",
            "Severe chest pain",
            "Room 12",
        ] {
            assert!(rendered.html.contains(field), "html missing {field}");
            assert!(rendered.text.contains(field), "text missing {field}");
        }
        assert!(rendered.subject.starts_with("EMERGENCY"));
    }

    #[test]
    fn progress_render_contains_every_field_in_both_bodies() {
        let engine = TemplateEngine::new().unwrap();
        let data = ProgressEmailData {
            staff_name: "Bob Buddy".into(),
            patient_name: "Pat Example".into(),
            patient_id: "P1".into(),
            progress_summary: "Walked 500m unassisted".into(),
        };

        let rendered = engine.render_progress(&data).unwrap();
        for field in ["Bob Buddy", "Pat Example", "P1", "Walked 500m unassisted"] {
            assert!(rendered.html.contains(field), "html missing {field}");
            assert!(rendered.text.contains(field), "text missing {field}");
        }
    }

    #[test]
    fn rendering_is_deterministic() {
        let engine = TemplateEngine::new().unwrap();
        let data = ProgressEmailData {
            staff_name: "Bob".into(),
            patient_name: "Pat".into(),
            patient_id: "P1".into(),
            progress_summary: "Stable".into(),
        };

        let first = engine.render_progress(&data).unwrap();
        let second = engine.render_progress(&data).unwrap();
        assert_eq!(first.html, second.html);
        assert_eq!(first.text, second.text);
        assert_eq!(first.subject, second.subject);
    }
}
