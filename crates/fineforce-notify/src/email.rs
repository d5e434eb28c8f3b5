//! HTML body of the violation notice.

use std::fmt::Write;

use fineforce_core::format_inr;

use crate::NotificationPayload;

const STYLE: &str = "\
body { font-family: -apple-system, BlinkMacSystemFont, \"Segoe UI\", Roboto, Helvetica, Arial, sans-serif; \
line-height: 1.6; color: #333; max-width: 600px; margin: 20px auto; border: 1px solid #ddd; padding: 20px; \
border-radius: 8px; }
h2 { color: #d9534f; }
ul { list-style-type: none; padding: 0; }
li { background-color: #f9f9f9; border: 1px solid #eee; padding: 10px; margin-bottom: 8px; border-radius: 4px; }
strong { color: #555; }
.qr-code { text-align: center; margin-top: 20px; }
.footer { margin-top: 30px; font-size: 0.9em; color: #777; }";

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Render the notice sent to the vehicle owner.
pub fn render_email_html(payload: &NotificationPayload) -> String {
    let v = &payload.violation;
    let rows = [
        ("Vehicle Number", escape(&v.vehicle_number)),
        ("Violation Type", escape(v.violation_type.label())),
        ("Date &amp; Time", escape(&v.display_date())),
        ("Location", escape(&v.location)),
        ("Description", escape(&v.description)),
        ("Fine Amount", format!("₹{}", format_inr(u64::from(v.fine)))),
    ];

    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"UTF-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n");
    html.push_str("<title>Traffic Violation Notice</title>\n");
    let _ = writeln!(html, "<style>\n{STYLE}\n</style>\n</head>\n<body>");
    html.push_str("<h2>Official Traffic Violation Notice</h2>\n<p>Dear Citizen,</p>\n");
    html.push_str(
        "<p>A traffic violation has been recorded for a vehicle associated with this email \
         address. Please review the details below:</p>\n<ul>\n",
    );
    for (label, value) in rows {
        let _ = writeln!(html, "<li><strong>{label}:</strong> {value}</li>");
    }
    html.push_str("</ul>\n<div class=\"qr-code\">\n");
    html.push_str(
        "<p>To ensure a swift resolution, please pay the fine using the QR code below with any \
         UPI-enabled payment app.</p>\n",
    );
    let _ = writeln!(
        html,
        "<img src=\"{}\" alt=\"Payment QR Code\">\n</div>",
        escape(&payload.qr_code_url)
    );
    let _ = writeln!(
        html,
        "<p class=\"footer\">This is an automated notification from the FineForce system. \
         For any disputes, please visit our portal with your violation ID: {}.<br>\
         Thank you for your cooperation in keeping our roads safe.</p>",
        escape(&v.id)
    );
    html.push_str("</body>\n</html>\n");
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::sample_payload;

    #[test]
    fn notice_lists_violation_details() {
        let html = render_email_html(&sample_payload());
        assert!(html.contains("<strong>Vehicle Number:</strong> KA 01 MJ 4455"));
        assert!(html.contains("<strong>Violation Type:</strong> Triple Riding"));
        assert!(html.contains("<strong>Fine Amount:</strong> ₹1,200"));
        let when = sample_payload().violation.display_date();
        assert!(html.contains(&when));
        assert!(html.contains("violation ID: ABC123."));
        assert!(html.contains("<img src=\"data:image/svg+xml;base64,PHN2Zy8+\""));
    }

    #[test]
    fn values_are_escaped() {
        let html = render_email_html(&sample_payload());
        assert!(html.contains("MG Road &amp; &lt;Brigade&gt;"));
        assert!(!html.contains("<Brigade>"));
    }

    #[test]
    fn large_fines_use_indian_grouping() {
        let mut payload = sample_payload();
        payload.violation.fine = 1_250_000;
        assert!(render_email_html(&payload).contains("₹12,50,000"));
    }
}
