//! Text of the signature block drawn on the last page.

use super::params::FinalizationParams;

#[derive(Debug, Clone, PartialEq)]
pub struct SignatureLine {
    pub text: String,
    pub bold: bool,
}

impl SignatureLine {
    fn regular(text: impl Into<String>) -> Self {
        SignatureLine {
            text: text.into(),
            bold: false,
        }
    }

    fn bold(text: impl Into<String>) -> Self {
        SignatureLine {
            text: text.into(),
            bold: true,
        }
    }
}

/// Lines of the signature block, top to bottom.
///
/// Companies sign through a representative on behalf of the board; a
/// proprietorship signs in its own name. Optional contact lines appear only
/// when filled in, the date line always does.
pub fn signature_lines(params: &FinalizationParams) -> Vec<SignatureLine> {
    let mut lines = Vec::new();
    if params.is_proprietorship() {
        lines.push(SignatureLine::bold(params.name.trim()));
    } else {
        for value in [&params.representative, &params.post] {
            if !value.trim().is_empty() {
                lines.push(SignatureLine::regular(value.trim()));
            }
        }
        lines.push(SignatureLine::regular("For and on behalf of"));
        lines.push(SignatureLine::regular("The Board of Directors"));
        lines.push(SignatureLine::bold(params.name.trim()));
        lines.push(SignatureLine::regular("Authorized Signatory"));
    }

    if !params.tax_id.trim().is_empty() {
        lines.push(SignatureLine::regular(format!("PAN: {}", params.tax_id.trim())));
    }
    lines.push(SignatureLine::regular(format!("Date: {}", params.date.trim())));
    for (label, value) in [
        ("Address", &params.address),
        ("Email", &params.email),
        ("Phone", &params.phone),
    ] {
        if !value.trim().is_empty() {
            lines.push(SignatureLine::regular(format!("{label}: {}", value.trim())));
        }
    }
    lines
}
