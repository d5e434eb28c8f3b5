//! Payment links and the QR code printed on each notice.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use qrcode::QrCode;
use qrcode::render::svg;
use url::Url;

use crate::NotifyError;

pub const DEFAULT_PAYMENT_BASE: &str = "https://fineforce.demo/pay";

/// Minimum rendered edge of the payment code, in pixels.
pub const QR_SIZE: u32 = 200;

/// `<base>?id=<violation id>`, keeping any query the base already has.
pub fn payment_url(base: &str, violation_id: &str) -> Result<String, NotifyError> {
    let mut url = Url::parse(base)?;
    url.query_pairs_mut().append_pair("id", violation_id);
    Ok(url.into())
}

/// Encode `url` as a QR code and return it as an SVG data URL.
pub fn payment_qr_data_url(url: &str) -> Result<String, NotifyError> {
    let code = QrCode::new(url.as_bytes())?;
    let image = code
        .render::<svg::Color>()
        .min_dimensions(QR_SIZE, QR_SIZE)
        .dark_color(svg::Color("#000000"))
        .light_color(svg::Color("#ffffff"))
        .build();
    Ok(format!(
        "data:image/svg+xml;base64,{}",
        STANDARD.encode(image.as_bytes())
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_carries_violation_id() {
        assert_eq!(
            payment_url(DEFAULT_PAYMENT_BASE, "ABC123").unwrap(),
            "https://fineforce.demo/pay?id=ABC123"
        );
        assert_eq!(
            payment_url("https://pay.example/v1?src=mail", "a b").unwrap(),
            "https://pay.example/v1?src=mail&id=a+b"
        );
        assert!(payment_url("not a url", "x").is_err());
    }

    #[test]
    fn qr_is_svg_data_url() {
        let data_url = payment_qr_data_url("https://fineforce.demo/pay?id=ABC123").unwrap();
        let encoded = data_url.strip_prefix("data:image/svg+xml;base64,").unwrap();
        let svg = String::from_utf8(STANDARD.decode(encoded).unwrap()).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("#000000"));
    }
}
