pub mod model;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::OsintConfig;
use crate::error::BotResult;

use model::{
    AadhaarData, FampayData, LookupEnvelope, NumberData, PincodeData, VehicleData,
};

/// The closed set of lookups the bot proxies. Each variant knows its API
/// endpoint, argument shape, and menu wiring, so dispatch never has to poke
/// at strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LookupKind {
    Number,
    Vehicle,
    Pincode,
    Fampay,
    Aadhaar,
}

impl LookupKind {
    pub const ALL: [LookupKind; 5] = [
        LookupKind::Number,
        LookupKind::Vehicle,
        LookupKind::Pincode,
        LookupKind::Fampay,
        LookupKind::Aadhaar,
    ];

    pub fn path(&self) -> &'static str {
        match self {
            LookupKind::Number => "indian-number",
            LookupKind::Vehicle => "vehicle",
            LookupKind::Pincode => "pincode",
            LookupKind::Fampay => "fampay",
            LookupKind::Aadhaar => "aadhaar",
        }
    }

    pub fn query_param(&self) -> &'static str {
        match self {
            LookupKind::Number | LookupKind::Aadhaar => "num",
            LookupKind::Vehicle => "rc",
            LookupKind::Pincode => "pin",
            LookupKind::Fampay => "id",
        }
    }

    /// FamPay and Aadhaar are never served from the free quota.
    pub fn premium_only(&self) -> bool {
        matches!(self, LookupKind::Fampay | LookupKind::Aadhaar)
    }

    pub fn title(&self) -> &'static str {
        match self {
            LookupKind::Number => "Indian Number",
            LookupKind::Vehicle => "Vehicle",
            LookupKind::Pincode => "Pincode",
            LookupKind::Fampay => "FamPay",
            LookupKind::Aadhaar => "Aadhaar",
        }
    }

    pub fn button_label(&self) -> &'static str {
        match self {
            LookupKind::Number => "📱 Indian Number",
            LookupKind::Vehicle => "🚗 Vehicle RC",
            LookupKind::Pincode => "📮 Pincode",
            LookupKind::Fampay => "💳 FamPay",
            LookupKind::Aadhaar => "🪪 Aadhaar",
        }
    }

    /// Exact label match only; no substring probing.
    pub fn from_button(label: &str) -> Option<LookupKind> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.button_label() == label)
    }

    pub fn prompt(&self) -> &'static str {
        match self {
            LookupKind::Number => "📱 Send the 10-digit Indian phone number to look up",
            LookupKind::Vehicle => "🚗 Send the vehicle RC number to look up",
            LookupKind::Pincode => "📮 Send the 6-digit pincode to look up",
            LookupKind::Fampay => "💳 Send the FamPay ID to look up (ends with @fam)",
            LookupKind::Aadhaar => "🪪 Send the 12-digit Aadhaar number to look up",
        }
    }

    /// Argument shape check. `Err` carries the user-facing usage hint.
    pub fn validate(&self, arg: &str) -> Result<(), &'static str> {
        let ok = match self {
            LookupKind::Number => is_digits(arg, 10),
            LookupKind::Vehicle => !arg.is_empty(),
            LookupKind::Pincode => is_digits(arg, 6),
            LookupKind::Fampay => arg.contains("@fam"),
            LookupKind::Aadhaar => is_digits(arg, 12),
        };
        if ok {
            Ok(())
        } else {
            Err(self.usage_hint())
        }
    }

    pub fn usage_hint(&self) -> &'static str {
        match self {
            LookupKind::Number => {
                "📱 <b>Usage:</b> <code>/number 9876543210</code>\n\n\
                 <i>Enter a valid 10-digit Indian phone number</i>"
            }
            LookupKind::Vehicle => {
                "🚗 <b>Usage:</b> <code>/vehicle UP26R4007</code>\n\n\
                 <i>Enter a valid vehicle RC number</i>"
            }
            LookupKind::Pincode => {
                "📮 <b>Usage:</b> <code>/pincode 560001</code>\n\n\
                 <i>Enter a valid 6-digit pincode</i>"
            }
            LookupKind::Fampay => {
                "💳 <b>Usage:</b> <code>/fampay loverajoriya@fam</code>\n\n\
                 <i>Enter a valid FamPay ID (ends with @fam)</i>"
            }
            LookupKind::Aadhaar => {
                "🪪 <b>Usage:</b> <code>/aadhaar 413129678885</code>\n\n\
                 <i>Enter a valid 12-digit Aadhaar number</i>"
            }
        }
    }

    pub fn error_text(&self) -> String {
        format!(
            "❌ <b>Error fetching {} details</b>\n\n<i>Please try again later</i>",
            self.title()
        )
    }
}

fn is_digits(arg: &str, len: usize) -> bool {
    arg.len() == len && arg.bytes().all(|b| b.is_ascii_digit())
}

#[derive(Clone)]
pub struct OsintClient {
    http: reqwest::Client,
    base_url: Url,
}

impl OsintClient {
    pub fn new(config: &OsintConfig) -> BotResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .connect_timeout(std::time::Duration::from_secs(10))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.clone(),
        })
    }

    /// Runs one lookup and renders the report. Every upstream field is
    /// optional; missing data renders as `N/A` rather than failing.
    pub async fn lookup(&self, kind: LookupKind, arg: &str) -> BotResult<String> {
        Ok(match kind {
            LookupKind::Number => {
                let envelope: LookupEnvelope<NumberData> = self.fetch(kind, arg).await?;
                model::format_number(arg, &envelope)
            }
            LookupKind::Vehicle => {
                let envelope: LookupEnvelope<VehicleData> = self.fetch(kind, arg).await?;
                model::format_vehicle(arg, &envelope)
            }
            LookupKind::Pincode => {
                let envelope: LookupEnvelope<PincodeData> = self.fetch(kind, arg).await?;
                model::format_pincode(arg, &envelope)
            }
            LookupKind::Fampay => {
                let envelope: LookupEnvelope<FampayData> = self.fetch(kind, arg).await?;
                model::format_fampay(&envelope)
            }
            // The Aadhaar endpoint answers with a flat object, no `data`
            // envelope like the others.
            LookupKind::Aadhaar => {
                let data: AadhaarData = self.fetch(kind, arg).await?;
                model::format_aadhaar(arg, &data)
            }
        })
    }

    async fn fetch<T: serde::de::DeserializeOwned>(
        &self,
        kind: LookupKind,
        arg: &str,
    ) -> BotResult<T> {
        let mut url = Url::parse(&format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            kind.path()
        ))?;
        url.query_pairs_mut().append_pair(kind.query_param(), arg);

        debug!("OSINT request: GET {}/{}", self.base_url, kind.path());

        let response = self.http.get(url).send().await?.error_for_status()?;
        Ok(response.json::<T>().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn number_requires_ten_digits() {
        assert!(LookupKind::Number.validate("9876543210").is_ok());
        assert!(LookupKind::Number.validate("98765").is_err());
        assert!(LookupKind::Number.validate("987654321x").is_err());
    }

    #[test]
    fn pincode_requires_six_digits() {
        assert!(LookupKind::Pincode.validate("560001").is_ok());
        assert!(LookupKind::Pincode.validate("5600").is_err());
    }

    #[test]
    fn fampay_requires_marker() {
        assert!(LookupKind::Fampay.validate("alice@fam").is_ok());
        assert!(LookupKind::Fampay.validate("alice").is_err());
    }

    #[test]
    fn aadhaar_requires_twelve_digits() {
        assert!(LookupKind::Aadhaar.validate("413129678885").is_ok());
        assert!(LookupKind::Aadhaar.validate("4131296788").is_err());
    }

    #[test]
    fn vehicle_requires_non_empty() {
        assert!(LookupKind::Vehicle.validate("UP26R4007").is_ok());
        assert!(LookupKind::Vehicle.validate("").is_err());
    }

    #[test]
    fn only_fampay_and_aadhaar_are_premium() {
        assert!(LookupKind::Fampay.premium_only());
        assert!(LookupKind::Aadhaar.premium_only());
        assert!(!LookupKind::Number.premium_only());
        assert!(!LookupKind::Vehicle.premium_only());
        assert!(!LookupKind::Pincode.premium_only());
    }

    #[test]
    fn button_labels_match_exactly() {
        assert_eq!(
            LookupKind::from_button("🚗 Vehicle RC"),
            Some(LookupKind::Vehicle)
        );
        // Substrings must not match.
        assert_eq!(LookupKind::from_button("Vehicle"), None);
        assert_eq!(LookupKind::from_button("🚗 Vehicle RC lookup"), None);
    }
}
