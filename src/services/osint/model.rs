//! Response shapes of the OSINT API. The upstream service is duck-typed, so
//! every field is optional and rendering falls back to `N/A` instead of
//! propagating missing keys as errors.

use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Default, Deserialize)]
pub struct LookupEnvelope<T> {
    #[serde(default)]
    pub data: Option<T>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct NumberData {
    pub operator: Option<String>,
    pub circle: Option<String>,
    pub state: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct VehicleData {
    #[serde(rename = "Ownership Details")]
    pub owner: Option<VehicleOwner>,
    #[serde(rename = "Vehicle Details")]
    pub vehicle: Option<VehicleInfo>,
    #[serde(rename = "Important Dates & Validity")]
    pub validity: Option<VehicleValidity>,
}

#[derive(Debug, Default, Deserialize)]
pub struct VehicleOwner {
    #[serde(rename = "Owner Name")]
    pub name: Option<String>,
    #[serde(rename = "Father's Name")]
    pub father: Option<String>,
    #[serde(rename = "Registered RTO")]
    pub rto: Option<String>,
    #[serde(rename = "Registration Date")]
    pub registration_date: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct VehicleInfo {
    #[serde(rename = "Model Name")]
    pub model: Option<String>,
    #[serde(rename = "Vehicle Class")]
    pub class: Option<String>,
    #[serde(rename = "Fuel Type")]
    pub fuel: Option<String>,
    #[serde(rename = "Engine Number")]
    pub engine: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct VehicleValidity {
    #[serde(rename = "Fitness Upto")]
    pub fitness: Option<String>,
    #[serde(rename = "Insurance Upto")]
    pub insurance: Option<String>,
    #[serde(rename = "PUC Upto")]
    pub puc: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PincodeData {
    #[serde(default)]
    pub offices: Vec<PostOffice>,
    pub count: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PostOffice {
    pub name: Option<String>,
    pub district: Option<String>,
    pub state: Option<String>,
    #[serde(rename = "deliveryStatus")]
    pub delivery_status: Option<String>,
    #[serde(rename = "branchType")]
    pub branch_type: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct FampayData {
    /// Upstream sends whatever it feels like here; anything truthy counts.
    pub status: Option<Value>,
    pub fam_id: Option<String>,
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub phone: Option<String>,
}

impl FampayData {
    pub fn is_active(&self) -> bool {
        match &self.status {
            Some(Value::Bool(active)) => *active,
            Some(Value::String(s)) => !s.is_empty(),
            Some(Value::Number(n)) => n.as_i64() != Some(0),
            _ => false,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct AadhaarData {
    pub name: Option<String>,
    pub gender: Option<String>,
    pub dob: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

fn na(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("N/A")
}

fn footer(timestamp: &Option<String>) -> String {
    match timestamp {
        Some(ts) => format!("\n🕒 {ts}"),
        None => String::new(),
    }
}

pub fn format_number(number: &str, envelope: &LookupEnvelope<NumberData>) -> String {
    let mut out = format!("📱 <b>Indian Number Details</b>\n\n<b>Number:</b> {number}\n");

    match &envelope.data {
        Some(data) => {
            out += &format!("<b>Operator:</b> {}\n", na(&data.operator));
            out += &format!("<b>Circle:</b> {}\n", na(&data.circle));
            out += &format!("<b>State:</b> {}\n", na(&data.state));
            out += &format!("<b>Type:</b> {}\n", na(&data.kind));
        }
        None => out += "<i>Information not available</i>\n",
    }

    out + &footer(&envelope.timestamp)
}

pub fn format_vehicle(rc: &str, envelope: &LookupEnvelope<VehicleData>) -> String {
    let mut out = format!("🚗 <b>Vehicle Details</b>\n\n<b>RC Number:</b> {rc}\n");

    if let Some(data) = &envelope.data {
        let owner = data.owner.as_ref();
        let vehicle = data.vehicle.as_ref();
        let validity = data.validity.as_ref();

        out += "\n👤 <b>Owner Information</b>\n";
        out += &format!("<b>• Name:</b> {}\n", owner.map_or("N/A", |o| na(&o.name)));
        out += &format!(
            "<b>• Father:</b> {}\n",
            owner.map_or("N/A", |o| na(&o.father))
        );
        out += &format!("<b>• RTO:</b> {}\n", owner.map_or("N/A", |o| na(&o.rto)));

        out += "\n🚘 <b>Vehicle Information</b>\n";
        out += &format!(
            "<b>• Model:</b> {}\n",
            vehicle.map_or("N/A", |v| na(&v.model))
        );
        out += &format!(
            "<b>• Type:</b> {}\n",
            vehicle.map_or("N/A", |v| na(&v.class))
        );
        out += &format!("<b>• Fuel:</b> {}\n", vehicle.map_or("N/A", |v| na(&v.fuel)));
        let engine = vehicle
            .and_then(|v| v.engine.as_deref())
            .map(|e| format!("{}...", e.chars().take(10).collect::<String>()))
            .unwrap_or_else(|| "N/A".to_string());
        out += &format!("<b>• Engine:</b> {engine}\n");

        out += "\n📅 <b>Validity Information</b>\n";
        out += &format!(
            "<b>• Registration:</b> {}\n",
            owner.map_or("N/A", |o| na(&o.registration_date))
        );
        out += &format!(
            "<b>• Fitness Upto:</b> {}\n",
            validity.map_or("N/A", |v| na(&v.fitness))
        );
        out += &format!(
            "<b>• Insurance Upto:</b> {}\n",
            validity.map_or("N/A", |v| na(&v.insurance))
        );
        out += &format!(
            "<b>• PUC Upto:</b> {}\n",
            validity.map_or("N/A", |v| na(&v.puc))
        );
    } else {
        out += "<i>Information not available</i>\n";
    }

    out + &footer(&envelope.timestamp)
}

pub fn format_pincode(pin: &str, envelope: &LookupEnvelope<PincodeData>) -> String {
    let mut out = format!("📮 <b>Pincode Details</b>\n\n<b>Pincode:</b> {pin}\n");

    match envelope.data.as_ref().filter(|d| !d.offices.is_empty()) {
        Some(data) => {
            let office = &data.offices[0];
            out += &format!("<b>• City:</b> {}\n", na(&office.district));
            out += &format!("<b>• State:</b> {}\n", na(&office.state));
            out += &format!("<b>• Post Office:</b> {}\n", na(&office.name));
            out += &format!("<b>• Delivery:</b> {}\n", na(&office.delivery_status));
            out += &format!("<b>• Branch Type:</b> {}\n", na(&office.branch_type));

            if data.count.unwrap_or(0) > 1 {
                out += &format!(
                    "\n📊 <i>Total {} post offices found</i>\n",
                    data.count.unwrap_or(0)
                );
            }
        }
        None => out += "<i>Information not available</i>\n",
    }

    out + &footer(&envelope.timestamp)
}

pub fn format_fampay(envelope: &LookupEnvelope<FampayData>) -> String {
    let mut out = "💳 <b>FamPay Details</b>\n\n".to_string();

    match envelope.data.as_ref().filter(|d| d.is_active()) {
        Some(data) => {
            out += &format!("<b>• Fam ID:</b> {}\n", na(&data.fam_id));
            out += &format!("<b>• Name:</b> {}\n", na(&data.name));
            out += &format!("<b>• Type:</b> {}\n", na(&data.kind));
            out += "<b>• Status:</b> ✅ Active\n";

            // Mask everything from the '@' on before echoing the phone field.
            if let Some(phone) = data.phone.as_deref().filter(|p| p.contains('@')) {
                let visible = phone.split('@').next().unwrap_or("");
                out += &format!("<b>• Phone:</b> {visible}...\n");
            }
        }
        None => out += "<b>Status:</b> ❌ Not found or inactive\n",
    }

    out + &footer(&envelope.timestamp)
}

pub fn format_aadhaar(number: &str, data: &AadhaarData) -> String {
    let mut out = format!("🪪 <b>Aadhaar Details</b>\n\n<b>Aadhaar:</b> {number}\n");

    if data.name.as_deref().is_some_and(|name| name != "N/A") {
        out += &format!("<b>• Name:</b> {}\n", na(&data.name));
        out += &format!("<b>• Gender:</b> {}\n", na(&data.gender));
        out += &format!("<b>• DOB:</b> {}\n", na(&data.dob));
        out += &format!("<b>• Phone:</b> {}\n", na(&data.phone));
        out += &format!("<b>• Email:</b> {}\n", na(&data.email));
        out += &format!("<b>• Address:</b> {}\n", na(&data.address));
    } else {
        out += "<i>Information not publicly available</i>\n";
    }

    out += "\n⚠️ <b>Authorized use only</b>\n";
    out + &footer(&data.timestamp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn number_report_defaults_missing_fields_to_na() {
        let envelope: LookupEnvelope<NumberData> = serde_json::from_value(json!({
            "data": { "operator": "Airtel" },
            "timestamp": "12:00"
        }))
        .unwrap();

        let report = format_number("9876543210", &envelope);
        assert!(report.contains("<b>Operator:</b> Airtel"));
        assert!(report.contains("<b>Circle:</b> N/A"));
        assert!(report.contains("🕒 12:00"));
    }

    #[test]
    fn number_report_without_data_block() {
        let envelope: LookupEnvelope<NumberData> = serde_json::from_value(json!({})).unwrap();
        let report = format_number("9876543210", &envelope);
        assert!(report.contains("Information not available"));
    }

    #[test]
    fn vehicle_report_truncates_engine_number() {
        let envelope: LookupEnvelope<VehicleData> = serde_json::from_value(json!({
            "data": {
                "Vehicle Details": { "Engine Number": "ABCDEFGHIJKLMNOP" }
            }
        }))
        .unwrap();

        let report = format_vehicle("UP26R4007", &envelope);
        assert!(report.contains("<b>• Engine:</b> ABCDEFGHIJ...\n"));
        assert!(report.contains("<b>• Name:</b> N/A"));
    }

    #[test]
    fn pincode_report_notes_multiple_offices() {
        let envelope: LookupEnvelope<PincodeData> = serde_json::from_value(json!({
            "data": {
                "offices": [{ "name": "Bangalore GPO", "district": "Bangalore" }],
                "count": 12
            }
        }))
        .unwrap();

        let report = format_pincode("560001", &envelope);
        assert!(report.contains("Bangalore GPO"));
        assert!(report.contains("Total 12 post offices found"));
    }

    #[test]
    fn fampay_report_masks_phone() {
        let envelope: LookupEnvelope<FampayData> = serde_json::from_value(json!({
            "data": {
                "status": true,
                "fam_id": "alice@fam",
                "phone": "98765@upi"
            }
        }))
        .unwrap();

        let report = format_fampay(&envelope);
        assert!(report.contains("<b>• Phone:</b> 98765...\n"));
        assert!(!report.contains("@upi"));
    }

    #[test]
    fn fampay_inactive_account() {
        let envelope: LookupEnvelope<FampayData> = serde_json::from_value(json!({
            "data": { "status": false }
        }))
        .unwrap();

        assert!(format_fampay(&envelope).contains("Not found or inactive"));
    }

    #[test]
    fn aadhaar_na_sentinel_means_unavailable() {
        let data: AadhaarData = serde_json::from_value(json!({ "name": "N/A" })).unwrap();
        let report = format_aadhaar("413129678885", &data);
        assert!(report.contains("Information not publicly available"));
    }
}
