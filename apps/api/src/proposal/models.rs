use serde::{Deserialize, Serialize};

/// Client details as entered on the proposal form. Only `name` is ever
/// required, and only for the cover letter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_representative: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_representative_post: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_no: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, rename = "CIN", skip_serializing_if = "Option::is_none")]
    pub cin: Option<String>,
    #[serde(default, rename = "PAN", skip_serializing_if = "Option::is_none")]
    pub pan: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_number: Option<String>,
}

impl ClientInfo {
    /// The client name with surrounding whitespace removed, if not blank.
    pub fn display_name(&self) -> Option<&str> {
        self.name.as_deref().map(str::trim).filter(|n| !n.is_empty())
    }
}

/// Free-form proposal header fields, echoed verbatim.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prepared_for: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prepared_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub para: Option<String>,
}

/// A selected service with optional negotiated pricing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalLineItem {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub service: String,
    #[serde(default)]
    pub billing_cycle: String,
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope_of_work: Option<String>,
    #[serde(default)]
    pub discounted_price: Option<f64>,
    #[serde(
        default,
        rename = "notesfromca",
        alias = "notesFromCa",
        skip_serializing_if = "Option::is_none"
    )]
    pub notes_from_ca: Option<String>,
}

impl ProposalLineItem {
    /// The discounted price when one was negotiated, else the list price.
    pub fn final_price(&self) -> f64 {
        self.discounted_price.unwrap_or(self.price)
    }
}

/// A line item as returned, carrying its effective price.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PricedLineItem {
    #[serde(flatten)]
    pub item: ProposalLineItem,
    pub final_price: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProposalSummary {
    pub total: f64,
    pub count: usize,
}

/// Body of `POST /proposal`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProposalRequest {
    #[serde(default)]
    pub client: ClientInfo,
    #[serde(default)]
    pub proposal: ProposalMeta,
    #[serde(default)]
    pub services: Vec<ProposalLineItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedProposal {
    pub client: ClientInfo,
    pub proposal: ProposalMeta,
    pub services: Vec<PricedLineItem>,
    pub summary: ProposalSummary,
}
