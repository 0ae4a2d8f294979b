use serde::{Deserialize, Serialize};

/// Signatory details sent alongside the proposal upload. Every field
/// defaults to the empty string.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FinalizationParams {
    pub name: String,
    pub date: String,
    pub representative: String,
    pub post: String,
    pub address: String,
    pub email: String,
    pub phone: String,
    pub tax_id: String,
    pub entity_type: String,
}

impl FinalizationParams {
    pub fn is_proprietorship(&self) -> bool {
        self.entity_type.trim().eq_ignore_ascii_case("proprietorship")
    }

    /// `{name}_proposal.pdf`, or `proposal.pdf` without a name.
    pub fn output_filename(&self) -> String {
        match self.name.trim() {
            "" => "proposal.pdf".to_string(),
            name => format!("{name}_proposal.pdf"),
        }
    }
}
