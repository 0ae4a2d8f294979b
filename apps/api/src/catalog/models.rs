use serde::{Deserialize, Serialize};

/// A catalog row as returned to clients, with its positional id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceRecord {
    pub id: String,
    pub category: String,
    pub service: String,
    pub price: f64,
    pub billing_cycle: String,
    pub scope_of_work: String,
}

/// Body of `POST /services`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewService {
    pub category: String,
    pub service: String,
    pub price: f64,
    pub billing_cycle: String,
    #[serde(default)]
    pub scope_of_work: Option<String>,
}

impl NewService {
    /// Checks the fields the custom-service form requires.
    pub fn validate(&self) -> Result<(), String> {
        for (field, value) in [
            ("category", &self.category),
            ("service", &self.service),
            ("billingCycle", &self.billing_cycle),
        ] {
            if value.trim().is_empty() {
                return Err(format!("{field} must not be empty"));
            }
        }
        if !self.price.is_finite() {
            return Err("price must be a finite number".to_string());
        }
        Ok(())
    }

    /// Trims every text field the way the catalog reader does, so the id
    /// derived at append time matches the one later reads derive.
    pub fn normalized(self) -> NewService {
        NewService {
            category: self.category.trim().to_string(),
            service: self.service.trim().to_string(),
            price: self.price,
            billing_cycle: self.billing_cycle.trim().to_string(),
            scope_of_work: self.scope_of_work.map(|s| s.trim().to_string()),
        }
    }
}

/// Query string of `GET /services`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServiceFilter {
    /// Free-text query over category, service and scope of work.
    pub q: Option<String>,
    /// Exact category, compared case-insensitively.
    pub category: Option<String>,
}

impl ServiceFilter {
    pub fn matches(&self, record: &ServiceRecord) -> bool {
        if let Some(category) = self.category.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
            if !record.category.eq_ignore_ascii_case(category) {
                return false;
            }
        }
        match self.q.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
            Some(q) => {
                let q = q.to_lowercase();
                [&record.category, &record.service, &record.scope_of_work]
                    .iter()
                    .any(|field| field.to_lowercase().contains(&q))
            }
            None => true,
        }
    }
}

/// Distinct values offered as filters, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Facets {
    pub categories: Vec<String>,
    pub billing_cycles: Vec<String>,
}

impl Facets {
    pub fn from_records(records: &[ServiceRecord]) -> Self {
        let mut facets = Facets::default();
        for record in records {
            push_distinct(&mut facets.categories, &record.category);
            push_distinct(&mut facets.billing_cycles, &record.billing_cycle);
        }
        facets
    }
}

fn push_distinct(values: &mut Vec<String>, value: &str) {
    if !value.is_empty() && !values.iter().any(|v| v == value) {
        values.push(value.to_string());
    }
}
