use super::models::{
    ClientInfo, NormalizedProposal, PricedLineItem, ProposalLineItem, ProposalMeta, ProposalSummary,
};

/// Rounds a currency amount to two decimals, half away from zero.
pub fn round_currency(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// Prices every line item and totals them.
///
/// Values pass through unchecked: negative prices or a discount above the list
/// price are echoed as given. Only the total is rounded.
pub fn normalize(
    client: ClientInfo,
    proposal: ProposalMeta,
    services: Vec<ProposalLineItem>,
) -> NormalizedProposal {
    let services: Vec<PricedLineItem> = services
        .into_iter()
        .map(|item| PricedLineItem {
            final_price: item.final_price(),
            item,
        })
        .collect();
    let total: f64 = services.iter().map(|s| s.final_price).sum();

    NormalizedProposal {
        client,
        proposal,
        summary: ProposalSummary {
            total: round_currency(total),
            count: services.len(),
        },
        services,
    }
}
