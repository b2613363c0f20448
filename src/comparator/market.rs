use super::MarketComparator;
use crate::chain::abi::{IDbr, IERC20Metadata};
use crate::chain::ChainCallError;
use crate::domain::{Category, CollateralInfo, Findings, MarketInfo, Network};

/// Market identity: collateral token metadata and DBR registration.
///
/// Never fails as a whole; read failures land in the section's own error
/// fields.
pub(super) async fn check(ctx: &MarketComparator, findings: &mut Findings) -> MarketInfo {
    let collateral = match collateral_details(ctx).await {
        Ok((symbol, name, decimals)) => CollateralInfo {
            address: ctx.collateral,
            symbol: Some(symbol),
            name: Some(name),
            decimals: Some(decimals),
            error: None,
        },
        Err(e) => {
            findings.error(
                Category::Market,
                format!("Failed to get collateral token details: {}", e),
            );
            CollateralInfo {
                address: ctx.collateral,
                symbol: None,
                name: None,
                decimals: None,
                error: Some(e.to_string()),
            }
        }
    };

    let registered = ctx
        .read(
            Network::Live,
            ctx.contracts.dbr,
            IDbr::marketsCall { market: ctx.market },
        )
        .await;

    let (dbr_allowed, dbr_error) = match registered {
        Ok(allowed) => {
            if !allowed {
                findings.error(Category::Market, "Market is NOT allowed in DBR contract");
            }
            (Some(allowed), None)
        }
        Err(e) => {
            findings.error(
                Category::Market,
                format!("Failed to check DBR allowance: {}", e),
            );
            (None, Some(e.to_string()))
        }
    };

    MarketInfo {
        address: ctx.market,
        collateral,
        dbr_allowed,
        dbr_error,
    }
}

async fn collateral_details(
    ctx: &MarketComparator,
) -> Result<(String, String, u8), ChainCallError> {
    let token = ctx.collateral;
    let symbol = ctx
        .read(Network::Live, token, IERC20Metadata::symbolCall {})
        .await?;
    let name = ctx
        .read(Network::Live, token, IERC20Metadata::nameCall {})
        .await?;
    let decimals = ctx.live.collateral_decimals().await?;
    Ok((symbol, name, decimals))
}
