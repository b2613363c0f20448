use super::{CheckError, MarketComparator, MarketSnapshot};
use crate::chain::abi::IOracle;
use crate::domain::{
    Category, Decimal, DecimalError, Findings, Network, OracleInfo, OraclePrice,
    ReferenceComparison,
};
use crate::engine::{assess_deviation, assess_unit_price, reference_deviation, unit_price};
use crate::price::PriceQuote;
use tracing::debug;

/// Oracle identity, the post-change price level and its distance from the
/// reference price.
pub(super) async fn check(
    ctx: &MarketComparator,
    findings: &mut Findings,
) -> Result<OracleInfo, CheckError> {
    let address = ctx.both(MarketSnapshot::oracle).await?;

    let is_newest = address.after == ctx.contracts.newest_oracle;
    if !is_newest {
        findings.warning(Category::Oracle, "Oracle isn't newest implementation");
    }
    if address.changed() {
        findings.info(
            Category::Oracle,
            format!(
                "Oracle address changed from {} to {}",
                address.before, address.after
            ),
        );
    }

    let collateral_factor = ctx.fork.collateral_factor().await?;
    let decimals = ctx.live.collateral_decimals().await?;
    let raw = ctx
        .read(
            Network::Forked,
            address.after,
            IOracle::getPriceCall {
                token: ctx.collateral,
                collateralFactorBps: collateral_factor,
            },
        )
        .await?;

    let unit = unit_price(decimals, raw)?;
    let unit_price_usd = Decimal::from_wad(unit)?;
    debug!("Oracle price {} -> unit price ${}", raw, unit_price_usd);
    findings.record(Category::Oracle, assess_unit_price(unit));

    let reference_comparison = match ctx.prices.lookup(ctx.collateral).await {
        PriceQuote::Available(reference) => match reference_deviation(unit_price_usd, reference) {
            Some(deviation) => {
                findings.record(Category::Oracle, assess_deviation(deviation));
                let deviation_percent = deviation
                    .checked_mul(Decimal::hundred())
                    .ok_or(DecimalError::Arithmetic("deviation percent"))?;
                Some(ReferenceComparison {
                    reference_price_usd: reference,
                    deviation_percent,
                })
            }
            None => {
                findings.warning(
                    Category::Oracle,
                    format!(
                        "Price comparison skipped: reference price ${} is not usable",
                        reference
                    ),
                );
                None
            }
        },
        PriceQuote::Unavailable(reason) => {
            findings.warning(
                Category::Oracle,
                format!("Price comparison skipped: {}", reason),
            );
            None
        }
    };

    Ok(OracleInfo {
        address,
        is_newest,
        price: OraclePrice {
            raw: raw.to_string(),
            unit_price_usd,
        },
        reference_comparison,
    })
}
