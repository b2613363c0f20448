//! Contract interfaces read by the comparator.

use alloy_sol_types::sol;

sol! {
    interface IMarket {
        function borrowController() external view returns (address);
        function oracle() external view returns (address);
        function collateral() external view returns (address);
        function collateralFactorBps() external view returns (uint256);
        function liquidationIncentiveBps() external view returns (uint256);
        function liquidationFeeBps() external view returns (uint256);
        function debts(address user) external view returns (uint256);
        function getCollateralValue(address user) external view returns (uint256);
        function getCreditLimit(address user) external view returns (uint256);

        event Borrow(address indexed account, uint256 amount);
    }

    interface IOracle {
        function getPrice(address token, uint256 collateralFactorBps) external view returns (uint256);
    }

    interface IBorrowController {
        function dailyLimits(address market) external view returns (uint256);
        function minDebts(address market) external view returns (uint256);
    }

    interface IERC20Metadata {
        function decimals() external view returns (uint8);
        function name() external view returns (string);
        function symbol() external view returns (string);
    }

    interface IDbr {
        function markets(address market) external view returns (bool);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::keccak256;
    use alloy_sol_types::{SolCall, SolEvent};

    #[test]
    fn test_borrow_topic_is_keccak_of_signature() {
        assert_eq!(
            IMarket::Borrow::SIGNATURE_HASH,
            keccak256("Borrow(address,uint256)")
        );
    }

    #[test]
    fn test_selectors_match_signatures() {
        assert_eq!(
            IMarket::collateralFactorBpsCall::SELECTOR.as_slice(),
            &keccak256("collateralFactorBps()")[..4]
        );
        assert_eq!(
            IOracle::getPriceCall::SELECTOR.as_slice(),
            &keccak256("getPrice(address,uint256)")[..4]
        );
    }
}
