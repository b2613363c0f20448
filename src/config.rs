use crate::comparator::KnownContracts;
use crate::domain::resolve_checksum_address;
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub rpc_mainnet: String,
    pub rpc_fork: Option<String>,
    pub fork_rpc_url_template: String,
    pub etherscan_api_key: String,
    pub etherscan_api_url: String,
    pub etherscan_chain_id: u64,
    pub etherscan_page_delay: Duration,
    pub coingecko_api_key: Option<String>,
    pub coingecko_api_url: String,
    pub coingecko_platform: String,
    pub price_rate_limit_retries: u32,
    pub price_rate_limit_delay: Duration,
    pub contracts: KnownContracts,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnv(String),
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_map(std::env::vars().collect())
    }

    pub fn from_env_map(env_map: HashMap<String, String>) -> Result<Self, ConfigError> {
        let get = |key: &str| env_map.get(key).filter(|v| !v.is_empty()).cloned();
        let get_or = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_string());

        let host = get_or("HOST", "0.0.0.0");
        let port = parse_number::<u16>(&env_map, "PORT", 5000)?;

        let rpc_mainnet = match get("RPC_MAINNET") {
            Some(url) => url,
            None => {
                let key = get("ALCHEMY_API_KEY")
                    .ok_or_else(|| ConfigError::MissingEnv("ALCHEMY_API_KEY".to_string()))?;
                format!("https://eth-mainnet.g.alchemy.com/v2/{}", key)
            }
        };

        let etherscan_api_key = get("ETHERSCAN_API_KEY")
            .ok_or_else(|| ConfigError::MissingEnv("ETHERSCAN_API_KEY".to_string()))?;

        let defaults = KnownContracts::default();
        let contracts = KnownContracts {
            newest_borrow_controller: parse_address(
                &env_map,
                "NEWEST_BORROW_CONTROLLER",
                defaults.newest_borrow_controller,
            )?,
            newest_oracle: parse_address(&env_map, "NEWEST_ORACLE", defaults.newest_oracle)?,
            dbr: parse_address(&env_map, "DBR_ADDRESS", defaults.dbr)?,
        };

        Ok(Config {
            host,
            port,
            rpc_mainnet,
            rpc_fork: get("RPC_TENDERLY"),
            fork_rpc_url_template: get_or(
                "FORK_RPC_URL_TEMPLATE",
                "https://virtual.mainnet.rpc.tenderly.co/{vnet_id}",
            ),
            etherscan_api_key,
            etherscan_api_url: get_or("ETHERSCAN_API_URL", "https://api.etherscan.io/v2/api"),
            etherscan_chain_id: parse_number::<u64>(&env_map, "ETHERSCAN_CHAIN_ID", 1)?,
            etherscan_page_delay: Duration::from_millis(parse_number::<u64>(
                &env_map,
                "ETHERSCAN_PAGE_DELAY_MS",
                250,
            )?),
            coingecko_api_key: get("COINGECKO_API_KEY"),
            coingecko_api_url: get_or("COINGECKO_API_URL", "https://pro-api.coingecko.com/api/v3"),
            coingecko_platform: get_or("COINGECKO_PLATFORM", "ethereum"),
            price_rate_limit_retries: parse_number::<u32>(&env_map, "PRICE_RATE_LIMIT_RETRIES", 4)?,
            price_rate_limit_delay: Duration::from_secs(parse_number::<u64>(
                &env_map,
                "PRICE_RATE_LIMIT_DELAY_SECS",
                60,
            )?),
            contracts,
        })
    }
}

fn parse_number<T: std::str::FromStr>(
    env_map: &HashMap<String, String>,
    key: &str,
    default: T,
) -> Result<T, ConfigError> {
    match env_map.get(key).filter(|v| !v.is_empty()) {
        Some(raw) => raw.trim().parse::<T>().map_err(|_| {
            ConfigError::InvalidValue(key.to_string(), format!("not a valid number: {}", raw))
        }),
        None => Ok(default),
    }
}

fn parse_address(
    env_map: &HashMap<String, String>,
    key: &str,
    default: alloy_primitives::Address,
) -> Result<alloy_primitives::Address, ConfigError> {
    match env_map.get(key).filter(|v| !v.is_empty()) {
        Some(raw) => resolve_checksum_address(raw.trim())
            .map_err(|e| ConfigError::InvalidValue(key.to_string(), e.to_string())),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_required_env() -> HashMap<String, String> {
        let mut map = HashMap::new();
        map.insert("ALCHEMY_API_KEY".to_string(), "alchemy-key".to_string());
        map.insert("ETHERSCAN_API_KEY".to_string(), "etherscan-key".to_string());
        map
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_env_map(setup_required_env()).unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 5000);
        assert_eq!(
            config.rpc_mainnet,
            "https://eth-mainnet.g.alchemy.com/v2/alchemy-key"
        );
        assert_eq!(config.rpc_fork, None);
        assert_eq!(config.etherscan_chain_id, 1);
        assert_eq!(config.etherscan_page_delay, Duration::from_millis(250));
        assert_eq!(config.coingecko_api_key, None);
        assert_eq!(config.price_rate_limit_retries, 4);
        assert_eq!(config.price_rate_limit_delay, Duration::from_secs(60));
        assert_eq!(config.contracts, KnownContracts::default());
    }

    #[test]
    fn test_explicit_rpc_mainnet_needs_no_alchemy_key() {
        let mut env_map = setup_required_env();
        env_map.remove("ALCHEMY_API_KEY");
        env_map.insert("RPC_MAINNET".to_string(), "http://localhost:8545".to_string());
        let config = Config::from_env_map(env_map).unwrap();
        assert_eq!(config.rpc_mainnet, "http://localhost:8545");
    }

    #[test]
    fn test_missing_alchemy_key() {
        let mut env_map = setup_required_env();
        env_map.remove("ALCHEMY_API_KEY");
        match Config::from_env_map(env_map) {
            Err(ConfigError::MissingEnv(s)) => assert_eq!(s, "ALCHEMY_API_KEY"),
            _ => panic!("Expected MissingEnv error"),
        }
    }

    #[test]
    fn test_missing_etherscan_key() {
        let mut env_map = setup_required_env();
        env_map.remove("ETHERSCAN_API_KEY");
        match Config::from_env_map(env_map) {
            Err(ConfigError::MissingEnv(s)) => assert_eq!(s, "ETHERSCAN_API_KEY"),
            _ => panic!("Expected MissingEnv error"),
        }
    }

    #[test]
    fn test_invalid_port() {
        let mut env_map = setup_required_env();
        env_map.insert("PORT".to_string(), "not_a_number".to_string());
        match Config::from_env_map(env_map) {
            Err(ConfigError::InvalidValue(k, _)) => assert_eq!(k, "PORT"),
            _ => panic!("Expected InvalidValue error"),
        }
    }

    #[test]
    fn test_invalid_contract_override() {
        let mut env_map = setup_required_env();
        env_map.insert("NEWEST_ORACLE".to_string(), "0x1234".to_string());
        match Config::from_env_map(env_map) {
            Err(ConfigError::InvalidValue(k, _)) => assert_eq!(k, "NEWEST_ORACLE"),
            _ => panic!("Expected InvalidValue error"),
        }
    }

    #[test]
    fn test_empty_values_fall_back_to_defaults() {
        let mut env_map = setup_required_env();
        env_map.insert("COINGECKO_API_KEY".to_string(), String::new());
        env_map.insert("PORT".to_string(), String::new());
        let config = Config::from_env_map(env_map).unwrap();
        assert_eq!(config.coingecko_api_key, None);
        assert_eq!(config.port, 5000);
    }
}
