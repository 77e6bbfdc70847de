//! CLI tool for deploying and interacting with the lending engine contracts.

use collend_contracts::collateral_manager::CollateralManager;
use collend_contracts::lending_pool::LendingPool;
use collend_contracts::price_oracle::{PriceOracleGateway, StaticPriceFeed};
use odra::host::HostEnv;
use odra::prelude::{Address, Addressable};
use odra::schema::casper_contract_schema::NamedCLType;
use odra_cli::{
    deploy::DeployScript,
    scenario::{Args, Error, Scenario, ScenarioMetadata},
    CommandArg, ContractProvider, DeployedContractsContainer, DeployerExt,
    OdraCli,
};

/// Deploys the price oracle gateway.
pub struct GatewayDeployScript;

impl DeployScript for GatewayDeployScript {
    fn deploy(
        &self,
        env: &HostEnv,
        container: &mut DeployedContractsContainer,
    ) -> Result<(), odra_cli::deploy::Error> {
        use odra::host::NoArgs;

        let _gateway = PriceOracleGateway::load_or_deploy(
            &env,
            NoArgs,
            container,
            300_000_000_000, // Gas limit for gateway deployment
        )?;

        Ok(())
    }
}

/// Deploys the collateral manager and lending pool.
/// Requires the gateway to be deployed first.
pub struct EngineDeployScript;

impl DeployScript for EngineDeployScript {
    fn deploy(
        &self,
        env: &HostEnv,
        container: &mut DeployedContractsContainer,
    ) -> Result<(), odra_cli::deploy::Error> {
        use collend_contracts::collateral_manager::CollateralManagerInitArgs;
        use collend_contracts::lending_pool::LendingPoolInitArgs;

        GatewayDeployScript.deploy(env, container)?;

        let gateway = container.contract_ref::<PriceOracleGateway>(env)?;
        let gateway_address = gateway.address().clone();

        let manager = CollateralManager::load_or_deploy(
            &env,
            CollateralManagerInitArgs {
                oracle_gateway: gateway_address,
            },
            container,
            500_000_000_000, // Gas limit for manager deployment
        )?;
        let manager_address = manager.address().clone();

        let _pool = LendingPool::load_or_deploy(
            &env,
            LendingPoolInitArgs {
                collateral_manager: manager_address,
            },
            container,
            500_000_000_000, // Gas limit for pool deployment
        )?;

        Ok(())
    }
}

/// Scenario to register a collateral asset class.
pub struct RegisterAssetClassScenario;

impl Scenario for RegisterAssetClassScenario {
    fn args(&self) -> Vec<CommandArg> {
        vec![
            CommandArg::new(
                "token",
                "Address of the underlying token or item contract",
                NamedCLType::Key,
            ),
            CommandArg::new(
                "price_feed",
                "Address of the price feed for this class",
                NamedCLType::Key,
            ),
            CommandArg::new(
                "custody",
                "Address that escrows posted collateral",
                NamedCLType::Key,
            ),
            CommandArg::new(
                "ltv_bps",
                "Loan-to-value ratio in basis points",
                NamedCLType::U32,
            ),
            CommandArg::new(
                "liquidation_threshold_bps",
                "Liquidation threshold in basis points",
                NamedCLType::U32,
            ),
            CommandArg::new(
                "fungible",
                "Whether the class uses fungible semantics",
                NamedCLType::Bool,
            ),
        ]
    }

    fn run(
        &self,
        env: &HostEnv,
        container: &DeployedContractsContainer,
        args: Args,
    ) -> Result<(), Error> {
        let mut manager = container.contract_ref::<CollateralManager>(env)?;
        let token = args.get_single::<Address>("token")?;
        let price_feed = args.get_single::<Address>("price_feed")?;
        let custody = args.get_single::<Address>("custody")?;
        let ltv_bps = args.get_single::<u32>("ltv_bps")?;
        let liquidation_threshold_bps = args.get_single::<u32>("liquidation_threshold_bps")?;
        let fungible = args.get_single::<bool>("fungible")?;

        env.set_gas(300_000_000_000);
        let class_id = manager.try_register_asset_class(
            token,
            price_feed,
            custody,
            ltv_bps,
            liquidation_threshold_bps,
            fungible,
        )?;

        println!("Asset class registered with id {class_id}");
        Ok(())
    }
}

impl ScenarioMetadata for RegisterAssetClassScenario {
    const NAME: &'static str = "register-asset-class";
    const DESCRIPTION: &'static str = "Registers a collateral asset class on the manager";
}

/// Main function to run the CLI tool.
pub fn main() {
    OdraCli::new()
        .about("CLI tool for the collateralized lending engine")
        // Deploy scripts
        .deploy(GatewayDeployScript)
        .deploy(EngineDeployScript)
        // Contract references
        .contract::<PriceOracleGateway>()
        .contract::<StaticPriceFeed>()
        .contract::<CollateralManager>()
        .contract::<LendingPool>()
        // Scenarios
        .scenario(RegisterAssetClassScenario)
        .build()
        .run();
}
