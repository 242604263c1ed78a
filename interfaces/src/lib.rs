pub mod campaign;
pub mod distributor;
pub mod erc20;
pub mod gauge;
