pub mod collateral;
pub mod fee;
pub mod interest;
pub mod liquidation;
pub mod report;
